pub mod artifact;
pub mod campaign_store;
pub mod confirmation;
pub mod db;
pub mod dedup;
pub mod error;
pub mod host_store;
pub mod model;
pub mod secrets;

pub use artifact::{ArtifactCache, BlobStore, InMemoryBlobStore};
pub use campaign_store::{load_or_not_found, CampaignStore, SqliteCampaignStore};
pub use confirmation::{ConfirmationStore, PendingConfirmation, SqliteConfirmationStore};
pub use dedup::{DedupStore, SqliteDedupStore};
pub use error::{Result, StoreError};
pub use host_store::{HostStore, SqliteHostStore};
pub use secrets::{EnvSecretStore, InMemorySecretStore, SecretStore};
