pub mod error;
pub mod queue;
pub mod runtime;
pub mod types;

pub use error::{QueueError, Result};
pub use queue::{InProcessQueue, Queue};
pub use runtime::{run_stage, StageAction};
pub use types::{Envelope, MessageGroupId};
