use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::{Result, StoreError};
use syrus_core::types::{CampaignId, ModelClass};

/// Out-of-scope object-storage collaborator (spec §6: "a blob store such as
/// S3 is assumed but not specified"). `ArtifactCache` builds well-known keys
/// on top of it so callers never hand-format paths.
pub trait BlobStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
    fn put(&self, key: &str, bytes: Vec<u8>) -> Result<()>;
}

/// Cache-then-call-then-upload helper used by the Blueprinting and
/// Imagegen workers (spec §4.4, §4.6): vendor responses are cached under a
/// deterministic key so retries after a crash skip the vendor call entirely.
pub struct ArtifactCache<B: BlobStore> {
    blobs: B,
}

impl<B: BlobStore> ArtifactCache<B> {
    pub fn new(blobs: B) -> Self {
        Self { blobs }
    }

    pub fn blueprint_response_key(campaign_id: &CampaignId, model_class: ModelClass) -> String {
        format!("{campaign_id}/blueprint/{model_class}/response.json")
    }

    pub fn image_key(campaign_id: &CampaignId, image_id: &str) -> String {
        format!("{campaign_id}/images/{image_id}.png")
    }

    pub fn get_blueprint_response(
        &self,
        campaign_id: &CampaignId,
        model_class: ModelClass,
    ) -> Result<Option<Vec<u8>>> {
        self.blobs
            .get(&Self::blueprint_response_key(campaign_id, model_class))
    }

    pub fn put_blueprint_response(
        &self,
        campaign_id: &CampaignId,
        model_class: ModelClass,
        bytes: Vec<u8>,
    ) -> Result<()> {
        self.blobs
            .put(&Self::blueprint_response_key(campaign_id, model_class), bytes)
    }

    pub fn get_image(&self, campaign_id: &CampaignId, image_id: &str) -> Result<Option<Vec<u8>>> {
        self.blobs.get(&Self::image_key(campaign_id, image_id))
    }

    pub fn put_image(&self, campaign_id: &CampaignId, image_id: &str, bytes: Vec<u8>) -> Result<()> {
        self.blobs.put(&Self::image_key(campaign_id, image_id), bytes)
    }

    pub fn require_image(&self, campaign_id: &CampaignId, image_id: &str) -> Result<Vec<u8>> {
        self.get_image(campaign_id, image_id)?
            .ok_or_else(|| StoreError::ArtifactNotFound(Self::image_key(campaign_id, image_id)))
    }
}

/// In-process stand-in for the blob store, keyed exactly like the real
/// deployment so tests exercise the same key-building logic.
#[derive(Default)]
pub struct InMemoryBlobStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl BlobStore for InMemoryBlobStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.blobs.lock().unwrap().get(key).cloned())
    }

    fn put(&self, key: &str, bytes: Vec<u8>) -> Result<()> {
        self.blobs.lock().unwrap().insert(key.to_string(), bytes);
        Ok(())
    }
}
