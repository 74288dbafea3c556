use async_trait::async_trait;

use crate::error::{LlmError, Result};
use syrus_core::types::ModelClass;

/// Vendor model id for a model class, Anthropic-flavoured. `syrus-workers`
/// only ever deals in `ModelClass`; the concrete vendor id lives here so the
/// mapping changes in one place when a vendor renames a model.
pub fn anthropic_model_id(model_class: ModelClass) -> &'static str {
    match model_class {
        ModelClass::Haiku => "claude-haiku-4-5",
        ModelClass::Sonnet => "claude-sonnet-4-5",
    }
}

/// Token budget ceiling per model class, used as `max_tokens` on the
/// blueprint-generation call.
pub fn token_budget(model_class: ModelClass) -> u32 {
    match model_class {
        ModelClass::Haiku => 4_096,
        ModelClass::Sonnet => 8_192,
    }
}

#[derive(Debug, Clone)]
pub struct BlueprintPromptRequest {
    pub model_class: ModelClass,
    /// Fully-assembled prompt sections: `<configuration>`, `<beatProfile>`,
    /// `<availableBoons>`, `<seedPackage>`, `<exampleBlueprint>` (see
    /// `syrus_workers::blueprinting::prompt`).
    pub system_prompt: String,
    pub user_message: String,
}

#[derive(Debug, Clone)]
pub struct BlueprintPromptResponse {
    pub raw_json: String,
    pub tokens_in: u32,
    pub tokens_out: u32,
}

/// Vendor collaborator for blueprint text generation (spec §4.4 step 5).
#[async_trait]
pub trait LlmProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn generate_blueprint(
        &self,
        req: &BlueprintPromptRequest,
    ) -> Result<BlueprintPromptResponse>;
}

#[derive(Debug, Clone)]
pub struct ImageRequest {
    pub model_class: ModelClass,
    pub prompt: String,
}

#[derive(Debug, Clone)]
pub struct ImageResponse {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Vendor collaborator for image generation (spec §4.4 step on `imagePlan`).
#[async_trait]
pub trait ImageProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn generate_image(&self, req: &ImageRequest) -> Result<ImageResponse>;
}

pub(crate) fn rate_limit_from_headers(headers: &reqwest::header::HeaderMap) -> LlmError {
    let retry_after_ms = headers
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .map(|secs| secs * 1000)
        .unwrap_or(5000);
    LlmError::RateLimited { retry_after_ms }
}
