use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{LlmError, Result};
use crate::model::{rate_limit_from_headers, ImageProvider, ImageRequest, ImageResponse};

/// Image-generation vendor collaborator. Same request/error shape as
/// `AnthropicProvider` (bearer auth, 429 → `RateLimited`, non-2xx → `Api`)
/// against a different endpoint, per spec §4.4's optional image-generation
/// trigger.
pub struct OpenAiImageProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenAiImageProvider {
    pub fn new(api_key: String, base_url: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: base_url.unwrap_or_else(|| "https://api.openai.com".to_string()),
        }
    }
}

#[async_trait]
impl ImageProvider for OpenAiImageProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn generate_image(&self, req: &ImageRequest) -> Result<ImageResponse> {
        let body = serde_json::json!({
            "model": "gpt-image-1",
            "prompt": req.prompt,
            "n": 1,
            "response_format": "b64_json",
        });

        let url = format!("{}/v1/images/generations", self.base_url);
        debug!(model_class = %req.model_class, "sending image request to openai");

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = resp.status().as_u16();
        if status == 429 {
            return Err(rate_limit_from_headers(resp.headers()));
        }
        if !resp.status().is_success() {
            let text = resp.text().await.unwrap_or_default();
            warn!(status, body = %text, "openai image call failed");
            return Err(LlmError::Api { status, message: text });
        }

        let api_resp: ApiResponse = resp.json().await.map_err(|e| LlmError::Parse(e.to_string()))?;
        let entry = api_resp
            .data
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::Parse("image response had no data entries".into()))?;

        let bytes = base64::Engine::decode(&base64::engine::general_purpose::STANDARD, entry.b64_json)
            .map_err(|e| LlmError::Parse(format!("invalid base64 image payload: {e}")))?;

        Ok(ImageResponse { bytes, content_type: "image/png".to_string() })
    }
}

#[derive(Deserialize)]
struct ApiResponse {
    data: Vec<ImageData>,
}

#[derive(Deserialize)]
struct ImageData {
    b64_json: String,
}
