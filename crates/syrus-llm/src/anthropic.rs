use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{LlmError, Result};
use crate::model::{anthropic_model_id, rate_limit_from_headers, token_budget, BlueprintPromptRequest, BlueprintPromptResponse, LlmProvider};

const API_VERSION: &str = "2023-06-01";

pub struct AnthropicProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl AnthropicProvider {
    pub fn new(api_key: String, base_url: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: base_url.unwrap_or_else(|| "https://api.anthropic.com".to_string()),
        }
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn generate_blueprint(
        &self,
        req: &BlueprintPromptRequest,
    ) -> Result<BlueprintPromptResponse> {
        let body = serde_json::json!({
            "model": anthropic_model_id(req.model_class),
            "max_tokens": token_budget(req.model_class),
            "system": req.system_prompt,
            "messages": [{"role": "user", "content": req.user_message}],
            "stream": false,
        });

        let url = format!("{}/v1/messages", self.base_url);
        debug!(model_class = %req.model_class, "sending blueprint request to anthropic");

        let resp = self
            .client
            .post(&url)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .header("x-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;
        let status = resp.status().as_u16();

        if status == 429 {
            return Err(rate_limit_from_headers(resp.headers()));
        }
        if !resp.status().is_success() {
            let text = resp.text().await.unwrap_or_default();
            warn!(status, body = %text, "anthropic blueprint call failed");
            return Err(LlmError::Api { status, message: text });
        }

        let api_resp: ApiResponse = resp.json().await.map_err(|e| LlmError::Parse(e.to_string()))?;
        let raw_json = api_resp
            .content
            .into_iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text),
                ContentBlock::Unknown => None,
            })
            .collect::<Vec<_>>()
            .join("");

        Ok(BlueprintPromptResponse {
            raw_json,
            tokens_in: api_resp.usage.input_tokens,
            tokens_out: api_resp.usage.output_tokens,
        })
    }
}

#[derive(Deserialize)]
struct ApiResponse {
    content: Vec<ContentBlock>,
    usage: Usage,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Unknown,
}

#[derive(Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}
