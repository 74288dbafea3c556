pub mod anthropic;
pub mod error;
pub mod model;
pub mod openai;

pub use anthropic::AnthropicProvider;
pub use error::{LlmError, Result};
pub use model::{
    anthropic_model_id, token_budget, BlueprintPromptRequest, BlueprintPromptResponse,
    ImageProvider, ImageRequest, ImageResponse, LlmProvider,
};
pub use openai::OpenAiImageProvider;
