use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Deployment stage — selects which secret-store parameter path prefix to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Dev,
    Prod,
}

impl Default for Stage {
    fn default() -> Self {
        Stage::Dev
    }
}

/// Top-level config (syrus.toml + SYRUS_* env overrides).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyrusConfig {
    #[serde(default)]
    pub stage: Stage,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub queues: QueueConfig,
    #[serde(default)]
    pub blob: BlobConfig,
    #[serde(default)]
    pub dialects: DialectsConfig,
    #[serde(default)]
    pub vendors: VendorsConfig,
}

/// Entry Gateway bind address (spec §4.1 — single HTTP entry point).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_gateway_bind")]
    pub bind: String,
    #[serde(default = "default_gateway_port")]
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self { bind: default_gateway_bind(), port: default_gateway_port() }
    }
}

fn default_gateway_bind() -> String {
    "0.0.0.0".to_string()
}
fn default_gateway_port() -> u16 {
    8080
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_campaigns_table")]
    pub campaigns_table: String,
    #[serde(default = "default_hosts_table")]
    pub hosts_table: String,
    #[serde(default = "default_dedup_table")]
    pub dedup_table: String,
    #[serde(default = "default_confirmations_table")]
    pub confirmations_table: String,
    /// Path to the backing SQLite file standing in for the document store.
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            campaigns_table: default_campaigns_table(),
            hosts_table: default_hosts_table(),
            dedup_table: default_dedup_table(),
            confirmations_table: default_confirmations_table(),
            db_path: default_db_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    #[serde(default = "default_messaging_queue")]
    pub messaging_queue_url: String,
    #[serde(default = "default_blueprinting_queue")]
    pub blueprinting_queue_url: String,
    #[serde(default = "default_imagegen_queue")]
    pub imagegen_queue_url: String,
    #[serde(default = "default_birthing_queue")]
    pub birthing_queue_url: String,
    #[serde(default = "default_configuring_queue")]
    pub configuring_queue_url: String,
    #[serde(default = "default_play_queue")]
    pub play_queue_url: String,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            messaging_queue_url: default_messaging_queue(),
            blueprinting_queue_url: default_blueprinting_queue(),
            imagegen_queue_url: default_imagegen_queue(),
            birthing_queue_url: default_birthing_queue(),
            configuring_queue_url: default_configuring_queue(),
            play_queue_url: default_play_queue(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BlobConfig {
    #[serde(default = "default_model_cache_bucket")]
    pub model_cache_bucket: String,
}

/// Per-dialect webhook configuration (app id, whether ephemeral flags apply).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DialectsConfig {
    pub discord: Option<DiscordDialectConfig>,
    pub whatsapp: Option<WhatsAppDialectConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordDialectConfig {
    pub app_id: String,
    /// User id permitted to set the `debug` flag on commands (spec §4.1 step 9).
    pub debug_operator_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhatsAppDialectConfig {
    pub app_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VendorsConfig {
    pub anthropic: Option<AnthropicVendorConfig>,
    pub openai: Option<OpenAiVendorConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnthropicVendorConfig {
    #[serde(default = "default_anthropic_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiVendorConfig {
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
}

fn default_campaigns_table() -> String {
    "syrus-campaigns".to_string()
}
fn default_hosts_table() -> String {
    "syrus-hosts".to_string()
}
fn default_dedup_table() -> String {
    "syrus-dedup".to_string()
}
fn default_confirmations_table() -> String {
    "syrus-confirmations".to_string()
}
fn default_db_path() -> String {
    "./syrus.db".to_string()
}
fn default_messaging_queue() -> String {
    "syrus-messaging".to_string()
}
fn default_blueprinting_queue() -> String {
    "syrus-blueprinting".to_string()
}
fn default_imagegen_queue() -> String {
    "syrus-imagegen".to_string()
}
fn default_birthing_queue() -> String {
    "syrus-birthing".to_string()
}
fn default_configuring_queue() -> String {
    "syrus-configuring".to_string()
}
fn default_play_queue() -> String {
    "syrus-play".to_string()
}
fn default_model_cache_bucket() -> String {
    "syrus-model-cache".to_string()
}
fn default_anthropic_base_url() -> String {
    "https://api.anthropic.com".to_string()
}
fn default_openai_base_url() -> String {
    "https://api.openai.com".to_string()
}

impl Default for SyrusConfig {
    fn default() -> Self {
        Self {
            stage: Stage::default(),
            gateway: GatewayConfig::default(),
            store: StoreConfig::default(),
            queues: QueueConfig::default(),
            blob: BlobConfig::default(),
            dialects: DialectsConfig::default(),
            vendors: VendorsConfig::default(),
        }
    }
}

impl SyrusConfig {
    /// Load config from a TOML file with SYRUS_* env var overrides.
    ///
    /// Checks in order: explicit path argument, then `SYRUS_CONFIG`, then
    /// `./syrus.toml`.
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .or_else(|| std::env::var("SYRUS_CONFIG").ok())
            .unwrap_or_else(|| "syrus.toml".to_string());

        let config: SyrusConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("SYRUS_").split("_"))
            .extract()
            .map_err(|e| crate::error::SyrusError::Config(e.to_string()))?;

        Ok(config)
    }
}
