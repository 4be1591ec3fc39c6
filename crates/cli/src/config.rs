//! Configuration loading and management

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub ayrshare: AyrshareConfig,

    #[serde(default)]
    pub buffer: BufferConfig,

    #[serde(default)]
    pub instagram: InstagramConfig,

    #[serde(default)]
    pub late: LateConfig,

    #[serde(default)]
    pub zapier: ZapierConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Deadline for a whole posting command, lookups included
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Instagram handle quoted in messages and reports
    #[serde(default)]
    pub account: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AyrshareConfig {
    #[serde(default = "default_ayrshare_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_ayrshare_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BufferConfig {
    #[serde(default = "default_buffer_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_buffer_base_url")]
    pub base_url: String,

    /// Minimum spacing between Buffer requests; 0 disables limiting
    #[serde(default = "default_buffer_min_spacing_ms")]
    pub min_spacing_ms: u64,

    #[serde(default = "default_true")]
    pub check_media: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstagramConfig {
    #[serde(default = "default_instagram_access_token_env")]
    pub access_token_env: String,

    #[serde(default = "default_instagram_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LateConfig {
    #[serde(default = "default_late_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_late_account_id_env")]
    pub account_id_env: String,

    #[serde(default = "default_late_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ZapierConfig {
    #[serde(default)]
    pub webhook_url: String,

    /// Handle sent in the webhook payload; falls back to general.account
    #[serde(default)]
    pub account: Option<String>,
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_timeout_secs() -> u64 {
    90
}

fn default_true() -> bool {
    true
}

fn default_ayrshare_api_key_env() -> String {
    "AYRSHARE_API_KEY".to_string()
}

fn default_ayrshare_base_url() -> String {
    "https://app.ayrshare.com".to_string()
}

fn default_buffer_api_key_env() -> String {
    "BUFFER_API_KEY".to_string()
}

fn default_buffer_base_url() -> String {
    "https://api.bufferapp.com".to_string()
}

fn default_buffer_min_spacing_ms() -> u64 {
    6100
}

fn default_instagram_access_token_env() -> String {
    "INSTAGRAM_ACCESS_TOKEN".to_string()
}

fn default_instagram_base_url() -> String {
    "https://graph.facebook.com/v18.0".to_string()
}

fn default_late_api_key_env() -> String {
    "LATE_API_KEY".to_string()
}

fn default_late_account_id_env() -> String {
    "LATE_ACCOUNT_ID".to_string()
}

fn default_late_base_url() -> String {
    "https://api.getlate.io".to_string()
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            timeout_secs: default_timeout_secs(),
            account: None,
        }
    }
}

impl Default for AyrshareConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_ayrshare_api_key_env(),
            base_url: default_ayrshare_base_url(),
        }
    }
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_buffer_api_key_env(),
            base_url: default_buffer_base_url(),
            min_spacing_ms: default_buffer_min_spacing_ms(),
            check_media: default_true(),
        }
    }
}

impl Default for InstagramConfig {
    fn default() -> Self {
        Self {
            access_token_env: default_instagram_access_token_env(),
            base_url: default_instagram_base_url(),
        }
    }
}

impl Default for LateConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_late_api_key_env(),
            account_id_env: default_late_account_id_env(),
            base_url: default_late_base_url(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        // Try default config path if none specified
        let default_path = PathBuf::from("./config.toml");
        let path = config_path.unwrap_or(&default_path);

        if path.exists() {
            builder = builder.add_source(config::File::from(path));
        } else if config_path.is_some() {
            anyhow::bail!("Config file not found: {}", path.display());
        }

        // Add environment variable overrides
        builder = builder.add_source(
            config::Environment::with_prefix("INSTAPOST")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Webhook account handle, falling back to the general one
    pub fn zapier_account(&self) -> Option<String> {
        self.zapier
            .account
            .clone()
            .or_else(|| self.general.account.clone())
            .filter(|account| !account.trim().is_empty())
    }

    /// Generate example configuration as TOML string
    pub fn example_toml() -> String {
        r#"# instapost configuration
# Every key can be overridden with INSTAPOST__<SECTION>__<KEY>, e.g.
# INSTAPOST__ZAPIER__WEBHOOK_URL=https://hooks.zapier.com/hooks/catch/...

[general]
log_level = "info"
timeout_secs = 90
# account = "@your_brand"

[ayrshare]
api_key_env = "AYRSHARE_API_KEY"
base_url = "https://app.ayrshare.com"

[buffer]
api_key_env = "BUFFER_API_KEY"
base_url = "https://api.bufferapp.com"
# Buffer allows 10 requests per minute; 0 disables spacing
min_spacing_ms = 6100
check_media = true

[instagram]
access_token_env = "INSTAGRAM_ACCESS_TOKEN"
base_url = "https://graph.facebook.com/v18.0"

[late]
api_key_env = "LATE_API_KEY"
account_id_env = "LATE_ACCOUNT_ID"
base_url = "https://api.getlate.io"

[zapier]
webhook_url = ""
# account = "@your_brand"
"#
        .to_string()
    }
}
