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
    pub brand: BrandConfig,

    #[serde(default)]
    pub linkedin: LinkedinConfig,

    #[serde(default)]
    pub upload_post: UploadPostConfig,

    #[serde(default)]
    pub dispatch: DispatchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_state_db_path")]
    pub state_db_path: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_true")]
    pub dry_run: bool,

    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    #[serde(default = "default_rate_limit_per_minute")]
    pub rate_limit_per_minute: u32,

    #[serde(default = "default_rate_limit_per_hour")]
    pub rate_limit_per_hour: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandConfig {
    #[serde(default = "default_brand_name")]
    pub name: String,

    /// Author URN the LinkedIn share is attributed to
    #[serde(default)]
    pub linkedin_author_urn: Option<String>,

    /// Account identifier registered with Upload-Post
    #[serde(default)]
    pub upload_post_username: Option<String>,

    #[serde(default = "default_linkedin_token_env")]
    pub linkedin_token_env: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkedinConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_linkedin_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadPostConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_upload_post_base_url")]
    pub base_url: String,

    #[serde(default = "default_upload_post_api_key_env")]
    pub api_key_env: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    #[serde(default)]
    pub blocked_patterns: Vec<String>,
}

// Default value functions
fn default_state_db_path() -> PathBuf {
    PathBuf::from("./state.sqlite")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_max_concurrent() -> usize {
    4
}

fn default_rate_limit_per_minute() -> u32 {
    0
}

fn default_rate_limit_per_hour() -> u32 {
    0
}

fn default_brand_name() -> String {
    "default".to_string()
}

fn default_linkedin_token_env() -> String {
    "LINKEDIN_ACCESS_TOKEN".to_string()
}

fn default_linkedin_base_url() -> String {
    "https://api.linkedin.com".to_string()
}

fn default_upload_post_base_url() -> String {
    "https://api.upload-post.com".to_string()
}

fn default_upload_post_api_key_env() -> String {
    "UPLOAD_POST_API_KEY".to_string()
}

fn default_poll_interval() -> u64 {
    60
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            state_db_path: default_state_db_path(),
            log_level: default_log_level(),
            dry_run: default_true(),
            max_concurrent: default_max_concurrent(),
            rate_limit_per_minute: default_rate_limit_per_minute(),
            rate_limit_per_hour: default_rate_limit_per_hour(),
        }
    }
}

impl Default for BrandConfig {
    fn default() -> Self {
        Self {
            name: default_brand_name(),
            linkedin_author_urn: None,
            upload_post_username: None,
            linkedin_token_env: default_linkedin_token_env(),
        }
    }
}

impl Default for LinkedinConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: default_linkedin_base_url(),
        }
    }
}

impl Default for UploadPostConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: default_upload_post_base_url(),
            api_key_env: default_upload_post_api_key_env(),
        }
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            blocked_patterns: vec![],
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
            // User specified a path that doesn't exist
            anyhow::bail!("Config file not found: {}", path.display());
        }

        // Add environment variable overrides
        builder = builder.add_source(
            config::Environment::with_prefix("BRANDCAST")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Generate example configuration as TOML string
    pub fn example_toml() -> String {
        r#"# brandcast configuration

[general]
state_db_path = "./state.sqlite"
log_level = "info"
dry_run = true
max_concurrent = 4
# 0 disables rate limiting
rate_limit_per_minute = 0
rate_limit_per_hour = 0

[brand]
name = "acme"
# linkedin_author_urn = "urn:li:organization:12345"
# upload_post_username = "acme_social"
linkedin_token_env = "LINKEDIN_ACCESS_TOKEN"

[linkedin]
enabled = false
base_url = "https://api.linkedin.com"

[upload_post]
enabled = false
base_url = "https://api.upload-post.com"
api_key_env = "UPLOAD_POST_API_KEY"

[dispatch]
poll_interval_secs = 60
# blocked_patterns = ["(?i)confidential", "^DRAFT:"]
"#
        .to_string()
    }
}
