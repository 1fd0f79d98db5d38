//! Connector factory: routes each platform to its connector family
//!
//! LinkedIn resolves to the native connector; Instagram, Facebook, and
//! TikTok share the Upload-Post aggregator connector, parameterized by the
//! platform name. The mapping is total over [`SocialPlatform`]; unknown
//! platform names fail hard via [`ConnectorFactory::connector_for_name`].

use brandcast_domain::{Connector, ConnectorFactory, SocialPlatform};
use secrecy::SecretString;
use std::sync::Arc;

use crate::connectors::{LinkedinConnector, UploadPostConnector};

/// LinkedIn connector settings
#[derive(Debug, Clone)]
pub struct LinkedinConfig {
    pub enabled: bool,
    pub base_url: String,
}

impl Default for LinkedinConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: "https://api.linkedin.com".to_string(),
        }
    }
}

/// Upload-Post aggregator settings
#[derive(Clone)]
pub struct UploadPostConfig {
    pub enabled: bool,
    pub base_url: String,
    /// App-level aggregator API key; brand credentials stay on the brand
    pub api_key: SecretString,
}

impl Default for UploadPostConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: "https://api.upload-post.com".to_string(),
            api_key: SecretString::new("".into()),
        }
    }
}

/// App-level connector configuration
#[derive(Clone, Default)]
pub struct FactoryConfig {
    pub linkedin: LinkedinConfig,
    pub upload_post: UploadPostConfig,
}

/// Factory producing HTTP-backed connectors per platform
pub struct HttpConnectorFactory {
    config: FactoryConfig,
}

impl HttpConnectorFactory {
    pub fn new(config: FactoryConfig) -> Self {
        Self { config }
    }
}

impl ConnectorFactory for HttpConnectorFactory {
    fn connector_for(&self, platform: SocialPlatform) -> Arc<dyn Connector> {
        match platform {
            SocialPlatform::Linkedin => Arc::new(LinkedinConnector::with_base_url(
                self.config.linkedin.base_url.clone(),
                self.config.linkedin.enabled,
            )),
            SocialPlatform::Instagram | SocialPlatform::Facebook | SocialPlatform::Tiktok => {
                Arc::new(UploadPostConnector::with_base_url(
                    self.config.upload_post.api_key.clone(),
                    self.config.upload_post.base_url.clone(),
                    platform,
                    self.config.upload_post.enabled,
                ))
            }
        }
    }
}
