//! Publishing connectors
//!
//! Two connector families implement the domain [`Connector`] port: the
//! native LinkedIn connector and the Upload-Post aggregator connector
//! covering Instagram, Facebook, and TikTok.

mod linkedin;
mod upload_post;

pub use linkedin::LinkedinConnector;
pub use upload_post::UploadPostConnector;

use async_trait::async_trait;
use brandcast_domain::{
    Brand, Connector, PostContent, PublishError, PublishResult, SocialPlatform,
};

/// Stub connector for testing
pub struct StubConnector {
    platform: SocialPlatform,
    enabled: bool,
    published: std::sync::Mutex<Vec<PostContent>>,
}

impl StubConnector {
    pub fn new(platform: SocialPlatform, enabled: bool) -> Self {
        Self {
            platform,
            enabled,
            published: std::sync::Mutex::new(vec![]),
        }
    }

    /// Get all content that was published
    pub fn get_published(&self) -> Vec<PostContent> {
        self.published.lock().unwrap().clone()
    }
}

#[async_trait]
impl Connector for StubConnector {
    async fn publish(
        &self,
        _brand: &Brand,
        content: &PostContent,
    ) -> Result<PublishResult, PublishError> {
        if !self.enabled {
            return Err(PublishError::Api("Connector disabled".to_string()));
        }

        self.published.lock().unwrap().push(content.clone());

        Ok(PublishResult {
            id: format!("stub_{}_post", self.platform),
            url: None,
        })
    }

    fn platform(&self) -> SocialPlatform {
        self.platform
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn sample_brand() -> Brand {
        Brand {
            id: Uuid::new_v4(),
            name: "acme".to_string(),
            linkedin_access_token: None,
            linkedin_author_urn: None,
            upload_post_username: None,
        }
    }

    #[tokio::test]
    async fn test_stub_records_published_content() {
        let stub = StubConnector::new(SocialPlatform::Facebook, true);

        let result = stub
            .publish(&sample_brand(), &PostContent::text("Recorded caption"))
            .await
            .unwrap();

        assert_eq!(result.id, "stub_facebook_post");
        let published = stub.get_published();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].caption, "Recorded caption");
    }

    #[tokio::test]
    async fn test_disabled_stub_errors() {
        let stub = StubConnector::new(SocialPlatform::Tiktok, false);

        let result = stub
            .publish(&sample_brand(), &PostContent::text("Nope"))
            .await;

        assert!(result.is_err());
    }
}
