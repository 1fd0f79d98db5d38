//! Upload-Post aggregator connector
//!
//! Publishes to Instagram, Facebook, or TikTok by delegating to the
//! Upload-Post API, parameterized by the platform name and the brand's
//! aggregator account identifier. One instance serves one platform.

use async_trait::async_trait;
use brandcast_domain::{
    Brand, Connector, PostContent, PublishError, PublishResult, SocialPlatform,
};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Connector for the Upload-Post aggregator API
pub struct UploadPostConnector {
    client: Client,
    api_key: SecretString,
    base_url: String,
    platform: SocialPlatform,
    enabled: bool,
}

impl UploadPostConnector {
    pub fn new(api_key: SecretString, platform: SocialPlatform) -> Self {
        Self::with_base_url(
            api_key,
            "https://api.upload-post.com".to_string(),
            platform,
            true,
        )
    }

    pub fn with_base_url(
        api_key: SecretString,
        base_url: String,
        platform: SocialPlatform,
        enabled: bool,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            api_key,
            base_url,
            platform,
            enabled,
        }
    }

    /// Create a disabled connector (for testing/dry-run)
    pub fn disabled(platform: SocialPlatform) -> Self {
        Self {
            client: Client::new(),
            api_key: SecretString::new("".into()),
            base_url: String::new(),
            platform,
            enabled: false,
        }
    }
}

#[derive(Serialize)]
struct UploadRequest {
    user: String,
    /// Platform names as the aggregator expects them
    platform: Vec<&'static str>,
    title: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    media_urls: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    link: Option<String>,
}

#[derive(Deserialize)]
struct UploadResponse {
    success: bool,
    #[serde(default)]
    results: HashMap<String, PlatformResult>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct PlatformResult {
    success: bool,
    #[serde(default)]
    post_id: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_code: Option<String>,
}

#[async_trait]
impl Connector for UploadPostConnector {
    async fn publish(
        &self,
        brand: &Brand,
        content: &PostContent,
    ) -> Result<PublishResult, PublishError> {
        if !self.enabled {
            return Err(PublishError::Api("Connector is disabled".to_string()));
        }

        let username = brand.upload_post_username.as_ref().ok_or_else(|| {
            PublishError::Auth("Brand has no Upload-Post username".to_string())
        })?;

        let request = UploadRequest {
            user: username.clone(),
            platform: vec![self.platform.as_str()],
            title: content.caption.clone(),
            media_urls: content.media.iter().map(|m| m.url.clone()).collect(),
            link: content.link.clone(),
        };

        let url = format!("{}/api/upload", self.base_url);

        tracing::debug!(
            brand = %brand.name,
            platform = %self.platform,
            media_count = content.media.len(),
            "Publishing via Upload-Post"
        );

        let response = self
            .client
            .post(&url)
            .header(
                "Authorization",
                format!("Apikey {}", self.api_key.expose_secret()),
            )
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| PublishError::Api(e.to_string()))?;

        let status = response.status();

        if status == 429 {
            return Err(PublishError::RateLimited);
        }

        if status == 401 || status == 403 {
            return Err(PublishError::Auth(
                "Invalid or unauthorized API key".to_string(),
            ));
        }

        if status == 422 || status == 451 {
            let body = response.text().await.unwrap_or_default();
            return Err(PublishError::ContentRejected(body));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PublishError::Api(format!(
                "Upload-Post request failed: {}",
                body
            )));
        }

        let upload_response: UploadResponse = response
            .json()
            .await
            .map_err(|e| PublishError::Api(e.to_string()))?;

        if !upload_response.success {
            return Err(PublishError::Api(
                upload_response
                    .error
                    .unwrap_or_else(|| "Upload-Post reported failure".to_string()),
            ));
        }

        let entry = upload_response
            .results
            .get(self.platform.as_str())
            .ok_or_else(|| {
                PublishError::Api(format!(
                    "Upload-Post response missing result for {}",
                    self.platform
                ))
            })?;

        if !entry.success {
            let message = entry
                .error
                .clone()
                .unwrap_or_else(|| "Platform rejected the post".to_string());
            return match entry.error_code.as_deref() {
                Some("content_policy") => Err(PublishError::ContentRejected(message)),
                _ => Err(PublishError::Api(message)),
            };
        }

        let id = entry.post_id.clone().ok_or_else(|| {
            PublishError::Api(format!(
                "Upload-Post result for {} has no post ID",
                self.platform
            ))
        })?;

        Ok(PublishResult {
            id,
            url: entry.url.clone(),
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
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_brand() -> Brand {
        Brand {
            id: uuid::Uuid::new_v4(),
            name: "acme".to_string(),
            linkedin_access_token: None,
            linkedin_author_urn: None,
            upload_post_username: Some("acme_social".to_string()),
        }
    }

    fn sample_content() -> PostContent {
        PostContent::text("Behind the scenes at acme")
    }

    fn connector(server: &MockServer, platform: SocialPlatform) -> UploadPostConnector {
        UploadPostConnector::with_base_url(
            SecretString::new("test-key".into()),
            server.uri(),
            platform,
            true,
        )
    }

    #[tokio::test]
    async fn test_publish_passes_platform_name_through() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/upload"))
            .and(header("Authorization", "Apikey test-key"))
            .and(body_json(serde_json::json!({
                "user": "acme_social",
                "platform": ["instagram"],
                "title": "Behind the scenes at acme"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "results": {
                    "instagram": {
                        "success": true,
                        "post_id": "ig_17890",
                        "url": "https://www.instagram.com/p/ig_17890/"
                    }
                }
            })))
            .mount(&mock_server)
            .await;

        let connector = connector(&mock_server, SocialPlatform::Instagram);

        let result = connector
            .publish(&sample_brand(), &sample_content())
            .await
            .unwrap();

        assert_eq!(result.id, "ig_17890");
        assert_eq!(
            result.url.as_deref(),
            Some("https://www.instagram.com/p/ig_17890/")
        );
    }

    #[tokio::test]
    async fn test_publish_throttled_is_rate_limited() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/upload"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&mock_server)
            .await;

        let connector = connector(&mock_server, SocialPlatform::Tiktok);

        let result = connector.publish(&sample_brand(), &sample_content()).await;

        assert!(matches!(result, Err(PublishError::RateLimited)));
    }

    #[tokio::test]
    async fn test_publish_unauthorized_is_auth_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/upload"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&mock_server)
            .await;

        let connector = connector(&mock_server, SocialPlatform::Facebook);

        let result = connector.publish(&sample_brand(), &sample_content()).await;

        assert!(matches!(result, Err(PublishError::Auth(_))));
    }

    #[tokio::test]
    async fn test_publish_policy_code_is_content_rejected() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/upload"))
            .respond_with(
                ResponseTemplate::new(422)
                    .set_body_string("{\"error\":\"media format not allowed\"}"),
            )
            .mount(&mock_server)
            .await;

        let connector = connector(&mock_server, SocialPlatform::Instagram);

        let result = connector.publish(&sample_brand(), &sample_content()).await;

        assert!(matches!(result, Err(PublishError::ContentRejected(_))));
    }

    #[tokio::test]
    async fn test_platform_entry_failure_maps_per_entry() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/upload"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "results": {
                    "tiktok": {
                        "success": false,
                        "error": "Video rejected by platform moderation",
                        "error_code": "content_policy"
                    }
                }
            })))
            .mount(&mock_server)
            .await;

        let connector = connector(&mock_server, SocialPlatform::Tiktok);

        let result = connector.publish(&sample_brand(), &sample_content()).await;

        assert!(matches!(result, Err(PublishError::ContentRejected(_))));
    }

    #[tokio::test]
    async fn test_missing_result_entry_is_generic_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/upload"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "results": {}
            })))
            .mount(&mock_server)
            .await;

        let connector = connector(&mock_server, SocialPlatform::Facebook);

        let result = connector.publish(&sample_brand(), &sample_content()).await;

        assert!(matches!(result, Err(PublishError::Api(_))));
    }

    #[tokio::test]
    async fn test_missing_username_fails_without_network() {
        let connector = UploadPostConnector::with_base_url(
            SecretString::new("test-key".into()),
            "http://127.0.0.1:9".to_string(),
            SocialPlatform::Instagram,
            true,
        );

        let mut brand = sample_brand();
        brand.upload_post_username = None;

        let result = connector.publish(&brand, &sample_content()).await;

        assert!(matches!(result, Err(PublishError::Auth(_))));
    }
}
