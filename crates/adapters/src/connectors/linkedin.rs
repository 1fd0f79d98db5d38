//! LinkedIn native publishing connector
//!
//! Publishes UGC posts through LinkedIn's OAuth-authenticated API using the
//! brand's stored access token. Credentials are read from the brand at
//! publish time, never at construction.

use async_trait::async_trait;
use brandcast_domain::{
    Brand, Connector, MediaKind, PostContent, PublishError, PublishResult, SocialPlatform,
};
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const RESTLI_PROTOCOL_VERSION: &str = "2.0.0";

/// Connector for LinkedIn's native UGC post API
pub struct LinkedinConnector {
    client: Client,
    base_url: String,
    enabled: bool,
}

impl LinkedinConnector {
    pub fn new() -> Self {
        Self::with_base_url("https://api.linkedin.com".to_string(), true)
    }

    pub fn with_base_url(base_url: String, enabled: bool) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url,
            enabled,
        }
    }

    /// Create a disabled connector (for testing/dry-run)
    pub fn disabled() -> Self {
        Self {
            client: Client::new(),
            base_url: String::new(),
            enabled: false,
        }
    }
}

impl Default for LinkedinConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UgcPostRequest {
    author: String,
    lifecycle_state: &'static str,
    specific_content: SpecificContent,
    visibility: Visibility,
}

#[derive(Serialize)]
struct SpecificContent {
    #[serde(rename = "com.linkedin.ugc.ShareContent")]
    share_content: ShareContent,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ShareContent {
    share_commentary: TextBlock,
    share_media_category: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    media: Vec<ShareMedia>,
}

#[derive(Serialize)]
struct TextBlock {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ShareMedia {
    status: &'static str,
    original_url: String,
}

#[derive(Serialize)]
struct Visibility {
    #[serde(rename = "com.linkedin.ugc.MemberNetworkVisibility")]
    member_network_visibility: &'static str,
}

#[derive(Deserialize)]
struct UgcPostResponse {
    id: String,
}

fn build_request(author: &str, content: &PostContent) -> UgcPostRequest {
    let mut media: Vec<ShareMedia> = content
        .media
        .iter()
        .map(|m| ShareMedia {
            status: "READY",
            original_url: m.url.clone(),
        })
        .collect();

    let category = if content.media.iter().any(|m| m.kind == MediaKind::Video) {
        "VIDEO"
    } else if !content.media.is_empty() {
        "IMAGE"
    } else if content.link.is_some() {
        "ARTICLE"
    } else {
        "NONE"
    };

    if let Some(link) = &content.link {
        if media.is_empty() {
            media.push(ShareMedia {
                status: "READY",
                original_url: link.clone(),
            });
        }
    }

    UgcPostRequest {
        author: author.to_string(),
        lifecycle_state: "PUBLISHED",
        specific_content: SpecificContent {
            share_content: ShareContent {
                share_commentary: TextBlock {
                    text: content.caption.clone(),
                },
                share_media_category: category,
                media,
            },
        },
        visibility: Visibility {
            member_network_visibility: "PUBLIC",
        },
    }
}

#[async_trait]
impl Connector for LinkedinConnector {
    async fn publish(
        &self,
        brand: &Brand,
        content: &PostContent,
    ) -> Result<PublishResult, PublishError> {
        if !self.enabled {
            return Err(PublishError::Api("Connector is disabled".to_string()));
        }

        let token = brand
            .linkedin_access_token
            .as_ref()
            .ok_or_else(|| PublishError::Auth("Brand has no LinkedIn access token".to_string()))?;

        let author = brand
            .linkedin_author_urn
            .as_ref()
            .ok_or_else(|| PublishError::Auth("Brand has no LinkedIn author URN".to_string()))?;

        let request = build_request(author, content);
        let url = format!("{}/v2/ugcPosts", self.base_url);

        tracing::debug!(
            brand = %brand.name,
            media_count = content.media.len(),
            "Publishing LinkedIn UGC post"
        );

        let response = self
            .client
            .post(&url)
            .header(
                "Authorization",
                format!("Bearer {}", token.expose_secret()),
            )
            .header("X-Restli-Protocol-Version", RESTLI_PROTOCOL_VERSION)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| PublishError::Api(e.to_string()))?;

        let status = response.status();

        if status == 401 || status == 403 {
            return Err(PublishError::Auth(
                "Expired or invalid access token".to_string(),
            ));
        }

        if status == 429 {
            return Err(PublishError::RateLimited);
        }

        if status == 422 {
            let body = response.text().await.unwrap_or_default();
            return Err(PublishError::ContentRejected(body));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PublishError::Api(format!(
                "Failed to create LinkedIn post: {}",
                body
            )));
        }

        let post_response: UgcPostResponse = response
            .json()
            .await
            .map_err(|e| PublishError::Api(e.to_string()))?;

        Ok(PublishResult {
            url: Some(format!(
                "https://www.linkedin.com/feed/update/{}",
                post_response.id
            )),
            id: post_response.id,
        })
    }

    fn platform(&self) -> SocialPlatform {
        SocialPlatform::Linkedin
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}
