//! Domain models and value objects

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use time::OffsetDateTime;
use uuid::Uuid;

/// Target social network for a publish operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SocialPlatform {
    Linkedin,
    Instagram,
    Facebook,
    Tiktok,
}

impl SocialPlatform {
    /// All supported platforms
    pub const ALL: [SocialPlatform; 4] = [
        SocialPlatform::Linkedin,
        SocialPlatform::Instagram,
        SocialPlatform::Facebook,
        SocialPlatform::Tiktok,
    ];

    /// Lowercase platform name, as expected by the aggregator API
    pub fn as_str(&self) -> &'static str {
        match self {
            SocialPlatform::Linkedin => "linkedin",
            SocialPlatform::Instagram => "instagram",
            SocialPlatform::Facebook => "facebook",
            SocialPlatform::Tiktok => "tiktok",
        }
    }
}

impl fmt::Display for SocialPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for platform names outside the supported set
#[derive(Debug, Clone, thiserror::Error)]
#[error("Unsupported platform: {0}")]
pub struct UnsupportedPlatform(pub String);

impl FromStr for SocialPlatform {
    type Err = UnsupportedPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "linkedin" => Ok(SocialPlatform::Linkedin),
            "instagram" => Ok(SocialPlatform::Instagram),
            "facebook" => Ok(SocialPlatform::Facebook),
            "tiktok" => Ok(SocialPlatform::Tiktok),
            other => Err(UnsupportedPlatform(other.to_string())),
        }
    }
}

/// A brand account holding per-platform credentials
///
/// Connectors treat this as an opaque credential source; a missing
/// credential surfaces as an authentication error at publish time.
#[derive(Debug, Clone)]
pub struct Brand {
    /// Brand identifier
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// OAuth access token for LinkedIn's native API
    pub linkedin_access_token: Option<SecretString>,
    /// Author URN the LinkedIn share is attributed to
    /// (e.g. "urn:li:organization:12345")
    pub linkedin_author_urn: Option<String>,
    /// Account identifier registered with the Upload-Post aggregator
    pub upload_post_username: Option<String>,
}

/// Kind of media attachment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
}

/// A media attachment referenced by URL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaAttachment {
    /// Publicly resolvable media URL
    pub url: String,
    /// Image or video
    pub kind: MediaKind,
}

/// Content payload for a publish operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostContent {
    /// Caption text
    pub caption: String,
    /// Media attachments
    #[serde(default)]
    pub media: Vec<MediaAttachment>,
    /// Optional link to include with the post
    #[serde(default)]
    pub link: Option<String>,
}

impl PostContent {
    /// Create a text-only payload
    pub fn text(caption: impl Into<String>) -> Self {
        Self {
            caption: caption.into(),
            media: vec![],
            link: None,
        }
    }
}

/// Result of a successful publish operation
#[derive(Debug, Clone)]
pub struct PublishResult {
    /// Platform-specific post ID
    pub id: String,
    /// URL to the published content, if available
    pub url: Option<String>,
}

/// Lifecycle status of a scheduled post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleStatus {
    /// Waiting for its scheduled time
    Pending,
    /// Published successfully
    Published,
    /// Publish attempt failed; not retried automatically
    Failed,
}

impl ScheduleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleStatus::Pending => "pending",
            ScheduleStatus::Published => "published",
            ScheduleStatus::Failed => "failed",
        }
    }
}

impl FromStr for ScheduleStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ScheduleStatus::Pending),
            "published" => Ok(ScheduleStatus::Published),
            "failed" => Ok(ScheduleStatus::Failed),
            other => Err(format!("Invalid schedule status: {}", other)),
        }
    }
}

/// A post queued for future publishing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledPost {
    /// Unique record ID
    pub id: Uuid,
    /// Target platform
    pub platform: SocialPlatform,
    /// Content to publish
    pub content: PostContent,
    /// When the post becomes due
    #[serde(with = "time::serde::rfc3339")]
    pub scheduled_at: OffsetDateTime,
    /// Current status
    pub status: ScheduleStatus,
    /// Error message from the last failed attempt, if any
    #[serde(default)]
    pub last_error: Option<String>,
}

impl ScheduledPost {
    /// Create a new pending scheduled post
    pub fn new(platform: SocialPlatform, content: PostContent, scheduled_at: OffsetDateTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            platform,
            content,
            scheduled_at,
            status: ScheduleStatus::Pending,
            last_error: None,
        }
    }
}

/// Record of a successfully published post (for idempotency)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishedRecord {
    /// Unique record ID
    pub id: Uuid,
    /// Scheduled post that produced this publish, if any
    pub scheduled_post_id: Option<Uuid>,
    /// Platform published to
    pub platform: SocialPlatform,
    /// Post ID returned by the platform
    pub platform_post_id: String,
    /// Content fingerprint at publish time
    pub content_fingerprint: String,
    /// When published
    #[serde(with = "time::serde::rfc3339")]
    pub published_at: OffsetDateTime,
}

/// Outcome of dispatching a single scheduled post
#[derive(Debug)]
pub enum DispatchResult {
    /// Post was published (no ID in dry-run mode)
    Published { platform_post_id: Option<String> },
    /// Post was skipped (duplicate content, disabled connector, etc.)
    Skipped { reason: String },
    /// Publish attempt failed
    Failed { error: String },
}
