//! Port definitions (traits) for external dependencies
//!
//! These traits define the boundaries between the domain and external systems.
//! Adapters implement these traits to connect to real infrastructure.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::model::{
    Brand, PostContent, PublishResult, PublishedRecord, ScheduleStatus, ScheduledPost,
    SocialPlatform, UnsupportedPlatform,
};

/// Error type for publish operations, shared across connectors
#[derive(Debug, Error)]
pub enum PublishError {
    /// Generic non-success response from the platform
    #[error("API error: {0}")]
    Api(String),
    /// Platform or aggregator throttled the request
    #[error("Rate limited")]
    RateLimited,
    /// Credential invalid, expired, or missing
    #[error("Authentication failed: {0}")]
    Auth(String),
    /// Platform rejected the content itself; not retryable as-is
    #[error("Content rejected: {0}")]
    ContentRejected(String),
}

/// Port for publishing content to a single platform
///
/// Implementations are stateless: one outbound request per call, no retry,
/// no backoff. Retry policy belongs to the caller.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Publish content on behalf of a brand, returning the platform post ID
    async fn publish(
        &self,
        brand: &Brand,
        content: &PostContent,
    ) -> Result<PublishResult, PublishError>;

    /// The platform this connector publishes to
    fn platform(&self) -> SocialPlatform;

    /// Check if this connector is enabled
    fn is_enabled(&self) -> bool;
}

/// Error type for connector resolution
#[derive(Debug, Error)]
pub enum FactoryError {
    /// Platform name outside the supported set; caller must not publish
    #[error(transparent)]
    Unsupported(#[from] UnsupportedPlatform),
}

/// Port for resolving a connector per platform
///
/// The mapping over [`SocialPlatform`] is total: every enum value resolves
/// to exactly one connector. Unknown platform names fail hard at the string
/// boundary, never falling back to a default.
pub trait ConnectorFactory: Send + Sync {
    /// Resolve the connector for a platform value
    fn connector_for(&self, platform: SocialPlatform) -> Arc<dyn Connector>;

    /// Resolve a connector from a platform name
    fn connector_for_name(&self, name: &str) -> Result<Arc<dyn Connector>, FactoryError> {
        let platform: SocialPlatform = name.parse()?;
        Ok(self.connector_for(platform))
    }
}

/// Error type for schedule store operations
#[derive(Debug, Error)]
pub enum StateError {
    #[error("Database error: {0}")]
    Database(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Port for persisting scheduled posts and publish records
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    /// Add a scheduled post
    async fn add(&self, post: &ScheduledPost) -> Result<(), StateError>;

    /// List all scheduled posts
    async fn list(&self) -> Result<Vec<ScheduledPost>, StateError>;

    /// Fetch pending posts due at or before the given time
    async fn due_before(&self, when: OffsetDateTime) -> Result<Vec<ScheduledPost>, StateError>;

    /// Update the status of a scheduled post
    async fn mark_status(
        &self,
        id: Uuid,
        status: ScheduleStatus,
        error: Option<&str>,
    ) -> Result<(), StateError>;

    /// Check if content has already been published to a platform
    async fn is_published(
        &self,
        content_fingerprint: &str,
        platform: SocialPlatform,
    ) -> Result<bool, StateError>;

    /// Record a successful publish
    async fn record_published(&self, record: &PublishedRecord) -> Result<(), StateError>;
}

/// Port for time/clock operations (enables deterministic testing)
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> OffsetDateTime;
}

/// Real clock implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}
