//! In-memory schedule store for testing and offline mode

use async_trait::async_trait;
use brandcast_domain::{
    PublishedRecord, ScheduleStatus, ScheduleStore, ScheduledPost, SocialPlatform, StateError,
};
use std::collections::HashMap;
use std::sync::RwLock;
use time::OffsetDateTime;
use uuid::Uuid;

/// In-memory schedule store implementation
pub struct InMemoryScheduleStore {
    posts: RwLock<HashMap<Uuid, ScheduledPost>>,
    published: RwLock<HashMap<String, PublishedRecord>>,
}

impl InMemoryScheduleStore {
    pub fn new() -> Self {
        Self {
            posts: RwLock::new(HashMap::new()),
            published: RwLock::new(HashMap::new()),
        }
    }

    fn make_published_key(content_fingerprint: &str, platform: SocialPlatform) -> String {
        format!("{}:{}", content_fingerprint, platform)
    }
}

impl Default for InMemoryScheduleStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ScheduleStore for InMemoryScheduleStore {
    async fn add(&self, post: &ScheduledPost) -> Result<(), StateError> {
        let mut posts = self
            .posts
            .write()
            .map_err(|e| StateError::Database(e.to_string()))?;
        posts.insert(post.id, post.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<ScheduledPost>, StateError> {
        let posts = self
            .posts
            .read()
            .map_err(|e| StateError::Database(e.to_string()))?;
        let mut all: Vec<_> = posts.values().cloned().collect();
        all.sort_by_key(|p| p.scheduled_at);
        Ok(all)
    }

    async fn due_before(&self, when: OffsetDateTime) -> Result<Vec<ScheduledPost>, StateError> {
        let posts = self
            .posts
            .read()
            .map_err(|e| StateError::Database(e.to_string()))?;
        let mut due: Vec<_> = posts
            .values()
            .filter(|p| p.status == ScheduleStatus::Pending && p.scheduled_at <= when)
            .cloned()
            .collect();
        due.sort_by_key(|p| p.scheduled_at);
        Ok(due)
    }

    async fn mark_status(
        &self,
        id: Uuid,
        status: ScheduleStatus,
        error: Option<&str>,
    ) -> Result<(), StateError> {
        let mut posts = self
            .posts
            .write()
            .map_err(|e| StateError::Database(e.to_string()))?;
        let post = posts
            .get_mut(&id)
            .ok_or_else(|| StateError::NotFound(id.to_string()))?;
        post.status = status;
        post.last_error = error.map(String::from);
        Ok(())
    }

    async fn is_published(
        &self,
        content_fingerprint: &str,
        platform: SocialPlatform,
    ) -> Result<bool, StateError> {
        let key = Self::make_published_key(content_fingerprint, platform);
        let published = self
            .published
            .read()
            .map_err(|e| StateError::Database(e.to_string()))?;
        Ok(published.contains_key(&key))
    }

    async fn record_published(&self, record: &PublishedRecord) -> Result<(), StateError> {
        let key = Self::make_published_key(&record.content_fingerprint, record.platform);
        let mut published = self
            .published
            .write()
            .map_err(|e| StateError::Database(e.to_string()))?;
        published.insert(key, record.clone());
        Ok(())
    }
}
