//! Dispatch loop use case - publishes scheduled posts when they come due

use std::sync::Arc;
use uuid::Uuid;

use crate::{
    content_fingerprint,
    model::{Brand, DispatchResult, PublishedRecord, ScheduleStatus, ScheduledPost},
    policy::ContentPolicy,
    ports::{Clock, ConnectorFactory, ScheduleStore},
};
use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant, sleep};

/// Configuration for the dispatch loop
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Dry run mode (don't actually publish)
    pub dry_run: bool,
    /// Maximum concurrent publish tasks
    pub max_concurrent: usize,
    /// Max posts dispatched per minute (None = unlimited)
    pub rate_limit_per_minute: Option<u32>,
    /// Max posts dispatched per hour (None = unlimited)
    pub rate_limit_per_hour: Option<u32>,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            dry_run: true,
            max_concurrent: 4,
            rate_limit_per_minute: None,
            rate_limit_per_hour: None,
        }
    }
}

/// Errors from the dispatch loop
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("State error: {0}")]
    State(String),
}

/// Dispatch orchestrator
///
/// Polls the schedule store for due posts and fans them out to connectors
/// with bounded concurrency. A failure for one post never aborts the cycle.
#[derive(Clone)]
pub struct DispatchLoop<F, S, Cl>
where
    F: ConnectorFactory + ?Sized,
    S: ScheduleStore + ?Sized,
    Cl: Clock + ?Sized,
{
    brand: Brand,
    factory: Arc<F>,
    store: Arc<S>,
    clock: Arc<Cl>,
    policy: Arc<ContentPolicy>,
    config: DispatchConfig,
    rate_limiter: Arc<RateLimiter>,
}

impl<F, S, Cl> DispatchLoop<F, S, Cl>
where
    F: ConnectorFactory + ?Sized,
    S: ScheduleStore + ?Sized,
    Cl: Clock + ?Sized,
{
    pub fn new(
        brand: Brand,
        factory: Arc<F>,
        store: Arc<S>,
        clock: Arc<Cl>,
        policy: ContentPolicy,
        config: DispatchConfig,
    ) -> Self {
        let rate_limiter = Arc::new(RateLimiter::new(
            config.rate_limit_per_minute,
            config.rate_limit_per_hour,
        ));
        Self {
            brand,
            factory,
            store,
            clock,
            policy: Arc::new(policy),
            config,
            rate_limiter,
        }
    }

    /// Run a single dispatch cycle over all due posts
    pub async fn poll_once(&self) -> Result<Vec<(Uuid, DispatchResult)>, DispatchError> {
        let now = self.clock.now();

        let due = self
            .store
            .due_before(now)
            .await
            .map_err(|e| DispatchError::State(e.to_string()))?;

        if due.is_empty() {
            tracing::debug!("No posts due");
            return Ok(vec![]);
        }

        tracing::info!(count = due.len(), "Dispatching due posts");

        // Process with bounded concurrency and rate limiting
        let mut results = Vec::new();
        let max_concurrent = self.config.max_concurrent.max(1);
        let mut tasks: FuturesUnordered<BoxFuture<'_, (Uuid, DispatchResult)>> =
            FuturesUnordered::new();
        let mut posts_iter = due.into_iter();

        while tasks.len() < max_concurrent {
            let Some(post) = posts_iter.next() else {
                break;
            };
            let rate_limiter = Arc::clone(&self.rate_limiter);
            tasks.push(Box::pin(async move {
                rate_limiter.acquire().await;
                let id = post.id;
                let result = self.process_post(&post).await;
                (id, result)
            }));
        }

        while let Some(result) = tasks.next().await {
            results.push(result);
            while tasks.len() < max_concurrent {
                let Some(post) = posts_iter.next() else {
                    break;
                };
                let rate_limiter = Arc::clone(&self.rate_limiter);
                tasks.push(Box::pin(async move {
                    rate_limiter.acquire().await;
                    let id = post.id;
                    let result = self.process_post(&post).await;
                    (id, result)
                }));
            }
        }

        Ok(results)
    }

    /// Process a single due post
    async fn process_post(&self, post: &ScheduledPost) -> DispatchResult {
        let fingerprint = content_fingerprint(post.platform, &post.content);

        // Idempotency: identical content already live on this platform
        match self.store.is_published(&fingerprint, post.platform).await {
            Ok(true) => {
                self.mark(post.id, ScheduleStatus::Published, None).await;
                return DispatchResult::Skipped {
                    reason: "Content already published to this platform".to_string(),
                };
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to check published state, continuing");
            }
            Ok(false) => {}
        }

        if let Err(violation) = self.policy.validate(post.platform, &post.content) {
            let error = format!("Policy violation: {}", violation);
            self.mark(post.id, ScheduleStatus::Failed, Some(&error)).await;
            return DispatchResult::Failed { error };
        }

        if self.config.dry_run {
            tracing::info!(
                post_id = %post.id,
                platform = %post.platform,
                "[DRY RUN] Would publish"
            );
            return DispatchResult::Published {
                platform_post_id: None,
            };
        }

        let connector = self.factory.connector_for(post.platform);

        if !connector.is_enabled() {
            // Left pending; the operator may enable the connector later
            return DispatchResult::Skipped {
                reason: format!("Connector for {} is disabled", post.platform),
            };
        }

        match connector.publish(&self.brand, &post.content).await {
            Ok(result) => {
                let record = PublishedRecord {
                    id: Uuid::new_v4(),
                    scheduled_post_id: Some(post.id),
                    platform: post.platform,
                    platform_post_id: result.id.clone(),
                    content_fingerprint: fingerprint,
                    published_at: self.clock.now(),
                };

                if let Err(e) = self.store.record_published(&record).await {
                    tracing::error!(error = %e, "Failed to record published state");
                }

                self.mark(post.id, ScheduleStatus::Published, None).await;

                DispatchResult::Published {
                    platform_post_id: Some(result.id),
                }
            }
            Err(e) => {
                let error = e.to_string();
                tracing::error!(
                    post_id = %post.id,
                    platform = %post.platform,
                    error = %error,
                    "Publish failed"
                );
                self.mark(post.id, ScheduleStatus::Failed, Some(&error)).await;
                DispatchResult::Failed { error }
            }
        }
    }

    async fn mark(&self, id: Uuid, status: ScheduleStatus, error: Option<&str>) {
        if let Err(e) = self.store.mark_status(id, status, error).await {
            tracing::error!(post_id = %id, error = %e, "Failed to update schedule status");
        }
    }
}

#[derive(Debug)]
struct RateLimiter {
    per_minute: Option<u32>,
    per_hour: Option<u32>,
    state: Mutex<RateLimiterState>,
}

#[derive(Debug)]
struct RateLimiterState {
    minute_window_start: Instant,
    hour_window_start: Instant,
    minute_count: u32,
    hour_count: u32,
}

impl RateLimiter {
    fn new(per_minute: Option<u32>, per_hour: Option<u32>) -> Self {
        let now = Instant::now();
        Self {
            per_minute,
            per_hour,
            state: Mutex::new(RateLimiterState {
                minute_window_start: now,
                hour_window_start: now,
                minute_count: 0,
                hour_count: 0,
            }),
        }
    }

    async fn acquire(&self) {
        if self.per_minute.is_none() && self.per_hour.is_none() {
            return;
        }

        loop {
            let mut state = self.state.lock().await;
            let now = Instant::now();

            if now.duration_since(state.minute_window_start) >= Duration::from_secs(60) {
                state.minute_window_start = now;
                state.minute_count = 0;
            }

            if now.duration_since(state.hour_window_start) >= Duration::from_secs(3600) {
                state.hour_window_start = now;
                state.hour_count = 0;
            }

            let mut wait_for = Duration::from_secs(0);
            if let Some(limit) = self.per_minute {
                if state.minute_count >= limit {
                    let elapsed = now.duration_since(state.minute_window_start);
                    wait_for = wait_for.max(Duration::from_secs(60).saturating_sub(elapsed));
                }
            }

            if let Some(limit) = self.per_hour {
                if state.hour_count >= limit {
                    let elapsed = now.duration_since(state.hour_window_start);
                    wait_for = wait_for.max(Duration::from_secs(3600).saturating_sub(elapsed));
                }
            }

            if wait_for.is_zero() {
                if self.per_minute.is_some() {
                    state.minute_count = state.minute_count.saturating_add(1);
                }
                if self.per_hour.is_some() {
                    state.hour_count = state.hour_count.saturating_add(1);
                }
                return;
            }

            drop(state);
            sleep(wait_for).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PostContent, PublishResult, SocialPlatform};
    use crate::ports::{Connector, PublishError, StateError};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use time::OffsetDateTime;

    struct FakeConnector {
        platform: SocialPlatform,
        enabled: bool,
        fail_with: Option<&'static str>,
    }

    #[async_trait]
    impl Connector for FakeConnector {
        async fn publish(
            &self,
            _brand: &Brand,
            _content: &PostContent,
        ) -> Result<PublishResult, PublishError> {
            match self.fail_with {
                Some(msg) => Err(PublishError::Api(msg.to_string())),
                None => Ok(PublishResult {
                    id: format!("{}_post", self.platform),
                    url: None,
                }),
            }
        }

        fn platform(&self) -> SocialPlatform {
            self.platform
        }

        fn is_enabled(&self) -> bool {
            self.enabled
        }
    }

    struct FakeFactory {
        enabled: bool,
        fail_with: Option<&'static str>,
    }

    impl ConnectorFactory for FakeFactory {
        fn connector_for(&self, platform: SocialPlatform) -> Arc<dyn Connector> {
            Arc::new(FakeConnector {
                platform,
                enabled: self.enabled,
                fail_with: self.fail_with,
            })
        }
    }

    #[derive(Default)]
    struct FakeStore {
        posts: Mutex<Vec<ScheduledPost>>,
        published: Mutex<HashMap<String, bool>>,
        statuses: Mutex<HashMap<Uuid, (ScheduleStatus, Option<String>)>>,
    }

    #[async_trait]
    impl ScheduleStore for FakeStore {
        async fn add(&self, post: &ScheduledPost) -> Result<(), StateError> {
            self.posts.lock().unwrap().push(post.clone());
            Ok(())
        }

        async fn list(&self) -> Result<Vec<ScheduledPost>, StateError> {
            Ok(self.posts.lock().unwrap().clone())
        }

        async fn due_before(
            &self,
            when: OffsetDateTime,
        ) -> Result<Vec<ScheduledPost>, StateError> {
            Ok(self
                .posts
                .lock()
                .unwrap()
                .iter()
                .filter(|p| p.status == ScheduleStatus::Pending && p.scheduled_at <= when)
                .cloned()
                .collect())
        }

        async fn mark_status(
            &self,
            id: Uuid,
            status: ScheduleStatus,
            error: Option<&str>,
        ) -> Result<(), StateError> {
            self.statuses
                .lock()
                .unwrap()
                .insert(id, (status, error.map(String::from)));
            Ok(())
        }

        async fn is_published(
            &self,
            content_fingerprint: &str,
            platform: SocialPlatform,
        ) -> Result<bool, StateError> {
            let key = format!("{}:{}", content_fingerprint, platform);
            Ok(*self.published.lock().unwrap().get(&key).unwrap_or(&false))
        }

        async fn record_published(&self, record: &PublishedRecord) -> Result<(), StateError> {
            let key = format!("{}:{}", record.content_fingerprint, record.platform);
            self.published.lock().unwrap().insert(key, true);
            Ok(())
        }
    }

    struct FakeClock {
        time: OffsetDateTime,
    }

    impl Clock for FakeClock {
        fn now(&self) -> OffsetDateTime {
            self.time
        }
    }

    fn sample_brand() -> Brand {
        Brand {
            id: Uuid::new_v4(),
            name: "acme".to_string(),
            linkedin_access_token: None,
            linkedin_author_urn: None,
            upload_post_username: None,
        }
    }

    fn due_post(caption: &str) -> ScheduledPost {
        ScheduledPost::new(
            SocialPlatform::Facebook,
            PostContent::text(caption),
            OffsetDateTime::from_unix_timestamp(1_000).unwrap(),
        )
    }

    fn dispatch_loop(
        factory: FakeFactory,
        store: Arc<FakeStore>,
        dry_run: bool,
    ) -> DispatchLoop<FakeFactory, FakeStore, FakeClock> {
        DispatchLoop::new(
            sample_brand(),
            Arc::new(factory),
            store,
            Arc::new(FakeClock {
                time: OffsetDateTime::from_unix_timestamp(2_000).unwrap(),
            }),
            ContentPolicy::default(),
            DispatchConfig {
                dry_run,
                ..Default::default()
            },
        )
    }

    #[tokio::test]
    async fn test_due_post_is_published_and_recorded() {
        let store = Arc::new(FakeStore::default());
        let post = due_post("Launch day");
        store.add(&post).await.unwrap();

        let dispatch = dispatch_loop(
            FakeFactory {
                enabled: true,
                fail_with: None,
            },
            Arc::clone(&store),
            false,
        );

        let results = dispatch.poll_once().await.unwrap();

        assert_eq!(results.len(), 1);
        assert!(matches!(
            results[0].1,
            DispatchResult::Published {
                platform_post_id: Some(_)
            }
        ));

        let statuses = store.statuses.lock().unwrap();
        assert_eq!(statuses.get(&post.id).unwrap().0, ScheduleStatus::Published);
    }

    #[tokio::test]
    async fn test_not_due_post_untouched() {
        let store = Arc::new(FakeStore::default());
        let mut post = due_post("Future post");
        post.scheduled_at = OffsetDateTime::from_unix_timestamp(10_000).unwrap();
        store.add(&post).await.unwrap();

        let dispatch = dispatch_loop(
            FakeFactory {
                enabled: true,
                fail_with: None,
            },
            Arc::clone(&store),
            false,
        );

        let results = dispatch.poll_once().await.unwrap();
        assert!(results.is_empty());
        assert!(store.statuses.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_content_skipped() {
        let store = Arc::new(FakeStore::default());
        let post = due_post("Same caption");
        store.add(&post).await.unwrap();

        let fingerprint = content_fingerprint(post.platform, &post.content);
        store
            .record_published(&PublishedRecord {
                id: Uuid::new_v4(),
                scheduled_post_id: None,
                platform: post.platform,
                platform_post_id: "earlier_post".to_string(),
                content_fingerprint: fingerprint,
                published_at: OffsetDateTime::from_unix_timestamp(500).unwrap(),
            })
            .await
            .unwrap();

        let dispatch = dispatch_loop(
            FakeFactory {
                enabled: true,
                fail_with: None,
            },
            Arc::clone(&store),
            false,
        );

        let results = dispatch.poll_once().await.unwrap();

        assert_eq!(results.len(), 1);
        assert!(matches!(results[0].1, DispatchResult::Skipped { .. }));
    }

    #[tokio::test]
    async fn test_failed_publish_marks_failed_and_cycle_continues() {
        let store = Arc::new(FakeStore::default());
        let first = due_post("First");
        let second = due_post("Second");
        store.add(&first).await.unwrap();
        store.add(&second).await.unwrap();

        let dispatch = dispatch_loop(
            FakeFactory {
                enabled: true,
                fail_with: Some("boom"),
            },
            Arc::clone(&store),
            false,
        );

        let results = dispatch.poll_once().await.unwrap();

        assert_eq!(results.len(), 2);
        assert!(
            results
                .iter()
                .all(|(_, r)| matches!(r, DispatchResult::Failed { .. }))
        );

        let statuses = store.statuses.lock().unwrap();
        assert_eq!(statuses.get(&first.id).unwrap().0, ScheduleStatus::Failed);
        assert!(statuses.get(&first.id).unwrap().1.is_some());
    }

    #[tokio::test]
    async fn test_dry_run_publishes_nothing() {
        let store = Arc::new(FakeStore::default());
        store.add(&due_post("Dry run post")).await.unwrap();

        let dispatch = dispatch_loop(
            FakeFactory {
                enabled: true,
                fail_with: None,
            },
            Arc::clone(&store),
            true,
        );

        let results = dispatch.poll_once().await.unwrap();

        assert_eq!(results.len(), 1);
        assert!(matches!(
            results[0].1,
            DispatchResult::Published {
                platform_post_id: None
            }
        ));
        // Nothing recorded, nothing marked
        assert!(store.published.lock().unwrap().is_empty());
        assert!(store.statuses.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_disabled_connector_leaves_post_pending() {
        let store = Arc::new(FakeStore::default());
        store.add(&due_post("Waiting")).await.unwrap();

        let dispatch = dispatch_loop(
            FakeFactory {
                enabled: false,
                fail_with: None,
            },
            Arc::clone(&store),
            false,
        );

        let results = dispatch.poll_once().await.unwrap();

        assert_eq!(results.len(), 1);
        assert!(matches!(results[0].1, DispatchResult::Skipped { .. }));
        assert!(store.statuses.lock().unwrap().is_empty());
    }
}
