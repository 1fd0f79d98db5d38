//! SQLite schedule store implementation

use async_trait::async_trait;
use brandcast_domain::{
    PostContent, PublishedRecord, ScheduleStatus, ScheduleStore, ScheduledPost, SocialPlatform,
    StateError,
};
use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use time::OffsetDateTime;
use uuid::Uuid;

/// SQLite-backed schedule store
pub struct SqliteScheduleStore {
    pool: SqlitePool,
}

impl SqliteScheduleStore {
    /// Create a new SQLite schedule store, initializing the database if needed
    pub async fn new(db_path: impl AsRef<Path>) -> Result<Self, StateError> {
        let db_path = db_path.as_ref();

        // Create parent directories if needed
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StateError::Database(format!("Failed to create directory: {}", e)))?;
        }

        let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&db_url)
            .await
            .map_err(|e| StateError::Database(e.to_string()))?;

        let store = Self { pool };
        store.run_migrations().await?;

        Ok(store)
    }

    /// Create an in-memory SQLite store (for testing)
    pub async fn in_memory() -> Result<Self, StateError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| StateError::Database(e.to_string()))?;

        let store = Self { pool };
        store.run_migrations().await?;

        Ok(store)
    }

    async fn run_migrations(&self) -> Result<(), StateError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS scheduled_posts (
                id TEXT PRIMARY KEY,
                platform TEXT NOT NULL,
                content TEXT NOT NULL,
                scheduled_at TEXT NOT NULL,
                status TEXT NOT NULL,
                last_error TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StateError::Database(e.to_string()))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS published_records (
                id TEXT PRIMARY KEY,
                scheduled_post_id TEXT,
                platform TEXT NOT NULL,
                platform_post_id TEXT NOT NULL,
                content_fingerprint TEXT NOT NULL,
                published_at TEXT NOT NULL,
                UNIQUE(content_fingerprint, platform)
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StateError::Database(e.to_string()))?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_scheduled_due
            ON scheduled_posts(status, scheduled_at)
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StateError::Database(e.to_string()))?;

        Ok(())
    }
}

type ScheduledRow = (String, String, String, String, String, Option<String>);

fn row_to_post(row: ScheduledRow) -> Result<ScheduledPost, StateError> {
    let (id, platform, content, scheduled_at, status, last_error) = row;

    let id = Uuid::parse_str(&id).map_err(|e| StateError::Serialization(e.to_string()))?;
    let platform = SocialPlatform::from_str(&platform)
        .map_err(|e| StateError::Serialization(e.to_string()))?;
    let content: PostContent =
        serde_json::from_str(&content).map_err(|e| StateError::Serialization(e.to_string()))?;
    let scheduled_at =
        OffsetDateTime::parse(&scheduled_at, &time::format_description::well_known::Rfc3339)
            .map_err(|e| StateError::Serialization(e.to_string()))?;
    let status =
        ScheduleStatus::from_str(&status).map_err(StateError::Serialization)?;

    Ok(ScheduledPost {
        id,
        platform,
        content,
        scheduled_at,
        status,
        last_error,
    })
}

#[async_trait]
impl ScheduleStore for SqliteScheduleStore {
    async fn add(&self, post: &ScheduledPost) -> Result<(), StateError> {
        let content = serde_json::to_string(&post.content)
            .map_err(|e| StateError::Serialization(e.to_string()))?;
        let scheduled_at = post
            .scheduled_at
            .format(&time::format_description::well_known::Rfc3339)
            .map_err(|e| StateError::Serialization(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO scheduled_posts (id, platform, content, scheduled_at, status, last_error)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(post.id.to_string())
        .bind(post.platform.as_str())
        .bind(&content)
        .bind(&scheduled_at)
        .bind(post.status.as_str())
        .bind(&post.last_error)
        .execute(&self.pool)
        .await
        .map_err(|e| StateError::Database(e.to_string()))?;

        Ok(())
    }

    async fn list(&self) -> Result<Vec<ScheduledPost>, StateError> {
        let rows: Vec<ScheduledRow> = sqlx::query_as(
            r#"
            SELECT id, platform, content, scheduled_at, status, last_error
            FROM scheduled_posts
            ORDER BY scheduled_at
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StateError::Database(e.to_string()))?;

        rows.into_iter().map(row_to_post).collect()
    }

    async fn due_before(&self, when: OffsetDateTime) -> Result<Vec<ScheduledPost>, StateError> {
        let when_str = when
            .format(&time::format_description::well_known::Rfc3339)
            .map_err(|e| StateError::Serialization(e.to_string()))?;

        let rows: Vec<ScheduledRow> = sqlx::query_as(
            r#"
            SELECT id, platform, content, scheduled_at, status, last_error
            FROM scheduled_posts
            WHERE status = 'pending' AND scheduled_at <= ?
            ORDER BY scheduled_at
            "#,
        )
        .bind(&when_str)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StateError::Database(e.to_string()))?;

        rows.into_iter().map(row_to_post).collect()
    }

    async fn mark_status(
        &self,
        id: Uuid,
        status: ScheduleStatus,
        error: Option<&str>,
    ) -> Result<(), StateError> {
        let result = sqlx::query(
            r#"
            UPDATE scheduled_posts
            SET status = ?, last_error = ?
            WHERE id = ?
            "#,
        )
        .bind(status.as_str())
        .bind(error)
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| StateError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StateError::NotFound(id.to_string()));
        }

        Ok(())
    }

    async fn is_published(
        &self,
        content_fingerprint: &str,
        platform: SocialPlatform,
    ) -> Result<bool, StateError> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM published_records WHERE content_fingerprint = ? AND platform = ?",
        )
        .bind(content_fingerprint)
        .bind(platform.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StateError::Database(e.to_string()))?;

        Ok(count.0 > 0)
    }

    async fn record_published(&self, record: &PublishedRecord) -> Result<(), StateError> {
        let published_at = record
            .published_at
            .format(&time::format_description::well_known::Rfc3339)
            .map_err(|e| StateError::Serialization(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO published_records
            (id, scheduled_post_id, platform, platform_post_id, content_fingerprint, published_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(content_fingerprint, platform) DO UPDATE SET
                platform_post_id = excluded.platform_post_id,
                published_at = excluded.published_at
            "#,
        )
        .bind(record.id.to_string())
        .bind(record.scheduled_post_id.map(|id| id.to_string()))
        .bind(record.platform.as_str())
        .bind(&record.platform_post_id)
        .bind(&record.content_fingerprint)
        .bind(&published_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StateError::Database(e.to_string()))?;

        Ok(())
    }
}
