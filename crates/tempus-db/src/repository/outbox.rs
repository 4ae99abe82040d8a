//! # Notification Outbox Repository
//!
//! Queues templated SMS/WhatsApp message requests for an external sender.
//!
//! ## The Outbox Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Outbox Pattern Implementation                        │
//! │                                                                         │
//! │  WORKFLOW (e.g., sale completed, service ready)                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  INSERT INTO notification_outbox (recipient, template_id, body, ...)   │
//! │       │   ← fire-and-forget: enqueue failure is logged, never fatal    │
//! │       ▼                                                                 │
//! │  EXTERNAL SENDER (not this crate)                                      │
//! │    1. SELECT * FROM notification_outbox WHERE sent_at IS NULL          │
//! │    2. For each entry: send via SMS/WhatsApp gateway                    │
//! │       a. On success: mark_sent()                                       │
//! │       b. On failure: mark_failed() → attempts += 1, last_error         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use tempus_core::NotificationOutboxEntry;

const OUTBOX_COLUMNS: &str = "id, owner_id, recipient, template_id, variables, body, attempts, \
     last_error, created_at, attempted_at, sent_at";

/// Repository for notification outbox operations.
#[derive(Debug, Clone)]
pub struct NotificationOutboxRepository {
    pool: SqlitePool,
}

impl NotificationOutboxRepository {
    /// Creates a new NotificationOutboxRepository.
    pub fn new(pool: SqlitePool) -> Self {
        NotificationOutboxRepository { pool }
    }

    /// Queues a rendered message for sending.
    pub async fn enqueue(
        &self,
        owner_id: &str,
        recipient: &str,
        template_id: &str,
        variables: &str,
        body: &str,
    ) -> DbResult<NotificationOutboxEntry> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        debug!(
            template_id = %template_id,
            recipient = %recipient,
            "Queuing notification"
        );

        let entry = NotificationOutboxEntry {
            id: id.clone(),
            owner_id: owner_id.to_string(),
            recipient: recipient.to_string(),
            template_id: template_id.to_string(),
            variables: variables.to_string(),
            body: body.to_string(),
            attempts: 0,
            last_error: None,
            created_at: now,
            attempted_at: None,
            sent_at: None,
        };

        sqlx::query(
            r#"
            INSERT INTO notification_outbox (
                id, owner_id, recipient, template_id, variables, body,
                attempts, last_error, created_at, attempted_at, sent_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.owner_id)
        .bind(&entry.recipient)
        .bind(&entry.template_id)
        .bind(&entry.variables)
        .bind(&entry.body)
        .bind(entry.attempts)
        .bind(&entry.last_error)
        .bind(entry.created_at)
        .bind(entry.attempted_at)
        .bind(entry.sent_at)
        .execute(&self.pool)
        .await?;

        Ok(entry)
    }

    /// Gets pending entries that still need sending, oldest first.
    pub async fn get_pending(&self, limit: u32) -> DbResult<Vec<NotificationOutboxEntry>> {
        let entries = sqlx::query_as::<_, NotificationOutboxEntry>(&format!(
            "SELECT {OUTBOX_COLUMNS} FROM notification_outbox \
             WHERE sent_at IS NULL ORDER BY created_at ASC LIMIT ?1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Marks an entry as successfully sent.
    pub async fn mark_sent(&self, id: &str) -> DbResult<()> {
        let now = Utc::now();

        sqlx::query("UPDATE notification_outbox SET sent_at = ?2, attempted_at = ?2 WHERE id = ?1")
            .bind(id)
            .bind(now)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Records a send failure.
    pub async fn mark_failed(&self, id: &str, error: &str) -> DbResult<()> {
        let now = Utc::now();

        sqlx::query(
            r#"
            UPDATE notification_outbox SET
                attempts = attempts + 1,
                last_error = ?2,
                attempted_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(error)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Counts pending entries.
    pub async fn count_pending(&self) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM notification_outbox WHERE sent_at IS NULL")
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    /// Deletes old sent entries (cleanup). Returns the number deleted.
    pub async fn cleanup_old_entries(&self, days_old: u32) -> DbResult<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM notification_outbox
            WHERE sent_at IS NOT NULL
            AND sent_at < datetime('now', '-' || ?1 || ' days')
            "#,
        )
        .bind(days_old)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_enqueue_and_drain() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.outbox();

        let entry = repo
            .enqueue(
                "owner-1",
                "+923001234567",
                "sale_completed",
                r##"{"invoice":"#0001"}"##,
                "Thank you! Your invoice is #0001.",
            )
            .await
            .unwrap();

        assert_eq!(repo.count_pending().await.unwrap(), 1);

        let pending = repo.get_pending(10).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].template_id, "sale_completed");

        repo.mark_sent(&entry.id).await.unwrap();
        assert_eq!(repo.count_pending().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_mark_failed_keeps_pending() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.outbox();

        let entry = repo
            .enqueue("owner-1", "+92300", "service_ready", "{}", "Ready!")
            .await
            .unwrap();

        repo.mark_failed(&entry.id, "gateway timeout").await.unwrap();

        let pending = repo.get_pending(10).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].attempts, 1);
        assert_eq!(pending[0].last_error.as_deref(), Some("gateway timeout"));
    }
}
