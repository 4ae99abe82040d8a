//! # Sequence Repository
//!
//! The shared monotonic counter behind invoice numbering.
//!
//! The counter lives outside any sale row so concurrent sales can never be
//! handed the same value: the advance is a single upsert-returning
//! statement, serialized by the database.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;

/// Repository for monotonic sequence operations.
#[derive(Debug, Clone)]
pub struct SequenceRepository {
    pool: SqlitePool,
}

impl SequenceRepository {
    /// Creates a new SequenceRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SequenceRepository { pool }
    }

    /// Advances the owner's invoice counter and returns the new value.
    ///
    /// The first call for an owner returns 1.
    pub async fn next_invoice_value(&self, owner_id: &str) -> DbResult<i64> {
        let value: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO invoice_counters (owner_id, value) VALUES (?1, 1)
            ON CONFLICT(owner_id) DO UPDATE SET value = value + 1
            RETURNING value
            "#,
        )
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;

        debug!(owner_id = %owner_id, value = %value, "Advanced invoice counter");
        Ok(value)
    }

    /// Reads the current counter value without advancing (for diagnostics).
    pub async fn current_invoice_value(&self, owner_id: &str) -> DbResult<i64> {
        let value: Option<i64> =
            sqlx::query_scalar("SELECT value FROM invoice_counters WHERE owner_id = ?1")
                .bind(owner_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(value.unwrap_or(0))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_counter_is_monotonic() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.sequences();

        assert_eq!(repo.current_invoice_value("owner-1").await.unwrap(), 0);
        assert_eq!(repo.next_invoice_value("owner-1").await.unwrap(), 1);
        assert_eq!(repo.next_invoice_value("owner-1").await.unwrap(), 2);
        assert_eq!(repo.next_invoice_value("owner-1").await.unwrap(), 3);
        assert_eq!(repo.current_invoice_value("owner-1").await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_counters_are_per_owner() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.sequences();

        assert_eq!(repo.next_invoice_value("owner-1").await.unwrap(), 1);
        assert_eq!(repo.next_invoice_value("owner-2").await.unwrap(), 1);
        assert_eq!(repo.next_invoice_value("owner-1").await.unwrap(), 2);
    }
}
