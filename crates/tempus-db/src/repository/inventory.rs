//! # Inventory Repository
//!
//! Catalog CRUD plus the stock ledger used by both sale completion and
//! returns.
//!
//! ## Stock Update Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Stock Update Strategy                                │
//! │                                                                         │
//! │  ❌ WRONG: read-modify-write (loses updates under concurrency)         │
//! │     let level = SELECT stock_level ...;                                │
//! │     UPDATE inventory SET stock_level = {level + delta} ...             │
//! │                                                                         │
//! │  ✅ CORRECT: one atomic conditional update                             │
//! │     UPDATE inventory SET                                               │
//! │         stock_level  = MAX(0, stock_level + delta),                    │
//! │         stock_status = CASE ... END   ← derived in the same statement  │
//! │                                                                         │
//! │  Two sales completing against the same item can never lose a delta,   │
//! │  and a persisted level/status pair can never disagree.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use tempus_core::{InventoryItem, StockStatus, LOW_STOCK_THRESHOLD};

const ITEM_COLUMNS: &str = "id, owner_id, name, brand, sku, category, stock_level, stock_status, \
     price_cents, cost_cents, description, image_url, created_at, updated_at";

/// Repository for inventory database operations.
#[derive(Debug, Clone)]
pub struct InventoryRepository {
    pool: SqlitePool,
}

impl InventoryRepository {
    /// Creates a new InventoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        InventoryRepository { pool }
    }

    /// Gets an item by its ID.
    pub async fn get_by_id(&self, owner_id: &str, id: &str) -> DbResult<Option<InventoryItem>> {
        let item = sqlx::query_as::<_, InventoryItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM inventory WHERE id = ?1 AND owner_id = ?2"
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    /// Gets an item by its SKU.
    pub async fn get_by_sku(&self, owner_id: &str, sku: &str) -> DbResult<Option<InventoryItem>> {
        let item = sqlx::query_as::<_, InventoryItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM inventory WHERE sku = ?1 AND owner_id = ?2"
        ))
        .bind(sku)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    /// Lists items for an owner, sorted by name.
    pub async fn list(&self, owner_id: &str, limit: u32) -> DbResult<Vec<InventoryItem>> {
        let items = sqlx::query_as::<_, InventoryItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM inventory WHERE owner_id = ?1 ORDER BY name LIMIT ?2"
        ))
        .bind(owner_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Inserts a new catalog item.
    ///
    /// The stored status is derived from the given level, whatever the
    /// caller put in the struct; the pair is written together.
    ///
    /// ## Errors
    /// * `DbError::UniqueViolation` - SKU already exists for this owner
    pub async fn insert(&self, item: &InventoryItem) -> DbResult<InventoryItem> {
        debug!(sku = %item.sku, "Inserting inventory item");

        let status = StockStatus::for_level(item.stock_level);

        sqlx::query(
            r#"
            INSERT INTO inventory (
                id, owner_id, name, brand, sku, category,
                stock_level, stock_status, price_cents, cost_cents,
                description, image_url, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
        )
        .bind(&item.id)
        .bind(&item.owner_id)
        .bind(&item.name)
        .bind(&item.brand)
        .bind(&item.sku)
        .bind(&item.category)
        .bind(item.stock_level.max(0))
        .bind(status)
        .bind(item.price_cents)
        .bind(item.cost_cents)
        .bind(&item.description)
        .bind(&item.image_url)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(InventoryItem {
            stock_status: status,
            ..item.clone()
        })
    }

    /// Updates catalog fields of an existing item.
    ///
    /// Stock level is NOT touched here; all level changes go through
    /// [`apply_stock_delta`](Self::apply_stock_delta).
    pub async fn update(&self, item: &InventoryItem) -> DbResult<()> {
        debug!(id = %item.id, "Updating inventory item");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE inventory SET
                name = ?3,
                brand = ?4,
                sku = ?5,
                category = ?6,
                price_cents = ?7,
                cost_cents = ?8,
                description = ?9,
                image_url = ?10,
                updated_at = ?11
            WHERE id = ?1 AND owner_id = ?2
            "#,
        )
        .bind(&item.id)
        .bind(&item.owner_id)
        .bind(&item.name)
        .bind(&item.brand)
        .bind(&item.sku)
        .bind(&item.category)
        .bind(item.price_cents)
        .bind(item.cost_cents)
        .bind(&item.description)
        .bind(&item.image_url)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("InventoryItem", &item.id));
        }

        Ok(())
    }

    /// Applies a signed stock delta to one item and re-derives its status.
    ///
    /// Negative delta for sale fulfilment, positive for returns/restocking.
    /// The level is clamped at zero: an overshooting negative delta is
    /// silently absorbed rather than failing the parent transaction.
    ///
    /// ## Returns
    /// The new `(stock_level, stock_status)` pair.
    ///
    /// ## Errors
    /// * `DbError::NotFound` - no such item for this owner
    pub async fn apply_stock_delta(
        &self,
        owner_id: &str,
        id: &str,
        delta: i64,
    ) -> DbResult<(i64, StockStatus)> {
        debug!(id = %id, delta = %delta, "Applying stock delta");

        let now = Utc::now();

        // Level clamp and status derivation happen inside one UPDATE so
        // concurrent invocations can never lose a delta or desync the pair.
        let sql = format!(
            r#"
            UPDATE inventory SET
                stock_level = MAX(0, stock_level + ?3),
                stock_status = CASE
                    WHEN MAX(0, stock_level + ?3) = 0 THEN 'out_of_stock'
                    WHEN MAX(0, stock_level + ?3) <= {threshold} THEN 'low_stock'
                    ELSE 'in_stock'
                END,
                updated_at = ?4
            WHERE id = ?1 AND owner_id = ?2
            RETURNING stock_level, stock_status
            "#,
            threshold = LOW_STOCK_THRESHOLD
        );

        let row = sqlx::query_as::<_, (i64, StockStatus)>(&sql)
            .bind(id)
            .bind(owner_id)
            .bind(delta)
            .bind(now)
            .fetch_optional(&self.pool)
            .await?;

        row.ok_or_else(|| DbError::not_found("InventoryItem", id))
    }

    /// Counts items for an owner (for diagnostics).
    pub async fn count(&self, owner_id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM inventory WHERE owner_id = ?1")
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Helper to generate a new inventory item ID.
pub fn generate_inventory_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    const OWNER: &str = "owner-1";

    fn watch(sku: &str, level: i64) -> InventoryItem {
        let now = Utc::now();
        InventoryItem {
            id: generate_inventory_id(),
            owner_id: OWNER.to_string(),
            name: format!("Watch {sku}"),
            brand: "Seiko".to_string(),
            sku: sku.to_string(),
            category: Some("automatic".to_string()),
            stock_level: level,
            stock_status: StockStatus::for_level(level),
            price_cents: 45_000,
            cost_cents: 30_000,
            description: None,
            image_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = test_db().await;
        let repo = db.inventory();

        let item = repo.insert(&watch("SKX-007", 8)).await.unwrap();
        assert_eq!(item.stock_status, StockStatus::InStock);

        let fetched = repo.get_by_id(OWNER, &item.id).await.unwrap().unwrap();
        assert_eq!(fetched.sku, "SKX-007");
        assert_eq!(fetched.stock_level, 8);

        let by_sku = repo.get_by_sku(OWNER, "SKX-007").await.unwrap().unwrap();
        assert_eq!(by_sku.id, item.id);
    }

    #[tokio::test]
    async fn test_duplicate_sku_rejected() {
        let db = test_db().await;
        let repo = db.inventory();

        repo.insert(&watch("SKX-007", 1)).await.unwrap();
        let err = repo.insert(&watch("SKX-007", 1)).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_delta_deduct_and_status() {
        let db = test_db().await;
        let repo = db.inventory();
        let item = repo.insert(&watch("SKX-007", 6)).await.unwrap();

        // 6 - 2 = 4 → low stock
        let (level, status) = repo.apply_stock_delta(OWNER, &item.id, -2).await.unwrap();
        assert_eq!(level, 4);
        assert_eq!(status, StockStatus::LowStock);

        // 4 + 1 = 5 → still low stock (boundary)
        let (level, status) = repo.apply_stock_delta(OWNER, &item.id, 1).await.unwrap();
        assert_eq!(level, 5);
        assert_eq!(status, StockStatus::LowStock);

        // 5 + 1 = 6 → back in stock
        let (level, status) = repo.apply_stock_delta(OWNER, &item.id, 1).await.unwrap();
        assert_eq!(level, 6);
        assert_eq!(status, StockStatus::InStock);
    }

    /// Stock is clamped at zero no matter how large the deduction.
    #[tokio::test]
    async fn test_delta_never_negative() {
        let db = test_db().await;
        let repo = db.inventory();
        let item = repo.insert(&watch("SKX-007", 3)).await.unwrap();

        let (level, status) = repo.apply_stock_delta(OWNER, &item.id, -100).await.unwrap();
        assert_eq!(level, 0);
        assert_eq!(status, StockStatus::OutOfStock);

        // Restores from the floor work normally
        let (level, status) = repo.apply_stock_delta(OWNER, &item.id, 2).await.unwrap();
        assert_eq!(level, 2);
        assert_eq!(status, StockStatus::LowStock);
    }

    #[tokio::test]
    async fn test_delta_unknown_item() {
        let db = test_db().await;
        let err = db
            .inventory()
            .apply_stock_delta(OWNER, "missing", -1)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    /// Rows are scoped by owner: another owner's id does not resolve.
    #[tokio::test]
    async fn test_owner_isolation() {
        let db = test_db().await;
        let repo = db.inventory();
        let item = repo.insert(&watch("SKX-007", 3)).await.unwrap();

        assert!(repo
            .get_by_id("other-owner", &item.id)
            .await
            .unwrap()
            .is_none());
        assert!(repo
            .apply_stock_delta("other-owner", &item.id, -1)
            .await
            .is_err());
    }
}
