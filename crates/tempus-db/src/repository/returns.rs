//! # Return Repository
//!
//! Database operations for returns and return items.
//!
//! A return is written once, atomically with its items; when the caller
//! determines the sale is now fully returned, the parent sale's flip to
//! `returned` rides in the same transaction. The per-sale-item
//! returned-quantity sum backs the "never return more than was sold" bound
//! across multiple partial returns.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use tempus_core::{Return, ReturnItem, SaleStatus};

const RETURN_COLUMNS: &str = "id, owner_id, sale_id, reason, status, total_cents, created_at";

const ITEM_COLUMNS: &str = "id, return_id, sale_item_id, inventory_id, product_name, quantity, \
     price_cents, cost_cents, subtotal_cents, created_at";

/// Repository for return database operations.
#[derive(Debug, Clone)]
pub struct ReturnRepository {
    pool: SqlitePool,
}

impl ReturnRepository {
    /// Creates a new ReturnRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReturnRepository { pool }
    }

    /// Inserts a return with its items in one transaction. When
    /// `mark_sale_returned` is set (the sale is now fully returned), the
    /// parent sale's status flip rides in the same transaction.
    ///
    /// ## Errors
    /// * `DbError::NotFound` - the parent sale does not exist for this owner
    pub async fn insert_with_items(
        &self,
        ret: &Return,
        items: &[ReturnItem],
        mark_sale_returned: bool,
    ) -> DbResult<()> {
        debug!(id = %ret.id, sale_id = %ret.sale_id, items = items.len(), "Inserting return");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO returns (
                id, owner_id, sale_id, reason, status, total_cents, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&ret.id)
        .bind(&ret.owner_id)
        .bind(&ret.sale_id)
        .bind(&ret.reason)
        .bind(ret.status)
        .bind(ret.total_cents)
        .bind(ret.created_at)
        .execute(&mut *tx)
        .await?;

        for item in items {
            sqlx::query(
                r#"
                INSERT INTO return_items (
                    id, return_id, sale_item_id, inventory_id, product_name,
                    quantity, price_cents, cost_cents, subtotal_cents, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                "#,
            )
            .bind(&item.id)
            .bind(&item.return_id)
            .bind(&item.sale_item_id)
            .bind(&item.inventory_id)
            .bind(&item.product_name)
            .bind(item.quantity)
            .bind(item.price_cents)
            .bind(item.cost_cents)
            .bind(item.subtotal_cents)
            .bind(item.created_at)
            .execute(&mut *tx)
            .await?;
        }

        if mark_sale_returned {
            let now = Utc::now();
            let result = sqlx::query(
                "UPDATE sales SET status = ?3, updated_at = ?4 WHERE id = ?1 AND owner_id = ?2",
            )
            .bind(&ret.sale_id)
            .bind(&ret.owner_id)
            .bind(SaleStatus::Returned)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                return Err(DbError::not_found("Sale", &ret.sale_id));
            }
        }

        tx.commit().await?;
        Ok(())
    }

    /// Gets all returns recorded against a sale, oldest first.
    pub async fn get_by_sale(&self, owner_id: &str, sale_id: &str) -> DbResult<Vec<Return>> {
        let returns = sqlx::query_as::<_, Return>(&format!(
            "SELECT {RETURN_COLUMNS} FROM returns \
             WHERE sale_id = ?1 AND owner_id = ?2 ORDER BY created_at"
        ))
        .bind(sale_id)
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(returns)
    }

    /// Gets all items of one return.
    pub async fn get_items(&self, return_id: &str) -> DbResult<Vec<ReturnItem>> {
        let items = sqlx::query_as::<_, ReturnItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM return_items WHERE return_id = ?1 ORDER BY created_at, id"
        ))
        .bind(return_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Sums the already-returned quantity per original sale item.
    ///
    /// ## Returns
    /// Pairs of `(sale_item_id, total_returned)`; sale items with no returns
    /// are absent.
    pub async fn returned_quantities(&self, sale_id: &str) -> DbResult<Vec<(String, i64)>> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            r#"
            SELECT ri.sale_item_id, COALESCE(SUM(ri.quantity), 0)
            FROM return_items ri
            INNER JOIN returns r ON ri.return_id = r.id
            WHERE r.sale_id = ?1
            GROUP BY ri.sale_item_id
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

/// Generates a new return ID.
pub fn generate_return_id() -> String {
    Uuid::new_v4().to_string()
}

/// Generates a new return item ID.
pub fn generate_return_item_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use tempus_core::{PaymentMethod, ReturnStatus, Sale, SaleItem};

    const OWNER: &str = "owner-1";

    async fn test_db_with_sale() -> (Database, String) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let now = Utc::now();

        let sale = Sale {
            id: "sale-1".to_string(),
            owner_id: OWNER.to_string(),
            customer_name: "Ayesha Khan".to_string(),
            customer_email: None,
            customer_phone: None,
            status: SaleStatus::Completed,
            payment_method: PaymentMethod::Cash,
            notes: None,
            total_cents: 20_000,
            profit_cents: 6_000,
            invoice_number: Some("#0001".to_string()),
            created_at: now,
            updated_at: now,
        };
        let item = SaleItem {
            id: "item-1".to_string(),
            sale_id: "sale-1".to_string(),
            inventory_id: None,
            product_name: "Seiko 5".to_string(),
            sku: None,
            quantity: 2,
            price_cents: 10_000,
            cost_cents: 7_000,
            subtotal_cents: 20_000,
            created_at: now,
        };
        db.sales().insert_with_items(&sale, &[item]).await.unwrap();

        (db, "sale-1".to_string())
    }

    fn return_row(sale_id: &str, total: i64) -> Return {
        Return {
            id: generate_return_id(),
            owner_id: OWNER.to_string(),
            sale_id: sale_id.to_string(),
            reason: "customer changed mind".to_string(),
            status: ReturnStatus::Processed,
            total_cents: total,
            created_at: Utc::now(),
        }
    }

    fn return_item(return_id: &str, sale_item_id: &str, qty: i64) -> ReturnItem {
        ReturnItem {
            id: generate_return_item_id(),
            return_id: return_id.to_string(),
            sale_item_id: sale_item_id.to_string(),
            inventory_id: None,
            product_name: "Seiko 5".to_string(),
            quantity: qty,
            price_cents: 10_000,
            cost_cents: 7_000,
            subtotal_cents: qty * 10_000,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_partial_insert_keeps_sale_completed() {
        let (db, sale_id) = test_db_with_sale().await;

        let ret = return_row(&sale_id, 10_000);
        let items = vec![return_item(&ret.id, "item-1", 1)];
        db.returns()
            .insert_with_items(&ret, &items, false)
            .await
            .unwrap();

        let sale = db.sales().get_by_id(OWNER, &sale_id).await.unwrap().unwrap();
        assert_eq!(sale.status, SaleStatus::Completed);

        let stored = db.returns().get_by_sale(OWNER, &sale_id).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].total_cents, 10_000);

        let stored_items = db.returns().get_items(&ret.id).await.unwrap();
        assert_eq!(stored_items.len(), 1);
        assert_eq!(stored_items[0].sale_item_id, "item-1");
    }

    #[tokio::test]
    async fn test_full_insert_flips_sale_status() {
        let (db, sale_id) = test_db_with_sale().await;

        let ret = return_row(&sale_id, 20_000);
        let items = vec![return_item(&ret.id, "item-1", 2)];
        db.returns()
            .insert_with_items(&ret, &items, true)
            .await
            .unwrap();

        let sale = db.sales().get_by_id(OWNER, &sale_id).await.unwrap().unwrap();
        assert_eq!(sale.status, SaleStatus::Returned);
    }

    #[tokio::test]
    async fn test_returned_quantities_accumulate() {
        let (db, sale_id) = test_db_with_sale().await;
        let repo = db.returns();

        let first = return_row(&sale_id, 10_000);
        repo.insert_with_items(&first, &[return_item(&first.id, "item-1", 1)], false)
            .await
            .unwrap();

        let second = return_row(&sale_id, 10_000);
        repo.insert_with_items(&second, &[return_item(&second.id, "item-1", 1)], true)
            .await
            .unwrap();

        let sums = repo.returned_quantities(&sale_id).await.unwrap();
        assert_eq!(sums, vec![("item-1".to_string(), 2)]);
    }

    #[tokio::test]
    async fn test_unknown_sale_rolls_back() {
        let (db, _) = test_db_with_sale().await;

        let ret = Return {
            sale_id: "missing".to_string(),
            ..return_row("missing", 10_000)
        };
        // The returns.sale_id foreign key rejects the insert outright
        let err = db
            .returns()
            .insert_with_items(&ret, &[return_item(&ret.id, "item-1", 1)], true)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::ForeignKeyViolation { .. } | DbError::NotFound { .. }
        ));

        // The return row must not have survived the rollback
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM returns")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 0);
    }
}
