//! # Sale Repository
//!
//! Database operations for sales and sale items.
//!
//! ## Item Replacement
//! Editing a sale replaces its whole item set (delete-all, insert-new); items
//! are never mutated individually. Header and items are written inside one
//! transaction, so a failed save can never leave a half-updated sale behind.
//! Concurrent edits of the same sale are last-write-wins.

use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use tempus_core::{Sale, SaleItem};

const SALE_COLUMNS: &str = "id, owner_id, customer_name, customer_email, customer_phone, status, \
     payment_method, notes, total_cents, profit_cents, invoice_number, created_at, updated_at";

const ITEM_COLUMNS: &str = "id, sale_id, inventory_id, product_name, sku, quantity, \
     price_cents, cost_cents, subtotal_cents, created_at";

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Gets a sale by ID.
    pub async fn get_by_id(&self, owner_id: &str, id: &str) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1 AND owner_id = ?2"
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Gets all items for a sale, oldest first.
    pub async fn get_items(&self, sale_id: &str) -> DbResult<Vec<SaleItem>> {
        let items = sqlx::query_as::<_, SaleItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM sale_items WHERE sale_id = ?1 ORDER BY created_at, id"
        ))
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Lists sales for an owner, newest first.
    pub async fn list(&self, owner_id: &str, limit: u32) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE owner_id = ?1 ORDER BY created_at DESC LIMIT ?2"
        ))
        .bind(owner_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Inserts a new sale with its items in one transaction.
    pub async fn insert_with_items(&self, sale: &Sale, items: &[SaleItem]) -> DbResult<()> {
        debug!(id = %sale.id, items = items.len(), "Inserting sale");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, owner_id, customer_name, customer_email, customer_phone,
                status, payment_method, notes, total_cents, profit_cents,
                invoice_number, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.owner_id)
        .bind(&sale.customer_name)
        .bind(&sale.customer_email)
        .bind(&sale.customer_phone)
        .bind(sale.status)
        .bind(sale.payment_method)
        .bind(&sale.notes)
        .bind(sale.total_cents)
        .bind(sale.profit_cents)
        .bind(&sale.invoice_number)
        .bind(sale.created_at)
        .bind(sale.updated_at)
        .execute(&mut *tx)
        .await?;

        insert_items(&mut tx, items).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Updates a sale header in place and replaces its whole item set,
    /// in one transaction.
    ///
    /// ## Errors
    /// * `DbError::NotFound` - no such sale for this owner
    pub async fn update_with_items(&self, sale: &Sale, items: &[SaleItem]) -> DbResult<()> {
        debug!(id = %sale.id, items = items.len(), "Updating sale");

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE sales SET
                customer_name = ?3,
                customer_email = ?4,
                customer_phone = ?5,
                status = ?6,
                payment_method = ?7,
                notes = ?8,
                total_cents = ?9,
                profit_cents = ?10,
                invoice_number = ?11,
                updated_at = ?12
            WHERE id = ?1 AND owner_id = ?2
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.owner_id)
        .bind(&sale.customer_name)
        .bind(&sale.customer_email)
        .bind(&sale.customer_phone)
        .bind(sale.status)
        .bind(sale.payment_method)
        .bind(&sale.notes)
        .bind(sale.total_cents)
        .bind(sale.profit_cents)
        .bind(&sale.invoice_number)
        .bind(sale.updated_at)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale", &sale.id));
        }

        sqlx::query("DELETE FROM sale_items WHERE sale_id = ?1")
            .bind(&sale.id)
            .execute(&mut *tx)
            .await?;

        insert_items(&mut tx, items).await?;

        tx.commit().await?;
        Ok(())
    }
}

/// Inserts a batch of sale items inside an open transaction.
async fn insert_items(tx: &mut Transaction<'_, Sqlite>, items: &[SaleItem]) -> DbResult<()> {
    for item in items {
        sqlx::query(
            r#"
            INSERT INTO sale_items (
                id, sale_id, inventory_id, product_name, sku,
                quantity, price_cents, cost_cents, subtotal_cents, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&item.id)
        .bind(&item.sale_id)
        .bind(&item.inventory_id)
        .bind(&item.product_name)
        .bind(&item.sku)
        .bind(item.quantity)
        .bind(item.price_cents)
        .bind(item.cost_cents)
        .bind(item.subtotal_cents)
        .bind(item.created_at)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

/// Generates a new sale ID.
pub fn generate_sale_id() -> String {
    Uuid::new_v4().to_string()
}

/// Generates a new sale item ID.
pub fn generate_sale_item_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
