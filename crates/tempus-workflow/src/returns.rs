//! # Return Processor
//!
//! Reverses part or all of a completed sale.
//!
//! ## Return Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              process_return(user, sale_id, reason, items)               │
//! │                                                                         │
//! │  1. require authenticated user          ── reject before any write     │
//! │  2. sale must exist and be completed    ── reject before any write     │
//! │  3. per item: requested + previously    ── reject before any write     │
//! │     returned must not exceed sold          (hard bound, not UI-only)   │
//! │  4. compute total from ORIGINAL prices                                 │
//! │  5. write return + items; on a TOTAL    ── ONE transaction             │
//! │     return also flip the sale to                                       │
//! │     `returned`                                                         │
//! │  6. restore stock per inventory-linked  ── after commit;               │
//! │     line                                   degrade-not-fail            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Amounts come from the original sale items, never from the request, so a
//! client cannot invent refund prices. The quantity bound counts earlier
//! partial returns of the same line; a partial return leaves the sale
//! `completed` so the remainder can still come back later, and only the
//! return that exhausts every line flips the sale to `returned`.

use chrono::Utc;
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::context::UserContext;
use crate::error::WorkflowResult;
use tempus_core::validation::validate_quantity;
use tempus_core::{
    CoreError, Line, Return, ReturnItem, ReturnItemDraft, ReturnStatus, SaleItem, SaleTotals,
    ValidationError,
};
use tempus_db::repository::returns::{generate_return_id, generate_return_item_id};
use tempus_db::Database;

/// Orchestrates sale reversals.
#[derive(Debug, Clone)]
pub struct ReturnProcessor {
    db: Database,
}

impl ReturnProcessor {
    /// Creates a new ReturnProcessor.
    pub fn new(db: Database) -> Self {
        ReturnProcessor { db }
    }

    /// Processes a return against a completed sale.
    ///
    /// ## Returns
    /// The new return record's identifier.
    pub async fn process_return(
        &self,
        user: &UserContext,
        sale_id: &str,
        reason: &str,
        requested: &[ReturnItemDraft],
    ) -> WorkflowResult<String> {
        let owner_id = user.require()?;

        if reason.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "reason".to_string(),
            }
            .into());
        }

        if requested.is_empty() {
            return Err(ValidationError::Required {
                field: "items".to_string(),
            }
            .into());
        }

        for item in requested {
            validate_quantity(item.quantity)?;
        }

        let sale = self
            .db
            .sales()
            .get_by_id(owner_id, sale_id)
            .await?
            .ok_or_else(|| CoreError::SaleNotFound(sale_id.to_string()))?;

        if !sale.status.is_billable() {
            return Err(CoreError::SaleNotReturnable {
                sale_id: sale_id.to_string(),
                status: sale.status,
            }
            .into());
        }

        let originals: HashMap<String, SaleItem> = self
            .db
            .sales()
            .get_items(sale_id)
            .await?
            .into_iter()
            .map(|i| (i.id.clone(), i))
            .collect();

        let already_returned: HashMap<String, i64> = self
            .db
            .returns()
            .returned_quantities(sale_id)
            .await?
            .into_iter()
            .collect();

        // Fold duplicate lines in the request before checking the bound.
        let mut requested_per_item: HashMap<&str, i64> = HashMap::new();
        for item in requested {
            *requested_per_item
                .entry(item.sale_item_id.as_str())
                .or_insert(0) += item.quantity;
        }

        for (sale_item_id, quantity) in &requested_per_item {
            let original =
                originals
                    .get(*sale_item_id)
                    .ok_or_else(|| CoreError::ReturnItemUnknown {
                        sale_id: sale_id.to_string(),
                        sale_item_id: sale_item_id.to_string(),
                    })?;

            let prior = already_returned.get(*sale_item_id).copied().unwrap_or(0);
            if prior + quantity > original.quantity {
                return Err(CoreError::ReturnExceedsSold {
                    product: original.product_name.clone(),
                    sold: original.quantity,
                    already_returned: prior,
                    requested: *quantity,
                }
                .into());
            }
        }

        let return_id = generate_return_id();
        let now = Utc::now();

        let items: Vec<ReturnItem> = requested_per_item
            .iter()
            .map(|(sale_item_id, quantity)| {
                let original = &originals[*sale_item_id];
                ReturnItem {
                    id: generate_return_item_id(),
                    return_id: return_id.clone(),
                    sale_item_id: sale_item_id.to_string(),
                    inventory_id: original.inventory_id.clone(),
                    product_name: original.product_name.clone(),
                    quantity: *quantity,
                    price_cents: original.price_cents,
                    cost_cents: original.cost_cents,
                    subtotal_cents: quantity * original.price_cents,
                    created_at: now,
                }
            })
            .collect();

        let lines: Vec<Line> = items
            .iter()
            .map(|i| Line::new(i.quantity, i.price_cents, i.cost_cents))
            .collect();
        let totals = SaleTotals::from_lines(&lines);

        let ret = Return {
            id: return_id.clone(),
            owner_id: owner_id.to_string(),
            sale_id: sale_id.to_string(),
            reason: reason.trim().to_string(),
            status: ReturnStatus::Processed,
            total_cents: totals.total.cents(),
            created_at: now,
        };

        // Fully returned once every sold unit of every line has come back.
        let fully_returned = originals.values().all(|original| {
            let prior = already_returned.get(&original.id).copied().unwrap_or(0);
            let now_requested = requested_per_item
                .get(original.id.as_str())
                .copied()
                .unwrap_or(0);
            prior + now_requested >= original.quantity
        });

        // Return, items and (on a total return) the parent sale's flip
        // commit together; stock restoration only runs afterwards.
        self.db
            .returns()
            .insert_with_items(&ret, &items, fully_returned)
            .await?;

        self.restore_stock(owner_id, &items).await;

        info!(
            return_id = %return_id,
            sale_id = %sale_id,
            total_cents = %ret.total_cents,
            "Return processed"
        );

        Ok(return_id)
    }

    /// Restores stock for every inventory-linked returned line.
    ///
    /// Degrade-not-fail, mirroring sale completion.
    async fn restore_stock(&self, owner_id: &str, items: &[ReturnItem]) {
        for item in items {
            let Some(inventory_id) = &item.inventory_id else {
                continue;
            };

            match self
                .db
                .inventory()
                .apply_stock_delta(owner_id, inventory_id, item.quantity)
                .await
            {
                Ok((level, status)) => {
                    debug!(
                        inventory_id = %inventory_id,
                        level = %level,
                        status = ?status,
                        "Stock restored"
                    );
                }
                Err(err) => {
                    warn!(
                        inventory_id = %inventory_id,
                        error = %err,
                        "Stock restoration failed; return is saved, inventory needs manual sync"
                    );
                }
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sale::SaleWorkflow;
    use tempus_core::{
        FormattingConfig, InventoryItem, PaymentMethod, SaleDraft, SaleItemDraft, SaleStatus,
        StockStatus,
    };
    use tempus_db::DbConfig;

    const USER: &str = "user-1";

    /// Seeds a watch with stock 6 and a completed sale of 2 units against
    /// it, leaving the stock at 4.
    async fn setup_completed_sale() -> (ReturnProcessor, Database, UserContext, String, String) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let user = UserContext::new(USER);
        let now = Utc::now();

        db.inventory()
            .insert(&InventoryItem {
                id: "inv-1".to_string(),
                owner_id: USER.to_string(),
                name: "Seiko 5".to_string(),
                brand: "Seiko".to_string(),
                sku: "SKX-007".to_string(),
                category: None,
                stock_level: 6,
                stock_status: StockStatus::InStock,
                price_cents: 10_000,
                cost_cents: 7_000,
                description: None,
                image_url: None,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();

        let workflow = SaleWorkflow::new(db.clone(), FormattingConfig::default());
        let sale_id = workflow
            .save_sale(
                &user,
                None,
                &SaleDraft {
                    customer_name: "Ayesha Khan".to_string(),
                    customer_email: None,
                    customer_phone: None,
                    status: SaleStatus::Completed,
                    payment_method: PaymentMethod::Cash,
                    notes: None,
                    items: vec![SaleItemDraft {
                        inventory_id: Some("inv-1".to_string()),
                        product_name: "Seiko 5".to_string(),
                        sku: Some("SKX-007".to_string()),
                        quantity: 2,
                        price_cents: 10_000,
                        cost_cents: 7_000,
                    }],
                },
            )
            .await
            .unwrap();

        let item_id = db.sales().get_items(&sale_id).await.unwrap()[0].id.clone();
        let processor = ReturnProcessor::new(db.clone());

        (processor, db, user, sale_id, item_id)
    }

    fn wanted(item_id: &str, qty: i64) -> Vec<ReturnItemDraft> {
        vec![ReturnItemDraft {
            sale_item_id: item_id.to_string(),
            quantity: qty,
        }]
    }

    /// Partial return: 1 of 2 units restores stock 4 → 5 and records the
    /// amount at the original price.
    #[tokio::test]
    async fn test_partial_return_restores_stock() {
        let (processor, db, user, sale_id, item_id) = setup_completed_sale().await;

        let return_id = processor
            .process_return(&user, &sale_id, "scratched bezel", &wanted(&item_id, 1))
            .await
            .unwrap();

        let item = db.inventory().get_by_id(USER, "inv-1").await.unwrap().unwrap();
        assert_eq!(item.stock_level, 5);
        assert_eq!(item.stock_status, StockStatus::LowStock);

        let returns = db.returns().get_by_sale(USER, &sale_id).await.unwrap();
        assert_eq!(returns.len(), 1);
        assert_eq!(returns[0].id, return_id);
        assert_eq!(returns[0].total_cents, 10_000);

        // A partial return leaves the sale completed (the other unit can
        // still come back later)
        let sale = db.sales().get_by_id(USER, &sale_id).await.unwrap().unwrap();
        assert_eq!(sale.status, SaleStatus::Completed);
    }

    /// Returning every sold unit flips the parent sale to `returned`.
    #[tokio::test]
    async fn test_total_return_flips_sale() {
        let (processor, db, user, sale_id, item_id) = setup_completed_sale().await;

        processor
            .process_return(&user, &sale_id, "full refund", &wanted(&item_id, 2))
            .await
            .unwrap();

        let sale = db.sales().get_by_id(USER, &sale_id).await.unwrap().unwrap();
        assert_eq!(sale.status, SaleStatus::Returned);

        let item = db.inventory().get_by_id(USER, "inv-1").await.unwrap().unwrap();
        assert_eq!(item.stock_level, 6);
        assert_eq!(item.stock_status, StockStatus::InStock);
    }

    /// Requesting more than was sold is hard-rejected and restores nothing.
    #[tokio::test]
    async fn test_over_quantity_rejected() {
        let (processor, db, user, sale_id, item_id) = setup_completed_sale().await;

        let err = processor
            .process_return(&user, &sale_id, "changed mind", &wanted(&item_id, 3))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::WorkflowError::Core(CoreError::ReturnExceedsSold { .. })
        ));

        let item = db.inventory().get_by_id(USER, "inv-1").await.unwrap().unwrap();
        assert_eq!(item.stock_level, 4);
        assert!(db.returns().get_by_sale(USER, &sale_id).await.unwrap().is_empty());
    }

    /// The bound counts earlier partial returns: 2 sold, 1 returned, a
    /// second return of 2 must fail while a second return of 1 succeeds
    /// (and, being the last unit, flips the sale).
    #[tokio::test]
    async fn test_bound_includes_prior_returns() {
        let (processor, db, user, sale_id, item_id) = setup_completed_sale().await;

        processor
            .process_return(&user, &sale_id, "first", &wanted(&item_id, 1))
            .await
            .unwrap();

        let err = processor
            .process_return(&user, &sale_id, "second", &wanted(&item_id, 2))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::WorkflowError::Core(CoreError::ReturnExceedsSold { .. })
        ));

        let item = db.inventory().get_by_id(USER, "inv-1").await.unwrap().unwrap();
        assert_eq!(item.stock_level, 5);

        processor
            .process_return(&user, &sale_id, "second", &wanted(&item_id, 1))
            .await
            .unwrap();

        let item = db.inventory().get_by_id(USER, "inv-1").await.unwrap().unwrap();
        assert_eq!(item.stock_level, 6);

        let sale = db.sales().get_by_id(USER, &sale_id).await.unwrap().unwrap();
        assert_eq!(sale.status, SaleStatus::Returned);
    }

    /// Duplicate lines for the same sale item are folded before the bound
    /// check: 1 + 2 > 2 sold must fail even though each line alone passes.
    #[tokio::test]
    async fn test_duplicate_lines_folded() {
        let (processor, _db, user, sale_id, item_id) = setup_completed_sale().await;

        let request = vec![
            ReturnItemDraft {
                sale_item_id: item_id.clone(),
                quantity: 1,
            },
            ReturnItemDraft {
                sale_item_id: item_id.clone(),
                quantity: 2,
            },
        ];

        let err = processor
            .process_return(&user, &sale_id, "split", &request)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::WorkflowError::Core(CoreError::ReturnExceedsSold { .. })
        ));
    }

    #[tokio::test]
    async fn test_only_completed_sales_returnable() {
        let (processor, db, user, _sale_id, _item_id) = setup_completed_sale().await;

        let workflow = SaleWorkflow::new(db.clone(), FormattingConfig::default());
        let pending_id = workflow
            .save_sale(
                &user,
                None,
                &SaleDraft {
                    customer_name: "Bilal".to_string(),
                    customer_email: None,
                    customer_phone: None,
                    status: SaleStatus::Pending,
                    payment_method: PaymentMethod::Cash,
                    notes: None,
                    items: vec![SaleItemDraft {
                        inventory_id: None,
                        product_name: "Strap".to_string(),
                        sku: None,
                        quantity: 1,
                        price_cents: 1_500,
                        cost_cents: 500,
                    }],
                },
            )
            .await
            .unwrap();

        let items = db.sales().get_items(&pending_id).await.unwrap();
        let err = processor
            .process_return(&user, &pending_id, "nope", &wanted(&items[0].id, 1))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::WorkflowError::Core(CoreError::SaleNotReturnable { .. })
        ));
    }

    #[tokio::test]
    async fn test_unknown_sale_item_rejected() {
        let (processor, _db, user, sale_id, _item_id) = setup_completed_sale().await;

        let err = processor
            .process_return(&user, &sale_id, "bad id", &wanted("not-an-item", 1))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::WorkflowError::Core(CoreError::ReturnItemUnknown { .. })
        ));
    }

    #[tokio::test]
    async fn test_reason_required() {
        let (processor, _db, user, sale_id, item_id) = setup_completed_sale().await;

        let err = processor
            .process_return(&user, &sale_id, "   ", &wanted(&item_id, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, crate::error::WorkflowError::Core(_)));
    }
}
