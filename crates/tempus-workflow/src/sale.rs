//! # Sale Transaction Manager
//!
//! The single entry point for creating or editing a sale plus its items,
//! and for triggering downstream effects.
//!
//! ## Save Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        save_sale(user, id?, draft)                      │
//! │                                                                         │
//! │  1. require authenticated user          ── reject before any write     │
//! │  2. validate draft (name, items, ...)   ── reject before any write     │
//! │  3. check status transition legality    ── reject before any write     │
//! │  4. compute totals (Financial Calculator)                              │
//! │  5. issue invoice number                ── only on first entry into    │
//! │                                            the billable state          │
//! │  6. write header + replaced item set    ── ONE transaction             │
//! │  7. deduct stock per inventory-linked   ── after commit;               │
//! │     line (billable transition only)        degrade-not-fail            │
//! │  8. queue customer notification         ── fire-and-forget             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Step 7 runs only when this save moves the sale INTO the billable state
//! from a non-billable one (including creating it as completed outright), so
//! repeated edits of a completed sale can never deduct twice.

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::context::UserContext;
use crate::error::WorkflowResult;
use crate::invoice::InvoiceIssuer;
use crate::notification::{Notifier, TEMPLATE_SALE_COMPLETED};
use tempus_core::validation::validate_sale_draft;
use tempus_core::{CoreError, FormattingConfig, Line, Sale, SaleDraft, SaleItem, SaleTotals};
use tempus_db::repository::sale::{generate_sale_id, generate_sale_item_id};
use tempus_db::Database;

/// Orchestrates sale creation, edits and completion side effects.
#[derive(Debug, Clone)]
pub struct SaleWorkflow {
    db: Database,
    issuer: InvoiceIssuer,
    notifier: Notifier,
    formatting: FormattingConfig,
}

impl SaleWorkflow {
    /// Creates a new SaleWorkflow.
    pub fn new(db: Database, formatting: FormattingConfig) -> Self {
        let issuer = InvoiceIssuer::new(db.sequences());
        let notifier = Notifier::new(db.outbox());
        SaleWorkflow {
            db,
            issuer,
            notifier,
            formatting,
        }
    }

    /// Creates (`existing_sale_id = None`) or edits a sale.
    ///
    /// Editing replaces the whole item set; concurrent edits of the same
    /// sale are last-write-wins.
    ///
    /// ## Returns
    /// The sale's identifier.
    pub async fn save_sale(
        &self,
        user: &UserContext,
        existing_sale_id: Option<&str>,
        draft: &SaleDraft,
    ) -> WorkflowResult<String> {
        let owner_id = user.require()?;
        validate_sale_draft(draft)?;

        let existing = match existing_sale_id {
            Some(id) => Some(
                self.db
                    .sales()
                    .get_by_id(owner_id, id)
                    .await?
                    .ok_or_else(|| CoreError::SaleNotFound(id.to_string()))?,
            ),
            None => None,
        };

        if let Some(sale) = &existing {
            if !sale.status.can_transition_to(draft.status) {
                return Err(CoreError::InvalidStatusTransition {
                    sale_id: sale.id.clone(),
                    from: sale.status,
                    to: draft.status,
                }
                .into());
            }
        }

        let lines: Vec<Line> = draft
            .items
            .iter()
            .map(|i| Line::new(i.quantity, i.price_cents, i.cost_cents))
            .collect();
        let totals = SaleTotals::from_lines(&lines);

        let was_billable = existing
            .as_ref()
            .map(|s| s.status.is_billable())
            .unwrap_or(false);
        let becomes_billable = draft.status.is_billable();

        // Assigned once; subsequent edits keep the existing number.
        let invoice_number = match &existing {
            Some(sale) if sale.invoice_number.is_some() => sale.invoice_number.clone(),
            _ if becomes_billable => Some(self.issuer.issue(owner_id).await),
            _ => None,
        };

        let now = Utc::now();
        let sale_id = existing
            .as_ref()
            .map(|s| s.id.clone())
            .unwrap_or_else(generate_sale_id);

        let sale = Sale {
            id: sale_id.clone(),
            owner_id: owner_id.to_string(),
            customer_name: draft.customer_name.trim().to_string(),
            customer_email: draft.customer_email.clone(),
            customer_phone: draft.customer_phone.clone(),
            status: draft.status,
            payment_method: draft.payment_method,
            notes: draft.notes.clone(),
            total_cents: totals.total.cents(),
            profit_cents: totals.profit.cents(),
            invoice_number,
            created_at: existing.as_ref().map(|s| s.created_at).unwrap_or(now),
            updated_at: now,
        };

        let items: Vec<SaleItem> = draft
            .items
            .iter()
            .map(|i| SaleItem {
                id: generate_sale_item_id(),
                sale_id: sale_id.clone(),
                inventory_id: i.inventory_id.clone(),
                product_name: i.product_name.trim().to_string(),
                sku: i.sku.clone(),
                quantity: i.quantity,
                price_cents: i.price_cents,
                cost_cents: i.cost_cents,
                subtotal_cents: i.quantity * i.price_cents,
                created_at: now,
            })
            .collect();

        // Header and items land in one transaction; the stock sync below
        // only ever sees a durably saved sale.
        if existing.is_some() {
            self.db.sales().update_with_items(&sale, &items).await?;
        } else {
            self.db.sales().insert_with_items(&sale, &items).await?;
        }

        if becomes_billable && !was_billable {
            self.deduct_stock(owner_id, &items).await;

            if let Some(phone) = &sale.customer_phone {
                self.notifier
                    .notify(
                        owner_id,
                        phone,
                        TEMPLATE_SALE_COMPLETED,
                        &[
                            ("customer_name", sale.customer_name.clone()),
                            (
                                "invoice_number",
                                sale.invoice_number.clone().unwrap_or_default(),
                            ),
                            ("total", self.formatting.format_money(sale.total())),
                        ],
                    )
                    .await;
            }
        }

        info!(
            sale_id = %sale_id,
            status = ?sale.status,
            total_cents = %sale.total_cents,
            "Sale saved"
        );

        Ok(sale_id)
    }

    /// Deducts stock for every inventory-linked line.
    ///
    /// Degrade-not-fail: a failed deduction leaves the sale saved and is
    /// only logged. Unlinked lines skip stock tracking entirely.
    async fn deduct_stock(&self, owner_id: &str, items: &[SaleItem]) {
        for item in items {
            let Some(inventory_id) = &item.inventory_id else {
                continue;
            };

            match self
                .db
                .inventory()
                .apply_stock_delta(owner_id, inventory_id, -item.quantity)
                .await
            {
                Ok((level, status)) => {
                    debug!(
                        inventory_id = %inventory_id,
                        level = %level,
                        status = ?status,
                        "Stock deducted"
                    );
                }
                Err(err) => {
                    warn!(
                        inventory_id = %inventory_id,
                        error = %err,
                        "Stock deduction failed; sale is saved, inventory needs manual sync"
                    );
                }
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
