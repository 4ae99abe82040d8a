//! # Domain Types
//!
//! Core domain types used throughout Tempus CRM.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ InventoryItem   │   │      Sale       │   │     Return      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  sku (business) │   │  invoice_number │   │  sale_id (FK)   │       │
//! │  │  stock_level    │   │  status         │   │  reason         │       │
//! │  │  stock_status   │   │  total_cents    │   │  total_cents    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   StockStatus   │   │   SaleStatus    │   │  TicketStatus   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  InStock        │   │  Quote→Pending  │   │  Received→...   │       │
//! │  │  LowStock       │   │  →Completed     │   │  →Delivered     │       │
//! │  │  OutOfStock     │   │  (see below)    │   │  (forward-only) │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID where one exists: (sku, invoice_number) - human-readable
//!
//! ## Weak References
//! `SaleItem::inventory_id` and `ReturnItem::inventory_id` are lookup-only
//! identifiers. The catalog row may be edited or deleted independently
//! without invalidating historical sale records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::LOW_STOCK_THRESHOLD;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// 1 basis point = 0.01% = 1/10000, so 1800 bps = 18% (e.g., GST).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage (for convenience).
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    /// Checks if tax rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

// =============================================================================
// Stock Status
// =============================================================================

/// Derived classification of an inventory level.
///
/// The status is never set directly; it is always computed from the level so
/// a persisted level/status pair cannot disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    /// More than [`LOW_STOCK_THRESHOLD`] units on hand.
    InStock,
    /// Between one and [`LOW_STOCK_THRESHOLD`] units on hand.
    LowStock,
    /// Zero units on hand.
    OutOfStock,
}

impl StockStatus {
    /// Derives the status for a stock level.
    ///
    /// ## Example
    /// ```rust
    /// use tempus_core::types::StockStatus;
    ///
    /// assert_eq!(StockStatus::for_level(0), StockStatus::OutOfStock);
    /// assert_eq!(StockStatus::for_level(5), StockStatus::LowStock);
    /// assert_eq!(StockStatus::for_level(6), StockStatus::InStock);
    /// ```
    pub const fn for_level(level: i64) -> Self {
        if level <= 0 {
            StockStatus::OutOfStock
        } else if level <= LOW_STOCK_THRESHOLD {
            StockStatus::LowStock
        } else {
            StockStatus::InStock
        }
    }
}

// =============================================================================
// Inventory Item
// =============================================================================

/// A stocked product in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct InventoryItem {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Account this item belongs to.
    pub owner_id: String,

    /// Display name shown on sale lines and invoices.
    pub name: String,

    /// Watch brand (e.g. "Seiko").
    pub brand: String,

    /// Stock Keeping Unit - business identifier, unique per owner.
    pub sku: String,

    /// Optional catalog category.
    pub category: Option<String>,

    /// Current stock level. Never negative.
    pub stock_level: i64,

    /// Derived stock classification; always agrees with `stock_level`.
    pub stock_status: StockStatus,

    /// Unit price in cents.
    pub price_cents: i64,

    /// Unit cost price in cents (for profit calculations).
    pub cost_cents: i64,

    /// Optional description for product details.
    pub description: Option<String>,

    /// Optional product image URL.
    pub image_url: Option<String>,

    /// When the item was created.
    pub created_at: DateTime<Utc>,

    /// When the item was last updated.
    pub updated_at: DateTime<Utc>,
}

impl InventoryItem {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Returns the cost price as a Money type.
    #[inline]
    pub fn cost_price(&self) -> Money {
        Money::from_cents(self.cost_cents)
    }

    /// Recomputes the status the stored level implies.
    #[inline]
    pub fn derived_status(&self) -> StockStatus {
        StockStatus::for_level(self.stock_level)
    }
}

// =============================================================================
// Sale Status
// =============================================================================

/// The status of a sale transaction.
///
/// ## State Machine
/// ```text
/// quote ──► pending ──► completed ──► returned
///   │           │
///   └───────────┼─────► completed   (skip-ahead along the chain)
///               └─────► cancelled
/// ```
/// `returned` and `cancelled` are terminal: no transition leaves them.
/// `completed` is the billable state: the transition into it deducts
/// inventory and issues the invoice number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    /// Price quotation, not yet a committed order.
    #[default]
    Quote,
    /// Committed order awaiting payment/fulfilment.
    Pending,
    /// Paid and fulfilled. Billable.
    Completed,
    /// Abandoned before completion.
    Cancelled,
    /// Reversed by the return processor.
    Returned,
}

impl SaleStatus {
    /// Whether this status triggers invoicing and inventory deduction.
    #[inline]
    pub const fn is_billable(&self) -> bool {
        matches!(self, SaleStatus::Completed)
    }

    /// Whether any further transition is permitted.
    #[inline]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, SaleStatus::Cancelled | SaleStatus::Returned)
    }

    /// Checks whether a transition to `target` is permitted.
    ///
    /// Staying in the same status is always allowed (an edit without a
    /// status change is not a transition).
    pub fn can_transition_to(&self, target: SaleStatus) -> bool {
        use SaleStatus::*;

        if *self == target {
            return true;
        }

        matches!(
            (*self, target),
            (Quote, Pending) | (Quote, Completed) | (Pending, Completed) | (Pending, Cancelled)
                | (Completed, Returned)
        )
    }
}

// =============================================================================
// Payment Method
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash payment.
    #[default]
    Cash,
    /// Card payment on external terminal.
    Card,
    /// Direct bank transfer.
    BankTransfer,
}

// =============================================================================
// Sale
// =============================================================================

/// A sale transaction header owned by one user account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: String,
    pub owner_id: String,
    /// Customer display name (required). Snapshot, not a foreign key.
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub status: SaleStatus,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
    /// Cache of Σ(item.quantity × item.price_cents).
    pub total_cents: i64,
    /// Cache of total minus Σ(item.quantity × item.cost_cents).
    pub profit_cents: i64,
    /// Assigned once, when the sale first reaches the billable state.
    pub invoice_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Sale {
    /// Returns the total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Returns the profit as Money.
    #[inline]
    pub fn profit(&self) -> Money {
        Money::from_cents(self.profit_cents)
    }
}

// =============================================================================
// Sale Item
// =============================================================================

/// A line item in a sale.
/// Uses snapshot pattern to freeze product data at time of sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    /// Weak reference to the catalog item, if the line is stock-tracked.
    pub inventory_id: Option<String>,
    /// Product name at time of sale (frozen).
    pub product_name: String,
    /// SKU at time of sale (frozen).
    pub sku: Option<String>,
    /// Quantity sold.
    pub quantity: i64,
    /// Unit price in cents at time of sale (frozen).
    pub price_cents: i64,
    /// Unit cost in cents at time of sale (frozen).
    pub cost_cents: i64,
    /// Line total: quantity × price.
    pub subtotal_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl SaleItem {
    /// Returns the unit price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Returns the line subtotal as Money.
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }
}

// =============================================================================
// Return
// =============================================================================

/// Processing state of a return record.
///
/// Returns are written once and never updated, so today every persisted
/// return is `Processed`. The enum leaves room for an approval step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum ReturnStatus {
    #[default]
    Processed,
}

/// A reversal record referencing exactly one completed sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Return {
    pub id: String,
    pub owner_id: String,
    pub sale_id: String,
    pub reason: String,
    pub status: ReturnStatus,
    /// Σ(item.quantity × item.price_cents) over the returned lines.
    pub total_cents: i64,
    pub created_at: DateTime<Utc>,
}

/// One returned line; a subset-with-reduced-quantity of an original SaleItem.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ReturnItem {
    pub id: String,
    pub return_id: String,
    /// The original sale item this line reverses.
    pub sale_item_id: String,
    /// Weak reference to the catalog item, carried over from the sale item.
    pub inventory_id: Option<String>,
    pub product_name: String,
    /// Quantity returned. Never exceeds the quantity originally sold.
    pub quantity: i64,
    pub price_cents: i64,
    pub cost_cents: i64,
    pub subtotal_cents: i64,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Customer
// =============================================================================

/// A customer record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Service Ticket
// =============================================================================

/// Progress of a watch service/repair job.
///
/// Forward-only: a ticket can advance (including skipping stages) but never
/// move backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    /// Watch dropped off at the counter.
    #[default]
    Received,
    /// On the workbench.
    InProgress,
    /// Work done, awaiting pickup. Triggers a customer notification.
    Ready,
    /// Picked up by the customer. Triggers a customer notification.
    Delivered,
}

impl TicketStatus {
    /// Checks whether a transition to `target` is permitted.
    pub fn can_transition_to(&self, target: TicketStatus) -> bool {
        target >= *self
    }

    /// Whether entering this status should notify the customer.
    pub const fn notifies_customer(&self) -> bool {
        matches!(self, TicketStatus::Ready | TicketStatus::Delivered)
    }
}

/// A watch service/repair ticket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ServiceTicket {
    pub id: String,
    pub owner_id: String,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub watch_brand: String,
    pub watch_model: Option<String>,
    pub issue: String,
    pub status: TicketStatus,
    pub estimated_cost_cents: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Notification Outbox
// =============================================================================

/// A queued SMS/WhatsApp message request.
/// Uses the outbox pattern: the workflow enqueues, an external sender drains.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct NotificationOutboxEntry {
    pub id: String,
    pub owner_id: String,
    /// Recipient phone number.
    pub recipient: String,
    /// Template identifier: "sale_completed", "service_ready", etc.
    pub template_id: String,
    /// Substitution variables as JSON.
    pub variables: String,
    /// The rendered message body.
    pub body: String,
    /// Number of send attempts.
    pub attempts: i64,
    /// Last error message if sending failed.
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    /// When sending was last attempted.
    pub attempted_at: Option<DateTime<Utc>>,
    /// When successfully sent.
    pub sent_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Draft Inputs
// =============================================================================

/// Schema-validated form input for creating or editing a sale.
///
/// Type/shape validation happens at the form boundary; the workflow only
/// re-checks cross-field business rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleDraft {
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub status: SaleStatus,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
    pub items: Vec<SaleItemDraft>,
}

/// One line of a [`SaleDraft`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleItemDraft {
    /// Weak reference to a catalog item; `None` for manual/custom lines,
    /// which simply skip stock tracking.
    pub inventory_id: Option<String>,
    pub product_name: String,
    pub sku: Option<String>,
    pub quantity: i64,
    pub price_cents: i64,
    pub cost_cents: i64,
}

/// One requested line of a return: which original sale item, and how many
/// units come back. Prices are taken from the original item, never the form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnItemDraft {
    pub sale_item_id: String,
    pub quantity: i64,
}

/// Input for opening a service ticket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceTicketDraft {
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub watch_brand: String,
    pub watch_model: Option<String>,
    pub issue: String,
    pub estimated_cost_cents: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tax_rate_from_bps() {
        let rate = TaxRate::from_bps(1800);
        assert_eq!(rate.bps(), 1800);
        assert!((rate.percentage() - 18.0).abs() < 0.001);
    }

    #[test]
    fn test_tax_rate_from_percentage() {
        let rate = TaxRate::from_percentage(18.0);
        assert_eq!(rate.bps(), 1800);
    }

    /// The only possible level → status mapping (no other output exists).
    #[test]
    fn test_stock_status_thresholds() {
        assert_eq!(StockStatus::for_level(0), StockStatus::OutOfStock);
        assert_eq!(StockStatus::for_level(1), StockStatus::LowStock);
        assert_eq!(StockStatus::for_level(5), StockStatus::LowStock);
        assert_eq!(StockStatus::for_level(6), StockStatus::InStock);
        assert_eq!(StockStatus::for_level(10_000), StockStatus::InStock);
    }

    #[test]
    fn test_sale_status_transitions() {
        use SaleStatus::*;

        assert!(Quote.can_transition_to(Pending));
        assert!(Quote.can_transition_to(Completed));
        assert!(Pending.can_transition_to(Completed));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Completed.can_transition_to(Returned));

        // Terminal states admit nothing
        assert!(!Returned.can_transition_to(Quote));
        assert!(!Returned.can_transition_to(Completed));
        assert!(!Cancelled.can_transition_to(Pending));

        // No going backwards
        assert!(!Completed.can_transition_to(Pending));
        assert!(!Pending.can_transition_to(Quote));

        // Same status is not a transition
        assert!(Completed.can_transition_to(Completed));
    }

    #[test]
    fn test_sale_status_flags() {
        assert!(SaleStatus::Completed.is_billable());
        assert!(!SaleStatus::Pending.is_billable());
        assert!(SaleStatus::Cancelled.is_terminal());
        assert!(SaleStatus::Returned.is_terminal());
        assert!(!SaleStatus::Quote.is_terminal());
    }

    #[test]
    fn test_ticket_status_forward_only() {
        use TicketStatus::*;

        assert!(Received.can_transition_to(InProgress));
        assert!(Received.can_transition_to(Ready));
        assert!(InProgress.can_transition_to(Delivered));
        assert!(!Ready.can_transition_to(InProgress));
        assert!(!Delivered.can_transition_to(Received));

        assert!(Ready.notifies_customer());
        assert!(Delivered.notifies_customer());
        assert!(!InProgress.notifies_customer());
    }

    #[test]
    fn test_sale_status_default() {
        assert_eq!(SaleStatus::default(), SaleStatus::Quote);
    }
}
