//! # Financial Calculator
//!
//! Pure, stateless sale arithmetic: line totals, cost, profit, margin and
//! the tax breakdown shown on invoices.
//!
//! ## Where Totals Come From
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Sale Totals Data Flow                              │
//! │                                                                         │
//! │  SaleItemDraft { quantity, price, cost_price }                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Line::new(...)  ──►  SaleTotals::from_lines(&[Line])                   │
//! │       │                         │                                       │
//! │       │                         ├── total   = Σ(qty × price)           │
//! │       │                         ├── cost    = Σ(qty × cost_price)      │
//! │       │                         └── profit  = total − cost             │
//! │       ▼                                                                 │
//! │  Persisted on the sale header as total_cents / profit_cents            │
//! │  (denormalized caches, never independently editable)                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! No side effects and no error conditions: malformed numeric input is the
//! caller's boundary problem, not this module's.

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::TaxRate;

// =============================================================================
// Line
// =============================================================================

/// One line of a sale or return, reduced to the amounts that matter for math.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line {
    /// Units sold (positive).
    pub quantity: i64,
    /// Unit price.
    pub price: Money,
    /// Unit cost price.
    pub cost_price: Money,
}

impl Line {
    /// Creates a line from raw cents.
    #[inline]
    pub const fn new(quantity: i64, price_cents: i64, cost_cents: i64) -> Self {
        Line {
            quantity,
            price: Money::from_cents(price_cents),
            cost_price: Money::from_cents(cost_cents),
        }
    }

    /// Line subtotal: `quantity × price`.
    #[inline]
    pub const fn subtotal(&self) -> Money {
        self.price.multiply_quantity(self.quantity)
    }

    /// Line cost: `quantity × cost_price`.
    #[inline]
    pub const fn cost_subtotal(&self) -> Money {
        self.cost_price.multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Sale Totals
// =============================================================================

/// Aggregate money amounts for a set of lines.
///
/// ## Example
/// ```rust
/// use tempus_core::finance::{Line, SaleTotals};
///
/// // 2 × Rs 100.00 (cost Rs 70.00 each)
/// let totals = SaleTotals::from_lines(&[Line::new(2, 10_000, 7_000)]);
/// assert_eq!(totals.total.cents(), 20_000);
/// assert_eq!(totals.profit.cents(), 6_000);
/// assert!((totals.margin_percentage() - 30.0).abs() < f64::EPSILON);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SaleTotals {
    /// Σ(quantity × price).
    pub total: Money,
    /// Σ(quantity × cost_price).
    pub cost: Money,
    /// `total − cost`.
    pub profit: Money,
}

impl SaleTotals {
    /// Computes totals over a set of lines.
    pub fn from_lines(lines: &[Line]) -> Self {
        let total: Money = lines.iter().map(Line::subtotal).sum();
        let cost: Money = lines.iter().map(Line::cost_subtotal).sum();

        SaleTotals {
            total,
            cost,
            profit: total - cost,
        }
    }

    /// Profit margin as a percentage of the total.
    ///
    /// Defined as `0.0` when the total is zero. Division by zero on an empty
    /// or fully comped sale is an edge-case policy, not an error.
    pub fn margin_percentage(&self) -> f64 {
        if self.total.is_zero() {
            return 0.0;
        }

        self.profit.cents() as f64 / self.total.cents() as f64 * 100.0
    }
}

// =============================================================================
// Tax Breakdown
// =============================================================================

/// A tax-inclusive total split into its pre-tax amount and tax portion.
///
/// Used only for invoice display; stock and totals logic never consult it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBreakdown {
    /// The amount before tax.
    pub before_tax: Money,
    /// The tax portion: `total − before_tax`.
    pub tax: Money,
}

impl TaxBreakdown {
    /// Back-computes the breakdown from a tax-inclusive total.
    ///
    /// `before_tax = total / (1 + rate)`, rounded to the nearest cent with
    /// integer math (i128 to avoid overflow on large amounts).
    ///
    /// ## Example
    /// ```rust
    /// use tempus_core::finance::TaxBreakdown;
    /// use tempus_core::money::Money;
    /// use tempus_core::types::TaxRate;
    ///
    /// // Rs 118.00 including 18% GST
    /// let split = TaxBreakdown::from_inclusive(Money::from_cents(11_800), TaxRate::from_bps(1_800));
    /// assert_eq!(split.before_tax.cents(), 10_000);
    /// assert_eq!(split.tax.cents(), 1_800);
    /// ```
    pub fn from_inclusive(total: Money, rate: TaxRate) -> Self {
        if rate.is_zero() {
            return TaxBreakdown {
                before_tax: total,
                tax: Money::zero(),
            };
        }

        let divisor = 10_000i128 + rate.bps() as i128;
        let before = (total.cents() as i128 * 10_000 + divisor / 2) / divisor;
        let before_tax = Money::from_cents(before as i64);

        TaxBreakdown {
            before_tax,
            tax: total - before_tax,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
