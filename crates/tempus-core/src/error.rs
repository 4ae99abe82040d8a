//! # Error Types
//!
//! Domain-specific error types for tempus-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tempus-core errors (this file)                                        │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  tempus-db errors (separate crate)                                     │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  tempus-workflow errors (separate crate)                               │
//! │  └── WorkflowError    - What callers of the workflow see               │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → WorkflowError → Caller            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (SKU, ID, quantities)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

use crate::types::SaleStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations. They are checked before
/// any write happens, so surfacing one implies zero side effects.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Sale cannot be found.
    #[error("Sale not found: {0}")]
    SaleNotFound(String),

    /// Inventory item cannot be found.
    #[error("Inventory item not found: {0}")]
    InventoryNotFound(String),

    /// The requested status change is not a legal transition.
    #[error("Sale {sale_id} is {from:?}, cannot move to {to:?}")]
    InvalidStatusTransition {
        sale_id: String,
        from: SaleStatus,
        to: SaleStatus,
    },

    /// Returns are only accepted against completed sales.
    #[error("Only completed sales can be returned; sale {sale_id} is {status:?}")]
    SaleNotReturnable {
        sale_id: String,
        status: SaleStatus,
    },

    /// A return asked for more units than remain returnable.
    ///
    /// The bound is `sold − already returned`, enforced here at the
    /// processing boundary rather than only in a form widget.
    #[error(
        "Cannot return {requested} × {product}: sold {sold}, already returned {already_returned}"
    )]
    ReturnExceedsSold {
        product: String,
        sold: i64,
        already_returned: i64,
        requested: i64,
    },

    /// A return referenced a line that is not part of the sale.
    #[error("Sale item {sale_item_id} does not belong to sale {sale_id}")]
    ReturnItemUnknown {
        sale_id: String,
        sale_item_id: String,
    },

    /// Service ticket cannot be found.
    #[error("Service ticket not found: {0}")]
    TicketNotFound(String),

    /// Service tickets only move forward.
    #[error("Ticket {ticket_id} is {from}, cannot move back to {to}")]
    InvalidTicketTransition {
        ticket_id: String,
        from: String,
        to: String,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, bad characters).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
