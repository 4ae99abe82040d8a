//! # tempus-core: Pure Business Logic for Tempus CRM
//!
//! This crate is the **heart** of Tempus CRM. It contains all business logic
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tempus CRM Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 tempus-workflow (Orchestration)                 │   │
//! │  │    save_sale, process_return, issue_invoice, advance_ticket    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ tempus-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  finance  │  │ validation│  │   │
//! │  │   │ Inventory │  │   Money   │  │SaleTotals │  │   rules   │  │   │
//! │  │   │ Sale/Ret. │  │  TaxRate  │  │TaxBreakdwn│  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    tempus-db (Database Layer)                   │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (InventoryItem, Sale, Return, ServiceTicket, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`finance`] - Sale totals, margin and tax breakdown
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//! - [`config`] - Explicit formatting/tax configuration
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod finance;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use tempus_core::Money` instead of
// `use tempus_core::money::Money`

pub use config::FormattingConfig;
pub use error::{CoreError, CoreResult, ValidationError};
pub use finance::{Line, SaleTotals, TaxBreakdown};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Stock level at or below which an item counts as low stock.
///
/// A fixed policy constant, not configurable per item or catalog in the
/// current design.
pub const LOW_STOCK_THRESHOLD: i64 = 5;

/// Maximum line items allowed on a single sale.
///
/// Prevents runaway forms and keeps transaction sizes reasonable.
pub const MAX_SALE_ITEMS: usize = 100;

/// Maximum quantity of a single line item.
///
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_LINE_QUANTITY: i64 = 999;
