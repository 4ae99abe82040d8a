//! # tempus-workflow: Sale / Return / Invoice Orchestration
//!
//! The workflow layer that keeps stock levels, sale records, invoice
//! numbering and returns mutually consistent across create, update and
//! return paths.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   tempus-workflow (THIS CRATE)                          │
//! │                                                                         │
//! │   ┌──────────────┐  ┌─────────────────┐  ┌───────────────────────┐    │
//! │   │ SaleWorkflow │  │ ReturnProcessor │  │    ServiceWorkflow    │    │
//! │   │  save_sale   │  │ process_return  │  │ open/advance_ticket   │    │
//! │   └──────┬───────┘  └────────┬────────┘  └───────────┬───────────┘    │
//! │          │                   │                       │                 │
//! │          ▼                   ▼                       ▼                 │
//! │   ┌──────────────┐  ┌─────────────────┐  ┌───────────────────────┐    │
//! │   │InvoiceIssuer │  │  Inventory      │  │       Notifier        │    │
//! │   │ (sequence +  │  │  Ledger         │  │  (template → outbox,  │    │
//! │   │  fallback)   │  │  (stock deltas) │  │   fire-and-forget)    │    │
//! │   └──────────────┘  └─────────────────┘  └───────────────────────┘    │
//! │                                                                         │
//! │   Rules from tempus-core • Persistence from tempus-db                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Failure Policy
//!
//! - Validation and authentication errors reject before any write.
//! - A rejected header/items write aborts the operation and surfaces the
//!   underlying message; each header+items write is itself one transaction.
//! - Stock sync, invoice counter and notification failures are degraded:
//!   logged, swallowed, and the operation still reports success.
//!
//! ## Example
//!
//! ```rust,ignore
//! use tempus_core::FormattingConfig;
//! use tempus_db::{Database, DbConfig};
//! use tempus_workflow::{SaleWorkflow, UserContext};
//!
//! let db = Database::new(DbConfig::new("./tempus.db")).await?;
//! let workflow = SaleWorkflow::new(db, FormattingConfig::default());
//! let user = UserContext::new(session.user_id);
//!
//! let sale_id = workflow.save_sale(&user, None, &draft).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod context;
pub mod error;
pub mod invoice;
pub mod notification;
pub mod returns;
pub mod sale;
pub mod service;

// =============================================================================
// Re-exports
// =============================================================================

pub use context::UserContext;
pub use error::{WorkflowError, WorkflowResult};
pub use invoice::{format_invoice_number, InvoiceIssuer};
pub use notification::{
    render_template, Notifier, TEMPLATE_SALE_COMPLETED, TEMPLATE_SERVICE_DELIVERED,
    TEMPLATE_SERVICE_READY,
};
pub use returns::ReturnProcessor;
pub use sale::SaleWorkflow;
pub use service::ServiceWorkflow;
