//! # Workflow Error Types
//!
//! The single error surface callers of the workflow see.
//!
//! ## Taxonomy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  AuthenticationRequired   rejected before any write                    │
//! │  Core (validation/rules)  rejected before any write                    │
//! │  Db (write failure)       aborts the operation, surfaces the cause     │
//! │                                                                         │
//! │  NOT here: stock sync, invoice counter and notification failures are   │
//! │  degraded (logged and swallowed), never the operation's outcome.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use tempus_core::{CoreError, ValidationError};
use tempus_db::DbError;

/// Errors surfaced by workflow operations.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// No authenticated user identity was supplied.
    #[error("Authentication required")]
    AuthenticationRequired,

    /// A business rule or validation check failed before any write.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The persistence layer rejected a write. Earlier committed steps are
    /// not rolled back; each header+items write is itself atomic.
    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<ValidationError> for WorkflowError {
    fn from(err: ValidationError) -> Self {
        WorkflowError::Core(CoreError::Validation(err))
    }
}

/// Result type for workflow operations.
pub type WorkflowResult<T> = Result<T, WorkflowError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_wraps_into_core() {
        let err: WorkflowError = ValidationError::Required {
            field: "customer_name".to_string(),
        }
        .into();
        assert!(matches!(err, WorkflowError::Core(CoreError::Validation(_))));
        assert_eq!(
            err.to_string(),
            "Validation error: customer_name is required"
        );
    }
}
