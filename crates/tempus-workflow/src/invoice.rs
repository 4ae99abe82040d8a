//! # Invoice Numbering
//!
//! Issues a unique, strictly increasing invoice identifier exactly once per
//! sale, only when a sale reaches the billable state.
//!
//! ## Degrade-Not-Fail
//! If the counter cannot be advanced, a time-derived pseudo-unique number is
//! issued instead of blocking the sale. The fallback is NOT guaranteed
//! collision-free (two sales in the same millisecond bucket would collide);
//! that tradeoff is accepted so a counter outage never stops the till.

use chrono::Utc;
use tracing::warn;

use tempus_db::SequenceRepository;

/// Issues invoice numbers from the shared per-owner counter.
#[derive(Debug, Clone)]
pub struct InvoiceIssuer {
    sequences: SequenceRepository,
}

impl InvoiceIssuer {
    /// Creates a new InvoiceIssuer.
    pub fn new(sequences: SequenceRepository) -> Self {
        InvoiceIssuer { sequences }
    }

    /// Returns the next invoice number for this owner.
    ///
    /// Never fails: a counter error falls back to a timestamp-derived
    /// number and is logged.
    pub async fn issue(&self, owner_id: &str) -> String {
        match self.sequences.next_invoice_value(owner_id).await {
            Ok(value) => format_invoice_number(value),
            Err(err) => {
                warn!(owner_id = %owner_id, error = %err, "Invoice counter unreachable, using timestamp fallback");
                fallback_invoice_number()
            }
        }
    }
}

/// Formats a counter value as a fixed-width invoice number, e.g. `#0001`.
///
/// Values beyond four digits print unpadded (`#12345`).
pub fn format_invoice_number(value: i64) -> String {
    format!("#{value:04}")
}

/// Last four digits of the current epoch-millisecond timestamp.
fn fallback_invoice_number() -> String {
    let millis = Utc::now().timestamp_millis();
    format!("#{:04}", millis % 10_000)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempus_db::{Database, DbConfig};

    #[test]
    fn test_format_zero_padded() {
        assert_eq!(format_invoice_number(1), "#0001");
        assert_eq!(format_invoice_number(42), "#0042");
        assert_eq!(format_invoice_number(9999), "#9999");
        assert_eq!(format_invoice_number(12345), "#12345");
    }

    #[test]
    fn test_fallback_shape() {
        let number = fallback_invoice_number();
        assert!(number.starts_with('#'));
        assert_eq!(number.len(), 5);
    }

    #[tokio::test]
    async fn test_issue_is_strictly_increasing() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let issuer = InvoiceIssuer::new(db.sequences());

        assert_eq!(issuer.issue("owner-1").await, "#0001");
        assert_eq!(issuer.issue("owner-1").await, "#0002");
        assert_eq!(issuer.issue("owner-1").await, "#0003");
    }

    #[tokio::test]
    async fn test_issue_after_closed_pool_falls_back() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let issuer = InvoiceIssuer::new(db.sequences());
        db.close().await;

        // Counter unreachable → timestamp fallback, not an error
        let number = issuer.issue("owner-1").await;
        assert!(number.starts_with('#'));
    }
}
