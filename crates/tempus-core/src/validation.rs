//! # Validation Module
//!
//! Cross-field business rule validation for workflow inputs.
//!
//! Type and shape validation (required/optional, numeric parsing, enum
//! membership) happens at the form boundary before data reaches the
//! workflow; this module re-checks only the business rules that a schema
//! cannot express.

use crate::error::ValidationError;
use crate::types::{SaleDraft, ServiceTicketDraft};
use crate::{MAX_LINE_QUANTITY, MAX_SALE_ITEMS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a customer name.
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 200 characters
pub fn validate_customer_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "customer_name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "customer_name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a product display name on a sale line.
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "product_name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "product_name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a SKU (Stock Keeping Unit).
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 50 characters
/// - Only alphanumeric characters, hyphens, underscores
///
/// ## Example
/// ```rust
/// use tempus_core::validation::validate_sku;
///
/// assert!(validate_sku("SKX-007").is_ok());
/// assert!(validate_sku("").is_err());
/// assert!(validate_sku("has space").is_err());
/// ```
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    let sku = sku.trim();

    if sku.is_empty() {
        return Err(ValidationError::Required {
            field: "sku".to_string(),
        });
    }

    if sku.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "sku".to_string(),
            max: 50,
        });
    }

    if !sku
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity.
///
/// ## Rules
/// - Must be at least 1
/// - Must not exceed [`MAX_LINE_QUANTITY`]
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price in cents. Zero is allowed (comped items).
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

// =============================================================================
// Draft Validators
// =============================================================================

/// Validates a sale draft before any write happens.
///
/// ## Rules
/// - Customer name non-empty
/// - At least one line item, at most [`MAX_SALE_ITEMS`]
/// - Every item: non-empty product name, quantity ≥ 1, price ≥ 0
pub fn validate_sale_draft(draft: &SaleDraft) -> ValidationResult<()> {
    validate_customer_name(&draft.customer_name)?;

    if draft.items.is_empty() {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }

    if draft.items.len() > MAX_SALE_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_SALE_ITEMS as i64,
        });
    }

    for item in &draft.items {
        validate_product_name(&item.product_name)?;
        validate_quantity(item.quantity)?;
        validate_price_cents(item.price_cents)?;
        validate_price_cents(item.cost_cents)?;
    }

    Ok(())
}

/// Validates a service ticket draft.
pub fn validate_ticket_draft(draft: &ServiceTicketDraft) -> ValidationResult<()> {
    validate_customer_name(&draft.customer_name)?;

    if draft.watch_brand.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "watch_brand".to_string(),
        });
    }

    if draft.issue.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "issue".to_string(),
        });
    }

    validate_price_cents(draft.estimated_cost_cents)?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PaymentMethod, SaleItemDraft, SaleStatus};

    fn draft_with_items(items: Vec<SaleItemDraft>) -> SaleDraft {
        SaleDraft {
            customer_name: "Ayesha Khan".to_string(),
            customer_email: None,
            customer_phone: None,
            status: SaleStatus::Pending,
            payment_method: PaymentMethod::Cash,
            notes: None,
            items,
        }
    }

    fn item(name: &str, qty: i64, price: i64) -> SaleItemDraft {
        SaleItemDraft {
            inventory_id: None,
            product_name: name.to_string(),
            sku: None,
            quantity: qty,
            price_cents: price,
            cost_cents: 0,
        }
    }

    #[test]
    fn test_validate_customer_name() {
        assert!(validate_customer_name("Ayesha Khan").is_ok());
        assert!(validate_customer_name("").is_err());
        assert!(validate_customer_name("   ").is_err());
        assert!(validate_customer_name(&"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_sku() {
        assert!(validate_sku("SKX-007").is_ok());
        assert!(validate_sku("casio_123").is_ok());
        assert!(validate_sku("").is_err());
        assert!(validate_sku("has space").is_err());
        assert!(validate_sku(&"A".repeat(100)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_price_cents() {
        assert!(validate_price_cents(0).is_ok());
        assert!(validate_price_cents(1099).is_ok());
        assert!(validate_price_cents(-100).is_err());
    }

    #[test]
    fn test_draft_requires_items() {
        let err = validate_sale_draft(&draft_with_items(vec![])).unwrap_err();
        assert!(matches!(err, ValidationError::Required { .. }));
    }

    #[test]
    fn test_draft_rejects_bad_item() {
        let draft = draft_with_items(vec![item("Seiko 5", 0, 10_000)]);
        assert!(validate_sale_draft(&draft).is_err());

        let draft = draft_with_items(vec![item("", 1, 10_000)]);
        assert!(validate_sale_draft(&draft).is_err());

        let draft = draft_with_items(vec![item("Seiko 5", 1, -1)]);
        assert!(validate_sale_draft(&draft).is_err());
    }

    #[test]
    fn test_draft_ok() {
        let draft = draft_with_items(vec![item("Seiko 5", 2, 10_000)]);
        assert!(validate_sale_draft(&draft).is_ok());
    }
}
