//! # Input Validation
//!
//! Request validation helpers shared by the store services.
//!
//! Validation runs BEFORE any document write is issued, so a rejected
//! request never leaves partial state behind. The projection's own
//! primitives stay permissive (withdraw clamps); the policy that rejects
//! over-withdrawals and empty carts lives here.

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::projection::StockProjection;
use crate::types::SaleDraft;

/// Maximum length for a product name.
pub const MAX_PRODUCT_NAME_LENGTH: usize = 100;

/// Validates a product name: non-blank after trimming, bounded length.
pub fn validate_product_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "productName".to_string(),
        });
    }
    if name.len() > MAX_PRODUCT_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: "productName".to_string(),
            max: MAX_PRODUCT_NAME_LENGTH,
        });
    }
    Ok(())
}

/// Validates a stock quantity: strictly positive.
pub fn validate_quantity(quantity: i64) -> Result<(), ValidationError> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    Ok(())
}

/// Validates a withdrawal request against the current stock level.
///
/// A product with no stock today is reported as such rather than as an
/// insufficient quantity, since "absent" and "has 4 left" read differently
/// on the form.
pub fn validate_withdrawal(product_name: &str, requested: i64, available: i64) -> CoreResult<()> {
    validate_product_name(product_name)?;
    validate_quantity(requested)?;
    if available <= 0 {
        return Err(CoreError::ProductNotInStock(product_name.to_string()));
    }
    if requested > available {
        return Err(CoreError::InsufficientStock {
            product: product_name.to_string(),
            available,
            requested,
        });
    }
    Ok(())
}

/// Validates a checkout draft against today's projection.
///
/// Every cart line must name a product with enough stock; the first
/// violation aborts the whole sale before anything is written.
pub fn validate_checkout(draft: &SaleDraft, stock: &StockProjection) -> CoreResult<()> {
    if draft.items.is_empty() {
        return Err(CoreError::EmptySale);
    }
    if draft.payment_method.trim().is_empty() {
        return Err(CoreError::Validation(ValidationError::Required {
            field: "paymentMethod".to_string(),
        }));
    }
    for item in &draft.items {
        validate_product_name(&item.product_name)?;
        validate_quantity(item.quantity)?;
        let available = stock.quantity(&item.product_name);
        if item.quantity > available {
            return Err(CoreError::InsufficientStock {
                product: item.product_name.clone(),
                available,
                requested: item.quantity,
            });
        }
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SaleItem;

    #[test]
    fn test_product_name_rules() {
        assert!(validate_product_name("Marraqueta").is_ok());
        assert!(validate_product_name("  ").is_err());
        assert!(validate_product_name(&"x".repeat(101)).is_err());
    }

    #[test]
    fn test_quantity_must_be_positive() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-3).is_err());
    }

    #[test]
    fn test_withdrawal_rejects_overdraw() {
        assert!(validate_withdrawal("Pan", 3, 4).is_ok());
        assert!(matches!(
            validate_withdrawal("Pan", 10, 4),
            Err(CoreError::InsufficientStock {
                available: 4,
                requested: 10,
                ..
            })
        ));
        assert!(matches!(
            validate_withdrawal("Pan", 1, 0),
            Err(CoreError::ProductNotInStock(_))
        ));
    }

    #[test]
    fn test_checkout_rules() {
        let mut stock = StockProjection::new();
        stock.add_new("Marraqueta", 5).unwrap();

        let ok = SaleDraft::new(vec![SaleItem::new("Marraqueta", 5.0, 2)], "efectivo");
        assert!(validate_checkout(&ok, &stock).is_ok());

        let empty = SaleDraft::new(vec![], "efectivo");
        assert!(matches!(
            validate_checkout(&empty, &stock),
            Err(CoreError::EmptySale)
        ));

        let over = SaleDraft::new(vec![SaleItem::new("Marraqueta", 5.0, 9)], "QR");
        assert!(matches!(
            validate_checkout(&over, &stock),
            Err(CoreError::InsufficientStock { .. })
        ));

        let no_method = SaleDraft::new(vec![SaleItem::new("Marraqueta", 5.0, 1)], "  ");
        assert!(validate_checkout(&no_method, &stock).is_err());
    }
}
