//! # Validation Module
//!
//! Input validation for cart operations.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Host application                                             │
//! │  └── Basic format checks, immediate user feedback                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (before any persistence)                         │
//! │  ├── Candidate shape (title present, identifier present)               │
//! │  └── Quantity range                                                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL constraints                                              │
//! │  ├── UNIQUE constraints on line identity                               │
//! │  └── Foreign key constraints                                           │
//! │                                                                         │
//! │  Defense in depth: each layer catches different errors                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{CoreError, ValidationError};
use crate::types::{CandidateItem, ProductRef};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates an add/remove quantity delta.
///
/// ## Rules
/// - Must be positive (> 0); the non-negative line invariant is maintained
///   by delete-at-zero, never by storing zero rows
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Validates an absolute quantity for `update`.
///
/// ## Rules
/// - Must not be negative; zero is allowed and means "delete the line"
pub fn validate_absolute_quantity(qty: i64) -> ValidationResult<()> {
    if qty < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates a cart instance name.
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 100 characters
pub fn validate_cart_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 100,
        });
    }

    Ok(())
}

// =============================================================================
// Candidate Validators
// =============================================================================

/// Validates the shape of an add candidate.
///
/// ## Rules
/// - Title must not be empty (it is the identity of freeform lines)
/// - A product reference must carry a non-blank type tag and identifier
/// - Price must not be negative
///
/// Returns `CoreError::InvalidItemShape` so callers can distinguish a
/// malformed candidate from an out-of-range number.
pub fn validate_candidate(candidate: &CandidateItem) -> Result<(), CoreError> {
    if candidate.title.trim().is_empty() {
        return Err(CoreError::invalid_item_shape("title is empty"));
    }

    if let ProductRef::Product { type_tag, id } = &candidate.product_ref {
        if type_tag.trim().is_empty() {
            return Err(CoreError::invalid_item_shape("product type tag is empty"));
        }
        if id.trim().is_empty() {
            return Err(CoreError::invalid_item_shape("product identifier is empty"));
        }
    }

    if candidate.unit_price_cents < 0 {
        return Err(CoreError::invalid_item_shape("price is negative"));
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(100).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
    }

    #[test]
    fn test_validate_absolute_quantity_allows_zero() {
        assert!(validate_absolute_quantity(0).is_ok());
        assert!(validate_absolute_quantity(5).is_ok());
        assert!(validate_absolute_quantity(-1).is_err());
    }

    #[test]
    fn test_validate_cart_name() {
        assert!(validate_cart_name("default").is_ok());
        assert!(validate_cart_name("wishlist").is_ok());
        assert!(validate_cart_name("").is_err());
        assert!(validate_cart_name("   ").is_err());
        assert!(validate_cart_name(&"a".repeat(200)).is_err());
    }

    #[test]
    fn test_validate_candidate_shape() {
        let ok = CandidateItem::named("Widget", Money::from_cents(999));
        assert!(validate_candidate(&ok).is_ok());

        let empty_title = CandidateItem::named("  ", Money::from_cents(999));
        assert!(matches!(
            validate_candidate(&empty_title),
            Err(CoreError::InvalidItemShape { .. })
        ));

        let mut blank_ref = CandidateItem::named("Widget", Money::from_cents(999));
        blank_ref.product_ref = ProductRef::product("product", "  ");
        assert!(matches!(
            validate_candidate(&blank_ref),
            Err(CoreError::InvalidItemShape { .. })
        ));

        let negative_price = CandidateItem::named("Widget", Money::from_cents(-1));
        assert!(validate_candidate(&negative_price).is_err());
    }
}
