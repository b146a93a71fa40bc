//! # Error Types
//!
//! Domain-specific error types for carton-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  carton-core errors (this file)                                        │
//! │  ├── CoreError        - Domain errors (matching, item shape)           │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  carton-db errors (separate crate)                                     │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  carton-cart errors (service crate)                                    │
//! │  └── CartError        - Wraps both for callers                         │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → CartError → host application      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (title, id, etc.)
//! 3. Errors are enum variants, never String
//! 4. No automatic retries anywhere: fail fast, propagate

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core domain errors.
///
/// These represent cart rule violations. They should be caught by the host
/// and translated to user-facing messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A remove/update target does not match any existing line item.
    ///
    /// ## When This Occurs
    /// - Removing a product that was never added
    /// - Updating a freeform line whose title changed
    ///
    /// Decrementing a nonexistent line is a caller logic error, so this is
    /// surfaced explicitly rather than silently ignored.
    #[error("No line item in cart matches '{descriptor}'")]
    LineItemNotFound { descriptor: String },

    /// An add candidate is malformed.
    ///
    /// ## When This Occurs
    /// - Empty or whitespace-only title
    /// - Product reference with a blank identifier
    ///
    /// Fatal, surfaced immediately, no retry.
    #[error("Invalid item shape: {reason}")]
    InvalidItemShape { reason: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a LineItemNotFound error for a given candidate descriptor.
    pub fn line_item_not_found(descriptor: impl Into<String>) -> Self {
        CoreError::LineItemNotFound {
            descriptor: descriptor.into(),
        }
    }

    /// Creates an InvalidItemShape error.
    pub fn invalid_item_shape(reason: impl Into<String>) -> Self {
        CoreError::InvalidItemShape {
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when caller input doesn't meet requirements. Used for early
/// validation before any persistence happens.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::line_item_not_found("Widget");
        assert_eq!(err.to_string(), "No line item in cart matches 'Widget'");

        let err = CoreError::invalid_item_shape("title is empty");
        assert_eq!(err.to_string(), "Invalid item shape: title is empty");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "title".to_string(),
        };
        assert_eq!(err.to_string(), "title is required");

        let err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        assert_eq!(err.to_string(), "quantity must be positive");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "title".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
