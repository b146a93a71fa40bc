//! # Service Error Types
//!
//! The error type host applications see from cart operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  CoreError (domain)  ──┐                                               │
//! │                        ├──► CartError (this module) ──► host app       │
//! │  DbError (storage)   ──┘                                               │
//! │                                                                         │
//! │  Nothing is retried at this layer: a persistence failure propagates    │
//! │  to the caller untouched, a matching failure is a caller logic error.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use carton_core::CoreError;
use carton_db::DbError;

/// Errors returned by cart service operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// Domain rule violation (unmatched target, malformed candidate,
    /// invalid quantity).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The row store rejected an operation (constraint violation,
    /// connectivity). Propagated untouched, never retried.
    #[error(transparent)]
    Db(#[from] DbError),
}

/// Result type for cart service operations.
pub type CartResult<T> = Result<T, CartError>;

impl From<carton_core::ValidationError> for CartError {
    fn from(err: carton_core::ValidationError) -> Self {
        CartError::Core(CoreError::Validation(err))
    }
}
