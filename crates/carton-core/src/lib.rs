//! # carton-core: Pure Domain Logic for Carton
//!
//! This crate is the **heart** of the cart system. It contains the domain
//! types and rules as pure code with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Carton Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     Host Application                            │   │
//! │  │    HTTP handlers ──► session ──► auth ──► cart endpoints        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                carton-cart (Service Layer)                      │   │
//! │  │    CartService ──► CartStore ──► CartReconciler                 │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ carton-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  events   │  │ validation│  │   │
//! │  │   │   Cart    │  │   Money   │  │ CartEvent │  │   rules   │  │   │
//! │  │   │ LineItem  │  │           │  │ EventSink │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO SESSION • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    carton-db (Database Layer)                   │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Cart, LineItem, ProductRef, CandidateItem)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`buyable`] - Capability contract for sellable entities
//! - [`events`] - Mutation hooks and the notification sink seam
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation rules
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, session access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use carton_core::money::Money;
//! use carton_core::types::CandidateItem;
//!
//! // A freeform candidate: no product reference, matched by title
//! let candidate = CandidateItem::named("Widget", Money::from_cents(999))
//!     .with_quantity(2);
//!
//! assert_eq!(candidate.quantity, 2);
//! assert!(candidate.product_ref.is_none());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod buyable;
pub mod error;
pub mod events;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use carton_core::Money` instead of
// `use carton_core::money::Money`

pub use buyable::Buyable;
pub use error::{CoreError, CoreResult, ValidationError};
pub use events::{CartEvent, EventSink, NullSink};
pub use money::Money;
pub use types::*;
