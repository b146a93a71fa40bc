//! # Buyable Capability
//!
//! Contract for anything sellable that can be dropped into a cart.
//!
//! ## How It Flows
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Host application type (Course, Ticket, Product, ...)                   │
//! │       │  impl Buyable                                                   │
//! │       ▼                                                                 │
//! │  CandidateItem::from_buyable() ← snapshots description/price/identity   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CartReconciler::add() ← matches on (type_tag, identifier)              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The snapshot happens once, at add time. Later price changes on the
//! product never touch lines already in a cart.

use crate::money::Money;

/// Capability contract for anything sellable.
///
/// Implement this on host-application entities so they can be added to a
/// cart directly. The four getters are read exactly once per add, when the
/// candidate line is built.
pub trait Buyable {
    /// Stable identifier of the entity within its type.
    fn identifier(&self) -> String;

    /// Human-readable description used as the line title.
    fn description(&self) -> String;

    /// Current price, snapshotted onto the line at add time.
    fn price(&self) -> Money;

    /// Type discriminator for the polymorphic product reference.
    ///
    /// Two entities with the same identifier but different type tags are
    /// different products as far as matching is concerned.
    fn type_tag(&self) -> String;
}
