//! # Cart Events
//!
//! Fixed notification hooks fired around every cart mutation.
//!
//! ## Hook Pairs
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Event Firing Order                                   │
//! │                                                                         │
//! │  add()     ──► Adding   ──► persist ──► Added                          │
//! │  remove()  ──► Removing ──► persist ──► Removed                        │
//! │  update()  ──► Updating ──► persist ──► Updated                        │
//! │  clear()   ──► Clearing ──► persist ──► Cleared                        │
//! │                                                                         │
//! │  The pre-event carries the request; the post-event carries the         │
//! │  persisted result and fires only if persistence succeeded.             │
//! │  (Removed is the exception: its item is the line as it stood before    │
//! │  the removal, since the row may no longer exist.)                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Fire-and-Forget
//! The sink has no return value and cannot veto or mutate an operation.
//! A sink that needs to do real work should hand the event off to its own
//! queue instead of blocking the cart call.

use crate::types::{Cart, CandidateItem, LineItem};

// =============================================================================
// Cart Event
// =============================================================================

/// A notification about one cart mutation.
///
/// Pre-events (`Adding`, `Removing`, `Updating`, `Clearing`) fire before
/// matching/persistence; post-events fire after the write committed.
#[derive(Debug, Clone)]
pub enum CartEvent {
    /// An add was requested; carries the candidate and requested quantity.
    Adding {
        candidate: CandidateItem,
        quantity: i64,
    },
    /// An add was persisted; carries the resulting (new or incremented)
    /// line item and the requested quantity.
    Added { item: LineItem, quantity: i64 },

    /// A remove was requested for an existing line.
    Removing { item: LineItem, quantity: i64 },
    /// A remove (decrement or delete) was persisted. `item` is the line
    /// as it stood before the removal; `quantity` is the amount removed.
    Removed { item: LineItem, quantity: i64 },

    /// An absolute quantity update was requested for an existing line.
    Updating { item: LineItem, quantity: i64 },
    /// An update was persisted.
    Updated { item: LineItem, quantity: i64 },

    /// A clear was requested; carries the cart being emptied.
    Clearing { cart: Cart },
    /// All line items of the cart were deleted.
    Cleared { cart: Cart },
}

impl CartEvent {
    /// Stable event name, for sinks that dispatch by string.
    pub const fn name(&self) -> &'static str {
        match self {
            CartEvent::Adding { .. } => "cart.adding",
            CartEvent::Added { .. } => "cart.added",
            CartEvent::Removing { .. } => "cart.removing",
            CartEvent::Removed { .. } => "cart.removed",
            CartEvent::Updating { .. } => "cart.updating",
            CartEvent::Updated { .. } => "cart.updated",
            CartEvent::Clearing { .. } => "cart.clearing",
            CartEvent::Cleared { .. } => "cart.cleared",
        }
    }
}

// =============================================================================
// Event Sink
// =============================================================================

/// Fire-and-forget notification sink.
///
/// Injected into the reconciler at construction time. Implementations must
/// not panic; a failing sink must not fail the cart operation.
pub trait EventSink: Send + Sync {
    /// Delivers one event. No return value is consumed.
    fn notify(&self, event: &CartEvent);
}

/// Sink that drops every event. The default when a host doesn't care.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn notify(&self, _event: &CartEvent) {}
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;

    #[test]
    fn test_event_names() {
        let candidate = CandidateItem::named("Widget", Money::from_cents(999));
        let event = CartEvent::Adding {
            candidate,
            quantity: 1,
        };
        assert_eq!(event.name(), "cart.adding");

        let cart = Cart::new("key-1", None, "default");
        let event = CartEvent::Cleared { cart };
        assert_eq!(event.name(), "cart.cleared");
    }

    #[test]
    fn test_null_sink_accepts_events() {
        let sink = NullSink;
        let cart = Cart::new("key-1", None, "default");
        sink.notify(&CartEvent::Clearing { cart });
    }
}
