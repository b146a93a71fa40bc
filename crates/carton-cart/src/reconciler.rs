//! # Cart Reconciler
//!
//! Applies quantity-changing operations to a cart's line items with
//! identity-based matching.
//!
//! ## Reconciliation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         add(cart, candidate)                            │
//! │                                                                         │
//! │  validate candidate ──► fire Adding ──► persist cart if unsaved        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  match_existing(cart, candidate)                                       │
//! │       │                                                                 │
//! │       ├── hit  ──► quantity += requested ──► UPDATE                    │
//! │       │                                                                 │
//! │       └── miss ──► new LineItem snapshot  ──► INSERT                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  fire Added ──► return resulting line                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quantity Rules
//! - add: increments by the requested quantity (candidate default 1)
//! - remove: decrements; reaching (or passing) zero deletes the line
//! - update: absolute set; **update to 0 deletes the line**, consistent
//!   with remove's floor - a zero-quantity row is never persisted
//! - every persist call commits independently; a bulk add is sequential
//!   with no rollback of earlier elements on a later failure

use chrono::Utc;
use tracing::debug;

use crate::error::CartResult;
use carton_core::{
    validation, CandidateItem, Cart, CartEvent, CoreError, EventSink, LineItem, Money, ProductRef,
};
use carton_db::Database;

use std::sync::Arc;

/// Applies add/remove/update/clear operations to one cart at a time.
///
/// Exclusively owns line-item identity matching and quantity arithmetic
/// for the cart instance passed into each call. Holds no state between
/// calls.
#[derive(Clone)]
pub struct CartReconciler {
    db: Database,
    events: Arc<dyn EventSink>,
}

impl CartReconciler {
    /// Creates a reconciler over a database handle and a notification sink.
    pub fn new(db: Database, events: Arc<dyn EventSink>) -> Self {
        CartReconciler { db, events }
    }

    /// Finds the existing line a candidate would merge into, if any.
    ///
    /// ## Matching Rule
    /// - candidate with a product reference: match on the
    ///   (type_tag, id) pair only
    /// - freeform candidate: match on title among lines WITHOUT a
    ///   product reference only
    ///
    /// Exactly one of the two applies per candidate; they never
    /// cross-match.
    pub async fn match_existing(
        &self,
        cart: &Cart,
        candidate: &CandidateItem,
    ) -> CartResult<Option<LineItem>> {
        let lines = self.db.line_items();

        let matched = match &candidate.product_ref {
            ProductRef::Product { type_tag, id } => {
                lines.find_by_product(&cart.id, type_tag, id).await?
            }
            ProductRef::None => lines.find_by_title(&cart.id, &candidate.title).await?,
        };

        Ok(matched)
    }

    /// Adds a candidate to the cart, merging with an existing line when
    /// identities match.
    ///
    /// Persists the owning cart first if it has no row yet (empty carts
    /// are only saved on their first mutation). The cart argument is
    /// updated in place to the canonical stored row.
    ///
    /// ## Returns
    /// The resulting line item: existing-incremented or newly created.
    pub async fn add(&self, cart: &mut Cart, candidate: CandidateItem) -> CartResult<LineItem> {
        validation::validate_candidate(&candidate)?;
        validation::validate_quantity(candidate.quantity)?;

        let quantity = candidate.quantity;
        self.events.notify(&CartEvent::Adding {
            candidate: candidate.clone(),
            quantity,
        });

        // First mutation persists the cart (and settles its identity).
        *cart = self.db.carts().ensure(cart).await?;

        let lines = self.db.line_items();
        let line = match self.match_existing(cart, &candidate).await? {
            Some(mut existing) => {
                let new_quantity = existing.quantity + quantity;
                debug!(
                    line_id = %existing.id,
                    quantity = new_quantity,
                    "Merging candidate into existing line"
                );
                lines.set_quantity(&existing.id, new_quantity).await?;
                existing.quantity = new_quantity;
                existing.updated_at = Utc::now();
                existing
            }
            None => {
                let line = LineItem::from_candidate(&cart.id, &candidate);
                debug!(line_id = %line.id, title = %line.title, "Creating new line");
                lines.insert(&line).await?;
                line
            }
        };

        self.events.notify(&CartEvent::Added {
            item: line.clone(),
            quantity,
        });

        Ok(line)
    }

    /// Adds a collection of candidates, each processed independently and
    /// sequentially in input order.
    ///
    /// Partial failure does not roll back prior elements: the error of
    /// the first failing element propagates, everything added before it
    /// stays added.
    pub async fn add_many(
        &self,
        cart: &mut Cart,
        candidates: Vec<CandidateItem>,
    ) -> CartResult<Vec<LineItem>> {
        let mut added = Vec::with_capacity(candidates.len());

        for candidate in candidates {
            added.push(self.add(cart, candidate).await?);
        }

        Ok(added)
    }

    /// Removes quantity from the line matching the candidate.
    ///
    /// ## Behavior
    /// - `quantity` defaults to the line's current quantity (remove-all)
    /// - reaching or passing zero deletes the line entirely
    /// - an unmatched target is an error: decrementing a nonexistent line
    ///   is a caller logic error, not a silent no-op
    pub async fn remove(
        &self,
        cart: &Cart,
        candidate: &CandidateItem,
        quantity: Option<i64>,
    ) -> CartResult<()> {
        let line = self
            .match_existing(cart, candidate)
            .await?
            .ok_or_else(|| CoreError::line_item_not_found(&candidate.title))?;

        let quantity = quantity.unwrap_or(line.quantity);
        validation::validate_quantity(quantity)?;

        self.events.notify(&CartEvent::Removing {
            item: line.clone(),
            quantity,
        });

        let lines = self.db.line_items();
        if quantity >= line.quantity {
            debug!(line_id = %line.id, "Removing line entirely");
            lines.delete(&line.id).await?;
        } else {
            let remaining = line.quantity - quantity;
            debug!(line_id = %line.id, remaining, "Decrementing line");
            lines.set_quantity(&line.id, remaining).await?;
        }

        // Fires only if the delete/decrement committed.
        self.events.notify(&CartEvent::Removed {
            item: line,
            quantity,
        });

        Ok(())
    }

    /// Sets the absolute quantity of the line matching the candidate.
    ///
    /// ## Behavior
    /// - `new_quantity` must not be negative
    /// - **0 deletes the line** (documented decision: a zero row is never
    ///   persisted, mirroring remove's floor behavior)
    /// - an unmatched target is an error
    pub async fn update(
        &self,
        cart: &Cart,
        candidate: &CandidateItem,
        new_quantity: i64,
    ) -> CartResult<()> {
        validation::validate_absolute_quantity(new_quantity)?;

        let mut line = self
            .match_existing(cart, candidate)
            .await?
            .ok_or_else(|| CoreError::line_item_not_found(&candidate.title))?;

        self.events.notify(&CartEvent::Updating {
            item: line.clone(),
            quantity: new_quantity,
        });

        let lines = self.db.line_items();
        if new_quantity == 0 {
            debug!(line_id = %line.id, "Update to zero deletes line");
            lines.delete(&line.id).await?;
        } else {
            debug!(line_id = %line.id, quantity = new_quantity, "Setting absolute quantity");
            lines.set_quantity(&line.id, new_quantity).await?;
        }

        // Post-event carries the persisted result, not the stale read.
        line.quantity = new_quantity;
        line.updated_at = Utc::now();
        self.events.notify(&CartEvent::Updated {
            item: line,
            quantity: new_quantity,
        });

        Ok(())
    }

    /// Deletes every line item owned by the cart.
    pub async fn clear(&self, cart: &Cart) -> CartResult<()> {
        self.events.notify(&CartEvent::Clearing { cart: cart.clone() });

        let deleted = self.db.line_items().delete_by_cart(&cart.id).await?;
        debug!(cart_id = %cart.id, deleted, "Cleared cart");

        self.events.notify(&CartEvent::Cleared { cart: cart.clone() });

        Ok(())
    }

    /// Sums quantity across all line items of the cart.
    pub async fn count(&self, cart: &Cart) -> CartResult<i64> {
        Ok(self.db.line_items().total_quantity(&cart.id).await?)
    }

    /// Lists the cart's line items, oldest first.
    pub async fn contents(&self, cart: &Cart) -> CartResult<Vec<LineItem>> {
        Ok(self.db.line_items().list_by_cart(&cart.id).await?)
    }

    /// Computes the cart subtotal (sum of line totals).
    pub async fn subtotal(&self, cart: &Cart) -> CartResult<Money> {
        let total = self
            .contents(cart)
            .await?
            .iter()
            .fold(Money::zero(), |acc, line| acc + line.line_total());

        Ok(total)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CartError;
    use carton_core::{Buyable, NullSink, DEFAULT_CART_NAME};
    use carton_db::DbConfig;
    use serde_json::json;
    use std::sync::Mutex;

    /// Sink that records event names in firing order.
    #[derive(Default)]
    struct RecordingSink {
        seen: Mutex<Vec<&'static str>>,
    }

    impl RecordingSink {
        fn names(&self) -> Vec<&'static str> {
            self.seen.lock().unwrap_or_else(|e| e.into_inner()).clone()
        }
    }

    impl EventSink for RecordingSink {
        fn notify(&self, event: &CartEvent) {
            self.seen
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(event.name());
        }
    }

    struct Widget;

    impl Buyable for Widget {
        fn identifier(&self) -> String {
            "w-1".to_string()
        }

        fn description(&self) -> String {
            "Widget".to_string()
        }

        fn price(&self) -> Money {
            Money::from_cents(999)
        }

        fn type_tag(&self) -> String {
            "product".to_string()
        }
    }

    async fn setup() -> (CartReconciler, Cart) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let reconciler = CartReconciler::new(db.clone(), Arc::new(NullSink));
        let cart = Cart::new("key-1", None, DEFAULT_CART_NAME);
        (reconciler, cart)
    }

    fn widget(qty: i64) -> CandidateItem {
        CandidateItem::from_buyable(&Widget).with_quantity(qty)
    }

    #[tokio::test]
    async fn test_add_twice_aggregates_into_one_line() {
        let (reconciler, mut cart) = setup().await;

        reconciler.add(&mut cart, widget(2)).await.unwrap();
        let line = reconciler.add(&mut cart, widget(3)).await.unwrap();

        // q1 + q2 on exactly one line
        assert_eq!(line.quantity, 5);
        assert_eq!(reconciler.contents(&cart).await.unwrap().len(), 1);
        assert_eq!(reconciler.count(&cart).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_add_persists_cart_lazily() {
        let (reconciler, mut cart) = setup().await;

        // Unsaved until the first add
        assert!(reconciler
            .db
            .carts()
            .find_by_owner_key("key-1", DEFAULT_CART_NAME)
            .await
            .unwrap()
            .is_none());

        reconciler.add(&mut cart, widget(1)).await.unwrap();

        assert!(reconciler
            .db
            .carts()
            .find_by_owner_key("key-1", DEFAULT_CART_NAME)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_product_and_freeform_lines_never_cross_match() {
        let (reconciler, mut cart) = setup().await;

        // Same display name, one product-backed and one freeform
        reconciler.add(&mut cart, widget(1)).await.unwrap();
        reconciler
            .add(
                &mut cart,
                CandidateItem::named("Widget", Money::from_cents(500)),
            )
            .await
            .unwrap();

        let lines = reconciler.contents(&cart).await.unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(reconciler.count(&cart).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_add_snapshots_price_at_add_time() {
        let (reconciler, mut cart) = setup().await;

        let line = reconciler.add(&mut cart, widget(2)).await.unwrap();
        assert_eq!(line.unit_price_cents, 999);
        assert_eq!(reconciler.subtotal(&cart).await.unwrap().cents(), 1998);
    }

    #[tokio::test]
    async fn test_add_keeps_options_payload() {
        let (reconciler, mut cart) = setup().await;

        let candidate = CandidateItem::named("Engraving", Money::from_cents(1500))
            .with_options(json!({"text": "happy birthday"}));
        reconciler.add(&mut cart, candidate).await.unwrap();

        let lines = reconciler.contents(&cart).await.unwrap();
        assert_eq!(lines[0].options, json!({"text": "happy birthday"}));
    }

    #[tokio::test]
    async fn test_add_rejects_malformed_candidate() {
        let (reconciler, mut cart) = setup().await;

        let blank = CandidateItem::named("   ", Money::from_cents(100));
        let err = reconciler.add(&mut cart, blank).await.unwrap_err();
        assert!(matches!(
            err,
            CartError::Core(CoreError::InvalidItemShape { .. })
        ));

        // Nothing was persisted, not even the cart
        assert!(reconciler
            .db
            .carts()
            .find_by_owner_key("key-1", DEFAULT_CART_NAME)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_add_many_is_sequential_without_rollback() {
        let (reconciler, mut cart) = setup().await;

        let batch = vec![
            widget(1),
            CandidateItem::named("Gift wrap", Money::from_cents(250)),
            CandidateItem::named("", Money::from_cents(1)), // fails
            CandidateItem::named("Never added", Money::from_cents(1)),
        ];

        let err = reconciler.add_many(&mut cart, batch).await.unwrap_err();
        assert!(matches!(err, CartError::Core(_)));

        // The two elements before the failure stay added
        let lines = reconciler.contents(&cart).await.unwrap();
        assert_eq!(lines.len(), 2);
    }

    #[tokio::test]
    async fn test_remove_full_quantity_deletes_line() {
        let (reconciler, mut cart) = setup().await;

        reconciler.add(&mut cart, widget(2)).await.unwrap();
        reconciler
            .remove(&cart, &widget(1), Some(2))
            .await
            .unwrap();

        assert_eq!(reconciler.count(&cart).await.unwrap(), 0);
        assert!(reconciler.contents(&cart).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remove_partial_quantity_decrements() {
        let (reconciler, mut cart) = setup().await;

        reconciler.add(&mut cart, widget(5)).await.unwrap();
        reconciler
            .remove(&cart, &widget(1), Some(2))
            .await
            .unwrap();

        let lines = reconciler.contents(&cart).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 3);
    }

    #[tokio::test]
    async fn test_remove_defaults_to_remove_all() {
        let (reconciler, mut cart) = setup().await;

        reconciler.add(&mut cart, widget(4)).await.unwrap();
        reconciler.remove(&cart, &widget(1), None).await.unwrap();

        assert_eq!(reconciler.count(&cart).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_remove_excess_quantity_deletes_line() {
        let (reconciler, mut cart) = setup().await;

        reconciler.add(&mut cart, widget(2)).await.unwrap();
        reconciler
            .remove(&cart, &widget(1), Some(99))
            .await
            .unwrap();

        assert_eq!(reconciler.count(&cart).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_remove_unmatched_target_is_an_error() {
        let (reconciler, cart) = setup().await;

        let err = reconciler
            .remove(&cart, &widget(1), None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CartError::Core(CoreError::LineItemNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_update_sets_absolute_quantity() {
        let (reconciler, mut cart) = setup().await;

        reconciler.add(&mut cart, widget(2)).await.unwrap();
        reconciler.update(&cart, &widget(1), 7).await.unwrap();

        assert_eq!(reconciler.count(&cart).await.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_update_to_zero_deletes_line() {
        let (reconciler, mut cart) = setup().await;

        reconciler.add(&mut cart, widget(2)).await.unwrap();
        reconciler.update(&cart, &widget(1), 0).await.unwrap();

        assert_eq!(reconciler.count(&cart).await.unwrap(), 0);
        assert!(reconciler.contents(&cart).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_rejects_negative_quantity() {
        let (reconciler, mut cart) = setup().await;

        reconciler.add(&mut cart, widget(2)).await.unwrap();
        let err = reconciler.update(&cart, &widget(1), -1).await.unwrap_err();
        assert!(matches!(err, CartError::Core(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_clear_empties_cart() {
        let (reconciler, mut cart) = setup().await;

        reconciler.add(&mut cart, widget(2)).await.unwrap();
        reconciler
            .add(
                &mut cart,
                CandidateItem::named("Gift wrap", Money::from_cents(250)),
            )
            .await
            .unwrap();

        reconciler.clear(&cart).await.unwrap();

        assert_eq!(reconciler.count(&cart).await.unwrap(), 0);
        assert!(reconciler.contents(&cart).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_event_hook_order() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let sink = Arc::new(RecordingSink::default());
        let reconciler = CartReconciler::new(db, sink.clone());
        let mut cart = Cart::new("key-1", None, DEFAULT_CART_NAME);

        reconciler.add(&mut cart, widget(2)).await.unwrap();
        reconciler.update(&cart, &widget(1), 5).await.unwrap();
        reconciler.remove(&cart, &widget(1), Some(1)).await.unwrap();
        reconciler.clear(&cart).await.unwrap();

        assert_eq!(
            sink.names(),
            vec![
                "cart.adding",
                "cart.added",
                "cart.updating",
                "cart.updated",
                "cart.removing",
                "cart.removed",
                "cart.clearing",
                "cart.cleared",
            ]
        );
    }

    /// Sink that keeps full event payloads.
    #[derive(Default)]
    struct CapturingSink {
        events: Mutex<Vec<CartEvent>>,
    }

    impl EventSink for CapturingSink {
        fn notify(&self, event: &CartEvent) {
            self.events
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(event.clone());
        }
    }

    #[tokio::test]
    async fn test_updated_event_carries_persisted_quantity() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let sink = Arc::new(CapturingSink::default());
        let reconciler = CartReconciler::new(db, sink.clone());
        let mut cart = Cart::new("key-1", None, DEFAULT_CART_NAME);

        reconciler.add(&mut cart, widget(2)).await.unwrap();
        reconciler.update(&cart, &widget(1), 5).await.unwrap();

        let events = sink.events.lock().unwrap_or_else(|e| e.into_inner());
        let (updating, updated) = match &events[..] {
            [_, _, CartEvent::Updating { item: before, .. }, CartEvent::Updated { item: after, .. }] => {
                (before, after)
            }
            other => panic!("unexpected event sequence: {other:?}"),
        };

        // Pre-event sees the stored state, post-event the persisted result
        assert_eq!(updating.quantity, 2);
        assert_eq!(updated.quantity, 5);
    }

    #[tokio::test]
    async fn test_no_post_event_when_target_missing() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let sink = Arc::new(RecordingSink::default());
        let reconciler = CartReconciler::new(db, sink.clone());
        let cart = Cart::new("key-1", None, DEFAULT_CART_NAME);

        let _ = reconciler.remove(&cart, &widget(1), None).await;

        // The remove failed before its pre-event: nothing recorded
        assert!(sink.names().is_empty());
    }
}
