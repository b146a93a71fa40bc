//! # Cart Service
//!
//! The facade host applications talk to. Binds one named cart instance to
//! the injected session/user collaborators and delegates to [`CartStore`]
//! and [`CartReconciler`].
//!
//! ## Call Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          CartService                                    │
//! │                                                                         │
//! │  add(candidate)                                                         │
//! │    │                                                                    │
//! │    ├─► session.client_key(instance) ─┐                                  │
//! │    ├─► users.current_user_id()      ─┼─► store.resolve(...) ─► Cart    │
//! │    │                                 │                                  │
//! │    └─► reconciler.add(cart, candidate) ─► LineItem                     │
//! │                                                                         │
//! │  instance("wishlist") ─► a second service over the same handles,       │
//! │                          scoped to its own cart row                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every operation resolves the cart fresh from the current session/user
//! context, so a login between two calls is picked up automatically.

use std::sync::Arc;

use tracing::info;

use crate::error::CartResult;
use crate::reconciler::CartReconciler;
use crate::session::{SessionProvider, UserProvider};
use crate::store::CartStore;
use carton_core::{
    validation, Buyable, CandidateItem, Cart, EventSink, LineItem, Money, NullSink,
    DEFAULT_CART_NAME,
};
use carton_db::Database;

/// One named cart bound to a session and user context.
///
/// Cheap to clone; clones share the database pool and collaborators.
/// [`CartService::instance`] produces a clone scoped to a differently
/// named cart.
#[derive(Clone)]
pub struct CartService {
    db: Database,
    store: CartStore,
    reconciler: CartReconciler,
    session: Arc<dyn SessionProvider>,
    users: Arc<dyn UserProvider>,
    instance: String,
}

impl CartService {
    /// Creates a service over the default cart instance with no event
    /// listeners.
    pub fn new(
        db: Database,
        session: Arc<dyn SessionProvider>,
        users: Arc<dyn UserProvider>,
    ) -> Self {
        Self::with_events(db, session, users, Arc::new(NullSink))
    }

    /// Creates a service with an event sink receiving lifecycle
    /// notifications.
    pub fn with_events(
        db: Database,
        session: Arc<dyn SessionProvider>,
        users: Arc<dyn UserProvider>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        CartService {
            store: CartStore::new(db.clone()),
            reconciler: CartReconciler::new(db.clone(), events),
            db,
            session,
            users,
            instance: DEFAULT_CART_NAME.to_string(),
        }
    }

    /// Returns a service scoped to a named cart instance ("wishlist",
    /// "saved-for-later", ...) sharing this one's handles.
    pub fn instance(&self, name: &str) -> CartResult<CartService> {
        validation::validate_cart_name(name)?;

        let mut scoped = self.clone();
        scoped.instance = name.to_string();
        Ok(scoped)
    }

    /// The instance name this service is scoped to.
    pub fn instance_name(&self) -> &str {
        &self.instance
    }

    /// Resolves the cart for the current session/user context.
    ///
    /// The result may be unsaved (no row yet) when the context has never
    /// added anything.
    pub async fn resolve(&self) -> CartResult<Cart> {
        let owner_key = self.session.client_key(&self.instance);
        let user_id = self.users.current_user_id();

        self.store
            .resolve(&owner_key, user_id.as_deref(), &self.instance)
            .await
    }

    /// Adds a candidate item, merging into an existing line on an
    /// identity match.
    pub async fn add(&self, candidate: CandidateItem) -> CartResult<LineItem> {
        let mut cart = self.resolve().await?;
        self.reconciler.add(&mut cart, candidate).await
    }

    /// Adds a purchasable item with quantity 1.
    pub async fn add_buyable(&self, buyable: &dyn Buyable) -> CartResult<LineItem> {
        self.add(CandidateItem::from_buyable(buyable)).await
    }

    /// Adds several candidates sequentially; partial failure keeps the
    /// elements added before the error.
    pub async fn add_many(&self, candidates: Vec<CandidateItem>) -> CartResult<Vec<LineItem>> {
        let mut cart = self.resolve().await?;
        self.reconciler.add_many(&mut cart, candidates).await
    }

    /// Removes quantity from the line matching the candidate; `None`
    /// removes the full line.
    pub async fn remove(
        &self,
        candidate: &CandidateItem,
        quantity: Option<i64>,
    ) -> CartResult<()> {
        let cart = self.resolve().await?;
        self.reconciler.remove(&cart, candidate, quantity).await
    }

    /// Sets the absolute quantity of the matching line; 0 deletes it.
    pub async fn update(&self, candidate: &CandidateItem, new_quantity: i64) -> CartResult<()> {
        let cart = self.resolve().await?;
        self.reconciler.update(&cart, candidate, new_quantity).await
    }

    /// Deletes every line item, keeping the cart row.
    pub async fn clear(&self) -> CartResult<()> {
        let cart = self.resolve().await?;
        self.reconciler.clear(&cart).await
    }

    /// Total quantity across all lines (0 for an unsaved cart).
    pub async fn count(&self) -> CartResult<i64> {
        let cart = self.resolve().await?;
        self.reconciler.count(&cart).await
    }

    /// The cart's line items, oldest first.
    pub async fn contents(&self) -> CartResult<Vec<LineItem>> {
        let cart = self.resolve().await?;
        self.reconciler.contents(&cart).await
    }

    /// Sum of line totals.
    pub async fn subtotal(&self) -> CartResult<Money> {
        let cart = self.resolve().await?;
        self.reconciler.subtotal(&cart).await
    }

    /// Destroys this instance's cart: deletes the row (lines cascade) and
    /// forgets the session key so the next access starts fresh.
    pub async fn destroy(&self) -> CartResult<()> {
        let cart = self.resolve().await?;
        let deleted = self.db.carts().delete(&cart.id).await?;
        self.session.forget(&self.instance);
        info!(cart_id = %cart.id, instance = %self.instance, deleted, "Destroyed cart");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{MemorySession, MemoryUser};
    use carton_db::DbConfig;
    use serde_json::json;

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

    async fn service_with_user() -> (CartService, Arc<MemoryUser>) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let users = Arc::new(MemoryUser::new());
        let service = CartService::new(db, Arc::new(MemorySession::new()), users.clone());
        (service, users)
    }

    #[tokio::test]
    async fn test_cart_survives_login() {
        let (service, users) = service_with_user().await;

        // Anonymous session fills a cart
        service.add_buyable(&Widget).await.unwrap();
        service
            .add(CandidateItem::named("Gift wrap", Money::from_cents(250)))
            .await
            .unwrap();
        assert_eq!(service.count().await.unwrap(), 2);

        // Login mid-session: same cart, now user-owned
        users.login("42");
        assert_eq!(service.count().await.unwrap(), 2);

        let cart = service.resolve().await.unwrap();
        assert_eq!(cart.user_id.as_deref(), Some("42"));
    }

    #[tokio::test]
    async fn test_named_instances_are_independent() {
        let (service, _users) = service_with_user().await;
        let wishlist = service.instance("wishlist").unwrap();

        service
            .add(CandidateItem::named("Socks", Money::from_cents(400)).with_quantity(2))
            .await
            .unwrap();
        wishlist
            .add(CandidateItem::named("Socks", Money::from_cents(400)))
            .await
            .unwrap();

        assert_eq!(service.count().await.unwrap(), 2);
        assert_eq!(wishlist.count().await.unwrap(), 1);

        wishlist.clear().await.unwrap();
        assert_eq!(service.count().await.unwrap(), 2);
        assert_eq!(wishlist.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_instance_rejects_blank_name() {
        let (service, _users) = service_with_user().await;
        assert!(service.instance("   ").is_err());
    }

    #[tokio::test]
    async fn test_destroy_deletes_rows_and_rotates_key() {
        let (service, _users) = service_with_user().await;

        service.add_buyable(&Widget).await.unwrap();
        let before = service.resolve().await.unwrap();

        service.destroy().await.unwrap();

        // Fresh session key, fresh empty cart
        let after = service.resolve().await.unwrap();
        assert_ne!(after.owner_key, before.owner_key);
        assert_eq!(service.count().await.unwrap(), 0);

        // The old row is gone
        assert!(service
            .db
            .carts()
            .find_by_owner_key(&before.owner_key, DEFAULT_CART_NAME)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_full_shopping_flow() {
        let (service, _users) = service_with_user().await;

        service.add_buyable(&Widget).await.unwrap();
        service
            .add(
                CandidateItem::from_buyable(&Widget)
                    .with_quantity(2)
                    .with_options(json!(null)),
            )
            .await
            .unwrap();
        service
            .add(CandidateItem::named("Gift wrap", Money::from_cents(250)))
            .await
            .unwrap();

        assert_eq!(service.count().await.unwrap(), 4);
        // 3 x 999 + 250
        assert_eq!(service.subtotal().await.unwrap().cents(), 3247);

        service
            .update(&CandidateItem::from_buyable(&Widget), 1)
            .await
            .unwrap();
        assert_eq!(service.subtotal().await.unwrap().cents(), 1249);

        service
            .remove(&CandidateItem::named("Gift wrap", Money::zero()), None)
            .await
            .unwrap();
        assert_eq!(service.count().await.unwrap(), 1);
    }
}
