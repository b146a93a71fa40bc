//! # Cart Store
//!
//! Maps an ownership context (session key, optional user id) to exactly
//! one cart, creating it lazily.
//!
//! ## Resolution Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    resolve(owner_key, user_id, name)                    │
//! │                                                                         │
//! │  user_id present?                                                      │
//! │       │                                                                 │
//! │       ├── yes ──► find by (user_id, name) ──► found? return it         │
//! │       │                                          │                      │
//! │       ▼                                          ▼ not found            │
//! │  find by (owner_key, name) ◄─────────────────────┘                      │
//! │       │                                                                 │
//! │       ├── found, anonymous, user now known ─► re-own row, return        │
//! │       ├── found, owned by ANOTHER user ─────► fresh in-memory Cart      │
//! │       ├── found ────────────────────────────► return it                 │
//! │       │                                                                 │
//! │       └── not found ──► new in-memory Cart (NOT persisted)             │
//! │                          persistence deferred to the first add         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Re-ownership only ever claims an **anonymous** cart. A session cart
//! already owned by a different user is left untouched; the current user
//! resolves to a fresh cart under a user-scoped key instead.
//!
//! Absence is a valid state resolved by creation; resolve never errors on
//! "not found" and never writes except for the re-ownership update.

use tracing::debug;

use crate::error::CartResult;
use carton_core::{validation, Cart};
use carton_db::Database;

/// Resolves the cart row owning a request context.
///
/// Exclusively owns the decision of which cart represents a given
/// (owner key, user id, instance name) triple.
#[derive(Debug, Clone)]
pub struct CartStore {
    db: Database,
}

impl CartStore {
    /// Creates a store over a database handle.
    pub fn new(db: Database) -> Self {
        CartStore { db }
    }

    /// Resolves the cart for an ownership context, creating one in memory
    /// if none exists.
    ///
    /// ## Side Effects
    /// - None for plain hits and misses (empty carts are not saved)
    /// - One UPDATE when login happened after **anonymous** cart creation:
    ///   the session cart is re-owned to the user, line items untouched.
    ///   A session cart already owned by a different user is never
    ///   reassigned; the caller gets a fresh in-memory cart instead
    ///
    /// ## Arguments
    /// * `owner_key` - session-derived key, stable per client+instance
    /// * `user_id` - authenticated user, if known
    /// * `name` - cart instance name ("default", "wishlist", ...)
    pub async fn resolve(
        &self,
        owner_key: &str,
        user_id: Option<&str>,
        name: &str,
    ) -> CartResult<Cart> {
        validation::validate_cart_name(name)?;

        let carts = self.db.carts();

        // User identity takes precedence once known.
        if let Some(uid) = user_id {
            if let Some(cart) = carts.find_by_user(uid, name).await? {
                debug!(cart_id = %cart.id, user_id = %uid, "Resolved cart by user");
                return Ok(cart);
            }
        }

        if let Some(mut cart) = carts.find_by_owner_key(owner_key, name).await? {
            match (&cart.user_id, user_id) {
                // Login happened after this cart was created anonymously:
                // re-own the row, keep its line items.
                (None, Some(uid)) => {
                    debug!(cart_id = %cart.id, user_id = %uid, "Re-owning session cart");
                    carts.assign_user(&cart.id, uid).await?;
                    cart.user_id = Some(uid.to_string());
                }
                // The session cart belongs to a different user (shared
                // device, account switch). Never reassign it; the current
                // user starts from a fresh cart instead. The fresh cart
                // gets a user-scoped key so persisting it cannot collide
                // with (and silently adopt) the other user's row.
                (Some(owner), Some(uid)) if owner.as_str() != uid => {
                    debug!(cart_id = %cart.id, user_id = %uid, "Session cart owned by another user");
                    let scoped_key = format!("{owner_key}/{uid}");
                    return Ok(Cart::new(scoped_key, Some(uid.to_string()), name));
                }
                _ => {}
            }
            debug!(cart_id = %cart.id, "Resolved cart by owner key");
            return Ok(cart);
        }

        // Absence is not an error: hand back an unsaved cart. The first
        // mutation persists it.
        debug!(owner_key = %owner_key, name = %name, "No cart yet, creating in memory");
        Ok(Cart::new(owner_key, user_id.map(str::to_string), name))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use carton_db::DbConfig;
    use carton_core::DEFAULT_CART_NAME;

    async fn test_store() -> CartStore {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        CartStore::new(db.clone())
    }

    #[tokio::test]
    async fn test_resolve_miss_creates_unsaved_cart() {
        let store = CartStore::new(Database::new(DbConfig::in_memory()).await.unwrap());

        let cart = store
            .resolve("key-1", None, DEFAULT_CART_NAME)
            .await
            .unwrap();

        assert_eq!(cart.owner_key, "key-1");
        assert!(cart.is_anonymous());

        // Nothing was written
        assert!(store
            .db
            .carts()
            .find_by_owner_key("key-1", DEFAULT_CART_NAME)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_resolve_finds_persisted_cart_by_key() {
        let store = test_store().await;

        let cart = store
            .resolve("key-1", None, DEFAULT_CART_NAME)
            .await
            .unwrap();
        let cart = store.db.carts().ensure(&cart).await.unwrap();

        let resolved = store
            .resolve("key-1", None, DEFAULT_CART_NAME)
            .await
            .unwrap();
        assert_eq!(resolved.id, cart.id);
    }

    #[tokio::test]
    async fn test_resolve_reowns_session_cart_on_login() {
        let store = test_store().await;

        let anon = store
            .resolve("key-1", None, DEFAULT_CART_NAME)
            .await
            .unwrap();
        store.db.carts().ensure(&anon).await.unwrap();

        // Same session key, now logged in as 42
        let owned = store
            .resolve("key-1", Some("42"), DEFAULT_CART_NAME)
            .await
            .unwrap();

        assert_eq!(owned.id, anon.id);
        assert_eq!(owned.user_id.as_deref(), Some("42"));

        // Re-ownership was persisted, so a user lookup from another
        // session now finds the same cart.
        let from_other_session = store
            .resolve("other-key", Some("42"), DEFAULT_CART_NAME)
            .await
            .unwrap();
        assert_eq!(from_other_session.id, anon.id);
    }

    #[tokio::test]
    async fn test_resolve_never_reassigns_another_users_cart() {
        let store = test_store().await;

        // User 7's cart sits under a shared session key
        let theirs = Cart::new("shared-key", Some("7".to_string()), DEFAULT_CART_NAME);
        store.db.carts().ensure(&theirs).await.unwrap();

        // User 42 logs in on the same session: they get a fresh cart,
        // and user 7's row keeps its owner
        let resolved = store
            .resolve("shared-key", Some("42"), DEFAULT_CART_NAME)
            .await
            .unwrap();
        assert_ne!(resolved.id, theirs.id);
        assert_eq!(resolved.user_id.as_deref(), Some("42"));

        let untouched = store
            .db
            .carts()
            .find_by_owner_key("shared-key", DEFAULT_CART_NAME)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(untouched.user_id.as_deref(), Some("7"));
    }

    #[tokio::test]
    async fn test_fresh_cart_after_owner_mismatch_persists_separately() {
        let store = test_store().await;

        let theirs = Cart::new("shared-key", Some("7".to_string()), DEFAULT_CART_NAME);
        store.db.carts().ensure(&theirs).await.unwrap();

        let fresh = store
            .resolve("shared-key", Some("42"), DEFAULT_CART_NAME)
            .await
            .unwrap();

        // Persisting the fresh cart must not adopt user 7's row
        let saved = store.db.carts().ensure(&fresh).await.unwrap();
        assert_eq!(saved.id, fresh.id);
        assert_eq!(saved.user_id.as_deref(), Some("42"));
        assert_ne!(saved.id, theirs.id);
    }

    #[tokio::test]
    async fn test_resolve_prefers_user_cart_over_session_cart() {
        let store = test_store().await;

        let user_cart = Cart::new("old-key", Some("42".to_string()), DEFAULT_CART_NAME);
        store.db.carts().ensure(&user_cart).await.unwrap();

        let session_cart = Cart::new("new-key", None, DEFAULT_CART_NAME);
        store.db.carts().ensure(&session_cart).await.unwrap();

        // Logged-in resolution from the new session finds the user cart,
        // not the session one.
        let resolved = store
            .resolve("new-key", Some("42"), DEFAULT_CART_NAME)
            .await
            .unwrap();
        assert_eq!(resolved.id, user_cart.id);
    }

    #[tokio::test]
    async fn test_resolve_rejects_blank_instance_name() {
        let store = test_store().await;
        assert!(store.resolve("key-1", None, "  ").await.is_err());
    }
}
