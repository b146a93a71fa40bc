//! # Cart Repository
//!
//! Database operations for cart rows.
//!
//! ## Key Operations
//! - Unique-constraint lookups on (owner_key, name) and (user_id, name)
//! - Idempotent first-mutation persistence (`ensure`)
//! - Re-ownership on login (`assign_user`)
//!
//! ## First-Write-Wins Identity
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Two tabs, same session, both add to an unsaved cart:                   │
//! │                                                                         │
//! │  Tab A: resolve() → Cart { id: A } (unsaved)                           │
//! │  Tab B: resolve() → Cart { id: B } (unsaved)                           │
//! │                                                                         │
//! │  Tab A: ensure()  → INSERT ok, canonical id = A                        │
//! │  Tab B: ensure()  → INSERT hits UNIQUE(owner_key, name), DO NOTHING    │
//! │                     re-read → canonical id = A  ← B adopts A           │
//! │                                                                         │
//! │  Both line items land in the SAME cart row.                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use carton_core::Cart;

/// Raw cart row as stored in SQLite.
///
/// Kept private to this crate; converted to the domain `Cart` on the way
/// out so carton-core stays free of sqlx derives.
#[derive(Debug, sqlx::FromRow)]
struct CartRow {
    id: String,
    owner_key: String,
    user_id: Option<String>,
    name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CartRow> for Cart {
    fn from(row: CartRow) -> Self {
        Cart {
            id: row.id,
            owner_key: row.owner_key,
            user_id: row.user_id,
            name: row.name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for cart database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = CartRepository::new(pool);
///
/// // Resolve by authenticated user first, then by session key
/// let cart = repo.find_by_user("42", "default").await?;
/// ```
#[derive(Debug, Clone)]
pub struct CartRepository {
    pool: SqlitePool,
}

impl CartRepository {
    /// Creates a new CartRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CartRepository { pool }
    }

    /// Finds a cart by authenticated user id and instance name.
    ///
    /// ## Returns
    /// * `Ok(Some(Cart))` - Cart found
    /// * `Ok(None)` - No cart for this user/name
    pub async fn find_by_user(&self, user_id: &str, name: &str) -> DbResult<Option<Cart>> {
        let row = sqlx::query_as::<_, CartRow>(
            r#"
            SELECT id, owner_key, user_id, name, created_at, updated_at
            FROM carts
            WHERE user_id = ?1 AND name = ?2
            "#,
        )
        .bind(user_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Cart::from))
    }

    /// Finds a cart by session-derived owner key and instance name.
    pub async fn find_by_owner_key(&self, owner_key: &str, name: &str) -> DbResult<Option<Cart>> {
        let row = sqlx::query_as::<_, CartRow>(
            r#"
            SELECT id, owner_key, user_id, name, created_at, updated_at
            FROM carts
            WHERE owner_key = ?1 AND name = ?2
            "#,
        )
        .bind(owner_key)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Cart::from))
    }

    /// Persists a cart if no row exists yet for its (owner_key, name).
    ///
    /// Returns the canonical row: if another writer got there first, the
    /// stored cart (with the first writer's id) is returned and the
    /// caller's in-memory id is superseded.
    ///
    /// Idempotent: ensuring an already-persisted cart is a no-op read.
    pub async fn ensure(&self, cart: &Cart) -> DbResult<Cart> {
        debug!(id = %cart.id, owner_key = %cart.owner_key, name = %cart.name, "Ensuring cart row");

        sqlx::query(
            r#"
            INSERT INTO carts (id, owner_key, user_id, name, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT (owner_key, name) DO NOTHING
            "#,
        )
        .bind(&cart.id)
        .bind(&cart.owner_key)
        .bind(&cart.user_id)
        .bind(&cart.name)
        .bind(cart.created_at)
        .bind(cart.updated_at)
        .execute(&self.pool)
        .await?;

        // Re-read for the canonical row (first-write-wins on id).
        self.find_by_owner_key(&cart.owner_key, &cart.name)
            .await?
            .ok_or_else(|| DbError::not_found("Cart", &cart.id))
    }

    /// Re-owns a session cart to an authenticated user.
    ///
    /// Called when login happens after anonymous cart creation. Line items
    /// stay attached; only the user_id changes.
    pub async fn assign_user(&self, cart_id: &str, user_id: &str) -> DbResult<()> {
        debug!(id = %cart_id, user_id = %user_id, "Re-owning cart to user");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE carts
            SET user_id = ?2, updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(cart_id)
        .bind(user_id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Cart", cart_id));
        }

        Ok(())
    }

    /// Deletes a cart row. Line items go with it (FK cascade).
    ///
    /// ## Returns
    /// * `Ok(true)` - A row was deleted
    /// * `Ok(false)` - No such cart (already gone, or never persisted)
    pub async fn delete(&self, cart_id: &str) -> DbResult<bool> {
        debug!(id = %cart_id, "Deleting cart");

        let result = sqlx::query("DELETE FROM carts WHERE id = ?1")
            .bind(cart_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts cart rows (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM carts")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
