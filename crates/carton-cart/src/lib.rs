//! # Carton Cart Service
//!
//! Session- and user-scoped shopping carts over the carton storage layer.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           carton-cart                                   │
//! │                                                                         │
//! │   host app ──► CartService (facade, per named instance)                 │
//! │                    │                                                    │
//! │        ┌───────────┼──────────────┐                                     │
//! │        ▼           ▼              ▼                                     │
//! │   CartStore   CartReconciler   SessionProvider / UserProvider          │
//! │   (resolve)   (add/remove/     (injected context seams)                │
//! │               update/clear)                                             │
//! │        │           │                                                    │
//! │        └─────┬─────┘                                                    │
//! │              ▼                                                          │
//! │         carton-db (sqlx/SQLite repositories)                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```ignore
//! let db = Database::new(DbConfig::new("cart.db")).await?;
//! let cart = CartService::new(db, session, users);
//!
//! cart.add(CandidateItem::from_buyable(&product)).await?;
//! cart.instance("wishlist")?.add(candidate).await?;
//! ```

pub mod cart;
pub mod error;
pub mod reconciler;
pub mod session;
pub mod store;

pub use cart::CartService;
pub use error::{CartError, CartResult};
pub use reconciler::CartReconciler;
pub use session::{MemorySession, MemoryUser, NoUser, SessionProvider, UserProvider};
pub use store::CartStore;

// Re-export the domain vocabulary so hosts need only this crate.
pub use carton_core::{
    Buyable, CandidateItem, Cart, CartEvent, CoreError, EventSink, LineItem, Money, NullSink,
    ProductRef, DEFAULT_CART_NAME,
};
pub use carton_db::{Database, DbConfig, DbError};
