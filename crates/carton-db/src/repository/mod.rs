//! # Repository Module
//!
//! Database repository implementations for Carton.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  CartReconciler                                                        │
//! │       │                                                                 │
//! │       │  db.line_items().find_by_product(cart_id, tag, id)             │
//! │       ▼                                                                 │
//! │  LineItemRepository                                                    │
//! │  ├── find_by_product(&self, cart_id, type_tag, product_id)             │
//! │  ├── find_by_title(&self, cart_id, title)                              │
//! │  ├── insert(&self, item)                                               │
//! │  └── set_quantity(&self, line_id, quantity)                            │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Benefits:                                                              │
//! │  • Clean separation of concerns                                        │
//! │  • SQL is isolated in one place                                        │
//! │  • Matching policy stays out of the SQL layer                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`cart::CartRepository`] - Cart row lookups, lazy persistence, re-ownership
//! - [`line_item::LineItemRepository`] - Line identity lookups and quantity writes

pub mod cart;
pub mod line_item;
