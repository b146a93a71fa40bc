//! # Domain Types
//!
//! Core domain types for the cart system.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Cart       │   │    LineItem     │   │  CandidateItem  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  title          │       │
//! │  │  owner_key      │1─N│  cart_id (FK)   │   │  product_ref    │       │
//! │  │  user_id?       │   │  product_ref    │   │  unit_price     │       │
//! │  │  name           │   │  quantity       │   │  quantity       │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐                                                    │
//! │  │   ProductRef    │   None ─── freeform line, matched by title         │
//! │  │  ─────────────  │                                                    │
//! │  │  None           │   Product ─ matched by (type_tag, id) pair         │
//! │  │  Product{..}    │                                                    │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! - `Cart.id`: UUID v4 - immutable, used for database relations
//! - `(Cart.owner_key, Cart.name)`: business identity - at most one cart
//!   exists per owner key and instance name at any time
//! - `LineItem` identity inside a cart: the `ProductRef` pair when present,
//!   the freeform title otherwise (the two never cross-match)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;
use uuid::Uuid;

use crate::buyable::Buyable;
use crate::money::Money;

/// Cart instance name used when the caller does not pick one.
pub const DEFAULT_CART_NAME: &str = "default";

// =============================================================================
// Product Reference
// =============================================================================

/// Polymorphic reference to a sellable entity.
///
/// ## Why a Tagged Union?
/// A line item either points at a real product (matched by the
/// `(type_tag, id)` pair) or is a freeform entry (matched by title).
/// Making the two states explicit keeps the matching rule a `match`
/// instead of a nullable type+id pair that can half-exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProductRef {
    /// No product backing; the line is identified by its title.
    None,
    /// A reference to a sellable entity of a given type.
    Product {
        /// Type discriminator (e.g. "product", "course", "ticket").
        type_tag: String,
        /// Identifier within that type.
        id: String,
    },
}

impl ProductRef {
    /// Creates a product reference from a type tag and identifier.
    pub fn product(type_tag: impl Into<String>, id: impl Into<String>) -> Self {
        ProductRef::Product {
            type_tag: type_tag.into(),
            id: id.into(),
        }
    }

    /// Checks whether this is the freeform (no product) variant.
    #[inline]
    pub const fn is_none(&self) -> bool {
        matches!(self, ProductRef::None)
    }
}

impl Default for ProductRef {
    fn default() -> Self {
        ProductRef::None
    }
}

// =============================================================================
// Cart
// =============================================================================

/// A named collection of line items owned by a session or user.
///
/// ## Ownership
/// - `owner_key`: session-derived opaque key, stable per client+instance
/// - `user_id`: set once the client authenticates; user lookup takes
///   precedence over the owner key from then on
///
/// ## Lifecycle
/// Created in memory by cart resolution and persisted lazily on the first
/// mutation. Empty carts are never eagerly saved.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Cart {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Session-derived ownership key.
    pub owner_key: String,

    /// Authenticated user id, if known.
    pub user_id: Option<String>,

    /// Instance name ("default", "wishlist", ...).
    pub name: String,

    /// When the cart was created.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// When the cart was last updated.
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    /// Creates a new, not-yet-persisted cart for the given owner.
    pub fn new(owner_key: impl Into<String>, user_id: Option<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Cart {
            id: Uuid::new_v4().to_string(),
            owner_key: owner_key.into(),
            user_id,
            name: name.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Checks whether the cart belongs to an anonymous session.
    #[inline]
    pub fn is_anonymous(&self) -> bool {
        self.user_id.is_none()
    }
}

// =============================================================================
// Line Item
// =============================================================================

/// One quantity-bearing entry in a cart.
///
/// Uses the snapshot pattern: title and unit price are frozen at add time
/// and never re-fetched from the product, so the cart displays consistent
/// data even if the product changes afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineItem {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Owning cart.
    pub cart_id: String,

    /// Product reference, or `None` for freeform lines.
    pub product_ref: ProductRef,

    /// Display title at time of adding (frozen).
    pub title: String,

    /// Unit price in cents at time of adding (frozen).
    pub unit_price_cents: i64,

    /// Quantity in cart. Invariant: always > 0 once persisted;
    /// a line that would reach zero is deleted instead.
    pub quantity: i64,

    /// Arbitrary option payload (size, color, ...). Opaque to this core.
    #[ts(type = "Record<string, unknown>")]
    pub options: Value,

    /// When the line was created.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// When the line was last updated.
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl LineItem {
    /// Builds a new line item for a cart from an add candidate.
    pub fn from_candidate(cart_id: &str, candidate: &CandidateItem) -> Self {
        let now = Utc::now();
        LineItem {
            id: Uuid::new_v4().to_string(),
            cart_id: cart_id.to_string(),
            product_ref: candidate.product_ref.clone(),
            title: candidate.title.clone(),
            unit_price_cents: candidate.unit_price_cents,
            quantity: candidate.quantity,
            options: candidate.options.clone(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Returns the line total (unit price × quantity) as Money.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price().multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Candidate Item
// =============================================================================

/// What a caller asks to add to a cart, before reconciliation.
///
/// ## Two Shapes
/// ```text
/// Buyable product ──► from_buyable()  title = description()
///                                     ref   = (type_tag, identifier)
///                                     price = price() snapshot
///
/// Raw name/price ──► named()          title = name
///                                     ref   = ProductRef::None
/// ```
///
/// A candidate with a product reference never matches a freeform line and
/// vice versa; reconciliation switches on the `product_ref` tag.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CandidateItem {
    /// Display title snapshot.
    pub title: String,

    /// Product reference, or `None` for freeform candidates.
    pub product_ref: ProductRef,

    /// Unit price in cents, snapshotted at build time.
    pub unit_price_cents: i64,

    /// Requested quantity (defaults to 1).
    pub quantity: i64,

    /// Arbitrary option payload carried onto the created line.
    #[ts(type = "Record<string, unknown>")]
    pub options: Value,
}

impl CandidateItem {
    /// Builds a candidate from anything sellable.
    ///
    /// Snapshots description, identifier+type and price at this moment.
    pub fn from_buyable(product: &dyn Buyable) -> Self {
        CandidateItem {
            title: product.description(),
            product_ref: ProductRef::product(product.type_tag(), product.identifier()),
            unit_price_cents: product.price().cents(),
            quantity: 1,
            options: Value::Null,
        }
    }

    /// Builds a freeform candidate from a display name and price.
    pub fn named(title: impl Into<String>, price: Money) -> Self {
        CandidateItem {
            title: title.into(),
            product_ref: ProductRef::None,
            unit_price_cents: price.cents(),
            quantity: 1,
            options: Value::Null,
        }
    }

    /// Sets the requested quantity.
    pub fn with_quantity(mut self, quantity: i64) -> Self {
        self.quantity = quantity;
        self
    }

    /// Attaches an option payload.
    pub fn with_options(mut self, options: Value) -> Self {
        self.options = options;
        self
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

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

    #[test]
    fn test_product_ref_default_is_none() {
        assert!(ProductRef::default().is_none());
        assert!(!ProductRef::product("product", "1").is_none());
    }

    #[test]
    fn test_cart_new_is_anonymous_without_user() {
        let cart = Cart::new("key-1", None, DEFAULT_CART_NAME);
        assert!(cart.is_anonymous());

        let owned = Cart::new("key-1", Some("42".to_string()), DEFAULT_CART_NAME);
        assert!(!owned.is_anonymous());
    }

    #[test]
    fn test_candidate_from_buyable_snapshots_price() {
        let candidate = CandidateItem::from_buyable(&Widget);

        assert_eq!(candidate.title, "Widget");
        assert_eq!(candidate.unit_price_cents, 999);
        assert_eq!(candidate.quantity, 1);
        assert_eq!(candidate.product_ref, ProductRef::product("product", "w-1"));
    }

    #[test]
    fn test_candidate_named_has_no_product_ref() {
        let candidate = CandidateItem::named("Gift wrap", Money::from_cents(250)).with_quantity(2);

        assert!(candidate.product_ref.is_none());
        assert_eq!(candidate.quantity, 2);
    }

    #[test]
    fn test_line_item_from_candidate() {
        let cart = Cart::new("key-1", None, DEFAULT_CART_NAME);
        let candidate = CandidateItem::from_buyable(&Widget).with_quantity(3);
        let line = LineItem::from_candidate(&cart.id, &candidate);

        assert_eq!(line.cart_id, cart.id);
        assert_eq!(line.quantity, 3);
        assert_eq!(line.line_total().cents(), 2997);
    }
}
