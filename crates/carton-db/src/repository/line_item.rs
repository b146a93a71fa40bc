//! # Line Item Repository
//!
//! Database operations for cart line items.
//!
//! ## Identity Lookups
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │             How a candidate finds its existing line                     │
//! │                                                                         │
//! │  candidate.product_ref                                                 │
//! │       │                                                                 │
//! │       ├── Product { type_tag, id } ──► find_by_product()               │
//! │       │        WHERE cart_id = ? AND product_type = ? AND product_id=? │
//! │       │                                                                 │
//! │       └── None ──────────────────────► find_by_title()                 │
//! │                WHERE cart_id = ? AND product_id IS NULL AND title = ?  │
//! │                                                                         │
//! │  The two never cross-match: a product-backed line is invisible to      │
//! │  title lookup and vice versa.                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use carton_core::{LineItem, ProductRef};

/// Raw line item row as stored in SQLite.
///
/// The polymorphic (product_type, product_id) column pair folds into the
/// `ProductRef` tagged union on conversion; the JSON options text is
/// parsed back into a `serde_json::Value`.
#[derive(Debug, sqlx::FromRow)]
struct LineItemRow {
    id: String,
    cart_id: String,
    product_type: Option<String>,
    product_id: Option<String>,
    title: String,
    unit_price_cents: i64,
    quantity: i64,
    options: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<LineItemRow> for LineItem {
    type Error = DbError;

    fn try_from(row: LineItemRow) -> Result<Self, Self::Error> {
        let product_ref = match (row.product_type, row.product_id) {
            (Some(type_tag), Some(id)) => ProductRef::Product { type_tag, id },
            (None, None) => ProductRef::None,
            // Half-set pairs cannot be written through this repository
            _ => {
                return Err(DbError::CorruptRow(format!(
                    "line item {}: half-set product reference",
                    row.id
                )))
            }
        };

        let options = serde_json::from_str(&row.options)
            .map_err(|e| DbError::CorruptRow(format!("line item {}: {}", row.id, e)))?;

        Ok(LineItem {
            id: row.id,
            cart_id: row.cart_id,
            product_ref,
            title: row.title,
            unit_price_cents: row.unit_price_cents,
            quantity: row.quantity,
            options,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Splits a `ProductRef` back into the nullable column pair.
fn ref_columns(product_ref: &ProductRef) -> (Option<&str>, Option<&str>) {
    match product_ref {
        ProductRef::None => (None, None),
        ProductRef::Product { type_tag, id } => (Some(type_tag.as_str()), Some(id.as_str())),
    }
}

/// Repository for line item database operations.
#[derive(Debug, Clone)]
pub struct LineItemRepository {
    pool: SqlitePool,
}

impl LineItemRepository {
    /// Creates a new LineItemRepository.
    pub fn new(pool: SqlitePool) -> Self {
        LineItemRepository { pool }
    }

    /// Lists all line items of a cart, oldest first.
    pub async fn list_by_cart(&self, cart_id: &str) -> DbResult<Vec<LineItem>> {
        let rows = sqlx::query_as::<_, LineItemRow>(
            r#"
            SELECT id, cart_id, product_type, product_id, title,
                   unit_price_cents, quantity, options, created_at, updated_at
            FROM cart_items
            WHERE cart_id = ?1
            ORDER BY created_at, id
            "#,
        )
        .bind(cart_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(LineItem::try_from).collect()
    }

    /// Finds the line matching a product reference pair within a cart.
    pub async fn find_by_product(
        &self,
        cart_id: &str,
        type_tag: &str,
        product_id: &str,
    ) -> DbResult<Option<LineItem>> {
        let row = sqlx::query_as::<_, LineItemRow>(
            r#"
            SELECT id, cart_id, product_type, product_id, title,
                   unit_price_cents, quantity, options, created_at, updated_at
            FROM cart_items
            WHERE cart_id = ?1 AND product_type = ?2 AND product_id = ?3
            "#,
        )
        .bind(cart_id)
        .bind(type_tag)
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(LineItem::try_from).transpose()
    }

    /// Finds the freeform line with the given title within a cart.
    ///
    /// Only lines WITHOUT a product reference are candidates; a
    /// product-backed line that happens to share the title never matches.
    pub async fn find_by_title(&self, cart_id: &str, title: &str) -> DbResult<Option<LineItem>> {
        let row = sqlx::query_as::<_, LineItemRow>(
            r#"
            SELECT id, cart_id, product_type, product_id, title,
                   unit_price_cents, quantity, options, created_at, updated_at
            FROM cart_items
            WHERE cart_id = ?1 AND product_id IS NULL AND title = ?2
            "#,
        )
        .bind(cart_id)
        .bind(title)
        .fetch_optional(&self.pool)
        .await?;

        row.map(LineItem::try_from).transpose()
    }

    /// Inserts a new line item.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - a line with the same identity
    ///   already exists in this cart (caller should have matched it)
    /// * `Err(DbError::ForeignKeyViolation)` - owning cart not persisted
    pub async fn insert(&self, item: &LineItem) -> DbResult<()> {
        debug!(id = %item.id, cart_id = %item.cart_id, title = %item.title, "Inserting line item");

        let (product_type, product_id) = ref_columns(&item.product_ref);
        let options = serde_json::to_string(&item.options)
            .map_err(|e| DbError::Internal(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO cart_items (
                id, cart_id, product_type, product_id, title,
                unit_price_cents, quantity, options, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&item.id)
        .bind(&item.cart_id)
        .bind(product_type)
        .bind(product_id)
        .bind(&item.title)
        .bind(item.unit_price_cents)
        .bind(item.quantity)
        .bind(options)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Sets the absolute quantity of a line.
    ///
    /// The caller maintains the `quantity > 0` invariant; a line headed
    /// for zero must be deleted instead.
    pub async fn set_quantity(&self, line_id: &str, quantity: i64) -> DbResult<()> {
        debug!(id = %line_id, quantity = %quantity, "Setting line quantity");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE cart_items
            SET quantity = ?2, updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(line_id)
        .bind(quantity)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("LineItem", line_id));
        }

        Ok(())
    }

    /// Deletes a single line item.
    pub async fn delete(&self, line_id: &str) -> DbResult<()> {
        debug!(id = %line_id, "Deleting line item");

        let result = sqlx::query("DELETE FROM cart_items WHERE id = ?1")
            .bind(line_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("LineItem", line_id));
        }

        Ok(())
    }

    /// Deletes every line item owned by a cart.
    ///
    /// ## Returns
    /// The number of deleted rows (0 for an empty or unsaved cart).
    pub async fn delete_by_cart(&self, cart_id: &str) -> DbResult<u64> {
        debug!(cart_id = %cart_id, "Clearing cart lines");

        let result = sqlx::query("DELETE FROM cart_items WHERE cart_id = ?1")
            .bind(cart_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Sums the quantity across all lines of a cart.
    ///
    /// Returns 0 for an empty or not-yet-persisted cart.
    pub async fn total_quantity(&self, cart_id: &str) -> DbResult<i64> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(quantity), 0) FROM cart_items WHERE cart_id = ?1",
        )
        .bind(cart_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
