//! `PostgreSQL` implementation of [`OrderQueries`].
//!
//! Queries are checked at runtime so the crate builds without a live
//! database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::instrument;

use eshop_core::{CardTypeId, OrderId, OrderStatus};

use super::{CardType, Order, OrderItem, OrderQueries, OrderSummary, QueryError, order_total};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    user_id: Option<String>,
    order_date: DateTime<Utc>,
    order_status: String,
    description: Option<String>,
    street: Option<String>,
    city: Option<String>,
    state: Option<String>,
    zip_code: Option<String>,
    country: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    product_name: String,
    units: i32,
    unit_price: Decimal,
    picture_url: Option<String>,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        Self {
            product_name: row.product_name,
            units: row.units,
            unit_price: row.unit_price,
            picture_url: row.picture_url,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderSummaryRow {
    id: i32,
    order_date: DateTime<Utc>,
    order_status: String,
    total: Decimal,
}

impl TryFrom<OrderSummaryRow> for OrderSummary {
    type Error = QueryError;

    fn try_from(row: OrderSummaryRow) -> Result<Self, Self::Error> {
        Ok(Self {
            order_number: OrderId::new(row.id),
            date: row.order_date,
            status: parse_status(&row.order_status)?,
            total: row.total,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CardTypeRow {
    id: i32,
    name: String,
}

impl From<CardTypeRow> for CardType {
    fn from(row: CardTypeRow) -> Self {
        Self {
            id: CardTypeId::new(row.id),
            name: row.name,
        }
    }
}

fn parse_status(value: &str) -> Result<OrderStatus, QueryError> {
    value.parse().map_err(QueryError::DataCorruption)
}

// =============================================================================
// Queries
// =============================================================================

/// Order queries backed by the `ordering` schema.
#[derive(Clone)]
pub struct PgOrderQueries {
    pool: PgPool,
}

impl PgOrderQueries {
    /// Create a query service over a connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderQueries for PgOrderQueries {
    #[instrument(skip(self), fields(order_id = %id))]
    async fn get_order(&self, id: OrderId) -> Result<Order, QueryError> {
        let row = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT o.id, b.identity_guid AS user_id, o.order_date, o.order_status,
                   o.description, o.street, o.city, o.state, o.zip_code, o.country
            FROM ordering.orders o
            LEFT JOIN ordering.buyers b ON b.id = o.buyer_id
            WHERE o.id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(QueryError::NotFound(id))?;

        let items: Vec<OrderItem> = sqlx::query_as::<_, OrderItemRow>(
            r"
            SELECT product_name, units, unit_price, picture_url
            FROM ordering.order_items
            WHERE order_id = $1
            ORDER BY id
            ",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

        Ok(Order {
            order_number: OrderId::new(row.id),
            user_id: row.user_id,
            date: row.order_date,
            status: parse_status(&row.order_status)?,
            description: row.description,
            street: row.street,
            city: row.city,
            state: row.state,
            zip_code: row.zip_code,
            country: row.country,
            total: order_total(&items),
            order_items: items,
        })
    }

    #[instrument(skip(self))]
    async fn get_orders_from_user(&self, user_id: &str) -> Result<Vec<OrderSummary>, QueryError> {
        let rows = sqlx::query_as::<_, OrderSummaryRow>(
            r"
            SELECT o.id, o.order_date, o.order_status,
                   COALESCE(SUM(oi.units * oi.unit_price), 0) AS total
            FROM ordering.orders o
            JOIN ordering.buyers b ON b.id = o.buyer_id
            LEFT JOIN ordering.order_items oi ON oi.order_id = o.id
            WHERE b.identity_guid = $1
            GROUP BY o.id, o.order_date, o.order_status
            ORDER BY o.id
            ",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    #[instrument(skip(self))]
    async fn get_card_types(&self) -> Result<Vec<CardType>, QueryError> {
        let rows = sqlx::query_as::<_, CardTypeRow>(
            "SELECT id, name FROM ordering.card_types ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn ping(&self) -> Result<(), QueryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
