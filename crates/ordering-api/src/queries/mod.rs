//! Read-side order queries.
//!
//! Route handlers depend on the [`OrderQueries`] trait rather than on the
//! database directly, so the HTTP surface can be exercised against an
//! in-memory implementation.

pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use eshop_core::{CardTypeId, OrderId, OrderStatus};

pub use postgres::PgOrderQueries;

/// Errors that can occur while querying orders.
#[derive(Debug, Error)]
pub enum QueryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested order does not exist.
    #[error("order {0} not found")]
    NotFound(OrderId),
}

/// Full order projection returned by `GET /{orderId}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_number: OrderId,
    /// Identity of the buyer who placed the order.
    pub user_id: Option<String>,
    pub date: DateTime<Utc>,
    pub status: OrderStatus,
    pub description: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
    pub order_items: Vec<OrderItem>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
}

/// A line of an [`Order`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_name: String,
    pub units: i32,
    #[serde(with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
    pub picture_url: Option<String>,
}

impl OrderItem {
    /// Units times unit price.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.units)
    }
}

/// Sum of all line totals.
#[must_use]
pub fn order_total(items: &[OrderItem]) -> Decimal {
    items.iter().map(OrderItem::line_total).sum()
}

/// Compact order view used in order listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub order_number: OrderId,
    pub date: DateTime<Utc>,
    pub status: OrderStatus,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
}

/// Payment card type reference value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardType {
    pub id: CardTypeId,
    pub name: String,
}

/// Read-only queries over the ordering store.
#[async_trait]
pub trait OrderQueries: Send + Sync {
    /// Load one order with its items.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::NotFound` when no order has this id, or another
    /// variant when the store fails.
    async fn get_order(&self, id: OrderId) -> Result<Order, QueryError>;

    /// List summaries of every order placed by the buyer with this identity.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    async fn get_orders_from_user(&self, user_id: &str) -> Result<Vec<OrderSummary>, QueryError>;

    /// List all card types.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    async fn get_card_types(&self) -> Result<Vec<CardType>, QueryError>;

    /// Check that the store is reachable.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be reached.
    async fn ping(&self) -> Result<(), QueryError>;
}
