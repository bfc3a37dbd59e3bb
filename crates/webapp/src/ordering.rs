//! Client for the ordering API.
//!
//! Calls are made on behalf of the signed-in user by forwarding their bearer
//! token.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;
use url::Url;

use eshop_core::{OrderId, OrderStatus};

const ORDERS_PATH: &str = "api/v1/orders/";

/// Errors that can occur when calling the ordering API.
#[derive(Debug, Error)]
pub enum OrderingError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The ordering API rejected the forwarded token.
    #[error("ordering API rejected the credentials")]
    Unauthorized,

    #[error("ordering API returned {0}")]
    Status(u16),

    #[error("invalid ordering API URL: {0}")]
    Url(#[from] url::ParseError),
}

/// An order as listed for the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    pub order_number: OrderId,
    pub date: DateTime<Utc>,
    pub status: OrderStatus,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
}

/// HTTP client for the ordering API.
#[derive(Clone)]
pub struct OrderingService {
    client: reqwest::Client,
    base_url: Url,
}

impl OrderingService {
    /// Create a client for the API rooted at `base_url`.
    #[must_use]
    pub fn new(client: reqwest::Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    /// List the orders of the user the token belongs to.
    ///
    /// # Errors
    ///
    /// Returns `OrderingError::Unauthorized` if the API rejects the token,
    /// `OrderingError::Status` for other non-success responses, or the
    /// underlying HTTP error.
    #[instrument(skip(self, bearer_token))]
    pub async fn get_orders(&self, bearer_token: &str) -> Result<Vec<OrderRecord>, OrderingError> {
        let url = self.base_url.join(ORDERS_PATH)?;
        let response = self
            .client
            .get(url)
            .bearer_auth(bearer_token)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(OrderingError::Unauthorized);
        }
        if !status.is_success() {
            return Err(OrderingError::Status(status.as_u16()));
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::parse_base_url;

    fn service(server: &MockServer) -> OrderingService {
        OrderingService::new(
            reqwest::Client::new(),
            parse_base_url(&server.uri()).expect("url"),
        )
    }

    #[tokio::test]
    async fn test_get_orders_forwards_token_and_decodes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/orders/"))
            .and(header("authorization", "Bearer token-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {
                    "orderNumber": 11,
                    "date": "2024-03-01T12:00:00Z",
                    "status": "Shipped",
                    "total": 129.5
                }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let orders = service(&server).get_orders("token-123").await.expect("orders");
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].order_number, OrderId::new(11));
        assert_eq!(orders[0].status, OrderStatus::Shipped);
        assert_eq!(orders[0].total, Decimal::new(1295, 1));
    }

    #[tokio::test]
    async fn test_get_orders_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = service(&server).get_orders("expired").await.expect_err("401");
        assert!(matches!(err, OrderingError::Unauthorized));
    }

    #[tokio::test]
    async fn test_get_orders_empty_list() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/orders/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let orders = service(&server).get_orders("token").await.expect("orders");
        assert!(orders.is_empty());
    }
}
