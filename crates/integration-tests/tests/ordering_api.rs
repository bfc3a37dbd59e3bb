//! Integration tests for the ordering API HTTP surface.
//!
//! The router runs against an in-memory order store and real bearer token
//! validation.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode, header::AUTHORIZATION};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tower::ServiceExt;

use eshop_core::{CardTypeId, OrderId, OrderStatus};
use eshop_integration_tests::{bearer, body_bytes, body_json, validator};
use eshop_ordering_api::identity::JwtIdentityService;
use eshop_ordering_api::queries::{
    CardType, Order, OrderItem, OrderQueries, OrderSummary, QueryError, order_total,
};
use eshop_ordering_api::routes;
use eshop_ordering_api::state::AppState;

// =============================================================================
// In-memory store
// =============================================================================

#[derive(Default)]
struct MemoryOrders {
    orders: Vec<Order>,
    /// Fail every query as a broken store would.
    broken: bool,
}

impl MemoryOrders {
    fn check(&self) -> Result<(), QueryError> {
        if self.broken {
            return Err(QueryError::DataCorruption("store unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl OrderQueries for MemoryOrders {
    async fn get_order(&self, id: OrderId) -> Result<Order, QueryError> {
        self.check()?;
        self.orders
            .iter()
            .find(|o| o.order_number == id)
            .cloned()
            .ok_or(QueryError::NotFound(id))
    }

    async fn get_orders_from_user(&self, user_id: &str) -> Result<Vec<OrderSummary>, QueryError> {
        self.check()?;
        Ok(self
            .orders
            .iter()
            .filter(|o| o.user_id.as_deref() == Some(user_id))
            .map(|o| OrderSummary {
                order_number: o.order_number,
                date: o.date,
                status: o.status,
                total: o.total,
            })
            .collect())
    }

    async fn get_card_types(&self) -> Result<Vec<CardType>, QueryError> {
        self.check()?;
        Ok([(1, "Amex"), (2, "Visa"), (3, "MasterCard")]
            .into_iter()
            .map(|(id, name)| CardType {
                id: CardTypeId::new(id),
                name: name.to_string(),
            })
            .collect())
    }

    async fn ping(&self) -> Result<(), QueryError> {
        self.check()
    }
}

fn order(id: i32, user_id: &str) -> Order {
    let items = vec![
        OrderItem {
            product_name: "Summit Trekking Poles".to_string(),
            units: 2,
            unit_price: Decimal::new(3950, 2),
            picture_url: None,
        },
        OrderItem {
            product_name: "Ridge Runner Backpack".to_string(),
            units: 1,
            unit_price: Decimal::new(8900, 2),
            picture_url: Some("/items/12/pic".to_string()),
        },
    ];
    Order {
        order_number: OrderId::new(id),
        user_id: Some(user_id.to_string()),
        date: DateTime::parse_from_rfc3339("2024-03-01T12:00:00Z")
            .expect("date")
            .with_timezone(&Utc),
        status: OrderStatus::Submitted,
        description: None,
        street: Some("1 Peak Rd".to_string()),
        city: Some("Boulder".to_string()),
        state: Some("CO".to_string()),
        zip_code: Some("80302".to_string()),
        country: Some("USA".to_string()),
        total: order_total(&items),
        order_items: items,
    }
}

fn app(store: MemoryOrders) -> axum::Router {
    let state = AppState::new(
        Arc::new(store),
        Arc::new(JwtIdentityService::from_validator(validator())),
    );
    routes::routes().with_state(state)
}

fn get(uri: &str, auth: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(auth) = auth {
        builder = builder.header(AUTHORIZATION, auth);
    }
    builder.body(Body::empty()).expect("request")
}

// =============================================================================
// GET /api/v1/orders/{orderId}
// =============================================================================

#[tokio::test]
async fn test_get_order_returns_projection() {
    let store = MemoryOrders {
        orders: vec![order(42, "buyer-1")],
        ..Default::default()
    };
    let response = app(store)
        .oneshot(get("/api/v1/orders/42", Some(&bearer("buyer-1"))))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["orderNumber"], 42);
    assert_eq!(json["status"], "Submitted");
    assert_eq!(json["total"], 168.0);
    assert_eq!(json["zipCode"], "80302");
    assert_eq!(json["orderItems"][1]["productName"], "Ridge Runner Backpack");
    assert_eq!(json["orderItems"][0]["unitPrice"], 39.5);
}

#[tokio::test]
async fn test_get_order_missing_is_empty_404() {
    let response = app(MemoryOrders::default())
        .oneshot(get("/api/v1/orders/7", Some(&bearer("buyer-1"))))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_bytes(response).await.is_empty());
}

#[tokio::test]
async fn test_get_order_non_integer_id_is_404() {
    for uri in ["/api/v1/orders/abc", "/api/v1/orders/99999999999", "/api/v1/orders/1.5"] {
        let response = app(MemoryOrders::default())
            .oneshot(get(uri, Some(&bearer("buyer-1"))))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
    }
}

#[tokio::test]
async fn test_get_order_store_failure_is_404() {
    let store = MemoryOrders {
        orders: vec![order(42, "buyer-1")],
        broken: true,
    };
    let response = app(store)
        .oneshot(get("/api/v1/orders/42", Some(&bearer("buyer-1"))))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// GET /api/v1/orders/
// =============================================================================

#[tokio::test]
async fn test_list_orders_only_for_current_user() {
    let store = MemoryOrders {
        orders: vec![order(1, "buyer-1"), order(2, "buyer-2"), order(3, "buyer-1")],
        ..Default::default()
    };
    let app = app(store);

    let response = app
        .clone()
        .oneshot(get("/api/v1/orders/", Some(&bearer("buyer-1"))))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let numbers: Vec<i64> = json
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|o| o["orderNumber"].as_i64())
        .collect();
    assert_eq!(numbers, vec![1, 3]);
    assert_eq!(json[0]["total"], 168.0);
    assert!(json[0].get("orderItems").is_none());

    // Same route without the trailing slash
    let response = app
        .oneshot(get("/api/v1/orders", Some(&bearer("buyer-2"))))
        .await
        .expect("response");
    assert_eq!(body_json(response).await.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_list_orders_empty() {
    let response = app(MemoryOrders::default())
        .oneshot(get("/api/v1/orders/", Some(&bearer("new-buyer"))))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, serde_json::json!([]));
}

// =============================================================================
// GET /api/v1/orders/cardtypes
// =============================================================================

#[tokio::test]
async fn test_card_types() {
    let response = app(MemoryOrders::default())
        .oneshot(get("/api/v1/orders/cardtypes", Some(&bearer("buyer-1"))))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        serde_json::json!([
            {"id": 1, "name": "Amex"},
            {"id": 2, "name": "Visa"},
            {"id": 3, "name": "MasterCard"}
        ])
    );
}

// =============================================================================
// Identity
// =============================================================================

#[tokio::test]
async fn test_unauthenticated_requests_rejected() {
    for uri in ["/api/v1/orders/", "/api/v1/orders/cardtypes", "/api/v1/orders/42"] {
        let response = app(MemoryOrders::default())
            .oneshot(get(uri, None))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
    }
}

#[tokio::test]
async fn test_token_from_wrong_issuer_rejected() {
    let forged = eshop_core::identity::sign_claims(
        &serde_json::json!({
            "sub": "buyer-1",
            "iss": "https://elsewhere.test",
            "exp": Utc::now().timestamp() + 3600,
        }),
        eshop_integration_tests::SECRET,
    )
    .expect("sign");

    let response = app(MemoryOrders::default())
        .oneshot(get("/api/v1/orders/", Some(&format!("Bearer {forged}"))))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_needs_no_token() {
    let response = app(MemoryOrders::default())
        .oneshot(get("/health", None))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_readiness_reports_store_failure() {
    let store = MemoryOrders {
        broken: true,
        ..Default::default()
    };
    let response = app(store)
        .oneshot(get("/health/ready", None))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}
