//! Integration tests for the web app's chat and order routes.
//!
//! Requests go through the full router, session layer included, with a
//! scripted completion provider and a `wiremock` ordering API.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{
    Method, Request, StatusCode,
    header::{AUTHORIZATION, CONTENT_TYPE, COOKIE, SET_COOKIE},
};
use axum::response::Response;
use serde_json::json;
use tower::ServiceExt;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use eshop_core::ChatRole;
use eshop_integration_tests::{bearer, body_bytes, body_json, token_for, validator};
use eshop_webapp::ai::{CompletionError, CompletionProvider, CompletionRequest};
use eshop_webapp::chatbot::{ChatSessions, GREETING};
use eshop_webapp::middleware::session::session_layer;
use eshop_webapp::ordering::OrderingService;
use eshop_webapp::routes;
use eshop_webapp::state::AppState;

// =============================================================================
// Helpers
// =============================================================================

/// Echoes the last user turn.
struct EchoProvider;

#[async_trait]
impl CompletionProvider for EchoProvider {
    fn model(&self) -> &str {
        "echo"
    }

    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, CompletionError> {
        let last = request
            .turns
            .iter()
            .rev()
            .find(|t| t.role == ChatRole::User)
            .map(|t| t.content.clone())
            .unwrap_or_default();
        Ok(format!("You said: {last}"))
    }
}

fn app(ordering_url: &str) -> Router {
    let base = format!("{}/", ordering_url.trim_end_matches('/'));
    let state = AppState::new(
        Arc::new(EchoProvider),
        OrderingService::new(reqwest::Client::new(), base.parse().expect("url")),
        ChatSessions::new(Duration::from_secs(60)),
        validator(),
    );
    routes::routes().layer(session_layer(false)).with_state(state)
}

fn request(
    method: Method,
    uri: &str,
    auth: Option<&str>,
    cookie: Option<&str>,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
        builder = builder.header(AUTHORIZATION, auth);
    }
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    match body {
        Some(body) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    }
}

/// `name=value` part of the session cookie, if one was set.
fn session_cookie(response: &Response) -> Option<String> {
    response
        .headers()
        .get(SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

fn contents(view: &serde_json::Value) -> Vec<String> {
    view["messages"]
        .as_array()
        .expect("messages")
        .iter()
        .filter_map(|m| m["content"].as_str().map(str::to_string))
        .collect()
}

/// Start a chat and return its session cookie.
async fn start_chat(app: &Router, auth: &str) -> String {
    let response = app
        .clone()
        .oneshot(request(Method::GET, "/chat", Some(auth), None, None))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    session_cookie(&response).expect("session cookie")
}

// =============================================================================
// Chat
// =============================================================================

#[tokio::test]
async fn test_chat_requires_token() {
    let app = app("http://127.0.0.1:9");
    for (method, uri) in [
        (Method::GET, "/chat"),
        (Method::DELETE, "/chat"),
        (Method::GET, "/user/orders"),
    ] {
        let response = app
            .clone()
            .oneshot(request(method, uri, None, None, None))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
    }

    let response = app
        .oneshot(request(
            Method::POST,
            "/chat/messages",
            Some("Bearer not-a-jwt"),
            None,
            Some(json!({"message": "hi"})),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_new_chat_shows_greeting_only() {
    let app = app("http://127.0.0.1:9");
    let response = app
        .oneshot(request(Method::GET, "/chat", Some(&bearer("buyer-1")), None, None))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert!(session_cookie(&response).is_some());
    let view = body_json(response).await;
    assert_eq!(view["phase"], "awaiting_input");
    assert_eq!(view["messages"][0]["role"], "assistant");
    assert_eq!(contents(&view), vec![GREETING.to_string()]);
}

#[tokio::test]
async fn test_send_message_appends_user_and_reply() {
    let app = app("http://127.0.0.1:9");
    let auth = bearer("buyer-1");
    let cookie = start_chat(&app, &auth).await;

    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/chat/messages",
            Some(&auth),
            Some(&cookie),
            Some(json!({"message": "Do you sell crampons?"})),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let view = body_json(response).await;
    assert_eq!(
        contents(&view),
        vec![
            GREETING.to_string(),
            "Do you sell crampons?".to_string(),
            "You said: Do you sell crampons?".to_string()
        ]
    );

    // The transcript persists across requests of the session
    let response = app
        .oneshot(request(Method::GET, "/chat", Some(&auth), Some(&cookie), None))
        .await
        .expect("response");
    assert_eq!(contents(&body_json(response).await).len(), 3);
}

#[tokio::test]
async fn test_blank_message_rejected() {
    let app = app("http://127.0.0.1:9");
    let auth = bearer("buyer-1");
    let cookie = start_chat(&app, &auth).await;

    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/chat/messages",
            Some(&auth),
            Some(&cookie),
            Some(json!({"message": "   "})),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(request(Method::GET, "/chat", Some(&auth), Some(&cookie), None))
        .await
        .expect("response");
    assert_eq!(contents(&body_json(response).await).len(), 1);
}

#[tokio::test]
async fn test_chat_bound_to_subject() {
    let app = app("http://127.0.0.1:9");
    let owner = bearer("buyer-1");
    let cookie = start_chat(&app, &owner).await;

    app.clone()
        .oneshot(request(
            Method::POST,
            "/chat/messages",
            Some(&owner),
            Some(&cookie),
            Some(json!({"message": "my secret order"})),
        ))
        .await
        .expect("response");

    let response = app
        .oneshot(request(
            Method::GET,
            "/chat",
            Some(&bearer("buyer-2")),
            Some(&cookie),
            None,
        ))
        .await
        .expect("response");
    assert_eq!(contents(&body_json(response).await), vec![GREETING.to_string()]);
}

#[tokio::test]
async fn test_delete_discards_chat() {
    let app = app("http://127.0.0.1:9");
    let auth = bearer("buyer-1");
    let cookie = start_chat(&app, &auth).await;

    app.clone()
        .oneshot(request(
            Method::POST,
            "/chat/messages",
            Some(&auth),
            Some(&cookie),
            Some(json!({"message": "hello"})),
        ))
        .await
        .expect("response");

    let response = app
        .clone()
        .oneshot(request(Method::DELETE, "/chat", Some(&auth), Some(&cookie), None))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(request(Method::GET, "/chat", Some(&auth), Some(&cookie), None))
        .await
        .expect("response");
    assert_eq!(contents(&body_json(response).await), vec![GREETING.to_string()]);
}

#[tokio::test]
async fn test_stream_emits_one_event_per_change() {
    let app = app("http://127.0.0.1:9");
    let auth = bearer("buyer-1");
    let cookie = start_chat(&app, &auth).await;

    let response = app
        .oneshot(request(
            Method::POST,
            "/chat/messages/stream",
            Some(&auth),
            Some(&cookie),
            Some(json!({"message": "stream please"})),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("text/event-stream"))
    );

    let body = String::from_utf8(body_bytes(response).await).expect("utf8");
    assert_eq!(body.matches("event: transcript").count(), 2);

    let views: Vec<serde_json::Value> = body
        .lines()
        .filter_map(|line| line.strip_prefix("data: "))
        .map(|data| serde_json::from_str(data).expect("event json"))
        .collect();
    assert_eq!(views.len(), 2);
    assert_eq!(views[0]["phase"], "awaiting_completion");
    assert_eq!(contents(&views[0]).len(), 2);
    assert_eq!(views[1]["phase"], "awaiting_input");
    assert_eq!(
        contents(&views[1]).last().map(String::as_str),
        Some("You said: stream please")
    );
}

// =============================================================================
// Orders
// =============================================================================

#[tokio::test]
async fn test_user_orders_forwards_token() {
    let server = MockServer::start().await;
    let token = token_for("buyer-1", &[("name", "Ada")]);

    Mock::given(method("GET"))
        .and(path("/api/v1/orders/"))
        .and(header("authorization", format!("Bearer {token}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"orderNumber": 3, "date": "2024-03-02T09:30:00Z", "status": "Paid", "total": 42.5}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let response = app(&server.uri())
        .oneshot(request(
            Method::GET,
            "/user/orders",
            Some(&format!("Bearer {token}")),
            None,
            None,
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let orders = body_json(response).await;
    assert_eq!(orders[0]["orderNumber"], 3);
    assert_eq!(orders[0]["status"], "Paid");
    assert_eq!(orders[0]["total"], 42.5);
}

#[tokio::test]
async fn test_user_orders_maps_upstream_failures() {
    for (upstream, expected) in [
        (401, StatusCode::UNAUTHORIZED),
        (500, StatusCode::BAD_GATEWAY),
    ] {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(upstream))
            .mount(&server)
            .await;

        let response = app(&server.uri())
            .oneshot(request(
                Method::GET,
                "/user/orders",
                Some(&bearer("buyer-1")),
                None,
                None,
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), expected, "upstream {upstream}");
    }
}

#[tokio::test]
async fn test_health() {
    let response = app("http://127.0.0.1:9")
        .oneshot(request(Method::GET, "/health", None, None, None))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
}
