//! Order route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use eshop_core::OrderId;
use tracing::instrument;

use crate::error::AppError;
use crate::identity::CurrentUser;
use crate::queries::{CardType, OrderSummary};
use crate::state::AppState;

/// Get a single order by id.
///
/// Any failure (non-numeric id, missing order, store error) is a 404 with an
/// empty body; callers cannot tell these apart.
#[instrument(skip(state, _user))]
pub async fn get_order(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(order_id): Path<String>,
) -> Response {
    let id = match order_id.parse::<OrderId>() {
        Ok(id) => id,
        Err(e) => {
            tracing::debug!(error = %e, "Order id is not an integer");
            return StatusCode::NOT_FOUND.into_response();
        }
    };

    match state.queries().get_order(id).await {
        Ok(order) => Json(order).into_response(),
        Err(e) => {
            tracing::debug!(error = %e, "Order lookup failed");
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

/// List summaries of the current user's orders.
#[instrument(skip(state))]
pub async fn get_orders_by_user(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<Vec<OrderSummary>>, AppError> {
    let orders = state.queries().get_orders_from_user(&user_id).await?;
    Ok(Json(orders))
}

/// List all card types.
#[instrument(skip(state, _user))]
pub async fn get_card_types(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> Result<Json<Vec<CardType>>, AppError> {
    let card_types = state.queries().get_card_types().await?;
    Ok(Json(card_types))
}
