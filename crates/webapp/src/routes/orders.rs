//! Order history for the signed-in user.

use axum::{Json, Router, extract::State, routing::get};

use crate::error::AppError;
use crate::middleware::RequireUser;
use crate::ordering::OrderRecord;
use crate::state::AppState;

/// Build the orders router.
pub fn router() -> Router<AppState> {
    Router::new().route("/user/orders", get(my_orders))
}

/// List the signed-in user's orders via the ordering API.
///
/// GET /user/orders
async fn my_orders(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<Vec<OrderRecord>>, AppError> {
    let orders = state.ordering().get_orders(&user.token).await?;
    Ok(Json(orders))
}
