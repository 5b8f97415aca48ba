//! Trade handlers: retrieval and status transitions.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{TradeResponse, UpdateTradeStatusRequest};
use crate::app_state::AppState;
use crate::domain::TradeId;
use crate::error::{ApiError, ErrorResponse};

/// `GET /trades/{id}` — Get one trade.
///
/// # Errors
///
/// Returns [`ApiError::TradeNotFound`] if the trade does not exist.
#[utoipa::path(
    get,
    path = "/trades/{id}",
    tag = "Trades",
    summary = "Get a trade",
    params(
        ("id" = i64, Path, description = "Trade id"),
    ),
    responses(
        (status = 200, description = "Trade", body = TradeResponse),
        (status = 404, description = "Trade not found", body = ErrorResponse),
    )
)]
pub async fn get_trade(
    State(state): State<AppState>,
    Path(id): Path<TradeId>,
) -> Result<impl IntoResponse, ApiError> {
    let trade = state.trades.get_trade(id).await?;
    Ok(Json(TradeResponse::from(trade)))
}

/// `PATCH /trades/{id}` — Accept, reject or cancel a pending trade.
///
/// # Errors
///
/// Returns [`ApiError::TradeNotFound`] or [`ApiError::InvalidTransition`].
#[utoipa::path(
    patch,
    path = "/trades/{id}",
    tag = "Trades",
    summary = "Change a trade's status",
    description = "Moves a pending trade to accepted, rejected or cancelled. Terminal trades cannot change.",
    params(
        ("id" = i64, Path, description = "Trade id"),
    ),
    request_body = UpdateTradeStatusRequest,
    responses(
        (status = 200, description = "Updated trade", body = TradeResponse),
        (status = 404, description = "Trade not found", body = ErrorResponse),
        (status = 409, description = "Transition not allowed", body = ErrorResponse),
    )
)]
pub async fn update_trade_status(
    State(state): State<AppState>,
    Path(id): Path<TradeId>,
    Json(req): Json<UpdateTradeStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let trade = state.trades.update_status(id, req.status).await?;
    Ok(Json(TradeResponse::from(trade)))
}

/// Trade routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/trades/{id}", get(get_trade).patch(update_trade_status))
}
