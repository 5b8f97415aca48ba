//! User handlers: registration, listing, deletion, and per-user items/trades.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get};
use axum::{Json, Router};

use crate::api::dto::{
    CreateItemRequest, CreateTradeRequest, CreateUserRequest, ItemResponse, PageParams,
    TradeResponse, UserResponse,
};
use crate::app_state::AppState;
use crate::domain::UserId;
use crate::error::{ApiError, ErrorResponse};
use crate::persistence::{Store, User};

const DEFAULT_USER_LIMIT: u32 = 10;
const DEFAULT_TRADE_LIMIT: u32 = 100;

/// `POST /users/` — Register a user.
///
/// # Errors
///
/// Returns [`ApiError::Conflict`] if the email or username is taken.
#[utoipa::path(
    post,
    path = "/users/",
    tag = "Users",
    summary = "Register a user",
    description = "Creates a user with a hashed password. Email and username must each be unique.",
    request_body = CreateUserRequest,
    responses(
        (status = 200, description = "User created", body = UserResponse),
        (status = 400, description = "Invalid input, or email/username already taken", body = ErrorResponse),
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.store.create_user(req.into_new_user()?).await?;
    Ok(Json(UserResponse::new(user, Vec::new())))
}

/// `GET /users/` — List users with their items.
///
/// # Errors
///
/// Returns [`ApiError`] on internal failures.
#[utoipa::path(
    get,
    path = "/users/",
    tag = "Users",
    summary = "List users",
    description = "Returns a page of users, each with the items they own. `limit` defaults to 10.",
    params(PageParams),
    responses(
        (status = 200, description = "Users", body = Vec<UserResponse>),
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<impl IntoResponse, ApiError> {
    let users = state
        .store
        .list_users(params.page(DEFAULT_USER_LIMIT))
        .await?;
    Ok(Json(with_items(&state.store, users).await?))
}

/// `DELETE /users/{id}` — Delete a user, its items and its trades.
///
/// # Errors
///
/// Returns [`ApiError::UserNotFound`] if the user does not exist.
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "Users",
    summary = "Delete a user",
    description = "Removes the user. Owned items and trades involving the user are removed with it.",
    params(
        ("id" = i64, Path, description = "User id"),
    ),
    responses(
        (status = 204, description = "User deleted"),
        (status = 404, description = "User not found", body = ErrorResponse),
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> Result<impl IntoResponse, ApiError> {
    if state.store.delete_user(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::UserNotFound(id))
    }
}

/// `POST /users/{id}/items/` — List a new item for a user.
///
/// # Errors
///
/// Returns [`ApiError::UserNotFound`] if the owner does not exist.
#[utoipa::path(
    post,
    path = "/users/{id}/items/",
    tag = "Users",
    summary = "Create an item for a user",
    params(
        ("id" = i64, Path, description = "Owner user id"),
    ),
    request_body = CreateItemRequest,
    responses(
        (status = 200, description = "Item created", body = ItemResponse),
        (status = 400, description = "Invalid item", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
    )
)]
pub async fn create_item_for_user(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
    Json(req): Json<CreateItemRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let item = state.store.create_item(id, req.into_new_item()?).await?;
    Ok(Json(ItemResponse::from(item)))
}

/// `GET /users/{id}/items/` — List a user's items.
///
/// # Errors
///
/// Returns [`ApiError::UserNotFound`] if the user does not exist.
#[utoipa::path(
    get,
    path = "/users/{id}/items/",
    tag = "Users",
    summary = "List a user's items",
    params(
        ("id" = i64, Path, description = "Owner user id"),
    ),
    responses(
        (status = 200, description = "Items owned by the user", body = Vec<ItemResponse>),
        (status = 404, description = "User not found", body = ErrorResponse),
    )
)]
pub async fn list_user_items(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> Result<impl IntoResponse, ApiError> {
    if state.store.get_user(id).await?.is_none() {
        return Err(ApiError::UserNotFound(id));
    }
    let items = state.store.list_items_by_owner(id).await?;
    Ok(Json(
        items.into_iter().map(ItemResponse::from).collect::<Vec<_>>(),
    ))
}

/// `POST /users/{id}/trades/` — Propose a trade.
///
/// # Errors
///
/// Returns [`ApiError`] if a user or item is missing, an item is not
/// owned by its side, or the user would trade with themselves.
#[utoipa::path(
    post,
    path = "/users/{id}/trades/",
    tag = "Trades",
    summary = "Propose a trade",
    description = "The path user offers one of their items for an item owned by another user. The trade starts pending.",
    params(
        ("id" = i64, Path, description = "Proposer user id"),
    ),
    request_body = CreateTradeRequest,
    responses(
        (status = 201, description = "Trade proposed", body = TradeResponse),
        (status = 400, description = "Ownership mismatch or self-trade", body = ErrorResponse),
        (status = 404, description = "User or item not found", body = ErrorResponse),
    )
)]
pub async fn propose_trade(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
    Json(req): Json<CreateTradeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let trade = state
        .trades
        .propose(id, req.proposer_item_id, req.responder_item_id)
        .await?;
    Ok((StatusCode::CREATED, Json(TradeResponse::from(trade))))
}

/// `GET /users/{id}/trades/` — List trades a user is part of.
///
/// # Errors
///
/// Returns [`ApiError::UserNotFound`] if the user does not exist.
#[utoipa::path(
    get,
    path = "/users/{id}/trades/",
    tag = "Trades",
    summary = "List a user's trades",
    description = "Returns trades where the user is proposer or responder, newest first. `limit` defaults to 100.",
    params(
        ("id" = i64, Path, description = "User id"),
        PageParams,
    ),
    responses(
        (status = 200, description = "Trades", body = Vec<TradeResponse>),
        (status = 404, description = "User not found", body = ErrorResponse),
    )
)]
pub async fn list_user_trades(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
    Query(params): Query<PageParams>,
) -> Result<impl IntoResponse, ApiError> {
    let trades = state
        .trades
        .trades_for_user(id, params.page(DEFAULT_TRADE_LIMIT))
        .await?;
    Ok(Json(
        trades
            .into_iter()
            .map(TradeResponse::from)
            .collect::<Vec<_>>(),
    ))
}

/// Attaches each user's items with a single item query.
async fn with_items(store: &Store, users: Vec<User>) -> Result<Vec<UserResponse>, ApiError> {
    let ids: Vec<UserId> = users.iter().map(|u| u.id).collect();
    let mut items = store.items_for_owners(&ids).await?;
    Ok(users
        .into_iter()
        .map(|user| {
            let owned = items.remove(&user.id).unwrap_or_default();
            UserResponse::new(user, owned)
        })
        .collect())
}

/// User routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users/", get(list_users).post(create_user))
        .route("/users/{id}", delete(delete_user))
        .route(
            "/users/{id}/items/",
            get(list_user_items).post(create_item_for_user),
        )
        .route(
            "/users/{id}/trades/",
            get(list_user_trades).post(propose_trade),
        )
}
