//! Item handlers: listing, search, retrieval and deletion.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{ItemResponse, ItemSearchParams, PageParams};
use crate::app_state::AppState;
use crate::domain::ItemId;
use crate::error::{ApiError, ErrorResponse};

const DEFAULT_ITEM_LIMIT: u32 = 100;

/// `GET /items/` — List all items.
///
/// # Errors
///
/// Returns [`ApiError`] on internal failures.
#[utoipa::path(
    get,
    path = "/items/",
    tag = "Items",
    summary = "List items",
    description = "Returns a page of items in id order. `limit` defaults to 100.",
    params(PageParams),
    responses(
        (status = 200, description = "Items", body = Vec<ItemResponse>),
    )
)]
pub async fn list_items(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<impl IntoResponse, ApiError> {
    let items = state
        .store
        .list_items(params.page(DEFAULT_ITEM_LIMIT))
        .await?;
    Ok(Json(
        items.into_iter().map(ItemResponse::from).collect::<Vec<_>>(),
    ))
}

/// `GET /items/search` — Filter items by text, price range and owner.
///
/// # Errors
///
/// Returns [`ApiError`] on internal failures.
#[utoipa::path(
    get,
    path = "/items/search",
    tag = "Items",
    summary = "Search items",
    description = "All filters are optional and combined with AND. `q` matches name or description case-insensitively; price bounds are inclusive.",
    params(ItemSearchParams),
    responses(
        (status = 200, description = "Matching items", body = Vec<ItemResponse>),
    )
)]
pub async fn search_items(
    State(state): State<AppState>,
    Query(params): Query<ItemSearchParams>,
) -> Result<impl IntoResponse, ApiError> {
    let (filter, page) = params.into_query();
    let items = state.store.search_items(&filter, page).await?;
    Ok(Json(
        items.into_iter().map(ItemResponse::from).collect::<Vec<_>>(),
    ))
}

/// `GET /items/{id}` — Get one item.
///
/// # Errors
///
/// Returns [`ApiError::ItemNotFound`] if the item does not exist.
#[utoipa::path(
    get,
    path = "/items/{id}",
    tag = "Items",
    summary = "Get an item",
    params(
        ("id" = i64, Path, description = "Item id"),
    ),
    responses(
        (status = 200, description = "Item", body = ItemResponse),
        (status = 404, description = "Item not found", body = ErrorResponse),
    )
)]
pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<ItemId>,
) -> Result<impl IntoResponse, ApiError> {
    let item = state
        .store
        .get_item(id)
        .await?
        .ok_or(ApiError::ItemNotFound(id))?;
    Ok(Json(ItemResponse::from(item)))
}

/// `DELETE /items/{id}` — Delete an item, returning it.
///
/// # Errors
///
/// Returns [`ApiError::ItemNotFound`] if the item does not exist.
#[utoipa::path(
    delete,
    path = "/items/{id}",
    tag = "Items",
    summary = "Delete an item",
    description = "Removes the item and any trade that references it, and returns the deleted item.",
    params(
        ("id" = i64, Path, description = "Item id"),
    ),
    responses(
        (status = 200, description = "Deleted item", body = ItemResponse),
        (status = 404, description = "Item not found", body = ErrorResponse),
    )
)]
pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<ItemId>,
) -> Result<impl IntoResponse, ApiError> {
    let item = state
        .store
        .delete_item(id)
        .await?
        .ok_or(ApiError::ItemNotFound(id))?;
    Ok(Json(ItemResponse::from(item)))
}

/// Item routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/items/", get(list_items))
        .route("/items/search", get(search_items))
        .route("/items/{id}", get(get_item).delete(delete_item))
}
