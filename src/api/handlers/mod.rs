//! REST endpoint handlers organized by resource.

pub mod auth;
pub mod items;
pub mod system;
pub mod trades;
pub mod users;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(users::routes())
        .merge(items::routes())
        .merge(trades::routes())
        .merge(auth::routes())
}
