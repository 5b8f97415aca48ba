//! REST API layer: route handlers, DTOs, OpenAPI document, router composition.

pub mod doc;
pub mod dto;
pub mod handlers;

use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;
use crate::ws::handler::ws_handler;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .merge(handlers::routes())
        .merge(handlers::system::routes())
}

/// Builds the full application: REST routes, the `/ws/{room}` endpoint,
/// Swagger UI (with the `swagger-ui` feature), and the HTTP middleware.
pub fn build_app(state: AppState, request_timeout: Duration) -> Router {
    let router = build_router().route("/ws/{room}", get(ws_handler));

    #[cfg(feature = "swagger-ui")]
    let router = {
        use utoipa::OpenApi;
        router.merge(
            utoipa_swagger_ui::SwaggerUi::new("/docs")
                .url("/api-docs/openapi.json", doc::ApiDoc::openapi()),
        )
    };

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(request_timeout_layer(request_timeout)),
        )
        .with_state(state)
}

/// Fails requests that run longer than `timeout` with `408 Request Timeout`.
fn request_timeout_layer(timeout: Duration) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout)
}
