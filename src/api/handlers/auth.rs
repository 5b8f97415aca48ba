//! Credential check endpoint.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{LoginRequest, UserResponse};
use crate::app_state::AppState;
use crate::error::{ApiError, ErrorResponse};

/// `POST /login/` — Check credentials and return the matching user.
///
/// No session is created; the response only confirms the credentials.
///
/// # Errors
///
/// Returns [`ApiError::InvalidCredentials`] when the identifier is unknown
/// or the password is wrong, without saying which.
#[utoipa::path(
    post,
    path = "/login/",
    tag = "Auth",
    summary = "Check credentials",
    description = "`identifier` is matched against email first, then username.",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Credentials valid", body = UserResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .store
        .authenticate(req.identifier.trim(), &req.password)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;
    let items = state.store.list_items_by_owner(user.id).await?;
    Ok(Json(UserResponse::new(user, items)))
}

/// Auth routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/login/", post(login))
}
