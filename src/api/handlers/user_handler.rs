//! User onboarding handlers.

use axum::{extract::State, http::StatusCode, routing::post, Router};

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::domain::CreateUserRequest;
use crate::errors::AppResult;

/// Create user routes
pub fn user_routes() -> Router<AppState> {
    Router::new().route("/", post(create_user))
}

/// Create a user
///
/// Responds as soon as the follow-up work is queued: the welcome gift and
/// the socket connection happen afterwards.
#[utoipa::path(
    post,
    path = "/users",
    tag = "Users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = String, content_type = "text/plain"),
        (status = 400, description = "Validation error"),
        (status = 409, description = "A connection timeout is already pending for this user id")
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateUserRequest>,
) -> AppResult<(StatusCode, String)> {
    let confirmation = state.onboarding.create_user(payload).await?;

    Ok((StatusCode::CREATED, confirmation))
}
