//! Timer inspection and cancellation handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};

use crate::api::AppState;
use crate::errors::{AppError, AppResult, OptionExt};
use crate::scheduler::TimerInfo;

/// Create timer routes
pub fn timer_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_timers))
        .route("/:name", get(get_timer).delete(cancel_timer))
}

/// List registered timers
#[utoipa::path(
    get,
    path = "/timers",
    tag = "Timers",
    responses(
        (status = 200, description = "Registered timers sorted by name", body = [TimerInfo])
    )
)]
pub async fn list_timers(State(state): State<AppState>) -> Json<Vec<TimerInfo>> {
    Json(state.scheduler.timers())
}

/// Get a timer by name
#[utoipa::path(
    get,
    path = "/timers/{name}",
    tag = "Timers",
    params(("name" = String, Path, description = "Timer name, e.g. 16532_establish_ws")),
    responses(
        (status = 200, description = "Timer found", body = TimerInfo),
        (status = 404, description = "No timer with that name")
    )
)]
pub async fn get_timer(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> AppResult<Json<TimerInfo>> {
    state.scheduler.get(&name).ok_or_not_found().map(Json)
}

/// Cancel a timer by name
#[utoipa::path(
    delete,
    path = "/timers/{name}",
    tag = "Timers",
    params(("name" = String, Path, description = "Timer name")),
    responses(
        (status = 204, description = "Timer cancelled"),
        (status = 404, description = "No timer with that name")
    )
)]
pub async fn cancel_timer(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> AppResult<StatusCode> {
    if state.scheduler.cancel(&name) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}
