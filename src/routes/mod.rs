pub mod auth;
pub mod discovery;
pub mod groups;
pub mod health;
pub mod kanji;
pub mod progress;
pub mod recommend;
pub mod review;
pub mod users;
pub mod vocab;

use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Json, Router};

use crate::middleware::{rate_limit, request_id};
use crate::response::ErrorBody;
use crate::state::AppState;

/// Maximum request body size: 2 MiB — enough for the content import.
const MAX_BODY_SIZE: usize = 2 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/kanji", kanji::router())
        .nest("/groups", groups::router())
        .nest("/review", review::router())
        .nest("/vocab", vocab::router())
        .nest("/discovery", discovery::router())
        .nest("/recommend", recommend::router())
        .nest("/progress", progress::router())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            rate_limit::rate_limit_middleware,
        ))
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE));

    Router::new()
        .nest("/api", api_routes)
        .nest("/health", health::router())
        .fallback(fallback_404)
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .with_state(state)
}

async fn fallback_404() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody {
            success: false,
            code: "NOT_FOUND".to_string(),
            message: "Not found".to_string(),
            trace_id: None,
        }),
    )
}
