use axum::extract::{Query, State};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::cache::QueryKind;
use crate::response::{ok, AppError};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/next", get(next_group))
        .route("/top", get(top_groups))
}

/// The next suggested study group, or null when nothing qualifies —
/// clients fall back to a default in that case. Cached per user.
async fn next_group(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    if let Some(cached) = state
        .cache()
        .get(&auth.user_id, QueryKind::Recommendation)
        .await
    {
        return Ok(ok(cached));
    }

    let best = state.srs().next_group(&auth.user_id)?;
    let value = serde_json::json!({ "group": best });

    state
        .cache()
        .put(&auth.user_id, QueryKind::Recommendation, value.clone())
        .await;

    Ok(ok(value))
}

#[derive(Debug, Deserialize)]
struct TopQuery {
    count: Option<usize>,
}

async fn top_groups(
    auth: AuthUser,
    Query(query): Query<TopQuery>,
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let count = query.count.unwrap_or(5).clamp(1, 20);
    let ranked = state.srs().rank_groups(&auth.user_id, count)?;
    Ok(ok(serde_json::json!({ "groups": ranked })))
}
