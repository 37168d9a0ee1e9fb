use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::cache::QueryKind;
use crate::response::{ok, AppError};
use crate::srs::types::MasteryLevel;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/overview", get(overview))
        .route("/level", get(current_level))
        .route("/set", post(set_mastery))
}

async fn overview(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    if let Some(cached) = state.cache().get(&auth.user_id, QueryKind::Overview).await {
        return Ok(ok(cached));
    }

    let stats = state.srs().overview(&auth.user_id)?;
    let value = serde_json::to_value(&stats)
        .map_err(|e| AppError::internal(&format!("serialize overview: {e}")))?;
    state
        .cache()
        .put(&auth.user_id, QueryKind::Overview, value.clone())
        .await;

    Ok(ok(value))
}

async fn current_level(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    if let Some(cached) = state.cache().get(&auth.user_id, QueryKind::Level).await {
        return Ok(ok(cached));
    }

    let level = state.srs().current_level(&auth.user_id)?;
    let value = serde_json::json!({ "level": level });
    state
        .cache()
        .put(&auth.user_id, QueryKind::Level, value.clone())
        .await;

    Ok(ok(value))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SetMasteryRequest {
    character: String,
    mastery_level: MasteryLevel,
}

/// The study page's direct mastery write (mark as learning/known while
/// browsing a group). Everything else goes through graded answers.
async fn set_mastery(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<SetMasteryRequest>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let record =
        state
            .srs()
            .set_mastery(&auth.user_id, &req.character, req.mastery_level, Utc::now())?;

    state.cache().invalidate_user(&auth.user_id).await;

    Ok(ok(serde_json::json!({ "record": record })))
}
