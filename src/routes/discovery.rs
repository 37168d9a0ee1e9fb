use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::response::{ok, AppError};
use crate::srs::types::{DiscoveryOutcome, Track};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/batch", get(get_batch))
        .route("/answer", post(submit_answer))
}

async fn get_batch(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let body = match state.srs().discovery_batch(&auth.user_id, Utc::now())? {
        DiscoveryOutcome::Ready(items) => serde_json::json!({
            "status": "ok",
            "items": items,
        }),
        DiscoveryOutcome::Empty { track, level } => serde_json::json!({
            "status": "empty",
            "message": empty_message(track, level),
        }),
    };

    Ok(ok(body))
}

fn empty_message(track: Track, level: u8) -> String {
    match track {
        Track::Jlpt => format!(
            "You've discovered all kanji in JLPT N{level}! Keep reviewing to unlock the next level."
        ),
        Track::Stat => "You've discovered all available kanji! Master more kanji in your review tests to unlock new groups.".to_string(),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DiscoveryAnswerRequest {
    kanji_id: String,
    is_correct: bool,
}

async fn submit_answer(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<DiscoveryAnswerRequest>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let record = state.srs().submit_discovery_answer(
        &auth.user_id,
        &req.kanji_id,
        req.is_correct,
        Utc::now(),
    )?;

    state.cache().invalidate_user(&auth.user_id).await;

    Ok(ok(serde_json::json!({ "record": record })))
}
