use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::response::{ok, AppError};
use crate::srs::types::ReviewBatch;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/batch", get(get_batch))
        .route("/answer", post(submit_answer))
}

const INSUFFICIENT_POOL_MESSAGE: &str =
    "Not enough kanji available for testing. Please wait for cooldowns to expire.";

async fn get_batch(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let batch = {
        let mut rng = rand::thread_rng();
        state.srs().review_batch(&auth.user_id, Utc::now(), &mut rng)?
    };

    let body = match batch {
        ReviewBatch::Ready(questions) => serde_json::json!({
            "status": "ok",
            "questions": questions,
        }),
        ReviewBatch::Insufficient { available } => serde_json::json!({
            "status": "insufficient",
            "available": available,
            "message": INSUFFICIENT_POOL_MESSAGE,
        }),
    };

    Ok(ok(body))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRequest {
    pub kanji_id: String,
    pub is_correct: bool,
}

async fn submit_answer(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<AnswerRequest>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let record =
        state
            .srs()
            .submit_review_answer(&auth.user_id, &req.kanji_id, req.is_correct, Utc::now())?;

    state.cache().invalidate_user(&auth.user_id).await;

    Ok(ok(serde_json::json!({ "record": record })))
}
