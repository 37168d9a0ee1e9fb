use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::response::{ok, AppError};
use crate::routes::review::AnswerRequest;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/batch", get(get_batch))
        .route("/answer", post(submit_answer))
}

const VALID_LIMITS: [usize; 3] = [10, 20, 30];
const DEFAULT_LIMIT: usize = 20;

#[derive(Debug, Deserialize)]
struct BatchQuery {
    limit: Option<usize>,
}

async fn get_batch(
    auth: AuthUser,
    Query(query): Query<BatchQuery>,
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let limit = query
        .limit
        .filter(|l| VALID_LIMITS.contains(l))
        .unwrap_or(DEFAULT_LIMIT);

    let items = {
        let mut rng = rand::thread_rng();
        state
            .srs()
            .vocab_batch(&auth.user_id, limit, Utc::now(), &mut rng)?
    };

    let body = if items.is_empty() {
        serde_json::json!({
            "status": "empty",
            "message": "No vocab items available. Review more kanji to unlock vocab practice!",
        })
    } else {
        serde_json::json!({
            "status": "ok",
            "vocab": items,
        })
    };

    Ok(ok(body))
}

/// Vocab answers feed the same streak transition as review answers.
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
