use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::response::{ok, AppError};
use crate::srs::types::Track;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/track", get(get_track).put(put_track))
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrackBody {
    track: Track,
}

async fn get_track(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let track = state.store().get_user_track(&auth.user_id)?;
    Ok(ok(TrackBody { track }))
}

/// Switching tracks changes the scope of every cached listing, so the
/// user's cache entries are dropped along with the write.
async fn put_track(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<TrackBody>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let user = state.store().set_user_track(&auth.user_id, body.track)?;
    state.cache().invalidate_user(&auth.user_id).await;

    Ok(ok(TrackBody { track: user.track }))
}
