use axum::extract::State;
use axum::routing::get;
use axum::Router;

use crate::response::ok;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(health))
}

async fn health(State(state): State<AppState>) -> impl axum::response::IntoResponse {
    ok(serde_json::json!({
        "status": "ok",
        "uptimeSecs": state.uptime_secs(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
