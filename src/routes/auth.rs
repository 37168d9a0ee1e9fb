use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::post;
use axum::{Json, Router};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::{
    extract_token_from_headers, generate_dummy_argon2_hash, hash_password, hash_token,
    sign_jwt_for_user, verify_password,
};
use crate::response::{created, ok, AppError};
use crate::state::AppState;
use crate::store::operations::sessions::Session;
use crate::store::operations::users::User;
use crate::store::StoreError;
use crate::srs::types::Track;
use crate::validation::{is_valid_email, validate_password, validate_username};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterRequest {
    email: String,
    username: String,
    password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PublicUser {
    id: String,
    email: String,
    username: String,
    track: Track,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            username: user.username.clone(),
            track: user.track,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthResponse {
    token: String,
    user: PublicUser,
}

async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let email = req.email.trim().to_string();
    if !is_valid_email(&email) {
        return Err(AppError::bad_request("INVALID_EMAIL", "Invalid email address"));
    }
    validate_username(req.username.trim())
        .map_err(|msg| AppError::bad_request("INVALID_USERNAME", msg))?;
    validate_password(&req.password)
        .map_err(|msg| AppError::bad_request("INVALID_PASSWORD", msg))?;

    let now = Utc::now();
    let user = User {
        id: uuid::Uuid::new_v4().to_string(),
        email,
        username: req.username.trim().to_string(),
        password_hash: hash_password(&req.password)?,
        track: Track::default(),
        created_at: now,
        updated_at: now,
    };

    state.store().create_user(&user).map_err(|e| match e {
        StoreError::Conflict { .. } => {
            AppError::conflict("EMAIL_TAKEN", "Email is already registered")
        }
        other => other.into(),
    })?;

    let token = issue_session(&state, &user.id)?;
    tracing::info!(user_id = %user.id, "User registered");

    Ok(created(AuthResponse {
        token,
        user: PublicUser::from(&user),
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest {
    email: String,
    password: String,
}

async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let user = state.store().get_user_by_email(req.email.trim())?;

    let Some(user) = user else {
        // Burn a comparable amount of time so absent accounts are not
        // distinguishable by response latency.
        let _ = verify_password(&req.password, &generate_dummy_argon2_hash());
        return Err(AppError::unauthorized("Invalid email or password"));
    };

    if !verify_password(&req.password, &user.password_hash)? {
        return Err(AppError::unauthorized("Invalid email or password"));
    }

    let token = issue_session(&state, &user.id)?;

    Ok(ok(AuthResponse {
        token,
        user: PublicUser::from(&user),
    }))
}

async fn logout(
    headers: HeaderMap,
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let token = extract_token_from_headers(&headers)?;
    state.store().delete_session(&hash_token(&token))?;

    // Logout is a natural point to sweep expired sessions; there are no
    // background workers to do it.
    let swept = state.store().cleanup_expired_sessions()?;
    if swept > 0 {
        tracing::debug!(swept, "Cleaned up expired sessions");
    }

    Ok(ok(serde_json::json!({ "loggedOut": true })))
}

fn issue_session(state: &AppState, user_id: &str) -> Result<String, AppError> {
    let expires_in_hours = state.config().jwt_expires_in_hours;
    let token = sign_jwt_for_user(user_id, &state.config().jwt_secret, expires_in_hours)?;

    let session = Session {
        token_hash: hash_token(&token),
        user_id: user_id.to_string(),
        token_type: "user".to_string(),
        created_at: Utc::now(),
        expires_at: Utc::now() + Duration::hours(expires_in_hours as i64),
        revoked: false,
    };
    state.store().create_session(&session)?;

    Ok(token)
}
