use axum::http::Method;
use axum::Router;

use super::http::{request, response_json};

pub fn auth_header(token: &str) -> String {
    format!("Bearer {token}")
}

/// Register a fresh throwaway user, returning (token, user_id).
pub async fn register_user(app: &Router) -> (String, String) {
    let email = format!("user-{}@test.com", uuid::Uuid::new_v4());
    let username = format!("user-{}", uuid::Uuid::new_v4().simple());
    let password = "Passw0rd!";

    let response = request(
        app,
        Method::POST,
        "/api/auth/register",
        Some(serde_json::json!({
            "email": email,
            "username": username,
            "password": password,
        })),
        &[],
    )
    .await;

    let (status, _, body) = response_json(response).await;
    assert!(status.is_success(), "register failed: {body}");

    let token = body["data"]["token"].as_str().expect("token").to_string();
    let user_id = body["data"]["user"]["id"]
        .as_str()
        .expect("user id")
        .to_string();
    (token, user_id)
}

pub async fn login_and_get_token(app: &Router) -> String {
    let (token, _) = register_user(app).await;
    token
}
