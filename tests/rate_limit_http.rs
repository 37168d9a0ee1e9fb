mod common;

use axum::http::{Method, StatusCode};

use common::app::spawn_test_app_with_rate_limit;
use common::http::{request, response_json};

#[tokio::test]
async fn it_limits_api_requests_per_window() {
    let app = spawn_test_app_with_rate_limit(3).await;

    for _ in 0..3 {
        let response = request(&app.app, Method::GET, "/api/users/track", None, &[]).await;
        // 401 (no token) still consumes rate-limit budget.
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    let limited = request(&app.app, Method::GET, "/api/users/track", None, &[]).await;
    let (status, headers, body) = response_json(limited).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["code"], "RATE_LIMITED");
    assert!(headers.contains_key("ratelimit-limit"));
    assert!(headers.contains_key("retry-after"));
}

#[tokio::test]
async fn it_exposes_remaining_budget_in_headers() {
    let app = spawn_test_app_with_rate_limit(10).await;

    let response = request(&app.app, Method::GET, "/api/users/track", None, &[]).await;
    let remaining = response
        .headers()
        .get("ratelimit-remaining")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .expect("ratelimit-remaining header");
    assert_eq!(remaining, 9);
}

#[tokio::test]
async fn it_does_not_limit_health() {
    let app = spawn_test_app_with_rate_limit(1).await;

    for _ in 0..5 {
        let response = request(&app.app, Method::GET, "/health", None, &[]).await;
        assert!(response.status().is_success());
    }
}
