mod common;

use axum::http::{Method, StatusCode};
use chrono::Duration;

use common::app::spawn_test_app;
use common::auth::{auth_header, register_user};
use common::fixtures::{seed_group, seed_kanji, seed_record};
use common::http::{assert_ok_envelope, request, response_json};
use kanji_backend::srs::types::MasteryLevel;

#[tokio::test]
async fn it_only_surfaces_groups_with_a_foothold() {
    let app = spawn_test_app().await;
    let (token, user_id) = register_user(&app.app).await;
    let store = app.state.store();

    seed_group(store, "コウ", 80.0);
    seed_group(store, "カ", 20.0);

    // コウ has one learned anchor; カ is completely cold.
    seed_kanji(store, "anchor", "校", "コウ", Some(5));
    seed_record(store, &user_id, "anchor", MasteryLevel::Known, 3, Duration::days(1));
    seed_kanji(store, "new1", "交", "コウ", Some(5));
    seed_kanji(store, "cold", "火", "カ", Some(5));

    let response = request(
        &app.app,
        Method::GET,
        "/api/discovery/batch",
        None,
        &[("authorization", auth_header(&token))],
    )
    .await;

    let (status, _, body) = response_json(response).await;
    assert_ok_envelope(status, &body);
    assert_eq!(body["data"]["status"], "ok");

    let items = body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["character"], "交");
    assert_eq!(items[0]["knownPeers"][0], "校");

    // Surfacing materializes the record at level 0.
    let record = store.get_record(&user_id, "new1").unwrap().unwrap();
    assert_eq!(record.mastery_level, MasteryLevel::Unlearned);
}

#[tokio::test]
async fn it_reports_empty_discovery_with_guidance() {
    let app = spawn_test_app().await;
    let (token, _user_id) = register_user(&app.app).await;
    let store = app.state.store();

    seed_group(store, "カ", 20.0);
    seed_kanji(store, "cold", "火", "カ", Some(5));

    let response = request(
        &app.app,
        Method::GET,
        "/api/discovery/batch",
        None,
        &[("authorization", auth_header(&token))],
    )
    .await;

    let (status, _, body) = response_json(response).await;
    assert_ok_envelope(status, &body);
    assert_eq!(body["data"]["status"], "empty");
    assert!(body["data"]["message"]
        .as_str()
        .unwrap()
        .contains("discovered all available kanji"));
}

#[tokio::test]
async fn it_promotes_once_and_locks_against_double_submit() {
    let app = spawn_test_app().await;
    let (token, user_id) = register_user(&app.app).await;
    let store = app.state.store();

    seed_group(store, "コウ", 80.0);
    seed_kanji(store, "anchor", "校", "コウ", Some(5));
    seed_record(store, &user_id, "anchor", MasteryLevel::Known, 3, Duration::days(1));
    seed_kanji(store, "new1", "交", "コウ", Some(5));

    // Surface the candidate so its record exists.
    let batch = request(
        &app.app,
        Method::GET,
        "/api/discovery/batch",
        None,
        &[("authorization", auth_header(&token))],
    )
    .await;
    assert!(batch.status().is_success());

    let answer = serde_json::json!({ "kanjiId": "new1", "isCorrect": true });
    let first = request(
        &app.app,
        Method::POST,
        "/api/discovery/answer",
        Some(answer.clone()),
        &[("authorization", auth_header(&token))],
    )
    .await;
    let (status, _, body) = response_json(first).await;
    assert_ok_envelope(status, &body);
    assert_eq!(body["data"]["record"]["masteryLevel"], 1);
    assert_eq!(body["data"]["record"]["testStreak"], 1);

    // A duplicate submit must not advance the streak again.
    let second = request(
        &app.app,
        Method::POST,
        "/api/discovery/answer",
        Some(answer),
        &[("authorization", auth_header(&token))],
    )
    .await;
    let (_, _, body) = response_json(second).await;
    assert_eq!(body["data"]["record"]["masteryLevel"], 1);
    assert_eq!(body["data"]["record"]["testStreak"], 1);
}

#[tokio::test]
async fn it_leaves_state_untouched_on_a_wrong_discovery_answer() {
    let app = spawn_test_app().await;
    let (token, user_id) = register_user(&app.app).await;
    let store = app.state.store();

    seed_group(store, "コウ", 80.0);
    seed_kanji(store, "anchor", "校", "コウ", Some(5));
    seed_record(store, &user_id, "anchor", MasteryLevel::Known, 3, Duration::days(1));
    seed_kanji(store, "new1", "交", "コウ", Some(5));

    let batch = request(
        &app.app,
        Method::GET,
        "/api/discovery/batch",
        None,
        &[("authorization", auth_header(&token))],
    )
    .await;
    assert!(batch.status().is_success());

    let response = request(
        &app.app,
        Method::POST,
        "/api/discovery/answer",
        Some(serde_json::json!({ "kanjiId": "new1", "isCorrect": false })),
        &[("authorization", auth_header(&token))],
    )
    .await;
    let (_, _, body) = response_json(response).await;
    assert_eq!(body["data"]["record"]["masteryLevel"], 0);
    assert_eq!(body["data"]["record"]["testStreak"], 0);
}

#[tokio::test]
async fn it_returns_404_for_an_unsurfaced_discovery_answer() {
    let app = spawn_test_app().await;
    let (token, _user_id) = register_user(&app.app).await;

    let response = request(
        &app.app,
        Method::POST,
        "/api/discovery/answer",
        Some(serde_json::json!({ "kanjiId": "ghost", "isCorrect": true })),
        &[("authorization", auth_header(&token))],
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn it_orders_stat_track_candidates_by_usefulness() {
    let app = spawn_test_app().await;
    let (token, user_id) = register_user(&app.app).await;
    let store = app.state.store();

    seed_group(store, "コウ", 10.0);
    seed_group(store, "スイ", 90.0);
    for (i, (id, ch, reading)) in [
        ("a1", "交", "コウ"),
        ("a2", "水", "スイ"),
    ]
    .into_iter()
    .enumerate()
    {
        let anchor_id = format!("anchor-{i}");
        seed_kanji(store, &anchor_id, &format!("錨{i}"), reading, Some(5));
        seed_record(store, &user_id, &anchor_id, MasteryLevel::Known, 3, Duration::days(1));
        seed_kanji(store, id, ch, reading, Some(5));
    }

    let response = request(
        &app.app,
        Method::GET,
        "/api/discovery/batch",
        None,
        &[("authorization", auth_header(&token))],
    )
    .await;
    let (_, _, body) = response_json(response).await;
    let items = body["data"]["items"].as_array().unwrap();
    assert_eq!(items[0]["reading"], "スイ");
    assert_eq!(items[1]["reading"], "コウ");
}
