// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP API tests over an in-memory store.

use axum::http::StatusCode;
use bulk_tracker::db::{keys, FirestoreStore, KeyValueStore, MemoryStore};
use bulk_tracker::routes::photos::MAX_PHOTO_BASE64_LEN;
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;

mod common;

use common::{body_json, create_test_app, create_test_app_with_store, empty_request, json_request};

#[tokio::test]
async fn test_health() {
    let (app, _) = create_test_app();
    let response = app.oneshot(empty_request("GET", "/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ok");
}

#[tokio::test]
async fn test_get_weight_config_defaults() {
    let (app, _) = create_test_app();
    let response = app
        .oneshot(empty_request("GET", "/api/weight-config"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["current_weight"], 70.0);
    assert_eq!(body["goal_weight"], 75.0);
    assert_eq!(body["use_metric"], true);
    assert_eq!(body["maintenance_calories"], 2100);
    assert_eq!(body["weight_gain_calories"], 2600);
    assert_eq!(body["daily_target"], 2600);
    assert_eq!(body["current_weight_display"], "70.0 kg");
}

#[tokio::test]
async fn test_update_weight_config() {
    let (app, state) = create_test_app();
    let response = app
        .oneshot(json_request(
            "PUT",
            "/api/weight-config",
            json!({"current_weight": 80.0, "goal_weight": 90.0, "use_metric": false}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["maintenance_calories"], 2400);
    assert_eq!(body["weight_gain_calories"], 2900);
    assert_eq!(body["use_metric"], false);
    assert!(body["current_weight_display"]
        .as_str()
        .unwrap()
        .ends_with(" st"));

    let stored = state.weight_config.load_weight_config().await;
    assert_eq!(stored.current_weight, 80.0);
}

#[tokio::test]
async fn test_update_rejects_non_positive_weight() {
    let (app, _) = create_test_app();
    let response = app
        .oneshot(json_request(
            "PUT",
            "/api/weight-config",
            json!({"current_weight": -5.0}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "bad_request");
}

#[tokio::test]
async fn test_update_rejects_goal_below_current() {
    let (app, _) = create_test_app();
    let response = app
        .oneshot(json_request(
            "PUT",
            "/api/weight-config",
            json!({"current_weight": 90.0, "goal_weight": 80.0}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_rejects_non_numeric_weight() {
    let (app, _) = create_test_app();
    let response = app
        .oneshot(json_request(
            "PUT",
            "/api/weight-config",
            json!({"current_weight": "eighty"}),
        ))
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_store_failure_is_surfaced() {
    let (app, _) = create_test_app_with_store(Arc::new(FirestoreStore::new_mock()));
    let response = app
        .oneshot(empty_request("GET", "/api/weight-config"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(response).await["error"], "store_unavailable");
}

#[tokio::test]
async fn test_unreadable_record_is_internal_error() {
    let memory = MemoryStore::new();
    memory
        .set_item(keys::USER_PROFILE, "{definitely not json")
        .await
        .unwrap();
    let (app, _) = create_test_app_with_store(Arc::new(memory));

    let response = app
        .oneshot(empty_request("GET", "/api/weight-config"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["error"], "internal_error");
}

#[tokio::test]
async fn test_calories_preview_imperial() {
    let (app, _) = create_test_app();
    let response = app
        .oneshot(empty_request(
            "GET",
            "/api/calories?current_weight=11&goal_weight=12&use_metric=false",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["maintenance_calories"], 2096);
    assert_eq!(body["weight_gain_calories"], 2596);
    assert_eq!(body["daily_target"], 2596);
}

#[tokio::test]
async fn test_calories_preview_rejects_zero() {
    let (app, _) = create_test_app();
    let response = app
        .oneshot(empty_request(
            "GET",
            "/api/calories?current_weight=0&goal_weight=80",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_onboarding_flow() {
    let (app, _) = create_test_app();

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/api/onboarding"))
        .await
        .unwrap();
    assert_eq!(body_json(response).await["complete"], false);

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/onboarding",
            json!({
                "exercise_frequency": "5+ times a week",
                "meals_per_day": "5",
                "food_preference": "no preference",
                "timeframe": 6,
                "current_weight": 65.0,
                "goal_weight": 72.0,
                "use_metric": true
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["maintenance_calories"], 1950);

    let response = app
        .oneshot(empty_request("GET", "/api/onboarding"))
        .await
        .unwrap();
    assert_eq!(body_json(response).await["complete"], true);
}

#[tokio::test]
async fn test_onboarding_rejects_missing_answers() {
    let (app, state) = create_test_app();
    let response = app
        .oneshot(json_request(
            "PUT",
            "/api/onboarding",
            json!({
                "exercise_frequency": "",
                "meals_per_day": "3",
                "food_preference": "any",
                "timeframe": 6
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(!state.weight_config.is_onboarding_complete().await.unwrap());
}

#[tokio::test]
async fn test_photo_endpoints() {
    let (app, _) = create_test_app();

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/photos/before",
            json!({"image": "data:image/jpeg;base64,/9j/4AAQ"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["before_photo"], "/9j/4AAQ");

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/photos/progress",
            json!({"image": "aGVsbG8="}),
        ))
        .await
        .unwrap();
    assert_eq!(body_json(response).await["progress_photo_count"], 1);

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/photos/side",
            json!({"image": "aGVsbG8="}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/photos/progress",
            json!({"image": "not base64 at all"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(json_request(
            "PUT",
            "/api/photos/after",
            json!({"image": "A".repeat(MAX_PHOTO_BASE64_LEN + 4)}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_meals_and_reset() {
    let (app, state) = create_test_app();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/meals/breakfast/complete",
            json!({"calories": 650}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["consumed_calories"], 650);
    assert_eq!(body["daily_target"], 2600);
    assert_eq!(body["remaining_calories"], 1950);

    let response = app
        .clone()
        .oneshot(empty_request("POST", "/api/reset"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["success"], true);

    let progress = state.weight_config.daily_progress().await.unwrap();
    assert_eq!(progress.consumed_calories, 0);

    let response = app
        .oneshot(empty_request("GET", "/api/progress"))
        .await
        .unwrap();
    assert_eq!(body_json(response).await["consumed_calories"], 0);
}

#[tokio::test]
async fn test_security_headers_on_api() {
    let (app, _) = create_test_app();
    let response = app
        .oneshot(empty_request("GET", "/api/weight-config"))
        .await
        .unwrap();

    assert_eq!(
        response.headers().get("X-Content-Type-Options").unwrap(),
        "nosniff"
    );
    assert_eq!(response.headers().get("Cache-Control").unwrap(), "no-store");
}
