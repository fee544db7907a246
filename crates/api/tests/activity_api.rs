//! Integration tests for practice session and paper attempt endpoints.

mod common;

use axum::http::StatusCode;
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Practice sessions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn practice_submit_credits_points(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_, token) = common::create_student(&pool, "asha").await;
    let body = json!({
        "questions_total": 20,
        "questions_correct": 12,
        "questions_wrong": 3,
        "time_taken_secs": 300,
        "operation": "multiplication",
        "difficulty": "medium",
    });

    let (status, json) = common::post(&app, "/api/v1/practice-sessions", &body, Some(&token)).await;

    assert_eq!(status, StatusCode::CREATED);
    // 15 attempted + 12 correct * 5.
    assert_eq!(json["data"]["points_earned"], 75);
    assert_eq!(json["data"]["updated_total"], 75);
    assert_eq!(json["data"]["session"]["questions_attempted"], 15);
}

#[sqlx::test(migrations = "../../migrations")]
async fn practice_submit_rejects_inconsistent_counts(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_, token) = common::create_student(&pool, "asha").await;
    let body = json!({
        "questions_total": 20,
        "questions_correct": 15,
        "questions_wrong": 10,
        "time_taken_secs": 300,
        "operation": null,
        "difficulty": null,
    });

    let (status, json) = common::post(&app, "/api/v1/practice-sessions", &body, Some(&token)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string());
}

#[sqlx::test(migrations = "../../migrations")]
async fn practice_list_returns_own_history_newest_first(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_, token) = common::create_student(&pool, "asha").await;
    let (_, other_token) = common::create_student(&pool, "ravi").await;

    for correct in [5, 10] {
        let body = json!({
            "questions_total": 10,
            "questions_correct": correct,
            "questions_wrong": 10 - correct,
            "time_taken_secs": 120,
            "operation": null,
            "difficulty": null,
        });
        common::post(&app, "/api/v1/practice-sessions", &body, Some(&token)).await;
    }
    let other = json!({
        "questions_total": 10,
        "questions_correct": 10,
        "questions_wrong": 0,
        "time_taken_secs": 60,
        "operation": null,
        "difficulty": null,
    });
    common::post(&app, "/api/v1/practice-sessions", &other, Some(&other_token)).await;

    let (status, json) = common::get(&app, "/api/v1/practice-sessions", Some(&token)).await;

    assert_eq!(status, StatusCode::OK);
    let sessions = json["data"].as_array().unwrap();
    assert_eq!(sessions.len(), 2);
    assert_eq!(sessions[0]["questions_correct"], 10);
    assert_eq!(sessions[1]["questions_correct"], 5);
}

// ---------------------------------------------------------------------------
// Paper attempts
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn paper_lifecycle_start_submit_list(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_, token) = common::create_student(&pool, "asha").await;

    let start_body = json!({
        "title": "Vedic Level 2",
        "total_questions": 3,
        "answer_key": ["12", "56", "99"],
    });
    let (status, json) = common::post(&app, "/api/v1/paper-attempts", &start_body, Some(&token)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["data"]["status"], "in_progress");
    // The stored key must never be echoed back.
    assert!(json["data"].get("answer_key").is_none());
    let attempt_id = json["data"]["id"].as_i64().unwrap();

    let submit_body = json!({"answers": ["12", "55", "99"]});
    let (status, json) = common::post(
        &app,
        &format!("/api/v1/paper-attempts/{attempt_id}/submit"),
        &submit_body,
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    // 3 attempted + 2 correct * 5.
    assert_eq!(json["data"]["points_earned"], 13);
    assert_eq!(json["data"]["duplicate"], false);
    assert_eq!(json["data"]["attempt"]["questions_correct"], 2);

    let (status, json) = common::get(&app, "/api/v1/paper-attempts", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    let attempts = json["data"].as_array().unwrap();
    assert_eq!(attempts.len(), 1);
    assert_eq!(attempts[0]["status"], "completed");
}

#[sqlx::test(migrations = "../../migrations")]
async fn paper_submit_rejects_foreign_attempt(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_, owner_token) = common::create_student(&pool, "asha").await;
    let (_, intruder_token) = common::create_student(&pool, "ravi").await;

    let start_body = json!({
        "title": "Vedic Level 1",
        "total_questions": 2,
        "answer_key": ["1", "2"],
    });
    let (_, json) = common::post(&app, "/api/v1/paper-attempts", &start_body, Some(&owner_token)).await;
    let attempt_id = json["data"]["id"].as_i64().unwrap();

    let (status, _) = common::post(
        &app,
        &format!("/api/v1/paper-attempts/{attempt_id}/submit"),
        &json!({"answers": ["1", "2"]}),
        Some(&intruder_token),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../migrations")]
async fn paper_start_rejects_key_length_mismatch(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_, token) = common::create_student(&pool, "asha").await;

    let start_body = json!({
        "title": "Vedic Level 1",
        "total_questions": 5,
        "answer_key": ["1", "2"],
    });
    let (status, _) = common::post(&app, "/api/v1/paper-attempts", &start_body, Some(&token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../migrations")]
async fn activity_routes_require_authentication(pool: PgPool) {
    let app = common::build_test_app(pool);

    let (status, _) = common::get(&app, "/api/v1/practice-sessions", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = common::get(&app, "/api/v1/paper-attempts", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
