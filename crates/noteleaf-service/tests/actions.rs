//! Action recording integration tests.

mod common;

use common::TestHarness;
use noteleaf_core::UserId;
use serde_json::json;

// ============================================================================
// Recording
// ============================================================================

#[tokio::test]
async fn record_action_awards_points_and_streak() {
    let harness = TestHarness::new();
    harness.create_profile().await;

    let body = harness
        .record_action(harness.test_user_id, "mindmap_created")
        .await;

    assert_eq!(body["success"], true);
    assert_eq!(body["points_awarded"], 15);
    assert_eq!(body["streak"], 1);
    assert!(body.get("streak_milestone").is_none());

    let profile: serde_json::Value = harness
        .server
        .get("/v1/profile/me")
        .add_header("authorization", harness.user_auth_header())
        .await
        .json();
    assert_eq!(profile["points"], 15);
    assert_eq!(profile["streak"], 1);
    assert_eq!(profile["counters"]["mindmaps"], 1);
}

#[tokio::test]
async fn same_day_actions_accumulate_points_not_streak() {
    let harness = TestHarness::new();
    harness.create_profile().await;

    harness
        .record_action(harness.test_user_id, "summary_generated")
        .await;
    let body = harness
        .record_action(harness.test_user_id, "quiz_completed")
        .await;

    assert_eq!(body["success"], true);
    assert_eq!(body["streak"], 1);

    let profile: serde_json::Value = harness
        .server
        .get("/v1/profile/me")
        .add_header("authorization", harness.user_auth_header())
        .await
        .json();
    assert_eq!(profile["points"], 35);
}

#[tokio::test]
async fn unknown_user_reports_failure_not_error() {
    let harness = TestHarness::new();

    let body = harness.record_action(UserId::generate(), "summary_generated").await;

    assert_eq!(body["success"], false);
    assert_eq!(body["points_awarded"], 0);
    assert!(body["new_achievements"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn record_action_requires_service_key() {
    let harness = TestHarness::new();
    harness.create_profile().await;

    // Missing key
    let response = harness
        .server
        .post("/v1/actions")
        .json(&json!({
            "user_id": harness.test_user_id.to_string(),
            "action": "summary_generated"
        }))
        .await;
    response.assert_status_unauthorized();

    // Wrong key
    let response = harness
        .server
        .post("/v1/actions")
        .add_header("x-api-key", "wrong-key")
        .json(&json!({
            "user_id": harness.test_user_id.to_string(),
            "action": "summary_generated"
        }))
        .await;
    response.assert_status_unauthorized();
}

#[tokio::test]
async fn malformed_user_id_is_bad_request() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/v1/actions")
        .add_header("x-api-key", harness.service_api_key.clone())
        .json(&json!({ "user_id": "not-a-uuid", "action": "summary_generated" }))
        .await;

    response.assert_status_bad_request();
}

// ============================================================================
// Achievements
// ============================================================================

#[tokio::test]
async fn first_summary_unlocks_achievement() {
    let harness = TestHarness::new();
    harness.create_profile().await;

    let body = harness
        .record_action(harness.test_user_id, "summary_generated")
        .await;

    let unlocked = body["new_achievements"].as_array().unwrap();
    assert_eq!(unlocked.len(), 1);
    assert_eq!(unlocked[0]["id"], "first-summary");
    assert_eq!(unlocked[0]["name"], "First Steps");

    // The unlock is visible on the profile achievements listing.
    let response = harness
        .server
        .get("/v1/profile/achievements")
        .add_header("authorization", harness.user_auth_header())
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let achievements = body["achievements"].as_array().unwrap();
    assert_eq!(achievements.len(), 1);
    assert_eq!(achievements[0]["id"], "first-summary");
}

#[tokio::test]
async fn achievements_unlock_only_once() {
    let harness = TestHarness::new();
    harness.create_profile().await;

    let first = harness
        .record_action(harness.test_user_id, "summary_generated")
        .await;
    assert_eq!(first["new_achievements"].as_array().unwrap().len(), 1);

    // The threshold stays crossed; the badge must not unlock again.
    let second = harness
        .record_action(harness.test_user_id, "summary_generated")
        .await;
    assert!(second["new_achievements"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn catalog_lists_all_definitions() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .get("/v1/achievements")
        .add_header("authorization", harness.user_auth_header())
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let achievements = body["achievements"].as_array().unwrap();
    assert!(achievements.iter().any(|a| a["id"] == "note-ninja"));
}

// ============================================================================
// History
// ============================================================================

#[tokio::test]
async fn history_lists_recorded_actions() {
    let harness = TestHarness::new();
    harness.create_profile().await;

    harness
        .record_action(harness.test_user_id, "summary_generated")
        .await;
    harness
        .record_action(harness.test_user_id, "flashcards_generated")
        .await;

    let response = harness
        .server
        .get("/v1/actions/history")
        .add_header("authorization", harness.user_auth_header())
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let events = body["events"].as_array().unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(body["has_more"], false);
}

#[tokio::test]
async fn history_paginates() {
    let harness = TestHarness::new();
    harness.create_profile().await;

    for _ in 0..3 {
        harness
            .record_action(harness.test_user_id, "quiz_correct_answer")
            .await;
    }

    let response = harness
        .server
        .get("/v1/actions/history?limit=2&offset=0")
        .add_header("authorization", harness.user_auth_header())
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["events"].as_array().unwrap().len(), 2);
    assert_eq!(body["has_more"], true);
}

#[tokio::test]
async fn history_requires_profile() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .get("/v1/actions/history")
        .add_header("authorization", harness.user_auth_header())
        .await;

    response.assert_status_not_found();
}
