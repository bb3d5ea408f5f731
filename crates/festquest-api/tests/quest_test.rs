//! Integration tests for the Quest Progression bounded context.

mod common;

use axum::http::StatusCode;
use festquest_core::ids::UserId;

#[tokio::test]
async fn test_lighthouse_scan_moves_guest_to_selfie_step() {
    let app = common::build_test_app();

    // POST /api/v1/quest/users/{user_id}/qr
    let (status, json) = common::post_json(
        app.router(),
        "/api/v1/quest/users/1001/qr",
        &serde_json::json!({ "code": "LIGHTHOUSE_QUEST_START" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["outcome"], "advanced");
    assert_eq!(json["summary"]["current_step"], 2);
    assert_eq!(json["summary"]["completed_count"], 1);

    // GET /api/v1/quest/users/{user_id} — verify persisted state
    let (status, json) = common::get_json(app.router(), "/api/v1/quest/users/1001").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["current_step"], 2);
    assert_eq!(json["current_step_details"]["requires_photo"], true);
    assert_eq!(app.quests.save_count(), 1);
}

#[tokio::test]
async fn test_wrong_code_leaves_progress_untouched() {
    let app = common::build_test_app();

    let (status, json) = common::post_json(
        app.router(),
        "/api/v1/quest/users/1002/qr",
        &serde_json::json!({ "code": "WRONG" }),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["error"], "validation_failed");
    assert_eq!(app.quests.save_count(), 0);

    let (_, json) = common::get_json(app.router(), "/api/v1/quest/users/1002").await;
    assert_eq!(json["current_step"], 1);
    assert_eq!(json["completed_count"], 0);
}

#[tokio::test]
async fn test_full_walkthrough_completes_and_tops_leaderboard() {
    let app = common::build_test_app();
    let base = "/api/v1/quest/users/2024";

    // Step 1: lighthouse QR
    let (status, _) = common::post_json(
        app.router(),
        &format!("{base}/qr"),
        &serde_json::json!({ "code": "LIGHTHOUSE_QUEST_START" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Steps 2-4: photos
    for (n, photo_ref) in ["selfie", "stage-board", "food-court"].iter().enumerate() {
        let (status, json) = common::post_json(
            app.router(),
            &format!("{base}/photo"),
            &serde_json::json!({ "photo_ref": photo_ref }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["summary"]["current_step"], n + 3);
    }

    // Step 5: dance floor QR
    let (status, json) = common::post_json(
        app.router(),
        &format!("{base}/qr"),
        &serde_json::json!({ "code": "DANCE_FLOOR_QUEST_END" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["outcome"], "completed");
    assert_eq!(json["summary"]["completion_code"], "QUEST_COMPLETE_2024");
    assert_eq!(json["summary"]["completed_count"], 5);

    // Completion is terminal.
    let (status, json) = common::post_json(
        app.router(),
        &format!("{base}/qr"),
        &serde_json::json!({ "code": "DANCE_FLOOR_QUEST_END" }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"], "already_completed");

    // GET /api/v1/quest/leaderboard
    let (status, json) = common::get_json(app.router(), "/api/v1/quest/leaderboard").await;
    assert_eq!(status, StatusCode::OK);
    let entries = json["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["rank"], 1);
    assert_eq!(entries[0]["user_id"], 2024);
    assert_eq!(entries[0]["total_time_secs"], 0);

    let stored = app.quests.snapshot(UserId(2024)).unwrap();
    assert!(stored.completed);
    assert_eq!(stored.completed_steps.len(), 5);
}

#[tokio::test]
async fn test_photo_on_qr_step_is_rejected() {
    let app = common::build_test_app();

    let (status, json) = common::post_json(
        app.router(),
        "/api/v1/quest/users/1003/photo",
        &serde_json::json!({ "photo_ref": "too-early" }),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["error"], "wrong_action_type");
    assert_eq!(json["message"], "Invalid action for this step");
}

#[tokio::test]
async fn test_reset_wipes_progress() {
    let app = common::build_test_app();
    common::post_json(
        app.router(),
        "/api/v1/quest/users/1004/qr",
        &serde_json::json!({ "code": "LIGHTHOUSE_QUEST_START" }),
    )
    .await;

    let (status, json) = common::delete_json(app.router(), "/api/v1/quest/users/1004").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["reset"], true);

    let (status, json) = common::delete_json(app.router(), "/api/v1/quest/users/1004").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["reset"], false);

    let (_, json) = common::get_json(app.router(), "/api/v1/quest/users/1004").await;
    assert_eq!(json["current_step"], 1);
}

#[tokio::test]
async fn test_step_lookup_hides_expected_code() {
    let app = common::build_test_app();

    let (status, json) = common::get_json(app.router(), "/api/v1/quest/steps/5").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["is_final"], true);
    assert!(!json.to_string().contains("DANCE_FLOOR_QUEST_END"));
}
