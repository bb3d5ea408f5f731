//! Routes for the Quest Progression bounded context.

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use festquest_core::ids::UserId;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use festquest_quest::application::command_handlers;
use festquest_quest::application::query_handlers::{
    self, DEFAULT_LEADERBOARD_LIMIT, LeaderboardEntry, QuestSummary, QuestSummaryView, StepView,
};
use festquest_quest::domain::aggregates::{QuestAction, StepOutcome};
use festquest_quest::domain::commands;

use crate::error::ApiError;
use crate::state::AppState;

/// Largest leaderboard a caller may ask for.
pub const MAX_LEADERBOARD_LIMIT: u32 = 100;

/// Request body for POST /users/{user_id}/qr.
#[derive(Debug, Deserialize)]
pub struct ScanQrRequest {
    /// Decoded QR content.
    pub code: String,
}

/// Request body for POST /users/{user_id}/photo.
#[derive(Debug, Deserialize)]
pub struct SubmitPhotoRequest {
    /// Platform reference of the uploaded photo.
    pub photo_ref: String,
}

/// Query string for GET /leaderboard.
#[derive(Debug, Deserialize)]
pub struct LeaderboardParams {
    /// Maximum number of entries.
    pub limit: Option<u32>,
}

/// Response body returned after a successful quest action.
#[derive(Debug, Serialize)]
pub struct AdvanceResponse {
    /// `advanced` or `completed`.
    pub outcome: &'static str,
    /// Message for the guest.
    pub message: &'static str,
    /// Progress after the action.
    pub summary: QuestSummary,
    /// The step to do next, while the quest is running.
    pub next_step: Option<StepView>,
}

/// Response body for GET /leaderboard.
#[derive(Debug, Serialize)]
pub struct LeaderboardResponse {
    /// Earliest finishers first.
    pub entries: Vec<LeaderboardEntry>,
}

/// Response body for DELETE /users/{user_id}.
#[derive(Debug, Serialize)]
pub struct ResetResponse {
    /// Whether the guest had any progress.
    pub reset: bool,
}

/// GET /steps/{step}
async fn get_step(
    State(state): State<AppState>,
    Path(step): Path<u32>,
) -> Result<Json<StepView>, ApiError> {
    query_handlers::get_step(&state.catalog, step)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("quest step {step} not found")))
}

/// GET /leaderboard
#[instrument(skip(state))]
async fn get_leaderboard(
    State(state): State<AppState>,
    Query(params): Query<LeaderboardParams>,
) -> Result<Json<LeaderboardResponse>, ApiError> {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_LEADERBOARD_LIMIT)
        .min(MAX_LEADERBOARD_LIMIT);
    let entries = query_handlers::get_leaderboard(limit, &*state.quest_repository).await?;
    Ok(Json(LeaderboardResponse { entries }))
}

/// GET /users/{user_id}
#[instrument(skip(state))]
async fn get_summary(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<QuestSummaryView>, ApiError> {
    let view =
        query_handlers::get_quest_summary(UserId(user_id), &state.catalog, &*state.quest_repository)
            .await?;
    Ok(Json(view))
}

async fn advance(
    state: &AppState,
    user_id: UserId,
    action: QuestAction,
) -> Result<Json<AdvanceResponse>, ApiError> {
    let command = commands::AdvanceQuest {
        correlation_id: Uuid::new_v4(),
        user_id,
        action,
    };

    info!(correlation_id = %command.correlation_id, "handling advance_quest command");

    let result = command_handlers::handle_advance_quest(
        &command,
        &state.catalog,
        state.clock.as_ref(),
        &*state.quest_repository,
    )
    .await?;

    let summary = query_handlers::summarize(&state.catalog, Some(&result.progress));
    let (outcome, next_step) = match result.outcome {
        StepOutcome::Advanced { to, .. } => ("advanced", query_handlers::get_step(&state.catalog, to)),
        StepOutcome::Completed { .. } => ("completed", None),
    };
    Ok(Json(AdvanceResponse {
        outcome,
        message: "Quest step completed successfully",
        summary,
        next_step,
    }))
}

/// POST /users/{user_id}/qr
#[instrument(skip(state, request))]
async fn scan_qr(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(request): Json<ScanQrRequest>,
) -> Result<Json<AdvanceResponse>, ApiError> {
    advance(&state, UserId(user_id), QuestAction::Qr { code: request.code }).await
}

/// POST /users/{user_id}/photo
#[instrument(skip(state, request), fields(photo_ref = %request.photo_ref))]
async fn submit_photo(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(request): Json<SubmitPhotoRequest>,
) -> Result<Json<AdvanceResponse>, ApiError> {
    advance(
        &state,
        UserId(user_id),
        QuestAction::Photo {
            photo_ref: request.photo_ref,
        },
    )
    .await
}

/// DELETE /users/{user_id}
#[instrument(skip(state))]
async fn reset(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<ResetResponse>, ApiError> {
    let command = commands::ResetQuest {
        correlation_id: Uuid::new_v4(),
        user_id: UserId(user_id),
    };
    let reset = command_handlers::handle_reset_quest(&command, &*state.quest_repository).await?;
    Ok(Json(ResetResponse { reset }))
}

/// Returns the router for the quest context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/steps/{step}", get(get_step))
        .route("/leaderboard", get(get_leaderboard))
        .route("/users/{user_id}", get(get_summary).delete(reset))
        .route("/users/{user_id}/qr", post(scan_qr))
        .route("/users/{user_id}/photo", post(submit_photo))
}
