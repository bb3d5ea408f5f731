//! Query handlers for the Quest Progression context.
//!
//! Read-only views over the catalog and stored progress. None of these
//! create records.

use chrono::{DateTime, Utc};
use festquest_core::ids::UserId;
use festquest_core::repository::QuestProgressRepository;
use serde::Serialize;
use tracing::warn;

use crate::application::command_handlers;
use crate::domain::aggregates::QuestProgress;
use crate::domain::catalog::{QuestCatalog, QuestStepDefinition};
use crate::domain::errors::QuestError;

/// Number of leaderboard entries returned when the caller gives no limit.
pub const DEFAULT_LEADERBOARD_LIMIT: u32 = 10;

/// Guest-facing view of one catalog step. The expected QR code is never
/// exposed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepView {
    /// 1-based step number.
    pub step_number: u32,
    /// Instructions shown to the guest.
    pub description: String,
    /// Whether the step is completed by a QR scan.
    pub requires_qr: bool,
    /// Whether the step is completed by a photo upload.
    pub requires_photo: bool,
    /// Whether completing the step finishes the quest.
    pub is_final: bool,
}

impl From<&QuestStepDefinition> for StepView {
    fn from(definition: &QuestStepDefinition) -> Self {
        Self {
            step_number: definition.step_number,
            description: definition.description.clone(),
            requires_qr: definition.requires_qr(),
            requires_photo: definition.requires_photo(),
            is_final: definition.is_final(),
        }
    }
}

/// Compact progress summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestSummary {
    /// Step the guest is on.
    pub current_step: u32,
    /// Number of steps in the quest.
    pub total_steps: usize,
    /// Number of steps completed so far.
    pub completed_count: usize,
    /// Whether the quest is finished.
    pub is_completed: bool,
    /// Completion code, only once the quest is finished.
    pub completion_code: Option<String>,
}

/// Summary plus the instructions for the guest's current step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestSummaryView {
    /// The guest.
    pub user_id: UserId,
    /// Progress summary.
    #[serde(flatten)]
    pub summary: QuestSummary,
    /// The current step, if the quest is still running.
    pub current_step_details: Option<StepView>,
}

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardEntry {
    /// 1-based position.
    pub rank: u32,
    /// The guest.
    pub user_id: UserId,
    /// When the guest finished.
    pub completed_at: DateTime<Utc>,
    /// Seconds from the first completed step to completion.
    pub total_time_secs: Option<i64>,
}

/// Summarizes a guest's progress. An absent record reads as a fresh guest on
/// step 1.
#[must_use]
pub fn summarize(catalog: &QuestCatalog, progress: Option<&QuestProgress>) -> QuestSummary {
    let Some(progress) = progress else {
        return QuestSummary {
            current_step: 1,
            total_steps: catalog.total_steps(),
            completed_count: 0,
            is_completed: false,
            completion_code: None,
        };
    };
    QuestSummary {
        current_step: progress.current_step(),
        total_steps: catalog.total_steps(),
        completed_count: progress.completed_steps().len(),
        is_completed: progress.is_completed(),
        completion_code: progress
            .is_completed()
            .then(|| catalog.completion_code().to_owned()),
    }
}

/// Looks up a catalog step for display.
#[must_use]
pub fn get_step(catalog: &QuestCatalog, step_number: u32) -> Option<StepView> {
    catalog.step(step_number).map(StepView::from)
}

/// Retrieves the progress summary for a guest.
///
/// # Errors
///
/// Returns `QuestError::Persistence` if the record cannot be loaded or is
/// corrupt.
pub async fn get_quest_summary(
    user_id: UserId,
    catalog: &QuestCatalog,
    repo: &dyn QuestProgressRepository,
) -> Result<QuestSummaryView, QuestError> {
    let progress = repo
        .get_quest_progress(user_id)
        .await?
        .map(command_handlers::reconstitute)
        .transpose()?;
    let summary = summarize(catalog, progress.as_ref());
    let current_step_details = if summary.is_completed {
        None
    } else {
        get_step(catalog, summary.current_step)
    };
    Ok(QuestSummaryView {
        user_id,
        summary,
        current_step_details,
    })
}

/// Returns the earliest finishers, at most `limit` of them.
///
/// Ties on `completed_at` keep the order the store returned them in.
///
/// # Errors
///
/// Returns `QuestError::Persistence` if the query fails.
pub async fn get_leaderboard(
    limit: u32,
    repo: &dyn QuestProgressRepository,
) -> Result<Vec<LeaderboardEntry>, QuestError> {
    let finished = repo.query_completed_quests(limit).await?;
    let mut entries = Vec::with_capacity(finished.len());
    for stored in finished {
        let user_id = stored.user_id;
        let progress = command_handlers::reconstitute(stored)?;
        let Some(completed_at) = progress.completed_at() else {
            warn!(%user_id, "completed quest record has no completion time; skipped");
            continue;
        };
        entries.push(LeaderboardEntry {
            rank: u32::try_from(entries.len() + 1).unwrap_or(u32::MAX),
            user_id,
            completed_at,
            total_time_secs: progress.total_time().map(|d| d.num_seconds()),
        });
    }
    Ok(entries)
}
