//! Command handlers for the Quest Progression context.
//!
//! Each handler loads the guest's record, runs the domain method on a copy,
//! and saves the copy with the version it was loaded at. A failed save
//! discards the copy, so callers never observe a half-applied advance.

use festquest_core::clock::Clock;
use festquest_core::command::Command;
use festquest_core::error::DomainError;
use festquest_core::repository::{
    QuestProgressRepository, StoredQuestProgress, StoredStepCompletion,
};
use tracing::{info, warn};

use crate::domain::aggregates::{ActionType, QuestProgress, StepCompletion, StepOutcome};
use crate::domain::catalog::QuestCatalog;
use crate::domain::commands::{AdvanceQuest, ResetQuest};
use crate::domain::errors::QuestError;

/// Result of a successful [`handle_advance_quest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvanceQuestResult {
    /// What happened.
    pub outcome: StepOutcome,
    /// The progress as persisted.
    pub progress: QuestProgress,
}

pub(crate) fn to_stored(progress: &QuestProgress) -> StoredQuestProgress {
    StoredQuestProgress {
        user_id: progress.user_id,
        current_step: progress.current_step,
        completed_steps: progress
            .completed_steps
            .iter()
            .map(|entry| StoredStepCompletion {
                step: entry.step,
                action_type: entry.action_type.as_str().to_owned(),
                payload: entry.payload.clone(),
                completed_at: entry.completed_at,
            })
            .collect(),
        completed: progress.completed,
        completed_at: progress.completed_at,
        version: progress.version,
        created_at: progress.created_at,
    }
}

/// Rebuilds a `QuestProgress` from its stored shape.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the history names an unknown
/// action type.
pub(crate) fn reconstitute(stored: StoredQuestProgress) -> Result<QuestProgress, DomainError> {
    let completed_steps = stored
        .completed_steps
        .into_iter()
        .map(|entry| {
            let action_type = ActionType::parse(&entry.action_type).ok_or_else(|| {
                DomainError::Infrastructure(format!(
                    "unknown action type `{}` in history of user {}",
                    entry.action_type, stored.user_id
                ))
            })?;
            Ok(StepCompletion {
                step: entry.step,
                action_type,
                payload: entry.payload,
                completed_at: entry.completed_at,
            })
        })
        .collect::<Result<Vec<_>, DomainError>>()?;

    Ok(QuestProgress {
        user_id: stored.user_id,
        version: stored.version,
        current_step: stored.current_step,
        completed_steps,
        completed: stored.completed,
        completed_at: stored.completed_at,
        created_at: stored.created_at,
    })
}

async fn load_or_create(
    command: &AdvanceQuest,
    clock: &dyn Clock,
    repo: &dyn QuestProgressRepository,
) -> Result<QuestProgress, DomainError> {
    let stored = match repo.get_quest_progress(command.user_id).await? {
        Some(stored) => stored,
        None => repo.create_quest_progress(command.user_id, clock.now()).await?,
    };
    reconstitute(stored)
}

/// Handles the `AdvanceQuest` command: loads (or lazily creates) the guest's
/// progress, applies the action to the current step, and persists the result.
///
/// # Errors
///
/// - `QuestError::AlreadyCompleted` if the guest already finished.
/// - `QuestError::InvalidStep`, `WrongActionType` or `ValidationFailed` from
///   the domain; nothing is written in these cases.
/// - `QuestError::Persistence` if loading or saving fails, including
///   `DomainError::ConcurrencyConflict` when another write landed first.
pub async fn handle_advance_quest(
    command: &AdvanceQuest,
    catalog: &QuestCatalog,
    clock: &dyn Clock,
    repo: &dyn QuestProgressRepository,
) -> Result<AdvanceQuestResult, QuestError> {
    let loaded = load_or_create(command, clock, repo).await?;
    if loaded.is_completed() {
        return Err(QuestError::AlreadyCompleted);
    }

    let expected_version = loaded.version;
    let mut working = loaded.clone();
    let outcome = working.advance(catalog, &command.action, clock)?;
    working.version = expected_version + 1;

    if let Err(e) = repo
        .save_quest_progress(&to_stored(&working), expected_version)
        .await
    {
        warn!(
            correlation_id = %command.correlation_id(),
            user_id = %command.user_id,
            error = %e,
            "quest progress save failed; advance discarded"
        );
        return Err(QuestError::Persistence(e));
    }

    match outcome {
        StepOutcome::Completed { step } => {
            info!(user_id = %command.user_id, step, "guest completed the quest");
        }
        StepOutcome::Advanced { from, to } => {
            info!(user_id = %command.user_id, from, to, "guest advanced to next quest step");
        }
    }

    Ok(AdvanceQuestResult {
        outcome,
        progress: working,
    })
}

/// Handles the `ResetQuest` command: deletes the guest's progress so their
/// next action starts over at step 1.
///
/// Returns whether a record existed.
///
/// # Errors
///
/// Returns `QuestError::Persistence` if the delete fails.
pub async fn handle_reset_quest(
    command: &ResetQuest,
    repo: &dyn QuestProgressRepository,
) -> Result<bool, QuestError> {
    let existed = repo.delete_quest_progress(command.user_id).await?;
    info!(
        correlation_id = %command.correlation_id(),
        user_id = %command.user_id,
        existed,
        "quest progress reset"
    );
    Ok(existed)
}
