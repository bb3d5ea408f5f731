//! Aggregate roots for the Quest Progression context.

use std::fmt;

use chrono::{DateTime, Utc};
use festquest_core::clock::Clock;
use festquest_core::ids::UserId;
use serde::{Deserialize, Serialize};

use super::catalog::{NextStep, QuestCatalog, StepRequirement};
use super::errors::QuestError;

/// Kind of action a guest performs to complete a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// Scanning a QR code.
    Qr,
    /// Uploading a photo.
    Photo,
}

impl ActionType {
    /// Stable name used in storage and on the wire.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Qr => "qr",
            Self::Photo => "photo",
        }
    }

    /// Parses a stored action type name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "qr" => Some(Self::Qr),
            "photo" => Some(Self::Photo),
            _ => None,
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An action submitted by a guest, with its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestAction {
    /// A scanned QR code.
    Qr {
        /// Decoded QR content.
        code: String,
    },
    /// An uploaded photo.
    Photo {
        /// Platform reference of the uploaded photo.
        photo_ref: String,
    },
}

impl QuestAction {
    /// The kind of this action.
    #[must_use]
    pub fn action_type(&self) -> ActionType {
        match self {
            Self::Qr { .. } => ActionType::Qr,
            Self::Photo { .. } => ActionType::Photo,
        }
    }

    /// The raw payload recorded in history.
    #[must_use]
    pub fn payload(&self) -> &str {
        match self {
            Self::Qr { code } => code,
            Self::Photo { photo_ref } => photo_ref,
        }
    }
}

/// One entry of a guest's completion history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepCompletion {
    /// The step that was completed.
    pub step: u32,
    /// How it was completed.
    pub action_type: ActionType,
    /// The accepted payload.
    pub payload: String,
    /// When it was completed.
    pub completed_at: DateTime<Utc>,
}

/// Result of a successful advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The guest moved from one step to the next.
    Advanced {
        /// Step just completed.
        from: u32,
        /// Step now current.
        to: u32,
    },
    /// The guest completed the final step.
    Completed {
        /// The final step.
        step: u32,
    },
}

/// The aggregate root for one guest's quest progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestProgress {
    /// The guest this progress belongs to.
    pub user_id: UserId,
    /// Number of successful saves.
    pub(crate) version: i64,
    /// Step the guest is on.
    pub(crate) current_step: u32,
    /// Append-only completion history.
    pub(crate) completed_steps: Vec<StepCompletion>,
    /// Whether the final step is done.
    pub(crate) completed: bool,
    /// When the final step was done.
    pub(crate) completed_at: Option<DateTime<Utc>>,
    /// When the record was created.
    pub(crate) created_at: DateTime<Utc>,
}

impl QuestProgress {
    /// Creates progress positioned on step 1.
    #[must_use]
    pub fn new(user_id: UserId, created_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            version: 0,
            current_step: 1,
            completed_steps: Vec::new(),
            completed: false,
            completed_at: None,
            created_at,
        }
    }

    /// Current version (successful saves).
    #[must_use]
    pub fn version(&self) -> i64 {
        self.version
    }

    /// Step the guest is on; stays on the final step once completed.
    #[must_use]
    pub fn current_step(&self) -> u32 {
        self.current_step
    }

    /// Completion history, oldest first.
    #[must_use]
    pub fn completed_steps(&self) -> &[StepCompletion] {
        &self.completed_steps
    }

    /// Whether the quest is finished.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// When the quest was finished.
    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// When the record was created.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Time from the first completed step to quest completion.
    #[must_use]
    pub fn total_time(&self) -> Option<chrono::TimeDelta> {
        let first = self.completed_steps.first()?;
        Some(self.completed_at? - first.completed_at)
    }

    /// Applies a guest action to the current step.
    ///
    /// On success one history entry is appended and the guest either moves to
    /// the step's successor or, on the final step, is marked completed while
    /// staying on that step. Any error leaves the aggregate untouched.
    ///
    /// This does not guard against advancing an already-completed quest;
    /// callers check [`QuestProgress::is_completed`] first.
    ///
    /// # Errors
    ///
    /// - `QuestError::InvalidStep` if the catalog has no current step.
    /// - `QuestError::WrongActionType` if the step requires the other action.
    /// - `QuestError::ValidationFailed` if the payload is rejected.
    pub fn advance(
        &mut self,
        catalog: &QuestCatalog,
        action: &QuestAction,
        clock: &dyn Clock,
    ) -> Result<StepOutcome, QuestError> {
        let step = self.current_step;
        let definition = catalog.step(step).ok_or(QuestError::InvalidStep(step))?;

        match (&definition.requirement, action) {
            (StepRequirement::Qr { .. }, QuestAction::Qr { code }) => {
                if !catalog.validate_qr(code, step) {
                    return Err(QuestError::ValidationFailed {
                        step,
                        reason: "Invalid QR code",
                    });
                }
            }
            (StepRequirement::Photo, QuestAction::Photo { photo_ref }) => {
                if !catalog.accept_photo(self.user_id, step, photo_ref) {
                    return Err(QuestError::ValidationFailed {
                        step,
                        reason: "Photo validation failed",
                    });
                }
            }
            _ => {
                return Err(QuestError::WrongActionType {
                    step,
                    expected: definition.required_action(),
                    actual: action.action_type(),
                });
            }
        }

        let now = clock.now();
        self.completed_steps.push(StepCompletion {
            step,
            action_type: action.action_type(),
            payload: action.payload().to_owned(),
            completed_at: now,
        });

        match definition.next_step {
            NextStep::Complete => {
                self.completed = true;
                self.completed_at = Some(now);
                Ok(StepOutcome::Completed { step })
            }
            NextStep::Step(next) => {
                self.current_step = next;
                Ok(StepOutcome::Advanced { from: step, to: next })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};
    use festquest_test_support::FixedClock;

    fn catalog() -> QuestCatalog {
        QuestCatalog::reference().unwrap()
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 7, 4, 15, 30, 0).unwrap()
    }

    fn qr(code: &str) -> QuestAction {
        QuestAction::Qr {
            code: code.to_owned(),
        }
    }

    fn photo(photo_ref: &str) -> QuestAction {
        QuestAction::Photo {
            photo_ref: photo_ref.to_owned(),
        }
    }

    #[test]
    fn test_correct_qr_on_step_one_advances_to_step_two() {
        // Arrange
        let clock = FixedClock(fixed_now());
        let mut progress = QuestProgress::new(UserId(1), fixed_now());

        // Act
        let outcome = progress
            .advance(&catalog(), &qr("LIGHTHOUSE_QUEST_START"), &clock)
            .unwrap();

        // Assert
        assert_eq!(outcome, StepOutcome::Advanced { from: 1, to: 2 });
        assert_eq!(progress.current_step(), 2);
        assert_eq!(progress.completed_steps().len(), 1);
        let entry = &progress.completed_steps()[0];
        assert_eq!(entry.step, 1);
        assert_eq!(entry.action_type, ActionType::Qr);
        assert_eq!(entry.payload, "LIGHTHOUSE_QUEST_START");
        assert_eq!(entry.completed_at, fixed_now());
        assert!(!progress.is_completed());
    }

    #[test]
    fn test_wrong_qr_fails_validation_without_mutation() {
        // Arrange
        let clock = FixedClock(fixed_now());
        let mut progress = QuestProgress::new(UserId(1), fixed_now());
        let before = progress.clone();

        // Act
        let err = progress.advance(&catalog(), &qr("WRONG"), &clock).unwrap_err();

        // Assert
        assert!(matches!(err, QuestError::ValidationFailed { step: 1, .. }));
        assert_eq!(err.user_message(), "Invalid QR code");
        assert_eq!(progress, before);
    }

    #[test]
    fn test_photo_on_qr_step_is_wrong_action_type() {
        let clock = FixedClock(fixed_now());
        let mut progress = QuestProgress::new(UserId(1), fixed_now());
        let before = progress.clone();

        let err = progress.advance(&catalog(), &photo("file-1"), &clock).unwrap_err();

        match err {
            QuestError::WrongActionType {
                step,
                expected,
                actual,
            } => {
                assert_eq!(step, 1);
                assert_eq!(expected, ActionType::Qr);
                assert_eq!(actual, ActionType::Photo);
            }
            other => panic!("expected WrongActionType, got {other:?}"),
        }
        assert_eq!(progress, before);
    }

    #[test]
    fn test_qr_on_photo_step_is_wrong_action_type() {
        let clock = FixedClock(fixed_now());
        let mut progress = QuestProgress::new(UserId(1), fixed_now());
        progress.current_step = 3;
        let before = progress.clone();

        let err = progress
            .advance(&catalog(), &qr("LIGHTHOUSE_QUEST_START"), &clock)
            .unwrap_err();

        assert!(matches!(err, QuestError::WrongActionType { step: 3, .. }));
        assert_eq!(progress, before);
    }

    #[test]
    fn test_step_missing_from_catalog_is_invalid_step() {
        let clock = FixedClock(fixed_now());
        let mut progress = QuestProgress::new(UserId(1), fixed_now());
        progress.current_step = 9;

        let err = progress.advance(&catalog(), &photo("x"), &clock).unwrap_err();

        assert!(matches!(err, QuestError::InvalidStep(9)));
        assert!(progress.completed_steps().is_empty());
    }

    #[test]
    fn test_final_qr_completes_and_keeps_current_step() {
        // Arrange
        let clock = FixedClock(fixed_now());
        let mut progress = QuestProgress::new(UserId(1), fixed_now());
        progress.current_step = 5;

        // Act
        let outcome = progress
            .advance(&catalog(), &qr("DANCE_FLOOR_QUEST_END"), &clock)
            .unwrap();

        // Assert
        assert_eq!(outcome, StepOutcome::Completed { step: 5 });
        assert!(progress.is_completed());
        assert_eq!(progress.completed_at(), Some(fixed_now()));
        assert_eq!(progress.current_step(), 5);
        assert_eq!(progress.completed_steps().len(), 1);
    }

    #[test]
    fn test_full_walkthrough_records_monotonic_history() {
        let catalog = catalog();
        let start = fixed_now();
        let mut progress = QuestProgress::new(UserId(11), start);
        let actions = [
            qr("LIGHTHOUSE_QUEST_START"),
            photo("selfie"),
            photo("stage-board"),
            photo("avito-stand"),
            qr("DANCE_FLOOR_QUEST_END"),
        ];

        for (minutes, action) in (0_i64..).zip(actions.iter()) {
            let clock = FixedClock(start + TimeDelta::minutes(minutes * 10));
            let prior_len = progress.completed_steps().len();
            let prior_step = progress.current_step();

            let outcome = progress.advance(&catalog, action, &clock).unwrap();

            assert_eq!(progress.completed_steps().len(), prior_len + 1);
            match outcome {
                StepOutcome::Advanced { from, to } => {
                    assert_eq!(from, prior_step);
                    assert_eq!(progress.current_step(), to);
                    assert_eq!(catalog.step(from).unwrap().next_step, NextStep::Step(to));
                }
                StepOutcome::Completed { step } => {
                    assert_eq!(step, prior_step);
                    assert_eq!(progress.current_step(), prior_step);
                }
            }
        }

        let steps: Vec<u32> = progress.completed_steps().iter().map(|c| c.step).collect();
        assert_eq!(steps, vec![1, 2, 3, 4, 5]);
        assert!(progress.is_completed());
        assert_eq!(progress.total_time(), Some(TimeDelta::minutes(40)));
    }

    #[test]
    fn test_total_time_is_none_until_completed() {
        let clock = FixedClock(fixed_now());
        let mut progress = QuestProgress::new(UserId(1), fixed_now());
        assert_eq!(progress.total_time(), None);

        progress
            .advance(&catalog(), &qr("LIGHTHOUSE_QUEST_START"), &clock)
            .unwrap();

        assert_eq!(progress.total_time(), None);
    }

    #[test]
    fn test_action_type_names_round_trip() {
        for action_type in [ActionType::Qr, ActionType::Photo] {
            assert_eq!(ActionType::parse(action_type.as_str()), Some(action_type));
        }
        assert_eq!(ActionType::parse("video"), None);
    }
}
