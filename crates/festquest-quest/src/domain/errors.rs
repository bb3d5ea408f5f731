//! Error types for the Quest Progression context.

use std::path::PathBuf;

use festquest_core::error::DomainError;
use thiserror::Error;

use super::aggregates::ActionType;

/// Errors detected while loading or validating a quest catalog.
///
/// These are startup errors: a catalog that fails validation is never served.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog file could not be read.
    #[error("failed to read quest catalog {path}: {source}")]
    Io {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The catalog document is not valid YAML for the expected shape.
    #[error("failed to parse quest catalog: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// The catalog declares no steps.
    #[error("quest catalog has no steps")]
    Empty,

    /// The completion code is blank.
    #[error("quest catalog completion code must not be empty")]
    EmptyCompletionCode,

    /// The same step number appears twice.
    #[error("step {0} is declared more than once")]
    DuplicateStep(u32),

    /// Step numbers do not run 1, 2, 3, ...
    #[error("step numbers must be contiguous from 1: expected {expected}, found {found}")]
    NonContiguous {
        /// The step number expected at this position.
        expected: u32,
        /// The step number found.
        found: u32,
    },

    /// A step requires both a QR scan and a photo.
    #[error("step {0} requires both a QR scan and a photo")]
    AmbiguousRequirement(u32),

    /// A step requires neither a QR scan nor a photo.
    #[error("step {0} requires neither a QR scan nor a photo")]
    MissingRequirement(u32),

    /// A QR step has no expected code.
    #[error("QR step {0} has no expected code")]
    MissingQrCode(u32),

    /// A photo step declares a QR code.
    #[error("photo step {0} must not declare a QR code")]
    UnexpectedQrCode(u32),

    /// `next_step` names a marker other than `complete`.
    #[error("step {step} has unknown next_step marker `{marker}`")]
    UnknownMarker {
        /// The step carrying the marker.
        step: u32,
        /// The marker found.
        marker: String,
    },

    /// `next_step` points at a step that does not exist.
    #[error("step {step} points at missing step {next}")]
    UnknownNextStep {
        /// The step carrying the pointer.
        step: u32,
        /// The missing target.
        next: u32,
    },

    /// `next_step` does not move forward.
    #[error("step {step} must advance forward, but points at step {next}")]
    BackwardNextStep {
        /// The step carrying the pointer.
        step: u32,
        /// The non-forward target.
        next: u32,
    },

    /// The catalog does not have exactly one terminal step.
    #[error("quest catalog must have exactly one terminal step, found {0}")]
    TerminalCount(usize),

    /// A step cannot be reached by following `next_step` from step 1.
    #[error("step {0} is unreachable from step 1")]
    UnreachableStep(u32),
}

/// Errors produced while advancing a guest through the quest.
#[derive(Debug, Error)]
pub enum QuestError {
    /// The record points at a step the catalog does not define.
    #[error("invalid quest step {0}")]
    InvalidStep(u32),

    /// The submitted action is not the kind the step requires.
    #[error("step {step} expects a {expected} action, got {actual}")]
    WrongActionType {
        /// The current step.
        step: u32,
        /// The action type the step requires.
        expected: ActionType,
        /// The action type submitted.
        actual: ActionType,
    },

    /// The payload was rejected (wrong QR code, photo refused).
    #[error("validation failed at step {step}: {reason}")]
    ValidationFailed {
        /// The current step.
        step: u32,
        /// Why the payload was rejected.
        reason: &'static str,
    },

    /// The guest already finished the quest.
    #[error("quest already completed")]
    AlreadyCompleted,

    /// The Data Store rejected or failed the write.
    #[error("persistence error: {0}")]
    Persistence(#[from] DomainError),
}

impl QuestError {
    /// Short message suitable for showing to the guest.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidStep(_) => "Invalid quest step",
            Self::WrongActionType { .. } => "Invalid action for this step",
            Self::ValidationFailed { reason, .. } => reason,
            Self::AlreadyCompleted => "Quest already completed",
            Self::Persistence(_) => "Database error",
        }
    }
}
