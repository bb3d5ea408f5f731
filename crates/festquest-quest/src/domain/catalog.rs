//! The quest step catalog.
//!
//! A catalog is parsed from YAML once at startup, validated, and then shared
//! read-only. Validation guarantees that every step has exactly one
//! requirement, that `next_step` always moves forward, and that following
//! `next_step` from step 1 visits every step and ends at the single terminal
//! step.

use std::collections::HashSet;
use std::path::Path;

use festquest_core::ids::UserId;
use serde::Deserialize;
use tracing::info;

use super::aggregates::ActionType;
use super::errors::CatalogError;

const REFERENCE_CATALOG: &str = include_str!("../../catalog/reference.yaml");

/// Marker used in catalog documents for "this step finishes the quest".
pub const COMPLETE_MARKER: &str = "complete";

/// Where a step leads once completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextStep {
    /// Move on to the given step.
    Step(u32),
    /// The quest is finished.
    Complete,
}

/// What a step asks the guest to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepRequirement {
    /// Scan the QR code whose content equals `code`.
    Qr {
        /// Expected QR payload.
        code: String,
    },
    /// Upload a photo.
    Photo,
}

/// One validated step of the quest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestStepDefinition {
    /// 1-based step number.
    pub step_number: u32,
    /// Instructions shown to the guest.
    pub description: String,
    /// What the step requires.
    pub requirement: StepRequirement,
    /// Where the step leads.
    pub next_step: NextStep,
}

impl QuestStepDefinition {
    /// Whether the step is completed by scanning a QR code.
    #[must_use]
    pub fn requires_qr(&self) -> bool {
        matches!(self.requirement, StepRequirement::Qr { .. })
    }

    /// Whether the step is completed by uploading a photo.
    #[must_use]
    pub fn requires_photo(&self) -> bool {
        matches!(self.requirement, StepRequirement::Photo)
    }

    /// The action type this step accepts.
    #[must_use]
    pub fn required_action(&self) -> ActionType {
        match self.requirement {
            StepRequirement::Qr { .. } => ActionType::Qr,
            StepRequirement::Photo => ActionType::Photo,
        }
    }

    /// Whether completing this step finishes the quest.
    #[must_use]
    pub fn is_final(&self) -> bool {
        self.next_step == NextStep::Complete
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawCatalog {
    completion_code: String,
    steps: Vec<RawStep>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawStep {
    step: u32,
    description: String,
    #[serde(default)]
    requires_qr: bool,
    #[serde(default)]
    requires_photo: bool,
    #[serde(default)]
    qr_code: Option<String>,
    next_step: RawNextStep,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawNextStep {
    Step(u32),
    Marker(String),
}

/// Immutable, validated quest catalog.
#[derive(Debug, Clone)]
pub struct QuestCatalog {
    /// Steps ordered by step number; `steps[i].step_number == i + 1`.
    steps: Vec<QuestStepDefinition>,
    completion_code: String,
}

impl QuestCatalog {
    /// The built-in five-step festival quest.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` only if the embedded document is malformed.
    pub fn reference() -> Result<Self, CatalogError> {
        Self::from_yaml_str(REFERENCE_CATALOG)
    }

    /// Loads and validates a catalog file.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Io` if the file cannot be read, or any
    /// parse/validation error.
    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let source = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_yaml_str(&source)?;
        info!(path = %path.display(), steps = catalog.total_steps(), "loaded quest catalog");
        Ok(catalog)
    }

    /// Parses and validates a catalog document.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Parse` for malformed YAML, or the first
    /// validation rule the document breaks.
    pub fn from_yaml_str(source: &str) -> Result<Self, CatalogError> {
        let raw: RawCatalog = serde_yaml::from_str(source)?;
        Self::validate(raw)
    }

    fn validate(raw: RawCatalog) -> Result<Self, CatalogError> {
        if raw.completion_code.trim().is_empty() {
            return Err(CatalogError::EmptyCompletionCode);
        }
        if raw.steps.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::new();
        for step in &raw.steps {
            if !seen.insert(step.step) {
                return Err(CatalogError::DuplicateStep(step.step));
            }
        }

        let mut raw_steps = raw.steps;
        raw_steps.sort_by_key(|s| s.step);
        let total = u32::try_from(raw_steps.len()).unwrap_or(u32::MAX);

        for (expected, raw_step) in (1..).zip(&raw_steps) {
            if raw_step.step != expected {
                return Err(CatalogError::NonContiguous {
                    expected,
                    found: raw_step.step,
                });
            }
        }

        let steps = raw_steps
            .into_iter()
            .map(|raw_step| Self::validate_step(raw_step, total))
            .collect::<Result<Vec<_>, _>>()?;

        let terminals = steps.iter().filter(|s| s.is_final()).count();
        if terminals != 1 {
            return Err(CatalogError::TerminalCount(terminals));
        }

        // Forward-only pointers make this walk terminate.
        let mut visited = HashSet::new();
        let mut cursor = 1;
        loop {
            visited.insert(cursor);
            match steps[(cursor - 1) as usize].next_step {
                NextStep::Step(next) => cursor = next,
                NextStep::Complete => break,
            }
        }
        if let Some(orphan) = steps.iter().find(|s| !visited.contains(&s.step_number)) {
            return Err(CatalogError::UnreachableStep(orphan.step_number));
        }

        Ok(Self {
            steps,
            completion_code: raw.completion_code,
        })
    }

    fn validate_step(raw: RawStep, total: u32) -> Result<QuestStepDefinition, CatalogError> {
        let number = raw.step;
        let requirement = match (raw.requires_qr, raw.requires_photo) {
            (true, true) => return Err(CatalogError::AmbiguousRequirement(number)),
            (false, false) => return Err(CatalogError::MissingRequirement(number)),
            (true, false) => match raw.qr_code {
                Some(code) if !code.is_empty() => StepRequirement::Qr { code },
                _ => return Err(CatalogError::MissingQrCode(number)),
            },
            (false, true) => {
                if raw.qr_code.is_some() {
                    return Err(CatalogError::UnexpectedQrCode(number));
                }
                StepRequirement::Photo
            }
        };

        let next_step = match raw.next_step {
            RawNextStep::Marker(marker) if marker == COMPLETE_MARKER => NextStep::Complete,
            RawNextStep::Marker(marker) => {
                return Err(CatalogError::UnknownMarker {
                    step: number,
                    marker,
                });
            }
            RawNextStep::Step(next) if next <= number => {
                return Err(CatalogError::BackwardNextStep { step: number, next });
            }
            RawNextStep::Step(next) if next > total => {
                return Err(CatalogError::UnknownNextStep { step: number, next });
            }
            RawNextStep::Step(next) => NextStep::Step(next),
        };

        Ok(QuestStepDefinition {
            step_number: number,
            description: raw.description,
            requirement,
            next_step,
        })
    }

    /// Looks up a step by number.
    #[must_use]
    pub fn step(&self, step_number: u32) -> Option<&QuestStepDefinition> {
        let index = step_number.checked_sub(1)?;
        self.steps.get(index as usize)
    }

    /// All steps in order.
    pub fn steps(&self) -> impl Iterator<Item = &QuestStepDefinition> {
        self.steps.iter()
    }

    /// Number of steps in the quest.
    #[must_use]
    pub fn total_steps(&self) -> usize {
        self.steps.len()
    }

    /// Code shown to guests who finished the quest.
    #[must_use]
    pub fn completion_code(&self) -> &str {
        &self.completion_code
    }

    /// Returns `true` only if `payload` is exactly the code expected at
    /// `step_number`. Steps without a code never validate.
    #[must_use]
    pub fn validate_qr(&self, payload: &str, step_number: u32) -> bool {
        match self.step(step_number).map(|s| &s.requirement) {
            Some(StepRequirement::Qr { code }) => payload == code,
            _ => false,
        }
    }

    /// Accepts a photo submission for `step_number`.
    ///
    /// Photos are accepted unconditionally on photo steps; content
    /// verification is not performed. Any other step rejects the photo.
    #[must_use]
    pub fn accept_photo(&self, user_id: UserId, step_number: u32, photo_ref: &str) -> bool {
        let accepted = self.step(step_number).is_some_and(QuestStepDefinition::requires_photo);
        if accepted {
            info!(%user_id, step = step_number, photo_ref, "photo submitted for quest step");
        }
        accepted
    }
}
