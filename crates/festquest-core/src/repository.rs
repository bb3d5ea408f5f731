//! Data Store ports and the stored record shapes they exchange.
//!
//! Bounded contexts convert their aggregates to and from these shapes; the
//! store crate persists them. Nothing here knows about PostgreSQL.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;
use crate::ids::UserId;

/// Stored representation of one completed quest step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredStepCompletion {
    /// Step number that was completed.
    pub step: u32,
    /// Action type name (`qr` or `photo`).
    pub action_type: String,
    /// The scanned code or the photo reference.
    pub payload: String,
    /// When the step was completed.
    pub completed_at: DateTime<Utc>,
}

/// Stored representation of a guest's quest progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredQuestProgress {
    /// The guest this record belongs to.
    pub user_id: UserId,
    /// Step the guest is currently on (1-based).
    pub current_step: u32,
    /// Append-only completion history.
    pub completed_steps: Vec<StoredStepCompletion>,
    /// Whether the final step has been completed.
    pub completed: bool,
    /// When the final step was completed.
    pub completed_at: Option<DateTime<Utc>>,
    /// Number of successful saves; used for optimistic concurrency.
    pub version: i64,
    /// When the record was first created.
    pub created_at: DateTime<Utc>,
}

impl StoredQuestProgress {
    /// A brand-new record positioned on step 1.
    #[must_use]
    pub fn fresh(user_id: UserId, created_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            current_step: 1,
            completed_steps: Vec::new(),
            completed: false,
            completed_at: None,
            version: 0,
            created_at,
        }
    }
}

/// Stored metadata about a sticker handed to a guest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredStickerGeneration {
    /// Unique record identifier.
    pub generation_id: Uuid,
    /// The guest the sticker was made for.
    pub user_id: UserId,
    /// Name of the template the sticker was composited on.
    pub template_name: String,
    /// Platform reference of the source photo, when known.
    pub original_photo_ref: Option<String>,
    /// When the sticker was generated.
    pub created_at: DateTime<Utc>,
}

/// Repository for per-guest quest progress records.
#[async_trait]
pub trait QuestProgressRepository: Send + Sync {
    /// Load the record for a guest, if one exists.
    async fn get_quest_progress(
        &self,
        user_id: UserId,
    ) -> Result<Option<StoredQuestProgress>, DomainError>;

    /// Create a fresh record for a guest. If one already exists it is
    /// returned unchanged.
    async fn create_quest_progress(
        &self,
        user_id: UserId,
        created_at: DateTime<Utc>,
    ) -> Result<StoredQuestProgress, DomainError>;

    /// Atomically replace a record. The write only lands if the stored
    /// version still equals `expected_version`; otherwise
    /// `DomainError::ConcurrencyConflict` is returned and nothing changes.
    async fn save_quest_progress(
        &self,
        progress: &StoredQuestProgress,
        expected_version: i64,
    ) -> Result<(), DomainError>;

    /// Completed records ordered by `completed_at` ascending, at most `limit`.
    async fn query_completed_quests(
        &self,
        limit: u32,
    ) -> Result<Vec<StoredQuestProgress>, DomainError>;

    /// Delete a guest's record. Returns whether a record existed.
    async fn delete_quest_progress(&self, user_id: UserId) -> Result<bool, DomainError>;
}

/// Append-only log of generated stickers.
#[async_trait]
pub trait StickerGenerationLog: Send + Sync {
    /// Record that a sticker was generated.
    async fn record_sticker_generation(
        &self,
        generation: &StoredStickerGeneration,
    ) -> Result<(), DomainError>;
}
