//! Shared application state.

use std::sync::{Arc, Mutex};

use festquest_core::clock::Clock;
use festquest_core::repository::{QuestProgressRepository, StickerGenerationLog};
use festquest_core::rng::DeterministicRng;
use festquest_quest::domain::catalog::QuestCatalog;
use festquest_sticker::application::pipeline::StickerPipeline;

use crate::pending::PendingIntents;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Clock for deterministic time.
    pub clock: Arc<dyn Clock + Send + Sync>,
    /// RNG for template selection.
    pub rng: Arc<Mutex<dyn DeterministicRng + Send>>,
    /// Validated quest catalog.
    pub catalog: Arc<QuestCatalog>,
    /// Quest progress Data Store.
    pub quest_repository: Arc<dyn QuestProgressRepository>,
    /// Sticker generation log.
    pub sticker_log: Arc<dyn StickerGenerationLog>,
    /// Sticker pipeline.
    pub stickers: StickerPipeline,
    /// Guests waiting to upload a sticker photo.
    pub pending: Arc<PendingIntents>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock + Send + Sync>,
        rng: Arc<Mutex<dyn DeterministicRng + Send>>,
        catalog: Arc<QuestCatalog>,
        quest_repository: Arc<dyn QuestProgressRepository>,
        sticker_log: Arc<dyn StickerGenerationLog>,
        stickers: StickerPipeline,
        pending: Arc<PendingIntents>,
    ) -> Self {
        Self {
            clock,
            rng,
            catalog,
            quest_repository,
            sticker_log,
            stickers,
            pending,
        }
    }
}
