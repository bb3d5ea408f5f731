//! Test sticker logs — `StickerGenerationLog` implementations for tests.

use std::sync::Mutex;

use async_trait::async_trait;
use festquest_core::error::DomainError;
use festquest_core::repository::{StickerGenerationLog, StoredStickerGeneration};

/// A sticker log that keeps every record in memory.
#[derive(Debug, Default)]
pub struct RecordingStickerLog {
    recorded: Mutex<Vec<StoredStickerGeneration>>,
}

impl RecordingStickerLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all recorded generations.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn recorded(&self) -> Vec<StoredStickerGeneration> {
        self.recorded.lock().unwrap().clone()
    }
}

#[async_trait]
impl StickerGenerationLog for RecordingStickerLog {
    async fn record_sticker_generation(
        &self,
        generation: &StoredStickerGeneration,
    ) -> Result<(), DomainError> {
        self.recorded.lock().unwrap().push(generation.clone());
        Ok(())
    }
}

/// A sticker log that always fails.
#[derive(Debug)]
pub struct FailingStickerLog;

#[async_trait]
impl StickerGenerationLog for FailingStickerLog {
    async fn record_sticker_generation(
        &self,
        _generation: &StoredStickerGeneration,
    ) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }
}
