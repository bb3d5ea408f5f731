//! Test repositories — `QuestProgressRepository` implementations for tests.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use festquest_core::error::DomainError;
use festquest_core::ids::UserId;
use festquest_core::repository::{QuestProgressRepository, StoredQuestProgress};

/// An in-memory repository with the same contract as the PostgreSQL one:
/// lazy creation, version-checked saves, and completed-quest queries in
/// `completed_at` order (ties keep insertion order).
#[derive(Debug, Default)]
pub struct InMemoryQuestRepository {
    records: Mutex<Vec<StoredQuestProgress>>,
    saves: Mutex<usize>,
}

impl InMemoryQuestRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository pre-populated with `records`.
    #[must_use]
    pub fn with_records(records: Vec<StoredQuestProgress>) -> Self {
        Self {
            records: Mutex::new(records),
            saves: Mutex::new(0),
        }
    }

    /// Returns the stored record for `user_id`, if any.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn snapshot(&self, user_id: UserId) -> Option<StoredQuestProgress> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.user_id == user_id)
            .cloned()
    }

    /// Number of successful saves.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn save_count(&self) -> usize {
        *self.saves.lock().unwrap()
    }

    fn bump_version(&self, user_id: UserId) {
        if let Some(record) = self
            .records
            .lock()
            .unwrap()
            .iter_mut()
            .find(|r| r.user_id == user_id)
        {
            record.version += 1;
        }
    }
}

#[async_trait]
impl QuestProgressRepository for InMemoryQuestRepository {
    async fn get_quest_progress(
        &self,
        user_id: UserId,
    ) -> Result<Option<StoredQuestProgress>, DomainError> {
        Ok(self.snapshot(user_id))
    }

    async fn create_quest_progress(
        &self,
        user_id: UserId,
        created_at: DateTime<Utc>,
    ) -> Result<StoredQuestProgress, DomainError> {
        let mut records = self.records.lock().unwrap();
        if let Some(existing) = records.iter().find(|r| r.user_id == user_id) {
            return Ok(existing.clone());
        }
        let fresh = StoredQuestProgress::fresh(user_id, created_at);
        records.push(fresh.clone());
        Ok(fresh)
    }

    async fn save_quest_progress(
        &self,
        progress: &StoredQuestProgress,
        expected_version: i64,
    ) -> Result<(), DomainError> {
        let mut records = self.records.lock().unwrap();
        let slot = records
            .iter_mut()
            .find(|r| r.user_id == progress.user_id)
            .ok_or(DomainError::NotFound(progress.user_id))?;
        if slot.version != expected_version {
            return Err(DomainError::ConcurrencyConflict {
                user_id: progress.user_id,
                expected: expected_version,
                actual: slot.version,
            });
        }
        *slot = progress.clone();
        *self.saves.lock().unwrap() += 1;
        Ok(())
    }

    async fn query_completed_quests(
        &self,
        limit: u32,
    ) -> Result<Vec<StoredQuestProgress>, DomainError> {
        let mut completed: Vec<StoredQuestProgress> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.completed)
            .cloned()
            .collect();
        completed.sort_by_key(|r| r.completed_at);
        completed.truncate(limit as usize);
        Ok(completed)
    }

    async fn delete_quest_progress(&self, user_id: UserId) -> Result<bool, DomainError> {
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|r| r.user_id != user_id);
        Ok(records.len() != before)
    }
}

/// A repository where another writer always lands between a read and the
/// following save, so every save raises `ConcurrencyConflict`.
#[derive(Debug, Default)]
pub struct RacingQuestRepository {
    inner: InMemoryQuestRepository,
}

impl RacingQuestRepository {
    /// Wrap a pre-populated in-memory repository.
    #[must_use]
    pub fn new(inner: InMemoryQuestRepository) -> Self {
        Self { inner }
    }

    /// The wrapped repository.
    #[must_use]
    pub fn inner(&self) -> &InMemoryQuestRepository {
        &self.inner
    }
}

#[async_trait]
impl QuestProgressRepository for RacingQuestRepository {
    async fn get_quest_progress(
        &self,
        user_id: UserId,
    ) -> Result<Option<StoredQuestProgress>, DomainError> {
        let seen = self.inner.get_quest_progress(user_id).await?;
        self.inner.bump_version(user_id);
        Ok(seen)
    }

    async fn create_quest_progress(
        &self,
        user_id: UserId,
        created_at: DateTime<Utc>,
    ) -> Result<StoredQuestProgress, DomainError> {
        let seen = self.inner.create_quest_progress(user_id, created_at).await?;
        self.inner.bump_version(user_id);
        Ok(seen)
    }

    async fn save_quest_progress(
        &self,
        progress: &StoredQuestProgress,
        expected_version: i64,
    ) -> Result<(), DomainError> {
        self.inner.save_quest_progress(progress, expected_version).await
    }

    async fn query_completed_quests(
        &self,
        limit: u32,
    ) -> Result<Vec<StoredQuestProgress>, DomainError> {
        self.inner.query_completed_quests(limit).await
    }

    async fn delete_quest_progress(&self, user_id: UserId) -> Result<bool, DomainError> {
        self.inner.delete_quest_progress(user_id).await
    }
}

/// A repository whose reads succeed but whose saves always fail with an
/// infrastructure error. Used to verify rollback on persistence failure.
#[derive(Debug, Default)]
pub struct SaveFailingQuestRepository {
    inner: InMemoryQuestRepository,
}

impl SaveFailingQuestRepository {
    /// Wrap a pre-populated in-memory repository.
    #[must_use]
    pub fn new(inner: InMemoryQuestRepository) -> Self {
        Self { inner }
    }

    /// The wrapped repository.
    #[must_use]
    pub fn inner(&self) -> &InMemoryQuestRepository {
        &self.inner
    }
}

#[async_trait]
impl QuestProgressRepository for SaveFailingQuestRepository {
    async fn get_quest_progress(
        &self,
        user_id: UserId,
    ) -> Result<Option<StoredQuestProgress>, DomainError> {
        self.inner.get_quest_progress(user_id).await
    }

    async fn create_quest_progress(
        &self,
        user_id: UserId,
        created_at: DateTime<Utc>,
    ) -> Result<StoredQuestProgress, DomainError> {
        self.inner.create_quest_progress(user_id, created_at).await
    }

    async fn save_quest_progress(
        &self,
        _progress: &StoredQuestProgress,
        _expected_version: i64,
    ) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("connection reset".into()))
    }

    async fn query_completed_quests(
        &self,
        limit: u32,
    ) -> Result<Vec<StoredQuestProgress>, DomainError> {
        self.inner.query_completed_quests(limit).await
    }

    async fn delete_quest_progress(&self, user_id: UserId) -> Result<bool, DomainError> {
        self.inner.delete_quest_progress(user_id).await
    }
}

/// A repository that always returns an infrastructure error. Useful for
/// testing error-handling paths.
#[derive(Debug)]
pub struct FailingQuestRepository;

#[async_trait]
impl QuestProgressRepository for FailingQuestRepository {
    async fn get_quest_progress(
        &self,
        _user_id: UserId,
    ) -> Result<Option<StoredQuestProgress>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn create_quest_progress(
        &self,
        _user_id: UserId,
        _created_at: DateTime<Utc>,
    ) -> Result<StoredQuestProgress, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn save_quest_progress(
        &self,
        _progress: &StoredQuestProgress,
        _expected_version: i64,
    ) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn query_completed_quests(
        &self,
        _limit: u32,
    ) -> Result<Vec<StoredQuestProgress>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn delete_quest_progress(&self, _user_id: UserId) -> Result<bool, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }
}
