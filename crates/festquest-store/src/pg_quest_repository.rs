//! `PostgreSQL` implementation of the `QuestProgressRepository` trait.
//!
//! One row per guest. The completion history is a JSONB array and every
//! save is a single conditional `UPDATE` keyed on the version that was read.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;
use tracing::debug;

use festquest_core::error::DomainError;
use festquest_core::ids::UserId;
use festquest_core::repository::{
    QuestProgressRepository, StoredQuestProgress, StoredStepCompletion,
};

use crate::db_error;

const SELECT_COLUMNS: &str = "SELECT user_id, current_step, completed_steps, completed, \
     completed_at, version, created_at FROM quest_progress";

#[derive(Debug, sqlx::FromRow)]
struct QuestProgressRow {
    user_id: i64,
    current_step: i32,
    completed_steps: Json<Vec<StoredStepCompletion>>,
    completed: bool,
    completed_at: Option<DateTime<Utc>>,
    version: i64,
    created_at: DateTime<Utc>,
}

impl TryFrom<QuestProgressRow> for StoredQuestProgress {
    type Error = DomainError;

    fn try_from(row: QuestProgressRow) -> Result<Self, Self::Error> {
        let current_step = u32::try_from(row.current_step).map_err(|_| {
            DomainError::Infrastructure(format!(
                "negative current_step {} for user {}",
                row.current_step, row.user_id
            ))
        })?;
        Ok(Self {
            user_id: UserId(row.user_id),
            current_step,
            completed_steps: row.completed_steps.0,
            completed: row.completed,
            completed_at: row.completed_at,
            version: row.version,
            created_at: row.created_at,
        })
    }
}

fn step_column(step: u32) -> Result<i32, DomainError> {
    i32::try_from(step)
        .map_err(|_| DomainError::Infrastructure(format!("step {step} out of range")))
}

/// PostgreSQL-backed quest progress repository.
#[derive(Debug, Clone)]
pub struct PgQuestRepository {
    pool: PgPool,
}

impl PgQuestRepository {
    /// Creates a new `PgQuestRepository`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn current_version(&self, user_id: UserId) -> Result<Option<i64>, DomainError> {
        sqlx::query_scalar::<_, i64>("SELECT version FROM quest_progress WHERE user_id = $1")
            .bind(user_id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)
    }
}

#[async_trait]
impl QuestProgressRepository for PgQuestRepository {
    async fn get_quest_progress(
        &self,
        user_id: UserId,
    ) -> Result<Option<StoredQuestProgress>, DomainError> {
        let row = sqlx::query_as::<_, QuestProgressRow>(&format!(
            "{SELECT_COLUMNS} WHERE user_id = $1"
        ))
        .bind(user_id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;
        row.map(StoredQuestProgress::try_from).transpose()
    }

    async fn create_quest_progress(
        &self,
        user_id: UserId,
        created_at: DateTime<Utc>,
    ) -> Result<StoredQuestProgress, DomainError> {
        let fresh = StoredQuestProgress::fresh(user_id, created_at);
        let inserted = sqlx::query(
            "INSERT INTO quest_progress \
             (user_id, current_step, completed_steps, completed, completed_at, version, created_at) \
             VALUES ($1, $2, $3, FALSE, NULL, 0, $4) \
             ON CONFLICT (user_id) DO NOTHING",
        )
        .bind(user_id.0)
        .bind(step_column(fresh.current_step)?)
        .bind(Json(&fresh.completed_steps))
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(db_error)?
        .rows_affected();

        if inserted == 1 {
            debug!(%user_id, "created quest progress");
            return Ok(fresh);
        }
        self.get_quest_progress(user_id).await?.ok_or_else(|| {
            DomainError::Infrastructure(format!("quest progress for user {user_id} vanished"))
        })
    }

    async fn save_quest_progress(
        &self,
        progress: &StoredQuestProgress,
        expected_version: i64,
    ) -> Result<(), DomainError> {
        let updated = sqlx::query(
            "UPDATE quest_progress \
             SET current_step = $2, completed_steps = $3, completed = $4, \
                 completed_at = $5, version = $6 \
             WHERE user_id = $1 AND version = $7",
        )
        .bind(progress.user_id.0)
        .bind(step_column(progress.current_step)?)
        .bind(Json(&progress.completed_steps))
        .bind(progress.completed)
        .bind(progress.completed_at)
        .bind(progress.version)
        .bind(expected_version)
        .execute(&self.pool)
        .await
        .map_err(db_error)?
        .rows_affected();

        if updated == 1 {
            return Ok(());
        }
        match self.current_version(progress.user_id).await? {
            None => Err(DomainError::NotFound(progress.user_id)),
            Some(actual) => Err(DomainError::ConcurrencyConflict {
                user_id: progress.user_id,
                expected: expected_version,
                actual,
            }),
        }
    }

    async fn query_completed_quests(
        &self,
        limit: u32,
    ) -> Result<Vec<StoredQuestProgress>, DomainError> {
        let rows = sqlx::query_as::<_, QuestProgressRow>(&format!(
            "{SELECT_COLUMNS} WHERE completed ORDER BY completed_at ASC LIMIT $1"
        ))
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;
        rows.into_iter().map(StoredQuestProgress::try_from).collect()
    }

    async fn delete_quest_progress(&self, user_id: UserId) -> Result<bool, DomainError> {
        let deleted = sqlx::query("DELETE FROM quest_progress WHERE user_id = $1")
            .bind(user_id.0)
            .execute(&self.pool)
            .await
            .map_err(db_error)?
            .rows_affected();
        Ok(deleted > 0)
    }
}
