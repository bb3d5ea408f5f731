//! `PostgreSQL` implementation of the `StickerGenerationLog` trait.

use async_trait::async_trait;
use sqlx::PgPool;

use festquest_core::error::DomainError;
use festquest_core::repository::{StickerGenerationLog, StoredStickerGeneration};

use crate::db_error;

/// PostgreSQL-backed sticker generation log.
#[derive(Debug, Clone)]
pub struct PgStickerGenerationLog {
    pool: PgPool,
}

impl PgStickerGenerationLog {
    /// Creates a new `PgStickerGenerationLog`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StickerGenerationLog for PgStickerGenerationLog {
    async fn record_sticker_generation(
        &self,
        generation: &StoredStickerGeneration,
    ) -> Result<(), DomainError> {
        sqlx::query(
            "INSERT INTO sticker_generations \
             (generation_id, user_id, template_name, original_photo_ref, created_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(generation.generation_id)
        .bind(generation.user_id.0)
        .bind(&generation.template_name)
        .bind(generation.original_photo_ref.as_deref())
        .bind(generation.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(())
    }
}
