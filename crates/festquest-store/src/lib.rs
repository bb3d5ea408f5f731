//! PostgreSQL-backed Data Store for the Festquest festival companion.

pub mod pg_quest_repository;
pub mod pg_sticker_log;

/// Schema migrations embedded from the workspace `migrations/` directory.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");

pub(crate) fn db_error(e: sqlx::Error) -> festquest_core::error::DomainError {
    festquest_core::error::DomainError::Infrastructure(format!("database error: {e}"))
}
