//! Festquest — API error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use festquest_core::error::DomainError;
use festquest_core::ids::UserId;
use festquest_quest::domain::errors::{CatalogError, QuestError};
use festquest_sticker::domain::errors::StickerError;
use serde::Serialize;
use thiserror::Error;

/// Startup errors for the API server.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Database connection or pool error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration failed.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// The quest catalog failed to load or validate.
    #[error("quest catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// The cutout HTTP client could not be built.
    #[error("http client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Network binding or I/O error.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
}

/// HTTP-layer error that implements `IntoResponse`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Quest progression failure.
    #[error(transparent)]
    Quest(#[from] QuestError),

    /// Sticker pipeline failure.
    #[error(transparent)]
    Sticker(#[from] StickerError),

    /// A step, template or other addressed resource does not exist.
    #[error("{0}")]
    NotFound(String),

    /// A photo arrived without a live sticker request.
    #[error("no pending sticker request for user {0}")]
    NoPendingRequest(UserId),
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Quest(err) => match err {
                QuestError::InvalidStep(_) => (StatusCode::CONFLICT, "invalid_step"),
                QuestError::AlreadyCompleted => (StatusCode::CONFLICT, "already_completed"),
                QuestError::WrongActionType { .. } => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "wrong_action_type")
                }
                QuestError::ValidationFailed { .. } => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "validation_failed")
                }
                QuestError::Persistence(DomainError::ConcurrencyConflict { .. }) => {
                    (StatusCode::CONFLICT, "concurrency_conflict")
                }
                QuestError::Persistence(DomainError::NotFound(_)) => {
                    (StatusCode::NOT_FOUND, "not_found")
                }
                QuestError::Persistence(DomainError::Infrastructure(_)) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "persistence_error")
                }
            },
            Self::Sticker(err) => match err {
                StickerError::EmptyPhoto | StickerError::ImageProcessing(_) => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "image_processing_failure")
                }
                StickerError::UnknownTemplate(_) => (StatusCode::NOT_FOUND, "not_found"),
                StickerError::Selection(_) | StickerError::Worker(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
                }
            },
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            Self::NoPendingRequest(_) => (StatusCode::CONFLICT, "no_pending_request"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = self.status_and_code();

        let message = match &self {
            Self::Quest(err) => err.user_message().to_owned(),
            other => other.to_string(),
        };
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = ErrorBody {
            error: error_code,
            message,
        };

        (status, Json(body)).into_response()
    }
}
