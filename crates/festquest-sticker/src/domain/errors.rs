//! Error types for the Sticker Compositing context.

use thiserror::Error;

/// Errors that stop a sticker from being produced.
///
/// Cutout-service trouble is not an error here: it only switches the
/// pipeline to the fallback path.
#[derive(Debug, Error)]
pub enum StickerError {
    /// The uploaded photo was empty.
    #[error("photo is empty")]
    EmptyPhoto,

    /// Decoding, resizing or encoding failed.
    #[error("image processing failed: {0}")]
    ImageProcessing(#[from] image::ImageError),

    /// No template has this name.
    #[error("unknown sticker template `{0}`")]
    UnknownTemplate(String),

    /// The shared RNG mutex was poisoned.
    #[error("template selection failed: {0}")]
    Selection(String),

    /// The blocking worker panicked or was cancelled.
    #[error("sticker worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}
