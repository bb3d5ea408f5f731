//! Background-removal service port.
//!
//! Implementations never fail: every problem collapses into
//! [`CutoutOutcome::Unavailable`], which callers treat as "take the
//! fallback path".

use std::fmt;

use async_trait::async_trait;

/// Why a cutout could not be produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unavailable {
    /// Remote calls are switched off by configuration.
    Disabled,
    /// The service answered with a status other than 200.
    Status(u16),
    /// The request did not complete in time.
    Timeout,
    /// Connection, TLS or body-read failure.
    Transport(String),
}

impl fmt::Display for Unavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => f.write_str("cutout service disabled"),
            Self::Status(code) => write!(f, "cutout service returned HTTP {code}"),
            Self::Timeout => f.write_str("cutout service timed out"),
            Self::Transport(detail) => write!(f, "cutout transport error: {detail}"),
        }
    }
}

/// Typed result of a background-removal attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CutoutOutcome {
    /// Encoded image of the subject with a transparent background.
    Available(Vec<u8>),
    /// No cutout; use the fallback path.
    Unavailable(Unavailable),
}

/// External service that isolates the subject of a photo.
#[async_trait]
pub trait CutoutService: Send + Sync {
    /// Attempts to remove the background of an encoded photo.
    async fn remove_background(&self, photo: &[u8]) -> CutoutOutcome;
}

/// A cutout service that is switched off and always answers `Unavailable`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledCutout;

#[async_trait]
impl CutoutService for DisabledCutout {
    async fn remove_background(&self, _photo: &[u8]) -> CutoutOutcome {
        CutoutOutcome::Unavailable(Unavailable::Disabled)
    }
}
