//! Scripted cutout service.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use festquest_core::cutout::{CutoutOutcome, CutoutService, Unavailable};

/// A cutout service that always answers with the same outcome and counts
/// how often it was asked.
#[derive(Debug)]
pub struct CannedCutout {
    outcome: CutoutOutcome,
    calls: AtomicUsize,
}

impl CannedCutout {
    /// Always returns `outcome`.
    #[must_use]
    pub fn new(outcome: CutoutOutcome) -> Self {
        Self {
            outcome,
            calls: AtomicUsize::new(0),
        }
    }

    /// Always returns the given encoded cutout.
    #[must_use]
    pub fn available(bytes: Vec<u8>) -> Self {
        Self::new(CutoutOutcome::Available(bytes))
    }

    /// Always reports the service as unavailable with `reason`.
    #[must_use]
    pub fn unavailable(reason: Unavailable) -> Self {
        Self::new(CutoutOutcome::Unavailable(reason))
    }

    /// Number of `remove_background` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CutoutService for CannedCutout {
    async fn remove_background(&self, _photo: &[u8]) -> CutoutOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone()
    }
}
