//! Sticker pipeline: template selection, background removal, compositing.

use std::sync::{Arc, Mutex};

use festquest_core::clock::Clock;
use festquest_core::cutout::{CutoutOutcome, CutoutService, Unavailable};
use festquest_core::error::DomainError;
use festquest_core::ids::UserId;
use festquest_core::repository::{StickerGenerationLog, StoredStickerGeneration};
use festquest_core::rng::DeterministicRng;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::domain::errors::StickerError;
use crate::domain::layout::CompositeMode;
use crate::domain::template::{TemplateDescriptor, select_template};
use crate::render::compositor::{build_sticker, decode};
use crate::render::typeface::Fonts;

/// A finished sticker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StickerArtifact {
    /// PNG-encoded sticker.
    pub png: Vec<u8>,
    /// Template the sticker was composited on.
    pub template_name: &'static str,
    /// Which compositing path produced it.
    pub mode: CompositeMode,
}

/// Produces stickers from guest photos.
#[derive(Clone)]
pub struct StickerPipeline {
    cutout: Arc<dyn CutoutService>,
    fonts: Arc<Fonts>,
    skip_cutout: bool,
}

impl std::fmt::Debug for StickerPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StickerPipeline")
            .field("fonts", &self.fonts)
            .field("skip_cutout", &self.skip_cutout)
            .finish_non_exhaustive()
    }
}

fn render_fallback(
    template: &'static TemplateDescriptor,
    photo: &[u8],
    fonts: &Fonts,
) -> Result<StickerArtifact, StickerError> {
    let image = decode(photo)?;
    Ok(StickerArtifact {
        png: build_sticker(template, CompositeMode::Fallback, &image, fonts)?,
        template_name: template.name,
        mode: CompositeMode::Fallback,
    })
}

fn render(
    template: &'static TemplateDescriptor,
    photo: &[u8],
    cutout: CutoutOutcome,
    fonts: &Fonts,
) -> Result<StickerArtifact, StickerError> {
    let cutout_bytes = match cutout {
        CutoutOutcome::Available(bytes) => bytes,
        CutoutOutcome::Unavailable(reason) => {
            info!(%reason, template = template.name, "no cutout; using fallback sticker");
            return render_fallback(template, photo, fonts);
        }
    };
    match decode(&cutout_bytes) {
        Ok(subject) => Ok(StickerArtifact {
            png: build_sticker(template, CompositeMode::Cutout, &subject, fonts)?,
            template_name: template.name,
            mode: CompositeMode::Cutout,
        }),
        Err(e) => {
            warn!(error = %e, "cutout not decodable; using fallback sticker");
            render_fallback(template, photo, fonts)
        }
    }
}

impl StickerPipeline {
    /// Creates a pipeline. With `skip_cutout` set the cutout service is never
    /// called and every sticker takes the fallback path.
    #[must_use]
    pub fn new(cutout: Arc<dyn CutoutService>, fonts: Arc<Fonts>, skip_cutout: bool) -> Self {
        Self {
            cutout,
            fonts,
            skip_cutout,
        }
    }

    /// Turns a photo into a sticker on a randomly chosen template.
    ///
    /// The RNG mutex is held only while the template is chosen, never across
    /// an await. Pixel work runs on the blocking pool.
    ///
    /// # Errors
    ///
    /// - `StickerError::EmptyPhoto` for an empty upload.
    /// - `StickerError::ImageProcessing` if the photo cannot be decoded or the
    ///   sticker cannot be encoded.
    /// - `StickerError::Selection` if the RNG mutex is poisoned.
    /// - `StickerError::Worker` if the blocking task fails.
    #[instrument(skip_all, fields(photo_bytes = photo.len()))]
    pub async fn generate_sticker(
        &self,
        photo: Vec<u8>,
        rng: &Mutex<dyn DeterministicRng + Send>,
    ) -> Result<StickerArtifact, StickerError> {
        if photo.is_empty() {
            return Err(StickerError::EmptyPhoto);
        }

        let template = {
            let mut rng_guard = rng
                .lock()
                .map_err(|e| StickerError::Selection(format!("RNG mutex poisoned: {e}")))?;
            select_template(&mut *rng_guard)
        };

        let cutout = if self.skip_cutout {
            CutoutOutcome::Unavailable(Unavailable::Disabled)
        } else {
            self.cutout.remove_background(&photo).await
        };

        let fonts = Arc::clone(&self.fonts);
        let artifact =
            tokio::task::spawn_blocking(move || render(template, &photo, cutout, &fonts)).await??;
        info!(
            template = artifact.template_name,
            mode = artifact.mode.as_str(),
            bytes = artifact.png.len(),
            "sticker generated"
        );
        Ok(artifact)
    }

    /// Builds a fallback-mode sticker on a specific template without calling
    /// the cutout service.
    ///
    /// # Errors
    ///
    /// Same as [`StickerPipeline::generate_sticker`], minus selection.
    #[instrument(skip_all, fields(template = template.name, photo_bytes = photo.len()))]
    pub async fn generate_fallback_sticker(
        &self,
        photo: Vec<u8>,
        template: &'static TemplateDescriptor,
    ) -> Result<StickerArtifact, StickerError> {
        if photo.is_empty() {
            return Err(StickerError::EmptyPhoto);
        }
        let fonts = Arc::clone(&self.fonts);
        Ok(tokio::task::spawn_blocking(move || render_fallback(template, &photo, &fonts)).await??)
    }
}

/// Records that `artifact` was handed to `user_id`.
///
/// # Errors
///
/// Returns `DomainError` if the log write fails.
pub async fn record_sticker_generation(
    log: &dyn StickerGenerationLog,
    clock: &dyn Clock,
    user_id: UserId,
    artifact: &StickerArtifact,
    original_photo_ref: Option<String>,
) -> Result<StoredStickerGeneration, DomainError> {
    let generation = StoredStickerGeneration {
        generation_id: Uuid::new_v4(),
        user_id,
        template_name: artifact.template_name.to_owned(),
        original_photo_ref,
        created_at: clock.now(),
    };
    log.record_sticker_generation(&generation).await?;
    Ok(generation)
}
