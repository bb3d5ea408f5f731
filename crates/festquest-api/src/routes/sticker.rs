//! Routes for the Sticker Compositing bounded context.

use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, Path, Query, State};
use axum::http::header::{CONTENT_TYPE, HeaderName, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use festquest_core::ids::UserId;
use festquest_sticker::application::pipeline::{StickerArtifact, record_sticker_generation};
use festquest_sticker::domain::template::find_template;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::error::ApiError;
use crate::state::AppState;

/// Largest photo upload accepted.
pub const MAX_PHOTO_BYTES: usize = 10 * 1024 * 1024;

/// Header naming the template a sticker was built on.
pub const TEMPLATE_HEADER: &str = "x-template-name";

/// Header naming the compositing path (`cutout` or `fallback`).
pub const MODE_HEADER: &str = "x-sticker-mode";

/// Query string for the photo upload.
#[derive(Debug, Deserialize)]
pub struct UploadParams {
    /// Platform reference of the uploaded photo, kept in the generation log.
    pub photo_ref: Option<String>,
}

/// Response body for POST /users/{user_id}/request.
#[derive(Debug, Serialize)]
pub struct StickerRequestResponse {
    /// Always `awaiting_photo`.
    pub status: &'static str,
    /// Seconds the guest has to upload the photo.
    pub expires_in_secs: i64,
    /// Whether a live request was already waiting and got its clock reset.
    pub refreshed: bool,
}

fn png_response(artifact: StickerArtifact) -> Response {
    (
        [
            (CONTENT_TYPE, HeaderValue::from_static("image/png")),
            (
                HeaderName::from_static(TEMPLATE_HEADER),
                HeaderValue::from_static(artifact.template_name),
            ),
            (
                HeaderName::from_static(MODE_HEADER),
                HeaderValue::from_static(artifact.mode.as_str()),
            ),
        ],
        artifact.png,
    )
        .into_response()
}

/// POST /users/{user_id}/request
#[instrument(skip(state))]
async fn request_sticker(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Json<StickerRequestResponse> {
    let user_id = UserId(user_id);
    let refreshed = state.pending.is_pending(user_id, state.clock.as_ref());
    state.pending.arm(user_id, state.clock.as_ref());
    let purged = state.pending.purge_expired(state.clock.as_ref());
    if purged > 0 {
        info!(purged, "expired sticker requests dropped");
    }
    Json(StickerRequestResponse {
        status: "awaiting_photo",
        expires_in_secs: state.pending.ttl().num_seconds(),
        refreshed,
    })
}

/// POST /users/{user_id}
///
/// The intent is consumed before any image work starts, so a failed
/// generation needs a fresh request.
#[instrument(skip(state, params, photo), fields(photo_bytes = photo.len()))]
async fn upload_photo(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Query(params): Query<UploadParams>,
    photo: Bytes,
) -> Result<Response, ApiError> {
    let user_id = UserId(user_id);
    if !state.pending.take(user_id, state.clock.as_ref()) {
        return Err(ApiError::NoPendingRequest(user_id));
    }

    let artifact = state
        .stickers
        .generate_sticker(photo.to_vec(), &*state.rng)
        .await?;

    if let Err(e) = record_sticker_generation(
        &*state.sticker_log,
        state.clock.as_ref(),
        user_id,
        &artifact,
        params.photo_ref,
    )
    .await
    {
        warn!(error = %e, "failed to record sticker generation");
    }

    Ok(png_response(artifact))
}

/// POST /fallback/{template}
#[instrument(skip(state, photo), fields(photo_bytes = photo.len()))]
async fn fallback_sticker(
    State(state): State<AppState>,
    Path(template): Path<String>,
    photo: Bytes,
) -> Result<Response, ApiError> {
    let descriptor = find_template(&template)
        .ok_or_else(|| ApiError::NotFound(format!("sticker template {template} not found")))?;
    let artifact = state
        .stickers
        .generate_fallback_sticker(photo.to_vec(), descriptor)
        .await?;
    Ok(png_response(artifact))
}

/// Returns the router for the sticker context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users/{user_id}/request", post(request_sticker))
        .route("/users/{user_id}", post(upload_photo))
        .route("/fallback/{template}", post(fallback_sticker))
        .layer(DefaultBodyLimit::max(MAX_PHOTO_BYTES))
}
