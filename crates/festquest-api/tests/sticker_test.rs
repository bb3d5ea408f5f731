//! Integration tests for the Sticker Compositing bounded context.

mod common;

use axum::http::StatusCode;
use festquest_test_support::{CannedCutout, SequenceRng, cutout_png, solid_jpeg};
use image::GenericImageView;

#[tokio::test]
async fn test_request_then_upload_yields_fallback_sticker() {
    let app = common::build_test_app_with(
        SequenceRng::new(vec![2]),
        CannedCutout::unavailable(festquest_core::cutout::Unavailable::Status(500)),
    );

    // POST /api/v1/stickers/users/{user_id}/request
    let (status, json) =
        common::post_json(app.router(), "/api/v1/stickers/users/77/request", &serde_json::json!({}))
            .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "awaiting_photo");

    // POST /api/v1/stickers/users/{user_id}
    let (status, headers, body) = common::post_bytes(
        app.router(),
        "/api/v1/stickers/users/77?photo_ref=tg-file-1",
        solid_jpeg(400, 300, [220, 180, 40]),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers["content-type"], "image/png");
    assert_eq!(headers["x-template-name"], "template3");
    assert_eq!(headers["x-sticker-mode"], "fallback");
    let sticker = image::load_from_memory(&body).unwrap();
    assert_eq!(sticker.dimensions(), (600, 800));
    assert_eq!(app.cutout.calls(), 1);

    let recorded = app.stickers.recorded();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].template_name, "template3");
    assert_eq!(recorded[0].original_photo_ref.as_deref(), Some("tg-file-1"));
}

#[tokio::test]
async fn test_cutout_available_yields_full_size_sticker() {
    let app = common::build_test_app_with(
        SequenceRng::new(vec![0]),
        CannedCutout::available(cutout_png(500, 500, [10, 10, 200])),
    );
    common::post_json(app.router(), "/api/v1/stickers/users/78/request", &serde_json::json!({}))
        .await;

    let (status, headers, body) = common::post_bytes(
        app.router(),
        "/api/v1/stickers/users/78",
        solid_jpeg(500, 500, [10, 10, 200]),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers["x-sticker-mode"], "cutout");
    let sticker = image::load_from_memory(&body).unwrap();
    assert_eq!(sticker.dimensions(), (800, 800));
}

#[tokio::test]
async fn test_second_upload_needs_a_new_request() {
    let app = common::build_test_app();
    common::post_json(app.router(), "/api/v1/stickers/users/79/request", &serde_json::json!({}))
        .await;

    let (first, _, _) = common::post_bytes(
        app.router(),
        "/api/v1/stickers/users/79",
        solid_jpeg(64, 64, [1, 1, 1]),
    )
    .await;
    let (second, _, body) = common::post_bytes(
        app.router(),
        "/api/v1/stickers/users/79",
        solid_jpeg(64, 64, [1, 1, 1]),
    )
    .await;

    assert_eq!(first, StatusCode::OK);
    assert_eq!(second, StatusCode::CONFLICT);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "no_pending_request");
}

#[tokio::test]
async fn test_fallback_endpoint_skips_cutout_service() {
    let app = common::build_test_app();

    let (status, headers, _) = common::post_bytes(
        app.router(),
        "/api/v1/stickers/fallback/template5",
        solid_jpeg(100, 200, [0, 0, 0]),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers["x-template-name"], "template5");
    assert_eq!(app.cutout.calls(), 0);
    assert!(app.stickers.recorded().is_empty());
}
