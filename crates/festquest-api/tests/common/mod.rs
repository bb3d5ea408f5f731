//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use chrono::TimeDelta;
use festquest_core::clock::Clock;
use festquest_core::cutout::CutoutService;
use festquest_core::rng::DeterministicRng;
use festquest_quest::domain::catalog::QuestCatalog;
use festquest_sticker::application::pipeline::StickerPipeline;
use festquest_sticker::render::typeface::Fonts;
use festquest_test_support::{
    CannedCutout, FixedClock, InMemoryQuestRepository, RecordingStickerLog, SequenceRng,
};
use http_body_util::BodyExt;
use tower::ServiceExt;

use festquest_api::pending::PendingIntents;
use festquest_api::state::AppState;

/// Fixed timestamp used across all integration tests.
fn fixed_clock() -> Arc<dyn Clock + Send + Sync> {
    Arc::new(FixedClock(
        chrono::TimeZone::with_ymd_and_hms(&chrono::Utc, 2026, 7, 4, 16, 0, 0).unwrap(),
    ))
}

/// Everything a test may want to inspect after driving the app.
pub struct TestApp {
    pub state: AppState,
    pub quests: Arc<InMemoryQuestRepository>,
    pub stickers: Arc<RecordingStickerLog>,
    pub cutout: Arc<CannedCutout>,
}

impl TestApp {
    /// A fresh router over the shared state.
    pub fn router(&self) -> Router {
        festquest_api::build_router(self.state.clone())
    }
}

/// Build the full app with in-memory stores, a fixed clock, and a cutout
/// service that always reports the service as disabled.
pub fn build_test_app() -> TestApp {
    build_test_app_with(
        SequenceRng::new(vec![0; 16]),
        CannedCutout::unavailable(festquest_core::cutout::Unavailable::Disabled),
    )
}

/// Build the full app with a scripted RNG and cutout service.
pub fn build_test_app_with(rng: SequenceRng, cutout: CannedCutout) -> TestApp {
    let quests = Arc::new(InMemoryQuestRepository::new());
    let stickers = Arc::new(RecordingStickerLog::new());
    let cutout = Arc::new(cutout);
    let rng: Arc<Mutex<dyn DeterministicRng + Send>> = Arc::new(Mutex::new(rng));
    let cutout_service: Arc<dyn CutoutService> = cutout.clone();
    let state = AppState::new(
        fixed_clock(),
        rng,
        Arc::new(QuestCatalog::reference().unwrap()),
        quests.clone(),
        stickers.clone(),
        StickerPipeline::new(cutout_service, Arc::new(Fonts::builtin()), false),
        Arc::new(PendingIntents::new(TimeDelta::minutes(10))),
    );
    TestApp {
        state,
        quests,
        stickers,
        cutout,
    }
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();
    send(app, request).await
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// Send a DELETE request and return the response.
pub async fn delete_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// POST raw bytes and return status, headers and body bytes.
pub async fn post_bytes(app: Router, uri: &str, body: Vec<u8>) -> (StatusCode, HeaderMap, Vec<u8>) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/octet-stream")
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();

    (status, headers, body_bytes.to_vec())
}
