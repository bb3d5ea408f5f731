//! Festquest API server entry point.

use std::error::Error;
use std::sync::{Arc, Mutex};

use festquest_api::config::AppConfig;
use festquest_api::error::AppError;
use festquest_api::pending::PendingIntents;
use festquest_api::state::AppState;
use festquest_core::clock::{Clock, SystemClock};
use festquest_core::cutout::{CutoutService, DisabledCutout};
use festquest_core::rng::{DeterministicRng, StdRngSource};
use festquest_quest::domain::catalog::QuestCatalog;
use festquest_sticker::application::pipeline::StickerPipeline;
use festquest_sticker::cutout::RemoveBgClient;
use festquest_sticker::render::typeface::Fonts;
use festquest_store::MIGRATOR;
use festquest_store::pg_quest_repository::PgQuestRepository;
use festquest_store::pg_sticker_log::PgStickerGenerationLog;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting Festquest API server");

    let config = AppConfig::from_env()?;

    // Create database connection pool and bring the schema up to date.
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .map_err(AppError::from)?;
    MIGRATOR.run(&pool).await.map_err(AppError::from)?;

    let catalog = match &config.catalog_path {
        Some(path) => QuestCatalog::from_path(path),
        None => QuestCatalog::reference(),
    }
    .map_err(AppError::from)?;
    tracing::info!(steps = catalog.total_steps(), "quest catalog loaded");

    let cutout: Arc<dyn CutoutService> = match config.cutout.clone() {
        Some(cutout_config) => Arc::new(RemoveBgClient::new(cutout_config).map_err(AppError::from)?),
        None => {
            tracing::warn!("REMOVE_BG_API_KEY not set; stickers use the fallback layout");
            Arc::new(DisabledCutout)
        }
    };
    let fonts = Arc::new(Fonts::load(&config.font_bold, &config.font_regular));
    let stickers = StickerPipeline::new(cutout, fonts, config.skip_cutout);

    // Build application state.
    let clock: Arc<dyn Clock + Send + Sync> = Arc::new(SystemClock);
    let rng: Arc<Mutex<dyn DeterministicRng + Send>> = Arc::new(Mutex::new(StdRngSource::from_os()));
    let app_state = AppState::new(
        clock,
        rng,
        Arc::new(catalog),
        Arc::new(PgQuestRepository::new(pool.clone())),
        Arc::new(PgStickerGenerationLog::new(pool)),
        stickers,
        Arc::new(PendingIntents::new(config.pending_ttl)),
    );

    let app = festquest_api::build_router(app_state);

    // Start server.
    let addr = config.socket_addr()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
