mod api;
mod clients;
mod config;
mod domain;
mod error;
mod storage;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use clients::IndexerClient;
use config::Config;
use domain::connectors::ConnectorManager;
use domain::scheduler::SyncScheduler;
use domain::sync::SyncOrchestrator;
use std::sync::Arc;
use std::time::{Duration, Instant};
use storage::memory::InMemoryStorage;
use storage::Storage;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Application state shared across handlers.
pub struct AppState {
    pub config: Config,
    pub storage: Arc<dyn Storage>,
    pub orchestrator: Arc<SyncOrchestrator>,
    pub started_at: Instant,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "contentful_connector=debug,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    let port = config.port;

    info!("Starting contentful-connector on port {}", port);
    info!("Contentful API URL: {}", config.contentful_api_url);
    info!("Indexer service URL: {}", config.indexer_service_url);

    let storage: Arc<dyn Storage> = Arc::new(InMemoryStorage::new());
    let indexer = Arc::new(IndexerClient::new(config.indexer_service_url.clone()));
    let connectors = Arc::new(ConnectorManager::new(
        config.contentful_settings(),
        config.connector_batch_size,
    ));
    let orchestrator = Arc::new(SyncOrchestrator::new(Arc::clone(&storage), indexer, connectors));

    info!("Checking for due syncs every {}s", config.sync_tick_secs);
    let scheduler = SyncScheduler::new(
        Arc::clone(&storage),
        Arc::clone(&orchestrator),
        Duration::from_secs(config.sync_tick_secs.max(1)),
    )
    .spawn();

    let app_state = web::Data::new(AppState {
        config,
        storage,
        orchestrator,
        started_at: Instant::now(),
    });

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin("http://localhost:3000")
            .allowed_origin("http://127.0.0.1:3000")
            .allowed_methods(vec!["GET", "POST", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::ACCEPT,
                actix_web::http::header::CONTENT_TYPE,
            ])
            .max_age(3600);

        App::new()
            .wrap(cors)
            .app_data(app_state.clone())
            .configure(api::configure_routes)
    })
    .bind(("0.0.0.0", port))
    .with_context(|| format!("failed to bind port {}", port))?
    .run()
    .await
    .context("HTTP server terminated with an error")?;

    scheduler.abort();
    Ok(())
}
