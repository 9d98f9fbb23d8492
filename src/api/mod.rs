pub mod health;
pub mod jobs;
pub mod response;
pub mod sources;

use actix_web::web;

/// Configure all API routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    // Health endpoints
    cfg.route("/health", web::get().to(health::health_check))
        .route("/status", web::get().to(health::status));

    // Data sources
    cfg.service(
        web::scope("/api/sources")
            .route("", web::post().to(sources::create_source))
            .route("", web::get().to(sources::list_sources))
            .route("/{id}", web::get().to(sources::get_source))
            .route("/{id}", web::delete().to(sources::delete_source))
            .route("/{id}/sync", web::post().to(sources::sync_source))
            .route("/{id}/jobs", web::get().to(jobs::list_source_jobs))
            .route("/{id}/preview", web::post().to(sources::preview_source)),
    );

    // Sync jobs
    cfg.route("/api/jobs/{id}", web::get().to(jobs::get_job));
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::clients::{ContentfulSettings, IndexerClient};
    use crate::config::Config;
    use crate::domain::connectors::ConnectorManager;
    use crate::domain::sync::SyncOrchestrator;
    use crate::storage::memory::InMemoryStorage;
    use crate::storage::Storage;
    use crate::AppState;
    use std::sync::Arc;
    use std::time::Instant;

    /// App state whose Contentful API points at `contentful_api_url`.
    pub fn app_state(contentful_api_url: String) -> AppState {
        let config = Config {
            port: 0,
            indexer_service_url: "http://127.0.0.1:9".to_string(),
            contentful_api_url,
            contentful_app_url: "https://app.contentful.com".to_string(),
            contentful_locale: "en-US".to_string(),
            contentful_page_size: 100,
            connector_batch_size: 1,
            sync_tick_secs: 60,
        };
        let settings: ContentfulSettings = config.contentful_settings();
        let storage: Arc<dyn Storage> = Arc::new(InMemoryStorage::new());
        let orchestrator = SyncOrchestrator::new(
            Arc::clone(&storage),
            Arc::new(IndexerClient::new(config.indexer_service_url.clone())),
            Arc::new(ConnectorManager::new(settings, config.connector_batch_size)),
        );

        AppState {
            config,
            storage,
            orchestrator: Arc::new(orchestrator),
            started_at: Instant::now(),
        }
    }
}
