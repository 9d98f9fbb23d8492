use crate::clients::contentful::ContentfulSettings;
use std::env;
use std::str::FromStr;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port (default: 3014)
    pub port: u16,
    /// Indexing service URL that receives document batches
    pub indexer_service_url: String,
    /// Contentful Content Management API base URL
    pub contentful_api_url: String,
    /// Contentful web app base URL, used to build section links
    pub contentful_app_url: String,
    /// Locale whose field values are indexed
    pub contentful_locale: String,
    /// Entries requested per page from the CMA
    pub contentful_page_size: u32,
    /// Maximum documents per yielded batch
    pub connector_batch_size: usize,
    /// Seconds between scheduler checks for sources due a reload
    pub sync_tick_secs: u64,
}

fn parse_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            port: parse_or("PORT", 3014),
            indexer_service_url: env::var("INDEXER_SERVICE_URL")
                .unwrap_or_else(|_| "http://localhost:3012".to_string()),
            contentful_api_url: env::var("CONTENTFUL_API_URL")
                .unwrap_or_else(|_| "https://api.contentful.com".to_string()),
            contentful_app_url: env::var("CONTENTFUL_APP_URL")
                .unwrap_or_else(|_| "https://app.contentful.com".to_string()),
            contentful_locale: env::var("CONTENTFUL_LOCALE")
                .unwrap_or_else(|_| "en-US".to_string()),
            contentful_page_size: parse_or("CONTENTFUL_PAGE_SIZE", 100),
            connector_batch_size: parse_or("CONNECTOR_BATCH_SIZE", 1),
            sync_tick_secs: parse_or("SYNC_TICK_SECS", 60),
        }
    }

    /// Settings handed to every Contentful connector built by this service.
    pub fn contentful_settings(&self) -> ContentfulSettings {
        ContentfulSettings {
            api_url: self.contentful_api_url.trim_end_matches('/').to_string(),
            app_url: self.contentful_app_url.trim_end_matches('/').to_string(),
            locale: self.contentful_locale.clone(),
            page_size: self.contentful_page_size,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
