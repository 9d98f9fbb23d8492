pub mod contentful;

use crate::clients::ContentfulSettings;
use crate::domain::models::{ContentfulConfig, Credentials, DataSource, Document, DocumentSource, Entry};
use crate::error::{AppError, AppResult};
use async_trait::async_trait;

/// Lazy, finite, single-pass sequence of document batches.
pub type DocumentBatchIter = Box<dyn Iterator<Item = Vec<Document>> + Send>;

/// Remote capability that lists every entry of a space/environment.
///
/// Implementations own pagination; callers get the full listing or an error.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn list_entries(&self, space: &str, environment: &str) -> AppResult<Vec<Entry>>;
}

/// Trait for connectors that load a full snapshot of their source.
///
/// # Lifecycle
/// 1. `load_credentials` installs a client handle
/// 2. `load_from_state` performs the listing and returns the batches
#[async_trait]
pub trait LoadConnector: Send + Sync {
    /// Source tag stamped on every document.
    fn source(&self) -> DocumentSource;

    /// Build the client handle from credentials.
    ///
    /// Returns credentials to persist back, if any.
    fn load_credentials(&mut self, credentials: &Credentials) -> AppResult<Option<Credentials>>;

    /// Fetch everything and hand back the document batches.
    ///
    /// Fails with `AppError::MissingCredential` before `load_credentials`.
    async fn load_from_state(&self) -> AppResult<DocumentBatchIter>;
}

/// Builds connectors for stored data sources.
pub struct ConnectorManager {
    contentful: ContentfulSettings,
    batch_size: usize,
}

impl ConnectorManager {
    pub fn new(contentful: ContentfulSettings, batch_size: usize) -> Self {
        Self {
            contentful,
            batch_size,
        }
    }

    /// Get a connector for the given data source.
    pub fn get_connector(&self, source: &DataSource) -> AppResult<Box<dyn LoadConnector>> {
        match source.source {
            DocumentSource::Contentful => {
                let config = ContentfulConfig::from_config(&source.config).ok_or_else(|| {
                    AppError::Validation("config requires non-empty 'space' and 'environment'".to_string())
                })?;

                Ok(Box::new(
                    contentful::ContentfulConnector::new(config.space, config.environment)
                        .with_settings(self.contentful.clone())
                        .with_batch_size(self.batch_size),
                ))
            }
        }
    }
}
