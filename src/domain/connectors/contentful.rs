use crate::clients::{ContentfulClient, ContentfulSettings};
use crate::domain::connectors::{ContentSource, DocumentBatchIter, LoadConnector};
use crate::domain::models::{
    Credentials, Document, DocumentSource, Entry, FieldValue, Section, CONTENTFUL_CMA_TOKEN,
};
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Format of the `created_at` metadata value, e.g. `2023-05-01 10:20:30+0000`.
const CREATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S%z";

/// Client handle held by a connector.
pub enum ClientState {
    Uninitialized,
    Ready(Arc<dyn ContentSource>),
}

/// Contentful connector: indexes the plain-text fields of every entry in one
/// space/environment.
///
/// Rich text and link fields are not indexed.
pub struct ContentfulConnector {
    space: String,
    environment: String,
    settings: ContentfulSettings,
    batch_size: usize,
    state: ClientState,
}

impl ContentfulConnector {
    pub fn new(space: impl Into<String>, environment: impl Into<String>) -> Self {
        Self {
            space: space.into(),
            environment: environment.into(),
            settings: ContentfulSettings::default(),
            batch_size: 1,
            state: ClientState::Uninitialized,
        }
    }

    pub fn with_settings(mut self, settings: ContentfulSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Maximum documents per yielded batch (at least 1).
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Install an already-built client handle.
    #[cfg(test)]
    pub fn with_client(mut self, client: Arc<dyn ContentSource>) -> Self {
        self.state = ClientState::Ready(client);
        self
    }

    fn locator(&self) -> EntryLocator {
        EntryLocator {
            base: format!(
                "{}/spaces/{}/environments/{}/entries",
                self.settings.app_url, self.space, self.environment
            ),
        }
    }
}

#[async_trait]
impl LoadConnector for ContentfulConnector {
    fn source(&self) -> DocumentSource {
        DocumentSource::Contentful
    }

    fn load_credentials(&mut self, credentials: &Credentials) -> AppResult<Option<Credentials>> {
        let token = credentials
            .get(CONTENTFUL_CMA_TOKEN)
            .and_then(|v| v.as_str())
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| {
                AppError::InvalidCredentials(format!("'{}' must be a non-empty string", CONTENTFUL_CMA_TOKEN))
            })?;

        let client = ContentfulClient::new(token.to_string(), self.settings.clone());
        self.state = ClientState::Ready(Arc::new(client));
        Ok(None)
    }

    async fn load_from_state(&self) -> AppResult<DocumentBatchIter> {
        let client = match &self.state {
            ClientState::Ready(client) => client,
            ClientState::Uninitialized => {
                return Err(AppError::MissingCredential("Contentful".to_string()))
            }
        };

        info!("Listing Contentful entries for {}/{}", self.space, self.environment);
        let entries = client.list_entries(&self.space, &self.environment).await?;
        info!("Fetched {} entries from {}/{}", entries.len(), self.space, self.environment);

        Ok(Box::new(DocumentBatches {
            entries: entries.into_iter(),
            locator: self.locator(),
            batch_size: self.batch_size,
        }))
    }
}

/// Builds the app URL of an entry.
struct EntryLocator {
    base: String,
}

impl EntryLocator {
    fn url(&self, entry_id: &str) -> String {
        format!("{}/{}", self.base, entry_id)
    }
}

/// Converts listed entries into document batches as they are pulled.
pub struct DocumentBatches {
    entries: std::vec::IntoIter<Entry>,
    locator: EntryLocator,
    batch_size: usize,
}

impl Iterator for DocumentBatches {
    type Item = Vec<Document>;

    fn next(&mut self) -> Option<Vec<Document>> {
        let mut batch = Vec::with_capacity(self.batch_size);

        for entry in self.entries.by_ref() {
            if let Some(document) = entry_to_document(&self.locator, entry) {
                batch.push(document);
                if batch.len() >= self.batch_size {
                    break;
                }
            }
        }

        if batch.is_empty() {
            None
        } else {
            Some(batch)
        }
    }
}

/// One section per non-empty text field; entries without any are dropped.
fn entry_to_document(locator: &EntryLocator, entry: Entry) -> Option<Document> {
    debug!("Processing entry {}", entry.id);

    let link = locator.url(&entry.id);
    let sections: Vec<Section> = entry
        .fields
        .into_iter()
        .filter_map(|(name, value)| match value {
            FieldValue::Text(text) if !text.is_empty() => {
                debug!("Adding section for field {} of entry {}", name, entry.id);
                Some(Section {
                    link: link.clone(),
                    text,
                })
            }
            _ => None,
        })
        .collect();

    let mut metadata = BTreeMap::new();
    metadata.insert(
        "created_at".to_string(),
        entry.created_at.format(CREATED_AT_FORMAT).to_string(),
    );

    Document::new(entry.id, sections, DocumentSource::Contentful, metadata)
}
