use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Credential key holding the Contentful CMA access token.
pub const CONTENTFUL_CMA_TOKEN: &str = "contentful_cma_token";

/// Opaque credential mapping supplied to a connector before fetching.
pub type Credentials = serde_json::Map<String, serde_json::Value>;

/// Source tags attached to every emitted document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentSource {
    Contentful,
}

impl std::fmt::Display for DocumentSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentSource::Contentful => write!(f, "contentful"),
        }
    }
}

/// Pointer from one entry field to another entry or asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRef {
    pub link_type: String,
    pub id: String,
}

/// Value of a single entry field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    /// Plain inline string.
    Text(String),
    /// Link to another entry or asset.
    Reference(LinkRef),
    /// Anything else: rich text, arrays, numbers, booleans, locations.
    Other(serde_json::Value),
}

/// A single content record from the remote content source.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub id: String,
    pub created_at: DateTime<FixedOffset>,
    /// Fields in the order the source returned them.
    pub fields: Vec<(String, FieldValue)>,
}

/// One addressable fragment of text within a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub link: String,
    pub text: String,
}

/// Normalized document handed to the indexing pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub sections: Vec<Section>,
    pub source: DocumentSource,
    pub semantic_identifier: String,
    pub metadata: BTreeMap<String, String>,
}

impl Document {
    /// Build a document from its sections.
    ///
    /// Returns `None` when `sections` is empty. The semantic identifier is
    /// the text of the first section.
    pub fn new(
        id: String,
        sections: Vec<Section>,
        source: DocumentSource,
        metadata: BTreeMap<String, String>,
    ) -> Option<Self> {
        let semantic_identifier = sections.first()?.text.clone();
        Some(Self {
            id,
            sections,
            source,
            semantic_identifier,
            metadata,
        })
    }
}

/// Space/environment target of a Contentful data source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentfulConfig {
    pub space: String,
    pub environment: String,
}

impl ContentfulConfig {
    /// Parse from a DataSource config JSON.
    pub fn from_config(config: &serde_json::Value) -> Option<Self> {
        let field = |name: &str| {
            config
                .get(name)
                .and_then(|v| v.as_str())
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
        };

        Some(Self {
            space: field("space")?,
            environment: field("environment")?,
        })
    }
}

/// Status of a sync job or data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

/// Seconds between scheduled full reloads of a source (10 minutes).
pub const DEFAULT_REFRESH_FREQ_SECS: u64 = 600;

/// A registered data source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSource {
    pub id: Uuid,
    pub name: String,
    pub source: DocumentSource,
    pub config: serde_json::Value,
    #[serde(skip_serializing, default)]
    pub credentials: Credentials,
    pub status: SyncStatus,
    /// `None` disables scheduled reloads; manual syncs still work.
    pub refresh_freq_secs: Option<u64>,
    pub disabled: bool,
    pub documents_count: usize,
    pub last_synced_at: Option<DateTime<Utc>>,
    pub last_sync_attempt_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DataSource {
    pub fn new(
        name: String,
        source: DocumentSource,
        config: serde_json::Value,
        credentials: Credentials,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            source,
            config,
            credentials,
            status: SyncStatus::Pending,
            refresh_freq_secs: Some(DEFAULT_REFRESH_FREQ_SECS),
            disabled: false,
            documents_count: 0,
            last_synced_at: None,
            last_sync_attempt_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the scheduler should start a full reload at `now`.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        if self.disabled || self.status == SyncStatus::Running {
            return false;
        }
        let Some(freq) = self.refresh_freq_secs else {
            return false;
        };
        match self.last_sync_attempt_at {
            None => true,
            Some(last) => now - last >= chrono::Duration::seconds(freq as i64),
        }
    }
}

/// A sync job for tracking background sync operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncJob {
    pub id: Uuid,
    pub source_id: Uuid,
    pub status: SyncStatus,
    pub documents_indexed: usize,
    pub batches_indexed: usize,
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl SyncJob {
    pub fn new(source_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            source_id,
            status: SyncStatus::Pending,
            documents_indexed: 0,
            batches_indexed: 0,
            error: None,
            started_at: Utc::now(),
            completed_at: None,
        }
    }
}
