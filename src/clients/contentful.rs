use crate::domain::connectors::ContentSource;
use crate::domain::models::{Entry, FieldValue, LinkRef};
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use chrono::DateTime;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

/// The CMA rejects page sizes above this.
const MAX_PAGE_SIZE: u32 = 1000;

/// Endpoints and defaults used when talking to Contentful.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentfulSettings {
    /// Content Management API base URL
    pub api_url: String,
    /// Web app base URL, used for section links
    pub app_url: String,
    /// Locale whose field values are read
    pub locale: String,
    /// Entries per page
    pub page_size: u32,
}

impl Default for ContentfulSettings {
    fn default() -> Self {
        Self {
            api_url: "https://api.contentful.com".to_string(),
            app_url: "https://app.contentful.com".to_string(),
            locale: "en-US".to_string(),
            page_size: 100,
        }
    }
}

/// Client for the Contentful Content Management API.
pub struct ContentfulClient {
    client: Client,
    token: String,
    settings: ContentfulSettings,
}

#[derive(Debug, Deserialize)]
struct EntriesPage {
    #[serde(default)]
    total: u64,
    #[serde(default)]
    items: Vec<Value>,
}

impl ContentfulClient {
    pub fn new(token: String, settings: ContentfulSettings) -> Self {
        Self {
            client: Client::new(),
            token,
            settings,
        }
    }

    fn page_size(&self) -> u32 {
        self.settings.page_size.clamp(1, MAX_PAGE_SIZE)
    }

    /// Fetch one page of raw entries.
    /// Calls: GET {api_url}/spaces/{space}/environments/{environment}/entries?skip=&limit=
    async fn get_entries_page(
        &self,
        space: &str,
        environment: &str,
        skip: u64,
    ) -> AppResult<EntriesPage> {
        let url = format!(
            "{}/spaces/{}/environments/{}/entries",
            self.settings.api_url, space, environment
        );

        debug!("Fetching entries from: {} (skip {})", url, skip);

        let response = self.client
            .get(&url)
            .query(&[("skip", skip.to_string()), ("limit", self.page_size().to_string())])
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Content-Type", "application/vnd.contentful.management.v1+json")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalService(format!(
                "Contentful API returned {}: {}",
                status, body
            )));
        }

        let page: EntriesPage = response.json().await?;
        Ok(page)
    }
}

#[async_trait]
impl ContentSource for ContentfulClient {
    async fn list_entries(&self, space: &str, environment: &str) -> AppResult<Vec<Entry>> {
        let mut entries = Vec::new();
        let mut skip = 0u64;

        loop {
            let page = self.get_entries_page(space, environment, skip).await?;
            let fetched = page.items.len() as u64;

            for raw in &page.items {
                match decode_entry(raw, &self.settings.locale) {
                    Ok(entry) => entries.push(entry),
                    Err(e) => warn!("Skipping entry in {}/{}: {}", space, environment, e),
                }
            }

            skip += fetched;
            if fetched == 0 || skip >= page.total {
                break;
            }
        }

        debug!("Listed {} entries from {}/{}", entries.len(), space, environment);
        Ok(entries)
    }
}

/// Decode a raw CMA entry, keeping only the values stored under `locale`.
pub fn decode_entry(raw: &Value, locale: &str) -> AppResult<Entry> {
    let sys = raw
        .get("sys")
        .ok_or_else(|| AppError::MalformedEntry("entry has no sys block".to_string()))?;

    let id = sys
        .get("id")
        .and_then(|v| v.as_str())
        .ok_or_else(|| AppError::MalformedEntry("entry has no sys.id".to_string()))?
        .to_string();

    let created_at = sys
        .get("createdAt")
        .and_then(|v| v.as_str())
        .ok_or_else(|| AppError::MalformedEntry(format!("entry {} has no sys.createdAt", id)))?;
    let created_at = DateTime::parse_from_rfc3339(created_at).map_err(|e| {
        AppError::MalformedEntry(format!("entry {} has invalid createdAt '{}': {}", id, created_at, e))
    })?;

    let fields = match raw.get("fields").and_then(|v| v.as_object()) {
        Some(map) => map
            .iter()
            .filter_map(|(name, localized)| {
                localized
                    .get(locale)
                    .map(|value| (name.clone(), classify_value(value)))
            })
            .collect(),
        None => Vec::new(),
    };

    Ok(Entry {
        id,
        created_at,
        fields,
    })
}

/// Sort a single field value into text, link, or anything else.
fn classify_value(value: &Value) -> FieldValue {
    match value {
        Value::String(text) => FieldValue::Text(text.clone()),
        Value::Object(obj) => {
            let sys = obj.get("sys");
            let is_link = sys
                .and_then(|s| s.get("type"))
                .and_then(|t| t.as_str())
                == Some("Link");

            if is_link {
                let attr = |key: &str| {
                    sys.and_then(|s| s.get(key))
                        .and_then(|v| v.as_str())
                        .unwrap_or_default()
                        .to_string()
                };
                FieldValue::Reference(LinkRef {
                    link_type: attr("linkType"),
                    id: attr("id"),
                })
            } else {
                FieldValue::Other(value.clone())
            }
        }
        other => FieldValue::Other(other.clone()),
    }
}
