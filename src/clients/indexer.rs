use crate::domain::models::{Document, DocumentSource};
use crate::domain::sync::DocumentSink;
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

/// Client for communicating with the indexing service.
pub struct IndexerClient {
    client: Client,
    base_url: String,
}

/// Request payload for submitting a document batch.
#[derive(Debug, Serialize)]
struct IndexBatchRequest<'a> {
    source_id: Uuid,
    source: DocumentSource,
    documents: &'a [Document],
}

/// Response from submitting a document batch.
#[derive(Debug, Deserialize)]
pub struct IndexBatchResponse {
    pub accepted: bool,
    pub documents_count: usize,
    #[serde(default)]
    pub message: Option<String>,
}

impl IndexerClient {
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Submit a batch of documents for indexing.
    /// Calls: POST {INDEXER_SERVICE_URL}/index/documents
    pub async fn index_documents(
        &self,
        source_id: Uuid,
        source: DocumentSource,
        documents: &[Document],
    ) -> AppResult<IndexBatchResponse> {
        let url = format!("{}/index/documents", self.base_url);

        debug!("Submitting {} documents to: {}", documents.len(), url);

        let request = IndexBatchRequest {
            source_id,
            source,
            documents,
        };

        let response = self.client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Indexer request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalService(format!(
                "Indexer returned {}: {}",
                status, body
            )));
        }

        let batch_response: IndexBatchResponse = response
            .json()
            .await
            .map_err(|e| AppError::ExternalService(format!("Failed to parse indexer response: {}", e)))?;

        info!(
            "Indexer accepted={} documents={} for source {}{}",
            batch_response.accepted,
            batch_response.documents_count,
            source_id,
            batch_response.message.as_deref().map(|m| format!(" ({})", m)).unwrap_or_default()
        );
        Ok(batch_response)
    }
}

#[async_trait]
impl DocumentSink for IndexerClient {
    async fn submit_batch(
        &self,
        source_id: Uuid,
        source: DocumentSource,
        documents: &[Document],
    ) -> AppResult<()> {
        self.index_documents(source_id, source, documents).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;
    use std::collections::BTreeMap;

    fn document(id: &str) -> Document {
        Document::new(
            id.to_string(),
            vec![crate::domain::models::Section {
                link: format!("https://app.contentful.com/spaces/s/environments/master/entries/{}", id),
                text: "Hello".to_string(),
            }],
            DocumentSource::Contentful,
            BTreeMap::new(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_submit_batch_posts_source_tag_and_documents() {
        let mut server = Server::new_async().await;
        let source_id = Uuid::new_v4();
        let mock = server
            .mock("POST", "/index/documents")
            .match_body(Matcher::PartialJson(json!({
                "source_id": source_id,
                "source": "contentful",
                "documents": [{ "id": "e1", "semantic_identifier": "Hello" }]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"accepted":true,"documents_count":1}"#)
            .create_async()
            .await;

        let client = IndexerClient::new(format!("{}/", server.url()));
        client
            .submit_batch(source_id, DocumentSource::Contentful, &[document("e1")])
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_index_documents_reads_response() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/index/documents")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"accepted":true,"documents_count":1}"#)
            .create_async()
            .await;

        let client = IndexerClient::new(server.url());
        let response = client
            .index_documents(Uuid::new_v4(), DocumentSource::Contentful, &[document("e1")])
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(response.accepted);
        assert_eq!(response.documents_count, 1);
        assert!(response.message.is_none());
    }

    #[tokio::test]
    async fn test_index_documents_reports_failure_status() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/index/documents")
            .with_status(503)
            .with_body("overloaded")
            .create_async()
            .await;

        let client = IndexerClient::new(server.url());
        let err = client
            .submit_batch(Uuid::new_v4(), DocumentSource::Contentful, &[document("e1")])
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::ExternalService(ref m) if m.contains("503") && m.contains("overloaded")));
    }
}
