use crate::domain::connectors::{ConnectorManager, LoadConnector};
use crate::domain::models::{DataSource, Document, DocumentSource, SyncJob, SyncStatus};
use crate::error::AppResult;
use crate::storage::Storage;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

/// Downstream consumer of document batches.
#[async_trait]
pub trait DocumentSink: Send + Sync {
    async fn submit_batch(
        &self,
        source_id: Uuid,
        source: DocumentSource,
        documents: &[Document],
    ) -> AppResult<()>;
}

/// Sync orchestrator for managing data source synchronization.
pub struct SyncOrchestrator {
    storage: Arc<dyn Storage>,
    sink: Arc<dyn DocumentSink>,
    connectors: Arc<ConnectorManager>,
}

impl SyncOrchestrator {
    pub fn new(
        storage: Arc<dyn Storage>,
        sink: Arc<dyn DocumentSink>,
        connectors: Arc<ConnectorManager>,
    ) -> Self {
        Self {
            storage,
            sink,
            connectors,
        }
    }

    /// Start a sync job for a data source (runs in background).
    pub async fn start_sync(&self, source: DataSource) -> AppResult<SyncJob> {
        let job = SyncJob::new(source.id);
        self.storage.save_sync_job(job.clone()).await?;
        self.storage.mark_source_sync_started(source.id, job.started_at).await?;

        let storage = Arc::clone(&self.storage);
        let sink = Arc::clone(&self.sink);
        let connectors = Arc::clone(&self.connectors);
        let job_id = job.id;
        let source_id = source.id;

        tokio::spawn(async move {
            let result = Self::execute_sync(
                Arc::clone(&storage),
                sink,
                connectors,
                source,
                job_id,
            )
            .await;

            if let Err(e) = result {
                error!("Sync job {} failed: {}", job_id, e);
                let _ = storage.update_source_status(source_id, SyncStatus::Failed).await;
                let _ = storage.update_sync_job_status(job_id, SyncStatus::Failed, Some(e.to_string())).await;
            }
        });

        Ok(job)
    }

    /// Execute the sync operation.
    async fn execute_sync(
        storage: Arc<dyn Storage>,
        sink: Arc<dyn DocumentSink>,
        connectors: Arc<ConnectorManager>,
        source: DataSource,
        job_id: Uuid,
    ) -> AppResult<()> {
        info!("Starting sync for source {} (job {})", source.id, job_id);

        storage.update_sync_job_status(job_id, SyncStatus::Running, None).await?;

        let mut connector = connectors.get_connector(&source)?;
        connector.load_credentials(&source.credentials)?;

        let indexed = Self::index_batches(
            connector.as_ref(),
            sink.as_ref(),
            storage.as_ref(),
            source.id,
            job_id,
        )
        .await?;

        storage.record_source_sync(source.id, indexed, Utc::now()).await?;
        storage.update_source_status(source.id, SyncStatus::Completed).await?;
        storage.update_sync_job_status(job_id, SyncStatus::Completed, None).await?;

        info!("Sync completed for source {} (job {}): {} documents", source.id, job_id, indexed);
        Ok(())
    }

    /// Pull every batch from the connector and hand it to the sink.
    ///
    /// Returns the number of documents submitted.
    pub async fn index_batches(
        connector: &dyn LoadConnector,
        sink: &dyn DocumentSink,
        storage: &dyn Storage,
        source_id: Uuid,
        job_id: Uuid,
    ) -> AppResult<usize> {
        let mut indexed = 0;

        for batch in connector.load_from_state().await? {
            sink.submit_batch(source_id, connector.source(), &batch).await?;
            storage.record_sync_job_batch(job_id, batch.len()).await?;
            indexed += batch.len();
        }

        Ok(indexed)
    }

    /// Run the connector and return at most `limit` documents without indexing them.
    pub async fn preview(&self, source: &DataSource, limit: usize) -> AppResult<Vec<Document>> {
        let mut connector = self.connectors.get_connector(source)?;
        connector.load_credentials(&source.credentials)?;

        let documents = connector
            .load_from_state()
            .await?
            .flatten()
            .take(limit)
            .collect();
        Ok(documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::ContentfulSettings;
    use crate::domain::connectors::contentful::ContentfulConnector;
    use crate::domain::connectors::ContentSource;
    use crate::domain::models::{Credentials, Entry, FieldValue, CONTENTFUL_CMA_TOKEN};
    use crate::error::AppError;
    use crate::storage::memory::InMemoryStorage;
    use chrono::DateTime;
    use mockito::{Matcher, Server};
    use serde_json::json;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct RecordingSink {
        batches: Mutex<Vec<Vec<String>>>,
        sources: Mutex<Vec<DocumentSource>>,
        fail: bool,
    }

    #[async_trait]
    impl DocumentSink for RecordingSink {
        async fn submit_batch(
            &self,
            _source_id: Uuid,
            source: DocumentSource,
            documents: &[Document],
        ) -> AppResult<()> {
            if self.fail {
                return Err(AppError::ExternalService("Indexer returned 503".to_string()));
            }
            self.sources.lock().unwrap().push(source);
            self.batches
                .lock()
                .unwrap()
                .push(documents.iter().map(|d| d.id.clone()).collect());
            Ok(())
        }
    }

    struct FixedSource(Vec<Entry>);

    #[async_trait]
    impl ContentSource for FixedSource {
        async fn list_entries(&self, _space: &str, _environment: &str) -> AppResult<Vec<Entry>> {
            Ok(self.0.clone())
        }
    }

    fn titled(id: &str) -> Entry {
        Entry {
            id: id.to_string(),
            created_at: DateTime::parse_from_rfc3339("2023-05-01T10:20:30Z").unwrap(),
            fields: vec![("title".to_string(), FieldValue::Text(format!("Title {}", id)))],
        }
    }

    fn contentful_source() -> DataSource {
        let mut credentials = Credentials::new();
        credentials.insert(CONTENTFUL_CMA_TOKEN.to_string(), json!("cma-token"));
        DataSource::new(
            "docs".to_string(),
            DocumentSource::Contentful,
            json!({ "space": "s1", "environment": "master" }),
            credentials,
        )
    }

    async fn wait_for_job(storage: &dyn Storage, job_id: Uuid) -> SyncJob {
        for _ in 0..100 {
            let job = storage.get_sync_job(job_id).await.unwrap().unwrap();
            if matches!(job.status, SyncStatus::Completed | SyncStatus::Failed) {
                return job;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("sync job {} did not finish", job_id);
    }

    #[tokio::test]
    async fn test_index_batches_forwards_every_batch() {
        let storage = InMemoryStorage::new();
        let job = storage.save_sync_job(SyncJob::new(Uuid::new_v4())).await.unwrap();
        let sink = RecordingSink::default();
        let connector = ContentfulConnector::new("s1", "master")
            .with_client(Arc::new(FixedSource(vec![titled("e1"), titled("e2")])));

        let indexed = SyncOrchestrator::index_batches(&connector, &sink, &storage, job.source_id, job.id)
            .await
            .unwrap();

        assert_eq!(indexed, 2);
        assert_eq!(
            *sink.batches.lock().unwrap(),
            vec![vec!["e1".to_string()], vec!["e2".to_string()]]
        );
        assert_eq!(
            *sink.sources.lock().unwrap(),
            vec![DocumentSource::Contentful, DocumentSource::Contentful]
        );
        let job = storage.get_sync_job(job.id).await.unwrap().unwrap();
        assert_eq!(job.batches_indexed, 2);
        assert_eq!(job.documents_indexed, 2);
    }

    #[tokio::test]
    async fn test_index_batches_stops_on_sink_failure() {
        let storage = InMemoryStorage::new();
        let job = storage.save_sync_job(SyncJob::new(Uuid::new_v4())).await.unwrap();
        let sink = RecordingSink {
            fail: true,
            ..RecordingSink::default()
        };
        let connector = ContentfulConnector::new("s1", "master")
            .with_client(Arc::new(FixedSource(vec![titled("e1")])));

        let result = SyncOrchestrator::index_batches(&connector, &sink, &storage, job.source_id, job.id).await;

        assert!(matches!(result, Err(AppError::ExternalService(_))));
        let job = storage.get_sync_job(job.id).await.unwrap().unwrap();
        assert_eq!(job.documents_indexed, 0);
    }

    #[tokio::test]
    async fn test_start_sync_completes_against_contentful() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/spaces/s1/environments/master/entries")
            .match_query(Matcher::Any)
            .match_header("authorization", "Bearer cma-token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "total": 2,
                    "items": [
                        {
                            "sys": { "id": "e1", "createdAt": "2023-05-01T10:20:30Z" },
                            "fields": { "title": { "en-US": "Hello" } }
                        },
                        {
                            "sys": { "id": "e2", "createdAt": "2023-05-02T10:20:30Z" },
                            "fields": { "logo": { "en-US": { "sys": { "type": "Link", "linkType": "Asset", "id": "a1" } } } }
                        }
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let storage: Arc<dyn Storage> = Arc::new(InMemoryStorage::new());
        let sink = Arc::new(RecordingSink::default());
        let settings = ContentfulSettings {
            api_url: server.url(),
            ..ContentfulSettings::default()
        };
        let orchestrator = SyncOrchestrator::new(
            Arc::clone(&storage),
            sink.clone(),
            Arc::new(ConnectorManager::new(settings, 1)),
        );

        let source = storage.save_source(contentful_source()).await.unwrap();
        let job = orchestrator.start_sync(source.clone()).await.unwrap();
        assert_eq!(job.status, SyncStatus::Pending);
        let attempted = storage.get_source(source.id).await.unwrap().unwrap();
        assert_eq!(attempted.last_sync_attempt_at, Some(job.started_at));

        let job = wait_for_job(storage.as_ref(), job.id).await;
        assert_eq!(job.status, SyncStatus::Completed);
        assert_eq!(job.documents_indexed, 1);
        assert_eq!(*sink.batches.lock().unwrap(), vec![vec!["e1".to_string()]]);

        let source = storage.get_source(source.id).await.unwrap().unwrap();
        assert_eq!(source.status, SyncStatus::Completed);
        assert_eq!(source.documents_count, 1);
        assert!(source.last_synced_at.is_some());
    }

    #[tokio::test]
    async fn test_start_sync_marks_job_failed_without_token() {
        let storage: Arc<dyn Storage> = Arc::new(InMemoryStorage::new());
        let orchestrator = SyncOrchestrator::new(
            Arc::clone(&storage),
            Arc::new(RecordingSink::default()),
            Arc::new(ConnectorManager::new(ContentfulSettings::default(), 1)),
        );

        let mut source = contentful_source();
        source.credentials = Credentials::new();
        let source = storage.save_source(source).await.unwrap();

        let job = orchestrator.start_sync(source.clone()).await.unwrap();
        let job = wait_for_job(storage.as_ref(), job.id).await;

        assert_eq!(job.status, SyncStatus::Failed);
        assert!(job.error.unwrap().contains("contentful_cma_token"));
        let source = storage.get_source(source.id).await.unwrap().unwrap();
        assert_eq!(source.status, SyncStatus::Failed);
    }
}
