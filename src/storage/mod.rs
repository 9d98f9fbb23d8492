pub mod memory;

use crate::domain::models::{DataSource, SyncJob, SyncStatus};
use crate::error::AppResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Storage trait for persistence operations.
#[async_trait]
pub trait Storage: Send + Sync {
    // Data Sources
    async fn save_source(&self, source: DataSource) -> AppResult<DataSource>;
    async fn get_source(&self, id: Uuid) -> AppResult<Option<DataSource>>;
    async fn list_sources(&self) -> AppResult<Vec<DataSource>>;
    async fn update_source_status(&self, id: Uuid, status: SyncStatus) -> AppResult<()>;
    async fn mark_source_sync_started(&self, id: Uuid, started_at: DateTime<Utc>) -> AppResult<()>;
    async fn record_source_sync(&self, id: Uuid, documents_count: usize, synced_at: DateTime<Utc>) -> AppResult<()>;
    async fn delete_source(&self, id: Uuid) -> AppResult<bool>;

    // Sync Jobs
    async fn save_sync_job(&self, job: SyncJob) -> AppResult<SyncJob>;
    async fn get_sync_job(&self, id: Uuid) -> AppResult<Option<SyncJob>>;
    async fn list_sync_jobs(&self, source_id: Uuid) -> AppResult<Vec<SyncJob>>;
    async fn update_sync_job_status(&self, id: Uuid, status: SyncStatus, error: Option<String>) -> AppResult<()>;
    async fn record_sync_job_batch(&self, id: Uuid, documents: usize) -> AppResult<()>;
}
