use crate::domain::models::{DataSource, SyncJob, SyncStatus};
use crate::error::{AppError, AppResult};
use crate::storage::Storage;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

/// In-memory storage implementation.
pub struct InMemoryStorage {
    sources: RwLock<HashMap<Uuid, DataSource>>,
    sync_jobs: RwLock<HashMap<Uuid, SyncJob>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self {
            sources: RwLock::new(HashMap::new()),
            sync_jobs: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

fn read<T>(lock: &RwLock<T>) -> AppResult<RwLockReadGuard<'_, T>> {
    lock.read().map_err(|_| AppError::Internal("Lock poisoned".to_string()))
}

fn write<T>(lock: &RwLock<T>) -> AppResult<RwLockWriteGuard<'_, T>> {
    lock.write().map_err(|_| AppError::Internal("Lock poisoned".to_string()))
}

#[async_trait]
impl Storage for InMemoryStorage {
    // Data Sources
    async fn save_source(&self, source: DataSource) -> AppResult<DataSource> {
        write(&self.sources)?.insert(source.id, source.clone());
        Ok(source)
    }

    async fn get_source(&self, id: Uuid) -> AppResult<Option<DataSource>> {
        Ok(read(&self.sources)?.get(&id).cloned())
    }

    async fn list_sources(&self) -> AppResult<Vec<DataSource>> {
        let mut sources: Vec<DataSource> = read(&self.sources)?.values().cloned().collect();
        sources.sort_by_key(|s| s.created_at);
        Ok(sources)
    }

    async fn update_source_status(&self, id: Uuid, status: SyncStatus) -> AppResult<()> {
        if let Some(source) = write(&self.sources)?.get_mut(&id) {
            source.status = status;
            source.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn mark_source_sync_started(&self, id: Uuid, started_at: DateTime<Utc>) -> AppResult<()> {
        if let Some(source) = write(&self.sources)?.get_mut(&id) {
            source.status = SyncStatus::Running;
            source.last_sync_attempt_at = Some(started_at);
            source.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn record_source_sync(&self, id: Uuid, documents_count: usize, synced_at: DateTime<Utc>) -> AppResult<()> {
        if let Some(source) = write(&self.sources)?.get_mut(&id) {
            source.documents_count = documents_count;
            source.last_synced_at = Some(synced_at);
            source.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn delete_source(&self, id: Uuid) -> AppResult<bool> {
        Ok(write(&self.sources)?.remove(&id).is_some())
    }

    // Sync Jobs
    async fn save_sync_job(&self, job: SyncJob) -> AppResult<SyncJob> {
        write(&self.sync_jobs)?.insert(job.id, job.clone());
        Ok(job)
    }

    async fn get_sync_job(&self, id: Uuid) -> AppResult<Option<SyncJob>> {
        Ok(read(&self.sync_jobs)?.get(&id).cloned())
    }

    async fn list_sync_jobs(&self, source_id: Uuid) -> AppResult<Vec<SyncJob>> {
        let mut jobs: Vec<SyncJob> = read(&self.sync_jobs)?
            .values()
            .filter(|j| j.source_id == source_id)
            .cloned()
            .collect();
        jobs.sort_by_key(|j| j.started_at);
        Ok(jobs)
    }

    async fn update_sync_job_status(&self, id: Uuid, status: SyncStatus, error: Option<String>) -> AppResult<()> {
        let mut jobs = write(&self.sync_jobs)?;
        let job = jobs
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Sync job {} not found", id)))?;

        job.status = status;
        job.error = error;
        if matches!(status, SyncStatus::Completed | SyncStatus::Failed) {
            job.completed_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn record_sync_job_batch(&self, id: Uuid, documents: usize) -> AppResult<()> {
        let mut jobs = write(&self.sync_jobs)?;
        let job = jobs
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Sync job {} not found", id)))?;

        job.batches_indexed += 1;
        job.documents_indexed += documents;
        Ok(())
    }
}
