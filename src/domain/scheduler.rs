use crate::domain::models::SyncJob;
use crate::domain::sync::SyncOrchestrator;
use crate::error::AppResult;
use crate::storage::Storage;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Periodically starts full reloads of sources whose refresh interval has elapsed.
pub struct SyncScheduler {
    storage: Arc<dyn Storage>,
    orchestrator: Arc<SyncOrchestrator>,
    tick: Duration,
}

impl SyncScheduler {
    pub fn new(storage: Arc<dyn Storage>, orchestrator: Arc<SyncOrchestrator>, tick: Duration) -> Self {
        Self {
            storage,
            orchestrator,
            tick,
        }
    }

    /// Start a sync for every enabled, idle source that is due at `now`.
    ///
    /// A source that fails to start is logged and skipped.
    pub async fn run_once(&self, now: DateTime<Utc>) -> AppResult<Vec<SyncJob>> {
        let mut started = Vec::new();

        for source in self.storage.list_sources().await? {
            if !source.is_due(now) {
                continue;
            }

            let source_id = source.id;
            match self.orchestrator.start_sync(source).await {
                Ok(job) => {
                    info!("Scheduled sync for source {} (job {})", source_id, job.id);
                    started.push(job);
                }
                Err(e) => warn!("Failed to schedule sync for source {}: {}", source_id, e),
            }
        }

        Ok(started)
    }

    /// Run `run_once` on every tick until the returned task is aborted.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.tick);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                interval.tick().await;
                match self.run_once(Utc::now()).await {
                    Ok(jobs) => debug!("Scheduler tick started {} sync(s)", jobs.len()),
                    Err(e) => warn!("Scheduler tick failed: {}", e),
                }
            }
        })
    }
}
