use crate::api::response::success_response;
use crate::error::{AppError, AppResult};
use actix_web::{web, HttpResponse};
use uuid::Uuid;

/// Get a sync job.
/// GET /api/jobs/{id}
pub async fn get_job(
    app_state: web::Data<crate::AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let job_id = path.into_inner();
    let job = app_state
        .storage
        .get_sync_job(job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Sync job {} not found", job_id)))?;

    Ok(success_response(job))
}

/// Sync history of a data source, oldest first.
/// GET /api/sources/{id}/jobs
pub async fn list_source_jobs(
    app_state: web::Data<crate::AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let source_id = path.into_inner();
    if app_state.storage.get_source(source_id).await?.is_none() {
        return Err(AppError::NotFound(format!("Data source {} not found", source_id)));
    }

    let jobs = app_state.storage.list_sync_jobs(source_id).await?;
    Ok(success_response(jobs))
}
