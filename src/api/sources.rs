use crate::api::response::{accepted_response, created_response, success_response};
use crate::domain::models::{
    ContentfulConfig, Credentials, DataSource, Document, DocumentSource, CONTENTFUL_CMA_TOKEN,
    DEFAULT_REFRESH_FREQ_SECS,
};
use crate::error::{AppError, AppResult};
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

const DEFAULT_PREVIEW_LIMIT: usize = 5;
const MAX_PREVIEW_LIMIT: usize = 50;

/// Request format for POST /api/sources
#[derive(Debug, Deserialize)]
pub struct CreateSourceRequest {
    #[serde(default)]
    pub name: Option<String>,
    pub config: serde_json::Value,
    #[serde(default)]
    pub credentials: Credentials,
    /// Seconds between scheduled reloads; `null` turns scheduling off.
    #[serde(default = "default_refresh_freq")]
    pub refresh_freq_secs: Option<u64>,
    #[serde(default)]
    pub disabled: bool,
}

fn default_refresh_freq() -> Option<u64> {
    Some(DEFAULT_REFRESH_FREQ_SECS)
}

#[derive(Debug, Deserialize)]
pub struct PreviewQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct PreviewData {
    pub count: usize,
    pub documents: Vec<Document>,
}

async fn load_source(app_state: &crate::AppState, id: Uuid) -> AppResult<DataSource> {
    app_state
        .storage
        .get_source(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Data source {} not found", id)))
}

/// Register a Contentful space/environment.
/// POST /api/sources
pub async fn create_source(
    app_state: web::Data<crate::AppState>,
    body: web::Json<CreateSourceRequest>,
) -> AppResult<HttpResponse> {
    let body = body.into_inner();

    let config = ContentfulConfig::from_config(&body.config).ok_or_else(|| {
        AppError::Validation("config requires non-empty 'space' and 'environment'".to_string())
    })?;

    let has_token = body
        .credentials
        .get(CONTENTFUL_CMA_TOKEN)
        .and_then(|v| v.as_str())
        .map_or(false, |t| !t.trim().is_empty());
    if !has_token {
        return Err(AppError::Validation(format!(
            "credentials require '{}'",
            CONTENTFUL_CMA_TOKEN
        )));
    }

    if body.refresh_freq_secs == Some(0) {
        return Err(AppError::Validation(
            "refresh_freq_secs must be positive or null".to_string(),
        ));
    }

    let name = body
        .name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| format!("ContentfulConnector-{}/{}", config.space, config.environment));

    let mut source = DataSource::new(name, DocumentSource::Contentful, body.config, body.credentials);
    source.refresh_freq_secs = body.refresh_freq_secs;
    source.disabled = body.disabled;
    let source = app_state.storage.save_source(source).await?;

    info!("Created data source {} for {}/{}", source.id, config.space, config.environment);
    Ok(created_response(source))
}

/// GET /api/sources
pub async fn list_sources(app_state: web::Data<crate::AppState>) -> AppResult<HttpResponse> {
    let sources = app_state.storage.list_sources().await?;
    Ok(success_response(sources))
}

/// GET /api/sources/{id}
pub async fn get_source(
    app_state: web::Data<crate::AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let source = load_source(&app_state, path.into_inner()).await?;
    Ok(success_response(source))
}

/// DELETE /api/sources/{id}
pub async fn delete_source(
    app_state: web::Data<crate::AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    if !app_state.storage.delete_source(id).await? {
        return Err(AppError::NotFound(format!("Data source {} not found", id)));
    }

    info!("Deleted data source {}", id);
    Ok(success_response(serde_json::json!({ "id": id, "deleted": true })))
}

/// Start a background sync of a data source.
/// POST /api/sources/{id}/sync
pub async fn sync_source(
    app_state: web::Data<crate::AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let source = load_source(&app_state, path.into_inner()).await?;
    let job = app_state.orchestrator.start_sync(source).await?;

    Ok(accepted_response(job))
}

/// Run the connector and return the first documents without indexing them.
/// POST /api/sources/{id}/preview?limit=n
pub async fn preview_source(
    app_state: web::Data<crate::AppState>,
    path: web::Path<Uuid>,
    query: web::Query<PreviewQuery>,
) -> AppResult<HttpResponse> {
    let source = load_source(&app_state, path.into_inner()).await?;
    let limit = match query.limit {
        Some(0) => return Err(AppError::BadRequest("limit must be at least 1".to_string())),
        Some(limit) => limit.min(MAX_PREVIEW_LIMIT),
        None => DEFAULT_PREVIEW_LIMIT,
    };

    let documents = app_state.orchestrator.preview(&source, limit).await?;

    Ok(success_response(PreviewData {
        count: documents.len(),
        documents,
    }))
}
