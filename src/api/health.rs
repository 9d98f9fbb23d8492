use actix_web::{web, HttpResponse};
use serde::Serialize;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[derive(Serialize)]
struct StatusResponse {
    service: &'static str,
    version: &'static str,
    status: &'static str,
    uptime_seconds: u64,
    contentful_api_url: String,
    contentful_locale: String,
}

/// GET /health
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse { status: "ok" })
}

/// GET /status
pub async fn status(app_state: web::Data<crate::AppState>) -> HttpResponse {
    HttpResponse::Ok().json(StatusResponse {
        service: "contentful-connector",
        version: env!("CARGO_PKG_VERSION"),
        status: "running",
        uptime_seconds: app_state.started_at.elapsed().as_secs(),
        contentful_api_url: app_state.config.contentful_api_url.clone(),
        contentful_locale: app_state.config.contentful_locale.clone(),
    })
}
