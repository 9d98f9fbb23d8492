use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// A fetch was attempted before credentials were loaded
    #[error("Missing credentials for {0} connector")]
    MissingCredential(String),
    /// Credentials were supplied but lack a usable token
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),
    /// An entry returned by the content source lacks required system data
    #[error("Malformed entry: {0}")]
    MalformedEntry(String),
    /// Bad request with message
    #[error("Bad Request: {0}")]
    BadRequest(String),
    /// Resource not found
    #[error("Not Found: {0}")]
    NotFound(String),
    /// Internal server error
    #[error("Internal Error: {0}")]
    Internal(String),
    /// External service error
    #[error("External Service Error: {0}")]
    ExternalService(String),
    /// Validation error
    #[error("Validation Error: {0}")]
    Validation(String),
}

impl AppError {
    fn kind(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::MissingCredential(_) => (StatusCode::BAD_REQUEST, "missing_credential"),
            AppError::InvalidCredentials(_) => (StatusCode::BAD_REQUEST, "invalid_credentials"),
            AppError::MalformedEntry(_) => (StatusCode::BAD_GATEWAY, "malformed_entry"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
            AppError::ExternalService(_) => (StatusCode::BAD_GATEWAY, "external_service_error"),
            AppError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_error"),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.kind().0
    }

    fn error_response(&self) -> HttpResponse {
        let (status, error_type) = self.kind();

        HttpResponse::build(status).json(serde_json::json!({
            "error": error_type,
            "message": self.to_string()
        }))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::ExternalService(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(format!("JSON error: {}", err))
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credential_maps_to_bad_request() {
        let err = AppError::MissingCredential("Contentful".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Missing credentials for Contentful connector");
    }

    #[test]
    fn test_upstream_failures_map_to_bad_gateway() {
        assert_eq!(
            AppError::ExternalService("boom".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::MalformedEntry("no sys.id".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
    }
}
