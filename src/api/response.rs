use actix_web::HttpResponse;
use serde::Serialize;

/// Standardized API response envelope.
///
/// ```json
/// { "success": true, "data": { "id": "...", "name": "..." } }
/// ```
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// 200 OK with the standard envelope.
pub fn success_response<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::success(data))
}

/// 201 Created with the standard envelope.
pub fn created_response<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Created().json(ApiResponse::success(data))
}

/// 202 Accepted with the standard envelope.
pub fn accepted_response<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Accepted().json(ApiResponse::success(data))
}
