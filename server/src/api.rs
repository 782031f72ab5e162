use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::json;

use sigchain_core::{DeviceError, DeviceService, ErrorClass};

/// Generic success container: every payload is wrapped as `{"data": ...}`.
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
}

/// Error surfaced to clients as `{"errors": [...]}` with the status code
/// derived from the core error class.
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl From<DeviceError> for ApiError {
    fn from(err: DeviceError) -> Self {
        let status = match err.class() {
            ErrorClass::BadRequest => StatusCode::BAD_REQUEST,
            ErrorClass::NotFound => StatusCode::NOT_FOUND,
            ErrorClass::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self { status, message: err.to_string() }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, "request failed: {}", self.message);
        }
        (self.status, Json(json!({ "errors": [self.message] }))).into_response()
    }
}

/// Register all routes and attach the shared device service.
pub fn router(service: Arc<DeviceService>) -> Router {
    Router::new()
        .route("/api/v0/health", get(health))
        .route("/api/v0/devices", post(crate::device::create_signature_device))
        .route("/api/v0/devices/list", get(crate::device::list_devices))
        .route("/api/v0/devices/:device_id", get(crate::device::get_device_by_id))
        .route(
            "/api/v0/transactions/:device_id/sign",
            post(crate::transaction::sign_transaction),
        )
        .with_state(service)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse { data: HealthResponse { status: "pass", version: "v0" } })
}
