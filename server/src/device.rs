use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use sigchain_core::{Algorithm, DeviceError, DeviceService, SignatureDevice};

use crate::api::{ApiError, ApiResponse};

#[derive(Deserialize)]
pub struct CreateSignatureDeviceRequest {
    pub algorithm: String,
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Serialize)]
pub struct CreateSignatureDeviceResponse {
    pub id: String,
}

/// A device's details in the get and list responses.
#[derive(Serialize)]
pub struct DeviceResponse {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub algorithm: Algorithm,
    pub signature_counter: u64,
}

impl From<&Arc<SignatureDevice>> for DeviceResponse {
    fn from(device: &Arc<SignatureDevice>) -> Self {
        Self {
            id: device.id().to_string(),
            label: device.label().map(str::to_string),
            algorithm: device.algorithm(),
            signature_counter: device.signature_counter(),
        }
    }
}

#[derive(Serialize)]
pub struct ListDevicesResponse {
    pub devices: Vec<DeviceResponse>,
}

/// POST /api/v0/devices — create a new signature device.
pub async fn create_signature_device(
    State(service): State<Arc<DeviceService>>,
    Json(req): Json<CreateSignatureDeviceRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CreateSignatureDeviceResponse>>), ApiError> {
    let device = service.create_device(&req.algorithm, req.label)?;
    tracing::info!(device_id = %device.id(), algorithm = %device.algorithm(), "created signature device");

    let response = CreateSignatureDeviceResponse { id: device.id().to_string() };
    Ok((StatusCode::CREATED, Json(ApiResponse { data: response })))
}

/// GET /api/v0/devices/list — list all devices.
pub async fn list_devices(
    State(service): State<Arc<DeviceService>>,
) -> Result<Json<ApiResponse<ListDevicesResponse>>, ApiError> {
    let devices = service.list_devices()?;
    let devices = devices.iter().map(DeviceResponse::from).collect();
    Ok(Json(ApiResponse { data: ListDevicesResponse { devices } }))
}

/// GET /api/v0/devices/:device_id — fetch one device.
pub async fn get_device_by_id(
    State(service): State<Arc<DeviceService>>,
    Path(device_id): Path<String>,
) -> Result<Json<ApiResponse<DeviceResponse>>, ApiError> {
    let device = service
        .get_device(&device_id)
        .ok_or_else(|| ApiError::from(DeviceError::DeviceNotFound(device_id.clone())))?;
    Ok(Json(ApiResponse { data: DeviceResponse::from(&device) }))
}
