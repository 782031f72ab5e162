use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use sigchain_core::DeviceService;

use crate::api::{ApiError, ApiResponse};

#[derive(Deserialize)]
pub struct SignTransactionRequest {
    pub data: String,
}

#[derive(Serialize)]
pub struct SignTransactionResponse {
    /// The exact envelope string that was signed.
    pub signed_data: String,
    /// Base64 of the raw signature bytes.
    pub signature: String,
}

/// POST /api/v0/transactions/:device_id/sign — sign data with a device.
pub async fn sign_transaction(
    State(service): State<Arc<DeviceService>>,
    Path(device_id): Path<String>,
    Json(req): Json<SignTransactionRequest>,
) -> Result<Json<ApiResponse<SignTransactionResponse>>, ApiError> {
    let (signed_data, signature) = service.sign_transaction(&device_id, &req.data)?;
    tracing::info!(device_id = %device_id, "signed transaction");

    Ok(Json(ApiResponse { data: SignTransactionResponse { signed_data, signature } }))
}
