//! HTTP request handlers.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use super::{ApiError, AppState};
use crate::error::Error;
use crate::records::{EmergencyRecord, MedicalRecord};
use crate::store::{EMERGENCY_COLLECTION, MEDICAL_RECORD_COLLECTION};

/// Sentinel returned when a call has no emergency record.
const NO_EMERGENCY_DATA: &str = "No emergency data";

/// Sentinel returned when a call has no medical record.
const NO_MEDICAL_RECORD_DATA: &str = "No medical record data";

/// Query parameters for the device endpoints.
#[derive(Debug, Deserialize)]
pub struct DeviceQuery {
    /// Phone number of the device to query; the configured default
    /// device when absent.
    pub phone_number: Option<String>,
}

/// Query parameters for the combined status endpoint.
#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    /// Unique call ID.
    pub call_id: String,
}

/// `GET /`: service banner.
pub async fn home() -> Json<Value> {
    Json(json!({
        "message": "Welcome to the lifeline emergency and medical record API",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// `GET /device_location`: last known device location.
pub async fn device_location(
    State(state): State<AppState>,
    Query(query): Query<DeviceQuery>,
) -> Result<Json<Value>, ApiError> {
    let phone_number = query.phone_number.as_deref().unwrap_or(&state.default_device);
    let location = state.network.device_location(phone_number).await?;

    Ok(Json(json!({
        "longitude": location.longitude,
        "latitude": location.latitude,
    })))
}

/// `GET /device_status`: best-effort device status.
///
/// Always responds 200: when neither connectivity nor roaming could be
/// queried, `status` is `null`.
pub async fn device_status(
    State(state): State<AppState>,
    Query(query): Query<DeviceQuery>,
) -> Json<Value> {
    let phone_number = query.phone_number.as_deref().unwrap_or(&state.default_device);
    let outcome = state.network.device_status(phone_number).await;

    Json(json!({ "status": outcome }))
}

/// `POST /emergency_detected`: persist an emergency record.
pub async fn emergency_detected(
    State(state): State<AppState>,
    Json(payload): Json<EmergencyRecord>,
) -> Result<Json<Value>, ApiError> {
    let document = mongodb::bson::to_document(&payload).map_err(Error::from)?;
    let id = state.store.insert(EMERGENCY_COLLECTION, document).await?;
    info!("stored emergency record for call {}", payload.call_id);

    Ok(Json(json!({
        "message": "Emergency record stored successfully",
        "call_id": payload.call_id,
        "id": id,
    })))
}

/// `POST /medical_record`: persist a medical record.
pub async fn medical_record(
    State(state): State<AppState>,
    Json(payload): Json<MedicalRecord>,
) -> Result<Json<Value>, ApiError> {
    let document = mongodb::bson::to_document(&payload).map_err(Error::from)?;
    let id = state
        .store
        .insert(MEDICAL_RECORD_COLLECTION, document)
        .await?;
    info!("stored medical record for call {}", payload.call_id);

    Ok(Json(json!({
        "message": "Medical record stored successfully",
        "call_id": payload.call_id,
        "id": id,
    })))
}

/// `GET /status`: both records for a call.
///
/// 404 when neither collection has a match; a missing side is reported
/// with a sentinel string instead.
pub async fn status_by_call_id(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<Value>, ApiError> {
    let emergency = state
        .store
        .find_by_call_id(EMERGENCY_COLLECTION, &query.call_id)
        .await?;
    let medical = state
        .store
        .find_by_call_id(MEDICAL_RECORD_COLLECTION, &query.call_id)
        .await?;

    if emergency.is_none() && medical.is_none() {
        return Err(ApiError::NotFound(
            "No records found for this call_id".to_string(),
        ));
    }

    let emergency_details = match emergency {
        Some(document) => serde_json::to_value(document).map_err(Error::from)?,
        None => Value::String(NO_EMERGENCY_DATA.to_string()),
    };
    let medical_record_details = match medical {
        Some(document) => serde_json::to_value(document).map_err(Error::from)?,
        None => Value::String(NO_MEDICAL_RECORD_DATA.to_string()),
    };

    Ok(Json(json!({
        "call_id": query.call_id,
        "emergency_details": emergency_details,
        "medical_record_details": medical_record_details,
    })))
}

/// `GET /debug`: store reachability and configuration presence.
///
/// Only presence booleans leave the process, never credential values.
pub async fn debug(State(state): State<AppState>) -> Json<Value> {
    let connected = state.store.ping().await;

    Json(json!({
        "store_connected": connected,
        "database": state.database,
        "env_vars_set": state.presence,
    }))
}
