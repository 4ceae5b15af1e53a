//! HTTP surface for lifeline.
//!
//! This module wires the network capability adapter and the document store
//! gateway into an axum router. Every endpoint is stateless: one request
//! in, one response out. The shared handles in [`AppState`] are built once
//! at startup and injected, so tests can substitute fakes.

mod handlers;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tracing::info;

use crate::config::ConfigPresence;
use crate::error::{Error, Result};
use crate::network::NetworkAdapter;
use crate::store::DocumentStore;

/// Shared handles available to every request handler.
///
/// Cheap to clone; constructed once in `main` and handed to the router.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Adapter over the network capability provider.
    pub network: NetworkAdapter,
    /// Gateway to the document store.
    pub store: Arc<dyn DocumentStore>,
    /// Device queried when a request names no phone number.
    pub default_device: String,
    /// Name of the store database, reported by `/debug`.
    pub database: String,
    /// Configuration presence booleans, reported by `/debug`.
    pub presence: ConfigPresence,
}

/// How a failed request is reported to the client.
///
/// The body is always `{"detail": <message>}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No record matched the request.
    #[error("{0}")]
    NotFound(String),

    /// The upstream capability provider failed.
    #[error("{0}")]
    BadGateway(String),

    /// A store or internal failure.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// The HTTP status this error maps to.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadGateway(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({ "detail": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        if err.is_provider_error() {
            Self::BadGateway(err.to_string())
        } else {
            Self::Internal(err.to_string())
        }
    }
}

/// Build the application router over the given state.
#[must_use]
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::home))
        .route("/device_location", get(handlers::device_location))
        .route("/device_status", get(handlers::device_status))
        .route("/emergency_detected", post(handlers::emergency_detected))
        .route("/medical_record", post(handlers::medical_record))
        .route("/status", get(handlers::status_by_call_id))
        .route("/debug", get(handlers::debug))
        .with_state(state)
}

/// Bind the listener and serve requests until shutdown.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve(addr: &str, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on {addr}");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_status_codes() {
        assert_eq!(
            ApiError::NotFound("x".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::BadGateway("x".to_string()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::Internal("x".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_api_error_response_has_detail_body() {
        let response = ApiError::NotFound("No records found for this call_id".to_string())
            .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_provider_error_maps_to_bad_gateway() {
        let err = Error::provider_status("location", 500, "boom");
        let api_err = ApiError::from(err);
        assert_eq!(api_err.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_other_errors_map_to_internal() {
        let err = Error::validation("bad config");
        let api_err = ApiError::from(err);
        assert_eq!(api_err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
