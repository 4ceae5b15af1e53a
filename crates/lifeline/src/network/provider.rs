//! The seam to the external network capability provider.
//!
//! [`NetworkProvider`] is the only place the rest of the crate touches the
//! telecom API; [`NacClient`] is the production implementation, speaking a
//! CAMARA-style REST surface over reqwest. Tests substitute their own
//! implementations of the trait.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{Error, Result};

/// A device handle, keyed by phone number.
///
/// Resolved once per adapter operation and passed to every provider call
/// made on its behalf.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceId(String);

impl DeviceId {
    /// Create a device handle for the given phone number.
    #[must_use]
    pub fn new(phone_number: impl Into<String>) -> Self {
        Self(phone_number.into())
    }

    /// The phone number identifying this device.
    #[must_use]
    pub fn phone_number(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DeviceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A geographic fix for a device.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

/// The provider's view of a device's connectivity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectivityReport {
    /// Provider-defined connectivity state, e.g. `CONNECTED_DATA`.
    pub connectivity_status: String,
}

/// The provider's view of a device's roaming state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoamingReport {
    /// Whether the device is roaming.
    pub roaming: bool,
    /// Mobile country code of the serving network, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_code: Option<i64>,
    /// Country names matching the country code, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_name: Option<Vec<String>>,
}

/// Parameters for one QoD session creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRequest {
    /// Provider-defined quality profile identifier.
    pub profile: &'static str,
    /// Session duration in seconds.
    pub duration_secs: u64,
    /// IPv4 address of the application server the session targets.
    pub service_ipv4: String,
    /// Callback URL for session lifecycle notifications.
    pub notification_url: String,
    /// Auth token the provider presents on callbacks.
    pub notification_auth_token: String,
}

/// What the provider returned for a created QoD session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionHandle {
    /// Provider-issued session identifier, when the provider exposes one.
    #[serde(rename = "sessionId")]
    pub session_id: Option<String>,
}

/// Calls against the external network capability provider.
///
/// Implementations do not retry and do not interpret failures; policy
/// (fallbacks, per-tier isolation) lives in the adapter on top.
#[async_trait::async_trait]
pub trait NetworkProvider: Send + Sync + std::fmt::Debug {
    /// Fetch the device's last known location.
    ///
    /// The provider may return a cached fix up to `max_age_secs` old.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider cannot produce a location.
    async fn location(&self, device: &DeviceId, max_age_secs: u64) -> Result<Location>;

    /// Query the device's connectivity state.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider cannot report connectivity.
    async fn connectivity(&self, device: &DeviceId) -> Result<ConnectivityReport>;

    /// Query the device's roaming state.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider cannot report roaming.
    async fn roaming(&self, device: &DeviceId) -> Result<RoamingReport>;

    /// Create one QoD session for the device.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider rejects or fails the creation.
    async fn create_session(
        &self,
        device: &DeviceId,
        request: &SessionRequest,
    ) -> Result<SessionHandle>;
}

/// Wire shape of the provider's location-retrieval response.
#[derive(Debug, Deserialize)]
struct LocationResponse {
    area: LocationArea,
}

#[derive(Debug, Deserialize)]
struct LocationArea {
    center: Location,
}

/// Production [`NetworkProvider`] over the network-as-code REST API.
#[derive(Debug, Clone)]
pub struct NacClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl NacClient {
    /// Create a client against the given API base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            http: reqwest::Client::new(),
            base_url,
            token,
        }
    }

    /// Create a client from the provider configuration section.
    #[must_use]
    pub fn from_config(config: &crate::config::ProviderConfig) -> Self {
        Self::new(config.base_url.clone(), config.token.clone())
    }

    /// The API base URL this client targets.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST a JSON body and decode a JSON response.
    ///
    /// Non-2xx responses become [`Error::ProviderStatus`] carrying the
    /// operation name and the body verbatim.
    async fn post<T>(&self, operation: &'static str, path: &str, body: &serde_json::Value) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let url = format!("{}{path}", self.base_url);
        let mut request = self.http.post(&url).json(body);
        if let Some(token) = &self.token {
            request = request.header("X-RapidAPI-Key", token);
        }

        let response = request
            .send()
            .await
            .map_err(|source| Error::provider_request(operation, source))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::provider_status(operation, status.as_u16(), body));
        }

        response
            .json::<T>()
            .await
            .map_err(|source| Error::provider_request(operation, source))
    }
}

fn device_body(device: &DeviceId) -> serde_json::Value {
    json!({ "phoneNumber": device.phone_number() })
}

#[async_trait::async_trait]
impl NetworkProvider for NacClient {
    async fn location(&self, device: &DeviceId, max_age_secs: u64) -> Result<Location> {
        let body = json!({
            "device": device_body(device),
            "maxAge": max_age_secs,
        });
        let response: LocationResponse = self
            .post("location", "/location-retrieval/v0/retrieve", &body)
            .await?;
        Ok(response.area.center)
    }

    async fn connectivity(&self, device: &DeviceId) -> Result<ConnectivityReport> {
        let body = json!({ "device": device_body(device) });
        self.post("connectivity", "/device-status/v0/connectivity", &body)
            .await
    }

    async fn roaming(&self, device: &DeviceId) -> Result<RoamingReport> {
        let body = json!({ "device": device_body(device) });
        self.post("roaming", "/device-status/v0/roaming", &body).await
    }

    async fn create_session(
        &self,
        device: &DeviceId,
        request: &SessionRequest,
    ) -> Result<SessionHandle> {
        let body = json!({
            "qosProfile": request.profile,
            "device": device_body(device),
            "applicationServer": { "ipv4Address": request.service_ipv4 },
            "duration": request.duration_secs,
            "webhook": {
                "notificationUrl": request.notification_url,
                "notificationAuthToken": request.notification_auth_token,
            },
        });
        self.post("qod_session", "/qod/v0/sessions", &body).await
    }
}
