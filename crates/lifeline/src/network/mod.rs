//! Network capability adapter.
//!
//! This module isolates all interaction with the external telecom capability
//! provider behind three operations: device location, device status with a
//! roaming fallback, and batch creation of Quality-on-Demand sessions across
//! three quality tiers with per-tier error isolation.

pub mod provider;

use std::sync::Arc;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use tracing::{debug, info, warn};

pub use provider::{
    ConnectivityReport, DeviceId, Location, NacClient, NetworkProvider, RoamingReport,
    SessionHandle, SessionRequest,
};

use crate::error::Result;

/// How stale a cached location fix may be, in seconds.
pub const LOCATION_MAX_AGE_SECS: u64 = 3600;

/// Duration of each created QoD session, in seconds.
pub const SESSION_DURATION_SECS: u64 = 3600;

/// Quality tiers a QoD session can be requested at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QosTier {
    /// Larger latency tolerance, lower bandwidth.
    Low,
    /// Medium quality.
    Medium,
    /// Low latency, high bandwidth.
    High,
}

impl QosTier {
    /// All tiers, in presentation order.
    pub const ALL: [Self; 3] = [Self::Low, Self::Medium, Self::High];

    /// The provider-defined profile identifier for this tier.
    #[must_use]
    pub fn profile(self) -> &'static str {
        match self {
            Self::Low => "QOS_L",
            Self::Medium => "QOS_M",
            Self::High => "QOS_E",
        }
    }
}

impl std::fmt::Display for QosTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// How a device status query resolved.
///
/// Status is best-effort: the primary connectivity query falls back to the
/// roaming query, and when both fail the outcome degrades to
/// [`StatusOutcome::Unavailable`] instead of an error. Serializes as the
/// provider-shaped report, or JSON `null` when unavailable.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StatusOutcome {
    /// The primary connectivity query succeeded.
    Connectivity(ConnectivityReport),
    /// The fallback roaming query succeeded.
    Roaming(RoamingReport),
    /// Both queries failed; no status is available.
    Unavailable,
}

impl StatusOutcome {
    /// Whether no status could be obtained.
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable)
    }
}

/// The outcome of one QoD session creation attempt.
///
/// Serializes with an explicit `success` flag:
/// `{"success": true, "profile", "session_id"}` on creation,
/// `{"success": false, "profile", "error"}` on failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The provider created the session.
    Created {
        /// The profile the session was created with.
        profile: &'static str,
        /// Provider-issued session identifier, when exposed.
        session_id: Option<String>,
    },
    /// The provider failed or rejected the creation.
    Failed {
        /// The profile that was requested.
        profile: &'static str,
        /// Why the creation failed.
        error: String,
    },
}

impl SessionOutcome {
    /// Whether the session was created.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        matches!(self, Self::Created { .. })
    }

    /// The profile this outcome was attempted with.
    #[must_use]
    pub fn profile(&self) -> &'static str {
        match self {
            Self::Created { profile, .. } | Self::Failed { profile, .. } => profile,
        }
    }
}

impl Serialize for SessionOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        match self {
            Self::Created {
                profile,
                session_id,
            } => {
                map.serialize_entry("success", &true)?;
                map.serialize_entry("profile", profile)?;
                map.serialize_entry("session_id", session_id)?;
            }
            Self::Failed { profile, error } => {
                map.serialize_entry("success", &false)?;
                map.serialize_entry("profile", profile)?;
                map.serialize_entry("error", error)?;
            }
        }
        map.end()
    }
}

/// One session outcome per quality tier.
///
/// Holding a field per tier guarantees the batch always carries exactly
/// three outcomes, however many attempts failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionBatch {
    /// Outcome of the low tier attempt.
    pub low: SessionOutcome,
    /// Outcome of the medium tier attempt.
    pub medium: SessionOutcome,
    /// Outcome of the high tier attempt.
    pub high: SessionOutcome,
}

impl SessionBatch {
    /// The outcome for the given tier.
    #[must_use]
    pub fn get(&self, tier: QosTier) -> &SessionOutcome {
        match tier {
            QosTier::Low => &self.low,
            QosTier::Medium => &self.medium,
            QosTier::High => &self.high,
        }
    }

    /// How many tiers were created successfully.
    #[must_use]
    pub fn created_count(&self) -> usize {
        QosTier::ALL
            .iter()
            .filter(|tier| self.get(**tier).succeeded())
            .count()
    }
}

/// Where the provider should deliver QoD session notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationTarget {
    /// Callback URL.
    pub url: String,
    /// Auth token the provider presents on callbacks.
    pub auth_token: String,
}

impl From<&crate::config::ProviderConfig> for NotificationTarget {
    fn from(config: &crate::config::ProviderConfig) -> Self {
        Self {
            url: config.notification_url.clone(),
            auth_token: config.notification_auth_token.clone(),
        }
    }
}

/// Adapter over the network capability provider.
///
/// Cheap to clone; holds the process-wide provider client handle. The
/// provider is injected so request handlers can be exercised against fakes.
#[derive(Debug, Clone)]
pub struct NetworkAdapter {
    provider: Arc<dyn NetworkProvider>,
    notifications: NotificationTarget,
}

impl NetworkAdapter {
    /// Create an adapter over the given provider.
    #[must_use]
    pub fn new(provider: Arc<dyn NetworkProvider>, notifications: NotificationTarget) -> Self {
        Self {
            provider,
            notifications,
        }
    }

    /// Fetch the device's last known location.
    ///
    /// Accepts a cached fix up to [`LOCATION_MAX_AGE_SECS`] old. No retry;
    /// a provider failure propagates to the caller.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider cannot produce a location.
    pub async fn device_location(&self, phone_number: &str) -> Result<Location> {
        let device = DeviceId::new(phone_number);
        self.provider.location(&device, LOCATION_MAX_AGE_SECS).await
    }

    /// Query the device's status, degrading gracefully.
    ///
    /// Tries the connectivity query first; on any failure, tries the
    /// roaming query; if that also fails, returns
    /// [`StatusOutcome::Unavailable`]. Never returns an error.
    pub async fn device_status(&self, phone_number: &str) -> StatusOutcome {
        let device = DeviceId::new(phone_number);

        match self.provider.connectivity(&device).await {
            Ok(report) => StatusOutcome::Connectivity(report),
            Err(primary) => {
                warn!("connectivity check for {device} failed: {primary}");
                match self.provider.roaming(&device).await {
                    Ok(report) => StatusOutcome::Roaming(report),
                    Err(fallback) => {
                        warn!("roaming check for {device} failed: {fallback}");
                        StatusOutcome::Unavailable
                    }
                }
            }
        }
    }

    /// Create one QoD session per quality tier.
    ///
    /// The device handle is resolved once; tiers are attempted in
    /// presentation order low, medium, high. Each tier's outcome is
    /// recorded independently: a failed tier never prevents the remaining
    /// tiers from being attempted.
    pub async fn create_qod_sessions(&self, phone_number: &str, service_ipv4: &str) -> SessionBatch {
        let device = DeviceId::new(phone_number);

        let batch = SessionBatch {
            low: self.create_one(&device, QosTier::Low, service_ipv4).await,
            medium: self.create_one(&device, QosTier::Medium, service_ipv4).await,
            high: self.create_one(&device, QosTier::High, service_ipv4).await,
        };

        info!(
            "created {}/3 QoD sessions for {device}",
            batch.created_count()
        );
        batch
    }

    async fn create_one(
        &self,
        device: &DeviceId,
        tier: QosTier,
        service_ipv4: &str,
    ) -> SessionOutcome {
        let profile = tier.profile();
        debug!("creating {tier} tier QoD session with profile {profile}");

        let request = SessionRequest {
            profile,
            duration_secs: SESSION_DURATION_SECS,
            service_ipv4: service_ipv4.to_string(),
            notification_url: self.notifications.url.clone(),
            notification_auth_token: self.notifications.auth_token.clone(),
        };

        match self.provider.create_session(device, &request).await {
            Ok(handle) => SessionOutcome::Created {
                profile,
                session_id: handle.session_id,
            },
            Err(err) => {
                warn!("{tier} tier QoD session for {device} failed: {err}");
                SessionOutcome::Failed {
                    profile,
                    error: err.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;

    use serde_json::json;

    use crate::error::Error;

    /// A scriptable provider: names of operations/profiles to fail, and a
    /// log of the profiles attempted.
    #[derive(Debug, Default)]
    struct StubProvider {
        fail_connectivity: bool,
        fail_roaming: bool,
        fail_profiles: HashSet<&'static str>,
        attempted_profiles: Mutex<Vec<&'static str>>,
    }

    fn refused(operation: &'static str) -> Error {
        Error::provider_status(operation, 503, "service unavailable")
    }

    #[async_trait::async_trait]
    impl NetworkProvider for StubProvider {
        async fn location(&self, _device: &DeviceId, _max_age_secs: u64) -> Result<Location> {
            Ok(Location {
                latitude: 12.9716,
                longitude: 77.5946,
            })
        }

        async fn connectivity(&self, _device: &DeviceId) -> Result<ConnectivityReport> {
            if self.fail_connectivity {
                return Err(refused("connectivity"));
            }
            Ok(ConnectivityReport {
                connectivity_status: "CONNECTED_DATA".to_string(),
            })
        }

        async fn roaming(&self, _device: &DeviceId) -> Result<RoamingReport> {
            if self.fail_roaming {
                return Err(refused("roaming"));
            }
            Ok(RoamingReport {
                roaming: true,
                country_code: Some(91),
                country_name: Some(vec!["India".to_string()]),
            })
        }

        async fn create_session(
            &self,
            _device: &DeviceId,
            request: &SessionRequest,
        ) -> Result<SessionHandle> {
            self.attempted_profiles.lock().unwrap().push(request.profile);
            if self.fail_profiles.contains(request.profile) {
                return Err(refused("qod_session"));
            }
            Ok(SessionHandle {
                session_id: Some(format!("session-{}", request.profile)),
            })
        }
    }

    fn adapter_with(provider: StubProvider) -> NetworkAdapter {
        NetworkAdapter::new(
            Arc::new(provider),
            NotificationTarget {
                url: "https://example.com/notifications".to_string(),
                auth_token: "your-auth-token".to_string(),
            },
        )
    }

    #[test]
    fn test_tier_profile_mapping() {
        assert_eq!(QosTier::Low.profile(), "QOS_L");
        assert_eq!(QosTier::Medium.profile(), "QOS_M");
        assert_eq!(QosTier::High.profile(), "QOS_E");
    }

    #[test]
    fn test_tier_display() {
        assert_eq!(QosTier::Low.to_string(), "low");
        assert_eq!(QosTier::Medium.to_string(), "medium");
        assert_eq!(QosTier::High.to_string(), "high");
    }

    #[test]
    fn test_tier_presentation_order() {
        assert_eq!(QosTier::ALL, [QosTier::Low, QosTier::Medium, QosTier::High]);
    }

    #[tokio::test]
    async fn test_device_location() {
        let adapter = adapter_with(StubProvider::default());
        let location = adapter.device_location("+15550001").await.unwrap();
        assert!((location.latitude - 12.9716).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_device_status_primary_succeeds() {
        let adapter = adapter_with(StubProvider::default());
        let outcome = adapter.device_status("+15550001").await;
        assert!(matches!(outcome, StatusOutcome::Connectivity(_)));
    }

    #[tokio::test]
    async fn test_device_status_falls_back_to_roaming() {
        let adapter = adapter_with(StubProvider {
            fail_connectivity: true,
            ..StubProvider::default()
        });

        let outcome = adapter.device_status("+15550001").await;
        match outcome {
            StatusOutcome::Roaming(report) => assert!(report.roaming),
            other => panic!("expected roaming outcome, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_device_status_degrades_to_unavailable() {
        let adapter = adapter_with(StubProvider {
            fail_connectivity: true,
            fail_roaming: true,
            ..StubProvider::default()
        });

        let outcome = adapter.device_status("+15550001").await;
        assert!(outcome.is_unavailable());
    }

    #[tokio::test]
    async fn test_device_status_does_not_touch_roaming_when_primary_succeeds() {
        // fail_roaming would error if the fallback were consulted
        let adapter = adapter_with(StubProvider {
            fail_roaming: true,
            ..StubProvider::default()
        });

        let outcome = adapter.device_status("+15550001").await;
        assert!(matches!(outcome, StatusOutcome::Connectivity(_)));
    }

    #[test]
    fn test_status_outcome_serializes_unavailable_as_null() {
        let json = serde_json::to_value(StatusOutcome::Unavailable).unwrap();
        assert!(json.is_null());
    }

    #[test]
    fn test_status_outcome_serializes_reports_verbatim() {
        let outcome = StatusOutcome::Connectivity(ConnectivityReport {
            connectivity_status: "CONNECTED_SMS".to_string(),
        });
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({"connectivityStatus": "CONNECTED_SMS"})
        );

        let outcome = StatusOutcome::Roaming(RoamingReport {
            roaming: false,
            country_code: None,
            country_name: None,
        });
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({"roaming": false})
        );
    }

    #[tokio::test]
    async fn test_qod_all_tiers_succeed() {
        let adapter = adapter_with(StubProvider::default());
        let batch = adapter.create_qod_sessions("+15550001", "5.6.7.8").await;

        assert_eq!(batch.created_count(), 3);
        assert_eq!(
            batch.low,
            SessionOutcome::Created {
                profile: "QOS_L",
                session_id: Some("session-QOS_L".to_string()),
            }
        );
        assert_eq!(batch.high.profile(), "QOS_E");
    }

    #[tokio::test]
    async fn test_qod_low_tier_failure_is_isolated() {
        let adapter = adapter_with(StubProvider {
            fail_profiles: HashSet::from(["QOS_L"]),
            ..StubProvider::default()
        });

        let batch = adapter.create_qod_sessions("+15550001", "5.6.7.8").await;

        match &batch.low {
            SessionOutcome::Failed { profile, error } => {
                assert_eq!(*profile, "QOS_L");
                assert!(!error.is_empty());
            }
            other => panic!("expected low tier to fail, got {other:?}"),
        }
        assert!(batch.medium.succeeded());
        assert_eq!(batch.medium.profile(), "QOS_M");
        assert!(batch.high.succeeded());
        assert_eq!(batch.high.profile(), "QOS_E");
    }

    #[tokio::test]
    async fn test_qod_all_tiers_attempted_even_when_all_fail() {
        let provider = StubProvider {
            fail_profiles: HashSet::from(["QOS_L", "QOS_M", "QOS_E"]),
            ..StubProvider::default()
        };
        let adapter = adapter_with(provider);

        let batch = adapter.create_qod_sessions("+15550001", "5.6.7.8").await;

        assert_eq!(batch.created_count(), 0);
        for tier in QosTier::ALL {
            assert!(!batch.get(tier).succeeded());
        }
    }

    #[tokio::test]
    async fn test_qod_attempts_run_in_presentation_order() {
        let provider = Arc::new(StubProvider {
            fail_profiles: HashSet::from(["QOS_M"]),
            ..StubProvider::default()
        });
        let adapter = NetworkAdapter::new(
            provider.clone(),
            NotificationTarget {
                url: "https://example.com/notifications".to_string(),
                auth_token: "your-auth-token".to_string(),
            },
        );

        adapter.create_qod_sessions("+15550001", "5.6.7.8").await;

        // Every tier was attempted, in order, despite the medium failure
        let attempted = provider.attempted_profiles.lock().unwrap().clone();
        assert_eq!(attempted, vec!["QOS_L", "QOS_M", "QOS_E"]);
    }

    #[test]
    fn test_session_outcome_serializes_success_shape() {
        let outcome = SessionOutcome::Created {
            profile: "QOS_M",
            session_id: Some("s-1".to_string()),
        };
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({"success": true, "profile": "QOS_M", "session_id": "s-1"})
        );
    }

    #[test]
    fn test_session_outcome_serializes_missing_session_id_as_null() {
        let outcome = SessionOutcome::Created {
            profile: "QOS_E",
            session_id: None,
        };
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({"success": true, "profile": "QOS_E", "session_id": null})
        );
    }

    #[test]
    fn test_session_outcome_serializes_failure_shape() {
        let outcome = SessionOutcome::Failed {
            profile: "QOS_L",
            error: "provider returned HTTP 503 for qod_session: service unavailable".to_string(),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["profile"], "QOS_L");
        assert!(json["error"].as_str().unwrap().contains("503"));
        assert!(json.get("session_id").is_none());
    }

    #[test]
    fn test_session_batch_serializes_one_entry_per_tier() {
        let batch = SessionBatch {
            low: SessionOutcome::Failed {
                profile: "QOS_L",
                error: "boom".to_string(),
            },
            medium: SessionOutcome::Created {
                profile: "QOS_M",
                session_id: Some("s-2".to_string()),
            },
            high: SessionOutcome::Created {
                profile: "QOS_E",
                session_id: None,
            },
        };

        let json = serde_json::to_value(&batch).unwrap();
        let object = json.as_object().unwrap();
        assert_eq!(object.len(), 3);
        assert_eq!(json["low"]["success"], false);
        assert_eq!(json["medium"]["profile"], "QOS_M");
        assert_eq!(json["high"]["session_id"], serde_json::Value::Null);
    }

    #[test]
    fn test_notification_target_from_provider_config() {
        let config = crate::config::ProviderConfig::default();
        let target = NotificationTarget::from(&config);
        assert_eq!(target.url, config.notification_url);
        assert_eq!(target.auth_token, config.notification_auth_token);
    }
}
