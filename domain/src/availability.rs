//! On-device model availability.
//!
//! Produced once per initialization attempt by the backend adapter and
//! consumed by the session manager to decide whether a session may be
//! created at all.

use serde::{Deserialize, Serialize};

/// Whether the underlying language model backend is usable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelAvailability {
    /// The model can serve requests.
    Available,
    /// The model cannot serve requests, with a classified reason.
    Unavailable(UnavailableReason),
}

impl ModelAvailability {
    pub fn is_available(&self) -> bool {
        matches!(self, ModelAvailability::Available)
    }
}

/// Classified reason the model backend is unavailable.
///
/// Every cause the backend reports maps into one of these buckets;
/// anything unrecognized lands in `Other` with the backend's raw
/// message preserved verbatim for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnavailableReason {
    /// The device does not meet the model's requirements.
    DeviceNotEligible,
    /// The model feature exists but is not enabled on this device.
    FeatureNotEnabled,
    /// The model is installed but not yet ready (e.g., still downloading).
    ModelNotReady,
    /// Any other cause, raw backend detail preserved.
    Other(String),
}

impl UnavailableReason {
    /// Classify a raw reason token reported by a backend.
    ///
    /// Recognized tokens map to the named buckets; anything else becomes
    /// `Other` carrying the original string unchanged.
    pub fn classify(raw: &str) -> Self {
        match raw {
            "device_not_eligible" => UnavailableReason::DeviceNotEligible,
            "feature_not_enabled" => UnavailableReason::FeatureNotEnabled,
            "model_not_ready" => UnavailableReason::ModelNotReady,
            other => UnavailableReason::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnavailableReason::DeviceNotEligible => write!(f, "device not eligible"),
            UnavailableReason::FeatureNotEnabled => write!(f, "model feature not enabled"),
            UnavailableReason::ModelNotReady => write!(f, "model not ready"),
            UnavailableReason::Other(detail) => write!(f, "model unavailable: {}", detail),
        }
    }
}
