use std::time::Duration;

/// Deployment-specific validation settings
///
/// The issuer, algorithm and key set location are fixed by the proxy and are
/// not part of this configuration.
///
/// Deserializable so it can be embedded in a service's own config file:
///
/// ```rust
/// # use std::time::Duration;
/// # use iaptoken::validation::ValidationConfig;
/// let config: ValidationConfig = serde_json::from_str(
///     r#"{"audience": "/projects/42/global/backendServices/7", "allowed_drift_secs": 30}"#,
/// )
/// .unwrap();
/// assert_eq!(config.allowed_drift(), Duration::from_secs(30));
/// assert_eq!(config.max_size(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ValidationConfig {
    audience: String,
    #[serde(default, rename = "allowed_drift_secs", with = "drift_secs")]
    allowed_drift: Duration,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_size: Option<usize>,
}

impl ValidationConfig {
    /// Expects `audience`, with no drift allowance and no size limit
    pub fn new(audience: impl Into<String>) -> Self {
        Self {
            audience: audience.into(),
            allowed_drift: Duration::ZERO,
            max_size: None,
        }
    }

    /// Tolerates up to `allowed_drift` of clock disagreement on `exp` and `iat`
    #[must_use]
    pub const fn with_allowed_drift(mut self, allowed_drift: Duration) -> Self {
        self.allowed_drift = allowed_drift;
        self
    }

    /// Rejects tokens longer than `max_size` bytes before decoding them
    #[must_use]
    pub const fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = Some(max_size);
        self
    }

    #[must_use]
    pub fn audience(&self) -> &str {
        &self.audience
    }

    #[must_use]
    pub const fn allowed_drift(&self) -> Duration {
        self.allowed_drift
    }

    /// Allowed drift in whole seconds, saturating at [`i64::MAX`]
    #[must_use]
    pub fn allowed_drift_secs(&self) -> i64 {
        i64::try_from(self.allowed_drift.as_secs()).unwrap_or(i64::MAX)
    }

    #[must_use]
    pub const fn max_size(&self) -> Option<usize> {
        self.max_size
    }

    pub(crate) fn set_audience(&mut self, audience: String) {
        self.audience = audience;
    }

    pub(crate) const fn set_allowed_drift(&mut self, allowed_drift: Duration) {
        self.allowed_drift = allowed_drift;
    }
}

mod drift_secs {
    use std::time::Duration;

    use serde::{
        Deserialize,
        Deserializer,
        Serializer,
    };

    pub fn serialize<S: Serializer>(drift: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(drift.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::ValidationConfig;

    #[test]
    fn defaults() {
        let config = ValidationConfig::new("aud");
        assert_eq!(config.audience(), "aud");
        assert_eq!(config.allowed_drift(), Duration::ZERO);
        assert_eq!(config.allowed_drift_secs(), 0);
        assert_eq!(config.max_size(), None);
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: ValidationConfig = serde_json::from_value(json!({"audience": "aud"})).unwrap();
        assert_eq!(config, ValidationConfig::new("aud"));

        let config: ValidationConfig = serde_json::from_value(json!({
            "audience": "aud",
            "allowed_drift_secs": 120,
            "max_size": 4096,
        }))
        .unwrap();
        assert_eq!(
            config,
            ValidationConfig::new("aud")
                .with_allowed_drift(Duration::from_secs(120))
                .with_max_size(4096)
        );
    }

    #[test]
    fn audience_is_required() {
        serde_json::from_value::<ValidationConfig>(json!({"allowed_drift_secs": 1})).unwrap_err();
    }

    #[test]
    fn serializes_drift_as_seconds() {
        let config = ValidationConfig::new("aud").with_allowed_drift(Duration::from_millis(90_500));
        assert_eq!(
            serde_json::to_value(&config).unwrap(),
            json!({"audience": "aud", "allowed_drift_secs": 90})
        );
    }

    #[test]
    fn huge_drift_saturates() {
        let config = ValidationConfig::new("aud").with_allowed_drift(Duration::MAX);
        assert_eq!(config.allowed_drift_secs(), i64::MAX);
    }
}
