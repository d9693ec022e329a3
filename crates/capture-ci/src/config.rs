use capture_canonical::DigestAlg;
use serde::{Deserialize, Serialize};

use crate::errors::CiError;

/// How event timestamps are checked before they feed the timestamp bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampPolicy {
    /// Compare timestamp strings as-is. The caller guarantees lexical order
    /// equals chronological order.
    #[default]
    Lexical,
    /// Reject any timestamp that is not UTC RFC 3339 with a `Z` suffix.
    Rfc3339Utc,
}

/// Engine configuration.
///
/// Every field has a default, so `{}` is a valid configuration document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Algorithm for per-event content hashes and the aggregate.
    pub digest_alg: DigestAlg,
    /// Timestamp validation applied to every event.
    pub timestamp_policy: TimestampPolicy,
}

impl EngineConfig {
    /// Parses a configuration from JSON.
    ///
    /// ```rust
    /// use capture_ci::{EngineConfig, TimestampPolicy};
    ///
    /// let config = EngineConfig::from_json_str(r#"{"timestamp_policy": "rfc3339_utc"}"#)?;
    /// assert_eq!(config.timestamp_policy, TimestampPolicy::Rfc3339Utc);
    /// # Ok::<(), capture_ci::CiError>(())
    /// ```
    pub fn from_json_str(raw: &str) -> Result<Self, CiError> {
        serde_json::from_str(raw).map_err(|e| CiError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let config = EngineConfig::from_json_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.digest_alg, DigestAlg::Sha256);
        assert_eq!(config.timestamp_policy, TimestampPolicy::Lexical);
    }

    #[test]
    fn unknown_algorithm_is_a_config_error() {
        let err = EngineConfig::from_json_str(r#"{"digest_alg": "md5"}"#).unwrap_err();
        assert!(matches!(err, CiError::Config(_)));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = EngineConfig::from_json_str(r#"{"digest": "sha256"}"#).unwrap_err();
        assert!(matches!(err, CiError::Config(_)));
    }
}
