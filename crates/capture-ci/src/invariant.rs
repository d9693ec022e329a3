use capture_canonical::Digest;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::CiError;
use crate::verification::Mismatch;

/// Completeness invariant over an ordered, non-empty event sequence.
///
/// Serializes to a JSON object with exactly these six fields; `hash_sum` is
/// written as `"sha256:<64 lowercase hex>"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompletenessInvariant {
    /// Number of events covered.
    pub expected_count: u64,
    /// XOR of every event's content hash.
    pub hash_sum: Digest,
    /// Lexically smallest event timestamp.
    pub first_timestamp: String,
    /// Lexically largest event timestamp.
    pub last_timestamp: String,
    /// `event_id` of the event at the first position.
    pub first_event_id: String,
    /// `event_id` of the event at the last position.
    pub last_event_id: String,
}

impl CompletenessInvariant {
    /// Parses a claimed invariant from a JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`CiError::MalformedRecord`] if a field is missing or mistyped,
    /// an unknown field is present, or `hash_sum` has an unknown tag or bad
    /// hex digits.
    pub fn from_value(value: &Value) -> Result<Self, CiError> {
        Self::deserialize(value).map_err(|e| CiError::MalformedRecord(e.to_string()))
    }

    /// Parses a claimed invariant from JSON text.
    pub fn from_json_str(raw: &str) -> Result<Self, CiError> {
        serde_json::from_str(raw).map_err(|e| CiError::MalformedRecord(e.to_string()))
    }

    /// Compares `self` (claimed) against a freshly computed invariant.
    ///
    /// Fields are checked in order: count, hash sum, first/last timestamp,
    /// first/last event id. Only the first difference is reported.
    pub fn first_mismatch(&self, actual: &CompletenessInvariant) -> Option<Mismatch> {
        if self.expected_count != actual.expected_count {
            return Some(Mismatch::Count {
                expected: self.expected_count,
                actual: actual.expected_count,
            });
        }
        if self.hash_sum != actual.hash_sum {
            return Some(Mismatch::HashSum {
                expected: self.hash_sum,
                actual: actual.hash_sum,
            });
        }
        if self.first_timestamp != actual.first_timestamp {
            return Some(Mismatch::FirstTimestamp {
                expected: self.first_timestamp.clone(),
                actual: actual.first_timestamp.clone(),
            });
        }
        if self.last_timestamp != actual.last_timestamp {
            return Some(Mismatch::LastTimestamp {
                expected: self.last_timestamp.clone(),
                actual: actual.last_timestamp.clone(),
            });
        }
        if self.first_event_id != actual.first_event_id {
            return Some(Mismatch::FirstEventId {
                expected: self.first_event_id.clone(),
                actual: actual.first_event_id.clone(),
            });
        }
        if self.last_event_id != actual.last_event_id {
            return Some(Mismatch::LastEventId {
                expected: self.last_event_id.clone(),
                actual: actual.last_event_id.clone(),
            });
        }
        None
    }
}
