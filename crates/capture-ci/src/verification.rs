use capture_canonical::Digest;
use serde::Serialize;
use std::fmt;

/// The first check that failed while verifying a completeness invariant.
///
/// Variants are listed in check order. `expected` is always the claimed
/// value and `actual` the value recomputed from the candidate events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "check", rename_all = "snake_case")]
pub enum Mismatch {
    /// Event count differs.
    Count {
        /// Claimed `expected_count`.
        expected: u64,
        /// Number of candidate events.
        actual: u64,
    },
    /// XOR aggregate of content hashes differs.
    HashSum {
        /// Claimed `hash_sum`.
        expected: Digest,
        /// Recomputed aggregate.
        actual: Digest,
    },
    /// Minimum timestamp differs.
    FirstTimestamp {
        /// Claimed `first_timestamp`.
        expected: String,
        /// Recomputed minimum.
        actual: String,
    },
    /// Maximum timestamp differs.
    LastTimestamp {
        /// Claimed `last_timestamp`.
        expected: String,
        /// Recomputed maximum.
        actual: String,
    },
    /// Id of the first event differs.
    FirstEventId {
        /// Claimed `first_event_id`.
        expected: String,
        /// Id at the first position.
        actual: String,
    },
    /// Id of the last event differs.
    LastEventId {
        /// Claimed `last_event_id`.
        expected: String,
        /// Id at the last position.
        actual: String,
    },
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mismatch::Count { expected, actual } => {
                write!(f, "count mismatch: expected {}, got {}", expected, actual)
            }
            Mismatch::HashSum { expected, actual } => {
                write!(f, "hash sum mismatch: expected {}, computed {}", expected, actual)
            }
            Mismatch::FirstTimestamp { expected, actual } => write!(
                f,
                "first timestamp mismatch: expected {}, got {}",
                expected, actual
            ),
            Mismatch::LastTimestamp { expected, actual } => write!(
                f,
                "last timestamp mismatch: expected {}, got {}",
                expected, actual
            ),
            Mismatch::FirstEventId { expected, actual } => write!(
                f,
                "first event ID mismatch: expected {}, got {}",
                expected, actual
            ),
            Mismatch::LastEventId { expected, actual } => write!(
                f,
                "last event ID mismatch: expected {}, got {}",
                expected, actual
            ),
        }
    }
}

/// Outcome of verifying a candidate sequence against a claimed invariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", content = "mismatch", rename_all = "snake_case")]
pub enum VerificationResult {
    /// Every check passed.
    Valid,
    /// A check failed; later checks were not evaluated.
    Invalid(Mismatch),
}

impl VerificationResult {
    /// Returns `true` for [`VerificationResult::Valid`].
    pub fn is_valid(&self) -> bool {
        matches!(self, VerificationResult::Valid)
    }

    /// The failed check, if any.
    pub fn mismatch(&self) -> Option<&Mismatch> {
        match self {
            VerificationResult::Valid => None,
            VerificationResult::Invalid(mismatch) => Some(mismatch),
        }
    }
}

impl From<Option<Mismatch>> for VerificationResult {
    fn from(mismatch: Option<Mismatch>) -> Self {
        match mismatch {
            None => VerificationResult::Valid,
            Some(mismatch) => VerificationResult::Invalid(mismatch),
        }
    }
}

impl fmt::Display for VerificationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerificationResult::Valid => write!(f, "completeness invariant valid"),
            VerificationResult::Invalid(mismatch) => write!(f, "{}", mismatch),
        }
    }
}
