use serde_json::Value;
use tracing::{debug, warn};

use crate::builder::InvariantBuilder;
use crate::config::EngineConfig;
use crate::errors::CiError;
use crate::event::EventJson;
use crate::invariant::CompletenessInvariant;
use crate::verification::{Mismatch, VerificationResult};

/// Computes and verifies completeness invariants.
///
/// The engine holds configuration only. Every call works on its explicit
/// inputs, so one engine can be shared freely across threads.
///
/// # Example
///
/// ```rust
/// use capture_ci::{InvariantEngine, Mismatch, VerificationResult};
/// use serde_json::json;
///
/// let events = vec![
///     json!({"event_id": "event-001", "timestamp": "2026-01-18T10:00:00.000Z"}),
///     json!({"event_id": "event-002", "timestamp": "2026-01-18T11:00:00.000Z"}),
///     json!({"event_id": "event-003", "timestamp": "2026-01-18T12:00:00.000Z"}),
/// ];
///
/// let engine = InvariantEngine::default();
/// let ci = engine.compute(&events)?;
/// assert!(engine.verify(&events, &ci)?.is_valid());
///
/// let tampered = vec![events[0].clone(), events[2].clone()];
/// assert_eq!(
///     engine.verify(&tampered, &ci)?,
///     VerificationResult::Invalid(Mismatch::Count { expected: 3, actual: 2 })
/// );
/// # Ok::<(), capture_ci::CiError>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct InvariantEngine {
    config: EngineConfig,
}

impl InvariantEngine {
    /// Creates an engine with the given configuration.
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Returns the engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Starts an incremental computation.
    pub fn builder<'a>(&self) -> InvariantBuilder<'a> {
        InvariantBuilder::new(self.config)
    }

    /// Computes the completeness invariant of a non-empty event sequence.
    ///
    /// # Errors
    ///
    /// - [`CiError::EmptyInput`] if `events` is empty
    /// - [`CiError::InvalidEvent`] if an event lacks a string `event_id` or `timestamp`
    /// - [`CiError::Encoding`] if an event cannot be canonically encoded
    pub fn compute(&self, events: &[EventJson]) -> Result<CompletenessInvariant, CiError> {
        if events.is_empty() {
            return Err(CiError::EmptyInput);
        }
        self.compute_iter(events)
    }

    /// Computes the invariant from any iterator of borrowed events.
    pub fn compute_iter<'a, I>(&self, events: I) -> Result<CompletenessInvariant, CiError>
    where
        I: IntoIterator<Item = &'a EventJson>,
    {
        let mut builder = self.builder();
        for event in events {
            builder.push(event)?;
        }
        let ci = builder.finish()?;
        debug!(
            expected_count = ci.expected_count,
            hash_sum = %ci.hash_sum,
            "computed completeness invariant"
        );
        Ok(ci)
    }

    /// Verifies a candidate sequence against a claimed invariant.
    ///
    /// Checks run in order (count, hash sum, first/last timestamp, first/last
    /// event id) and stop at the first failure. Every value is recomputed from
    /// `events`; `claimed` is only used for comparison.
    ///
    /// # Errors
    ///
    /// Structural problems abort with [`CiError`]: an empty sequence, or an
    /// event that cannot be read or encoded. Mismatches are returned as
    /// [`VerificationResult::Invalid`].
    pub fn verify(
        &self,
        events: &[EventJson],
        claimed: &CompletenessInvariant,
    ) -> Result<VerificationResult, CiError> {
        if events.is_empty() {
            return Err(CiError::EmptyInput);
        }

        // Count is checked before any hashing.
        let actual_count = events.len() as u64;
        let result = if actual_count != claimed.expected_count {
            VerificationResult::Invalid(Mismatch::Count {
                expected: claimed.expected_count,
                actual: actual_count,
            })
        } else {
            let fresh = self.compute(events)?;
            claimed.first_mismatch(&fresh).into()
        };

        match &result {
            VerificationResult::Valid => {
                debug!(expected_count = claimed.expected_count, "completeness invariant valid")
            }
            VerificationResult::Invalid(mismatch) => {
                warn!(%mismatch, "completeness invariant verification failed")
            }
        }
        Ok(result)
    }

    /// Verifies against a claimed invariant still in JSON form.
    ///
    /// The sequence is checked for emptiness first, then the claimed record is
    /// parsed ([`CiError::MalformedRecord`] on failure), then verified.
    pub fn verify_value(
        &self,
        events: &[EventJson],
        claimed: &Value,
    ) -> Result<VerificationResult, CiError> {
        if events.is_empty() {
            return Err(CiError::EmptyInput);
        }
        let claimed = CompletenessInvariant::from_value(claimed)?;
        self.verify(events, &claimed)
    }
}

/// Computes a completeness invariant with the default configuration.
pub fn compute_completeness_invariant(
    events: &[EventJson],
) -> Result<CompletenessInvariant, CiError> {
    InvariantEngine::default().compute(events)
}

/// Verifies a completeness invariant with the default configuration.
pub fn verify_completeness_invariant(
    events: &[EventJson],
    claimed: &CompletenessInvariant,
) -> Result<VerificationResult, CiError> {
    InvariantEngine::default().verify(events, claimed)
}
