use capture_canonical::{event_hash_with, validate_timestamp, Digest};

use crate::config::{EngineConfig, TimestampPolicy};
use crate::errors::CiError;
use crate::event::{BoundaryFields, EventJson};
use crate::invariant::CompletenessInvariant;

/// Incremental construction of a [`CompletenessInvariant`].
///
/// Events are absorbed one at a time, so only the accumulator, the running
/// timestamp bounds and the boundary ids are held; canonical encodings are
/// dropped as soon as they are hashed. Borrowed strings are copied out only
/// in [`InvariantBuilder::finish`].
#[derive(Debug, Clone)]
pub struct InvariantBuilder<'a> {
    config: EngineConfig,
    hash_sum: Digest,
    count: u64,
    first_event_id: Option<&'a str>,
    last_event_id: Option<&'a str>,
    min_timestamp: Option<&'a str>,
    max_timestamp: Option<&'a str>,
}

impl<'a> InvariantBuilder<'a> {
    /// Creates an empty builder.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            hash_sum: Digest::zero(config.digest_alg),
            count: 0,
            first_event_id: None,
            last_event_id: None,
            min_timestamp: None,
            max_timestamp: None,
        }
    }

    /// Number of events absorbed so far.
    pub fn len(&self) -> u64 {
        self.count
    }

    /// Returns `true` if no event has been absorbed.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Absorbs the next event in log order.
    ///
    /// On error the builder is left unchanged.
    pub fn push(&mut self, event: &'a EventJson) -> Result<(), CiError> {
        let index = usize::try_from(self.count).unwrap_or(usize::MAX);
        let fields = BoundaryFields::extract(event, index)?;

        if self.config.timestamp_policy == TimestampPolicy::Rfc3339Utc {
            validate_timestamp(fields.timestamp).map_err(|e| CiError::InvalidEvent {
                index,
                reason: e.to_string(),
            })?;
        }

        let digest = event_hash_with(event, self.config.digest_alg)?;
        self.hash_sum.xor_in(&digest);

        self.count += 1;
        self.first_event_id.get_or_insert(fields.event_id);
        self.last_event_id = Some(fields.event_id);
        self.min_timestamp = Some(match self.min_timestamp {
            Some(current) if current <= fields.timestamp => current,
            _ => fields.timestamp,
        });
        self.max_timestamp = Some(match self.max_timestamp {
            Some(current) if current >= fields.timestamp => current,
            _ => fields.timestamp,
        });
        Ok(())
    }

    /// Produces the invariant.
    ///
    /// # Errors
    ///
    /// Returns [`CiError::EmptyInput`] if no event was pushed.
    pub fn finish(self) -> Result<CompletenessInvariant, CiError> {
        match (
            self.first_event_id,
            self.last_event_id,
            self.min_timestamp,
            self.max_timestamp,
        ) {
            (Some(first_id), Some(last_id), Some(min_ts), Some(max_ts)) => {
                Ok(CompletenessInvariant {
                    expected_count: self.count,
                    hash_sum: self.hash_sum,
                    first_timestamp: min_ts.to_string(),
                    last_timestamp: max_ts.to_string(),
                    first_event_id: first_id.to_string(),
                    last_event_id: last_id.to_string(),
                })
            }
            _ => Err(CiError::EmptyInput),
        }
    }
}
