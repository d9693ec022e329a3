//! Per-event content hashing.
//!
//! An event's content hash is `H(canonical_bytes(event \ {signature}))`.
//! The signature is metadata about the event, so it is dropped by key
//! exclusion while building the canonical tree; the caller's record is
//! never modified.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::canonicalizer::{canonicalize, CanonicalizationError};
use crate::digest::{Digest, DigestAlg};
use crate::value::{to_canonical_value, CanonicalValue};

/// Top-level key excluded from the content hash.
pub const SIGNATURE_FIELD: &str = "signature";

/// Computes the SHA-256 content hash of an event record.
///
/// # Example
///
/// ```rust
/// use capture_canonical::event_hash;
/// use serde_json::json;
///
/// let signed = json!({"event_id": "event-001", "signature": "c2lnbmF0dXJl"});
/// let unsigned = json!({"event_id": "event-001"});
/// assert_eq!(event_hash(&signed)?, event_hash(&unsigned)?);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
///
/// # Errors
///
/// Returns [`CanonicalizationError::NotAnObject`] if `event` is not a JSON object,
/// or [`CanonicalizationError::InvalidNumber`] if it holds a float literal with
/// no finite value.
pub fn event_hash(event: &Value) -> Result<Digest, CanonicalizationError> {
    event_hash_with(event, DigestAlg::Sha256)
}

/// Computes the content hash of an event record with an explicit algorithm.
pub fn event_hash_with(event: &Value, alg: DigestAlg) -> Result<Digest, CanonicalizationError> {
    let map = event.as_object().ok_or(CanonicalizationError::NotAnObject)?;

    let content: BTreeMap<String, CanonicalValue> = map
        .iter()
        .filter(|(key, _)| key.as_str() != SIGNATURE_FIELD)
        .map(|(key, child)| (key.clone(), CanonicalValue::from(child)))
        .collect();

    Ok(alg.hash(&canonicalize(&CanonicalValue::Object(content))?))
}

/// Computes the content hash of a typed event record.
///
/// The value is first converted with [`to_canonical_value`], so unsupported
/// leaves surface as errors instead of being coerced.
pub fn event_hash_serializable<T>(event: &T, alg: DigestAlg) -> Result<Digest, CanonicalizationError>
where
    T: Serialize + ?Sized,
{
    match to_canonical_value(event)? {
        CanonicalValue::Object(mut content) => {
            content.remove(SIGNATURE_FIELD);
            Ok(alg.hash(&canonicalize(&CanonicalValue::Object(content))?))
        }
        _ => Err(CanonicalizationError::NotAnObject),
    }
}
