//! Canonical encoding primitives for capture provenance events.
//!
//! Two producers that hash the same event (at capture time and again at
//! audit time) must agree byte-for-byte on its encoding. This crate owns that
//! contract:
//! - [`CanonicalValue`], the value tree every encoding goes through
//! - [`canonicalize`], the compact, key-sorted JSON writer
//! - [`event_hash`], the signature-excluding content hash of one event
//! - [`Digest`], the `"<alg>:<hex>"` tagged digest
//!
#![deny(missing_docs)]

/// Canonical byte encoding.
pub mod canonicalizer;
/// Digest/identifier primitives.
pub mod digest;
/// Content hashing of individual event records.
pub mod event_hash;
/// Identifier format checks.
pub mod identifiers;
/// Validation helpers used by canonical types.
pub mod validation;
/// Canonical value tree.
pub mod value;

pub use canonicalizer::{
    canonicalize, canonicalize_json, canonicalize_serializable, CanonicalizationError,
};
pub use digest::{Digest, DigestAlg, DIGEST_LEN};
pub use event_hash::{event_hash, event_hash_serializable, event_hash_with, SIGNATURE_FIELD};
pub use identifiers::validate_timestamp;
pub use validation::ValidationError;
pub use value::{to_canonical_value, CanonicalValue};
