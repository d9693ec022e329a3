//! Completeness invariants for append-only capture event logs.
//!
//! A completeness invariant (CI) is a fixed-size record that commits to an
//! ordered event sequence:
//! - `expected_count`, the number of events
//! - `hash_sum`, the XOR of every event's content hash
//! - `first_timestamp` / `last_timestamp`, the lexical min and max timestamps
//! - `first_event_id` / `last_event_id`, the ids at the first and last positions
//!
//! Persisting the CI instead of the log lets a verifier later detect removed,
//! inserted or altered events. The XOR aggregate is blind to pure
//! permutations and cancels pairs of identical events; the boundary fields
//! are what catch reordering at the edges of the log.
//!
//! Core invariants:
//! - Content hashes come from [`capture_canonical::event_hash`], which excludes `signature`
//! - Verification recomputes everything from the candidate events
//! - Mismatches are values ([`Mismatch`]); structural problems are errors ([`CiError`])
//! - No shared or global state
//!
#![deny(missing_docs)]

/// Incremental invariant construction.
pub mod builder;
/// Engine configuration.
pub mod config;
/// Compute and verify entry points.
pub mod engine;
/// Error types for invariant operations.
pub mod errors;
/// Event JSON type alias and field accessors.
pub mod event;
/// The completeness invariant record.
pub mod invariant;
/// Verification outcomes.
pub mod verification;

pub use builder::InvariantBuilder;
pub use config::{EngineConfig, TimestampPolicy};
pub use engine::{compute_completeness_invariant, verify_completeness_invariant, InvariantEngine};
pub use errors::CiError;
pub use event::{BoundaryFields, EventJson, EVENT_ID_FIELD, TIMESTAMP_FIELD};
pub use invariant::CompletenessInvariant;
pub use verification::{Mismatch, VerificationResult};
