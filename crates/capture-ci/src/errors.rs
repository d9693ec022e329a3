use capture_canonical::CanonicalizationError;
use thiserror::Error;

/// Structural errors that abort a compute or verify call.
///
/// Verification mismatches are not errors; they are reported as
/// [`crate::Mismatch`] inside [`crate::VerificationResult::Invalid`].
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CiError {
    /// The event sequence was empty.
    #[error("event sequence must not be empty")]
    EmptyInput,
    /// An event could not be canonically encoded.
    #[error("encoding error: {0}")]
    Encoding(#[from] CanonicalizationError),
    /// A claimed completeness invariant is missing a field or has a bad `hash_sum`.
    #[error("malformed completeness invariant: {0}")]
    MalformedRecord(String),
    /// Invalid event structure or missing required fields.
    #[error("invalid event at index {index}: {reason}")]
    InvalidEvent {
        /// Position of the event in the supplied sequence.
        index: usize,
        /// What is wrong with it.
        reason: String,
    },
    /// Engine configuration could not be parsed.
    #[error("invalid engine configuration: {0}")]
    Config(String),
}
