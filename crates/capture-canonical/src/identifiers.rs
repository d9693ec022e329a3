use std::sync::OnceLock;

use regex::Regex;

use crate::validation::ValidationError;

const TIMESTAMP_PATTERN: &str = r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(\.\d{1,9})?Z$";

fn timestamp_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(TIMESTAMP_PATTERN).expect("invalid regex"))
}

/// Checks that `value` is a UTC RFC 3339 timestamp with a `Z` suffix.
///
/// Only this fixed-width form orders lexically in chronological order.
pub fn validate_timestamp(value: &str) -> Result<(), ValidationError> {
    if timestamp_regex().is_match(value) {
        Ok(())
    } else {
        Err(ValidationError::PatternMismatch {
            field: "timestamp",
            value: value.to_string(),
        })
    }
}
