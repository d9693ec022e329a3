use serde_json::Value;

use crate::errors::CiError;

/// Event JSON payload type.
///
/// Events are plain JSON objects supplied by the log store. The engine reads
/// `event_id` and `timestamp` from them and hashes everything except
/// `signature`; it never mutates them.
pub type EventJson = Value;

/// Key holding the opaque event identifier.
pub const EVENT_ID_FIELD: &str = "event_id";
/// Key holding the ISO-8601 timestamp string.
pub const TIMESTAMP_FIELD: &str = "timestamp";

/// Borrowed view of the fields the invariant reads from an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundaryFields<'a> {
    /// The event's `event_id`.
    pub event_id: &'a str,
    /// The event's `timestamp`.
    pub timestamp: &'a str,
}

impl<'a> BoundaryFields<'a> {
    /// Extracts `event_id` and `timestamp` from the event at `index`.
    pub fn extract(event: &'a EventJson, index: usize) -> Result<Self, CiError> {
        let Some(obj) = event.as_object() else {
            return Err(CiError::InvalidEvent {
                index,
                reason: "event must be a JSON object".to_string(),
            });
        };

        let field = move |name: &str| -> Result<&'a str, CiError> {
            obj.get(name)
                .and_then(Value::as_str)
                .ok_or_else(|| CiError::InvalidEvent {
                    index,
                    reason: format!("missing or non-string '{}'", name),
                })
        };

        Ok(Self {
            event_id: field(EVENT_ID_FIELD)?,
            timestamp: field(TIMESTAMP_FIELD)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_borrowed_fields() {
        let event = json!({"event_id": "event-001", "timestamp": "2026-01-18T10:00:00.000Z"});
        let fields = BoundaryFields::extract(&event, 0).unwrap();
        assert_eq!(fields.event_id, "event-001");
        assert_eq!(fields.timestamp, "2026-01-18T10:00:00.000Z");
    }

    #[test]
    fn reports_index_of_bad_event() {
        let event = json!({"event_id": 7, "timestamp": "2026-01-18T10:00:00.000Z"});
        match BoundaryFields::extract(&event, 4).unwrap_err() {
            CiError::InvalidEvent { index, reason } => {
                assert_eq!(index, 4);
                assert!(reason.contains("event_id"));
            }
            other => panic!("unexpected error {:?}", other),
        }
        assert!(BoundaryFields::extract(&json!("event-001"), 0).is_err());
        assert!(BoundaryFields::extract(&json!({"event_id": "e"}), 0).is_err());
    }
}
