//! Computes the invariant of three capture events, then shows that deleting
//! the middle event is caught.

use capture_ci::{CompletenessInvariant, InvariantEngine};
use serde_json::{json, Value};

fn capture(n: u32, media: &str) -> Value {
    json!({
        "cpp_version": "1.0",
        "event_id": format!("event-{:03}", n),
        "event_type": "CPP_CAPTURE",
        "timestamp": format!("2026-01-18T{}:00:00.000Z", 9 + n),
        "payload": {"media_hash": format!("sha256:{}", media)}
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_target(false).init();

    let events = vec![capture(1, "abc"), capture(2, "def"), capture(3, "ghi")];
    let engine = InvariantEngine::default();

    let ci = engine.compute(&events)?;
    println!("Computed completeness invariant:");
    println!("{}", serde_json::to_string_pretty(&ci)?);

    // The stored form is what a verifier would read back later.
    let stored = serde_json::to_string(&ci)?;
    let claimed = CompletenessInvariant::from_json_str(&stored)?;

    let result = engine.verify(&events, &claimed)?;
    println!("\nVerification with all events: {}", result);

    let tampered = vec![events[0].clone(), events[2].clone()];
    let result = engine.verify(&tampered, &claimed)?;
    println!("Verification with deleted event: {}", result);

    Ok(())
}
