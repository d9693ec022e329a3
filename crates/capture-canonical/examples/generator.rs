use capture_canonical::{canonicalize_json, event_hash};
use serde_json::json;

fn main() {
    let event = json!({
        "cpp_version": "1.0",
        "event_id": "event-001",
        "event_type": "CPP_CAPTURE",
        "timestamp": "2026-01-18T10:00:00.000Z",
        "payload": {
            "media_hash": "sha256:abc"
        },
        "signature": "c2lnbmF0dXJl"
    });

    let hashed = canonicalize_json(&event).and_then(|bytes| {
        println!("{}", String::from_utf8_lossy(&bytes));
        event_hash(&event)
    });
    match hashed {
        Ok(digest) => println!("content hash (signature excluded): {}", digest),
        Err(err) => {
            eprintln!("hashing failed: {}", err);
            std::process::exit(1);
        }
    }
}
