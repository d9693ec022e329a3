use capture_ci::{compute_completeness_invariant, verify_completeness_invariant, Mismatch};
use proptest::prelude::*;
use serde_json::{json, Value};

fn arb_events(min: usize) -> impl Strategy<Value = Vec<Value>> {
    prop::collection::vec((0u32..24, 0u32..60, "[a-f0-9]{0,12}", any::<i64>()), min..16).prop_map(
        |rows| {
            rows.into_iter()
                .enumerate()
                .map(|(idx, (hour, minute, media, seq))| {
                    json!({
                        "event_id": format!("event-{:04}", idx),
                        "event_type": "CPP_CAPTURE",
                        "timestamp": format!("2026-01-18T{:02}:{:02}:00.000Z", hour, minute),
                        "payload": {"media_hash": format!("sha256:{}", media), "seq": seq}
                    })
                })
                .collect()
        },
    )
}

fn mismatch_of(events: &[Value], claimed: &capture_ci::CompletenessInvariant) -> Option<Mismatch> {
    verify_completeness_invariant(events, claimed)
        .unwrap()
        .mismatch()
        .cloned()
}

proptest! {
    #[test]
    fn compute_then_verify_is_valid(events in arb_events(1)) {
        let ci = compute_completeness_invariant(&events).unwrap();
        prop_assert_eq!(ci.expected_count, events.len() as u64);
        prop_assert!(verify_completeness_invariant(&events, &ci).unwrap().is_valid());
    }

    #[test]
    fn removing_any_event_is_count_mismatch(events in arb_events(2), pick in any::<prop::sample::Index>()) {
        let ci = compute_completeness_invariant(&events).unwrap();
        let mut candidate = events.clone();
        candidate.remove(pick.index(events.len()));

        prop_assert_eq!(
            mismatch_of(&candidate, &ci),
            Some(Mismatch::Count { expected: events.len() as u64, actual: events.len() as u64 - 1 })
        );
    }

    #[test]
    fn mutating_any_event_is_hash_sum_mismatch(events in arb_events(1), pick in any::<prop::sample::Index>()) {
        let ci = compute_completeness_invariant(&events).unwrap();
        let mut candidate = events.clone();
        candidate[pick.index(events.len())]["payload"]["tampered"] = json!(true);

        let is_hash_sum = matches!(mismatch_of(&candidate, &ci), Some(Mismatch::HashSum { .. }));
        prop_assert!(is_hash_sum);
    }

    #[test]
    fn signatures_never_change_the_invariant(events in arb_events(1), sig in "[A-Za-z0-9_-]{16,64}") {
        let ci = compute_completeness_invariant(&events).unwrap();
        let signed: Vec<Value> = events
            .iter()
            .map(|event| {
                let mut signed = event.clone();
                signed["signature"] = json!(sig);
                signed
            })
            .collect();
        prop_assert_eq!(compute_completeness_invariant(&signed).unwrap(), ci);
    }

    #[test]
    fn rotating_keeps_hash_but_breaks_boundary(events in arb_events(2)) {
        let ci = compute_completeness_invariant(&events).unwrap();
        let mut rotated = events.clone();
        rotated.rotate_left(1);

        let fresh = compute_completeness_invariant(&rotated).unwrap();
        prop_assert_eq!(fresh.hash_sum, ci.hash_sum);

        let is_first_id = matches!(mismatch_of(&rotated, &ci), Some(Mismatch::FirstEventId { .. }));
        prop_assert!(is_first_id);
    }
}
