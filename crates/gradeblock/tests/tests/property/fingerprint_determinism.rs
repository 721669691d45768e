//! Property tests: fingerprints are deterministic, sensitive to content,
//! and independent of key order in structured details.

use gradeblock_integrity::{fingerprint, fingerprint_value, Digest};
use gradeblock_types::Payload;
use proptest::prelude::*;
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn arb_courses() -> impl Strategy<Value = Vec<(String, String)>> {
    prop::collection::vec(("[A-Z][a-z]{2,12}", "[A-F][+-]?"), 0..8)
}

fn object_from(entries: &[(String, String)]) -> Value {
    let mut map = Map::new();
    for (course, grade) in entries {
        map.insert(course.clone(), Value::String(grade.clone()));
    }
    Value::Object(map)
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn fingerprint_is_stable(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        let payload = Payload::new(bytes);
        prop_assert_eq!(fingerprint(&payload), fingerprint(&payload.clone()));
    }

    #[test]
    fn distinct_payloads_have_distinct_fingerprints(
        a in prop::collection::vec(any::<u8>(), 1..64),
        b in prop::collection::vec(any::<u8>(), 1..64),
    ) {
        prop_assume!(a != b);
        prop_assert_ne!(fingerprint(&Payload::new(a)), fingerprint(&Payload::new(b)));
    }

    #[test]
    fn key_order_does_not_change_fingerprint(courses in arb_courses()) {
        let forward = object_from(&courses);
        let mut reversed_entries = courses.clone();
        reversed_entries.reverse();
        let reversed = object_from(&reversed_entries);
        let unique: std::collections::BTreeSet<_> = courses.iter().map(|(c, _)| c).collect();
        prop_assume!(unique.len() == courses.len());

        prop_assert_eq!(
            fingerprint_value(&forward).unwrap(),
            fingerprint_value(&reversed).unwrap()
        );
    }

    #[test]
    fn hex_form_roundtrips(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
        let digest = fingerprint(&Payload::new(bytes));
        prop_assert_eq!(Digest::from_hex(&digest.to_hex()).unwrap(), digest);
    }
}
