//! # Fingerprint Properties
//!
//! Pins the canonical byte form and SHA-256 output for known submissions, and
//! checks with proptest that fingerprints ignore insertion order while
//! separating distinct value sets.

use dynform_core::{fingerprint, CanonicalBytes, FieldValue, ValidatedSubmission};
use proptest::prelude::*;

fn submission(pairs: Vec<(String, FieldValue)>) -> ValidatedSubmission {
    pairs.into_iter().collect()
}

#[test]
fn known_vectors() {
    let cases = [
        (
            submission(vec![
                ("name".into(), FieldValue::Text("John".into())),
                ("age".into(), FieldValue::Number(25.0)),
            ]),
            r#"{"age":25.0,"name":"John"}"#,
            "2e5fc4c5dcfa7a747f5748c7ea4a97dfc383818a3aede865b63689b789ce9f2c",
        ),
        (
            submission(vec![
                ("nickname".into(), FieldValue::Empty),
                ("email".into(), FieldValue::Text("a@b.co".into())),
            ]),
            r#"{"email":"a@b.co","nickname":null}"#,
            "82c6278d58354c78039a0a529c308bb85573db8a64689885403511f1a6109dde",
        ),
    ];

    for (data, canonical, hex) in cases {
        let bytes = CanonicalBytes::new(&data).unwrap();
        assert_eq!(std::str::from_utf8(bytes.as_bytes()).unwrap(), canonical);
        assert_eq!(fingerprint(&data).unwrap().to_hex(), hex);
    }
}

fn field_value() -> impl Strategy<Value = FieldValue> {
    prop_oneof![
        Just(FieldValue::Empty),
        (-1.0e9f64..1.0e9).prop_map(FieldValue::Number),
        "[a-zA-Z0-9@. \u{05d0}-\u{05ea}]{0,24}".prop_map(FieldValue::Text),
    ]
}

proptest! {
    /// Any permutation of the same pairs yields the same fingerprint.
    #[test]
    fn insertion_order_is_irrelevant(
        pairs in prop::collection::btree_map("[a-z_]{1,12}", field_value(), 0..10),
        seed in any::<u64>(),
    ) {
        let forward: Vec<(String, FieldValue)> = pairs.clone().into_iter().collect();
        let mut shuffled = forward.clone();
        // Deterministic rotation keyed by the seed.
        if !shuffled.is_empty() {
            let k = (seed as usize) % shuffled.len();
            shuffled.rotate_left(k);
            shuffled.reverse();
        }
        let a = fingerprint(&submission(forward)).unwrap();
        let b = fingerprint(&submission(shuffled)).unwrap();
        prop_assert_eq!(a, b);
    }

    /// Changing a single text value changes the fingerprint.
    #[test]
    fn distinct_text_values_never_collide(
        key in "[a-z]{1,8}",
        left in "[a-z]{1,16}",
        right in "[a-z]{1,16}",
    ) {
        prop_assume!(left != right);
        let a = submission(vec![(key.clone(), FieldValue::Text(left))]);
        let b = submission(vec![(key, FieldValue::Text(right))]);
        prop_assert_ne!(fingerprint(&a).unwrap(), fingerprint(&b).unwrap());
    }

    /// Canonical bytes always parse back as JSON.
    #[test]
    fn canonical_bytes_are_valid_json(
        pairs in prop::collection::btree_map("[a-z_]{1,12}", field_value(), 0..10),
    ) {
        let data = submission(pairs.into_iter().collect());
        let bytes = CanonicalBytes::new(&data).unwrap();
        let parsed: Result<serde_json::Value, _> = serde_json::from_slice(bytes.as_bytes());
        prop_assert!(parsed.is_ok());
    }
}
