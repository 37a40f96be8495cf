//! Property-based tests for the pattern matcher.
//!
//! Uses proptest to generate random JSON documents and verify matcher invariants.

use proptest::prelude::*;
use serde_json::{json, Value};

use api_snapshot_matcher::{MatchEngine, PatternMatcher};

/// Generate arbitrary JSON whose strings never look like placeholders.
fn json_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        (-1.0e6f64..1.0e6).prop_map(|n| json!(n)),
        "[A-Za-z0-9 éü_-]{0,12}".prop_map(Value::String),
    ];
    leaf.prop_recursive(4, 64, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,6}", inner, 0..6)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

proptest! {
    /// Every document matches itself.
    #[test]
    fn document_matches_itself(doc in json_value()) {
        let report = PatternMatcher::new().compare_values(&doc, &doc).unwrap();
        prop_assert!(report.is_match(), "{}", report);
    }

    /// Text comparison agrees with value comparison for canonical pretty JSON.
    #[test]
    fn pretty_text_matches_itself(doc in json_value()) {
        let text = serde_json::to_string_pretty(&doc).unwrap();
        let report = PatternMatcher::new().compare(&text, &text).unwrap();
        prop_assert!(report.is_match());
    }

    /// A wildcard accepts any document.
    #[test]
    fn wildcard_accepts_anything(doc in json_value()) {
        let report = PatternMatcher::new()
            .compare_values(&json!("@*@"), &doc)
            .unwrap();
        prop_assert!(report.is_match());
    }

    /// Changing one integer field is always reported at that field.
    #[test]
    fn changed_id_is_located(a in any::<i64>(), b in any::<i64>()) {
        prop_assume!(a != b);
        let expected = json!({"data": [{"id": a, "name": "Joe"}]});
        let actual = json!({"data": [{"id": b, "name": "Joe"}]});
        let report = PatternMatcher::new().compare_values(&expected, &actual).unwrap();
        prop_assert_eq!(report.paths(), vec!["data[0].id"]);
    }
}
