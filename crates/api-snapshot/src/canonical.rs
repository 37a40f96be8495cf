//! Canonical text form of snapshot payloads.
//!
//! Pretty-printed with four-space indentation, non-ASCII characters left
//! unescaped, object keys in the order the source data yields them. Two
//! payloads that serialize differently are different snapshots.

use serde::ser::Error as _;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use serde_json::Value;

use api_snapshot_core::{Error, Result};

/// Indentation unit of canonical snapshots.
pub const INDENT: &[u8] = b"    ";

/// Serialize `value` into canonical snapshot text.
pub fn to_canonical<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut buf = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(INDENT));
    value.serialize(&mut serializer)?;
    String::from_utf8(buf).map_err(|e| Error::Serialization(serde_json::Error::custom(e)))
}

/// Decode a raw JSON body (an HTTP response, say) and re-encode it canonically.
pub fn canonicalize_body(body: &str) -> Result<String> {
    let value: Value = serde_json::from_str(body)?;
    to_canonical(&value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    #[test]
    fn test_pretty_four_spaces() {
        let text = to_canonical(&json!({"data": [{"id": 1}]})).unwrap();
        assert_eq!(
            text,
            "{\n    \"data\": [\n        {\n            \"id\": 1\n        }\n    ]\n}"
        );
    }

    #[test]
    fn test_unicode_unescaped() {
        let text = to_canonical(&json!({"name": "Zoë 東京"})).unwrap();
        assert!(text.contains("Zoë 東京"));
    }

    #[test]
    fn test_key_order_preserved() {
        let text = canonicalize_body(r#"{"zeta": 1, "alpha": 2}"#).unwrap();
        assert!(text.find("zeta").unwrap() < text.find("alpha").unwrap());
    }

    #[test]
    fn test_struct_field_order() {
        #[derive(Serialize)]
        struct User {
            id: u32,
            name: &'static str,
        }
        let text = to_canonical(&User { id: 1, name: "Joe" }).unwrap();
        assert_eq!(text, "{\n    \"id\": 1,\n    \"name\": \"Joe\"\n}");
    }

    #[test]
    fn test_rejected_value_is_serialization_error() {
        let mut map = BTreeMap::new();
        map.insert(vec![1u8], "bytes as key");
        assert!(matches!(to_canonical(&map), Err(Error::Serialization(_))));
    }

    #[test]
    fn test_invalid_body() {
        assert!(matches!(
            canonicalize_body("<html>"),
            Err(Error::Serialization(_))
        ));
    }
}
