//! Deterministic cache key derivation
//!
//! A key is `operation:<16 hex chars>`, where the hex digits are the head of a
//! SHA-256 digest over `operation:<canonical json of params>`. Canonical JSON
//! is compact `serde_json` output with every object's keys sorted, so two
//! parameter bags that differ only in insertion order share a key.

use crate::error::{CacheError, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

/// Number of digest bytes kept in a key (16 hex characters)
const KEY_DIGEST_BYTES: usize = 8;

/// Serialize `params` as compact JSON with recursively sorted object keys
pub fn canonical_json<P>(params: &P) -> serde_json::Result<String>
where
    P: Serialize + ?Sized,
{
    let value = serde_json::to_value(params)?;
    serde_json::to_string(&sort_keys(value))
}

/// Derive the cache key for `operation` called with `params`
///
/// Fails with [`CacheError::KeyDerivationError`] if `params` cannot be
/// represented as JSON (for example a map with non-string keys).
pub fn derive_key<P>(operation: &str, params: &P) -> Result<String>
where
    P: Serialize + ?Sized,
{
    let json = canonical_json(params).map_err(|source| CacheError::KeyDerivationError {
        operation: operation.to_string(),
        source,
    })?;

    let digest = Sha256::digest(format!("{}:{}", operation, json).as_bytes());
    Ok(format!(
        "{}:{}",
        operation,
        hex::encode(&digest[..KEY_DIGEST_BYTES])
    ))
}

fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> =
                map.into_iter().map(|(k, v)| (k, sort_keys(v))).collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(entries.into_iter().collect::<Map<String, Value>>())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::ser::Error as _;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn test_canonical_json_sorts_nested_keys() {
        let params = json!({"query": "a", "filters": {"y": 2, "x": 1}, "limit": 20});
        assert_eq!(
            canonical_json(&params).unwrap(),
            r#"{"filters":{"x":1,"y":2},"limit":20,"query":"a"}"#
        );
    }

    #[test]
    fn test_canonical_json_sorts_objects_inside_arrays() {
        let params = json!({"context": [{"b": 1, "a": 2}]});
        assert_eq!(
            canonical_json(&params).unwrap(),
            r#"{"context":[{"a":2,"b":1}]}"#
        );
    }

    #[test]
    fn test_key_is_order_independent() {
        let mut first = HashMap::new();
        first.insert("x", 1);
        first.insert("y", 2);
        let mut second = HashMap::new();
        second.insert("y", 2);
        second.insert("x", 1);

        let a = derive_key("search", &json!({"query": "a", "filters": first})).unwrap();
        let b = derive_key("search", &json!({"query": "a", "filters": second})).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_key_is_stable_across_runs() {
        let key = derive_key(
            "search",
            &json!({"query": "a", "filters": {"x": 1, "y": 2}, "limit": 20}),
        )
        .unwrap();
        assert_eq!(key, "search:3da37a8144ccba74");

        let key = derive_key("embedding", &json!({"text": "hello world"})).unwrap();
        assert_eq!(key, "embedding:2444fab3b7789877");
    }

    #[test]
    fn test_key_format() {
        let key = derive_key("vector", &json!({"query": "q", "limit": 10})).unwrap();
        let (op, digest) = key.split_once(':').unwrap();
        assert_eq!(op, "vector");
        assert_eq!(digest.len(), 16);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_operation_is_part_of_the_digest() {
        let params = json!({"query": "same"});
        let search = derive_key("search", &params).unwrap();
        let vector = derive_key("vector", &params).unwrap();
        assert_ne!(search[search.len() - 16..], vector[vector.len() - 16..]);
    }

    #[test]
    fn test_non_string_map_keys_fail() {
        let mut params: HashMap<(u8, u8), u8> = HashMap::new();
        params.insert((1, 2), 3);

        let err = derive_key("search", &params).unwrap_err();
        assert!(matches!(
            err,
            CacheError::KeyDerivationError { ref operation, .. } if operation == "search"
        ));
    }

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: serde::Serializer>(&self, _serializer: S) -> std::result::Result<S::Ok, S::Error> {
            Err(S::Error::custom("opaque handle"))
        }
    }

    #[test]
    fn test_failing_serializer_surfaces_error() {
        let err = derive_key("integrated", &Unserializable).unwrap_err();
        assert!(err.to_string().contains("opaque handle"));
    }
}
