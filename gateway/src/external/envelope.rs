//! Response envelope handling for the ERP backend
//!
//! Endpoints answer either `{ "success": bool, "data": ..., "message": ... }`
//! or the bare payload. Both are accepted.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{AppError, AppResult};

const ENVELOPE_KEYS: &[&str] = &["success", "data", "message", "pagination", "meta", "total"];

fn is_envelope(map: &Map<String, Value>) -> bool {
    map.contains_key("success")
        || (map.contains_key("data") && map.keys().all(|k| ENVELOPE_KEYS.contains(&k.as_str())))
}

/// Unwrap a successful (2xx) response body into the expected payload
pub fn unwrap_envelope<T: DeserializeOwned>(body: Value) -> AppResult<T> {
    let payload = match body {
        Value::Object(mut map) if is_envelope(&map) => {
            if map.get("success").and_then(Value::as_bool) == Some(false) {
                return Err(AppError::Upstream {
                    status: 200,
                    message: extract_message(&Value::Object(map)),
                });
            }
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    };

    serde_json::from_value(payload).map_err(|e| AppError::UpstreamDecode(e.to_string()))
}

/// Pull a human-readable message out of an error body, if the server sent one
pub fn extract_message(body: &Value) -> Option<String> {
    let candidate = match body {
        Value::String(s) => Some(s.as_str()),
        Value::Object(map) => map
            .get("message")
            .and_then(Value::as_str)
            .or_else(|| match map.get("error") {
                Some(Value::String(s)) => Some(s.as_str()),
                Some(Value::Object(inner)) => inner.get("message").and_then(Value::as_str),
                _ => None,
            }),
        _ => None,
    };
    candidate
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bare_array() {
        let v: Vec<i32> = unwrap_envelope(json!([1, 2, 3])).unwrap();
        assert_eq!(v, vec![1, 2, 3]);
    }

    #[test]
    fn test_wrapped_array() {
        let v: Vec<i32> = unwrap_envelope(json!({"success": true, "data": [4]})).unwrap();
        assert_eq!(v, vec![4]);
        let v: Vec<i32> = unwrap_envelope(json!({"data": [5], "total": 1})).unwrap();
        assert_eq!(v, vec![5]);
    }

    #[test]
    fn test_bare_object_with_data_field_is_not_an_envelope() {
        #[derive(serde::Deserialize)]
        struct Doc {
            id: i64,
            data: String,
        }
        let d: Doc = unwrap_envelope(json!({"id": 1, "data": "x"})).unwrap();
        assert_eq!(d.id, 1);
        assert_eq!(d.data, "x");
    }

    #[test]
    fn test_unsuccessful_envelope() {
        let err = unwrap_envelope::<Vec<i32>>(json!({"success": false, "message": "Locked"}))
            .unwrap_err();
        assert_eq!(err.upstream_message(), Some("Locked"));
    }

    #[test]
    fn test_success_without_data_is_unit() {
        unwrap_envelope::<()>(json!({"success": true})).unwrap();
    }

    #[test]
    fn test_extract_message_shapes() {
        assert_eq!(extract_message(&json!({"message": "a"})), Some("a".to_string()));
        assert_eq!(extract_message(&json!({"error": "b"})), Some("b".to_string()));
        assert_eq!(
            extract_message(&json!({"error": {"message": "c"}})),
            Some("c".to_string())
        );
        assert_eq!(extract_message(&json!({"message": "  "})), None);
        assert_eq!(extract_message(&json!(42)), None);
    }
}
