//! Opaque cursors: standard base64 over a JSON array of cursor-order values.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value as Json;

use crate::error::{GraphError, Result};
use crate::value::Value;

pub fn encode(values: &[Value]) -> String {
    let json = Json::Array(values.iter().map(Value::to_json).collect());
    STANDARD.encode(json.to_string())
}

/// Decodes the `side` cursor, which must hold exactly `arity` values.
pub fn decode(side: &'static str, cursor: &str, arity: usize) -> Result<Vec<Value>> {
    let malformed = |reason: String| GraphError::MalformedCursor { side, reason };

    let bytes = STANDARD
        .decode(cursor)
        .map_err(|e| malformed(format!("not base64: {e}")))?;
    let json: Json =
        serde_json::from_slice(&bytes).map_err(|e| malformed(format!("not JSON: {e}")))?;
    let Json::Array(items) = json else {
        return Err(malformed("expected an array".into()));
    };
    if items.len() != arity {
        return Err(malformed(format!(
            "expected {arity} values, received {}",
            items.len()
        )));
    }

    items
        .iter()
        .map(|item| Value::from_json(item).ok_or_else(|| malformed(format!("unexpected {item}"))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_what_it_encodes() {
        let tuple = vec![Value::from("Chai"), Value::Real(18.0), Value::Integer(1)];
        let cursor = encode(&tuple);
        assert_eq!(decode("after", &cursor, 3).unwrap(), tuple);
    }

    #[test]
    fn cursor_is_base64_json() {
        assert_eq!(encode(&[Value::Integer(10)]), "WzEwXQ==");
    }

    #[test]
    fn rejects_wrong_arity_and_garbage() {
        let cursor = encode(&[Value::Integer(1)]);
        assert!(matches!(
            decode("before", &cursor, 2),
            Err(GraphError::MalformedCursor { side: "before", .. })
        ));
        assert!(decode("after", "%%%", 1).is_err());
        assert!(decode("after", &STANDARD.encode("{\"a\":1}"), 1).is_err());
        assert!(decode("after", "", 1).is_err());
    }
}
