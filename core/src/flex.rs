//! Tagged parsing of list fields at the network boundary.
//!
//! Several result fields are stored server-side as JSON text and are sent
//! either already decoded (`["a", "b"]`), still encoded (`"[\"a\", \"b\"]"`),
//! as a bare value (`"a"`) or as `null`. They are normalized here, once,
//! into a plain list so render code never branches on runtime type.
//!
//! | Wire value                     | Normalized         |
//! |--------------------------------|--------------------|
//! | `null` / absent / `""`         | `[]`               |
//! | `[...]`                        | `[...]`            |
//! | `"[...]"` (valid JSON array)   | `[...]`            |
//! | `"\"x\""` (encoded string)     | `["x"]`            |
//! | `"x"` (anything else)          | `["x"]`            |
//! | `42`, `{...}`                  | `[42]`, `[{...}]`  |

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Normalize a wire value into a JSON array.
pub fn normalize(value: Value) -> Value {
    match value {
        Value::Null => Value::Array(Vec::new()),
        Value::Array(_) => value,
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Value::Array(Vec::new());
            }
            match serde_json::from_str::<Value>(trimmed) {
                Ok(Value::Array(items)) => Value::Array(items),
                Ok(Value::Null) => Value::Array(Vec::new()),
                Ok(Value::String(inner)) => Value::Array(vec![Value::String(inner)]),
                _ => Value::Array(vec![Value::String(text)]),
            }
        }
        other => Value::Array(vec![other]),
    }
}

/// `deserialize_with` adapter for list fields.
///
/// Use together with `#[serde(default)]` so absent fields become empty lists.
/// Items that do not match `T` after normalization are a decode error.
pub fn list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    let normalized = normalize(raw.unwrap_or(Value::Null));
    serde_json::from_value(normalized).map_err(D::Error::custom)
}
