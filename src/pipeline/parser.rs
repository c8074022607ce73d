use serde_json::{Map, Value};
use std::fmt;

/// Object keys probed for the record list when the payload is not a
/// top-level array.
const LIST_KEYS: &[&str] = &["data", "employees", "items", "results"];

#[derive(Debug)]
pub enum ParseFailure {
    Syntax(serde_json::Error),
    ShapeMismatch,
}

impl fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseFailure::Syntax(err) => write!(f, "malformed JSON payload: {}", err),
            ParseFailure::ShapeMismatch => write!(
                f,
                "payload is neither a list of objects nor an object holding one"
            ),
        }
    }
}

impl std::error::Error for ParseFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseFailure::Syntax(err) => Some(err),
            ParseFailure::ShapeMismatch => None,
        }
    }
}

/// Decodes the payload into generic record mappings. No partial recovery is
/// attempted: malformed text or an unexpected shape fails the whole payload.
pub fn parse(bytes: &[u8]) -> Result<Vec<Map<String, Value>>, ParseFailure> {
    let value: Value = serde_json::from_slice(bytes).map_err(ParseFailure::Syntax)?;

    let elements = match value {
        Value::Array(items) => items,
        Value::Object(mut object) => {
            let list_key = LIST_KEYS
                .iter()
                .find(|key| matches!(object.get(**key), Some(Value::Array(_))))
                .ok_or(ParseFailure::ShapeMismatch)?;
            match object.remove(*list_key) {
                Some(Value::Array(items)) => items,
                _ => return Err(ParseFailure::ShapeMismatch),
            }
        }
        _ => return Err(ParseFailure::ShapeMismatch),
    };

    elements
        .into_iter()
        .map(|element| match element {
            Value::Object(map) => Ok(map),
            _ => Err(ParseFailure::ShapeMismatch),
        })
        .collect()
}
