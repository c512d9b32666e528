//! Shape checks for dynamically shaped results.
//!
//! Handlers hand over anything `Serialize`; these checks run on its JSON
//! form before any cache write or network call.

use serde::Serialize;
use serde_json::Value;

use crate::error::{DemoError, DemoResult};

/// Serialize `value` for shape inspection.
pub fn to_value<T: Serialize + ?Sized>(value: &T) -> DemoResult<Value> {
    serde_json::to_value(value)
        .map_err(|e| DemoError::MismatchType(format!("value is not serializable: {}", e)))
}

/// Require an array whose elements are all strings.
pub fn string_array<T: Serialize + ?Sized>(value: &T) -> DemoResult<Vec<String>> {
    match to_value(value)? {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::String(s) => Ok(s),
                other => Err(DemoError::MismatchType(format!(
                    "element {} must be a string, got {}",
                    i,
                    kind(&other)
                ))),
            })
            .collect(),
        other => Err(DemoError::MismatchType(format!(
            "expected an array of strings, got {}",
            kind(&other)
        ))),
    }
}

/// Require an array whose elements are all arrays.
pub fn nested_array<T: Serialize + ?Sized>(value: &T) -> DemoResult<Value> {
    let value = to_value(value)?;
    let Value::Array(items) = &value else {
        return Err(DemoError::MismatchType(format!(
            "expected an array of arrays, got {}",
            kind(&value)
        )));
    };
    if let Some((i, bad)) = items.iter().enumerate().find(|(_, item)| !item.is_array()) {
        return Err(DemoError::MismatchType(format!(
            "element {} must be an array, got {}",
            i,
            kind(bad)
        )));
    }
    Ok(value)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_string_array() {
        assert_eq!(string_array(&["a", "b"]).unwrap(), vec!["a", "b"]);
        assert!(string_array(&Vec::<String>::new()).unwrap().is_empty());

        let err = string_array(&json!(["a", 1])).unwrap_err();
        assert!(err.to_string().contains("element 1"));
        assert!(matches!(string_array("abc"), Err(DemoError::MismatchType(_))));
    }

    #[test]
    fn test_nested_array() {
        assert!(nested_array(&vec![vec![1, 2], vec![3]]).is_ok());
        assert!(matches!(
            nested_array(&json!([[1], 2])),
            Err(DemoError::MismatchType(_))
        ));
        assert!(matches!(
            nested_array(&json!({"x": []})),
            Err(DemoError::MismatchType(_))
        ));
    }
}
