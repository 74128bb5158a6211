// src/interface/html/output_handlers.rs

use crate::models::Value;
use anyhow::{Result, anyhow};

/// Joins a list of strings with newlines.
pub fn newline_list_of_strings(
    result_key: &str,
    data: &Value,
    _option_value: Option<&Value>,
) -> Result<Value> {
    let lines = data.as_list().ok_or_else(|| {
        anyhow!(
            "Result '{}' must be a list of strings, found a {} value.",
            result_key,
            data.type_name()
        )
    })?;
    Ok(Value::Str(lines.join("\n")))
}

/// Passes the result through untouched.
pub fn identity(_result_key: &str, data: &Value, _option_value: Option<&Value>) -> Result<Value> {
    Ok(data.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newline_list_of_strings() {
        let data = Value::List(vec!["a".into(), "b".into()]);
        assert_eq!(
            newline_list_of_strings("result", &data, None).unwrap(),
            Value::from("a\nb")
        );
        assert!(newline_list_of_strings("result", &Value::Int(3), None).is_err());
    }
}
