// src/interface/cli/input_handlers.rs

//! Command line input handlers.
//!
//! Every handler has the [`InputHandler`](crate::interface::options::InputHandler)
//! signature and receives the already type-checked option value.

use crate::{interface::options::parse_bool, models::Value};
use anyhow::{Context, Result, anyhow};
use std::fs;

/// Splits a comma-separated string into a list of strings.
pub fn string_list_handler(value: Value) -> Result<Value> {
    match value {
        Value::Str(s) => Ok(Value::List(s.split(',').map(str::to_string).collect())),
        Value::Null | Value::List(_) => Ok(value),
        other => Err(anyhow!(
            "Cannot split a {} value into a list.",
            other.type_name()
        )),
    }
}

/// Reads the file at the given path and returns its contents as a single string.
pub fn load_file_contents(value: Value) -> Result<Value> {
    let path = expect_path(&value)?;
    let contents =
        fs::read_to_string(path).with_context(|| format!("Failed to read file '{}'", path))?;
    Ok(Value::Str(contents))
}

/// Reads the file at the given path and returns one string per line, with
/// surrounding whitespace stripped.
pub fn load_file_lines(value: Value) -> Result<Value> {
    let path = expect_path(&value)?;
    let contents =
        fs::read_to_string(path).with_context(|| format!("Failed to read file '{}'", path))?;
    Ok(Value::List(
        contents.lines().map(|l| l.trim().to_string()).collect(),
    ))
}

/// Interprets a textual value as a boolean.
pub fn string_to_bool(value: Value) -> Result<Value> {
    match value {
        Value::Str(s) => parse_bool(&s)
            .map(Value::Bool)
            .ok_or_else(|| anyhow!("'{}' is not a boolean value.", s)),
        Value::Bool(_) | Value::Null => Ok(value),
        other => Err(anyhow!("Cannot read a {} value as a boolean.", other.type_name())),
    }
}

fn expect_path(value: &Value) -> Result<&str> {
    value
        .as_str()
        .ok_or_else(|| anyhow!("Expected a file path, found a {} value.", value.type_name()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_string_list_handler() {
        let out = string_list_handler(Value::from("a,b,,c")).unwrap();
        assert_eq!(
            out,
            Value::List(vec!["a".into(), "b".into(), "".into(), "c".into()])
        );
        assert_eq!(string_list_handler(Value::Null).unwrap(), Value::Null);
        assert!(string_list_handler(Value::Int(1)).is_err());
    }

    #[test]
    fn test_load_file_contents_and_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "  first \nsecond\n").unwrap();
        let path = Value::from(file.path().to_str().unwrap());

        assert_eq!(
            load_file_contents(path.clone()).unwrap(),
            Value::from("  first \nsecond\n")
        );
        assert_eq!(
            load_file_lines(path).unwrap(),
            Value::List(vec!["first".into(), "second".into()])
        );
    }

    #[test]
    fn test_load_missing_file_fails_with_path() {
        let err = load_file_contents(Value::from("/definitely/not/here.txt")).unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.txt"));
    }

    #[test]
    fn test_string_to_bool() {
        assert_eq!(string_to_bool(Value::from("yes")).unwrap(), Value::Bool(true));
        assert_eq!(string_to_bool(Value::from("0")).unwrap(), Value::Bool(false));
        assert!(string_to_bool(Value::from("maybe")).is_err());
    }
}
