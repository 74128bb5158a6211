// src/interface/cli/output_handlers.rs

//! Command line output handlers.
//!
//! All handlers share the [`OutputHandler`](crate::interface::options::OutputHandler)
//! signature: `(result_key, data, option_value)`, where `option_value` is the
//! value of the input option the output is tied to (typically a file path).

use crate::{core::error::CommandError, models::Value};
use anyhow::{Context, Result, anyhow, bail};
use std::{
    fs::OpenOptions,
    io::{ErrorKind, Write},
};

/// Writes a string to a new file, followed by a newline.
pub fn write_string(_result_key: &str, data: &Value, option_value: Option<&Value>) -> Result<Value> {
    let path = output_path(option_value)?;
    write_new_file(path, &format!("{}\n", data))?;
    Ok(Value::from(path))
}

/// Writes a list of strings to a new file, one per line.
pub fn write_list_of_strings(
    result_key: &str,
    data: &Value,
    option_value: Option<&Value>,
) -> Result<Value> {
    let lines = expect_list(result_key, data)?;
    let path = output_path(option_value)?;
    let mut contents = String::new();
    for line in lines {
        contents.push_str(line);
        contents.push('\n');
    }
    write_new_file(path, &contents)?;
    Ok(Value::from(path))
}

/// Prints a value to stdout. `result_key` and `option_value` are ignored.
pub fn print_string(_result_key: &str, data: &Value, _option_value: Option<&Value>) -> Result<Value> {
    println!("{}", data);
    Ok(Value::Null)
}

/// Prints a list of strings to stdout, one per line.
pub fn print_list_of_strings(
    result_key: &str,
    data: &Value,
    _option_value: Option<&Value>,
) -> Result<Value> {
    for line in expect_list(result_key, data)? {
        println!("{}", line);
    }
    Ok(Value::Null)
}

fn output_path(option_value: Option<&Value>) -> Result<&str> {
    match option_value {
        Some(Value::Str(path)) => Ok(path.as_str()),
        _ => Err(anyhow!(CommandError::configuration(
            "Cannot write output without a filepath."
        ))),
    }
}

/// Creates `path` and writes `contents` to it. Never overwrites an existing file.
fn write_new_file(path: &str, contents: &str) -> Result<()> {
    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            bail!("Output path '{}' already exists.", path)
        }
        Err(e) => return Err(e).with_context(|| format!("Failed to create output '{}'", path)),
    };
    file.write_all(contents.as_bytes())
        .with_context(|| format!("Failed to write output '{}'", path))
}

fn expect_list<'a>(result_key: &str, data: &'a Value) -> Result<&'a [String]> {
    data.as_list().ok_or_else(|| {
        anyhow!(
            "Result '{}' must be a list of strings, found a {} value.",
            result_key,
            data.type_name()
        )
    })
}
