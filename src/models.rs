// src/models.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::core::error::CommandError;

// --- VALUE MODELS ---
// These are the primary structures that flow between interfaces and commands.

/// A dynamically typed value passed into or returned from a command.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<String>),
    Bytes(Vec<u8>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            Value::Str(s) => Some(s.as_bytes()),
            _ => None,
        }
    }

    /// Short name of the variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::List(_) => "list",
            Value::Bytes(_) => "bytes",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "None"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => write!(f, "{}", s),
            Value::List(items) => write!(f, "{}", items.join(",")),
            Value::Bytes(b) => write!(f, "<{} bytes>", b.len()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Vec<String>> for Value {
    fn from(items: Vec<String>) -> Self {
        Value::List(items)
    }
}

/// The semantic type tag of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Str,
    Int,
    Float,
    Bool,
    List,
    Bytes,
    /// An application-specific type. The framework does not check values against it.
    Custom(&'static str),
}

impl DataType {
    /// Returns true if `value` may be stored in a parameter of this type.
    /// `Null` fits every type, since it stands for "no value".
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Null) | (DataType::Custom(_), _) => true,
            (DataType::Str, Value::Str(_))
            | (DataType::Int, Value::Int(_))
            | (DataType::Float, Value::Float(_) | Value::Int(_))
            | (DataType::Bool, Value::Bool(_))
            | (DataType::List, Value::List(_))
            | (DataType::Bytes, Value::Bytes(_) | Value::Str(_)) => true,
            _ => false,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Str => write!(f, "str"),
            DataType::Int => write!(f, "int"),
            DataType::Float => write!(f, "float"),
            DataType::Bool => write!(f, "bool"),
            DataType::List => write!(f, "list"),
            DataType::Bytes => write!(f, "bytes"),
            DataType::Custom(name) => write!(f, "{}", name),
        }
    }
}

/// The keyword arguments handed to a command, or the result map it returns.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Values(BTreeMap<String, Value>);

impl Values {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(name.into(), value.into())
    }

    /// Builder-style insert, handy when assembling a result in `run`.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.0.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Fetches a declared value, failing if the key was never set.
    pub fn require(&self, name: &str) -> Result<&Value, CommandError> {
        self.0
            .get(name)
            .ok_or_else(|| CommandError::MissingParameter(name.to_string()))
    }

    /// Fetches a string value. `Null` and other variants are reported as a type mismatch.
    pub fn require_str(&self, name: &str) -> Result<&str, CommandError> {
        let value = self.require(name)?;
        value.as_str().ok_or_else(|| CommandError::TypeMismatch {
            name: name.to_string(),
            expected: DataType::Str.to_string(),
            found: value.type_name().to_string(),
        })
    }

    /// Fetches an optional list value; `Null` maps to `None`.
    pub fn optional_list(&self, name: &str) -> Result<Option<&[String]>, CommandError> {
        match self.require(name)? {
            Value::Null => Ok(None),
            Value::List(items) => Ok(Some(items)),
            other => Err(CommandError::TypeMismatch {
                name: name.to_string(),
                expected: DataType::List.to_string(),
                found: other.type_name().to_string(),
            }),
        }
    }
}

impl FromIterator<(String, Value)> for Values {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Values {
    type Item = (String, Value);
    type IntoIter = std::collections::btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

// --- INTERFACE MODELS ---

/// A documented example of how to call a command through an interface.
/// `%prog` in `example` is replaced with the program name when rendered.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UsageExample {
    pub short_desc: String,
    pub long_desc: String,
    pub example: String,
}

impl UsageExample {
    pub fn new(short_desc: &str, long_desc: &str, example: &str) -> Self {
        Self {
            short_desc: short_desc.to_string(),
            long_desc: long_desc.to_string(),
            example: example.to_string(),
        }
    }

    /// Renders this example the way the usage text shows it.
    pub fn render(&self, prog: &str) -> String {
        let short = self.short_desc.trim().trim_end_matches(':').trim();
        let long = self.long_desc.trim().trim_end_matches(':').trim();
        let example = self.example.trim().replace("%prog", prog);
        if short.is_empty() {
            format!("{}\n {}", long, example)
        } else {
            format!("{}: {}\n {}", short, long, example)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_type_accepts() {
        assert!(DataType::Str.accepts(&Value::from("x")));
        assert!(DataType::Int.accepts(&Value::Null));
        assert!(DataType::Float.accepts(&Value::Int(3)));
        assert!(!DataType::Int.accepts(&Value::from("3")));
        assert!(DataType::Custom("otu_table").accepts(&Value::Int(1)));
    }

    #[test]
    fn test_values_require_str_type_mismatch() {
        let values = Values::new().with("a", 1i64);
        let err = values.require_str("a").unwrap_err();
        assert!(matches!(err, CommandError::TypeMismatch { .. }));
        assert!(matches!(
            values.require_str("b").unwrap_err(),
            CommandError::MissingParameter(name) if name == "b"
        ));
    }

    #[test]
    fn test_usage_example_render() {
        let ex = UsageExample::new("Basic:", "Do the thing", "%prog --in x");
        assert_eq!(ex.render("tool"), "Basic: Do the thing\n tool --in x");

        let no_short = UsageExample::new("", "Do the thing", "%prog");
        assert_eq!(no_short.render("tool"), "Do the thing\n tool");
    }
}
