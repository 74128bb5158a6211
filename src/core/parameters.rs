// src/core/parameters.rs

use crate::{
    core::error::CommandError,
    models::{DataType, Value},
};
use lazy_static::lazy_static;
use regex::Regex;
use std::{collections::HashMap, fmt};

lazy_static! {
    static ref IDENTIFIER_RE: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
}

/// A predicate a candidate value must satisfy before a command sees it.
pub type Validator = fn(&Value) -> bool;

// --- DATA STRUCTS ---

/// An interface-agnostic description of one value a command accepts or returns.
///
/// Parameters are immutable once built; use [`Parameter::builder`] to declare one.
#[derive(Clone)]
pub struct Parameter {
    name: String,
    data_type: DataType,
    description: String,
    required: bool,
    default: Option<Value>,
    default_description: Option<String>,
    validator: Option<Validator>,
}

/// Collects the optional pieces of a [`Parameter`] declaration.
#[derive(Debug, Clone)]
pub struct ParameterBuilder {
    name: String,
    data_type: DataType,
    description: String,
    required: bool,
    default: Option<Value>,
    default_description: Option<String>,
    validator: Option<Validator>,
}

/// An ordered, name-unique set of parameters.
///
/// There is no way to add, remove or replace a parameter after construction.
#[derive(Debug, Clone, Default)]
pub struct ParameterCollection {
    parameters: Vec<Parameter>,
    positions: HashMap<String, usize>,
}

// --- PARAMETER ---

impl Parameter {
    pub fn builder(name: &str, data_type: DataType, description: &str) -> ParameterBuilder {
        ParameterBuilder {
            name: name.to_string(),
            data_type,
            description: description.to_string(),
            required: false,
            default: None,
            default_description: None,
            validator: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn default_description(&self) -> Option<&str> {
        self.default_description.as_deref()
    }

    /// Runs the validator, if any. Parameters without one accept every value.
    pub fn validate(&self, value: &Value) -> bool {
        self.validator.is_none_or(|check| check(value))
    }
}

impl fmt::Debug for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parameter")
            .field("name", &self.name)
            .field("data_type", &self.data_type)
            .field("required", &self.required)
            .field("default", &self.default)
            .field("has_validator", &self.validator.is_some())
            .finish()
    }
}

impl ParameterBuilder {
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn default_description(mut self, description: &str) -> Self {
        self.default_description = Some(description.to_string());
        self
    }

    pub fn validator(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Checks the declaration and freezes it into a [`Parameter`].
    pub fn build(self) -> Result<Parameter, CommandError> {
        if !IDENTIFIER_RE.is_match(&self.name) {
            return Err(CommandError::configuration(format!(
                "'{}' is not a valid parameter name. Names must be letters, digits or \
                 underscores and cannot start with a digit.",
                self.name
            )));
        }

        if self.required {
            if let Some(default) = &self.default {
                return Err(CommandError::configuration(format!(
                    "Found required parameter '{}' with default value '{}'. Required \
                     parameters cannot have default values.",
                    self.name, default
                )));
            }
        }

        if let Some(default) = &self.default {
            if !self.data_type.accepts(default) {
                return Err(CommandError::configuration(format!(
                    "Default value '{}' of parameter '{}' is not of type {}.",
                    default, self.name, self.data_type
                )));
            }
        }

        Ok(Parameter {
            name: self.name,
            data_type: self.data_type,
            description: self.description,
            required: self.required,
            default: self.default,
            default_description: self.default_description,
            validator: self.validator,
        })
    }
}

// --- COLLECTION ---

impl ParameterCollection {
    pub fn new(parameters: Vec<Parameter>) -> Result<Self, CommandError> {
        let mut positions = HashMap::with_capacity(parameters.len());
        for (position, parameter) in parameters.iter().enumerate() {
            if positions.insert(parameter.name.clone(), position).is_some() {
                return Err(CommandError::configuration(format!(
                    "Found duplicate parameter name '{}'.",
                    parameter.name
                )));
            }
        }
        Ok(Self {
            parameters,
            positions,
        })
    }

    /// Looks a parameter up by name.
    pub fn get(&self, name: &str) -> Result<&Parameter, CommandError> {
        self.positions
            .get(name)
            .and_then(|&position| self.parameters.get(position))
            .ok_or_else(|| CommandError::UnknownParameter(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Parameter> {
        self.parameters.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.parameters.iter().map(Parameter::name)
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }
}

impl<'a> IntoIterator for &'a ParameterCollection {
    type Item = &'a Parameter;
    type IntoIter = std::slice::Iter<'a, Parameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.parameters.iter()
    }
}

// MARK: --- UNIT TESTS ---

#[cfg(test)]
mod tests {
    use super::*;

    fn param(name: &str) -> Parameter {
        Parameter::builder(name, DataType::Str, "a parameter")
            .build()
            .unwrap()
    }

    #[test]
    fn test_required_with_default_fails() {
        let result = Parameter::builder("a", DataType::Int, "an int")
            .required()
            .default(5i64)
            .build();
        assert!(matches!(result, Err(CommandError::Configuration(_))));
    }

    #[test]
    fn test_invalid_identifiers_fail() {
        for name in ["1abc", "with-dash", "", "has space"] {
            let result = Parameter::builder(name, DataType::Str, "x").build();
            assert!(
                matches!(result, Err(CommandError::Configuration(_))),
                "name {:?} should be rejected",
                name
            );
        }
        assert!(Parameter::builder("_ok_1", DataType::Str, "x").build().is_ok());
    }

    #[test]
    fn test_default_must_match_data_type() {
        let result = Parameter::builder("b", DataType::Int, "an int")
            .default("five")
            .build();
        assert!(matches!(result, Err(CommandError::Configuration(_))));
    }

    #[test]
    fn test_validator_is_applied() {
        let p = Parameter::builder("count", DataType::Int, "positive")
            .validator(|v| v.as_int().is_some_and(|i| i > 0))
            .build()
            .unwrap();
        assert!(p.validate(&Value::Int(3)));
        assert!(!p.validate(&Value::Int(-3)));
        assert!(param("free").validate(&Value::Int(-3)));
    }

    #[test]
    fn test_collection_duplicate_fails() {
        let result = ParameterCollection::new(vec![param("a"), param("b"), param("a")]);
        assert!(matches!(result, Err(CommandError::Configuration(msg)) if msg.contains("'a'")));
    }

    #[test]
    fn test_collection_lookup() {
        let collection = ParameterCollection::new(vec![param("a"), param("b")]).unwrap();
        assert_eq!(collection.get("b").unwrap().name(), "b");
        assert_eq!(collection.names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert!(matches!(
            collection.get("zzz"),
            Err(CommandError::UnknownParameter(name)) if name == "zzz"
        ));
    }
}
