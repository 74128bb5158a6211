// src/core/error.rs

use thiserror::Error;

/// Failures raised by the command/interface contract itself.
///
/// Errors produced inside a command's `run` are not wrapped in this type;
/// they travel as the `anyhow::Error` the command returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    /// A parameter, command or interface was declared incorrectly.
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// A required input was not supplied.
    #[error("Missing required parameter '{0}'.")]
    MissingParameter(String),
    /// A name that no declared parameter or result carries.
    #[error("Unknown parameter '{0}'.")]
    UnknownParameter(String),
    /// A value was rejected by the parameter's validator.
    #[error("Invalid value '{value}' for parameter '{name}'.")]
    InvalidValue { name: String, value: String },
    /// A declared result does not fit its declared type.
    #[error("Invalid value returned for '{name}': expected {expected}, found {found}.")]
    InvalidReturnType {
        name: String,
        expected: String,
        found: String,
    },
    /// A value or raw request has the wrong shape for its type.
    #[error("'{name}' must be of type {expected} (found {found}).")]
    TypeMismatch {
        name: String,
        expected: String,
        found: String,
    },
}

impl CommandError {
    /// True for errors caused by what a user supplied, as opposed to how a
    /// developer declared the command or interface. Interfaces render these
    /// as validation feedback instead of failing outright.
    pub fn is_request_error(&self) -> bool {
        matches!(
            self,
            CommandError::MissingParameter(_)
                | CommandError::UnknownParameter(_)
                | CommandError::InvalidValue { .. }
                | CommandError::TypeMismatch { .. }
        )
    }

    pub(crate) fn configuration(msg: impl Into<String>) -> Self {
        CommandError::Configuration(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_error_classification() {
        assert!(CommandError::MissingParameter("a".into()).is_request_error());
        assert!(CommandError::UnknownParameter("z".into()).is_request_error());
        assert!(!CommandError::configuration("bad").is_request_error());
        assert!(
            !CommandError::InvalidReturnType {
                name: "result".into(),
                expected: "str".into(),
                found: "int".into(),
            }
            .is_request_error()
        );
    }

    #[test]
    fn test_error_messages_name_the_parameter() {
        let err = CommandError::InvalidValue {
            name: "count".into(),
            value: "-1".into(),
        };
        assert_eq!(err.to_string(), "Invalid value '-1' for parameter 'count'.");
    }
}
