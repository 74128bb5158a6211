// src/interface/html/mod.rs

//! HTML form interface adapter.
//!
//! Raw input is a submitted form: a map from field name to field value, where
//! every field name carries the interface's prefix (`pyqi_` by default). The
//! output is either one page assembled from all page outputs or a single file
//! download.

pub mod input_handlers;
pub mod output_handlers;
pub mod page;
pub mod router;

use crate::{
    constants::{DEFAULT_FIELD_PREFIX, FALLBACK_DOWNLOAD_NAME},
    core::error::CommandError,
    interface::{
        Interface, InterfaceDefinition, Rejection,
        options::{InputOption, InputType, InterfaceKind, OutputCategory},
    },
    models::{Value, Values},
};
use anyhow::{Context, Result};
use std::collections::BTreeMap;

/// One submitted form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormField {
    Text(String),
    File { filename: String, contents: Vec<u8> },
}

impl FormField {
    fn is_empty(&self) -> bool {
        match self {
            FormField::Text(text) => text.is_empty(),
            FormField::File { contents, .. } => contents.is_empty(),
        }
    }
}

/// A submitted form, keyed by (prefixed) field name.
pub type FormData = BTreeMap<String, FormField>;

/// What a successful HTML dispatch produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HtmlOutput {
    Page { mime_type: String, body: Vec<u8> },
    Download { filename: String, body: Vec<u8> },
}

/// Adapts a command to an HTML form.
#[derive(Debug)]
pub struct HtmlInterface {
    definition: InterfaceDefinition,
    prefix: String,
    /// Value of every option from the last submission, keyed by option name.
    option_values: Values,
}

impl HtmlInterface {
    /// Replaces the field-name prefix.
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix.to_string();
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The form field name of an option.
    pub fn field_name(&self, option: &InputOption) -> String {
        format!("{}{}", self.prefix, option.name())
    }

    pub fn option_values(&self) -> &Values {
        &self.option_values
    }

    /// Turns one field into a value of the option's input type.
    fn read_field(&self, option: &InputOption, field: &FormField) -> Result<Value, String> {
        let coerced = match (option.input_type(), field) {
            (InputType::UploadFile, FormField::File { contents, .. }) => Ok(Value::Bytes(contents.clone())),
            (_, FormField::Text(text)) => option.coerce(text),
            (_, FormField::File { contents, .. }) => option.coerce(&String::from_utf8_lossy(contents)),
        };

        let value = coerced.map_err(|e| match e {
            CommandError::TypeMismatch { .. } => {
                format!("Error: {} must be type {}", option.name(), option.input_type())
            }
            other => format!("Error: {}", other),
        })?;

        option
            .handle(value)
            .map_err(|e| format!("Error: {}: {:#}", option.name(), e))
    }

    fn download_filename(
        &self,
        extension: Option<&str>,
        filename_lookup: Option<&str>,
        default_filename: Option<&str>,
    ) -> String {
        let looked_up = filename_lookup
            .and_then(|name| self.option_values.get(name))
            .filter(|value| !value.is_null())
            .map(Value::to_string);
        let stem = match filename_lookup {
            Some(_) => looked_up,
            None => default_filename.map(str::to_string),
        }
        .unwrap_or_else(|| FALLBACK_DOWNLOAD_NAME.to_string());
        format!("{}{}", stem, extension.unwrap_or(""))
    }
}

impl Interface for HtmlInterface {
    type RawInput = FormData;
    type Output = HtmlOutput;

    const KIND: InterfaceKind = InterfaceKind::Html;

    fn from_definition(definition: InterfaceDefinition) -> Result<Self, CommandError> {
        let cmd_name = definition.command().name().to_string();
        if !definition.usage_examples().is_empty() {
            return Err(CommandError::configuration(format!(
                "There shouldn't be usage examples associated with HTML command '{}'.",
                cmd_name
            )));
        }

        let downloads = definition
            .outputs()
            .iter()
            .filter(|o| matches!(o.category(), OutputCategory::Download { .. }))
            .count();
        if downloads > 0 && definition.outputs().len() > 1 {
            return Err(CommandError::configuration(format!(
                "HTML command '{}' must have either page outputs or exactly one download output.",
                cmd_name
            )));
        }

        Ok(Self {
            definition,
            prefix: DEFAULT_FIELD_PREFIX.to_string(),
            option_values: Values::new(),
        })
    }

    fn definition(&self) -> &InterfaceDefinition {
        &self.definition
    }

    fn validate_raw_input(&self, raw: &FormData) -> Result<(), CommandError> {
        match raw.keys().find(|key| !key.starts_with(&self.prefix)) {
            Some(key) => Err(CommandError::TypeMismatch {
                name: key.clone(),
                expected: format!("a form field prefixed with '{}'", self.prefix),
                found: format!("'{}'", key),
            }),
            None => Ok(()),
        }
    }

    fn map_inputs(&mut self, raw: FormData) -> Result<Values, Rejection> {
        self.option_values = Values::new();

        let fields: BTreeMap<&str, &FormField> = raw
            .iter()
            .filter(|(_, field)| !field.is_empty())
            .filter_map(|(key, field)| key.strip_prefix(self.prefix.as_str()).map(|k| (k, field)))
            .collect();

        let mut kwargs = Values::new();
        let mut errors = Vec::new();
        for option in self.definition.inputs() {
            let value = match fields.get(option.name()) {
                Some(field) => match self.read_field(option, field) {
                    Ok(value) => Some(value),
                    Err(message) => {
                        errors.push(message);
                        continue;
                    }
                },
                None if option.is_required() => {
                    errors.push(format!("Error: {} is required.", option.name()));
                    continue;
                }
                None => None,
            };

            match (value, option.parameter_name()) {
                (Some(value), Some(parameter)) => {
                    kwargs.insert(parameter, value.clone());
                    self.option_values.insert(option.name(), value);
                }
                (Some(value), None) => {
                    self.option_values.insert(option.name(), value);
                }
                (None, _) => {
                    let default = option.default().cloned().unwrap_or(Value::Null);
                    self.option_values.insert(option.name(), default);
                }
            }
        }

        if errors.is_empty() {
            Ok(kwargs)
        } else {
            Err(Rejection::Invalid(errors))
        }
    }

    fn map_outputs(&mut self, result: Values) -> Result<HtmlOutput> {
        let mut page: Option<(String, Vec<u8>)> = None;

        for output in self.definition.outputs() {
            let key = output.result_key();
            let data = result
                .get(key)
                .ok_or_else(|| CommandError::UnknownParameter(key.to_string()))?;
            let option_value = output.bound_input().and_then(|name| self.option_values.get(name));
            let handled = output
                .handle(data, option_value)
                .with_context(|| format!("Failed to handle output '{}'", key))?;
            let body = into_body(handled);

            match output.category() {
                OutputCategory::Download {
                    extension,
                    filename_lookup,
                    default_filename,
                } => {
                    let filename = self.download_filename(
                        extension.as_deref(),
                        filename_lookup.as_deref(),
                        default_filename.as_deref(),
                    );
                    log::debug!("Sending '{}' as download '{}'.", key, filename);
                    return Ok(HtmlOutput::Download { filename, body });
                }
                OutputCategory::Page { mime_type } => match &mut page {
                    Some((_, content)) => content.extend(body),
                    None => page = Some((mime_type.clone(), body)),
                },
                OutputCategory::Cli => {}
            }
        }

        let (mime_type, body) = page.unwrap_or_else(|| ("text/html".to_string(), Vec::new()));
        Ok(HtmlOutput::Page { mime_type, body })
    }
}

/// Raw response bytes of a handled output value.
fn into_body(value: Value) -> Vec<u8> {
    match value {
        Value::Bytes(bytes) => bytes,
        Value::Str(text) => text.into_bytes(),
        Value::Null => Vec::new(),
        other => other.to_string().into_bytes(),
    }
}

// MARK: --- UNIT TESTS ---
