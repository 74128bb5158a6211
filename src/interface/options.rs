// src/interface/options.rs

//! Input and output descriptors.
//!
//! A descriptor augments a command [`Parameter`] with what one front-end needs
//! to know about it: a short flag, a widget type, a conversion handler. Both
//! the CLI and HTML adapters use the same two types; the [`InterfaceKind`]
//! decides which fields are meaningful.

use crate::{
    core::{error::CommandError, parameters::Parameter},
    models::{DataType, Value},
};
use anyhow::Result;
use std::{fmt, path::Path};

/// Post-processes a raw input value before it reaches the command.
pub type InputHandler = fn(Value) -> Result<Value>;

/// Turns one command result into interface output.
///
/// Arguments are the result key, the result value and, when the output is tied
/// to an input option, that option's value.
pub type OutputHandler = fn(&str, &Value, Option<&Value>) -> Result<Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InterfaceKind {
    Cli,
    Html,
}

/// Which optional descriptor fields an interface kind understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub choices: bool,
    pub short_name: bool,
    pub mime_type: bool,
}

impl InterfaceKind {
    pub fn capabilities(self) -> Capabilities {
        match self {
            InterfaceKind::Cli => Capabilities {
                choices: true,
                short_name: true,
                mime_type: false,
            },
            InterfaceKind::Html => Capabilities {
                choices: true,
                short_name: false,
                mime_type: true,
            },
        }
    }
}

impl fmt::Display for InterfaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterfaceKind::Cli => write!(f, "CLI"),
            InterfaceKind::Html => write!(f, "HTML"),
        }
    }
}

/// How a raw textual value is parsed before any handler runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputType {
    Str,
    Int,
    Float,
    Bool,
    /// One of a fixed set of choices.
    Choice,
    /// A path that must already exist. CLI only.
    ExistingFilepath,
    /// A path that must not exist yet. CLI only.
    NewFilepath,
    /// A directory that must already exist. CLI only.
    ExistingDirpath,
    /// The contents of an uploaded file. HTML only.
    UploadFile,
}

impl InputType {
    fn for_data_type(data_type: DataType) -> Self {
        match data_type {
            DataType::Int => InputType::Int,
            DataType::Float => InputType::Float,
            DataType::Bool => InputType::Bool,
            _ => InputType::Str,
        }
    }

    pub fn supported_by(self, kind: InterfaceKind) -> bool {
        match self {
            InputType::ExistingFilepath | InputType::NewFilepath | InputType::ExistingDirpath => {
                kind == InterfaceKind::Cli
            }
            InputType::UploadFile => kind == InterfaceKind::Html,
            _ => true,
        }
    }
}

impl fmt::Display for InputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InputType::Str => "str",
            InputType::Int => "int",
            InputType::Float => "float",
            InputType::Bool => "bool",
            InputType::Choice => "choice",
            InputType::ExistingFilepath => "existing_filepath",
            InputType::NewFilepath => "new_filepath",
            InputType::ExistingDirpath => "existing_dirpath",
            InputType::UploadFile => "upload_file",
        };
        write!(f, "{}", name)
    }
}

/// What a flag does when it appears on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Store,
    StoreTrue,
    StoreFalse,
    Append,
}

// --- INPUT OPTION ---

/// Describes one interface input and, when bound, the command parameter it feeds.
#[derive(Debug, Clone)]
pub struct InputOption {
    kind: InterfaceKind,
    parameter: Option<Parameter>,
    name: String,
    help: String,
    required: bool,
    default: Option<Value>,
    default_description: Option<String>,
    input_type: InputType,
    action: Action,
    short_name: Option<char>,
    choices: Option<Vec<String>>,
    handler: Option<InputHandler>,
}

/// Declares an [`InputOption`]; checked by [`InputOptionBuilder::build`].
#[derive(Debug, Clone)]
pub struct InputOptionBuilder {
    option: InputOption,
    requested_required: bool,
    action_set: bool,
}

impl InputOption {
    /// Starts an option bound to `parameter`. Name, help and default come from it.
    pub fn bound(kind: InterfaceKind, parameter: &Parameter) -> InputOptionBuilder {
        let input_type = InputType::for_data_type(parameter.data_type());
        InputOptionBuilder {
            option: Self {
                kind,
                parameter: Some(parameter.clone()),
                name: parameter.name().to_string(),
                help: parameter.description().to_string(),
                required: parameter.is_required(),
                default: parameter.default().cloned(),
                default_description: parameter.default_description().map(str::to_string),
                input_type,
                action: Action::Store,
                short_name: None,
                choices: None,
                handler: None,
            },
            requested_required: false,
            action_set: false,
        }
    }

    /// Starts an interface-only option, e.g. an output file path. Its value never
    /// reaches the command.
    pub fn unbound(kind: InterfaceKind, name: &str, help: &str) -> InputOptionBuilder {
        InputOptionBuilder {
            option: Self {
                kind,
                parameter: None,
                name: name.to_string(),
                help: help.to_string(),
                required: false,
                default: None,
                default_description: None,
                input_type: InputType::Str,
                action: Action::Store,
                short_name: None,
                choices: None,
                handler: None,
            },
            requested_required: false,
            action_set: false,
        }
    }

    pub fn kind(&self) -> InterfaceKind {
        self.kind
    }

    pub fn parameter(&self) -> Option<&Parameter> {
        self.parameter.as_ref()
    }

    /// The command parameter this option feeds, if any.
    pub fn parameter_name(&self) -> Option<&str> {
        self.parameter.as_ref().map(Parameter::name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The long flag name: the option name with underscores turned into dashes.
    pub fn long_name(&self) -> String {
        self.name.replace('_', "-")
    }

    pub fn help(&self) -> &str {
        &self.help
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

    pub fn input_type(&self) -> InputType {
        self.input_type
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn short_name(&self) -> Option<char> {
        self.short_name
    }

    pub fn choices(&self) -> Option<&[String]> {
        self.choices.as_deref()
    }

    pub fn handler(&self) -> Option<InputHandler> {
        self.handler
    }

    /// Parses one raw textual value according to the option's input type.
    pub fn coerce(&self, raw: &str) -> Result<Value, CommandError> {
        let mismatch = || CommandError::TypeMismatch {
            name: self.name.clone(),
            expected: self.input_type.to_string(),
            found: format!("'{}'", raw),
        };
        let invalid = || CommandError::InvalidValue {
            name: self.name.clone(),
            value: raw.to_string(),
        };

        match self.input_type {
            InputType::Str => Ok(Value::from(raw)),
            InputType::Int => raw.trim().parse::<i64>().map(Value::Int).map_err(|_| mismatch()),
            InputType::Float => raw.trim().parse::<f64>().map(Value::Float).map_err(|_| mismatch()),
            InputType::Bool => parse_bool(raw).map(Value::Bool).ok_or_else(mismatch),
            InputType::Choice => {
                let allowed = self.choices.as_deref().unwrap_or_default();
                if allowed.iter().any(|c| c == raw) {
                    Ok(Value::from(raw))
                } else {
                    Err(invalid())
                }
            }
            InputType::ExistingFilepath => {
                if Path::new(raw).is_file() {
                    Ok(Value::from(raw))
                } else {
                    Err(invalid())
                }
            }
            InputType::ExistingDirpath => {
                if Path::new(raw).is_dir() {
                    Ok(Value::from(raw))
                } else {
                    Err(invalid())
                }
            }
            InputType::NewFilepath => {
                if Path::new(raw).exists() {
                    Err(invalid())
                } else {
                    Ok(Value::from(raw))
                }
            }
            InputType::UploadFile => Ok(Value::Bytes(raw.as_bytes().to_vec())),
        }
    }

    /// Applies the option's handler, if it has one.
    pub fn handle(&self, value: Value) -> Result<Value> {
        match self.handler {
            Some(handler) => handler(value),
            None => Ok(value),
        }
    }
}

/// Accepts the usual spellings of a boolean flag value.
pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" | "on" => Some(true),
        "false" | "0" | "no" | "n" | "off" | "" => Some(false),
        _ => None,
    }
}

impl InputOptionBuilder {
    /// Makes the option required. A required parameter is always required; this
    /// can only promote an optional one.
    pub fn required(mut self) -> Self {
        self.requested_required = true;
        self
    }

    /// Overrides the option name, and with it the flag or field name.
    pub fn name(mut self, name: &str) -> Self {
        self.option.name = name.to_string();
        self
    }

    pub fn short_name(mut self, short: char) -> Self {
        self.option.short_name = Some(short);
        self
    }

    pub fn input_type(mut self, input_type: InputType) -> Self {
        self.option.input_type = input_type;
        self
    }

    pub fn action(mut self, action: Action) -> Self {
        self.option.action = action;
        self.action_set = true;
        self
    }

    pub fn choices(mut self, choices: &[&str]) -> Self {
        self.option.choices = Some(choices.iter().map(|c| c.to_string()).collect());
        self
    }

    pub fn handler(mut self, handler: InputHandler) -> Self {
        self.option.handler = Some(handler);
        self
    }

    /// Sets the default of an unbound option. Bound options take the parameter's.
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.option.default = Some(value.into());
        self
    }

    pub fn default_description(mut self, description: &str) -> Self {
        self.option.default_description = Some(description.to_string());
        self
    }

    pub fn build(self) -> Result<InputOption, CommandError> {
        let Self {
            mut option,
            requested_required,
            action_set,
        } = self;
        let caps = option.kind.capabilities();

        if option.name.trim().is_empty() {
            return Err(CommandError::configuration(
                "An option without a parameter must have a name.",
            ));
        }
        if option.help.trim().is_empty() {
            return Err(CommandError::configuration(format!(
                "Option '{}' must have help text.",
                option.name
            )));
        }

        if let Some(parameter) = &option.parameter {
            if option.default.as_ref() != parameter.default() {
                return Err(CommandError::configuration(format!(
                    "Option '{}' is bound to a parameter; its default comes from the parameter.",
                    option.name
                )));
            }
        }
        option.required = option.required || requested_required;
        if option.required && option.default.is_some() && option.parameter.is_none() {
            return Err(CommandError::configuration(format!(
                "Required option '{}' cannot have a default value.",
                option.name
            )));
        }

        if option.short_name.is_some() && !caps.short_name {
            return Err(CommandError::configuration(format!(
                "{} option '{}' cannot have a short name.",
                option.kind, option.name
            )));
        }
        if option.choices.is_some() && !caps.choices {
            return Err(CommandError::configuration(format!(
                "{} option '{}' cannot have choices.",
                option.kind, option.name
            )));
        }

        match (option.input_type, &option.choices) {
            (InputType::Choice, None) => {
                return Err(CommandError::configuration(format!(
                    "Must supply a list of choices for option '{}' of type 'choice'.",
                    option.name
                )));
            }
            (InputType::Choice, Some(choices)) if choices.is_empty() => {
                return Err(CommandError::configuration(format!(
                    "The choice list of option '{}' is empty.",
                    option.name
                )));
            }
            (other, Some(_)) if other != InputType::Choice => {
                return Err(CommandError::configuration(format!(
                    "Must not supply choices for option '{}' of type '{}'.",
                    option.name, other
                )));
            }
            _ => {}
        }

        if !option.input_type.supported_by(option.kind) {
            return Err(CommandError::configuration(format!(
                "Input type '{}' of option '{}' is not supported by the {} interface.",
                option.input_type, option.name, option.kind
            )));
        }

        if option.kind == InterfaceKind::Cli && option.input_type == InputType::Bool && !action_set
        {
            option.action = Action::StoreTrue;
        }
        if option.kind == InterfaceKind::Html && option.action != Action::Store {
            return Err(CommandError::configuration(format!(
                "HTML option '{}' only supports the store action.",
                option.name
            )));
        }

        Ok(option)
    }
}

// --- OUTPUT OPTION ---

/// How an output is presented. CLI outputs have no category of their own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputCategory {
    Cli,
    /// Rendered as the response body with the given MIME type.
    Page { mime_type: String },
    /// Sent as an attachment.
    Download {
        extension: Option<String>,
        /// Name of an input option whose value becomes the file name.
        filename_lookup: Option<String>,
        default_filename: Option<String>,
    },
}

/// Describes what to do with one entry of a command's result.
#[derive(Debug, Clone)]
pub struct OutputOption {
    result_key: String,
    input_name: Option<String>,
    handler: OutputHandler,
    category: OutputCategory,
}

impl OutputOption {
    pub fn cli(result_key: &str, handler: OutputHandler) -> Self {
        Self::with_category(result_key, handler, OutputCategory::Cli)
    }

    pub fn html_page(result_key: &str, handler: OutputHandler) -> Self {
        Self::with_category(
            result_key,
            handler,
            OutputCategory::Page {
                mime_type: "text/html".to_string(),
            },
        )
    }

    pub fn html_download(result_key: &str, handler: OutputHandler) -> Self {
        Self::with_category(
            result_key,
            handler,
            OutputCategory::Download {
                extension: None,
                filename_lookup: None,
                default_filename: None,
            },
        )
    }

    fn with_category(result_key: &str, handler: OutputHandler, category: OutputCategory) -> Self {
        Self {
            result_key: result_key.to_string(),
            input_name: None,
            handler,
            category,
        }
    }

    /// Ties this output to an input option; its value is passed to the handler.
    pub fn input_name(mut self, name: &str) -> Self {
        self.input_name = Some(name.to_string());
        self
    }

    /// Overrides the MIME type of a page output.
    pub fn mime_type(mut self, mime: &str) -> Self {
        if let OutputCategory::Page { mime_type } = &mut self.category {
            *mime_type = mime.to_string();
        }
        self
    }

    pub fn extension(mut self, ext: &str) -> Self {
        if let OutputCategory::Download { extension, .. } = &mut self.category {
            *extension = Some(ext.to_string());
        }
        self
    }

    pub fn filename_lookup(mut self, option_name: &str) -> Self {
        if let OutputCategory::Download {
            filename_lookup, ..
        } = &mut self.category
        {
            *filename_lookup = Some(option_name.to_string());
        }
        self
    }

    pub fn default_filename(mut self, name: &str) -> Self {
        if let OutputCategory::Download {
            default_filename, ..
        } = &mut self.category
        {
            *default_filename = Some(name.to_string());
        }
        self
    }

    pub fn kind(&self) -> InterfaceKind {
        match self.category {
            OutputCategory::Cli => InterfaceKind::Cli,
            OutputCategory::Page { .. } | OutputCategory::Download { .. } => InterfaceKind::Html,
        }
    }

    pub fn result_key(&self) -> &str {
        &self.result_key
    }

    pub fn bound_input(&self) -> Option<&str> {
        self.input_name.as_deref()
    }

    pub fn category(&self) -> &OutputCategory {
        &self.category
    }

    /// Runs the output handler on one result value.
    pub fn handle(&self, data: &Value, option_value: Option<&Value>) -> Result<Value> {
        (self.handler)(&self.result_key, data, option_value)
    }
}

// MARK: --- UNIT TESTS ---

#[cfg(test)]
mod tests {
    use super::*;

    fn required_param() -> Parameter {
        Parameter::builder("input_fp", DataType::Str, "the input")
            .required()
            .build()
            .unwrap()
    }

    fn optional_param() -> Parameter {
        Parameter::builder("count", DataType::Int, "how many")
            .default(3i64)
            .build()
            .unwrap()
    }

    #[test]
    fn test_bound_option_inherits_parameter() {
        let opt = InputOption::bound(InterfaceKind::Cli, &optional_param())
            .build()
            .unwrap();
        assert_eq!(opt.name(), "count");
        assert_eq!(opt.help(), "how many");
        assert_eq!(opt.default(), Some(&Value::Int(3)));
        assert_eq!(opt.input_type(), InputType::Int);
        assert!(!opt.is_required());
    }

    #[test]
    fn test_option_can_promote_but_not_relax() {
        let promoted = InputOption::bound(InterfaceKind::Cli, &optional_param())
            .required()
            .build()
            .unwrap();
        assert!(promoted.is_required());

        let still_required = InputOption::bound(InterfaceKind::Cli, &required_param())
            .build()
            .unwrap();
        assert!(still_required.is_required());
    }

    #[test]
    fn test_unbound_option_needs_name_and_help() {
        assert!(InputOption::unbound(InterfaceKind::Cli, "", "help").build().is_err());
        assert!(InputOption::unbound(InterfaceKind::Cli, "output-fp", " ").build().is_err());
        let ok = InputOption::unbound(InterfaceKind::Cli, "output-fp", "output filepath")
            .short_name('o')
            .build()
            .unwrap();
        assert_eq!(ok.parameter_name(), None);
        assert_eq!(ok.long_name(), "output-fp");
    }

    #[test]
    fn test_capabilities_are_enforced() {
        let html_short = InputOption::unbound(InterfaceKind::Html, "x", "x").short_name('x');
        assert!(matches!(html_short.build(), Err(CommandError::Configuration(_))));

        let html_path = InputOption::unbound(InterfaceKind::Html, "x", "x")
            .input_type(InputType::NewFilepath);
        assert!(html_path.build().is_err());

        let cli_upload = InputOption::unbound(InterfaceKind::Cli, "x", "x")
            .input_type(InputType::UploadFile);
        assert!(cli_upload.build().is_err());
    }

    #[test]
    fn test_choices_require_choice_type() {
        let missing = InputOption::unbound(InterfaceKind::Html, "x", "x").input_type(InputType::Choice);
        assert!(missing.build().is_err());

        let stray = InputOption::unbound(InterfaceKind::Html, "x", "x").choices(&["a"]);
        assert!(stray.build().is_err());

        let ok = InputOption::unbound(InterfaceKind::Html, "x", "x")
            .input_type(InputType::Choice)
            .choices(&["a", "b"])
            .build()
            .unwrap();
        assert_eq!(ok.coerce("b").unwrap(), Value::from("b"));
        assert!(matches!(ok.coerce("c"), Err(CommandError::InvalidValue { .. })));
    }

    #[test]
    fn test_coerce_numbers() {
        let opt = InputOption::bound(InterfaceKind::Html, &optional_param())
            .build()
            .unwrap();
        assert_eq!(opt.coerce(" 42 ").unwrap(), Value::Int(42));
        assert!(matches!(
            opt.coerce("forty-two"),
            Err(CommandError::TypeMismatch { name, .. }) if name == "count"
        ));
    }

    #[test]
    fn test_cli_bool_defaults_to_store_true() {
        let flag = Parameter::builder("verbose", DataType::Bool, "be chatty")
            .default(false)
            .build()
            .unwrap();
        let opt = InputOption::bound(InterfaceKind::Cli, &flag).build().unwrap();
        assert_eq!(opt.action(), Action::StoreTrue);

        let html = InputOption::bound(InterfaceKind::Html, &flag)
            .action(Action::Append)
            .build();
        assert!(html.is_err());
    }

    #[test]
    fn test_output_option_category_setters() {
        fn passthrough(_: &str, data: &Value, _: Option<&Value>) -> Result<Value> {
            Ok(data.clone())
        }
        let page = OutputOption::html_page("result", passthrough).mime_type("text/plain");
        assert_eq!(
            page.category(),
            &OutputCategory::Page {
                mime_type: "text/plain".into()
            }
        );
        assert_eq!(page.kind(), InterfaceKind::Html);

        let cli = OutputOption::cli("result", passthrough)
            .input_name("output-fp")
            .mime_type("ignored");
        assert_eq!(cli.category(), &OutputCategory::Cli);
        assert_eq!(cli.bound_input(), Some("output-fp"));
    }
}
