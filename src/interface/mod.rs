// src/interface/mod.rs

//! # Interface Layer
//!
//! An interface adapts one front-end to the command contract. Every adapter
//! follows the same protocol, driven by [`Interface::dispatch`]:
//!
//! 1. **`validate_raw_input`**: shape check of the front-end's raw request.
//! 2. **`map_inputs`**: raw values → keyword arguments, through the input options.
//! 3. **invoke**: the command's own validate/default/run/validate cycle.
//! 4. **`map_outputs`**: result map → front-end output, through the output options.
//!
//! ## Modules
//!
//! - **`options`**: the input/output descriptors shared by every adapter.
//! - **`factory`**: builds adapters from a command plus its descriptors.
//! - **`cli`**: command-line adapter on top of `clap`.
//! - **`html`**: HTML form adapter, its markup and its request router.

pub mod cli;
pub mod factory;
pub mod html;
pub mod options;

use crate::{
    core::{
        command::{self, Command, CommandConstructor},
        error::CommandError,
    },
    interface::options::{InputOption, InterfaceKind, OutputCategory, OutputOption},
    models::{UsageExample, Values},
};
use std::collections::HashSet;
use std::fmt;

/// Why a request was turned away before the command could run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The caller asked for help or version text instead of a run.
    Informational(String),
    /// The input failed validation, one message per problem.
    Invalid(Vec<String>),
}

/// Failure of one dispatch.
#[derive(Debug)]
pub enum DispatchError {
    /// Request-time problem; the command's `run` was never reached.
    Rejected(Rejection),
    /// The command itself, or an output handler, failed.
    Failed(anyhow::Error),
}

impl DispatchError {
    fn invalid(message: impl Into<String>) -> Self {
        DispatchError::Rejected(Rejection::Invalid(vec![message.into()]))
    }
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::Rejected(Rejection::Informational(text)) => write!(f, "{}", text),
            DispatchError::Rejected(Rejection::Invalid(messages)) => {
                write!(f, "{}", messages.join("\n"))
            }
            DispatchError::Failed(e) => write!(f, "{:#}", e),
        }
    }
}

/// Everything an adapter binds: one command, its descriptors and usage examples.
pub struct InterfaceDefinition {
    command: Box<dyn Command>,
    inputs: Vec<InputOption>,
    outputs: Vec<OutputOption>,
    usage_examples: Vec<UsageExample>,
    version: String,
}

impl fmt::Debug for InterfaceDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterfaceDefinition")
            .field("command", &self.command.name())
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .field("usage_examples", &self.usage_examples)
            .field("version", &self.version)
            .finish()
    }
}

impl InterfaceDefinition {
    /// Instantiates the command and checks the descriptors against it.
    ///
    /// Adapter-specific rules (usage example counts, output categories) are
    /// checked by the adapter's own constructor.
    pub fn new(
        command_ctor: CommandConstructor,
        usage_examples: Vec<UsageExample>,
        inputs: Vec<InputOption>,
        outputs: Vec<OutputOption>,
        version: &str,
        kind: InterfaceKind,
    ) -> Result<Self, CommandError> {
        let definition = Self {
            command: command_ctor(),
            inputs,
            outputs,
            usage_examples,
            version: version.to_string(),
        };
        definition.validate(kind)?;
        Ok(definition)
    }

    fn validate(&self, kind: InterfaceKind) -> Result<(), CommandError> {
        let cmd_name = self.command.name();
        let mut names = HashSet::new();
        let mut long_names = HashSet::new();
        let mut bound = HashSet::new();

        for option in &self.inputs {
            if option.kind() != kind {
                return Err(CommandError::configuration(format!(
                    "Option '{}' of command '{}' is a {} option, expected {}.",
                    option.name(),
                    cmd_name,
                    option.kind(),
                    kind
                )));
            }
            if !names.insert(option.name()) || !long_names.insert(option.long_name()) {
                return Err(CommandError::configuration(format!(
                    "Command '{}' declares option '{}' more than once.",
                    cmd_name,
                    option.name()
                )));
            }
            if let Some(parameter) = option.parameter_name() {
                if !self.command.inputs().contains(parameter) {
                    return Err(CommandError::configuration(format!(
                        "Option '{}' is bound to '{}', which is not an input of command '{}'.",
                        option.name(),
                        parameter,
                        cmd_name
                    )));
                }
                if !bound.insert(parameter) {
                    return Err(CommandError::configuration(format!(
                        "More than one option maps to parameter '{}' of command '{}'.",
                        parameter, cmd_name
                    )));
                }
            }
        }

        let mut result_keys = HashSet::new();
        for output in &self.outputs {
            if output.kind() != kind {
                return Err(CommandError::configuration(format!(
                    "Output '{}' of command '{}' is a {} output, expected {}.",
                    output.result_key(),
                    cmd_name,
                    output.kind(),
                    kind
                )));
            }
            if !self.command.outputs().contains(output.result_key()) {
                return Err(CommandError::configuration(format!(
                    "Output '{}' is not a declared result of command '{}'.",
                    output.result_key(),
                    cmd_name
                )));
            }
            if !result_keys.insert(output.result_key()) {
                return Err(CommandError::configuration(format!(
                    "More than one output maps to result '{}' of command '{}'.",
                    output.result_key(),
                    cmd_name
                )));
            }

            let lookup = match output.category() {
                OutputCategory::Download {
                    filename_lookup, ..
                } => filename_lookup.as_deref(),
                _ => None,
            };
            for input_name in output.bound_input().into_iter().chain(lookup) {
                if !names.contains(input_name) {
                    return Err(CommandError::configuration(format!(
                        "Output '{}' refers to unknown input option '{}'.",
                        output.result_key(),
                        input_name
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn command(&self) -> &dyn Command {
        self.command.as_ref()
    }

    pub fn inputs(&self) -> &[InputOption] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[OutputOption] {
        &self.outputs
    }

    pub fn usage_examples(&self) -> &[UsageExample] {
        &self.usage_examples
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn required_inputs(&self) -> impl Iterator<Item = &InputOption> {
        self.inputs.iter().filter(|o| o.is_required())
    }
}

/// A front-end adapter around one command.
pub trait Interface: Sized {
    /// The front-end's native request shape.
    type RawInput;
    /// The front-end's native response shape.
    type Output;

    const KIND: InterfaceKind;

    /// Applies adapter-specific construction rules on top of the shared ones.
    fn from_definition(definition: InterfaceDefinition) -> Result<Self, CommandError>;

    fn definition(&self) -> &InterfaceDefinition;

    fn validate_raw_input(&self, raw: &Self::RawInput) -> Result<(), CommandError>;

    /// Converts the raw request into the command's keyword arguments. Values of
    /// unbound options stay inside the adapter for [`Interface::map_outputs`].
    fn map_inputs(&mut self, raw: Self::RawInput) -> Result<Values, Rejection>;

    fn map_outputs(&mut self, result: Values) -> anyhow::Result<Self::Output>;

    /// Runs one request through the whole adapter protocol.
    fn dispatch(&mut self, raw: Self::RawInput) -> Result<Self::Output, DispatchError> {
        if let Err(e) = self.validate_raw_input(&raw) {
            log::debug!("Raw input rejected: {}", e);
            return Err(DispatchError::invalid(e.to_string()));
        }

        let kwargs = self.map_inputs(raw).map_err(DispatchError::Rejected)?;
        log::debug!("Mapped command arguments: {:?}", kwargs);

        let cmd = self.definition().command();
        let args = match command::prepare(cmd, kwargs) {
            Ok(args) => args,
            Err(e) if e.is_request_error() => return Err(DispatchError::invalid(e.to_string())),
            Err(e) => return Err(DispatchError::Failed(e.into())),
        };
        let result = command::execute(cmd, &args).map_err(DispatchError::Failed)?;

        self.map_outputs(result).map_err(DispatchError::Failed)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! A small command shared by the adapter tests.

    use crate::{
        core::{
            command::Command,
            parameters::{Parameter, ParameterCollection},
        },
        models::{DataType, Values},
    };
    use lazy_static::lazy_static;
    use std::sync::atomic::{AtomicUsize, Ordering};

    pub(crate) static GREET_RUNS: AtomicUsize = AtomicUsize::new(0);

    lazy_static! {
        static ref GREET_INS: ParameterCollection = ParameterCollection::new(vec![
            Parameter::builder("name", DataType::Str, "who to greet")
                .required()
                .build()
                .unwrap(),
            Parameter::builder("times", DataType::Int, "how many greetings")
                .default(1i64)
                .validator(|v| v.as_int().is_none_or(|i| i > 0))
                .build()
                .unwrap(),
            Parameter::builder("tags", DataType::List, "extra tags")
                .build()
                .unwrap(),
        ])
        .unwrap();
        static ref GREET_OUTS: ParameterCollection = ParameterCollection::new(vec![
            Parameter::builder("result", DataType::Str, "the greeting")
                .build()
                .unwrap(),
            Parameter::builder("count", DataType::Int, "number of greetings")
                .build()
                .unwrap(),
        ])
        .unwrap();
    }

    /// Greets `name` `times` times and counts its runs.
    pub(crate) struct Greet;

    impl Command for Greet {
        fn name(&self) -> &str {
            "greet"
        }
        fn brief_description(&self) -> &str {
            "Greet someone"
        }
        fn long_description(&self) -> &str {
            "Greet someone a number of times."
        }
        fn inputs(&self) -> &ParameterCollection {
            &GREET_INS
        }
        fn outputs(&self) -> &ParameterCollection {
            &GREET_OUTS
        }
        fn run(&self, args: &Values) -> anyhow::Result<Values> {
            GREET_RUNS.fetch_add(1, Ordering::SeqCst);
            let name = args.require_str("name")?;
            let times = args.require("times")?.as_int().unwrap_or(1);
            let times = usize::try_from(times).unwrap_or(1);
            let mut greeting = vec![format!("Hello, {}!", name); times].join(" ");
            if let Some(tags) = args.optional_list("tags")? {
                greeting.push_str(&format!(" [{}]", tags.join(", ")));
            }
            Ok(Values::new()
                .with("result", greeting)
                .with("count", i64::try_from(times).unwrap_or_default()))
        }
    }

    pub(crate) fn greet() -> Box<dyn Command> {
        Box::new(Greet)
    }

    pub(crate) fn greet_runs() -> usize {
        GREET_RUNS.load(Ordering::SeqCst)
    }
}

// MARK: --- UNIT TESTS ---

#[cfg(test)]
mod tests {
    use super::test_support::{Greet, greet};
    use super::*;
    use crate::interface::cli::output_handlers::print_string;
    use crate::interface::options::InputType;

    fn greet_input(name: &str) -> InputOption {
        InputOption::bound(InterfaceKind::Cli, Greet.inputs().get(name).unwrap())
            .build()
            .unwrap()
    }

    fn define(inputs: Vec<InputOption>, outputs: Vec<OutputOption>) -> Result<InterfaceDefinition, CommandError> {
        InterfaceDefinition::new(greet, vec![], inputs, outputs, "0.1.0", InterfaceKind::Cli)
    }

    #[test]
    fn test_valid_definition() {
        let def = define(
            vec![greet_input("name"), greet_input("times")],
            vec![OutputOption::cli("result", print_string)],
        )
        .unwrap();
        assert_eq!(def.command().name(), "greet");
        assert_eq!(def.required_inputs().count(), 1);
    }

    #[test]
    fn test_two_options_for_one_parameter_fail() {
        let alias = InputOption::bound(InterfaceKind::Cli, Greet.inputs().get("name").unwrap())
            .name("who")
            .build()
            .unwrap();
        let err = define(vec![greet_input("name"), alias], vec![]).unwrap_err();
        assert!(matches!(err, CommandError::Configuration(msg) if msg.contains("More than one option")));
    }

    #[test]
    fn test_output_referencing_unknown_input_fails() {
        let err = define(
            vec![greet_input("name")],
            vec![OutputOption::cli("result", print_string).input_name("output-fp")],
        )
        .unwrap_err();
        assert!(matches!(err, CommandError::Configuration(msg) if msg.contains("output-fp")));
    }

    #[test]
    fn test_output_for_undeclared_result_fails() {
        let err = define(vec![], vec![OutputOption::cli("nope", print_string)]).unwrap_err();
        assert!(matches!(err, CommandError::Configuration(msg) if msg.contains("nope")));
    }

    #[test]
    fn test_kind_mismatch_fails() {
        let html = InputOption::unbound(InterfaceKind::Html, "extra", "extra field")
            .input_type(InputType::Str)
            .build()
            .unwrap();
        assert!(define(vec![html], vec![]).is_err());
    }
}
