// src/interface/cli/mod.rs

//! Command line interface adapter.
//!
//! The flag parser is generated at runtime from the interface's input options:
//! one `--long-name` per option, required options grouped under their own
//! heading, and positional arguments rejected.

pub mod input_handlers;
pub mod output_handlers;

use crate::{
    constants::{OPTIONAL_INPUT_LINE, REQUIRED_INPUT_LINE, REQUIRED_OPTIONS_HEADING},
    core::error::CommandError,
    interface::{
        DispatchError, Interface, InterfaceDefinition, Rejection,
        options::{Action, InputOption, InputType, InterfaceKind},
    },
    models::{Value, Values},
};
use anyhow::{Context, Result};
use clap::{
    Arg, ArgAction, ArgMatches, Command as ClapCommand,
    builder::PossibleValuesParser,
    error::ErrorKind,
    parser::ValueSource,
};
use colored::*;
use std::collections::HashSet;

/// Exit code for invalid or missing command line input.
pub const EXIT_USAGE: i32 = 2;
/// Exit code when no arguments were given to a command with required options.
pub const EXIT_NO_ARGUMENTS: i32 = 255;
/// Exit code for a command or output handler failure.
pub const EXIT_FAILURE: i32 = 1;

/// Adapts a command to command line flags.
#[derive(Debug)]
pub struct CliInterface {
    definition: InterfaceDefinition,
    prog: String,
    help_on_no_arguments: bool,
    /// Value of every option from the last parse, keyed by option name.
    option_values: Values,
}

/// The result of running a CLI interface, ready to be reported.
#[derive(Debug)]
pub enum CliOutcome {
    /// The command ran; holds what each output handler returned.
    Success(Values),
    /// Help or version text was requested.
    Info(String),
    /// Input was rejected. The command never ran. No errors means the
    /// command was called without arguments.
    Usage { usage: String, errors: Vec<String> },
    /// The command or an output handler failed.
    Failure(anyhow::Error),
}

impl CliOutcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliOutcome::Success(_) | CliOutcome::Info(_) => 0,
            CliOutcome::Usage { errors, .. } if errors.is_empty() => EXIT_NO_ARGUMENTS,
            CliOutcome::Usage { .. } => EXIT_USAGE,
            CliOutcome::Failure(_) => EXIT_FAILURE,
        }
    }

    /// Prints the outcome the way a terminal user expects it.
    pub fn report(&self) {
        match self {
            CliOutcome::Success(_) => {}
            CliOutcome::Info(text) => println!("{}", text.trim_end()),
            CliOutcome::Usage { usage, errors } => {
                eprintln!("{}", usage.trim_end());
                for error in errors {
                    eprintln!("\n{}: {}", "Error".red().bold(), error.trim_end());
                }
            }
            CliOutcome::Failure(e) => {
                eprintln!("\n{}: {:?}", "Error".red().bold(), e);
            }
        }
    }
}

impl CliInterface {
    /// Sets the program name shown in usage text and substituted for `%prog`.
    pub fn with_prog(mut self, prog: &str) -> Self {
        self.prog = prog.to_string();
        self
    }

    /// Whether an empty argument list prints usage when required options exist.
    pub fn with_help_on_no_arguments(mut self, enabled: bool) -> Self {
        self.help_on_no_arguments = enabled;
        self
    }

    /// Values of all options from the last parse, including unbound ones.
    pub fn option_values(&self) -> &Values {
        &self.option_values
    }

    /// Dispatches `args` (without the program name) and folds the result into a [`CliOutcome`].
    pub fn run(&mut self, args: Vec<String>) -> CliOutcome {
        match self.dispatch(args) {
            Ok(handled) => CliOutcome::Success(handled),
            Err(DispatchError::Rejected(Rejection::Informational(text))) => CliOutcome::Info(text),
            Err(DispatchError::Rejected(Rejection::Invalid(errors))) => CliOutcome::Usage {
                usage: self.usage(),
                errors,
            },
            Err(DispatchError::Failed(e)) => CliOutcome::Failure(e),
        }
    }

    /// Full usage text, as printed for `--help`.
    pub fn usage(&self) -> String {
        self.build_parser().render_help().to_string()
    }

    fn build_parser(&self) -> ClapCommand {
        let cmd = self.definition.command();
        let mut parser = ClapCommand::new(self.prog.clone())
            .no_binary_name(true)
            .version(self.definition.version().to_string())
            .about(cmd.long_description().to_string())
            .override_usage(self.usage_line())
            .after_help(self.examples_text());

        for option in self.definition.inputs() {
            parser = parser.arg(build_arg(option));
        }
        parser
    }

    /// `<prog> [options] {--a A -b/--bee BEE}`
    fn usage_line(&self) -> String {
        let required: Vec<String> = self
            .definition
            .required_inputs()
            .map(|o| format!("{} {}", flag_display(o), value_name(o)))
            .collect();
        if required.is_empty() {
            format!("{} [options]", self.prog)
        } else {
            format!("{} [options] {{{}}}", self.prog, required.join(" "))
        }
    }

    fn examples_text(&self) -> String {
        let examples: Vec<String> = self
            .definition
            .usage_examples()
            .iter()
            .map(|ex| ex.render(&self.prog))
            .collect();
        [
            OPTIONAL_INPUT_LINE.to_string(),
            REQUIRED_INPUT_LINE.to_string(),
            String::new(),
            "Example usage: ".to_string(),
            "Print help message and exit".to_string(),
            format!(" {} -h\n", self.prog),
            examples.join("\n\n"),
        ]
        .join("\n")
    }

    /// Reads one option's value from the parse, coerced and post-processed.
    /// `Ok(None)` means the option was not given on the command line.
    fn read_option(&self, option: &InputOption, matches: &ArgMatches) -> Result<Option<Value>, String> {
        let id = option.name();
        if matches.value_source(id) != Some(ValueSource::CommandLine) {
            return Ok(None);
        }

        let value = match option.action() {
            Action::StoreTrue => Value::Bool(true),
            Action::StoreFalse => Value::Bool(false),
            Action::Store => {
                let raw = matches.get_one::<String>(id).map(String::as_str).unwrap_or("");
                option.coerce(raw).map_err(|e| e.to_string())?
            }
            Action::Append => {
                let mut items = Vec::new();
                for raw in matches.get_many::<String>(id).into_iter().flatten() {
                    items.push(option.coerce(raw).map_err(|e| e.to_string())?.to_string());
                }
                Value::List(items)
            }
        };

        option
            .handle(value)
            .map(Some)
            .map_err(|e| format!("Option --{}: {:#}", option.long_name(), e))
    }
}

impl Interface for CliInterface {
    type RawInput = Vec<String>;
    type Output = Values;

    const KIND: InterfaceKind = InterfaceKind::Cli;

    fn from_definition(definition: InterfaceDefinition) -> Result<Self, CommandError> {
        if definition.usage_examples().is_empty() {
            return Err(CommandError::configuration(format!(
                "There are no usage examples associated with command '{}'.",
                definition.command().name()
            )));
        }
        check_flags(&definition)?;
        let prog = definition.command().name().to_string();
        Ok(Self {
            definition,
            prog,
            help_on_no_arguments: true,
            option_values: Values::new(),
        })
    }

    fn definition(&self) -> &InterfaceDefinition {
        &self.definition
    }

    fn validate_raw_input(&self, raw: &Vec<String>) -> Result<(), CommandError> {
        if let Some(bad) = raw.iter().find(|arg| arg.contains('\0')) {
            return Err(CommandError::TypeMismatch {
                name: "argv".to_string(),
                expected: "argument tokens".to_string(),
                found: format!("{:?}", bad),
            });
        }
        Ok(())
    }

    fn map_inputs(&mut self, raw: Vec<String>) -> Result<Values, Rejection> {
        self.option_values = Values::new();

        if self.help_on_no_arguments
            && raw.is_empty()
            && self.definition.required_inputs().next().is_some()
        {
            return Err(Rejection::Invalid(Vec::new()));
        }

        let matches = match self.build_parser().try_get_matches_from(raw) {
            Ok(matches) => matches,
            Err(e) => {
                let rendered = e.render().to_string();
                return Err(match e.kind() {
                    ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                        Rejection::Informational(rendered)
                    }
                    _ => Rejection::Invalid(vec![rendered]),
                });
            }
        };

        let mut kwargs = Values::new();
        let mut errors = Vec::new();
        for option in self.definition.inputs() {
            let value = match self.read_option(option, &matches) {
                Ok(value) => value,
                Err(message) => {
                    errors.push(message);
                    continue;
                }
            };

            match (value, option.parameter_name()) {
                (None, _) if option.is_required() => {
                    errors.push(format!("Required option --{} omitted.", option.long_name()));
                }
                (Some(value), Some(parameter)) => {
                    kwargs.insert(parameter, value.clone());
                    self.option_values.insert(option.name(), value);
                }
                (Some(value), None) => {
                    self.option_values.insert(option.name(), value);
                }
                (None, _) => {
                    // Bound parameters are defaulted by the command; outputs still see the default.
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

    fn map_outputs(&mut self, result: Values) -> Result<Values> {
        let mut handled = Values::new();
        for output in self.definition.outputs() {
            let key = output.result_key();
            let data = result
                .get(key)
                .ok_or_else(|| CommandError::UnknownParameter(key.to_string()))?;
            let option_value = output.bound_input().and_then(|name| self.option_values.get(name));
            let value = output
                .handle(data, option_value)
                .with_context(|| format!("Failed to handle output '{}'", key))?;
            handled.insert(key, value);
        }
        Ok(handled)
    }
}

/// Flags clap adds to every parser.
const RESERVED_LONG_NAMES: [&str; 2] = ["help", "version"];
const RESERVED_SHORT_NAMES: [char; 2] = ['h', 'V'];

/// Rejects flags clap would refuse when building the parser.
fn check_flags(definition: &InterfaceDefinition) -> Result<(), CommandError> {
    let cmd_name = definition.command().name();
    let mut shorts = HashSet::new();
    for option in definition.inputs() {
        let long_name = option.long_name();
        if RESERVED_LONG_NAMES.contains(&option.name()) || RESERVED_LONG_NAMES.contains(&long_name.as_str()) {
            return Err(CommandError::configuration(format!(
                "Option '{}' of command '{}' clashes with the built-in --{} flag.",
                option.name(),
                cmd_name,
                long_name
            )));
        }
        if let Some(short) = option.short_name() {
            if RESERVED_SHORT_NAMES.contains(&short) {
                return Err(CommandError::configuration(format!(
                    "Option '{}' of command '{}' cannot use the built-in -{} flag.",
                    option.name(),
                    cmd_name,
                    short
                )));
            }
            if !shorts.insert(short) {
                return Err(CommandError::configuration(format!(
                    "Command '{}' uses -{} for more than one option.",
                    cmd_name, short
                )));
            }
        }
    }
    Ok(())
}

/// Builds the clap argument for one input option.
fn build_arg(option: &InputOption) -> Arg {
    let mut arg = Arg::new(option.name().to_string())
        .long(option.long_name())
        .help(help_text(option));

    if let Some(short) = option.short_name() {
        arg = arg.short(short);
    }
    if option.is_required() {
        arg = arg.help_heading(REQUIRED_OPTIONS_HEADING);
    }

    arg = match option.action() {
        Action::Store => arg.action(ArgAction::Set).value_name(value_name(option)),
        Action::Append => arg.action(ArgAction::Append).value_name(value_name(option)),
        Action::StoreTrue => arg.action(ArgAction::SetTrue),
        Action::StoreFalse => arg.action(ArgAction::SetFalse),
    };

    if option.input_type() == InputType::Choice {
        if let Some(choices) = option.choices() {
            arg = arg.value_parser(PossibleValuesParser::new(choices.to_vec()));
        }
    }
    arg
}

fn help_text(option: &InputOption) -> String {
    let help = option.help().trim();
    if option.is_required() {
        if help.ends_with("[REQUIRED]") {
            help.to_string()
        } else {
            format!("{} [REQUIRED]", help)
        }
    } else {
        let default = option
            .default_description()
            .map(str::to_string)
            .or_else(|| option.default().map(Value::to_string))
            .unwrap_or_else(|| "None".to_string());
        format!("{} [default: {}]", help, default)
    }
}

fn flag_display(option: &InputOption) -> String {
    match option.short_name() {
        Some(short) => format!("-{}/--{}", short, option.long_name()),
        None => format!("--{}", option.long_name()),
    }
}

fn value_name(option: &InputOption) -> String {
    option.name().replace('-', "_").to_uppercase()
}

// MARK: --- UNIT TESTS ---
