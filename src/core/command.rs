// src/core/command.rs

//! The interface-agnostic command contract and its dispatch cycle.
//!
//! Every invocation goes through the same four phases:
//!
//! 1. **Validate in**: required inputs present, no undeclared inputs, validators pass.
//! 2. **Default**: absent optional inputs are filled from their declared defaults.
//! 3. **Run**: the command's own logic. Its errors are logged and returned untouched.
//! 4. **Validate out**: the result carries exactly the declared outputs, each of the declared type.
//!
//! Interfaces that need to tell request errors apart from command failures call
//! [`prepare`] and [`execute`] separately; everyone else uses [`invoke`].

use crate::{
    core::{error::CommandError, parameters::ParameterCollection},
    models::{Value, Values},
};
use anyhow::Result;

/// Creates a fresh command for one invocation context.
pub type CommandConstructor = fn() -> Box<dyn Command>;

/// A unit of work with declared inputs and outputs.
///
/// Implementors only describe themselves and implement [`Command::run`]; the
/// validation around `run` is applied by [`invoke`].
pub trait Command {
    /// Stable identifier, used in logs and as the HTML route.
    fn name(&self) -> &str;

    /// One sentence description.
    fn brief_description(&self) -> &str;

    /// Longer, more detailed description shown in usage text.
    fn long_description(&self) -> &str {
        self.brief_description()
    }

    fn inputs(&self) -> &ParameterCollection;

    fn outputs(&self) -> &ParameterCollection;

    /// Executes the command. `args` holds every declared input, with defaults filled.
    fn run(&self, args: &Values) -> Result<Values>;
}

/// Runs the full dispatch cycle for `command`.
pub fn invoke(command: &dyn Command, kwargs: Values) -> Result<Values> {
    let args = prepare(command, kwargs)?;
    execute(command, &args)
}

/// Phases 1 and 2: validates `kwargs` against the command's inputs and fills defaults.
pub fn prepare(command: &dyn Command, mut kwargs: Values) -> Result<Values, CommandError> {
    let inputs = command.inputs();

    for parameter in inputs {
        match kwargs.get(parameter.name()) {
            None if parameter.is_required() => {
                return Err(CommandError::MissingParameter(parameter.name().to_string()));
            }
            Some(value) if !parameter.validate(value) => {
                return Err(CommandError::InvalidValue {
                    name: parameter.name().to_string(),
                    value: value.to_string(),
                });
            }
            _ => {}
        }
    }

    if let Some(unknown) = kwargs.keys().find(|key| !inputs.contains(key)) {
        return Err(CommandError::UnknownParameter(unknown.to_string()));
    }

    for parameter in inputs {
        if !kwargs.contains(parameter.name()) {
            let default = parameter.default().cloned().unwrap_or(Value::Null);
            kwargs.insert(parameter.name(), default);
        }
    }

    Ok(kwargs)
}

/// Phases 3 and 4: runs the command on already prepared arguments and checks the result.
pub fn execute(command: &dyn Command, args: &Values) -> Result<Values> {
    log::info!("Starting command: {}", command.name());

    let result = match command.run(args) {
        Ok(result) => result,
        Err(e) => {
            log::error!("Error executing command: {}: {:#}", command.name(), e);
            return Err(e);
        }
    };
    log::info!("Completed command: {}", command.name());

    validate_result(command.outputs(), &result).inspect_err(|e| {
        log::error!("Unsupported result for command: {}: {}", command.name(), e);
    })?;
    Ok(result)
}

fn validate_result(outputs: &ParameterCollection, result: &Values) -> Result<(), CommandError> {
    for parameter in outputs {
        let value = result
            .get(parameter.name())
            .ok_or_else(|| CommandError::UnknownParameter(parameter.name().to_string()))?;
        if !parameter.data_type().accepts(value) {
            return Err(CommandError::InvalidReturnType {
                name: parameter.name().to_string(),
                expected: parameter.data_type().to_string(),
                found: value.type_name().to_string(),
            });
        }
    }

    if let Some(extra) = result.keys().find(|key| !outputs.contains(key)) {
        return Err(CommandError::UnknownParameter(extra.to_string()));
    }
    Ok(())
}

// MARK: --- UNIT TESTS ---
