// src/interface/factory.rs

use crate::{
    core::{command::CommandConstructor, error::CommandError},
    interface::{
        Interface, InterfaceDefinition,
        options::{InputOption, OutputOption},
    },
    models::UsageExample,
};
use std::{fmt, marker::PhantomData};

/// A ready-to-build interface of type `I` for one command.
///
/// The factory only holds the declaration; all checks run in [`InterfaceFactory::build`].
pub struct InterfaceFactory<I> {
    command: CommandConstructor,
    usage_examples: Vec<UsageExample>,
    inputs: Vec<InputOption>,
    outputs: Vec<OutputOption>,
    version: String,
    _interface: PhantomData<fn() -> I>,
}

/// Composes a command with its descriptors into an [`InterfaceFactory`].
pub fn make_interface<I: Interface>(
    command: CommandConstructor,
    usage_examples: Vec<UsageExample>,
    inputs: Vec<InputOption>,
    outputs: Vec<OutputOption>,
    version: &str,
) -> InterfaceFactory<I> {
    InterfaceFactory {
        command,
        usage_examples,
        inputs,
        outputs,
        version: version.to_string(),
        _interface: PhantomData,
    }
}

impl<I: Interface> InterfaceFactory<I> {
    /// Instantiates the interface, validating the whole declaration.
    pub fn build(&self) -> Result<I, CommandError> {
        let definition = InterfaceDefinition::new(
            self.command,
            self.usage_examples.clone(),
            self.inputs.clone(),
            self.outputs.clone(),
            &self.version,
            I::KIND,
        )?;
        I::from_definition(definition)
    }

    pub fn inputs(&self) -> &[InputOption] {
        &self.inputs
    }

    pub fn version(&self) -> &str {
        &self.version
    }
}

impl<I> fmt::Debug for InterfaceFactory<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterfaceFactory")
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .field("version", &self.version)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::command::Command;
    use crate::interface::cli::{CliInterface, output_handlers::print_string};
    use crate::interface::html::HtmlInterface;
    use crate::interface::options::InterfaceKind;
    use crate::interface::test_support::{Greet, greet};

    #[test]
    fn test_factory_builds_cli_interface() {
        let name = Greet.inputs().get("name").unwrap().clone();
        let factory = make_interface::<CliInterface>(
            greet,
            vec![UsageExample::new("Greet", "Greet Bob", "%prog --name Bob")],
            vec![InputOption::bound(InterfaceKind::Cli, &name).build().unwrap()],
            vec![OutputOption::cli("result", print_string)],
            "1.2.3",
        );
        let interface = factory.build().unwrap();
        assert_eq!(interface.definition().version(), "1.2.3");
        assert_eq!(factory.inputs().len(), 1);

        // Building twice yields independent interfaces.
        assert!(factory.build().is_ok());
    }

    #[test]
    fn test_factory_defers_validation_to_build() {
        // CLI interfaces need at least one usage example.
        let factory = make_interface::<CliInterface>(greet, vec![], vec![], vec![], "1.0");
        assert!(matches!(factory.build(), Err(CommandError::Configuration(_))));

        // HTML interfaces must not have any.
        let factory = make_interface::<HtmlInterface>(
            greet,
            vec![UsageExample::new("x", "y", "z")],
            vec![],
            vec![],
            "1.0",
        );
        assert!(matches!(factory.build(), Err(CommandError::Configuration(_))));
    }
}
