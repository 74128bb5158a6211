// src/commands/bash_completion.rs

//! `make-bash-completion`: writes a bash completion script for the driver,
//! offering command names first and each command's `--options` after it.

use crate::{
    cli::dispatcher::COMMAND_REGISTRY,
    core::{
        command::Command,
        error::CommandError,
        parameters::{Parameter, ParameterCollection},
    },
    interface::{
        cli::{CliInterface, output_handlers::write_string},
        factory::{InterfaceFactory, make_interface},
        html::{HtmlInterface, output_handlers::identity},
        options::{InputOption, InputType, InterfaceKind, OutputOption},
    },
    models::{DataType, UsageExample, Values},
};
use anyhow::Result;
use lazy_static::lazy_static;

const VERSION: &str = env!("CARGO_PKG_VERSION");

lazy_static! {
    static ref INPUTS: ParameterCollection = ParameterCollection::new(vec![
        Parameter::builder("driver_name", DataType::Str, "name of the driver script")
            .required()
            .build()
            .unwrap(),
    ])
    .unwrap();
    static ref OUTPUTS: ParameterCollection = ParameterCollection::new(vec![
        Parameter::builder("result", DataType::Str, "result bash completion script")
            .build()
            .unwrap(),
    ])
    .unwrap();
}

// Based on http://stackoverflow.com/questions/5302650/multi-level-bash-completion
const SCRIPT_TEMPLATE: &str = r#"_{driver}_complete()
{
  local cur prev

  COMPREPLY=()
  cur=${COMP_WORDS[COMP_CWORD]}
  prev=${COMP_WORDS[COMP_CWORD-1]}

  if [ $COMP_CWORD -gt 1 ]; then
    prev=${COMP_WORDS[1]}
  fi

  if [ $COMP_CWORD -eq 1 ]; then
    COMPREPLY=( $(compgen -W "{command_list}" -- $cur) )
  elif [ $COMP_CWORD -gt 1 ]; then
    case "$prev" in
{commands}      *)
        ;;
    esac
  fi

  return 0
} &&
complete -F _{driver}_complete -f {driver}
"#;

const COMMAND_TEMPLATE: &str = r#"      "{command}")
        COMPREPLY=( $(compgen -W "{options}" -- $cur) )
        ;;
"#;

#[derive(Debug)]
pub struct BashCompletion;

impl Command for BashCompletion {
    fn name(&self) -> &str {
        "make-bash-completion"
    }

    fn brief_description(&self) -> &str {
        "Construct a bash completion script"
    }

    fn long_description(&self) -> &str {
        "Construct a bash tab completion script that will search through available commands and options"
    }

    fn inputs(&self) -> &ParameterCollection {
        &INPUTS
    }

    fn outputs(&self) -> &ParameterCollection {
        &OUTPUTS
    }

    fn run(&self, args: &Values) -> Result<Values> {
        let driver = args.require_str("driver_name")?;

        let mut commands = Vec::with_capacity(COMMAND_REGISTRY.len());
        for definition in COMMAND_REGISTRY {
            let factory = (definition.cli)()?;
            let options = factory.inputs().iter().map(InputOption::long_name).collect();
            commands.push((definition.name, options));
        }

        Ok(Values::new().with("result", completion_script(driver, &commands)))
    }
}

pub fn constructor() -> Box<dyn Command> {
    Box::new(BashCompletion)
}

/// Renders the completion script for `driver`, given each command's long option names.
pub fn completion_script(driver: &str, commands: &[(&str, Vec<String>)]) -> String {
    let command_list = commands
        .iter()
        .map(|(name, _)| *name)
        .collect::<Vec<_>>()
        .join(" ");

    let mut cases = String::new();
    for (name, options) in commands {
        let mut flags: Vec<String> = options.iter().map(|o| format!("--{}", o)).collect();
        flags.sort();
        cases.push_str(
            &COMMAND_TEMPLATE
                .replace("{command}", name)
                .replace("{options}", &flags.join(" ")),
        );
    }

    SCRIPT_TEMPLATE
        .replace("{driver}", driver)
        .replace("{command_list}", &command_list)
        .replace("{commands}", &cases)
}

// --- INTERFACE CONFIGURATIONS ---

pub fn cli_interface() -> Result<InterfaceFactory<CliInterface>, CommandError> {
    let inputs = vec![
        InputOption::bound(InterfaceKind::Cli, INPUTS.get("driver_name")?).build()?,
        InputOption::unbound(InterfaceKind::Cli, "output-fp", "output filepath")
            .short_name('o')
            .input_type(InputType::NewFilepath)
            .required()
            .build()?,
    ];
    let outputs = vec![OutputOption::cli("result", write_string).input_name("output-fp")];
    let usage_examples = vec![UsageExample::new(
        "Create a bash completion script",
        "Create a bash completion script for use with a qcli driver",
        "%prog --driver-name qcli -o ~/.bash_completion.d/qcli",
    )];
    Ok(make_interface(constructor, usage_examples, inputs, outputs, VERSION))
}

pub fn html_interface() -> Result<InterfaceFactory<HtmlInterface>, CommandError> {
    let inputs = vec![
        InputOption::bound(InterfaceKind::Html, INPUTS.get("driver_name")?).build()?,
        InputOption::unbound(
            InterfaceKind::Html,
            "download-file",
            "The name of the bash completion script to download. (e.g. my_file)",
        )
        .required()
        .build()?,
    ];
    let outputs = vec![
        OutputOption::html_download("result", identity)
            .filename_lookup("download-file")
            .extension(".sh"),
    ];
    Ok(make_interface(constructor, Vec::new(), inputs, outputs, VERSION))
}

// MARK: --- UNIT TESTS ---

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::command::invoke;

    #[test]
    fn test_completion_script_layout() {
        let script = completion_script(
            "mydriver",
            &[
                ("b-cmd", vec!["zeta".into(), "alpha".into()]),
                ("a-cmd", vec![]),
            ],
        );
        assert!(script.starts_with("_mydriver_complete()\n{"));
        assert!(script.contains(r#"compgen -W "b-cmd a-cmd" -- $cur"#));
        assert!(script.contains("      \"b-cmd\")\n        COMPREPLY=( $(compgen -W \"--alpha --zeta\" -- $cur) )\n        ;;\n"));
        assert!(script.ends_with("complete -F _mydriver_complete -f mydriver\n"));
    }

    #[test]
    fn test_run_covers_the_registry() {
        let out = invoke(&BashCompletion, Values::new().with("driver_name", "qcli")).unwrap();
        let script = out.require_str("result").unwrap();
        assert!(script.contains("make-bash-completion serve-html-interface"));
        assert!(script.contains(r#"compgen -W "--driver-name --output-fp" -- $cur"#));
        assert!(script.contains(r#"compgen -W "--port" -- $cur"#));
    }

    #[test]
    fn test_interface_configurations_build() {
        assert!(cli_interface().unwrap().build().is_ok());
        assert!(html_interface().unwrap().build().is_ok());
    }

    #[test]
    fn test_driver_name_is_required() {
        let err = invoke(&BashCompletion, Values::new()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CommandError>(),
            Some(CommandError::MissingParameter(name)) if name == "driver_name"
        ));
    }
}
