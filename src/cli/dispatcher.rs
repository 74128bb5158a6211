// src/cli/dispatcher.rs

use anyhow::{Result, anyhow};
use colored::*;

use crate::{
    commands::{bash_completion, serve_html},
    core::{config_loader::Settings, error::CommandError},
    interface::{Interface, cli::CliInterface, factory::InterfaceFactory, html::HtmlInterface},
};

// --- Command Definition and Registry ---

pub type CliConfig = fn() -> Result<InterfaceFactory<CliInterface>, CommandError>;
pub type HtmlConfig = fn() -> Result<InterfaceFactory<HtmlInterface>, CommandError>;

/// A command known to the driver and the interface configurations it ships with.
#[derive(Debug)]
pub struct CommandDefinition {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub cli: CliConfig,
    pub html: Option<HtmlConfig>,
}

/// The single source of truth for all commands. Commands appear in this order
/// in listings and completion scripts.
pub static COMMAND_REGISTRY: &[CommandDefinition] = &[
    CommandDefinition {
        name: "make-bash-completion",
        aliases: &["completion"],
        cli: bash_completion::cli_interface,
        html: Some(bash_completion::html_interface),
    },
    CommandDefinition {
        name: "serve-html-interface",
        aliases: &["serve"],
        cli: serve_html::cli_interface,
        html: None,
    },
];

/// Finds a command definition in the registry by its name or alias.
pub fn find_command(name: &str) -> Option<&'static CommandDefinition> {
    COMMAND_REGISTRY
        .iter()
        .find(|cmd| cmd.name == name || cmd.aliases.contains(&name))
}

/// Runs `command` with `args` through its CLI interface and returns the process exit code.
pub fn dispatch(command: Option<String>, args: Vec<String>, settings: &Settings) -> Result<i32> {
    log::debug!("Dispatching {:?} with args: {:?}", command, args);

    let Some(name) = command else {
        print_command_list(settings);
        return Ok(0);
    };

    let definition = find_command(&name).ok_or_else(|| {
        anyhow!(
            "Unrecognized command '{}'. Run '{}' to list the available commands.",
            name,
            settings.driver_name
        )
    })?;

    let prog = format!("{} {}", settings.driver_name, definition.name);
    let mut interface = (definition.cli)()?.build()?.with_prog(&prog);

    let outcome = interface.run(args);
    outcome.report();
    Ok(outcome.exit_code())
}

fn print_command_list(settings: &Settings) {
    println!("{}", format!("usage: {} <command> [options]", settings.driver_name).bold());
    println!("\nThe currently available commands are:");
    for definition in COMMAND_REGISTRY {
        let description = (definition.cli)()
            .and_then(|factory| factory.build())
            .map(|cli| cli.definition().command().brief_description().to_string())
            .unwrap_or_default();
        println!("  {:<24}{}", definition.name.cyan(), description);
    }
    println!(
        "\nSee '{} <command> -h' for more information on a specific command.",
        settings.driver_name
    );
}

// MARK: --- UNIT TESTS ---

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_command_by_name_and_alias() {
        assert_eq!(
            find_command("make-bash-completion").map(|c| c.name),
            Some("make-bash-completion")
        );
        assert_eq!(find_command("serve").map(|c| c.name), Some("serve-html-interface"));
        assert!(find_command("nope").is_none());
    }

    #[test]
    fn test_every_registered_configuration_builds() {
        for definition in COMMAND_REGISTRY {
            let cli = (definition.cli)().unwrap().build().unwrap();
            assert_eq!(cli.definition().command().name(), definition.name);
            if let Some(html) = definition.html {
                let html = html().unwrap().build().unwrap();
                assert_eq!(html.definition().command().name(), definition.name);
            }
        }
    }

    #[test]
    fn test_unknown_command_is_an_error() {
        let err = dispatch(Some("nope".into()), vec![], &Settings::default()).unwrap_err();
        assert!(err.to_string().contains("Unrecognized command 'nope'"));
    }

    #[test]
    fn test_dispatch_writes_completion_script() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("qcli.sh");
        let code = dispatch(
            Some("make-bash-completion".into()),
            vec![
                "--driver-name".into(),
                "qcli".into(),
                "-o".into(),
                out.to_str().unwrap().into(),
            ],
            &Settings::default(),
        )
        .unwrap();
        assert_eq!(code, 0);
        let script = std::fs::read_to_string(&out).unwrap();
        assert!(script.ends_with("complete -F _qcli_complete -f qcli\n\n"));
    }
}
