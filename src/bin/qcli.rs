// src/bin/qcli.rs

use anyhow::Result;
use clap::Parser;
use colored::*;
use qcli::{
    cli::{Cli, dispatcher},
    core::{config_loader, error::CommandError},
};

/// The main entry point of the `qcli` driver.
/// It sets up logging, parses the command name, dispatches to the command's
/// CLI interface and performs centralized error handling.
fn main() {
    env_logger::init();

    match run_cli(Cli::parse()) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            // A broken command or interface declaration is a bug in the driver, not in the input.
            if let Some(CommandError::Configuration(msg)) = e.downcast_ref::<CommandError>() {
                eprintln!("\n{}: {}", "Internal error".red().bold(), msg);
                std::process::exit(70);
            }
            eprintln!("\n{}: {:#}", "Error".red().bold(), e);
            std::process::exit(1);
        }
    }
}

fn run_cli(cli: Cli) -> Result<i32> {
    log::debug!("CLI args parsed: {:?}", cli);
    let settings = config_loader::load_settings()?;
    let (command, args) = cli.into_command();
    dispatcher::dispatch(command, args, &settings)
}
