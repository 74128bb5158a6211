// src/commands/serve_html.rs

//! `serve-html-interface`: serves the HTML form of every registered command.

use crate::{
    cli::dispatcher::COMMAND_REGISTRY,
    core::{
        command::Command,
        config_loader,
        error::CommandError,
        parameters::{Parameter, ParameterCollection},
    },
    interface::{
        cli::{CliInterface, output_handlers::print_string},
        factory::{InterfaceFactory, make_interface},
        html::router::Router,
        options::{InputOption, InterfaceKind, OutputOption},
    },
    models::{DataType, UsageExample, Value, Values},
    system::server,
};
use anyhow::{Context, Result};
use lazy_static::lazy_static;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn is_port(value: &Value) -> bool {
    value.as_int().is_none_or(|p| u16::try_from(p).is_ok_and(|p| p > 0))
}

lazy_static! {
    static ref INPUTS: ParameterCollection = ParameterCollection::new(vec![
        Parameter::builder("port", DataType::Int, "The port to run the server on")
            .default_description("the configured port (8080)")
            .validator(is_port)
            .build()
            .unwrap(),
    ])
    .unwrap();
    static ref OUTPUTS: ParameterCollection = ParameterCollection::new(vec![
        Parameter::builder("result", DataType::Str, "Signals the termination of the server")
            .build()
            .unwrap(),
    ])
    .unwrap();
}

#[derive(Debug)]
pub struct ServeHtmlInterface;

impl Command for ServeHtmlInterface {
    fn name(&self) -> &str {
        "serve-html-interface"
    }

    fn brief_description(&self) -> &str {
        "Start the HTML interface server"
    }

    fn long_description(&self) -> &str {
        "Start the HTML interface server for every command with an HTML configuration, on the given port"
    }

    fn inputs(&self) -> &ParameterCollection {
        &INPUTS
    }

    fn outputs(&self) -> &ParameterCollection {
        &OUTPUTS
    }

    fn run(&self, args: &Values) -> Result<Values> {
        let settings = config_loader::load_settings()?;
        let port = match args.get("port").and_then(Value::as_int) {
            Some(port) => u16::try_from(port).with_context(|| format!("Invalid port {}", port))?,
            None => settings.html.port,
        };

        let router = Router::new(COMMAND_REGISTRY, &settings.html.field_prefix);
        server::serve(port, &router)?;

        Ok(Values::new().with("result", "--Finished serving HTML interface--"))
    }
}

pub fn constructor() -> Box<dyn Command> {
    Box::new(ServeHtmlInterface)
}

pub fn cli_interface() -> Result<InterfaceFactory<CliInterface>, CommandError> {
    let inputs = vec![
        InputOption::bound(InterfaceKind::Cli, INPUTS.get("port")?)
            .short_name('p')
            .build()?,
    ];
    let outputs = vec![OutputOption::cli("result", print_string)];
    let usage_examples = vec![UsageExample::new(
        "Serve the HTML interface",
        "Serve every command's HTML form on port 8000",
        "%prog -p 8000",
    )];
    Ok(make_interface(constructor, usage_examples, inputs, outputs, VERSION))
}
