// src/cli/mod.rs

use clap::Parser;

pub mod dispatcher;

/// qcli: define a command once, run it from the command line or an HTML form.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about,
    styles = clap::builder::Styles::styled()
        .header(clap::builder::styling::AnsiColor::Yellow.on_default().bold())
        .usage(clap::builder::styling::AnsiColor::Yellow.on_default().bold())
        .literal(clap::builder::styling::AnsiColor::Cyan.on_default().bold())
        .placeholder(clap::builder::styling::AnsiColor::Green.on_default()),
)]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    /// The command to run followed by its options, e.g.
    /// `make-bash-completion --driver-name qcli -o out.sh`.
    /// Without a command, the available commands are listed.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

impl Cli {
    /// Splits the arguments into the command name and the command's own arguments.
    pub fn into_command(self) -> (Option<String>, Vec<String>) {
        let mut args = self.args.into_iter();
        let command = args.next();
        (command, args.collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_after_the_command_are_forwarded() {
        let cli = Cli::try_parse_from(["qcli", "make-bash-completion", "-h"]).unwrap();
        let (command, args) = cli.into_command();
        assert_eq!(command.as_deref(), Some("make-bash-completion"));
        assert_eq!(args, vec!["-h"]);
    }

    #[test]
    fn test_no_command() {
        let (command, args) = Cli::try_parse_from(["qcli"]).unwrap().into_command();
        assert!(command.is_none());
        assert!(args.is_empty());
    }
}
