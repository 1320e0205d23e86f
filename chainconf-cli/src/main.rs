//! Main entry point for the chainconf CLI.
//!
//! This is the command-line interface for the chainconf configuration engine.
//! It provides commands for working with project configuration:
//! - `show`: Print the merged configuration
//! - `validate`: Check that the configuration loads
//! - `add-account`: Add an account to a configuration file
//! - `remove-account`: Remove an account from a configuration file

use chainconf_cli::cli::{Cli, Command};
use chainconf_cli::utils::GlobalOptions;
use clap::Parser;

fn main() {
    let cli = Cli::parse();

    chainconf::init_logger(cli.verbose, cli.quiet);

    let global = GlobalOptions {
        quiet: cli.quiet,
        config_paths: cli.config_paths,
    };

    let result = match cli.command {
        Command::Show(cmd) => cmd.execute(&global),
        Command::Validate(cmd) => cmd.execute(&global),
        Command::AddAccount(cmd) => cmd.execute(&global),
        Command::RemoveAccount(cmd) => cmd.execute(&global),
    };

    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}
