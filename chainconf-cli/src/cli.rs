//! CLI structure and command definitions.
//!
//! This module defines the main CLI structure using clap's derive macros,
//! including global options and subcommands.

use crate::commands::{AddAccountCommand, RemoveAccountCommand, ShowCommand, ValidateCommand};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Inspect and edit blockchain project configuration.
#[derive(Parser)]
#[command(name = "chainconf")]
#[command(version, about = "Inspect and edit blockchain project configuration", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Configuration file to load; repeat to compose, later files win
    #[arg(
        short = 'f',
        long = "config-path",
        value_name = "PATH",
        global = true,
        env = "CHAINCONF_CONFIG_PATH",
        value_delimiter = ','
    )]
    pub config_paths: Vec<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand)]
pub enum Command {
    /// Print the merged configuration as JSON
    Show(ShowCommand),

    /// Load the configuration and report any error
    Validate(ValidateCommand),

    /// Add an account to the configuration file
    AddAccount(AddAccountCommand),

    /// Remove an account from the configuration file
    RemoveAccount(RemoveAccountCommand),
}
