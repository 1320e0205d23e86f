//! Build script for chainconf-cli.
//!
//! This script generates man pages at build time using clap_mangen.
//! The generated man page is placed in OUT_DIR for inclusion in release builds.
//!
//! Note: We build a minimal command structure here rather than importing from
//! the main crate, since build scripts cannot depend on the crate being built.

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::fs;
use std::path::PathBuf;

/// Build the CLI command structure for man page generation.
///
/// IMPORTANT: Keep this structure synchronized with src/cli.rs
fn build_cli() -> Command {
    Command::new("chainconf")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Inspect and edit blockchain project configuration")
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .help("Enable verbose output")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .help("Suppress non-essential output")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config-path")
                .short('f')
                .long("config-path")
                .help("Configuration file to load; repeat to compose, later files win")
                .value_name("PATH")
                .global(true)
                .action(ArgAction::Append)
                .value_delimiter(',')
                .env("CHAINCONF_CONFIG_PATH"),
        )
        .subcommands(vec![
            Command::new("show")
                .about("Print the merged configuration as JSON")
                .long_about("Load every configuration source, merge them and print the result"),
            Command::new("validate")
                .about("Load the configuration and report any error")
                .long_about("Check that every source parses, resolves and validates"),
            Command::new("add-account")
                .about("Add an account to the configuration file")
                .long_about("Add or replace an account in the last --config-path or ./flow.json"),
            Command::new("remove-account")
                .about("Remove an account from the configuration file")
                .long_about("Remove an account from the last --config-path or ./flow.json"),
        ])
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let out_dir = PathBuf::from(std::env::var("OUT_DIR")?);
    let man_dir = out_dir.join("man");
    fs::create_dir_all(&man_dir)?;

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();
    man.render(&mut buffer)?;

    fs::write(man_dir.join("chainconf.1"), buffer)?;

    println!("cargo:rerun-if-changed=src/cli.rs");
    println!("cargo:rerun-if-changed=src/commands/");
    Ok(())
}
