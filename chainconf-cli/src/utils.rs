//! Utility functions for CLI operations.
//!
//! This module provides common utility functions used across CLI commands,
//! including loader construction, configuration loading and picking the
//! file a mutation writes to.

use crate::error::CliError;
use chainconf::config::{ConfigLoader, YamlFormat, LOCAL_CONFIG_FILE};
use chainconf::Config;
use std::path::PathBuf;

/// Global CLI options shared across all commands.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Suppress non-essential output.
    pub quiet: bool,

    /// Configuration files in composition order. Empty means default discovery.
    pub config_paths: Vec<PathBuf>,
}

/// Builds the loader used by every command.
///
/// The CLI accepts YAML sources alongside JSON.
pub fn loader() -> ConfigLoader {
    ConfigLoader::new().with_format(YamlFormat)
}

/// Load the merged configuration named by the global options.
///
/// With no `--config-path`, the local and global default files are used.
pub fn load_configuration(global: &GlobalOptions) -> Result<Config, CliError> {
    Ok(loader().load(global.config_paths.as_slice())?)
}

/// The file a mutation reads and writes.
///
/// This is the last `--config-path` given, or the local default file.
pub fn mutation_target(global: &GlobalOptions) -> PathBuf {
    global
        .config_paths
        .last()
        .cloned()
        .unwrap_or_else(|| PathBuf::from(LOCAL_CONFIG_FILE))
}
