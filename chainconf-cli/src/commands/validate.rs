//! Command to validate the configuration.

use crate::error::CliError;
use crate::utils::{load_configuration, GlobalOptions};
use clap::Args;

/// Load the configuration and report any error.
#[derive(Args)]
pub struct ValidateCommand {}

impl ValidateCommand {
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let config = load_configuration(global)?;

        if !global.quiet {
            println!(
                "Configuration is valid ({} networks, {} accounts, {} contracts, {} deployments, {} emulators)",
                config.networks.len(),
                config.accounts.len(),
                config.contracts.len(),
                config.deployments.len(),
                config.emulators.len(),
            );
        }
        Ok(())
    }
}
