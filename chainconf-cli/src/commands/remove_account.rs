//! Command to remove an account from a configuration file.

use crate::error::CliError;
use crate::utils::{loader, mutation_target, GlobalOptions};
use clap::Args;

/// Remove an account from the configuration file.
#[derive(Args)]
pub struct RemoveAccountCommand {
    /// Name of the account to remove
    #[arg(value_name = "NAME")]
    pub name: String,
}

impl RemoveAccountCommand {
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        if self.name.trim().is_empty() {
            return Err(CliError::InvalidArguments(
                "account name must not be empty".to_string(),
            ));
        }

        let target = mutation_target(global);
        let loader = loader();
        let config = loader.load(&[&target])?.without_account(&self.name)?;
        loader.save(&config, &target)?;

        if !global.quiet {
            println!("account removed");
        }
        Ok(())
    }
}
