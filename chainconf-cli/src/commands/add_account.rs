//! Command to add an account to a configuration file.

use crate::error::CliError;
use crate::utils::{loader, mutation_target, GlobalOptions};
use chainconf::config::Account;
use chainconf::{Config, Error};
use clap::Args;

/// Add an account to the configuration file.
///
/// The account replaces any existing account of the same name in place.
#[derive(Args)]
pub struct AddAccountCommand {
    /// Account name
    #[arg(long)]
    pub name: String,

    /// Account address (hex, optional 0x prefix)
    #[arg(long)]
    pub address: String,

    /// Private key (hex)
    #[arg(long)]
    pub key: String,

    /// Key index on the account
    #[arg(long, default_value = "0")]
    pub key_index: String,

    /// Signature algorithm
    #[arg(long, default_value = "ECDSA_P256")]
    pub sig_algo: String,

    /// Hash algorithm
    #[arg(long, default_value = "SHA3_256")]
    pub hash_algo: String,
}

impl AddAccountCommand {
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let account = Account::from_strings(
            &self.name,
            &self.address,
            &self.key_index,
            &self.sig_algo,
            &self.hash_algo,
            &self.key,
        )?;

        let target = mutation_target(global);
        let loader = loader();
        let config = match loader.load(&[&target]) {
            Ok(config) => config,
            Err(Error::SourceNotFound { .. }) => {
                log::info!("creating {}", target.display());
                Config::default()
            }
            Err(e) => return Err(e.into()),
        };

        let replaced = config.accounts.contains(&account.name);
        let config = config.with_account(account);
        loader.save(&config, &target)?;

        if replaced {
            log::debug!("replaced existing account '{}'", self.name);
        }
        if !global.quiet {
            println!("account added");
        }
        Ok(())
    }
}
