//! Command to print the merged configuration.

use crate::error::CliError;
use crate::utils::{load_configuration, GlobalOptions};
use chainconf::config::{Account, ContractDeployment};
use chainconf::Config;
use clap::Args;
use serde_json::{json, Map, Value};

/// Print the merged configuration as JSON.
#[derive(Args)]
pub struct ShowCommand {
    /// Include private keys in the output
    #[arg(long)]
    pub include_keys: bool,

    /// Print on a single line
    #[arg(long)]
    pub compact: bool,
}

impl ShowCommand {
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let config = load_configuration(global)?;
        let value = render(&config, self.include_keys);

        let output = if self.compact {
            serde_json::to_string(&value)?
        } else {
            serde_json::to_string_pretty(&value)?
        };
        println!("{output}");
        Ok(())
    }
}

fn render(config: &Config, include_keys: bool) -> Value {
    let networks: Map<String, Value> = config
        .networks
        .iter()
        .map(|(name, host)| (name.to_string(), Value::String(host.clone())))
        .collect();

    let accounts: Map<String, Value> = config
        .accounts
        .iter()
        .map(|(name, account)| (name.to_string(), render_account(account, include_keys)))
        .collect();

    let contracts: Map<String, Value> = config
        .contracts
        .iter()
        .map(|(name, contract)| {
            let value = json!({
                "source": contract.source,
                "aliases": contract.aliases,
            });
            (name.to_string(), value)
        })
        .collect();

    let deployments: Map<String, Value> = config
        .deployments
        .iter()
        .map(|(network, accounts)| {
            let accounts: Map<String, Value> = accounts
                .iter()
                .map(|(account, contracts)| {
                    let contracts = contracts.iter().map(render_deployment).collect();
                    (account.clone(), Value::Array(contracts))
                })
                .collect();
            (network.to_string(), Value::Object(accounts))
        })
        .collect();

    let emulators: Map<String, Value> = config
        .emulators
        .iter()
        .map(|(name, emulator)| {
            let value = json!({
                "port": emulator.port,
                "serviceAccount": emulator.service_account,
            });
            (name.to_string(), value)
        })
        .collect();

    json!({
        "networks": networks,
        "accounts": accounts,
        "contracts": contracts,
        "deployments": deployments,
        "emulators": emulators,
    })
}

fn render_account(account: &Account, include_keys: bool) -> Value {
    let mut value = json!({
        "address": account.address.to_string(),
        "keyIndex": account.key.index,
        "sigAlgo": account.key.sig_algo.name(),
        "hashAlgo": account.key.hash_algo.name(),
    });

    if include_keys {
        value["key"] = Value::String(account.key.private_key.to_hex());
    }
    if let Some(reference) = &account.reference {
        value["fromFile"] = Value::String(reference.from_file.clone());
        if let Some(account_name) = &reference.account_name {
            value["accountName"] = Value::String(account_name.clone());
        }
    }
    value
}

fn render_deployment(deployment: &ContractDeployment) -> Value {
    if deployment.args.is_empty() {
        Value::String(deployment.name.clone())
    } else {
        json!({
            "name": deployment.name,
            "args": deployment.args,
        })
    }
}
