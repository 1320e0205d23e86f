//! Source file schema definitions.
//!
//! This module defines the on-disk shape of a configuration source. A parsed
//! source is a [`Fragment`]: every value is still a raw string so that
//! environment references and `fromFile` indirections can be resolved before
//! structural validation turns it into a [`Config`](crate::config::Config).

use std::env;
use std::path::{Component, Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::config::account::{DEFAULT_HASH_ALGORITHM, DEFAULT_KEY_INDEX, DEFAULT_SIGNATURE_ALGORITHM};
use crate::config::model::{Config, ContractDeployment};

/// Partial configuration parsed from a single source.
///
/// All collections are optional in a source and default to empty.
///
/// # Examples
///
/// ```
/// use chainconf::config::{AccountEntry, Fragment};
///
/// let fragment: Fragment = serde_json::from_str(r#"{
///     "networks": { "emulator": "127.0.0.1:3569" },
///     "accounts": { "admin": { "fromFile": "private.json" } }
/// }"#).unwrap();
///
/// assert_eq!(fragment.networks["emulator"], "127.0.0.1:3569");
/// assert!(matches!(fragment.accounts["admin"], AccountEntry::FromFile(_)));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Fragment {
    /// Network name to `host:port`.
    #[serde(default)]
    pub networks: IndexMap<String, String>,

    /// Account entries, inline or indirect.
    #[serde(default)]
    pub accounts: IndexMap<String, AccountEntry>,

    /// Contract entries.
    #[serde(default)]
    pub contracts: IndexMap<String, ContractEntry>,

    /// Network name to account name to contracts.
    #[serde(default)]
    pub deployments: IndexMap<String, IndexMap<String, Vec<DeploymentEntry>>>,

    /// Emulator entries.
    #[serde(default)]
    pub emulators: IndexMap<String, EmulatorEntry>,
}

/// An account as written in a source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AccountEntry {
    /// Address and key carried in the source.
    Inline(InlineAccount),
    /// Data borrowed from another source.
    FromFile(FileReference),
}

/// Inline account fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineAccount {
    /// Account address, hex.
    pub address: String,
    /// Private key, hex.
    pub key: String,
    /// Key index on the account.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_index: Option<u32>,
    /// Signature algorithm name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sig_algo: Option<String>,
    /// Hash algorithm name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash_algo: Option<String>,
}

/// Indirect account fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileReference {
    /// Path of the source holding the real account.
    pub from_file: String,
    /// Account name inside that source; defaults to the local name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_name: Option<String>,
}

impl<'de> Deserialize<'de> for AccountEntry {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Error;

        #[derive(Deserialize)]
        #[serde(deny_unknown_fields, rename_all = "camelCase")]
        struct Helper {
            address: Option<String>,
            key: Option<String>,
            key_index: Option<u32>,
            sig_algo: Option<String>,
            hash_algo: Option<String>,
            from_file: Option<String>,
            account_name: Option<String>,
        }

        let helper = Helper::deserialize(deserializer)?;

        if let Some(from_file) = helper.from_file {
            let has_inline = helper.address.is_some()
                || helper.key.is_some()
                || helper.key_index.is_some()
                || helper.sig_algo.is_some()
                || helper.hash_algo.is_some();
            if has_inline {
                return Err(D::Error::custom(
                    "account entry cannot combine fromFile with inline account fields",
                ));
            }
            return Ok(AccountEntry::FromFile(FileReference {
                from_file,
                account_name: helper.account_name,
            }));
        }

        if helper.account_name.is_some() {
            return Err(D::Error::custom("accountName is only valid together with fromFile"));
        }

        let address = helper
            .address
            .ok_or_else(|| D::Error::custom("account entry needs either address and key, or fromFile"))?;
        let key = helper
            .key
            .ok_or_else(|| D::Error::custom("account entry needs either address and key, or fromFile"))?;

        Ok(AccountEntry::Inline(InlineAccount {
            address,
            key,
            key_index: helper.key_index,
            sig_algo: helper.sig_algo,
            hash_algo: helper.hash_algo,
        }))
    }
}

/// A contract as written in a source: a bare path or a detailed entry.
///
/// A detailed entry accepts only `source` and `aliases`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged, deny_unknown_fields)]
pub enum ContractEntry {
    /// Just the source path.
    Path(String),
    /// Source path with per-network aliases.
    Detailed {
        /// Path to the contract source.
        source: String,
        /// Network name to existing contract address.
        #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
        aliases: IndexMap<String, String>,
    },
}

/// One element of a deployment list: a contract name or a name with args.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum DeploymentEntry {
    /// Contract deployed without constructor arguments.
    Name(String),
    /// Contract deployed with constructor arguments.
    WithArgs {
        /// Contract name.
        name: String,
        /// Constructor arguments.
        #[serde(default)]
        args: Vec<Value>,
    },
}

/// An emulator as written in a source.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct EmulatorEntry {
    /// Listen port.
    pub port: u16,
    /// Service account name.
    pub service_account: String,
}

impl From<&Config> for Fragment {
    /// Converts an aggregate back into its source shape.
    ///
    /// Accounts that were loaded through `fromFile` are written back as
    /// references so their keys stay in the referenced source. Defaults are
    /// omitted.
    fn from(config: &Config) -> Self {
        let networks = config
            .networks
            .iter()
            .map(|(name, host)| (name.to_string(), host.clone()))
            .collect();

        let accounts = config
            .accounts
            .iter()
            .map(|(name, account)| {
                let entry = match &account.reference {
                    Some(reference) => AccountEntry::FromFile(FileReference {
                        from_file: reference.from_file.clone(),
                        account_name: reference.account_name.clone(),
                    }),
                    None => AccountEntry::Inline(InlineAccount {
                        address: account.address.to_string(),
                        key: account.key.private_key.to_hex(),
                        key_index: (account.key.index != DEFAULT_KEY_INDEX)
                            .then_some(account.key.index),
                        sig_algo: (account.key.sig_algo != DEFAULT_SIGNATURE_ALGORITHM)
                            .then(|| account.key.sig_algo.name().to_string()),
                        hash_algo: (account.key.hash_algo != DEFAULT_HASH_ALGORITHM)
                            .then(|| account.key.hash_algo.name().to_string()),
                    }),
                };
                (name.to_string(), entry)
            })
            .collect();

        let contracts = config
            .contracts
            .iter()
            .map(|(name, contract)| {
                let entry = if contract.aliases.is_empty() {
                    ContractEntry::Path(contract.source.clone())
                } else {
                    ContractEntry::Detailed {
                        source: contract.source.clone(),
                        aliases: contract.aliases.clone(),
                    }
                };
                (name.to_string(), entry)
            })
            .collect();

        let deployments = config
            .deployments
            .iter()
            .map(|(network, by_account)| {
                let by_account = by_account
                    .iter()
                    .map(|(account, contracts)| {
                        (
                            account.clone(),
                            contracts.iter().map(DeploymentEntry::from).collect(),
                        )
                    })
                    .collect();
                (network.to_string(), by_account)
            })
            .collect();

        let emulators = config
            .emulators
            .iter()
            .map(|(name, emulator)| {
                (
                    name.to_string(),
                    EmulatorEntry {
                        port: emulator.port,
                        service_account: emulator.service_account.clone(),
                    },
                )
            })
            .collect();

        Self {
            networks,
            accounts,
            contracts,
            deployments,
            emulators,
        }
    }
}

impl Fragment {
    /// Renders `config` for writing to `target`.
    ///
    /// Unlike the plain conversion, this is the shape that goes back to
    /// disk: `fromFile` paths are rewritten to reach the referenced source
    /// from the directory of `target`, and fields that were read from
    /// `$NAME` references get the reference back while they still hold
    /// the bound value.
    #[must_use]
    pub fn for_target(config: &Config, target: &Path) -> Self {
        let mut fragment = Self::from(config);
        let base = target.parent().unwrap_or_else(|| Path::new(""));

        for (name, entry) in &mut fragment.accounts {
            let AccountEntry::FromFile(reference) = entry else {
                continue;
            };
            let Some(source) = config
                .accounts
                .get(name)
                .and_then(|account| account.reference.as_ref())
                .map(|reference| reference.source.as_path())
            else {
                continue;
            };
            if base.join(&reference.from_file) != source {
                let rewritten = reference_path(source, base);
                log::debug!(
                    "rewriting fromFile of '{name}' from {} to {}",
                    reference.from_file,
                    rewritten.display()
                );
                reference.from_file = rewritten.to_string_lossy().into_owned();
            }
        }

        config.env_bindings.restore(&mut fragment);
        fragment
    }
}

/// Path that reaches `source` from the directory `base`.
///
/// Relative when both paths can be related without touching the
/// filesystem, absolute otherwise.
fn reference_path(source: &Path, base: &Path) -> PathBuf {
    if let Some(relative) = relative_to(source, base) {
        return relative;
    }
    if source.is_absolute() {
        return source.to_path_buf();
    }
    match env::current_dir() {
        Ok(cwd) => cwd.join(source),
        Err(_) => source.to_path_buf(),
    }
}

fn relative_to(path: &Path, base: &Path) -> Option<PathBuf> {
    if path.is_absolute() != base.is_absolute() {
        return None;
    }

    let path: Vec<Component<'_>> = path
        .components()
        .filter(|c| *c != Component::CurDir)
        .collect();
    let base: Vec<Component<'_>> = base
        .components()
        .filter(|c| *c != Component::CurDir)
        .collect();

    let common = path
        .iter()
        .zip(&base)
        .take_while(|(a, b)| a == b)
        .count();

    let mut relative = PathBuf::new();
    for component in &base[common..] {
        match component {
            Component::Normal(_) => relative.push(".."),
            // Climbing out of an unknown directory cannot be undone.
            _ => return None,
        }
    }
    relative.extend(&path[common..]);
    Some(relative)
}

impl From<&ContractDeployment> for DeploymentEntry {
    fn from(deployment: &ContractDeployment) -> Self {
        if deployment.args.is_empty() {
            Self::Name(deployment.name.clone())
        } else {
            Self::WithArgs {
                name: deployment.name.clone(),
                args: deployment.args.clone(),
            }
        }
    }
}
