//! Structural validation of resolved fragments.
//!
//! Validation runs after environment substitution and `fromFile`
//! resolution, and turns the raw strings of a [`ResolvedFragment`] into the
//! typed [`Config`] aggregate.

use std::path::Path;

use indexmap::IndexMap;

use crate::config::account::{
    Account, AccountKey, Address, HashAlgorithm, PrivateKey, SignatureAlgorithm,
    DEFAULT_HASH_ALGORITHM, DEFAULT_KEY_INDEX, DEFAULT_SIGNATURE_ALGORITHM,
};
use crate::config::model::{Config, Contract, ContractDeployment, Emulator};
use crate::config::resolver::{ResolvedAccount, ResolvedFragment};
use crate::config::schema::{
    AccountEntry, ContractEntry, DeploymentEntry, EmulatorEntry, InlineAccount,
};
use crate::error::{Error, FileChain, Result};

/// Validates a resolved fragment and builds its aggregate.
///
/// # Examples
///
/// ```
/// use chainconf::config::{ConfigValidator, ResolvedFragment};
/// use std::path::Path;
///
/// let resolved = ResolvedFragment {
///     fragment: serde_json::from_str(r#"{"networks": {"emulator": "127.0.0.1:3569"}}"#).unwrap(),
///     ..Default::default()
/// };
/// let config = ConfigValidator::validate(resolved, Path::new("flow.json")).unwrap();
/// assert_eq!(config.networks.get("emulator").unwrap(), "127.0.0.1:3569");
/// ```
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate every field of `resolved`, which was read from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFieldFormat`] for the first field that fails
    /// validation, naming the source and the dotted field path. Fields of a
    /// resolved account are reported against the referenced source.
    pub fn validate(resolved: ResolvedFragment, path: &Path) -> Result<Config> {
        let ResolvedFragment {
            fragment,
            references,
        } = resolved;
        let mut config = Config::default();

        for (name, host) in fragment.networks {
            Self::validate_network(path, &name, &host)?;
            config.networks.insert(name, host);
        }

        for (name, entry) in fragment.accounts {
            let inline = match entry {
                AccountEntry::Inline(inline) => inline,
                AccountEntry::FromFile(reference) => {
                    return Err(Error::UnresolvedReference {
                        account: name,
                        chain: FileChain::new(path, Path::new(&reference.from_file)),
                        reason: "reference was not resolved".to_string(),
                    });
                }
            };

            let account = match references.get(&name) {
                Some(resolved) => Self::validate_resolved_account(&name, &inline, resolved)?,
                None => Self::validate_account(path, &name, &name, &inline)?,
            };
            config.accounts.insert(name, account);
        }

        for (name, entry) in fragment.contracts {
            let contract = Self::validate_contract(path, &name, entry)?;
            config.contracts.insert(name, contract);
        }

        for (network, by_account) in fragment.deployments {
            let mut deployments = IndexMap::new();
            for (account, entries) in by_account {
                let contracts = entries
                    .into_iter()
                    .enumerate()
                    .map(|(i, entry)| {
                        Self::validate_deployment(
                            path,
                            &format!("deployments.{network}.{account}[{i}]"),
                            entry,
                        )
                    })
                    .collect::<Result<Vec<_>>>()?;
                deployments.insert(account, contracts);
            }
            config.deployments.insert(network, deployments);
        }

        for (name, entry) in fragment.emulators {
            let emulator = Self::validate_emulator(path, &name, entry)?;
            config.emulators.insert(name, emulator);
        }

        Ok(config)
    }

    /// Validate a network address.
    ///
    /// Only emptiness is checked; the host format is left to the client.
    fn validate_network(path: &Path, name: &str, host: &str) -> Result<()> {
        if host.trim().is_empty() {
            return Err(Error::invalid_field(
                path,
                format!("networks.{name}"),
                "network address cannot be empty",
            ));
        }
        Ok(())
    }

    fn validate_resolved_account(
        name: &str,
        inline: &InlineAccount,
        resolved: &ResolvedAccount,
    ) -> Result<Account> {
        let mut account =
            Self::validate_account(&resolved.source, name, &resolved.target_name, inline)?;
        account.reference = Some(resolved.reference.clone());
        Ok(account)
    }

    /// Validate an inline account.
    ///
    /// `field_name` is the entry name used in error paths, which differs
    /// from `name` when the account came from another source under
    /// `accountName`.
    fn validate_account(
        path: &Path,
        name: &str,
        field_name: &str,
        inline: &InlineAccount,
    ) -> Result<Account> {
        let field = |leaf: &str| format!("accounts.{field_name}.{leaf}");

        let address: Address = inline
            .address
            .parse()
            .map_err(|e: String| Error::invalid_field(path, field("address"), e))?;

        let sig_algo = match &inline.sig_algo {
            Some(value) => value
                .parse::<SignatureAlgorithm>()
                .map_err(|e| Error::invalid_field(path, field("sigAlgo"), e))?,
            None => DEFAULT_SIGNATURE_ALGORITHM,
        };

        let hash_algo = match &inline.hash_algo {
            Some(value) => value
                .parse::<HashAlgorithm>()
                .map_err(|e| Error::invalid_field(path, field("hashAlgo"), e))?,
            None => DEFAULT_HASH_ALGORITHM,
        };

        let private_key = PrivateKey::from_hex(&inline.key, sig_algo)
            .map_err(|e| Error::invalid_field(path, field("key"), e))?;

        Ok(Account {
            name: name.to_string(),
            address,
            key: AccountKey {
                index: inline.key_index.unwrap_or(DEFAULT_KEY_INDEX),
                sig_algo,
                hash_algo,
                private_key,
            },
            reference: None,
        })
    }

    fn validate_contract(path: &Path, name: &str, entry: ContractEntry) -> Result<Contract> {
        let (source, raw_aliases) = match entry {
            ContractEntry::Path(source) => (source, IndexMap::new()),
            ContractEntry::Detailed { source, aliases } => (source, aliases),
        };

        if source.trim().is_empty() {
            return Err(Error::invalid_field(
                path,
                format!("contracts.{name}.source"),
                "contract source cannot be empty",
            ));
        }

        let mut aliases = IndexMap::with_capacity(raw_aliases.len());
        for (network, address) in raw_aliases {
            let address: Address = address.parse().map_err(|e: String| {
                Error::invalid_field(path, format!("contracts.{name}.aliases.{network}"), e)
            })?;
            aliases.insert(network, address.to_string());
        }

        Ok(Contract { source, aliases })
    }

    fn validate_deployment(
        path: &Path,
        field: &str,
        entry: DeploymentEntry,
    ) -> Result<ContractDeployment> {
        let (name, args) = match entry {
            DeploymentEntry::Name(name) => (name, Vec::new()),
            DeploymentEntry::WithArgs { name, args } => (name, args),
        };

        if name.trim().is_empty() {
            return Err(Error::invalid_field(
                path,
                field,
                "contract name cannot be empty",
            ));
        }

        Ok(ContractDeployment { name, args })
    }

    fn validate_emulator(path: &Path, name: &str, entry: EmulatorEntry) -> Result<Emulator> {
        if entry.port == 0 {
            return Err(Error::invalid_field(
                path,
                format!("emulators.{name}.port"),
                "port must be between 1 and 65535",
            ));
        }

        if entry.service_account.trim().is_empty() {
            return Err(Error::invalid_field(
                path,
                format!("emulators.{name}.serviceAccount"),
                "service account cannot be empty",
            ));
        }

        Ok(Emulator {
            port: entry.port,
            service_account: entry.service_account,
        })
    }
}
