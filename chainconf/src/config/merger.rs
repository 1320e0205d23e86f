//! Configuration composition.
//!
//! Sources are merged in caller order. Within each of the five collections
//! an incoming entry replaces an existing entry of the same name wholesale,
//! keeping the original position; new names are appended.

use crate::config::model::{Config, NamedCollection};

/// Merges configuration fragments, last one wins.
///
/// # Examples
///
/// ```
/// use chainconf::config::{Config, ConfigMerger};
///
/// let mut low = Config::default();
/// low.networks.insert("emulator", "127.0.0.1:3569".to_string());
/// low.networks.insert("testnet", "access.testnet:9000".to_string());
///
/// let mut high = Config::default();
/// high.networks.insert("emulator", "127.0.0.1:3570".to_string());
///
/// let mut result = low;
/// ConfigMerger::merge_into(&mut result, high);
/// assert_eq!(result.networks.get("emulator").unwrap(), "127.0.0.1:3570");
/// assert_eq!(result.networks.names().collect::<Vec<_>>(), ["emulator", "testnet"]);
/// ```
pub struct ConfigMerger;

impl ConfigMerger {
    /// Merge configurations in order, from lowest to highest precedence.
    #[must_use]
    pub fn merge<I>(configs: I) -> Config
    where
        I: IntoIterator<Item = Config>,
    {
        let mut result = Config::default();
        for config in configs {
            Self::merge_into(&mut result, config);
        }
        result
    }

    /// Merge `source` into `target` (source wins).
    ///
    /// # Merging Rules
    ///
    /// - Every collection is merged independently
    /// - Entries are replaced whole; accounts never merge field by field
    /// - A replaced entry keeps its position in `target`
    /// - Environment bindings follow the entry they belong to
    pub fn merge_into(target: &mut Config, mut source: Config) {
        let bindings = std::mem::take(&mut source.env_bindings);
        target
            .env_bindings
            .retain_entries(|section, name| !source.defines(section, name));
        target.env_bindings.extend(bindings);

        Self::merge_collection("networks", &mut target.networks, source.networks);
        Self::merge_collection("accounts", &mut target.accounts, source.accounts);
        Self::merge_collection("contracts", &mut target.contracts, source.contracts);
        Self::merge_collection("deployments", &mut target.deployments, source.deployments);
        Self::merge_collection("emulators", &mut target.emulators, source.emulators);
    }

    fn merge_collection<T>(
        kind: &str,
        target: &mut NamedCollection<T>,
        source: NamedCollection<T>,
    ) {
        for (name, entry) in source {
            if target.insert(name.as_str(), entry).is_some() {
                log::debug!("{kind}.{name} overridden by a later source");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::account::Account;
    use crate::config::environment::EnvironmentSubstitutor;
    use crate::config::model::{Contract, Emulator};
    use crate::config::schema::Fragment;
    use std::collections::HashMap;
    use std::path::Path;

    fn account(name: &str, address: &str) -> Account {
        Account::from_strings(
            name,
            address,
            "",
            "",
            "",
            "21c5dfdeb0ff03a7a73ef39788563b62c89adea67bbb21ab95e5f710bd1d40b7",
        )
        .unwrap()
    }

    #[test]
    fn test_merge_empty() {
        assert_eq!(ConfigMerger::merge(Vec::new()), Config::default());
    }

    #[test]
    fn test_merge_disjoint_accounts_is_union() {
        let first = Config::default().with_account(account("a", "f8d6e0586b0a20c7"));
        let second = Config::default().with_account(account("b", "f1d6e0586b0a20c7"));

        let result = ConfigMerger::merge([first, second]);
        assert_eq!(result.accounts.names().collect::<Vec<_>>(), ["a", "b"]);
    }

    #[test]
    fn test_merge_same_account_later_wins() {
        let first = Config::default().with_account(account("a", "f8d6e0586b0a20c7"));
        let second = Config::default().with_account(account("a", "f1d6e0586b0a20c7"));

        let result = ConfigMerger::merge([first, second]);
        assert_eq!(result.accounts.len(), 1);
        assert_eq!(
            result.accounts.get("a").unwrap().address.to_string(),
            "f1d6e0586b0a20c7"
        );
    }

    #[test]
    fn test_merge_replaces_contract_wholesale() {
        let mut first = Config::default();
        let mut aliased = Contract {
            source: "./NFT.cdc".to_string(),
            ..Default::default()
        };
        aliased
            .aliases
            .insert("testnet".to_string(), "631e88ae7f1d7c20".to_string());
        first.contracts.insert("NFT", aliased);

        let mut second = Config::default();
        second.contracts.insert(
            "NFT",
            Contract {
                source: "./other/NFT.cdc".to_string(),
                ..Default::default()
            },
        );

        let result = ConfigMerger::merge([first, second]);
        let contract = result.contracts.get("NFT").unwrap();
        assert_eq!(contract.source, "./other/NFT.cdc");
        assert!(contract.aliases.is_empty());
    }

    #[test]
    fn test_merge_keeps_position_of_replaced_entry() {
        let mut first = Config::default();
        first.emulators.insert(
            "default",
            Emulator {
                port: 3569,
                service_account: "a".to_string(),
            },
        );
        first.emulators.insert(
            "secondary",
            Emulator {
                port: 3570,
                service_account: "a".to_string(),
            },
        );

        let mut second = Config::default();
        second.emulators.insert(
            "extra",
            Emulator {
                port: 3571,
                service_account: "b".to_string(),
            },
        );
        second.emulators.insert(
            "default",
            Emulator {
                port: 4000,
                service_account: "b".to_string(),
            },
        );

        let result = ConfigMerger::merge([first, second]);
        assert_eq!(
            result.emulators.names().collect::<Vec<_>>(),
            ["default", "secondary", "extra"]
        );
        assert_eq!(result.emulators.get("default").unwrap().port, 4000);
    }

    #[test]
    fn test_merge_collections_are_independent() {
        let mut first = Config::default();
        first.networks.insert("emulator", "127.0.0.1:3569".to_string());
        let second = Config::default().with_account(account("a", "f8d6e0586b0a20c7"));

        let result = ConfigMerger::merge([first, second]);
        assert_eq!(result.networks.len(), 1);
        assert_eq!(result.accounts.len(), 1);
    }

    #[test]
    fn test_merge_bindings_follow_entries() {
        let mut fragment: Fragment = serde_json::from_str(
            r#"{"networks": {"emulator": "$EMULATOR_HOST", "testnet": "$TESTNET_HOST"}}"#,
        )
        .unwrap();
        let env = HashMap::from([
            ("EMULATOR_HOST".to_string(), "127.0.0.1:3569".to_string()),
            ("TESTNET_HOST".to_string(), "access.testnet:9000".to_string()),
        ]);

        let mut first = Config::default();
        first.networks.insert("emulator", "127.0.0.1:3569".to_string());
        first.networks.insert("testnet", "access.testnet:9000".to_string());
        first.env_bindings =
            EnvironmentSubstitutor::apply(&mut fragment, &env, Path::new("a.json")).unwrap();

        let mut second = Config::default();
        second.networks.insert("testnet", "localhost:9000".to_string());

        let result = ConfigMerger::merge([first, second]);
        assert_eq!(result.env_bindings.variables().collect::<Vec<_>>(), ["EMULATOR_HOST"]);
    }
}
