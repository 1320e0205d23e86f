//! Property-based tests for configuration composition and serialization.

use std::path::Path;

use super::account::Account;
use super::format::{ConfigFormat, JsonFormat};
use super::merger::ConfigMerger;
use super::model::{Config, Contract, ContractDeployment, Emulator};
use super::resolver::ResolvedFragment;
use super::schema::Fragment;
use super::validator::ConfigValidator;
use indexmap::IndexMap;
use proptest::prelude::*;

// Strategy for generating entry names
fn name_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,8}"
}

// Strategy for generating hex addresses
fn address_strategy() -> impl Strategy<Value = String> {
    prop::array::uniform8(any::<u8>()).prop_map(hex::encode)
}

// Strategy for generating inline accounts
fn account_strategy() -> impl Strategy<Value = Account> {
    (
        name_strategy(),
        address_strategy(),
        0u32..4,
        prop::sample::select(vec!["ECDSA_P256", "ECDSA_secp256k1"]),
        prop::sample::select(vec!["SHA2_256", "SHA3_256"]),
        prop::array::uniform32(any::<u8>()),
    )
        .prop_map(|(name, address, index, sig_algo, hash_algo, key)| {
            Account::from_strings(
                &name,
                &address,
                &index.to_string(),
                sig_algo,
                hash_algo,
                &hex::encode(key),
            )
            .unwrap()
        })
}

fn contract_strategy() -> impl Strategy<Value = Contract> {
    (
        "\\./[A-Za-z]{1,10}\\.cdc",
        prop::collection::vec((name_strategy(), address_strategy()), 0..3),
    )
        .prop_map(|(source, aliases)| Contract {
            source,
            aliases: aliases.into_iter().collect(),
        })
}

fn deployments_strategy() -> impl Strategy<Value = IndexMap<String, Vec<ContractDeployment>>> {
    prop::collection::vec(
        (
            name_strategy(),
            prop::collection::vec(("[A-Z][a-z]{0,8}", prop::option::of("[a-z]{1,5}")), 0..3),
        ),
        0..3,
    )
    .prop_map(|accounts| {
        accounts
            .into_iter()
            .map(|(account, contracts)| {
                let contracts = contracts
                    .into_iter()
                    .map(|(name, arg)| ContractDeployment {
                        name,
                        args: arg.map(serde_json::Value::String).into_iter().collect(),
                    })
                    .collect();
                (account, contracts)
            })
            .collect()
    })
}

// Strategy for generating whole configurations
fn config_strategy() -> impl Strategy<Value = Config> {
    (
        prop::collection::vec((name_strategy(), "[a-z.]{1,12}:[0-9]{2,5}"), 0..4),
        prop::collection::vec(account_strategy(), 0..4),
        prop::collection::vec((name_strategy(), contract_strategy()), 0..4),
        prop::collection::vec((name_strategy(), deployments_strategy()), 0..3),
        prop::collection::vec((name_strategy(), 1u16..=65535, name_strategy()), 0..3),
    )
        .prop_map(|(networks, accounts, contracts, deployments, emulators)| {
            let mut config = Config {
                networks: networks.into_iter().collect(),
                contracts: contracts.into_iter().collect(),
                deployments: deployments.into_iter().collect(),
                emulators: emulators
                    .into_iter()
                    .map(|(name, port, service_account)| {
                        (name, Emulator { port, service_account })
                    })
                    .collect(),
                ..Default::default()
            };
            for account in accounts {
                config = config.with_account(account);
            }
            config
        })
}

fn names<T>(collection: &super::model::NamedCollection<T>) -> Vec<String> {
    collection.names().map(str::to_string).collect()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 1000,
        max_shrink_iters: 10000,
        .. ProptestConfig::default()
    })]

    // Every name from either side survives, and overlapping names take the later entry
    #[test]
    fn merge_later_source_wins(low in config_strategy(), high in config_strategy()) {
        let mut result = low.clone();
        ConfigMerger::merge_into(&mut result, high.clone());

        for (name, account) in high.accounts.iter() {
            prop_assert_eq!(result.accounts.get(name), Some(account));
        }
        for (name, account) in low.accounts.iter() {
            if !high.accounts.contains(name) {
                prop_assert_eq!(result.accounts.get(name), Some(account));
            }
        }
        for (name, host) in high.networks.iter() {
            prop_assert_eq!(result.networks.get(name), Some(host));
        }
    }

    // Existing names keep their position; new names follow in source order
    #[test]
    fn merge_preserves_first_seen_order(low in config_strategy(), high in config_strategy()) {
        let mut result = low.clone();
        ConfigMerger::merge_into(&mut result, high.clone());

        let mut expected = names(&low.contracts);
        for name in names(&high.contracts) {
            if !expected.contains(&name) {
                expected.push(name);
            }
        }
        prop_assert_eq!(names(&result.contracts), expected);
    }

    // Empty config is identity element for merge
    #[test]
    fn merge_identity(config in config_strategy()) {
        let mut merged = config.clone();
        ConfigMerger::merge_into(&mut merged, Config::default());
        prop_assert_eq!(&merged, &config);

        let mut merged = Config::default();
        ConfigMerger::merge_into(&mut merged, config.clone());
        prop_assert_eq!(merged, config);
    }

    // Merging is associative
    #[test]
    fn merge_associative(a in config_strategy(), b in config_strategy(), c in config_strategy()) {
        let left = ConfigMerger::merge([a.clone(), b.clone(), c.clone()]);

        let mut b_merge_c = b;
        ConfigMerger::merge_into(&mut b_merge_c, c);
        let mut right = a;
        ConfigMerger::merge_into(&mut right, b_merge_c);

        prop_assert_eq!(left, right);
    }

    // Serializing and re-reading preserves all five collections
    #[test]
    fn json_serialization_round_trip(config in config_strategy()) {
        let bytes = JsonFormat.serialize(&Fragment::from(&config)).unwrap();
        let fragment = JsonFormat.parse(&bytes).unwrap();
        let resolved = ResolvedFragment { fragment, ..Default::default() };
        let reloaded = ConfigValidator::validate(resolved, Path::new("flow.json")).unwrap();

        prop_assert_eq!(reloaded, config);
    }
}
