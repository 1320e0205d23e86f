//! The configuration aggregate handed to the rest of the tool.
//!
//! A [`Config`] holds five named collections. Every collection keeps its
//! entries in first-seen order; replacing an entry keeps its position.

use indexmap::IndexMap;
use serde_json::Value;

use crate::config::account::Account;
use crate::config::environment::{EnvBindings, Section};
use crate::error::{Error, Result};

/// An insertion-ordered mapping from entry name to entry.
///
/// # Examples
///
/// ```
/// use chainconf::config::NamedCollection;
///
/// let mut networks = NamedCollection::new();
/// networks.insert("emulator", "127.0.0.1:3569".to_string());
/// networks.insert("testnet", "access.testnet:9000".to_string());
/// networks.insert("emulator", "127.0.0.1:3570".to_string());
///
/// assert_eq!(networks.names().collect::<Vec<_>>(), ["emulator", "testnet"]);
/// assert_eq!(networks.get("emulator").unwrap(), "127.0.0.1:3570");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedCollection<T> {
    entries: IndexMap<String, T>,
}

impl<T> Default for NamedCollection<T> {
    fn default() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }
}

impl<T> NamedCollection<T> {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an entry, replacing any entry with the same name in place.
    ///
    /// Returns the replaced entry, if any.
    pub fn insert(&mut self, name: impl Into<String>, entry: T) -> Option<T> {
        self.entries.insert(name.into(), entry)
    }

    /// Removes an entry, keeping the order of the remaining ones.
    pub fn remove(&mut self, name: &str) -> Option<T> {
        self.entries.shift_remove(name)
    }

    /// Looks an entry up by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&T> {
        self.entries.get(name)
    }

    /// Returns whether an entry with this name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Iterates entry names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Iterates `(name, entry)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> IntoIterator for NamedCollection<T> {
    type Item = (String, T);
    type IntoIter = indexmap::map::IntoIter<String, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Into<String>, T> FromIterator<(K, T)> for NamedCollection<T> {
    fn from_iter<I: IntoIterator<Item = (K, T)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Network name to `host:port` connection address.
pub type Networks = NamedCollection<String>;

/// Account name to account.
pub type Accounts = NamedCollection<Account>;

/// Contract name to contract.
pub type Contracts = NamedCollection<Contract>;

/// Network name to per-account deployment lists.
pub type Deployments = NamedCollection<AccountDeployments>;

/// Emulator name to emulator settings.
pub type Emulators = NamedCollection<Emulator>;

/// Account name to the contracts it deploys, in deployment order.
pub type AccountDeployments = IndexMap<String, Vec<ContractDeployment>>;

/// A contract source and its per-network aliases.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Contract {
    /// Path to the contract source file.
    pub source: String,
    /// Network name to the address where the contract already lives.
    pub aliases: IndexMap<String, String>,
}

impl Contract {
    /// Returns the alias address for a network, if one is configured.
    #[must_use]
    pub fn alias_for(&self, network: &str) -> Option<&str> {
        self.aliases.get(network).map(String::as_str)
    }
}

/// One contract in a deployment list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ContractDeployment {
    /// Name of the contract, as declared under `contracts`.
    pub name: String,
    /// Constructor arguments, passed through opaquely.
    pub args: Vec<Value>,
}

/// Emulator settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emulator {
    /// Port the emulator listens on.
    pub port: u16,
    /// Name of the account used as the service account.
    pub service_account: String,
}

/// The fully merged, fully resolved configuration.
///
/// Mutation helpers consume the value and return a new one.
///
/// # Examples
///
/// ```
/// use chainconf::config::{Account, Config};
///
/// let account = Account::from_strings(
///     "emulator-account",
///     "f8d6e0586b0a20c7",
///     "",
///     "",
///     "",
///     "21c5dfdeb0ff03a7a73ef39788563b62c89adea67bbb21ab95e5f710bd1d40b7",
/// )
/// .unwrap();
///
/// let config = Config::default().with_account(account);
/// assert_eq!(config.accounts.len(), 1);
///
/// let config = config.without_account("emulator-account").unwrap();
/// assert!(config.accounts.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Config {
    /// Configured networks.
    pub networks: Networks,
    /// Configured accounts.
    pub accounts: Accounts,
    /// Configured contracts.
    pub contracts: Contracts,
    /// Deployments by network.
    pub deployments: Deployments,
    /// Configured emulators.
    pub emulators: Emulators,
    /// Fields that were read from `$NAME` references; saving writes the
    /// reference back for every field still holding its bound value.
    pub env_bindings: EnvBindings,
}

impl Config {
    /// Returns a configuration with `account` added or replaced in place.
    #[must_use]
    pub fn with_account(mut self, account: Account) -> Self {
        self.env_bindings.remove_entry(Section::Accounts, &account.name);
        self.accounts.insert(account.name.clone(), account);
        self
    }

    /// Returns a configuration without the named account.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AccountNotFound`] if no such account exists.
    pub fn without_account(mut self, name: &str) -> Result<Self> {
        if self.accounts.remove(name).is_none() {
            return Err(Error::AccountNotFound {
                name: name.to_string(),
            });
        }
        self.env_bindings.remove_entry(Section::Accounts, name);
        Ok(self)
    }

    /// Returns whether the named entry exists in a collection.
    #[must_use]
    pub fn defines(&self, section: Section, name: &str) -> bool {
        match section {
            Section::Networks => self.networks.contains(name),
            Section::Accounts => self.accounts.contains(name),
            Section::Contracts => self.contracts.contains(name),
            Section::Deployments => self.deployments.contains(name),
            Section::Emulators => self.emulators.contains(name),
        }
    }

    /// Returns the account-to-contracts map for a network.
    #[must_use]
    pub fn deployments_for(&self, network: &str) -> Option<&AccountDeployments> {
        self.deployments.get(network)
    }

    /// Returns true when all five collections are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
            && self.accounts.is_empty()
            && self.contracts.is_empty()
            && self.deployments.is_empty()
            && self.emulators.is_empty()
    }
}
