//! Configuration system for chainconf.
//!
//! This module loads blockchain project configuration (networks, accounts,
//! contracts, deployments and emulators) from one or more sources and merges
//! them into a single [`Config`]. It supports:
//! - Pluggable source formats (JSON by default, YAML on request)
//! - `$VAR` environment substitution in any string value
//! - Indirect accounts that borrow their key from another file (`fromFile`)
//! - Structural validation of addresses, keys and algorithms
//!
//! # Composition
//!
//! Sources are merged in the order given; the last source wins for any
//! entry name it defines. With no paths, the project-local `flow.json` is
//! loaded first and the user-global `~/flow.json` second.
//!
//! # Examples
//!
//! Loading from default discovery:
//!
//! ```no_run
//! use chainconf::config::ConfigLoader;
//!
//! let config = ConfigLoader::new().load_default().unwrap();
//! for (name, account) in config.accounts.iter() {
//!     println!("{name}: {}", account.address);
//! }
//! ```
//!
//! Composing explicit sources with a private key file:
//!
//! ```
//! use chainconf::config::{ConfigLoader, MemoryFs};
//! use std::collections::HashMap;
//!
//! let fs = MemoryFs::new()
//!     .with_file("flow.json", r#"{
//!         "accounts": { "admin": { "fromFile": "private.json" } }
//!     }"#)
//!     .with_file("private.json", r#"{
//!         "accounts": { "admin": { "address": "f8d6e0586b0a20c7", "key": "$ADMIN_KEY" } }
//!     }"#);
//! let env = HashMap::from([(
//!     "ADMIN_KEY".to_string(),
//!     "21c5dfdeb0ff03a7a73ef39788563b62c89adea67bbb21ab95e5f710bd1d40b7".to_string(),
//! )]);
//!
//! let config = ConfigLoader::new()
//!     .with_reader(fs)
//!     .with_env(env)
//!     .load(&["flow.json"])
//!     .unwrap();
//!
//! let admin = config.accounts.get("admin").unwrap();
//! assert_eq!(admin.address.to_string(), "f8d6e0586b0a20c7");
//! assert!(admin.reference.is_some());
//! ```

pub mod account;
pub mod environment;
pub mod format;
pub mod loader;
pub mod merger;
pub mod model;
pub mod resolver;
pub mod schema;
pub mod source;
pub mod validator;

#[cfg(all(test, feature = "property-tests"))]
mod proptests;

// Re-export key types at module root
pub use account::{
    Account, AccountKey, AccountReference, Address, HashAlgorithm, PrivateKey,
    SignatureAlgorithm, ADDRESS_LENGTH, DEFAULT_HASH_ALGORITHM, DEFAULT_KEY_INDEX,
    DEFAULT_SIGNATURE_ALGORITHM,
};
pub use environment::{
    EnvBinding, EnvBindings, EnvSource, EnvironmentSubstitutor, FieldKey, ProcessEnv, Section,
};
pub use format::{ConfigFormat, FormatError, FormatRegistry, JsonFormat, YamlFormat};
pub use loader::{
    default_paths, global_path, ConfigLoader, ConfigSource, DiscoveryPaths, LOCAL_CONFIG_FILE,
};
pub use merger::ConfigMerger;
pub use model::{
    AccountDeployments, Accounts, Config, Contract, ContractDeployment, Contracts, Deployments,
    Emulator, Emulators, NamedCollection, Networks,
};
pub use resolver::{FromFileResolver, ResolvedAccount, ResolvedFragment};
pub use schema::{
    AccountEntry, ContractEntry, DeploymentEntry, EmulatorEntry, FileReference, Fragment,
    InlineAccount,
};
pub use source::{FileSystem, MemoryFs, SourceReader};
pub use validator::ConfigValidator;
