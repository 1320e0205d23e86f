//! Common test utilities for integration tests.
//!
//! This module provides fixture sources and environment helpers for testing
//! the chainconf library.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Key used by the emulator account fixtures.
pub const EMULATOR_KEY: &str = "21c5dfdeb0ff03a7a73ef39788563b62c89adea67bbb21ab95e5f710bd1d40b7";

/// A second, distinct key.
#[allow(dead_code)]
pub const ADMIN_KEY: &str = "3335dfdeb0ff03a7a73ef39788563b62c89adea67bbb21ab95e5f710bd1d40b7";

/// A complete source touching all five collections.
#[allow(dead_code)]
pub const FULL_SOURCE: &str = r#"{
    "emulators": {
        "default": {
            "port": 3569,
            "serviceAccount": "emulator-account"
        }
    },
    "contracts": {
        "NonFungibleToken": {
            "source": "./cadence/contracts/NonFungibleToken.cdc",
            "aliases": { "testnet": "631e88ae7f1d7c20" }
        },
        "KittyItems": "./cadence/contracts/KittyItems.cdc"
    },
    "networks": {
        "emulator": "127.0.0.1:3569",
        "testnet": "access.devnet.nodes.onflow.org:9000"
    },
    "accounts": {
        "emulator-account": {
            "address": "f8d6e0586b0a20c7",
            "key": "21c5dfdeb0ff03a7a73ef39788563b62c89adea67bbb21ab95e5f710bd1d40b7"
        }
    },
    "deployments": {
        "emulator": {
            "emulator-account": [
                "NonFungibleToken",
                { "name": "KittyItems", "args": [{ "type": "String", "value": "Kitty" }] }
            ]
        }
    }
}"#;

/// Builds a source holding a single inline account.
#[allow(dead_code)]
pub fn account_source(name: &str, address: &str, key: &str) -> String {
    format!(
        r#"{{
    "accounts": {{
        "{name}": {{
            "address": "{address}",
            "key": "{key}"
        }}
    }}
}}"#
    )
}

/// Writes `content` to `dir/filename` and returns the path.
#[allow(dead_code)]
pub fn create_temp_config(dir: &Path, filename: &str, content: &str) -> PathBuf {
    let path = dir.join(filename);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

/// RAII guard for setting and restoring environment variables.
///
/// Note: Tests using environment variables should not run in parallel.
/// Use #[serial] attribute or ensure tests clean up properly.
#[allow(dead_code)]
pub struct EnvGuard {
    key: String,
    old_value: Option<String>,
}

#[allow(dead_code)]
impl EnvGuard {
    /// Sets `key` to `value` until the guard is dropped.
    pub fn new(key: &str, value: &str) -> Self {
        let old_value = env::var(key).ok();
        env::set_var(key, value);
        Self {
            key: key.to_string(),
            old_value,
        }
    }

    /// Create a guard that removes the env var (useful for cleanup).
    pub fn remove(key: &str) -> Self {
        let old_value = env::var(key).ok();
        env::remove_var(key);
        Self {
            key: key.to_string(),
            old_value,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match &self.old_value {
            Some(val) => env::set_var(&self.key, val),
            None => env::remove_var(&self.key),
        }
    }
}

/// RAII guard that changes the working directory and restores it on drop.
#[allow(dead_code)]
pub struct CwdGuard {
    previous: PathBuf,
}

#[allow(dead_code)]
impl CwdGuard {
    /// Switches to `dir` until the guard is dropped.
    pub fn enter(dir: &Path) -> Self {
        let previous = env::current_dir().unwrap();
        env::set_current_dir(dir).unwrap();
        Self { previous }
    }
}

impl Drop for CwdGuard {
    fn drop(&mut self) {
        let _ = env::set_current_dir(&self.previous);
    }
}
