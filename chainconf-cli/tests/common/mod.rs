//! Common test utilities for CLI integration tests.
//!
//! This module provides shared helpers for CLI testing, including:
//! - Test environment setup with temporary directories
//! - Command builder helpers with an isolated home and working directory
//! - Test data fixtures

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Emulator service key used in fixtures.
#[allow(dead_code)]
pub const EMULATOR_KEY: &str = "21c5dfdeb0ff03a7a73ef39788563b62c89adea67bbb21ab95e5f710bd1d40b7";

/// A second valid key.
#[allow(dead_code)]
pub const ADMIN_KEY: &str = "dd72967fd2bd75234ae9037dd4694c1f00baad63a10c35172bf65fbb8ad74b47";

/// A complete configuration touching every collection.
#[allow(dead_code)]
pub const PROJECT_CONFIG: &str = r#"{
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
  "contracts": {
    "NonFungibleToken": "./cadence/contracts/NonFungibleToken.cdc"
  },
  "deployments": {
    "emulator": {
      "emulator-account": ["NonFungibleToken"]
    }
  },
  "emulators": {
    "default": { "port": 3569, "serviceAccount": "emulator-account" }
  }
}"#;

/// Test environment with isolated working and home directories.
///
/// This struct provides an isolated test environment with:
/// - A temporary directory used as the working directory
/// - A separate home directory so the global `~/flow.json` is controlled
/// - Helper methods for writing and reading configuration files
pub struct TestEnv {
    /// Temporary directory (kept alive for the duration of the test)
    #[allow(dead_code)]
    temp_dir: TempDir,
    /// Working directory for every command
    pub temp_path: PathBuf,
    /// Home directory seen by the binary
    pub home_dir: PathBuf,
}

#[allow(dead_code)]
impl TestEnv {
    /// Create a new test environment.
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let temp_path = temp_dir.path().join("project");
        let home_dir = temp_dir.path().join("home");
        std::fs::create_dir_all(&temp_path).expect("Failed to create project dir");
        std::fs::create_dir_all(&home_dir).expect("Failed to create home dir");

        Self {
            temp_dir,
            temp_path,
            home_dir,
        }
    }

    /// Get a command builder running in the project directory.
    ///
    /// Inherited chainconf environment variables are cleared so the host
    /// environment never leaks into a test.
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("chainconf").expect("Failed to find chainconf binary");
        cmd.current_dir(&self.temp_path)
            .env("HOME", &self.home_dir)
            .env_remove("CHAINCONF_CONFIG_PATH")
            .env_remove("CHAINCONF_LOG_MODE");
        cmd
    }

    /// Get the project path.
    pub fn path(&self) -> &Path {
        &self.temp_path
    }

    /// Write a file relative to the project directory, creating parents.
    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.temp_path.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        std::fs::write(&path, content).expect("Failed to write config file");
        path
    }

    /// Write the user-global `flow.json`.
    pub fn write_global(&self, content: &str) -> PathBuf {
        let path = self.home_dir.join("flow.json");
        std::fs::write(&path, content).expect("Failed to write global config");
        path
    }

    /// Read a file relative to the project directory as JSON.
    pub fn read_json(&self, name: &str) -> serde_json::Value {
        let content =
            std::fs::read_to_string(self.temp_path.join(name)).expect("Failed to read file");
        serde_json::from_str(&content).expect("File is not valid JSON")
    }

    /// Run `show` with extra arguments and parse stdout.
    pub fn show(&self, args: &[&str]) -> serde_json::Value {
        let output = self
            .command()
            .args(args)
            .arg("show")
            .output()
            .expect("Failed to run show command");

        assert!(
            output.status.success(),
            "Show failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );

        serde_json::from_slice(&output.stdout).expect("Show output is not JSON")
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds a single-account source.
#[allow(dead_code)]
pub fn account_source(name: &str, address: &str, key: &str) -> String {
    format!(r#"{{"accounts": {{"{name}": {{"address": "{address}", "key": "{key}"}}}}}}"#)
}
