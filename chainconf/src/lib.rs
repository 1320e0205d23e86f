#![deny(missing_docs, unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! # chainconf
//!
//! A configuration composition engine for blockchain project metadata.
//!
//! This library reads one or more configuration sources describing networks,
//! accounts, contracts, deployments and emulators, substitutes environment
//! references, resolves accounts whose keys live in separate files, validates
//! every field and merges the result into one [`Config`].
//!
//! ## Core Types
//!
//! - [`ConfigLoader`]: discovery, loading and saving
//! - [`Config`]: the merged configuration
//! - [`Error`], [`ErrorKind`] and [`Result`]: Error handling types
//! - [`init_logger`] and [`LogLevel`]: Logging infrastructure
//!
//! ## Examples
//!
//! ```
//! use chainconf::config::MemoryFs;
//! use chainconf::{ConfigLoader, ErrorKind};
//! use std::collections::HashMap;
//!
//! let fs = MemoryFs::new().with_file(
//!     "flow.json",
//!     r#"{"networks": {"emulator": "127.0.0.1:3569"}}"#,
//! );
//! let loader = ConfigLoader::new().with_reader(fs).with_env(HashMap::new());
//!
//! let config = loader.load(&["flow.json"]).unwrap();
//! assert_eq!(config.networks.get("emulator").unwrap(), "127.0.0.1:3569");
//!
//! let err = loader.load(&["missing.json"]).unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::SourceNotFound);
//! ```

pub mod config;
pub mod error;
pub mod logging;

// Re-export key types at crate root for convenience
pub use config::{default_paths, global_path, Config, ConfigLoader};
pub use error::{Error, ErrorKind, FileChain, Result};
pub use logging::{init_logger, LogLevel};
