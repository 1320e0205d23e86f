//! CLI command implementations.
//!
//! This module contains the implementations of all CLI commands:
//! - `show`: Print the merged configuration as JSON
//! - `validate`: Load the configuration and report any error
//! - `add_account`: Add an account to the target file
//! - `remove_account`: Remove an account from the target file

pub mod add_account;
pub mod remove_account;
pub mod show;
pub mod validate;

pub use add_account::AddAccountCommand;
pub use remove_account::RemoveAccountCommand;
pub use show::ShowCommand;
pub use validate::ValidateCommand;
