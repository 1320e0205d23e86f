//! Environment variable substitution for configuration values.
//!
//! Any string value in a fragment whose entire content is `$NAME` is
//! replaced with the value of the environment variable `NAME`. There is no
//! partial interpolation: `"prefix-$NAME"` is left untouched.
//!
//! Every substitution is recorded as an [`EnvBinding`] so that saving a
//! configuration writes `$NAME` back instead of the resolved secret.

use std::collections::HashMap;
use std::env;
use std::fmt;
use std::path::Path;

use indexmap::IndexMap;
use serde_json::Value;

use crate::config::schema::{AccountEntry, ContractEntry, DeploymentEntry, Fragment};
use crate::error::{Error, Result};

/// Marker that starts an environment reference.
pub const ENV_MARKER: char = '$';

/// Source of environment variable values.
pub trait EnvSource: Send + Sync {
    /// Returns the value of `name`, or `None` when it is unset.
    fn var(&self, name: &str) -> Option<String>;
}

/// The process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        env::var(name).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Top-level collection of a configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    /// `networks`
    Networks,
    /// `accounts`
    Accounts,
    /// `contracts`
    Contracts,
    /// `deployments`
    Deployments,
    /// `emulators`
    Emulators,
}

impl Section {
    /// The key of this collection in a source.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Networks => "networks",
            Self::Accounts => "accounts",
            Self::Contracts => "contracts",
            Self::Deployments => "deployments",
            Self::Emulators => "emulators",
        }
    }
}

/// Location of a string value inside a source.
///
/// `entry` is the name of the top-level entry and `field` the path inside
/// it (empty when the entry itself is the value, as for networks).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldKey {
    /// Collection holding the entry.
    pub section: Section,
    /// Entry name inside the collection.
    pub entry: String,
    /// Path inside the entry.
    pub field: String,
}

impl FieldKey {
    fn new(section: Section, entry: &str, field: impl Into<String>) -> Self {
        Self {
            section,
            entry: entry.to_string(),
            field: field.into(),
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.section.name(), self.entry)?;
        if self.field.is_empty() {
            Ok(())
        } else if self.field.starts_with('[') {
            f.write_str(&self.field)
        } else {
            write!(f, ".{}", self.field)
        }
    }
}

/// A value that was read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvBinding {
    /// The variable name, without the `$` marker.
    pub variable: String,
    /// The value as it is written back when unchanged.
    pub value: String,
}

/// Fields of a configuration whose values came from `$NAME` references.
///
/// # Examples
///
/// ```
/// use chainconf::config::{EnvironmentSubstitutor, Fragment};
/// use std::collections::HashMap;
/// use std::path::Path;
///
/// let mut fragment: Fragment =
///     serde_json::from_str(r#"{"networks": {"testnet": "$TESTNET_HOST"}}"#).unwrap();
/// let env = HashMap::from([("TESTNET_HOST".to_string(), "access.testnet:9000".to_string())]);
///
/// let bindings = EnvironmentSubstitutor::apply(&mut fragment, &env, Path::new("flow.json")).unwrap();
/// assert_eq!(bindings.len(), 1);
/// assert_eq!(bindings.variables().collect::<Vec<_>>(), ["TESTNET_HOST"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvBindings {
    bindings: IndexMap<FieldKey, EnvBinding>,
}

impl EnvBindings {
    /// Returns the binding recorded for a field.
    #[must_use]
    pub fn get(&self, key: &FieldKey) -> Option<&EnvBinding> {
        self.bindings.get(key)
    }

    /// Names of the variables referenced, in source order.
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.bindings.values().map(|b| b.variable.as_str())
    }

    /// Number of substituted fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns true when nothing was substituted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Drops every binding of one entry.
    pub fn remove_entry(&mut self, section: Section, entry: &str) {
        self.bindings
            .retain(|key, _| !(key.section == section && key.entry == entry));
    }

    /// Keeps only the bindings whose entry `keep` accepts.
    pub fn retain_entries(&mut self, mut keep: impl FnMut(Section, &str) -> bool) {
        self.bindings.retain(|key, _| keep(key.section, &key.entry));
    }

    /// Adds `other`, replacing bindings of the same fields.
    pub fn extend(&mut self, other: Self) {
        self.bindings.extend(other.bindings);
    }

    /// Re-records each binding with the value found in `rendered`.
    ///
    /// Validation normalizes some values (addresses, keys, algorithm
    /// names); bindings are compared against the normalized text when
    /// saving. Fields absent from `rendered` are dropped.
    #[must_use]
    pub(crate) fn normalized(self, rendered: &mut Fragment) -> Self {
        let mut normalized = IndexMap::new();
        let _ = visit_fields(rendered, &mut |key, value| {
            if let Some(binding) = self.bindings.get(&key) {
                normalized.insert(
                    key,
                    EnvBinding {
                        variable: binding.variable.clone(),
                        value: value.clone(),
                    },
                );
            }
            Ok(())
        });
        Self {
            bindings: normalized,
        }
    }

    /// Writes `$NAME` back into every field still holding its bound value.
    pub(crate) fn restore(&self, fragment: &mut Fragment) {
        if self.bindings.is_empty() {
            return;
        }
        let _ = visit_fields(fragment, &mut |key, value| {
            if let Some(binding) = self.bindings.get(&key) {
                if *value == binding.value {
                    log::trace!("restoring ${} into {key}", binding.variable);
                    *value = format!("{ENV_MARKER}{}", binding.variable);
                }
            }
            Ok(())
        });
    }
}

/// Replaces `$NAME` references in a fragment.
///
/// # Examples
///
/// ```
/// use chainconf::config::{AccountEntry, EnvironmentSubstitutor, Fragment};
/// use std::collections::HashMap;
/// use std::path::Path;
///
/// let mut fragment: Fragment = serde_json::from_str(r#"{
///     "accounts": { "admin": { "address": "f8d6e0586b0a20c7", "key": "$ADMIN_KEY" } }
/// }"#).unwrap();
///
/// let env = HashMap::from([("ADMIN_KEY".to_string(), "abcd".to_string())]);
/// EnvironmentSubstitutor::apply(&mut fragment, &env, Path::new("flow.json")).unwrap();
///
/// let AccountEntry::Inline(admin) = &fragment.accounts["admin"] else { panic!() };
/// assert_eq!(admin.key, "abcd");
/// ```
pub struct EnvironmentSubstitutor;

impl EnvironmentSubstitutor {
    /// Substitute every environment reference in `fragment`, which was
    /// read from `path`.
    ///
    /// Map keys (entry names) are never substituted, only values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingEnvironmentVariable`] naming the variable,
    /// the source and the dotted field path of the first unset reference.
    pub fn apply(
        fragment: &mut Fragment,
        env: &dyn EnvSource,
        path: &Path,
    ) -> Result<EnvBindings> {
        let mut bindings = IndexMap::new();

        visit_fields(fragment, &mut |key, value| {
            let Some(variable) = Self::reference_name(value) else {
                return Ok(());
            };

            let resolved = env
                .var(variable)
                .ok_or_else(|| Error::MissingEnvironmentVariable {
                    variable: variable.to_string(),
                    field: key.to_string(),
                    path: path.to_path_buf(),
                })?;

            log::trace!("substituted ${variable} into {key}");
            let variable = variable.to_string();
            *value = resolved.clone();
            bindings.insert(
                key,
                EnvBinding {
                    variable,
                    value: resolved,
                },
            );
            Ok(())
        })?;

        Ok(EnvBindings { bindings })
    }

    /// Returns the variable name if `value` is a whole-value reference.
    ///
    /// The name must start with a letter or underscore and continue with
    /// letters, digits or underscores.
    #[must_use]
    pub fn reference_name(value: &str) -> Option<&str> {
        let name = value.strip_prefix(ENV_MARKER)?;
        let mut chars = name.chars();
        let first = chars.next()?;
        if !(first.is_ascii_alphabetic() || first == '_') {
            return None;
        }
        if chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            Some(name)
        } else {
            None
        }
    }
}

type FieldVisitor<'v> = dyn FnMut(FieldKey, &mut String) -> Result<()> + 'v;

/// Calls `f` for every string value of `fragment` that may hold a
/// reference, in source order.
fn visit_fields(fragment: &mut Fragment, f: &mut FieldVisitor<'_>) -> Result<()> {
    for (name, host) in &mut fragment.networks {
        f(FieldKey::new(Section::Networks, name, ""), host)?;
    }

    for (name, entry) in &mut fragment.accounts {
        let key = |field: &str| FieldKey::new(Section::Accounts, name, field);
        match entry {
            AccountEntry::Inline(inline) => {
                f(key("address"), &mut inline.address)?;
                f(key("key"), &mut inline.key)?;
                if let Some(sig_algo) = &mut inline.sig_algo {
                    f(key("sigAlgo"), sig_algo)?;
                }
                if let Some(hash_algo) = &mut inline.hash_algo {
                    f(key("hashAlgo"), hash_algo)?;
                }
            }
            AccountEntry::FromFile(reference) => {
                f(key("fromFile"), &mut reference.from_file)?;
                if let Some(account_name) = &mut reference.account_name {
                    f(key("accountName"), account_name)?;
                }
            }
        }
    }

    for (name, entry) in &mut fragment.contracts {
        let key = |field: &str| FieldKey::new(Section::Contracts, name, field);
        match entry {
            ContractEntry::Path(source) => f(key("source"), source)?,
            ContractEntry::Detailed { source, aliases } => {
                f(key("source"), source)?;
                for (network, address) in aliases {
                    f(key(&format!("aliases.{network}")), address)?;
                }
            }
        }
    }

    for (network, by_account) in &mut fragment.deployments {
        for (account, contracts) in by_account {
            for (i, entry) in contracts.iter_mut().enumerate() {
                let field = format!("{account}[{i}]");
                match entry {
                    DeploymentEntry::Name(name) => f(
                        FieldKey::new(Section::Deployments, network, format!("{field}.name")),
                        name,
                    )?,
                    DeploymentEntry::WithArgs { name, args } => {
                        f(
                            FieldKey::new(Section::Deployments, network, format!("{field}.name")),
                            name,
                        )?;
                        for (j, arg) in args.iter_mut().enumerate() {
                            visit_value(network, &format!("{field}.args[{j}]"), arg, f)?;
                        }
                    }
                }
            }
        }
    }

    for (name, emulator) in &mut fragment.emulators {
        f(
            FieldKey::new(Section::Emulators, name, "serviceAccount"),
            &mut emulator.service_account,
        )?;
    }

    Ok(())
}

/// Walks an opaque deployment argument, visiting string leaves.
fn visit_value(
    network: &str,
    field: &str,
    value: &mut Value,
    f: &mut FieldVisitor<'_>,
) -> Result<()> {
    match value {
        Value::String(s) => f(FieldKey::new(Section::Deployments, network, field), s),
        Value::Array(items) => {
            for (i, item) in items.iter_mut().enumerate() {
                visit_value(network, &format!("{field}[{i}]"), item, f)?;
            }
            Ok(())
        }
        Value::Object(map) => {
            for (key, item) in map.iter_mut() {
                visit_value(network, &format!("{field}.{key}"), item, f)?;
            }
            Ok(())
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => Ok(()),
    }
}
