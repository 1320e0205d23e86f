//! Resolution of `fromFile` account entries.
//!
//! An indirect account borrows its address and key from an account in
//! another source. The resolver loads that source through the same format
//! and environment handling as top-level sources, but the referenced source
//! never contributes anything else to the configuration.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::config::account::AccountReference;
use crate::config::environment::{EnvSource, EnvironmentSubstitutor};
use crate::config::format::FormatRegistry;
use crate::config::schema::{AccountEntry, FileReference, Fragment};
use crate::config::source::SourceReader;
use crate::error::{Error, FileChain, Result};

/// Where a resolved account came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAccount {
    /// The reference as written in the originating source.
    pub reference: AccountReference,
    /// The referenced source.
    pub source: PathBuf,
    /// Name of the account inside the referenced source.
    pub target_name: String,
}

/// A fragment whose accounts are all inline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedFragment {
    /// The fragment with every indirect account replaced by its target.
    pub fragment: Fragment,
    /// Local account name to provenance, for accounts that were indirect.
    pub references: HashMap<String, ResolvedAccount>,
}

/// Materializes indirect accounts.
///
/// Referenced sources are cached for the lifetime of the resolver, so one
/// resolver should be used per load.
pub struct FromFileResolver<'a> {
    reader: &'a dyn SourceReader,
    formats: &'a FormatRegistry,
    env: &'a dyn EnvSource,
    cache: HashMap<PathBuf, Fragment>,
}

impl<'a> FromFileResolver<'a> {
    /// Creates a resolver with an empty cache.
    #[must_use]
    pub fn new(
        reader: &'a dyn SourceReader,
        formats: &'a FormatRegistry,
        env: &'a dyn EnvSource,
    ) -> Self {
        Self {
            reader,
            formats,
            env,
            cache: HashMap::new(),
        }
    }

    /// Replaces every indirect account in `fragment`.
    ///
    /// `origin` is the path of the source `fragment` was parsed from;
    /// relative `fromFile` paths are resolved against its directory.
    ///
    /// # Errors
    ///
    /// - [`Error::ReferencedSource`] if a referenced source cannot be read,
    ///   parsed or substituted
    /// - [`Error::UnresolvedReference`] if the target account is missing or
    ///   is itself indirect
    pub fn resolve(&mut self, mut fragment: Fragment, origin: &Path) -> Result<ResolvedFragment> {
        let mut references = HashMap::new();

        for (name, entry) in &mut fragment.accounts {
            let AccountEntry::FromFile(reference) = entry else {
                continue;
            };

            let (inline, resolved) = self.resolve_account(name, reference, origin)?;
            log::debug!(
                "resolved account '{}' from {} ('{}')",
                name,
                resolved.source.display(),
                resolved.target_name
            );
            *entry = inline;
            references.insert(name.clone(), resolved);
        }

        Ok(ResolvedFragment {
            fragment,
            references,
        })
    }

    /// Number of referenced sources loaded so far.
    #[must_use]
    pub fn cached_sources(&self) -> usize {
        self.cache.len()
    }

    fn resolve_account(
        &mut self,
        name: &str,
        reference: &FileReference,
        origin: &Path,
    ) -> Result<(AccountEntry, ResolvedAccount)> {
        if reference.from_file.trim().is_empty() {
            return Err(Error::UnresolvedReference {
                account: name.to_string(),
                chain: FileChain::new(origin, Path::new("")),
                reason: "fromFile must name a file".to_string(),
            });
        }

        let target = Self::target_path(origin, &reference.from_file);
        let chain = FileChain::new(origin, &target);
        let target_name = reference
            .account_name
            .clone()
            .unwrap_or_else(|| name.to_string());

        let referenced = self
            .load_referenced(&target)
            .map_err(|source| Error::ReferencedSource {
                account: name.to_string(),
                chain: chain.clone(),
                source: Box::new(source),
            })?;

        match referenced.accounts.get(&target_name) {
            Some(AccountEntry::Inline(inline)) => Ok((
                AccountEntry::Inline(inline.clone()),
                ResolvedAccount {
                    reference: AccountReference {
                        from_file: reference.from_file.clone(),
                        account_name: reference.account_name.clone(),
                        source: target.clone(),
                    },
                    source: target,
                    target_name,
                },
            )),
            Some(AccountEntry::FromFile(nested)) => Err(Error::UnresolvedReference {
                account: name.to_string(),
                chain: chain.then(&Self::target_path(&target, &nested.from_file)),
                reason: format!(
                    "account '{target_name}' is itself a fromFile reference; only one level of indirection is supported"
                ),
            }),
            None => Err(Error::UnresolvedReference {
                account: name.to_string(),
                chain,
                reason: format!("account '{target_name}' not found in referenced file"),
            }),
        }
    }

    fn load_referenced(&mut self, target: &Path) -> Result<&Fragment> {
        if self.cache.contains_key(target) {
            log::trace!("reusing cached source {}", target.display());
        } else {
            let bytes = self
                .reader
                .read(target)
                .map_err(|e| Error::io(target, e))?;

            let format = self.formats.for_path(target);
            log::debug!(
                "loading referenced source {} as {}",
                target.display(),
                format.name()
            );
            let mut fragment = format.parse(&bytes).map_err(|e| Error::MalformedSource {
                path: target.to_path_buf(),
                message: e.to_string(),
            })?;
            // A referenced source is never saved, so its bindings are dropped.
            EnvironmentSubstitutor::apply(&mut fragment, self.env, target)?;

            self.cache.insert(target.to_path_buf(), fragment);
        }

        self.cache
            .get(target)
            .ok_or_else(|| Error::SourceNotFound {
                path: target.to_path_buf(),
            })
    }

    fn target_path(origin: &Path, from_file: &str) -> PathBuf {
        let from_file = Path::new(from_file);
        match origin.parent() {
            Some(dir) if from_file.is_relative() => dir.join(from_file),
            _ => from_file.to_path_buf(),
        }
    }
}
