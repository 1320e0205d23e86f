//! Configuration discovery, loading and saving.
//!
//! Every source goes through the same pipeline: read, parse, substitute
//! environment references, resolve `fromFile` accounts, validate, merge.
//! The first failure aborts the load and no partial configuration is
//! returned.

use std::path::{Path, PathBuf};

use crate::config::environment::{EnvSource, EnvironmentSubstitutor, ProcessEnv};
use crate::config::format::{ConfigFormat, FormatRegistry};
use crate::config::merger::ConfigMerger;
use crate::config::model::Config;
use crate::config::resolver::FromFileResolver;
use crate::config::schema::Fragment;
use crate::config::source::{FileSystem, SourceReader};
use crate::config::validator::ConfigValidator;
use crate::error::{Error, Result};

/// File name of both the project-local and the user-global source.
pub const LOCAL_CONFIG_FILE: &str = "flow.json";

/// Returns the user-global source path, `flow.json` in the home directory.
///
/// # Errors
///
/// Returns [`Error::HomeDirectoryUnavailable`] if the home directory
/// cannot be determined.
pub fn global_path() -> Result<PathBuf> {
    let home = home::home_dir().ok_or(Error::HomeDirectoryUnavailable)?;
    Ok(home.join(LOCAL_CONFIG_FILE))
}

/// Returns the default discovery paths, project-local first.
///
/// # Errors
///
/// Returns [`Error::HomeDirectoryUnavailable`] if the home directory
/// cannot be determined.
pub fn default_paths() -> Result<Vec<PathBuf>> {
    let discovery = DiscoveryPaths::detect()?;
    Ok(vec![discovery.local, discovery.global])
}

/// The two locations tried when no paths are given.
///
/// When both exist the global source is merged second and wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryPaths {
    /// Project-local source, relative to the working directory.
    pub local: PathBuf,
    /// User-global source.
    pub global: PathBuf,
}

impl DiscoveryPaths {
    /// Computes the default locations.
    ///
    /// # Errors
    ///
    /// Returns [`Error::HomeDirectoryUnavailable`] if the home directory
    /// cannot be determined.
    pub fn detect() -> Result<Self> {
        Ok(Self {
            local: PathBuf::from(LOCAL_CONFIG_FILE),
            global: global_path()?,
        })
    }
}

/// A loaded source and the configuration it contributed.
#[derive(Debug, Clone)]
pub struct ConfigSource {
    /// Path of the source.
    pub path: PathBuf,
    /// Validated configuration from this source alone.
    pub config: Config,
}

/// Loads and saves configuration.
///
/// # Examples
///
/// ```
/// use chainconf::config::{ConfigLoader, MemoryFs};
/// use std::collections::HashMap;
/// use std::path::PathBuf;
///
/// let fs = MemoryFs::new()
///     .with_file("base.json", r#"{"networks": {"emulator": "127.0.0.1:3569"}}"#)
///     .with_file("override.json", r#"{"networks": {"emulator": "127.0.0.1:3570"}}"#);
///
/// let loader = ConfigLoader::new()
///     .with_reader(fs)
///     .with_env(HashMap::new());
///
/// let config = loader
///     .load(&[PathBuf::from("base.json"), PathBuf::from("override.json")])
///     .unwrap();
/// assert_eq!(config.networks.get("emulator").unwrap(), "127.0.0.1:3570");
/// ```
pub struct ConfigLoader {
    reader: Box<dyn SourceReader>,
    env: Box<dyn EnvSource>,
    formats: FormatRegistry,
    discovery: Option<DiscoveryPaths>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Creates a loader over the real filesystem and process environment,
    /// reading JSON sources.
    #[must_use]
    pub fn new() -> Self {
        Self {
            reader: Box::new(FileSystem),
            env: Box::new(ProcessEnv),
            formats: FormatRegistry::default(),
            discovery: None,
        }
    }

    /// Replace the source reader.
    #[must_use]
    pub fn with_reader(mut self, reader: impl SourceReader + 'static) -> Self {
        self.reader = Box::new(reader);
        self
    }

    /// Replace the environment used for `$VAR` substitution.
    #[must_use]
    pub fn with_env(mut self, env: impl EnvSource + 'static) -> Self {
        self.env = Box::new(env);
        self
    }

    /// Register an additional format, selected by file extension.
    #[must_use]
    pub fn with_format(mut self, format: impl ConfigFormat + 'static) -> Self {
        self.formats.register(Box::new(format));
        self
    }

    /// Override the default discovery locations.
    #[must_use]
    pub fn with_discovery(mut self, discovery: DiscoveryPaths) -> Self {
        self.discovery = Some(discovery);
        self
    }

    /// Returns the format registry.
    #[must_use]
    pub fn formats(&self) -> &FormatRegistry {
        &self.formats
    }

    /// Load configuration from `paths`, or from default discovery when
    /// `paths` is empty.
    ///
    /// # Errors
    ///
    /// See [`load_explicit`](Self::load_explicit) and
    /// [`load_default`](Self::load_default).
    pub fn load<P: AsRef<Path>>(&self, paths: &[P]) -> Result<Config> {
        if paths.is_empty() {
            self.load_default()
        } else {
            self.load_explicit(paths)
        }
    }

    /// Load and merge every path in order. Each path must exist.
    ///
    /// # Errors
    ///
    /// Returns the first pipeline failure, e.g. [`Error::SourceNotFound`]
    /// for a missing path or [`Error::MalformedSource`] for a parse error.
    pub fn load_explicit<P: AsRef<Path>>(&self, paths: &[P]) -> Result<Config> {
        let sources = self.load_sources(paths.iter().map(|path| path.as_ref()))?;
        Ok(ConfigMerger::merge(sources.into_iter().map(|s| s.config)))
    }

    /// Load from the default locations, tolerating a missing one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingConfiguration`] naming both locations when
    /// neither exists, or the first pipeline failure.
    pub fn load_default(&self) -> Result<Config> {
        let discovery = match &self.discovery {
            Some(discovery) => discovery.clone(),
            None => DiscoveryPaths::detect()?,
        };

        let present: Vec<&Path> = [discovery.local.as_path(), discovery.global.as_path()]
            .into_iter()
            .filter(|path| {
                let exists = self.reader.exists(path);
                if !exists {
                    log::debug!("no configuration at {}", path.display());
                }
                exists
            })
            .collect();

        if present.is_empty() {
            return Err(Error::MissingConfiguration {
                local: discovery.local.clone(),
                global: discovery.global.clone(),
            });
        }

        let sources = self.load_sources(present)?;
        Ok(ConfigMerger::merge(sources.into_iter().map(|s| s.config)))
    }

    /// Run the pipeline for each path without merging.
    ///
    /// One `fromFile` cache is shared across all paths.
    ///
    /// # Errors
    ///
    /// Returns the first pipeline failure.
    pub fn load_sources<'p, I>(&self, paths: I) -> Result<Vec<ConfigSource>>
    where
        I: IntoIterator<Item = &'p Path>,
    {
        let mut resolver = FromFileResolver::new(&*self.reader, &self.formats, &*self.env);
        paths
            .into_iter()
            .map(|path| {
                let config = self.load_source(path, &mut resolver)?;
                Ok(ConfigSource {
                    path: path.to_path_buf(),
                    config,
                })
            })
            .collect()
    }

    fn load_source(&self, path: &Path, resolver: &mut FromFileResolver<'_>) -> Result<Config> {
        let bytes = self.reader.read(path).map_err(|e| Error::io(path, e))?;

        let format = self.formats.for_path(path);
        log::debug!("loading {} as {}", path.display(), format.name());

        let mut fragment = format.parse(&bytes).map_err(|e| Error::MalformedSource {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let bindings = EnvironmentSubstitutor::apply(&mut fragment, &*self.env, path)?;
        let resolved = resolver.resolve(fragment, path)?;
        let mut config = ConfigValidator::validate(resolved, path)?;
        config.env_bindings = bindings.normalized(&mut Fragment::from(&config));

        log::info!(
            "loaded {}: {} networks, {} accounts, {} contracts, {} deployments, {} emulators",
            path.display(),
            config.networks.len(),
            config.accounts.len(),
            config.contracts.len(),
            config.deployments.len(),
            config.emulators.len()
        );
        Ok(config)
    }

    /// Serialize `config` to `path` with the format chosen for that path.
    ///
    /// Accounts loaded through `fromFile` are written back as references
    /// that resolve from the directory of `path`. Fields loaded from `$NAME`
    /// references are written as the reference, not the value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SerializeFailed`] or an I/O error.
    pub fn save(&self, config: &Config, path: &Path) -> Result<()> {
        let format = self.formats.for_path(path);
        let fragment = Fragment::for_target(config, path);
        let bytes = format.serialize(&fragment).map_err(|e| Error::SerializeFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        self.reader.write(path, &bytes).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("saved configuration to {}", path.display());
        Ok(())
    }
}

impl std::fmt::Debug for ConfigLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigLoader")
            .field("formats", &self.formats)
            .field("discovery", &self.discovery)
            .finish_non_exhaustive()
    }
}
