//! Error types for the chainconf library.
//!
//! Every stage of the loading pipeline reports failures through the single
//! [`Error`] enum defined here, using `thiserror` for the display and source
//! plumbing. Messages are written to be shown to an end user verbatim.

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type alias for operations that may fail with a chainconf error.
///
/// # Examples
///
/// ```
/// use chainconf::{Error, Result};
///
/// fn example_operation() -> Result<usize> {
///     Ok(2)
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the chainconf library.
#[derive(Debug, Error)]
pub enum Error {
    /// Default discovery found neither the local nor the global source.
    #[error(
        "missing configuration: no configuration found at {} or {}",
        local.display(),
        global.display()
    )]
    MissingConfiguration {
        /// The project-local path that was tried.
        local: PathBuf,
        /// The user-global path that was tried.
        global: PathBuf,
    },

    /// An explicitly named source does not exist.
    #[error("configuration source not found: {}", path.display())]
    SourceNotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// A source could not be parsed by its format parser.
    #[error("malformed configuration in {}: {message}", path.display())]
    MalformedSource {
        /// The source being parsed.
        path: PathBuf,
        /// The underlying syntax error.
        message: String,
    },

    /// A `$VAR` reference named an unset environment variable.
    #[error(
        "environment variable '{variable}' referenced by '{field}' in {} is not set",
        path.display()
    )]
    MissingEnvironmentVariable {
        /// The variable name, without the `$` marker.
        variable: String,
        /// Dotted path of the field holding the reference.
        field: String,
        /// The source containing the reference.
        path: PathBuf,
    },

    /// A `fromFile` account could not be materialized.
    #[error("unresolved reference for account '{account}' ({chain}): {reason}")]
    UnresolvedReference {
        /// The referencing account.
        account: String,
        /// The files involved, in reference order.
        chain: FileChain,
        /// What went wrong.
        reason: String,
    },

    /// Loading the target of a `fromFile` account failed.
    #[error("failed to load account '{account}' from file ({chain}): {source}")]
    ReferencedSource {
        /// The referencing account.
        account: String,
        /// The files involved, in reference order.
        chain: FileChain,
        /// The failure raised while loading the referenced source.
        #[source]
        source: Box<Error>,
    },

    /// A field failed structural validation after substitution.
    #[error("invalid value for '{field}' in {}: {message}", path.display())]
    InvalidFieldFormat {
        /// The source the field came from.
        path: PathBuf,
        /// Dotted path of the offending field.
        field: String,
        /// A description of the validation failure.
        message: String,
    },

    /// A value supplied outside any source file failed validation.
    #[error("invalid value for '{field}': {message}")]
    InvalidValue {
        /// The field being set.
        field: String,
        /// A description of the validation failure.
        message: String,
    },

    /// No registered format parser is known under the given name.
    #[error("unsupported configuration format: {name}")]
    UnsupportedFormat {
        /// The requested format name.
        name: String,
    },

    /// Serializing a configuration failed.
    #[error("failed to serialize configuration for {}: {message}", path.display())]
    SerializeFailed {
        /// The destination path.
        path: PathBuf,
        /// The underlying serializer error.
        message: String,
    },

    /// An account lookup by name failed.
    #[error("account not found: {name}")]
    AccountNotFound {
        /// The missing account name.
        name: String,
    },

    /// The home directory could not be determined for global discovery.
    #[error("cannot determine home directory for global configuration")]
    HomeDirectoryUnavailable,

    /// An I/O error occurred while reading or writing a source.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// The path being accessed.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// Coarse classification of an [`Error`].
///
/// `ReferencedSource` wraps the error raised while loading a `fromFile`
/// target; [`Error::kind`] reports the wrapped error's kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No source found under default discovery.
    MissingConfiguration,
    /// An explicitly named source is missing.
    SourceNotFound,
    /// A source failed to parse.
    MalformedSource,
    /// An environment reference could not be substituted.
    MissingEnvironmentVariable,
    /// A `fromFile` reference could not be resolved.
    UnresolvedReference,
    /// A field failed structural validation.
    InvalidFieldFormat,
    /// Any other failure (I/O, serialization, lookups).
    Other,
}

impl Error {
    /// Returns the kind of this error, looking through `ReferencedSource`.
    ///
    /// # Examples
    ///
    /// ```
    /// use chainconf::{Error, ErrorKind};
    /// use std::path::PathBuf;
    ///
    /// let err = Error::SourceNotFound { path: PathBuf::from("flow.json") };
    /// assert_eq!(err.kind(), ErrorKind::SourceNotFound);
    /// ```
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingConfiguration { .. } => ErrorKind::MissingConfiguration,
            Self::SourceNotFound { .. } => ErrorKind::SourceNotFound,
            Self::MalformedSource { .. } => ErrorKind::MalformedSource,
            Self::MissingEnvironmentVariable { .. } => ErrorKind::MissingEnvironmentVariable,
            Self::UnresolvedReference { .. } => ErrorKind::UnresolvedReference,
            Self::ReferencedSource { source, .. } => source.kind(),
            Self::InvalidFieldFormat { .. } | Self::InvalidValue { .. } => {
                ErrorKind::InvalidFieldFormat
            }
            Self::UnsupportedFormat { .. }
            | Self::SerializeFailed { .. }
            | Self::AccountNotFound { .. }
            | Self::HomeDirectoryUnavailable
            | Self::Io { .. } => ErrorKind::Other,
        }
    }

    /// Check if error indicates a source path does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::SourceNotFound | ErrorKind::MissingConfiguration
        )
    }

    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::SourceNotFound {
                path: path.to_path_buf(),
            }
        } else {
            Self::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }

    pub(crate) fn invalid_field(
        path: &Path,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidFieldFormat {
            path: path.to_path_buf(),
            field: field.into(),
            message: message.into(),
        }
    }
}

/// The ordered list of files involved in resolving an indirect account.
///
/// Displays as `a.json -> b.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileChain(Vec<PathBuf>);

impl FileChain {
    /// Creates a chain from the referencing file and the referenced file.
    #[must_use]
    pub fn new(origin: &Path, target: &Path) -> Self {
        Self(vec![origin.to_path_buf(), target.to_path_buf()])
    }

    /// Returns the files in reference order.
    #[must_use]
    pub fn files(&self) -> &[PathBuf] {
        &self.0
    }

    /// Appends one more hop.
    #[must_use]
    pub fn then(mut self, next: &Path) -> Self {
        self.0.push(next.to_path_buf());
        self
    }
}

impl fmt::Display for FileChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, path) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " -> ")?;
            }
            write!(f, "{}", path.display())?;
        }
        Ok(())
    }
}
