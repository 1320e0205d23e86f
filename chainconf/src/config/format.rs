//! Pluggable configuration formats.
//!
//! A [`ConfigFormat`] turns source bytes into a [`Fragment`] and a
//! fragment back into bytes. The loader picks a format through a
//! [`FormatRegistry`] and never special-cases a concrete one.

use std::path::Path;

use crate::config::schema::Fragment;
use crate::error::{Error, Result};

/// Error raised by a format implementation.
pub type FormatError = Box<dyn std::error::Error + Send + Sync>;

/// A configuration encoding.
pub trait ConfigFormat: Send + Sync {
    /// Identifier used to look the format up, e.g. `"json"`.
    fn name(&self) -> &'static str;

    /// File extensions (without the dot) handled by this format.
    fn extensions(&self) -> &'static [&'static str];

    /// Parses one source into a fragment.
    ///
    /// # Errors
    ///
    /// Returns the underlying syntax error; no partial fragment is produced.
    fn parse(&self, bytes: &[u8]) -> std::result::Result<Fragment, FormatError>;

    /// Serializes a fragment.
    ///
    /// # Errors
    ///
    /// Returns the underlying serializer error.
    fn serialize(&self, fragment: &Fragment) -> std::result::Result<Vec<u8>, FormatError>;
}

/// JSON sources, the default format.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormat;

impl ConfigFormat for JsonFormat {
    fn name(&self) -> &'static str {
        "json"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["json"]
    }

    fn parse(&self, bytes: &[u8]) -> std::result::Result<Fragment, FormatError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    fn serialize(&self, fragment: &Fragment) -> std::result::Result<Vec<u8>, FormatError> {
        let mut bytes = serde_json::to_vec_pretty(fragment)?;
        bytes.push(b'\n');
        Ok(bytes)
    }
}

/// YAML sources. Not registered by default.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlFormat;

impl ConfigFormat for YamlFormat {
    fn name(&self) -> &'static str {
        "yaml"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["yaml", "yml"]
    }

    fn parse(&self, bytes: &[u8]) -> std::result::Result<Fragment, FormatError> {
        Ok(serde_yaml::from_slice(bytes)?)
    }

    fn serialize(&self, fragment: &Fragment) -> std::result::Result<Vec<u8>, FormatError> {
        Ok(serde_yaml::to_string(fragment)?.into_bytes())
    }
}

/// Registered formats, with one default.
///
/// # Examples
///
/// ```
/// use chainconf::config::{FormatRegistry, YamlFormat};
/// use std::path::Path;
///
/// let mut registry = FormatRegistry::default();
/// assert_eq!(registry.for_path(Path::new("flow.yaml")).name(), "json");
///
/// registry.register(Box::new(YamlFormat));
/// assert_eq!(registry.for_path(Path::new("flow.yaml")).name(), "yaml");
/// assert_eq!(registry.for_path(Path::new("flow.json")).name(), "json");
/// ```
pub struct FormatRegistry {
    formats: Vec<Box<dyn ConfigFormat>>,
    default: usize,
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self {
            formats: vec![Box::new(JsonFormat)],
            default: 0,
        }
    }
}

impl FormatRegistry {
    /// Registers a format. A format with the same name is replaced.
    pub fn register(&mut self, format: Box<dyn ConfigFormat>) {
        if let Some(pos) = self.position(format.name()) {
            self.formats[pos] = format;
        } else {
            self.formats.push(format);
        }
    }

    /// Makes the named format the fallback for unknown extensions.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedFormat`] if no format has that name.
    pub fn set_default(&mut self, name: &str) -> Result<()> {
        self.default = self.position(name).ok_or_else(|| Error::UnsupportedFormat {
            name: name.to_string(),
        })?;
        Ok(())
    }

    /// Looks a format up by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedFormat`] if no format has that name.
    pub fn get(&self, name: &str) -> Result<&dyn ConfigFormat> {
        self.position(name)
            .map(|pos| &*self.formats[pos])
            .ok_or_else(|| Error::UnsupportedFormat {
                name: name.to_string(),
            })
    }

    /// Picks the format for a path by extension, falling back to the default.
    #[must_use]
    pub fn for_path(&self, path: &Path) -> &dyn ConfigFormat {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        let format = extension
            .and_then(|ext| {
                self.formats
                    .iter()
                    .find(|format| format.extensions().contains(&ext.as_str()))
            })
            .unwrap_or(&self.formats[self.default]);
        &**format
    }

    /// Names of all registered formats, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.formats.iter().map(|format| format.name())
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.formats.iter().position(|format| format.name() == name)
    }
}

impl std::fmt::Debug for FormatRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormatRegistry")
            .field("formats", &self.names().collect::<Vec<_>>())
            .field("default", &self.formats[self.default].name())
            .finish()
    }
}
