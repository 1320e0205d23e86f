//! Access to configuration source bytes.
//!
//! The loader reads and writes sources through [`SourceReader`] so that the
//! same pipeline runs against the real filesystem or an in-memory map.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// Reads and writes raw source bytes.
pub trait SourceReader: Send + Sync {
    /// Reads the whole source.
    ///
    /// # Errors
    ///
    /// Returns `io::ErrorKind::NotFound` when the source does not exist.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Returns whether the source exists.
    fn exists(&self, path: &Path) -> bool;

    /// Replaces the source contents.
    ///
    /// # Errors
    ///
    /// Returns any I/O error raised while writing.
    fn write(&self, path: &Path, bytes: &[u8]) -> io::Result<()>;
}

impl<T: SourceReader + ?Sized> SourceReader for Arc<T> {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        (**self).read(path)
    }

    fn exists(&self, path: &Path) -> bool {
        (**self).exists(path)
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        (**self).write(path, bytes)
    }
}

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSystem;

impl SourceReader for FileSystem {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, bytes)
    }
}

/// An in-memory set of sources keyed by path.
///
/// # Examples
///
/// ```
/// use chainconf::config::{MemoryFs, SourceReader};
/// use std::path::Path;
///
/// let fs = MemoryFs::new().with_file("flow.json", "{}");
/// assert!(fs.exists(Path::new("flow.json")));
/// assert_eq!(fs.read(Path::new("flow.json")).unwrap(), b"{}");
/// ```
#[derive(Debug, Default)]
pub struct MemoryFs {
    files: RwLock<HashMap<PathBuf, Vec<u8>>>,
}

impl MemoryFs {
    /// Creates an empty in-memory filesystem.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file, builder style.
    #[must_use]
    pub fn with_file(self, path: impl Into<PathBuf>, contents: impl AsRef<[u8]>) -> Self {
        self.insert(path, contents);
        self
    }

    /// Adds or replaces a file.
    pub fn insert(&self, path: impl Into<PathBuf>, contents: impl AsRef<[u8]>) {
        let mut files = self
            .files
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        files.insert(path.into(), contents.as_ref().to_vec());
    }
}

impl SourceReader for MemoryFs {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        let files = self
            .files
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        files.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} does not exist", path.display()),
            )
        })
    }

    fn exists(&self, path: &Path) -> bool {
        self.files
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .contains_key(path)
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        self.insert(path, bytes);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_fs_missing_file() {
        let fs = MemoryFs::new();
        let err = fs.read(Path::new("flow.json")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(!fs.exists(Path::new("flow.json")));
    }

    #[test]
    fn test_memory_fs_write_then_read() {
        let fs = MemoryFs::new();
        fs.write(Path::new("a/flow.json"), b"{}").unwrap();
        assert_eq!(fs.read(Path::new("a/flow.json")).unwrap(), b"{}");
    }

    #[test]
    fn test_shared_reader_sees_writes() {
        let fs = Arc::new(MemoryFs::new());
        let shared: Box<dyn SourceReader> = Box::new(Arc::clone(&fs));
        shared.write(Path::new("flow.json"), b"{}").unwrap();
        assert!(fs.exists(Path::new("flow.json")));
    }

    #[test]
    fn test_file_system_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("flow.json");

        assert!(!FileSystem.exists(&path));
        FileSystem.write(&path, b"{}").unwrap();
        assert!(FileSystem.exists(&path));
        assert_eq!(FileSystem.read(&path).unwrap(), b"{}");
    }

    #[test]
    fn test_file_system_directory_is_not_a_source() {
        let temp_dir = TempDir::new().unwrap();
        assert!(!FileSystem.exists(temp_dir.path()));
    }
}
