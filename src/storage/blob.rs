//! Key-value blob stores the record store persists into.

use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
};

/// Opaque persistent key-value storage.
///
/// Each key holds one serialized collection. Writes replace the whole value.
pub trait BlobStore {
    /// Reads the value stored under `key`, or `None` if nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read.
    fn read(&self, key: &str) -> Result<Option<String>, BlobError>;

    /// Replaces the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn write(&mut self, key: &str, value: &str) -> Result<(), BlobError>;
}

/// Errors raised by a [`BlobStore`].
#[derive(Debug, thiserror::Error)]
pub enum BlobError {
    /// Reading or writing a file failed.
    #[error("failed to access {path}")]
    Io {
        /// The file being accessed.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: io::Error,
    },
}

/// A blob store backed by one `<key>.json` file per key in a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Creates a store rooted at `root`. The directory is created on the
    /// first write.
    #[must_use]
    pub const fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// The directory holding the blob files.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The file a key is stored in.
    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl BlobStore for FileStore {
    fn read(&self, key: &str) -> Result<Option<String>, BlobError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("No blob at {}", path.display());
                Ok(None)
            }
            Err(source) => Err(BlobError::Io { path, source }),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), BlobError> {
        fs::create_dir_all(&self.root).map_err(|source| BlobError::Io {
            path: self.root.clone(),
            source,
        })?;

        let path = self.path_for(key);
        fs::write(&path, value).map_err(|source| BlobError::Io {
            path: path.clone(),
            source,
        })?;
        tracing::trace!("Wrote {} bytes to {}", value.len(), path.display());
        Ok(())
    }
}

/// An in-memory blob store.
///
/// Nothing survives the process; useful as a test double and for dry runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    blobs: HashMap<String, String>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the raw value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.blobs.get(key).map(String::as_str)
    }

    /// Stores a raw value under `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.blobs.insert(key.into(), value.into());
    }
}

impl BlobStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>, BlobError> {
        Ok(self.blobs.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), BlobError> {
        self.insert(key, value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn file_store_reads_back_what_it_wrote() {
        let tmp = TempDir::new().unwrap();
        let mut store = FileStore::new(tmp.path().join("data"));

        assert_eq!(store.read("soldiers_data").unwrap(), None);

        store.write("soldiers_data", "[]").unwrap();
        assert_eq!(store.read("soldiers_data").unwrap().as_deref(), Some("[]"));
        assert!(tmp.path().join("data/soldiers_data.json").exists());
    }

    #[test]
    fn file_store_write_replaces_previous_value() {
        let tmp = TempDir::new().unwrap();
        let mut store = FileStore::new(tmp.path().to_path_buf());

        store.write("requests_data", "[1]").unwrap();
        store.write("requests_data", "[2]").unwrap();
        assert_eq!(store.read("requests_data").unwrap().as_deref(), Some("[2]"));
    }

    #[test]
    fn file_store_reports_unreadable_blob() {
        let tmp = TempDir::new().unwrap();
        // a directory where the file should be cannot be read as a string
        std::fs::create_dir_all(tmp.path().join("soldiers_data.json")).unwrap();
        let store = FileStore::new(tmp.path().to_path_buf());

        assert!(matches!(
            store.read("soldiers_data"),
            Err(BlobError::Io { .. })
        ));
    }

    #[test]
    fn memory_store_round_trips() {
        let mut store = MemoryStore::new();
        assert_eq!(store.read("k").unwrap(), None);
        store.write("k", "v").unwrap();
        assert_eq!(store.get("k"), Some("v"));
    }
}
