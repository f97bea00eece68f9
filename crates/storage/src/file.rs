//! File system blob store
//!
//! Each key is stored as `<dir>/<key>.json`. Writes go to a temporary file in
//! the same directory which is then renamed over the target, so a crash
//! mid-write leaves the previous value intact.

use crate::blob::BlobStore;
use crate::error::{StorageError, StorageResult};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Blob store backed by one file per key
#[derive(Debug, Clone)]
pub struct FileBlobStore {
    dir: PathBuf,
}

impl FileBlobStore {
    /// Opens a store rooted at `dir`, creating the directory if needed
    pub fn open(dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let dir = dir.into();
        ensure_directory_exists(&dir)?;
        Ok(Self { dir })
    }

    /// Returns the storage directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the file that holds `key`
    pub fn path_for(&self, key: &str) -> StorageResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }

    fn write_atomic(&self, key: &str, path: &Path, content: &str) -> StorageResult<()> {
        let write_err = |source| StorageError::Write {
            key: key.to_string(),
            path: path.to_path_buf(),
            source,
        };

        let mut temp_file = NamedTempFile::new_in(&self.dir).map_err(write_err)?;
        temp_file.write_all(content.as_bytes()).map_err(write_err)?;
        temp_file.as_file().sync_all().map_err(write_err)?;
        temp_file
            .persist(path)
            .map_err(|e| write_err(e.error))?;

        Ok(())
    }
}

impl BlobStore for FileBlobStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.path_for(key)?;
        if !path.exists() {
            return Ok(None);
        }

        fs::read_to_string(&path)
            .map(Some)
            .map_err(|source| StorageError::Read {
                key: key.to_string(),
                path,
                source,
            })
    }

    fn put(&self, key: &str, value: &str) -> StorageResult<()> {
        let path = self.path_for(key)?;
        self.write_atomic(key, &path, value)?;
        log::debug!("Wrote {} bytes to {}", value.len(), path.display());
        Ok(())
    }
}

fn ensure_directory_exists(path: &Path) -> StorageResult<()> {
    if !path.exists() {
        fs::create_dir_all(path).map_err(|source| StorageError::DirectoryCreation {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Created ledger directory: {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_creates_directory() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("nested").join("ledger");
        let store = FileBlobStore::open(&dir).unwrap();
        assert!(dir.is_dir());
        assert_eq!(store.dir(), dir.as_path());
    }

    #[test]
    fn test_roundtrip_through_disk() {
        let temp = TempDir::new().unwrap();
        let store = FileBlobStore::open(temp.path()).unwrap();

        assert!(store.get("transactions").unwrap().is_none());
        store.put("transactions", "[]").unwrap();
        assert_eq!(store.get("transactions").unwrap().as_deref(), Some("[]"));
        assert!(temp.path().join("transactions.json").exists());
    }

    #[test]
    fn test_overwrite_leaves_no_temp_files() {
        let temp = TempDir::new().unwrap();
        let store = FileBlobStore::open(temp.path()).unwrap();

        for i in 0..5 {
            store.put("lastSyncTime", &format!("\"{}\"", i)).unwrap();
        }

        let entries: Vec<_> = fs::read_dir(temp.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(store.get("lastSyncTime").unwrap().as_deref(), Some("\"4\""));
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let temp = TempDir::new().unwrap();
        let store = FileBlobStore::open(temp.path()).unwrap();

        for key in ["", "../escape", "a/b", "dots.json"] {
            assert!(matches!(
                store.put(key, "x"),
                Err(StorageError::InvalidKey(_))
            ));
        }
    }
}
