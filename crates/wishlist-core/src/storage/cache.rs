//! Local cache backends
//!
//! A synchronous string-keyed get/set store scoped to this device.
//!
//! `FileCache` keeps one file per key under the data directory and
//! writes atomically (write to temp file, then rename). `MemoryCache`
//! keeps entries in process memory.
//!
//! Storage location: `~/.local/share/wishlist/` (configurable via `Config`)

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;

use super::error::{StorageError, StorageResult};

/// A device-local key-value store
pub trait LocalCache: Send + Sync {
    /// Read the value stored under `key`, if any
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Where entries live, for status output
    fn location(&self) -> String;
}

/// File-backed cache, one `<key>.json` file per entry
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    /// Open a cache rooted at `dir`, creating the directory if needed
    pub fn open(dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let dir = dir.into();
        if !dir.exists() {
            fs::create_dir_all(&dir).map_err(|source| StorageError::CreateDirectory {
                path: dir.clone(),
                source,
            })?;
        }
        Ok(Self { dir })
    }

    /// Path of the file holding `key`
    pub fn entry_path(&self, key: &str) -> StorageResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
            && !key.starts_with('.');
        if !valid {
            return Err(StorageError::InvalidKey {
                key: key.to_string(),
            });
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl LocalCache for FileCache {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.entry_path(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::ReadError { path, source }),
        }
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let path = self.entry_path(key)?;
        atomic_write(&path, value.as_bytes())?;
        debug!("Wrote cache entry {:?} ({} bytes)", path, value.len());
        Ok(())
    }

    fn location(&self) -> String {
        self.dir.display().to_string()
    }
}

/// In-process cache; contents are lost when dropped
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalCache for MemoryCache {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| StorageError::Unavailable("memory cache lock poisoned".to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| StorageError::Unavailable("memory cache lock poisoned".to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
fn atomic_write(path: &Path, data: &[u8]) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| StorageError::CreateDirectory {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let temp_path = path.with_extension("tmp");

    let mut file =
        File::create(&temp_path).map_err(|e| StorageError::from_io(e, temp_path.clone()))?;
    file.write_all(data)
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;
    file.sync_all()
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;

    fs::rename(&temp_path, path).map_err(|source| StorageError::AtomicWriteFailed {
        from: temp_path.clone(),
        to: path.to_path_buf(),
        source,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_cache_set_and_get() {
        let temp_dir = TempDir::new().unwrap();
        let cache = FileCache::open(temp_dir.path()).unwrap();

        assert!(cache.get("wishlist-gifts").unwrap().is_none());

        cache.set("wishlist-gifts", "[]").unwrap();
        assert_eq!(cache.get("wishlist-gifts").unwrap().as_deref(), Some("[]"));

        cache.set("wishlist-gifts", r#"[{"id":"1"}]"#).unwrap();
        assert_eq!(
            cache.get("wishlist-gifts").unwrap().as_deref(),
            Some(r#"[{"id":"1"}]"#)
        );
        assert!(temp_dir.path().join("wishlist-gifts.json").exists());
        assert!(!temp_dir.path().join("wishlist-gifts.tmp").exists());
    }

    #[test]
    fn test_file_cache_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a").join("b");

        let cache = FileCache::open(&nested).unwrap();
        cache.set("k", "v").unwrap();

        assert!(nested.join("k.json").exists());
    }

    #[test]
    fn test_file_cache_persists_across_instances() {
        let temp_dir = TempDir::new().unwrap();
        FileCache::open(temp_dir.path())
            .unwrap()
            .set("k", "hello")
            .unwrap();

        let reopened = FileCache::open(temp_dir.path()).unwrap();
        assert_eq!(reopened.get("k").unwrap().as_deref(), Some("hello"));
    }

    #[test]
    fn test_file_cache_rejects_path_like_keys() {
        let temp_dir = TempDir::new().unwrap();
        let cache = FileCache::open(temp_dir.path()).unwrap();

        for key in ["", "../escape", "a/b", ".hidden"] {
            assert!(matches!(
                cache.set(key, "x"),
                Err(StorageError::InvalidKey { .. })
            ));
        }
    }

    #[test]
    fn test_atomic_write_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let nested_path = temp_dir.path().join("x").join("y").join("file.json");

        atomic_write(&nested_path, b"test data").unwrap();

        let content = fs::read_to_string(&nested_path).unwrap();
        assert_eq!(content, "test data");
    }

    #[test]
    fn test_memory_cache() {
        let cache = MemoryCache::new();
        assert!(cache.get("k").unwrap().is_none());
        cache.set("k", "1").unwrap();
        cache.set("k", "2").unwrap();
        assert_eq!(cache.get("k").unwrap().as_deref(), Some("2"));
        assert_eq!(cache.location(), "memory");
    }
}
