// Pluggable storage behind the cache store.
// Backends move opaque JSON text by key; TTL handling lives in the store.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use crate::error::Result;

use super::paths::key_path;

/// Key-value storage for serialized cache entries.
pub trait CacheBackend: Send + Sync {
    /// Read the raw entry for a key, `None` if absent.
    fn load(&self, key: &str) -> Result<Option<String>>;

    /// Write the raw entry for a key, replacing any previous value.
    fn store(&self, key: &str, value: &str) -> Result<()>;

    /// Delete the entry for a key. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;

    /// Delete every entry.
    fn clear(&self) -> Result<()>;
}

/// One JSON file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        key_path(&self.dir, key)
    }
}

impl CacheBackend for FileBackend {
    fn load(&self, key: &str) -> Result<Option<String>> {
        let path = self.path(key);
        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(path)?;
        Ok(Some(contents))
    }

    fn store(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;

        // Write atomically via temp file
        let path = self.path(key);
        let temp_path = path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(value.as_bytes())?;
        file.sync_all()?;
        fs::rename(&temp_path, path)?;

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path(key);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        if self.dir.exists() {
            fs::remove_dir_all(&self.dir)?;
        }
        Ok(())
    }
}

/// Process-local map. Lost when the program exits.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries().contains_key(key)
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CacheBackend for MemoryBackend {
    fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries().get(key).cloned())
    }

    fn store(&self, key: &str, value: &str) -> Result<()> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries().remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.entries().clear();
        Ok(())
    }
}

/// In-memory map in front of a slower backend.
///
/// Reads hit memory first; a hit in the backing store is copied into
/// memory. Writes and removals go to both tiers.
pub struct TieredBackend {
    front: MemoryBackend,
    back: Box<dyn CacheBackend>,
}

impl TieredBackend {
    pub fn new(back: Box<dyn CacheBackend>) -> Self {
        Self {
            front: MemoryBackend::new(),
            back,
        }
    }

    /// The in-memory tier.
    pub fn front(&self) -> &MemoryBackend {
        &self.front
    }
}

impl CacheBackend for TieredBackend {
    fn load(&self, key: &str) -> Result<Option<String>> {
        if let Some(value) = self.front.load(key)? {
            return Ok(Some(value));
        }

        let value = self.back.load(key)?;
        if let Some(ref value) = value {
            self.front.store(key, value)?;
        }
        Ok(value)
    }

    fn store(&self, key: &str, value: &str) -> Result<()> {
        self.front.store(key, value)?;
        self.back.store(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.front.remove(key)?;
        self.back.remove(key)
    }

    fn clear(&self) -> Result<()> {
        self.front.clear()?;
        self.back.clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn test_file_backend_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let backend = FileBackend::new(temp_dir.path().join("repos"));

        assert_eq!(backend.load("octocat").unwrap(), None);

        backend.store("octocat", "[1,2,3]").unwrap();
        assert_eq!(backend.load("octocat").unwrap().as_deref(), Some("[1,2,3]"));
        assert!(temp_dir.path().join("repos/octocat.json").exists());

        backend.remove("octocat").unwrap();
        assert_eq!(backend.load("octocat").unwrap(), None);

        // Removing twice is fine
        backend.remove("octocat").unwrap();
    }

    #[test]
    fn test_file_backend_clear() {
        let temp_dir = TempDir::new().unwrap();
        let backend = FileBackend::new(temp_dir.path().join("languages"));

        backend.store("a/b", "{}").unwrap();
        backend.store("c/d", "{}").unwrap();
        backend.clear().unwrap();

        assert_eq!(backend.load("a/b").unwrap(), None);
        assert_eq!(backend.load("c/d").unwrap(), None);
    }

    /// Backing store shared with the test so it can be inspected.
    struct Shared(Arc<MemoryBackend>);

    impl CacheBackend for Shared {
        fn load(&self, key: &str) -> Result<Option<String>> {
            self.0.load(key)
        }
        fn store(&self, key: &str, value: &str) -> Result<()> {
            self.0.store(key, value)
        }
        fn remove(&self, key: &str) -> Result<()> {
            self.0.remove(key)
        }
        fn clear(&self) -> Result<()> {
            self.0.clear()
        }
    }

    #[test]
    fn test_tiered_backfills_memory() {
        let back = Arc::new(MemoryBackend::new());
        back.store("octocat/folio", "{\"Rust\":10}").unwrap();

        let tiered = TieredBackend::new(Box::new(Shared(back.clone())));
        assert!(tiered.front().is_empty());

        let value = tiered.load("octocat/folio").unwrap();
        assert_eq!(value.as_deref(), Some("{\"Rust\":10}"));
        assert!(tiered.front().contains("octocat/folio"));

        // Served from memory even after the backing store loses it
        back.clear().unwrap();
        assert!(tiered.load("octocat/folio").unwrap().is_some());
    }

    #[test]
    fn test_tiered_writes_and_removes_both() {
        let back = Arc::new(MemoryBackend::new());
        let tiered = TieredBackend::new(Box::new(Shared(back.clone())));

        tiered.store("k", "v").unwrap();
        assert!(tiered.front().contains("k"));
        assert!(back.contains("k"));

        tiered.remove("k").unwrap();
        assert!(!tiered.front().contains("k"));
        assert!(!back.contains("k"));
    }
}
