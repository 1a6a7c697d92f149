//! Persisted reading progress per document
//!
//! A small JSON file keyed by document. Only normalized progress is stored,
//! so positions survive window resizes and font changes.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geometry::clamp_progress;
use crate::{Error, Result};

const STORE_VERSION: u32 = 1;

/// Writes closer together than this are treated as unchanged
const PROGRESS_EPSILON: f64 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SavedProgress {
    pub progress: f64,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default)]
    version: u32,
    #[serde(default)]
    documents: BTreeMap<String, SavedProgress>,
}

#[derive(Debug)]
pub struct ProgressStore {
    path: PathBuf,
    data: StoreFile,
    dirty: bool,
}

/// Stable key for a document path
pub fn document_key(path: &Path) -> String {
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}

impl ProgressStore {
    /// Open the store at `path`; a missing file yields an empty store
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let data = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let data: StoreFile = serde_json::from_str(&content)?;
            if data.version > STORE_VERSION {
                return Err(Error::Store(format!(
                    "{} was written by a newer version (format {})",
                    path.display(),
                    data.version
                )));
            }
            data
        } else {
            StoreFile {
                version: STORE_VERSION,
                documents: BTreeMap::new(),
            }
        };
        tracing::debug!(path = %path.display(), documents = data.documents.len(), "Opened progress store");
        Ok(Self {
            path,
            data,
            dirty: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<SavedProgress> {
        self.data.documents.get(key).copied()
    }

    pub fn progress(&self, key: &str) -> Option<f64> {
        self.get(key).map(|saved| saved.progress)
    }

    /// Record progress for `key`, returning whether the stored value changed
    pub fn set(&mut self, key: &str, progress: f64) -> bool {
        let progress = clamp_progress(progress);
        if let Some(existing) = self.data.documents.get(key) {
            if (existing.progress - progress).abs() < PROGRESS_EPSILON {
                return false;
            }
        }
        self.data.documents.insert(
            key.to_string(),
            SavedProgress {
                progress,
                updated_at: Utc::now(),
            },
        );
        self.dirty = true;
        true
    }

    pub fn remove(&mut self, key: &str) -> Option<SavedProgress> {
        let removed = self.data.documents.remove(key);
        if removed.is_some() {
            self.dirty = true;
        }
        removed
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &SavedProgress)> {
        self.data.documents.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.data.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.documents.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Write the store through a temporary file and rename it into place
    pub fn save(&mut self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        self.data.version = STORE_VERSION;
        let content = serde_json::to_string_pretty(&self.data)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, &self.path)?;
        self.dirty = false;
        tracing::debug!(path = %self.path.display(), documents = self.data.documents.len(), "Saved progress store");
        Ok(())
    }
}

/// Debounced writer for one document's progress
#[derive(Debug)]
pub struct ProgressWriter {
    store: ProgressStore,
    key: String,
    debounce: Duration,
    last_flush: Option<Instant>,
}

impl ProgressWriter {
    pub fn new(store: ProgressStore, key: impl Into<String>, debounce: Duration) -> Self {
        Self {
            store,
            key: key.into(),
            debounce,
            last_flush: None,
        }
    }

    pub fn saved_progress(&self) -> Option<f64> {
        self.store.progress(&self.key)
    }

    /// Record progress and flush if the debounce window has passed
    ///
    /// Returns whether the store was written.
    pub fn record(&mut self, progress: f64, now: Instant) -> Result<bool> {
        self.store.set(&self.key, progress);
        self.flush_due(now)
    }

    /// Flush pending changes whose debounce window has passed
    pub fn flush_due(&mut self, now: Instant) -> Result<bool> {
        if !self.store.is_dirty() {
            return Ok(false);
        }
        let due = self
            .last_flush
            .map_or(true, |last| now.saturating_duration_since(last) >= self.debounce);
        if !due {
            return Ok(false);
        }
        self.store.save()?;
        self.last_flush = Some(now);
        Ok(true)
    }

    /// Write any pending change immediately
    pub fn flush(&mut self) -> Result<()> {
        if self.store.is_dirty() {
            self.store.save()?;
            self.last_flush = Some(Instant::now());
        }
        Ok(())
    }

    pub fn into_store(self) -> ProgressStore {
        self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("scrollsync-test-{}", uuid::Uuid::new_v4()))
            .join("progress.json")
    }

    #[test]
    fn test_missing_file_is_empty() {
        let store = ProgressStore::open(temp_store_path()).unwrap();
        assert!(store.is_empty());
        assert!(!store.is_dirty());
    }

    #[test]
    fn test_set_save_reopen() {
        let path = temp_store_path();
        let mut store = ProgressStore::open(&path).unwrap();
        assert!(store.set("book.txt", 0.42));
        assert!(store.set("other.txt", 1.7));
        store.save().unwrap();
        assert!(!store.is_dirty());

        let reopened = ProgressStore::open(&path).unwrap();
        assert_eq!(reopened.len(), 2);
        assert!((reopened.progress("book.txt").unwrap() - 0.42).abs() < 1e-12);
        assert!((reopened.progress("other.txt").unwrap() - 1.0).abs() < 1e-12);
        assert!(!path.with_extension("json.tmp").exists());

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_unchanged_value_not_dirty() {
        let mut store = ProgressStore::open(temp_store_path()).unwrap();
        store.set("doc", 0.5);
        store.dirty = false;
        assert!(!store.set("doc", 0.50001));
        assert!(!store.is_dirty());
        assert!(store.remove("doc").is_some());
        assert!(store.is_dirty());
        assert!(store.remove("doc").is_none());
    }

    #[test]
    fn test_corrupt_file_is_error() {
        let path = temp_store_path();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(ProgressStore::open(&path), Err(Error::Json(_))));

        std::fs::write(&path, r#"{"version": 99, "documents": {}}"#).unwrap();
        assert!(matches!(ProgressStore::open(&path), Err(Error::Store(_))));
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_writer_debounces() {
        let path = temp_store_path();
        let store = ProgressStore::open(&path).unwrap();
        let mut writer = ProgressWriter::new(store, "doc", Duration::from_millis(500));
        let start = Instant::now();

        assert!(writer.record(0.1, start).unwrap());
        assert!(!writer.record(0.2, start + Duration::from_millis(100)).unwrap());
        assert!(!writer.record(0.3, start + Duration::from_millis(300)).unwrap());
        assert!(writer.flush_due(start + Duration::from_millis(600)).unwrap());
        assert!(!writer.flush_due(start + Duration::from_millis(2000)).unwrap());

        let reopened = ProgressStore::open(&path).unwrap();
        assert!((reopened.progress("doc").unwrap() - 0.3).abs() < 1e-12);

        writer.record(0.9, start + Duration::from_millis(700)).unwrap();
        writer.flush().unwrap();
        let reopened = ProgressStore::open(&path).unwrap();
        assert!((reopened.progress("doc").unwrap() - 0.9).abs() < 1e-12);
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
