//! History persistence backends
//!
//! The whole history is stored as one JSON array under a single key:
//! - read in full when a store opens
//! - rewritten in full after every mutation

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use toxiscan_core::{ClassificationRecord, Error, Result};
use tracing::debug;

/// Storage key used by the browser client for the same history
pub const DEFAULT_STORAGE_KEY: &str = "classificationHistory";

/// Default number of records kept
pub const DEFAULT_CAPACITY: usize = 100;

/// Configuration for history storage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Directory holding the history file (platform data dir when unset)
    #[serde(default)]
    pub dir: Option<PathBuf>,

    /// Storage key, used as the file stem
    #[serde(default = "default_key")]
    pub key: String,

    /// Maximum records kept; the oldest are evicted first
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// Keep history on disk across restarts
    #[serde(default = "default_true")]
    pub persist: bool,
}

impl HistoryConfig {
    /// Directory the history file lives in
    pub fn resolved_dir(&self) -> PathBuf {
        self.dir.clone().unwrap_or_else(default_dir)
    }

    /// Full path of the history file
    pub fn file_path(&self) -> PathBuf {
        JsonFilePersistence::new(self.resolved_dir(), &self.key)
            .path()
            .to_path_buf()
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            dir: None,
            key: default_key(),
            capacity: default_capacity(),
            persist: true,
        }
    }
}

fn default_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

fn default_true() -> bool {
    true
}

fn default_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("toxiscan"))
        .unwrap_or_else(|| PathBuf::from("./.toxiscan"))
}

/// Backend that loads and stores the full history
pub trait HistoryPersistence: Send + Sync {
    /// Load all records, newest first. A missing store is an empty history.
    fn load(&self) -> Result<Vec<ClassificationRecord>>;

    /// Replace the stored history with `records`
    fn save(&self, records: &[ClassificationRecord]) -> Result<()>;

    /// Human readable location, for logs
    fn describe(&self) -> String;
}

/// Stores history as `<dir>/<key>.json`
#[derive(Debug, Clone)]
pub struct JsonFilePersistence {
    path: PathBuf,
}

impl JsonFilePersistence {
    /// Create a backend for the given directory and storage key
    pub fn new(dir: impl AsRef<Path>, key: &str) -> Self {
        Self {
            path: dir.as_ref().join(format!("{}.json", key)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistoryPersistence for JsonFilePersistence {
    fn load(&self) -> Result<Vec<ClassificationRecord>> {
        let content = match fs::read(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == IoErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        if content.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        // Bad bytes surface as a serialization error, same as bad JSON.
        let records: Vec<ClassificationRecord> = serde_json::from_slice(&content)?;
        debug!("Loaded {} history records from {:?}", records.len(), self.path);
        Ok(records)
    }

    fn save(&self, records: &[ClassificationRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write-then-rename so a crash never leaves a half-written file.
        let json = serde_json::to_string(records)?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, &self.path).map_err(|e| {
            Error::storage(format!("failed to replace {:?}: {}", self.path, e))
        })?;

        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-process backend. Clones share the same storage, which lets a test
/// "reload" by opening a second store on a clone.
#[derive(Debug, Clone, Default)]
pub struct MemoryPersistence {
    records: Arc<Mutex<Vec<ClassificationRecord>>>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of what is currently stored
    pub fn stored(&self) -> Vec<ClassificationRecord> {
        self.records.lock().clone()
    }
}

impl HistoryPersistence for MemoryPersistence {
    fn load(&self) -> Result<Vec<ClassificationRecord>> {
        Ok(self.records.lock().clone())
    }

    fn save(&self, records: &[ClassificationRecord]) -> Result<()> {
        *self.records.lock() = records.to_vec();
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
