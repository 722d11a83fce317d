//! Classification history store
//!
//! Ordered newest-first, bounded as a ring (oldest evicted first), and
//! mirrored to a [`HistoryPersistence`] backend after every mutation.
//!
//! Mutations come in two forms. `insert_front` and `clear` write through
//! immediately. `stage_insert` and `stage_clear` only change memory and
//! hand back a [`HistorySnapshot`], so a caller holding the store behind a
//! lock can release it before touching the disk.

use crate::persistence::{HistoryConfig, HistoryPersistence, JsonFilePersistence, MemoryPersistence};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use toxiscan_core::{Classification, ClassificationRecord, Error, Result};
use tracing::{info, warn};

/// Bounded, persisted classification history
pub struct HistoryStore {
    records: VecDeque<ClassificationRecord>,
    capacity: usize,
    persistence: Arc<dyn HistoryPersistence>,
    generation: u64,
    saved_generation: Arc<Mutex<u64>>,
}

impl HistoryStore {
    /// Open a store, loading whatever the backend already holds.
    ///
    /// A backend that cannot be parsed is treated as empty; the next
    /// mutation overwrites it.
    pub fn open<P>(persistence: P, capacity: usize) -> Result<Self>
    where
        P: HistoryPersistence + 'static,
    {
        if capacity == 0 {
            return Err(Error::config("history capacity must be at least 1"));
        }

        let mut records = match persistence.load() {
            Ok(records) => records,
            Err(Error::Serialization(e)) => {
                warn!(
                    "Discarding unreadable history at {}: {}",
                    persistence.describe(),
                    e
                );
                Vec::new()
            }
            Err(e) => return Err(e),
        };
        records.truncate(capacity);

        info!(
            "Opened history at {} with {} records (capacity {})",
            persistence.describe(),
            records.len(),
            capacity
        );

        Ok(Self {
            records: records.into(),
            capacity,
            persistence: Arc::new(persistence),
            generation: 0,
            saved_generation: Arc::new(Mutex::new(0)),
        })
    }

    /// Open the store described by `config`
    pub fn from_config(config: &HistoryConfig) -> Result<Self> {
        if config.persist {
            let backend = JsonFilePersistence::new(config.resolved_dir(), &config.key);
            Self::open(backend, config.capacity)
        } else {
            Self::open(MemoryPersistence::new(), config.capacity)
        }
    }

    /// A store that only lives in memory
    pub fn in_memory(capacity: usize) -> Result<Self> {
        Self::open(MemoryPersistence::new(), capacity)
    }

    /// All records, newest first
    pub fn list(&self) -> Vec<ClassificationRecord> {
        self.records.iter().cloned().collect()
    }

    /// Iterate records, newest first
    pub fn iter(&self) -> impl Iterator<Item = &ClassificationRecord> {
        self.records.iter()
    }

    /// Most recent record
    pub fn latest(&self) -> Option<&ClassificationRecord> {
        self.records.front()
    }

    /// Look up a record by id
    pub fn get(&self, id: &str) -> Option<&ClassificationRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Assign an id, prepend, evict past capacity, and persist.
    ///
    /// Identical comments are not deduplicated.
    pub fn insert_front(&mut self, classification: Classification) -> ClassificationRecord {
        let (record, snapshot) = self.stage_insert(classification);
        snapshot.save_or_warn();
        record
    }

    /// Same as [`insert_front`](Self::insert_front) without writing to the
    /// backend. The returned snapshot must be saved by the caller.
    pub fn stage_insert(
        &mut self,
        classification: Classification,
    ) -> (ClassificationRecord, HistorySnapshot) {
        let record = ClassificationRecord::new(generate_record_id(), classification);

        self.records.push_front(record.clone());
        while self.records.len() > self.capacity {
            self.records.pop_back();
        }

        (record, self.snapshot())
    }

    /// Remove every record
    pub fn clear(&mut self) {
        self.stage_clear().save_or_warn();
    }

    /// Remove every record in memory only
    pub fn stage_clear(&mut self) -> HistorySnapshot {
        self.records.clear();
        self.snapshot()
    }

    /// Write the current state to the backend
    pub fn persist(&mut self) -> Result<()> {
        self.snapshot().save()
    }

    fn snapshot(&mut self) -> HistorySnapshot {
        self.generation += 1;
        HistorySnapshot {
            records: self.records.iter().cloned().collect(),
            generation: self.generation,
            persistence: Arc::clone(&self.persistence),
            saved_generation: Arc::clone(&self.saved_generation),
        }
    }
}

/// Copy of the history taken right after a mutation.
///
/// Snapshots may be saved out of order; one older than the last snapshot
/// written is skipped so the backend never moves backwards.
pub struct HistorySnapshot {
    records: Vec<ClassificationRecord>,
    generation: u64,
    persistence: Arc<dyn HistoryPersistence>,
    saved_generation: Arc<Mutex<u64>>,
}

impl HistorySnapshot {
    /// Write the snapshot to the backend
    pub fn save(&self) -> Result<()> {
        let mut saved = self.saved_generation.lock();
        if *saved >= self.generation {
            return Ok(());
        }

        self.persistence.save(&self.records)?;
        *saved = self.generation;
        Ok(())
    }

    /// Write the snapshot, logging instead of failing.
    ///
    /// In-memory state stays authoritative when the backend fails.
    pub fn save_or_warn(&self) {
        if let Err(e) = self.save() {
            warn!(
                "Failed to persist history to {}: {}",
                self.persistence.describe(),
                e
            );
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl std::fmt::Debug for HistorySnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistorySnapshot")
            .field("len", &self.records.len())
            .field("generation", &self.generation)
            .finish()
    }
}

impl std::fmt::Debug for HistoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryStore")
            .field("len", &self.records.len())
            .field("capacity", &self.capacity)
            .field("backend", &self.persistence.describe())
            .finish()
    }
}

fn generate_record_id() -> String {
    format!("cls_{}", uuid::Uuid::new_v4())
}
