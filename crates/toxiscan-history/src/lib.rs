//! Toxiscan History
//!
//! Local cache of past classifications. Records are kept newest first,
//! capped at a fixed capacity, and mirrored to disk as a single JSON array
//! so they survive a restart of the same user's session. Nothing here is
//! shared between users or synced to a server.

pub mod persistence;
pub mod store;

pub use persistence::{
    HistoryConfig, HistoryPersistence, JsonFilePersistence, MemoryPersistence, DEFAULT_CAPACITY,
    DEFAULT_STORAGE_KEY,
};
pub use store::{HistorySnapshot, HistoryStore};
