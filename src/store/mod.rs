//! Filesystem persistence for content entities.
//!
//! An entity is a folder holding one authoritative `index.json` plus
//! write-only sidecar mirrors of its long-text fields. All mutation goes
//! through [`DocumentStore`], which stamps versions, mirrors sidecars and
//! holds the per-folder write lock for the duration of a write.

pub mod articles;
pub mod document;
pub mod history;
pub mod lock;

pub use articles::{
    ArticleFolder, PlanSummary, ScanError, ScanOutcome, TransitionUpdate, LEGACY_META_FILE,
};
pub use document::{DocumentStore, OverrideFormat, INDEX_FILE, SERIALIZED_FIELDS};
pub use history::{ArchiveExtras, HistoryEntry, HISTORY_DIR};
pub use lock::{WriteLock, LOCK_FILE};

use std::path::PathBuf;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in the entity store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to parse {}: {source}", path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Legacy article format detected at {}. Run the legacy migration tool before operating on this folder.", path.display())]
    LegacyFormat { path: PathBuf },

    #[error("Another write is in progress for {} ({} exists). If the previous writer crashed, remove the lock file manually and retry.", dir.display(), lock.display())]
    WriteConflict { dir: PathBuf, lock: PathBuf },

    #[error("No document found at {}", path.display())]
    NotFound { path: PathBuf },

    #[error("An article already exists at {}", path.display())]
    AlreadyExists { path: PathBuf },

    #[error("Invalid pipeline transition from '{from}' to '{to}'")]
    InvalidTransition { from: String, to: String },

    #[error("Field '{field}' is not a string and cannot be exported as markdown")]
    NotAString { field: String },

    #[error("Field '{field}' is reserved and cannot have a sidecar override")]
    ReservedField { field: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
