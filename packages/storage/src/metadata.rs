//! Persisted path → content-reference mapping.

use std::collections::HashMap;
use std::sync::Mutex;

/// One row per uploaded object within a storage mount.
///
/// A record is never created without a reference, and never modified after
/// creation except by deletion: the backend has no update operation, so a
/// rewrite of the same path produces a whole new record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Virtual path, unique within `storage_id`.
    pub path: String,
    /// Numeric id of the owning storage mount.
    pub storage_id: i64,
    /// Opaque content reference returned by the node at upload time.
    pub reference: String,
    /// Id into the shared mime-type table, not the raw string.
    pub mime_type_id: i64,
    /// Byte length of the staged content at upload time.
    pub size: u64,
    /// Permission bits, see [`crate::permissions`].
    pub permissions: i32,
    pub mtime: i64,
    pub storage_mtime: i64,
    pub etag: Option<String>,
}

#[derive(thiserror::Error, Debug)]
pub enum MetadataError {
    #[error("no record for path '{path}'")]
    NotFound { path: String },

    #[error("metadata store failure: {message}")]
    Backend { message: String },
}

/// Persistence interface for [`FileRecord`]s.
///
/// Implementations must be safe to call from concurrent request contexts.
pub trait MetadataStore: Send + Sync {
    /// Look up the record for `(path, storage_id)`.
    fn find(&self, path: &str, storage_id: i64) -> Result<FileRecord, MetadataError>;

    /// Insert a record, replacing any existing row for the same
    /// `(path, storage_id)` key.
    ///
    /// Replace-on-rewrite is part of the contract: re-uploading a path
    /// yields a new reference, and an append-only table would leak the
    /// stale one.
    fn create(&self, record: FileRecord) -> Result<(), MetadataError>;

    /// Remove the record for `(path, storage_id)`.
    fn delete(&self, path: &str, storage_id: i64) -> Result<(), MetadataError>;

    /// All records belonging to `storage_id`, ordered by path.
    fn list(&self, storage_id: i64) -> Result<Vec<FileRecord>, MetadataError>;
}

/// In-memory [`MetadataStore`], keyed by `(path, storage_id)`.
pub struct InMemoryMetadataStore {
    records: Mutex<HashMap<(String, i64), FileRecord>>,
}

impl InMemoryMetadataStore {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
        }
    }

    fn locked(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<(String, i64), FileRecord>>, MetadataError> {
        self.records.lock().map_err(|_| MetadataError::Backend {
            message: "metadata store lock poisoned".to_string(),
        })
    }
}

impl Default for InMemoryMetadataStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataStore for InMemoryMetadataStore {
    fn find(&self, path: &str, storage_id: i64) -> Result<FileRecord, MetadataError> {
        self.locked()?
            .get(&(path.to_string(), storage_id))
            .cloned()
            .ok_or_else(|| MetadataError::NotFound {
                path: path.to_string(),
            })
    }

    fn create(&self, record: FileRecord) -> Result<(), MetadataError> {
        let key = (record.path.clone(), record.storage_id);
        self.locked()?.insert(key, record);
        Ok(())
    }

    fn delete(&self, path: &str, storage_id: i64) -> Result<(), MetadataError> {
        match self.locked()?.remove(&(path.to_string(), storage_id)) {
            Some(_) => Ok(()),
            None => Err(MetadataError::NotFound {
                path: path.to_string(),
            }),
        }
    }

    fn list(&self, storage_id: i64) -> Result<Vec<FileRecord>, MetadataError> {
        let mut records: Vec<FileRecord> = self
            .locked()?
            .values()
            .filter(|record| record.storage_id == storage_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(records)
    }
}
