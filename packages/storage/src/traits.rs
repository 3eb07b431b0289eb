//! The filesystem-operation contract the host layer programs against.
//!
//! The contract is an explicit trait rather than a host-provided base
//! class; adapters receive their collaborators by injection instead of
//! through a process-wide locator.

use std::io::Read;

use crate::error::StorageError;

/// Free-space sentinel meaning the backend imposes no quota.
pub const SPACE_UNLIMITED: i64 = -3;

/// Parsed C-style fopen mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    Read,
    Write,
    Append,
    ReadWrite,
}

impl OpenMode {
    /// Parse a mode string as passed by the host layer.
    pub fn parse(mode: &str) -> Option<OpenMode> {
        match mode {
            "r" | "rb" => Some(OpenMode::Read),
            "w" | "wb" | "x" | "c" => Some(OpenMode::Write),
            "a" | "ab" => Some(OpenMode::Append),
            "r+" | "w+" | "wb+" | "a+" | "x+" | "c+" => Some(OpenMode::ReadWrite),
            _ => None,
        }
    }

    pub fn is_read_only(self) -> bool {
        matches!(self, OpenMode::Read)
    }
}

/// Stat result for one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMetadata {
    pub name: String,
    pub permissions: i32,
    pub mime_type: String,
    pub mtime: i64,
    pub storage_mtime: i64,
    pub size: u64,
    pub etag: Option<String>,
}

/// Path-based file operations invoked by the host filesystem layer.
///
/// Implementations must be callable from concurrent request contexts; all
/// methods take `&self` and any mutable state lives behind the injected
/// collaborators.
pub trait Storage: Send + Sync {
    /// Stable identity of this storage instance.
    fn id(&self) -> &str;

    /// Cheap root-only existence check.
    ///
    /// Answers `true` only for the root pseudo-directory. Non-root paths
    /// are reported as absent without consulting the metadata store; their
    /// real existence is answered by [`Storage::metadata`]. The asymmetry
    /// is deliberate and callers rely on it.
    fn exists(&self, path: &str) -> bool;

    /// Stat `path`. The root reports synthetic directory metadata; files
    /// come from the metadata store.
    fn metadata(&self, path: &str) -> Result<FileMetadata, StorageError>;

    /// True only when `path` denotes the root; no nested directories exist.
    fn is_dir(&self, path: &str) -> bool;

    /// Open `path` with a C-style mode string. Only read modes are
    /// supported; write-intent modes fail with
    /// [`StorageError::Unsupported`].
    fn open(&self, path: &str, mode: &str) -> Result<Box<dyn Read + Send>, StorageError>;

    /// Upload the stream's content and record it under `path`.
    ///
    /// Returns the number of bytes staged and uploaded. The inbound stream
    /// is consumed (and thereby released) whether the write succeeds or
    /// fails.
    fn write_stream(
        &self,
        path: &str,
        source: Box<dyn Read + Send>,
        declared_size: Option<u64>,
    ) -> Result<u64, StorageError>;

    /// Directories are virtual; always succeeds without backend action.
    fn mkdir(&self, path: &str) -> Result<(), StorageError>;

    /// Virtual directories hold no backend state; always succeeds.
    fn rmdir(&self, path: &str) -> Result<(), StorageError>;

    /// Enumerate entry names under the mount root.
    fn opendir(&self, path: &str) -> Result<Vec<String>, StorageError>;

    /// Drop the path → reference mapping. The content itself stays in the
    /// backend; a content-addressed store has no delete.
    fn unlink(&self, path: &str) -> Result<(), StorageError>;

    /// Stored modification time, or 0 for the root and unknown paths.
    fn filemtime(&self, path: &str) -> i64;

    fn free_space(&self, path: &str) -> i64;

    /// The backend has no timestamp authority, so this always reports
    /// updated.
    fn has_updated(&self, path: &str, time: i64) -> bool;

    /// Accepted without effect; see [`Storage::has_updated`].
    fn touch(&self, path: &str, mtime: Option<i64>) -> Result<(), StorageError>;

    /// Mount-level permissions reported to the host.
    fn permissions(&self, path: &str) -> i32;

    /// Verify the adapter can plausibly reach its endpoint.
    fn check(&self) -> Result<(), StorageError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_modes_parse_as_read() {
        assert_eq!(OpenMode::parse("r"), Some(OpenMode::Read));
        assert_eq!(OpenMode::parse("rb"), Some(OpenMode::Read));
        assert!(OpenMode::parse("r").unwrap().is_read_only());
    }

    #[test]
    fn write_intent_modes_are_not_read_only() {
        for mode in ["w", "wb", "a", "ab", "r+", "w+", "wb+", "a+", "x", "x+", "c", "c+"] {
            let parsed = OpenMode::parse(mode).unwrap();
            assert!(!parsed.is_read_only(), "mode {} should be write-intent", mode);
        }
    }

    #[test]
    fn garbage_modes_do_not_parse() {
        assert_eq!(OpenMode::parse(""), None);
        assert_eq!(OpenMode::parse("rw"), None);
    }
}
