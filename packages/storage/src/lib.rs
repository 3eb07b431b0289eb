//! # swarmfs-storage
//!
//! A hierarchical-filesystem adapter over the Swarm content-addressed store.
//!
//! The backend knows nothing about paths: every stored object is addressed
//! by an opaque reference returned at upload time, uploads require an
//! active postage batch, and content is immutable once stored. This crate
//! reconciles that model with the mutable-path semantics a filesystem
//! layer expects:
//!
//! - [`MetadataStore`] persists the per-mount path → reference mapping,
//!   together with size, mime type and timestamps.
//! - [`MountResolver`] correlates a mount's numeric storage id with the
//!   persisted configuration list to find the active batch id.
//! - [`StagedContent`] buffers an inbound stream to a sized temporary file
//!   so the transport can declare a content length up front.
//! - [`SwarmStorage`] composes the above behind the [`Storage`] trait, the
//!   explicit operation contract the host filesystem layer invokes.
//!
//! Directories are purely virtual: only the root pseudo-directory exists,
//! and all non-root paths are files. Re-uploading a path creates a new
//! reference and replaces the old record; nothing is ever updated in place
//! against the backend.

pub mod adapter;
pub mod config;
pub mod error;
pub mod metadata;
pub mod mimetype;
pub mod permissions;
pub mod staging;
pub mod traits;

pub use adapter::{StorageBackends, StorageParams, SwarmStorage};
pub use config::{ConfigStore, MountCache, MountConfig, MountPoint, MountResolver};
pub use error::StorageError;
pub use metadata::{FileRecord, InMemoryMetadataStore, MetadataError, MetadataStore};
pub use mimetype::{detect_mime, InMemoryMimeRegistry, MimeTypeRegistry};
pub use staging::StagedContent;
pub use traits::{FileMetadata, OpenMode, Storage, SPACE_UNLIMITED};
