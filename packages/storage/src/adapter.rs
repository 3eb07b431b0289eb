//! The Swarm-backed storage adapter.

use std::io::Read;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use swarmfs_bee::BeeClient;

use crate::config::{ConfigStore, MountCache, MountConfig, MountResolver};
use crate::error::StorageError;
use crate::metadata::{FileRecord, MetadataError, MetadataStore};
use crate::mimetype::{self, MimeTypeRegistry};
use crate::permissions;
use crate::staging::StagedContent;
use crate::traits::{FileMetadata, OpenMode, Storage, SPACE_UNLIMITED};

/// Construction parameters for one storage mount, as supplied by the host
/// mount configuration.
#[derive(Debug, Clone, Default)]
pub struct StorageParams {
    /// Node address including scheme, e.g. `http://192.168.1.10`. Required.
    pub ip: Option<String>,
    /// Node API port. Required; bee's conventional port is
    /// [`swarmfs_bee::DEFAULT_PORT`].
    pub port: Option<u16>,
    /// Request timeout for node calls; unset means OS connection timeout.
    pub timeout: Option<Duration>,
}

/// Collaborators injected into [`SwarmStorage`].
pub struct StorageBackends {
    pub metadata: Arc<dyn MetadataStore>,
    pub mime_types: Arc<dyn MimeTypeRegistry>,
    pub mount_cache: Arc<dyn MountCache>,
    pub config: Arc<dyn ConfigStore>,
}

/// Filesystem façade over one bee node and one metadata store.
///
/// The mount configuration is resolved exactly once, at construction, and
/// held immutably for the adapter's lifetime: an unconfigured mount stays
/// unconfigured until the adapter is rebuilt. All other state lives behind
/// the injected collaborators, so `&self` operations are safe from
/// concurrent request contexts.
pub struct SwarmStorage {
    id: String,
    storage_id: i64,
    client: BeeClient,
    metadata: Arc<dyn MetadataStore>,
    mime_types: Arc<dyn MimeTypeRegistry>,
    mount_config: Option<MountConfig>,
}

/// The root pseudo-directory sentinels.
fn is_root(path: &str) -> bool {
    matches!(path, "" | "/" | ".")
}

/// Basename of a virtual path, used as the advertised upload name.
fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

impl SwarmStorage {
    /// Build an adapter for the mount identified by `storage_id`.
    ///
    /// Fails fast when `ip` or `port` is missing or the endpoint scheme is
    /// not http(s). A missing mount configuration is not a construction
    /// failure; it only rejects writes later.
    pub fn new(
        params: StorageParams,
        storage_id: i64,
        backends: StorageBackends,
    ) -> Result<Self, StorageError> {
        let ip = params.ip.ok_or_else(|| StorageError::Configuration {
            message: "required parameter 'ip' not set for bee swarm storage".to_string(),
        })?;
        let port = params.port.ok_or_else(|| StorageError::Configuration {
            message: "required parameter 'port' not set for bee swarm storage".to_string(),
        })?;
        let api_url = format!("{}:{}", ip, port);

        let client = match params.timeout {
            Some(timeout) => BeeClient::with_timeout(&api_url, timeout),
            None => BeeClient::new(&api_url),
        }
        .map_err(|err| StorageError::Configuration {
            message: err.to_string(),
        })?;

        let resolver = MountResolver::new(backends.mount_cache, backends.config);
        let mount_config = resolver.resolve(storage_id);
        if mount_config.is_none() {
            log::debug!(
                "storage {} has no mount configuration; writes will be rejected",
                storage_id
            );
        }

        Ok(SwarmStorage {
            id: format!("ethswarm::{}", api_url),
            storage_id,
            client,
            metadata: backends.metadata,
            mime_types: backends.mime_types,
            mount_config,
        })
    }

    /// The resolved mount configuration, if any.
    pub fn mount_config(&self) -> Option<&MountConfig> {
        self.mount_config.as_ref()
    }

    /// The active batch id, if the mount is configured with a non-empty one.
    fn batch_id(&self) -> Option<&str> {
        self.mount_config
            .as_ref()
            .map(|config| config.batch_id.as_str())
            .filter(|batch_id| !batch_id.is_empty())
    }

    fn encrypt(&self) -> bool {
        self.mount_config
            .as_ref()
            .map(|config| config.encrypt)
            .unwrap_or(false)
    }

    fn find_record(&self, path: &str) -> Result<FileRecord, StorageError> {
        self.metadata
            .find(path, self.storage_id)
            .map_err(|err| match err {
                MetadataError::NotFound { path } => StorageError::NotFound { path },
                other => StorageError::Metadata(other),
            })
    }

    fn root_metadata() -> FileMetadata {
        let now = Utc::now().timestamp();
        FileMetadata {
            name: String::new(),
            permissions: permissions::ALL,
            mime_type: mimetype::DIRECTORY.to_string(),
            mtime: now,
            storage_mtime: now,
            size: 0,
            etag: None,
        }
    }
}

impl Storage for SwarmStorage {
    fn id(&self) -> &str {
        &self.id
    }

    fn exists(&self, path: &str) -> bool {
        is_root(path)
    }

    fn metadata(&self, path: &str) -> Result<FileMetadata, StorageError> {
        if is_root(path) {
            return Ok(Self::root_metadata());
        }

        let record = self.find_record(path)?;
        let mime_type = self
            .mime_types
            .name_of(record.mime_type_id)
            .unwrap_or_else(|| mimetype::OCTET_STREAM.to_string());

        Ok(FileMetadata {
            name: record.path,
            permissions: permissions::READ,
            mime_type,
            mtime: Utc::now().timestamp(),
            storage_mtime: record.storage_mtime,
            size: record.size,
            etag: record.etag,
        })
    }

    fn is_dir(&self, path: &str) -> bool {
        is_root(path)
    }

    fn open(&self, path: &str, mode: &str) -> Result<Box<dyn Read + Send>, StorageError> {
        let record = self.find_record(path)?;

        match OpenMode::parse(mode) {
            Some(OpenMode::Read) => {
                let stream = self.client.download(&record.reference)?;
                Ok(Box::new(stream))
            }
            _ => Err(StorageError::Unsupported {
                operation: format!("open mode '{}'", mode),
            }),
        }
    }

    fn write_stream(
        &self,
        path: &str,
        source: Box<dyn Read + Send>,
        _declared_size: Option<u64>,
    ) -> Result<u64, StorageError> {
        let Some(batch_id) = self.batch_id() else {
            // Release the inbound stream before the error propagates.
            drop(source);
            return Err(StorageError::MissingBatch);
        };

        // Staging consumes (and closes) the source on every path from here.
        let staged = StagedContent::from_reader(source)?;
        let size = staged.size();
        let mime_type = staged.mime_type().to_string();

        let reference = self.client.upload(
            basename(path),
            staged.into_reader()?,
            size,
            &mime_type,
            batch_id,
            self.encrypt(),
        )?;

        // Metadata is only written once the upload returned a reference.
        let now = Utc::now().timestamp();
        self.metadata.create(FileRecord {
            path: path.to_string(),
            storage_id: self.storage_id,
            reference,
            mime_type_id: self.mime_types.id_of(&mime_type),
            size,
            permissions: permissions::READ,
            mtime: now,
            storage_mtime: now,
            etag: None,
        })?;

        Ok(size)
    }

    fn mkdir(&self, _path: &str) -> Result<(), StorageError> {
        Ok(())
    }

    fn rmdir(&self, _path: &str) -> Result<(), StorageError> {
        Ok(())
    }

    fn opendir(&self, _path: &str) -> Result<Vec<String>, StorageError> {
        // Folders are a single-level construct at the mount root, so every
        // listing is a listing of the whole mount.
        let records = self.metadata.list(self.storage_id)?;
        Ok(records.into_iter().map(|record| record.path).collect())
    }

    fn unlink(&self, path: &str) -> Result<(), StorageError> {
        // The backend content is immutable; deletion means dropping the
        // path mapping and leaving the reference orphaned.
        self.metadata
            .delete(path, self.storage_id)
            .map_err(|err| match err {
                MetadataError::NotFound { path } => StorageError::NotFound { path },
                other => StorageError::Metadata(other),
            })
    }

    fn filemtime(&self, path: &str) -> i64 {
        if is_root(path) {
            return 0;
        }
        match self.find_record(path) {
            Ok(record) => record.storage_mtime,
            Err(_) => 0,
        }
    }

    fn free_space(&self, _path: &str) -> i64 {
        SPACE_UNLIMITED
    }

    fn has_updated(&self, _path: &str, _time: i64) -> bool {
        true
    }

    fn touch(&self, _path: &str, _mtime: Option<i64>) -> Result<(), StorageError> {
        Ok(())
    }

    fn permissions(&self, _path: &str) -> i32 {
        permissions::ALL | permissions::CREATE
    }

    fn check(&self) -> Result<(), StorageError> {
        // Scheme validity is established at construction; re-assert it so
        // the host's "test connection" button has something to call.
        let scheme = self.client.api_url().scheme();
        if scheme != "http" && scheme != "https" {
            return Err(StorageError::Configuration {
                message: format!("unsupported scheme '{}'", scheme),
            });
        }
        Ok(())
    }
}
