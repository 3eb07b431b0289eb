//! Mount configuration: correlates a storage mount with its postage batch.

use std::sync::Arc;

use serde::Deserialize;

/// Application-config key under which the mount list is persisted.
pub const STORAGE_CONFIG_KEY: &str = "storageconfig";

/// A filesystem mount bound to a numeric storage id in the host mount cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MountPoint {
    pub mount_id: i64,
}

/// Resolved per-mount settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountConfig {
    pub mount_id: i64,
    /// The active postage batch authorizing writes. May be empty, in which
    /// case the mount still counts as unconfigured for write purposes.
    pub batch_id: String,
    /// Whether client-side encryption was requested for this mount.
    pub encrypt: bool,
}

/// Host mount cache: which filesystem mounts are bound to a storage id.
pub trait MountCache: Send + Sync {
    fn mounts_for_storage(&self, storage_id: i64) -> Vec<MountPoint>;
}

/// Application configuration values, keyed by name.
pub trait ConfigStore: Send + Sync {
    fn app_value(&self, key: &str) -> Option<String>;
}

/// Persisted JSON shape of one mount entry.
///
/// `encrypt` is stored as the string `"0"`/`"1"`, not a boolean.
#[derive(Debug, Deserialize)]
struct MountEntry {
    mount_id: i64,
    #[serde(default)]
    encrypt: String,
    #[serde(default)]
    batchid: String,
}

/// Resolves the active configuration for a storage mount.
pub struct MountResolver {
    mount_cache: Arc<dyn MountCache>,
    config: Arc<dyn ConfigStore>,
}

impl MountResolver {
    pub fn new(mount_cache: Arc<dyn MountCache>, config: Arc<dyn ConfigStore>) -> Self {
        Self {
            mount_cache,
            config,
        }
    }

    /// Look up the configuration for `storage_id`.
    ///
    /// Takes the first mount bound to the storage id, decodes the
    /// persisted JSON list and finds the entry whose `mount_id` equals the
    /// mount's identity. `None` means the mount is unconfigured - not an
    /// error here, only later when a write needs the batch id.
    pub fn resolve(&self, storage_id: i64) -> Option<MountConfig> {
        let mounts = self.mount_cache.mounts_for_storage(storage_id);
        let mount = mounts.first()?;

        let raw = self.config.app_value(STORAGE_CONFIG_KEY)?;
        let entries: Vec<MountEntry> = match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(err) => {
                log::warn!("malformed storage configuration under '{}': {}", STORAGE_CONFIG_KEY, err);
                return None;
            }
        };

        entries
            .into_iter()
            .find(|entry| entry.mount_id == mount.mount_id)
            .map(|entry| MountConfig {
                mount_id: entry.mount_id,
                batch_id: entry.batchid,
                encrypt: entry.encrypt == "1",
            })
    }
}
