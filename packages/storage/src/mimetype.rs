//! Mime type handling: content sniffing and the shared string ↔ id table.

use std::collections::HashMap;
use std::sync::Mutex;

/// Fallback when the content matches no known signature.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Mime type reported for the root pseudo-directory.
pub const DIRECTORY: &str = "httpd/unix-directory";

/// Detect a mime type from the leading bytes of staged content.
pub fn detect_mime(head: &[u8]) -> &'static str {
    match infer::get(head) {
        Some(kind) => kind.mime_type(),
        None => OCTET_STREAM,
    }
}

/// Shared mime-type table.
///
/// File records store the integer id rather than the raw string, so the
/// same type is never persisted twice.
pub trait MimeTypeRegistry: Send + Sync {
    /// Id for a mime type string, allocating one on first sight.
    fn id_of(&self, mime_type: &str) -> i64;

    /// String form of a previously issued id.
    fn name_of(&self, id: i64) -> Option<String>;
}

/// In-memory [`MimeTypeRegistry`]; ids are issued sequentially from 1.
pub struct InMemoryMimeRegistry {
    inner: Mutex<RegistryInner>,
}

struct RegistryInner {
    ids: HashMap<String, i64>,
    names: Vec<String>,
}

impl InMemoryMimeRegistry {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(RegistryInner {
                ids: HashMap::new(),
                names: Vec::new(),
            }),
        }
    }
}

impl Default for InMemoryMimeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MimeTypeRegistry for InMemoryMimeRegistry {
    fn id_of(&self, mime_type: &str) -> i64 {
        let mut inner = self.inner.lock().unwrap();
        if let Some(id) = inner.ids.get(mime_type) {
            return *id;
        }
        inner.names.push(mime_type.to_string());
        let id = inner.names.len() as i64;
        inner.ids.insert(mime_type.to_string(), id);
        id
    }

    fn name_of(&self, id: i64) -> Option<String> {
        if id < 1 {
            return None;
        }
        let inner = self.inner.lock().unwrap();
        inner.names.get((id - 1) as usize).cloned()
    }
}
