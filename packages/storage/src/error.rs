use crate::metadata::MetadataError;

/// Failures surfaced to the invoking filesystem layer.
///
/// None of these are retried internally; every variant propagates to the
/// caller as an operation failure.
#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    /// Required construction parameters are missing or invalid.
    #[error("storage configuration error: {message}")]
    Configuration { message: String },

    /// Write attempted on a mount with no active postage batch.
    #[error(
        "file not uploaded: there is no active batch associated with this storage, \
         please check your administration settings"
    )]
    MissingBatch,

    /// Transport failure or backend rejection from the bee node.
    #[error(transparent)]
    Transport(#[from] swarmfs_bee::Error),

    /// No file record exists for the path.
    #[error("no file record for '{path}'")]
    NotFound { path: String },

    /// The operation is deliberately not implemented for this backend.
    #[error("operation not supported: {operation}")]
    Unsupported { operation: String },

    #[error("metadata store error: {0}")]
    Metadata(#[from] MetadataError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_batch_names_the_batch() {
        let message = StorageError::MissingBatch.to_string();
        assert!(message.contains("no active batch"));
    }

    #[test]
    fn transport_errors_pass_through_unchanged() {
        let inner = swarmfs_bee::Error::Rejected {
            message: "batch not usable".to_string(),
        };
        let err: StorageError = inner.into();
        assert!(err.to_string().contains("batch not usable"));
    }
}
