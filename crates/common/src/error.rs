use thiserror::Error;

/// Failures reported by an object-storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Object s3://{bucket}/{key} does not exist")]
    NotFound { bucket: String, key: String },

    #[error("Storage service error: {0}")]
    Service(String),

    #[error("Object body stream interrupted: {0}")]
    Stream(String),
}

/// Error taxonomy of the relay pipeline.
///
/// Every variant is fatal to the invocation that produced it.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Failed to read s3://{bucket}/{key}: {source}")]
    StorageRead {
        bucket: String,
        key: String,
        #[source]
        source: StorageError,
    },

    #[error("Failed to decode payload of {key}: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Malformed storage notification: {0}")]
    Notification(#[source] serde_json::Error),

    #[error("Dispatch request failed: {0}")]
    DispatchTransport(#[from] reqwest::Error),

    #[error("GitHub API responded with status code: {status}, body: {body}")]
    DispatchRejected { status: u16, body: String },

    #[error("Failed to archive s3://{bucket}/{from} to {to}: {source}")]
    Archive {
        bucket: String,
        from: String,
        to: String,
        #[source]
        source: StorageError,
    },

    #[error("Failed to delete s3://{bucket}/{key} after archiving: {source}")]
    Cleanup {
        bucket: String,
        key: String,
        #[source]
        source: StorageError,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl RelayError {
    /// Name of the pipeline stage that failed, for log fields.
    pub fn stage(&self) -> &'static str {
        match self {
            RelayError::StorageRead { .. } => "fetch",
            RelayError::Decode { .. } => "decode",
            RelayError::Notification(_) => "notification",
            RelayError::DispatchTransport(_) | RelayError::DispatchRejected { .. } => "dispatch",
            RelayError::Archive { .. } => "archive",
            RelayError::Cleanup { .. } => "cleanup",
            RelayError::Config(_) => "config",
        }
    }
}
