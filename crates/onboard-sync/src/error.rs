use std::time::Duration;
use thiserror::Error;

/// Failure modes of the sync layer.
///
/// "No row for this user" is not in this enum: store loads report it as
/// `Ok(None)`, since it is the expected state for first-time users and must
/// fall through the resolution chain silently.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("remote store call timed out after {0:?}")]
    Timeout(Duration),

    #[error("remote store error: {0}")]
    Store(String),

    #[error("malformed cached payload: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("local cache I/O failed: {0}")]
    Cache(String),
}

pub type Result<T> = std::result::Result<T, SyncError>;
