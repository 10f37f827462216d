use std::path::PathBuf;
use thiserror::Error;

/// Failures of the recording machinery itself, as opposed to failures of the
/// recorded process (see [`crate::storage::ProcessError`]).
#[derive(Debug, Error)]
pub enum RecordingError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("recording header: {0}")]
    Header(#[from] serde_json::Error),
    #[error("unsupported recording version {0}")]
    UnsupportedVersion(u32),
    #[error("malformed recording: {0}")]
    Malformed(String),
    #[error("no recording at {}", path.display())]
    Missing { path: PathBuf },
}
