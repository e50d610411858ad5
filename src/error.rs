//! Error types shared by the recording session and the recording store.
//!
//! Command handlers wrap these in `anyhow` at the edge; the core modules return
//! them directly so callers can tell a missing microphone apart from a failed write.

use thiserror::Error;

/// Failures raised by capture, session, and storage operations.
///
/// Every variant is terminal to the operation that produced it only. Nothing
/// in the application retries automatically.
#[derive(Error, Debug)]
pub enum MurmurError {
    /// Microphone permission denied, no input device, or the stream could not be built.
    #[error("Microphone unavailable: {0}")]
    CaptureUnavailable(String),

    /// `start()` was called while a session is already recording.
    #[error("A recording is already in progress")]
    AlreadyRecording,

    /// The capture backend could not assemble the finished clip.
    #[error("Capture failed: {0}")]
    Capture(String),

    /// The underlying database rejected an operation.
    #[error("Storage operation failed: {0}")]
    Persistence(#[from] rusqlite::Error),

    /// A stored row could not be decoded.
    #[error("Recording #{id} is corrupt: {reason}")]
    CorruptRecord {
        /// Identifier of the offending row.
        id: i64,
        /// What could not be decoded.
        reason: String,
    },

    /// Filesystem failure (database directory, playback temp file).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MurmurError {
    /// Returns true for errors the user can act on (plug in a mic, grant access).
    pub fn is_capture_unavailable(&self) -> bool {
        matches!(self, MurmurError::CaptureUnavailable(_))
    }
}

/// Result alias used throughout the core modules.
pub type Result<T> = std::result::Result<T, MurmurError>;
