//! Error types for liveness tracking.

use thiserror::Error;

/// Result type for liveness operations.
pub type Result<T> = std::result::Result<T, LivenessError>;

/// Errors that can occur while tracking member liveness.
#[derive(Debug, Error)]
pub enum LivenessError {
    /// The persisted liveness records cannot be decoded.
    ///
    /// Fatal at startup: the records must be repaired, not reset.
    #[error("persisted liveness state is corrupt: {0}")]
    CorruptState(String),

    /// The member entitled to produce a block could not be determined.
    #[error("cannot resolve producer of block at height {height}: {source}")]
    ProducerResolution {
        /// Height of the block.
        height: u64,
        /// Underlying lookup failure.
        #[source]
        source: warden_core::Error,
    },

    /// The adjusted clock gave a time that cannot seed liveness records.
    #[error("adjusted clock reads {0}, refusing to seed liveness records")]
    InvalidClock(i64),

    /// An earlier event failed to persist; the tracker no longer handles events.
    #[error("liveness tracking halted: {0}")]
    Halted(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Core error (storage, serialization).
    #[error("core error: {0}")]
    Core(#[from] warden_core::Error),
}

impl LivenessError {
    /// Whether the error leaves the tracker unable to keep its records durable.
    ///
    /// Only a failure to attribute a block is recoverable.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, LivenessError::ProducerResolution { .. })
    }
}
