//! Node errors.

use thiserror::Error;
use warden_collateral::CollateralError;
use warden_liveness::LivenessError;

/// Result type for node operations.
pub type Result<T> = std::result::Result<T, NodeError>;

/// Errors that can occur while running a node.
#[derive(Debug, Error)]
pub enum NodeError {
    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Filesystem error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed configuration file.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A block was rejected.
    #[error("block rejected at height {height}: {reason}")]
    BlockRejected {
        /// Height of the rejected block.
        height: u64,
        /// Why it was rejected.
        reason: String,
    },

    /// Core error.
    #[error(transparent)]
    Core(#[from] warden_core::Error),

    /// Liveness tracking error.
    #[error(transparent)]
    Liveness(#[from] LivenessError),

    /// Collateral error.
    #[error(transparent)]
    Collateral(#[from] CollateralError),
}
