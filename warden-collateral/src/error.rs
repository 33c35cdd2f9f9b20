//! Error types for collateral commitments.

use thiserror::Error;

/// Result type for collateral operations.
pub type Result<T> = std::result::Result<T, CollateralError>;

/// Errors that can occur while building or checking collateral commitments.
#[derive(Debug, Error)]
pub enum CollateralError {
    /// The counter chain could not be queried.
    #[error("counter chain unavailable: {0}")]
    CounterChain(String),

    /// The coinbase carries no height commitment.
    #[error("coinbase has no height commitment")]
    MissingCommitment,

    /// The committed height is not positive.
    #[error("invalid commitment height: {0}")]
    InvalidCommitmentHeight(i32),

    /// The commitment was made on a different counter chain.
    #[error("commitment from wrong counter chain: expected magic {expected:#010x}, got {got:#010x}")]
    WrongCounterChain {
        /// Configured counter-chain magic.
        expected: u32,
        /// Magic found in the commitment.
        got: u32,
    },

    /// The producer's collateral was insufficient at the committed height.
    #[error("insufficient collateral at counter-chain height {height}")]
    InsufficientCollateral {
        /// Committed counter-chain height.
        height: i32,
    },

    /// Script construction failed.
    #[error("script error: {0}")]
    Script(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Core error.
    #[error("core error: {0}")]
    Core(#[from] warden_core::Error),
}

impl From<bitcoin::script::PushBytesError> for CollateralError {
    fn from(e: bitcoin::script::PushBytesError) -> Self {
        CollateralError::Script(e.to_string())
    }
}
