//! Validation of height commitments in received blocks.

use std::sync::Arc;

use tracing::debug;
use warden_core::{Block, FederationMember};

use crate::checker::CollateralChecker;
use crate::commitment::decode_from_coinbase;
use crate::config::CollateralConfig;
use crate::error::{CollateralError, Result};

/// Checks that a block's coinbase commits to a usable counter-chain height.
///
/// With `check_collateral` enabled and a checker attached, the producer's
/// collateral is also verified at the committed height. Nodes that do not
/// follow the counter chain run with only the commitment-data checks.
pub struct CommitmentHeightRule {
    config: CollateralConfig,
    checker: Option<Arc<dyn CollateralChecker>>,
}

impl CommitmentHeightRule {
    /// Create a rule that only checks commitment data.
    pub fn new(config: CollateralConfig) -> Self {
        Self {
            config,
            checker: None,
        }
    }

    /// Attach a checker for full collateral verification.
    pub fn with_checker(mut self, checker: Arc<dyn CollateralChecker>) -> Self {
        self.checker = Some(checker);
        self
    }

    /// Validate `block`, produced by `producer`. Returns the committed height.
    pub fn validate(&self, block: &Block, producer: &FederationMember) -> Result<i32> {
        let commitment = decode_from_coinbase(block.coinbase()?);
        let height = commitment.height.ok_or(CollateralError::MissingCommitment)?;

        if let Some(magic) = commitment.magic {
            if magic != self.config.counter_chain_magic {
                return Err(CollateralError::WrongCounterChain {
                    expected: self.config.counter_chain_magic,
                    got: magic,
                });
            }
        }

        if height <= 0 {
            return Err(CollateralError::InvalidCommitmentHeight(height));
        }

        if self.config.check_collateral {
            if let Some(checker) = &self.checker {
                if !checker.check_collateral(producer, height)? {
                    return Err(CollateralError::InsufficientCollateral { height });
                }
            }
        }

        debug!(
            block_height = block.header.height,
            commitment_height = height,
            "Commitment height accepted"
        );
        Ok(height)
    }
}
