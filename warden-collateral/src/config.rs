//! Collateral commitment configuration.

use serde::{Deserialize, Serialize};

use crate::error::CollateralError;

/// Safety margin, in counter-chain blocks, on top of the reorg depth.
pub const DEFAULT_SYNC_BUFFER: u32 = 50;

/// Reorg depth assumed for counter chains that do not declare one.
pub const FALLBACK_MAX_REORG_LENGTH: u32 = 200;

/// Configuration for collateral commitments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollateralConfig {
    /// Network magic of the counter chain, committed next to the height.
    pub counter_chain_magic: u32,

    /// Maximum reorg depth of the counter chain (0 = use the fallback).
    pub max_reorg_length: u32,

    /// Extra blocks subtracted on top of the reorg depth.
    pub sync_buffer: u32,

    /// Whether received blocks get a full collateral check at the committed
    /// height, or only a check of the commitment data.
    pub check_collateral: bool,
}

impl CollateralConfig {
    /// Create a configuration for the counter chain with the given magic.
    pub fn new(counter_chain_magic: u32) -> Self {
        Self {
            counter_chain_magic,
            max_reorg_length: 0,
            sync_buffer: DEFAULT_SYNC_BUFFER,
            check_collateral: true,
        }
    }

    /// Set the counter chain's maximum reorg depth.
    pub fn with_max_reorg_length(mut self, blocks: u32) -> Self {
        self.max_reorg_length = blocks;
        self
    }

    /// Set the sync buffer.
    pub fn with_sync_buffer(mut self, blocks: u32) -> Self {
        self.sync_buffer = blocks;
        self
    }

    /// Enable or disable full collateral checks on received blocks.
    pub fn with_check_collateral(mut self, enabled: bool) -> Self {
        self.check_collateral = enabled;
        self
    }

    /// Reorg depth in effect.
    pub fn effective_max_reorg_length(&self) -> u32 {
        if self.max_reorg_length == 0 {
            FALLBACK_MAX_REORG_LENGTH
        } else {
            self.max_reorg_length
        }
    }

    /// Counter-chain blocks that must exist before any height can be committed.
    pub fn required_depth(&self) -> u64 {
        self.effective_max_reorg_length() as u64 + self.sync_buffer as u64
    }

    /// `counter_chain_height − max_reorg − sync_buffer`, saturated to `i32`.
    pub fn commitment_height(&self, counter_chain_height: i32) -> i32 {
        let height = counter_chain_height as i64 - self.required_depth() as i64;
        height.clamp(i32::MIN as i64, i32::MAX as i64) as i32
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), CollateralError> {
        if self.counter_chain_magic == 0 {
            return Err(CollateralError::Config(
                "counter_chain_magic is required".into(),
            ));
        }
        Ok(())
    }
}

impl Default for CollateralConfig {
    fn default() -> Self {
        Self::new(0)
    }
}
