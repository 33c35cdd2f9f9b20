//! Consensus-side collaborators: slot assignment and the chain tip.

use std::sync::Arc;

use warden_core::{BlockHeader, Error, FederationRoster, MemberKey, Result};

/// Resolves which member was entitled to produce a block.
pub trait SlotAssignment: Send + Sync {
    /// The member assigned to the slot `header` was produced in.
    ///
    /// Fails if the slot cannot be resolved; callers must not guess.
    fn member_for_block(&self, header: &BlockHeader) -> Result<MemberKey>;
}

/// Read access to the consensus tip.
pub trait ChainTip: Send + Sync {
    /// Header timestamp of the current tip.
    fn tip_time(&self) -> u32;
}

/// Timestamp-based round-robin slots.
///
/// Time is divided into slots of `target_spacing` seconds; block timestamps
/// must fall exactly on a slot boundary, and slot `n` belongs to the member at
/// position `n % len` of the roster.
pub struct RoundRobinSlots {
    roster: Arc<dyn FederationRoster>,
    target_spacing: u32,
}

impl RoundRobinSlots {
    /// Create slots over `roster` with the given spacing in seconds.
    pub fn new(roster: Arc<dyn FederationRoster>, target_spacing: u32) -> Self {
        Self {
            roster,
            target_spacing,
        }
    }

    /// Slot length in seconds.
    pub fn target_spacing(&self) -> u32 {
        self.target_spacing
    }
}

impl SlotAssignment for RoundRobinSlots {
    fn member_for_block(&self, header: &BlockHeader) -> Result<MemberKey> {
        if self.target_spacing == 0 {
            return Err(Error::internal("target spacing is zero"));
        }
        if header.time % self.target_spacing != 0 {
            return Err(Error::invalid_block(format!(
                "timestamp {} is not aligned to {}s slots",
                header.time, self.target_spacing
            )));
        }

        let members = self.roster.members();
        if members.is_empty() {
            return Err(Error::member_not_found("federation is empty"));
        }

        let slot = (header.time / self.target_spacing) as usize;
        Ok(members[slot % members.len()].key)
    }
}
