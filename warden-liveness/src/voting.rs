//! Governance vote scheduling.
//!
//! The tracker never tallies votes. It asks a [`VotingLedger`] whether an
//! identical vote is already pending and, if not, schedules one.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use warden_core::FederationMember;

/// Kind of governance vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteKey {
    /// Remove a federation member.
    KickFederationMember,
}

impl std::fmt::Display for VoteKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VoteKey::KickFederationMember => write!(f, "kick_federation_member"),
        }
    }
}

/// A vote to be included by this node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VotingData {
    /// Vote kind.
    pub key: VoteKey,
    /// Opaque payload; for kicks, the member's canonical bytes.
    pub data: Vec<u8>,
}

impl VotingData {
    /// Create a vote.
    pub fn new(key: VoteKey, data: Vec<u8>) -> Self {
        Self { key, data }
    }

    /// Vote to kick `member`.
    pub fn kick(member: &FederationMember) -> warden_core::Result<Self> {
        Ok(Self::new(
            VoteKey::KickFederationMember,
            member.canonical_bytes()?,
        ))
    }
}

/// The voting ledger as seen by the liveness tracker.
pub trait VotingLedger: Send + Sync {
    /// Whether an unresolved vote of kind `key` with exactly `data` exists.
    fn already_voting_for(&self, key: VoteKey, data: &[u8]) -> bool;

    /// Schedule a vote for inclusion in a future block.
    fn schedule_vote(&self, vote: VotingData);
}

/// Votes scheduled by this node and not yet resolved.
#[derive(Debug, Default)]
pub struct PendingVotes {
    votes: Mutex<Vec<VotingData>>,
}

impl PendingVotes {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of pending votes, oldest first.
    pub fn pending(&self) -> Vec<VotingData> {
        self.votes.lock().clone()
    }

    /// Mark a vote as resolved (applied or rejected).
    ///
    /// Returns false if no such vote was pending.
    pub fn resolve(&self, vote: &VotingData) -> bool {
        let mut votes = self.votes.lock();
        match votes.iter().position(|v| v == vote) {
            Some(idx) => {
                votes.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Number of pending votes.
    pub fn len(&self) -> usize {
        self.votes.lock().len()
    }

    /// Check if no votes are pending.
    pub fn is_empty(&self) -> bool {
        self.votes.lock().is_empty()
    }
}

impl VotingLedger for PendingVotes {
    fn already_voting_for(&self, key: VoteKey, data: &[u8]) -> bool {
        self.votes
            .lock()
            .iter()
            .any(|v| v.key == key && v.data == data)
    }

    fn schedule_vote(&self, vote: VotingData) {
        self.votes.lock().push(vote);
    }
}
