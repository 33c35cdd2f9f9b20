//! Federation roster.
//!
//! The roster answers who currently belongs to the federation. Membership
//! changes themselves are decided by governance votes elsewhere; the roster
//! only records the outcome and announces it on the notification bus.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

use crate::crypto::MemberKey;
use crate::events::{FederationMemberAdded, FederationMemberKicked};
use crate::member::FederationMember;
use crate::signals::Signals;

/// Read access to the current federation.
pub trait FederationRoster: Send + Sync {
    /// All current members, in roster order.
    fn members(&self) -> Vec<FederationMember>;

    /// Whether `key` belongs to a multisig member.
    fn is_multisig_member(&self, key: &MemberKey) -> bool;

    /// This node's own member record, if it is an active member.
    fn current_member(&self) -> Option<FederationMember>;

    /// Look up a member by key.
    fn member(&self, key: &MemberKey) -> Option<FederationMember> {
        self.members().into_iter().find(|m| &m.key == key)
    }
}

/// Roster held in memory.
///
/// Membership changes are published as [`FederationMemberAdded`] and
/// [`FederationMemberKicked`] when a bus is attached.
#[derive(Debug, Default)]
pub struct StaticRoster {
    members: RwLock<Vec<FederationMember>>,
    own_key: Option<MemberKey>,
    signals: Option<Arc<Signals>>,
}

impl StaticRoster {
    /// Create a roster with the given members.
    pub fn new(members: Vec<FederationMember>) -> Self {
        Self {
            members: RwLock::new(members),
            own_key: None,
            signals: None,
        }
    }

    /// Set this node's own key.
    pub fn with_own_key(mut self, key: MemberKey) -> Self {
        self.own_key = Some(key);
        self
    }

    /// Announce membership changes on `signals`.
    pub fn with_signals(mut self, signals: Arc<Signals>) -> Self {
        self.signals = Some(signals);
        self
    }

    /// Add a member.
    ///
    /// Returns false if a member with the same key is already present.
    pub fn add_member(&self, member: FederationMember) -> bool {
        {
            let mut members = self.members.write();
            if members.iter().any(|m| m.key == member.key) {
                return false;
            }
            members.push(member.clone());
        }

        info!(member = %member.key, "Federation member added");
        if let Some(signals) = &self.signals {
            signals.publish(&FederationMemberAdded { member });
        }
        true
    }

    /// Remove a member.
    ///
    /// Returns the removed record, or None if the key was not present.
    pub fn remove_member(&self, key: &MemberKey) -> Option<FederationMember> {
        let removed = {
            let mut members = self.members.write();
            let idx = members.iter().position(|m| &m.key == key)?;
            members.remove(idx)
        };

        info!(member = %key, "Federation member removed");
        if let Some(signals) = &self.signals {
            signals.publish(&FederationMemberKicked {
                member: removed.clone(),
            });
        }
        Some(removed)
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.read().len()
    }

    /// Check if the roster is empty.
    pub fn is_empty(&self) -> bool {
        self.members.read().is_empty()
    }
}

impl FederationRoster for StaticRoster {
    fn members(&self) -> Vec<FederationMember> {
        self.members.read().clone()
    }

    fn is_multisig_member(&self, key: &MemberKey) -> bool {
        self.members
            .read()
            .iter()
            .any(|m| &m.key == key && m.is_multisig)
    }

    fn current_member(&self) -> Option<FederationMember> {
        let own = self.own_key.as_ref()?;
        self.member(own)
    }

    fn member(&self, key: &MemberKey) -> Option<FederationMember> {
        self.members.read().iter().find(|m| &m.key == key).cloned()
    }
}
