//! Node events carried over [`Signals`](crate::signals::Signals).

use crate::block::ChainedBlock;
use crate::member::FederationMember;
use crate::signals::Event;

/// A block was connected to the best chain.
#[derive(Debug, Clone)]
pub struct BlockConnected {
    /// The connected block.
    pub block: ChainedBlock,
}

impl Event for BlockConnected {}

/// A member joined the federation.
#[derive(Debug, Clone)]
pub struct FederationMemberAdded {
    /// The new member.
    pub member: FederationMember,
}

impl Event for FederationMemberAdded {}

/// A member was removed from the federation.
#[derive(Debug, Clone)]
pub struct FederationMemberKicked {
    /// The removed member.
    pub member: FederationMember,
}

impl Event for FederationMemberKicked {}
