//! Federation member records.

use serde::{Deserialize, Serialize};

use crate::crypto::MemberKey;
use crate::error::Result;

/// Collateral a member must hold on the counter chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollateralRequirement {
    /// Required amount in satoshis.
    pub amount_sats: u64,
    /// Counter-chain address holding the collateral.
    pub counter_chain_address: String,
}

impl CollateralRequirement {
    /// Create a new requirement.
    pub fn new(amount_sats: u64, counter_chain_address: impl Into<String>) -> Self {
        Self {
            amount_sats,
            counter_chain_address: counter_chain_address.into(),
        }
    }
}

/// A member of the block-producing federation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FederationMember {
    /// Member's public key.
    pub key: MemberKey,
    /// Jointly controlled signer, exempt from idle eviction.
    pub is_multisig: bool,
    /// Collateral backing this member, if any is required.
    pub collateral: Option<CollateralRequirement>,
}

impl FederationMember {
    /// Create a regular member without collateral.
    pub fn new(key: MemberKey) -> Self {
        Self {
            key,
            is_multisig: false,
            collateral: None,
        }
    }

    /// Mark as a multisig member.
    pub fn multisig(mut self) -> Self {
        self.is_multisig = true;
        self
    }

    /// Attach a collateral requirement.
    pub fn with_collateral(mut self, collateral: CollateralRequirement) -> Self {
        self.collateral = Some(collateral);
        self
    }

    /// Deterministic serialized form.
    ///
    /// Used as the payload of governance votes that target this member, so two
    /// votes about the same record compare equal byte-for-byte.
    pub fn canonical_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    /// Decode a record produced by [`FederationMember::canonical_bytes`].
    pub fn from_canonical_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(bytes)?)
    }
}
