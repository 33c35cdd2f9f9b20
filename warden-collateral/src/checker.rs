//! Counter-chain collateral queries.

use std::collections::{BTreeMap, HashMap};

use parking_lot::RwLock;
use warden_core::FederationMember;

use crate::error::{CollateralError, Result};

/// Read access to the counter chain's view of member collateral.
pub trait CollateralChecker: Send + Sync {
    /// Consensus tip height of the counter chain.
    fn counter_chain_consensus_height(&self) -> Result<i32>;

    /// Whether `member` held its required collateral at counter-chain `height`.
    ///
    /// Members without a collateral requirement always pass.
    fn check_collateral(&self, member: &FederationMember, height: i32) -> Result<bool>;
}

/// In-process counter-chain view, fed by whatever follows the counter chain.
///
/// Balances are recorded as changes at a height; the balance at height `h`
/// is the latest change at or below `h`.
#[derive(Debug, Default)]
pub struct CounterChainSnapshot {
    tip: RwLock<Option<i32>>,
    balances: RwLock<HashMap<String, BTreeMap<i32, u64>>>,
}

impl CounterChainSnapshot {
    /// Create an empty, unsynced view.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the counter chain's consensus tip.
    pub fn set_tip(&self, height: i32) {
        *self.tip.write() = Some(height);
    }

    /// Record `address` holding `sats` from `height` onwards.
    pub fn set_balance(&self, address: impl Into<String>, height: i32, sats: u64) {
        self.balances
            .write()
            .entry(address.into())
            .or_default()
            .insert(height, sats);
    }

    /// Balance of `address` at `height`.
    pub fn balance_at(&self, address: &str, height: i32) -> u64 {
        self.balances
            .read()
            .get(address)
            .and_then(|changes| changes.range(..=height).next_back())
            .map(|(_, sats)| *sats)
            .unwrap_or(0)
    }
}

impl CollateralChecker for CounterChainSnapshot {
    fn counter_chain_consensus_height(&self) -> Result<i32> {
        (*self.tip.read())
            .ok_or_else(|| CollateralError::CounterChain("counter chain not synced".into()))
    }

    fn check_collateral(&self, member: &FederationMember, height: i32) -> Result<bool> {
        let Some(requirement) = &member.collateral else {
            return Ok(true);
        };
        if requirement.amount_sats == 0 {
            return Ok(true);
        }
        if self.tip.read().map_or(true, |tip| height > tip) {
            return Err(CollateralError::CounterChain(format!(
                "height {} is beyond the counter-chain tip",
                height
            )));
        }

        Ok(self.balance_at(&requirement.counter_chain_address, height) >= requirement.amount_sats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_core::{CollateralRequirement, MemberKey};

    fn member(n: u8, sats: u64) -> FederationMember {
        FederationMember::new(MemberKey::from_secret_bytes(&[n; 32]).unwrap())
            .with_collateral(CollateralRequirement::new(sats, format!("addr-{}", n)))
    }

    #[test]
    fn test_unsynced() {
        let view = CounterChainSnapshot::new();
        assert!(view.counter_chain_consensus_height().is_err());
        assert!(view.check_collateral(&member(1, 10), 5).is_err());
    }

    #[test]
    fn test_balance_history() {
        let view = CounterChainSnapshot::new();
        view.set_tip(100);
        view.set_balance("addr-1", 10, 500);
        view.set_balance("addr-1", 50, 100);

        assert_eq!(view.balance_at("addr-1", 9), 0);
        assert_eq!(view.balance_at("addr-1", 10), 500);
        assert_eq!(view.balance_at("addr-1", 49), 500);
        assert_eq!(view.balance_at("addr-1", 50), 100);
        assert_eq!(view.balance_at("addr-2", 50), 0);

        assert!(view.check_collateral(&member(1, 500), 40).unwrap());
        assert!(!view.check_collateral(&member(1, 500), 60).unwrap());
    }

    #[test]
    fn test_no_requirement_passes() {
        let view = CounterChainSnapshot::new();
        let key = MemberKey::from_secret_bytes(&[3; 32]).unwrap();
        assert!(view
            .check_collateral(&FederationMember::new(key), 1_000)
            .unwrap());
        assert!(view.check_collateral(&member(4, 0), 1_000).unwrap());
    }

    #[test]
    fn test_height_beyond_tip() {
        let view = CounterChainSnapshot::new();
        view.set_tip(10);
        view.set_balance("addr-1", 1, 1_000);
        assert!(view.check_collateral(&member(1, 10), 11).is_err());
    }
}
