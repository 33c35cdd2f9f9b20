//! Collateral gate for block production.

use std::sync::Arc;

use bitcoin::{Amount, TxOut};
use tracing::{info, warn};
use warden_core::FederationRoster;

use crate::checker::CollateralChecker;
use crate::commitment::commitment_script;
use crate::config::CollateralConfig;
use crate::template::{BlockTemplate, DropReason, FillOutcome, TemplateStage};

/// Template stage that refuses to produce unless this node's collateral is
/// in place, and commits to the counter-chain height it was checked at.
///
/// On success exactly one zero-value null-data output is appended to the
/// coinbase; existing outputs are left as they were.
pub struct CollateralBlockGuard {
    config: CollateralConfig,
    roster: Arc<dyn FederationRoster>,
    checker: Arc<dyn CollateralChecker>,
}

impl CollateralBlockGuard {
    /// Create a guard.
    pub fn new(
        config: CollateralConfig,
        roster: Arc<dyn FederationRoster>,
        checker: Arc<dyn CollateralChecker>,
    ) -> Self {
        Self {
            config,
            roster,
            checker,
        }
    }

    /// Guard configuration.
    pub fn config(&self) -> &CollateralConfig {
        &self.config
    }
}

impl TemplateStage for CollateralBlockGuard {
    fn name(&self) -> &'static str {
        "collateral"
    }

    fn fill(&self, template: &mut BlockTemplate) -> FillOutcome {
        let counter_chain_height = match self.checker.counter_chain_consensus_height() {
            Ok(height) => height,
            Err(e) => {
                warn!(error = %e, "Could not read counter-chain height, skipping block");
                return FillOutcome::Drop(DropReason::CounterChainUnavailable(e.to_string()));
            }
        };

        let commitment_height = self.config.commitment_height(counter_chain_height);
        if commitment_height <= 0 {
            let required_depth = self.config.required_depth();
            info!(
                counter_chain_height,
                commitment_height,
                required_depth,
                "Counter chain should first advance further before blocks can be produced"
            );
            return FillOutcome::Drop(DropReason::LowCommitmentHeight {
                commitment_height,
                required_depth,
            });
        }

        let Some(member) = self.roster.current_member() else {
            info!("Not an active federation member, skipping block");
            return FillOutcome::Drop(DropReason::NotAFederationMember);
        };

        match self.checker.check_collateral(&member, commitment_height) {
            Ok(true) => {}
            Ok(false) => {
                warn!(
                    member = %member.key,
                    commitment_height,
                    "Insufficient collateral, skipping block"
                );
                return FillOutcome::Drop(DropReason::InsufficientCollateral { commitment_height });
            }
            Err(e) => {
                warn!(error = %e, commitment_height, "Collateral check failed, skipping block");
                return FillOutcome::Drop(DropReason::CounterChainUnavailable(e.to_string()));
            }
        }

        let script = match commitment_script(commitment_height, self.config.counter_chain_magic) {
            Ok(script) => script,
            Err(e) => return FillOutcome::Drop(DropReason::InvalidCommitment(e.to_string())),
        };

        let coinbase = match template.block.coinbase_mut() {
            Ok(coinbase) => coinbase,
            Err(_) => return FillOutcome::Drop(DropReason::MissingCoinbase),
        };
        coinbase.output.push(TxOut {
            value: Amount::ZERO,
            script_pubkey: script,
        });

        info!(
            commitment_height,
            magic = self.config.counter_chain_magic,
            "Added counter-chain height commitment"
        );
        FillOutcome::Proceed
    }
}
