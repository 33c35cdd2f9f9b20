//! Block template filling.
//!
//! A [`TemplatePipeline`] runs its stages in order over a fresh template. Any
//! stage may veto the template, in which case this node produces no block for
//! the slot.

use std::fmt;
use std::sync::Arc;

use bitcoin::Amount;
use tracing::debug;
use warden_core::Block;

/// A block under construction.
#[derive(Debug, Clone)]
pub struct BlockTemplate {
    /// The block; its first transaction is the coinbase.
    pub block: Block,
    /// Fees collected by the template's transactions.
    pub total_fee: Amount,
}

impl BlockTemplate {
    /// Wrap a block with no collected fees.
    pub fn new(block: Block) -> Self {
        Self {
            block,
            total_fee: Amount::ZERO,
        }
    }
}

/// Why a stage vetoed a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    /// The counter chain is too short to commit to any height.
    LowCommitmentHeight {
        /// Computed commitment height.
        commitment_height: i32,
        /// Counter-chain blocks needed before a height can be committed.
        required_depth: u64,
    },
    /// This node is not a federation member.
    NotAFederationMember,
    /// Own collateral is insufficient at the commitment height.
    InsufficientCollateral {
        /// Counter-chain height checked.
        commitment_height: i32,
    },
    /// The counter chain could not be queried.
    CounterChainUnavailable(String),
    /// The template has no coinbase transaction.
    MissingCoinbase,
    /// The commitment output could not be built.
    InvalidCommitment(String),
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::LowCommitmentHeight {
                commitment_height,
                required_depth,
            } => write!(
                f,
                "commitment height {} not positive; counter chain must first advance at least {} blocks",
                commitment_height, required_depth
            ),
            DropReason::NotAFederationMember => write!(f, "not a federation member"),
            DropReason::InsufficientCollateral { commitment_height } => write!(
                f,
                "insufficient collateral at counter-chain height {}",
                commitment_height
            ),
            DropReason::CounterChainUnavailable(e) => write!(f, "counter chain unavailable: {}", e),
            DropReason::MissingCoinbase => write!(f, "template has no coinbase"),
            DropReason::InvalidCommitment(e) => write!(f, "invalid commitment: {}", e),
        }
    }
}

/// Result of running a stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FillOutcome {
    /// Continue with the next stage.
    Proceed,
    /// Discard the template.
    Drop(DropReason),
}

impl FillOutcome {
    /// Whether the template survived.
    pub fn is_proceed(&self) -> bool {
        matches!(self, FillOutcome::Proceed)
    }
}

/// One step of template filling.
pub trait TemplateStage: Send + Sync {
    /// Stage name, for logs.
    fn name(&self) -> &'static str;

    /// Inspect or amend `template`.
    fn fill(&self, template: &mut BlockTemplate) -> FillOutcome;
}

/// Ordered set of template stages.
#[derive(Default, Clone)]
pub struct TemplatePipeline {
    stages: Vec<Arc<dyn TemplateStage>>,
}

impl TemplatePipeline {
    /// Create an empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage.
    pub fn with_stage(mut self, stage: Arc<dyn TemplateStage>) -> Self {
        self.stages.push(stage);
        self
    }

    /// Names of the installed stages, in order.
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Run every stage; stops at the first veto.
    pub fn fill(&self, template: &mut BlockTemplate) -> FillOutcome {
        for stage in &self.stages {
            if let FillOutcome::Drop(reason) = stage.fill(template) {
                debug!(stage = stage.name(), %reason, "Template dropped");
                return FillOutcome::Drop(reason);
            }
        }
        FillOutcome::Proceed
    }
}

impl fmt::Debug for TemplatePipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplatePipeline")
            .field("stages", &self.stage_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use warden_core::{BlockHash, BlockHeader};

    struct Counting {
        calls: AtomicUsize,
        veto: bool,
    }

    impl TemplateStage for Counting {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn fill(&self, _template: &mut BlockTemplate) -> FillOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.veto {
                FillOutcome::Drop(DropReason::NotAFederationMember)
            } else {
                FillOutcome::Proceed
            }
        }
    }

    fn stage(veto: bool) -> Arc<Counting> {
        Arc::new(Counting {
            calls: AtomicUsize::new(0),
            veto,
        })
    }

    fn template() -> BlockTemplate {
        BlockTemplate::new(Block::new(BlockHeader::new(1, BlockHash::ZERO, 16), vec![]))
    }

    #[test]
    fn test_empty_pipeline_proceeds() {
        assert!(TemplatePipeline::new().fill(&mut template()).is_proceed());
    }

    #[test]
    fn test_veto_stops_pipeline() {
        let first = stage(false);
        let second = stage(true);
        let third = stage(false);
        let pipeline = TemplatePipeline::new()
            .with_stage(first.clone())
            .with_stage(second.clone())
            .with_stage(third.clone());

        assert_eq!(
            pipeline.fill(&mut template()),
            FillOutcome::Drop(DropReason::NotAFederationMember)
        );
        assert_eq!(first.calls.load(Ordering::SeqCst), 1);
        assert_eq!(second.calls.load(Ordering::SeqCst), 1);
        assert_eq!(third.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_drop_reason_display() {
        let reason = DropReason::LowCommitmentHeight {
            commitment_height: -5,
            required_depth: 60,
        };
        assert!(reason.to_string().contains("at least 60 blocks"));
    }
}
