//! Federation node wiring.

use std::sync::Arc;

use bitcoin::Transaction;
use parking_lot::RwLock;
use tracing::info;

use warden_collateral::{
    BlockTemplate, CollateralBlockGuard, CollateralChecker, CommitmentHeightRule, FillOutcome,
    TemplatePipeline,
};
use warden_core::{
    to_header_time, Block, BlockConnected, BlockHash, BlockHeader, ChainedBlock, Clock, Error,
    FederationMember, FederationRoster, MemberKey, Signals, StaticRoster,
};
use warden_liveness::{
    ChainTip, LivenessStore, LivenessTracker, PendingVotes, RoundRobinSlots, SlotAssignment,
    TrackerContext,
};
use warden_storage::{KeyValueRepository, MemoryRepository, RocksRepository};

use crate::config::NodeConfig;
use crate::error::{NodeError, Result};

/// Header of the best connected block.
#[derive(Debug)]
pub struct LocalChain {
    tip: RwLock<BlockHeader>,
}

impl LocalChain {
    /// Start a chain at `genesis`.
    pub fn new(genesis: BlockHeader) -> Self {
        Self {
            tip: RwLock::new(genesis),
        }
    }

    /// Current tip header.
    pub fn tip(&self) -> BlockHeader {
        self.tip.read().clone()
    }

    fn set_tip(&self, header: BlockHeader) {
        *self.tip.write() = header;
    }
}

impl ChainTip for LocalChain {
    fn tip_time(&self) -> u32 {
        self.tip.read().time
    }
}

/// A federation node: roster, chain tip, liveness tracking and block
/// template stages, wired according to [`NodeConfig`].
///
/// - The liveness tracker exists only with `auto_kick_idle_members`.
/// - The collateral guard is installed only on mining nodes with
///   `check_collateral`.
pub struct FederationNode {
    config: NodeConfig,
    signals: Arc<Signals>,
    roster: Arc<StaticRoster>,
    chain: Arc<LocalChain>,
    slots: Arc<RoundRobinSlots>,
    votes: Arc<PendingVotes>,
    pipeline: TemplatePipeline,
    rule: CommitmentHeightRule,
    tracker: Option<LivenessTracker>,
}

impl FederationNode {
    /// Start a node for the federation `members`.
    ///
    /// `own_key` identifies this node's member record, if any.
    pub fn start(
        config: NodeConfig,
        members: Vec<FederationMember>,
        own_key: Option<MemberKey>,
        checker: Arc<dyn CollateralChecker>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;

        let repo = open_repository(&config)?;
        let signals = Arc::new(Signals::new());

        let mut roster = StaticRoster::new(members).with_signals(signals.clone());
        if let Some(key) = own_key {
            roster = roster.with_own_key(key);
        }
        let roster = Arc::new(roster);

        let genesis = BlockHeader::new(
            0,
            BlockHash::ZERO,
            to_header_time(clock.adjusted_unix_timestamp()),
        );
        let chain = Arc::new(LocalChain::new(genesis));
        let slots = Arc::new(RoundRobinSlots::new(
            roster.clone(),
            config.target_spacing_secs,
        ));
        let votes = Arc::new(PendingVotes::new());

        let tracker = if config.liveness.auto_kick_idle_members {
            let ctx = TrackerContext {
                roster: roster.clone(),
                slots: slots.clone(),
                tip: chain.clone(),
                voting: votes.clone(),
                clock,
            };
            Some(LivenessTracker::initialize(
                config.liveness.clone(),
                signals.clone(),
                LivenessStore::new(repo),
                ctx,
            )?)
        } else {
            info!("Idle member kicking disabled");
            None
        };

        let mut pipeline = TemplatePipeline::new();
        if config.mining && config.collateral.check_collateral {
            pipeline = pipeline.with_stage(Arc::new(CollateralBlockGuard::new(
                config.collateral.clone(),
                roster.clone(),
                checker.clone(),
            )));
        }

        let mut rule = CommitmentHeightRule::new(config.collateral.clone());
        if config.collateral.check_collateral {
            rule = rule.with_checker(checker);
        }

        info!(
            members = roster.len(),
            mining = config.mining,
            stages = ?pipeline.stage_names(),
            "Federation node started"
        );

        Ok(Self {
            config,
            signals,
            roster,
            chain,
            slots,
            votes,
            pipeline,
            rule,
            tracker,
        })
    }

    /// Fresh template on top of the current tip.
    pub fn new_template(&self, time: u32, transactions: Vec<Transaction>) -> BlockTemplate {
        let tip = self.chain.tip();
        let header = BlockHeader::new(tip.height + 1, tip.hash(), time);
        BlockTemplate::new(Block::new(header, transactions))
    }

    /// Run the configured template stages.
    ///
    /// On [`FillOutcome::Drop`] the template must be discarded and production
    /// retried at the next slot.
    pub fn fill_template(&self, template: &mut BlockTemplate) -> FillOutcome {
        self.pipeline.fill(template)
    }

    /// Validate `block` and make it the new tip.
    ///
    /// Fails with [`NodeError::Liveness`] after connecting if liveness records
    /// could not be persisted; the node must then stop.
    pub fn connect_block(&self, block: Block) -> Result<ChainedBlock> {
        let height = block.header.height;
        let tip = self.chain.tip();
        if height != tip.height + 1 || block.header.parent != tip.hash() {
            return Err(NodeError::BlockRejected {
                height,
                reason: format!("does not extend tip at height {}", tip.height),
            });
        }

        let producer_key = self.slots.member_for_block(&block.header)?;
        let producer = self
            .roster
            .member(&producer_key)
            .ok_or_else(|| Error::member_not_found(producer_key.to_hex()))?;

        self.rule
            .validate(&block, &producer)
            .map_err(|e| NodeError::BlockRejected {
                height,
                reason: e.to_string(),
            })?;

        let chained = ChainedBlock::new(block);
        self.chain.set_tip(chained.header().clone());
        info!(height, hash = %chained.hash, producer = %producer_key, "Block connected");

        self.signals.publish(&BlockConnected {
            block: chained.clone(),
        });

        // The block stays connected; a halted tracker is the node's to stop on.
        if let Some(tracker) = &self.tracker {
            tracker.check_health()?;
        }
        Ok(chained)
    }

    /// Add a member after a successful governance vote.
    pub fn add_member(&self, member: FederationMember) -> bool {
        self.roster.add_member(member)
    }

    /// Remove a member after a successful governance vote.
    pub fn kick_member(&self, key: &MemberKey) -> Option<FederationMember> {
        self.roster.remove_member(key)
    }

    /// Node configuration.
    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    /// Notification bus.
    pub fn signals(&self) -> &Arc<Signals> {
        &self.signals
    }

    /// Federation roster.
    pub fn roster(&self) -> &Arc<StaticRoster> {
        &self.roster
    }

    /// Current tip header.
    pub fn tip(&self) -> BlockHeader {
        self.chain.tip()
    }

    /// Votes scheduled by this node.
    pub fn votes(&self) -> &Arc<PendingVotes> {
        &self.votes
    }

    /// Liveness tracker, when idle kicking is enabled.
    pub fn tracker(&self) -> Option<&LivenessTracker> {
        self.tracker.as_ref()
    }

    /// Installed template stages.
    pub fn pipeline(&self) -> &TemplatePipeline {
        &self.pipeline
    }
}

fn open_repository(config: &NodeConfig) -> Result<Arc<dyn KeyValueRepository>> {
    match &config.data_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            Ok(Arc::new(RocksRepository::open(dir.join("kv"))?))
        }
        None => Ok(Arc::new(MemoryRepository::new())),
    }
}
