//! Idle federation member detection.
//!
//! The tracker keeps the last time each member produced a block (or joined)
//! and, on every connected block, proposes a kick vote for every member that
//! has been idle longer than the configured window.
//!
//! ```text
//! BlockConnected ──► update producer's time ──► save ──► scan all members
//!                                                          │
//!                       idle > max && !multisig ◄──────────┘
//!                                  │
//!                already voting? ──┴── no ──► schedule KickFederationMember
//! ```
//!
//! Every mutation of the records is written through to the store before the
//! handler returns.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use warden_core::{
    to_header_time, BlockConnected, ChainedBlock, Clock, FederationMember, FederationMemberAdded,
    FederationMemberKicked, FederationRoster, MemberKey, Signals, SubscriptionToken,
};

use crate::chain::{ChainTip, SlotAssignment};
use crate::config::LivenessConfig;
use crate::error::{LivenessError, Result};
use crate::store::{LastActiveTimes, LivenessStore};
use crate::voting::{VoteKey, VotingData, VotingLedger};

/// External collaborators of the tracker.
#[derive(Clone)]
pub struct TrackerContext {
    /// Federation roster.
    pub roster: Arc<dyn FederationRoster>,
    /// Slot assignment used to attribute blocks to members.
    pub slots: Arc<dyn SlotAssignment>,
    /// Consensus tip.
    pub tip: Arc<dyn ChainTip>,
    /// Voting ledger receiving kick votes.
    pub voting: Arc<dyn VotingLedger>,
    /// Adjusted wall clock.
    pub clock: Arc<dyn Clock>,
}

/// Tracks member liveness and schedules kicks for idle members.
///
/// Dropping the tracker removes its subscriptions.
pub struct LivenessTracker {
    inner: Arc<TrackerInner>,
    signals: Arc<Signals>,
    tokens: Vec<SubscriptionToken>,
}

struct TrackerInner {
    config: LivenessConfig,
    store: LivenessStore,
    ctx: TrackerContext,
    last_active: Mutex<LastActiveTimes>,
    // Set once an event could not be persisted.
    halted: Mutex<Option<String>>,
}

impl LivenessTracker {
    /// Load persisted records and subscribe to node events.
    ///
    /// On first start (nothing persisted) every roster member is seeded with
    /// the current adjusted time and the records are saved. Corrupt records
    /// abort initialization.
    pub fn initialize(
        config: LivenessConfig,
        signals: Arc<Signals>,
        store: LivenessStore,
        ctx: TrackerContext,
    ) -> Result<Self> {
        config.validate()?;

        let last_active = match store.load()? {
            Some(times) => {
                info!(members = times.len(), "Loaded federation liveness records");
                times
            }
            None => {
                debug!("No saved liveness records found, seeding with current time");
                // Seeding with zero would make every member idle immediately.
                let adjusted = ctx.clock.adjusted_unix_timestamp();
                if adjusted <= 0 {
                    return Err(LivenessError::InvalidClock(adjusted));
                }
                let now = to_header_time(adjusted);
                let times: LastActiveTimes =
                    ctx.roster.members().into_iter().map(|m| (m.key, now)).collect();
                store.save(&times)?;
                times
            }
        };

        let inner = Arc::new(TrackerInner {
            config,
            store,
            ctx,
            last_active: Mutex::new(last_active),
            halted: Mutex::new(None),
        });

        let tokens = Self::subscribe(&signals, &inner);

        Ok(Self {
            inner,
            signals,
            tokens,
        })
    }

    fn subscribe(signals: &Signals, inner: &Arc<TrackerInner>) -> Vec<SubscriptionToken> {
        let weak: Weak<TrackerInner> = Arc::downgrade(inner);
        let on_block = signals.subscribe::<BlockConnected, _>(move |event| {
            if let Some(inner) = weak.upgrade() {
                inner.handle_event("block_connected", |inner| {
                    inner.on_block_connected(&event.block)
                });
            }
        });

        let weak = Arc::downgrade(inner);
        let on_added = signals.subscribe::<FederationMemberAdded, _>(move |event| {
            if let Some(inner) = weak.upgrade() {
                inner.handle_event("member_added", |inner| inner.on_member_added(&event.member));
            }
        });

        let weak = Arc::downgrade(inner);
        let on_kicked = signals.subscribe::<FederationMemberKicked, _>(move |event| {
            if let Some(inner) = weak.upgrade() {
                inner.handle_event("member_kicked", |inner| inner.on_member_kicked(&event.member));
            }
        });

        vec![on_block, on_added, on_kicked]
    }

    /// Handle a connected block.
    ///
    /// Returns the members for which a kick vote was scheduled.
    pub fn on_block_connected(&self, block: &ChainedBlock) -> Result<Vec<FederationMember>> {
        self.inner.on_block_connected(block)
    }

    /// Handle a member joining the federation.
    ///
    /// Returns false if the member was already tracked.
    pub fn on_member_added(&self, member: &FederationMember) -> Result<bool> {
        self.inner.on_member_added(member)
    }

    /// Handle a member leaving the federation.
    ///
    /// Returns false if the member was not tracked.
    pub fn on_member_kicked(&self, member: &FederationMember) -> Result<bool> {
        self.inner.on_member_kicked(member)
    }

    /// Idle seconds of `key` at `block_time` if it should be kicked.
    pub fn should_be_kicked(&self, key: &MemberKey, block_time: u32) -> Option<u64> {
        let times = self.inner.last_active.lock();
        self.inner.kick_candidate(&times, key, block_time)
    }

    /// Last-active time of a member.
    pub fn last_active(&self, key: &MemberKey) -> Option<u32> {
        self.inner.last_active.lock().get(key).copied()
    }

    /// Copy of all records.
    pub fn snapshot(&self) -> LastActiveTimes {
        self.inner.last_active.lock().clone()
    }

    /// The tracker configuration.
    pub fn config(&self) -> &LivenessConfig {
        &self.inner.config
    }

    /// Fails with [`LivenessError::Halted`] once an event delivered over the
    /// bus could not be persisted. A halted tracker drops all further events.
    pub fn check_health(&self) -> Result<()> {
        match self.inner.halted.lock().as_ref() {
            Some(reason) => Err(LivenessError::Halted(reason.clone())),
            None => Ok(()),
        }
    }
}

impl Drop for LivenessTracker {
    fn drop(&mut self) {
        for token in &self.tokens {
            self.signals.unsubscribe(token);
        }
    }
}

impl TrackerInner {
    /// Run a handler for an event received over the bus.
    ///
    /// Unattributable blocks are logged and skipped. Any other failure halts
    /// the tracker, since its records could no longer be kept durable.
    fn handle_event<T>(&self, event: &'static str, handler: impl FnOnce(&Self) -> Result<T>) {
        if let Some(reason) = self.halted.lock().as_ref() {
            error!(event, "Liveness tracking halted, dropping event: {}", reason);
            return;
        }

        match handler(self) {
            Ok(_) => {}
            Err(e) if e.is_fatal() => {
                error!(event, "Liveness records not persisted, halting tracker: {}", e);
                *self.halted.lock() = Some(e.to_string());
            }
            Err(e) => error!(event, "Liveness update failed: {}", e),
        }
    }

    fn on_member_added(&self, member: &FederationMember) -> Result<bool> {
        let mut times = self.last_active.lock();
        if times.contains_key(&member.key) {
            return Ok(false);
        }

        let tip_time = self.ctx.tip.tip_time();
        let mut next = times.clone();
        next.insert(member.key, tip_time);
        self.store.save(&next)?;
        *times = next;

        debug!(member = %member.key, tip_time, "Tracking new federation member");
        Ok(true)
    }

    fn on_member_kicked(&self, member: &FederationMember) -> Result<bool> {
        let mut times = self.last_active.lock();
        let mut next = times.clone();
        let removed = next.remove(&member.key).is_some();
        self.store.save(&next)?;
        *times = next;

        debug!(member = %member.key, removed, "Stopped tracking federation member");
        Ok(removed)
    }

    fn on_block_connected(&self, block: &ChainedBlock) -> Result<Vec<FederationMember>> {
        let mut times = self.last_active.lock();

        let timestamp = block.time();
        let producer = self
            .ctx
            .slots
            .member_for_block(block.header())
            .map_err(|source| LivenessError::ProducerResolution {
                height: block.height(),
                source,
            })?;

        // Memory follows disk: a failed save leaves both untouched.
        let mut next = times.clone();
        next.insert(producer, timestamp);
        self.store.save(&next)?;
        *times = next;

        // Scan every tracked member, including the one just updated.
        let mut candidates: Vec<(MemberKey, u64)> = times
            .keys()
            .filter_map(|key| {
                self.kick_candidate(&times, key, timestamp)
                    .map(|idle| (*key, idle))
            })
            .collect();
        candidates.sort();

        let mut scheduled = Vec::new();
        for (key, inactive_for) in candidates {
            let Some(member) = self.ctx.roster.member(&key) else {
                debug!(member = %key, "Idle member is no longer in the federation");
                continue;
            };

            let vote = VotingData::kick(&member)?;
            if self
                .ctx
                .voting
                .already_voting_for(VoteKey::KickFederationMember, &vote.data)
            {
                debug!(member = %key, "Skipping because kicking is already voted for");
                continue;
            }

            warn!(
                member = %key,
                inactive_for,
                "Federation member was inactive and will be scheduled to be kicked"
            );
            self.ctx.voting.schedule_vote(vote);
            scheduled.push(member);
        }

        Ok(scheduled)
    }

    fn kick_candidate(&self, times: &LastActiveTimes, key: &MemberKey, block_time: u32) -> Option<u64> {
        let last_active = *times.get(key)?;

        // Signed: a record newer than the block (reorg) is never idle.
        let idle = block_time as i64 - last_active as i64;
        if idle <= self.config.max_idle_seconds as i64 {
            return None;
        }
        if self.ctx.roster.is_multisig_member(key) {
            return None;
        }
        Some(idle as u64)
    }
}
