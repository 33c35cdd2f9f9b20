//! Federation member liveness tracking for Warden.
//!
//! This crate watches block production and proposes the removal of members
//! that stop producing blocks:
//!
//! - [`LivenessStore`] - durable `member → last active time` records
//! - [`LivenessTracker`] - reacts to node events and schedules kick votes
//! - [`VotingLedger`] / [`PendingVotes`] - where kick votes are scheduled
//! - [`SlotAssignment`] / [`RoundRobinSlots`] - attribution of blocks to members
//!
//! # Example
//!
//! ```ignore
//! use warden_liveness::{LivenessConfig, LivenessStore, LivenessTracker, TrackerContext};
//!
//! let tracker = LivenessTracker::initialize(
//!     LivenessConfig::default(),
//!     signals.clone(),
//!     LivenessStore::new(repo),
//!     TrackerContext { roster, slots, tip, voting, clock },
//! )?;
//!
//! // From here on, BlockConnected / FederationMemberAdded /
//! // FederationMemberKicked events published on `signals` drive the tracker.
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod chain;
mod config;
mod error;
mod store;
mod tracker;
mod voting;

pub use chain::{ChainTip, RoundRobinSlots, SlotAssignment};
pub use config::{LivenessConfig, DEFAULT_MAX_IDLE_SECONDS};
pub use error::{LivenessError, Result};
pub use store::{LastActiveTimes, LivenessStore, FED_MEMBERS_BY_LAST_ACTIVE_TIME_KEY};
pub use tracker::{LivenessTracker, TrackerContext};
pub use voting::{PendingVotes, VoteKey, VotingData, VotingLedger};
