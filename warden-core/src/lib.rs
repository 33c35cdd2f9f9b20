//! Warden Core - Fundamental types for the Warden PoA federation layer.
//!
//! This crate provides the data structures shared by the liveness tracker and
//! the collateral commitment rules:
//!
//! - [`crypto`] - Federation member keys (compressed secp256k1)
//! - [`member`] - Federation member records and their canonical encoding
//! - [`block`] - Block headers, blocks and connected blocks
//! - [`time`] - Adjusted wall-clock sources
//! - [`signals`] / [`events`] - In-process notification bus and node events
//! - [`federation`] - Federation roster access
//!
//! # Example
//!
//! ```rust
//! use warden_core::{FederationMember, MemberKey};
//!
//! let key = MemberKey::from_secret_bytes(&[1u8; 32]).unwrap();
//! let member = FederationMember::new(key);
//!
//! let payload = member.canonical_bytes().unwrap();
//! assert_eq!(FederationMember::from_canonical_bytes(&payload).unwrap(), member);
//! ```

#![deny(unsafe_code)]

pub mod block;
pub mod crypto;
pub mod error;
pub mod events;
pub mod federation;
pub mod member;
pub mod signals;
pub mod time;

pub use block::{Block, BlockHash, BlockHeader, ChainedBlock};
pub use crypto::{MemberKey, MEMBER_KEY_LEN};
pub use error::{Error, ErrorCode, Result};
pub use events::{BlockConnected, FederationMemberAdded, FederationMemberKicked};
pub use federation::{FederationRoster, StaticRoster};
pub use member::{CollateralRequirement, FederationMember};
pub use signals::{Event, Signals, SubscriptionToken};
pub use time::{to_header_time, Clock, ManualClock, SystemClock};
