//! Counter-chain collateral for Warden block production.
//!
//! Federation members back their seat with collateral held on a separate
//! counter chain. Before producing, a node checks its own collateral at a
//! counter-chain height deep enough to be reorg-safe and commits that height
//! in its coinbase so peers can check the same thing.
//!
//! # Example
//!
//! ```
//! use warden_collateral::{commitment_script, decode_commitment};
//!
//! let script = commitment_script(40, 0x0A0B_0C0D).unwrap();
//! let commitment = decode_commitment([script.as_script()]);
//! assert_eq!(commitment.height, Some(40));
//! assert_eq!(commitment.magic, Some(0x0A0B_0C0D));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod checker;
mod commitment;
mod config;
mod error;
mod guard;
mod rule;
mod template;

pub use checker::{CollateralChecker, CounterChainSnapshot};
pub use commitment::{
    commitment_script, decode_commitment, decode_from_coinbase, encode_commitment_height,
    Commitment, ENCODED_HEIGHT_LEN,
};
pub use config::{CollateralConfig, DEFAULT_SYNC_BUFFER, FALLBACK_MAX_REORG_LENGTH};
pub use error::{CollateralError, Result};
pub use guard::CollateralBlockGuard;
pub use rule::CommitmentHeightRule;
pub use template::{BlockTemplate, DropReason, FillOutcome, TemplatePipeline, TemplateStage};

/// Tag identifying height commitments among other null-data outputs.
pub const HEIGHT_COMMITMENT_PREFIX: [u8; 4] = [121, 13, 6, 253];
