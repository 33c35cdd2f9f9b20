//! Warden federation node.
//!
//! Wires the roster, liveness tracking and collateral checks together from a
//! [`NodeConfig`]:
//!
//! ```ignore
//! use warden_node::{FederationNode, NodeConfig};
//!
//! let config = NodeConfig::from_file("warden.json")?;
//! let node = FederationNode::start(config, members, Some(own_key), checker, clock)?;
//!
//! let mut template = node.new_template(slot_time, vec![coinbase]);
//! if node.fill_template(&mut template).is_proceed() {
//!     node.connect_block(template.block)?;
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod config;
mod error;
mod node;

pub use config::{NodeConfig, DEFAULT_TARGET_SPACING_SECS};
pub use error::{NodeError, Result};
pub use node::{FederationNode, LocalChain};
