//! Storage layer for Warden.
//!
//! Provides durable key-value repositories for small pieces of node state
//! such as the federation liveness records.
//!
//! ```ignore
//! use warden_storage::{KeyValueRepositoryExt, RocksRepository};
//!
//! let repo = RocksRepository::open("./data/kv")?;
//! repo.save_value_json("fedMembersByLastActiveTime", &map)?;
//! let map: Option<HashMap<String, u32>> = repo.load_value_json("fedMembersByLastActiveTime")?;
//! ```

mod keys;
mod memory;
mod rocks;
mod traits;

pub use keys::{table_key, COMMON_TABLE};
pub use memory::MemoryRepository;
pub use rocks::RocksRepository;
pub use traits::{KeyValueRepository, KeyValueRepositoryExt};
