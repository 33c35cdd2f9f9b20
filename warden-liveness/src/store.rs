//! Durable liveness records.
//!
//! The whole `member → last active time` map is stored as one JSON object
//! under [`FED_MEMBERS_BY_LAST_ACTIVE_TIME_KEY`]:
//!
//! ```text
//! { "<compressed pubkey hex>": <unix seconds>, ... }
//! ```
//!
//! Every save rewrites the full object.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use warden_core::{ErrorCode, MemberKey};
use warden_storage::{KeyValueRepository, KeyValueRepositoryExt};

use crate::error::{LivenessError, Result};

/// Repository key of the liveness records.
pub const FED_MEMBERS_BY_LAST_ACTIVE_TIME_KEY: &str = "fedMembersByLastActiveTime";

/// Last-active unix timestamp per federation member.
pub type LastActiveTimes = HashMap<MemberKey, u32>;

/// Loads and saves [`LastActiveTimes`].
#[derive(Clone)]
pub struct LivenessStore {
    repo: Arc<dyn KeyValueRepository>,
}

impl LivenessStore {
    /// Create a store backed by `repo`.
    pub fn new(repo: Arc<dyn KeyValueRepository>) -> Self {
        Self { repo }
    }

    /// Load the persisted records.
    ///
    /// Returns `Ok(None)` if nothing has been saved yet.
    pub fn load(&self) -> Result<Option<LastActiveTimes>> {
        let raw: Option<BTreeMap<String, u32>> = self
            .repo
            .load_value_json(FED_MEMBERS_BY_LAST_ACTIVE_TIME_KEY)
            .map_err(|e| match e.code() {
                ErrorCode::StorageCorruption => LivenessError::CorruptState(e.to_string()),
                _ => LivenessError::Core(e),
            })?;

        let Some(raw) = raw else {
            return Ok(None);
        };

        let mut times = HashMap::with_capacity(raw.len());
        for (hex, time) in raw {
            let key = MemberKey::from_hex(&hex).map_err(|e| {
                LivenessError::CorruptState(format!("bad member key '{}': {}", hex, e))
            })?;
            // Only the canonical form is accepted, so two spellings of one
            // key cannot collapse into a single record.
            if key.to_hex() != hex {
                return Err(LivenessError::CorruptState(format!(
                    "member key '{}' is not in canonical lowercase hex",
                    hex
                )));
            }
            times.insert(key, time);
        }

        Ok(Some(times))
    }

    /// Overwrite the persisted records with `times`.
    pub fn save(&self, times: &LastActiveTimes) -> Result<()> {
        let data: BTreeMap<String, u32> = times
            .iter()
            .map(|(key, time)| (key.to_hex(), *time))
            .collect();

        self.repo
            .save_value_json(FED_MEMBERS_BY_LAST_ACTIVE_TIME_KEY, &data)?;
        Ok(())
    }
}

impl std::fmt::Debug for LivenessStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LivenessStore").finish_non_exhaustive()
    }
}
