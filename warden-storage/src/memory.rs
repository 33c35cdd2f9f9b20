//! In-memory repository.

use std::collections::HashMap;

use parking_lot::RwLock;

use warden_core::Result;

use crate::traits::KeyValueRepository;

/// Repository kept entirely in memory.
///
/// Used by tests and by nodes that run without a data directory.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    values: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    /// Check if the repository is empty.
    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }
}

impl KeyValueRepository for MemoryRepository {
    fn load_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.values.read().get(key).cloned())
    }

    fn save_bytes(&self, key: &str, value: &[u8]) -> Result<()> {
        self.values.write().insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.values.write().remove(key);
        Ok(())
    }
}
