//! Repository traits.

use serde::de::DeserializeOwned;
use serde::Serialize;

use warden_core::{Error, Result};

/// Durable key-value repository for small pieces of node state.
///
/// A `save_bytes` call replaces the whole value in a single write; readers
/// never observe a partially written value.
pub trait KeyValueRepository: Send + Sync {
    /// Load the raw value stored under `key`.
    fn load_bytes(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store `value` under `key`, replacing any previous value.
    fn save_bytes(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Remove the value stored under `key`. Missing keys are not an error.
    fn delete(&self, key: &str) -> Result<()>;
}

/// JSON helpers available on every repository.
pub trait KeyValueRepositoryExt: KeyValueRepository {
    /// Serialize `value` as JSON and store it under `key`.
    fn save_value_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec(value)?;
        self.save_bytes(key, &bytes)
    }

    /// Load and deserialize a JSON value.
    ///
    /// Returns `Ok(None)` when nothing is stored. A value that is present but
    /// does not parse is reported as storage corruption.
    fn load_value_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.load_bytes(key)? {
            Some(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|e| Error::corruption(format!("value under '{}': {}", key, e))),
            None => Ok(None),
        }
    }
}

impl<R: KeyValueRepository + ?Sized> KeyValueRepositoryExt for R {}
