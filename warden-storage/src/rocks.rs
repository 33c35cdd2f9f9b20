//! RocksDB repository implementation.

use std::path::Path;
use std::sync::Arc;

use rocksdb::{Direction, IteratorMode, Options, WriteOptions, DB};
use tracing::{debug, info};

use warden_core::{Error, Result};

use crate::keys::{table_key, COMMON_TABLE};
use crate::traits::KeyValueRepository;

/// RocksDB-backed key-value repository.
///
/// Values live in the default column family under table-prefixed keys
/// (`[table] ‖ key`). Every write is synced before returning.
pub struct RocksRepository {
    db: Arc<DB>,
    // Keeps a temporary directory alive for `open_temp`.
    _temp: Option<Arc<tempfile::TempDir>>,
}

impl RocksRepository {
    /// Open or create a repository at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening key-value repository at {:?}", path);

        let mut opts = Options::default();
        opts.create_if_missing(true);

        let db = DB::open(&opts, path).map_err(|e| Error::storage(e.to_string()))?;

        Ok(Self {
            db: Arc::new(db),
            _temp: None,
        })
    }

    /// Open with a temporary directory (for testing).
    pub fn open_temp() -> Result<Self> {
        let dir = tempfile::tempdir().map_err(|e| Error::storage(e.to_string()))?;
        let mut repo = Self::open(dir.path())?;
        repo._temp = Some(Arc::new(dir));
        Ok(repo)
    }

    /// All entries of a table, with the table byte stripped from the keys.
    pub fn select_table(&self, table: u8) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        let prefix = [table];
        let mut entries = Vec::new();

        for item in self
            .db
            .iterator(IteratorMode::From(&prefix, Direction::Forward))
        {
            let (key, value) = item.map_err(|e| Error::storage(e.to_string()))?;
            if key.first() != Some(&table) {
                break;
            }
            entries.push((key[1..].to_vec(), value.to_vec()));
        }

        Ok(entries)
    }

    /// Flush memtables to disk.
    pub fn flush(&self) -> Result<()> {
        self.db.flush().map_err(|e| Error::storage(e.to_string()))
    }

    fn sync_write_opts() -> WriteOptions {
        let mut opts = WriteOptions::default();
        opts.set_sync(true);
        opts
    }
}

impl Clone for RocksRepository {
    fn clone(&self) -> Self {
        Self {
            db: Arc::clone(&self.db),
            _temp: self._temp.clone(),
        }
    }
}

impl KeyValueRepository for RocksRepository {
    fn load_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.db
            .get(table_key(COMMON_TABLE, key.as_bytes()))
            .map_err(|e| Error::storage(e.to_string()))
    }

    fn save_bytes(&self, key: &str, value: &[u8]) -> Result<()> {
        self.db
            .put_opt(
                table_key(COMMON_TABLE, key.as_bytes()),
                value,
                &Self::sync_write_opts(),
            )
            .map_err(|e| Error::storage_write(e.to_string()))?;

        debug!(key, bytes = value.len(), "Saved repository value");
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.db
            .delete_opt(
                table_key(COMMON_TABLE, key.as_bytes()),
                &Self::sync_write_opts(),
            )
            .map_err(|e| Error::storage_write(e.to_string()))
    }
}
