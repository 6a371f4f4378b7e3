//! Redb backend for persistent fingerprint storage.
//!
//! Redb is a pure Rust embedded key-value store with ACID transactions and
//! no external dependencies, which keeps deployment down to a single file
//! next to the item bank. Every write commits durably before the call
//! returns, so a crash mid-authoring-session never loses acknowledged
//! fingerprints.

use crate::{StoreBackend, StoreError};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::path::Path;
use std::sync::Arc;

/// Single table holding encoded fingerprint records keyed by item id.
const FINGERPRINTS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("fingerprints");

/// Redb-backed [`StoreBackend`].
///
/// The `Arc<Database>` allows safe sharing across threads; redb handles its
/// own locking and MVCC underneath.
pub struct RedbBackend {
    db: Arc<Database>,
}

impl RedbBackend {
    /// Open or create a redb database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let db = Database::create(path).map_err(|e| StoreError::backend(e.to_string()))?;

        // Opening the table inside a write transaction creates it on first use.
        let write_txn = db
            .begin_write()
            .map_err(|e| StoreError::backend(e.to_string()))?;
        {
            let _table = write_txn
                .open_table(FINGERPRINTS_TABLE)
                .map_err(|e| StoreError::backend(e.to_string()))?;
        }
        write_txn
            .commit()
            .map_err(|e| StoreError::backend(e.to_string()))?;

        Ok(Self { db: Arc::new(db) })
    }
}

impl StoreBackend for RedbBackend {
    fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| StoreError::backend(e.to_string()))?;

        {
            let mut table = write_txn
                .open_table(FINGERPRINTS_TABLE)
                .map_err(|e| StoreError::backend(e.to_string()))?;
            table
                .insert(key, value)
                .map_err(|e| StoreError::backend(e.to_string()))?;
        }

        write_txn
            .commit()
            .map_err(|e| StoreError::backend(e.to_string()))?;
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| StoreError::backend(e.to_string()))?;
        let table = read_txn
            .open_table(FINGERPRINTS_TABLE)
            .map_err(|e| StoreError::backend(e.to_string()))?;

        match table
            .get(key)
            .map_err(|e| StoreError::backend(e.to_string()))?
        {
            Some(value) => Ok(Some(value.value().to_vec())),
            None => Ok(None),
        }
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| StoreError::backend(e.to_string()))?;

        {
            let mut table = write_txn
                .open_table(FINGERPRINTS_TABLE)
                .map_err(|e| StoreError::backend(e.to_string()))?;
            table
                .remove(key)
                .map_err(|e| StoreError::backend(e.to_string()))?;
        }

        write_txn
            .commit()
            .map_err(|e| StoreError::backend(e.to_string()))?;
        Ok(())
    }

    fn batch_put(&self, entries: Vec<(String, Vec<u8>)>) -> Result<(), StoreError> {
        // All entries land in one transaction: a failed batch leaves nothing.
        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| StoreError::backend(e.to_string()))?;

        {
            let mut table = write_txn
                .open_table(FINGERPRINTS_TABLE)
                .map_err(|e| StoreError::backend(e.to_string()))?;

            for (key, value) in entries {
                table
                    .insert(key.as_str(), value.as_slice())
                    .map_err(|e| StoreError::backend(e.to_string()))?;
            }
        }

        write_txn
            .commit()
            .map_err(|e| StoreError::backend(e.to_string()))?;
        Ok(())
    }

    fn scan(
        &self,
        visitor: &mut dyn FnMut(&[u8]) -> Result<(), StoreError>,
    ) -> Result<(), StoreError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| StoreError::backend(e.to_string()))?;
        let table = read_txn
            .open_table(FINGERPRINTS_TABLE)
            .map_err(|e| StoreError::backend(e.to_string()))?;

        for item in table
            .iter()
            .map_err(|e| StoreError::backend(e.to_string()))?
        {
            let (_, value) = item.map_err(|e| StoreError::backend(e.to_string()))?;
            visitor(value.value())?;
        }

        Ok(())
    }

    fn flush(&self) -> Result<(), StoreError> {
        // Redb commits synchronously; there is nothing buffered to flush.
        Ok(())
    }
}
