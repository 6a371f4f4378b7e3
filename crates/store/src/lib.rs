//! # Item Store
//!
//! Backend-agnostic persistence for item fingerprints, with the invariant of
//! exactly one [`Fingerprint`] per item id. On top of plain key-value
//! storage it maintains the two in-memory structures the duplicate detector
//! needs:
//!
//! - a **hash index** (`content_hash` → item ids) answering "which items
//!   share this exact content" without a scan, and
//! - a **sequence counter** assigning each item a stable insertion number,
//!   used downstream to break ranking ties deterministically.
//!
//! Both are rebuilt from a full backend scan when a store is opened, so the
//! durable format stays a single table of encoded records.
//!
//! ## Storage backends
//!
//! The [`StoreBackend`] trait abstracts the storage mechanism. Bundled
//! backends: [`InMemoryBackend`] (ephemeral, tests) and `RedbBackend`
//! (persistent, behind the default `backend-redb` feature). Records are
//! encoded with bincode and compressed with zstd by default.
//!
//! ## Example
//!
//! ```rust
//! use fingerprint::{generate, FingerprintConfig};
//! use store::{BackendConfig, FingerprintStore, StoreConfig};
//!
//! let store = FingerprintStore::open(
//!     StoreConfig::new().with_backend(BackendConfig::in_memory()),
//! ).unwrap();
//!
//! let fp = generate("ما ناتج ٢ + ٢", &FingerprintConfig::default()).unwrap();
//! store.upsert("item-1", &fp).unwrap();
//! assert_eq!(store.len(), 1);
//! ```

mod backend;

#[cfg(feature = "backend-redb")]
pub use backend::RedbBackend;
pub use backend::{BackendConfig, InMemoryBackend, StoreBackend};

use std::sync::{Mutex, RwLock, TryLockError};
use std::time::Instant;

use bincode::config::standard;
use bincode::error::{DecodeError, EncodeError};
use bincode::serde::{decode_from_slice, encode_to_vec};
use chrono::{DateTime, Utc};
use fingerprint::ContentFingerprint;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use zstd::{decode_all, encode_all};

/// Bump this value whenever the on-disk [`Fingerprint`] layout changes.
pub const STORE_SCHEMA_VERSION: u16 = 1;

/// One stored fingerprint record: the content identity of a single item.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Fingerprint {
    /// Schema version for backward compatibility when deserializing.
    #[serde(default = "default_schema_version")]
    pub schema_version: u16,
    /// Opaque id of the owning item. Exactly one record exists per id.
    pub item_id: String,
    /// Version-aware SHA-256 hex digest of the normalized content.
    pub content_hash: String,
    /// The normalized text, kept for audit and re-derivation.
    pub normalized_content: String,
    /// Deduplicated similarity tokens; empty for short content.
    pub similarity_tokens: Vec<String>,
    /// Store-assigned insertion sequence. Survives replacement and reopen.
    pub seq: u64,
    /// First insertion time. Preserved across upserts.
    pub created_at: DateTime<Utc>,
    /// Last write time.
    pub updated_at: DateTime<Utc>,
}

const fn default_schema_version() -> u16 {
    STORE_SCHEMA_VERSION
}

/// Compression codec options for stored records.
#[derive(Clone, Debug, Default)]
pub enum CompressionCodec {
    /// No compression (useful for debugging the on-disk format).
    None,
    /// Zstd compression (default).
    #[default]
    Zstd,
}

/// Compression behavior configuration.
#[derive(Clone, Debug)]
pub struct CompressionConfig {
    /// The codec applied to encoded records.
    pub codec: CompressionCodec,
    /// Compression level (1-22 for zstd; higher is smaller but slower).
    pub level: i32,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            codec: CompressionCodec::default(),
            level: 3,
        }
    }
}

impl CompressionConfig {
    pub fn new(codec: CompressionCodec, level: i32) -> Self {
        Self { codec, level }
    }

    pub fn with_codec(mut self, codec: CompressionCodec) -> Self {
        self.codec = codec;
        self
    }

    pub fn with_level(mut self, level: i32) -> Self {
        self.level = level;
        self
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>, StoreError> {
        match self.codec {
            CompressionCodec::None => Ok(data.to_vec()),
            CompressionCodec::Zstd => Ok(encode_all(data, self.level)?),
        }
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, StoreError> {
        match self.codec {
            CompressionCodec::None => Ok(data.to_vec()),
            CompressionCodec::Zstd => Ok(decode_all(data)?),
        }
    }
}

/// Config for opening a fingerprint store.
#[derive(Clone, Debug, Default)]
pub struct StoreConfig {
    /// Backend storage configuration (in-memory or redb).
    pub backend: BackendConfig,
    /// Compression settings for stored records.
    pub compression: CompressionConfig,
}

impl StoreConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_backend(mut self, backend: BackendConfig) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_compression(mut self, compression: CompressionConfig) -> Self {
        self.compression = compression;
        self
    }
}

/// Errors surfaced by the storage layer.
#[derive(Error, Debug, Clone)]
pub enum StoreError {
    #[error("backend error: {0}")]
    Backend(String),
    #[error("record encode error: {0}")]
    Encode(String),
    #[error("record decode error: {0}")]
    Decode(String),
    #[error("compression error: {0}")]
    Compression(String),
}

impl From<EncodeError> for StoreError {
    fn from(e: EncodeError) -> Self {
        StoreError::Encode(e.to_string())
    }
}

impl From<DecodeError> for StoreError {
    fn from(e: DecodeError) -> Self {
        StoreError::Decode(e.to_string())
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Compression(e.to_string())
    }
}

impl StoreError {
    pub fn backend<E: std::fmt::Display>(err: E) -> Self {
        Self::Backend(err.to_string())
    }
}

/// In-memory index state rebuilt from the backend on open.
#[derive(Default)]
struct StoreState {
    /// content_hash -> item ids sharing it.
    by_hash: hashbrown::HashMap<String, Vec<String>>,
    /// item id -> insertion sequence, also the live-record census.
    seq_by_item: hashbrown::HashMap<String, u64>,
    /// Next sequence to hand out.
    next_seq: u64,
}

/// Fingerprint store: one record per item over a pluggable backend.
pub struct FingerprintStore {
    backend: Box<dyn StoreBackend>,
    cfg: StoreConfig,
    state: RwLock<StoreState>,
    /// Serializes orphan purges; a second concurrent purge is skipped.
    purge_gate: Mutex<()>,
}

impl FingerprintStore {
    /// Open a store using the configured backend and rebuild the in-memory
    /// indexes from whatever it already contains.
    pub fn open(cfg: StoreConfig) -> Result<Self, StoreError> {
        let backend = cfg.backend.build()?;
        Self::with_backend(cfg, backend)
    }

    /// Open a store around a custom backend (e.g. a failing stub in tests).
    pub fn with_backend(
        cfg: StoreConfig,
        backend: Box<dyn StoreBackend>,
    ) -> Result<Self, StoreError> {
        let store = Self {
            backend,
            cfg,
            state: RwLock::new(StoreState::default()),
            purge_gate: Mutex::new(()),
        };
        store.rehydrate()?;
        Ok(store)
    }

    /// Rebuild the hash index and sequence counter from a full backend scan.
    fn rehydrate(&self) -> Result<(), StoreError> {
        let started = Instant::now();
        let mut rows: Vec<(u64, String, String)> = Vec::new();
        self.backend.scan(&mut |data| {
            let record = self.decode_record(data)?;
            rows.push((record.seq, record.item_id, record.content_hash));
            Ok(())
        })?;
        // Oldest first, so hash buckets come out in insertion order.
        rows.sort_unstable();

        let mut state = self.state.write().unwrap_or_else(|p| p.into_inner());
        state.by_hash.clear();
        state.seq_by_item.clear();
        let mut next_seq = 0u64;
        for (seq, item_id, content_hash) in rows {
            next_seq = next_seq.max(seq + 1);
            state
                .by_hash
                .entry(content_hash)
                .or_default()
                .push(item_id.clone());
            state.seq_by_item.insert(item_id, seq);
        }
        state.next_seq = next_seq;
        let records = state.seq_by_item.len();
        drop(state);

        if records > 0 {
            info!(
                records,
                elapsed_micros = started.elapsed().as_micros() as u64,
                "fingerprint store rehydrated"
            );
        }
        Ok(())
    }

    /// Insert or replace the fingerprint for an item.
    ///
    /// Atomic per item: the index write lock is held across the
    /// read-modify-write, so concurrent upserts of the same id serialize and
    /// the last writer wins. Replacement preserves the original `seq` and
    /// `created_at`.
    pub fn upsert(
        &self,
        item_id: &str,
        fp: &ContentFingerprint,
    ) -> Result<Fingerprint, StoreError> {
        let now = Utc::now();
        let mut state = self.state.write().unwrap_or_else(|p| p.into_inner());

        let existing = self.read_record(item_id)?;
        let (seq, created_at) = match &existing {
            Some(old) => (old.seq, old.created_at),
            None => {
                let seq = state.next_seq;
                state.next_seq += 1;
                (seq, now)
            }
        };

        let record = Fingerprint {
            schema_version: STORE_SCHEMA_VERSION,
            item_id: item_id.to_string(),
            content_hash: fp.content_hash.clone(),
            normalized_content: fp.normalized_content.clone(),
            similarity_tokens: fp.similarity_tokens.clone(),
            seq,
            created_at,
            updated_at: now,
        };

        let payload = self.encode_record(&record)?;
        self.backend.put(item_id, &payload)?;

        // Index fixups happen only after the write landed.
        if let Some(old) = existing {
            if old.content_hash != record.content_hash {
                remove_from_bucket(&mut state.by_hash, &old.content_hash, item_id);
            }
        }
        let bucket = state.by_hash.entry(record.content_hash.clone()).or_default();
        if !bucket.iter().any(|id| id == item_id) {
            bucket.push(item_id.to_string());
        }
        state.seq_by_item.insert(item_id.to_string(), seq);

        Ok(record)
    }

    /// Insert or replace many fingerprints in one backend batch.
    ///
    /// Used for corpus seeding. Item ids must be unique within the batch.
    /// Returns the number of records written; on error nothing is applied
    /// to the in-memory indexes.
    pub fn upsert_many(
        &self,
        items: &[(String, ContentFingerprint)],
    ) -> Result<usize, StoreError> {
        if items.is_empty() {
            return Ok(0);
        }
        let now = Utc::now();
        let mut state = self.state.write().unwrap_or_else(|p| p.into_inner());

        let mut next_seq = state.next_seq;
        let mut entries = Vec::with_capacity(items.len());
        // (item_id, new hash, replaced hash if different, seq)
        let mut fixups: Vec<(String, String, Option<String>, u64)> =
            Vec::with_capacity(items.len());

        for (item_id, fp) in items {
            let existing = self.read_record(item_id)?;
            let (seq, created_at, replaced_hash) = match existing {
                Some(old) => {
                    let replaced =
                        (old.content_hash != fp.content_hash).then(|| old.content_hash.clone());
                    (old.seq, old.created_at, replaced)
                }
                None => {
                    let seq = next_seq;
                    next_seq += 1;
                    (seq, now, None)
                }
            };
            let record = Fingerprint {
                schema_version: STORE_SCHEMA_VERSION,
                item_id: item_id.clone(),
                content_hash: fp.content_hash.clone(),
                normalized_content: fp.normalized_content.clone(),
                similarity_tokens: fp.similarity_tokens.clone(),
                seq,
                created_at,
                updated_at: now,
            };
            entries.push((item_id.clone(), self.encode_record(&record)?));
            fixups.push((item_id.clone(), fp.content_hash.clone(), replaced_hash, seq));
        }

        self.backend.batch_put(entries)?;

        state.next_seq = next_seq;
        for (item_id, new_hash, replaced_hash, seq) in fixups {
            if let Some(old_hash) = replaced_hash {
                remove_from_bucket(&mut state.by_hash, &old_hash, &item_id);
            }
            let bucket = state.by_hash.entry(new_hash).or_default();
            if !bucket.iter().any(|id| id == &item_id) {
                bucket.push(item_id.clone());
            }
            state.seq_by_item.insert(item_id, seq);
        }

        Ok(items.len())
    }

    /// Retrieve the fingerprint for an item, if one exists.
    pub fn get(&self, item_id: &str) -> Result<Option<Fingerprint>, StoreError> {
        self.read_record(item_id)
    }

    /// Remove the fingerprint for an item. Returns whether one existed.
    ///
    /// This is the cascade hook: call it when the owning item is deleted so
    /// the fingerprint never outlives its item.
    pub fn delete(&self, item_id: &str) -> Result<bool, StoreError> {
        let mut state = self.state.write().unwrap_or_else(|p| p.into_inner());
        let Some(old) = self.read_record(item_id)? else {
            return Ok(false);
        };
        self.backend.delete(item_id)?;
        remove_from_bucket(&mut state.by_hash, &old.content_hash, item_id);
        state.seq_by_item.remove(item_id);
        Ok(true)
    }

    /// All fingerprints sharing a content hash, oldest first, optionally
    /// excluding one item id (typically the querying item itself).
    pub fn find_by_hash(
        &self,
        content_hash: &str,
        exclude: Option<&str>,
    ) -> Result<Vec<Fingerprint>, StoreError> {
        let ids: Vec<String> = {
            let state = self.state.read().unwrap_or_else(|p| p.into_inner());
            match state.by_hash.get(content_hash) {
                Some(bucket) => bucket
                    .iter()
                    .filter(|id| exclude != Some(id.as_str()))
                    .cloned()
                    .collect(),
                None => return Ok(Vec::new()),
            }
        };

        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            // The index can briefly race a concurrent delete; a missing
            // record is simply skipped.
            if let Some(record) = self.read_record(&id)? {
                out.push(record);
            }
        }
        out.sort_unstable_by_key(|r| r.seq);
        Ok(out)
    }

    /// Visit every fingerprint eligible for near-duplicate comparison:
    /// everything except `exclude` and records with empty token sets.
    pub fn for_each_candidate(
        &self,
        exclude: &str,
        visit: &mut dyn FnMut(&Fingerprint),
    ) -> Result<(), StoreError> {
        self.backend.scan(&mut |data| {
            let record = self.decode_record(data)?;
            if record.item_id != exclude && !record.similarity_tokens.is_empty() {
                visit(&record);
            }
            Ok(())
        })
    }

    /// Delete every fingerprint whose item id is not in `live`.
    ///
    /// Single-flight: if another purge is already running, this call does
    /// nothing and returns `Ok(None)`. Otherwise returns the number of
    /// records removed.
    pub fn delete_orphans(
        &self,
        live: &std::collections::HashSet<String>,
    ) -> Result<Option<usize>, StoreError> {
        let _gate = match self.purge_gate.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => return Ok(None),
        };

        let mut doomed: Vec<String> = Vec::new();
        self.backend.scan(&mut |data| {
            let record = self.decode_record(data)?;
            if !live.contains(&record.item_id) {
                doomed.push(record.item_id);
            }
            Ok(())
        })?;

        let mut removed = 0usize;
        for item_id in &doomed {
            if self.delete(item_id)? {
                removed += 1;
            }
        }
        if removed > 0 {
            info!(removed, "orphaned fingerprints purged");
        }
        Ok(Some(removed))
    }

    /// Number of stored fingerprints.
    pub fn len(&self) -> usize {
        self.state
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .seq_by_item
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Content hashes shared by more than one item, largest group first
    /// (ties by hash). A corpus-wide duplicate census for audits.
    pub fn duplicate_groups(&self) -> Vec<(String, usize)> {
        let state = self.state.read().unwrap_or_else(|p| p.into_inner());
        let mut groups: Vec<(String, usize)> = state
            .by_hash
            .iter()
            .filter(|(_, ids)| ids.len() > 1)
            .map(|(hash, ids)| (hash.clone(), ids.len()))
            .collect();
        groups.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        groups
    }

    /// Flush backend buffers if the backend supports it.
    pub fn flush(&self) -> Result<(), StoreError> {
        self.backend.flush()
    }

    fn read_record(&self, item_id: &str) -> Result<Option<Fingerprint>, StoreError> {
        match self.backend.get(item_id)? {
            Some(data) => Ok(Some(self.decode_record(&data)?)),
            None => Ok(None),
        }
    }

    fn encode_record(&self, record: &Fingerprint) -> Result<Vec<u8>, StoreError> {
        let encoded = encode_to_vec(record, standard())?;
        self.cfg.compression.compress(&encoded)
    }

    fn decode_record(&self, data: &[u8]) -> Result<Fingerprint, StoreError> {
        let decompressed = self.cfg.compression.decompress(data)?;
        let (record, _) = decode_from_slice(&decompressed, standard())?;
        Ok(record)
    }
}

fn remove_from_bucket(
    by_hash: &mut hashbrown::HashMap<String, Vec<String>>,
    hash: &str,
    item_id: &str,
) {
    if let Some(bucket) = by_hash.get_mut(hash) {
        bucket.retain(|id| id != item_id);
        if bucket.is_empty() {
            by_hash.remove(hash);
        }
    }
}
