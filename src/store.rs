//! Append-only record store.
//!
//! Owns the insertion-ordered sequence of records and the vocabulary, and
//! persists both after every mutating operation. Records are immutable once
//! created; there is no update or delete.

use crate::config::Settings;
use crate::encode;
use crate::error::StoreResult;
use crate::snapshot;
use crate::vector::SparseVector;
use crate::vocabulary::Vocabulary;
use std::path::PathBuf;
use tracing::{debug, info};
use uuid::Uuid;

/// Unique identifier for a stored record.
///
/// Backed by a v4 UUID, so uniqueness is process-wide (and practically
/// global) without coordination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordId(Uuid);

impl RecordId {
    /// Generates a fresh high-entropy identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parses an identifier from its snapshot form.
    pub fn parse(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| format!("invalid record id '{s}': {e}"))
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One persisted document: collection tag, unique identifier, encoded vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub collection: String,
    pub id: RecordId,
    pub vector: SparseVector,
}

/// The persistent bag-of-words store.
///
/// Exclusively owns the record sequence and the vocabulary. `insert` takes
/// `&mut self`, so the borrow checker serializes writers within a process;
/// the snapshot files are treated as exclusively owned by this process.
#[derive(Debug)]
pub struct Store {
    records: Vec<Record>,
    vocabulary: Vocabulary,
    vocabulary_path: PathBuf,
    records_path: PathBuf,
}

impl Store {
    /// Opens the store under the configured data directory, loading both
    /// snapshots if present and starting empty otherwise.
    ///
    /// Malformed snapshot content is a fatal error; no partial recovery is
    /// attempted.
    pub fn open(settings: &Settings) -> StoreResult<Self> {
        let vocabulary_path = settings.vocabulary_path();
        let records_path = settings.records_path();

        let vocabulary = snapshot::load_vocabulary(&vocabulary_path)?.unwrap_or_default();
        let records = snapshot::load_records(&records_path)?.unwrap_or_default();

        info!(
            records = records.len(),
            vocabulary = vocabulary.len(),
            "opened store at {}",
            settings.data_dir.display()
        );

        Ok(Self {
            records,
            vocabulary,
            vocabulary_path,
            records_path,
        })
    }

    /// Encodes and appends a new document, persisting the updated store.
    ///
    /// The vocabulary snapshot is written before the record snapshot so a
    /// crash between the two never leaves a persisted record referencing a
    /// token id absent from the persisted vocabulary.
    pub fn insert(&mut self, collection: &str, text: &str) -> StoreResult<RecordId> {
        let vector = encode::encode(text, &mut self.vocabulary);
        let id = RecordId::generate();

        self.records.push(Record {
            collection: collection.to_string(),
            id,
            vector,
        });

        snapshot::save_vocabulary(&self.vocabulary_path, &self.vocabulary)?;
        snapshot::save_records(&self.records_path, &self.records)?;

        debug!(%id, collection, total = self.records.len(), "inserted record");
        Ok(id)
    }

    /// All records in insertion order.
    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// The vocabulary backing this store's vectors.
    #[must_use]
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Rebuilds a textual representation of an encoded vector.
    ///
    /// Each token is repeated by its count and tokens are joined with single
    /// spaces in ascending id order. Original word order is not preserved:
    /// the encoding is count-preserving but order-losing, so reconstruction
    /// is lossy by design of the encoding, not by defect.
    pub fn reconstruct_text(&self, vector: &SparseVector) -> StoreResult<String> {
        let mut words = Vec::with_capacity(vector.nonzero_len());
        for (id, count) in vector.iter() {
            let token = self.vocabulary.token(id)?;
            for _ in 0..count {
                words.push(token);
            }
        }
        Ok(words.join(" "))
    }

    /// Number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when no record has been inserted yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
