//! Durable snapshot layout.
//!
//! Two independent files under the data directory, each rewritten wholesale
//! after every insertion:
//!
//! - `vocabulary.json`: JSON object mapping token to integer id.
//! - `records.snap`: one record per line, fields `collection`, `record id`
//!   and encoded vector joined by tabs; the vector is `id:count` pairs
//!   (non-zero counts only, ascending id) joined by single spaces.
//!
//! String fields are backslash-escaped (`\\`, `\t`, `\n`) so the tab and
//! newline delimiters can never collide with field content. Writes go
//! through a temp file in the same directory followed by an atomic rename.

use crate::error::{StoreError, StoreResult};
use crate::store::{Record, RecordId};
use crate::vector::{SparseVector, TokenId};
use crate::vocabulary::Vocabulary;
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use tracing::debug;

const FIELD_DELIMITER: char = '\t';

/// Saves the vocabulary snapshot, replacing any previous one atomically.
pub fn save_vocabulary(path: &Path, vocabulary: &Vocabulary) -> StoreResult<()> {
    let mapping: HashMap<&str, u32> = vocabulary
        .iter()
        .map(|(token, id)| (token, id.get()))
        .collect();
    let json = serde_json::to_string(&mapping).map_err(|e| StoreError::Persistence {
        path: path.to_path_buf(),
        source: std::io::Error::other(e),
    })?;

    write_atomic(path, json.as_bytes())?;
    debug!(tokens = vocabulary.len(), "saved vocabulary snapshot");
    Ok(())
}

/// Loads the vocabulary snapshot, or returns `None` if no snapshot exists.
///
/// Malformed content is a fatal `SnapshotCorrupted` error.
pub fn load_vocabulary(path: &Path) -> StoreResult<Option<Vocabulary>> {
    let Some(contents) = read_if_exists(path)? else {
        return Ok(None);
    };

    let mapping: HashMap<String, u32> =
        serde_json::from_str(&contents).map_err(|e| StoreError::SnapshotCorrupted {
            path: path.to_path_buf(),
            reason: format!("invalid vocabulary JSON: {e}"),
        })?;

    let vocabulary =
        Vocabulary::from_mapping(mapping).map_err(|reason| StoreError::SnapshotCorrupted {
            path: path.to_path_buf(),
            reason,
        })?;

    Ok(Some(vocabulary))
}

/// Saves the record snapshot, replacing any previous one atomically.
pub fn save_records(path: &Path, records: &[Record]) -> StoreResult<()> {
    let mut buffer = String::new();
    for record in records {
        buffer.push_str(&escape_field(&record.collection));
        buffer.push(FIELD_DELIMITER);
        buffer.push_str(&record.id.to_string());
        buffer.push(FIELD_DELIMITER);
        buffer.push_str(&encode_pairs(&record.vector));
        buffer.push('\n');
    }

    write_atomic(path, buffer.as_bytes())?;
    debug!(records = records.len(), "saved record snapshot");
    Ok(())
}

/// Loads the record snapshot, or returns `None` if no snapshot exists.
pub fn load_records(path: &Path) -> StoreResult<Option<Vec<Record>>> {
    let Some(contents) = read_if_exists(path)? else {
        return Ok(None);
    };

    let corrupted = |line: usize, reason: String| StoreError::SnapshotCorrupted {
        path: path.to_path_buf(),
        reason: format!("line {line}: {reason}"),
    };

    let mut records = Vec::new();
    for (index, line) in contents.lines().enumerate() {
        let number = index + 1;
        let mut fields = line.split(FIELD_DELIMITER);
        let (Some(collection), Some(id), Some(pairs), None) =
            (fields.next(), fields.next(), fields.next(), fields.next())
        else {
            return Err(corrupted(number, "expected exactly 3 fields".to_string()));
        };

        records.push(Record {
            collection: unescape_field(collection)
                .map_err(|reason| corrupted(number, reason))?,
            id: RecordId::parse(id).map_err(|reason| corrupted(number, reason))?,
            vector: decode_pairs(pairs).map_err(|reason| corrupted(number, reason))?,
        });
    }

    Ok(Some(records))
}

/// Serializes a sparse vector as `id:count` pairs in ascending id order.
fn encode_pairs(vector: &SparseVector) -> String {
    vector
        .iter()
        .map(|(id, count)| format!("{id}:{count}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn decode_pairs(encoded: &str) -> Result<SparseVector, String> {
    let mut vector = SparseVector::new();
    let mut previous: Option<u32> = None;

    for pair in encoded.split_whitespace() {
        let (id, count) = pair
            .split_once(':')
            .ok_or_else(|| format!("malformed pair '{pair}'"))?;
        let id: u32 = id
            .parse()
            .map_err(|_| format!("invalid token id in pair '{pair}'"))?;
        let count: u32 = count
            .parse()
            .map_err(|_| format!("invalid count in pair '{pair}'"))?;

        if previous.is_some_and(|p| p >= id) {
            return Err(format!("token ids not strictly ascending at '{pair}'"));
        }
        if count == 0 {
            return Err(format!("zero count stored for id {id}"));
        }

        previous = Some(id);
        vector.set(TokenId::new(id), count);
    }

    Ok(vector)
}

fn escape_field(field: &str) -> String {
    let mut escaped = String::with_capacity(field.len());
    for c in field.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\t' => escaped.push_str("\\t"),
            '\n' => escaped.push_str("\\n"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn unescape_field(field: &str) -> Result<String, String> {
    let mut unescaped = String::with_capacity(field.len());
    let mut chars = field.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            unescaped.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => unescaped.push('\\'),
            Some('t') => unescaped.push('\t'),
            Some('n') => unescaped.push('\n'),
            Some(other) => return Err(format!("invalid escape '\\{other}'")),
            None => return Err("dangling escape at end of field".to_string()),
        }
    }
    Ok(unescaped)
}

fn write_atomic(path: &Path, contents: &[u8]) -> StoreResult<()> {
    let persistence_error = |source| StoreError::Persistence {
        path: path.to_path_buf(),
        source,
    };

    let directory = path.parent().ok_or_else(|| {
        persistence_error(std::io::Error::other("snapshot path has no parent"))
    })?;
    std::fs::create_dir_all(directory).map_err(persistence_error)?;

    let mut temp = tempfile::NamedTempFile::new_in(directory).map_err(persistence_error)?;
    temp.write_all(contents).map_err(persistence_error)?;
    temp.flush().map_err(persistence_error)?;
    temp.persist(path)
        .map_err(|e| persistence_error(e.error))?;

    Ok(())
}

fn read_if_exists(path: &Path) -> StoreResult<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(StoreError::Persistence {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_vocabulary_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vocabulary.json");

        let mut vocabulary = Vocabulary::new();
        vocabulary.lookup_or_assign("alpha");
        vocabulary.lookup_or_assign("beta");

        save_vocabulary(&path, &vocabulary).unwrap();
        let loaded = load_vocabulary(&path).unwrap().unwrap();

        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.lookup("alpha"), vocabulary.lookup("alpha"));
        assert_eq!(loaded.lookup("beta"), vocabulary.lookup("beta"));
    }

    #[test]
    fn test_missing_snapshots_load_as_none() {
        let dir = TempDir::new().unwrap();
        assert!(load_vocabulary(&dir.path().join("vocabulary.json"))
            .unwrap()
            .is_none());
        assert!(load_records(&dir.path().join("records.snap"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_records_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("records.snap");

        let records = vec![
            Record {
                collection: "c1".to_string(),
                id: RecordId::generate(),
                vector: [(TokenId::new(0), 2), (TokenId::new(3), 1)]
                    .into_iter()
                    .collect(),
            },
            Record {
                collection: "c2".to_string(),
                id: RecordId::generate(),
                vector: SparseVector::new(),
            },
        ];

        save_records(&path, &records).unwrap();
        let loaded = load_records(&path).unwrap().unwrap();
        assert_eq!(loaded, records);
    }

    #[test]
    fn test_collection_names_with_delimiters_survive() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("records.snap");

        let records = vec![Record {
            collection: "tabs\tand\nnewlines\\here".to_string(),
            id: RecordId::generate(),
            vector: [(TokenId::new(1), 1)].into_iter().collect(),
        }];

        save_records(&path, &records).unwrap();
        let loaded = load_records(&path).unwrap().unwrap();
        assert_eq!(loaded, records);
    }

    #[test]
    fn test_corrupted_vocabulary_is_fatal() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vocabulary.json");
        std::fs::write(&path, "not json at all").unwrap();

        let err = load_vocabulary(&path).unwrap_err();
        assert_eq!(err.status_code(), "SNAPSHOT_CORRUPTED");
    }

    #[test]
    fn test_corrupted_records_are_fatal() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("records.snap");

        for bad in [
            "only-one-field",
            "c1\tnot-a-uuid\t0:1",
            "c1\t8c1a0884-22fb-4a5c-9c1c-1d3f4cd8f0aa\t0:zero",
            "c1\t8c1a0884-22fb-4a5c-9c1c-1d3f4cd8f0aa\t5:1 2:1",
            "c1\t8c1a0884-22fb-4a5c-9c1c-1d3f4cd8f0aa\t3:0",
        ] {
            std::fs::write(&path, bad).unwrap();
            let err = load_records(&path).unwrap_err();
            assert_eq!(err.status_code(), "SNAPSHOT_CORRUPTED", "input: {bad}");
        }
    }

    #[test]
    fn test_save_failure_is_structured_persistence_error() {
        let dir = TempDir::new().unwrap();
        // A regular file where the data directory should be makes every
        // write under it fail.
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();

        let mut vocabulary = Vocabulary::new();
        vocabulary.lookup_or_assign("token");

        let err = save_vocabulary(&blocker.join("vocabulary.json"), &vocabulary).unwrap_err();
        assert_eq!(err.status_code(), "PERSISTENCE_ERROR");

        let err = save_records(&blocker.join("records.snap"), &[]).unwrap_err();
        assert_eq!(err.status_code(), "PERSISTENCE_ERROR");
    }

    #[test]
    fn test_escape_round_trip() {
        for field in ["plain", "with\ttab", "with\nnewline", "back\\slash", ""] {
            assert_eq!(unescape_field(&escape_field(field)).unwrap(), field);
        }
    }
}
