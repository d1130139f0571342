//! Exact similarity search over the stored records.
//!
//! A linear scan scores every stored vector against the query with cosine
//! similarity. No index structure is maintained; the corpus size target is
//! small and exact scan keeps the semantics trivial to reason about. Top-1
//! only for now; returning the top N matches is a future extension point.

use crate::encode;
use crate::error::StoreResult;
use crate::store::{RecordId, Store};
use crate::vector::{Score, cosine_similarity};
use tracing::debug;

/// Best match for a query, with the lossy textual reconstruction of the
/// stored document.
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    pub record_id: RecordId,
    pub collection: String,
    pub text: String,
    pub score: Score,
}

/// Finds the stored record closest to the query text.
///
/// The query is encoded read-only, so query terms absent from the vocabulary
/// are dropped; an all-unknown query scores 0 against everything and still
/// returns a deterministic result. Ties (including the all-zero case) break
/// to the earliest-inserted record. An empty store returns `Ok(None)`,
/// never an error.
pub fn closest(store: &Store, query_text: &str) -> StoreResult<Option<Match>> {
    let records = store.records();
    let Some(first) = records.first() else {
        return Ok(None);
    };

    let query = encode::encode_readonly(query_text, store.vocabulary());

    // Seed with the first record; strictly-greater keeps the earliest
    // record on ties.
    let mut best_index = 0;
    let mut best_score = cosine_similarity(&query, &first.vector);
    for (index, record) in records.iter().enumerate().skip(1) {
        let score = cosine_similarity(&query, &record.vector);
        if score > best_score {
            best_index = index;
            best_score = score;
        }
    }

    let (record, score) = (&records[best_index], best_score);
    debug!(record_id = %record.id, %score, scanned = store.len(), "closest match");

    Ok(Some(Match {
        record_id: record.id,
        collection: record.collection.clone(),
        text: store.reconstruct_text(&record.vector)?,
        score,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use tempfile::TempDir;

    fn test_store() -> (TempDir, Store) {
        let dir = TempDir::new().unwrap();
        let settings = Settings::with_data_dir(dir.path());
        let store = Store::open(&settings).unwrap();
        (dir, store)
    }

    #[test]
    fn test_empty_store_returns_none() {
        let (_dir, store) = test_store();
        assert!(closest(&store, "anything").unwrap().is_none());
    }

    #[test]
    fn test_self_match_after_insert() {
        let (_dir, mut store) = test_store();
        store.insert("c1", "completely unrelated words").unwrap();
        let id = store.insert("c1", "rust borrow checker").unwrap();

        let found = closest(&store, "rust borrow checker").unwrap().unwrap();
        assert_eq!(found.record_id, id);
        assert!((found.score.get() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_concrete_cat_dog_scenario() {
        let (_dir, mut store) = test_store();
        let cat = store.insert("c1", "the cat sat").unwrap();
        let dog = store.insert("c1", "the dog sat").unwrap();

        let found = closest(&store, "the cat").unwrap().unwrap();
        assert_eq!(found.record_id, cat);
        assert_ne!(found.record_id, dog);

        // The winning score must be strictly higher than the runner-up's.
        let query = encode::encode_readonly("the cat", store.vocabulary());
        let cat_score = cosine_similarity(&query, &store.records()[0].vector);
        let dog_score = cosine_similarity(&query, &store.records()[1].vector);
        assert!(cat_score > dog_score);
    }

    #[test]
    fn test_duplicate_documents_break_ties_to_earliest() {
        let (_dir, mut store) = test_store();
        let first = store.insert("c1", "same exact words").unwrap();
        store.insert("c1", "same exact words").unwrap();

        let found = closest(&store, "same exact words").unwrap().unwrap();
        assert_eq!(found.record_id, first);
    }

    #[test]
    fn test_all_unknown_query_selects_earliest_with_zero_score() {
        let (_dir, mut store) = test_store();
        let first = store.insert("c1", "alpha beta").unwrap();
        store.insert("c1", "gamma delta").unwrap();
        let before = store.vocabulary().len();

        let found = closest(&store, "zeta omicron").unwrap().unwrap();
        assert_eq!(found.record_id, first);
        assert_eq!(found.score, Score::zero());
        // Query encoding must not grow the vocabulary.
        assert_eq!(store.vocabulary().len(), before);
    }

    #[test]
    fn test_empty_query_selects_earliest_with_zero_score() {
        let (_dir, mut store) = test_store();
        let first = store.insert("c1", "something").unwrap();

        let found = closest(&store, "").unwrap().unwrap();
        assert_eq!(found.record_id, first);
        assert_eq!(found.score, Score::zero());
    }

    #[test]
    fn test_cosine_is_scale_invariant_across_documents() {
        // "a a" and "a a a a" both point the same direction as query "a".
        let (_dir, mut store) = test_store();
        let first = store.insert("c1", "a a").unwrap();
        store.insert("c1", "a a a a").unwrap();

        let found = closest(&store, "a").unwrap().unwrap();
        assert!((found.score.get() - 1.0).abs() < 1e-12);
        // Both score 1.0, so the earlier record wins.
        assert_eq!(found.record_id, first);
    }

    #[test]
    fn test_single_record_store_matches_it_for_any_query() {
        let (_dir, mut store) = test_store();
        let only = store.insert("c1", "lone document").unwrap();

        for query in ["lone document", "unrelated terms", ""] {
            let found = closest(&store, query).unwrap().unwrap();
            assert_eq!(found.record_id, only, "query: {query:?}");
        }
    }

    #[test]
    fn test_match_carries_reconstruction() {
        let (_dir, mut store) = test_store();
        store.insert("docs", "token").unwrap();

        let found = closest(&store, "token").unwrap().unwrap();
        assert_eq!(found.text, "token");
        assert_eq!(found.collection, "docs");
    }
}
