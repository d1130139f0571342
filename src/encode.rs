//! Text-to-vector encoding.
//!
//! Tokenization splits on whitespace and compares tokens by exact string
//! equality. No stemming, no case folding. The insert path grows the
//! vocabulary; the query path is read-only and silently drops unknown
//! tokens, which is the defined bag-of-words behavior against a fixed
//! corpus, not an error.

use crate::vector::SparseVector;
use crate::vocabulary::Vocabulary;

/// Splits text into whitespace-delimited tokens.
pub fn tokenize(text: &str) -> impl Iterator<Item = &str> {
    text.split_whitespace()
}

/// Encodes text into a sparse count vector, assigning ids to tokens not yet
/// in the vocabulary. Used on the insert path.
#[must_use]
pub fn encode(text: &str, vocabulary: &mut Vocabulary) -> SparseVector {
    let mut vector = SparseVector::new();
    for token in tokenize(text) {
        vector.increment(vocabulary.lookup_or_assign(token));
    }
    vector
}

/// Encodes text against a fixed vocabulary. Used on the query path.
///
/// Tokens absent from the vocabulary are dropped; an empty or
/// all-unknown-token text yields the zero vector.
#[must_use]
pub fn encode_readonly(text: &str, vocabulary: &Vocabulary) -> SparseVector {
    let mut vector = SparseVector::new();
    for token in tokenize(text) {
        if let Some(id) = vocabulary.lookup(token) {
            vector.increment(id);
        }
    }
    vector
}
