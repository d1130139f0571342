//! Core vector types for the bag-of-words encoding.
//!
//! This module provides newtypes following the project's strict type safety
//! guidelines, plus the cosine similarity kernel used by the search scan.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Type-safe wrapper for vocabulary token ids.
///
/// Token ids start at zero and are assigned in first-seen order, so a plain
/// u32 wrapper is used rather than `NonZeroU32`. Once assigned, an id is
/// never reused or renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenId(u32);

impl TokenId {
    /// Creates a new `TokenId`.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the underlying u32 value.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for TokenId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sparse occurrence-count vector over the vocabulary.
///
/// Maps token id to occurrence count within one document; absent ids have
/// count zero. A BTreeMap keeps iteration in ascending id order, which both
/// the snapshot wire format and text reconstruction rely on. The sparse
/// representation means previously stored vectors stay valid as the
/// vocabulary grows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SparseVector {
    counts: BTreeMap<TokenId, u32>,
}

impl SparseVector {
    /// Creates an empty vector (all counts zero).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments the count for a token id by one.
    pub fn increment(&mut self, id: TokenId) {
        *self.counts.entry(id).or_insert(0) += 1;
    }

    /// Sets the count for a token id. Zero counts are not stored.
    pub fn set(&mut self, id: TokenId, count: u32) {
        if count == 0 {
            self.counts.remove(&id);
        } else {
            self.counts.insert(id, count);
        }
    }

    /// Returns the count for a token id (zero if absent).
    #[must_use]
    pub fn count(&self, id: TokenId) -> u32 {
        self.counts.get(&id).copied().unwrap_or(0)
    }

    /// Iterates over `(id, count)` pairs in ascending id order.
    ///
    /// Only non-zero counts are yielded.
    pub fn iter(&self) -> impl Iterator<Item = (TokenId, u32)> + '_ {
        self.counts.iter().map(|(id, count)| (*id, *count))
    }

    /// Number of distinct token ids with non-zero count.
    #[must_use]
    pub fn nonzero_len(&self) -> usize {
        self.counts.len()
    }

    /// True when every count is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.counts.is_empty()
    }

    /// Euclidean norm over the non-zero counts.
    #[must_use]
    pub fn norm(&self) -> f64 {
        self.counts
            .values()
            .map(|&c| {
                let c = f64::from(c);
                c * c
            })
            .sum::<f64>()
            .sqrt()
    }
}

impl FromIterator<(TokenId, u32)> for SparseVector {
    fn from_iter<I: IntoIterator<Item = (TokenId, u32)>>(iter: I) -> Self {
        let mut vector = Self::new();
        for (id, count) in iter {
            vector.set(id, count);
        }
        vector
    }
}

/// Type-safe wrapper for similarity scores.
///
/// Counts are non-negative, so cosine scores land in [0.0, 1.0]:
/// - 1.0 indicates identical direction (perfect similarity)
/// - 0.0 indicates no overlap (or a zero vector on either side)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Score(f64);

impl Score {
    /// Creates a new `Score` with validation.
    ///
    /// Returns `None` if the value is NaN or outside [0.0, 1.0].
    #[must_use]
    pub fn new(value: f64) -> Option<Self> {
        if value.is_nan() || !(0.0..=1.0).contains(&value) {
            return None;
        }
        Some(Self(value))
    }

    /// Creates a score of 0.0 (no similarity).
    #[must_use]
    pub const fn zero() -> Self {
        Self(0.0)
    }

    /// Returns the underlying f64 value.
    #[must_use]
    pub fn get(&self) -> f64 {
        self.0
    }
}

impl Eq for Score {}

impl PartialOrd for Score {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Score {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0
            .partial_cmp(&other.0)
            .expect("Score values should never be NaN")
    }
}

impl std::fmt::Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}", self.0)
    }
}

/// Computes cosine similarity between two sparse count vectors.
///
/// The dot product only walks ids present in both vectors. If either norm is
/// zero the score is defined as 0.0: a zero vector is maximally dissimilar
/// to anything, including another zero vector. This keeps all-unknown-token
/// queries well-defined instead of dividing by zero.
#[must_use]
pub fn cosine_similarity(a: &SparseVector, b: &SparseVector) -> Score {
    let norm_product = a.norm() * b.norm();
    if norm_product == 0.0 {
        return Score::zero();
    }

    // Iterate the sparser side and probe the other.
    let (small, large) = if a.nonzero_len() <= b.nonzero_len() {
        (a, b)
    } else {
        (b, a)
    };

    let dot: f64 = small
        .iter()
        .map(|(id, count)| f64::from(count) * f64::from(large.count(id)))
        .sum();

    // Rounding can push the ratio a hair above 1.0 for identical directions.
    Score::new((dot / norm_product).min(1.0)).unwrap_or_else(Score::zero)
}
