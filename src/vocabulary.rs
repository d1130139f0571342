//! Append-only token vocabulary with stable integer ids.
//!
//! The vocabulary is an arena of tokens indexed by a monotonically
//! increasing counter. Ids are assigned in first-seen order and never reused
//! or renumbered, so sparse vectors created against an older vocabulary stay
//! valid as the vocabulary grows.

use crate::error::{StoreError, StoreResult};
use crate::vector::TokenId;
use std::collections::HashMap;

/// String-to-id mapping that grows monotonically.
///
/// Invariant: the token/id assignment is a strict bijection at all times.
/// `tokens[id]` and `ids[token]` are kept in lockstep; the next id to assign
/// is always `tokens.len()`.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    ids: HashMap<String, TokenId>,
    tokens: Vec<String>,
}

impl Vocabulary {
    /// Creates an empty vocabulary.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a vocabulary from a persisted token-to-id mapping.
    ///
    /// Validates the bijection: every id in `0..len` must be assigned exactly
    /// once. Gaps or duplicates mean the snapshot is corrupted.
    pub fn from_mapping(mapping: HashMap<String, u32>) -> Result<Self, String> {
        let len = mapping.len();
        let mut tokens: Vec<Option<String>> = vec![None; len];

        for (token, id) in &mapping {
            let slot = tokens
                .get_mut(*id as usize)
                .ok_or_else(|| format!("token '{token}' has id {id}, expected ids below {len}"))?;
            if let Some(existing) = slot {
                return Err(format!(
                    "id {id} is assigned to both '{existing}' and '{token}'"
                ));
            }
            *slot = Some(token.clone());
        }

        let tokens: Vec<String> = tokens.into_iter().flatten().collect();
        debug_assert_eq!(tokens.len(), len);

        let ids = mapping
            .into_iter()
            .map(|(token, id)| (token, TokenId::new(id)))
            .collect();

        Ok(Self { ids, tokens })
    }

    /// Returns the id for a token, assigning the next unused id on first
    /// sight. Insert-path only: may grow the vocabulary by exactly one entry.
    pub fn lookup_or_assign(&mut self, token: &str) -> TokenId {
        if let Some(&id) = self.ids.get(token) {
            return id;
        }
        let id = TokenId::new(self.tokens.len() as u32);
        self.ids.insert(token.to_string(), id);
        self.tokens.push(token.to_string());
        id
    }

    /// Read-only lookup used during query encoding. Unknown tokens return
    /// `None` and the vocabulary does not grow.
    #[must_use]
    pub fn lookup(&self, token: &str) -> Option<TokenId> {
        self.ids.get(token).copied()
    }

    /// Reverse lookup for text reconstruction.
    ///
    /// Fails with `TokenIdNotFound` if the id was never assigned, which for
    /// ids taken from a stored vector indicates snapshot corruption.
    pub fn token(&self, id: TokenId) -> StoreResult<&str> {
        self.tokens
            .get(id.get() as usize)
            .map(String::as_str)
            .ok_or(StoreError::TokenIdNotFound { id })
    }

    /// Number of assigned tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// True when no token has been assigned yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Iterates over `(token, id)` pairs for snapshot serialization.
    pub fn iter(&self) -> impl Iterator<Item = (&str, TokenId)> + '_ {
        self.ids.iter().map(|(token, id)| (token.as_str(), *id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_seen_order_assignment() {
        let mut vocab = Vocabulary::new();
        assert_eq!(vocab.lookup_or_assign("the").get(), 0);
        assert_eq!(vocab.lookup_or_assign("cat").get(), 1);
        assert_eq!(vocab.lookup_or_assign("sat").get(), 2);
        assert_eq!(vocab.len(), 3);
    }

    #[test]
    fn test_assignment_is_stable() {
        let mut vocab = Vocabulary::new();
        let first = vocab.lookup_or_assign("x");
        vocab.lookup_or_assign("y");
        let second = vocab.lookup_or_assign("x");

        assert_eq!(first, second);
        assert_eq!(vocab.len(), 2);
    }

    #[test]
    fn test_lookup_never_grows() {
        let vocab = Vocabulary::new();
        assert!(vocab.lookup("unknown").is_none());
        assert!(vocab.is_empty());
    }

    #[test]
    fn test_tokens_compared_by_exact_equality() {
        let mut vocab = Vocabulary::new();
        let lower = vocab.lookup_or_assign("rust");
        let upper = vocab.lookup_or_assign("Rust");
        assert_ne!(lower, upper);
    }

    #[test]
    fn test_reverse_lookup() {
        let mut vocab = Vocabulary::new();
        let id = vocab.lookup_or_assign("hello");
        assert_eq!(vocab.token(id).unwrap(), "hello");

        let err = vocab.token(TokenId::new(42)).unwrap_err();
        assert_eq!(err.status_code(), "TOKEN_ID_NOT_FOUND");
    }

    #[test]
    fn test_from_mapping_rebuilds_arena() {
        let mut vocab = Vocabulary::new();
        vocab.lookup_or_assign("a");
        vocab.lookup_or_assign("b");
        vocab.lookup_or_assign("c");

        let mapping: HashMap<String, u32> = vocab
            .iter()
            .map(|(token, id)| (token.to_string(), id.get()))
            .collect();
        let rebuilt = Vocabulary::from_mapping(mapping).unwrap();

        assert_eq!(rebuilt.len(), 3);
        assert_eq!(rebuilt.lookup("b"), Some(TokenId::new(1)));
        assert_eq!(rebuilt.token(TokenId::new(2)).unwrap(), "c");
    }

    #[test]
    fn test_from_mapping_rejects_gaps() {
        let mapping = HashMap::from([("a".to_string(), 0), ("b".to_string(), 5)]);
        assert!(Vocabulary::from_mapping(mapping).is_err());
    }

    #[test]
    fn test_from_mapping_rejects_duplicate_ids() {
        let mapping = HashMap::from([("a".to_string(), 0), ("b".to_string(), 0)]);
        assert!(Vocabulary::from_mapping(mapping).is_err());
    }
}
