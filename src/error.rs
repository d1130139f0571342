//! Error types for the bag-of-words store
//!
//! This module provides structured error types using thiserror for better
//! error handling and actionable error messages.

use crate::vector::TokenId;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Durable read/write failures
    #[error("Failed to persist snapshot to '{path}': {source}")]
    Persistence {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Snapshot at '{path}' is corrupted: {reason}")]
    SnapshotCorrupted { path: PathBuf, reason: String },

    /// Internal-consistency violation: a stored vector references a token id
    /// the vocabulary never assigned. Indicates a mismatched or truncated
    /// vocabulary snapshot.
    #[error(
        "Token id {id} not found in vocabulary. The vocabulary and record snapshots may be out of sync; restore both from the same backup."
    )]
    TokenIdNotFound { id: TokenId },

    /// Ingestion errors
    #[error("Failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to fetch '{url}': {reason}")]
    Fetch { url: String, reason: String },

    /// Configuration errors
    #[error("Invalid configuration: {reason}")]
    Config { reason: String },

    /// General errors for cases where no structured variant fits
    #[error("{0}")]
    General(String),
}

impl StoreError {
    /// Get a stable status code for this error type.
    ///
    /// Returns a string identifier that can be used in machine-readable
    /// output for programmatic error handling.
    pub fn status_code(&self) -> &'static str {
        match self {
            Self::Persistence { .. } => "PERSISTENCE_ERROR",
            Self::SnapshotCorrupted { .. } => "SNAPSHOT_CORRUPTED",
            Self::TokenIdNotFound { .. } => "TOKEN_ID_NOT_FOUND",
            Self::FileRead { .. } => "FILE_READ_ERROR",
            Self::Fetch { .. } => "FETCH_ERROR",
            Self::Config { .. } => "CONFIG_ERROR",
            Self::General(_) => "GENERAL_ERROR",
        }
    }
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Helper trait for adding context to errors
pub trait ErrorContext<T> {
    /// Add context to an error
    fn context(self, msg: &str) -> StoreResult<T>;

    /// Add context with a path
    fn with_path(self, path: &std::path::Path) -> StoreResult<T>;
}

impl<T, E> ErrorContext<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, msg: &str) -> StoreResult<T> {
        self.map_err(|e| StoreError::General(format!("{msg}: {e}")))
    }

    fn with_path(self, path: &std::path::Path) -> StoreResult<T> {
        self.map_err(|e| {
            StoreError::General(format!("Error processing '{}': {}", path.display(), e))
        })
    }
}
