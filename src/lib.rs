/// The main library module for bowdb
pub mod config;
pub mod encode;
pub mod error;
pub mod ingest;
pub mod search;
pub mod snapshot;
pub mod store;
pub mod vector;
pub mod vocabulary;

// Explicit exports for better API clarity
pub use config::Settings;
pub use error::{ErrorContext, StoreError, StoreResult};
pub use search::Match;
pub use store::{Record, RecordId, Store};
pub use vector::{Score, SparseVector, TokenId, cosine_similarity};
pub use vocabulary::Vocabulary;
