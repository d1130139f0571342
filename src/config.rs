//! Configuration for the bag-of-words store.
//!
//! Layered configuration: defaults, then `bowdb.toml`, then environment
//! variable overrides. Environment variables are prefixed with `BOWDB_`,
//! e.g. `BOWDB_DATA_DIR=/var/lib/bowdb` sets `data_dir`.

use crate::error::{StoreError, StoreResult};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "bowdb.toml";

/// Name of the vocabulary snapshot inside the data directory.
const VOCABULARY_FILE: &str = "vocabulary.json";

/// Name of the record snapshot inside the data directory.
const RECORDS_FILE: &str = "records.snap";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Directory holding the durable snapshots
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Collection used when the caller does not name one
    #[serde(default = "default_collection")]
    pub default_collection: String,

    /// Verbose diagnostic logging
    #[serde(default)]
    pub debug: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            default_collection: default_collection(),
            debug: false,
        }
    }
}

impl Settings {
    /// Loads settings from defaults, `bowdb.toml`, and `BOWDB_`-prefixed
    /// environment variables, in increasing precedence.
    pub fn load() -> StoreResult<Self> {
        Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed("BOWDB_"))
            .extract()
            .map_err(|e| StoreError::Config {
                reason: e.to_string(),
            })
    }

    /// Settings rooted at an explicit data directory. Used by tests and by
    /// the CLI's `--data-dir` override.
    #[must_use]
    pub fn with_data_dir(data_dir: impl AsRef<Path>) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    /// Path of the vocabulary snapshot.
    #[must_use]
    pub fn vocabulary_path(&self) -> PathBuf {
        self.data_dir.join(VOCABULARY_FILE)
    }

    /// Path of the record snapshot.
    #[must_use]
    pub fn records_path(&self) -> PathBuf {
        self.data_dir.join(RECORDS_FILE)
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".bowdb")
}

fn default_collection() -> String {
    "default".to_string()
}
