//! Store configuration
//!
//! [`EdgerConfig`] carries the parameters shared by both backends (identifier
//! width and the optional key prefix). [`LmdbConfig`] adds the settings of the
//! LMDB environment owned by [`crate::lmdb::LmdbEdger::open`].

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Environment variable overriding [`LmdbConfig::map_size`]
pub const ENV_MAP_SIZE: &str = "EDGER_LMDB_MAP_SIZE";

/// Environment variable overriding [`LmdbConfig::database`]
pub const ENV_DATABASE: &str = "EDGER_LMDB_DATABASE";

/// Parameters shared by every edge store instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgerConfig {
    /// Width in bytes of every identifier stored by this instance
    pub key_size: usize,
    /// Bytes prepended to every key, so several stores can share one key space
    #[serde(default)]
    pub prefix: Vec<u8>,
}

impl EdgerConfig {
    /// Configuration for identifiers of `key_size` bytes and no prefix
    pub fn new(key_size: usize) -> Self {
        Self {
            key_size,
            prefix: Vec::new(),
        }
    }

    /// Set the store-wide key prefix
    pub fn with_prefix(mut self, prefix: impl Into<Vec<u8>>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Reject configurations no store can be built from
    pub fn validate(&self) -> Result<()> {
        if self.key_size < 1 {
            return Err(Error::invalid_configuration(
                "key size must be at least 1 byte",
            ));
        }
        Ok(())
    }
}

/// LMDB environment settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LmdbConfig {
    /// Maximum size of the LMDB memory map in bytes
    pub map_size: usize,
    /// Maximum number of named databases in the environment
    pub max_dbs: u32,
    /// Name of the database holding the edge keys
    pub database: String,
}

impl Default for LmdbConfig {
    fn default() -> Self {
        Self {
            map_size: 64 * 1024 * 1024, // 64MB
            max_dbs: 4,
            database: "edges".to_string(),
        }
    }
}

impl LmdbConfig {
    /// Apply `EDGER_LMDB_*` environment overrides on top of this configuration
    pub fn apply_env_overrides(mut self) -> Result<Self> {
        if let Ok(raw) = std::env::var(ENV_MAP_SIZE) {
            self.map_size = raw.trim().parse().map_err(|_| {
                Error::invalid_configuration(format!("{ENV_MAP_SIZE}={raw:?} is not a byte count"))
            })?;
        }
        if let Ok(name) = std::env::var(ENV_DATABASE) {
            self.database = name;
        }
        Ok(self)
    }

    /// Reject settings LMDB cannot open an environment with
    pub fn validate(&self) -> Result<()> {
        if self.map_size == 0 {
            return Err(Error::invalid_configuration("map size must be non-zero"));
        }
        if self.max_dbs == 0 {
            return Err(Error::invalid_configuration(
                "at least one named database is required",
            ));
        }
        if self.database.is_empty() {
            return Err(Error::invalid_configuration("database name is empty"));
        }
        Ok(())
    }
}
