//! Error types for the edge store

use thiserror::Error;

/// Result type alias using the edge store Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by the key codec, the traversal engine and both backends
#[derive(Error, Debug)]
pub enum Error {
    /// Store constructed with unusable parameters (zero key size, empty database name, ...)
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A flat identifier list could not be split into (left, right) pairs
    #[error("Odd number of identifiers provided: {0}")]
    OddPairCount(usize),

    /// An identifier does not have the width configured for the store
    #[error("Invalid key length: expected {expected} bytes, got {actual}")]
    InvalidKeyLength {
        /// Configured identifier width
        expected: usize,
        /// Width of the offending identifier
        actual: usize,
    },

    /// LMDB/heed database errors
    #[error("Database error: {0}")]
    Database(#[from] heed::Error),

    /// I/O errors while preparing the LMDB environment directory
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Storage-related errors detected by the edge store itself
    #[error("Storage error: {0}")]
    Storage(String),
}

impl Error {
    /// Create an invalid configuration error
    pub fn invalid_configuration(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// True for failures coming from (or found in) the underlying storage
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Database(_) | Self::Io(_) | Self::Storage(_))
    }
}
