//! Error types for commitsync.

use std::path::PathBuf;

use commitsync_chain::ChainError;
use commitsync_core::{CoreError, DecodeError, EncodeError};
use commitsync_ledger::LedgerError;
use thiserror::Error;

/// Errors that can occur at the top level.
#[derive(Debug, Error)]
pub enum Error {
    /// Core error.
    #[error("core error: {0}")]
    Core(#[from] CoreError),

    /// Encoding error.
    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),

    /// Decoding error.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Ledger error.
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Chain manager error.
    #[error("chain error: {0}")]
    Chain(#[from] ChainError),

    /// A credentials or config file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A credentials or config file is not valid JSON for its shape.
    #[error("failed to parse {what}: {source}")]
    Parse {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Result type for top-level operations.
pub type Result<T> = std::result::Result<T, Error>;
