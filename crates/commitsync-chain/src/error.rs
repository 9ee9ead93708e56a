//! Error types for the chain manager.

use thiserror::Error;

use commitsync_core::{DecodeError, EncodeError, Hotkey};
use commitsync_ledger::LedgerError;

/// Errors that can occur during chain manager operations.
#[derive(Debug, Error)]
pub enum ChainError {
    /// The local hotkey is not registered in the membership view.
    #[error("hotkey {0} not found in membership view")]
    IdentityNotFound(Hotkey),

    /// The ledger could not be reached or answered with an error.
    #[error("ledger unavailable: {0}")]
    LedgerUnavailable(#[from] LedgerError),

    /// A commitment submission was rejected or failed.
    #[error("publish failed: {0}")]
    PublishFailure(LedgerError),

    /// The intended record cannot be encoded.
    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),

    /// A commitment read from the ledger is malformed.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Configuration is invalid.
    #[error("invalid config: {0}")]
    Config(String),

    /// A background task of this kind is already running.
    #[error("{0} already running")]
    AlreadyRunning(&'static str),
}

/// Result type for chain manager operations.
pub type Result<T> = std::result::Result<T, ChainError>;
