//! Error types for ledger operations.

use thiserror::Error;

/// Errors that can occur talking to the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Transport or RPC failure; the ledger could not be reached.
    #[error("ledger unavailable: {0}")]
    Unavailable(String),

    /// The ledger refused a submission.
    #[error("submission rejected: {0}")]
    Rejected(String),

    /// A submitted commitment carried a bad signature.
    #[error("invalid commitment signature: {0}")]
    InvalidSignature(#[from] commitsync_core::CoreError),

    /// The requested block is not known to the ledger.
    #[error("unknown block: {0}")]
    UnknownBlock(u64),

    /// A block subscription could not be opened or was dropped.
    #[error("block subscription closed")]
    SubscriptionClosed,
}

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;
