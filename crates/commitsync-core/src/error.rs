//! Error types for the commitsync core.

use thiserror::Error;

/// Errors raised while encoding a bucket record for the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("field {field} must be {expected} characters, got {actual}")]
    FieldWidth {
        field: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// Errors raised while decoding a commitment payload.
///
/// Too-short and too-long payloads share one variant; callers only need to
/// know the record was unusable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("commitment is {actual} characters but should be {expected}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("invalid hex payload: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("payload is not valid UTF-8")]
    InvalidUtf8,
}

/// Key and signature errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("invalid signature")]
    InvalidSignature,

    #[error("invalid public key")]
    InvalidPublicKey,
}
