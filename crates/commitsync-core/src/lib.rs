//! # Commitsync Core
//!
//! Pure primitives for commitment synchronization: bucket records, the
//! fixed-width commitment codec, and participant identities.
//!
//! This crate contains no I/O, no storage, no networking.
//!
//! ## Key Types
//!
//! - [`BucketRecord`] - Storage location and credentials published by a participant
//! - [`Uid`] - Slot of a participant within a network namespace
//! - [`Hotkey`] - Public key identifying a participant
//! - [`SignedCommitment`] - An encoded record signed by its publisher
//!
//! ## Wire Format
//!
//! A commitment is exactly 128 characters:
//!
//! ```text
//! account_id (32) || access_key_id (32) || secret_access_key (64)
//! ```
//!
//! On the ledger it may appear hex-encoded behind a `0x` marker. See [`codec`].

pub mod bucket;
pub mod codec;
pub mod commitment;
pub mod crypto;
pub mod error;
pub mod types;

pub use bucket::BucketRecord;
pub use codec::{decode, decode_wire, encode, encode_wire, COMMITMENT_LEN};
pub use commitment::SignedCommitment;
pub use crypto::{Hotkey, Keypair, Signature};
pub use error::{CoreError, DecodeError, EncodeError};
pub use types::{BlockHash, NetUid, Uid};
