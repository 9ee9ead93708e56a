//! # Commitsync Testkit
//!
//! Testing utilities for commitsync.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: known records with their exact wire encoding
//! - **Generators**: proptest strategies for records and payloads
//! - **Fixtures**: an in-memory network of registered participants
//!
//! ## Golden Vectors
//!
//! ```rust
//! use commitsync_testkit::vectors::verify_all_vectors;
//!
//! verify_all_vectors().unwrap();
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use commitsync_testkit::generators::bucket_record;
//!
//! proptest! {
//!     #[test]
//!     fn wire_round_trip(record in bucket_record()) {
//!         let wire = commitsync_core::encode_wire(&record).unwrap();
//!         prop_assert_eq!(commitsync_core::decode_wire(&wire).unwrap(), record);
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use commitsync_testkit::fixtures::{bucket, TestNetwork};
//! use commitsync_core::Uid;
//!
//! let network = TestNetwork::new();
//! let alice = network.join(Uid(1), 1, 0.0);
//! network.commit(&alice, &bucket('a'));
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{bucket, TestNetwork};
pub use generators::{bucket_record, malformed_wire};
pub use vectors::{all_vectors, verify_all_vectors, WireVector};
