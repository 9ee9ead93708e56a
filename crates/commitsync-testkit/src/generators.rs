//! Proptest generators for property-based testing.

use proptest::prelude::*;

use commitsync_core::{BucketRecord, Keypair};

/// Generate a random keypair.
pub fn keypair() -> impl Strategy<Value = Keypair> {
    any::<[u8; 32]>().prop_map(|seed| Keypair::from_seed(&seed))
}

/// Printable ASCII string of exactly `len` characters.
pub fn field(len: usize) -> impl Strategy<Value = String> {
    proptest::collection::vec(0x21u8..0x7f, len)
        .prop_map(|bytes| bytes.into_iter().map(char::from).collect())
}

/// A record with correct field widths.
pub fn bucket_record() -> impl Strategy<Value = BucketRecord> {
    (field(32), field(32), field(64))
        .prop_map(|(account, access, secret)| BucketRecord::new(account, access, secret))
}

/// A hex wire payload whose decoded text is not 128 characters long.
pub fn malformed_wire() -> impl Strategy<Value = String> {
    (0usize..256)
        .prop_filter("must not be a valid length", |len| *len != 128)
        .prop_flat_map(field)
        .prop_map(|text| format!("0x{}", hex::encode(text.as_bytes())))
}
