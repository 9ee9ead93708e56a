//! Bucket records: where a participant's data lives.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Storage location and read credentials published by one participant.
///
/// Records are immutable values compared field-wise. When reconstructed from
/// the ledger, `name` is set to `account_id`.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BucketRecord {
    /// Display name, by convention equal to the account id.
    pub name: String,
    /// Storage account identifier (32 characters).
    pub account_id: String,
    /// Access key identifier (32 characters).
    pub access_key_id: String,
    /// Secret access key (64 characters on the wire).
    pub secret_access_key: String,
}

impl BucketRecord {
    /// Build a record whose name is its account id.
    pub fn new(
        account_id: impl Into<String>,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Self {
        let account_id = account_id.into();
        Self {
            name: account_id.clone(),
            account_id,
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
        }
    }

    /// Override the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Whether the published commitment already reflects this record.
    ///
    /// Compares `(name, access_key_id, secret_access_key)`; the account id is
    /// covered through `name`.
    pub fn same_commitment(&self, other: &BucketRecord) -> bool {
        self.name == other.name
            && self.access_key_id == other.access_key_id
            && self.secret_access_key == other.secret_access_key
    }
}

// Secrets stay out of logs.
impl fmt::Debug for BucketRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BucketRecord")
            .field("name", &self.name)
            .field("account_id", &self.account_id)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_sets_name_to_account() {
        let record = BucketRecord::new("acct", "key", "secret");
        assert_eq!(record.name, "acct");
        assert_eq!(record.account_id, "acct");
    }

    #[test]
    fn test_same_commitment_detects_secret_change() {
        let intended = BucketRecord::new("A", "K1", "S1");
        let observed = BucketRecord::new("A", "K1", "S2");
        assert!(!intended.same_commitment(&observed));
        assert!(intended.same_commitment(&intended.clone()));
    }

    #[test]
    fn test_same_commitment_uses_name() {
        let intended = BucketRecord::new("A", "K1", "S1").with_name("other");
        let observed = BucketRecord::new("A", "K1", "S1");
        assert!(!intended.same_commitment(&observed));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let record = BucketRecord::new("acct", "key", "very-secret");
        let debug = format!("{:?}", record);
        assert!(!debug.contains("very-secret"));
        assert!(debug.contains("<redacted>"));
    }
}
