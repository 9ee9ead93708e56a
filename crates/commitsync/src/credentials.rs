//! Local bucket credentials.
//!
//! The participant's own bucket is configured as JSON:
//!
//! ```json
//! {
//!   "account_id": "…32 chars…",
//!   "read": { "access_key_id": "…32 chars…", "secret_access_key": "…64 chars…" }
//! }
//! ```

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use commitsync_core::BucketRecord;

use crate::error::{Error, Result};

/// Read-only key pair handed out to other participants.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl fmt::Debug for ReadCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}

/// The bucket this participant publishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketCredentials {
    pub account_id: String,
    pub read: ReadCredentials,
}

impl BucketCredentials {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|source| Error::Parse {
            what: "bucket credentials",
            source,
        })
    }

    /// Load credentials from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let credentials = Self::from_json_str(&json)?;
        tracing::debug!(path = %path.display(), account = %credentials.account_id, "loaded bucket credentials");
        Ok(credentials)
    }

    /// The record to publish. Its name is the account id.
    pub fn into_bucket(self) -> BucketRecord {
        BucketRecord::new(
            self.account_id,
            self.read.access_key_id,
            self.read.secret_access_key,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn json() -> String {
        format!(
            r#"{{"account_id":"{}","read":{{"access_key_id":"{}","secret_access_key":"{}"}}}}"#,
            "a".repeat(32),
            "k".repeat(32),
            "s".repeat(64)
        )
    }

    #[test]
    fn test_into_bucket_names_by_account() {
        let bucket = BucketCredentials::from_json_str(&json()).unwrap().into_bucket();
        assert_eq!(bucket.name, "a".repeat(32));
        assert_eq!(bucket.account_id, bucket.name);
        assert_eq!(bucket.secret_access_key, "s".repeat(64));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json().as_bytes()).unwrap();

        let credentials = BucketCredentials::load(file.path()).unwrap();
        assert_eq!(credentials.read.access_key_id, "k".repeat(32));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = BucketCredentials::load(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_missing_read_section() {
        let err = BucketCredentials::from_json_str(r#"{"account_id":"x"}"#).unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let credentials = BucketCredentials::from_json_str(&json()).unwrap();
        assert!(!format!("{:?}", credentials).contains(&"s".repeat(64)));
    }
}
