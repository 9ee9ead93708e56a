//! Top-level configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use commitsync_chain::{ChainConfig, Identity};
use commitsync_core::Keypair;

use crate::credentials::BucketCredentials;
use crate::error::{Error, Result};

/// Configuration for a commitsync participant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Chain manager settings.
    pub chain: ChainConfig,
    /// Bucket credentials file. Without one the participant only observes.
    pub credentials_path: Option<PathBuf>,
}

impl Config {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|source| Error::Parse {
            what: "config",
            source,
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&json)?;
        config.chain.validate()?;
        Ok(config)
    }

    /// Local identity from `keypair` and the configured credentials file.
    pub fn identity(&self, keypair: Keypair) -> Result<Option<Identity>> {
        let Some(path) = &self.credentials_path else {
            tracing::info!("no credentials configured, running as observer");
            return Ok(None);
        };
        let bucket = BucketCredentials::load(path)?.into_bucket();
        Ok(Some(Identity::new(keypair, bucket)))
    }
}
