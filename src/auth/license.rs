use std::{collections::HashSet, fmt};

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum LicenseRegistryError {
    #[error("license registry unavailable: {0}")]
    Unavailable(String),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LicenseRegistry: Send + Sync {
    async fn contains(&self, key: &str) -> Result<bool, LicenseRegistryError>;
}

/// Fixed set of license keys loaded once at startup.
pub struct StaticLicenseRegistry {
    keys: HashSet<String>,
}

impl StaticLicenseRegistry {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_secrets(secrets: &[SecretString]) -> Self {
        Self::new(secrets.iter().map(|s| s.expose_secret().to_string()))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl fmt::Debug for StaticLicenseRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticLicenseRegistry")
            .field("keys", &self.keys.len())
            .finish()
    }
}

#[async_trait]
impl LicenseRegistry for StaticLicenseRegistry {
    async fn contains(&self, key: &str) -> Result<bool, LicenseRegistryError> {
        Ok(self.keys.contains(key))
    }
}

/// Short SHA-256 prefix used to refer to a license key in logs.
pub fn fingerprint(key: &str) -> String {
    Sha256::digest(key.as_bytes())
        .iter()
        .take(6)
        .map(|byte| format!("{:02x}", byte))
        .collect()
}
