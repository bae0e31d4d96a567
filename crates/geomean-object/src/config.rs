//! Storage client configuration.

use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

/// Default timeout of storage requests, in seconds.
pub const DEFAULT_STORAGE_TIMEOUT_SECS: u64 = 30;

/// Configuration for the Cloud Storage lister.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct ObjectConfig {
    /// Timeout of each storage request in seconds
    #[cfg_attr(
        feature = "config",
        arg(long = "storage-timeout", env = "STORAGE_TIMEOUT", default_value = "30")
    )]
    #[serde(default = "default_storage_timeout")]
    pub storage_timeout: u64,
}

fn default_storage_timeout() -> u64 {
    DEFAULT_STORAGE_TIMEOUT_SECS
}

impl Default for ObjectConfig {
    fn default() -> Self {
        Self {
            storage_timeout: default_storage_timeout(),
        }
    }
}

impl ObjectConfig {
    /// Creates a configuration with the given request timeout.
    pub fn new(storage_timeout: u64) -> Self {
        Self { storage_timeout }
    }

    /// Returns the effective timeout, using default if zero.
    pub fn effective_timeout(&self) -> Duration {
        if self.storage_timeout == 0 {
            Duration::from_secs(DEFAULT_STORAGE_TIMEOUT_SECS)
        } else {
            Duration::from_secs(self.storage_timeout)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_timeout_uses_default() {
        assert_eq!(ObjectConfig::new(0).effective_timeout(), Duration::from_secs(30));
        assert_eq!(ObjectConfig::new(5).effective_timeout(), Duration::from_secs(5));
    }
}
