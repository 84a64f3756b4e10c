use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::sync::PAGE_SIZE;
use crate::transfer::DEFAULT_FEE_NANOS;
use crate::wallet::NetworkConfig;

/// Tunables for polling, paging and submission.
///
/// Path: `config_dir()/wallet-sync/config.json`. Every field is optional in
/// the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub poll_interval_secs: u64,
    pub page_size: u64,
    pub fee_nanos: u64,
    pub network: NetworkConfig,
    pub allow_insecure: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 20,
            page_size: PAGE_SIZE,
            fee_nanos: DEFAULT_FEE_NANOS,
            network: NetworkConfig::default(),
            allow_insecure: false,
        }
    }
}

impl SyncConfig {
    pub fn default_path() -> Result<PathBuf> {
        let dir = dirs::config_dir()
            .context("Cannot determine config directory")?
            .join("wallet-sync");
        Ok(dir.join("config.json"))
    }

    /// Load from the default location, falling back to defaults when the
    /// file does not exist.
    pub fn load_default() -> Result<Self> {
        Self::load(&Self::default_path()?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Self = serde_json::from_str(&data)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_secs == 0 {
            bail!("poll_interval_secs must be at least 1.");
        }
        if self.page_size == 0 {
            bail!("page_size must be at least 1.");
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}
