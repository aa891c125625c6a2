//! Contract terms loaded from a TOML file.

use crate::contract::AmcContract;
use crate::error::{BillingError, BillingResult};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILENAME: &str = "amcmeter.toml";

#[derive(Debug, Default, Clone, Deserialize)]
pub struct BillingConfig {
    #[serde(default)]
    pub contracts: BTreeMap<String, AmcContract>,
}

impl BillingConfig {
    pub fn contract(&self, id: &str) -> BillingResult<&AmcContract> {
        self.contracts
            .get(id)
            .ok_or_else(|| BillingError::UnknownContract(id.to_string()))
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from(DEFAULT_CONFIG_FILENAME)
}

/// Loads the config at `path`, or at the default location when `path` is
/// `None`. Only a missing default file yields an empty config.
pub fn load_config(path: Option<&Path>) -> BillingResult<BillingConfig> {
    let config_path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);

    if !config_path.exists() {
        if path.is_some() {
            return Err(BillingError::ConfigNotFound(config_path));
        }
        tracing::debug!("No config at {}, using empty config", config_path.display());
        return Ok(BillingConfig::default());
    }

    let raw = fs::read_to_string(&config_path)?;
    parse_config(&raw).map_err(|e| BillingError::InvalidConfig {
        path: config_path.clone(),
        reason: e.to_string(),
    })
}

pub fn parse_config(raw: &str) -> Result<BillingConfig, toml::de::Error> {
    toml::from_str(raw)
}
