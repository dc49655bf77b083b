use std::fs;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use camino::Utf8PathBuf;
use serde::Deserialize;

use crate::error::ApiError;

pub const DEFAULT_CONFIG_FILE: &str = "biodiversity-api.json";
pub const DEFAULT_DATABASE: &str = "DataSets/belly_button_biodiversity.sqlite";
pub const DEFAULT_PORT: u16 = 5000;

/// On-disk configuration; every key is optional.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: Option<Utf8PathBuf>,
    #[serde(default)]
    pub bind: Option<SocketAddr>,
}

/// Values given on the command line, which win over the file.
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub database: Option<Utf8PathBuf>,
    pub bind: Option<SocketAddr>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServeConfig {
    pub database: Utf8PathBuf,
    pub bind: SocketAddr,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            database: Utf8PathBuf::from(DEFAULT_DATABASE),
            bind: default_bind(),
        }
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn resolve(path: Option<&str>, overrides: ConfigOverrides) -> Result<ServeConfig, ApiError> {
        let config_path = match path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        let config = if path.is_none() && !config_path.exists() {
            Config::default()
        } else {
            let content = fs::read_to_string(&config_path)
                .map_err(|_| ApiError::ConfigRead(config_path.clone()))?;
            serde_json::from_str(&content).map_err(|err| ApiError::ConfigParse(err.to_string()))?
        };

        Ok(Self::resolve_config(config, overrides))
    }

    pub fn resolve_config(config: Config, overrides: ConfigOverrides) -> ServeConfig {
        let defaults = ServeConfig::default();
        ServeConfig {
            database: overrides
                .database
                .or(config.database)
                .unwrap_or(defaults.database),
            bind: overrides.bind.or(config.bind).unwrap_or(defaults.bind),
        }
    }
}

pub fn default_bind() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_PORT))
}
