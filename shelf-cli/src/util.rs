use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use tokio::fs;

pub const DEFAULT_CONFIG_FILE: &str = "shelf.toml";

/// Settings read from `shelf.toml`, all optional and overridden by flags and env.
#[derive(Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub database_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub verify: Option<bool>,
}

impl ConfigFile {
    pub async fn load(path: impl AsRef<Path>) -> Result<ConfigFile> {
        let path = path.as_ref();
        let bytes = fs::read(path)
            .await
            .with_context(|| format!("config file '{}' not found", path.display()))?;
        toml::from_slice(&bytes)
            .with_context(|| format!("config file '{}' corrupt", path.display()))
    }

    /// Loads an explicitly given config file, or `shelf.toml` if it exists.
    pub async fn discover(path: Option<&PathBuf>) -> Result<ConfigFile> {
        match path {
            Some(path) => ConfigFile::load(path).await,
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                ConfigFile::load(DEFAULT_CONFIG_FILE).await
            }
            None => Ok(ConfigFile::default()),
        }
    }
}

/// Picks the connection string, preferring the flag or `DATABASE_URL` over the config file.
pub fn resolve_database_url(arg: Option<&str>, config: &ConfigFile) -> Result<String> {
    arg.map(ToString::to_string)
        .or_else(|| config.database_url.clone())
        .ok_or_else(|| {
            anyhow!(
                "no database url, pass --database-url, set DATABASE_URL or add database_url to {}",
                DEFAULT_CONFIG_FILE
            )
        })
}
