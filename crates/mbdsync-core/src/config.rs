//! Run configuration.
//!
//! Credentials come from the environment. Everything else has a default
//! that the command line can override. The token cache and optional download
//! ledger live under the platform cache directory, e.g.
//! `~/.cache/mbdsync/token.json`.

use std::path::PathBuf;

use thiserror::Error;

use crate::api::API_BASE_URL;
use crate::auth::Credentials;

/// Application name used for the cache directory path
const APP_NAME: &str = "mbdsync";

/// Environment variable that points the client at another gateway
pub const API_BASE_VAR: &str = "MBDSYNC_API_BASE";

/// Directory downloads land in when none is given
pub const DEFAULT_DOWNLOAD_DIR: &str = "downloads";

/// Trailing days scanned when none is given
pub const DEFAULT_DAYS: u32 = 7;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} must be set")]
    MissingCredential(&'static str),

    #[error("Could not find a cache directory; pass --cache-dir")]
    NoCacheDir,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub credentials: Credentials,
    pub api_base: String,
    pub download_dir: PathBuf,
    pub cache_dir: PathBuf,
    pub remember_downloads: bool,
}

impl Config {
    /// Build a config from the environment, applying any overrides.
    pub fn from_env(
        download_dir: Option<PathBuf>,
        cache_dir: Option<PathBuf>,
        remember_downloads: bool,
    ) -> Result<Self, ConfigError> {
        let credentials = Credentials::from_env()?;
        let api_base = std::env::var(API_BASE_VAR)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| API_BASE_URL.to_string());
        let cache_dir = match cache_dir {
            Some(dir) => dir,
            None => Self::default_cache_dir()?,
        };

        Ok(Self {
            credentials,
            api_base,
            download_dir: download_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_DOWNLOAD_DIR)),
            cache_dir,
            remember_downloads,
        })
    }

    pub fn default_cache_dir() -> Result<PathBuf, ConfigError> {
        let cache_dir = dirs::cache_dir().ok_or(ConfigError::NoCacheDir)?;
        Ok(cache_dir.join(APP_NAME))
    }
}
