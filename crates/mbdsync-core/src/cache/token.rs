use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Token file name in cache directory
const TOKEN_FILE: &str = "token.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedToken {
    #[serde(rename = "accessToken")]
    pub access_token: String,
    #[serde(rename = "cachedAt")]
    pub cached_at: DateTime<Utc>,
}

impl CachedToken {
    pub fn new(access_token: String) -> Self {
        Self {
            access_token,
            cached_at: Utc::now(),
        }
    }

    pub fn age(&self) -> Duration {
        Utc::now() - self.cached_at
    }
}

/// Single-slot on-disk cache holding the most recently issued bearer token.
pub struct TokenCache {
    cache_dir: PathBuf,
}

impl TokenCache {
    pub fn new(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    pub fn path(&self) -> PathBuf {
        self.cache_dir.join(TOKEN_FILE)
    }

    /// Load the cached token. Missing, unreadable, or malformed records all
    /// come back as `None`.
    pub fn load(&self) -> Option<CachedToken> {
        let path = self.path();
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "No readable token cache");
                return None;
            }
        };

        match serde_json::from_str::<CachedToken>(&contents) {
            Ok(cached) if !cached.access_token.trim().is_empty() => Some(cached),
            Ok(_) => {
                debug!(path = %path.display(), "Token cache holds an empty token");
                None
            }
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Failed to parse token cache");
                None
            }
        }
    }

    /// Replace the cached record with `token`, stamped with the current time.
    pub fn save(&self, token: &str) -> Result<()> {
        let cached = CachedToken::new(token.to_string());
        let contents = serde_json::to_string_pretty(&cached)?;
        super::write_atomic(&self.path(), &contents).context("Failed to save token cache")
    }

    /// Remove the cached record, if any
    pub fn clear(&self) -> Result<()> {
        let path = self.path();
        if path.exists() {
            std::fs::remove_file(&path)
                .with_context(|| format!("Failed to remove {}", path.display()))?;
        }
        Ok(())
    }
}
