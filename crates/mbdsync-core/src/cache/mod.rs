//! Local persistence between runs.
//!
//! - `TokenCache`: single-slot store for the most recently issued bearer token
//! - `DownloadLedger`: the set of attachment ids already handled, optionally
//!   written to disk so later runs can skip them too
//!
//! Both stores fail soft on read: a missing or corrupt file is the same as
//! an empty one.

pub mod ledger;
pub mod token;

pub use ledger::DownloadLedger;
pub use token::{CachedToken, TokenCache};

use std::path::Path;

use anyhow::{Context, Result};

/// Write `contents` to `path` by renaming a sibling temp file over it.
pub(crate) fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, contents)
        .with_context(|| format!("Failed to write {}", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("Failed to replace {}", path.display()))?;
    Ok(())
}
