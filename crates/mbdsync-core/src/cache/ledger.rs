use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Ledger file name in cache directory
const LEDGER_FILE: &str = "downloaded.json";

#[derive(Debug, Serialize, Deserialize)]
struct LedgerFile {
    #[serde(rename = "attachmentIds")]
    attachment_ids: BTreeSet<String>,
    #[serde(rename = "updatedAt")]
    updated_at: DateTime<Utc>,
}

/// Attachment ids already handled. Grows monotonically.
///
/// An in-memory ledger only lives for the current run. A persistent ledger
/// is seeded from disk and written back by `save`.
#[derive(Debug, Default)]
pub struct DownloadLedger {
    ids: BTreeSet<String>,
    path: Option<PathBuf>,
    /// Ids present when the ledger was opened, so the run summary can report
    /// only what this run added.
    seeded: usize,
}

impl DownloadLedger {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open the ledger stored in `cache_dir`. A missing or corrupt file
    /// starts an empty ledger.
    pub fn persistent(cache_dir: PathBuf) -> Self {
        let path = cache_dir.join(LEDGER_FILE);
        let ids = match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<LedgerFile>(&contents) {
                Ok(file) => file.attachment_ids,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Ignoring corrupt download ledger");
                    BTreeSet::new()
                }
            },
            Err(e) => {
                debug!(path = %path.display(), error = %e, "No download ledger yet");
                BTreeSet::new()
            }
        };

        debug!(count = ids.len(), "Download ledger opened");
        let seeded = ids.len();
        Self {
            ids,
            path: Some(path),
            seeded,
        }
    }

    pub fn contains(&self, attachment_id: &str) -> bool {
        self.ids.contains(attachment_id)
    }

    /// Mark an id as handled. Returns false if it already was.
    pub fn insert(&mut self, attachment_id: &str) -> bool {
        if self.ids.contains(attachment_id) {
            return false;
        }
        self.ids.insert(attachment_id.to_string())
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Ids marked since the ledger was opened
    pub fn added_this_run(&self) -> usize {
        self.ids.len() - self.seeded
    }

    pub fn is_persistent(&self) -> bool {
        self.path.is_some()
    }

    /// Write the ledger back to disk. No-op for an in-memory ledger.
    pub fn save(&self) -> Result<()> {
        let Some(ref path) = self.path else {
            return Ok(());
        };
        let file = LedgerFile {
            attachment_ids: self.ids.clone(),
            updated_at: Utc::now(),
        };
        let contents = serde_json::to_string_pretty(&file)?;
        super::write_atomic(path, &contents).context("Failed to save download ledger")
    }
}
