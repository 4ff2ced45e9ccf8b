use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs;
use tracing::{debug, info, warn};

use crate::api::ApiClient;
use crate::cache::DownloadLedger;
use crate::models::{ApiId, AttachmentRecord};

/// Downloads attachment media, each attachment at most once.
///
/// Two things stop a repeat download: the ledger of attachment ids already
/// handled, and an existing file at the attachment's local path. Existing
/// files are never overwritten.
pub struct MediaDownloader {
    download_dir: PathBuf,
    ledger: DownloadLedger,
    files_written: usize,
}

impl MediaDownloader {
    pub fn new(download_dir: PathBuf, ledger: DownloadLedger) -> Self {
        Self {
            download_dir,
            ledger,
            files_written: 0,
        }
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    pub fn ledger(&self) -> &DownloadLedger {
        &self.ledger
    }

    /// Files written across every call so far
    pub fn files_written(&self) -> usize {
        self.files_written
    }

    /// Records not yet in the ledger, one per attachment id, in first-seen order.
    pub fn pending<'a>(&self, records: &'a [AttachmentRecord]) -> Vec<&'a AttachmentRecord> {
        let mut seen = HashSet::new();
        let mut pending = Vec::new();
        for record in records {
            let key = record.attachment_id.key();
            if self.ledger.contains(&key) || !seen.insert(key) {
                continue;
            }
            pending.push(record);
        }
        pending
    }

    /// Download every attachment in `records` that has not been handled yet,
    /// returning how many files this call wrote.
    ///
    /// An attachment listed more than once is saved under the date of its
    /// last listing. Files already on disk are skipped and not counted. Any
    /// failed request aborts the call.
    pub async fn download_attachments(
        &mut self,
        client: &ApiClient,
        records: &[AttachmentRecord],
    ) -> Result<usize> {
        let pending = self.pending(records);
        if pending.is_empty() {
            debug!(listed = records.len(), "Nothing new to download");
            return Ok(0);
        }

        info!(count = pending.len(), "Downloading attachments");
        // Later records overwrite earlier ones
        let for_dates: HashMap<String, &str> = records
            .iter()
            .map(|r| (r.attachment_id.key(), r.for_date.as_str()))
            .collect();
        let media_ids: Vec<ApiId> = pending.iter().map(|r| r.attachment_id.clone()).collect();

        let links = client
            .fetch_media_links(&media_ids)
            .await
            .context("Failed to resolve media download links")?;
        debug!(count = links.medias.len(), "Retrieved media links");

        fs::create_dir_all(&self.download_dir)
            .await
            .with_context(|| format!("Failed to create {}", self.download_dir.display()))?;

        let mut written = 0;
        for (media_id, media) in &links.medias {
            let Some(for_date) = for_dates.get(media_id.as_str()) else {
                warn!(media_id = %media_id, "Gateway returned a link that was not requested");
                continue;
            };
            // Marked before fetching so a repeat in this batch is never fetched twice
            if !self.ledger.insert(media_id) {
                continue;
            }

            let path = media.local_path(&self.download_dir, for_date);
            let exists = fs::try_exists(&path)
                .await
                .with_context(|| format!("Failed to check {}", path.display()))?;
            if exists {
                info!(path = %path.display(), "Skipping, already exists");
                continue;
            }

            client.download_to(&media.signed_url, &path).await?;
            info!(path = %path.display(), "Downloaded");
            written += 1;
        }

        self.files_written += written;
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(attachment_id: &str, for_date: &str) -> AttachmentRecord {
        AttachmentRecord {
            id: ApiId::from(format!("m-{}", attachment_id).as_str()),
            attachment_id: ApiId::from(attachment_id),
            for_date: for_date.to_string(),
        }
    }

    #[test]
    fn test_pending_collapses_repeats_and_skips_ledger() {
        let mut ledger = DownloadLedger::in_memory();
        ledger.insert("done");
        let downloader = MediaDownloader::new(PathBuf::from("downloads"), ledger);

        let records = vec![
            record("a", "2024-03-08"),
            record("done", "2024-03-08"),
            record("b", "2024-03-09"),
            record("a", "2024-03-10"),
        ];
        let pending = downloader.pending(&records);
        let ids: Vec<String> = pending.iter().map(|r| r.attachment_id.key()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(pending[0].for_date, "2024-03-08");
    }

    #[test]
    fn test_pending_matches_numeric_ids_against_ledger() {
        let mut ledger = DownloadLedger::in_memory();
        ledger.insert("7");
        let downloader = MediaDownloader::new(PathBuf::from("downloads"), ledger);

        let records = vec![
            AttachmentRecord {
                id: ApiId::from(1),
                attachment_id: ApiId::from(7),
                for_date: "2024-03-10".to_string(),
            },
            AttachmentRecord {
                id: ApiId::from(2),
                attachment_id: ApiId::from(8),
                for_date: "2024-03-10".to_string(),
            },
        ];
        let pending = downloader.pending(&records);
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].attachment_id, ApiId::Number(8));
    }

    #[tokio::test]
    async fn test_empty_batch_makes_no_requests() {
        // Unroutable base URL: any request would fail the call.
        let client = ApiClient::with_base_url("http://127.0.0.1:9").unwrap();
        let mut ledger = DownloadLedger::in_memory();
        ledger.insert("a");
        let mut downloader = MediaDownloader::new(PathBuf::from("unused"), ledger);

        let written = downloader
            .download_attachments(&client, &[record("a", "2024-03-10")])
            .await
            .unwrap();
        assert_eq!(written, 0);
        assert_eq!(downloader.files_written(), 0);
    }
}
