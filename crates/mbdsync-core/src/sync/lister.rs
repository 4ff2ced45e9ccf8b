use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};
use tracing::debug;

use crate::api::ApiClient;
use crate::models::{ApiId, AttachmentRecord};

/// Extra days each listing looks back past its target date.
pub const LOOKBACK_DAYS: i64 = 2;

/// Inclusive `(start, end)` listing window for `target`.
pub fn memory_window(target: NaiveDate) -> (NaiveDate, NaiveDate) {
    (target - Duration::days(LOOKBACK_DAYS), target)
}

/// List attachments posted for any of `dependent_ids` in the window ending
/// on `target`. Records that also appear in neighbouring windows are
/// returned as-is.
pub async fn retrieve_attachments(
    client: &ApiClient,
    dependent_ids: &[ApiId],
    target: NaiveDate,
) -> Result<Vec<AttachmentRecord>> {
    if dependent_ids.is_empty() {
        debug!(%target, "No dependents, skipping memory listing");
        return Ok(Vec::new());
    }

    let (start, end) = memory_window(target);
    let records = client
        .fetch_memories(dependent_ids, start, end)
        .await
        .with_context(|| format!("Failed to list memories from {} to {}", start, end))?;

    debug!(%start, %end, count = records.len(), "Retrieved attachment ids");
    Ok(records)
}
