use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::ApiId;

/// One attachment posted to a dependent's memories feed.
///
/// `attachment_id` identifies the underlying file; the same attachment can
/// show up in several overlapping date-window listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentRecord {
    pub id: ApiId,
    pub attachment_id: ApiId,
    pub for_date: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MediaLinksRequest<'a> {
    pub mediaids: &'a [ApiId],
    pub thumbnail: bool,
}

/// Signed, time-limited download link for a single media file.
#[derive(Debug, Clone, Deserialize)]
pub struct MediaLink {
    pub filename: String,
    pub signed_url: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MediaLink {
    /// Local path for this media under `download_dir`, prefixed with the
    /// memory's date. Only the last component of the remote filename is used.
    pub fn local_path(&self, download_dir: &Path, for_date: &str) -> PathBuf {
        let name = Path::new(&self.filename)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.filename.replace(['/', '\\'], "_"));
        download_dir.join(format!("{}_{}", for_date, name))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaLinksResponse {
    pub medias: BTreeMap<String, MediaLink>,
}
