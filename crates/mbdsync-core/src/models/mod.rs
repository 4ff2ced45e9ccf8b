//! Data models for gateway entities.
//!
//! - `ApiId`: string or numeric identifier, echoed back unchanged
//! - `GuardianProfile`: the logged-in parent
//! - `Dependent`, `DependentsResponse`: children linked to the guardian
//! - `AttachmentRecord`: one memory attachment posted for a date
//! - `MediaLink`, `MediaLinksResponse`: signed download links per media id

pub mod dependent;
pub mod memory;
pub mod profile;

pub use dependent::{Dependent, DependentsResponse};
pub use memory::{AttachmentRecord, MediaLink, MediaLinksRequest, MediaLinksResponse};
pub use profile::GuardianProfile;

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier as the gateway sent it.
///
/// Ids are opaque and may arrive as JSON strings or numbers. They are sent
/// back in whichever form they arrived; `Display` gives the string form used
/// for paths, map keys and the download ledger.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ApiId {
    Text(String),
    Number(i64),
}

impl ApiId {
    /// String form, shared by `"42"` and `42`
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ApiId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiId::Text(s) => f.write_str(s),
            ApiId::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for ApiId {
    fn from(s: &str) -> Self {
        ApiId::Text(s.to_string())
    }
}

impl From<i64> for ApiId {
    fn from(n: i64) -> Self {
        ApiId::Number(n)
    }
}
