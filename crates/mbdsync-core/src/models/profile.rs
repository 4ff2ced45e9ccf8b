use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::ApiId;

/// Profile of the authenticated guardian.
///
/// Only `id` is needed downstream; every other field is kept verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardianProfile {
    pub id: ApiId,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GuardianProfile {
    pub fn display_name(&self) -> Option<String> {
        let first = self.extra.get("first_name").and_then(Value::as_str);
        let last = self.extra.get("last_name").and_then(Value::as_str);
        match (first, last) {
            (Some(f), Some(l)) => Some(format!("{} {}", f, l)),
            (Some(f), None) => Some(f.to_string()),
            (None, Some(l)) => Some(l.to_string()),
            (None, None) => None,
        }
    }
}
