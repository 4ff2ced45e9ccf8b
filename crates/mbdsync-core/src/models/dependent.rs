use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::ApiId;

/// A child profile linked to the guardian.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dependent {
    pub id: ApiId,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DependentsResponse {
    pub dependents: Vec<Dependent>,
}

impl DependentsResponse {
    /// Dependent ids in response order, without repeats.
    pub fn ids(&self) -> Vec<ApiId> {
        let mut ids: Vec<ApiId> = Vec::with_capacity(self.dependents.len());
        for dependent in &self.dependents {
            if !ids.contains(&dependent.id) {
                ids.push(dependent.id.clone());
            }
        }
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_preserve_order_and_drop_repeats() {
        let json = r#"{"dependents": [
            {"id": "kid-b", "first_name": "Bea"},
            {"id": "kid-a", "first_name": "Al"},
            {"id": "kid-b", "first_name": "Bea"}
        ]}"#;
        let resp: DependentsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.ids(), vec![ApiId::from("kid-b"), ApiId::from("kid-a")]);
    }

    #[test]
    fn test_numeric_ids_stay_numeric() {
        let resp: DependentsResponse =
            serde_json::from_str(r#"{"dependents": [{"id": 42}, {"id": "kid-a"}]}"#).unwrap();
        let body = serde_json::to_string(&resp.ids()).unwrap();
        assert_eq!(body, r#"[42,"kid-a"]"#);
    }

    #[test]
    fn test_missing_dependents_key_fails() {
        assert!(serde_json::from_str::<DependentsResponse>(r#"{"children": []}"#).is_err());
    }
}
