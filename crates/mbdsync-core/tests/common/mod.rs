//! Mock parent gateway for integration testing
//!
//! Provides wiremock-based endpoints for login, profile, dependents, memory
//! listing, media links and signed file downloads.

#![allow(dead_code)]

use std::path::PathBuf;

use chrono::NaiveDate;
use mbdsync_core::{ApiId, Config, Credentials};
use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

pub const USERNAME: &str = "parent@example.com";
pub const PASSWORD: &str = "correct horse";
pub const GUARDIAN_ID: &str = "guardian-1";

/// Matches requests that carry no Authorization header
pub struct NoAuthorization;

impl Match for NoAuthorization {
    fn matches(&self, request: &Request) -> bool {
        !request.headers.contains_key("authorization")
    }
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn credentials() -> Credentials {
    Credentials::new(USERNAME, PASSWORD)
}

/// Scratch directories for one test
pub struct Dirs {
    _root: TempDir,
    pub cache: PathBuf,
    pub downloads: PathBuf,
}

impl Dirs {
    pub fn new() -> Self {
        let root = TempDir::new().unwrap();
        let cache = root.path().join("cache");
        let downloads = root.path().join("downloads");
        Self {
            _root: root,
            cache,
            downloads,
        }
    }

    pub fn config(&self, server: &MockServer, remember_downloads: bool) -> Config {
        Config {
            credentials: credentials(),
            api_base: server.uri(),
            download_dir: self.downloads.clone(),
            cache_dir: self.cache.clone(),
            remember_downloads,
        }
    }

    /// Names of the files in the download directory, sorted
    pub fn downloaded_files(&self) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(&self.downloads) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

pub fn ids(values: &[&str]) -> Vec<ApiId> {
    values.iter().map(|v| ApiId::from(*v)).collect()
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

pub async fn mount_login(server: &MockServer, token: &str, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/auth/parent"))
        .and(body_json(json!({"username": USERNAME, "password": PASSWORD})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accessToken": token})))
        .expect(expected_calls)
        .mount(server)
        .await;
}

pub async fn mount_profile(server: &MockServer, token: &str, status: u16, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path("/parent/user/profile"))
        .and(header("authorization", bearer(token).as_str()))
        .respond_with(ResponseTemplate::new(status).set_body_json(json!({
            "id": GUARDIAN_ID,
            "first_name": "Ada",
            "last_name": "Byron"
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

pub async fn mount_dependents(server: &MockServer, today: &str, status: u16, ids: &[&str]) {
    let dependents: Vec<Value> = ids.iter().map(|id| json!({"id": id, "first_name": "Kid"})).collect();
    Mock::given(method("GET"))
        .and(path(format!("/parent/dependents/guardian/{}/{}", GUARDIAN_ID, today)))
        .and(query_param("device_timezone", "America/Los_Angeles"))
        .respond_with(ResponseTemplate::new(status).set_body_json(json!({"dependents": dependents})))
        .expect(1)
        .mount(server)
        .await;
}

pub fn record(attachment_id: &str, for_date: &str) -> Value {
    json!({"id": format!("memory-{}", attachment_id), "attachment_id": attachment_id, "for_date": for_date})
}

pub async fn mount_memories(
    server: &MockServer,
    start: &str,
    end: &str,
    dependents: &[&str],
    records: Vec<Value>,
    expected_calls: u64,
) {
    Mock::given(method("POST"))
        .and(path("/parent/dependent/memories/media"))
        .and(query_param("start_date", start))
        .and(query_param("end_date", end))
        .and(body_json(json!(dependents)))
        .respond_with(ResponseTemplate::new(200).set_body_json(Value::Array(records)))
        .expect(expected_calls)
        .mount(server)
        .await;
}

/// Media links response for `(attachment_id, filename)` pairs, each pointing
/// at `/signed/<filename>` on the mock server.
pub async fn mount_media_links(
    server: &MockServer,
    requested: &[&str],
    files: &[(&str, &str)],
    expected_calls: u64,
) {
    let mut medias = serde_json::Map::new();
    for (attachment_id, filename) in files {
        medias.insert(
            attachment_id.to_string(),
            json!({
                "filename": filename,
                "signed_url": format!("{}/signed/{}?sig=abc", server.uri(), filename),
                "content_type": "image/jpeg"
            }),
        );
    }
    Mock::given(method("POST"))
        .and(path("/parent/medias"))
        .and(body_json(json!({"mediaids": requested, "thumbnail": false})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"medias": medias})))
        .expect(expected_calls)
        .mount(server)
        .await;
}

pub async fn mount_file(server: &MockServer, filename: &str, body: &[u8], expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/signed/{}", filename)))
        .and(NoAuthorization)
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
        .expect(expected_calls)
        .mount(server)
        .await;
}
