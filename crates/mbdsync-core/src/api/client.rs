//! API client for communicating with the My Bright Day parent gateway.
//!
//! This module provides the `ApiClient` struct for making authenticated
//! requests to list dependents and memories, and for fetching media files
//! from their signed URLs.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use futures::StreamExt;
use reqwest::{header, Client, Url};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::models::{
    ApiId, AttachmentRecord, DependentsResponse, GuardianProfile, MediaLinksRequest,
    MediaLinksResponse,
};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Base URL of the parent gateway (handles both login and data)
pub const API_BASE_URL: &str = "https://mbdgw.brighthorizons.com";

/// Timeout in seconds for gateway JSON calls. Signed-URL downloads are not
/// bounded, since a large video on a slow link can take much longer.
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Connection setup timeout in seconds, for every request
const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Timezone the gateway uses to decide which dependents are active "today".
const DEVICE_TIMEZONE: &str = "America/Los_Angeles";

/// The gateway only answers clients that look like the mobile app.
const USER_AGENT: &str = "my-bright-day-store/11.344.10 CFNetwork/3826.400.120 Darwin/24.3.0";
const APP_VERSION: &str = "my-bright-day/11.344.10";

/// Date format used in paths and query strings
const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Serialize)]
struct AuthRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct AuthResponse {
    #[serde(rename = "accessToken")]
    access_token: Option<String>,
}

/// API client for the parent gateway.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
    request_timeout: Duration,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl ApiClient {
    /// Create a new API client pointed at the production gateway
    pub fn new() -> Result<Self> {
        Self::with_base_url(API_BASE_URL)
    }

    /// Create a new API client pointed at another gateway (staging, tests)
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .default_headers(Self::app_headers())
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
        })
    }

    /// Override how long a gateway JSON call may take end to end
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Create a new ApiClient with the given token, sharing the connection pool.
    pub fn with_token(&self, token: String) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            token: Some(token),
            request_timeout: self.request_timeout,
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn app_headers() -> header::HeaderMap {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("*/*"));
        headers.insert(
            header::ACCEPT_LANGUAGE,
            header::HeaderValue::from_static("en-US,en;q=0.5"),
        );
        headers.insert("accept-version", header::HeaderValue::from_static("2"));
        headers.insert("x-backend-version", header::HeaderValue::from_static("standard"));
        headers.insert("x-app-version", header::HeaderValue::from_static(APP_VERSION));
        headers.insert("mbd-server-dependency", header::HeaderValue::from_static("2"));
        headers
    }

    /// Gateway URL for `segments`, each percent-encoded as one path segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .with_context(|| format!("Invalid gateway URL: {}", self.base_url))?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("Gateway URL cannot take a path: {}", self.base_url))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn auth_headers(&self) -> Result<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        if let Some(ref token) = self.token {
            let mut value = header::HeaderValue::from_str(&format!("Bearer {}", token))
                .context("Access token contains characters not allowed in a header")?;
            value.set_sensitive(true);
            headers.insert(header::AUTHORIZATION, value);
        }
        Ok(headers)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    /// Read the body and decode it, naming the endpoint on a shape mismatch.
    async fn decode<T: DeserializeOwned>(response: reqwest::Response, what: &str) -> Result<T> {
        let text = response
            .text()
            .await
            .with_context(|| format!("Failed to read {} response body", what))?;
        serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("{} response: {}", what, e)).into())
    }

    async fn get<T: DeserializeOwned>(&self, url: Url, what: &str) -> Result<T> {
        let response = self
            .client
            .get(url)
            .timeout(self.request_timeout)
            .headers(self.auth_headers()?)
            .send()
            .await
            .map_err(ApiError::from)
            .with_context(|| format!("Failed to send GET request for {}", what))?;

        let response = Self::check_response(response).await?;
        Self::decode(response, what).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        url: Url,
        body: &B,
        what: &str,
    ) -> Result<T> {
        let response = self
            .client
            .post(url)
            .timeout(self.request_timeout)
            .headers(self.auth_headers()?)
            .json(body)
            .send()
            .await
            .map_err(ApiError::from)
            .with_context(|| format!("Failed to send POST request for {}", what))?;

        let response = Self::check_response(response).await?;
        Self::decode(response, what).await
    }

    /// Log in with guardian credentials and return the bearer token
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<String> {
        let url = self.endpoint(&["auth", "parent"])?;
        let auth: AuthResponse = self
            .post(url, &AuthRequest { username, password }, "login")
            .await?;

        match auth.access_token {
            Some(token) if !token.is_empty() => Ok(token),
            _ => Err(ApiError::MissingAccessToken.into()),
        }
    }

    // ===== Data Fetching Methods =====

    /// Fetch the authenticated guardian's profile
    pub async fn fetch_profile(&self) -> Result<GuardianProfile> {
        let url = self.endpoint(&["parent", "user", "profile"])?;
        self.get(url, "profile").await
    }

    /// Fetch the dependents linked to a guardian as of `date`
    pub async fn fetch_dependents(
        &self,
        guardian_id: &ApiId,
        date: NaiveDate,
    ) -> Result<DependentsResponse> {
        let guardian_id = guardian_id.key();
        let date = date.format(DATE_FORMAT).to_string();
        let mut url =
            self.endpoint(&["parent", "dependents", "guardian", &guardian_id, &date])?;
        // Sent unescaped, as the mobile app does
        url.set_query(Some(&format!("device_timezone={}", DEVICE_TIMEZONE)));
        self.get(url, "dependents").await
    }

    /// List memory attachments for the given dependents in an inclusive date range
    pub async fn fetch_memories(
        &self,
        dependent_ids: &[ApiId],
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<AttachmentRecord>> {
        let mut url = self.endpoint(&["parent", "dependent", "memories", "media"])?;
        url.set_query(Some(&format!(
            "start_date={}&end_date={}",
            start_date.format(DATE_FORMAT),
            end_date.format(DATE_FORMAT)
        )));
        self.post(url, dependent_ids, "memories").await
    }

    /// Resolve signed download links for a batch of attachment ids
    pub async fn fetch_media_links(&self, media_ids: &[ApiId]) -> Result<MediaLinksResponse> {
        let url = self.endpoint(&["parent", "medias"])?;
        let body = MediaLinksRequest {
            mediaids: media_ids,
            thumbnail: false,
        };
        self.post(url, &body, "media links").await
    }

    /// Download a signed URL to `dest`, returning the number of bytes written.
    ///
    /// The body is streamed into `<dest>.part` and renamed into place once
    /// complete, so `dest` only ever exists as a whole file. Signed URLs carry
    /// their own authorization; the bearer token is not sent. Only connection
    /// setup is time-limited.
    pub async fn download_to(&self, signed_url: &str, dest: &Path) -> Result<u64> {
        let response = self
            .client
            .get(signed_url)
            .send()
            .await
            .map_err(ApiError::from)
            .with_context(|| format!("Failed to request {}", dest.display()))?;

        let response = Self::check_response(response)
            .await
            .with_context(|| format!("Failed to download {}", dest.display()))?;

        let part = part_path(dest);
        match Self::stream_to_file(response, &part).await {
            Ok(written) => {
                fs::rename(&part, dest)
                    .await
                    .with_context(|| format!("Failed to move {} into place", dest.display()))?;
                debug!(path = %dest.display(), bytes = written, "Wrote media file");
                Ok(written)
            }
            Err(e) => {
                let _ = fs::remove_file(&part).await;
                Err(e.context(format!("Failed to download {}", dest.display())))
            }
        }
    }

    async fn stream_to_file(response: reqwest::Response, part: &Path) -> Result<u64> {
        let mut file = fs::File::create(part)
            .await
            .with_context(|| format!("Failed to create {}", part.display()))?;

        let mut written: u64 = 0;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(ApiError::from)?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;
        Ok(written)
    }
}

/// `<dest>.part`, next to the final file
fn part_path(dest: &Path) -> PathBuf {
    let mut name = OsString::from(dest.as_os_str());
    name.push(".part");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_part_path_appends_suffix() {
        assert_eq!(
            part_path(Path::new("downloads/2024-03-10_clip.mov")),
            PathBuf::from("downloads/2024-03-10_clip.mov.part")
        );
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = ApiClient::with_base_url("http://localhost:8080/").unwrap();
        let url = client.endpoint(&["auth", "parent"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/auth/parent");
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let client = ApiClient::with_base_url("http://localhost:8080/gw").unwrap();
        let url = client.endpoint(&["parent", "medias"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/gw/parent/medias");
    }

    #[test]
    fn test_endpoint_escapes_each_segment() {
        let client = ApiClient::with_base_url("http://gw").unwrap();
        let url = client
            .endpoint(&["parent", "dependents", "guardian", "a/b?c", "2024-03-10"])
            .unwrap();
        assert_eq!(
            url.path(),
            "/parent/dependents/guardian/a%2Fb%3Fc/2024-03-10"
        );
        assert_eq!(url.query(), None);
    }

    #[test]
    fn test_with_token_keeps_base_url() {
        let client = ApiClient::with_base_url("http://gw").unwrap();
        assert_eq!(client.token(), None);
        let authed = client.with_token("abc".to_string());
        assert_eq!(authed.token(), Some("abc"));
        assert_eq!(authed.base_url(), "http://gw");
        let headers = authed.auth_headers().unwrap();
        assert_eq!(headers[header::AUTHORIZATION], "Bearer abc");
    }

    #[test]
    fn test_auth_response_without_token_parses() {
        let auth: AuthResponse = serde_json::from_str(r#"{"user": "x"}"#).unwrap();
        assert!(auth.access_token.is_none());
    }
}
