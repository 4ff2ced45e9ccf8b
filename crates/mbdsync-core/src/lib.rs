//! Core library for mbdsync.
//!
//! Talks to the My Bright Day parent gateway, caches the bearer token
//! between runs, and mirrors each dependent's photo and video memories
//! into a local directory without downloading anything twice.

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod models;
pub mod sync;

pub use api::{ApiClient, ApiError};
pub use auth::{AuthState, Credentials, Session, TokenCheck};
pub use cache::{DownloadLedger, TokenCache};
pub use config::{Config, ConfigError};
pub use models::ApiId;
pub use sync::{MediaDownloader, SyncRunner, SyncSummary};
