//! REST API client module for the My Bright Day parent gateway.
//!
//! This module provides the `ApiClient` for authenticating a guardian,
//! resolving their dependents, listing memory attachments, and fetching
//! the signed media files those attachments point at.
//!
//! The gateway uses bearer token authentication obtained through the
//! `/auth/parent` endpoint.

pub mod client;
pub mod error;

pub use client::{ApiClient, API_BASE_URL};
pub use error::ApiError;
