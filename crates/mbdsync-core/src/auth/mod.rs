//! Authentication module for obtaining a usable bearer token.
//!
//! This module provides:
//! - `Credentials`: guardian username/password read from the environment
//! - `Session`: reuses a cached token when the gateway still accepts it,
//!   otherwise logs in again and caches the fresh token

pub mod credentials;
pub mod session;

pub use credentials::{Credentials, PASSWORD_VAR, USERNAME_VAR};
pub use session::{AuthState, Session, TokenCheck};
