use anyhow::{bail, Result};
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiError};
use crate::cache::TokenCache;

use super::Credentials;

/// Where a `Session` is in obtaining a usable token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    NoToken,
    /// A cached token has been loaded and is being checked
    CachedUntested,
    /// No usable cached token; a credential login is in flight
    FreshLoginPending,
    Authenticated,
    /// Login was refused. Terminal.
    Failed,
}

/// Outcome of checking whether the gateway still accepts a token.
#[derive(Debug)]
pub enum TokenCheck {
    Valid,
    /// The gateway answered, but not with success
    Rejected(String),
    /// The request never got an answer
    Unreachable(String),
}

impl TokenCheck {
    pub fn is_valid(&self) -> bool {
        matches!(self, TokenCheck::Valid)
    }
}

/// Owns the login state for one run and hands out authenticated clients.
pub struct Session {
    api: ApiClient,
    cache: TokenCache,
    credentials: Credentials,
    state: AuthState,
    authenticated: Option<ApiClient>,
}

impl Session {
    pub fn new(api: ApiClient, cache: TokenCache, credentials: Credentials) -> Self {
        Self {
            api,
            cache,
            credentials,
            state: AuthState::NoToken,
            authenticated: None,
        }
    }

    pub fn state(&self) -> AuthState {
        self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state == AuthState::Authenticated
    }

    /// Return a client carrying a token the gateway accepts.
    ///
    /// A cached token is tried first and kept if a profile request with it
    /// succeeds. Otherwise the credentials are posted to the login endpoint
    /// and the new token is cached. Once authenticated, further calls return
    /// the same client without touching the network.
    pub async fn log_in(&mut self) -> Result<ApiClient> {
        match self.state {
            AuthState::Authenticated => {
                if let Some(ref client) = self.authenticated {
                    return Ok(client.clone());
                }
            }
            AuthState::Failed => bail!("Login already failed for this run"),
            _ => {}
        }

        if let Some(cached) = self.cache.load() {
            self.state = AuthState::CachedUntested;
            let age_minutes = cached.age().num_minutes();
            let candidate = self.api.with_token(cached.access_token);

            match Self::check_token(&candidate).await {
                TokenCheck::Valid => {
                    info!(age_minutes, "Reusing cached access token");
                    return Ok(self.install(candidate));
                }
                TokenCheck::Rejected(reason) => {
                    info!(reason = %reason, "Cached access token rejected, logging in again");
                    if let Err(e) = self.cache.clear() {
                        debug!(error = %e, "Failed to clear rejected token");
                    }
                }
                TokenCheck::Unreachable(reason) => {
                    debug!(reason = %reason, "Could not check cached access token");
                }
            }
        }

        self.state = AuthState::FreshLoginPending;
        let token = match self
            .api
            .authenticate(&self.credentials.username, self.credentials.password())
            .await
        {
            Ok(token) => token,
            Err(e) => {
                self.state = AuthState::Failed;
                return Err(e.context("Login failed"));
            }
        };

        if let Err(e) = self.cache.save(&token) {
            warn!(error = %e, "Failed to cache access token; continuing with in-memory token");
        }

        info!(username = %self.credentials.username, "Login successful");
        let client = self.api.with_token(token);
        Ok(self.install(client))
    }

    /// Check a token by fetching the guardian profile with it.
    pub async fn check_token(client: &ApiClient) -> TokenCheck {
        match client.fetch_profile().await {
            Ok(_) => TokenCheck::Valid,
            Err(e) => match e.downcast_ref::<ApiError>() {
                Some(ApiError::NetworkError(_)) => TokenCheck::Unreachable(format!("{:#}", e)),
                _ => TokenCheck::Rejected(format!("{:#}", e)),
            },
        }
    }

    fn install(&mut self, client: ApiClient) -> ApiClient {
        self.state = AuthState::Authenticated;
        self.authenticated = Some(client.clone());
        client
    }
}
