use std::fmt;

use crate::config::ConfigError;

/// Environment variable holding the guardian's login
pub const USERNAME_VAR: &str = "BH_USERNAME";

/// Environment variable holding the guardian's password
pub const PASSWORD_VAR: &str = "BH_PASSWORD";

#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Read both credentials from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read both credentials through `lookup`. Unset and blank values are
    /// both treated as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::MissingCredential(name))
        };
        Ok(Self::new(read(USERNAME_VAR)?, read(PASSWORD_VAR)?))
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
