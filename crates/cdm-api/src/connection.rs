//! Resolved connection settings for a Rubrik cluster

use std::fmt;

/// A credential value that must never reach logs or debug output
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    /// Wrap a raw credential value
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Access the raw value
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("********")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("********")
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Secret {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Credentials and address used to open a client handle
///
/// Built once per task invocation by the credential resolver. Either
/// `api_token` is set, or both `username` and `password` are.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Node IP or hostname of the cluster
    pub host: String,
    /// Login user
    pub username: Option<String>,
    /// Login password
    pub password: Option<Secret>,
    /// API token, preferred over username/password when present
    pub api_token: Option<Secret>,
}

impl ConnectionConfig {
    /// Create a config authenticated with a username and password
    pub fn with_password(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<Secret>,
    ) -> Self {
        Self {
            host: host.into(),
            username: Some(username.into()),
            password: Some(password.into()),
            api_token: None,
        }
    }

    /// Create a config authenticated with an API token
    pub fn with_token(host: impl Into<String>, api_token: impl Into<Secret>) -> Self {
        Self {
            host: host.into(),
            username: None,
            password: None,
            api_token: Some(api_token.into()),
        }
    }

    /// Whether the token will be used for authentication
    #[must_use]
    pub fn uses_token(&self) -> bool {
        self.api_token.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_is_redacted() {
        let secret = Secret::new("hunter2");
        assert_eq!(format!("{secret:?}"), "********");
        assert_eq!(secret.to_string(), "********");
        assert_eq!(secret.expose(), "hunter2");
    }

    #[test]
    fn test_config_debug_hides_password() {
        let config = ConnectionConfig::with_password("10.0.0.1", "admin", "secret");
        let debug = format!("{config:?}");
        assert!(debug.contains("10.0.0.1"));
        assert!(debug.contains("admin"));
        assert!(!debug.contains("secret"));
    }

    #[test]
    fn test_token_config() {
        let config = ConnectionConfig::with_token("cluster.local", "abc");
        assert!(config.uses_token());
        assert!(config.username.is_none());
    }
}
