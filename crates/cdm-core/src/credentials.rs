//! Credential resolution
//!
//! Merges the `provider` block, the top-level credential parameters, and
//! environment variables into a single [`ConnectionConfig`]. For each field
//! the first set source wins, in that order.

use cdm_api::{ConnectionConfig, Secret};
use serde_json::{Map, Value};

use crate::error::ModuleError;
use crate::params::Params;

/// Environment variable holding the cluster address
pub const ENV_NODE_IP: &str = "rubrik_cdm_node_ip";
/// Environment variable holding the login user
pub const ENV_USERNAME: &str = "rubrik_cdm_username";
/// Environment variable holding the login password
pub const ENV_PASSWORD: &str = "rubrik_cdm_password";
/// Environment variable holding the API token
pub const ENV_TOKEN: &str = "rubrik_cdm_token";

/// Credential fields grouped under the `provider` parameter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderBlock {
    pub node_ip: Option<String>,
    pub username: Option<String>,
    pub password: Option<Secret>,
    pub api_token: Option<Secret>,
}

impl ProviderBlock {
    fn from_map(map: &Map<String, Value>) -> Self {
        let field = |name: &str| non_empty(map.get(name).and_then(Value::as_str));
        Self {
            node_ip: field("node_ip"),
            username: field("username"),
            password: field("password").map(Secret::from),
            api_token: field("api_token").map(Secret::from),
        }
    }

    /// Whether no field is set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.node_ip.is_none()
            && self.username.is_none()
            && self.password.is_none()
            && self.api_token.is_none()
    }
}

/// Credential parameters as supplied to a task
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialInputs {
    pub node_ip: Option<String>,
    pub username: Option<String>,
    pub password: Option<Secret>,
    pub api_token: Option<Secret>,
    pub provider: Option<ProviderBlock>,
}

impl CredentialInputs {
    /// Read the credential parameters out of validated task parameters
    #[must_use]
    pub fn from_params(params: &Params) -> Self {
        let field = |name: &str| non_empty(params.str(name));
        Self {
            node_ip: field("node_ip"),
            username: field("username"),
            password: field("password").map(Secret::from),
            api_token: field("api_token").map(Secret::from),
            provider: params
                .dict("provider")
                .map(ProviderBlock::from_map)
                .filter(|provider| !provider.is_empty()),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

/// First source holding a non-empty value
fn first_set<const N: usize>(sources: [Option<String>; N]) -> Option<String> {
    sources.into_iter().flatten().find(|value| !value.is_empty())
}

/// Resolve credentials using `env` for the fallback lookups
///
/// # Errors
/// Returns [`ModuleError::Configuration`] when no host is available, when
/// neither an API token nor a username/password pair is available, or when
/// only one half of the pair is set without a token.
pub fn resolve<F>(inputs: &CredentialInputs, env: F) -> Result<ConnectionConfig, ModuleError>
where
    F: Fn(&str) -> Option<String>,
{
    let provider = inputs.provider.clone().unwrap_or_default();

    let host = first_set([provider.node_ip, inputs.node_ip.clone(), env(ENV_NODE_IP)]);
    let username = first_set([
        provider.username,
        inputs.username.clone(),
        env(ENV_USERNAME),
    ]);
    let password = first_set([
        provider.password.map(|s| s.expose().to_string()),
        inputs.password.as_ref().map(|s| s.expose().to_string()),
        env(ENV_PASSWORD),
    ])
    .map(Secret::from);
    let api_token = first_set([
        provider.api_token.map(|s| s.expose().to_string()),
        inputs.api_token.as_ref().map(|s| s.expose().to_string()),
        env(ENV_TOKEN),
    ])
    .map(Secret::from);

    let Some(host) = host else {
        return Err(ModuleError::Configuration(format!(
            "host is required: provide node_ip, provider.node_ip, or set {ENV_NODE_IP}"
        )));
    };

    if api_token.is_none() {
        match (&username, &password) {
            (None, None) => {
                return Err(ModuleError::Configuration(
                    "an api_token or a username and password is required for authentication"
                        .to_string(),
                ));
            }
            (Some(_), None) | (None, Some(_)) => {
                return Err(ModuleError::Configuration(
                    "username and password must be provided together".to_string(),
                ));
            }
            (Some(_), Some(_)) => {}
        }
    }

    Ok(ConnectionConfig {
        host,
        username,
        password,
        api_token,
    })
}

/// Resolve credentials against the process environment
///
/// # Errors
/// See [`resolve`].
pub fn resolve_from_env(inputs: &CredentialInputs) -> Result<ConnectionConfig, ModuleError> {
    resolve(inputs, |name| std::env::var(name).ok())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    fn top_level(host: Option<&str>, username: Option<&str>, password: Option<&str>) -> CredentialInputs {
        CredentialInputs {
            node_ip: host.map(String::from),
            username: username.map(String::from),
            password: password.map(Secret::from),
            ..Default::default()
        }
    }

    #[test]
    fn test_top_level_password_login() {
        let inputs = top_level(Some("10.0.0.1"), Some("admin"), Some("secret"));
        let config = resolve(&inputs, no_env).unwrap();
        assert_eq!(
            config,
            ConnectionConfig::with_password("10.0.0.1", "admin", "secret")
        );
    }

    #[test]
    fn test_missing_password() {
        let inputs = top_level(Some("10.0.0.1"), Some("admin"), None);
        let err = resolve(&inputs, no_env).unwrap_err();
        assert_eq!(
            err,
            ModuleError::Configuration("username and password must be provided together".to_string())
        );
    }

    #[test]
    fn test_missing_username() {
        let inputs = top_level(Some("10.0.0.1"), None, Some("secret"));
        let err = resolve(&inputs, no_env).unwrap_err();
        assert!(err.to_string().contains("provided together"));
    }

    #[test]
    fn test_missing_host() {
        let inputs = top_level(None, Some("admin"), Some("secret"));
        let err = resolve(&inputs, no_env).unwrap_err();
        assert!(matches!(err, ModuleError::Configuration(_)));
        assert!(err.to_string().starts_with("host is required"));
    }

    #[test]
    fn test_no_credentials() {
        let inputs = top_level(Some("10.0.0.1"), None, None);
        let err = resolve(&inputs, no_env).unwrap_err();
        assert!(err.to_string().contains("api_token"));
    }

    #[test]
    fn test_token_substitutes_for_pair() {
        let mut inputs = top_level(Some("10.0.0.1"), Some("admin"), None);
        inputs.api_token = Some(Secret::from("tok"));
        let config = resolve(&inputs, no_env).unwrap();
        assert!(config.uses_token());
        assert_eq!(config.username.as_deref(), Some("admin"));
    }

    #[test]
    fn test_provider_wins_over_top_level() {
        let mut inputs = top_level(Some("10.0.0.1"), Some("admin"), Some("secret"));
        inputs.provider = Some(ProviderBlock {
            node_ip: Some("10.9.9.9".to_string()),
            username: Some("svc".to_string()),
            ..Default::default()
        });

        let config = resolve(&inputs, no_env).unwrap();
        assert_eq!(config.host, "10.9.9.9");
        assert_eq!(config.username.as_deref(), Some("svc"));
        assert_eq!(config.password, Some(Secret::from("secret")));
    }

    #[test]
    fn test_env_only_when_both_unset() {
        let env = env_from(&[
            (ENV_NODE_IP, "10.5.5.5"),
            (ENV_USERNAME, "env-user"),
            (ENV_PASSWORD, "env-pass"),
        ]);

        let inputs = top_level(Some("10.0.0.1"), None, None);
        let config = resolve(&inputs, &env).unwrap();
        assert_eq!(config.host, "10.0.0.1");
        assert_eq!(config.username.as_deref(), Some("env-user"));
        assert_eq!(config.password, Some(Secret::from("env-pass")));

        let config = resolve(&CredentialInputs::default(), &env).unwrap();
        assert_eq!(config.host, "10.5.5.5");
    }

    #[test]
    fn test_env_token() {
        let env = env_from(&[(ENV_NODE_IP, "cluster"), (ENV_TOKEN, "tok")]);
        let config = resolve(&CredentialInputs::default(), env).unwrap();
        assert_eq!(config, ConnectionConfig::with_token("cluster", "tok"));
    }

    #[test]
    fn test_empty_strings_are_unset() {
        let env = env_from(&[(ENV_NODE_IP, "")]);
        let inputs = top_level(Some(""), Some("admin"), Some("secret"));
        assert!(resolve(&inputs, env).is_err());
    }
}
