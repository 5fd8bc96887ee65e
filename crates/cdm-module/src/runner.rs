//! One module invocation: arguments file in, result object out

use std::path::Path;

use cdm_client::Connector;
use cdm_core::{ModuleResult, find_task};
use serde_json::Value;
use tracing::{debug, warn};

/// Read a JSON object of module arguments
fn read_args(path: &Path) -> Result<Value, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("unable to read module arguments from {}: {e}", path.display()))?;
    serde_json::from_str(&content)
        .map_err(|e| format!("unable to parse module arguments from {}: {e}", path.display()))
}

/// Run `task_name` with the arguments stored at `args_path`
///
/// Bootstrap problems are reported the same way as task failures so the
/// caller always receives a result object.
pub async fn run_module<F>(
    task_name: &str,
    args_path: &Path,
    env: F,
    connector: &dyn Connector,
) -> ModuleResult
where
    F: Fn(&str) -> Option<String>,
{
    let Some(task) = find_task(task_name) else {
        warn!(task = task_name, "unknown task");
        return ModuleResult::failure(format!("unknown task: {task_name}"));
    };

    let args = match read_args(args_path) {
        Ok(args) => args,
        Err(msg) => {
            warn!(path = %args_path.display(), "failed to load module arguments");
            return ModuleResult::failure(msg);
        }
    };
    debug!(task = task.name(), path = %args_path.display(), "loaded module arguments");

    cdm_core::execute(task.as_ref(), &args, env, connector).await
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use async_trait::async_trait;
    use cdm_api::ConnectionConfig;
    use cdm_client::{CdmClient, ClientError};
    use serde_json::json;

    use super::*;

    /// Refuses every connection
    struct Unreachable;

    #[async_trait]
    impl Connector for Unreachable {
        async fn connect(
            &self,
            _config: &ConnectionConfig,
        ) -> Result<Arc<dyn CdmClient>, ClientError> {
            Err(ClientError::Operation("connection refused".to_string()))
        }
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn args_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{content}").unwrap();
        file
    }

    fn to_json(result: ModuleResult) -> Value {
        serde_json::to_value(result).unwrap()
    }

    #[tokio::test]
    async fn test_unknown_task() {
        let file = args_file("{}");
        let result = run_module("rubrik_bootstrap", file.path(), no_env, &Unreachable).await;
        assert_eq!(
            to_json(result),
            json!({"failed": true, "msg": "unknown task: rubrik_bootstrap"})
        );
    }

    #[tokio::test]
    async fn test_missing_args_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("args.json");
        let result = run_module("login_banner", &path, no_env, &Unreachable).await;

        assert!(result.is_failure());
        let value = to_json(result);
        assert!(value["msg"].as_str().unwrap().starts_with("unable to read module arguments"));
    }

    #[tokio::test]
    async fn test_invalid_json() {
        let file = args_file("banner_text: hi");
        let result = run_module("login_banner", file.path(), no_env, &Unreachable).await;
        let value = to_json(result);
        assert!(value["msg"].as_str().unwrap().starts_with("unable to parse module arguments"));
    }

    #[tokio::test]
    async fn test_connection_failure_is_reported() {
        let file = args_file(
            r#"{"node_ip": "10.0.0.1", "api_token": "tok", "banner_text": "hi"}"#,
        );
        let result = run_module("rubrik_login_banner", file.path(), no_env, &Unreachable).await;
        assert_eq!(
            to_json(result),
            json!({"failed": true, "msg": "connection refused"})
        );
    }

    #[tokio::test]
    async fn test_env_supplies_credentials() {
        let file = args_file(r#"{"banner_text": "hi"}"#);
        let env = |name: &str| match name {
            "rubrik_cdm_node_ip" => Some("10.0.0.1".to_string()),
            "rubrik_cdm_token" => Some("tok".to_string()),
            _ => None,
        };
        let result = run_module("login_banner", file.path(), env, &Unreachable).await;
        // Credentials resolved, so the failure comes from the connector.
        assert_eq!(to_json(result)["msg"], json!("connection refused"));
    }
}
