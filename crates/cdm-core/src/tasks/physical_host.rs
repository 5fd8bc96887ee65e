//! `rubrik_physical_host`: add or delete physical hosts

use async_trait::async_trait;
use cdm_client::CdmClient;
use serde_json::Value;
use tracing::{info, instrument};

use crate::error::ModuleError;
use crate::outcome::TaskOutcome;
use crate::params::Params;
use crate::schema::{ArgumentSpec, ParamKind, ParamSpec};
use crate::task::Task;

pub struct PhysicalHost;

/// What the parameters ask the cluster to do
#[derive(Debug, Clone, PartialEq, Eq)]
enum HostOperation {
    Add(Vec<String>),
    Delete(String),
}

/// Hostnames named by the `hostname` parameter
#[derive(Debug, Clone, PartialEq, Eq)]
enum Hostnames {
    One(String),
    Many(Vec<String>),
}

impl Hostnames {
    fn from_value(value: &Value) -> Result<Self, ModuleError> {
        match value {
            Value::String(hostname) => Ok(Hostnames::One(hostname.clone())),
            Value::Array(items) => items
                .iter()
                .map(|item| {
                    item.as_str().map(str::to_string).ok_or_else(|| {
                        ModuleError::Argument(
                            "hostname must be a string or a list of strings".to_string(),
                        )
                    })
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Hostnames::Many),
            _ => Err(ModuleError::Argument(
                "hostname must be a string or a list of strings".to_string(),
            )),
        }
    }

    /// At least one hostname, none of them empty
    fn ensure_present(self) -> Result<Self, ModuleError> {
        let names = match &self {
            Hostnames::One(hostname) => std::slice::from_ref(hostname),
            Hostnames::Many(hostnames) => hostnames.as_slice(),
        };
        if names.is_empty() {
            return Err(ModuleError::Argument(
                "At least one hostname is required.".to_string(),
            ));
        }
        if names.iter().any(|name| name.trim().is_empty()) {
            return Err(ModuleError::Argument(
                "hostname must not be empty".to_string(),
            ));
        }
        Ok(self)
    }
}

fn parse(params: &Params) -> Result<HostOperation, ModuleError> {
    let hostnames = params
        .get("hostname")
        .ok_or_else(|| ModuleError::Argument("missing required arguments: hostname".to_string()))
        .and_then(Hostnames::from_value)
        .and_then(Hostnames::ensure_present)?;

    match (params.require_str("action")?, hostnames) {
        ("add", Hostnames::One(hostname)) => Ok(HostOperation::Add(vec![hostname])),
        ("add", Hostnames::Many(hostnames)) => Ok(HostOperation::Add(hostnames)),
        ("delete", Hostnames::One(hostname)) => Ok(HostOperation::Delete(hostname)),
        ("delete", Hostnames::Many(_)) => Err(ModuleError::Argument(
            "A list of hostnames is not supported when action is delete.".to_string(),
        )),
        (other, _) => Err(ModuleError::Argument(format!(
            "value of action must be one of: add, delete, got: {other}"
        ))),
    }
}

#[async_trait]
impl Task for PhysicalHost {
    fn name(&self) -> &'static str {
        "rubrik_physical_host"
    }

    fn description(&self) -> &'static str {
        "Add or delete a physical host from a Rubrik cluster."
    }

    fn argument_spec(&self) -> ArgumentSpec {
        ArgumentSpec::new()
            .param(
                "hostname",
                ParamSpec::new(ParamKind::Raw)
                    .required()
                    .aliases(&["ip_address"])
                    .description("The hostname or IP Address of the physical host you want to add or delete from the Rubrik cluster.")
                    .description("When C(action=add) this may also be a list of hostnames."),
            )
            .param(
                "action",
                ParamSpec::new(ParamKind::Str)
                    .required()
                    .choices(&["add", "delete"])
                    .description("Specify whether or not you wish to add or delete the physical host from the Rubrik cluster."),
            )
            .param("timeout", ParamSpec::timeout(120))
    }

    fn check(&self, params: &Params) -> Result<(), ModuleError> {
        parse(params).map(|_| ())
    }

    #[instrument(skip_all, name = "physical_host")]
    async fn run(
        &self,
        client: &dyn CdmClient,
        params: &Params,
    ) -> Result<TaskOutcome, ModuleError> {
        let timeout = params.timeout()?;

        let response = match parse(params)? {
            HostOperation::Add(hostnames) => {
                info!(count = hostnames.len(), "adding physical hosts");
                client.add_physical_host(&hostnames, timeout).await
            }
            HostOperation::Delete(hostname) => {
                info!(%hostname, "deleting physical host");
                client.delete_physical_host(&hostname, timeout).await
            }
        }
        .map_err(ModuleError::operation)?;

        Ok(TaskOutcome::from_response(response))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn validate(raw: Value) -> Result<Params, ModuleError> {
        PhysicalHost.argument_spec().validate(&raw)
    }

    #[test]
    fn test_single_and_list() {
        let params = validate(json!({"hostname": "db01", "action": "add"})).unwrap();
        assert_eq!(
            parse(&params).unwrap(),
            HostOperation::Add(vec!["db01".to_string()])
        );

        let params = validate(json!({"ip_address": ["a", "b"], "action": "add"})).unwrap();
        assert_eq!(
            parse(&params).unwrap(),
            HostOperation::Add(vec!["a".to_string(), "b".to_string()])
        );

        let params = validate(json!({"hostname": "db01", "action": "delete"})).unwrap();
        assert_eq!(
            parse(&params).unwrap(),
            HostOperation::Delete("db01".to_string())
        );
    }

    #[test]
    fn test_delete_rejects_list() {
        let params = validate(json!({"hostname": ["a", "b"], "action": "delete"})).unwrap();
        let err = PhysicalHost.check(&params).unwrap_err();
        assert_eq!(
            err.to_string(),
            "A list of hostnames is not supported when action is delete."
        );
    }

    #[test]
    fn test_rejects_non_string_hostnames() {
        let params = validate(json!({"hostname": [1, 2], "action": "add"})).unwrap();
        assert!(PhysicalHost.check(&params).is_err());

        let params = validate(json!({"hostname": {"name": "a"}, "action": "add"})).unwrap();
        assert!(PhysicalHost.check(&params).is_err());
    }

    #[test]
    fn test_rejects_empty_hostnames() {
        let params = validate(json!({"hostname": [], "action": "add"})).unwrap();
        let err = PhysicalHost.check(&params).unwrap_err();
        assert_eq!(err.to_string(), "At least one hostname is required.");

        let params = validate(json!({"hostname": "", "action": "delete"})).unwrap();
        assert!(matches!(
            PhysicalHost.check(&params),
            Err(ModuleError::Argument(_))
        ));

        let params = validate(json!({"hostname": ["db01", " "], "action": "add"})).unwrap();
        assert!(PhysicalHost.check(&params).is_err());
    }

    #[test]
    fn test_default_timeout() {
        let params = validate(json!({"hostname": "db01", "action": "add"})).unwrap();
        assert_eq!(params.int("timeout"), Some(120));
    }
}
