//! `rubrik_on_demand_snapshot`: take an on-demand snapshot of a protected object

use async_trait::async_trait;
use cdm_api::{HostOs, ObjectType, OnDemandSnapshotRequest};
use cdm_client::CdmClient;
use tracing::{info, instrument};

use crate::error::ModuleError;
use crate::outcome::{OutcomeBuilder, TaskOutcome};
use crate::params::Params;
use crate::schema::{ArgumentSpec, ParamKind, ParamSpec};
use crate::task::Task;

pub struct OnDemandSnapshot;

/// Placeholder the module interface uses for "not provided"
const NONE: &str = "None";

/// A string parameter, treating `None` and the empty string as unset
fn optional(params: &Params, name: &str) -> Option<String> {
    params
        .str(name)
        .filter(|value| !value.is_empty() && *value != NONE)
        .map(str::to_string)
}

fn build_request(params: &Params) -> Result<OnDemandSnapshotRequest, ModuleError> {
    let object_type: ObjectType = params
        .require_str("object_type")?
        .parse()
        .map_err(ModuleError::Argument)?;

    let host_os = optional(params, "host_os")
        .map(|os| os.parse::<HostOs>())
        .transpose()
        .map_err(ModuleError::Argument)?;

    let mut request = OnDemandSnapshotRequest::new(params.require_str("object_name")?, object_type);
    if let Some(sla_name) = optional(params, "sla_name") {
        request.sla_name = sla_name;
    }
    request.fileset = optional(params, "fileset");
    request.host_os = host_os;
    request.sql_host = optional(params, "sql_host");
    request.sql_instance = optional(params, "sql_instance");

    if request.object_type == ObjectType::PhysicalHost
        && (request.fileset.is_none() || request.host_os.is_none())
    {
        return Err(ModuleError::Argument(
            "The fileset and host_os parameters are required when object_type is physical_host."
                .to_string(),
        ));
    }

    if request.object_type == ObjectType::MssqlDb
        && (request.sql_host.is_none() || request.sql_instance.is_none())
    {
        return Err(ModuleError::Argument(
            "The sql_host and sql_instance parameters are required when object_type is mssql_db."
                .to_string(),
        ));
    }

    Ok(request)
}

#[async_trait]
impl Task for OnDemandSnapshot {
    fn name(&self) -> &'static str {
        "rubrik_on_demand_snapshot"
    }

    fn description(&self) -> &'static str {
        "Take an on-demand snapshot of a Rubrik protected object."
    }

    fn argument_spec(&self) -> ArgumentSpec {
        ArgumentSpec::new()
            .param(
                "object_name",
                ParamSpec::new(ParamKind::Str)
                    .required()
                    .description("The name of the Rubrik object to take an on-demand snapshot of."),
            )
            .param(
                "object_type",
                ParamSpec::new(ParamKind::Str)
                    .default(ObjectType::Vmware.as_str())
                    .choices(&ObjectType::ALL)
                    .description("The Rubrik object type you want to backup."),
            )
            .param(
                "sla_name",
                ParamSpec::new(ParamKind::Str)
                    .default("current")
                    .description("The SLA Domain name you want to assign the on-demand snapshot to.")
                    .description("By default, the currently assigned SLA Domain will be used."),
            )
            .param(
                "fileset",
                ParamSpec::new(ParamKind::Str)
                    .default(NONE)
                    .description("The name of the Fileset you wish to backup.")
                    .description("Only required when taking a on-demand snapshot of a physical host."),
            )
            .param(
                "host_os",
                ParamSpec::new(ParamKind::Str)
                    .default(NONE)
                    .choices(&[NONE, "Linux", "Windows"])
                    .description("The operating system for the physical host.")
                    .description("Only required when taking a on-demand snapshot of a physical host."),
            )
            .param(
                "sql_host",
                ParamSpec::new(ParamKind::Str)
                    .description("The name of the SQL Host hosting the specified database.")
                    .description("Only required when taking a on-demand snapshot of a MSSQL DB."),
            )
            .param(
                "sql_instance",
                ParamSpec::new(ParamKind::Str)
                    .description("The name of the SQL instance hosting the specified database.")
                    .description("Only required when taking a on-demand snapshot of a MSSQL DB."),
            )
            .param("timeout", ParamSpec::timeout(30))
            .required_if(
                "object_type",
                ObjectType::MssqlDb.as_str(),
                &["sql_host", "sql_instance"],
            )
    }

    fn check(&self, params: &Params) -> Result<(), ModuleError> {
        build_request(params).map(|_| ())
    }

    #[instrument(skip_all, name = "on_demand_snapshot")]
    async fn run(
        &self,
        client: &dyn CdmClient,
        params: &Params,
    ) -> Result<TaskOutcome, ModuleError> {
        let request = build_request(params)?;
        info!(
            object = %request.object_name,
            object_type = %request.object_type,
            sla = %request.sla_name,
            "requesting on-demand snapshot"
        );

        let snapshot = client
            .on_demand_snapshot(&request, params.timeout()?)
            .await
            .map_err(ModuleError::operation)?;

        // A new snapshot job is queued on every call.
        Ok(OutcomeBuilder::new(snapshot.response)
            .changed(true)
            .extra("job_status_url", snapshot.job_status_url)
            .build())
    }
}
