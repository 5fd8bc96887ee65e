//! Task dispatch
//!
//! Validates arguments, resolves credentials, opens a client, and runs one
//! task. Every failure short-circuits before the cluster is touched again.

use cdm_client::Connector;
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::credentials::{self, CredentialInputs};
use crate::error::ModuleError;
use crate::outcome::{ModuleResult, TaskOutcome};
use crate::schema::ArgumentSpec;
use crate::task::Task;

/// Run `task` with raw module arguments
///
/// `env` is consulted for credentials missing from the arguments.
///
/// # Errors
/// Returns the first [`ModuleError`] raised by schema composition,
/// validation, credential resolution, connection, or the task itself.
#[instrument(skip_all, fields(task = task.name()))]
pub async fn dispatch<F>(
    task: &dyn Task,
    raw_args: &Value,
    env: F,
    connector: &dyn Connector,
) -> Result<TaskOutcome, ModuleError>
where
    F: Fn(&str) -> Option<String>,
{
    let spec = ArgumentSpec::compose(task.argument_spec(), ArgumentSpec::credentials())?;
    let params = spec.validate(raw_args)?;
    task.check(&params)?;

    let config = credentials::resolve(&CredentialInputs::from_params(&params), env)?;
    info!(host = %config.host, token_auth = config.uses_token(), "connecting to cluster");

    let client = connector
        .connect(&config)
        .await
        .map_err(ModuleError::connection)?;

    let outcome = task.run(client.as_ref(), &params).await?;
    info!(changed = outcome.changed, client = client.client_type(), "task finished");
    Ok(outcome)
}

/// [`dispatch`], folded into the object printed for the host runtime
pub async fn execute<F>(
    task: &dyn Task,
    raw_args: &Value,
    env: F,
    connector: &dyn Connector,
) -> ModuleResult
where
    F: Fn(&str) -> Option<String>,
{
    let result = dispatch(task, raw_args, env, connector).await;
    if let Err(err) = &result {
        warn!(task = task.name(), kind = err.kind(), error = %err, "task failed");
    }
    result.into()
}
