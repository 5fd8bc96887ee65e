//! Task trait

use async_trait::async_trait;
use cdm_client::CdmClient;

use crate::error::ModuleError;
use crate::outcome::TaskOutcome;
use crate::params::Params;
use crate::schema::ArgumentSpec;

/// A module that performs one operation against a cluster
#[async_trait]
pub trait Task: Send + Sync {
    /// Module name, e.g. `rubrik_login_banner`
    fn name(&self) -> &'static str;

    /// One line summary used in documentation
    fn description(&self) -> &'static str;

    /// Task specific parameters, without the shared credential parameters
    fn argument_spec(&self) -> ArgumentSpec;

    /// Cross-field checks that must pass before the cluster is contacted
    fn check(&self, _params: &Params) -> Result<(), ModuleError> {
        Ok(())
    }

    /// Run the operation and normalize its response
    async fn run(&self, client: &dyn CdmClient, params: &Params)
    -> Result<TaskOutcome, ModuleError>;
}
