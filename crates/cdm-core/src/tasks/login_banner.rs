//! `rubrik_login_banner`: configure the pre-login banner text

use async_trait::async_trait;
use cdm_client::CdmClient;
use tracing::instrument;

use crate::error::ModuleError;
use crate::outcome::TaskOutcome;
use crate::params::Params;
use crate::schema::{ArgumentSpec, ParamKind, ParamSpec};
use crate::task::Task;

pub struct LoginBanner;

#[async_trait]
impl Task for LoginBanner {
    fn name(&self) -> &'static str {
        "rubrik_login_banner"
    }

    fn description(&self) -> &'static str {
        "Configure the Rubrik cluster login banner text."
    }

    fn argument_spec(&self) -> ArgumentSpec {
        ArgumentSpec::new()
            .param(
                "banner_text",
                ParamSpec::new(ParamKind::Str).required().description(
                    "The Login Banner you wish the Rubrik cluster to display prior to user login.",
                ),
            )
            .param("timeout", ParamSpec::timeout(15))
    }

    #[instrument(skip_all, name = "login_banner")]
    async fn run(
        &self,
        client: &dyn CdmClient,
        params: &Params,
    ) -> Result<TaskOutcome, ModuleError> {
        let banner_text = params.require_str("banner_text")?;
        let response = client
            .configure_login_banner(banner_text, params.timeout()?)
            .await
            .map_err(ModuleError::operation)?;
        Ok(TaskOutcome::from_response(response))
    }
}
