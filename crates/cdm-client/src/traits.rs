//! Cluster client traits

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use cdm_api::{ConnectionConfig, OnDemandSnapshotRequest};
use serde_json::Value;

use crate::error::Result;

/// Result of an on-demand snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotResponse {
    /// Full API response of the snapshot request
    pub response: Value,
    /// URL that can be polled for the snapshot job status
    pub job_status_url: String,
}

/// Operations the task modules perform against a cluster
///
/// Responses are opaque JSON. Idempotent no-ops come back as a JSON string
/// starting with "No change required".
#[async_trait]
pub trait CdmClient: Send + Sync {
    /// Set the text shown before login
    async fn configure_login_banner(&self, banner_text: &str, timeout: Duration) -> Result<Value>;

    /// Register one or more physical hosts
    async fn add_physical_host(&self, hostnames: &[String], timeout: Duration) -> Result<Value>;

    /// Remove a physical host
    async fn delete_physical_host(&self, hostname: &str, timeout: Duration) -> Result<Value>;

    /// Take an on-demand snapshot of a VM, fileset, or database
    async fn on_demand_snapshot(
        &self,
        request: &OnDemandSnapshotRequest,
        timeout: Duration,
    ) -> Result<SnapshotResponse>;

    /// Short name of the client implementation
    fn client_type(&self) -> &'static str;
}

/// Opens client handles from resolved connection settings
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, config: &ConnectionConfig) -> Result<Arc<dyn CdmClient>>;
}
