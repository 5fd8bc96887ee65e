//! Request types for the cluster API

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Body of `PUT /internal/cluster/me/login_banner`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginBannerRequest {
    pub login_banner: String,
}

/// Body of `POST /v1/host` and one entry of `POST /internal/host/bulk`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddHostRequest {
    pub hostname: String,
    pub has_agent: bool,
}

impl AddHostRequest {
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            has_agent: true,
        }
    }
}

/// Body of the on-demand snapshot endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotRequest {
    pub sla_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub force_full_snapshot: Option<bool>,
}

impl SnapshotRequest {
    pub fn new(sla_id: impl Into<String>) -> Self {
        Self {
            sla_id: sla_id.into(),
            force_full_snapshot: None,
        }
    }

    #[must_use]
    pub fn force_full(mut self, force: bool) -> Self {
        self.force_full_snapshot = Some(force);
        self
    }
}

/// Kind of object an on-demand snapshot is taken of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectType {
    #[default]
    Vmware,
    PhysicalHost,
    Ahv,
    MssqlDb,
}

impl ObjectType {
    pub const ALL: [&'static str; 4] = ["vmware", "physical_host", "ahv", "mssql_db"];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ObjectType::Vmware => "vmware",
            ObjectType::PhysicalHost => "physical_host",
            ObjectType::Ahv => "ahv",
            ObjectType::MssqlDb => "mssql_db",
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vmware" => Ok(ObjectType::Vmware),
            "physical_host" => Ok(ObjectType::PhysicalHost),
            "ahv" => Ok(ObjectType::Ahv),
            "mssql_db" => Ok(ObjectType::MssqlDb),
            other => Err(format!("unknown object type: {other}")),
        }
    }
}

/// Operating system of a physical host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HostOs {
    Linux,
    Windows,
}

impl HostOs {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            HostOs::Linux => "Linux",
            HostOs::Windows => "Windows",
        }
    }
}

impl fmt::Display for HostOs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HostOs {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Linux" => Ok(HostOs::Linux),
            "Windows" => Ok(HostOs::Windows),
            other => Err(format!("unknown host os: {other}")),
        }
    }
}

/// Everything needed to locate an object and snapshot it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnDemandSnapshotRequest {
    /// Name of the VM, host, or database
    pub object_name: String,
    pub object_type: ObjectType,
    /// SLA Domain name, or `current` for the object's effective SLA
    pub sla_name: String,
    /// Fileset name (physical hosts only)
    pub fileset: Option<String>,
    /// Host operating system (physical hosts only)
    pub host_os: Option<HostOs>,
    /// SQL host of the database (MSSQL only)
    pub sql_host: Option<String>,
    /// SQL instance of the database (MSSQL only)
    pub sql_instance: Option<String>,
}

impl OnDemandSnapshotRequest {
    /// Snapshot request for `object_name` using the currently assigned SLA
    pub fn new(object_name: impl Into<String>, object_type: ObjectType) -> Self {
        Self {
            object_name: object_name.into(),
            object_type,
            sla_name: "current".to_string(),
            fileset: None,
            host_os: None,
            sql_host: None,
            sql_instance: None,
        }
    }

    /// Whether the object's effective SLA Domain should be used
    #[must_use]
    pub fn uses_current_sla(&self) -> bool {
        self.sla_name == "current"
    }
}
