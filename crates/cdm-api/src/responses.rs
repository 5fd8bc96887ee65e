//! Response types for the cluster API
//!
//! Only the fields the task modules read are modelled; everything else in
//! a response is passed through untouched as `serde_json::Value`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Envelope of the paginated `v1` list endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub total: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginBanner {
    /// `None` when no banner is configured
    #[serde(default)]
    pub login_banner: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostSummary {
    pub id: String,
    pub hostname: String,
    #[serde(default)]
    pub operating_system_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlaDomain {
    pub id: String,
    pub name: String,
}

/// A vSphere or AHV virtual machine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VmSummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub effective_sla_domain_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilesetSummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub effective_sla_domain_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MssqlDbSummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub instance_name: Option<String>,
    #[serde(default)]
    pub root_properties: Option<RootProperties>,
    #[serde(default)]
    pub effective_sla_domain_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RootProperties {
    pub root_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
    pub rel: String,
}

/// Async job created by an on-demand snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AsyncRequestStatus {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub links: Vec<Link>,
}

impl AsyncRequestStatus {
    /// URL that can be polled for the job's progress
    ///
    /// Prefers the `self` link and falls back to the first one.
    #[must_use]
    pub fn job_status_url(&self) -> Option<&str> {
        self.links
            .iter()
            .find(|link| link.rel == "self")
            .or_else(|| self.links.first())
            .map(|link| link.href.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_banner_null_or_missing() {
        let banner: LoginBanner = serde_json::from_str(r#"{"loginBanner": null}"#).unwrap();
        assert_eq!(banner.login_banner, None);

        let banner: LoginBanner = serde_json::from_str("{}").unwrap();
        assert_eq!(banner.login_banner, None);

        let banner: LoginBanner = serde_json::from_str(r#"{"loginBanner": "Welcome"}"#).unwrap();
        assert_eq!(banner.login_banner.as_deref(), Some("Welcome"));
    }

    #[test]
    fn test_job_status_url_prefers_self() {
        let status: AsyncRequestStatus = serde_json::from_value(serde_json::json!({
            "id": "CREATE_VMWARE_SNAPSHOT_1",
            "status": "QUEUED",
            "startTime": "2018-10-16T03:48:59.118Z",
            "links": [
                {"href": "https://cluster/api/v1/other", "rel": "related"},
                {"href": "https://cluster/api/v1/vmware/vm/request/1", "rel": "self"}
            ]
        }))
        .unwrap();

        assert_eq!(
            status.job_status_url(),
            Some("https://cluster/api/v1/vmware/vm/request/1")
        );
        assert!(status.start_time.is_some());
    }

    #[test]
    fn test_job_status_url_missing() {
        let status: AsyncRequestStatus =
            serde_json::from_value(serde_json::json!({"id": "x", "status": "QUEUED"})).unwrap();
        assert_eq!(status.job_status_url(), None);
    }

    #[test]
    fn test_list_response_defaults() {
        let hosts: ListResponse<HostSummary> = serde_json::from_value(serde_json::json!({
            "data": [{"id": "Host:::1", "hostname": "db01"}]
        }))
        .unwrap();
        assert_eq!(hosts.data.len(), 1);
        assert!(!hosts.has_more);
    }
}
