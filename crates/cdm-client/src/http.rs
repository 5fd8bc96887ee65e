//! HTTP client for the Rubrik cluster REST API

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, info, instrument};
use url::Url;

use cdm_api::requests::{AddHostRequest, LoginBannerRequest, SnapshotRequest};
use cdm_api::responses::{
    AsyncRequestStatus, FilesetSummary, HostSummary, ListResponse, LoginBanner, MssqlDbSummary,
    SlaDomain, VmSummary,
};
use cdm_api::{ConnectionConfig, ObjectType, OnDemandSnapshotRequest, Secret};

use crate::error::{ClientError, Result};
use crate::traits::{CdmClient, Connector, SnapshotResponse};

const LOGIN_BANNER_PATH: &str = "api/internal/cluster/me/login_banner";
const HOST_PATH: &str = "api/v1/host";
const HOST_BULK_PATH: &str = "api/internal/host/bulk";

/// How requests authenticate against the cluster
#[derive(Debug, Clone)]
enum Auth {
    Token(Secret),
    Basic { username: String, password: Secret },
}

impl Auth {
    fn from_config(config: &ConnectionConfig) -> Result<Self> {
        if let Some(token) = &config.api_token {
            return Ok(Auth::Token(token.clone()));
        }

        match (&config.username, &config.password) {
            (Some(username), Some(password)) => Ok(Auth::Basic {
                username: username.clone(),
                password: password.clone(),
            }),
            _ => Err(ClientError::Config(
                "an api_token or a username and password is required".to_string(),
            )),
        }
    }

    fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            Auth::Token(token) => request.bearer_auth(token.expose()),
            Auth::Basic { username, password } => {
                request.basic_auth(username, Some(password.expose()))
            }
        }
    }
}

/// Settings applied to every client opened by [`HttpConnector`]
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    /// Verify the cluster's TLS certificate
    ///
    /// Clusters ship with self-signed certificates, so this is off unless
    /// configured.
    pub verify_tls: bool,
}

/// HTTP client for a single Rubrik cluster
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: Url,
    auth: Auth,
}

impl HttpClient {
    /// Open a client for `https://<host>/`
    ///
    /// # Errors
    /// Returns an error if the host does not form a valid URL, the
    /// credentials are incomplete, or the TLS backend cannot be initialised.
    pub fn connect(config: &ConnectionConfig, options: &ClientOptions) -> Result<Self> {
        let base_url = format!("https://{}/", config.host);
        let client = Client::builder()
            .danger_accept_invalid_certs(!options.verify_tls)
            .user_agent(concat!("cdm-module/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ClientError::transport)?;
        Self::with_client(base_url, client, config)
    }

    /// Create a client for an explicit base URL
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid or the credentials are
    /// incomplete.
    ///
    /// # Example
    /// ```no_run
    /// use cdm_api::ConnectionConfig;
    /// use cdm_client::HttpClient;
    ///
    /// let config = ConnectionConfig::with_token("10.0.0.1", "api-token");
    /// let client = HttpClient::new("https://10.0.0.1", &config)?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn new(base_url: impl AsRef<str>, config: &ConnectionConfig) -> Result<Self> {
        Self::with_client(base_url, Client::new(), config)
    }

    /// Create a client with a custom `reqwest::Client`
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid or the credentials are
    /// incomplete.
    pub fn with_client(
        base_url: impl AsRef<str>,
        client: Client,
        config: &ConnectionConfig,
    ) -> Result<Self> {
        let base_url = Url::parse(base_url.as_ref())?;
        let auth = Auth::from_config(config)?;
        Ok(Self {
            client,
            base_url,
            auth,
        })
    }

    /// Build a full URL from a path and query pairs
    fn url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url> {
        let mut url = self.base_url.join(path)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// Send an authenticated request and fail on non-2xx statuses
    async fn execute(
        &self,
        method: Method,
        url: Url,
        body: Option<Value>,
        timeout: Duration,
    ) -> Result<Response> {
        debug!(%method, %url, "sending cluster request");

        let mut request = self
            .auth
            .apply(self.client.request(method, url))
            .timeout(timeout);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await.map_err(ClientError::transport)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            return Err(ClientError::Api {
                status,
                message: api_message(&text),
            });
        }

        Ok(response)
    }

    /// Read a response body as JSON, mapping an empty body to `null`
    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
        let bytes = response.bytes().await.map_err(ClientError::transport)?;
        if bytes.is_empty() {
            return Ok(serde_json::from_value(Value::Null)?);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        timeout: Duration,
    ) -> Result<T> {
        let url = self.url(path, query)?;
        let response = self.execute(Method::GET, url, None, timeout).await?;
        Self::read_json(response).await
    }

    async fn post(&self, path: &str, body: Value, timeout: Duration) -> Result<Value> {
        let url = self.url(path, &[])?;
        let response = self.execute(Method::POST, url, Some(body), timeout).await?;
        Self::read_json(response).await
    }

    async fn put(&self, path: &str, body: Value, timeout: Duration) -> Result<Value> {
        let url = self.url(path, &[])?;
        let response = self.execute(Method::PUT, url, Some(body), timeout).await?;
        Self::read_json(response).await
    }

    /// Perform a DELETE request and return the status code
    async fn delete(&self, path: &str, timeout: Duration) -> Result<u16> {
        let url = self.url(path, &[])?;
        let response = self.execute(Method::DELETE, url, None, timeout).await?;
        Ok(response.status().as_u16())
    }

    /// List objects and return the single one accepted by `matches`
    async fn find_one<T, F>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        kind: &str,
        name: &str,
        matches: F,
        timeout: Duration,
    ) -> Result<T>
    where
        T: DeserializeOwned + Send,
        F: Fn(&T) -> bool + Send + Sync,
    {
        let listing: ListResponse<T> = self.get(path, query, timeout).await?;
        let mut found: Vec<T> = listing.data.into_iter().filter(|item| matches(item)).collect();

        match found.len() {
            0 => Err(ClientError::Operation(format!(
                "The Rubrik cluster does not contain a {kind} named '{name}'."
            ))),
            1 => Ok(found.remove(0)),
            _ => Err(ClientError::Operation(format!(
                "Multiple {kind}s named '{name}' exist on the Rubrik cluster."
            ))),
        }
    }

    /// Id of the host registered under exactly `hostname`
    async fn host_id(&self, hostname: &str, timeout: Duration) -> Result<Option<String>> {
        let hosts: ListResponse<HostSummary> =
            self.get(HOST_PATH, &[("name", hostname)], timeout).await?;
        Ok(hosts
            .data
            .into_iter()
            .find(|host| host.hostname == hostname)
            .map(|host| host.id))
    }

    /// Resolve the SLA Domain id a snapshot should be assigned to
    async fn sla_id(
        &self,
        request: &OnDemandSnapshotRequest,
        effective: Option<String>,
        timeout: Duration,
    ) -> Result<String> {
        if request.uses_current_sla() {
            return effective.ok_or_else(|| {
                ClientError::Operation(format!(
                    "The {} '{}' does not have an SLA Domain assigned. Specify sla_name instead.",
                    request.object_type, request.object_name
                ))
            });
        }

        let sla_name = request.sla_name.as_str();
        let sla: SlaDomain = self
            .find_one(
                "api/v1/sla_domain",
                &[("primary_cluster_id", "local"), ("name", sla_name)],
                "SLA Domain",
                sla_name,
                |sla: &SlaDomain| sla.name == sla_name,
                timeout,
            )
            .await?;
        Ok(sla.id)
    }

    /// Trigger a snapshot and extract the job status link
    async fn snapshot(
        &self,
        path: &str,
        body: SnapshotRequest,
        timeout: Duration,
    ) -> Result<SnapshotResponse> {
        let response = self.post(path, serde_json::to_value(&body)?, timeout).await?;

        let status: AsyncRequestStatus = serde_json::from_value(response.clone())
            .map_err(|e| ClientError::InvalidResponse(format!("snapshot response: {e}")))?;
        let job_status_url = status
            .job_status_url()
            .ok_or_else(|| {
                ClientError::InvalidResponse(
                    "snapshot response did not include a job status link".to_string(),
                )
            })?
            .to_string();

        info!(job = %status.id, "on-demand snapshot queued");
        Ok(SnapshotResponse {
            response,
            job_status_url,
        })
    }

    async fn snapshot_vm(
        &self,
        request: &OnDemandSnapshotRequest,
        base_path: &str,
        kind: &str,
        timeout: Duration,
    ) -> Result<SnapshotResponse> {
        let name = request.object_name.as_str();
        let vm: VmSummary = self
            .find_one(
                base_path,
                &[
                    ("primary_cluster_id", "local"),
                    ("is_relic", "false"),
                    ("name", name),
                ],
                kind,
                name,
                |vm: &VmSummary| vm.name == name,
                timeout,
            )
            .await?;

        let sla_id = self.sla_id(request, vm.effective_sla_domain_id, timeout).await?;
        let path = format!("{base_path}/{}/snapshot", vm.id);
        self.snapshot(&path, SnapshotRequest::new(sla_id), timeout)
            .await
    }

    async fn snapshot_fileset(
        &self,
        request: &OnDemandSnapshotRequest,
        timeout: Duration,
    ) -> Result<SnapshotResponse> {
        let (Some(fileset_name), Some(host_os)) = (request.fileset.as_deref(), request.host_os)
        else {
            return Err(ClientError::Operation(
                "The fileset and host_os parameters are required when object_type is physical_host."
                    .to_string(),
            ));
        };

        let name = request.object_name.as_str();
        let host: HostSummary = self
            .find_one(
                HOST_PATH,
                &[
                    ("operating_system_type", host_os.as_str()),
                    ("primary_cluster_id", "local"),
                    ("name", name),
                ],
                "physical host",
                name,
                |host: &HostSummary| host.hostname == name,
                timeout,
            )
            .await?;

        let fileset: FilesetSummary = self
            .find_one(
                "api/v1/fileset",
                &[
                    ("primary_cluster_id", "local"),
                    ("host_id", host.id.as_str()),
                    ("is_relic", "false"),
                    ("name", fileset_name),
                ],
                "fileset",
                fileset_name,
                |fileset: &FilesetSummary| fileset.name == fileset_name,
                timeout,
            )
            .await?;

        let sla_id = self
            .sla_id(request, fileset.effective_sla_domain_id, timeout)
            .await?;
        let path = format!("api/v1/fileset/{}/snapshot", fileset.id);
        self.snapshot(&path, SnapshotRequest::new(sla_id), timeout)
            .await
    }

    async fn snapshot_mssql_db(
        &self,
        request: &OnDemandSnapshotRequest,
        timeout: Duration,
    ) -> Result<SnapshotResponse> {
        let (Some(sql_host), Some(sql_instance)) =
            (request.sql_host.as_deref(), request.sql_instance.as_deref())
        else {
            return Err(ClientError::Operation(
                "The sql_host and sql_instance parameters are required when object_type is mssql_db."
                    .to_string(),
            ));
        };

        let name = request.object_name.as_str();
        let db: MssqlDbSummary = self
            .find_one(
                "api/v1/mssql/db",
                &[
                    ("primary_cluster_id", "local"),
                    ("is_relic", "false"),
                    ("name", name),
                ],
                "MSSQL database",
                name,
                |db: &MssqlDbSummary| {
                    db.name == name
                        && db.instance_name.as_deref() == Some(sql_instance)
                        && db
                            .root_properties
                            .as_ref()
                            .is_some_and(|root| root.root_name == sql_host)
                },
                timeout,
            )
            .await?;

        let sla_id = self.sla_id(request, db.effective_sla_domain_id, timeout).await?;
        let path = format!("api/v1/mssql/db/{}/snapshot", db.id);
        self.snapshot(&path, SnapshotRequest::new(sla_id).force_full(false), timeout)
            .await
    }
}

#[async_trait]
impl CdmClient for HttpClient {
    #[instrument(skip(self, banner_text), level = "debug")]
    async fn configure_login_banner(&self, banner_text: &str, timeout: Duration) -> Result<Value> {
        let current: LoginBanner = self.get(LOGIN_BANNER_PATH, &[], timeout).await?;

        if current.login_banner.as_deref() == Some(banner_text) {
            return Ok(Value::String(format!(
                "No change required. The Rubrik cluster is already configured with '{banner_text}' as its banner."
            )));
        }

        let body = serde_json::to_value(LoginBannerRequest {
            login_banner: banner_text.to_string(),
        })?;
        self.put(LOGIN_BANNER_PATH, body, timeout).await
    }

    #[instrument(skip(self), level = "debug")]
    async fn add_physical_host(&self, hostnames: &[String], timeout: Duration) -> Result<Value> {
        if hostnames.is_empty() {
            return Err(ClientError::Operation(
                "At least one hostname is required.".to_string(),
            ));
        }

        let mut pending = Vec::new();
        for hostname in hostnames {
            if self.host_id(hostname, timeout).await?.is_some() {
                debug!(%hostname, "host already connected");
            } else {
                pending.push(AddHostRequest::new(hostname));
            }
        }

        match pending.as_slice() {
            [] if hostnames.len() == 1 => Ok(Value::String(format!(
                "No change required. The host '{}' is already connected to the Rubrik cluster.",
                hostnames[0]
            ))),
            [] => Ok(Value::String(
                "No change required. All hosts are already connected to the Rubrik cluster."
                    .to_string(),
            )),
            [single] => {
                self.post(HOST_PATH, serde_json::to_value(single)?, timeout)
                    .await
            }
            many => {
                self.post(HOST_BULK_PATH, serde_json::to_value(many)?, timeout)
                    .await
            }
        }
    }

    #[instrument(skip(self), level = "debug")]
    async fn delete_physical_host(&self, hostname: &str, timeout: Duration) -> Result<Value> {
        let Some(id) = self.host_id(hostname, timeout).await? else {
            return Ok(Value::String(format!(
                "No change required. The host '{hostname}' is not connected to the Rubrik cluster."
            )));
        };

        let status = self.delete(&format!("{HOST_PATH}/{id}"), timeout).await?;
        Ok(json!({ "status_code": status }))
    }

    #[instrument(skip(self), level = "debug")]
    async fn on_demand_snapshot(
        &self,
        request: &OnDemandSnapshotRequest,
        timeout: Duration,
    ) -> Result<SnapshotResponse> {
        match request.object_type {
            ObjectType::Vmware => {
                self.snapshot_vm(request, "api/v1/vmware/vm", "vSphere VM", timeout)
                    .await
            }
            ObjectType::Ahv => {
                self.snapshot_vm(request, "api/internal/nutanix/vm", "AHV VM", timeout)
                    .await
            }
            ObjectType::PhysicalHost => self.snapshot_fileset(request, timeout).await,
            ObjectType::MssqlDb => self.snapshot_mssql_db(request, timeout).await,
        }
    }

    fn client_type(&self) -> &'static str {
        "http"
    }
}

/// Pull the human readable message out of a cluster error body
fn api_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| value.get("message").and_then(Value::as_str).map(String::from))
        .unwrap_or_else(|| body.trim().to_string())
}

/// Opens [`HttpClient`] handles
#[derive(Debug, Clone, Default)]
pub struct HttpConnector {
    options: ClientOptions,
}

impl HttpConnector {
    #[must_use]
    pub fn new(options: ClientOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl Connector for HttpConnector {
    async fn connect(&self, config: &ConnectionConfig) -> Result<Arc<dyn CdmClient>> {
        let client = HttpClient::connect(config, &self.options)?;
        debug!(
            host = %config.host,
            token_auth = config.uses_token(),
            verify_tls = self.options.verify_tls,
            "opened cluster client"
        );
        Ok(Arc::new(client))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ConnectionConfig {
        ConnectionConfig::with_password("10.0.0.1", "admin", "secret")
    }

    #[test]
    fn test_client_creation() {
        let client = HttpClient::new("https://10.0.0.1", &config());
        assert!(client.is_ok());
    }

    #[test]
    fn test_invalid_url() {
        let client = HttpClient::new("not a url", &config());
        assert!(matches!(client, Err(ClientError::Url(_))));
    }

    #[test]
    fn test_incomplete_credentials() {
        let config = ConnectionConfig {
            host: "10.0.0.1".to_string(),
            username: Some("admin".to_string()),
            password: None,
            api_token: None,
        };
        let client = HttpClient::new("https://10.0.0.1", &config);
        assert!(matches!(client, Err(ClientError::Config(_))));
    }

    #[test]
    fn test_token_preferred_over_password() {
        let mut config = config();
        config.api_token = Some(Secret::new("tok"));
        let auth = Auth::from_config(&config).unwrap();
        assert!(matches!(auth, Auth::Token(_)));
    }

    #[test]
    fn test_url_building() {
        let client = HttpClient::new("https://10.0.0.1", &config()).unwrap();
        let url = client.url(HOST_PATH, &[]).unwrap();
        assert_eq!(url.as_str(), "https://10.0.0.1/api/v1/host");

        let url = client
            .url(HOST_PATH, &[("name", "db 01"), ("primary_cluster_id", "local")])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://10.0.0.1/api/v1/host?name=db+01&primary_cluster_id=local"
        );
    }

    #[test]
    fn test_connect_builds_https_url() {
        let client = HttpClient::connect(&config(), &ClientOptions::default()).unwrap();
        assert_eq!(client.base_url.as_str(), "https://10.0.0.1/");
    }

    #[test]
    fn test_api_message_extraction() {
        assert_eq!(
            api_message(r#"{"errorType":"user_error","message":"Not found","cause":null}"#),
            "Not found"
        );
        assert_eq!(api_message("  plain failure \n"), "plain failure");
    }
}
