//! Transport to an Elemental Conductor cluster.
//!
//! [`ConductorApi`] is the seam the provider talks through. [`HttpConductor`]
//! speaks the REST/XML API; the simulated backend lives in
//! [`super::simulated`].

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use md5::{Digest, Md5};
use reqwest::{Method, header};
use tracing::debug;

use super::api::{CloudConfig, Job, JobResponse, Node, NodeList};

const XML_CONTENT_TYPE: &str = "application/xml";

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request to Elemental Conductor failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Elemental Conductor returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    // Same error type as Decode, so no blanket From.
    #[error("failed to encode job: {0}")]
    Encode(quick_xml::DeError),

    #[error("failed to decode response: {0}")]
    Decode(#[from] quick_xml::DeError),

    #[error("response did not include a job id")]
    MissingJobId,
}

/// Operations the provider needs from the backend. Each is one round-trip
/// with no retry.
#[async_trait]
pub trait ConductorApi: Send + Sync {
    /// Submit `job` and return the backend's job id.
    async fn submit_job(&self, job: &Job) -> Result<String, ClientError>;

    async fn query_job(&self, id: &str) -> Result<JobResponse, ClientError>;

    async fn list_nodes(&self) -> Result<Vec<Node>, ClientError>;

    async fn cloud_config(&self) -> Result<CloudConfig, ClientError>;
}

pub struct HttpConductor {
    client: reqwest::Client,
    host: String,
    user_login: String,
    api_key: String,
    auth_expires: Duration,
}

impl HttpConductor {
    pub fn new(
        host: impl Into<String>,
        user_login: impl Into<String>,
        api_key: impl Into<String>,
        auth_expires: Duration,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            host: host.into().trim_end_matches('/').to_string(),
            user_login: user_login.into(),
            api_key: api_key.into(),
            auth_expires,
        }
    }

    /// Sign `path` (without the `/api` prefix) for the given expiry timestamp.
    ///
    /// `md5(api_key + md5(path + login + api_key + expires))`, hex encoded.
    pub fn auth_key(&self, path: &str, expires: i64) -> String {
        let expires = expires.to_string();
        let mut inner = Md5::new();
        inner.update(path.as_bytes());
        inner.update(self.user_login.as_bytes());
        inner.update(self.api_key.as_bytes());
        inner.update(expires.as_bytes());
        let inner_key = hex::encode(inner.finalize());

        let mut outer = Md5::new();
        outer.update(self.api_key.as_bytes());
        outer.update(inner_key.as_bytes());
        hex::encode(outer.finalize())
    }

    /// Expiry timestamp for a request signed at `now`. Saturates rather than
    /// wrapping when the configured lifetime is absurdly large.
    pub fn expires_at(&self, now: i64) -> i64 {
        let lifetime = i64::try_from(self.auth_expires.as_secs()).unwrap_or(i64::MAX);
        now.saturating_add(lifetime)
    }

    async fn send(&self, method: Method, path: &str, body: Option<String>) -> Result<String, ClientError> {
        let url = format!("{}/api{}", self.host, path);
        let expires = self.expires_at(Utc::now().timestamp());

        debug!(%method, %url, "Calling Elemental Conductor");

        let mut request = self
            .client
            .request(method, &url)
            .header(header::ACCEPT, XML_CONTENT_TYPE)
            .header("X-Auth-User", &self.user_login)
            .header("X-Auth-Expires", expires.to_string())
            .header("X-Auth-Key", self.auth_key(path, expires));

        if let Some(body) = body {
            request = request
                .header(header::CONTENT_TYPE, XML_CONTENT_TYPE)
                .body(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(text)
    }
}

#[async_trait]
impl ConductorApi for HttpConductor {
    async fn submit_job(&self, job: &Job) -> Result<String, ClientError> {
        let body = job.to_xml().map_err(ClientError::Encode)?;
        let text = self.send(Method::POST, "/jobs", Some(body)).await?;
        let response = JobResponse::from_xml(&text)?;
        response
            .id()
            .map(str::to_string)
            .ok_or(ClientError::MissingJobId)
    }

    async fn query_job(&self, id: &str) -> Result<JobResponse, ClientError> {
        let text = self.send(Method::GET, &format!("/jobs/{id}"), None).await?;
        Ok(JobResponse::from_xml(&text)?)
    }

    async fn list_nodes(&self) -> Result<Vec<Node>, ClientError> {
        let text = self.send(Method::GET, "/nodes", None).await?;
        let list: NodeList = quick_xml::de::from_str(&text)?;
        Ok(list.nodes)
    }

    async fn cloud_config(&self) -> Result<CloudConfig, ClientError> {
        let text = self.send(Method::GET, "/config/cloud", None).await?;
        Ok(quick_xml::de::from_str(&text)?)
    }
}
