//! Elemental Conductor provider.
//!
//! Translates generic transcode requests into Conductor job documents and
//! Conductor job state back into [`JobStatus`]. Build one through the
//! [`ProviderRegistry`](crate::core::ProviderRegistry) under [`NAME`], or
//! directly with [`ElementalConductorProvider::new`] for a custom transport.

pub mod api;
pub mod client;
pub mod healthcheck;
pub mod job;
pub mod mapper;
pub mod simulated;
pub mod status;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Map;
use tracing::{debug, info};

use crate::config::{AppConfig, ConductorConfig};
use crate::core::{JobStatus, Preset, ProviderError, Status, TranscodingProvider};

pub use client::{ClientError, ConductorApi, HttpConductor};
pub use job::Credentials;
pub use simulated::SimulatedConductor;

/// Registry name, and the key presets use in their provider mapping.
pub const NAME: &str = "elementalconductor";

pub struct ElementalConductorProvider {
    client: Arc<dyn ConductorApi>,
    credentials: Credentials,
    destination: String,
}

impl ElementalConductorProvider {
    /// Build a provider over `client`. Fails if `config` is incomplete.
    pub fn new(config: &ConductorConfig, client: Arc<dyn ConductorApi>) -> Result<Self, ProviderError> {
        config.validate()?;
        Ok(Self {
            client,
            credentials: Credentials {
                access_key_id: config.access_key_id.clone(),
                secret_access_key: config.secret_access_key.clone(),
            },
            destination: config.destination.clone(),
        })
    }
}

/// Registry constructor. Uses the in-memory backend when `simulation` is set.
pub fn factory(config: &AppConfig) -> Result<Box<dyn TranscodingProvider>, ProviderError> {
    let settings = &config.elementalconductor;
    let client: Arc<dyn ConductorApi> = if config.simulation {
        Arc::new(SimulatedConductor::default())
    } else {
        Arc::new(HttpConductor::new(
            settings.host.clone(),
            settings.user_login.clone(),
            settings.api_key.clone(),
            Duration::from_secs(settings.auth_expires),
        ))
    };

    Ok(Box::new(ElementalConductorProvider::new(settings, client)?))
}

#[async_trait]
impl TranscodingProvider for ElementalConductorProvider {
    async fn transcode(&self, source: &str, presets: &[Preset]) -> Result<JobStatus, ProviderError> {
        let job = job::build_job(source, presets, &self.credentials, &self.destination)?;
        debug!(
            source,
            presets = presets.len(),
            group = job.output_group.kind.as_str(),
            "Submitting job"
        );

        let id = self.client.submit_job(&job).await?;
        info!(job_id = %id, source, "Job submitted");

        Ok(JobStatus {
            provider_name: NAME.to_string(),
            provider_job_id: id,
            status: Status::Queued,
            provider_status: Map::new(),
        })
    }

    async fn job_status(&self, id: &str) -> Result<JobStatus, ProviderError> {
        let response = self.client.query_job(id).await?;
        let status = status::translate_status(id, &response);
        debug!(job_id = %id, native = %response.status, status = %status.status, "Job status");
        Ok(status)
    }

    async fn healthcheck(&self) -> Result<(), ProviderError> {
        let nodes = self.client.list_nodes().await?;
        let cloud_config = self.client.cloud_config().await?;
        healthcheck::check_capacity(&nodes, &cloud_config)?;
        debug!(nodes = nodes.len(), min_nodes = cloud_config.min_nodes, "Healthcheck passed");
        Ok(())
    }
}
