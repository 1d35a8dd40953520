//! The provider interface every transcoding backend implements, and the error
//! type shared by all of them.

use async_trait::async_trait;

use crate::conductor::client::ClientError;

use super::models::{JobStatus, Preset};

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Required configuration is missing; the provider cannot be built.
    #[error(
        "missing Elemental Conductor configuration: {}. Please define these environment variables or set the values in the configuration file",
        .missing.join(", ")
    )]
    InvalidConfig { missing: Vec<&'static str> },

    /// A preset has no mapping for the selected backend.
    #[error("preset not found: {preset} has no mapping for this provider")]
    PresetNotFound { preset: String },

    /// Network or backend failure, passed through unchanged.
    #[error(transparent)]
    Transport(#[from] ClientError),

    #[error(
        "there are not enough active nodes. {required} nodes required to be active, but found only {active}"
    )]
    Capacity { required: usize, active: usize },

    #[error("provider not found: {0}")]
    ProviderNotFound(String),

    #[error("provider already registered: {0}")]
    AlreadyRegistered(String),

    #[error("provider name must not be empty")]
    InvalidName,
}

/// A remote transcoding backend.
///
/// Implementations translate the generic job/preset model into their own
/// request format and normalize job status back into [`JobStatus`]. Each call
/// is a single round-trip: no retry, polling or caching.
#[async_trait]
pub trait TranscodingProvider: Send + Sync {
    /// Submit a job transcoding `source` with every preset in `presets`.
    async fn transcode(&self, source: &str, presets: &[Preset]) -> Result<JobStatus, ProviderError>;

    /// Fetch and normalize the status of a previously submitted job.
    async fn job_status(&self, id: &str) -> Result<JobStatus, ProviderError>;

    /// Check the backend can accept work right now.
    async fn healthcheck(&self) -> Result<(), ProviderError>;
}
