use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A named encoding configuration, with one backend-specific preset id per
/// provider it can run on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    #[serde(default, rename = "output")]
    pub output_opts: OutputOptions,
    #[serde(default, rename = "providerMapping")]
    pub provider_mapping: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputOptions {
    #[serde(default)]
    pub extension: String,
}

impl Preset {
    pub fn new(name: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            output_opts: OutputOptions {
                extension: extension.into(),
            },
            provider_mapping: HashMap::new(),
        }
    }

    /// Add a backend preset id for `provider`.
    pub fn with_mapping(mut self, provider: impl Into<String>, preset_id: impl Into<String>) -> Self {
        self.provider_mapping.insert(provider.into(), preset_id.into());
        self
    }

    pub fn preset_id_for(&self, provider: &str) -> Option<&str> {
        self.provider_mapping.get(provider).map(String::as_str)
    }
}

/// Canonical, backend-agnostic job status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Queued,
    Started,
    Finished,
    Canceled,
    Failed,
    Unknown,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Started => "started",
            Self::Finished => "finished",
            Self::Canceled => "canceled",
            Self::Failed => "failed",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatus {
    pub provider_name: String,
    pub provider_job_id: String,
    pub status: Status,
    /// Backend diagnostics passed through as-is. Keys vary by provider.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub provider_status: Map<String, Value>,
}
