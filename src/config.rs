//! Application configuration.
//!
//! Values are layered with figment: built-in defaults, then the TOML file,
//! then `ELEMENTALCONDUCTOR_*` environment variables, then CLI overrides.

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::core::ProviderError;

pub const ENV_PREFIX: &str = "ELEMENTALCONDUCTOR_";
pub const DEFAULT_CONFIG_PATH: &str = "broker.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Talk to the in-memory backend instead of a real Conductor cluster.
    #[serde(default)]
    pub simulation: bool,
    #[serde(default)]
    pub verbose: bool,
    #[serde(default)]
    pub json_logs: bool,
    #[serde(default)]
    pub elementalconductor: ConductorConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConductorConfig {
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub user_login: String,
    #[serde(default)]
    pub api_key: String,
    /// Lifetime of a signed request, in seconds.
    #[serde(default)]
    pub auth_expires: u64,
    #[serde(default)]
    pub access_key_id: String,
    #[serde(default)]
    pub secret_access_key: String,
    /// Root URI that job outputs are written under.
    #[serde(default)]
    pub destination: String,
}

impl AppConfig {
    /// Load configuration from `path` (if it exists) and the environment,
    /// with `overrides` applied last. `None` fields in `overrides` should be
    /// skipped during serialization so they don't mask lower layers.
    pub fn load<T: Serialize>(path: &Path, overrides: Option<&T>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).map(|key| format!("elementalconductor.{}", key.as_str()).into()));

        if let Some(overrides) = overrides {
            figment = figment.merge(Serialized::defaults(overrides));
        }

        figment.extract()
    }
}

impl ConductorConfig {
    /// Every required setting must be present before a provider is built.
    pub fn validate(&self) -> Result<(), ProviderError> {
        let checks = [
            (self.host.is_empty(), "ELEMENTALCONDUCTOR_HOST"),
            (self.user_login.is_empty(), "ELEMENTALCONDUCTOR_USER_LOGIN"),
            (self.api_key.is_empty(), "ELEMENTALCONDUCTOR_API_KEY"),
            (self.auth_expires == 0, "ELEMENTALCONDUCTOR_AUTH_EXPIRES"),
            (self.access_key_id.is_empty(), "ELEMENTALCONDUCTOR_ACCESS_KEY_ID"),
            (self.secret_access_key.is_empty(), "ELEMENTALCONDUCTOR_SECRET_ACCESS_KEY"),
            (self.destination.is_empty(), "ELEMENTALCONDUCTOR_DESTINATION"),
        ];

        let missing: Vec<&'static str> = checks
            .into_iter()
            .filter_map(|(is_missing, key)| is_missing.then_some(key))
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ProviderError::InvalidConfig { missing })
        }
    }
}
