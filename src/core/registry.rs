//! Registry of transcoding provider factories.
//!
//! Each backend registers a constructor under its name. Callers pick a backend
//! by name and the factory validates the configuration before handing back a
//! ready provider.

use std::collections::BTreeMap;

use crate::conductor;
use crate::config::AppConfig;

use super::provider::{ProviderError, TranscodingProvider};

/// Builds a provider from application config, failing with
/// [`ProviderError::InvalidConfig`] when required settings are missing.
pub type ProviderFactory = fn(&AppConfig) -> Result<Box<dyn TranscodingProvider>, ProviderError>;

pub struct ProviderRegistry {
    factories: BTreeMap<&'static str, ProviderFactory>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// A registry with every built-in provider registered.
    pub fn with_defaults() -> Result<Self, ProviderError> {
        let mut registry = Self::new();
        registry.register(conductor::NAME, conductor::factory)?;
        Ok(registry)
    }

    pub fn register(&mut self, name: &'static str, factory: ProviderFactory) -> Result<(), ProviderError> {
        if name.is_empty() {
            return Err(ProviderError::InvalidName);
        }
        if self.factories.contains_key(name) {
            return Err(ProviderError::AlreadyRegistered(name.to_string()));
        }
        self.factories.insert(name, factory);
        Ok(())
    }

    pub fn factory(&self, name: &str) -> Result<ProviderFactory, ProviderError> {
        self.factories
            .get(name)
            .copied()
            .ok_or_else(|| ProviderError::ProviderNotFound(name.to_string()))
    }

    pub fn build(&self, name: &str, config: &AppConfig) -> Result<Box<dyn TranscodingProvider>, ProviderError> {
        let factory = self.factory(name)?;
        factory(config)
    }

    /// Names of registered providers that can be built from `config`, sorted.
    pub fn available(&self, config: &AppConfig) -> Vec<&'static str> {
        self.factories
            .iter()
            .filter(|(_, factory)| factory(config).is_ok())
            .map(|(name, _)| *name)
            .collect()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.factories.keys().copied().collect()
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
