pub mod models;
pub mod provider;
pub mod registry;

pub use models::{JobStatus, OutputOptions, Preset, Status};
pub use provider::{ProviderError, TranscodingProvider};
pub use registry::{ProviderFactory, ProviderRegistry};
