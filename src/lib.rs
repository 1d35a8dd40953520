pub mod conductor;
pub mod config;
pub mod core;
pub mod logging;
