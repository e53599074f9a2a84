//! Layered configuration and per-stream policy lookup.
//!
//! This crate owns the livehub config schema, the Default < File < Environment
//! merge, and the application policy queries consulted on every inbound
//! stream connection.

mod error;
mod loader;
pub mod logging;
mod model;
mod policy;
mod service;
mod store;

/// Public error type returned by config loading and decoding APIs.
pub use error::ConfigError;
/// Layer sources and environment access.
pub use loader::{ConfigLayer, ConfigLayerSource, EnvSource, MapEnv, ProcessEnv};
/// Configuration schema models.
pub use model::*;
/// First-match policy helpers over an application list.
pub use policy::{check_app_name, find_application, static_push_urls};
/// Configuration service handle shared by stream handlers.
pub use service::{ConfigService, ConfigServiceBuilder};
/// Merged key/value store.
pub use store::Store;
