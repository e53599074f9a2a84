//! Layer sources and the Default < File < Environment merge.
//!
//! The default layer is the compiled-in `ServerConfig`, the file layer is
//! optional and located through the `config_file` key, and the environment is
//! consulted last for every leaf key the lower layers define.

mod env;
mod layer_io;
mod merge;
pub(crate) mod schema;

#[cfg(test)]
mod tests;

pub use env::{EnvSource, MapEnv, ProcessEnv};

use crate::{ServerConfig, Store};
use log::{debug, info};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Origin for a single config layer in the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigLayerSource {
    /// Compiled-in defaults (lowest precedence).
    Default,
    /// On-disk config file.
    File,
    /// Configuration supplied at runtime through `reload_or_override`.
    Override,
    /// Process environment (highest precedence).
    Environment,
}

/// Metadata about a config layer, including the reason it was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLayer {
    /// Layer origin.
    pub source: ConfigLayerSource,
    /// Location on disk if the layer is file backed.
    pub path: Option<PathBuf>,
    /// Reason the layer was skipped (missing or malformed file).
    pub disabled_reason: Option<String>,
}

/// Internal representation of a loaded config layer.
#[derive(Debug, Clone)]
pub(crate) struct LoadedLayer {
    pub(crate) meta: ConfigLayer,
    pub(crate) value: Value,
}

/// Everything beneath the environment: defaults, file and runtime overrides.
#[derive(Debug, Clone)]
pub(crate) struct BaseLayers {
    value: Value,
    layers: Vec<ConfigLayer>,
}

impl BaseLayers {
    /// Merge the default layer with the config file, if one can be read.
    ///
    /// `config_file` replaces the compiled-in path; `CONFIG_FILE` in the
    /// environment wins over both.
    pub(crate) fn load(config_file: Option<&Path>, env: &dyn EnvSource) -> Self {
        let defaults = default_layer(config_file);
        let path = resolve_config_file(&defaults.value, env);
        let (file_meta, file_value) = layer_io::load_file_layer(&path);
        if file_value.is_some() {
            info!("loaded config file (path={})", path.display());
        }

        let value =
            merge::merge_layers(std::iter::once(&defaults.value).chain(file_value.as_ref()));
        Self {
            value,
            layers: vec![defaults.meta, file_meta],
        }
    }

    /// Overlay a runtime configuration on top of the current base.
    pub(crate) fn with_override(&self, config: &ServerConfig) -> Self {
        let mut value = self.value.clone();
        merge::merge_values(&mut value, &config.to_value());
        let mut layers = self.layers.clone();
        layers.push(ConfigLayer {
            source: ConfigLayerSource::Override,
            path: None,
            disabled_reason: None,
        });
        Self { value, layers }
    }

    /// Apply the environment on top and produce the merged store.
    pub(crate) fn resolve(&self, env: &dyn EnvSource) -> Store {
        let env_layer = env::environment_layer(&self.value, env);
        let mut value = self.value.clone();
        merge::merge_values(&mut value, &env_layer.value);
        let mut layers = self.layers.clone();
        layers.push(env_layer.meta);
        debug!("merged config layers (layers={})", layers.len());
        Store::new(value, layers)
    }
}

/// The compiled-in defaults as a layer.
fn default_layer(config_file: Option<&Path>) -> LoadedLayer {
    let mut config = ServerConfig::default();
    if let Some(path) = config_file {
        config.config_file = path.display().to_string();
    }
    LoadedLayer {
        meta: ConfigLayer {
            source: ConfigLayerSource::Default,
            path: None,
            disabled_reason: None,
        },
        value: config.to_value(),
    }
}

/// Resolve the config file path from the defaults and `CONFIG_FILE`.
fn resolve_config_file(defaults: &Value, env: &dyn EnvSource) -> PathBuf {
    if let Some(path) = env.lookup(&env::env_key("config_file")) {
        return PathBuf::from(path);
    }
    let path = defaults
        .get("config_file")
        .and_then(Value::as_str)
        .unwrap_or(crate::DEFAULT_CONFIG_FILE);
    PathBuf::from(path)
}
