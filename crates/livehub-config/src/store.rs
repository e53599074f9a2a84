//! The merged key/value store addressed by dotted paths.

use crate::loader::{ConfigLayer, schema};
use crate::{Application, ConfigError, ServerConfig};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Label used in decode errors for the merged tree.
const STORE_LABEL: &str = "effective";

/// Result of one Default < File < Environment merge.
///
/// A store is immutable; reconfiguration builds a new one. Typed views are
/// decoded from it on every call rather than cached.
#[derive(Debug, Clone, PartialEq)]
pub struct Store {
    values: Value,
    layers: Vec<ConfigLayer>,
}

impl Store {
    pub(crate) fn new(values: Value, layers: Vec<ConfigLayer>) -> Self {
        Self { values, layers }
    }

    /// The raw merged tree.
    pub fn as_value(&self) -> &Value {
        &self.values
    }

    /// Layers that took part in the merge, lowest precedence first.
    pub fn layers(&self) -> &[ConfigLayer] {
        &self.layers
    }

    /// Look up a dotted key such as `jwt.secret`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        key.split('.')
            .try_fold(&self.values, |value, segment| value.get(segment))
    }

    /// Decode the value at a dotted key.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<T, ConfigError> {
        let value = self
            .get(key)
            .ok_or_else(|| ConfigError::MissingKey(key.to_string()))?;
        schema::validate_key(value, STORE_LABEL, key)?;
        Ok(serde_json::from_value(value.clone())?)
    }

    /// Project the store into the typed configuration.
    pub fn decode(&self) -> Result<ServerConfig, ConfigError> {
        schema::validate_store(&self.values, STORE_LABEL)?;
        Ok(serde_json::from_value(self.values.clone())?)
    }

    /// Decode the application list.
    pub fn applications(&self) -> Result<Vec<Application>, ConfigError> {
        self.get_as("server")
    }
}
