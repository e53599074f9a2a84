//! IO helpers for reading the config file layer from disk.

use super::{ConfigLayer, ConfigLayerSource, LoadedLayer};
use crate::ConfigError;
use log::{debug, warn};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Load the file layer, degrading to a disabled layer on any failure.
///
/// A missing or malformed file never aborts a load; the returned metadata
/// records why the layer was skipped and the value is `None`.
pub(super) fn load_file_layer(path: &Path) -> (ConfigLayer, Option<Value>) {
    if !path.exists() {
        debug!("config file missing (path={})", path.display());
        return (
            disabled_layer(path, "file not found".to_string()),
            None,
        );
    }

    match load_required_layer(path) {
        Ok(layer) => (layer.meta, Some(layer.value)),
        Err(err) => {
            warn!(
                "ignoring config file (path={}, reason={err})",
                path.display()
            );
            (disabled_layer(path, err.to_string()), None)
        }
    }
}

/// Load and parse the file layer, surfacing any failure.
pub(super) fn load_required_layer(path: &Path) -> Result<LoadedLayer, ConfigError> {
    debug!("loading config layer (path={})", path.display());
    let contents = fs::read_to_string(path)?;
    let value = parse_contents(path, &contents)?;
    if !value.is_object() {
        return Err(ConfigError::Invalid(format!(
            "{}: expected an object at the document root",
            path.display()
        )));
    }
    Ok(LoadedLayer {
        meta: ConfigLayer {
            source: ConfigLayerSource::File,
            path: Some(path.to_path_buf()),
            disabled_reason: None,
        },
        value,
    })
}

/// Parse by extension: YAML for `.yaml`/`.yml`, JSON5 (a JSON superset) otherwise.
fn parse_contents(path: &Path, contents: &str) -> Result<Value, ConfigError> {
    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));
    if is_yaml {
        Ok(serde_yaml::from_str(contents)?)
    } else {
        Ok(json5::from_str(contents)?)
    }
}

fn disabled_layer(path: &Path, reason: String) -> ConfigLayer {
    ConfigLayer {
        source: ConfigLayerSource::File,
        path: Some(path.to_path_buf()),
        disabled_reason: Some(reason),
    }
}
