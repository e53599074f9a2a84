//! Environment layer: `jwt.secret` is overridden by `JWT_SECRET`.

use super::{ConfigLayer, ConfigLayerSource, LoadedLayer};
use log::{debug, warn};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Read access to environment variables.
pub trait EnvSource: Send + Sync {
    /// Look up a variable, ignoring ASCII case. Present-but-empty is `Some("")`.
    fn lookup(&self, name: &str) -> Option<String>;
}

/// The process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    /// Non-unicode names are skipped and non-unicode values count as absent.
    fn lookup(&self, name: &str) -> Option<String> {
        let value = std::env::var_os(name).or_else(|| {
            std::env::vars_os()
                .find(|(key, _)| key.to_str().is_some_and(|key| key.eq_ignore_ascii_case(name)))
                .map(|(_, value)| value)
        })?;
        match value.into_string() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("ignoring non-unicode environment variable (var={name})");
                None
            }
        }
    }
}

/// A fixed set of variables, for embedders and tests.
#[derive(Debug, Clone, Default)]
pub struct MapEnv {
    vars: HashMap<String, String>,
}

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapEnv {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

impl EnvSource for MapEnv {
    fn lookup(&self, name: &str) -> Option<String> {
        if let Some(value) = self.vars.get(name) {
            return Some(value.clone());
        }
        self.vars
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.clone())
    }
}

/// Variable name for a dotted config key.
pub(super) fn env_key(path: &str) -> String {
    path.replace('.', "_").to_ascii_uppercase()
}

/// Build the environment layer for every leaf key present in `base`.
pub(super) fn environment_layer(base: &Value, env: &dyn EnvSource) -> LoadedLayer {
    let mut leaves = Vec::new();
    collect_leaves(base, "", &mut leaves);

    let mut overlay = Map::new();
    for (path, current) in leaves {
        let name = env_key(&path);
        let Some(raw) = env.lookup(&name) else {
            continue;
        };
        debug!("environment override (key={path}, var={name})");
        let segments: Vec<&str> = path.split('.').collect();
        insert_path(&mut overlay, &segments, coerce(&raw, current));
    }

    LoadedLayer {
        meta: ConfigLayer {
            source: ConfigLayerSource::Environment,
            path: None,
            disabled_reason: None,
        },
        value: Value::Object(overlay),
    }
}

/// Collect dotted paths of every non-object value. Arrays are leaves.
fn collect_leaves<'a>(value: &'a Value, prefix: &str, out: &mut Vec<(String, &'a Value)>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                collect_leaves(child, &path, out);
            }
        }
        leaf => out.push((prefix.to_string(), leaf)),
    }
}

fn insert_path(map: &mut Map<String, Value>, segments: &[&str], value: Value) {
    match segments {
        [] => {}
        [last] => {
            map.insert(last.to_string(), value);
        }
        [head, rest @ ..] => {
            let child = map
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !child.is_object() {
                *child = Value::Object(Map::new());
            }
            if let Value::Object(child) = child {
                insert_path(child, rest, value);
            }
        }
    }
}

/// Coerce a raw variable to the JSON type of the value it replaces.
///
/// Values that do not parse stay strings so decoding reports the mismatch.
pub(super) fn coerce(raw: &str, current: &Value) -> Value {
    match current {
        Value::Bool(_) => parse_bool(raw)
            .map(Value::Bool)
            .unwrap_or_else(|| Value::String(raw.to_string())),
        Value::Number(_) => parse_number(raw).unwrap_or_else(|| Value::String(raw.to_string())),
        Value::Array(_) => parse_list(raw).unwrap_or_else(|| Value::String(raw.to_string())),
        _ => Value::String(raw.to_string()),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "" | "0" | "f" | "false" | "no" => Some(false),
        "1" | "t" | "true" | "yes" => Some(true),
        _ => None,
    }
}

fn parse_number(raw: &str) -> Option<Value> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Some(Value::from(0));
    }
    if let Ok(value) = raw.parse::<u64>() {
        return Some(Value::from(value));
    }
    raw.parse::<i64>().ok().map(Value::from)
}

fn parse_list(raw: &str) -> Option<Value> {
    let raw = raw.trim();
    if raw.starts_with('[') {
        return match serde_json::from_str::<Value>(raw) {
            Ok(value @ Value::Array(_)) => Some(value),
            _ => None,
        };
    }
    let items = raw
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|item| !item.is_empty())
        .map(|item| Value::String(item.to_string()))
        .collect();
    Some(Value::Array(items))
}
