//! Type checks for the merged store ahead of serde decoding.
//!
//! serde reports a mismatch without saying where it happened; walking the
//! known keys first lets the error name the dotted path. Unknown keys are
//! tolerated since files may carry settings for other components.

use crate::ConfigError;
use serde_json::Value;

const STRING_KEYS: &[&str] = &[
    "level",
    "config_file",
    "flv_dir",
    "rtmp_addr",
    "httpflv_addr",
    "hls_addr",
    "api_addr",
    "redis_addr",
    "redis_pwd",
];
const BOOL_KEYS: &[&str] = &["flv_archive", "rtmp_noauth", "hls_keep_after_end"];
const UNSIGNED_KEYS: &[&str] = &["read_timeout", "write_timeout", "gop_num"];

/// JSON shape expected at a key.
#[derive(Debug, Clone, Copy)]
enum Kind {
    Object,
    Array,
    String,
    Bool,
    Unsigned,
}

impl Kind {
    fn accepts(self, value: &Value) -> bool {
        match self {
            Kind::Object => value.is_object(),
            Kind::Array => value.is_array(),
            Kind::String => value.is_string(),
            Kind::Bool => value.is_boolean(),
            Kind::Unsigned => value.is_u64(),
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Kind::Object => "expected object",
            Kind::Array => "expected array",
            Kind::String => "expected string",
            Kind::Bool => "expected bool",
            Kind::Unsigned => "expected unsigned integer",
        }
    }
}

/// Where a value sits, for error messages: `effective:server[1].live`.
#[derive(Debug, Clone, Copy)]
struct Location<'a> {
    label: &'a str,
    path: &'a str,
}

impl Location<'_> {
    fn check(self, value: &Value, kind: Kind) -> Result<(), ConfigError> {
        if kind.accepts(value) {
            return Ok(());
        }
        let path = if self.path.is_empty() { "root" } else { self.path };
        Err(ConfigError::InvalidField {
            path: format!("{}:{path}", self.label),
            message: kind.describe().to_string(),
        })
    }

    fn child(self, key: &str) -> String {
        if self.path.is_empty() {
            key.to_string()
        } else {
            format!("{}.{key}", self.path)
        }
    }
}

/// Validate the whole store tree.
pub(crate) fn validate_store(value: &Value, label: &str) -> Result<(), ConfigError> {
    Location { label, path: "" }.check(value, Kind::Object)?;
    if let Value::Object(map) = value {
        for (key, value) in map {
            validate_key(value, label, key)?;
        }
    }
    Ok(())
}

/// Validate the value found at a dotted key. Unknown keys pass.
pub(crate) fn validate_key(value: &Value, label: &str, path: &str) -> Result<(), ConfigError> {
    let at = Location { label, path };
    match path {
        key if STRING_KEYS.contains(&key) => at.check(value, Kind::String),
        key if BOOL_KEYS.contains(&key) => at.check(value, Kind::Bool),
        key if UNSIGNED_KEYS.contains(&key) => at.check(value, Kind::Unsigned),
        "jwt.secret" | "jwt.algorithm" => at.check(value, Kind::String),
        "jwt" => validate_fields(value, at, JWT_FIELDS),
        "server" => {
            at.check(value, Kind::Array)?;
            for (idx, entry) in value.as_array().into_iter().flatten().enumerate() {
                let path = format!("{path}[{idx}]");
                validate_application(entry, Location { label, path: &path })?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

const JWT_FIELDS: &[(&str, Kind)] = &[("secret", Kind::String), ("algorithm", Kind::String)];

const APPLICATION_FIELDS: &[(&str, Kind)] = &[
    ("appname", Kind::String),
    ("live", Kind::Bool),
    ("hls", Kind::Bool),
    ("flv", Kind::Bool),
    ("api", Kind::Bool),
    ("static_push", Kind::Array),
];

fn validate_application(value: &Value, at: Location<'_>) -> Result<(), ConfigError> {
    validate_fields(value, at, APPLICATION_FIELDS)?;
    let urls = value.get("static_push").and_then(Value::as_array);
    for (idx, url) in urls.into_iter().flatten().enumerate() {
        let path = format!("{}[{idx}]", at.child("static_push"));
        Location { label: at.label, path: &path }.check(url, Kind::String)?;
    }
    Ok(())
}

/// Check an object and the kinds of whichever listed fields it carries.
fn validate_fields(
    value: &Value,
    at: Location<'_>,
    fields: &[(&str, Kind)],
) -> Result<(), ConfigError> {
    at.check(value, Kind::Object)?;
    for (key, kind) in fields {
        if let Some(field) = value.get(key) {
            let path = at.child(key);
            Location { label: at.label, path: &path }.check(field, *kind)?;
        }
    }
    Ok(())
}
