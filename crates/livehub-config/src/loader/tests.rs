//! Tests for layered configuration loading.

use super::*;
use crate::{Application, ConfigError};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::fs;
use tempfile::TempDir;

/// Write file contents, creating parent directories if needed.
fn write_config(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("dir");
    }
    fs::write(path, contents).expect("write");
}

fn load(path: &Path, env: &MapEnv) -> Store {
    BaseLayers::load(Some(path), env).resolve(env)
}

/// Defaults alone decode to the compiled-in config.
#[test]
fn defaults_decode_to_compiled_config() {
    let temp = TempDir::new().expect("tmp");
    let path = temp.path().join("absent.json");
    let store = load(&path, &MapEnv::new());

    let mut expected = ServerConfig::default();
    expected.config_file = path.display().to_string();
    assert_eq!(store.decode().expect("decode"), expected);
    assert_eq!(store.get("rtmp_addr"), Some(&json!(":1935")));
    assert_eq!(store.get("gop_num"), Some(&json!(1)));
}

/// A missing file is recorded as a disabled layer, not an error.
#[test]
fn missing_file_is_skipped() {
    let temp = TempDir::new().expect("tmp");
    let path = temp.path().join("absent.yaml");
    let store = load(&path, &MapEnv::new());

    let sources: Vec<_> = store.layers().iter().map(|layer| layer.source).collect();
    assert_eq!(
        sources,
        vec![
            ConfigLayerSource::Default,
            ConfigLayerSource::File,
            ConfigLayerSource::Environment
        ]
    );
    let file = &store.layers()[1];
    assert_eq!(file.path.as_deref(), Some(path.as_path()));
    assert_eq!(file.disabled_reason.as_deref(), Some("file not found"));
}

/// A malformed file is skipped and defaults stay in effect.
#[test]
fn malformed_file_keeps_defaults() {
    let temp = TempDir::new().expect("tmp");
    let path = temp.path().join("livehub.json");
    write_config(&path, "{ rtmp_addr: ");

    let store = load(&path, &MapEnv::new());
    assert!(store.layers()[1].disabled_reason.is_some());
    assert_eq!(store.get("rtmp_addr"), Some(&json!(":1935")));
}

/// A document whose root is not an object counts as malformed.
#[test]
fn non_object_file_is_skipped() {
    let temp = TempDir::new().expect("tmp");
    let path = temp.path().join("livehub.yaml");
    write_config(&path, "- just\n- a list\n");

    let store = load(&path, &MapEnv::new());
    let reason = store.layers()[1].disabled_reason.clone().expect("reason");
    assert!(reason.contains("expected an object"));
    assert!(store.decode().is_ok());
}

/// File values override defaults; untouched keys keep their defaults.
#[test]
fn file_overrides_defaults() {
    let temp = TempDir::new().expect("tmp");
    let path = temp.path().join("livehub.json");
    write_config(
        &path,
        r#"{ "rtmp_addr": ":1936", "read_timeout": 30, "jwt": { "secret": "s" } }"#,
    );

    let config = load(&path, &MapEnv::new()).decode().expect("decode");
    assert_eq!(config.rtmp_addr, ":1936");
    assert_eq!(config.read_timeout, 30);
    assert_eq!(config.write_timeout, 10);
    assert_eq!(config.jwt.secret, "s");
    assert_eq!(config.jwt.algorithm, "");
}

/// An application list in the file replaces the default list entirely.
#[test]
fn file_application_list_replaces_default_list() {
    let temp = TempDir::new().expect("tmp");
    let path = temp.path().join("livehub.yaml");
    write_config(
        &path,
        "server:\n  - appname: studio\n    live: true\n    static_push:\n      - rtmp://a/live\n",
    );

    let config = load(&path, &MapEnv::new()).decode().expect("decode");
    assert_eq!(
        config.applications,
        vec![Application {
            appname: "studio".to_string(),
            live: true,
            static_push: vec!["rtmp://a/live".to_string()],
            ..Application::default()
        }]
    );
}

/// Empty YAML keys fall back to the lower layer or the field default.
#[test]
fn empty_yaml_keys_count_as_unset() {
    let temp = TempDir::new().expect("tmp");
    let path = temp.path().join("livehub.yaml");
    write_config(
        &path,
        "rtmp_addr:\njwt:\nserver:\n  - appname: live\n    live: true\n    static_push:\n",
    );

    let store = load(&path, &MapEnv::new());
    assert_eq!(store.get("rtmp_addr"), Some(&json!(":1935")));
    let config = store.decode().expect("decode");
    assert_eq!(
        config.applications,
        vec![Application {
            appname: "live".to_string(),
            live: true,
            ..Application::default()
        }]
    );
    assert_eq!(config.jwt, Default::default());
}

/// Environment wins over both file and defaults, empty values included.
#[test]
fn environment_overrides_file() {
    let temp = TempDir::new().expect("tmp");
    let path = temp.path().join("livehub.json");
    write_config(
        &path,
        r#"{ "rtmp_addr": ":1936", "hls_addr": ":8002", "jwt": { "secret": "file" } }"#,
    );
    let env = MapEnv::new()
        .with("RTMP_ADDR", ":1937")
        .with("HLS_ADDR", "")
        .with("jwt_secret", "env")
        .with("FLV_ARCHIVE", "true")
        .with("GOP_NUM", "4");

    let config = load(&path, &env).decode().expect("decode");
    assert_eq!(config.rtmp_addr, ":1937");
    assert_eq!(config.hls_addr, "");
    assert_eq!(config.jwt.secret, "env");
    assert!(config.flv_archive);
    assert_eq!(config.gop_num, 4);
    assert_eq!(config.httpflv_addr, ":7001");
}

/// The whole application list can come from the environment as JSON.
#[test]
fn environment_replaces_application_list() {
    let temp = TempDir::new().expect("tmp");
    let path = temp.path().join("absent.json");
    let env = MapEnv::new().with(
        "SERVER",
        r#"[{"appname":"a","live":true,"static_push":["u1"]}]"#,
    );

    let apps = load(&path, &env).applications().expect("apps");
    assert_eq!(apps.len(), 1);
    assert_eq!(apps[0].appname, "a");
    assert_eq!(apps[0].static_push, vec!["u1".to_string()]);
}

/// `CONFIG_FILE` selects the file to read.
#[test]
fn config_file_variable_selects_file() {
    let temp = TempDir::new().expect("tmp");
    let chosen = temp.path().join("chosen.json5");
    write_config(&chosen, "{ api_addr: ':9000' }");
    let env = MapEnv::new().with("CONFIG_FILE", chosen.display().to_string());

    let store = load(&temp.path().join("ignored.json"), &env);
    assert_eq!(store.layers()[1].path.as_deref(), Some(chosen.as_path()));
    assert_eq!(store.get("api_addr"), Some(&json!(":9000")));
}

/// Merging the same inputs twice yields the same store.
#[test]
fn merge_is_idempotent() {
    let temp = TempDir::new().expect("tmp");
    let path = temp.path().join("livehub.json");
    write_config(&path, r#"{ "server": [{ "appname": "x", "live": true }] }"#);
    let env = MapEnv::new().with("WRITE_TIMEOUT", "3");

    let first = load(&path, &env);
    let second = load(&path, &env);
    assert_eq!(first, second);

    let base = BaseLayers::load(Some(&path), &env);
    let mut remerged = first.as_value().clone();
    merge::merge_values(&mut remerged, &base.value);
    merge::merge_values(&mut remerged, &env::environment_layer(&base.value, &env).value);
    assert_eq!(&remerged, first.as_value());
}

/// Type mismatches in the file surface from decode with their path.
#[test]
fn file_type_mismatch_reports_path() {
    let temp = TempDir::new().expect("tmp");
    let path = temp.path().join("livehub.json");
    write_config(
        &path,
        r#"{ "server": [{ "appname": "a", "live": true }, { "appname": "b", "live": "yes" }] }"#,
    );

    let err = load(&path, &MapEnv::new()).decode().unwrap_err();
    match err {
        ConfigError::InvalidField { path, message } => {
            assert_eq!(path, "effective:server[1].live");
            assert_eq!(message, "expected bool");
        }
        other => panic!("unexpected error: {other}"),
    }
}

/// Environment values that cannot be coerced also fail decode.
#[test]
fn environment_type_mismatch_reports_path() {
    let temp = TempDir::new().expect("tmp");
    let env = MapEnv::new().with("READ_TIMEOUT", "soon");

    let store = load(&temp.path().join("absent.json"), &env);
    let msg = format!("{}", store.decode().unwrap_err());
    assert!(msg.contains("read_timeout"));
    assert!(store.get_as::<u64>("read_timeout").is_err());
    assert!(store.get_as::<u64>("write_timeout").is_ok());
}

/// Runtime overrides sit below the environment.
#[test]
fn override_keeps_environment_precedence() {
    let temp = TempDir::new().expect("tmp");
    let env = MapEnv::new().with("API_ADDR", ":9999");
    let base = BaseLayers::load(Some(&temp.path().join("absent.json")), &env);

    let config = ServerConfig::builder()
        .rtmp_addr(":2000")
        .build();
    let mut overridden = config.clone();
    overridden.api_addr = ":1111".to_string();
    let store = base.with_override(&overridden).resolve(&env);

    assert_eq!(store.get("rtmp_addr"), Some(&json!(":2000")));
    assert_eq!(store.get("api_addr"), Some(&json!(":9999")));
    assert_eq!(
        store.layers().last().map(|layer| layer.source),
        Some(ConfigLayerSource::Environment)
    );
}
