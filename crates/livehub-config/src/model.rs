//! Configuration schema for livehub.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::time::Duration;

/// Default config file consulted when `config_file` is not overridden.
pub const DEFAULT_CONFIG_FILE: &str = "livehub.yaml";
/// Application name shipped in the default config.
pub const DEFAULT_APP_NAME: &str = "live";

/// Root server config, the typed projection of the merged store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub level: String,
    pub config_file: String,
    pub flv_archive: bool,
    pub flv_dir: String,
    pub rtmp_noauth: bool,
    pub rtmp_addr: String,
    pub httpflv_addr: String,
    pub hls_addr: String,
    pub hls_keep_after_end: bool,
    pub api_addr: String,
    pub redis_addr: String,
    pub redis_pwd: String,
    /// Read timeout in seconds.
    pub read_timeout: u64,
    /// Write timeout in seconds.
    pub write_timeout: u64,
    pub gop_num: usize,
    pub jwt: JwtConfig,
    #[serde(rename = "server")]
    pub applications: Vec<Application>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            level: String::new(),
            config_file: DEFAULT_CONFIG_FILE.to_string(),
            flv_archive: false,
            flv_dir: String::new(),
            rtmp_noauth: false,
            rtmp_addr: ":1935".to_string(),
            httpflv_addr: ":7001".to_string(),
            hls_addr: ":7002".to_string(),
            hls_keep_after_end: false,
            api_addr: ":8090".to_string(),
            redis_addr: String::new(),
            redis_pwd: String::new(),
            read_timeout: 10,
            write_timeout: 10,
            gop_num: 1,
            jwt: JwtConfig::default(),
            applications: vec![Application {
                appname: DEFAULT_APP_NAME.to_string(),
                live: true,
                hls: true,
                flv: true,
                api: true,
                static_push: Vec::new(),
            }],
        }
    }
}

impl ServerConfig {
    /// Start building a config programmatically with defaults applied.
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::new()
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout)
    }

    /// Listener addresses for the protocol front ends.
    pub fn listen_addrs(&self) -> ListenAddrs {
        ListenAddrs {
            rtmp: self.rtmp_addr.clone(),
            httpflv: self.httpflv_addr.clone(),
            hls: self.hls_addr.clone(),
            api: self.api_addr.clone(),
        }
    }

    /// Render the config as the store's JSON tree.
    ///
    /// Built field by field so the conversion cannot fail; the default layer
    /// and runtime overrides both go through here.
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("level".into(), Value::from(self.level.clone()));
        map.insert("config_file".into(), Value::from(self.config_file.clone()));
        map.insert("flv_archive".into(), Value::from(self.flv_archive));
        map.insert("flv_dir".into(), Value::from(self.flv_dir.clone()));
        map.insert("rtmp_noauth".into(), Value::from(self.rtmp_noauth));
        map.insert("rtmp_addr".into(), Value::from(self.rtmp_addr.clone()));
        map.insert("httpflv_addr".into(), Value::from(self.httpflv_addr.clone()));
        map.insert("hls_addr".into(), Value::from(self.hls_addr.clone()));
        map.insert("hls_keep_after_end".into(), Value::from(self.hls_keep_after_end));
        map.insert("api_addr".into(), Value::from(self.api_addr.clone()));
        map.insert("redis_addr".into(), Value::from(self.redis_addr.clone()));
        map.insert("redis_pwd".into(), Value::from(self.redis_pwd.clone()));
        map.insert("read_timeout".into(), Value::from(self.read_timeout));
        map.insert("write_timeout".into(), Value::from(self.write_timeout));
        map.insert("gop_num".into(), Value::from(self.gop_num));
        map.insert("jwt".into(), self.jwt.to_value());
        map.insert(
            "server".into(),
            Value::Array(self.applications.iter().map(Application::to_value).collect()),
        );
        Value::Object(map)
    }
}

/// Builder for assembling a `ServerConfig` in code.
#[derive(Debug, Default, Clone)]
pub struct ServerConfigBuilder {
    config: ServerConfig,
}

impl ServerConfigBuilder {
    /// Create a new builder seeded with default config values.
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
        }
    }

    pub fn level(mut self, level: impl Into<String>) -> Self {
        self.config.level = level.into();
        self
    }

    pub fn rtmp_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.rtmp_addr = addr.into();
        self
    }

    pub fn timeouts(mut self, read_secs: u64, write_secs: u64) -> Self {
        self.config.read_timeout = read_secs;
        self.config.write_timeout = write_secs;
        self
    }

    pub fn jwt(mut self, jwt: JwtConfig) -> Self {
        self.config.jwt = jwt;
        self
    }

    /// Replace the whole application list.
    pub fn applications(mut self, applications: Vec<Application>) -> Self {
        self.config.applications = applications;
        self
    }

    /// Finalize and return the built `ServerConfig`.
    pub fn build(self) -> ServerConfig {
        self.config
    }
}

/// Listener addresses resolved from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenAddrs {
    pub rtmp: String,
    pub httpflv: String,
    pub hls: String,
    pub api: String,
}

/// Token verification settings handed to the auth layer.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JwtConfig {
    pub secret: String,
    pub algorithm: String,
}

impl JwtConfig {
    fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("secret".into(), Value::from(self.secret.clone()));
        map.insert("algorithm".into(), Value::from(self.algorithm.clone()));
        Value::Object(map)
    }
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secret = if self.secret.is_empty() { "" } else { "[REDACTED]" };
        f.debug_struct("JwtConfig")
            .field("secret", &secret)
            .field("algorithm", &self.algorithm)
            .finish()
    }
}

/// Policy for one publishing endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Application {
    pub appname: String,
    pub live: bool,
    pub hls: bool,
    pub flv: bool,
    pub api: bool,
    pub static_push: Vec<String>,
}

impl Application {
    /// A live application with every feature enabled and no push targets.
    pub fn live(appname: impl Into<String>) -> Self {
        Self {
            appname: appname.into(),
            live: true,
            hls: true,
            flv: true,
            api: true,
            static_push: Vec::new(),
        }
    }

    pub fn with_static_push<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.static_push = urls.into_iter().map(Into::into).collect();
        self
    }

    fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("appname".into(), Value::from(self.appname.clone()));
        map.insert("live".into(), Value::Bool(self.live));
        map.insert("hls".into(), Value::Bool(self.hls));
        map.insert("flv".into(), Value::Bool(self.flv));
        map.insert("api".into(), Value::Bool(self.api));
        map.insert("static_push".into(), Value::from(self.static_push.clone()));
        Value::Object(map)
    }
}
