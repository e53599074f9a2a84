//! Process-wide configuration handle shared by stream handlers.
//!
//! The service owns the merged store. Readers clone the current `Arc<Store>`
//! under a read lock and work on that snapshot, so a reload is observed either
//! fully or not at all. Reloads are serialized by the `base` mutex, held from
//! re-merging until the new store is published.

use crate::loader::{BaseLayers, EnvSource, ProcessEnv};
use crate::logging::{self, GlobalLogLevel, LogLevelSink};
use crate::{Application, ConfigError, JwtConfig, ListenAddrs, ServerConfig, Store, policy};
use log::{Level, debug, info, log_enabled, warn};
use parking_lot::{Mutex, RwLock};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Layered configuration with hot reload and stream policy lookups.
pub struct ConfigService {
    config_file: Option<PathBuf>,
    env: Arc<dyn EnvSource>,
    log_sink: Arc<dyn LogLevelSink>,
    base: Mutex<BaseLayers>,
    current: RwLock<Arc<Store>>,
}

impl ConfigService {
    /// Load defaults, the config file and the process environment.
    pub fn load() -> Self {
        Self::builder().build()
    }

    /// Start configuring where the layers come from.
    pub fn builder() -> ConfigServiceBuilder {
        ConfigServiceBuilder::default()
    }

    /// Re-run the Default < File < Environment merge from scratch.
    ///
    /// Earlier `reload_or_override` calls are discarded.
    pub fn reload(&self) {
        let mut base = self.base.lock();
        *base = BaseLayers::load(self.config_file.as_deref(), self.env.as_ref());
        let store = base.resolve(self.env.as_ref());
        self.publish(store);
        info!("configuration reloaded");
    }

    /// Overlay `config` on the current defaults and file, then re-apply the
    /// environment on top.
    ///
    /// The candidate store must decode; otherwise the error is returned and
    /// the active store is left as it was.
    pub fn reload_or_override(&self, config: &ServerConfig) -> Result<(), ConfigError> {
        let mut base = self.base.lock();
        let candidate = base.with_override(config);
        let store = candidate.resolve(self.env.as_ref());
        store.decode()?;
        *base = candidate;
        self.publish(store);
        info!("configuration overridden at runtime");
        Ok(())
    }

    /// The store as of the latest merge.
    pub fn snapshot(&self) -> Arc<Store> {
        Arc::clone(&self.current.read())
    }

    /// Decode the latest store into the typed configuration.
    pub fn decode(&self) -> Result<ServerConfig, ConfigError> {
        self.snapshot().decode()
    }

    /// The application list from the latest store.
    ///
    /// A list that does not decode is logged and treated as empty, which
    /// denies every stream.
    pub fn applications(&self) -> Vec<Application> {
        match self.snapshot().applications() {
            Ok(applications) => applications,
            Err(err) => {
                warn!("application list does not decode: {err}");
                Vec::new()
            }
        }
    }

    /// Whether `name` may publish live.
    pub fn check_app_name(&self, name: &str) -> bool {
        policy::check_app_name(&self.applications(), name)
    }

    /// Static push targets for `name`, or `None` when nothing should be pushed.
    pub fn static_push_urls(&self, name: &str) -> Option<Vec<String>> {
        policy::static_push_urls(&self.applications(), name)
    }

    /// The first application named `name`, with its feature toggles.
    pub fn application(&self, name: &str) -> Option<Application> {
        policy::find_application(&self.applications(), name).cloned()
    }

    /// Decode a single setting by dotted key.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T, ConfigError> {
        self.snapshot().get_as(key)
    }

    pub fn get_string(&self, key: &str) -> Result<String, ConfigError> {
        self.get(key)
    }

    pub fn get_bool(&self, key: &str) -> Result<bool, ConfigError> {
        self.get(key)
    }

    pub fn get_u64(&self, key: &str) -> Result<u64, ConfigError> {
        self.get(key)
    }

    pub fn read_timeout(&self) -> Result<Duration, ConfigError> {
        self.get_u64("read_timeout").map(Duration::from_secs)
    }

    pub fn write_timeout(&self) -> Result<Duration, ConfigError> {
        self.get_u64("write_timeout").map(Duration::from_secs)
    }

    pub fn jwt(&self) -> Result<JwtConfig, ConfigError> {
        self.get("jwt")
    }

    /// Listener addresses, all read from the same store generation.
    pub fn listen_addrs(&self) -> Result<ListenAddrs, ConfigError> {
        let store = self.snapshot();
        Ok(ListenAddrs {
            rtmp: store.get_as("rtmp_addr")?,
            httpflv: store.get_as("httpflv_addr")?,
            hls: store.get_as("hls_addr")?,
            api: store.get_as("api_addr")?,
        })
    }

    fn publish(&self, store: Store) {
        self.announce(&store);
        *self.current.write() = Arc::new(store);
    }

    /// Side effects of a (re)load: log level and a debug dump.
    fn announce(&self, store: &Store) {
        logging::apply_from_store(store, self.log_sink.as_ref());
        if log_enabled!(Level::Debug) {
            match store.decode() {
                Ok(config) => debug!("current configuration: {config:#?}"),
                Err(err) => debug!("current configuration does not decode: {err}"),
            }
        }
    }
}

/// Chooses the config file, environment and log sink for a `ConfigService`.
pub struct ConfigServiceBuilder {
    config_file: Option<PathBuf>,
    env: Arc<dyn EnvSource>,
    log_sink: Arc<dyn LogLevelSink>,
}

impl Default for ConfigServiceBuilder {
    fn default() -> Self {
        Self {
            config_file: None,
            env: Arc::new(ProcessEnv),
            log_sink: Arc::new(GlobalLogLevel),
        }
    }
}

impl ConfigServiceBuilder {
    /// Replace the compiled-in config file path. `CONFIG_FILE` still wins.
    pub fn config_file(mut self, path: impl AsRef<Path>) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn env(mut self, env: impl EnvSource + 'static) -> Self {
        self.env = Arc::new(env);
        self
    }

    pub fn log_sink(mut self, sink: Arc<dyn LogLevelSink>) -> Self {
        self.log_sink = sink;
        self
    }

    /// Merge the layers and return the ready service.
    pub fn build(self) -> ConfigService {
        let base = BaseLayers::load(self.config_file.as_deref(), self.env.as_ref());
        let store = base.resolve(self.env.as_ref());
        let service = ConfigService {
            config_file: self.config_file,
            env: self.env,
            log_sink: self.log_sink,
            base: Mutex::new(base),
            current: RwLock::new(Arc::new(store)),
        };
        service.announce(&service.snapshot());
        info!(
            "configuration loaded (layers={})",
            service.snapshot().layers().len()
        );
        service
    }
}
