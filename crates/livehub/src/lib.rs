//! Public surface for the livehub configuration layer.
//!
//! This crate re-exports the config building blocks and provides a small
//! logging helper so that the call-site flag driven by the `level` key is
//! honoured by the log output.

/// Re-export for convenience.
pub use livehub_config as config;
pub use livehub_config::{Application, ConfigError, ConfigService, ServerConfig};

#[inline]
/// Initialize logging using env_logger if the "logging" feature is enabled.
///
/// `RUST_LOG` caps what can ever be printed; below that cap the `level` key
/// of the loaded configuration decides. Without `RUST_LOG` output starts at
/// info until a configuration load says otherwise.
pub fn init_logging() {
    #[cfg(feature = "logging")]
    {
        use log::LevelFilter;
        use std::io::Write;

        let initialized = env_logger::builder()
            .filter_level(LevelFilter::Trace)
            .parse_default_env()
            .format(|buf, record| {
                let ts = buf.timestamp_millis();
                if config::logging::report_caller() {
                    writeln!(
                        buf,
                        "[{ts} {:<5} {} {}:{}] {}",
                        record.level(),
                        record.target(),
                        record.file().unwrap_or("<unknown>"),
                        record.line().unwrap_or(0),
                        record.args()
                    )
                } else {
                    writeln!(
                        buf,
                        "[{ts} {:<5} {}] {}",
                        record.level(),
                        record.target(),
                        record.args()
                    )
                }
            })
            .try_init()
            .is_ok();
        if initialized && std::env::var_os("RUST_LOG").is_none() {
            log::set_max_level(LevelFilter::Info);
        }
    }
}
