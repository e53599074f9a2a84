//! Bridge from the resolved `level` key to the `log` facade.

use crate::Store;
use log::{LevelFilter, debug};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};

static REPORT_CALLER: AtomicBool = AtomicBool::new(false);

/// Receiver for log level changes driven by configuration loads.
pub trait LogLevelSink: Send + Sync {
    fn apply(&self, level: LevelFilter, report_caller: bool);
}

/// Applies levels to the process-wide `log` max level.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalLogLevel;

impl LogLevelSink for GlobalLogLevel {
    fn apply(&self, level: LevelFilter, report_caller: bool) {
        log::set_max_level(level);
        REPORT_CALLER.store(report_caller, Ordering::Relaxed);
    }
}

/// Whether log lines should carry their call site (`file:line`).
pub fn report_caller() -> bool {
    REPORT_CALLER.load(Ordering::Relaxed)
}

/// Parse a severity name, ignoring case.
pub fn parse_level(name: &str) -> Option<LevelFilter> {
    match name.trim().to_ascii_lowercase().as_str() {
        "off" => Some(LevelFilter::Off),
        "panic" | "fatal" | "error" => Some(LevelFilter::Error),
        "warn" | "warning" => Some(LevelFilter::Warn),
        "info" => Some(LevelFilter::Info),
        "debug" => Some(LevelFilter::Debug),
        "trace" => Some(LevelFilter::Trace),
        _ => None,
    }
}

/// Apply the store's `level` to `sink`.
///
/// Unknown, empty or absent levels leave the active level untouched and
/// return `None`. Call-site reporting is only turned on at debug.
pub(crate) fn apply_from_store(store: &Store, sink: &dyn LogLevelSink) -> Option<LevelFilter> {
    let name = store.get("level").and_then(Value::as_str)?;
    let level = parse_level(name)?;
    sink.apply(level, level == LevelFilter::Debug);
    debug!("applied log level from config (level={level})");
    Some(level)
}
