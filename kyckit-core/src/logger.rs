//! Bridges the `log` facade to a logger supplied by the host application.
//!
//! ```rust
//! use std::sync::Arc;
//! use kyckit_core::logger::{set_logger, LogLevel, Logger};
//!
//! struct Stderr;
//!
//! impl Logger for Stderr {
//!     fn log(&self, level: LogLevel, message: String) {
//!         eprintln!("[{level:?}] {message}");
//!     }
//! }
//!
//! set_logger(Arc::new(Stderr));
//! ```
//!
//! On iOS the bridge is typically installed once from the app delegate:
//!
//! ```swift
//! final class KycKitLog: KycKit.Logger {
//!     func log(level: KycKit.LogLevel, message: String) { os_log("%@", message) }
//! }
//! KycKit.setLogger(logger: KycKitLog())
//! ```

use std::sync::{Arc, OnceLock};

/// Receives the crate's log records.
#[uniffi::export(with_foreign)]
pub trait Logger: Sync + Send {
    /// Records `message` at `level`.
    fn log(&self, level: LogLevel, message: String);
}

/// Severity of a log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum LogLevel {
    /// Very detailed tracing.
    Trace,
    /// Debugging information.
    Debug,
    /// Normal progress.
    Info,
    /// Something unexpected that the crate recovered from.
    Warn,
    /// A failure.
    Error,
}

impl From<log::Level> for LogLevel {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => Self::Error,
            log::Level::Warn => Self::Warn,
            log::Level::Info => Self::Info,
            log::Level::Debug => Self::Debug,
            log::Level::Trace => Self::Trace,
        }
    }
}

static HOST_LOGGER: OnceLock<Arc<dyn Logger>> = OnceLock::new();

struct HostLogger;

impl log::Log for HostLogger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        if !forwards(record.module_path(), record.level()) {
            return;
        }
        if let Some(logger) = HOST_LOGGER.get() {
            logger.log(record.level().into(), record.args().to_string());
        }
    }

    fn flush(&self) {}
}

/// Debug and trace records are only forwarded from this crate; dependencies
/// such as `reqwest` are too chatty at those levels.
fn forwards(module_path: Option<&str>, level: log::Level) -> bool {
    level <= log::Level::Info || module_path.is_some_and(|path| path.starts_with("kyckit"))
}

/// Installs `logger` as the destination of all log records.
///
/// Only the first call takes effect; later calls are ignored.
#[uniffi::export]
pub fn set_logger(logger: Arc<dyn Logger>) {
    if HOST_LOGGER.set(logger).is_err() {
        log::warn!("logger already set, ignoring");
        return;
    }

    static BRIDGE: HostLogger = HostLogger;
    match log::set_logger(&BRIDGE) {
        Ok(()) => log::set_max_level(log::LevelFilter::Trace),
        Err(err) => eprintln!("kyckit: could not install logger: {err}"),
    }
}
