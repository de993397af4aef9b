//! Bridges the `log` facade to the host application's logger.

use std::sync::{Arc, OnceLock};

/// Receives log lines emitted by the access-control core.
///
/// Implemented by the host app and registered once with [`set_logger`].
///
/// # Examples
///
/// ```rust
/// use brainmesh_core::logger::{LogLevel, Logger};
///
/// struct StderrLogger;
///
/// impl Logger for StderrLogger {
///     fn log(&self, level: LogLevel, message: String) {
///         eprintln!("[{level:?}] {message}");
///     }
/// }
/// ```
///
/// ## Swift
///
/// ```swift
/// final class BrainMeshLogBridge: BrainMeshCore.Logger {
///     func log(level: BrainMeshCore.LogLevel, message: String) {
///         os_log("%{public}@", message)
///     }
/// }
///
/// BrainMeshCore.setLogger(logger: BrainMeshLogBridge()) // once, at launch
/// ```
#[uniffi::export(with_foreign)]
pub trait Logger: Sync + Send {
    /// Handles one formatted log line.
    ///
    /// # Arguments
    ///
    /// * `level` - Severity of the line.
    /// * `message` - The formatted message, without level or target.
    fn log(&self, level: LogLevel, message: String);
}

/// Severity of a forwarded log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum LogLevel {
    /// Very detailed tracing output.
    Trace,
    /// Debugging information.
    Debug,
    /// Normal progress, e.g. a partition being unlocked.
    Info,
    /// Degraded behavior, e.g. the salt RNG fallback.
    Warn,
    /// Failures.
    Error,
}

/// Maps `log` severities one-to-one.
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

static LOGGER_INSTANCE: OnceLock<Arc<dyn Logger>> = OnceLock::new();

/// `log` backend that forwards to the registered host [`Logger`].
struct ForeignLogger;

impl log::Log for ForeignLogger {
    /// Accepts everything; filtering happens in [`Self::log`].
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    /// Forwards `record` to the host logger.
    ///
    /// # Arguments
    ///
    /// * `record` - The log record. Debug and trace records are forwarded
    ///   only when they come from a `brainmesh` module.
    fn log(&self, record: &log::Record) {
        // Debug and trace lines from dependencies are noise for the host.
        let is_own_record = record
            .module_path()
            .is_some_and(|module_path| module_path.starts_with("brainmesh"));
        let is_verbose = matches!(record.level(), log::Level::Debug | log::Level::Trace);
        if is_verbose && !is_own_record {
            return;
        }

        if let Some(logger) = LOGGER_INSTANCE.get() {
            logger.log(record.level().into(), record.args().to_string());
        } else {
            eprintln!("Logger not set: {}", record.args());
        }
    }

    /// Nothing to flush; lines are handed over as they arrive.
    fn flush(&self) {}
}

/// Registers the host logger and routes `log` output to it.
///
/// Only the first call takes effect; later calls are reported on stderr and
/// otherwise ignored.
///
/// # Arguments
///
/// * `logger` - The host implementation that receives every forwarded line.
#[uniffi::export]
pub fn set_logger(logger: Arc<dyn Logger>) {
    static LOGGER: ForeignLogger = ForeignLogger;

    if LOGGER_INSTANCE.set(logger).is_err() {
        eprintln!("Logger already set");
        return;
    }
    if let Err(e) = log::set_logger(&LOGGER) {
        eprintln!("Failed to set logger: {e}");
        return;
    }
    log::set_max_level(log::LevelFilter::Trace);
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct CapturingLogger {
        lines: Mutex<Vec<(LogLevel, String)>>,
    }

    impl Logger for CapturingLogger {
        fn log(&self, level: LogLevel, message: String) {
            self.lines.lock().expect("lines").push((level, message));
        }
    }

    #[test]
    fn test_level_mapping() {
        assert_eq!(LogLevel::from(log::Level::Warn), LogLevel::Warn);
        assert_eq!(LogLevel::from(log::Level::Trace), LogLevel::Trace);
    }

    #[test]
    fn test_forwards_own_records_and_filters_foreign_debug() {
        let capture = Arc::new(CapturingLogger::default());
        set_logger(capture.clone());

        log::info!("partition journal locked");
        log::logger().log(
            &log::Record::builder()
                .level(log::Level::Debug)
                .module_path(Some("hyper::client"))
                .args(format_args!("dependency chatter"))
                .build(),
        );

        let lines = capture.lines.lock().expect("lines");
        assert!(lines
            .iter()
            .any(|(level, message)| *level == LogLevel::Info && message == "partition journal locked"));
        assert!(!lines.iter().any(|(_, message)| message == "dependency chatter"));
    }
}
