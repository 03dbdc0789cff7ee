//! Log subscriber setup.
//!
//! Logs go to the console, or to a rolling file in a directory when one is
//! configured. Filtering always follows `RUST_LOG`. Rotated files are pruned
//! at startup so the directory does not grow without bound.

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::Layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// How often a new log file is started.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RotationPeriod {
    /// A new file every minute.
    Minutely,
    /// A new file every hour.
    Hourly,
    /// A new file every day.
    #[default]
    Daily,
    /// A single file for the whole run.
    Never,
}

impl std::str::FromStr for RotationPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "minutely" | "minute" => Ok(RotationPeriod::Minutely),
            "hourly" | "hour" => Ok(RotationPeriod::Hourly),
            "daily" | "day" => Ok(RotationPeriod::Daily),
            "never" | "none" => Ok(RotationPeriod::Never),
            _ => Err(format!(
                "Invalid rotation period '{s}'. Valid options: minutely, hourly, daily, never"
            )),
        }
    }
}

impl From<RotationPeriod> for Rotation {
    fn from(period: RotationPeriod) -> Self {
        match period {
            RotationPeriod::Minutely => Rotation::MINUTELY,
            RotationPeriod::Hourly => Rotation::HOURLY,
            RotationPeriod::Daily => Rotation::DAILY,
            RotationPeriod::Never => Rotation::NEVER,
        }
    }
}

/// Where and how the switch daemon writes its log files.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Directory holding the log files.
    pub log_dir: String,
    /// File name prefix, e.g. `hikvision-switch.2026-10-17.log`.
    pub log_prefix: String,
    pub rotation: RotationPeriod,
    /// Files kept after pruning. 0 keeps every file.
    pub max_log_files: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_dir: ".".to_string(),
            log_prefix: "hikvision-switch".to_string(),
            rotation: RotationPeriod::Daily,
            max_log_files: 7,
        }
    }
}

/// Keeps the background log writer alive.
///
/// Buffered lines are flushed when it is dropped, so hold it until `main` returns.
pub struct LogGuard {
    _guard: Option<WorkerGuard>,
}

/// Installs the global subscriber.
///
/// With no `config` logs go to the console. Otherwise they go to a rolling
/// file under `config.log_dir`, after the oldest files beyond
/// `config.max_log_files` are removed.
///
/// ```ignore
/// let _guard = setup_logging(Some(LogConfig {
///     log_dir: "/var/log/hikvision-switch".to_string(),
///     ..LogConfig::default()
/// }))?;
/// ```
pub fn setup_logging(config: Option<LogConfig>) -> std::io::Result<LogGuard> {
    let Some(config) = config else {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .init();
        return Ok(LogGuard { _guard: None });
    };

    let log_dir = Path::new(&config.log_dir);
    if config.max_log_files > 0 {
        cleanup_old_logs(log_dir, &config.log_prefix, config.max_log_files)?;
    }

    let mut builder = RollingFileAppender::builder()
        .rotation(config.rotation.into())
        .filename_prefix(&config.log_prefix)
        .filename_suffix("log");
    if config.max_log_files > 0 {
        builder = builder.max_log_files(config.max_log_files);
    }
    let file_appender = builder.build(log_dir).map_err(std::io::Error::other)?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = Layer::default()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(file_layer)
        .init();

    Ok(LogGuard {
        _guard: Some(guard),
    })
}

/// Removes the oldest `<prefix>*.log` files so at most `max_files` remain.
///
/// Age is taken from the modification time. Files that cannot be removed are
/// reported on stderr, since the subscriber is not installed yet.
fn cleanup_old_logs(log_dir: &Path, prefix: &str, max_files: usize) -> std::io::Result<()> {
    if !log_dir.exists() {
        return Ok(());
    }

    let mut log_files: Vec<_> = std::fs::read_dir(log_dir)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.starts_with(prefix) && name.ends_with(".log"))
        })
        .filter_map(|entry| {
            let modified = entry.metadata().and_then(|m| m.modified()).ok()?;
            Some((entry.path(), modified))
        })
        .collect();

    log_files.sort_by(|a, b| b.1.cmp(&a.1));

    for (path, _) in log_files.into_iter().skip(max_files) {
        if let Err(e) = std::fs::remove_file(&path) {
            eprintln!("Warning: failed to remove old log file {path:?}: {e}");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_rotation_period_from_str() {
        assert_eq!("Daily".parse::<RotationPeriod>(), Ok(RotationPeriod::Daily));
        assert_eq!("hour".parse::<RotationPeriod>(), Ok(RotationPeriod::Hourly));
        assert_eq!("minutely".parse::<RotationPeriod>(), Ok(RotationPeriod::Minutely));
        assert_eq!(Rotation::from(RotationPeriod::Minutely), Rotation::MINUTELY);
        assert_eq!("never".parse::<RotationPeriod>(), Ok(RotationPeriod::Never));
        assert!("weekly".parse::<RotationPeriod>().is_err());
    }

    #[test]
    fn test_cleanup_keeps_newest_files() {
        let temp_dir = TempDir::new().unwrap();
        let log_dir = temp_dir.path();

        for i in 0..4 {
            std::fs::write(log_dir.join(format!("switch-{i}.log")), "x").unwrap();
            std::thread::sleep(std::time::Duration::from_millis(10));
        }
        std::fs::write(log_dir.join("other.log"), "x").unwrap();

        cleanup_old_logs(log_dir, "switch-", 2).unwrap();

        let mut remaining: Vec<String> = std::fs::read_dir(log_dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter_map(|e| e.file_name().to_str().map(String::from))
            .collect();
        remaining.sort();
        assert_eq!(remaining, vec!["other.log", "switch-2.log", "switch-3.log"]);
    }
}
