//! Rolling file logs for the core crate.
//!
//! # Responsibility
//! - Resolve [`LogSettings`] from explicit values or `DEVOTION_LOG_*`
//!   environment variables.
//! - Start one flexi_logger file writer per process.
//! - Record panics by source location.
//!
//! # Privacy
//! Events carry section keys, phases, day numbers, counts and durations.
//! Reflection answers, exercise drafts and identity statements are written by
//! the user and never reach a log line. Panic messages can quote that text,
//! so the hook records only their length.
//!
//! # Invariants
//! - Starting again with the same settings is a no-op.
//! - Starting with different settings fails with [`LoggingError::AlreadyActive`].
//! - Nothing here panics.

use flexi_logger::{
    Age, Cleanup, Criterion, DeferredNow, FileSpec, Logger, LoggerHandle, Naming, WriteMode,
};
use log::{error, info, Record};
use once_cell::sync::OnceCell;
use std::any::Any;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Environment variable overriding the log level.
pub const LOG_LEVEL_ENV: &str = "DEVOTION_LOG_LEVEL";
/// Environment variable overriding the absolute log directory.
pub const LOG_DIR_ENV: &str = "DEVOTION_LOG_DIR";

const FILE_BASENAME: &str = "devotion";
const DEFAULT_DIR_NAME: &str = "devotion-logs";
const ROTATE_AT_BYTES: u64 = 2 * 1024 * 1024;
const KEPT_FILES: usize = 3;
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%:z";

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();
static PANIC_HOOK: OnceCell<()> = OnceCell::new();

struct ActiveLogger {
    settings: LogSettings,
    _handle: LoggerHandle,
}

/// Supported log levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Case-insensitive; `warning` is accepted for `warn`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "trace" => Some(Self::Trace),
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    /// `debug` for debug builds, `info` for release builds.
    pub fn build_default() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Info
        }
    }
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated logger configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub level: LogLevel,
    /// Absolute directory holding `devotion*.log` files.
    pub dir: PathBuf,
}

impl LogSettings {
    /// Validates an explicit level and absolute directory.
    pub fn parse(level: &str, dir: &str) -> Result<Self, LoggingError> {
        let parsed_level = LogLevel::parse(level)
            .ok_or_else(|| LoggingError::UnsupportedLevel(level.trim().to_string()))?;
        Ok(Self {
            level: parsed_level,
            dir: absolute_dir(dir)?,
        })
    }

    /// Reads [`LOG_LEVEL_ENV`] and [`LOG_DIR_ENV`].
    pub fn from_env() -> Result<Self, LoggingError> {
        Self::resolve(env_value(LOG_LEVEL_ENV), env_value(LOG_DIR_ENV))
    }

    /// Missing or blank values fall back to [`LogLevel::build_default`] and
    /// `<temp_dir>/devotion-logs`.
    pub fn resolve(level: Option<String>, dir: Option<String>) -> Result<Self, LoggingError> {
        let level = match non_blank(level) {
            Some(value) => LogLevel::parse(&value).ok_or(LoggingError::UnsupportedLevel(value))?,
            None => LogLevel::build_default(),
        };
        let dir = match non_blank(dir) {
            Some(value) => absolute_dir(&value)?,
            None => std::env::temp_dir().join(DEFAULT_DIR_NAME),
        };
        Ok(Self { level, dir })
    }
}

/// Logging setup failure.
#[derive(Debug)]
pub enum LoggingError {
    UnsupportedLevel(String),
    /// Directory blank or not absolute.
    InvalidDir(String),
    CreateDir {
        dir: PathBuf,
        source: std::io::Error,
    },
    /// flexi_logger rejected the configuration.
    Backend(String),
    /// A logger with other settings is already running.
    AlreadyActive {
        active: LogSettings,
        requested: LogSettings,
    },
}

impl Display for LoggingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedLevel(level) => write!(
                f,
                "unsupported log level `{level}`; expected trace|debug|info|warn|error"
            ),
            Self::InvalidDir(dir) => {
                write!(f, "log directory must be a non-empty absolute path, got `{dir}`")
            }
            Self::CreateDir { dir, source } => write!(
                f,
                "failed to create log directory `{}`: {source}",
                dir.display()
            ),
            Self::Backend(details) => write!(f, "failed to start logger: {details}"),
            Self::AlreadyActive { active, requested } => write!(
                f,
                "logging already active with level `{}` at `{}`; refusing level `{}` at `{}`",
                active.level,
                active.dir.display(),
                requested.level,
                requested.dir.display()
            ),
        }
    }
}

impl Error for LoggingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CreateDir { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Starts logging with an explicit level and absolute directory.
pub fn init_logging(level: &str, log_dir: &str) -> Result<(), LoggingError> {
    start_logging(LogSettings::parse(level, log_dir)?)
}

/// Starts logging from `DEVOTION_LOG_LEVEL` / `DEVOTION_LOG_DIR`.
pub fn init_logging_from_env() -> Result<(), LoggingError> {
    start_logging(LogSettings::from_env()?)
}

/// Starts the file logger once; later calls must repeat the same settings.
pub fn start_logging(settings: LogSettings) -> Result<(), LoggingError> {
    let active = ACTIVE.get_or_try_init(|| launch(settings.clone()))?;
    if active.settings != settings {
        return Err(LoggingError::AlreadyActive {
            active: active.settings.clone(),
            requested: settings,
        });
    }
    Ok(())
}

/// Settings of the running logger, if any.
pub fn active_log_settings() -> Option<LogSettings> {
    ACTIVE.get().map(|active| active.settings.clone())
}

fn launch(settings: LogSettings) -> Result<ActiveLogger, LoggingError> {
    std::fs::create_dir_all(&settings.dir).map_err(|source| LoggingError::CreateDir {
        dir: settings.dir.clone(),
        source,
    })?;

    let handle = Logger::try_with_str(settings.level.as_str())
        .map_err(|err| LoggingError::Backend(err.to_string()))?
        .log_to_file(
            FileSpec::default()
                .directory(settings.dir.as_path())
                .basename(FILE_BASENAME),
        )
        .rotate(
            Criterion::AgeOrSize(Age::Day, ROTATE_AT_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(KEPT_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(event_line)
        .start()
        .map_err(|err| LoggingError::Backend(err.to_string()))?;

    install_panic_hook();
    info!(
        "event=logging_start module=logging status=ok level={} dir={} os={} version={}",
        settings.level,
        settings.dir.display(),
        std::env::consts::OS,
        env!("CARGO_PKG_VERSION")
    );

    Ok(ActiveLogger {
        settings,
        _handle: handle,
    })
}

/// `2024-03-01T09:30:00.000+00:00 INFO  [devotion_core::repo] event=...`
fn event_line(
    w: &mut dyn Write,
    now: &mut DeferredNow,
    record: &Record<'_>,
) -> std::io::Result<()> {
    write!(
        w,
        "{} {:<5} [{}] {}",
        now.format(TIMESTAMP_FORMAT),
        record.level(),
        record.module_path().unwrap_or("-"),
        record.args()
    )
}

fn install_panic_hook() {
    if PANIC_HOOK.set(()).is_err() {
        return;
    }
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let location = info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        error!(
            "event=panic module=logging status=error location={location} message_chars={}",
            payload_chars(info.payload())
        );
        previous(info);
    }));
}

fn payload_chars(payload: &(dyn Any + Send)) -> usize {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.chars().count()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.chars().count()
    } else {
        0
    }
}

fn absolute_dir(dir: &str) -> Result<PathBuf, LoggingError> {
    let trimmed = dir.trim();
    let path = Path::new(trimmed);
    if trimmed.is_empty() || !path.is_absolute() {
        return Err(LoggingError::InvalidDir(trimmed.to_string()));
    }
    Ok(path.to_path_buf())
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}
