//! Process-wide log backend for the habitrack binaries.
//!
//! Records are single lines of `key=value` pairs (`event=... module=...
//! status=...`) behind a timestamp, level and module path. The backend is
//! started once; later calls must ask for the same settings.
//!
//! Passwords, password hashes and session tokens never reach a log macro.

use flexi_logger::{
    Cleanup, Criterion, DeferredNow, Duplicate, FileSpec, Logger, LoggerHandle, Naming, WriteMode,
};
use log::{error, info, LevelFilter, Record};
use once_cell::sync::OnceCell;
use std::io::Write;
use std::path::PathBuf;

const LOG_FILE_BASENAME: &str = "habitrack";
const ROTATE_AT_BYTES: u64 = 10 * 1024 * 1024;
const KEEP_ROTATED_FILES: usize = 5;
const PANIC_PAYLOAD_LIMIT: usize = 160;
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();
static PANIC_HOOK: OnceCell<()> = OnceCell::new();

/// Where log records go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    /// Foreground runs and containers.
    Stderr,
    /// Size-rotated `habitrack*.log` files in an absolute directory.
    /// Warnings and errors are copied to stderr as well.
    Directory(PathBuf),
}

impl std::fmt::Display for LogTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stderr => f.write_str("stderr"),
            Self::Directory(dir) => write!(f, "{}", dir.display()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct LogSettings {
    level: LevelFilter,
    target: LogTarget,
}

impl LogSettings {
    fn parse(level: &str, log_dir: Option<&str>) -> Result<Self, String> {
        let level = parse_level(level)?;
        let target = match log_dir.map(str::trim) {
            None => LogTarget::Stderr,
            Some("") => return Err("log directory cannot be blank".to_string()),
            Some(dir) => {
                let dir = PathBuf::from(dir);
                if !dir.is_absolute() {
                    return Err(format!(
                        "log directory must be absolute, got `{}`",
                        dir.display()
                    ));
                }
                LogTarget::Directory(dir)
            }
        };
        Ok(Self { level, target })
    }
}

struct ActiveLogger {
    settings: LogSettings,
    _handle: LoggerHandle,
}

/// Starts the log backend at `level`, writing to `log_dir` when given and to
/// stderr otherwise.
///
/// Calling again with the same settings is a no-op.
///
/// # Errors
/// Unknown levels, blank or relative directories, a directory that cannot be
/// created, a backend that fails to start, and a second call with different
/// settings are all reported as messages.
pub fn init_logging(level: &str, log_dir: Option<&str>) -> Result<(), String> {
    let wanted = LogSettings::parse(level, log_dir)?;
    let active = ACTIVE.get_or_try_init(|| start(wanted.clone()))?;

    if active.settings != wanted {
        return Err(format!(
            "logging already running at level `{}` to `{}`; refusing to switch to level `{}` to `{}`",
            active.settings.level, active.settings.target, wanted.level, wanted.target
        ));
    }
    Ok(())
}

/// Active level and target, or `None` before [`init_logging`] succeeded.
pub fn logging_status() -> Option<(LevelFilter, LogTarget)> {
    ACTIVE
        .get()
        .map(|active| (active.settings.level, active.settings.target.clone()))
}

/// `debug` for debug builds, `info` for release builds.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn start(settings: LogSettings) -> Result<ActiveLogger, String> {
    let spec = settings.level.to_string().to_ascii_lowercase();
    let logger = Logger::try_with_str(&spec)
        .map_err(|err| format!("invalid log level `{spec}`: {err}"))?;

    let logger = match &settings.target {
        LogTarget::Stderr => logger.log_to_stderr().format_for_stderr(line_format),
        LogTarget::Directory(dir) => {
            std::fs::create_dir_all(dir)
                .map_err(|err| format!("cannot create log directory `{}`: {err}", dir.display()))?;
            logger
                .log_to_file(FileSpec::default().directory(dir).basename(LOG_FILE_BASENAME))
                .rotate(
                    Criterion::Size(ROTATE_AT_BYTES),
                    Naming::Numbers,
                    Cleanup::KeepLogFiles(KEEP_ROTATED_FILES),
                )
                .write_mode(WriteMode::BufferAndFlush)
                .append()
                .format_for_files(line_format)
                .duplicate_to_stderr(Duplicate::Warn)
                .format_for_stderr(line_format)
        }
    };
    let handle = logger
        .start()
        .map_err(|err| format!("log backend failed to start: {err}"))?;

    install_panic_hook();
    info!(
        "event=logging_start module=core status=ok level={} target={} os={} version={}",
        settings.level,
        settings.target,
        std::env::consts::OS,
        env!("CARGO_PKG_VERSION")
    );

    Ok(ActiveLogger {
        settings,
        _handle: handle,
    })
}

fn line_format(
    w: &mut dyn Write,
    now: &mut DeferredNow,
    record: &Record<'_>,
) -> std::io::Result<()> {
    write!(
        w,
        "{} {:<5} [{}] {}",
        now.format(TIMESTAMP_FORMAT),
        record.level(),
        record.module_path().unwrap_or("?"),
        record.args()
    )
}

fn parse_level(level: &str) -> Result<LevelFilter, String> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok(LevelFilter::Trace),
        "debug" => Ok(LevelFilter::Debug),
        "info" => Ok(LevelFilter::Info),
        "warn" | "warning" => Ok(LevelFilter::Warn),
        "error" => Ok(LevelFilter::Error),
        other => Err(format!(
            "unknown log level `{other}` (use trace, debug, info, warn or error)"
        )),
    }
}

fn install_panic_hook() {
    if PANIC_HOOK.set(()).is_err() {
        return;
    }

    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let location = info
            .location()
            .map_or_else(|| "?".to_string(), |loc| format!("{}:{}", loc.file(), loc.line()));
        let payload = info
            .payload()
            .downcast_ref::<&str>()
            .map(|message| (*message).to_string())
            .or_else(|| info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "<non-string payload>".to_string());
        error!(
            "event=panic module=core status=error location={location} payload={}",
            one_line(&payload, PANIC_PAYLOAD_LIMIT)
        );
        previous(info);
    }));
}

/// Flattens `value` to a single line of at most `limit` characters.
fn one_line(value: &str, limit: usize) -> String {
    let flat: String = value
        .chars()
        .map(|ch| if ch == '\n' || ch == '\r' { ' ' } else { ch })
        .collect();
    match flat.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}...", &flat[..cut]),
        None => flat,
    }
}
