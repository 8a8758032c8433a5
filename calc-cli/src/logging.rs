//! Tracing setup for the command line.
//!
//! Log records go to stderr so that results printed on stdout stay clean
//! for piping. A log file can be attached after start-up, and the level can
//! be changed at runtime from the interactive prompt.

use anyhow::{Context, Result, anyhow};
use chrono::Local;
use std::{
    fs::File,
    io::{self, IsTerminal, Write},
    path::Path,
    sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError},
};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{
        FmtContext, MakeWriter,
        format::{FormatEvent, FormatFields, Writer},
    },
    layer::SubscriberExt,
    registry::LookupSpan,
    reload,
    util::SubscriberInitExt,
};

use crate::config::DEFAULT_LOG_LEVEL;

// ============================================================================
// Event format
// ============================================================================

/// `14:03:07.512  WARN calc_core::session: value clamped to 0 field="amount"`
struct CliFormat;

fn level_color(level: &Level) -> &'static str {
    match *level {
        Level::ERROR => "1;31",
        Level::WARN => "1;33",
        Level::INFO => "1;32",
        Level::DEBUG => "1;34",
        Level::TRACE => "1;35",
    }
}

fn paint(
    writer: &mut Writer<'_>,
    color: &str,
    text: &dyn std::fmt::Display,
) -> std::fmt::Result {
    if writer.has_ansi_escapes() {
        write!(writer, "\x1b[{color}m{text}\x1b[0m")
    } else {
        write!(writer, "{text}")
    }
}

impl<S, N> FormatEvent<S, N> for CliFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();

        paint(&mut writer, "2", &Local::now().format("%H:%M:%S%.3f"))?;
        write!(writer, " ")?;
        paint(
            &mut writer,
            level_color(meta.level()),
            &format_args!("{:>5}", meta.level()),
        )?;
        write!(writer, " ")?;
        paint(&mut writer, "36", &format_args!("{}:", meta.target()))?;
        write!(writer, " ")?;

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

// ============================================================================
// Late-bound log file
// ============================================================================

type FileCell = Arc<Mutex<Option<File>>>;

/// Writer target for the file layer; discards records until a file is attached.
#[derive(Clone)]
struct LogFile(FileCell);

struct LogFileGuard<'a>(MutexGuard<'a, Option<File>>);

impl Write for LogFileGuard<'_> {
    fn write(
        &mut self,
        buf: &[u8],
    ) -> io::Result<usize> {
        self.0.as_mut().map_or(Ok(buf.len()), |f| f.write(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.as_mut().map_or(Ok(()), |f| f.flush())
    }
}

impl<'a> MakeWriter<'a> for LogFile {
    type Writer = LogFileGuard<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        LogFileGuard(self.0.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

// ============================================================================
// Runtime controls
// ============================================================================

type ReloadFn = Box<dyn Fn(EnvFilter) -> Result<(), reload::Error> + Send + Sync>;

/// Handles kept after initialization to adjust logging while running.
struct LogControls {
    /// Global level ceiling shared by every layer.
    level: ReloadFn,
    /// Per-layer gate for stderr: `trace` when shown, `off` when hidden.
    stderr: ReloadFn,
    file: FileCell,
}

static CONTROLS: OnceLock<LogControls> = OnceLock::new();

fn controls() -> Result<&'static LogControls> {
    CONTROLS
        .get()
        .ok_or_else(|| anyhow!("logging not yet initialized"))
}

/// `RUST_LOG` wins over the configured level; an invalid level falls back to `info`.
fn initial_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL))
}

/// Changes the active log filter at runtime.
///
/// Accepts a bare level (`warn`, `debug`, ...) or any `EnvFilter` directive
/// such as `calc_core=trace`.
pub fn set_log_level(level: &str) -> Result<()> {
    let filter =
        EnvFilter::try_new(level).with_context(|| format!("invalid log level '{level}'"))?;
    (controls()?.level)(filter).context("log level reload failed")
}

/// Shows or hides log output on stderr without affecting file logging.
pub fn set_stderr_enabled(enabled: bool) -> Result<()> {
    let gate = EnvFilter::new(if enabled { "trace" } else { "off" });
    (controls()?.stderr)(gate).context("stderr reload failed")
}

/// Starts appending log output to `path`, replacing any file already
/// attached. The directory must already exist.
pub fn enable_file_logging(path: &Path) -> Result<()> {
    let controls = controls()?;
    let file = File::options()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file '{}'", path.display()))?;

    *controls.file.lock().unwrap_or_else(PoisonError::into_inner) = Some(file);
    Ok(())
}

/// Installs the global subscriber. Later calls are no-ops.
///
/// - Stderr: colored when attached to a terminal, plain when piped.
/// - File: inactive until [`enable_file_logging`] is called.
/// - Level: `level`, unless `RUST_LOG` is set.
pub fn init_logging(level: &str) {
    let file: FileCell = Arc::new(Mutex::new(None));

    let (level_layer, level_handle) = reload::Layer::new(initial_filter(level));
    let (stderr_gate, stderr_handle) = reload::Layer::new(EnvFilter::new("trace"));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .event_format(CliFormat)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_filter(stderr_gate);
    let file_layer = tracing_subscriber::fmt::layer()
        .event_format(CliFormat)
        .with_ansi(false)
        .with_writer(LogFile(file.clone()));

    let installed = tracing_subscriber::registry()
        .with(level_layer)
        .with(stderr_layer)
        .with(file_layer)
        .try_init();

    if installed.is_ok() {
        let _ = CONTROLS.set(LogControls {
            level: Box::new(move |filter: EnvFilter| level_handle.reload(filter)),
            stderr: Box::new(move |filter: EnvFilter| stderr_handle.reload(filter)),
            file,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runtime_controls_after_init() {
        init_logging("warn");

        assert!(set_log_level("debug").is_ok());
        assert!(set_log_level("fincalc=loud").is_err());
        assert!(set_stderr_enabled(false).is_ok());
        assert!(set_stderr_enabled(true).is_ok());
        assert!(enable_file_logging(Path::new("/nonexistent-dir/fincalc.log")).is_err());
    }
}
