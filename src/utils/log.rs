//! Logging setup, and utilities to help with logging.
//!
//! Every line goes to both the console and the log file, formatted as
//! `2024-05-01 09:30:00,123 WARNING  macOS updates are pending`.

use std::fmt::{self, Write as _};
use std::fs::File;
use std::io::{self, Write as _};
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use chrono::Local;
use color_eyre::Result;
use console::Style;
use tracing::field::{Field, Visit};
use tracing::level_filters::LevelFilter;
use tracing::{Dispatch, Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

use crate::errors::UpdateError;
use crate::utils::files;

/**
Equivalent of `::log::log!()` for the tracing crate.

Refs: <https://github.com/tokio-rs/tracing/issues/2730#issuecomment-1943022805>
*/
#[macro_export]
macro_rules! log {
    ($lvl:ident, $($arg:tt)+) => {
        match $lvl {
            ::tracing::Level::TRACE => ::tracing::trace!($($arg)+),
            ::tracing::Level::DEBUG => ::tracing::debug!($($arg)+),
            ::tracing::Level::INFO => ::tracing::info!($($arg)+),
            ::tracing::Level::WARN => ::tracing::warn!($($arg)+),
            ::tracing::Level::ERROR => ::tracing::error!($($arg)+),
        }
    };
}

/// Event field that picks the console colour of a non-warning line.
pub const HIGHLIGHT: &str = "highlight";
/// `highlight` value for milestones, shown in green.
pub const SUCCESS: &str = "success";
/// `highlight` value for the final summary, shown in cyan.
pub const SUMMARY: &str = "summary";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// How to set up the log sinks.
#[derive(Debug, Clone)]
pub struct LogOptions {
    /// File that receives a copy of every log line. Truncated on init.
    pub log_file: Utf8PathBuf,
    /// Most verbose level shown on the console.
    pub console_level: LevelFilter,
    /// Most verbose level written to the log file.
    pub file_level: LevelFilter,
    /// Whether to colour console lines.
    pub color: bool,
}

/**
The logging sinks for one run.

Nothing is installed globally: callers enter [`LogContext::dispatch`] on the threads that should
log (see [`tracing::dispatcher::set_default`]), and call [`LogContext::finish`] before exiting.
*/
#[derive(Debug)]
pub struct LogContext {
    dispatch: Dispatch,
    file: Arc<File>,
    path: Utf8PathBuf,
}

impl LogContext {
    /// Create the log file (and its parent directories) and configure the console and file
    /// sinks.
    pub fn init(options: &LogOptions) -> Result<Self> {
        let path = options.log_file.clone();
        files::create_dir_all(files::parent(&path)?)?;
        // File::create truncates the log of any previous run.
        let file = File::create(&path).map_err(|source| UpdateError::LogFile {
            path: path.clone(),
            source,
        })?;
        let file = Arc::new(file);

        let console_layer = tracing_subscriber::fmt::layer()
            .event_format(LineFormat {
                ansi: options.color,
            })
            .with_writer(io::stdout)
            .with_filter(options.console_level);
        let file_layer = tracing_subscriber::fmt::layer()
            .event_format(LineFormat { ansi: false })
            .with_writer(Arc::clone(&file))
            .with_filter(options.file_level);

        let subscriber = tracing_subscriber::registry()
            .with(console_layer)
            .with(file_layer);

        Ok(Self {
            dispatch: Dispatch::new(subscriber),
            file,
            path,
        })
    }

    /// The dispatcher to enter on every thread that logs for this run.
    pub const fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    /// Where the log file was written.
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Flush the log file to disk.
    pub fn finish(self) -> Result<(), UpdateError> {
        let flush_error = |source| UpdateError::LogFlush {
            path: self.path.clone(),
            source,
        };
        (&*self.file).flush().map_err(flush_error)?;
        self.file.sync_all().map_err(flush_error)
    }
}

/// Writes `{timestamp} {LEVEL:<8} {message}` lines, optionally coloured.
#[derive(Debug, Clone, Copy)]
struct LineFormat {
    ansi: bool,
}

impl<S, N> FormatEvent<S, N> for LineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let mut visitor = LineVisitor::default();
        event.record(&mut visitor);
        let level = *event.metadata().level();

        let line = format!(
            "{timestamp} {level:<8} {message}{fields}",
            timestamp = Local::now().format(TIMESTAMP_FORMAT),
            level = level_name(level),
            message = visitor.message,
            fields = visitor.fields,
        );

        match line_style(level, visitor.highlight.as_deref()).filter(|_| self.ansi) {
            Some(style) => writeln!(writer, "{}", style.apply_to(line)),
            None => writeln!(writer, "{line}"),
        }
    }
}

/// Collects the message, the highlight, and any other fields of an event.
#[derive(Debug, Default)]
struct LineVisitor {
    message: String,
    fields: String,
    highlight: Option<String>,
}

impl Visit for LineVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            HIGHLIGHT => self.highlight = Some(value.to_owned()),
            "message" => self.message.push_str(value),
            name => {
                let _ = write!(self.fields, " {name}={value}");
            }
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
        } else {
            let _ = write!(self.fields, " {}={value:?}", field.name());
        }
    }
}

fn level_name(level: Level) -> &'static str {
    match level {
        Level::WARN => "WARNING",
        other => other.as_str(),
    }
}

/// Red for warnings and errors, green for milestones, cyan for the summary.
fn line_style(level: Level, highlight: Option<&str>) -> Option<Style> {
    let style = Style::new().force_styling(true);
    if level <= Level::WARN {
        return Some(style.red());
    }
    match highlight {
        Some(SUCCESS) => Some(style.green()),
        Some(SUMMARY) => Some(style.cyan()),
        _ => None,
    }
}
