//! Views of a [`Logger`] for code that only speaks unstructured logging
//!
//! - [`StandardWriter`]: an [`io::Write`] sink; every line written becomes
//!   one event, with the level taken from a `[LEVEL]` prefix or forced.
//! - `LogBridge` (feature `log-bridge`): a `log::Log` implementation so
//!   records from the `log` facade reach a logger of this crate.

#[cfg(feature = "log-bridge")]
use crate::core::error::{LoggerError, Result};
#[cfg(feature = "log-bridge")]
use crate::core::field::FieldValue;
#[cfg(feature = "log-bridge")]
use crate::core::global;
use crate::core::log_level::Level;
#[cfg(feature = "log-bridge")]
use crate::core::logger::Location;
use crate::core::logger::Logger;
use regex::Regex;
use std::io;
use std::sync::{Arc, OnceLock};

/// How a [`StandardWriter`] assigns levels to the lines it receives
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StandardLoggerOptions {
    /// Read the level from a leading `[TRACE]`, `[DEBUG]`, `[INFO]`,
    /// `[WARN]`/`[WARNING]` or `[ERR]`/`[ERROR]` marker
    pub infer_levels: bool,

    /// Like `infer_levels`, but skip a leading timestamp such as
    /// `2025/01/08 10:30:45` before looking for the marker
    pub infer_levels_with_timestamp: bool,

    /// Log every line at this level; `NoLevel` leaves the choice to the
    /// other options, falling back to `Info`
    pub force_level: Level,
}

impl StandardLoggerOptions {
    pub fn inferring() -> Self {
        Self {
            infer_levels: true,
            ..Self::default()
        }
    }

    pub fn forced(level: Level) -> Self {
        Self {
            force_level: level,
            ..Self::default()
        }
    }
}

fn timestamp_prefix() -> Option<&'static Regex> {
    static PREFIX: OnceLock<Option<Regex>> = OnceLock::new();
    PREFIX
        .get_or_init(|| {
            Regex::new(r"^\d{4}[/-]\d{2}[/-]\d{2}[ T]\d{2}:\d{2}:\d{2}(\.\d+)?(Z|[+-]\d{2}:?\d{2})?\s+").ok()
        })
        .as_ref()
}

/// Split a `[LEVEL] message` line into its level and the message.
fn split_level(line: &str) -> (Level, &str) {
    const MARKERS: [(&str, Level); 7] = [
        ("[TRACE]", Level::Trace),
        ("[DEBUG]", Level::Debug),
        ("[INFO]", Level::Info),
        ("[WARN]", Level::Warn),
        ("[WARNING]", Level::Warn),
        ("[ERROR]", Level::Error),
        ("[ERR]", Level::Error),
    ];

    MARKERS
        .iter()
        .find_map(|(marker, level)| {
            line.strip_prefix(marker)
                .map(|rest| (*level, rest.trim_start()))
        })
        .unwrap_or((Level::Info, line))
}

/// `io::Write` front for a logger; each complete line is one event.
///
/// A trailing partial line is held until its newline arrives, or until
/// [`flush`](io::Write::flush) or drop.
///
/// ```
/// use fanlog::outputs::{StandardLoggerOptions, StandardWriter};
/// use fanlog::{Logger, NullLogger};
/// use std::io::Write;
/// use std::sync::Arc;
///
/// let mut writer = StandardWriter::new(Arc::new(NullLogger), StandardLoggerOptions::inferring());
/// writeln!(writer, "[WARN] cache nearly full").unwrap();
/// ```
pub struct StandardWriter {
    logger: Arc<dyn Logger>,
    opts: StandardLoggerOptions,
    // bytes after the last newline; may end inside a multi-byte character
    pending: Vec<u8>,
}

impl StandardWriter {
    pub fn new(logger: Arc<dyn Logger>, opts: StandardLoggerOptions) -> Self {
        Self {
            logger,
            opts,
            pending: Vec::new(),
        }
    }

    fn dispatch(&self, line: &str) {
        let line = line.trim_end_matches([' ', '\t', '\r']);
        if line.is_empty() {
            return;
        }

        if self.opts.force_level != Level::NoLevel {
            self.logger.log(self.opts.force_level, line, &[]);
            return;
        }

        let mut text = line;
        if self.opts.infer_levels_with_timestamp {
            if let Some(m) = timestamp_prefix().and_then(|re| re.find(text)) {
                text = &text[m.end()..];
            }
        }

        if self.opts.infer_levels || self.opts.infer_levels_with_timestamp {
            let (level, msg) = split_level(text);
            self.logger.log(level, msg, &[]);
        } else {
            self.logger.log(Level::Info, line, &[]);
        }
    }
}

impl io::Write for StandardWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        while let Some(end) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=end).collect();
            self.dispatch(&String::from_utf8_lossy(&line[..end]));
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if !self.pending.is_empty() {
            let line = std::mem::take(&mut self.pending);
            self.dispatch(&String::from_utf8_lossy(&line));
        }
        Ok(())
    }
}

impl Drop for StandardWriter {
    fn drop(&mut self) {
        let _ = io::Write::flush(self);
    }
}

#[cfg(feature = "log-bridge")]
fn from_log_level(level: log::Level) -> Level {
    match level {
        log::Level::Error => Level::Error,
        log::Level::Warn => Level::Warn,
        log::Level::Info => Level::Info,
        log::Level::Debug => Level::Debug,
        log::Level::Trace => Level::Trace,
    }
}

/// Forwards records of the `log` facade to a [`Logger`].
///
/// Without an explicit logger, records go to the process-wide default
/// logger as it is at the time of each record.
#[cfg(feature = "log-bridge")]
#[derive(Clone, Default)]
pub struct LogBridge {
    logger: Option<Arc<dyn Logger>>,
}

#[cfg(feature = "log-bridge")]
impl LogBridge {
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self {
            logger: Some(logger),
        }
    }

    /// Bridge to whatever [`global::default`] returns
    pub fn to_default() -> Self {
        Self { logger: None }
    }

    fn target(&self) -> Arc<dyn Logger> {
        match &self.logger {
            Some(logger) => Arc::clone(logger),
            None => global::default(),
        }
    }

    /// Install as the `log` crate's global logger and set its max level.
    ///
    /// Fails if a `log` logger is already installed.
    pub fn install(self, max_level: log::LevelFilter) -> Result<()> {
        log::set_boxed_logger(Box::new(self))
            .map_err(|e| LoggerError::config("LogBridge", e.to_string()))?;
        log::set_max_level(max_level);
        Ok(())
    }
}

#[cfg(feature = "log-bridge")]
impl log::Log for LogBridge {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        self.target().is_enabled(from_log_level(metadata.level()))
    }

    fn log(&self, record: &log::Record<'_>) {
        let logger = self.target();
        let level = from_log_level(record.level());

        let msg = record.args().to_string();
        let mut args = Vec::new();
        if record.module_path() != Some(record.target()) {
            args.push(FieldValue::from("target"));
            args.push(FieldValue::from(record.target()));
        }

        match (record.file_static(), record.line()) {
            (Some(file), Some(line)) => logger.log_at(Location::new(file, line), level, &msg, &args),
            _ => logger.log(level, &msg, &args),
        }
    }

    fn flush(&self) {}
}
