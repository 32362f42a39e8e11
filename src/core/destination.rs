//! Single-destination logger
//!
//! [`DestinationLogger`] owns one configuration, one threshold cell and one
//! output. Every call goes through the same steps: exclusion filter, level
//! check, formatting into a line buffer, and a single write to the output
//! while the logger's lock is held.

use super::error::{report_write_error, LoggerError, Result};
use super::exclude::Exclude;
use super::field::{FieldValue, Fields};
use super::log_level::{AtomicLevel, Level};
use super::logger::{Flushable, Location, Logger, OutputResettable, SinkAdapter};
use super::options::{Locker, LoggerOptions, TimeFn};
use super::output_format::{Event, OutputFormat};
use super::timestamp::TimestampFormat;
use super::writer::{LineWriter, Output};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// Separator placed between name segments by [`Logger::named`]
pub const NAME_SEPARATOR: &str = ".";

struct Settings {
    format: OutputFormat,
    include_location: bool,
    time_format: TimestampFormat,
    time_fn: TimeFn,
    disable_time: bool,
    exclude: Option<Arc<dyn Exclude>>,
    independent_levels: bool,
}

/// Output shared by a logger and all loggers derived from it
struct SharedOutput {
    locker: Arc<dyn Locker>,
    writer: Mutex<LineWriter>,
}

/// Logger writing to exactly one output.
///
/// Cheap to clone; clones and sub-loggers share the output, and share the
/// level cell unless the options asked for independent levels.
///
/// ```
/// use fanlog::{args, DestinationLogger, Level, Logger, LoggerOptions, Output};
/// use parking_lot::Mutex;
/// use std::sync::Arc;
///
/// let buf = Arc::new(Mutex::new(Vec::<u8>::new()));
/// let logger = DestinationLogger::new(
///     &LoggerOptions::new()
///         .with_output(Output::shared(Arc::clone(&buf)))
///         .with_disable_time(true),
/// );
///
/// logger.named("db").info("connected", args!["pool", 4]);
/// assert_eq!(String::from_utf8_lossy(&buf.lock()), "[INFO]  db: connected pool=4\n");
/// ```
#[derive(Clone)]
pub struct DestinationLogger {
    name: String,
    level: Arc<AtomicLevel>,
    implied: Fields,
    settings: Arc<Settings>,
    output: Arc<SharedOutput>,
}

impl DestinationLogger {
    pub fn new(opts: &LoggerOptions) -> Self {
        let locker: Arc<dyn Locker> = match &opts.mutex {
            Some(locker) => Arc::clone(locker),
            None => Arc::new(Mutex::new(())),
        };

        Self {
            name: opts.name.clone(),
            level: Arc::new(AtomicLevel::new(opts.effective_level())),
            implied: Fields::new(),
            settings: Arc::new(Settings {
                format: OutputFormat::from_json_flag(opts.json_format),
                include_location: opts.include_location,
                time_format: opts.time_format.clone(),
                time_fn: Arc::clone(&opts.time_fn),
                disable_time: opts.disable_time,
                exclude: opts.exclude.clone(),
                independent_levels: opts.independent_levels,
            }),
            output: Arc::new(SharedOutput {
                locker,
                writer: Mutex::new(LineWriter::new(opts.output.clone(), opts.color_mode())),
            }),
        }
    }

    /// Log and return any write error instead of reporting it on stderr.
    pub fn try_log(
        &self,
        location: Option<Location>,
        level: Level,
        msg: &str,
        args: &[FieldValue],
    ) -> Result<()> {
        if self.is_excluded(level, msg, args) {
            return Ok(());
        }
        self.write_admitted(&self.name, location, level, msg, args)
    }

    pub(crate) fn is_excluded(&self, level: Level, msg: &str, args: &[FieldValue]) -> bool {
        self.settings
            .exclude
            .as_ref()
            .is_some_and(|exclude| exclude.exclude(level, msg, args))
    }

    /// Everything after the exclusion filter: level check, format, write.
    pub(crate) fn write_admitted(
        &self,
        name: &str,
        location: Option<Location>,
        level: Level,
        msg: &str,
        args: &[FieldValue],
    ) -> Result<()> {
        if !self.level.admits(level) {
            return Ok(());
        }

        let fields = self.fields_with(args);
        let event = Event {
            time: (!self.settings.disable_time).then(|| (self.settings.time_fn)()),
            name,
            level,
            location: location.filter(|_| self.settings.include_location),
            message: msg,
            fields: &fields,
        };

        let _guard = self.output.locker.lock();
        let mut writer = self.output.writer.lock();
        let color = writer.color_mode();

        if let Err(e) = self.settings.format.render(
            &event,
            &self.settings.time_format,
            color,
            writer.buffer_mut(),
        ) {
            writer.discard();
            return Err(e);
        }

        writer.flush(level).map_err(|e| {
            LoggerError::io_operation("writing log event", format!("logger '{}'", name), e)
        })
    }

    /// Implied fields followed by the call-site fields
    pub(crate) fn fields_with(&self, args: &[FieldValue]) -> Fields {
        let mut fields = self.implied.clone();
        fields.extend_from_args(args);
        fields
    }

    fn derive(&self) -> Self {
        let mut child = self.clone();
        if self.settings.independent_levels {
            child.level = Arc::new(AtomicLevel::new(self.level.get()));
        }
        child
    }

    /// Concrete form of [`Logger::with`]
    pub fn with_args(&self, args: &[FieldValue]) -> Self {
        let mut child = self.derive();
        child.implied.extend_from_args(args);
        child
    }

    /// Concrete form of [`Logger::named`]
    pub fn named_child(&self, name: &str) -> Self {
        let mut child = self.derive();
        if child.name.is_empty() {
            child.name = name.to_string();
        } else {
            child.name = format!("{}{}{}", self.name, NAME_SEPARATOR, name);
        }
        child
    }

    /// Concrete form of [`Logger::reset_named`]
    pub fn reset_named_child(&self, name: &str) -> Self {
        let mut child = self.derive();
        child.name = name.to_string();
        child
    }

    /// The output currently written to, e.g. to flush it before a reset
    pub fn output(&self) -> Output {
        self.output.writer.lock().output().clone()
    }

    fn swap_output(&self, opts: &LoggerOptions, flushable: Option<&dyn Flushable>) -> Result<()> {
        let _guard = self.output.locker.lock();
        let mut writer = self.output.writer.lock();
        if let Some(flushable) = flushable {
            flushable.flush()?;
        }
        writer.reset(opts.output.clone(), opts.color_mode());
        Ok(())
    }
}

impl fmt::Debug for DestinationLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DestinationLogger")
            .field("name", &self.name)
            .field("level", &self.level.get())
            .field("implied", &self.implied)
            .field("format", &self.settings.format)
            .finish_non_exhaustive()
    }
}

impl Logger for DestinationLogger {
    fn log(&self, level: Level, msg: &str, args: &[FieldValue]) {
        if let Err(e) = self.try_log(None, level, msg, args) {
            report_write_error(&self.name, &e);
        }
    }

    fn log_at(&self, location: Location, level: Level, msg: &str, args: &[FieldValue]) {
        if let Err(e) = self.try_log(Some(location), level, msg, args) {
            report_write_error(&self.name, &e);
        }
    }

    fn level(&self) -> Level {
        self.level.get()
    }

    fn implied_args(&self) -> Vec<FieldValue> {
        self.implied.clone().into_args()
    }

    fn with(&self, args: &[FieldValue]) -> Arc<dyn Logger> {
        Arc::new(self.with_args(args))
    }

    fn name(&self) -> String {
        self.name.clone()
    }

    fn named(&self, name: &str) -> Arc<dyn Logger> {
        Arc::new(self.named_child(name))
    }

    fn reset_named(&self, name: &str) -> Arc<dyn Logger> {
        Arc::new(self.reset_named_child(name))
    }

    fn set_level(&self, level: Level) {
        self.level.set(level);
    }
}

impl SinkAdapter for DestinationLogger {
    fn accept(&self, name: &str, level: Level, msg: &str, args: &[FieldValue]) {
        if self.is_excluded(level, msg, args) {
            return;
        }
        if let Err(e) = self.write_admitted(name, None, level, msg, args) {
            report_write_error(name, &e);
        }
    }
}

impl OutputResettable for DestinationLogger {
    fn reset_output(&self, opts: &LoggerOptions) -> Result<()> {
        self.swap_output(opts, None)
    }

    fn reset_output_with_flush(
        &self,
        opts: &LoggerOptions,
        flushable: &dyn Flushable,
    ) -> Result<()> {
        self.swap_output(opts, Some(flushable))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;
    use crate::core::exclude::ExcludeByPrefix;

    fn capture(opts: LoggerOptions) -> (DestinationLogger, Arc<Mutex<Vec<u8>>>) {
        let buf = Arc::new(Mutex::new(Vec::<u8>::new()));
        let logger = DestinationLogger::new(
            &opts
                .with_output(Output::shared(Arc::clone(&buf)))
                .with_disable_time(true),
        );
        (logger, buf)
    }

    fn contents(buf: &Arc<Mutex<Vec<u8>>>) -> String {
        String::from_utf8_lossy(&buf.lock()).into_owned()
    }

    #[test]
    fn test_below_threshold_is_silent() {
        let (logger, buf) = capture(LoggerOptions::new().with_level(Level::Warn));
        logger.info("hidden", &[]);
        logger.warn("shown", &[]);
        assert_eq!(contents(&buf), "[WARN]  shown\n");
    }

    #[test]
    fn test_off_admits_nothing() {
        let (logger, buf) = capture(LoggerOptions::new().with_level(Level::Off));
        logger.error("nope", &[]);
        assert!(contents(&buf).is_empty());
        assert!(!logger.is_error());
    }

    #[test]
    fn test_exclude_runs_before_level() {
        let (logger, buf) = capture(
            LoggerOptions::new()
                .with_level(Level::Trace)
                .with_exclude(ExcludeByPrefix::new("noisy: ")),
        );
        logger.error("noisy: tick", &[]);
        logger.error("real", &[]);
        assert_eq!(contents(&buf), "[ERROR] real\n");
    }

    #[test]
    fn test_with_shadows_earlier_keys() {
        let (logger, buf) = capture(LoggerOptions::new());
        let child = logger.with_args(args!["k", "v1"]).with_args(args!["k", "v2"]);
        child.info("msg", &[]);
        assert_eq!(contents(&buf), "[INFO]  msg k=v2\n");
        assert_eq!(child.implied_args(), args!["k", "v2"].to_vec());
    }

    #[test]
    fn test_call_args_follow_implied() {
        let (logger, buf) = capture(LoggerOptions::new());
        logger
            .with_args(args!["request", 7])
            .info("msg", args!["user", "bob", "dangling"]);
        assert_eq!(
            contents(&buf),
            "[INFO]  msg request=7 user=bob dangling=MISSING_VALUE\n"
        );
    }

    #[test]
    fn test_named_appends_and_reset_replaces() {
        let (logger, _buf) = capture(LoggerOptions::new().with_name("agent"));
        let sub = logger.named_child("auth");
        assert_eq!(sub.name(), "agent.auth");
        assert_eq!(sub.named_child("jwt").name(), "agent.auth.jwt");
        assert_eq!(sub.reset_named_child("cache").name(), "cache");
    }

    #[test]
    fn test_shared_level_cell() {
        let (logger, _buf) = capture(LoggerOptions::new().with_level(Level::Info));
        let child = logger.with_args(args!["a", 1]);
        logger.set_level(Level::Debug);
        assert!(child.is_debug());
    }

    #[test]
    fn test_independent_level_cell() {
        let (logger, _buf) = capture(
            LoggerOptions::new()
                .with_level(Level::Info)
                .with_independent_levels(true),
        );
        let child = logger.with_args(args!["a", 1]);
        logger.set_level(Level::Debug);
        assert!(!child.is_debug());
        child.set_level(Level::Error);
        assert_eq!(logger.level(), Level::Debug);
    }

    #[test]
    fn test_location_only_when_enabled() {
        let (logger, buf) = capture(LoggerOptions::new().with_include_location(true));
        logger.log_at(Location::new("src/lib.rs", 9), Level::Info, "here", &[]);
        let (quiet, quiet_buf) = capture(LoggerOptions::new());
        quiet.log_at(Location::new("src/lib.rs", 9), Level::Info, "here", &[]);

        assert_eq!(contents(&buf), "[INFO]  src/lib.rs:9: here\n");
        assert_eq!(contents(&quiet_buf), "[INFO]  here\n");
    }

    #[test]
    fn test_write_error_is_returned() {
        struct Broken;
        impl std::io::Write for Broken {
            fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let logger = DestinationLogger::new(&LoggerOptions::new().with_output(Output::new(Broken)));
        let err = logger.try_log(None, Level::Error, "lost", &[]).unwrap_err();
        assert!(matches!(err, LoggerError::IoOperation { .. }));
    }

    #[test]
    fn test_reset_output_redirects_children() {
        let (logger, old) = capture(LoggerOptions::new());
        let child = logger.named_child("sub");
        let new = Arc::new(Mutex::new(Vec::<u8>::new()));

        logger
            .reset_output(&LoggerOptions::new().with_output(Output::shared(Arc::clone(&new))))
            .unwrap();
        child.info("after", &[]);

        assert!(contents(&old).is_empty());
        assert_eq!(contents(&new), "[INFO]  sub: after\n");
    }
}
