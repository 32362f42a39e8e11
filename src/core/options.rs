//! Logger configuration
//!
//! [`LoggerOptions`] is the only configuration surface of a logger. It is
//! built once, handed to a constructor, and never consulted again except
//! by `reset_output`, which reads the output and color settings from a
//! fresh set of options.

use super::exclude::Exclude;
use super::log_level::Level;
use super::timestamp::TimestampFormat;
use super::writer::{ColorMode, Output};
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;

/// Source of event timestamps
pub type TimeFn = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// How output should be colored, if at all
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorOption {
    /// No color codes are written
    #[default]
    Off,
    /// Color only when the output is a terminal
    Auto,
    /// Always color
    Force,
}

trait Held {}
impl<T> Held for T {}

/// Proof that a [`Locker`] is held; releases it when dropped.
pub struct LockerGuard<'a>(#[allow(dead_code)] Option<Box<dyn Held + 'a>>);

impl<'a> LockerGuard<'a> {
    /// A guard for a locker that does not lock anything
    pub fn unlocked() -> Self {
        LockerGuard(None)
    }

    /// Keep `guard` alive for as long as this guard lives
    pub fn holding<G: 'a>(guard: G) -> Self {
        LockerGuard(Some(Box::new(guard)))
    }
}

/// Lock taken around every format-and-write of a logger.
///
/// Supply one in [`LoggerOptions::mutex`] when several loggers share an
/// output and their lines must not interleave. Without one, each logger
/// family gets a private lock.
pub trait Locker: Send + Sync {
    fn lock(&self) -> LockerGuard<'_>;
}

impl Locker for parking_lot::Mutex<()> {
    fn lock(&self) -> LockerGuard<'_> {
        LockerGuard::holding(parking_lot::Mutex::lock(self))
    }
}

/// A locker that does nothing, for callers that serialize output themselves.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLocker;

impl Locker for NoopLocker {
    fn lock(&self) -> LockerGuard<'_> {
        LockerGuard::unlocked()
    }
}

/// Configuration for a single-destination logger.
#[derive(Clone)]
pub struct LoggerOptions {
    /// Name of the subsystem to prefix logs with
    pub name: String,

    /// Threshold; anything less severe is suppressed. `NoLevel` means `Info`.
    pub level: Level,

    /// Where to write the logs to. Defaults to stderr.
    pub output: Output,

    /// Optional lock shared with other loggers writing to the same output
    pub mutex: Option<Arc<dyn Locker>>,

    /// Render events as JSON objects instead of text lines
    pub json_format: bool,

    /// Include the call site captured by the logging macros
    pub include_location: bool,

    /// Stack levels to skip when resolving the call site. Call sites come
    /// from macro expansion, so this is only carried for compatibility.
    pub additional_location_offset: usize,

    pub time_format: TimestampFormat,

    pub time_fn: TimeFn,

    /// Leave the timestamp out entirely
    pub disable_time: bool,

    pub color: ColorOption,

    /// Only color the `[LEVEL]` header, not the whole line
    pub color_header_only: bool,

    /// Color the header and the field keys
    pub color_header_and_fields: bool,

    /// Events for which this returns `true` are dropped before any work
    pub exclude: Option<Arc<dyn Exclude>>,

    /// Give sub-loggers their own copy of the level instead of sharing it
    pub independent_levels: bool,
}

impl Default for LoggerOptions {
    fn default() -> Self {
        Self {
            name: String::new(),
            level: Level::DEFAULT,
            output: Output::stderr(),
            mutex: None,
            json_format: false,
            include_location: false,
            additional_location_offset: 0,
            time_format: TimestampFormat::default(),
            time_fn: Arc::new(Utc::now),
            disable_time: false,
            color: ColorOption::Off,
            color_header_only: false,
            color_header_and_fields: false,
            exclude: None,
            independent_levels: false,
        }
    }
}

impl fmt::Debug for LoggerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerOptions")
            .field("name", &self.name)
            .field("level", &self.level)
            .field("output", &self.output)
            .field("mutex", &self.mutex.is_some())
            .field("json_format", &self.json_format)
            .field("include_location", &self.include_location)
            .field("time_format", &self.time_format)
            .field("disable_time", &self.disable_time)
            .field("color", &self.color)
            .field("exclude", &self.exclude.is_some())
            .field("independent_levels", &self.independent_levels)
            .finish_non_exhaustive()
    }
}

impl LoggerOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_output(mut self, output: Output) -> Self {
        self.output = output;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_mutex(mut self, mutex: Arc<dyn Locker>) -> Self {
        self.mutex = Some(mutex);
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_json_format(mut self, json: bool) -> Self {
        self.json_format = json;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_include_location(mut self, include: bool) -> Self {
        self.include_location = include;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_time_format(mut self, format: TimestampFormat) -> Self {
        self.time_format = format;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_time_fn(mut self, time_fn: TimeFn) -> Self {
        self.time_fn = time_fn;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_disable_time(mut self, disable: bool) -> Self {
        self.disable_time = disable;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_color(mut self, color: ColorOption) -> Self {
        self.color = color;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_color_header_only(mut self, enabled: bool) -> Self {
        self.color_header_only = enabled;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_color_header_and_fields(mut self, enabled: bool) -> Self {
        self.color_header_and_fields = enabled;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_exclude(mut self, exclude: impl Exclude + 'static) -> Self {
        self.exclude = Some(Arc::new(exclude));
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_independent_levels(mut self, independent: bool) -> Self {
        self.independent_levels = independent;
        self
    }

    /// Threshold with the unset sentinel replaced by the default
    pub(crate) fn effective_level(&self) -> Level {
        match self.level {
            Level::NoLevel => Level::DEFAULT,
            level => level,
        }
    }

    /// Resolve the color settings against the configured output
    pub(crate) fn color_mode(&self) -> ColorMode {
        let enabled = match self.color {
            ColorOption::Off => false,
            ColorOption::Force => true,
            ColorOption::Auto => self.output.is_terminal(),
        };
        if !enabled || self.json_format {
            ColorMode::Off
        } else if self.color_header_and_fields {
            ColorMode::HeaderAndFields
        } else if self.color_header_only {
            ColorMode::Header
        } else {
            ColorMode::Line
        }
    }
}
