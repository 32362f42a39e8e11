//! The logger contract and the capabilities around it

use super::error::Result;
use super::field::FieldValue;
use super::log_level::Level;
use super::options::LoggerOptions;
use std::fmt;
use std::sync::Arc;

/// Source location of a logging call, captured by the logging macros.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub file: &'static str,
    pub line: u32,
}

impl Location {
    pub const fn new(file: &'static str, line: u32) -> Self {
        Self { file, line }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// Interface implemented by every logger in this crate.
///
/// `args` is a flat list of alternating keys and values; see
/// [`Fields`](super::field::Fields) for how it is paired up.
pub trait Logger: Send + Sync {
    /// Emit a message and key/value pairs at the given level
    fn log(&self, level: Level, msg: &str, args: &[FieldValue]);

    /// Same as [`Logger::log`], with the call site attached
    fn log_at(&self, location: Location, level: Level, msg: &str, args: &[FieldValue]) {
        let _ = location;
        self.log(level, msg, args);
    }

    fn trace(&self, msg: &str, args: &[FieldValue]) {
        self.log(Level::Trace, msg, args);
    }

    fn debug(&self, msg: &str, args: &[FieldValue]) {
        self.log(Level::Debug, msg, args);
    }

    fn info(&self, msg: &str, args: &[FieldValue]) {
        self.log(Level::Info, msg, args);
    }

    fn warn(&self, msg: &str, args: &[FieldValue]) {
        self.log(Level::Warn, msg, args);
    }

    fn error(&self, msg: &str, args: &[FieldValue]) {
        self.log(Level::Error, msg, args);
    }

    /// Current threshold
    fn level(&self) -> Level;

    /// Whether an event at `level` would be written. Lets callers skip
    /// building expensive arguments.
    fn is_enabled(&self, level: Level) -> bool {
        level.admitted_by(self.level())
    }

    fn is_trace(&self) -> bool {
        self.is_enabled(Level::Trace)
    }

    fn is_debug(&self) -> bool {
        self.is_enabled(Level::Debug)
    }

    fn is_info(&self) -> bool {
        self.is_enabled(Level::Info)
    }

    fn is_warn(&self) -> bool {
        self.is_enabled(Level::Warn)
    }

    fn is_error(&self) -> bool {
        self.is_enabled(Level::Error)
    }

    /// Key/value pairs attached to every event, as a flat list
    fn implied_args(&self) -> Vec<FieldValue>;

    /// Sub-logger that attaches `args` to every event
    fn with(&self, args: &[FieldValue]) -> Arc<dyn Logger>;

    fn name(&self) -> String;

    /// Sub-logger whose name is the current name extended by `name`
    fn named(&self, name: &str) -> Arc<dyn Logger>;

    /// Sub-logger whose name is exactly `name`
    fn reset_named(&self, name: &str) -> Arc<dyn Logger>;

    /// Change the threshold. Loggers sharing the level cell see the change too.
    fn set_level(&self, level: Level);
}

/// An observer that receives a copy of every admitted event.
pub trait SinkAdapter: Send + Sync {
    fn accept(&self, name: &str, level: Level, msg: &str, args: &[FieldValue]);
}

/// A logger that also forwards its events to registered sinks.
///
/// A sink must not register or deregister sinks from inside its own
/// [`SinkAdapter::accept`]; such calls are rejected with
/// [`LoggerError::ReentrantSinkMutation`](super::error::LoggerError::ReentrantSinkMutation).
pub trait InterceptLogger: Logger {
    fn register_sink(&self, sink: Arc<dyn SinkAdapter>) -> Result<()>;

    /// Remove `sink` by identity; unknown sinks are ignored
    fn deregister_sink(&self, sink: &Arc<dyn SinkAdapter>) -> Result<()>;

    fn named_intercept(&self, name: &str) -> Arc<dyn InterceptLogger>;

    fn reset_named_intercept(&self, name: &str) -> Arc<dyn InterceptLogger>;
}

/// Something holding buffered bytes that can be pushed out on demand.
pub trait Flushable {
    fn flush(&self) -> Result<()>;
}

/// Loggers whose output can be replaced at runtime.
pub trait OutputResettable {
    /// Swap in `opts.output`, using the color settings from `opts`.
    fn reset_output(&self, opts: &LoggerOptions) -> Result<()>;

    /// Flush `flushable` (normally the old output) and then swap in
    /// `opts.output`. If the flush fails the old output stays in place.
    fn reset_output_with_flush(&self, opts: &LoggerOptions, flushable: &dyn Flushable)
        -> Result<()>;
}
