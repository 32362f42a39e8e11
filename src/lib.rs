//! # fanlog
//!
//! Leveled, structured logging with fan-out to several destinations.
//!
//! ## Features
//!
//! - **Structured events**: a message plus key/value pairs, rendered as
//!   text lines or JSON objects
//! - **Exclusion filters**: drop noisy events before any formatting or I/O
//! - **Fan-out**: one call, many independently configured destinations
//! - **Sinks**: observers that see every event regardless of level
//! - **Runtime reconfiguration**: change levels and swap outputs safely
//!   while other threads log
//!
//! ```
//! use fanlog::prelude::*;
//!
//! let logger = FanoutLogger::new(&[
//!     LoggerOptions::new().with_name("agent").with_level(Level::Info),
//!     LoggerOptions::new()
//!         .with_name("agent")
//!         .with_level(Level::Debug)
//!         .with_json_format(true)
//!         .with_output(Output::new(std::io::sink())),
//! ])?;
//!
//! logger.with(args!["node", "n1"]).info("started", args!["version", "1.4.2"]);
//! # Ok::<(), LoggerError>(())
//! ```

pub mod core;
pub mod macros;
pub mod outputs;

pub mod prelude {
    pub use crate::core::{
        ColorOption, DestinationLogger, Exclude, ExcludeByMessage, ExcludeByPrefix,
        ExcludeByRegex, ExcludeFuncs, FanoutLogger, FieldValue, Flushable, InterceptLogger,
        InterceptingLogger, Level, Location, Logger, LoggerError, LoggerOptions, NullLogger,
        Output, OutputResettable, Result, SinkAdapter, TimestampFormat,
    };
    pub use crate::args;
}

pub use crate::core::{
    default, l, paint, set_default, set_default_options, AtomicLevel, ColorMode, ColorOption,
    DestinationLogger, Exclude, ExcludeByMessage, ExcludeByPrefix, ExcludeByRegex, ExcludeFuncs,
    FanoutLogger, FieldValue, Fields, Flushable, InterceptLogger, InterceptingLogger, Level,
    LevelWrite, LeveledWriter, LineWriter, Location, Locker, LockerGuard, Logger, LoggerError,
    LoggerOptions, NoopLocker, NullLogger, Output, OutputFormat, OutputResettable, Result,
    SinkAdapter, TimeFn, TimestampFormat, MISSING_VALUE, NAME_SEPARATOR,
};
