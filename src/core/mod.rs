//! Core logger types and traits

pub mod destination;
pub mod error;
pub mod exclude;
pub mod fanout;
pub mod field;
pub mod global;
pub mod intercept;
pub mod log_level;
pub mod logger;
pub mod null_logger;
pub mod options;
pub mod output_format;
pub mod timestamp;
pub mod writer;

pub use destination::{DestinationLogger, NAME_SEPARATOR};
pub use error::{LoggerError, Result};
pub use exclude::{Exclude, ExcludeByMessage, ExcludeByPrefix, ExcludeByRegex, ExcludeFuncs};
pub use fanout::FanoutLogger;
pub use field::{FieldValue, Fields, MISSING_VALUE};
pub use global::{default, l, set_default, set_default_options};
pub use intercept::InterceptingLogger;
pub use log_level::{AtomicLevel, Level};
pub use logger::{
    Flushable, InterceptLogger, Location, Logger, OutputResettable, SinkAdapter,
};
pub use null_logger::NullLogger;
pub use options::{ColorOption, Locker, LockerGuard, LoggerOptions, NoopLocker, TimeFn};
pub use output_format::OutputFormat;
pub use timestamp::TimestampFormat;
pub use writer::{paint, ColorMode, LevelWrite, LeveledWriter, LineWriter, Output};
