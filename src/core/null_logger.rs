//! A logger that discards everything

use super::error::Result;
use super::field::FieldValue;
use super::log_level::Level;
use super::logger::{Flushable, Logger, OutputResettable, SinkAdapter};
use super::options::LoggerOptions;
use std::sync::Arc;

/// Accepts every call and writes nothing. Useful as a placeholder where a
/// logger is required but output is not wanted, e.g. in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLogger;

impl NullLogger {
    pub fn new() -> Self {
        NullLogger
    }
}

impl Logger for NullLogger {
    fn log(&self, _level: Level, _msg: &str, _args: &[FieldValue]) {}

    fn level(&self) -> Level {
        Level::Off
    }

    fn is_enabled(&self, _level: Level) -> bool {
        false
    }

    fn implied_args(&self) -> Vec<FieldValue> {
        Vec::new()
    }

    fn with(&self, _args: &[FieldValue]) -> Arc<dyn Logger> {
        Arc::new(NullLogger)
    }

    fn name(&self) -> String {
        String::new()
    }

    fn named(&self, _name: &str) -> Arc<dyn Logger> {
        Arc::new(NullLogger)
    }

    fn reset_named(&self, _name: &str) -> Arc<dyn Logger> {
        Arc::new(NullLogger)
    }

    fn set_level(&self, _level: Level) {}
}

impl SinkAdapter for NullLogger {
    fn accept(&self, _name: &str, _level: Level, _msg: &str, _args: &[FieldValue]) {}
}

impl OutputResettable for NullLogger {
    fn reset_output(&self, _opts: &LoggerOptions) -> Result<()> {
        Ok(())
    }

    fn reset_output_with_flush(
        &self,
        _opts: &LoggerOptions,
        _flushable: &dyn Flushable,
    ) -> Result<()> {
        Ok(())
    }
}
