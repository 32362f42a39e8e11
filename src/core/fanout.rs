//! Fan-out dispatcher
//!
//! A [`FanoutLogger`] replicates every call across a fixed-order set of
//! [`DestinationLogger`]s, one per [`LoggerOptions`] it was built from.

use super::destination::DestinationLogger;
use super::error::{report_write_error, LoggerError, Result};
use super::field::FieldValue;
use super::log_level::Level;
use super::logger::{Flushable, Location, Logger, OutputResettable, SinkAdapter};
use super::options::LoggerOptions;
use parking_lot::RwLock;
use std::sync::Arc;

type Members = Arc<[DestinationLogger]>;

/// Logger that sends each event to several independently configured
/// destinations.
///
/// The member set lives behind a lock as an immutable snapshot. A dispatch
/// clones the snapshot and works on it, so a concurrent [`Logger::with`] or
/// [`Logger::named`] is seen either completely or not at all.
///
/// `with`, `named` and `reset_named` replace the member set of this
/// dispatcher (and of every clone sharing it) and return a handle to it.
#[derive(Clone)]
pub struct FanoutLogger {
    members: Arc<RwLock<Members>>,
}

impl FanoutLogger {
    pub fn new(options: &[LoggerOptions]) -> Result<Self> {
        if options.is_empty() {
            return Err(LoggerError::EmptyFanout);
        }
        let members: Members = options.iter().map(DestinationLogger::new).collect();
        Ok(Self::from_members(members))
    }

    fn from_members(members: Members) -> Self {
        Self {
            members: Arc::new(RwLock::new(members)),
        }
    }

    /// Current member set, in construction order
    pub fn members(&self) -> Arc<[DestinationLogger]> {
        Arc::clone(&self.members.read())
    }

    /// Log on every member; all members are attempted and the first error
    /// is returned.
    pub fn try_log(
        &self,
        location: Option<Location>,
        level: Level,
        msg: &str,
        args: &[FieldValue],
    ) -> Result<()> {
        let members = self.members();
        let mut first_err = None;
        for member in members.iter() {
            if let Err(e) = member.try_log(location, level, msg, args) {
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    fn replace_members<F>(&self, f: F)
    where
        F: Fn(&DestinationLogger) -> DestinationLogger,
    {
        let mut members = self.members.write();
        let updated: Members = members.iter().map(f).collect();
        *members = updated;
    }

    fn each_member<F>(&self, f: F) -> Result<()>
    where
        F: Fn(&DestinationLogger) -> Result<()>,
    {
        let members = self.members();
        let mut first_err = None;
        for member in members.iter() {
            if let Err(e) = f(member) {
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    fn first_name(&self) -> String {
        self.members().first().map(Logger::name).unwrap_or_default()
    }

    fn report(&self, err: &LoggerError) {
        report_write_error(&self.first_name(), err);
    }
}

impl std::fmt::Debug for FanoutLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FanoutLogger")
            .field("members", &self.members())
            .finish()
    }
}

impl Logger for FanoutLogger {
    fn log(&self, level: Level, msg: &str, args: &[FieldValue]) {
        if let Err(e) = self.try_log(None, level, msg, args) {
            self.report(&e);
        }
    }

    fn log_at(&self, location: Location, level: Level, msg: &str, args: &[FieldValue]) {
        if let Err(e) = self.try_log(Some(location), level, msg, args) {
            self.report(&e);
        }
    }

    /// The most verbose threshold among the members
    fn level(&self) -> Level {
        self.members()
            .iter()
            .map(Logger::level)
            .min()
            .unwrap_or(Level::Off)
    }

    /// True if at least one member would write an event at `level`
    fn is_enabled(&self, level: Level) -> bool {
        self.members().iter().any(|member| member.is_enabled(level))
    }

    fn implied_args(&self) -> Vec<FieldValue> {
        self.members()
            .first()
            .map(Logger::implied_args)
            .unwrap_or_default()
    }

    fn with(&self, args: &[FieldValue]) -> Arc<dyn Logger> {
        self.replace_members(|member| member.with_args(args));
        Arc::new(self.clone())
    }

    fn name(&self) -> String {
        self.first_name()
    }

    fn named(&self, name: &str) -> Arc<dyn Logger> {
        self.replace_members(|member| member.named_child(name));
        Arc::new(self.clone())
    }

    fn reset_named(&self, name: &str) -> Arc<dyn Logger> {
        self.replace_members(|member| member.reset_named_child(name));
        Arc::new(self.clone())
    }

    fn set_level(&self, level: Level) {
        for member in self.members().iter() {
            member.set_level(level);
        }
    }
}

impl SinkAdapter for FanoutLogger {
    fn accept(&self, name: &str, level: Level, msg: &str, args: &[FieldValue]) {
        for member in self.members().iter() {
            member.accept(name, level, msg, args);
        }
    }
}

impl OutputResettable for FanoutLogger {
    fn reset_output(&self, opts: &LoggerOptions) -> Result<()> {
        self.each_member(|member| member.reset_output(opts))
    }

    fn reset_output_with_flush(
        &self,
        opts: &LoggerOptions,
        flushable: &dyn Flushable,
    ) -> Result<()> {
        self.each_member(|member| member.reset_output_with_flush(opts, flushable))
    }
}
