//! Intercepting logger: a primary destination plus a registry of sinks
//!
//! Every event that passes the primary's exclusion filter is written to the
//! primary (subject to its threshold) and then handed to each registered
//! [`SinkAdapter`] in registration order, whatever the primary's threshold.

use super::destination::DestinationLogger;
use super::error::{report_write_error, LoggerError, Result};
use super::field::FieldValue;
use super::log_level::Level;
use super::logger::{
    Flushable, InterceptLogger, Location, Logger, OutputResettable, SinkAdapter,
};
use super::options::LoggerOptions;
use parking_lot::RwLock;
use std::cell::RefCell;
use std::sync::Arc;

type Sinks = Arc<[Arc<dyn SinkAdapter>]>;

thread_local! {
    // registries currently delivering an event on this thread
    static DISPATCHING: RefCell<Vec<usize>> = const { RefCell::new(Vec::new()) };
}

/// Marks a registry as dispatching on the current thread until dropped.
struct DispatchGuard {
    registry: usize,
}

impl DispatchGuard {
    fn enter(registry: usize) -> Self {
        DISPATCHING.with(|active| active.borrow_mut().push(registry));
        Self { registry }
    }

    fn is_active(registry: usize) -> bool {
        DISPATCHING.with(|active| active.borrow().contains(&registry))
    }
}

impl Drop for DispatchGuard {
    fn drop(&mut self) {
        DISPATCHING.with(|active| {
            let mut active = active.borrow_mut();
            if let Some(pos) = active.iter().rposition(|id| *id == self.registry) {
                active.remove(pos);
            }
        });
    }
}

/// Copy-on-write list of sinks shared by a logger and its sub-loggers
struct SinkRegistry {
    sinks: RwLock<Sinks>,
}

impl SinkRegistry {
    fn new() -> Self {
        Self {
            sinks: RwLock::new(Arc::from(Vec::new())),
        }
    }

    fn id(self: &Arc<Self>) -> usize {
        Arc::as_ptr(self) as usize
    }

    fn snapshot(&self) -> Sinks {
        Arc::clone(&self.sinks.read())
    }

    fn register(self: &Arc<Self>, sink: Arc<dyn SinkAdapter>) -> Result<()> {
        if DispatchGuard::is_active(self.id()) {
            return Err(LoggerError::ReentrantSinkMutation);
        }
        let mut sinks = self.sinks.write();
        let mut next = sinks.to_vec();
        next.push(sink);
        *sinks = next.into();
        Ok(())
    }

    fn deregister(self: &Arc<Self>, sink: &Arc<dyn SinkAdapter>) -> Result<()> {
        if DispatchGuard::is_active(self.id()) {
            return Err(LoggerError::ReentrantSinkMutation);
        }
        let mut sinks = self.sinks.write();
        if sinks.iter().any(|s| same_sink(s, sink)) {
            let next: Vec<_> = sinks
                .iter()
                .filter(|s| !same_sink(s, sink))
                .cloned()
                .collect();
            *sinks = next.into();
        }
        Ok(())
    }
}

fn same_sink(a: &Arc<dyn SinkAdapter>, b: &Arc<dyn SinkAdapter>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

/// Single-destination logger whose events are also copied to sinks.
///
/// Sub-loggers share the sink registry, so a sink registered on any of
/// them observes the events of all of them.
///
/// Sinks must not call [`InterceptLogger::register_sink`] or
/// [`InterceptLogger::deregister_sink`] on the same registry from inside
/// [`SinkAdapter::accept`]; those calls fail with
/// [`LoggerError::ReentrantSinkMutation`]. A panicking sink is not
/// contained and unwinds through the logging call.
#[derive(Clone)]
pub struct InterceptingLogger {
    primary: DestinationLogger,
    registry: Arc<SinkRegistry>,
}

impl InterceptingLogger {
    pub fn new(opts: &LoggerOptions) -> Self {
        Self::wrap(DestinationLogger::new(opts))
    }

    /// Put a sink registry in front of an existing logger
    pub fn wrap(primary: DestinationLogger) -> Self {
        Self {
            primary,
            registry: Arc::new(SinkRegistry::new()),
        }
    }

    pub fn primary(&self) -> &DestinationLogger {
        &self.primary
    }

    pub fn sink_count(&self) -> usize {
        self.registry.snapshot().len()
    }

    /// Log and return the primary's write error instead of reporting it.
    /// Sinks are served even when the primary write fails.
    pub fn try_log(
        &self,
        location: Option<Location>,
        level: Level,
        msg: &str,
        args: &[FieldValue],
    ) -> Result<()> {
        if self.primary.is_excluded(level, msg, args) {
            return Ok(());
        }

        let name = self.primary.name();
        let written = self.primary.write_admitted(&name, location, level, msg, args);

        let sinks = self.registry.snapshot();
        if !sinks.is_empty() {
            let flat = self.primary.fields_with(args).into_args();
            let _dispatch = DispatchGuard::enter(self.registry.id());
            for sink in sinks.iter() {
                sink.accept(&name, level, msg, &flat);
            }
        }

        written
    }

    fn derive(&self, primary: DestinationLogger) -> Self {
        Self {
            primary,
            registry: Arc::clone(&self.registry),
        }
    }
}

impl std::fmt::Debug for InterceptingLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterceptingLogger")
            .field("primary", &self.primary)
            .field("sinks", &self.sink_count())
            .finish()
    }
}

impl Logger for InterceptingLogger {
    fn log(&self, level: Level, msg: &str, args: &[FieldValue]) {
        if let Err(e) = self.try_log(None, level, msg, args) {
            report_write_error(&self.primary.name(), &e);
        }
    }

    fn log_at(&self, location: Location, level: Level, msg: &str, args: &[FieldValue]) {
        if let Err(e) = self.try_log(Some(location), level, msg, args) {
            report_write_error(&self.primary.name(), &e);
        }
    }

    fn level(&self) -> Level {
        self.primary.level()
    }

    fn implied_args(&self) -> Vec<FieldValue> {
        self.primary.implied_args()
    }

    fn with(&self, args: &[FieldValue]) -> Arc<dyn Logger> {
        Arc::new(self.derive(self.primary.with_args(args)))
    }

    fn name(&self) -> String {
        self.primary.name()
    }

    fn named(&self, name: &str) -> Arc<dyn Logger> {
        Arc::new(self.derive(self.primary.named_child(name)))
    }

    fn reset_named(&self, name: &str) -> Arc<dyn Logger> {
        Arc::new(self.derive(self.primary.reset_named_child(name)))
    }

    fn set_level(&self, level: Level) {
        self.primary.set_level(level);
    }
}

impl InterceptLogger for InterceptingLogger {
    fn register_sink(&self, sink: Arc<dyn SinkAdapter>) -> Result<()> {
        self.registry.register(sink)
    }

    fn deregister_sink(&self, sink: &Arc<dyn SinkAdapter>) -> Result<()> {
        self.registry.deregister(sink)
    }

    fn named_intercept(&self, name: &str) -> Arc<dyn InterceptLogger> {
        Arc::new(self.derive(self.primary.named_child(name)))
    }

    fn reset_named_intercept(&self, name: &str) -> Arc<dyn InterceptLogger> {
        Arc::new(self.derive(self.primary.reset_named_child(name)))
    }
}

impl OutputResettable for InterceptingLogger {
    fn reset_output(&self, opts: &LoggerOptions) -> Result<()> {
        self.primary.reset_output(opts)
    }

    fn reset_output_with_flush(
        &self,
        opts: &LoggerOptions,
        flushable: &dyn Flushable,
    ) -> Result<()> {
        self.primary.reset_output_with_flush(opts, flushable)
    }
}
