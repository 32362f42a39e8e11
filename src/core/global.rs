//! Process-wide default logger
//!
//! [`default`] builds a [`DestinationLogger`] from the default options the
//! first time it is called and returns the same logger afterwards.
//! [`set_default`] replaces it. Both are meant for program startup: call
//! [`set_default_options`] or [`set_default`] before spawning the threads
//! that log, and pass loggers explicitly wherever that is practical.

use super::destination::DestinationLogger;
use super::logger::Logger;
use super::null_logger::NullLogger;
use super::options::LoggerOptions;
use parking_lot::{const_mutex, const_rwlock, Mutex, RwLock};
use std::sync::{Arc, Once};

static INIT: Once = Once::new();
static DEFAULT: RwLock<Option<Arc<dyn Logger>>> = const_rwlock(None);
static DEFAULT_OPTIONS: Mutex<Option<LoggerOptions>> = const_mutex(None);

/// The process-wide logger, built on first use from the default options.
///
/// If [`set_default`] ran before the first call, its logger is kept and the
/// default options are never read.
pub fn default() -> Arc<dyn Logger> {
    INIT.call_once(|| {
        let mut slot = DEFAULT.write();
        if slot.is_none() {
            let opts = DEFAULT_OPTIONS.lock().clone().unwrap_or_default();
            *slot = Some(Arc::new(DestinationLogger::new(&opts)));
        }
    });

    match DEFAULT.read().as_ref() {
        Some(logger) => Arc::clone(logger),
        None => Arc::new(NullLogger),
    }
}

/// Short alias for [`default`]
pub fn l() -> Arc<dyn Logger> {
    default()
}

/// Replace the process-wide logger and return the previous one, if any.
///
/// Racy with concurrent [`default`] callers, which may see either logger.
pub fn set_default(logger: Arc<dyn Logger>) -> Option<Arc<dyn Logger>> {
    DEFAULT.write().replace(logger)
}

/// Options used when [`default`] builds the process-wide logger. Read once;
/// changes after the first [`default`] call have no effect.
pub fn set_default_options(opts: LoggerOptions) {
    *DEFAULT_OPTIONS.lock() = Some(opts);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::log_level::Level;

    // single test: the state is process-wide
    #[test]
    fn test_default_lifecycle() {
        let first = default();
        assert!(Arc::ptr_eq(&first, &l()));

        let replacement: Arc<dyn Logger> = Arc::new(NullLogger);
        let previous = set_default(Arc::clone(&replacement));
        assert!(previous.is_some_and(|p| Arc::ptr_eq(&p, &first)));
        assert!(Arc::ptr_eq(&default(), &replacement));
        assert_eq!(default().level(), Level::Off);

        set_default(first);
    }
}
