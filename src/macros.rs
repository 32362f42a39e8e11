//! Logging macros
//!
//! The level macros format the message like `format!`, take key/value
//! pairs after a `;`, and record the call site so that loggers built with
//! `include_location` can print it.
//!
//! ```
//! use fanlog::{info, warn, DestinationLogger, LoggerOptions};
//!
//! let logger = DestinationLogger::new(&LoggerOptions::new().with_name("api"));
//!
//! info!(logger, "server started");
//! info!(logger, "listening on port {}", 8080);
//! warn!(logger, "slow request"; "path" => "/v1/items", "ms" => 912);
//! ```

/// Build a flat key/value argument slice.
///
/// ```
/// use fanlog::{args, FieldValue};
///
/// let pairs: &[FieldValue] = args!["user", "bob", "attempt", 3];
/// assert_eq!(pairs.len(), 4);
/// ```
#[macro_export]
macro_rules! args {
    () => {
        &[] as &[$crate::FieldValue]
    };
    ($($arg:expr),+ $(,)?) => {
        &[$($crate::FieldValue::from($arg)),+] as &[$crate::FieldValue]
    };
}

/// Log at a given level, capturing the call site.
///
/// ```
/// # use fanlog::{DestinationLogger, LoggerOptions};
/// use fanlog::{log, Level};
///
/// # let logger = DestinationLogger::new(&LoggerOptions::new());
/// log!(logger, Level::Error, "exit code {}", 2);
/// log!(logger, Level::Info, "done"; "items" => 10);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $fmt:literal $(, $arg:expr)* ; $($key:expr => $value:expr),+ $(,)?) => {{
        use $crate::Logger as _;
        $logger.log_at(
            $crate::Location::new(file!(), line!()),
            $level,
            &format!($fmt $(, $arg)*),
            $crate::args![$($key, $value),+],
        )
    }};
    ($logger:expr, $level:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {{
        use $crate::Logger as _;
        $logger.log_at(
            $crate::Location::new(file!(), line!()),
            $level,
            &format!($fmt $(, $arg)*),
            &[],
        )
    }};
}

#[macro_export]
macro_rules! trace {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::Level::Trace, $($rest)+)
    };
}

#[macro_export]
macro_rules! debug {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::Level::Debug, $($rest)+)
    };
}

#[macro_export]
macro_rules! info {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::Level::Info, $($rest)+)
    };
}

/// Log a warning.
///
/// ```
/// # use fanlog::{DestinationLogger, LoggerOptions};
/// use fanlog::warn;
///
/// # let logger = DestinationLogger::new(&LoggerOptions::new());
/// warn!(logger, "retry {} of {}", 3, 5; "backoff_ms" => 200);
/// ```
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::Level::Warn, $($rest)+)
    };
}

#[macro_export]
macro_rules! error {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::Level::Error, $($rest)+)
    };
}

#[cfg(test)]
mod tests {
    use crate::{DestinationLogger, Level, LoggerOptions, Output};
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn capture() -> (DestinationLogger, Arc<Mutex<Vec<u8>>>) {
        let buf = Arc::new(Mutex::new(Vec::<u8>::new()));
        let logger = DestinationLogger::new(
            &LoggerOptions::new()
                .with_level(Level::Trace)
                .with_disable_time(true)
                .with_include_location(true)
                .with_output(Output::shared(Arc::clone(&buf))),
        );
        (logger, buf)
    }

    #[test]
    fn test_macros_capture_call_site() {
        let (logger, buf) = capture();
        let line = line!() + 1;
        crate::debug!(logger, "value {}", 42; "unit" => "ms");

        let out = String::from_utf8_lossy(&buf.lock()).into_owned();
        assert_eq!(
            out,
            format!("[DEBUG] {}:{}: value 42 unit=ms\n", file!(), line)
        );
    }

    #[test]
    fn test_macros_work_through_trait_objects() {
        let (logger, buf) = capture();
        let shared: Arc<dyn crate::Logger> = Arc::new(logger);
        crate::error!(shared, "failed");
        crate::trace!(shared, "step {}", 1);

        let out = String::from_utf8_lossy(&buf.lock()).into_owned();
        assert_eq!(out.lines().count(), 2);
        assert!(out.contains("failed"));
        assert!(out.contains("step 1"));
    }
}
