//! Log level definitions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};

/// Severity of a log event, and the threshold a logger admits events at.
///
/// `NoLevel` marks "not configured"; loggers built with it fall back to
/// [`Level::DEFAULT`]. `Off` as a threshold admits nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    NoLevel = 0,
    Trace = 1,
    Debug = 2,
    Info = 3,
    Warn = 4,
    Error = 5,
    Off = 6,
}

impl Default for Level {
    fn default() -> Self {
        Level::DEFAULT
    }
}

impl Level {
    /// Threshold used when none was configured
    pub const DEFAULT: Level = Level::Info;

    pub fn to_str(&self) -> &'static str {
        match self {
            Level::NoLevel => "NOLEVEL",
            Level::Trace => "TRACE",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Off => "OFF",
        }
    }

    /// Lenient lookup used for configuration values: unknown names map to `NoLevel`.
    pub fn from_name(name: &str) -> Self {
        name.trim().parse().unwrap_or(Level::NoLevel)
    }

    /// Whether an event at `self` passes a logger whose threshold is `threshold`.
    #[inline]
    pub fn admitted_by(self, threshold: Level) -> bool {
        threshold != Level::Off && self >= threshold
    }

    pub fn color_code(&self) -> colored::Color {
        use colored::Color::*;
        match self {
            Level::Trace => BrightBlack,
            Level::Debug => Blue,
            Level::Info => Green,
            Level::Warn => Yellow,
            Level::Error => Red,
            Level::NoLevel | Level::Off => White,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            1 => Level::Trace,
            2 => Level::Debug,
            3 => Level::Info,
            4 => Level::Warn,
            5 => Level::Error,
            6 => Level::Off,
            _ => Level::NoLevel,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "TRACE" => Ok(Level::Trace),
            "DEBUG" => Ok(Level::Debug),
            "INFO" => Ok(Level::Info),
            "WARN" | "WARNING" => Ok(Level::Warn),
            "ERROR" | "ERR" => Ok(Level::Error),
            "OFF" => Ok(Level::Off),
            _ => Err(format!("Invalid log level: '{}'", s)),
        }
    }
}

/// Threshold cell read on every logging call and written by `set_level`.
///
/// Shared through an `Arc` between a logger and the descendants it creates,
/// unless they were configured with independent levels.
#[derive(Debug)]
pub struct AtomicLevel(AtomicU8);

impl AtomicLevel {
    pub const fn new(level: Level) -> Self {
        Self(AtomicU8::new(level as u8))
    }

    #[inline]
    pub fn get(&self) -> Level {
        Level::from_u8(self.0.load(Ordering::Acquire))
    }

    #[inline]
    pub fn set(&self, level: Level) {
        self.0.store(level as u8, Ordering::Release);
    }

    #[inline]
    pub fn admits(&self, level: Level) -> bool {
        level.admitted_by(self.get())
    }
}
