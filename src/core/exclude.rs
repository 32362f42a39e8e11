//! Exclusion filters evaluated before any formatting or I/O
//!
//! A logger consults its [`Exclude`] predicate first; when it returns `true`
//! the event is dropped without touching the level cell, the formatter or
//! the output.

use super::field::FieldValue;
use super::log_level::Level;
use regex::Regex;
use std::collections::HashSet;
use std::fmt;

/// Predicate deciding whether an event should be suppressed.
pub trait Exclude: Send + Sync {
    fn exclude(&self, level: Level, msg: &str, args: &[FieldValue]) -> bool;
}

impl<F> Exclude for F
where
    F: Fn(Level, &str, &[FieldValue]) -> bool + Send + Sync,
{
    fn exclude(&self, level: Level, msg: &str, args: &[FieldValue]) -> bool {
        self(level, msg, args)
    }
}

/// Excludes messages that exactly equal one of the registered entries.
#[derive(Debug, Clone, Default)]
pub struct ExcludeByMessage {
    messages: HashSet<String>,
}

impl ExcludeByMessage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, msg: impl Into<String>) {
        self.messages.insert(msg.into());
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with(mut self, msg: impl Into<String>) -> Self {
        self.add(msg);
        self
    }
}

impl Exclude for ExcludeByMessage {
    fn exclude(&self, _level: Level, msg: &str, _args: &[FieldValue]) -> bool {
        self.messages.contains(msg)
    }
}

/// Excludes messages that start with the configured prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExcludeByPrefix(pub String);

impl ExcludeByPrefix {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self(prefix.into())
    }
}

impl Exclude for ExcludeByPrefix {
    fn exclude(&self, _level: Level, msg: &str, _args: &[FieldValue]) -> bool {
        msg.starts_with(self.0.as_str())
    }
}

/// Excludes messages in which the pattern matches anywhere.
#[derive(Debug, Clone)]
pub struct ExcludeByRegex {
    regex: Regex,
}

impl ExcludeByRegex {
    pub fn new(regex: Regex) -> Self {
        Self { regex }
    }

    /// Compile `pattern`; an invalid pattern is a configuration error.
    pub fn from_pattern(pattern: &str) -> super::error::Result<Self> {
        let regex = Regex::new(pattern)
            .map_err(|e| super::error::LoggerError::config("ExcludeByRegex", e.to_string()))?;
        Ok(Self { regex })
    }
}

impl Exclude for ExcludeByRegex {
    fn exclude(&self, _level: Level, msg: &str, _args: &[FieldValue]) -> bool {
        self.regex.is_match(msg)
    }
}

/// Excludes an event when any member filter does, checked in order.
///
/// An empty set never excludes.
#[derive(Default)]
pub struct ExcludeFuncs(Vec<Box<dyn Exclude>>);

impl ExcludeFuncs {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with(mut self, filter: impl Exclude + 'static) -> Self {
        self.0.push(Box::new(filter));
        self
    }

    pub fn push(&mut self, filter: impl Exclude + 'static) {
        self.0.push(Box::new(filter));
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for ExcludeFuncs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExcludeFuncs {{ {} filters }}", self.0.len())
    }
}

impl Exclude for ExcludeFuncs {
    fn exclude(&self, level: Level, msg: &str, args: &[FieldValue]) -> bool {
        self.0.iter().any(|filter| filter.exclude(level, msg, args))
    }
}
