//! Multi-destination setup for long-running agents
//!
//! An agent describes each log destination with a [`DestinationConfig`]
//! (typically deserialized from its config file). [`configure_destinations`]
//! validates the whole list and turns it into [`LoggerOptions`];
//! [`build_agent_logger`] goes one step further and returns a ready
//! [`FanoutLogger`] tagged with the agent's auth identity.
//!
//! Destination resolution:
//! - `log_file = "-"`: stdout
//! - `log_path` set: a rotating file `<log_path>/<log_file>`, or
//!   `<log_path>/new_log_file_<timestamp>` when `log_file` is empty
//! - only `log_file` set: a rotating file at `log_file`
//! - neither: stderr

use super::rotating_file::{RotatingFileWriter, RotationPolicy, DEFAULT_MAX_BYTES};
use crate::args;
use crate::core::error::{LoggerError, Result};
use crate::core::fanout::FanoutLogger;
use crate::core::global;
use crate::core::log_level::Level;
use crate::core::logger::Logger;
use crate::core::options::LoggerOptions;
use crate::core::writer::Output;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

/// One `log_destination` entry of an agent configuration.
///
/// All fields are strings as they appear in the config file and are
/// validated by [`configure_destinations`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DestinationConfig {
    /// File name, or `-` for stdout
    pub log_file: String,
    /// Directory for the log file
    pub log_path: String,
    /// `json` for JSON lines, anything else for text
    pub log_format: String,
    pub log_level: String,
    /// Size at which the file is rotated, e.g. `10MB`, `512KiB`, `1048576`
    pub log_max_size: String,
    /// Number of rotated files to keep
    pub log_rotate: String,
}

impl DestinationConfig {
    pub fn stdout() -> Self {
        Self {
            log_file: "-".to_string(),
            ..Self::default()
        }
    }

    pub fn file(path: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            log_path: path.into(),
            log_file: file.into(),
            ..Self::default()
        }
    }
}

/// Identity the agent authenticated as, attached to every event
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthIdentity {
    pub namespace: String,
    pub identity: String,
    pub method: String,
}

#[derive(Debug)]
enum Target {
    Stdout,
    Stderr,
    File {
        path: PathBuf,
        policy: RotationPolicy,
    },
}

impl Target {
    fn key(&self) -> String {
        match self {
            Target::Stdout => "-".to_string(),
            Target::Stderr => "stderr".to_string(),
            Target::File { path, .. } => path.display().to_string(),
        }
    }

    fn open(self) -> Result<Output> {
        Ok(match self {
            Target::Stdout => Output::stdout(),
            Target::Stderr => Output::stderr(),
            Target::File { path, policy } => {
                Output::shared(RotatingFileWriter::open(path, policy)?.shared())
            }
        })
    }
}

/// Parse a capacity such as `512`, `10MB`, `1.5 GiB`.
///
/// Decimal units (`kb`, `mb`, `gb`, `tb`) are powers of 1000, binary units
/// (`kib`, ...) powers of 1024; a bare number or `b` is bytes. Case is
/// ignored.
///
/// ```
/// use fanlog::outputs::parse_capacity;
///
/// assert_eq!(parse_capacity("10MB").unwrap(), 10_000_000);
/// assert_eq!(parse_capacity("512KiB").unwrap(), 524_288);
/// assert!(parse_capacity("12XB").is_err());
/// ```
pub fn parse_capacity(raw: &str) -> Result<u64> {
    let text = raw.trim().to_ascii_lowercase();
    let split = text
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(text.len());
    let (number, unit) = text.split_at(split);

    let bad = || LoggerError::config("log_max_size", format!("bad value: {}", raw));

    let multiplier: u64 = match unit.trim() {
        "" | "b" => 1,
        "k" | "kb" => 1_000,
        "kib" => 1 << 10,
        "m" | "mb" => 1_000_000,
        "mib" => 1 << 20,
        "g" | "gb" => 1_000_000_000,
        "gib" => 1 << 30,
        "t" | "tb" => 1_000_000_000_000,
        "tib" => 1 << 40,
        _ => return Err(bad()),
    };

    if number.is_empty() {
        return Err(bad());
    }
    if let Ok(whole) = number.parse::<u64>() {
        return whole.checked_mul(multiplier).ok_or_else(bad);
    }
    let value: f64 = number.parse().map_err(|_| bad())?;
    let bytes = value * multiplier as f64;
    if !bytes.is_finite() || bytes >= u64::MAX as f64 {
        return Err(bad());
    }
    Ok(bytes as u64)
}

fn parse_rotate(raw: &str) -> Result<usize> {
    raw.trim()
        .parse()
        .map_err(|_| LoggerError::config("log_rotate", format!("bad value: {}", raw)))
}

fn resolve(config: &DestinationConfig) -> Result<Target> {
    if config.log_file == "-" {
        return Ok(Target::Stdout);
    }

    let path = match (config.log_path.is_empty(), config.log_file.is_empty()) {
        (true, true) => return Ok(Target::Stderr),
        (true, false) => PathBuf::from(&config.log_file),
        (false, false) => PathBuf::from(&config.log_path).join(&config.log_file),
        (false, true) => PathBuf::from(&config.log_path).join(format!(
            "new_log_file_{}",
            Utc::now().format("%Y-%m-%dT%H-%M-%S%.3f")
        )),
    };

    let max_bytes = if config.log_max_size.trim().is_empty() {
        DEFAULT_MAX_BYTES
    } else {
        parse_capacity(&config.log_max_size)?
    };
    let max_backups = if config.log_rotate.trim().is_empty() {
        0
    } else {
        parse_rotate(&config.log_rotate)?
    };

    Ok(Target::File {
        path,
        policy: RotationPolicy::new()
            .with_max_size(max_bytes)
            .with_max_backups(max_backups),
    })
}

/// Validate `configs` and build one set of options per destination.
///
/// Every entry is checked before any file is opened. Two stdout entries,
/// or two entries resolving to the same file, are a
/// [`LoggerError::DuplicateDestination`].
pub fn configure_destinations(configs: &[DestinationConfig]) -> Result<Vec<LoggerOptions>> {
    let mut seen = HashSet::new();
    let mut planned = Vec::with_capacity(configs.len());

    for config in configs {
        let target = resolve(config)?;
        let key = target.key();
        if !seen.insert(key.clone()) {
            return Err(LoggerError::duplicate_destination(key));
        }
        planned.push((config, target));
    }

    planned
        .into_iter()
        .map(|(config, target)| {
            Ok(LoggerOptions::new()
                .with_level(Level::from_name(&config.log_level))
                .with_json_format(config.log_format.eq_ignore_ascii_case("json"))
                .with_output(target.open()?))
        })
        .collect()
}

/// Build the agent's fan-out logger.
///
/// Non-empty identity fields become implied args (`namespace`, `identity`,
/// `method`). An empty `configs` list logs to stderr only.
pub fn build_agent_logger(
    name: &str,
    configs: &[DestinationConfig],
    auth: &AuthIdentity,
) -> Result<FanoutLogger> {
    let mut options = configure_destinations(configs)?;
    if options.is_empty() {
        options.push(LoggerOptions::new());
    }
    let options: Vec<_> = options.into_iter().map(|o| o.with_name(name)).collect();

    let logger = FanoutLogger::new(&options)?;
    for (key, value) in [
        ("namespace", &auth.namespace),
        ("identity", &auth.identity),
        ("method", &auth.method),
    ] {
        if !value.is_empty() {
            logger.with(args![key, value.as_str()]);
        }
    }
    Ok(logger)
}

/// Build the agent logger and make it the process-wide default.
///
/// Meant to run once at startup; returns the installed logger.
pub fn install_agent_logging(
    name: &str,
    configs: &[DestinationConfig],
    auth: &AuthIdentity,
) -> Result<Arc<dyn Logger>> {
    let logger: Arc<dyn Logger> = Arc::new(build_agent_logger(name, configs, auth)?);
    global::set_default(Arc::clone(&logger));
    Ok(logger)
}
