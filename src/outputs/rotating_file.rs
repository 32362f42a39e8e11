//! Size- or interval-rotated log file
//!
//! [`RotatingFileWriter`] is a plain [`Write`] target, so it plugs into a
//! logger through [`Output::shared`](crate::Output::shared). Backups are
//! named `<file>.1`, `<file>.2`, ... with `.1` the most recent, and carry
//! a `.gz` suffix when compression is enabled.

use crate::core::error::{LoggerError, Result};
use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

/// Size limit used when none is configured
pub const DEFAULT_MAX_BYTES: u64 = 100 * 1024 * 1024;

/// When the active file is rotated
///
/// ```
/// use fanlog::outputs::RotationStrategy;
/// use std::time::Duration;
///
/// let by_size = RotationStrategy::size(10 * 1024 * 1024);
/// let hourly = RotationStrategy::Interval { every: Duration::from_secs(3600) };
/// assert_ne!(by_size, hourly);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RotationStrategy {
    /// Before a write would take the file past `max_bytes`
    Size { max_bytes: u64 },

    /// Once `every` has elapsed since the file was opened or last rotated
    Interval { every: Duration },

    /// Never; rotation is left to an external tool
    Never,
}

impl Default for RotationStrategy {
    fn default() -> Self {
        RotationStrategy::Size {
            max_bytes: DEFAULT_MAX_BYTES,
        }
    }
}

impl RotationStrategy {
    #[must_use]
    pub fn size(max_bytes: u64) -> Self {
        RotationStrategy::Size { max_bytes }
    }
}

/// Rotation settings for a [`RotatingFileWriter`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RotationPolicy {
    pub strategy: RotationStrategy,

    /// Number of rotated files to keep; `0` keeps all of them
    pub max_backups: usize,

    /// Gzip rotated files
    pub compress: bool,
}

impl RotationPolicy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_strategy(mut self, strategy: RotationStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_size(mut self, max_bytes: u64) -> Self {
        self.strategy = RotationStrategy::Size { max_bytes };
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_backups(mut self, count: usize) -> Self {
        self.max_backups = count;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_compression(mut self, enabled: bool) -> Self {
        self.compress = enabled;
        self
    }
}

/// Log file that rotates itself according to a [`RotationPolicy`].
///
/// A failed rotation is reported on stderr and writing continues on the
/// current file, so events are not lost to a full or read-only backup
/// directory.
///
/// ```no_run
/// use fanlog::outputs::{RotatingFileWriter, RotationPolicy};
/// use fanlog::{DestinationLogger, Logger, LoggerOptions, Output};
///
/// let file = RotatingFileWriter::open(
///     "/var/log/agent.log",
///     RotationPolicy::new().with_max_size(10 * 1024 * 1024).with_max_backups(5),
/// )?
/// .shared();
///
/// let logger = DestinationLogger::new(&LoggerOptions::new().with_output(Output::shared(file)));
/// logger.info("agent started", &[]);
/// # Ok::<(), fanlog::LoggerError>(())
/// ```
#[derive(Debug)]
pub struct RotatingFileWriter {
    path: PathBuf,
    policy: RotationPolicy,
    writer: Option<BufWriter<File>>,
    current_size: u64,
    opened_at: SystemTime,
    auto_flush: bool,
}

impl RotatingFileWriter {
    /// Open `path` for appending, creating it and its directory if needed.
    pub fn open<P: AsRef<Path>>(path: P, policy: RotationPolicy) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                LoggerError::io_operation(
                    "create log directory",
                    format!("Failed to create directory '{}'", parent.display()),
                    e,
                )
            })?;
        }

        let (file, current_size) = Self::open_file(&path)?;

        Ok(Self {
            path,
            policy,
            writer: Some(BufWriter::new(file)),
            current_size,
            opened_at: SystemTime::now(),
            auto_flush: true,
        })
    }

    /// Keep writes in the buffer until an explicit flush.
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_auto_flush(mut self, enabled: bool) -> Self {
        self.auto_flush = enabled;
        self
    }

    /// Wrap in the handle expected by [`Output::shared`](crate::Output::shared).
    /// The same handle can be passed as the `Flushable` of
    /// `reset_output_with_flush`.
    pub fn shared(self) -> Arc<Mutex<Self>> {
        Arc::new(Mutex::new(self))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn policy(&self) -> &RotationPolicy {
        &self.policy
    }

    /// Bytes in the active file
    pub fn current_size(&self) -> u64 {
        self.current_size
    }

    /// Rotate regardless of the strategy.
    pub fn rotate_now(&mut self) -> Result<()> {
        self.rotate()
    }

    fn open_file(path: &Path) -> Result<(File, u64)> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                LoggerError::file_appender(path.display().to_string(), format!("Failed to open: {}", e))
            })?;
        let size = file.metadata().map(|m| m.len()).map_err(|e| {
            LoggerError::file_appender(
                path.display().to_string(),
                format!("Cannot access file metadata: {}", e),
            )
        })?;
        Ok((file, size))
    }

    fn should_rotate(&self, incoming: u64) -> bool {
        match &self.policy.strategy {
            RotationStrategy::Never => false,
            RotationStrategy::Size { max_bytes } => {
                self.current_size > 0 && self.current_size + incoming > *max_bytes
            }
            RotationStrategy::Interval { every } => {
                SystemTime::now()
                    .duration_since(self.opened_at)
                    .unwrap_or(Duration::ZERO)
                    >= *every
            }
        }
    }

    fn backup_path(&self, index: usize) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "log".to_string());
        self.path.with_file_name(format!("{}.{}", file_name, index))
    }

    fn compressed_path(&self, index: usize) -> PathBuf {
        gz_path(&self.backup_path(index))
    }

    fn backup_exists(&self, index: usize) -> bool {
        self.backup_path(index).exists() || self.compressed_path(index).exists()
    }

    fn rotate(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush().map_err(|e| {
                LoggerError::file_rotation(
                    self.path.display().to_string(),
                    format!("Failed to flush before rotation: {}", e),
                )
            })?;
        }

        let highest = if self.policy.max_backups > 0 {
            for stale in [
                self.backup_path(self.policy.max_backups),
                self.compressed_path(self.policy.max_backups),
            ] {
                if stale.exists() {
                    if let Err(e) = fs::remove_file(&stale) {
                        eprintln!(
                            "[LOGGER WARNING] Failed to remove oldest backup {}: {}",
                            stale.display(),
                            e
                        );
                    }
                }
            }
            self.policy.max_backups - 1
        } else {
            (1..).take_while(|i| self.backup_exists(*i)).count()
        };

        for index in (1..=highest).rev() {
            for (from, to) in [
                (self.compressed_path(index), self.compressed_path(index + 1)),
                (self.backup_path(index), self.backup_path(index + 1)),
            ] {
                if from.exists() {
                    fs::rename(&from, &to).map_err(|e| {
                        LoggerError::file_rotation(
                            from.display().to_string(),
                            format!("Failed to shift backup: {}", e),
                        )
                    })?;
                }
            }
        }

        let first_backup = self.backup_path(1);
        if self.path.exists() {
            fs::rename(&self.path, &first_backup).map_err(|e| {
                LoggerError::file_rotation(
                    self.path.display().to_string(),
                    format!("Failed to rotate current log file: {}", e),
                )
            })?;
            if self.policy.compress {
                compress_file(&first_backup)?;
            }
        }

        let (file, size) = Self::open_file(&self.path)?;
        self.writer = Some(BufWriter::new(file));
        self.current_size = size;
        self.opened_at = SystemTime::now();
        Ok(())
    }

    /// Get back to a writable state after a failed rotation
    fn recover(&mut self) -> Result<()> {
        if self.writer.is_none() {
            let (file, size) = Self::open_file(&self.path)?;
            self.writer = Some(BufWriter::new(file));
            self.current_size = size;
        }
        // avoid retrying on every write; the file may grow past its limit
        self.current_size = 0;
        self.opened_at = SystemTime::now();
        Ok(())
    }
}

fn gz_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".gz");
    PathBuf::from(name)
}

/// Gzip `path` into `path.gz`, removing the original only once the
/// compressed copy is complete.
fn compress_file(path: &Path) -> Result<()> {
    let target = gz_path(path);
    let mut temp = target.as_os_str().to_os_string();
    temp.push(".tmp");
    let temp = PathBuf::from(temp);

    let compress = || -> io::Result<()> {
        let mut reader = BufReader::with_capacity(64 * 1024, File::open(path)?);
        let output = BufWriter::with_capacity(64 * 1024, File::create(&temp)?);
        let mut encoder = flate2::write::GzEncoder::new(output, flate2::Compression::default());
        io::copy(&mut reader, &mut encoder)?;
        encoder.finish()?.flush()?;
        fs::rename(&temp, &target)
    };

    if let Err(e) = compress() {
        let _ = fs::remove_file(&temp);
        return Err(LoggerError::io_operation(
            "compress log file",
            format!("Failed to compress '{}'", path.display()),
            e,
        ));
    }

    if let Err(e) = fs::remove_file(path) {
        eprintln!(
            "[LOGGER WARNING] Compressed {} but could not remove the original: {}",
            path.display(),
            e
        );
    }
    Ok(())
}

impl Write for RotatingFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.should_rotate(buf.len() as u64) {
            if let Err(e) = self.rotate() {
                eprintln!(
                    "[LOGGER WARNING] Log rotation failed for {}: {}. Continuing with current file.",
                    self.path.display(),
                    e
                );
                self.recover().map_err(io::Error::other)?;
            }
        }

        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| io::Error::other(LoggerError::writer("Log file is not open")))?;
        writer.write_all(buf)?;
        if self.auto_flush {
            writer.flush()?;
        }
        self.current_size += buf.len() as u64;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.writer.as_mut() {
            Some(writer) => writer.flush(),
            None => Ok(()),
        }
    }
}

impl Drop for RotatingFileWriter {
    fn drop(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            let _ = writer.flush();
        }
    }
}
