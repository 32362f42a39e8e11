//! Output targets and the level-aware writers in front of them
//!
//! - [`Output`]: a cloneable handle to a plain or level-aware stream,
//!   safe to share between loggers.
//! - [`LeveledWriter`]: sends each event to a per-level override stream or
//!   to the standard stream.
//! - [`LineWriter`]: buffers one formatted event and writes it in a single
//!   call on flush, coloring the whole line at that point if asked to.

use super::error::Result;
use super::log_level::Level;
use super::logger::Flushable;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::io::{self, IsTerminal, Write};
use std::sync::Arc;

/// Capability of a stream that wants to know the severity of what it receives.
pub trait LevelWrite: Send {
    fn level_write(&mut self, level: Level, buf: &[u8]) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[derive(Clone)]
enum Target {
    Stream(Arc<Mutex<dyn Write + Send>>),
    Leveled(Arc<Mutex<dyn LevelWrite>>),
}

/// Handle to the stream a logger writes to.
///
/// Cloning shares the underlying stream; every write takes the stream's own
/// lock, so one event's bytes never interleave with another's.
#[derive(Clone)]
pub struct Output {
    target: Target,
    terminal: bool,
}

impl Output {
    pub fn stderr() -> Self {
        Self {
            target: Target::Stream(Arc::new(Mutex::new(io::stderr()))),
            terminal: io::stderr().is_terminal(),
        }
    }

    pub fn stdout() -> Self {
        Self {
            target: Target::Stream(Arc::new(Mutex::new(io::stdout()))),
            terminal: io::stdout().is_terminal(),
        }
    }

    /// Wrap an owned writer
    pub fn new<W: Write + Send + 'static>(writer: W) -> Self {
        Self::shared(Arc::new(Mutex::new(writer)))
    }

    /// Wrap a writer the caller keeps a handle to, e.g. to flush or inspect it
    pub fn shared<W: Write + Send + 'static>(writer: Arc<Mutex<W>>) -> Self {
        Self {
            target: Target::Stream(writer),
            terminal: false,
        }
    }

    pub fn leveled<W: LevelWrite + 'static>(writer: W) -> Self {
        Self::shared_leveled(Arc::new(Mutex::new(writer)))
    }

    pub fn shared_leveled<W: LevelWrite + 'static>(writer: Arc<Mutex<W>>) -> Self {
        Self {
            target: Target::Leveled(writer),
            terminal: false,
        }
    }

    /// Whether the stream is attached to a terminal (used by `ColorOption::Auto`)
    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    /// Whether both handles point at the same underlying stream
    pub fn same_target(&self, other: &Output) -> bool {
        match (&self.target, &other.target) {
            (Target::Stream(a), Target::Stream(b)) => {
                std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
            }
            (Target::Leveled(a), Target::Leveled(b)) => {
                std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
            }
            _ => false,
        }
    }

    /// Write one complete payload; level-aware streams receive the severity.
    pub fn write_level(&self, level: Level, buf: &[u8]) -> io::Result<()> {
        match &self.target {
            Target::Stream(w) => w.lock().write_all(buf),
            Target::Leveled(w) => w.lock().level_write(level, buf),
        }
    }

    fn flush_stream(&self) -> io::Result<()> {
        match &self.target {
            Target::Stream(w) => w.lock().flush(),
            Target::Leveled(w) => w.lock().flush(),
        }
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::stderr()
    }
}

impl fmt::Debug for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.target {
            Target::Stream(_) => "stream",
            Target::Leveled(_) => "leveled",
        };
        f.debug_struct("Output")
            .field("kind", &kind)
            .field("terminal", &self.terminal)
            .finish()
    }
}

impl Flushable for Output {
    fn flush(&self) -> Result<()> {
        self.flush_stream()?;
        Ok(())
    }
}

impl<W: Write + ?Sized> Flushable for Mutex<W> {
    fn flush(&self) -> Result<()> {
        self.lock().flush()?;
        Ok(())
    }
}

/// Writes every level to `standard` except those with an override.
#[derive(Debug, Clone)]
pub struct LeveledWriter {
    standard: Output,
    overrides: HashMap<Level, Output>,
}

impl LeveledWriter {
    pub fn new(standard: Output, overrides: HashMap<Level, Output>) -> Self {
        Self {
            standard,
            overrides,
        }
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_override(mut self, level: Level, output: Output) -> Self {
        self.overrides.insert(level, output);
        self
    }

    fn resolve(&self, level: Level) -> &Output {
        self.overrides.get(&level).unwrap_or(&self.standard)
    }
}

impl LevelWrite for LeveledWriter {
    fn level_write(&mut self, level: Level, buf: &[u8]) -> io::Result<()> {
        self.resolve(level).write_level(level, buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.standard.flush_stream()?;
        for output in self.overrides.values() {
            output.flush_stream()?;
        }
        Ok(())
    }
}

impl Write for LeveledWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.standard.write_level(Level::NoLevel, buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        LevelWrite::flush(self)
    }
}

/// How color is applied to a formatted event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    #[default]
    Off,
    /// The whole line, applied by [`LineWriter::flush`]
    Line,
    /// Only the `[LEVEL]` header, applied by the formatter
    Header,
    /// The header and every field key
    HeaderAndFields,
}

/// Wrap `text` in the ANSI color for `level`.
pub fn paint(level: Level, text: &str) -> String {
    format!("\x1b[{}m{}\x1b[0m", level.color_code().to_fg_str(), text)
}

/// Buffer for one formatted event in front of an [`Output`].
#[derive(Debug)]
pub struct LineWriter {
    buf: Vec<u8>,
    output: Output,
    color: ColorMode,
}

impl LineWriter {
    pub fn new(output: Output, color: ColorMode) -> Self {
        Self {
            buf: Vec::with_capacity(256),
            output,
            color,
        }
    }

    pub fn color_mode(&self) -> ColorMode {
        self.color
    }

    pub fn output(&self) -> &Output {
        &self.output
    }

    pub fn buffer_mut(&mut self) -> &mut Vec<u8> {
        &mut self.buf
    }

    /// Drop whatever is buffered without writing it
    pub fn discard(&mut self) {
        self.buf.clear();
    }

    /// Write the buffered event in one call and clear the buffer.
    pub fn flush(&mut self, level: Level) -> io::Result<()> {
        let result = if self.color == ColorMode::Line {
            let text = String::from_utf8_lossy(&self.buf);
            let body = text.strip_suffix('\n').unwrap_or(&text);
            let mut line = paint(level, body);
            if body.len() != text.len() {
                line.push('\n');
            }
            self.output.write_level(level, line.as_bytes())
        } else {
            self.output.write_level(level, &self.buf)
        };
        self.buf.clear();
        result
    }

    /// Point at a new output; the buffer is expected to be empty here.
    pub fn reset(&mut self, output: Output, color: ColorMode) {
        self.buf.clear();
        self.output = output;
        self.color = color;
    }
}

impl Write for LineWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
