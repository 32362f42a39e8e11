//! Integration tests for the logger system
//!
//! These tests verify:
//! - Exclusion filters and level thresholds
//! - Fan-out delivery per destination
//! - Implied args and name handling on sub-loggers
//! - Shared vs independent level cells
//! - Output reset with and without flush
//! - Sink registration and delivery
//! - File outputs configured the agent way

use chrono::{TimeZone, Utc};
use fanlog::outputs::{build_agent_logger, AuthIdentity, DestinationConfig};
use fanlog::prelude::*;
use fanlog::{LeveledWriter, LevelWrite};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

type Buf = Arc<Mutex<Vec<u8>>>;

fn buffer() -> Buf {
    Arc::new(Mutex::new(Vec::new()))
}

fn text(buf: &Buf) -> String {
    String::from_utf8_lossy(&buf.lock()).into_owned()
}

fn opts_into(buf: &Buf) -> LoggerOptions {
    LoggerOptions::new()
        .with_disable_time(true)
        .with_output(Output::shared(Arc::clone(buf)))
}

/// Stream that counts how many writes it receives
#[derive(Default)]
struct CountingWriter {
    writes: Arc<AtomicUsize>,
}

impl io::Write for CountingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_fanout_one_write_per_admitting_destination() {
    let counters: Vec<Arc<AtomicUsize>> = (0..4).map(|_| Arc::new(AtomicUsize::new(0))).collect();
    let levels = [Level::Trace, Level::Info, Level::Warn, Level::Off];

    let options: Vec<LoggerOptions> = counters
        .iter()
        .zip(levels)
        .map(|(count, level)| {
            LoggerOptions::new().with_level(level).with_output(Output::new(CountingWriter {
                writes: Arc::clone(count),
            }))
        })
        .collect();
    let logger = FanoutLogger::new(&options).expect("fan-out");

    logger.info("one event", args!["k", "v"]);

    let writes: Vec<usize> = counters.iter().map(|c| c.load(Ordering::SeqCst)).collect();
    assert_eq!(writes, vec![1, 1, 0, 0]);
}

#[test]
fn test_with_last_write_wins() {
    let buf = buffer();
    let logger = DestinationLogger::new(&opts_into(&buf));

    logger
        .with(args!["k", "v"])
        .with(args!["k", "v2"])
        .info("shadowed", &[]);

    let out = text(&buf);
    assert_eq!(out.matches("k=").count(), 1);
    assert!(out.contains("k=v2"));
}

#[test]
fn test_set_level_shared_with_descendants() {
    let buf = buffer();
    let root = DestinationLogger::new(&opts_into(&buf).with_level(Level::Info));
    let child = root.with(args!["component", "raft"]);

    root.set_level(Level::Trace);
    child.trace("visible", &[]);

    assert!(child.is_trace());
    assert!(text(&buf).contains("visible"));
}

#[test]
fn test_set_level_independent() {
    let buf = buffer();
    let root = DestinationLogger::new(
        &opts_into(&buf)
            .with_level(Level::Info)
            .with_independent_levels(true),
    );
    let child = root.with(args!["component", "raft"]);

    root.set_level(Level::Trace);
    child.trace("hidden", &[]);

    assert!(!child.is_trace());
    assert!(text(&buf).is_empty());
}

#[test]
fn test_exclusion_before_any_write() {
    let writes = Arc::new(AtomicUsize::new(0));
    let logger = DestinationLogger::new(
        &LoggerOptions::new()
            .with_level(Level::Trace)
            .with_output(Output::new(CountingWriter {
                writes: Arc::clone(&writes),
            }))
            .with_exclude(
                ExcludeFuncs::new()
                    .with(ExcludeByMessage::new().with("ping"))
                    .with(ExcludeByPrefix::new("health: "))
                    .with(ExcludeByRegex::from_pattern("^GET /metrics").expect("regex")),
            ),
    );

    logger.info("ping", &[]);
    logger.error("health: ok", &[]);
    logger.debug("GET /metrics 200", &[]);
    logger.info("ping pong", &[]);

    assert_eq!(writes.load(Ordering::SeqCst), 1);
}

#[test]
fn test_leveled_writer_override_stream() {
    let standard = buffer();
    let errors = buffer();
    let writer = LeveledWriter::new(Output::shared(Arc::clone(&standard)), HashMap::new())
        .with_override(Level::Error, Output::shared(Arc::clone(&errors)));
    let logger = DestinationLogger::new(
        &LoggerOptions::new()
            .with_disable_time(true)
            .with_output(Output::leveled(writer)),
    );

    logger.info("fine", &[]);
    logger.error("broken", &[]);

    assert_eq!(text(&standard), "[INFO]  fine\n");
    assert_eq!(text(&errors), "[ERROR] broken\n");
}

#[test]
fn test_line_color_applied_to_whole_line() {
    struct Recording(Arc<Mutex<Vec<(Level, Vec<u8>)>>>);
    impl LevelWrite for Recording {
        fn level_write(&mut self, level: Level, buf: &[u8]) -> io::Result<()> {
            self.0.lock().push((level, buf.to_vec()));
            Ok(())
        }
    }

    let writes = Arc::new(Mutex::new(Vec::new()));
    let logger = DestinationLogger::new(
        &LoggerOptions::new()
            .with_disable_time(true)
            .with_color(ColorOption::Force)
            .with_output(Output::leveled(Recording(Arc::clone(&writes)))),
    );

    logger.warn("hot", args!["temp", 91]);

    let writes = writes.lock();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].0, Level::Warn);
    let line = String::from_utf8(writes[0].1.clone()).expect("utf8");
    assert_eq!(line, format!("{}\n", fanlog::paint(Level::Warn, "[WARN]  hot temp=91")));
}

#[test]
fn test_reset_output_with_flush_orders_flush_first() {
    struct OrderedFlush {
        log: Arc<Mutex<Vec<&'static str>>>,
    }
    impl Flushable for OrderedFlush {
        fn flush(&self) -> fanlog::Result<()> {
            self.log.lock().push("flush");
            Ok(())
        }
    }
    struct OrderedWriter {
        log: Arc<Mutex<Vec<&'static str>>>,
    }
    impl io::Write for OrderedWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.log.lock().push("write-new");
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    let old = buffer();
    let logger = DestinationLogger::new(&opts_into(&old));
    logger.info("before", &[]);

    let log = Arc::new(Mutex::new(Vec::new()));
    logger
        .reset_output_with_flush(
            &LoggerOptions::new().with_output(Output::new(OrderedWriter {
                log: Arc::clone(&log),
            })),
            &OrderedFlush {
                log: Arc::clone(&log),
            },
        )
        .expect("reset");
    logger.info("after", &[]);

    assert_eq!(*log.lock(), vec!["flush", "write-new"]);
    assert_eq!(text(&old), "[INFO]  before\n");
}

#[test]
fn test_failed_flush_keeps_old_output() {
    struct BrokenFlush;
    impl Flushable for BrokenFlush {
        fn flush(&self) -> fanlog::Result<()> {
            Err(LoggerError::writer("device gone"))
        }
    }

    let old = buffer();
    let new = buffer();
    let logger = DestinationLogger::new(&opts_into(&old));

    let result = logger.reset_output_with_flush(
        &LoggerOptions::new().with_output(Output::shared(Arc::clone(&new))),
        &BrokenFlush,
    );
    logger.info("still old", &[]);

    assert!(result.is_err());
    assert_eq!(text(&old), "[INFO]  still old\n");
    assert!(text(&new).is_empty());
}

#[test]
fn test_sink_receives_warn_above_primary_threshold() {
    #[derive(Default)]
    struct Collect(Mutex<Vec<(Level, String)>>);
    impl SinkAdapter for Collect {
        fn accept(&self, _name: &str, level: Level, msg: &str, _args: &[FieldValue]) {
            self.0.lock().push((level, msg.to_string()));
        }
    }

    let buf = buffer();
    let logger = InterceptingLogger::new(&opts_into(&buf).with_level(Level::Error));
    let sink = Arc::new(Collect::default());
    logger.register_sink(sink.clone()).expect("register");

    logger.warn("disk 91% full", &[]);

    assert!(text(&buf).is_empty());
    assert_eq!(*sink.0.lock(), vec![(Level::Warn, "disk 91% full".to_string())]);
}

#[test]
fn test_destination_logger_as_sink() {
    let primary = buffer();
    let audit = buffer();
    let logger = InterceptingLogger::new(&opts_into(&primary).with_name("agent"));
    let audit_logger: Arc<dyn SinkAdapter> = Arc::new(DestinationLogger::new(
        &opts_into(&audit).with_json_format(true).with_level(Level::Trace),
    ));
    logger.register_sink(Arc::clone(&audit_logger)).expect("register");

    logger.with(args!["request", 7]).debug("cache miss", args!["key", "users/1"]);

    assert!(text(&primary).is_empty());
    let event: serde_json::Value = serde_json::from_str(text(&audit).trim_end()).expect("json");
    assert_eq!(event["@module"], "agent");
    assert_eq!(event["@level"], "debug");
    assert_eq!(event["request"], 7);
    assert_eq!(event["key"], "users/1");

    logger.deregister_sink(&audit_logger).expect("deregister");
    logger.error("not audited", &[]);
    assert_eq!(text(&audit).lines().count(), 1);
}

#[test]
fn test_fixed_clock_and_time_format() {
    let buf = buffer();
    let logger = DestinationLogger::new(
        &LoggerOptions::new()
            .with_output(Output::shared(Arc::clone(&buf)))
            .with_time_fn(Arc::new(|| {
                Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45)
                    .single()
                    .expect("valid datetime")
            }))
            .with_time_format(TimestampFormat::Custom("%H:%M:%S".to_string())),
    );

    logger.info("tick", &[]);

    assert_eq!(text(&buf), "10:30:45 [INFO]  tick\n");
}

#[test]
fn test_shared_locker_between_loggers() {
    let buf = buffer();
    let locker: Arc<dyn fanlog::Locker> = Arc::new(Mutex::new(()));
    let a = DestinationLogger::new(&opts_into(&buf).with_name("a").with_mutex(Arc::clone(&locker)));
    let b = DestinationLogger::new(&opts_into(&buf).with_name("b").with_mutex(locker));

    a.info("first", &[]);
    b.info("second", &[]);

    assert_eq!(text(&buf), "[INFO]  a: first\n[INFO]  b: second\n");
}

#[test]
fn test_agent_logger_writes_each_destination() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let dir = temp_dir.path().to_string_lossy().into_owned();

    let text_cfg = DestinationConfig {
        log_level: "warn".to_string(),
        ..DestinationConfig::file(&dir, "agent.log")
    };
    let json_cfg = DestinationConfig {
        log_level: "debug".to_string(),
        log_format: "json".to_string(),
        ..DestinationConfig::file(&dir, "agent.json")
    };
    let auth = AuthIdentity {
        namespace: "admin".to_string(),
        ..AuthIdentity::default()
    };

    let logger = build_agent_logger("agent", &[text_cfg, json_cfg], &auth).expect("agent logger");
    logger.debug("token renewed", &[]);
    logger.warn("token expiring", &[]);

    let plain = fs::read_to_string(temp_dir.path().join("agent.log")).expect("read text log");
    let json = fs::read_to_string(temp_dir.path().join("agent.json")).expect("read json log");

    assert_eq!(plain.lines().count(), 1);
    assert!(plain.contains("[WARN]  agent: token expiring namespace=admin"));
    assert_eq!(json.lines().count(), 2);
    for line in json.lines() {
        let event: serde_json::Value = serde_json::from_str(line).expect("json line");
        assert_eq!(event["namespace"], "admin");
    }
}

#[test]
fn test_rotating_file_swap_with_flush() {
    use fanlog::outputs::{RotatingFileWriter, RotationPolicy};

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let first = RotatingFileWriter::open(temp_dir.path().join("one.log"), RotationPolicy::new())
        .expect("open")
        .with_auto_flush(false)
        .shared();
    let second = RotatingFileWriter::open(temp_dir.path().join("two.log"), RotationPolicy::new())
        .expect("open")
        .shared();

    let logger = DestinationLogger::new(
        &LoggerOptions::new()
            .with_disable_time(true)
            .with_output(Output::shared(Arc::clone(&first))),
    );
    logger.info("buffered", &[]);

    logger
        .reset_output_with_flush(
            &LoggerOptions::new().with_output(Output::shared(Arc::clone(&second))),
            &*first,
        )
        .expect("reset");
    logger.info("moved", &[]);

    let one = fs::read_to_string(temp_dir.path().join("one.log")).expect("read");
    let two = fs::read_to_string(temp_dir.path().join("two.log")).expect("read");
    assert_eq!(one, "[INFO]  buffered\n");
    assert_eq!(two, "[INFO]  moved\n");
}

#[test]
fn test_install_agent_logging_replaces_default() {
    use fanlog::outputs::install_agent_logging;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let dir = temp_dir.path().to_string_lossy().into_owned();
    let auth = AuthIdentity {
        identity: "web".to_string(),
        ..AuthIdentity::default()
    };

    let installed = install_agent_logging("agent", &[DestinationConfig::file(&dir, "default.log")], &auth)
        .expect("install");
    assert!(Arc::ptr_eq(&installed, &fanlog::default()));

    fanlog::l().info("through the default", &[]);

    let content = fs::read_to_string(temp_dir.path().join("default.log")).expect("read log");
    assert_eq!(content.lines().count(), 1);
    assert!(content.contains("[INFO]  agent: through the default identity=web"));
}
