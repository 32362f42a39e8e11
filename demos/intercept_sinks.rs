//! Sink example
//!
//! Registers an in-memory audit sink that sees every event, even those the
//! primary destination's level suppresses.
//!
//! Run with: cargo run --example intercept_sinks

use fanlog::prelude::*;
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Default)]
struct AuditTrail {
    entries: Mutex<Vec<String>>,
}

impl SinkAdapter for AuditTrail {
    fn accept(&self, name: &str, level: Level, msg: &str, args: &[FieldValue]) {
        let fields: Vec<String> = args.iter().map(ToString::to_string).collect();
        self.entries
            .lock()
            .push(format!("{} {} {} {}", level, name, msg, fields.join(" ")));
    }
}

fn main() -> Result<()> {
    println!("=== fanlog - Intercept Sinks Example ===\n");

    let logger = InterceptingLogger::new(
        &LoggerOptions::new()
            .with_name("vault")
            .with_level(Level::Warn),
    );
    let audit = Arc::new(AuditTrail::default());
    logger.register_sink(audit.clone())?;

    let auth = logger.named_intercept("auth");
    auth.debug("token lookup", args!["accessor", "hmac-1234"]);
    auth.info("login", args!["user", "alice"]);
    auth.warn("login failed", args!["user", "mallory"]);

    println!("\nAudit trail ({} entries):", audit.entries.lock().len());
    for entry in audit.entries.lock().iter() {
        println!("  {}", entry);
    }

    let as_sink: Arc<dyn SinkAdapter> = audit;
    logger.deregister_sink(&as_sink)?;
    logger.warn("not audited", &[]);

    println!("\n=== Example completed successfully! ===");
    Ok(())
}
