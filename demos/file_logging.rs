//! File logging example
//!
//! Configures an agent with a text file, a JSON file and stdout, then swaps
//! one destination's output at runtime.
//!
//! Run with: cargo run --example file_logging

use fanlog::outputs::{
    build_agent_logger, AuthIdentity, DestinationConfig, RotatingFileWriter, RotationPolicy,
};
use fanlog::prelude::*;
use std::fs;

fn main() -> Result<()> {
    println!("=== fanlog - File Logging Example ===\n");

    let dir = std::env::temp_dir().join("fanlog-demo");
    fs::create_dir_all(&dir)?;
    let dir_str = dir.to_string_lossy().into_owned();

    let configs = [
        DestinationConfig {
            log_level: "debug".to_string(),
            log_max_size: "1MiB".to_string(),
            log_rotate: "3".to_string(),
            ..DestinationConfig::file(&dir_str, "agent.log")
        },
        DestinationConfig {
            log_format: "json".to_string(),
            ..DestinationConfig::file(&dir_str, "agent.json")
        },
        DestinationConfig {
            log_level: "warn".to_string(),
            ..DestinationConfig::stdout()
        },
    ];
    let auth = AuthIdentity {
        namespace: "admin".to_string(),
        identity: "web".to_string(),
        method: "approle".to_string(),
    };

    let logger = build_agent_logger("agent", &configs, &auth)?;
    println!("1. Logging to three destinations:");
    logger.debug("debug goes to agent.log only", &[]);
    logger.info("info goes to both files", args!["cache_entries", 120]);
    logger.warn("warn reaches stdout too", &[]);

    println!("\n2. Swapping outputs at runtime:");
    let archive = RotatingFileWriter::open(dir.join("archive.log"), RotationPolicy::new())?.shared();
    logger.reset_output(&LoggerOptions::new().with_output(Output::shared(archive)))?;
    logger.error("every destination now writes to archive.log", &[]);

    println!("\nLog files written to {}", dir.display());
    for name in ["agent.log", "agent.json", "archive.log"] {
        let content = fs::read_to_string(dir.join(name))?;
        println!("--- {} ---\n{}", name, content);
    }

    println!("=== Example completed successfully! ===");
    Ok(())
}
