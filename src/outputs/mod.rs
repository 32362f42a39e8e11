//! Concrete outputs and adapters built on the core loggers

pub mod agent;
pub mod rotating_file;
pub mod std_adapter;

pub use agent::{
    build_agent_logger, configure_destinations, install_agent_logging, parse_capacity,
    AuthIdentity, DestinationConfig,
};
pub use rotating_file::{RotatingFileWriter, RotationPolicy, RotationStrategy, DEFAULT_MAX_BYTES};
pub use std_adapter::{StandardLoggerOptions, StandardWriter};

#[cfg(feature = "log-bridge")]
pub use std_adapter::LogBridge;
