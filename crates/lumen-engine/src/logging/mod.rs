//! Logging setup.
//!
//! Everything logs through the `log` facade; this module installs
//! `env_logger` behind it once at startup.

mod init;

pub use init::{LoggingConfig, default_filter, init_logging};
