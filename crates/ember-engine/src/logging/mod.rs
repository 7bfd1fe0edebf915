//! Logging utilities.
//!
//! This module centralizes logger initialization. It sticks to the standard
//! `log` facade; the backend is `env_logger` and is only wired up here.

mod init;

pub use init::{init_logging, LoggingConfig};
