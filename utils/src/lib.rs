//! Shared utilities for the governance cache.

pub mod logging;

pub use logging::{init_logging, LogFormat, UnknownLogFormat};
