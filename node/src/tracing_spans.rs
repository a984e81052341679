//! Pre-built [`tracing::Span`] constructors for cache operations.
//!
//! Consistent span names and field sets make traces easy to filter and
//! correlate across the dispatcher and the rebuild controller.

use tracing::{info_span, Span};

/// Span covering one dispatched plugin command.
pub fn plugin_exec_span(command: &str) -> Span {
    info_span!("plugin_exec", command = %command)
}

/// Span covering a full rebuild of the plugin tables.
pub fn plugin_build_span(plugin: &str, version: &str) -> Span {
    info_span!("plugin_build", plugin = %plugin, version = %version)
}

/// Span covering one write to the record mirror.
pub fn record_write_span(op: &str, token: &str) -> Span {
    info_span!("record_write", op = %op, token = %token)
}
