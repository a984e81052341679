//! Prometheus metrics for the governance cache.
//!
//! The [`CacheMetrics`] struct owns a dedicated [`Registry`] that callers
//! can encode into the Prometheus text exposition format with
//! [`CacheMetrics::encode`].

use prometheus::{
    register_histogram_with_registry, register_int_counter_vec_with_registry,
    register_int_counter_with_registry, Encoder, Histogram, HistogramOpts, IntCounter,
    IntCounterVec, Opts, Registry, TextEncoder,
};

/// Central collection of all cache-level Prometheus metrics.
pub struct CacheMetrics {
    /// The Prometheus registry that owns every metric below.
    pub registry: Registry,

    // ── Counters ────────────────────────────────────────────────────────
    /// Plugin commands executed, by command name.
    pub commands_executed: IntCounterVec,
    /// Plugin commands that returned an error, by command name.
    pub command_failures: IntCounterVec,
    /// Vote results rows written by the tally engine.
    pub vote_results_materialized: IntCounter,
    /// Rebuilds of the plugin tables attempted.
    pub rebuilds: IntCounter,
    /// Rebuilds that failed during replay.
    pub rebuild_failures: IntCounter,
    /// Record mirror writes, by operation.
    pub record_writes: IntCounterVec,

    // ── Histograms ──────────────────────────────────────────────────────
    /// Time spent executing one plugin command, in milliseconds.
    pub exec_latency_ms: Histogram,
}

impl CacheMetrics {
    /// Create a fresh set of metrics, all registered under a new
    /// [`Registry`].
    pub fn new() -> Self {
        let registry = Registry::new();

        let commands_executed = register_int_counter_vec_with_registry!(
            Opts::new(
                "govcache_commands_executed_total",
                "Plugin commands executed by the cache"
            ),
            &["command"],
            registry
        )
        .expect("failed to register commands_executed counter");

        let command_failures = register_int_counter_vec_with_registry!(
            Opts::new(
                "govcache_command_failures_total",
                "Plugin commands that returned an error"
            ),
            &["command"],
            registry
        )
        .expect("failed to register command_failures counter");

        let vote_results_materialized = register_int_counter_with_registry!(
            Opts::new(
                "govcache_vote_results_materialized_total",
                "Vote results rows written by the tally engine"
            ),
            registry
        )
        .expect("failed to register vote_results_materialized counter");

        let rebuilds = register_int_counter_with_registry!(
            Opts::new("govcache_rebuilds_total", "Plugin table rebuilds attempted"),
            registry
        )
        .expect("failed to register rebuilds counter");

        let rebuild_failures = register_int_counter_with_registry!(
            Opts::new(
                "govcache_rebuild_failures_total",
                "Plugin table rebuilds that failed during replay"
            ),
            registry
        )
        .expect("failed to register rebuild_failures counter");

        let record_writes = register_int_counter_vec_with_registry!(
            Opts::new(
                "govcache_record_writes_total",
                "Writes applied to the record mirror"
            ),
            &["op"],
            registry
        )
        .expect("failed to register record_writes counter");

        let exec_latency_ms = register_histogram_with_registry!(
            HistogramOpts::new(
                "govcache_exec_latency_ms",
                "Time spent executing one plugin command in milliseconds"
            )
            .buckets(vec![0.1, 0.5, 1.0, 5.0, 10.0, 50.0, 100.0, 500.0, 1000.0]),
            registry
        )
        .expect("failed to register exec_latency_ms histogram");

        Self {
            registry,
            commands_executed,
            command_failures,
            vote_results_materialized,
            rebuilds,
            rebuild_failures,
            record_writes,
            exec_latency_ms,
        }
    }

    /// Render every metric in the Prometheus text exposition format.
    pub fn encode(&self) -> String {
        let mut buffer = Vec::new();
        let encoder = TextEncoder::new();
        encoder
            .encode(&self.registry.gather(), &mut buffer)
            .expect("encoding to an in-memory buffer cannot fail");
        String::from_utf8(buffer).expect("prometheus text format is UTF-8")
    }
}

impl Default for CacheMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_start_at_zero() {
        let m = CacheMetrics::new();
        assert_eq!(m.commands_executed.with_label_values(&["ballot"]).get(), 0);
        assert_eq!(m.rebuilds.get(), 0);
        assert_eq!(m.exec_latency_ms.get_sample_count(), 0);
    }

    #[test]
    fn encode_lists_registered_metrics() {
        let m = CacheMetrics::new();
        m.commands_executed.with_label_values(&["getcomment"]).inc();
        m.rebuild_failures.inc();
        let text = m.encode();
        assert!(text.contains("govcache_commands_executed_total{command=\"getcomment\"} 1"));
        assert!(text.contains("govcache_rebuild_failures_total 1"));
    }

    #[test]
    fn independent_registries() {
        let a = CacheMetrics::new();
        let b = CacheMetrics::new();
        a.rebuilds.inc();
        assert_eq!(b.rebuilds.get(), 0);
    }
}
