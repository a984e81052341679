//! Identity of the governance plugin.

/// Plugin identifier. Keys the schema-version marker in the cache.
pub const PLUGIN_ID: &str = "governance";

/// Version of the cache tables this build writes and expects to read.
///
/// Bumping it forces every existing cache to be rebuilt on the next start.
/// It may differ from the version of the plugin running in the
/// authoritative store.
pub const PLUGIN_CACHE_VERSION: &str = "1.1";
