//! LMDB storage backend for the governance cache.
//!
//! Implements the storage traits from `govcache-store` using the `heed` LMDB
//! bindings. Every table maps to one named LMDB database within a single
//! environment; values are bincode-encoded rows.

pub mod environment;
pub mod error;
pub mod plugin;
pub mod record;
pub mod write_batch;

pub use environment::LmdbEnvironment;
pub use error::LmdbError;
pub use write_batch::WriteBatch;

use std::ops::Bound;

/// Range bounds covering every key that starts with `prefix`, given its
/// [`govcache_store::keys::prefix_end`].
pub(crate) fn prefix_bounds<'a>(
    prefix: &'a [u8],
    end: Option<&'a [u8]>,
) -> (Bound<&'a [u8]>, Bound<&'a [u8]>) {
    match end {
        Some(end) => (Bound::Included(prefix), Bound::Excluded(end)),
        None => (Bound::Included(prefix), Bound::Unbounded),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use govcache_store::keys::prefix_end;

    #[test]
    fn all_ff_prefix_scans_to_the_end() {
        let end = prefix_end(&[0xff]);
        assert_eq!(
            prefix_bounds(&[0xff], end.as_deref()),
            (Bound::Included(&[0xff][..]), Bound::Unbounded)
        );
        let end = prefix_end(b"ab\0");
        assert_eq!(
            prefix_bounds(b"ab\0", end.as_deref()).1,
            Bound::Excluded(&b"ab\x01"[..])
        );
    }
}
