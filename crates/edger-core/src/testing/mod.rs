//! Test support shared by unit and integration tests

mod context;

pub use context::TestContext;

use crate::config::{EdgerConfig, LmdbConfig};
use crate::lmdb::LmdbEdger;
use crate::memory::MemoryEdger;

/// Open an LMDB store in a fresh temporary directory.
///
/// The returned context owns the directory; drop it after the store.
pub fn create_test_lmdb_edger(config: EdgerConfig) -> (LmdbEdger, TestContext) {
    let ctx = TestContext::new();
    let lmdb = LmdbConfig {
        map_size: 16 * 1024 * 1024,
        ..LmdbConfig::default()
    };
    let edger = LmdbEdger::open(ctx.path(), config, lmdb).expect("Failed to open LMDB edge store");
    (edger, ctx)
}

/// Create an in-memory store
pub fn create_test_memory_edger(config: EdgerConfig) -> MemoryEdger {
    MemoryEdger::new(config).expect("Failed to create memory edge store")
}
