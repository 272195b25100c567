//! TestContext - owns the temporary directory of one test
//!
//! The directory (and any LMDB environment opened in it) is removed when the
//! context is dropped, so keep the context alive as long as the store.

use std::path::Path;
use tempfile::TempDir;

/// Temporary directory scoped to one test
///
/// # Example
///
/// ```rust,no_run
/// use edger_core::testing::TestContext;
///
/// let ctx = TestContext::new();
/// let db_path = ctx.path().join("edges");
/// ```
pub struct TestContext {
    temp_dir: TempDir,
}

impl TestContext {
    /// Create a context with a fresh, existing temporary directory
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temporary directory");
        std::fs::create_dir_all(temp_dir.path()).expect("Failed to create test directory");
        Self { temp_dir }
    }

    /// Path of the temporary directory
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Keep the directory alive beyond this context
    pub fn into_temp_dir(self) -> TempDir {
        self.temp_dir
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
