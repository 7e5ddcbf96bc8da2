//! Integration tests for Pocket Cart.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p pocket-cart-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_scenarios` - End-to-end cart operation sequences over the
//!   in-memory backend
//! - `persistence` - Snapshot durability, recovery, and the file backend

use std::path::{Path, PathBuf};

/// A unique temp directory for a file-storage test, removed on drop.
pub struct TempDataDir {
    path: PathBuf,
}

impl TempDataDir {
    /// Create a fresh directory path under the system temp dir. The
    /// directory itself is created lazily by the storage backend.
    #[must_use]
    pub fn new(label: &str) -> Self {
        let path = std::env::temp_dir().join(format!(
            "pocket-cart-it-{label}-{pid}",
            pid = std::process::id()
        ));
        Self { path }
    }

    /// The directory path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempDataDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}
