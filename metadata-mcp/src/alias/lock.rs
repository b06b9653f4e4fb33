//! Per-document writer locks
//!
//! Every load-modify-save on an alias document must hold the lock for that
//! document's identity. Identity is the canonical path when the file exists,
//! otherwise the absolute path.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

static STORE_LOCKS: Lazy<StoreLocks> = Lazy::new(StoreLocks::default);

/// Registry of writer locks keyed by document identity
#[derive(Default)]
pub struct StoreLocks {
    locks: Mutex<HashMap<PathBuf, Arc<tokio::sync::Mutex<()>>>>,
}

impl StoreLocks {
    /// Process-wide registry
    pub fn global() -> &'static StoreLocks {
        &STORE_LOCKS
    }

    /// Lock guarding the document at `path`
    pub fn lock_for(&self, path: &Path) -> Arc<tokio::sync::Mutex<()>> {
        let identity = store_identity(path);
        let mut locks = self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        locks.entry(identity).or_default().clone()
    }
}

fn store_identity(path: &Path) -> PathBuf {
    if let Ok(canonical) = std::fs::canonicalize(path) {
        return canonical;
    }
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
