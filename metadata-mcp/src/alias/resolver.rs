//! Alias resolver: which directory does a name belong to

use crate::alias::store::AliasStore;
use crate::error::ToolError;

/// Resolves actor names to their directory names
#[derive(Debug, Clone)]
pub struct AliasResolver {
    store: AliasStore,
}

impl AliasResolver {
    pub fn new(store: AliasStore) -> Self {
        Self { store }
    }

    /// Directory `name` maps to, or `None` when it is not a known alias
    ///
    /// Exact, case-sensitive match. Reads the current document without
    /// taking the writer lock.
    pub async fn resolve_directory(&self, name: &str) -> Result<Option<String>, ToolError> {
        let (_, index) = self.store.load().await?;
        let directory = index.get(name).cloned();
        tracing::debug!(name = %name, directory = ?directory, "Resolved actor directory");
        Ok(directory)
    }
}
