//! Alias store: the persisted `directory name -> aliases` document
//!
//! The document is a single JSON object whose keys are actor directory
//! names and whose values are alias arrays. It is read whole on every
//! operation and replaced whole on every write; there is no in-process
//! cache and no incremental format.
//!
//! Writes go to a temporary sibling file that is fsynced and renamed over
//! the destination, so a failed save leaves the previous document intact.

use crate::alias::lock::StoreLocks;
use crate::error::ToolError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::OwnedMutexGuard;
use tracing::{debug, info, warn};

/// Reverse index: alias -> directory name
pub type ReverseIndex = HashMap<String, String>;

/// Directory name -> ordered alias list
///
/// Keys are kept sorted so the serialized document is stable and diffable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AliasDirectory(BTreeMap<String, Vec<String>>);

impl AliasDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Aliases stored for `directory`
    pub fn aliases(&self, directory: &str) -> Option<&[String]> {
        self.0.get(directory).map(Vec::as_slice)
    }

    pub fn contains_directory(&self, directory: &str) -> bool {
        self.0.contains_key(directory)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Replace the alias list of `directory`
    pub fn insert(&mut self, directory: impl Into<String>, aliases: Vec<String>) {
        self.0.insert(directory.into(), aliases);
    }

    pub(crate) fn aliases_mut(&mut self, directory: &str) -> Option<&mut Vec<String>> {
        self.0.get_mut(directory)
    }

    /// Build the alias -> directory index
    ///
    /// When the same alias is listed under two directories the one visited
    /// last (directory key order) wins. Every such collision is logged.
    pub fn reverse_index(&self) -> ReverseIndex {
        let mut index = ReverseIndex::new();
        for (directory, aliases) in &self.0 {
            for alias in aliases {
                if let Some(previous) = index.insert(alias.clone(), directory.clone()) {
                    if previous != *directory {
                        warn!(
                            alias = %alias,
                            kept = %directory,
                            dropped = %previous,
                            "Alias listed under multiple directories"
                        );
                    }
                }
            }
        }
        index
    }
}

/// Handle on one alias document
#[derive(Debug, Clone)]
pub struct AliasStore {
    path: PathBuf,
    /// Where temporary files are staged; next to the document when unset
    temp_dir: Option<PathBuf>,
}

impl AliasStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            temp_dir: None,
        }
    }

    #[cfg(test)]
    fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the document and derive its reverse index
    pub async fn load(&self) -> Result<(AliasDirectory, ReverseIndex), ToolError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| ToolError::store_unavailable(&self.path, e))?;

        let directory: AliasDirectory = serde_json::from_slice(&bytes)
            .map_err(|e| ToolError::malformed_store(&self.path, e))?;

        let index = directory.reverse_index();
        debug!(
            path = %self.path.display(),
            directories = directory.len(),
            aliases = index.len(),
            "Alias store loaded"
        );
        Ok((directory, index))
    }

    /// Atomically replace the document with `directory`
    pub async fn save(&self, directory: &AliasDirectory) -> Result<(), ToolError> {
        let data = serde_json::to_vec_pretty(directory)
            .map_err(|e| ToolError::store_write(&self.path, e))?;

        // Removed on every exit path, including a dropped future, unless committed
        let temp = TempFile::new(self.temp_path());
        write_synced(temp.path(), &data)
            .await
            .map_err(|e| ToolError::store_write(&self.path, e))?;
        tokio::fs::rename(temp.path(), &self.path)
            .await
            .map_err(|e| ToolError::store_write(&self.path, e))?;
        temp.commit();

        debug!(
            path = %self.path.display(),
            directories = directory.len(),
            "Alias store saved"
        );
        Ok(())
    }

    /// Create an empty `{}` document (and parent directories) if none exists
    ///
    /// Returns true if the file was created.
    pub async fn ensure_exists(&self) -> Result<bool, ToolError> {
        if tokio::fs::try_exists(&self.path)
            .await
            .map_err(|e| ToolError::store_unavailable(&self.path, e))?
        {
            return Ok(false);
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ToolError::store_write(&self.path, e))?;
        }

        self.save(&AliasDirectory::new()).await?;
        info!(path = %self.path.display(), "Created empty alias store");
        Ok(true)
    }

    /// Exclusive writer guard for this document, shared by every store
    /// handle pointing at the same file
    pub async fn lock_for_write(&self) -> OwnedMutexGuard<()> {
        StoreLocks::global().lock_for(&self.path).lock_owned().await
    }

    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "aliases".to_string());
        let temp_name = format!(".{}.{}.tmp", file_name, uuid::Uuid::new_v4());
        match &self.temp_dir {
            Some(dir) => dir.join(temp_name),
            None => self.path.with_file_name(temp_name),
        }
    }
}

/// Temporary file deleted on drop unless committed
struct TempFile {
    path: PathBuf,
    committed: bool,
}

impl TempFile {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            committed: false,
        }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    /// The file has been renamed into place; keep it
    fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        if !self.committed {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

async fn write_synced(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(data).await?;
    file.write_all(b"\n").await?;
    file.sync_all().await?;
    Ok(())
}
