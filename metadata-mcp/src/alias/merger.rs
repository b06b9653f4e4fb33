//! Alias merger: add a new actor or extend an existing one
//!
//! The whole load-modify-save span runs under the document's writer lock,
//! so concurrent merges against one file are applied one after another
//! instead of overwriting each other.

use crate::alias::store::{AliasDirectory, AliasStore, ReverseIndex};
use crate::error::ToolError;
use tracing::info;

/// What a merge did to the directory table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// No alias matched; a new directory was created
    Created { directory: String },
    /// An alias matched `directory`; `appended` new aliases were added
    Updated { directory: String, appended: usize },
}

impl MergeOutcome {
    pub fn directory(&self) -> &str {
        match self {
            MergeOutcome::Created { directory } | MergeOutcome::Updated { directory, .. } => {
                directory
            }
        }
    }
}

/// Merge `aliases` into `directory`
///
/// The target is the directory of the first alias (in input order) found
/// in `index`. Its list gains every input alias it does not already hold,
/// in input order. Without a match, `best_known_name` becomes a new
/// directory holding `aliases` verbatim.
pub fn merge_aliases(
    directory: &mut AliasDirectory,
    index: &ReverseIndex,
    best_known_name: &str,
    aliases: &[String],
) -> MergeOutcome {
    let target = aliases.iter().find_map(|alias| index.get(alias)).cloned();

    match target {
        Some(target) => {
            let appended = match directory.aliases_mut(&target) {
                Some(existing) => {
                    let before = existing.len();
                    for alias in aliases {
                        if !existing.contains(alias) {
                            existing.push(alias.clone());
                        }
                    }
                    existing.len() - before
                }
                None => {
                    directory.insert(target.clone(), aliases.to_vec());
                    aliases.len()
                }
            };
            MergeOutcome::Updated {
                directory: target,
                appended,
            }
        }
        None => {
            directory.insert(best_known_name, aliases.to_vec());
            MergeOutcome::Created {
                directory: best_known_name.to_string(),
            }
        }
    }
}

/// Adds or updates actor aliases in an alias document
#[derive(Debug, Clone)]
pub struct AliasMerger {
    store: AliasStore,
}

impl AliasMerger {
    pub fn new(store: AliasStore) -> Self {
        Self { store }
    }

    /// Merge `aliases` for one actor and persist the result
    ///
    /// Returns the directory the aliases now live under. On error nothing
    /// was committed.
    pub async fn add_or_update_alias(
        &self,
        best_known_name: &str,
        aliases: &[String],
    ) -> Result<String, ToolError> {
        if best_known_name.is_empty() {
            return Err(ToolError::InvalidArguments("name must not be empty".to_string()));
        }
        if aliases.is_empty() {
            return Err(ToolError::InvalidArguments("aliases must not be empty".to_string()));
        }

        let _guard = self.store.lock_for_write().await;

        let (mut directory, index) = self.store.load().await?;
        let outcome = merge_aliases(&mut directory, &index, best_known_name, aliases);
        self.store.save(&directory).await?;

        match &outcome {
            MergeOutcome::Created { directory } => {
                info!(directory = %directory, aliases = aliases.len(), "Created actor directory");
            }
            MergeOutcome::Updated { directory, appended } => {
                info!(directory = %directory, appended = appended, "Updated actor aliases");
            }
        }

        Ok(outcome.directory().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn directory(entries: &[(&str, &[&str])]) -> AliasDirectory {
        let mut dir = AliasDirectory::new();
        for (name, aliases) in entries {
            dir.insert(*name, strings(aliases));
        }
        dir
    }

    #[test]
    fn test_union_appends_only_new_aliases_in_input_order() {
        let mut dir = directory(&[("ActorA", &["A1", "A2", "A3"])]);
        let index = dir.reverse_index();

        let aliases = strings(&["N2", "A2", "N1", "A1"]);
        let outcome = merge_aliases(&mut dir, &index, "Whatever", &aliases);

        assert_eq!(
            outcome,
            MergeOutcome::Updated {
                directory: "ActorA".to_string(),
                appended: 2
            }
        );
        assert_eq!(dir.aliases("ActorA").unwrap(), ["A1", "A2", "A3", "N2", "N1"]);
        assert!(!dir.contains_directory("Whatever"));
    }

    #[test]
    fn test_first_matching_alias_picks_target() {
        let mut dir = directory(&[("ActorA", &["A1"]), ("ActorB", &["B1"])]);
        let index = dir.reverse_index();

        let outcome = merge_aliases(&mut dir, &index, "X", &strings(&["new", "B1", "A1"]));

        assert_eq!(outcome.directory(), "ActorB");
        assert_eq!(dir.aliases("ActorB").unwrap(), ["B1", "new", "A1"]);
        assert_eq!(dir.aliases("ActorA").unwrap(), ["A1"]);
    }

    #[test]
    fn test_creation_keeps_input_verbatim() {
        let mut dir = directory(&[("ActorA", &["A1"])]);
        let index = dir.reverse_index();

        let outcome = merge_aliases(&mut dir, &index, "ActorC", &strings(&["Alias6", "Alias5"]));

        assert_eq!(
            outcome,
            MergeOutcome::Created {
                directory: "ActorC".to_string()
            }
        );
        assert_eq!(dir.aliases("ActorC").unwrap(), ["Alias6", "Alias5"]);
        assert_eq!(dir.aliases("ActorA").unwrap(), ["A1"]);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let mut dir = directory(&[("ActorA", &["A1"])]);
        let input = strings(&["A1", "A2"]);

        let index = dir.reverse_index();
        merge_aliases(&mut dir, &index, "ActorA", &input);
        let once = dir.clone();

        let index = dir.reverse_index();
        merge_aliases(&mut dir, &index, "ActorA", &input);
        assert_eq!(dir, once);
    }

    async fn merger_with(json: &str) -> (TempDir, AliasStore, AliasMerger) {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("aliases.json");
        std::fs::write(&path, json).unwrap();
        let store = AliasStore::new(path);
        (tmp, store.clone(), AliasMerger::new(store))
    }

    #[tokio::test]
    async fn test_update_existing_actor_persists() {
        let (_tmp, store, merger) = merger_with(r#"{"ActorA": ["Alias1", "Alias2"]}"#).await;

        let dir = merger
            .add_or_update_alias("ActorA", &strings(&["Alias1", "Alias2", "NewAlias3"]))
            .await
            .unwrap();
        assert_eq!(dir, "ActorA");

        let (loaded, _) = store.load().await.unwrap();
        assert_eq!(loaded.aliases("ActorA").unwrap(), ["Alias1", "Alias2", "NewAlias3"]);
    }

    #[tokio::test]
    async fn test_new_actor_persists() {
        let (_tmp, store, merger) = merger_with(r#"{"ActorA": ["Alias1", "Alias2"]}"#).await;

        let dir = merger
            .add_or_update_alias("ActorC", &strings(&["Alias5", "Alias6"]))
            .await
            .unwrap();
        assert_eq!(dir, "ActorC");

        let (loaded, _) = store.load().await.unwrap();
        assert_eq!(loaded.aliases("ActorC").unwrap(), ["Alias5", "Alias6"]);
        assert_eq!(loaded.aliases("ActorA").unwrap(), ["Alias1", "Alias2"]);
    }

    #[tokio::test]
    async fn test_empty_inputs_rejected() {
        let (_tmp, _store, merger) = merger_with("{}").await;

        let err = merger.add_or_update_alias("ActorA", &[]).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));

        let err = merger
            .add_or_update_alias("", &strings(&["Alias1"]))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[tokio::test]
    async fn test_missing_store_fails_without_creating_it() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("missing.json");
        let merger = AliasMerger::new(AliasStore::new(&path));

        let err = merger
            .add_or_update_alias("ActorA", &strings(&["Alias1"]))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::StoreUnavailable { .. }));
        assert!(!path.exists());
    }
}
