//! Actor alias subsystem
//!
//! - [`scraper`]: remote alias lookup (never writes to the store)
//! - [`store`]: the persisted directory -> aliases document
//! - [`resolver`]: alias -> directory lookups
//! - [`merger`]: add or extend an actor's aliases under the writer lock

pub mod lock;
pub mod merger;
pub mod resolver;
pub mod scraper;
pub mod store;
pub mod tools;

pub use merger::{merge_aliases, AliasMerger, MergeOutcome};
pub use resolver::AliasResolver;
pub use scraper::{parse_actor_aliases, AliasScraper};
pub use store::{AliasDirectory, AliasStore, ReverseIndex};

use crate::mcp::ToolRegistry;
use std::sync::Arc;

/// Register the three alias tools against one alias document
pub fn register_tools(registry: &mut ToolRegistry, scraper: Arc<AliasScraper>, store: AliasStore) {
    registry.register(Arc::new(tools::SearchAliasTool::new(scraper)));
    registry.register(Arc::new(tools::NameToDirTool::new(AliasResolver::new(store.clone()))));
    registry.register(Arc::new(tools::AddAliasTool::new(AliasMerger::new(store))));
}
