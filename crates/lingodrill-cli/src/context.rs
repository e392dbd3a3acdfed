//! Config plus the opened store, shared by every command that persists.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context as _, Result};

use lingodrill_core::bookmarks::BookmarkStore;
use lingodrill_core::config::{load_config_from, LingodrillConfig};
use lingodrill_core::persistence::SessionStore;
use lingodrill_core::report::ResultHistory;
use lingodrill_core::traits::KeyValueStore;

pub struct AppContext {
    pub config: LingodrillConfig,
    store: Arc<dyn KeyValueStore>,
}

impl AppContext {
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config = load_config_from(config_path)?;
        let store = lingodrill_store::open_store(&config.storage.dir).with_context(|| {
            format!("failed to open storage at {}", config.storage.dir.display())
        })?;
        tracing::debug!(
            "using {} store at {}",
            store.name(),
            config.storage.dir.display()
        );
        Ok(Self { config, store })
    }

    pub fn sessions(&self) -> SessionStore {
        SessionStore::new(self.store.clone(), &self.config.storage.prefix)
    }

    pub fn history(&self) -> ResultHistory {
        ResultHistory::new(self.store.clone(), &self.config.storage.prefix)
    }

    pub fn bookmarks(&self) -> BookmarkStore {
        BookmarkStore::new(self.store.clone(), &self.config.storage.prefix)
    }
}
