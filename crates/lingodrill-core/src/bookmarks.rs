//! Bookmarked words and grammar rules.

use std::sync::Arc;

use crate::error::StoreError;
use crate::model::{Bookmark, BookmarkKind, Catalog, GrammarRule, VocabularyItem};
use crate::persistence::{load_blob, save_blob, storage_key};
use crate::traits::KeyValueStore;

/// A bookmark looked up in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookmarkedItem<'a> {
    Word(&'a VocabularyItem),
    Rule(&'a GrammarRule),
}

/// The persisted bookmark set, in insertion order.
#[derive(Clone)]
pub struct BookmarkStore {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl BookmarkStore {
    pub fn new(store: Arc<dyn KeyValueStore>, prefix: &str) -> Self {
        Self {
            store,
            key: storage_key(prefix, "bookmarks"),
        }
    }

    pub fn list(&self) -> Result<Vec<Bookmark>, StoreError> {
        Ok(load_blob(self.store.as_ref(), &self.key)?.unwrap_or_default())
    }

    pub fn is_bookmarked(&self, item_id: &str, kind: BookmarkKind) -> Result<bool, StoreError> {
        Ok(self
            .list()?
            .iter()
            .any(|b| b.item_id == item_id && b.item_type == kind))
    }

    /// Returns `false` if the bookmark was already there.
    pub fn add(&self, item_id: &str, kind: BookmarkKind) -> Result<bool, StoreError> {
        let mut bookmarks = self.list()?;
        let bookmark = Bookmark::new(item_id, kind);
        if bookmarks.contains(&bookmark) {
            return Ok(false);
        }
        bookmarks.push(bookmark);
        save_blob(self.store.as_ref(), &self.key, &bookmarks)?;
        tracing::debug!("bookmarked {kind} '{item_id}'");
        Ok(true)
    }

    /// Returns `false` if there was nothing to remove.
    pub fn remove(&self, item_id: &str, kind: BookmarkKind) -> Result<bool, StoreError> {
        let mut bookmarks = self.list()?;
        let before = bookmarks.len();
        bookmarks.retain(|b| !(b.item_id == item_id && b.item_type == kind));
        if bookmarks.len() == before {
            return Ok(false);
        }
        save_blob(self.store.as_ref(), &self.key, &bookmarks)?;
        tracing::debug!("removed bookmark {kind} '{item_id}'");
        Ok(true)
    }

    /// Flip the bookmark and return whether it is now set.
    pub fn toggle(&self, item_id: &str, kind: BookmarkKind) -> Result<bool, StoreError> {
        if self.remove(item_id, kind)? {
            Ok(false)
        } else {
            self.add(item_id, kind)
        }
    }

    /// Look every bookmark up in `catalog`, skipping ones that no longer exist.
    pub fn resolve<'a>(&self, catalog: &'a Catalog) -> Result<Vec<BookmarkedItem<'a>>, StoreError> {
        Ok(self
            .list()?
            .iter()
            .filter_map(|b| match b.item_type {
                BookmarkKind::Word => catalog.word_by_id(&b.item_id).map(BookmarkedItem::Word),
                BookmarkKind::GrammarRule => {
                    catalog.rule_by_id(&b.item_id).map(BookmarkedItem::Rule)
                }
            })
            .collect())
    }
}
