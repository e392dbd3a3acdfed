//! Test helpers.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::StoreError;
use crate::model::VocabularyItem;
use crate::traits::KeyValueStore;

/// A `HashMap` behind a lock.
#[derive(Default)]
pub struct MapStore(Mutex<HashMap<String, String>>);

impl KeyValueStore for MapStore {
    fn name(&self) -> &str {
        "map"
    }

    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.0.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.0.lock().unwrap().insert(key.into(), value.into());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.0.lock().unwrap().remove(key);
        Ok(())
    }
}

/// A store whose writes always fail.
pub struct BrokenStore;

impl KeyValueStore for BrokenStore {
    fn name(&self) -> &str {
        "broken"
    }

    fn get(&self, _: &str) -> Result<Option<String>, StoreError> {
        Ok(None)
    }

    fn set(&self, _: &str, _: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("disk full".into()))
    }

    fn remove(&self, _: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("disk full".into()))
    }
}

pub fn word(id: &str, foreign: &str, native: &str) -> VocabularyItem {
    VocabularyItem {
        id: id.into(),
        foreign: foreign.into(),
        native: native.into(),
        category: String::new(),
        difficulty: Default::default(),
        examples: vec![],
        direction: None,
    }
}
