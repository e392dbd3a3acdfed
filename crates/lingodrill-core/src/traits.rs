//! Seams to the host environment: key-value persistence and text-to-speech.
//!
//! Implementations of [`KeyValueStore`] live in the `lingodrill-store` crate.

use std::sync::Arc;

use crate::error::StoreError;

// ---------------------------------------------------------------------------
// Key-value store trait
// ---------------------------------------------------------------------------

/// String-keyed storage of string blobs, in the manner of browser local storage.
pub trait KeyValueStore: Send + Sync {
    /// Human-readable backend name (e.g. "memory").
    fn name(&self) -> &str;

    /// Read the value under `key`, or `None` when absent.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

// ---------------------------------------------------------------------------
// Text-to-speech trait
// ---------------------------------------------------------------------------

/// Fire-and-forget pronunciation.
///
/// Implementations must never fail loudly: a host without speech support
/// simply says nothing.
pub trait Speaker: Send + Sync {
    fn speak(&self, text: &str, locale: &str);
}

/// A speaker for hosts without text-to-speech.
pub struct SilentSpeaker;

impl Speaker for SilentSpeaker {
    fn speak(&self, text: &str, locale: &str) {
        tracing::trace!("no speech backend, skipping '{text}' ({locale})");
    }
}
