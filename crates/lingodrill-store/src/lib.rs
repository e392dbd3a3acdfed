//! lingodrill-store: key-value store backends.
//!
//! Both backends implement [`KeyValueStore`] from `lingodrill-core`:
//! [`MemoryStore`] keeps everything in a map, [`FileStore`] keeps one JSON
//! file per key in a directory.

pub mod file;
pub mod memory;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

pub use file::FileStore;
pub use memory::MemoryStore;

use lingodrill_core::traits::KeyValueStore;

/// Open the file-backed store rooted at `dir`, creating it if needed.
pub fn open_store(dir: &Path) -> Result<Arc<dyn KeyValueStore>> {
    Ok(Arc::new(FileStore::open(dir)?))
}
