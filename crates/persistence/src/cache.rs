//! Local tour cache: a single serialized [`TourData`] under one well-known key.
//!
//! The cache is what the UI reads instantly on startup and what every
//! optimistic mutation writes through. Unparsable content is reported as
//! [`CacheError::Corrupt`]; [`read_or_absent`] turns that into "no cache" so
//! callers fall back to the seed.

use parking_lot::Mutex;
use scene::TourData;
use scene::codec;
use tracing::warn;

use crate::error::CacheError;

pub const DEFAULT_CACHE_KEY: &str = "tourData";

pub trait TourCache: Send + Sync {
    fn read(&self) -> Result<Option<TourData>, CacheError>;
    fn write(&self, data: &TourData) -> Result<(), CacheError>;
    fn clear(&self) -> Result<(), CacheError>;
}

/// Reads the cache, logging and discarding corrupt or unreachable content.
pub fn read_or_absent(cache: &dyn TourCache) -> Option<TourData> {
    match cache.read() {
        Ok(data) => data,
        Err(err) => {
            warn!(error = %err, "tour cache unreadable, treating as empty");
            None
        }
    }
}

fn decode(raw: &str) -> Result<Option<TourData>, CacheError> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    codec::from_json(raw)
        .map(Some)
        .map_err(|e| CacheError::Corrupt(e.to_string()))
}

fn encode(data: &TourData) -> Result<String, CacheError> {
    codec::to_json(data).map_err(|e| CacheError::Io(e.to_string()))
}

/// Process-local cache holding the raw serialized form, like a storage slot.
#[derive(Debug, Default)]
pub struct InMemoryTourCache {
    raw: Mutex<Option<String>>,
}

impl InMemoryTourCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populated slot; `raw` need not be valid.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            raw: Mutex::new(Some(raw.into())),
        }
    }

    pub fn raw(&self) -> Option<String> {
        self.raw.lock().clone()
    }
}

impl TourCache for InMemoryTourCache {
    fn read(&self) -> Result<Option<TourData>, CacheError> {
        match self.raw.lock().as_deref() {
            Some(raw) => decode(raw),
            None => Ok(None),
        }
    }

    fn write(&self, data: &TourData) -> Result<(), CacheError> {
        let raw = encode(data)?;
        *self.raw.lock() = Some(raw);
        Ok(())
    }

    fn clear(&self) -> Result<(), CacheError> {
        *self.raw.lock() = None;
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod file_storage {
    use std::io::ErrorKind;
    use std::path::{Path, PathBuf};

    use scene::TourData;

    use super::{TourCache, decode, encode};
    use crate::error::CacheError;

    /// `<dir>/<key>.json`, the native stand-in for a localStorage slot.
    #[derive(Debug, Clone)]
    pub struct FileTourCache {
        path: PathBuf,
    }

    impl FileTourCache {
        pub fn new(dir: impl AsRef<Path>, key: &str) -> Self {
            Self {
                path: dir.as_ref().join(format!("{key}.json")),
            }
        }

        pub fn path(&self) -> &Path {
            &self.path
        }
    }

    impl TourCache for FileTourCache {
        fn read(&self) -> Result<Option<TourData>, CacheError> {
            match std::fs::read_to_string(&self.path) {
                Ok(raw) => decode(&raw),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
                Err(e) => Err(CacheError::Io(format!("read {:?}: {e}", self.path))),
            }
        }

        fn write(&self, data: &TourData) -> Result<(), CacheError> {
            let raw = encode(data)?;
            if let Some(parent) = self.path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| CacheError::Io(format!("create {parent:?}: {e}")))?;
            }
            // Write-then-rename so a crash never leaves a torn cache behind.
            let tmp = self.path.with_extension("json.tmp");
            std::fs::write(&tmp, raw).map_err(|e| CacheError::Io(format!("write {tmp:?}: {e}")))?;
            std::fs::rename(&tmp, &self.path)
                .map_err(|e| CacheError::Io(format!("rename {tmp:?}: {e}")))
        }

        fn clear(&self) -> Result<(), CacheError> {
            match std::fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
                Err(e) => Err(CacheError::Io(format!("remove {:?}: {e}", self.path))),
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use file_storage::FileTourCache;

#[cfg(target_arch = "wasm32")]
mod wasm_storage {
    use scene::TourData;

    use super::{TourCache, decode, encode};
    use crate::error::CacheError;

    #[derive(Debug)]
    pub struct LocalStorageTourCache {
        key: String,
    }

    impl LocalStorageTourCache {
        pub fn new(key: impl Into<String>) -> Result<Self, CacheError> {
            let store = Self { key: key.into() };
            // Fail early when storage is disabled (private mode, sandboxed iframe).
            window_local_storage()?;
            Ok(store)
        }
    }

    impl TourCache for LocalStorageTourCache {
        fn read(&self) -> Result<Option<TourData>, CacheError> {
            let storage = window_local_storage()?;
            let raw = storage
                .get_item(&self.key)
                .map_err(|e| CacheError::Io(format!("get_item failed: {:?}", e)))?;
            match raw {
                Some(raw) => decode(&raw),
                None => Ok(None),
            }
        }

        fn write(&self, data: &TourData) -> Result<(), CacheError> {
            let raw = encode(data)?;
            let storage = window_local_storage()?;
            storage
                .set_item(&self.key, &raw)
                .map_err(|e| CacheError::Io(format!("set_item failed: {:?}", e)))
        }

        fn clear(&self) -> Result<(), CacheError> {
            let storage = window_local_storage()?;
            storage
                .remove_item(&self.key)
                .map_err(|e| CacheError::Io(format!("remove_item failed: {:?}", e)))
        }
    }

    fn window_local_storage() -> Result<web_sys::Storage, CacheError> {
        let win = web_sys::window().ok_or(CacheError::StorageUnavailable)?;
        win.local_storage()
            .map_err(|e| CacheError::Io(format!("localStorage error: {:?}", e)))?
            .ok_or(CacheError::StorageUnavailable)
    }
}

#[cfg(target_arch = "wasm32")]
pub use wasm_storage::LocalStorageTourCache;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use scene::default_tour;

    #[test]
    fn memory_cache_round_trips() {
        let cache = InMemoryTourCache::new();
        assert_eq!(cache.read(), Ok(None));
        cache.write(&default_tour()).unwrap();
        assert_eq!(cache.read().unwrap(), Some(default_tour()));
        cache.clear().unwrap();
        assert_eq!(cache.read(), Ok(None));
    }

    #[test]
    fn corrupt_content_reads_as_absent() {
        let cache = InMemoryTourCache::with_raw("{\"scenes\": [");
        assert!(matches!(cache.read(), Err(CacheError::Corrupt(_))));
        assert_eq!(read_or_absent(&cache), None);
    }

    #[test]
    fn blank_content_is_absent() {
        let cache = InMemoryTourCache::with_raw("   ");
        assert_eq!(cache.read(), Ok(None));
    }

    #[test]
    fn file_cache_round_trips_and_clears() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileTourCache::new(dir.path().join("nested"), DEFAULT_CACHE_KEY);
        assert_eq!(cache.read(), Ok(None));
        cache.write(&default_tour()).unwrap();
        assert!(cache.path().ends_with("nested/tourData.json"));
        assert_eq!(cache.read().unwrap(), Some(default_tour()));
        cache.clear().unwrap();
        cache.clear().unwrap();
        assert_eq!(cache.read(), Ok(None));
    }

    #[test]
    fn file_cache_corruption_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileTourCache::new(dir.path(), "k");
        std::fs::write(cache.path(), "garbage").unwrap();
        assert_eq!(read_or_absent(&cache), None);
    }
}
