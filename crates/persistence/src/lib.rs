//! Durable storage for the tour: the adapter capability, the local cache and
//! the concrete backends.

pub mod adapter;
pub mod cache;
pub mod error;
pub mod imaging;
pub mod local;
pub mod remote;

pub use adapter::PersistenceAdapter;
pub use cache::{DEFAULT_CACHE_KEY, InMemoryTourCache, TourCache, read_or_absent};
#[cfg(target_arch = "wasm32")]
pub use cache::LocalStorageTourCache;
#[cfg(not(target_arch = "wasm32"))]
pub use cache::FileTourCache;
pub use error::{AdapterError, CacheError, ImageError};
pub use imaging::{ImageFile, ImageOptions, PreparedImage};
pub use local::LocalAdapter;
#[cfg(not(target_arch = "wasm32"))]
pub use remote::DirRecordStore;
pub use remote::{ConfigRecord, MemoryRecordStore, RecordStore, RemoteAdapter, SceneRecord};
