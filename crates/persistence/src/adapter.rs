use async_trait::async_trait;
use scene::TourData;

use crate::error::AdapterError;
use crate::imaging::ImageFile;

/// Durable home of the tour and its scene images.
///
/// One implementation is chosen at the composition root; the store only sees
/// this capability set.
#[async_trait]
pub trait PersistenceAdapter: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// `Ok(None)` means the backend has nothing to offer; the caller keeps its
    /// cache or the seed.
    async fn load(&self) -> Result<Option<TourData>, AdapterError>;

    /// Best-effort full write of `data`.
    async fn save(&self, data: &TourData) -> Result<(), AdapterError>;

    /// Wipes the backend, reseeds it, and returns the seed.
    async fn reset(&self) -> Result<TourData, AdapterError>;

    /// Stores a downscaled, re-encoded copy of `file` and returns its URL.
    async fn upload_image(&self, scene_id: &str, file: ImageFile) -> Result<String, AdapterError>;
}
