use std::sync::Arc;

use async_trait::async_trait;
use scene::{TourData, default_tour};
use tracing::debug;

use crate::adapter::PersistenceAdapter;
use crate::cache::TourCache;
use crate::error::AdapterError;
use crate::imaging::{ImageFile, ImageOptions, inline_data_uri};

/// Backend that is nothing but the local cache.
///
/// Uploads never leave the device: the image is compressed and embedded as a
/// `data:` URI.
pub struct LocalAdapter {
    cache: Arc<dyn TourCache>,
    image_options: ImageOptions,
}

impl LocalAdapter {
    pub fn new(cache: Arc<dyn TourCache>) -> Self {
        Self {
            cache,
            image_options: ImageOptions::default(),
        }
    }

    pub fn with_image_options(mut self, opts: ImageOptions) -> Self {
        self.image_options = opts;
        self
    }
}

#[async_trait]
impl PersistenceAdapter for LocalAdapter {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn load(&self) -> Result<Option<TourData>, AdapterError> {
        Ok(self.cache.read()?)
    }

    async fn save(&self, data: &TourData) -> Result<(), AdapterError> {
        self.cache.write(data)?;
        debug!(scenes = data.scenes.len(), "tour written to local cache");
        Ok(())
    }

    async fn reset(&self) -> Result<TourData, AdapterError> {
        self.cache.clear()?;
        let seed = default_tour();
        self.cache.write(&seed)?;
        Ok(seed)
    }

    async fn upload_image(&self, scene_id: &str, file: ImageFile) -> Result<String, AdapterError> {
        debug!(scene_id, name = %file.name, "embedding image inline");
        Ok(inline_data_uri(file, self.image_options).await)
    }
}
