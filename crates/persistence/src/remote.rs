//! Remote backend over a document/row store plus an object store.
//!
//! Hosted backends have no native array type for the scene list, so each scene
//! is its own record carrying an explicit `order`. Load sorts by it; save
//! rewrites it from the in-memory sequence index.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use foundation::Millis;
use parking_lot::Mutex;
use scene::seed::bundled_image;
use scene::{Hotspot, Scene, TourData, default_tour};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::adapter::PersistenceAdapter;
use crate::error::AdapterError;
use crate::imaging::{ImageFile, ImageOptions, prepare};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigRecord {
    pub start_scene: String,
    pub updated_at_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneRecord {
    pub scene_id: String,
    pub name: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub order: Option<u32>,
    #[serde(default)]
    pub hotspots: Vec<Hotspot>,
}

impl SceneRecord {
    pub fn from_scene(scene: &Scene, order: u32) -> Self {
        Self {
            scene_id: scene.id.clone(),
            name: scene.name.clone(),
            image_url: Some(scene.image.clone()),
            order: Some(order),
            hotspots: scene.hotspots.clone(),
        }
    }

    pub fn into_scene(self) -> Scene {
        let image = self
            .image_url
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| bundled_image(&self.scene_id));
        Scene {
            id: self.scene_id,
            name: self.name,
            image,
            hotspots: self.hotspots,
        }
    }
}

/// Storage primitives a hosted backend offers.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn config(&self) -> Result<Option<ConfigRecord>, AdapterError>;
    async fn put_config(&self, config: &ConfigRecord) -> Result<(), AdapterError>;
    /// All scene records, in no particular order.
    async fn scenes(&self) -> Result<Vec<SceneRecord>, AdapterError>;
    async fn upsert_scenes(&self, records: &[SceneRecord]) -> Result<(), AdapterError>;
    async fn delete_scenes(&self, scene_ids: &[String]) -> Result<(), AdapterError>;
    /// Removes the config and every scene record. Objects are kept.
    async fn clear(&self) -> Result<(), AdapterError>;
    /// Stores `bytes` at `path` and returns its public URL.
    async fn put_object(
        &self,
        path: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, AdapterError>;
}

#[async_trait]
impl<T: RecordStore + ?Sized> RecordStore for Arc<T> {
    async fn config(&self) -> Result<Option<ConfigRecord>, AdapterError> {
        (**self).config().await
    }

    async fn put_config(&self, config: &ConfigRecord) -> Result<(), AdapterError> {
        (**self).put_config(config).await
    }

    async fn scenes(&self) -> Result<Vec<SceneRecord>, AdapterError> {
        (**self).scenes().await
    }

    async fn upsert_scenes(&self, records: &[SceneRecord]) -> Result<(), AdapterError> {
        (**self).upsert_scenes(records).await
    }

    async fn delete_scenes(&self, scene_ids: &[String]) -> Result<(), AdapterError> {
        (**self).delete_scenes(scene_ids).await
    }

    async fn clear(&self) -> Result<(), AdapterError> {
        (**self).clear().await
    }

    async fn put_object(
        &self,
        path: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, AdapterError> {
        (**self).put_object(path, content_type, bytes).await
    }
}

/// Rebuilds the aggregate from unordered records.
pub fn assemble(config: Option<ConfigRecord>, mut records: Vec<SceneRecord>) -> TourData {
    // Stable: records without an order keep their relative position, last.
    records.sort_by_key(|r| (r.order.is_none(), r.order.unwrap_or(0)));
    let scenes: Vec<Scene> = records.into_iter().map(SceneRecord::into_scene).collect();
    let start_scene = config
        .map(|c| c.start_scene)
        .filter(|s| !s.is_empty())
        .or_else(|| scenes.first().map(|s| s.id.clone()))
        .unwrap_or_default();
    TourData {
        scenes,
        start_scene,
    }
}

pub struct RemoteAdapter<R> {
    records: R,
    image_options: ImageOptions,
}

impl<R: RecordStore> RemoteAdapter<R> {
    pub fn new(records: R) -> Self {
        Self {
            records,
            image_options: ImageOptions::default(),
        }
    }

    pub fn with_image_options(mut self, opts: ImageOptions) -> Self {
        self.image_options = opts;
        self
    }

    pub fn records(&self) -> &R {
        &self.records
    }

    async fn write_all(&self, data: &TourData) -> Result<(), AdapterError> {
        self.records
            .put_config(&ConfigRecord {
                start_scene: data.start_scene.clone(),
                updated_at_ms: Millis::now().0,
            })
            .await?;

        let keep: BTreeSet<&str> = data.scenes.iter().map(|s| s.id.as_str()).collect();
        let stale: Vec<String> = self
            .records
            .scenes()
            .await?
            .into_iter()
            .map(|r| r.scene_id)
            .filter(|id| !keep.contains(id.as_str()))
            .collect();
        if !stale.is_empty() {
            debug!(count = stale.len(), "deleting stale scene records");
            self.records.delete_scenes(&stale).await?;
        }

        let records: Vec<SceneRecord> = data
            .scenes
            .iter()
            .enumerate()
            .map(|(i, s)| SceneRecord::from_scene(s, i as u32))
            .collect();
        self.records.upsert_scenes(&records).await
    }
}

#[async_trait]
impl<R: RecordStore> PersistenceAdapter for RemoteAdapter<R> {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn load(&self) -> Result<Option<TourData>, AdapterError> {
        let records = self.records.scenes().await?;
        if records.is_empty() {
            info!("remote store empty, seeding default tour");
            let seed = default_tour();
            self.write_all(&seed).await?;
            return Ok(Some(seed));
        }
        let config = self.records.config().await?;
        Ok(Some(assemble(config, records)))
    }

    async fn save(&self, data: &TourData) -> Result<(), AdapterError> {
        self.write_all(data).await
    }

    async fn reset(&self) -> Result<TourData, AdapterError> {
        self.records.clear().await?;
        let seed = default_tour();
        self.write_all(&seed).await?;
        Ok(seed)
    }

    async fn upload_image(&self, scene_id: &str, file: ImageFile) -> Result<String, AdapterError> {
        let prepared = prepare(file, self.image_options).await;
        let path = format!("scenes/{scene_id}.{}", prepared.extension());
        let url = self
            .records
            .put_object(&path, &prepared.content_type, prepared.bytes)
            .await?;
        info!(scene_id, %path, "scene image uploaded");
        Ok(format!("{url}?t={}", Millis::now()))
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    config: Option<ConfigRecord>,
    scenes: BTreeMap<String, SceneRecord>,
    objects: BTreeMap<String, (String, Vec<u8>)>,
}

/// In-process record store with an offline switch.
#[derive(Debug)]
pub struct MemoryRecordStore {
    base_url: String,
    state: Mutex<MemoryState>,
    offline: AtomicBool,
}

impl Default for MemoryRecordStore {
    fn default() -> Self {
        Self::new("memory://objects")
    }
}

impl MemoryRecordStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            state: Mutex::new(MemoryState::default()),
            offline: AtomicBool::new(false),
        }
    }

    /// While offline every operation fails with [`AdapterError::Unavailable`].
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn object(&self, path: &str) -> Option<(String, Vec<u8>)> {
        self.state.lock().objects.get(path).cloned()
    }

    pub fn config_snapshot(&self) -> Option<ConfigRecord> {
        self.state.lock().config.clone()
    }

    pub fn scene_record(&self, scene_id: &str) -> Option<SceneRecord> {
        self.state.lock().scenes.get(scene_id).cloned()
    }

    pub fn scene_count(&self) -> usize {
        self.state.lock().scenes.len()
    }

    fn online(&self) -> Result<(), AdapterError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(AdapterError::Unavailable)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn config(&self) -> Result<Option<ConfigRecord>, AdapterError> {
        self.online()?;
        Ok(self.state.lock().config.clone())
    }

    async fn put_config(&self, config: &ConfigRecord) -> Result<(), AdapterError> {
        self.online()?;
        self.state.lock().config = Some(config.clone());
        Ok(())
    }

    async fn scenes(&self) -> Result<Vec<SceneRecord>, AdapterError> {
        self.online()?;
        Ok(self.state.lock().scenes.values().cloned().collect())
    }

    async fn upsert_scenes(&self, records: &[SceneRecord]) -> Result<(), AdapterError> {
        self.online()?;
        let mut state = self.state.lock();
        for r in records {
            state.scenes.insert(r.scene_id.clone(), r.clone());
        }
        Ok(())
    }

    async fn delete_scenes(&self, scene_ids: &[String]) -> Result<(), AdapterError> {
        self.online()?;
        let mut state = self.state.lock();
        for id in scene_ids {
            state.scenes.remove(id);
        }
        Ok(())
    }

    async fn clear(&self) -> Result<(), AdapterError> {
        self.online()?;
        let mut state = self.state.lock();
        state.config = None;
        state.scenes.clear();
        Ok(())
    }

    async fn put_object(
        &self,
        path: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, AdapterError> {
        self.online()?;
        self.state
            .lock()
            .objects
            .insert(path.to_string(), (content_type.to_string(), bytes));
        Ok(format!("{}/{path}", self.base_url.trim_end_matches('/')))
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod dir_store {
    use std::collections::BTreeMap;
    use std::io::ErrorKind;
    use std::path::{Path, PathBuf};

    use async_trait::async_trait;
    use serde::Serialize;
    use serde::de::DeserializeOwned;

    use super::{ConfigRecord, RecordStore, SceneRecord};
    use crate::error::AdapterError;

    const CONFIG_FILE: &str = "config.json";
    const SCENES_FILE: &str = "scenes.json";
    const OBJECTS_DIR: &str = "objects";

    /// Record store laid out as JSON files in a directory.
    ///
    /// Operations are serialized through one async lock so concurrent saves
    /// from the same process never interleave their file writes.
    #[derive(Debug)]
    pub struct DirRecordStore {
        dir: PathBuf,
        public_url: String,
        lock: tokio::sync::Mutex<()>,
    }

    impl DirRecordStore {
        pub fn new(dir: impl Into<PathBuf>, public_url: impl Into<String>) -> Self {
            Self {
                dir: dir.into(),
                public_url: public_url.into(),
                lock: tokio::sync::Mutex::new(()),
            }
        }

        pub fn dir(&self) -> &Path {
            &self.dir
        }

        pub fn objects_dir(&self) -> PathBuf {
            self.dir.join(OBJECTS_DIR)
        }

        async fn read_json<T: DeserializeOwned>(&self, file: &str) -> Result<Option<T>, AdapterError> {
            let path = self.dir.join(file);
            match tokio::fs::read(&path).await {
                Ok(bytes) => serde_json::from_slice(&bytes)
                    .map(Some)
                    .map_err(|e| AdapterError::Corrupt(format!("{path:?}: {e}"))),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
                Err(e) => Err(AdapterError::Io(format!("read {path:?}: {e}"))),
            }
        }

        async fn write_json<T: Serialize>(&self, file: &str, value: &T) -> Result<(), AdapterError> {
            let bytes = serde_json::to_vec_pretty(value)
                .map_err(|e| AdapterError::Backend(e.to_string()))?;
            write_atomic(&self.dir.join(file), &bytes).await
        }

        async fn scene_map(&self) -> Result<BTreeMap<String, SceneRecord>, AdapterError> {
            Ok(self.read_json(SCENES_FILE).await?.unwrap_or_default())
        }

        async fn remove(&self, file: &str) -> Result<(), AdapterError> {
            let path = self.dir.join(file);
            match tokio::fs::remove_file(&path).await {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
                Err(e) => Err(AdapterError::Io(format!("remove {path:?}: {e}"))),
            }
        }
    }

    async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), AdapterError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AdapterError::Io(format!("create {parent:?}: {e}")))?;
        }
        let tmp = path.with_extension("tmp");
        tokio::fs::write(&tmp, bytes)
            .await
            .map_err(|e| AdapterError::Io(format!("write {tmp:?}: {e}")))?;
        tokio::fs::rename(&tmp, path)
            .await
            .map_err(|e| AdapterError::Io(format!("rename {tmp:?}: {e}")))
    }

    #[async_trait]
    impl RecordStore for DirRecordStore {
        async fn config(&self) -> Result<Option<ConfigRecord>, AdapterError> {
            let _guard = self.lock.lock().await;
            self.read_json(CONFIG_FILE).await
        }

        async fn put_config(&self, config: &ConfigRecord) -> Result<(), AdapterError> {
            let _guard = self.lock.lock().await;
            self.write_json(CONFIG_FILE, config).await
        }

        async fn scenes(&self) -> Result<Vec<SceneRecord>, AdapterError> {
            let _guard = self.lock.lock().await;
            Ok(self.scene_map().await?.into_values().collect())
        }

        async fn upsert_scenes(&self, records: &[SceneRecord]) -> Result<(), AdapterError> {
            let _guard = self.lock.lock().await;
            let mut map = self.scene_map().await?;
            for r in records {
                map.insert(r.scene_id.clone(), r.clone());
            }
            self.write_json(SCENES_FILE, &map).await
        }

        async fn delete_scenes(&self, scene_ids: &[String]) -> Result<(), AdapterError> {
            let _guard = self.lock.lock().await;
            let mut map = self.scene_map().await?;
            for id in scene_ids {
                map.remove(id);
            }
            self.write_json(SCENES_FILE, &map).await
        }

        async fn clear(&self) -> Result<(), AdapterError> {
            let _guard = self.lock.lock().await;
            self.remove(CONFIG_FILE).await?;
            self.remove(SCENES_FILE).await
        }

        async fn put_object(
            &self,
            path: &str,
            _content_type: &str,
            bytes: Vec<u8>,
        ) -> Result<String, AdapterError> {
            if path.split('/').any(|part| part == ".." || part.is_empty()) {
                return Err(AdapterError::Backend(format!("invalid object path: {path}")));
            }
            let _guard = self.lock.lock().await;
            write_atomic(&self.objects_dir().join(path), &bytes).await?;
            Ok(format!("{}/{path}", self.public_url.trim_end_matches('/')))
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use dir_store::DirRecordStore;
