//! Optimistic local state with fire-and-forget remote sync.
//!
//! Every mutation derives the next snapshot from the latest one, swaps it in,
//! writes the local cache, and dispatches a remote save it never waits for.
//! All three happen under the state lock, so concurrent writers reach the
//! cache and the save queue in snapshot order. Remote failures are logged and
//! never roll back local state.

use std::sync::Arc;

use foundation::{Observers, Point, Subscription};
use parking_lot::Mutex;
use persistence::imaging::inline_data_uri;
use persistence::{ImageFile, ImageOptions, PersistenceAdapter, TourCache, read_or_absent};
use scene::seed::PLACEHOLDER_IMAGE;
use scene::{Hotspot, HotspotPatch, Scene, ScenePatch, TourData, default_tour};
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::events::{LoadSource, ResetOutcome, SceneImage, StoreEvent};
use crate::ops;
#[cfg(not(target_arch = "wasm32"))]
use crate::save_queue::SaveQueue;

struct State {
    data: Arc<TourData>,
    current: String,
    source: LoadSource,
}

impl State {
    fn replace(&mut self, data: TourData) -> Arc<TourData> {
        let data = Arc::new(data);
        if !data.contains_scene(&self.current) {
            self.current = data.start_scene.clone();
        }
        self.data = Arc::clone(&data);
        data
    }
}

pub struct TourStore {
    state: Mutex<State>,
    cache: Arc<dyn TourCache>,
    adapter: Arc<dyn PersistenceAdapter>,
    observers: Observers<StoreEvent>,
    image_options: ImageOptions,
    #[cfg(not(target_arch = "wasm32"))]
    saves: SaveQueue,
}

impl std::fmt::Debug for TourStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("TourStore")
            .field("scenes", &state.data.scenes.len())
            .field("current", &state.current)
            .field("source", &state.source)
            .field("backend", &self.adapter.name())
            .finish()
    }
}

impl TourStore {
    /// Starts from the local cache, or the default seed when the cache is
    /// empty or unreadable. The adapter is not contacted.
    pub fn new(cache: Arc<dyn TourCache>, adapter: Arc<dyn PersistenceAdapter>) -> Self {
        let (data, source) = match read_or_absent(cache.as_ref()) {
            Some(cached) => (cached.repaired(), LoadSource::Cache),
            None => (default_tour(), LoadSource::Seed),
        };
        debug!(?source, scenes = data.scenes.len(), "tour store initialised");
        Self {
            state: Mutex::new(State {
                current: data.start_scene.clone(),
                data: Arc::new(data),
                source,
            }),
            cache,
            adapter,
            observers: Observers::new(),
            image_options: ImageOptions::default(),
            #[cfg(not(target_arch = "wasm32"))]
            saves: SaveQueue::new(),
        }
    }

    pub fn with_image_options(mut self, opts: ImageOptions) -> Self {
        self.image_options = opts;
        self
    }

    /// [`TourStore::new`] followed by one remote load.
    pub async fn open(cache: Arc<dyn TourCache>, adapter: Arc<dyn PersistenceAdapter>) -> Self {
        let store = Self::new(cache, adapter);
        store.load_remote().await;
        store
    }

    /// Queries the adapter once. Remote data, when present, replaces memory and
    /// overwrites the cache; otherwise the current state stays authoritative.
    pub async fn load_remote(&self) -> LoadSource {
        let backend = self.adapter.name();
        match self.adapter.load().await {
            Ok(Some(remote)) => {
                let data = {
                    let mut state = self.state.lock();
                    state.source = LoadSource::Remote;
                    let data = state.replace(remote.repaired());
                    self.write_cache(&data);
                    data
                };
                info!(backend, scenes = data.scenes.len(), "tour loaded from backend");
                self.observers.notify(&StoreEvent::Loaded(LoadSource::Remote));
                LoadSource::Remote
            }
            Ok(None) => {
                let source = self.source();
                info!(backend, ?source, "backend has no tour, keeping local state");
                self.observers.notify(&StoreEvent::Loaded(source));
                source
            }
            Err(err) => {
                let source = self.source();
                warn!(backend, error = %err, ?source, "backend load failed, keeping local state");
                self.observers.notify(&StoreEvent::Loaded(source));
                source
            }
        }
    }

    pub fn data(&self) -> Arc<TourData> {
        Arc::clone(&self.state.lock().data)
    }

    pub fn source(&self) -> LoadSource {
        self.state.lock().source
    }

    pub fn backend_name(&self) -> &'static str {
        self.adapter.name()
    }

    pub fn current_scene_id(&self) -> String {
        self.state.lock().current.clone()
    }

    pub fn current_scene(&self) -> Option<Scene> {
        let state = self.state.lock();
        state.data.scene(&state.current).cloned()
    }

    /// Moves the displayed-scene pointer. `false` (and no change) when the
    /// scene does not exist.
    pub fn navigate_to(&self, scene_id: &str) -> bool {
        {
            let mut state = self.state.lock();
            if !state.data.contains_scene(scene_id) {
                return false;
            }
            state.current = scene_id.to_string();
        }
        debug!(scene_id, "navigated");
        self.observers.notify(&StoreEvent::Navigated {
            scene_id: scene_id.to_string(),
        });
        true
    }

    pub fn subscribe(&self, callback: impl Fn(&StoreEvent) + Send + Sync + 'static) -> Subscription {
        self.observers.subscribe(callback)
    }

    pub fn add_scene(&self, scene: Scene) -> Result<(), StoreError> {
        let scene_id = scene.id.clone();
        self.apply(|data| ops::add_scene(data, scene))?;
        debug!(%scene_id, "scene added");
        self.observers.notify(&StoreEvent::SceneAdded { scene_id });
        Ok(())
    }

    /// Adds a scene named `name` under a fresh slug id and returns the id.
    ///
    /// A slug already in use gets a numeric suffix rather than replacing the
    /// existing scene.
    pub fn create_scene(&self, name: &str, image: Option<String>) -> Result<String, StoreError> {
        let name = name.trim();
        let data = self.data();
        let scene_id = data
            .unique_scene_id(name)
            .ok_or_else(|| StoreError::InvalidSceneName(name.to_string()))?;
        let image = image
            .filter(|i| !i.is_empty())
            .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string());
        self.add_scene(Scene::new(scene_id.clone(), name, image))?;
        Ok(scene_id)
    }

    pub fn remove_scene(&self, scene_id: &str) -> Result<(), StoreError> {
        self.apply(|data| ops::remove_scene(data, scene_id))?;
        debug!(scene_id, "scene removed");
        self.observers.notify(&StoreEvent::SceneRemoved {
            scene_id: scene_id.to_string(),
        });
        Ok(())
    }

    pub fn update_scene(&self, scene_id: &str, patch: ScenePatch) -> Result<(), StoreError> {
        self.apply(|data| ops::update_scene(data, scene_id, &patch))?;
        debug!(scene_id, "scene updated");
        self.observers.notify(&StoreEvent::SceneUpdated {
            scene_id: scene_id.to_string(),
        });
        Ok(())
    }

    pub fn add_hotspot(&self, scene_id: &str, hotspot: Hotspot) -> Result<(), StoreError> {
        let hotspot_id = hotspot.id.clone();
        self.apply(|data| ops::add_hotspot(data, scene_id, hotspot))?;
        debug!(scene_id, %hotspot_id, "hotspot added");
        self.hotspots_changed(scene_id);
        Ok(())
    }

    pub fn remove_hotspot(&self, scene_id: &str, hotspot_id: &str) -> Result<(), StoreError> {
        self.apply(|data| ops::remove_hotspot(data, scene_id, hotspot_id))?;
        debug!(scene_id, hotspot_id, "hotspot removed");
        self.hotspots_changed(scene_id);
        Ok(())
    }

    pub fn update_hotspot(
        &self,
        scene_id: &str,
        hotspot_id: &str,
        patch: HotspotPatch,
    ) -> Result<(), StoreError> {
        self.apply(|data| ops::update_hotspot(data, scene_id, hotspot_id, &patch))?;
        debug!(scene_id, hotspot_id, "hotspot updated");
        self.hotspots_changed(scene_id);
        Ok(())
    }

    /// Commits a dragged position, clamped to the image.
    pub fn commit_hotspot_position(
        &self,
        scene_id: &str,
        hotspot_id: &str,
        position: Point,
    ) -> Result<(), StoreError> {
        self.update_hotspot(scene_id, hotspot_id, HotspotPatch::position(position.clamp_pct()))
    }

    /// Restores the default seed locally and asks the backend to do the same.
    ///
    /// The local session always ends up on the seed; a backend failure is
    /// reported through [`ResetOutcome::LocalOnly`]. Saves already queued
    /// land before the backend reset so they cannot overwrite the seed.
    pub async fn reset_data(&self) -> ResetOutcome {
        self.flush().await;
        let (seed, outcome) = match self.adapter.reset().await {
            Ok(seed) => {
                info!(backend = self.adapter.name(), "backend reset to default tour");
                (seed.repaired(), ResetOutcome::Remote)
            }
            Err(err) => {
                warn!(
                    backend = self.adapter.name(),
                    error = %err,
                    "backend reset failed, resetting locally only"
                );
                (default_tour(), ResetOutcome::LocalOnly(err))
            }
        };
        {
            let mut state = self.state.lock();
            state.current = seed.start_scene.clone();
            let data = state.replace(seed);
            self.write_cache(&data);
        }
        self.observers.notify(&StoreEvent::Reset);
        outcome
    }

    /// Uploads `file` for `scene_id` and returns its URL. Does not touch the scene.
    pub async fn upload_image(&self, scene_id: &str, file: ImageFile) -> Result<String, StoreError> {
        if !self.data().contains_scene(scene_id) {
            return Err(StoreError::SceneNotFound(scene_id.to_string()));
        }
        let url = self
            .adapter
            .upload_image(scene_id, file)
            .await
            .map_err(StoreError::Upload)?;
        info!(scene_id, "scene image uploaded");
        Ok(url)
    }

    /// Uploads `file` and points the scene at it. When the upload fails the
    /// scene gets an inline `data:` URI instead, so it stays usable offline.
    pub async fn replace_scene_image(
        &self,
        scene_id: &str,
        file: ImageFile,
    ) -> Result<SceneImage, StoreError> {
        let image = match self.upload_image(scene_id, file.clone()).await {
            Ok(url) => SceneImage::Uploaded(url),
            Err(StoreError::Upload(err)) => {
                warn!(scene_id, error = %err, "upload failed, embedding image inline");
                SceneImage::Inline(inline_data_uri(file, self.image_options).await)
            }
            Err(other) => return Err(other),
        };
        self.update_scene(scene_id, ScenePatch::image(image.url()))?;
        Ok(image)
    }

    /// Waits for every remote save dispatched so far.
    pub async fn flush(&self) {
        #[cfg(not(target_arch = "wasm32"))]
        self.saves.flush().await;
    }

    fn hotspots_changed(&self, scene_id: &str) {
        self.observers.notify(&StoreEvent::HotspotsChanged {
            scene_id: scene_id.to_string(),
        });
    }

    fn apply(
        &self,
        edit: impl FnOnce(&TourData) -> Result<TourData, StoreError>,
    ) -> Result<(), StoreError> {
        let mut state = self.state.lock();
        let next = edit(&state.data)?;
        let data = state.replace(next);
        self.write_cache(&data);
        self.dispatch_save(data);
        Ok(())
    }

    fn write_cache(&self, data: &TourData) {
        if let Err(err) = self.cache.write(data) {
            warn!(error = %err, "tour cache write failed");
        }
    }

    fn dispatch_save(&self, data: Arc<TourData>) {
        let adapter = Arc::clone(&self.adapter);
        let save = async move {
            match adapter.save(&data).await {
                Ok(()) => debug!(backend = adapter.name(), "remote save complete"),
                Err(err) => warn!(
                    backend = adapter.name(),
                    error = %err,
                    "remote save failed, local state kept"
                ),
            }
        };

        #[cfg(not(target_arch = "wasm32"))]
        if !self.saves.push(save) {
            warn!("no async runtime, remote save skipped");
        }

        #[cfg(target_arch = "wasm32")]
        wasm_bindgen_futures::spawn_local(save);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use persistence::{InMemoryTourCache, LocalAdapter};

    fn local_store() -> TourStore {
        let cache: Arc<dyn TourCache> = Arc::new(InMemoryTourCache::new());
        let adapter = Arc::new(LocalAdapter::new(Arc::clone(&cache)));
        TourStore::new(cache, adapter)
    }

    #[test]
    fn starts_from_seed_without_cache() {
        let store = local_store();
        assert_eq!(store.source(), LoadSource::Seed);
        assert_eq!(store.current_scene_id(), "lobby");
        assert_eq!(store.data().scenes.len(), 5);
    }

    #[test]
    fn starts_from_repaired_cache() {
        let mut cached = default_tour();
        cached.scenes.retain(|s| s.id != "lobby");
        let cache = Arc::new(InMemoryTourCache::new());
        cache.write(&cached).unwrap();
        let adapter = Arc::new(LocalAdapter::new(cache.clone()));
        let store = TourStore::new(cache, adapter);

        assert_eq!(store.source(), LoadSource::Cache);
        assert_eq!(store.data().start_scene, "salon");
        assert!(store.data().check().is_ok());
    }

    #[test]
    fn mutations_without_runtime_still_apply_locally() {
        let store = local_store();
        store.remove_scene("cocina").unwrap();
        assert!(!store.data().contains_scene("cocina"));
    }

    #[test]
    fn snapshots_are_copy_on_write() {
        let store = local_store();
        let before = store.data();
        store
            .update_scene("salon", ScenePatch::name("Sala de estar"))
            .unwrap();
        assert_eq!(before.scene("salon").unwrap().name, "Salón");
        assert_eq!(store.data().scene("salon").unwrap().name, "Sala de estar");
    }

    #[test]
    fn navigation_requires_an_existing_scene() {
        let store = local_store();
        assert!(store.navigate_to("terraza"));
        assert!(!store.navigate_to("garage"));
        assert_eq!(store.current_scene().unwrap().id, "terraza");
    }

    #[test]
    fn removing_current_scene_moves_pointer_to_start() {
        let store = local_store();
        store.navigate_to("cocina");
        store.remove_scene("cocina").unwrap();
        assert_eq!(store.current_scene_id(), "lobby");
    }

    #[test]
    fn create_scene_rejects_empty_slugs() {
        let store = local_store();
        assert_eq!(
            store.create_scene("  !!! ", None),
            Err(StoreError::InvalidSceneName("!!!".into()))
        );
        assert_eq!(store.data().scenes.len(), 5);
    }

    #[test]
    fn create_scene_uses_placeholder_image() {
        let store = local_store();
        let id = store.create_scene("Baño Principal", None).unwrap();
        assert_eq!(id, "bao-principal");
        assert_eq!(store.data().scene(&id).unwrap().image, PLACEHOLDER_IMAGE);
    }
}
