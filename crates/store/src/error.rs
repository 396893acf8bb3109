use persistence::AdapterError;

/// Rejected mutation. The store is unchanged whenever one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("scene not found: {0}")]
    SceneNotFound(String),
    #[error("hotspot {hotspot_id} not found in scene {scene_id}")]
    HotspotNotFound { scene_id: String, hotspot_id: String },
    #[error("scene id already in use: {0}")]
    DuplicateScene(String),
    #[error("hotspot {hotspot_id} already exists in scene {scene_id}")]
    DuplicateHotspot { scene_id: String, hotspot_id: String },
    #[error("hotspot target is not a scene: {0}")]
    UnknownTarget(String),
    #[error("scene name has no usable characters: {0:?}")]
    InvalidSceneName(String),
    #[error("image upload failed: {0}")]
    Upload(#[source] AdapterError),
}
