use persistence::AdapterError;

/// Where the in-memory tour last came from.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LoadSource {
    /// The persistence adapter answered and its data won.
    Remote,
    Cache,
    Seed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResetOutcome {
    /// Backend wiped and reseeded.
    Remote,
    /// Backend reset failed; only the local session and cache were reset.
    LocalOnly(AdapterError),
}

impl ResetOutcome {
    pub fn is_remote(&self) -> bool {
        matches!(self, ResetOutcome::Remote)
    }
}

/// Value written to a scene's `image` by the replace-image flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneImage {
    Uploaded(String),
    /// `data:` URI used because the upload failed.
    Inline(String),
}

impl SceneImage {
    pub fn url(&self) -> &str {
        match self {
            SceneImage::Uploaded(url) | SceneImage::Inline(url) => url,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    Loaded(LoadSource),
    SceneAdded { scene_id: String },
    SceneRemoved { scene_id: String },
    SceneUpdated { scene_id: String },
    HotspotsChanged { scene_id: String },
    Reset,
    Navigated { scene_id: String },
}
