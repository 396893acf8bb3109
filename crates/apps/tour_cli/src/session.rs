//! Admin editing session: the store and the interaction controller, gated
//! behind an authenticated administrator.

use std::sync::Arc;

use auth::{AuthAdapter, AuthError, Session};
use foundation::{Millis, Subscription};
use interaction::{Effect, HotspotDraft, InteractionController, Mode, Placement, place_hotspot};
use parking_lot::Mutex;
use persistence::ImageFile;
use scene::Hotspot;
use store::{ResetOutcome, SceneImage, StoreError, TourStore};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("sign in as administrator first")]
    NotAuthenticated,
    #[error("hotspot needs a name")]
    InvalidHotspot,
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct TourSession {
    store: Arc<TourStore>,
    auth: Arc<dyn AuthAdapter>,
    controller: Arc<Mutex<InteractionController>>,
    _auth_changes: Subscription,
}

impl TourSession {
    /// Wires the controller to auth state: editor mode exactly while signed in.
    pub fn new(store: Arc<TourStore>, auth: Arc<dyn AuthAdapter>) -> Self {
        let controller = Arc::new(Mutex::new(InteractionController::default()));
        let weak = Arc::downgrade(&controller);
        let subscription = auth.on_auth_change(Box::new(move |session: &Option<Session>| {
            let Some(controller) = weak.upgrade() else {
                return;
            };
            let mode = if session.is_some() {
                Mode::Editor
            } else {
                Mode::Viewer
            };
            debug!(?mode, "auth state changed");
            controller.lock().set_mode(mode);
        }));
        Self {
            store,
            auth,
            controller,
            _auth_changes: subscription,
        }
    }

    pub fn store(&self) -> &Arc<TourStore> {
        &self.store
    }

    /// Runs `f` with the controller locked. Do not call back into the
    /// session from `f`; the lock is not re-entrant.
    pub fn with_controller<R>(&self, f: impl FnOnce(&mut InteractionController) -> R) -> R {
        f(&mut self.controller.lock())
    }

    pub fn is_editing(&self) -> bool {
        self.controller.lock().mode() == Mode::Editor
    }

    /// Bad credentials leave the session in viewer mode.
    pub async fn sign_in(&self, user: &str, password: &str) -> Result<Session, SessionError> {
        Ok(self.auth.sign_in(user, password).await?)
    }

    pub async fn sign_out(&self) -> Result<(), SessionError> {
        Ok(self.auth.sign_out().await?)
    }

    /// The store, for mutations. Fails unless an administrator is signed in.
    pub fn editor(&self) -> Result<&TourStore, SessionError> {
        if self.is_editing() {
            Ok(&self.store)
        } else {
            Err(SessionError::NotAuthenticated)
        }
    }

    /// Builds a hotspot from `draft` at the clamped placement and adds it.
    pub fn place_hotspot(
        &self,
        scene_id: &str,
        draft: HotspotDraft,
        placement: Placement,
    ) -> Result<Hotspot, SessionError> {
        let store = self.editor()?;
        let data = store.data();
        let scene = data
            .scene(scene_id)
            .ok_or_else(|| StoreError::SceneNotFound(scene_id.to_string()))?;
        let hotspot =
            place_hotspot(scene, draft, placement, Millis::now()).ok_or(SessionError::InvalidHotspot)?;
        store.add_hotspot(scene_id, hotspot.clone())?;
        Ok(hotspot)
    }

    /// Carries out what a gesture asked for. Navigation is open to everyone;
    /// committing a drag needs an editor.
    pub fn apply_effect(&self, effect: Effect) -> Result<(), SessionError> {
        match effect {
            Effect::Navigate { scene_id } => {
                if self.store.navigate_to(&scene_id) {
                    self.controller.lock().reset();
                    Ok(())
                } else {
                    Err(StoreError::SceneNotFound(scene_id).into())
                }
            }
            Effect::Commit {
                hotspot_id,
                position,
            } => {
                let store = self.editor()?;
                let scene_id = store.current_scene_id();
                store.commit_hotspot_position(&scene_id, &hotspot_id, position)?;
                Ok(())
            }
            Effect::ToggleEditor { .. } | Effect::Activated { .. } | Effect::Deactivated { .. } => {
                Ok(())
            }
        }
    }

    /// Creates a scene, then uploads its image when one is given.
    pub async fn create_scene(
        &self,
        name: &str,
        image: Option<ImageFile>,
    ) -> Result<String, SessionError> {
        let scene_id = self.editor()?.create_scene(name, None)?;
        if let Some(file) = image {
            self.replace_image(&scene_id, file).await?;
        }
        Ok(scene_id)
    }

    pub async fn replace_image(
        &self,
        scene_id: &str,
        file: ImageFile,
    ) -> Result<SceneImage, SessionError> {
        Ok(self.editor()?.replace_scene_image(scene_id, file).await?)
    }

    pub async fn reset(&self) -> Result<ResetOutcome, SessionError> {
        Ok(self.editor()?.reset_data().await)
    }
}
