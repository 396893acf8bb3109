use std::path::PathBuf;
use std::sync::Arc;

use auth::{AdminCredentials, hash_password};
use foundation::{Point, Rect};
use interaction::{HotspotDraft, Placement};
use persistence::ImageFile;
use pretty_assertions::assert_eq;
use scene::{Direction, default_tour};
use store::{LoadSource, TourStore};
use tour_cli::{Backend, SessionError, TourConfig, TourSession, build_adapter, build_auth};

fn config(dir: PathBuf, backend: Backend) -> TourConfig {
    let mut config = TourConfig::from_lookup(|_| None).unwrap().with_data_dir(dir);
    config.backend = backend;
    config.admin = Some(AdminCredentials {
        user: "admin".into(),
        password_hash: hash_password("pw").unwrap(),
    });
    config
}

async fn open(config: &TourConfig) -> TourSession {
    let (cache, adapter) = build_adapter(config);
    let store = TourStore::open(cache, adapter).await;
    TourSession::new(Arc::new(store), Arc::new(build_auth(config)))
}

#[tokio::test]
async fn placement_clamps_before_commit() {
    let dir = tempfile::tempdir().unwrap();
    let session = open(&config(dir.path().into(), Backend::Local)).await;
    session.sign_in("admin", "pw").await.unwrap();

    let hotspot = session
        .place_hotspot(
            "salon",
            HotspotDraft::new("Test"),
            Placement::Percent(Point::new(150.0, -10.0)),
        )
        .unwrap();
    let stored = session.store().data().hotspot("salon", &hotspot.id).cloned().unwrap();
    assert_eq!((stored.x, stored.y), (100.0, 0.0));
    assert_eq!(stored.target_scene, None);
    assert_eq!(stored.direction, None);
    assert!(stored.id.starts_with("hs-salon-"));
}

#[tokio::test]
async fn pointer_placement_outside_image_is_clamped() {
    let dir = tempfile::tempdir().unwrap();
    let session = open(&config(dir.path().into(), Backend::Local)).await;
    session.sign_in("admin", "pw").await.unwrap();

    let rect = Rect::new(100.0, 100.0, 400.0, 200.0);
    let hotspot = session
        .place_hotspot(
            "cocina",
            HotspotDraft::new("Despensa").targeting("lobby").direction(Direction::Left),
            Placement::Pointer {
                pointer: Point::new(50.0, 400.0),
                image_rect: rect,
            },
        )
        .unwrap();
    assert_eq!((hotspot.x, hotspot.y), (0.0, 100.0));
    assert_eq!(hotspot.target_scene.as_deref(), Some("lobby"));
}

#[tokio::test]
async fn viewers_cannot_place_hotspots() {
    let dir = tempfile::tempdir().unwrap();
    let session = open(&config(dir.path().into(), Backend::Local)).await;
    let err = session.place_hotspot(
        "salon",
        HotspotDraft::new("Test"),
        Placement::Percent(Point::new(10.0, 10.0)),
    );
    assert_eq!(err, Err(SessionError::NotAuthenticated));
    assert_eq!(*session.store().data(), default_tour());
}

#[tokio::test]
async fn blank_hotspot_name_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let session = open(&config(dir.path().into(), Backend::Local)).await;
    session.sign_in("admin", "pw").await.unwrap();
    let err = session.place_hotspot(
        "salon",
        HotspotDraft::new("   "),
        Placement::Percent(Point::new(10.0, 10.0)),
    );
    assert_eq!(err, Err(SessionError::InvalidHotspot));
}

#[tokio::test]
async fn local_backend_persists_between_runs() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path().into(), Backend::Local);
    {
        let session = open(&config).await;
        session.sign_in("admin", "pw").await.unwrap();
        session.editor().unwrap().remove_scene("terraza").unwrap();
        session.store().flush().await;
    }
    let session = open(&config).await;
    assert_eq!(session.store().source(), LoadSource::Remote);
    assert!(!session.store().data().contains_scene("terraza"));
}

#[tokio::test]
async fn remote_backend_uploads_scene_images() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path().into(), Backend::Remote);
    let session = open(&config).await;
    session.sign_in("admin", "pw").await.unwrap();

    let file = ImageFile::new("pano.bin", "application/octet-stream", vec![7, 7, 7]);
    let scene_id = session.create_scene("Garaje", Some(file)).await.unwrap();
    session.store().flush().await;

    let image = session.store().data().scene(&scene_id).unwrap().image.clone();
    let prefix = format!("file://{}/objects/scenes/garaje.bin?t=", dir.path().display());
    assert!(image.starts_with(&prefix), "{image}");
    assert!(dir.path().join("objects/scenes/garaje.bin").exists());

    let reopened = open(&config).await;
    assert_eq!(
        reopened.store().data().scene("garaje").map(|s| s.image.clone()),
        Some(image)
    );
}

#[tokio::test]
async fn image_for_unknown_scene_changes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let session = open(&config(dir.path().into(), Backend::Remote)).await;
    session.sign_in("admin", "pw").await.unwrap();
    let file = ImageFile::new("x.bin", "application/octet-stream", vec![1, 2, 3]);

    let err = session.replace_image("garage", file).await;
    assert_eq!(
        err,
        Err(SessionError::Store(store::StoreError::SceneNotFound("garage".into())))
    );
    assert!(!dir.path().join("objects").exists());
}
