//! Pure tour edits. Each returns a new `TourData` and leaves the input alone.
//!
//! Hotspot edits go through [`update_scene`] by rewriting the owning scene's
//! hotspot list.

use scene::{Hotspot, HotspotPatch, Scene, ScenePatch, TourData};

use crate::error::StoreError;

fn scene_index(data: &TourData, scene_id: &str) -> Result<usize, StoreError> {
    data.scenes
        .iter()
        .position(|s| s.id == scene_id)
        .ok_or_else(|| StoreError::SceneNotFound(scene_id.to_string()))
}

fn check_target(data: &TourData, target: Option<&str>) -> Result<(), StoreError> {
    match target {
        Some(t) if !data.contains_scene(t) => Err(StoreError::UnknownTarget(t.to_string())),
        _ => Ok(()),
    }
}

fn check_hotspots(data: &TourData, scene_id: &str, hotspots: &[Hotspot]) -> Result<(), StoreError> {
    for (i, h) in hotspots.iter().enumerate() {
        if hotspots[..i].iter().any(|other| other.id == h.id) {
            return Err(StoreError::DuplicateHotspot {
                scene_id: scene_id.to_string(),
                hotspot_id: h.id.clone(),
            });
        }
        // A new scene's hotspots may point back at the scene itself.
        if h.target_scene.as_deref() != Some(scene_id) {
            check_target(data, h.target_scene.as_deref())?;
        }
    }
    Ok(())
}

pub fn add_scene(data: &TourData, scene: Scene) -> Result<TourData, StoreError> {
    if scene.id.is_empty() {
        return Err(StoreError::InvalidSceneName(scene.name));
    }
    if data.contains_scene(&scene.id) {
        return Err(StoreError::DuplicateScene(scene.id));
    }
    check_hotspots(data, &scene.id, &scene.hotspots)?;

    let mut next = data.clone();
    if next.scenes.is_empty() {
        next.start_scene = scene.id.clone();
    }
    next.scenes.push(scene);
    Ok(next)
}

/// Removes a scene, nulling every reference to it and moving `start_scene`
/// to the first remaining scene when it pointed at the removed one.
pub fn remove_scene(data: &TourData, scene_id: &str) -> Result<TourData, StoreError> {
    let idx = scene_index(data, scene_id)?;
    let mut next = data.clone();
    next.scenes.remove(idx);
    for scene in &mut next.scenes {
        for h in &mut scene.hotspots {
            if h.target_scene.as_deref() == Some(scene_id) {
                h.target_scene = None;
            }
        }
    }
    if next.start_scene == scene_id {
        next.start_scene = next.first_scene_id().unwrap_or_default().to_string();
    }
    Ok(next)
}

pub fn update_scene(
    data: &TourData,
    scene_id: &str,
    patch: &ScenePatch,
) -> Result<TourData, StoreError> {
    let idx = scene_index(data, scene_id)?;
    if let Some(hotspots) = &patch.hotspots {
        check_hotspots(data, scene_id, hotspots)?;
    }
    let mut next = data.clone();
    next.scenes[idx] = data.scenes[idx].patched(patch);
    Ok(next)
}

pub fn add_hotspot(data: &TourData, scene_id: &str, hotspot: Hotspot) -> Result<TourData, StoreError> {
    let scene = &data.scenes[scene_index(data, scene_id)?];
    if scene.has_hotspot(&hotspot.id) {
        return Err(StoreError::DuplicateHotspot {
            scene_id: scene_id.to_string(),
            hotspot_id: hotspot.id,
        });
    }
    let mut hotspots = scene.hotspots.clone();
    hotspots.push(hotspot);
    update_scene(data, scene_id, &ScenePatch::hotspots(hotspots))
}

pub fn remove_hotspot(data: &TourData, scene_id: &str, hotspot_id: &str) -> Result<TourData, StoreError> {
    let scene = &data.scenes[scene_index(data, scene_id)?];
    if !scene.has_hotspot(hotspot_id) {
        return Err(hotspot_not_found(scene_id, hotspot_id));
    }
    let hotspots = scene
        .hotspots
        .iter()
        .filter(|h| h.id != hotspot_id)
        .cloned()
        .collect();
    update_scene(data, scene_id, &ScenePatch::hotspots(hotspots))
}

pub fn update_hotspot(
    data: &TourData,
    scene_id: &str,
    hotspot_id: &str,
    patch: &HotspotPatch,
) -> Result<TourData, StoreError> {
    let scene = &data.scenes[scene_index(data, scene_id)?];
    if !scene.has_hotspot(hotspot_id) {
        return Err(hotspot_not_found(scene_id, hotspot_id));
    }
    let hotspots = scene
        .hotspots
        .iter()
        .map(|h| if h.id == hotspot_id { h.patched(patch) } else { h.clone() })
        .collect();
    update_scene(data, scene_id, &ScenePatch::hotspots(hotspots))
}

fn hotspot_not_found(scene_id: &str, hotspot_id: &str) -> StoreError {
    StoreError::HotspotNotFound {
        scene_id: scene_id.to_string(),
        hotspot_id: hotspot_id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foundation::Point;
    use pretty_assertions::assert_eq;
    use scene::default_tour;

    fn hotspot(id: &str, target: Option<&str>) -> Hotspot {
        Hotspot {
            id: id.into(),
            name: id.into(),
            x: 10.0,
            y: 20.0,
            target_scene: target.map(str::to_string),
            direction: None,
        }
    }

    #[test]
    fn removing_start_scene_moves_start_and_nulls_targets() {
        let seed = default_tour();
        let next = remove_scene(&seed, "lobby").unwrap();
        assert_eq!(next.start_scene, "salon");
        assert_eq!(next.scenes.len(), 4);
        assert!(next.hotspots().all(|(_, h)| h.target_scene.as_deref() != Some("lobby")));
        assert!(next.check().is_ok());
        // Input untouched.
        assert_eq!(seed, default_tour());
    }

    #[test]
    fn removing_every_scene_empties_start() {
        let mut data = default_tour();
        for id in ["lobby", "salon", "cocina", "dormitorio", "terraza"] {
            data = remove_scene(&data, id).unwrap();
            assert!(data.check().is_ok(), "after removing {id}");
        }
        assert_eq!(data, TourData::default());
    }

    #[test]
    fn first_scene_becomes_start() {
        let data = add_scene(&TourData::default(), Scene::new("patio", "Patio", "/p.jpg")).unwrap();
        assert_eq!(data.start_scene, "patio");
    }

    #[test]
    fn duplicate_scene_is_rejected() {
        let imposter = Scene::new("lobby", "Other", "/x.jpg");
        assert_eq!(
            add_scene(&default_tour(), imposter),
            Err(StoreError::DuplicateScene("lobby".into()))
        );
    }

    #[test]
    fn scene_with_self_target_is_accepted() {
        let mut scene = Scene::new("loop", "Loop", "/l.jpg");
        scene.hotspots.push(hotspot("hs-loop-1", Some("loop")));
        assert!(add_scene(&default_tour(), scene).is_ok());
    }

    #[test]
    fn hotspot_targets_must_exist() {
        assert_eq!(
            add_hotspot(&default_tour(), "salon", hotspot("hs-x", Some("garage"))),
            Err(StoreError::UnknownTarget("garage".into()))
        );
        assert_eq!(
            update_hotspot(
                &default_tour(),
                "salon",
                "hs-salon-1",
                &HotspotPatch {
                    target_scene: Some(Some("garage".into())),
                    ..HotspotPatch::default()
                }
            ),
            Err(StoreError::UnknownTarget("garage".into()))
        );
    }

    #[test]
    fn hotspot_edits_rewrite_the_owning_scene() {
        let data = add_hotspot(&default_tour(), "salon", hotspot("hs-x", None)).unwrap();
        assert_eq!(data.scene("salon").unwrap().hotspots.len(), 4);

        let data = update_hotspot(&data, "salon", "hs-x", &HotspotPatch::position(Point::new(1.0, 2.0)))
            .unwrap();
        let h = data.hotspot("salon", "hs-x").unwrap();
        assert_eq!((h.x, h.y), (1.0, 2.0));

        let data = remove_hotspot(&data, "salon", "hs-x").unwrap();
        assert_eq!(data.scene("salon"), default_tour().scene("salon"));
    }

    #[test]
    fn missing_ids_are_reported() {
        let seed = default_tour();
        assert_eq!(
            remove_scene(&seed, "garage"),
            Err(StoreError::SceneNotFound("garage".into()))
        );
        assert_eq!(
            remove_hotspot(&seed, "salon", "hs-nope"),
            Err(StoreError::HotspotNotFound {
                scene_id: "salon".into(),
                hotspot_id: "hs-nope".into()
            })
        );
        assert!(matches!(
            add_hotspot(&seed, "salon", hotspot("hs-salon-1", None)),
            Err(StoreError::DuplicateHotspot { .. })
        ));
    }

    #[test]
    fn patched_hotspot_lists_are_validated() {
        let dupes = vec![hotspot("a", None), hotspot("a", None)];
        assert!(matches!(
            update_scene(&default_tour(), "cocina", &ScenePatch::hotspots(dupes)),
            Err(StoreError::DuplicateHotspot { .. })
        ));
    }
}
