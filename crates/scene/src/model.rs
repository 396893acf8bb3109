use foundation::Point;
use serde::{Deserialize, Serialize};

use crate::ids;

/// Arrow glyph hint. Has no navigational effect.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

impl std::str::FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(Direction::Left),
            "right" => Ok(Direction::Right),
            other => Err(format!("unknown direction: {other}")),
        }
    }
}

/// Interactive marker overlaid on a scene.
///
/// `x`/`y` are percentages of the original, unscaled scene image. They are
/// clamped where the user places or drags a hotspot, never when read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hotspot {
    pub id: String,
    pub name: String,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub target_scene: Option<String>,
    #[serde(default)]
    pub direction: Option<Direction>,
}

impl Hotspot {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Informational hotspots carry a label but navigate nowhere.
    pub fn is_informational(&self) -> bool {
        self.target_scene.is_none()
    }

    pub fn patched(&self, patch: &HotspotPatch) -> Hotspot {
        let mut out = self.clone();
        if let Some(name) = &patch.name {
            out.name = name.clone();
        }
        if let Some(x) = patch.x {
            out.x = x;
        }
        if let Some(y) = patch.y {
            out.y = y;
        }
        if let Some(target) = &patch.target_scene {
            out.target_scene = target.clone();
        }
        if let Some(direction) = patch.direction {
            out.direction = direction;
        }
        out
    }
}

/// One navigable panoramic image node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Slug of the original name. Immutable after creation.
    pub id: String,
    pub name: String,
    /// Static asset path, storage URL, or inline `data:` URI.
    pub image: String,
    #[serde(default)]
    pub hotspots: Vec<Hotspot>,
}

impl Scene {
    pub fn new(id: impl Into<String>, name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            image: image.into(),
            hotspots: Vec::new(),
        }
    }

    pub fn hotspot(&self, hotspot_id: &str) -> Option<&Hotspot> {
        self.hotspots.iter().find(|h| h.id == hotspot_id)
    }

    pub fn has_hotspot(&self, hotspot_id: &str) -> bool {
        self.hotspot(hotspot_id).is_some()
    }

    /// Shallow merge; `id` is never patched.
    pub fn patched(&self, patch: &ScenePatch) -> Scene {
        let mut out = self.clone();
        if let Some(name) = &patch.name {
            out.name = name.clone();
        }
        if let Some(image) = &patch.image {
            out.image = image.clone();
        }
        if let Some(hotspots) = &patch.hotspots {
            out.hotspots = hotspots.clone();
        }
        out
    }
}

/// Partial scene update. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScenePatch {
    pub name: Option<String>,
    pub image: Option<String>,
    pub hotspots: Option<Vec<Hotspot>>,
}

impl ScenePatch {
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn image(image: impl Into<String>) -> Self {
        Self {
            image: Some(image.into()),
            ..Self::default()
        }
    }

    pub fn hotspots(hotspots: Vec<Hotspot>) -> Self {
        Self {
            hotspots: Some(hotspots),
            ..Self::default()
        }
    }
}

/// Partial hotspot update.
///
/// The nullable fields use `Option<Option<_>>`: `Some(None)` clears the value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HotspotPatch {
    pub name: Option<String>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub target_scene: Option<Option<String>>,
    pub direction: Option<Option<Direction>>,
}

impl HotspotPatch {
    pub fn position(p: Point) -> Self {
        Self {
            x: Some(p.x),
            y: Some(p.y),
            ..Self::default()
        }
    }
}

/// Aggregate root: every scene plus the start pointer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TourData {
    pub scenes: Vec<Scene>,
    #[serde(default)]
    pub start_scene: String,
}

impl TourData {
    pub fn scene(&self, scene_id: &str) -> Option<&Scene> {
        self.scenes.iter().find(|s| s.id == scene_id)
    }

    pub fn contains_scene(&self, scene_id: &str) -> bool {
        self.scene(scene_id).is_some()
    }

    pub fn first_scene_id(&self) -> Option<&str> {
        self.scenes.first().map(|s| s.id.as_str())
    }

    pub fn hotspot(&self, scene_id: &str, hotspot_id: &str) -> Option<&Hotspot> {
        self.scene(scene_id)?.hotspot(hotspot_id)
    }

    /// All hotspots, paired with the id of the scene that owns them.
    pub fn hotspots(&self) -> impl Iterator<Item = (&str, &Hotspot)> + '_ {
        self.scenes
            .iter()
            .flat_map(|s| s.hotspots.iter().map(move |h| (s.id.as_str(), h)))
    }

    /// Slug for `name` that does not collide with an existing scene.
    ///
    /// Collisions get `-2`, `-3`, ... appended. `None` when the name has no
    /// usable characters.
    pub fn unique_scene_id(&self, name: &str) -> Option<String> {
        let base = ids::scene_id_from_name(name)?;
        if !self.contains_scene(&base) {
            return Some(base);
        }
        (2u32..)
            .map(|n| format!("{base}-{n}"))
            .find(|candidate| !self.contains_scene(candidate))
    }

    /// Returns the first violated invariant, if any.
    pub fn check(&self) -> Result<(), Violation> {
        for (i, scene) in self.scenes.iter().enumerate() {
            if self.scenes[..i].iter().any(|s| s.id == scene.id) {
                return Err(Violation::DuplicateScene(scene.id.clone()));
            }
        }
        for (scene_id, h) in self.hotspots() {
            if let Some(target) = &h.target_scene {
                if !self.contains_scene(target) {
                    return Err(Violation::DanglingTarget {
                        scene_id: scene_id.to_string(),
                        hotspot_id: h.id.clone(),
                        target: target.clone(),
                    });
                }
            }
        }
        let start_ok = if self.scenes.is_empty() {
            self.start_scene.is_empty()
        } else {
            self.contains_scene(&self.start_scene)
        };
        if !start_ok {
            return Err(Violation::UnresolvedStart(self.start_scene.clone()));
        }
        Ok(())
    }

    /// Restores the referential invariants on data from an untrusted source.
    ///
    /// - Later duplicates of a scene id are dropped.
    /// - Dangling `target_scene` values become `None`.
    /// - An unresolvable `start_scene` becomes the first scene (or empty).
    pub fn repaired(mut self) -> TourData {
        let mut seen = std::collections::HashSet::new();
        self.scenes.retain(|s| seen.insert(s.id.clone()));

        let known: std::collections::HashSet<String> =
            self.scenes.iter().map(|s| s.id.clone()).collect();
        for scene in &mut self.scenes {
            for h in &mut scene.hotspots {
                if h.target_scene.as_ref().is_some_and(|t| !known.contains(t)) {
                    h.target_scene = None;
                }
            }
        }

        if !known.contains(&self.start_scene) {
            self.start_scene = self.first_scene_id().unwrap_or_default().to_string();
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    DuplicateScene(String),
    DanglingTarget {
        scene_id: String,
        hotspot_id: String,
        target: String,
    },
    UnresolvedStart(String),
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Violation::DuplicateScene(id) => write!(f, "duplicate scene id: {id}"),
            Violation::DanglingTarget {
                scene_id,
                hotspot_id,
                target,
            } => write!(
                f,
                "hotspot {scene_id}/{hotspot_id} targets missing scene {target}"
            ),
            Violation::UnresolvedStart(id) => write!(f, "start scene does not resolve: {id:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::default_tour;

    fn hs(id: &str, target: Option<&str>) -> Hotspot {
        Hotspot {
            id: id.to_string(),
            name: id.to_string(),
            x: 10.0,
            y: 20.0,
            target_scene: target.map(str::to_string),
            direction: None,
        }
    }

    #[test]
    fn seed_is_consistent() {
        assert_eq!(default_tour().check(), Ok(()));
    }

    #[test]
    fn hotspot_patch_clears_nullable_fields() {
        let mut h = hs("a", Some("lobby"));
        h.direction = Some(Direction::Left);
        let patch = HotspotPatch {
            target_scene: Some(None),
            direction: Some(None),
            ..HotspotPatch::default()
        };
        let out = h.patched(&patch);
        assert_eq!(out.target_scene, None);
        assert_eq!(out.direction, None);
        assert_eq!(out.name, "a");
    }

    #[test]
    fn scene_patch_is_shallow_and_keeps_id() {
        let mut s = Scene::new("lobby", "Lobby", "/a.jpg");
        s.hotspots.push(hs("h1", None));
        let out = s.patched(&ScenePatch::name("Entrada"));
        assert_eq!(out.id, "lobby");
        assert_eq!(out.name, "Entrada");
        assert_eq!(out.image, "/a.jpg");
        assert_eq!(out.hotspots.len(), 1);
    }

    #[test]
    fn unique_scene_id_disambiguates() {
        let mut t = TourData::default();
        t.scenes.push(Scene::new("patio", "Patio", ""));
        t.scenes.push(Scene::new("patio-2", "Patio", ""));
        assert_eq!(t.unique_scene_id("Patio").as_deref(), Some("patio-3"));
        assert_eq!(t.unique_scene_id("Jardín Norte").as_deref(), Some("jardn-norte"));
        assert_eq!(t.unique_scene_id("   "), None);
        assert_eq!(t.unique_scene_id("¿?"), None);
    }

    #[test]
    fn check_reports_dangling_target() {
        let mut t = TourData::default();
        let mut s = Scene::new("a", "A", "");
        s.hotspots.push(hs("h", Some("ghost")));
        t.scenes.push(s);
        t.start_scene = "a".into();
        assert!(matches!(t.check(), Err(Violation::DanglingTarget { .. })));
    }

    #[test]
    fn repaired_nulls_dangling_and_fixes_start() {
        let mut t = TourData::default();
        let mut a = Scene::new("a", "A", "");
        a.hotspots.push(hs("h1", Some("ghost")));
        a.hotspots.push(hs("h2", Some("b")));
        t.scenes.push(a);
        t.scenes.push(Scene::new("b", "B", ""));
        t.scenes.push(Scene::new("a", "A again", ""));
        t.start_scene = "ghost".into();

        let r = t.repaired();
        assert_eq!(r.scenes.len(), 2);
        assert_eq!(r.scenes[0].name, "A");
        assert_eq!(r.scenes[0].hotspots[0].target_scene, None);
        assert_eq!(r.scenes[0].hotspots[1].target_scene.as_deref(), Some("b"));
        assert_eq!(r.start_scene, "a");
        assert_eq!(r.check(), Ok(()));
    }

    #[test]
    fn empty_tour_has_empty_start() {
        let t = TourData {
            scenes: Vec::new(),
            start_scene: "gone".into(),
        }
        .repaired();
        assert_eq!(t.start_scene, "");
        assert_eq!(t.check(), Ok(()));
    }
}
