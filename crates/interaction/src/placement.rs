//! New-hotspot placement. Coordinates are clamped here, at the point of
//! interaction, so the store only ever receives in-range positions.

use foundation::math::pointer_to_pct;
use foundation::{Millis, Point, Rect};
use scene::ids::unique_hotspot_id;
use scene::{Direction, Hotspot, Scene};

/// Where the author asked for the hotspot.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Placement {
    /// Percentages typed into the admin form.
    Percent(Point),
    /// A click on the reference image element.
    Pointer { pointer: Point, image_rect: Rect },
}

impl Placement {
    pub fn resolve(self) -> Point {
        match self {
            Placement::Percent(p) => p.clamp_pct(),
            Placement::Pointer {
                pointer,
                image_rect,
            } => pointer_to_pct(pointer, image_rect),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HotspotDraft {
    pub name: String,
    pub target_scene: Option<String>,
    pub direction: Option<Direction>,
}

impl HotspotDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn targeting(mut self, scene_id: impl Into<String>) -> Self {
        self.target_scene = Some(scene_id.into());
        self
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }
}

/// Builds the hotspot to add to `scene`, or `None` for a blank name.
///
/// An empty target string is treated as "no target".
pub fn place_hotspot(
    scene: &Scene,
    draft: HotspotDraft,
    placement: Placement,
    at: Millis,
) -> Option<Hotspot> {
    if draft.name.trim().is_empty() {
        return None;
    }
    let position = placement.resolve();
    Some(Hotspot {
        id: unique_hotspot_id(scene, at),
        name: draft.name,
        x: position.x,
        y: position.y,
        target_scene: draft.target_scene.filter(|t| !t.is_empty()),
        direction: draft.direction,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_placement_is_clamped() {
        let scene = Scene::new("salon", "Salón", "");
        let h = place_hotspot(
            &scene,
            HotspotDraft::new("Test"),
            Placement::Percent(Point::new(150.0, -10.0)),
            Millis(7),
        )
        .unwrap();
        assert_eq!((h.x, h.y), (100.0, 0.0));
        assert_eq!(h.id, "hs-salon-7");
    }

    #[test]
    fn pointer_placement_uses_image_rect() {
        let scene = Scene::new("salon", "Salón", "");
        let rect = Rect::new(100.0, 100.0, 400.0, 200.0);
        let h = place_hotspot(
            &scene,
            HotspotDraft::new("Sofá").targeting("lobby").direction(Direction::Left),
            Placement::Pointer {
                pointer: Point::new(200.0, 150.0),
                image_rect: rect,
            },
            Millis(1),
        )
        .unwrap();
        assert_eq!((h.x, h.y), (25.0, 25.0));
        assert_eq!(h.target_scene.as_deref(), Some("lobby"));
        assert_eq!(h.direction, Some(Direction::Left));
    }

    #[test]
    fn blank_name_is_rejected() {
        let scene = Scene::new("salon", "Salón", "");
        let placed = place_hotspot(
            &scene,
            HotspotDraft::new("  "),
            Placement::Percent(Point::new(50.0, 50.0)),
            Millis(1),
        );
        assert!(placed.is_none());
    }

    #[test]
    fn empty_target_means_informational() {
        let scene = Scene::new("salon", "Salón", "");
        let h = place_hotspot(
            &scene,
            HotspotDraft::new("Info").targeting(""),
            Placement::Percent(Point::new(50.0, 50.0)),
            Millis(1),
        )
        .unwrap();
        assert!(h.is_informational());
    }
}
