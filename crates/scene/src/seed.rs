//! Compiled-in default tour.

use crate::model::{Direction, Hotspot, Scene, TourData};

pub const DEFAULT_START_SCENE: &str = "lobby";

/// Image used for scenes created without one.
pub const PLACEHOLDER_IMAGE: &str = "/scenes/scene-lobby.svg";

/// Static asset path for a scene's bundled panorama.
pub fn bundled_image(scene_id: &str) -> String {
    format!("/scenes/scene-{scene_id}.jpg")
}

type HotspotRow = (&'static str, &'static str, f64, f64, Option<&'static str>, Option<Direction>);

const SCENES: [(&str, &str, [HotspotRow; 3]); 5] = [
    (
        "lobby",
        "Lobby",
        [
            ("hs-lobby-1", "Ir al Salón", 35.0, 50.0, Some("salon"), Some(Direction::Left)),
            ("hs-lobby-2", "Ir a la Cocina", 65.0, 50.0, Some("cocina"), Some(Direction::Right)),
            ("hs-lobby-3", "Recepción", 50.0, 60.0, None, None),
        ],
    ),
    (
        "salon",
        "Salón",
        [
            ("hs-salon-1", "Volver al Lobby", 20.0, 50.0, Some("lobby"), Some(Direction::Left)),
            ("hs-salon-2", "Ir al Dormitorio", 75.0, 45.0, Some("dormitorio"), Some(Direction::Right)),
            ("hs-salon-3", "Sofá Principal", 50.0, 55.0, None, None),
        ],
    ),
    (
        "cocina",
        "Cocina",
        [
            ("hs-cocina-1", "Volver al Lobby", 15.0, 50.0, Some("lobby"), Some(Direction::Left)),
            ("hs-cocina-2", "Ir a la Terraza", 80.0, 45.0, Some("terraza"), Some(Direction::Right)),
            ("hs-cocina-3", "Isla Central", 50.0, 60.0, None, None),
        ],
    ),
    (
        "dormitorio",
        "Dormitorio",
        [
            ("hs-dorm-1", "Volver al Salón", 25.0, 50.0, Some("salon"), Some(Direction::Left)),
            ("hs-dorm-2", "Ir a la Terraza", 70.0, 45.0, Some("terraza"), Some(Direction::Right)),
            ("hs-dorm-3", "Cama", 50.0, 55.0, None, None),
        ],
    ),
    (
        "terraza",
        "Terraza",
        [
            ("hs-terraza-1", "Volver a la Cocina", 30.0, 50.0, Some("cocina"), Some(Direction::Left)),
            ("hs-terraza-2", "Volver al Dormitorio", 70.0, 50.0, Some("dormitorio"), Some(Direction::Right)),
            ("hs-terraza-3", "Mirador", 50.0, 40.0, None, None),
        ],
    ),
];

/// Five scenes, three hotspots each, starting in the lobby.
pub fn default_tour() -> TourData {
    let scenes = SCENES
        .iter()
        .map(|(id, name, hotspots)| Scene {
            id: id.to_string(),
            name: name.to_string(),
            image: bundled_image(id),
            hotspots: hotspots
                .iter()
                .map(|(hid, hname, x, y, target, direction)| Hotspot {
                    id: hid.to_string(),
                    name: hname.to_string(),
                    x: *x,
                    y: *y,
                    target_scene: target.map(str::to_string),
                    direction: *direction,
                })
                .collect(),
        })
        .collect();

    TourData {
        scenes,
        start_scene: DEFAULT_START_SCENE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_shape() {
        let t = default_tour();
        let ids: Vec<&str> = t.scenes.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["lobby", "salon", "cocina", "dormitorio", "terraza"]);
        assert_eq!(t.start_scene, "lobby");
        assert!(t.scenes.iter().all(|s| s.hotspots.len() == 3));
        assert_eq!(t.scenes[1].image, "/scenes/scene-salon.jpg");
    }

    #[test]
    fn seed_lobby_is_referenced_twice() {
        let t = default_tour();
        let refs = t
            .hotspots()
            .filter(|(_, h)| h.target_scene.as_deref() == Some("lobby"))
            .count();
        assert_eq!(refs, 2);
    }
}
