//! Hotspot gesture disambiguation.
//!
//! Each pointer sequence over a hotspot resolves to exactly one of:
//! - drag-reposition (editor mode, movement beyond the threshold),
//! - click (navigate in the viewer, toggle the edit panel in the editor),
//! - touch tap-to-expand, then tap-again-to-navigate (viewer, touch only).
//!
//! Touch devices cannot hover, so the first tap stands in for hover and
//! reveals the label; mouse and pen keep single-click navigation.

use foundation::math::pointer_to_pct;
use foundation::{Point, Rect};
use scene::Hotspot;
use tracing::debug;

/// Pointer travel (CSS px) that turns a press into a drag.
pub const DRAG_THRESHOLD_PX: f64 = 4.0;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Mode {
    /// Read-only tour.
    #[default]
    Viewer,
    /// Authenticated authoring; hotspots can be repositioned.
    Editor,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PointerKind {
    Mouse,
    Pen,
    Touch,
}

impl PointerKind {
    pub fn can_hover(self) -> bool {
        !matches!(self, PointerKind::Touch)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum HotspotState {
    #[default]
    Idle,
    Hovered,
    Dragging,
    /// Touch-activated, waiting for the confirming second tap.
    Active,
}

/// Presentation flags derived from [`HotspotState`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct HotspotVisual {
    /// Label revealed.
    pub expanded: bool,
    /// Idle attention pulse on the marker dot.
    pub pulsing: bool,
}

/// What the caller should do in response to a gesture.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Navigate { scene_id: String },
    /// Store the clamped drag end position.
    Commit { hotspot_id: String, position: Point },
    ToggleEditor { hotspot_id: String },
    Activated { hotspot_id: String },
    Deactivated { hotspot_id: String },
}

#[derive(Debug, Clone)]
struct Press {
    hotspot_id: String,
    target_scene: Option<String>,
    kind: PointerKind,
    origin: Point,
    dragging: bool,
}

#[derive(Debug, Clone, Default)]
pub struct InteractionController {
    mode: Mode,
    hovered: Option<String>,
    active: Option<String>,
    press: Option<Press>,
    /// Render-only override while dragging; supersedes the committed position.
    live: Option<(String, Point)>,
}

impl InteractionController {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Switching mode drops every transient state.
    pub fn set_mode(&mut self, mode: Mode) {
        if self.mode != mode {
            self.reset();
            self.mode = mode;
        }
    }

    /// Clears hover, activation and any press in progress (e.g. on scene change).
    pub fn reset(&mut self) {
        self.hovered = None;
        self.active = None;
        self.press = None;
        self.live = None;
    }

    pub fn state(&self, hotspot_id: &str) -> HotspotState {
        if self
            .press
            .as_ref()
            .is_some_and(|p| p.dragging && p.hotspot_id == hotspot_id)
        {
            HotspotState::Dragging
        } else if self.active.as_deref() == Some(hotspot_id) {
            HotspotState::Active
        } else if self.hovered.as_deref() == Some(hotspot_id) {
            HotspotState::Hovered
        } else {
            HotspotState::Idle
        }
    }

    pub fn visual(&self, hotspot_id: &str) -> HotspotVisual {
        match self.state(hotspot_id) {
            HotspotState::Idle => HotspotVisual {
                expanded: false,
                pulsing: true,
            },
            HotspotState::Hovered | HotspotState::Active | HotspotState::Dragging => {
                HotspotVisual {
                    expanded: true,
                    pulsing: false,
                }
            }
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.press.as_ref().is_some_and(|p| p.dragging)
    }

    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn live_position(&self, hotspot_id: &str) -> Option<Point> {
        self.live
            .as_ref()
            .filter(|(id, _)| id == hotspot_id)
            .map(|(_, p)| *p)
    }

    /// Position to render: the live drag override, else the committed one.
    pub fn display_position(&self, hotspot: &Hotspot) -> Point {
        self.live_position(&hotspot.id)
            .unwrap_or_else(|| hotspot.position())
    }

    pub fn pointer_enter(&mut self, hotspot_id: &str, kind: PointerKind) {
        if kind.can_hover() && !self.is_dragging() {
            self.hovered = Some(hotspot_id.to_string());
        }
    }

    pub fn pointer_leave(&mut self, hotspot_id: &str) {
        if self.hovered.as_deref() == Some(hotspot_id) {
            self.hovered = None;
        }
    }

    pub fn pointer_down(&mut self, hotspot: &Hotspot, pos: Point, kind: PointerKind) {
        self.press = Some(Press {
            hotspot_id: hotspot.id.clone(),
            target_scene: hotspot.target_scene.clone(),
            kind,
            origin: pos,
            dragging: false,
        });
    }

    /// Feeds pointer movement. Returns the live position while dragging.
    ///
    /// `image_rect` is the on-screen box of the reference image element.
    pub fn pointer_move(&mut self, pos: Point, image_rect: Rect) -> Option<Point> {
        if self.mode != Mode::Editor {
            return None;
        }
        let press = self.press.as_mut()?;
        if !press.dragging && pos.distance(press.origin) > DRAG_THRESHOLD_PX {
            press.dragging = true;
            self.hovered = None;
            debug!(hotspot_id = %press.hotspot_id, "hotspot drag started");
        }
        if !press.dragging {
            return None;
        }
        let live = pointer_to_pct(pos, image_rect);
        self.live = Some((press.hotspot_id.clone(), live));
        Some(live)
    }

    /// Ends the press. A drag commits its clamped end position; anything
    /// shorter is a click.
    pub fn pointer_up(&mut self, pos: Point, image_rect: Rect) -> Option<Effect> {
        let press = self.press.take()?;
        let dragged = press.dragging
            || (self.mode == Mode::Editor && pos.distance(press.origin) > DRAG_THRESHOLD_PX);
        if dragged {
            self.live = None;
            let position = pointer_to_pct(pos, image_rect);
            debug!(hotspot_id = %press.hotspot_id, x = position.x, y = position.y, "hotspot drag committed");
            return Some(Effect::Commit {
                hotspot_id: press.hotspot_id,
                position,
            });
        }
        self.click(press)
    }

    /// Aborts a press; a live drag position reverts to the committed one.
    pub fn pointer_cancel(&mut self) {
        self.press = None;
        self.live = None;
    }

    /// Tap or click outside every hotspot.
    pub fn background_tap(&mut self) -> Option<Effect> {
        self.active
            .take()
            .map(|hotspot_id| Effect::Deactivated { hotspot_id })
    }

    /// A pan gesture began; any pending second tap is void.
    pub fn pan_started(&mut self) -> Option<Effect> {
        self.pointer_cancel();
        self.background_tap()
    }

    fn click(&mut self, press: Press) -> Option<Effect> {
        if self.mode == Mode::Editor {
            return Some(Effect::ToggleEditor {
                hotspot_id: press.hotspot_id,
            });
        }

        if press.kind != PointerKind::Touch {
            self.active = None;
            return press
                .target_scene
                .map(|scene_id| Effect::Navigate { scene_id });
        }

        if self.active.as_deref() == Some(press.hotspot_id.as_str()) {
            self.active = None;
            return Some(match press.target_scene {
                Some(scene_id) => Effect::Navigate { scene_id },
                None => Effect::Deactivated {
                    hotspot_id: press.hotspot_id,
                },
            });
        }

        self.active = Some(press.hotspot_id.clone());
        Some(Effect::Activated {
            hotspot_id: press.hotspot_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECT: Rect = Rect {
        left: 0.0,
        top: 0.0,
        width: 1000.0,
        height: 500.0,
    };

    fn hotspot(id: &str, target: Option<&str>) -> Hotspot {
        Hotspot {
            id: id.to_string(),
            name: id.to_string(),
            x: 50.0,
            y: 50.0,
            target_scene: target.map(str::to_string),
            direction: None,
        }
    }

    fn tap(c: &mut InteractionController, h: &Hotspot, kind: PointerKind) -> Option<Effect> {
        let at = Point::new(500.0, 250.0);
        c.pointer_down(h, at, kind);
        c.pointer_up(at, RECT)
    }

    #[test]
    fn mouse_click_navigates_immediately() {
        let mut c = InteractionController::new(Mode::Viewer);
        let h = hotspot("a", Some("salon"));
        assert_eq!(
            tap(&mut c, &h, PointerKind::Mouse),
            Some(Effect::Navigate {
                scene_id: "salon".into()
            })
        );
        assert_eq!(c.state("a"), HotspotState::Idle);
    }

    #[test]
    fn mouse_click_on_informational_does_nothing() {
        let mut c = InteractionController::new(Mode::Viewer);
        let h = hotspot("info", None);
        assert_eq!(tap(&mut c, &h, PointerKind::Mouse), None);
    }

    #[test]
    fn touch_needs_two_taps() {
        let mut c = InteractionController::new(Mode::Viewer);
        let h = hotspot("a", Some("salon"));
        assert_eq!(
            tap(&mut c, &h, PointerKind::Touch),
            Some(Effect::Activated {
                hotspot_id: "a".into()
            })
        );
        assert_eq!(c.state("a"), HotspotState::Active);
        assert!(c.visual("a").expanded);

        assert_eq!(
            tap(&mut c, &h, PointerKind::Touch),
            Some(Effect::Navigate {
                scene_id: "salon".into()
            })
        );
        assert_eq!(c.state("a"), HotspotState::Idle);
    }

    #[test]
    fn touch_on_other_hotspot_moves_activation() {
        let mut c = InteractionController::new(Mode::Viewer);
        let a = hotspot("a", Some("salon"));
        let b = hotspot("b", Some("cocina"));
        tap(&mut c, &a, PointerKind::Touch);
        assert_eq!(
            tap(&mut c, &b, PointerKind::Touch),
            Some(Effect::Activated {
                hotspot_id: "b".into()
            })
        );
        assert_eq!(c.state("a"), HotspotState::Idle);
        assert_eq!(c.state("b"), HotspotState::Active);
    }

    #[test]
    fn second_tap_on_informational_collapses() {
        let mut c = InteractionController::new(Mode::Viewer);
        let h = hotspot("info", None);
        tap(&mut c, &h, PointerKind::Touch);
        assert_eq!(
            tap(&mut c, &h, PointerKind::Touch),
            Some(Effect::Deactivated {
                hotspot_id: "info".into()
            })
        );
        assert_eq!(c.active(), None);
    }

    #[test]
    fn background_tap_and_pan_cancel_activation() {
        let mut c = InteractionController::new(Mode::Viewer);
        let h = hotspot("a", Some("salon"));
        tap(&mut c, &h, PointerKind::Touch);
        assert_eq!(
            c.background_tap(),
            Some(Effect::Deactivated {
                hotspot_id: "a".into()
            })
        );
        assert_eq!(c.background_tap(), None);

        tap(&mut c, &h, PointerKind::Touch);
        assert!(c.pan_started().is_some());
        // Pending second tap is gone: the next tap activates again.
        assert_eq!(
            tap(&mut c, &h, PointerKind::Touch),
            Some(Effect::Activated {
                hotspot_id: "a".into()
            })
        );
    }

    #[test]
    fn hover_is_mouse_only() {
        let mut c = InteractionController::new(Mode::Viewer);
        c.pointer_enter("a", PointerKind::Touch);
        assert_eq!(c.state("a"), HotspotState::Idle);
        assert!(c.visual("a").pulsing);

        c.pointer_enter("a", PointerKind::Mouse);
        assert_eq!(c.state("a"), HotspotState::Hovered);
        assert!(!c.visual("a").pulsing);
        c.pointer_leave("a");
        assert_eq!(c.state("a"), HotspotState::Idle);
    }

    #[test]
    fn viewer_never_drags() {
        let mut c = InteractionController::new(Mode::Viewer);
        let h = hotspot("a", Some("salon"));
        c.pointer_down(&h, Point::new(0.0, 0.0), PointerKind::Mouse);
        assert_eq!(c.pointer_move(Point::new(200.0, 200.0), RECT), None);
        assert!(!c.is_dragging());
    }

    #[test]
    fn small_movement_in_editor_is_a_click() {
        let mut c = InteractionController::new(Mode::Editor);
        let h = hotspot("a", Some("salon"));
        c.pointer_down(&h, Point::new(100.0, 100.0), PointerKind::Mouse);
        assert_eq!(c.pointer_move(Point::new(102.0, 102.0), RECT), None);
        assert_eq!(
            c.pointer_up(Point::new(102.0, 102.0), RECT),
            Some(Effect::ToggleEditor {
                hotspot_id: "a".into()
            })
        );
    }

    #[test]
    fn release_past_threshold_without_move_commits() {
        let mut c = InteractionController::new(Mode::Editor);
        let h = hotspot("a", None);
        c.pointer_down(&h, Point::new(500.0, 250.0), PointerKind::Mouse);
        assert_eq!(
            c.pointer_up(Point::new(250.0, 125.0), RECT),
            Some(Effect::Commit {
                hotspot_id: "a".into(),
                position: Point::new(25.0, 25.0)
            })
        );

        let mut viewer = InteractionController::new(Mode::Viewer);
        let linked = hotspot("b", Some("salon"));
        viewer.pointer_down(&linked, Point::new(500.0, 250.0), PointerKind::Mouse);
        assert_eq!(
            viewer.pointer_up(Point::new(250.0, 125.0), RECT),
            Some(Effect::Navigate {
                scene_id: "salon".into()
            })
        );
    }

    #[test]
    fn drag_tracks_live_position_and_commits() {
        let mut c = InteractionController::new(Mode::Editor);
        let h = hotspot("a", None);
        c.pointer_down(&h, Point::new(500.0, 250.0), PointerKind::Mouse);
        let live = c.pointer_move(Point::new(250.0, 125.0), RECT);
        assert_eq!(live, Some(Point::new(25.0, 25.0)));
        assert_eq!(c.state("a"), HotspotState::Dragging);
        assert_eq!(c.display_position(&h), Point::new(25.0, 25.0));

        let effect = c.pointer_up(Point::new(100.0, 400.0), RECT);
        assert_eq!(
            effect,
            Some(Effect::Commit {
                hotspot_id: "a".into(),
                position: Point::new(10.0, 80.0)
            })
        );
        assert_eq!(c.live_position("a"), None);
        assert_eq!(c.state("a"), HotspotState::Idle);
    }

    #[test]
    fn drag_outside_image_is_clamped() {
        let mut c = InteractionController::new(Mode::Editor);
        let h = hotspot("a", None);
        c.pointer_down(&h, Point::new(500.0, 250.0), PointerKind::Touch);
        c.pointer_move(Point::new(1500.0, -100.0), RECT);
        assert_eq!(c.live_position("a"), Some(Point::new(100.0, 0.0)));
        let effect = c.pointer_up(Point::new(-40.0, 900.0), RECT);
        assert_eq!(
            effect,
            Some(Effect::Commit {
                hotspot_id: "a".into(),
                position: Point::new(0.0, 100.0)
            })
        );
    }

    #[test]
    fn cancel_reverts_live_override() {
        let mut c = InteractionController::new(Mode::Editor);
        let h = hotspot("a", None);
        c.pointer_down(&h, Point::new(500.0, 250.0), PointerKind::Mouse);
        c.pointer_move(Point::new(900.0, 250.0), RECT);
        assert!(c.live_position("a").is_some());
        c.pointer_cancel();
        assert_eq!(c.display_position(&h), Point::new(50.0, 50.0));
        assert_eq!(c.pointer_up(Point::new(900.0, 250.0), RECT), None);
    }

    #[test]
    fn mode_switch_clears_transients() {
        let mut c = InteractionController::new(Mode::Viewer);
        let h = hotspot("a", Some("salon"));
        tap(&mut c, &h, PointerKind::Touch);
        c.set_mode(Mode::Editor);
        assert_eq!(c.active(), None);
        assert_eq!(c.mode(), Mode::Editor);
    }
}
