pub mod controller;
pub mod pan;
pub mod placement;

pub use controller::*;
pub use pan::{PanGesture, PanStep};
pub use placement::{HotspotDraft, Placement, place_hotspot};
