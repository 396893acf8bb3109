//! Cover-fit coordinate mapping.
//!
//! Hotspots are stored in normalized image space: percentages of the original,
//! unscaled scene image. On screen the image is drawn with `object-fit: cover`,
//! so it is uniformly scaled to fill its container and the overflow is cropped.
//! The crop is centered vertically; horizontally the anchor follows the pan
//! offset (`object-position: (50 - pan)% 50%`).
//!
//! Conventions:
//! - Image-space and screen-space points are percentages (`0..=100`).
//! - Pixel quantities (`Size`, `Rect`, pointer positions) are CSS pixels.

use crate::bounds::{Point, Rect, Size, clamp_pct};

/// Pan offsets are limited to this many percent either side of center.
pub const PAN_LIMIT_PCT: f64 = 50.0;

/// Fixed vertical anchor of the cover crop.
const ANCHOR_Y: f64 = 0.5;

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct CoverFit {
    pub container: Size,
    pub image: Size,
    pan_offset_pct: f64,
}

impl CoverFit {
    pub fn new(container: Size, image: Size) -> Self {
        Self {
            container,
            image,
            pan_offset_pct: 0.0,
        }
    }

    /// Returns a copy with the pan offset set (clamped to `±PAN_LIMIT_PCT`).
    pub fn with_pan(mut self, pan_offset_pct: f64) -> Self {
        self.set_pan(pan_offset_pct);
        self
    }

    pub fn set_pan(&mut self, pan_offset_pct: f64) {
        self.pan_offset_pct = clamp_pan(pan_offset_pct);
    }

    pub fn pan_offset_pct(&self) -> f64 {
        self.pan_offset_pct
    }

    /// Both the container and the natural image size are known.
    pub fn is_resolved(&self) -> bool {
        self.container.is_known() && self.image.is_known()
    }

    /// Uniform "cover" scale: the larger of the two axis ratios.
    pub fn scale(&self) -> Option<f64> {
        if !self.is_resolved() {
            return None;
        }
        let sx = self.container.width / self.image.width;
        let sy = self.container.height / self.image.height;
        Some(sx.max(sy))
    }

    /// Size of the scaled image before cropping.
    pub fn displayed_size(&self) -> Option<Size> {
        let scale = self.scale()?;
        Some(Size::new(self.image.width * scale, self.image.height * scale))
    }

    /// Horizontal anchor of the crop in `0..=1`.
    pub fn anchor_x(&self) -> f64 {
        (50.0 - self.pan_offset_pct) / 100.0
    }

    /// Pixel offset of the container's top-left corner inside the scaled image.
    pub fn crop_offset(&self) -> Option<Point> {
        let displayed = self.displayed_size()?;
        Some(Point::new(
            (displayed.width - self.container.width) * self.anchor_x(),
            (displayed.height - self.container.height) * ANCHOR_Y,
        ))
    }

    /// Pixels of scaled image hidden horizontally by the crop (0 when unresolved).
    pub fn horizontal_overflow(&self) -> f64 {
        self.displayed_size()
            .map(|d| (d.width - self.container.width).max(0.0))
            .unwrap_or(0.0)
    }

    /// Maps a normalized image coordinate to a container percentage.
    ///
    /// Before layout or image load the input is returned unchanged.
    pub fn image_to_screen(&self, image_pct: Point) -> Point {
        let (Some(displayed), Some(offset)) = (self.displayed_size(), self.crop_offset()) else {
            return image_pct;
        };
        let px = image_pct.x / 100.0 * displayed.width - offset.x;
        let py = image_pct.y / 100.0 * displayed.height - offset.y;
        Point::new(
            px / self.container.width * 100.0,
            py / self.container.height * 100.0,
        )
    }

    /// Exact inverse of [`CoverFit::image_to_screen`]. Not clamped.
    pub fn screen_to_image(&self, screen_pct: Point) -> Point {
        let (Some(displayed), Some(offset)) = (self.displayed_size(), self.crop_offset()) else {
            return screen_pct;
        };
        let px = screen_pct.x / 100.0 * self.container.width + offset.x;
        let py = screen_pct.y / 100.0 * self.container.height + offset.y;
        Point::new(px / displayed.width * 100.0, py / displayed.height * 100.0)
    }

    /// Whether an image-space point lands inside the visible crop.
    pub fn is_visible(&self, image_pct: Point) -> bool {
        let s = self.image_to_screen(image_pct);
        (0.0..=100.0).contains(&s.x) && (0.0..=100.0).contains(&s.y)
    }
}

pub fn clamp_pan(pan_offset_pct: f64) -> f64 {
    if pan_offset_pct.is_nan() {
        0.0
    } else {
        pan_offset_pct.clamp(-PAN_LIMIT_PCT, PAN_LIMIT_PCT)
    }
}

/// Linear mapping of a pointer position inside `rect` to a clamped percentage.
///
/// Used for direct placement in non-panned contexts, where the reference
/// element shows the whole image. Pointers outside the rect clamp to the edge.
pub fn pointer_to_pct(pointer: Point, rect: Rect) -> Point {
    if !rect.size().is_known() {
        return Point::default();
    }
    Point::new(
        (pointer.x - rect.left) / rect.width * 100.0,
        (pointer.y - rect.top) / rect.height * 100.0,
    )
    .clamp_pct()
}
