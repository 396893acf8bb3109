//! Horizontal touch panning over a cover-fit image.
//!
//! Dragging the background moves the crop anchor so the image tracks the
//! finger one-to-one, within the `±50%` pan limits.

use foundation::math::CoverFit;

use crate::controller::DRAG_THRESHOLD_PX;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PanStep {
    pub offset_pct: f64,
    /// First update past the threshold: the gesture is now a pan.
    pub started: bool,
}

#[derive(Debug, Clone, Default)]
pub struct PanGesture {
    start: Option<(f64, f64)>,
    panning: bool,
}

impl PanGesture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, pointer_x: f64, fit: &CoverFit) {
        self.start = Some((pointer_x, fit.pan_offset_pct()));
        self.panning = false;
    }

    /// Applies movement to `fit`. `None` until the gesture counts as a pan,
    /// or when there is no gesture in progress.
    pub fn update(&mut self, pointer_x: f64, fit: &mut CoverFit) -> Option<PanStep> {
        let (start_x, start_offset) = self.start?;
        let dx = pointer_x - start_x;
        let started = !self.panning && dx.abs() > DRAG_THRESHOLD_PX;
        if started {
            self.panning = true;
        }
        if !self.panning {
            return None;
        }
        let overflow = fit.horizontal_overflow();
        if overflow > 0.0 {
            fit.set_pan(start_offset + dx / overflow * 100.0);
        }
        Some(PanStep {
            offset_pct: fit.pan_offset_pct(),
            started,
        })
    }

    /// Ends the gesture; returns whether it had become a pan.
    pub fn end(&mut self) -> bool {
        self.start = None;
        std::mem::take(&mut self.panning)
    }

    pub fn is_panning(&self) -> bool {
        self.panning
    }
}
