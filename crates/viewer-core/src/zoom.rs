//! Zoom state for the screenshot panel

use serde::{Deserialize, Serialize};

pub const MIN_ZOOM: f64 = 0.5;
pub const MAX_ZOOM: f64 = 3.0;
pub const ZOOM_STEP: f64 = 0.25;

/// Scale factor for the rendered screenshot, clamped to
/// [[`MIN_ZOOM`], [`MAX_ZOOM`]].
///
/// Every change invalidates derived marker positions; callers re-run
/// [`crate::layout::marker_position`] for all rendered markers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomController {
    scale: f64,
}

impl Default for ZoomController {
    fn default() -> Self {
        Self { scale: 1.0 }
    }
}

impl ZoomController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Whole-number percentage for the zoom readout, e.g. 150 for 1.5x.
    pub fn percent(&self) -> u32 {
        (self.scale * 100.0).round() as u32
    }

    pub fn zoom_in(&mut self) -> f64 {
        self.scale = (self.scale + ZOOM_STEP).clamp(MIN_ZOOM, MAX_ZOOM);
        self.scale
    }

    pub fn zoom_out(&mut self) -> f64 {
        self.scale = (self.scale - ZOOM_STEP).clamp(MIN_ZOOM, MAX_ZOOM);
        self.scale
    }

    pub fn reset(&mut self) -> f64 {
        self.scale = 1.0;
        self.scale
    }
}
