//! Viewport transform supplied by the host on every drag call.

use kurbo::{Affine, Point, Vec2};
use serde::{Deserialize, Serialize};

/// Smallest zoom the helpers divide by.
const MIN_ZOOM: f64 = 1e-6;

/// Read-only view of the host camera.
///
/// Geometry in this crate already operates in canvas space. The viewport is
/// only carried through drag contexts so that hosts and custom modifiers can
/// convert between screen and canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    /// Scale factor from canvas units to screen pixels.
    pub zoom: f64,
    /// Horizontal pan offset in screen pixels.
    pub pan_x: f64,
    /// Vertical pan offset in screen pixels.
    pub pan_y: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
        }
    }
}

impl Viewport {
    pub fn new(zoom: f64, pan_x: f64, pan_y: f64) -> Self {
        Self { zoom, pan_x, pan_y }
    }

    fn safe_zoom(&self) -> f64 {
        if self.zoom.abs() < MIN_ZOOM {
            MIN_ZOOM
        } else {
            self.zoom
        }
    }

    /// Transform converting canvas coordinates to screen coordinates.
    pub fn transform(&self) -> Affine {
        Affine::translate(Vec2::new(self.pan_x, self.pan_y)) * Affine::scale(self.safe_zoom())
    }

    /// Transform converting screen coordinates to canvas coordinates.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.safe_zoom()) * Affine::translate(Vec2::new(-self.pan_x, -self.pan_y))
    }

    /// Convert a screen point to canvas coordinates.
    pub fn screen_to_canvas(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    /// Convert a canvas point to screen coordinates.
    pub fn canvas_to_screen(&self, canvas_point: Point) -> Point {
        self.transform() * canvas_point
    }

    /// Convert a tolerance expressed in screen pixels to canvas units.
    pub fn canvas_tolerance(&self, screen_px: f64) -> f64 {
        screen_px / self.safe_zoom()
    }
}
