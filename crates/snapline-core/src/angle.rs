//! Angle snapping for line endpoints.

use kurbo::Point;

/// Drags shorter than this keep their original endpoint.
const MIN_DRAG_LENGTH: f64 = 0.001;

/// Result of an angle snap operation.
#[derive(Debug, Clone, Copy)]
pub struct AngleSnapResult {
    /// The snapped endpoint.
    pub point: Point,
    /// The snapped angle in degrees (0-360).
    pub angle_degrees: f64,
    /// The original (unsnapped) angle in degrees.
    pub original_angle_degrees: f64,
    /// Whether angle snapping occurred.
    pub snapped: bool,
    /// Distance from the anchor (preserved from the original).
    pub distance: f64,
}

/// Normalize an angle in degrees to [0, 360).
fn normalize_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Snap an angle to the nearest increment.
/// Returns the snapped angle in degrees (0-360).
pub fn snap_angle(angle_degrees: f64, increment: f64) -> f64 {
    normalize_degrees((angle_degrees / increment).round() * increment)
}

/// Snap a line endpoint to angle increments around `anchor`.
/// This snaps the angle while preserving the distance from the anchor.
pub fn snap_line_endpoint(anchor: Point, end: Point, increment: f64) -> AngleSnapResult {
    let offset = end - anchor;
    let distance = offset.hypot();

    if distance < MIN_DRAG_LENGTH {
        return AngleSnapResult {
            point: end,
            angle_degrees: 0.0,
            original_angle_degrees: 0.0,
            snapped: false,
            distance: 0.0,
        };
    }

    let original = normalize_degrees(offset.y.atan2(offset.x).to_degrees());
    let snapped_angle = snap_angle(original, increment);
    let radians = snapped_angle.to_radians();

    AngleSnapResult {
        point: Point::new(
            anchor.x + distance * radians.cos(),
            anchor.y + distance * radians.sin(),
        ),
        angle_degrees: snapped_angle,
        original_angle_degrees: original,
        snapped: true,
        distance,
    }
}
