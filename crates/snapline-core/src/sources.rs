//! Built-in snap sources: box key points and box outlines.

use crate::geometry::{DEGENERATE_LENGTH, closest_point_on_segment, outline_segments, segment_normal};
use crate::registry::{SnapCandidate, SnapQuery, SnapSource, SnapTargetKind};
use kurbo::{Point, Rect};

/// Id of [`ObjectPointSource`].
pub const OBJECT_POINTS_SOURCE_ID: &str = "object-points";
/// Id of [`PathSource`].
pub const PATH_SOURCE_ID: &str = "path";

/// A point that can be snapped to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapTarget {
    /// The snap point location.
    pub point: Point,
    /// Type of snap target for visual feedback.
    pub kind: SnapTargetKind,
}

impl SnapTarget {
    fn new(x: f64, y: f64, kind: SnapTargetKind) -> Self {
        Self {
            point: Point::new(x, y),
            kind,
        }
    }
}

/// Collect snap targets from a bounding box: corners, edge midpoints and,
/// optionally, the center.
pub fn bounds_snap_targets(bounds: Rect, include_center: bool) -> Vec<SnapTarget> {
    let mut targets = Vec::with_capacity(9);
    let mid_x = (bounds.x0 + bounds.x1) / 2.0;
    let mid_y = (bounds.y0 + bounds.y1) / 2.0;

    // Corners
    targets.push(SnapTarget::new(bounds.x0, bounds.y0, SnapTargetKind::Corner));
    targets.push(SnapTarget::new(bounds.x1, bounds.y0, SnapTargetKind::Corner));
    targets.push(SnapTarget::new(bounds.x1, bounds.y1, SnapTargetKind::Corner));
    targets.push(SnapTarget::new(bounds.x0, bounds.y1, SnapTargetKind::Corner));

    // Edge midpoints
    targets.push(SnapTarget::new(mid_x, bounds.y0, SnapTargetKind::Midpoint));
    targets.push(SnapTarget::new(bounds.x1, mid_y, SnapTargetKind::Midpoint));
    targets.push(SnapTarget::new(mid_x, bounds.y1, SnapTargetKind::Midpoint));
    targets.push(SnapTarget::new(bounds.x0, mid_y, SnapTargetKind::Midpoint));

    if include_center {
        targets.push(SnapTarget::new(mid_x, mid_y, SnapTargetKind::Center));
    }

    targets
}

/// Snaps to corners, edge midpoints and centers of candidate boxes.
#[derive(Debug, Default, Clone, Copy)]
pub struct ObjectPointSource;

impl SnapSource for ObjectPointSource {
    fn id(&self) -> &str {
        OBJECT_POINTS_SOURCE_ID
    }

    fn priority(&self) -> i32 {
        10
    }

    fn candidate(&self, query: &SnapQuery<'_>) -> Option<SnapCandidate> {
        let threshold = self.threshold(query.settings);
        let mut best: Option<(SnapTarget, f64)> = None;

        for element in query.targets {
            for target in bounds_snap_targets(element.bounds, query.settings.snap_to_centers) {
                let dist = query.point.distance(target.point);
                if dist > threshold {
                    continue;
                }
                if best.is_none_or(|(_, best_dist)| dist < best_dist) {
                    best = Some((target, dist));
                }
            }
        }

        best.map(|(target, distance)| SnapCandidate {
            point: target.point,
            source_id: OBJECT_POINTS_SOURCE_ID.to_string(),
            distance,
            kind: target.kind,
        })
    }
}

/// Snaps onto the nearest point of any candidate box outline.
///
/// Only active when `snap_to_path` is set.
#[derive(Debug, Default, Clone, Copy)]
pub struct PathSource;

/// Foot of the perpendicular from `point` when it lands inside the segment,
/// otherwise the nearest endpoint.
fn nearest_on_segment(point: Point, a: Point, b: Point) -> Point {
    let along = b - a;
    if along.hypot() < DEGENERATE_LENGTH {
        return a;
    }
    let normal = segment_normal(a, b);
    let foot = point - normal * (point - a).dot(normal);
    let t = (foot - a).dot(along) / along.hypot2();
    if (0.0..=1.0).contains(&t) {
        foot
    } else {
        closest_point_on_segment(point, a, b)
    }
}

impl SnapSource for PathSource {
    fn id(&self) -> &str {
        PATH_SOURCE_ID
    }

    fn candidate(&self, query: &SnapQuery<'_>) -> Option<SnapCandidate> {
        if !query.settings.snap_to_path {
            return None;
        }
        let threshold = self.threshold(query.settings);
        let mut best: Option<(Point, f64)> = None;

        for element in query.targets {
            for (a, b) in outline_segments(element.bounds) {
                let on_path = nearest_on_segment(query.point, a, b);
                let dist = query.point.distance(on_path);
                if dist <= threshold && best.is_none_or(|(_, best_dist)| dist < best_dist) {
                    best = Some((on_path, dist));
                }
            }
        }

        best.map(|(point, distance)| SnapCandidate {
            point,
            source_id: PATH_SOURCE_ID.to_string(),
            distance,
            kind: SnapTargetKind::Edge,
        })
    }
}
