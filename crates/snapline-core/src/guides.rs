//! Alignment, equal-gap and equal-size guideline detection.
//!
//! The detector compares the projected bounds of the moving selection with
//! the candidate pool (selection and descendants already excluded) and picks,
//! per axis, the match needing the smallest correction. Size matches are
//! reported for feedback only: a translation cannot change a box's size.

use crate::document::{ElementBounds, ElementId};
use crate::geometry::bounds_are_valid;
use crate::settings::GuidelineSettings;
use kurbo::{Point, Rect, Vec2};

/// Coordinates closer than this are considered coincident.
const EPSILON: f64 = 1e-9;

/// An engaged axis lock is kept while its correction stays within
/// `snap_threshold * RELEASE_FACTOR`.
pub const RELEASE_FACTOR: f64 = 1.5;

/// What a guideline expresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuidelineKind {
    /// Edge-to-edge or center-to-center coincidence.
    Alignment,
    /// Equal gap with neighbouring boxes.
    Distance,
    /// Equal width or height.
    Size,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    /// `(min, max)` of a box along this axis.
    pub fn span(self, bounds: Rect) -> (f64, f64) {
        match self {
            Axis::X => (bounds.x0, bounds.x1),
            Axis::Y => (bounds.y0, bounds.y1),
        }
    }

    /// The perpendicular axis.
    pub fn cross(self) -> Axis {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::X,
        }
    }
}

/// A guideline engaged during the current frame.
#[derive(Debug, Clone, PartialEq)]
pub struct GuidelineMatch {
    pub kind: GuidelineKind,
    pub axis: Axis,
    /// Alignment: the shared coordinate. Distance: the gap. Size: the size.
    pub value: f64,
    pub participant_ids: Vec<ElementId>,
}

/// A chosen snap along one axis.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisSnap {
    pub guide: GuidelineMatch,
    /// Exact translation along the axis that satisfies the guide.
    pub correction: f64,
    /// Coordinate the moving feature lands on.
    pub target: f64,
    /// Position of the moving feature relative to the box minimum.
    pub offset: f64,
}

/// Result of one detector run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Detection {
    pub x: Option<AxisSnap>,
    pub y: Option<AxisSnap>,
    /// Feedback-only size matches.
    pub sizes: Vec<GuidelineMatch>,
}

impl Detection {
    pub fn axis(&self, axis: Axis) -> Option<&AxisSnap> {
        match axis {
            Axis::X => self.x.as_ref(),
            Axis::Y => self.y.as_ref(),
        }
    }

    fn axis_mut(&mut self, axis: Axis) -> &mut Option<AxisSnap> {
        match axis {
            Axis::X => &mut self.x,
            Axis::Y => &mut self.y,
        }
    }

    /// Whether any axis snapped.
    pub fn is_snapped(&self) -> bool {
        self.x.is_some() || self.y.is_some()
    }

    /// Translation to add to the proposed delta.
    pub fn correction(&self) -> Vec2 {
        Vec2::new(
            self.x.as_ref().map_or(0.0, |s| s.correction),
            self.y.as_ref().map_or(0.0, |s| s.correction),
        )
    }

    /// Every match to display, axis snaps first.
    pub fn matches(&self) -> Vec<GuidelineMatch> {
        self.x
            .iter()
            .chain(self.y.iter())
            .map(|s| s.guide.clone())
            .chain(self.sizes.iter().cloned())
            .collect()
    }
}

/// Proposed snap before participants are collected.
struct Proposal {
    kind: GuidelineKind,
    value: f64,
    target: f64,
    offset: f64,
    correction: f64,
    participants: Vec<ElementId>,
}

impl Proposal {
    fn into_snap(self, axis: Axis) -> AxisSnap {
        AxisSnap {
            guide: GuidelineMatch {
                kind: self.kind,
                axis,
                value: self.value,
                participant_ids: self.participants,
            },
            correction: self.correction,
            target: self.target,
            offset: self.offset,
        }
    }
}

/// Keep `candidate` if it needs a strictly smaller correction than `best`.
fn keep_closer(best: &mut Option<Proposal>, candidate: Proposal, threshold: f64) {
    if candidate.correction.abs() > threshold || !candidate.correction.is_finite() {
        return;
    }
    if best
        .as_ref()
        .is_none_or(|b| candidate.correction.abs() < b.correction.abs())
    {
        *best = Some(candidate);
    }
}

fn alignment(axis: Axis, moving: Rect, targets: &[ElementBounds], threshold: f64) -> Option<Proposal> {
    let (m0, m1) = axis.span(moving);
    let size = m1 - m0;
    let moving_edges = [(m0, 0.0), (m1, size)];
    let mut best = None;

    for target in targets {
        let (t0, t1) = axis.span(target.bounds);
        for (feature, offset) in moving_edges {
            for edge in [t0, t1] {
                keep_closer(
                    &mut best,
                    Proposal {
                        kind: GuidelineKind::Alignment,
                        value: edge,
                        target: edge,
                        offset,
                        correction: edge - feature,
                        participants: Vec::new(),
                    },
                    threshold,
                );
            }
        }
        let center = (t0 + t1) / 2.0;
        keep_closer(
            &mut best,
            Proposal {
                kind: GuidelineKind::Alignment,
                value: center,
                target: center,
                offset: size / 2.0,
                correction: center - (m0 + size / 2.0),
                participants: Vec::new(),
            },
            threshold,
        );
    }

    best.map(|mut proposal| {
        proposal.participants = targets
            .iter()
            .filter(|t| {
                let (t0, t1) = axis.span(t.bounds);
                [t0, t1, (t0 + t1) / 2.0]
                    .iter()
                    .any(|v| (v - proposal.value).abs() <= EPSILON)
            })
            .map(|t| t.id)
            .collect();
        proposal
    })
}

fn distance(axis: Axis, moving: Rect, targets: &[ElementBounds], threshold: f64) -> Option<Proposal> {
    let (m0, m1) = axis.span(moving);
    let size = m1 - m0;
    let (c0, c1) = axis.cross().span(moving);

    // Only boxes sharing a row (or column) with the moving box take part.
    let mut row: Vec<&ElementBounds> = targets
        .iter()
        .filter(|t| {
            let (t0, t1) = axis.cross().span(t.bounds);
            t0 < c1 && t1 > c0
        })
        .collect();
    row.sort_by(|a, b| axis.span(a.bounds).0.total_cmp(&axis.span(b.bounds).0));

    let mut best = None;
    for pair in row.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let (a0, a1) = axis.span(a.bounds);
        let (b0, b1) = axis.span(b.bounds);
        let gap = b0 - a1;
        if gap <= EPSILON {
            continue;
        }
        let participants = vec![a.id, b.id];

        // Continue the pattern past `b`.
        keep_closer(
            &mut best,
            Proposal {
                kind: GuidelineKind::Distance,
                value: gap,
                target: b1 + gap,
                offset: 0.0,
                correction: b1 + gap - m0,
                participants: participants.clone(),
            },
            threshold,
        );
        // Continue the pattern before `a`.
        keep_closer(
            &mut best,
            Proposal {
                kind: GuidelineKind::Distance,
                value: gap,
                target: a0 - gap,
                offset: size,
                correction: a0 - gap - m1,
                participants: participants.clone(),
            },
            threshold,
        );
        // Center between `a` and `b`.
        let room = gap - size;
        if room > EPSILON {
            let target = a1 + room / 2.0;
            keep_closer(
                &mut best,
                Proposal {
                    kind: GuidelineKind::Distance,
                    value: room / 2.0,
                    target,
                    offset: 0.0,
                    correction: target - m0,
                    participants,
                },
                threshold,
            );
        }
    }
    best
}

fn size_match(axis: Axis, moving: Rect, targets: &[ElementBounds], threshold: f64) -> Option<GuidelineMatch> {
    let (m0, m1) = axis.span(moving);
    let size = m1 - m0;
    let closest = targets
        .iter()
        .map(|t| {
            let (t0, t1) = axis.span(t.bounds);
            t1 - t0
        })
        .filter(|other| (other - size).abs() <= threshold)
        .min_by(|a, b| (a - size).abs().total_cmp(&(b - size).abs()))?;

    let participant_ids = targets
        .iter()
        .filter(|t| {
            let (t0, t1) = axis.span(t.bounds);
            ((t1 - t0) - closest).abs() <= EPSILON
        })
        .map(|t| t.id)
        .collect();

    Some(GuidelineMatch {
        kind: GuidelineKind::Size,
        axis,
        value: closest,
        participant_ids,
    })
}

/// Detect guidelines for the projected bounds of a moving selection.
///
/// Per axis, alignment and distance proposals compete on the absolute
/// correction; an exact tie goes to alignment.
pub fn detect(moving: Rect, targets: &[ElementBounds], settings: &GuidelineSettings) -> Detection {
    let mut detection = Detection::default();
    if !bounds_are_valid(moving) {
        return detection;
    }
    let threshold = settings.snap_threshold;

    for axis in [Axis::X, Axis::Y] {
        let aligned = settings
            .enabled
            .then(|| alignment(axis, moving, targets, threshold))
            .flatten();
        let spaced = settings
            .distance_enabled
            .then(|| distance(axis, moving, targets, threshold))
            .flatten();

        let chosen = match (aligned, spaced) {
            (Some(a), Some(d)) if d.correction.abs() < a.correction.abs() => Some(d),
            (Some(a), _) => Some(a),
            (None, d) => d,
        };
        *detection.axis_mut(axis) = chosen.map(|p| p.into_snap(axis));

        if settings.size_matching_enabled {
            detection.sizes.extend(size_match(axis, moving, targets, threshold));
        }
    }

    detection
}

/// Align a single point to candidate edges and centers, each axis on its own.
pub fn align_point(point: Point, targets: &[ElementBounds], settings: &GuidelineSettings) -> Detection {
    let mut detection = Detection::default();
    if !settings.enabled {
        return detection;
    }
    let moving = Rect::from_points(point, point);
    for axis in [Axis::X, Axis::Y] {
        *detection.axis_mut(axis) =
            alignment(axis, moving, targets, settings.snap_threshold).map(|p| p.into_snap(axis));
    }
    detection
}

/// Per-axis hysteresis for element drags.
///
/// A fresh detection always wins. When an axis has none, the previous lock is
/// re-applied while its correction stays within the release distance.
#[derive(Debug, Clone, Default)]
pub struct StickyGuides {
    x: Option<AxisSnap>,
    y: Option<AxisSnap>,
}

impl StickyGuides {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_mut(&mut self, axis: Axis) -> &mut Option<AxisSnap> {
        match axis {
            Axis::X => &mut self.x,
            Axis::Y => &mut self.y,
        }
    }

    pub fn is_locked(&self, axis: Axis) -> bool {
        match axis {
            Axis::X => self.x.is_some(),
            Axis::Y => self.y.is_some(),
        }
    }

    /// Merge `detection` with the held locks for bounds `moving`.
    pub fn resolve(&mut self, moving: Rect, mut detection: Detection, threshold: f64) -> Detection {
        let release = threshold * RELEASE_FACTOR;
        for axis in [Axis::X, Axis::Y] {
            if let Some(fresh) = detection.axis(axis) {
                *self.lock_mut(axis) = Some(fresh.clone());
                continue;
            }
            let lock = self.lock_mut(axis);
            let Some(held) = lock.as_ref() else {
                continue;
            };
            let (min, _) = axis.span(moving);
            let correction = held.target - (min + held.offset);
            if correction.abs() <= release {
                let kept = AxisSnap {
                    correction,
                    ..held.clone()
                };
                *detection.axis_mut(axis) = Some(kept);
            } else {
                log::trace!("Released {:?} guideline lock ({} > {})", axis, correction.abs(), release);
                *lock = None;
            }
        }
        detection
    }

    pub fn clear(&mut self) {
        self.x = None;
        self.y = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn id(n: u128) -> ElementId {
        Uuid::from_u128(n)
    }

    fn element(n: u128, x0: f64, y0: f64, x1: f64, y1: f64) -> ElementBounds {
        ElementBounds::new(id(n), Rect::new(x0, y0, x1, y1))
    }

    fn only_alignment() -> GuidelineSettings {
        GuidelineSettings {
            distance_enabled: false,
            size_matching_enabled: false,
            ..GuidelineSettings::default()
        }
    }

    #[test]
    fn test_edge_alignment_corrects_exactly() {
        let targets = [element(1, 0.0, 0.0, 40.0, 40.0)];
        let moving = Rect::new(43.0, 100.0, 83.0, 140.0);
        let detection = detect(moving, &targets, &only_alignment());

        let x = detection.x.unwrap();
        assert_eq!(x.guide.kind, GuidelineKind::Alignment);
        assert_eq!(x.guide.value, 40.0);
        assert_eq!(x.correction, -3.0);
        assert_eq!(x.guide.participant_ids, vec![id(1)]);
        assert!(detection.y.is_none());
    }

    #[test]
    fn test_center_alignment() {
        let targets = [element(1, 0.0, 0.0, 40.0, 40.0)];
        // Width 10, center at 22: only the center pair is within range.
        let moving = Rect::new(17.0, 100.0, 27.0, 110.0);
        let x = detect(moving, &targets, &only_alignment()).x.unwrap();
        assert_eq!(x.guide.value, 20.0);
        assert_eq!(x.correction, -2.0);
        assert_eq!(x.offset, 5.0);
    }

    #[test]
    fn test_smallest_correction_wins() {
        let targets = [element(1, 0.0, 0.0, 40.0, 40.0), element(2, 0.0, 200.0, 44.0, 240.0)];
        let moving = Rect::new(42.5, 100.0, 82.5, 140.0);
        let x = detect(moving, &targets, &only_alignment()).x.unwrap();
        assert_eq!(x.guide.value, 44.0);
        assert_eq!(x.correction, 1.5);
        assert_eq!(x.guide.participant_ids, vec![id(2)]);
    }

    #[test]
    fn test_alignment_collects_every_participant() {
        let targets = [
            element(1, 0.0, 0.0, 40.0, 40.0),
            element(2, 20.0, 100.0, 40.0, 140.0),
            element(3, 500.0, 500.0, 600.0, 600.0),
        ];
        let moving = Rect::new(42.0, 300.0, 62.0, 320.0);
        let x = detect(moving, &targets, &only_alignment()).x.unwrap();
        assert_eq!(x.guide.value, 40.0);
        assert_eq!(x.guide.participant_ids, vec![id(1), id(2)]);
    }

    #[test]
    fn test_beyond_threshold_no_match() {
        let targets = [element(1, 0.0, 0.0, 40.0, 40.0)];
        let moving = Rect::new(50.0, 100.0, 90.0, 140.0);
        let detection = detect(moving, &targets, &GuidelineSettings::default());
        assert!(!detection.is_snapped());
        assert_eq!(detection.correction(), Vec2::ZERO);
    }

    #[test]
    fn test_equal_gap_after_pair() {
        let targets = [element(1, 0.0, 0.0, 40.0, 40.0), element(2, 100.0, 0.0, 140.0, 40.0)];
        let moving = Rect::new(198.0, 0.0, 238.0, 40.0);
        let x = detect(moving, &targets, &GuidelineSettings::default()).x.unwrap();
        assert_eq!(x.guide.kind, GuidelineKind::Distance);
        assert_eq!(x.guide.value, 60.0);
        assert_eq!(x.correction, 2.0);
        assert_eq!(x.guide.participant_ids, vec![id(1), id(2)]);
    }

    #[test]
    fn test_equal_gap_before_pair() {
        let targets = [element(1, 100.0, 0.0, 140.0, 40.0), element(2, 170.0, 0.0, 210.0, 40.0)];
        let moving = Rect::new(28.0, 0.0, 68.0, 40.0);
        let x = detect(moving, &targets, &GuidelineSettings::default()).x.unwrap();
        assert_eq!(x.guide.kind, GuidelineKind::Distance);
        assert_eq!(x.guide.value, 30.0);
        assert_eq!(x.correction, 2.0);
        assert_eq!(x.target, 70.0);
    }

    #[test]
    fn test_centered_between_pair() {
        let targets = [element(1, 0.0, 0.0, 40.0, 40.0), element(2, 140.0, 0.0, 180.0, 40.0)];
        // Gap 100, width 40: centered left edge is 70.
        let moving = Rect::new(68.0, 0.0, 108.0, 40.0);
        let x = detect(moving, &targets, &GuidelineSettings::default()).x.unwrap();
        assert_eq!(x.guide.kind, GuidelineKind::Distance);
        assert_eq!(x.guide.value, 30.0);
        assert_eq!(x.correction, 2.0);
    }

    #[test]
    fn test_distance_ignores_boxes_outside_the_row() {
        let targets = [element(1, 0.0, 0.0, 40.0, 40.0), element(2, 100.0, 0.0, 140.0, 40.0)];
        let moving = Rect::new(198.0, 300.0, 238.0, 340.0);
        let settings = GuidelineSettings {
            enabled: false,
            size_matching_enabled: false,
            ..GuidelineSettings::default()
        };
        assert!(detect(moving, &targets, &settings).x.is_none());
    }

    #[test]
    fn test_alignment_wins_exact_tie() {
        // Right-extension target is 200; an edge also sits at 200.
        let targets = [
            element(1, 0.0, 0.0, 40.0, 40.0),
            element(2, 100.0, 0.0, 140.0, 40.0),
            element(3, 200.0, 500.0, 210.0, 510.0),
        ];
        let moving = Rect::new(197.0, 0.0, 237.0, 40.0);
        let x = detect(moving, &targets, &GuidelineSettings::default()).x.unwrap();
        assert_eq!(x.guide.kind, GuidelineKind::Alignment);
        assert_eq!(x.correction, 3.0);
    }

    #[test]
    fn test_size_matches_are_feedback_only() {
        let targets = [element(1, 0.0, 0.0, 40.0, 30.0), element(2, 500.0, 0.0, 540.0, 90.0)];
        let moving = Rect::new(200.0, 200.0, 240.0, 260.0);
        let detection = detect(moving, &targets, &GuidelineSettings::default());
        assert!(!detection.is_snapped());
        assert_eq!(detection.sizes.len(), 1);
        let size = &detection.sizes[0];
        assert_eq!(size.kind, GuidelineKind::Size);
        assert_eq!(size.axis, Axis::X);
        assert_eq!(size.value, 40.0);
        assert_eq!(size.participant_ids, vec![id(1), id(2)]);
    }

    #[test]
    fn test_invalid_moving_bounds() {
        let targets = [element(1, 0.0, 0.0, 40.0, 40.0)];
        let moving = Rect::new(f64::NAN, 0.0, 40.0, 40.0);
        assert_eq!(detect(moving, &targets, &GuidelineSettings::default()), Detection::default());
    }

    #[test]
    fn test_align_point() {
        let targets = [element(1, 0.0, 0.0, 40.0, 40.0)];
        let detection = align_point(Point::new(21.0, 96.0), &targets, &GuidelineSettings::default());
        let x = detection.x.unwrap();
        assert_eq!(x.guide.value, 20.0);
        assert_eq!(x.correction, -1.0);
        assert!(detection.y.is_none());
    }

    #[test]
    fn test_sticky_lock_holds_then_releases() {
        let targets = [element(1, 0.0, 0.0, 40.0, 40.0)];
        let settings = only_alignment();
        let mut sticky = StickyGuides::new();

        let moving = Rect::new(43.0, 100.0, 83.0, 140.0);
        let detection = sticky.resolve(moving, detect(moving, &targets, &settings), 5.0);
        assert_eq!(detection.x.as_ref().unwrap().correction, -3.0);
        assert!(sticky.is_locked(Axis::X));

        // 6.0 away: fresh detection misses, the lock holds (release is 7.5).
        let moving = Rect::new(46.0, 100.0, 86.0, 140.0);
        let fresh = detect(moving, &targets, &settings);
        assert!(fresh.x.is_none());
        let detection = sticky.resolve(moving, fresh, 5.0);
        assert_eq!(detection.x.as_ref().unwrap().correction, -6.0);

        // 8.0 away: released.
        let moving = Rect::new(48.0, 100.0, 88.0, 140.0);
        let detection = sticky.resolve(moving, detect(moving, &targets, &settings), 5.0);
        assert!(detection.x.is_none());
        assert!(!sticky.is_locked(Axis::X));
    }
}
