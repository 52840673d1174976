//! Snap source registry.
//!
//! Independent features register [`SnapSource`]s. On each query every source
//! proposes its best local candidate (or none) and the registry picks one
//! global winner.

use crate::document::ElementBounds;
use crate::settings::GuidelineSettings;
use kurbo::Point;

/// Type of snap target, used for visual feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapTargetKind {
    /// Corner/vertex of a box.
    Corner,
    /// Midpoint of an edge.
    Midpoint,
    /// Center of a box.
    Center,
    /// Point on an edge.
    Edge,
}

/// One source's best proposal for a query.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapCandidate {
    pub point: Point,
    pub source_id: String,
    /// Distance from the raw query point.
    pub distance: f64,
    pub kind: SnapTargetKind,
}

/// The winning candidate of a query.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapResult {
    /// The snapped point.
    pub point: Point,
    /// Source that produced it.
    pub source_id: String,
    /// Distance from the raw query point.
    pub distance: f64,
    pub kind: SnapTargetKind,
}

impl From<SnapCandidate> for SnapResult {
    fn from(candidate: SnapCandidate) -> Self {
        Self {
            point: candidate.point,
            source_id: candidate.source_id,
            distance: candidate.distance,
            kind: candidate.kind,
        }
    }
}

/// Input of a registry query.
#[derive(Debug, Clone, Copy)]
pub struct SnapQuery<'a> {
    /// Raw point to snap.
    pub point: Point,
    /// Candidate target boxes (selection already excluded).
    pub targets: &'a [ElementBounds],
    pub settings: &'a GuidelineSettings,
}

/// A snap-producing strategy.
pub trait SnapSource {
    /// Unique id within the registry.
    fn id(&self) -> &str;

    /// Tie-break between equally distant candidates; higher wins.
    fn priority(&self) -> i32 {
        0
    }

    /// Maximum distance of a candidate this source may return.
    fn threshold(&self, settings: &GuidelineSettings) -> f64 {
        settings.snap_threshold
    }

    /// Best local candidate within [`SnapSource::threshold`], if any.
    fn candidate(&self, query: &SnapQuery<'_>) -> Option<SnapCandidate>;
}

/// Central broker of snap sources.
#[derive(Default)]
pub struct SnapSourceRegistry {
    sources: Vec<Box<dyn SnapSource>>,
}

impl SnapSourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a source. A source with the same id is replaced in place.
    pub fn register(&mut self, source: Box<dyn SnapSource>) {
        let id = source.id().to_string();
        if let Some(slot) = self.sources.iter_mut().find(|s| s.id() == id) {
            log::warn!("Replacing snap source '{}'", id);
            *slot = source;
        } else {
            log::debug!("Registered snap source '{}'", id);
            self.sources.push(source);
        }
    }

    /// Remove a source by id. Unknown ids are a no-op.
    pub fn unregister(&mut self, id: &str) -> bool {
        let before = self.sources.len();
        self.sources.retain(|s| s.id() != id);
        let removed = self.sources.len() != before;
        if removed {
            log::debug!("Unregistered snap source '{}'", id);
        }
        removed
    }

    pub fn contains(&self, id: &str) -> bool {
        self.sources.iter().any(|s| s.id() == id)
    }

    pub fn ids(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.id()).collect()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Ask every source and return the best candidate.
    ///
    /// Ranking: ascending distance, then descending source priority, then
    /// registration order. Candidates beyond their source's threshold are
    /// dropped.
    pub fn snap(&self, query: &SnapQuery<'_>) -> Option<SnapResult> {
        let mut best: Option<(SnapCandidate, i32)> = None;
        for source in &self.sources {
            let Some(candidate) = source.candidate(query) else {
                continue;
            };
            let threshold = source.threshold(query.settings);
            if !candidate.distance.is_finite() || candidate.distance > threshold {
                log::trace!(
                    "Snap source '{}' proposed a candidate beyond its threshold ({} > {})",
                    source.id(),
                    candidate.distance,
                    threshold
                );
                continue;
            }
            let priority = source.priority();
            let better = match &best {
                None => true,
                Some((current, current_priority)) => {
                    candidate.distance < current.distance
                        || (candidate.distance == current.distance && priority > *current_priority)
                }
            };
            if better {
                best = Some((candidate, priority));
            }
        }
        best.map(|(candidate, _)| {
            log::trace!("Snap source '{}' won at distance {}", candidate.source_id, candidate.distance);
            candidate.into()
        })
    }
}
