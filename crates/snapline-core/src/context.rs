//! Per-call drag contexts and the transient feedback they produce.

use crate::document::{Document, ElementId};
use crate::guides::GuidelineMatch;
use crate::registry::{SnapResult, SnapSourceRegistry};
use crate::settings::SnapSettings;
use crate::viewport::Viewport;
use kurbo::{Point, Rect, Vec2};
use std::collections::HashSet;

// Use web-time on WASM, std::time otherwise
#[cfg(target_arch = "wasm32")]
pub use web_time::Instant;
#[cfg(not(target_arch = "wasm32"))]
pub use std::time::Instant;

/// What the pointer is currently editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionMode {
    /// Dragging shapes, handles or new-shape corners.
    #[default]
    Default,
    /// Editing individual path points; lattice snapping stands down.
    PointEditing,
}

/// Context of a single-point drag (handle, endpoint, new-shape corner).
#[derive(Clone)]
pub struct PointDragContext<'a> {
    /// Raw pointer position in canvas space.
    pub pointer: Point,
    /// Fixed other endpoint of a line being drawn or edited.
    pub anchor: Option<Point>,
    /// Elements moving with the point (never snap targets).
    pub dragged_ids: HashSet<ElementId>,
    pub mode: InteractionMode,
    pub settings: &'a SnapSettings,
    pub viewport: Viewport,
    pub document: &'a dyn Document,
}

impl<'a> PointDragContext<'a> {
    pub fn new(pointer: Point, settings: &'a SnapSettings, document: &'a dyn Document) -> Self {
        Self {
            pointer,
            anchor: None,
            dragged_ids: HashSet::new(),
            mode: InteractionMode::Default,
            settings,
            viewport: Viewport::default(),
            document,
        }
    }

    pub fn with_anchor(mut self, anchor: Point) -> Self {
        self.anchor = Some(anchor);
        self
    }

    pub fn with_dragged(mut self, ids: impl IntoIterator<Item = ElementId>) -> Self {
        self.dragged_ids = ids.into_iter().collect();
        self
    }

    pub fn with_mode(mut self, mode: InteractionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }
}

/// Context of a whole-selection drag.
#[derive(Clone)]
pub struct ElementDragContext<'a> {
    pub selected_ids: HashSet<ElementId>,
    /// Raw pointer delta since drag start.
    pub original_delta: Vec2,
    /// Bounds of the selection at drag start.
    pub selection_bounds: Rect,
    /// When this drag update was produced.
    pub timestamp: Instant,
    pub settings: &'a SnapSettings,
    pub viewport: Viewport,
    pub document: &'a dyn Document,
}

impl<'a> ElementDragContext<'a> {
    pub fn new(
        selected_ids: impl IntoIterator<Item = ElementId>,
        selection_bounds: Rect,
        original_delta: Vec2,
        settings: &'a SnapSettings,
        document: &'a dyn Document,
    ) -> Self {
        Self {
            selected_ids: selected_ids.into_iter().collect(),
            original_delta,
            selection_bounds,
            timestamp: Instant::now(),
            settings,
            viewport: Viewport::default(),
            document,
        }
    }

    pub fn with_timestamp(mut self, timestamp: Instant) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    /// Selection bounds translated by `delta`.
    pub fn projected_bounds(&self, delta: Vec2) -> Rect {
        self.selection_bounds + delta
    }
}

/// Output of an element drag modifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementDragResult {
    pub delta: Vec2,
    /// Whether some stage snapped the delta.
    pub applied: bool,
}

impl ElementDragResult {
    /// An unmodified delta.
    pub fn passthrough(delta: Vec2) -> Self {
        Self { delta, applied: false }
    }

    pub fn snapped(delta: Vec2) -> Self {
        Self { delta, applied: true }
    }
}

/// Transient visual feedback of the current drag frame.
///
/// Owned by the engine, read by the rendering layer between frames, cleared
/// at the start of every frame and on drag end.
#[derive(Debug, Clone, Default)]
pub struct DragFeedback {
    /// Guidelines engaged in the last frame.
    pub guidelines: Vec<GuidelineMatch>,
    /// Winning snap of the last frame.
    pub snap: Option<SnapResult>,
}

impl DragFeedback {
    pub fn clear(&mut self) {
        self.guidelines.clear();
        self.snap = None;
    }

    pub fn is_empty(&self) -> bool {
        self.guidelines.is_empty() && self.snap.is_none()
    }
}

/// Engine services available to modifiers while one frame is processed.
pub struct DragFrame<'e> {
    pub sources: &'e SnapSourceRegistry,
    pub feedback: &'e mut DragFeedback,
}
