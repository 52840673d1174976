//! The snapping engine: composition root of pipelines, sources and feedback.

use crate::context::{DragFeedback, DragFrame, ElementDragContext, ElementDragResult, PointDragContext};
use crate::modifiers::{
    AngleSnapModifier, GridElementModifier, GridSnapModifier, GuidelineElementModifier, GuidelinePointModifier,
};
use crate::pipeline::{DragModifier, ElementDragModifier, ModifierHandle, ModifierPipeline};
use crate::registry::{SnapSource, SnapSourceRegistry};
use crate::sources::{ObjectPointSource, PathSource};
use kurbo::Point;

/// Owns the drag pipelines, the snap source registry and the feedback of the
/// current drag session.
///
/// Holds no configuration: settings arrive with every drag context.
#[derive(Default)]
pub struct SnapEngine {
    point_modifiers: ModifierPipeline<dyn DragModifier>,
    element_modifiers: ModifierPipeline<dyn ElementDragModifier>,
    sources: SnapSourceRegistry,
    feedback: DragFeedback,
    dragging: bool,
}

impl SnapEngine {
    /// An engine with nothing registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// An engine with the built-in modifiers and snap sources.
    pub fn with_defaults() -> Self {
        let mut engine = Self::new();
        engine.register_point_modifier(Box::new(AngleSnapModifier));
        engine.register_point_modifier(Box::new(GridSnapModifier));
        engine.register_point_modifier(Box::new(GuidelinePointModifier));
        engine.register_element_modifier(Box::new(GuidelineElementModifier::new()));
        engine.register_element_modifier(Box::new(GridElementModifier));
        engine.register_source(Box::new(ObjectPointSource));
        engine.register_source(Box::new(PathSource));
        engine
    }

    pub fn register_point_modifier(&mut self, modifier: Box<dyn DragModifier>) -> ModifierHandle {
        self.point_modifiers.register(modifier)
    }

    pub fn unregister_point_modifier(&mut self, id: &str) -> bool {
        self.point_modifiers.unregister(id)
    }

    pub fn register_element_modifier(&mut self, modifier: Box<dyn ElementDragModifier>) -> ModifierHandle {
        self.element_modifiers.register(modifier)
    }

    pub fn unregister_element_modifier(&mut self, id: &str) -> bool {
        self.element_modifiers.unregister(id)
    }

    pub fn register_source(&mut self, source: Box<dyn SnapSource>) {
        self.sources.register(source);
    }

    pub fn unregister_source(&mut self, id: &str) -> bool {
        self.sources.unregister(id)
    }

    pub fn point_modifiers(&self) -> &ModifierPipeline<dyn DragModifier> {
        &self.point_modifiers
    }

    pub fn element_modifiers(&self) -> &ModifierPipeline<dyn ElementDragModifier> {
        &self.element_modifiers
    }

    pub fn sources(&self) -> &SnapSourceRegistry {
        &self.sources
    }

    /// Feedback of the last drag frame.
    pub fn feedback(&self) -> &DragFeedback {
        &self.feedback
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Start a drag session from a clean slate.
    pub fn begin_drag(&mut self) {
        if self.dragging {
            log::debug!("Drag started while another was active; resetting");
            self.end_drag();
        }
        self.feedback.clear();
        self.point_modifiers.drag_started();
        self.element_modifiers.drag_started();
        self.dragging = true;
    }

    fn ensure_dragging(&mut self) {
        if !self.dragging {
            log::debug!("Drag update without begin_drag; starting a session");
            self.begin_drag();
        }
    }

    /// Run the point pipeline for one pointer move.
    pub fn drag_point(&mut self, ctx: &PointDragContext<'_>) -> Point {
        self.ensure_dragging();
        self.feedback.clear();
        let mut frame = DragFrame {
            sources: &self.sources,
            feedback: &mut self.feedback,
        };
        self.point_modifiers.apply_all(ctx.pointer, ctx, &mut frame)
    }

    /// Run the element pipeline for one pointer move of a selection.
    pub fn drag_elements(&mut self, ctx: &ElementDragContext<'_>) -> ElementDragResult {
        self.ensure_dragging();
        self.feedback.clear();
        let mut frame = DragFrame {
            sources: &self.sources,
            feedback: &mut self.feedback,
        };
        self.element_modifiers.apply_all(ctx.original_delta, ctx, &mut frame)
    }

    /// End (or cancel) the drag session and clear all transient state.
    pub fn end_drag(&mut self) {
        self.point_modifiers.drag_ended();
        self.element_modifiers.drag_ended();
        self.feedback.clear();
        self.dragging = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Instant;
    use crate::document::{ElementId, MemoryDocument};
    use crate::guides::GuidelineKind;
    use crate::pipeline::FnDragModifier;
    use crate::settings::{SnapMode, SnapSettings};
    use kurbo::{Rect, Vec2};
    use std::time::Duration;
    use uuid::Uuid;

    fn id(n: u128) -> ElementId {
        Uuid::from_u128(n)
    }

    fn settings(mode: SnapMode) -> SnapSettings {
        SnapSettings {
            mode,
            ..SnapSettings::default()
        }
    }

    #[test]
    fn test_defaults_registration() {
        let engine = SnapEngine::with_defaults();
        assert_eq!(engine.point_modifiers().ids(), vec!["angle", "grid", "guidelines"]);
        assert_eq!(engine.element_modifiers().ids(), vec!["guidelines", "grid"]);
        assert_eq!(engine.sources().ids(), vec!["object-points", "path"]);
    }

    #[test]
    fn test_object_snap_overrides_lattice() {
        let mut doc = MemoryDocument::new();
        doc.insert(id(1), Rect::new(0.0, 0.0, 33.0, 33.0));
        let s = settings(SnapMode::All);
        let mut engine = SnapEngine::with_defaults();

        engine.begin_drag();
        let ctx = PointDragContext::new(Point::new(34.0, 32.0), &s, &doc);
        assert_eq!(engine.drag_point(&ctx), Point::new(33.0, 33.0));
        assert!(engine.feedback().snap.is_some());

        let ctx = PointDragContext::new(Point::new(78.0, 118.0), &s, &doc);
        assert_eq!(engine.drag_point(&ctx), Point::new(80.0, 120.0));
        assert!(engine.feedback().is_empty());
        engine.end_drag();
    }

    #[test]
    fn test_custom_final_modifier_wins() {
        let doc = MemoryDocument::new();
        let s = settings(SnapMode::Grid);
        let mut engine = SnapEngine::with_defaults();
        engine.register_point_modifier(Box::new(FnDragModifier::new(
            "pin",
            100,
            |_: Point, _: &PointDragContext<'_>| Point::new(1.0, 2.0),
        )));

        let ctx = PointDragContext::new(Point::new(13.0, 17.0), &s, &doc);
        assert_eq!(engine.drag_point(&ctx), Point::new(1.0, 2.0));
        assert!(engine.unregister_point_modifier("pin"));
        assert_eq!(engine.drag_point(&ctx), Point::new(20.0, 20.0));
    }

    #[test]
    fn test_velocity_gate_passes_delta_through_and_clears_matches() {
        let mut doc = MemoryDocument::new();
        doc.insert(id(1), Rect::new(0.0, 0.0, 40.0, 40.0));
        doc.insert(id(9), Rect::new(200.0, 200.0, 240.0, 240.0));
        let s = settings(SnapMode::Shapes);
        let selection = Rect::new(200.0, 200.0, 240.0, 240.0);
        let mut engine = SnapEngine::with_defaults();
        let t0 = Instant::now();

        engine.begin_drag();
        let slow = Vec2::new(-157.0, -100.0);
        let ctx = ElementDragContext::new([id(9)], selection, slow, &s, &doc).with_timestamp(t0);
        let result = engine.drag_elements(&ctx);
        assert!(result.applied);
        assert!(!engine.feedback().guidelines.is_empty());

        // Over 200 units in 16 ms.
        let fast = Vec2::new(-7.3, 50.1);
        let ctx = ElementDragContext::new([id(9)], selection, fast, &s, &doc)
            .with_timestamp(t0 + Duration::from_millis(16));
        let result = engine.drag_elements(&ctx);
        assert!(!result.applied);
        assert_eq!(result.delta.x.to_bits(), fast.x.to_bits());
        assert_eq!(result.delta.y.to_bits(), fast.y.to_bits());
        assert!(engine.feedback().guidelines.is_empty());
    }

    #[test]
    fn test_end_drag_clears_feedback_and_locks() {
        let mut doc = MemoryDocument::new();
        doc.insert(id(1), Rect::new(0.0, 0.0, 40.0, 40.0));
        let s = settings(SnapMode::Shapes);
        let selection = Rect::new(200.0, 200.0, 240.0, 240.0);
        let mut engine = SnapEngine::with_defaults();

        engine.begin_drag();
        let ctx = ElementDragContext::new([], selection, Vec2::new(-157.0, -100.0), &s, &doc);
        assert!(engine.drag_elements(&ctx).applied);
        engine.end_drag();
        assert!(engine.feedback().is_empty());
        assert!(!engine.is_dragging());

        // Within the release distance but outside the threshold: a fresh
        // session holds no lock, so nothing engages.
        engine.begin_drag();
        let ctx = ElementDragContext::new([], selection, Vec2::new(-154.0, -100.0), &s, &doc);
        let result = engine.drag_elements(&ctx);
        assert!(!result.applied);
        assert!(engine
            .feedback()
            .guidelines
            .iter()
            .all(|m| m.kind == GuidelineKind::Size));
    }

    #[test]
    fn test_drag_without_begin_starts_session() {
        let doc = MemoryDocument::new();
        let s = settings(SnapMode::Grid);
        let mut engine = SnapEngine::with_defaults();
        let ctx = PointDragContext::new(Point::new(9.0, 11.0), &s, &doc);
        assert_eq!(engine.drag_point(&ctx), Point::new(0.0, 20.0));
        assert!(engine.is_dragging());
    }
}
