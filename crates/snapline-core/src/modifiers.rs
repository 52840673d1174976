//! Built-in drag modifiers: angle constraint, lattice snap and guidelines.

use crate::angle::snap_line_endpoint;
use crate::context::{DragFrame, ElementDragContext, ElementDragResult, InteractionMode, PointDragContext};
use crate::document::{candidate_pool, exclusion_set};
use crate::gate::VelocityGate;
use crate::guides::{GuidelineKind, StickyGuides, align_point, detect};
use crate::lattice;
use crate::pipeline::{
    CONSTRAINT_PRIORITY, DragModifier, ElementDragModifier, GRID_PRIORITY, GUIDELINE_PRIORITY, Modifier,
};
use crate::registry::SnapQuery;
use kurbo::Point;

pub const ANGLE_MODIFIER_ID: &str = "angle";
pub const GRID_MODIFIER_ID: &str = "grid";
pub const GUIDELINE_MODIFIER_ID: &str = "guidelines";

/// Rounds the direction of a line endpoint around its anchor.
#[derive(Debug, Default)]
pub struct AngleSnapModifier;

impl Modifier for AngleSnapModifier {
    fn id(&self) -> &str {
        ANGLE_MODIFIER_ID
    }

    fn priority(&self) -> i32 {
        CONSTRAINT_PRIORITY
    }
}

impl DragModifier for AngleSnapModifier {
    fn modify(&mut self, point: Point, ctx: &PointDragContext<'_>, _frame: &mut DragFrame<'_>) -> Point {
        match ctx.anchor {
            Some(anchor) if ctx.settings.angle_snap_enabled => {
                snap_line_endpoint(anchor, point, ctx.settings.angle_increment).point
            }
            _ => point,
        }
    }
}

/// Whether an angle constraint already fixed this point's direction.
fn angle_locked(ctx: &PointDragContext<'_>) -> bool {
    ctx.anchor.is_some() && ctx.settings.angle_snap_enabled
}

/// Snaps a dragged point to the configured lattice.
#[derive(Debug, Default)]
pub struct GridSnapModifier;

impl Modifier for GridSnapModifier {
    fn id(&self) -> &str {
        GRID_MODIFIER_ID
    }

    fn priority(&self) -> i32 {
        GRID_PRIORITY
    }
}

impl DragModifier for GridSnapModifier {
    fn modify(&mut self, point: Point, ctx: &PointDragContext<'_>, _frame: &mut DragFrame<'_>) -> Point {
        if !ctx.settings.mode.snaps_to_grid() || ctx.mode == InteractionMode::PointEditing || angle_locked(ctx) {
            return point;
        }
        lattice::snap(point, &ctx.settings.lattice)
    }
}

/// Snaps a dragged point to other elements.
///
/// Registered snap sources are asked first, with the raw pointer position, so
/// an element snap overrides any lattice result. Without a source hit, x and y
/// align to nearby edges and centers independently.
#[derive(Debug, Default)]
pub struct GuidelinePointModifier;

impl Modifier for GuidelinePointModifier {
    fn id(&self) -> &str {
        GUIDELINE_MODIFIER_ID
    }

    fn priority(&self) -> i32 {
        GUIDELINE_PRIORITY
    }
}

impl DragModifier for GuidelinePointModifier {
    fn modify(&mut self, point: Point, ctx: &PointDragContext<'_>, frame: &mut DragFrame<'_>) -> Point {
        if !ctx.settings.mode.snaps_to_shapes() {
            return point;
        }
        let excluded = exclusion_set(ctx.document, &ctx.dragged_ids);
        let pool = candidate_pool(ctx.document, &excluded);
        let guidelines = &ctx.settings.guidelines;

        let query = SnapQuery {
            point: ctx.pointer,
            targets: &pool,
            settings: guidelines,
        };
        if let Some(result) = frame.sources.snap(&query) {
            let snapped = result.point;
            frame.feedback.snap = Some(result);
            return snapped;
        }

        let detection = align_point(point, &pool, guidelines);
        if !detection.is_snapped() {
            return point;
        }
        frame.feedback.guidelines.extend(detection.matches());
        point + detection.correction()
    }
}

/// Snaps the top-left corner of a dragged selection to the lattice.
///
/// Stands down when an earlier stage already snapped the delta.
#[derive(Debug, Default)]
pub struct GridElementModifier;

impl Modifier for GridElementModifier {
    fn id(&self) -> &str {
        GRID_MODIFIER_ID
    }

    fn priority(&self) -> i32 {
        GRID_PRIORITY
    }
}

impl ElementDragModifier for GridElementModifier {
    fn modify(
        &mut self,
        input: ElementDragResult,
        ctx: &ElementDragContext<'_>,
        _frame: &mut DragFrame<'_>,
    ) -> ElementDragResult {
        if !ctx.settings.mode.snaps_to_grid() || input.applied {
            return input;
        }
        let origin = ctx.selection_bounds.origin() + input.delta;
        let snapped = lattice::snap(origin, &ctx.settings.lattice);
        ElementDragResult::snapped(input.delta + (snapped - origin))
    }
}

/// Snaps a dragged selection to alignment, equal-gap and equal-size guides.
///
/// Owns the velocity gate and the sticky axis locks of the drag session.
#[derive(Debug, Default)]
pub struct GuidelineElementModifier {
    gate: VelocityGate,
    sticky: StickyGuides,
}

impl GuidelineElementModifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom velocity gate.
    pub fn with_gate(gate: VelocityGate) -> Self {
        Self {
            gate,
            sticky: StickyGuides::new(),
        }
    }
}

impl Modifier for GuidelineElementModifier {
    fn id(&self) -> &str {
        GUIDELINE_MODIFIER_ID
    }

    fn priority(&self) -> i32 {
        GUIDELINE_PRIORITY
    }

    fn on_drag_start(&mut self) {
        self.gate.reset();
        self.sticky.clear();
    }

    fn on_drag_end(&mut self) {
        self.gate.reset();
        self.sticky.clear();
    }
}

impl ElementDragModifier for GuidelineElementModifier {
    fn modify(
        &mut self,
        input: ElementDragResult,
        ctx: &ElementDragContext<'_>,
        frame: &mut DragFrame<'_>,
    ) -> ElementDragResult {
        if !ctx.settings.mode.snaps_to_shapes() {
            return input;
        }
        if self.gate.is_too_fast(ctx.timestamp, ctx.original_delta) {
            frame.feedback.guidelines.clear();
            self.sticky.clear();
            return input;
        }

        let excluded = exclusion_set(ctx.document, &ctx.selected_ids);
        let pool = candidate_pool(ctx.document, &excluded);
        let moving = ctx.projected_bounds(input.delta);
        let guidelines = &ctx.settings.guidelines;

        let detection = detect(moving, &pool, guidelines);
        let detection = self.sticky.resolve(moving, detection, guidelines.snap_threshold);
        frame.feedback.guidelines = detection.matches();

        if !detection.is_snapped() {
            return input;
        }
        if log::log_enabled!(log::Level::Trace) {
            let kinds: Vec<GuidelineKind> = frame.feedback.guidelines.iter().map(|m| m.kind).collect();
            log::trace!("Guidelines engaged: {:?}", kinds);
        }
        ElementDragResult::snapped(input.delta + detection.correction())
    }
}
