//! Ordered drag modifier pipelines.
//!
//! Modifiers are folded in ascending priority; equal priorities keep their
//! registration order. A modifier that does not apply under the current
//! settings returns its input unchanged.

use crate::context::{DragFrame, ElementDragContext, ElementDragResult, PointDragContext};
use kurbo::{Point, Vec2};

/// Priority of cheap geometric constraints (angle locking).
pub const CONSTRAINT_PRIORITY: i32 = 10;
/// Priority of the built-in lattice snap.
pub const GRID_PRIORITY: i32 = 50;
/// Priority of the built-in guideline snap.
pub const GUIDELINE_PRIORITY: i32 = 50;
/// Modifiers at or above this priority are final: once they snap, later
/// stages are skipped.
pub const FINAL_PRIORITY: i32 = 100;

/// Identity and ordering shared by both modifier forms.
pub trait Modifier {
    /// Unique id within its pipeline.
    fn id(&self) -> &str;

    /// Fold position; lower runs first.
    fn priority(&self) -> i32;

    /// Called when a drag session starts.
    fn on_drag_start(&mut self) {}

    /// Called when a drag session ends or is cancelled. Must clear all
    /// transient state.
    fn on_drag_end(&mut self) {}
}

/// Modifier of a single dragged point.
pub trait DragModifier: Modifier {
    fn modify(&mut self, point: Point, ctx: &PointDragContext<'_>, frame: &mut DragFrame<'_>) -> Point;
}

/// Modifier of a whole-selection drag delta.
pub trait ElementDragModifier: Modifier {
    fn modify(
        &mut self,
        input: ElementDragResult,
        ctx: &ElementDragContext<'_>,
        frame: &mut DragFrame<'_>,
    ) -> ElementDragResult;
}

/// Proof of registration; carries the id to unregister with.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModifierHandle {
    id: String,
}

impl ModifierHandle {
    pub fn id(&self) -> &str {
        &self.id
    }
}

struct Entry<M: ?Sized> {
    priority: i32,
    modifier: Box<M>,
}

/// An ordered collection of modifiers.
pub struct ModifierPipeline<M: ?Sized> {
    entries: Vec<Entry<M>>,
}

impl<M: ?Sized> Default for ModifierPipeline<M> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<M: ?Sized + Modifier> ModifierPipeline<M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a modifier. A modifier with the same id is replaced.
    pub fn register(&mut self, modifier: Box<M>) -> ModifierHandle {
        let id = modifier.id().to_string();
        let priority = modifier.priority();
        if self.unregister(&id) {
            log::warn!("Replacing drag modifier '{}'", id);
        }
        if priority > FINAL_PRIORITY {
            log::warn!("Drag modifier '{}' registered at priority {} is treated as final", id, priority);
        }
        // Insert after every entry of equal priority to keep FIFO order.
        let index = self.entries.partition_point(|e| e.priority <= priority);
        self.entries.insert(index, Entry { priority, modifier });
        log::debug!("Registered drag modifier '{}' at priority {}", id, priority);
        ModifierHandle { id }
    }

    /// Remove a modifier by id. Unknown ids are a no-op.
    pub fn unregister(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.modifier.id() != id);
        let removed = self.entries.len() != before;
        if removed {
            log::debug!("Unregistered drag modifier '{}'", id);
        }
        removed
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|e| e.modifier.id() == id)
    }

    /// Ids in fold order.
    pub fn ids(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.modifier.id()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn drag_started(&mut self) {
        for entry in &mut self.entries {
            entry.modifier.on_drag_start();
        }
    }

    pub fn drag_ended(&mut self) {
        for entry in &mut self.entries {
            entry.modifier.on_drag_end();
        }
    }
}

impl ModifierPipeline<dyn DragModifier> {
    /// Fold `point` through every modifier.
    pub fn apply_all(&mut self, point: Point, ctx: &PointDragContext<'_>, frame: &mut DragFrame<'_>) -> Point {
        let mut current = point;
        for entry in &mut self.entries {
            let next = entry.modifier.modify(current, ctx, frame);
            let changed = next != current;
            current = next;
            if changed && entry.priority >= FINAL_PRIORITY {
                log::trace!("Final modifier '{}' ended the fold", entry.modifier.id());
                break;
            }
        }
        current
    }
}

impl ModifierPipeline<dyn ElementDragModifier> {
    /// Fold `delta` through every modifier.
    pub fn apply_all(
        &mut self,
        delta: Vec2,
        ctx: &ElementDragContext<'_>,
        frame: &mut DragFrame<'_>,
    ) -> ElementDragResult {
        let mut current = ElementDragResult::passthrough(delta);
        for entry in &mut self.entries {
            current = entry.modifier.modify(current, ctx, frame);
            if current.applied && entry.priority >= FINAL_PRIORITY {
                log::trace!("Final modifier '{}' ended the fold", entry.modifier.id());
                break;
            }
        }
        current
    }
}

/// A point modifier backed by a closure.
pub struct FnDragModifier<F> {
    id: String,
    priority: i32,
    f: F,
}

impl<F> FnDragModifier<F>
where
    F: FnMut(Point, &PointDragContext<'_>) -> Point,
{
    pub fn new(id: impl Into<String>, priority: i32, f: F) -> Self {
        Self {
            id: id.into(),
            priority,
            f,
        }
    }
}

impl<F> Modifier for FnDragModifier<F> {
    fn id(&self) -> &str {
        &self.id
    }

    fn priority(&self) -> i32 {
        self.priority
    }
}

impl<F> DragModifier for FnDragModifier<F>
where
    F: FnMut(Point, &PointDragContext<'_>) -> Point,
{
    fn modify(&mut self, point: Point, ctx: &PointDragContext<'_>, _frame: &mut DragFrame<'_>) -> Point {
        (self.f)(point, ctx)
    }
}

/// An element modifier backed by a closure.
pub struct FnElementDragModifier<F> {
    id: String,
    priority: i32,
    f: F,
}

impl<F> FnElementDragModifier<F>
where
    F: FnMut(ElementDragResult, &ElementDragContext<'_>) -> ElementDragResult,
{
    pub fn new(id: impl Into<String>, priority: i32, f: F) -> Self {
        Self {
            id: id.into(),
            priority,
            f,
        }
    }
}

impl<F> Modifier for FnElementDragModifier<F> {
    fn id(&self) -> &str {
        &self.id
    }

    fn priority(&self) -> i32 {
        self.priority
    }
}

impl<F> ElementDragModifier for FnElementDragModifier<F>
where
    F: FnMut(ElementDragResult, &ElementDragContext<'_>) -> ElementDragResult,
{
    fn modify(
        &mut self,
        input: ElementDragResult,
        ctx: &ElementDragContext<'_>,
        _frame: &mut DragFrame<'_>,
    ) -> ElementDragResult {
        (self.f)(input, ctx)
    }
}
