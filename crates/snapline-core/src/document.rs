//! Read-only access to the host document.

use crate::geometry::bounds_are_valid;
use kurbo::Rect;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Unique identifier for document elements.
pub type ElementId = Uuid;

/// Bounding box of one element (stroke-inclusive, computed by the host).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementBounds {
    pub id: ElementId,
    pub bounds: Rect,
}

impl ElementBounds {
    pub fn new(id: ElementId, bounds: Rect) -> Self {
        Self { id, bounds }
    }
}

/// Host seam over the document's current elements.
pub trait Document {
    /// Every element that may act as a snap target, in document order.
    fn element_ids(&self) -> Vec<ElementId>;

    /// Bounding box of an element, if it exists.
    fn element_bounds(&self, id: ElementId) -> Option<Rect>;

    /// Every id transitively contained by `id` (empty for non-groups).
    fn group_descendants(&self, id: ElementId) -> Vec<ElementId>;
}

/// The selection plus every transitive descendant of any selected group.
pub fn exclusion_set(document: &dyn Document, selected: &HashSet<ElementId>) -> HashSet<ElementId> {
    let mut excluded = selected.clone();
    for &id in selected {
        excluded.extend(document.group_descendants(id));
    }
    excluded
}

/// Valid bounding boxes of every element not in `excluded`.
pub fn candidate_pool(document: &dyn Document, excluded: &HashSet<ElementId>) -> Vec<ElementBounds> {
    document
        .element_ids()
        .into_iter()
        .filter(|id| !excluded.contains(id))
        .filter_map(|id| {
            let bounds = document.element_bounds(id)?;
            if bounds_are_valid(bounds) {
                Some(ElementBounds::new(id, bounds))
            } else {
                log::trace!("Discarding invalid bounds for {}: {:?}", id, bounds);
                None
            }
        })
        .collect()
}

/// In-memory document: a flat list of element boxes plus group membership.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocument {
    order: Vec<ElementId>,
    bounds: HashMap<ElementId, Rect>,
    children: HashMap<ElementId, Vec<ElementId>>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an element.
    pub fn insert(&mut self, id: ElementId, bounds: Rect) {
        if self.bounds.insert(id, bounds).is_none() {
            self.order.push(id);
        }
    }

    /// Insert a group with the given direct children and bounds.
    pub fn insert_group(&mut self, id: ElementId, bounds: Rect, children: Vec<ElementId>) {
        self.insert(id, bounds);
        self.children.insert(id, children);
    }

    /// Remove an element (group membership entries pointing at it are kept).
    pub fn remove(&mut self, id: ElementId) {
        if self.bounds.remove(&id).is_some() {
            self.order.retain(|other| *other != id);
            self.children.remove(&id);
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl Document for MemoryDocument {
    fn element_ids(&self) -> Vec<ElementId> {
        self.order.clone()
    }

    fn element_bounds(&self, id: ElementId) -> Option<Rect> {
        self.bounds.get(&id).copied()
    }

    fn group_descendants(&self, id: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        let mut stack: Vec<ElementId> = self.children.get(&id).cloned().unwrap_or_default();
        while let Some(child) = stack.pop() {
            if child == id || !seen.insert(child) {
                continue;
            }
            out.push(child);
            if let Some(grandchildren) = self.children.get(&child) {
                stack.extend(grandchildren.iter().copied());
            }
        }
        out
    }
}
