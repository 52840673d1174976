//! Snapline Core Library
//!
//! Geometric snapping for interactive drags on a 2D vector canvas: lattice
//! snapping (including a warped parametric lattice), a priority-ordered
//! modifier pipeline, a snap source registry, and alignment/distance/size
//! guidelines with sticky hysteresis and a velocity gate.

pub mod angle;
pub mod context;
pub mod document;
pub mod engine;
pub mod gate;
pub mod geometry;
pub mod guides;
pub mod lattice;
pub mod modifiers;
pub mod pipeline;
pub mod registry;
pub mod settings;
pub mod sources;
pub mod viewport;
pub mod warp;

pub use context::{DragFeedback, ElementDragContext, ElementDragResult, InteractionMode, PointDragContext};
pub use document::{Document, ElementBounds, ElementId, MemoryDocument};
pub use engine::SnapEngine;
pub use gate::VelocityGate;
pub use guides::{Axis, GuidelineKind, GuidelineMatch};
pub use lattice::{LatticeConfig, LatticeKind};
pub use pipeline::{DragModifier, ElementDragModifier, Modifier, ModifierHandle, ModifierPipeline};
pub use registry::{SnapCandidate, SnapResult, SnapSource, SnapSourceRegistry, SnapTargetKind};
pub use settings::{ConfigError, GuidelineSettings, SnapMode, SnapSettings};
pub use viewport::Viewport;
pub use warp::{WarpKind, WarpParams};
