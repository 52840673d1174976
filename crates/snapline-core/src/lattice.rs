//! Lattice geometry: nearest point on one of several 2D lattice families.
//!
//! Every function here is pure and total for finite input and a valid
//! [`LatticeConfig`]. Validation (`spacing > 0`, `polar_divisions >= 3`) is the
//! caller's job; see [`LatticeConfig::validate`].

use crate::geometry::round_to_step;
use crate::settings::ConfigError;
use crate::warp::{self, DEFAULT_INVERSE_ITERATIONS, WarpParams};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Default lattice spacing (matches the visual grid).
pub const DEFAULT_SPACING: f64 = 20.0;

/// Default number of angular divisions of the polar lattice (30° steps).
pub const DEFAULT_POLAR_DIVISIONS: u32 = 12;

/// Minimum number of angular divisions of the polar lattice.
pub const MIN_POLAR_DIVISIONS: u32 = 3;

// Shared trigonometric constants, used by both the isometric and triangular
// lattices so forward and inverse uses never drift apart.
const SQRT_3: f64 = 1.732_050_807_568_877_2;
const HALF_SQRT_3: f64 = 0.866_025_403_784_438_6;
const TAN_30: f64 = 0.577_350_269_189_625_8;

/// Lattice family used for snapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LatticeKind {
    /// Orthogonal grid lines.
    #[default]
    Square,
    /// Same lattice as `Square`, rendered as dots.
    Dots,
    /// Vertical lines plus two families at ±30° from horizontal.
    Isometric,
    /// Horizontal lines plus two families at ±60°.
    Triangular,
    /// Concentric rings and radial spokes around the origin.
    Polar,
    /// Two families of 45°/135° lines.
    Diagonal,
    /// Rectangular base lattice pushed through a warp field.
    Parametric,
}

impl LatticeKind {
    /// Cycle to the next lattice kind.
    pub fn next(self) -> Self {
        match self {
            LatticeKind::Square => LatticeKind::Dots,
            LatticeKind::Dots => LatticeKind::Isometric,
            LatticeKind::Isometric => LatticeKind::Triangular,
            LatticeKind::Triangular => LatticeKind::Polar,
            LatticeKind::Polar => LatticeKind::Diagonal,
            LatticeKind::Diagonal => LatticeKind::Parametric,
            LatticeKind::Parametric => LatticeKind::Square,
        }
    }
}

/// Lattice settings read from the host configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatticeConfig {
    #[serde(default)]
    pub kind: LatticeKind,
    #[serde(default = "default_spacing")]
    pub spacing: f64,
    #[serde(default = "default_polar_divisions")]
    pub polar_divisions: u32,
    /// Vertical step of the parametric lattice (falls back to `spacing`).
    #[serde(default)]
    pub parametric_step_y: Option<f64>,
    /// Warp field of the parametric lattice (none = unwarped).
    #[serde(default)]
    pub warp: Option<WarpParams>,
}

fn default_spacing() -> f64 {
    DEFAULT_SPACING
}

fn default_polar_divisions() -> u32 {
    DEFAULT_POLAR_DIVISIONS
}

impl Default for LatticeConfig {
    fn default() -> Self {
        Self {
            kind: LatticeKind::default(),
            spacing: DEFAULT_SPACING,
            polar_divisions: DEFAULT_POLAR_DIVISIONS,
            parametric_step_y: None,
            warp: None,
        }
    }
}

impl LatticeConfig {
    /// A config of the given kind and spacing with every other field defaulted.
    pub fn new(kind: LatticeKind, spacing: f64) -> Self {
        Self {
            kind,
            spacing,
            ..Self::default()
        }
    }

    /// Horizontal and vertical steps of the parametric base lattice.
    pub fn parametric_steps(&self) -> (f64, f64) {
        (self.spacing, self.parametric_step_y.unwrap_or(self.spacing))
    }

    /// Check the preconditions of [`snap`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.spacing.is_finite() && self.spacing > 0.0) {
            return Err(ConfigError::NonPositiveSpacing(self.spacing));
        }
        if self.polar_divisions < MIN_POLAR_DIVISIONS {
            return Err(ConfigError::TooFewPolarDivisions(self.polar_divisions));
        }
        if let Some(step) = self.parametric_step_y {
            if !(step.is_finite() && step > 0.0) {
                return Err(ConfigError::NonPositiveStep(step));
            }
        }
        if let Some(warp) = &self.warp {
            warp.validate()?;
        }
        Ok(())
    }
}

/// Snap `point` to the nearest point of the configured lattice.
pub fn snap(point: Point, config: &LatticeConfig) -> Point {
    match config.kind {
        LatticeKind::Square | LatticeKind::Dots => snap_square(point, config.spacing),
        LatticeKind::Isometric => snap_isometric(point, config.spacing),
        LatticeKind::Triangular => snap_triangular(point, config.spacing),
        LatticeKind::Polar => snap_polar(point, config.spacing, config.polar_divisions),
        LatticeKind::Diagonal => snap_diagonal(point, config.spacing),
        LatticeKind::Parametric => {
            let (step_x, step_y) = config.parametric_steps();
            snap_parametric(point, step_x, step_y, config.warp.as_ref())
        }
    }
}

/// Round each coordinate to the nearest multiple of `spacing`.
pub fn snap_square(point: Point, spacing: f64) -> Point {
    Point::new(round_to_step(point.x, spacing), round_to_step(point.y, spacing))
}

/// Pick the candidate closest to `point`; on exact ties the earliest wins.
fn closest(point: Point, candidates: [Point; 3]) -> Point {
    let mut best = candidates[0];
    let mut best_dist = point.distance(best);
    for &candidate in &candidates[1..] {
        let dist = point.distance(candidate);
        if dist < best_dist {
            best = candidate;
            best_dist = dist;
        }
    }
    best
}

/// Isometric lattice: vertical lines (period `spacing·√3/2`) and lines at
/// ±30° with invariants `y ∓ x·tan30°` (period `spacing`).
pub fn snap_isometric(point: Point, spacing: f64) -> Point {
    let x_period = spacing * HALF_SQRT_3;
    let vx = round_to_step(point.x, x_period);
    let up = round_to_step(point.y - point.x * TAN_30, spacing);
    let down = round_to_step(point.y + point.x * TAN_30, spacing);

    let vertical_up = Point::new(vx, up + vx * TAN_30);
    let vertical_down = Point::new(vx, down - vx * TAN_30);
    let diagonals = Point::new((down - up) / (2.0 * TAN_30), (up + down) / 2.0);

    closest(point, [vertical_up, vertical_down, diagonals])
}

/// Triangular lattice: horizontal lines (period `spacing·√3/2`) and lines at
/// ±60° with invariants `y ∓ x·√3` (period `spacing·√3`).
pub fn snap_triangular(point: Point, spacing: f64) -> Point {
    let y_period = spacing * HALF_SQRT_3;
    let diagonal_period = spacing * SQRT_3;
    let hy = round_to_step(point.y, y_period);
    let up = round_to_step(point.y - point.x * SQRT_3, diagonal_period);
    let down = round_to_step(point.y + point.x * SQRT_3, diagonal_period);

    let horizontal_up = Point::new((hy - up) / SQRT_3, hy);
    let horizontal_down = Point::new((down - hy) / SQRT_3, hy);
    let diagonals = Point::new((down - up) / (2.0 * SQRT_3), (up + down) / 2.0);

    closest(point, [horizontal_up, horizontal_down, diagonals])
}

/// Polar lattice: rings every `spacing`, spokes every `2π / divisions`.
pub fn snap_polar(point: Point, spacing: f64, divisions: u32) -> Point {
    let radius = round_to_step(point.x.hypot(point.y), spacing);
    let angle = round_to_step(point.y.atan2(point.x), TAU / divisions as f64);
    Point::new(radius * angle.cos(), radius * angle.sin())
}

/// Diagonal lattice: 45°/135° lines with invariants `y - x` and `y + x`.
pub fn snap_diagonal(point: Point, spacing: f64) -> Point {
    let u = round_to_step(point.y - point.x, spacing);
    let v = round_to_step(point.y + point.x, spacing);
    Point::new((v - u) / 2.0, (u + v) / 2.0)
}

/// Parametric lattice: invert the warp, round on the base lattice, then
/// re-apply the forward warp at the rounded base.
///
/// The result lies exactly on the forward-warped image of a base lattice
/// point.
pub fn snap_parametric(point: Point, step_x: f64, step_y: f64, warp: Option<&WarpParams>) -> Point {
    let Some(warp) = warp else {
        return Point::new(round_to_step(point.x, step_x), round_to_step(point.y, step_y));
    };
    let base = warp::inverse_warp(point, warp, DEFAULT_INVERSE_ITERATIONS);
    let rounded = Point::new(round_to_step(base.x, step_x), round_to_step(base.y, step_y));
    rounded + warp::displacement(rounded, warp)
}
