//! Warp field model for the parametric lattice.
//!
//! A warp field is a smooth displacement `d(p)` that perturbs a base lattice
//! into a non-uniform one. The forward field is closed form; the inverse is
//! approximated by fixed-point iteration.
//!
//! The inverse only converges while the spatial gradient of the field stays
//! well below 1. The default amplitude/frequency ranges satisfy this, but
//! arbitrary parameters may not: in that case [`inverse_warp`] still returns a
//! finite point, just a less accurate one.

use crate::settings::ConfigError;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};

/// Fixed spatial normalization of the sine-based fields.
pub const WARP_PERIOD: f64 = 1024.0;

/// Radius at which the radial field fades to zero.
pub const RADIAL_MAX_RADIUS: f64 = 500.0;

/// Fixed-point iterations used by the parametric lattice.
pub const DEFAULT_INVERSE_ITERATIONS: u32 = 4;

// Relative frequencies, weights and phase offsets of the three octaves of the
// Perlin2D field. Weights sum to 1 so the field stays within [-amp, amp].
const OCTAVE_FREQUENCIES: [(f64, f64); 3] = [(1.0, 1.0), (2.03, 1.97), (4.01, 3.99)];
const OCTAVE_WEIGHTS: [f64; 3] = [0.5, 0.3, 0.2];
const SEED_PHASES: [f64; 3] = [0.731, 1.370, 2.113];
// Sample offset decorrelating dy from dx.
const PERLIN_DY_OFFSET: Vec2 = Vec2::new(37.0, -11.0);

/// Family of warp fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WarpKind {
    /// Separable sine/cosine product.
    #[default]
    Sine2D,
    /// Swirled radial ripple around a center, faded out by a Hann window.
    Radial,
    /// Seeded sum of three sine/cosine octaves (cheap, reproducible).
    Perlin2D,
}

/// Parameters of a warp field.
///
/// Field names are part of the host's persisted settings shape. Every field
/// except `kind` has a default and may be omitted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarpParams {
    pub kind: WarpKind,
    #[serde(default = "default_amp")]
    pub amp_x: f64,
    #[serde(default = "default_amp")]
    pub amp_y: f64,
    #[serde(default = "default_freq")]
    pub freq_x: f64,
    #[serde(default = "default_freq")]
    pub freq_y: f64,
    #[serde(default)]
    pub phase_x: f64,
    #[serde(default = "default_phase_y")]
    pub phase_y: f64,
    #[serde(default)]
    pub seed: f64,
    #[serde(default)]
    pub center_x: f64,
    #[serde(default)]
    pub center_y: f64,
    #[serde(default)]
    pub swirl_turns: f64,
}

fn default_amp() -> f64 {
    8.0
}

fn default_freq() -> f64 {
    1.0
}

fn default_phase_y() -> f64 {
    PI / 3.0
}

impl WarpParams {
    /// Parameters of the given kind with every other field at its default.
    pub fn new(kind: WarpKind) -> Self {
        Self {
            kind,
            amp_x: default_amp(),
            amp_y: default_amp(),
            freq_x: default_freq(),
            freq_y: default_freq(),
            phase_x: 0.0,
            phase_y: default_phase_y(),
            seed: 0.0,
            center_x: 0.0,
            center_y: 0.0,
            swirl_turns: 0.0,
        }
    }

    /// Reject non-finite parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("ampX", self.amp_x),
            ("ampY", self.amp_y),
            ("freqX", self.freq_x),
            ("freqY", self.freq_y),
            ("phaseX", self.phase_x),
            ("phaseY", self.phase_y),
            ("seed", self.seed),
            ("centerX", self.center_x),
            ("centerY", self.center_y),
            ("swirlTurns", self.swirl_turns),
        ];
        match fields.iter().find(|(_, v)| !v.is_finite()) {
            Some((name, _)) => Err(ConfigError::NonFiniteWarp(*name)),
            None => Ok(()),
        }
    }
}

impl Default for WarpParams {
    fn default() -> Self {
        Self::new(WarpKind::default())
    }
}

/// Forward displacement of the warp field at `point`.
pub fn displacement(point: Point, warp: &WarpParams) -> Vec2 {
    match warp.kind {
        WarpKind::Sine2D => sine_displacement(point, warp),
        WarpKind::Radial => radial_displacement(point, warp),
        WarpKind::Perlin2D => perlin_displacement(point, warp),
    }
}

fn sine_displacement(point: Point, warp: &WarpParams) -> Vec2 {
    let ax = TAU * warp.freq_x * point.x / WARP_PERIOD + warp.phase_x;
    let ay = TAU * warp.freq_y * point.y / WARP_PERIOD + warp.phase_y;
    Vec2::new(
        warp.amp_x * ax.sin() * ay.cos(),
        warp.amp_y * ax.cos() * ay.sin(),
    )
}

fn radial_displacement(point: Point, warp: &WarpParams) -> Vec2 {
    let offset = point - Point::new(warp.center_x, warp.center_y);
    let r = offset.hypot();
    if r >= RADIAL_MAX_RADIUS || r < crate::geometry::DEGENERATE_LENGTH {
        return Vec2::ZERO;
    }
    let t = r / RADIAL_MAX_RADIUS;
    let angle = offset.y.atan2(offset.x) + TAU * warp.swirl_turns * t;
    let window = 0.5 * (1.0 + (PI * t).cos());
    let magnitude = warp.amp_x * window * (TAU * warp.freq_x * r / WARP_PERIOD + warp.phase_x).sin();
    Vec2::new(magnitude * angle.cos(), magnitude * angle.sin())
}

/// Smooth scalar field in [-1, 1].
fn octave_noise(x: f64, y: f64, warp: &WarpParams) -> f64 {
    let fx = TAU * warp.freq_x / WARP_PERIOD;
    let fy = TAU * warp.freq_y / WARP_PERIOD;
    let mut sum = 0.0;
    for i in 0..3 {
        let (kx, ky) = OCTAVE_FREQUENCIES[i];
        let phase_a = warp.seed * SEED_PHASES[i];
        let phase_b = warp.seed * SEED_PHASES[(i + 1) % 3];
        sum += OCTAVE_WEIGHTS[i] * (kx * fx * x + phase_a).sin() * (ky * fy * y + phase_b).cos();
    }
    sum
}

fn perlin_displacement(point: Point, warp: &WarpParams) -> Vec2 {
    let shifted = point + PERLIN_DY_OFFSET;
    Vec2::new(
        warp.amp_x * octave_noise(point.x, point.y, warp),
        warp.amp_y * octave_noise(shifted.y, shifted.x, warp),
    )
}

/// Invert the warp by fixed-point iteration.
///
/// Starts at `u = query` and repeats `u = query - d(u)` exactly `iterations`
/// times. Convergence requires a contractive field; see the module docs.
pub fn inverse_warp(query: Point, warp: &WarpParams, iterations: u32) -> Point {
    let mut u = query;
    for _ in 0..iterations {
        u = query - displacement(u, warp);
    }
    u
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_kinds() -> [WarpParams; 3] {
        [
            WarpParams::new(WarpKind::Sine2D),
            WarpParams::new(WarpKind::Radial),
            WarpParams::new(WarpKind::Perlin2D),
        ]
    }

    #[test]
    fn test_default_params() {
        let warp = WarpParams::default();
        assert_eq!(warp.kind, WarpKind::Sine2D);
        assert_eq!(warp.phase_x, 0.0);
        assert!((warp.phase_y - 1.047).abs() < 1e-3);
        assert_eq!(warp.swirl_turns, 0.0);
    }

    #[test]
    fn test_sine_displacement_formula() {
        let warp = WarpParams::new(WarpKind::Sine2D);
        let p = Point::new(256.0, 0.0);
        // sin(pi/2) * cos(pi/3) = 0.5 ; cos(pi/2) * sin(pi/3) ~ 0
        let d = displacement(p, &warp);
        assert!((d.x - 4.0).abs() < 1e-9);
        assert!(d.y.abs() < 1e-9);
    }

    #[test]
    fn test_radial_fades_out() {
        let mut warp = WarpParams::new(WarpKind::Radial);
        warp.center_x = 100.0;
        warp.center_y = 100.0;
        assert_eq!(displacement(Point::new(100.0, 100.0), &warp), Vec2::ZERO);
        assert_eq!(displacement(Point::new(700.0, 100.0), &warp), Vec2::ZERO);
        let near_edge = displacement(Point::new(100.0 + 499.0, 100.0), &warp);
        assert!(near_edge.hypot() < 1e-3);
    }

    #[test]
    fn test_radial_swirl_rotates_direction() {
        let mut warp = WarpParams::new(WarpKind::Radial);
        let p = Point::new(128.0, 0.0);
        let straight = displacement(p, &warp);
        warp.swirl_turns = 1.0;
        let swirled = displacement(p, &warp);
        assert!((straight.hypot() - swirled.hypot()).abs() < 1e-9);
        assert!((straight - swirled).hypot() > 1e-3);
    }

    #[test]
    fn test_perlin_is_deterministic_and_seeded() {
        let mut warp = WarpParams::new(WarpKind::Perlin2D);
        warp.seed = 42.0;
        let p = Point::new(313.0, -77.5);
        assert_eq!(displacement(p, &warp), displacement(p, &warp));

        let mut other = warp;
        other.seed = 7.0;
        assert_ne!(displacement(p, &warp), displacement(p, &other));
    }

    #[test]
    fn test_fields_are_bounded() {
        for warp in all_kinds() {
            for i in -20..20 {
                for j in -20..20 {
                    let p = Point::new(i as f64 * 37.3, j as f64 * 41.9);
                    let d = displacement(p, &warp);
                    assert!(d.x.abs() <= warp.amp_x + 1e-9);
                    assert!(d.y.abs() <= warp.amp_x.max(warp.amp_y) + 1e-9);
                }
            }
        }
    }

    #[test]
    fn test_inverse_warp_recovers_base() {
        for warp in all_kinds() {
            let base = Point::new(140.0, -260.0);
            let warped = base + displacement(base, &warp);
            let recovered = inverse_warp(warped, &warp, 12);
            assert!((recovered - base).hypot() < 1e-3, "{:?}", warp.kind);
        }
    }

    #[test]
    fn test_inverse_warp_zero_iterations_is_identity() {
        let warp = WarpParams::default();
        let p = Point::new(12.0, 34.0);
        assert_eq!(inverse_warp(p, &warp, 0), p);
    }

    #[test]
    fn test_validate_rejects_non_finite() {
        let mut warp = WarpParams::default();
        assert!(warp.validate().is_ok());
        warp.freq_y = f64::NAN;
        assert!(matches!(warp.validate(), Err(ConfigError::NonFiniteWarp("freqY"))));
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let warp: WarpParams = serde_json::from_str(r#"{"kind":"Radial","ampX":3.0}"#).unwrap();
        assert_eq!(warp.kind, WarpKind::Radial);
        assert_eq!(warp.amp_x, 3.0);
        assert_eq!(warp.amp_y, 8.0);
        assert!((warp.phase_y - PI / 3.0).abs() < 1e-12);
    }
}
