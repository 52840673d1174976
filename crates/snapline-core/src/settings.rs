//! Snapping settings supplied by the host on every drag call.
//!
//! The engine never stores these. Hosts own them, validate them with
//! [`SnapSettings::validate`], and pass a reference into each drag context.

use crate::lattice::LatticeConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default guideline snap distance in canvas units.
pub const DEFAULT_SNAP_THRESHOLD: f64 = 5.0;

/// Default angle increment in degrees.
pub const DEFAULT_ANGLE_INCREMENT: f64 = 15.0;

/// Configuration errors reported to the host before settings are used.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Lattice spacing must be positive, got {0}")]
    NonPositiveSpacing(f64),
    #[error("Polar lattice needs at least 3 divisions, got {0}")]
    TooFewPolarDivisions(u32),
    #[error("Parametric step must be positive, got {0}")]
    NonPositiveStep(f64),
    #[error("Warp parameter {0} is not finite")]
    NonFiniteWarp(&'static str),
    #[error("Snap threshold must be non-negative, got {0}")]
    NegativeThreshold(f64),
    #[error("Angle increment must be positive, got {0}")]
    NonPositiveAngleIncrement(f64),
    #[error("Invalid settings document: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Snap mode for aligning drags to the lattice or other elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SnapMode {
    /// No snapping.
    #[default]
    None,
    /// Snap to the lattice.
    Grid,
    /// Snap to other elements (guidelines and object points).
    Shapes,
    /// Snap to both; element snaps win over the lattice.
    All,
}

impl SnapMode {
    /// Cycle to the next snap mode.
    pub fn next(self) -> Self {
        match self {
            SnapMode::None => SnapMode::Grid,
            SnapMode::Grid => SnapMode::Shapes,
            SnapMode::Shapes => SnapMode::All,
            SnapMode::All => SnapMode::None,
        }
    }

    /// Check if lattice snapping is enabled.
    pub fn snaps_to_grid(self) -> bool {
        matches!(self, SnapMode::Grid | SnapMode::All)
    }

    /// Check if element snapping is enabled.
    pub fn snaps_to_shapes(self) -> bool {
        matches!(self, SnapMode::Shapes | SnapMode::All)
    }

    /// Check if any snapping is enabled.
    pub fn is_enabled(self) -> bool {
        self != SnapMode::None
    }
}

/// Guideline toggles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GuidelineSettings {
    /// Edge/center alignment guides.
    pub enabled: bool,
    /// Equal-gap (distribution) guides.
    pub distance_enabled: bool,
    /// Equal width/height guides.
    pub size_matching_enabled: bool,
    /// Snap points onto element outlines.
    pub snap_to_path: bool,
    /// Include element centers as snap targets.
    pub snap_to_centers: bool,
    /// Maximum correction in canvas units.
    pub snap_threshold: f64,
}

impl Default for GuidelineSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            distance_enabled: true,
            size_matching_enabled: true,
            snap_to_path: false,
            snap_to_centers: true,
            snap_threshold: DEFAULT_SNAP_THRESHOLD,
        }
    }
}

impl GuidelineSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.snap_threshold.is_finite() && self.snap_threshold >= 0.0) {
            return Err(ConfigError::NegativeThreshold(self.snap_threshold));
        }
        Ok(())
    }
}

/// Everything the built-in modifiers read.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SnapSettings {
    pub mode: SnapMode,
    pub lattice: LatticeConfig,
    pub guidelines: GuidelineSettings,
    /// Round line endpoint directions to `angle_increment`.
    pub angle_snap_enabled: bool,
    /// Angle increment in degrees.
    pub angle_increment: f64,
}

impl Default for SnapSettings {
    fn default() -> Self {
        Self {
            mode: SnapMode::default(),
            lattice: LatticeConfig::default(),
            guidelines: GuidelineSettings::default(),
            angle_snap_enabled: false,
            angle_increment: DEFAULT_ANGLE_INCREMENT,
        }
    }
}

impl SnapSettings {
    /// Check every precondition the engine relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.lattice.validate()?;
        self.guidelines.validate()?;
        if !(self.angle_increment.is_finite() && self.angle_increment > 0.0) {
            return Err(ConfigError::NonPositiveAngleIncrement(self.angle_increment));
        }
        Ok(())
    }

    /// Parse and validate settings from the host's JSON representation.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }
}
