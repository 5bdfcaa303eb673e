//! Game configuration
//!
//! Dimensions, palette and animation timings. Loaded from JSON by the host
//! (embedded page config on web, a file path on native); every field falls
//! back to the defaults in [`crate::consts`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::sim::PillarTag;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("malformed config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{field} must be positive (got {value})")]
    NonPositive { field: &'static str, value: f32 },
    #[error("plate palette is empty")]
    EmptyPalette,
    #[error("initial disc count {count} outside 1..={max}")]
    DiscCount { count: u32, max: u32 },
    #[error("plate radius ratio {0} must be in (0, 1]")]
    RadiusRatio(f32),
    #[error("start and goal pillar are both {0}")]
    SameStartAndGoal(PillarTag),
}

/// Table box dimensions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    pub width: f32,
    pub depth: f32,
    pub height: f32,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            width: TABLE_WIDTH,
            depth: TABLE_DEPTH,
            height: TABLE_HEIGHT,
        }
    }
}

/// Pillar dimensions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PillarConfig {
    pub height: f32,
    pub radius: f32,
    pub base_height: f32,
}

impl Default for PillarConfig {
    fn default() -> Self {
        Self {
            height: PILLAR_HEIGHT,
            radius: PILLAR_RADIUS,
            base_height: PILLAR_BASE_HEIGHT,
        }
    }
}

/// Plate geometry and palette
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlateConfig {
    pub height: f32,
    /// Each plate's radius is this fraction of the one below it
    pub ratio: f32,
    /// Palette, bottom plate first (0xRRGGBB)
    pub colors: Vec<u32>,
}

impl Default for PlateConfig {
    fn default() -> Self {
        Self {
            height: PLATE_HEIGHT,
            ratio: PLATE_RADIUS_RATIO,
            colors: PLATE_COLORS.to_vec(),
        }
    }
}

/// Animation durations (seconds) and cue magnitudes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timings {
    pub lift: f32,
    pub tilt: f32,
    pub pan: f32,
    pub settle: f32,
    pub scale: f32,
    pub hover: f32,
    pub tilt_degrees: f32,
    pub hover_scale: f32,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            lift: LIFT_SECS,
            tilt: TILT_SECS,
            pan: PAN_SECS,
            settle: SETTLE_SECS,
            scale: SCALE_SECS,
            hover: HOVER_SECS,
            tilt_degrees: TILT_DEGREES,
            hover_scale: HOVER_SCALE,
        }
    }
}

/// Perspective camera parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Camera elevation above the table
    pub height: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: CAMERA_FOV_DEGREES,
            near: CAMERA_NEAR,
            far: CAMERA_FAR,
            height: CAMERA_HEIGHT,
        }
    }
}

/// Complete game configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub table: TableConfig,
    pub pillar: PillarConfig,
    pub plate: PlateConfig,
    pub timings: Timings,
    pub camera: CameraConfig,
    /// Plates in the first level
    pub initial_discs: u32,
    /// Pillar the plates start on
    pub start_pillar: PillarTag,
    /// Pillar that must hold the full stack to win
    pub goal_pillar: PillarTag,
    /// Whether putting a plate back on its own pillar counts as a move
    pub count_same_pillar_moves: bool,
    /// Attach text labels to plates and pillars
    pub labels: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            table: TableConfig::default(),
            pillar: PillarConfig::default(),
            plate: PlateConfig::default(),
            timings: Timings::default(),
            camera: CameraConfig::default(),
            initial_discs: INITIAL_DISCS,
            start_pillar: PillarTag::A,
            goal_pillar: PillarTag::C,
            count_same_pillar_moves: true,
            labels: true,
        }
    }
}

impl GameConfig {
    /// Parse and validate a JSON config. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Highest plate count (one palette color per plate)
    pub fn max_discs(&self) -> u32 {
        self.plate.colors.len() as u32
    }

    /// Largest plate radius, derived from the table depth
    pub fn max_plate_radius(&self) -> f32 {
        self.table.depth / 2.5
    }

    /// Radius of the hole through each plate
    pub fn pore_radius(&self) -> f32 {
        self.pillar.radius + PLATE_PORE_CLEARANCE
    }

    /// Height a picked-up plate is lifted to
    pub fn lift_height(&self) -> f32 {
        self.pillar.height * 1.5
    }

    /// Check dimensions, timings and disc counts
    pub fn validate(&self) -> Result<(), ConfigError> {
        let dimensions = [
            ("table.width", self.table.width),
            ("table.depth", self.table.depth),
            ("table.height", self.table.height),
            ("pillar.height", self.pillar.height),
            ("pillar.radius", self.pillar.radius),
            ("plate.height", self.plate.height),
            ("camera.fov_degrees", self.camera.fov_degrees),
            ("camera.near", self.camera.near),
            ("timings.hover_scale", self.timings.hover_scale),
        ];
        for (field, value) in dimensions {
            if !(value > 0.0) {
                return Err(ConfigError::NonPositive { field, value });
            }
        }

        // Zero durations are allowed (instant steps), negative ones are not
        let durations = [
            ("timings.lift", self.timings.lift),
            ("timings.tilt", self.timings.tilt),
            ("timings.pan", self.timings.pan),
            ("timings.settle", self.timings.settle),
            ("timings.scale", self.timings.scale),
            ("timings.hover", self.timings.hover),
            ("pillar.base_height", self.pillar.base_height),
        ];
        for (field, value) in durations {
            if !(value >= 0.0) {
                return Err(ConfigError::NonPositive { field, value });
            }
        }

        if !(self.plate.ratio > 0.0 && self.plate.ratio <= 1.0) {
            return Err(ConfigError::RadiusRatio(self.plate.ratio));
        }
        if self.plate.colors.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }
        let max = self.max_discs();
        if self.initial_discs == 0 || self.initial_discs > max {
            return Err(ConfigError::DiscCount {
                count: self.initial_discs,
                max,
            });
        }
        if self.start_pillar == self.goal_pillar {
            return Err(ConfigError::SameStartAndGoal(self.goal_pillar));
        }
        Ok(())
    }
}
