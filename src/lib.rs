//! Hanoi 3D - An interactive three-dimensional Tower of Hanoi
//!
//! Core modules:
//! - `sim`: Stack model, move rules, interaction state machine, session control
//! - `scene`: CPU-side scene graph, camera and ray picking
//! - `tween`: Eased, chained property animations
//! - `config`: Data-driven table/pillar/plate dimensions and timings

pub mod config;
pub mod scene;
pub mod sim;
pub mod tween;

pub use config::{ConfigError, GameConfig};
pub use scene::{SceneGraph, Viewport};
pub use sim::{GameEvent, GameResult, PillarTag, Session};

/// Game configuration constants (defaults for [`GameConfig`])
pub mod consts {
    /// Table dimensions
    pub const TABLE_WIDTH: f32 = 30.0;
    pub const TABLE_DEPTH: f32 = 10.0;
    pub const TABLE_HEIGHT: f32 = 0.5;

    /// Pillar dimensions
    pub const PILLAR_HEIGHT: f32 = 5.4;
    pub const PILLAR_RADIUS: f32 = 0.2;
    pub const PILLAR_BASE_HEIGHT: f32 = 0.18;

    /// Plate thickness
    pub const PLATE_HEIGHT: f32 = 0.5;
    /// Common ratio of the plate radius progression (bottom to top)
    pub const PLATE_RADIUS_RATIO: f32 = 0.87;
    /// Hole through the plate is this much wider than the pillar
    pub const PLATE_PORE_CLEARANCE: f32 = 0.04;
    /// Plates in the first level
    pub const INITIAL_DISCS: u32 = 5;

    /// Plate palette, bottom plate first. Its length caps the level count.
    pub const PLATE_COLORS: [u32; 8] = [
        0xc186e0, 0x997feb, 0x59b1ff, 0x36cfc9, 0xbae637, 0xe7d558, 0xff9c6e, 0xff6b6b,
    ];

    /// Fixed scenery colors
    pub const TABLE_COLOR: u32 = 0xcccca6;
    pub const PILLAR_COLOR: u32 = 0xe6e6e9;
    pub const PILLAR_BASE_COLOR: u32 = 0x353546;
    pub const PILLAR_LABEL_COLOR: u32 = 0x202020;
    pub const PLATE_LABEL_COLOR: u32 = 0xffffff;

    /// Animation timings (seconds)
    pub const LIFT_SECS: f32 = 0.2;
    pub const TILT_SECS: f32 = 0.15;
    pub const PAN_SECS: f32 = 0.45;
    pub const SETTLE_SECS: f32 = 0.4;
    pub const SCALE_SECS: f32 = 0.2;
    pub const HOVER_SECS: f32 = 0.2;

    /// Held plates lean forward by this much
    pub const TILT_DEGREES: f32 = 15.0;
    /// Hovered plates grow by this factor
    pub const HOVER_SCALE: f32 = 1.1;
    /// Opacity of the placement ghost
    pub const GHOST_OPACITY: f32 = 0.5;

    /// Largest frame delta fed to the animator
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Camera defaults
    pub const CAMERA_FOV_DEGREES: f32 = 45.0;
    pub const CAMERA_NEAR: f32 = 1.0;
    pub const CAMERA_FAR: f32 = 500.0;
    pub const CAMERA_HEIGHT: f32 = 15.0;
}

/// Format a packed color as a CSS hex string (`#rrggbb`)
pub fn css_color(color: u32) -> String {
    format!("#{:06x}", color & 0xff_ffff)
}
