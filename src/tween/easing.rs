//! Easing curves and interpolation

use serde::{Deserialize, Serialize};

/// Easing curve applied to normalized step progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Easing {
    #[default]
    Linear,
    /// Fast start, gentle landing
    QuadraticOut,
}

impl Easing {
    /// Map progress `t` in [0, 1] to eased progress (clamped)
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::QuadraticOut => t * (2.0 - t),
        }
    }
}

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
