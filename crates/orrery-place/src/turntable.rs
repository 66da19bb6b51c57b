//! Non-AR model viewer state: a model at the origin the user can spin and zoom.

use glam::{EulerRot, Quat, Vec2, Vec3};

use crate::params::ScaleParameters;
use crate::runtime::NodeTransform;
use crate::scale::compute_safe_scale;

/// Visual diameter of a model at multiplier 1.
pub const TARGET_SIZE: f32 = 0.5;
pub const MIN_MULTIPLIER: f32 = 0.1;
pub const MAX_MULTIPLIER: f32 = 5.0;
/// Degrees of rotation per pixel dragged.
pub const ROTATION_SPEED: f32 = 0.5;
/// Elevation limit in degrees, short of the poles.
pub const MAX_ELEVATION: f32 = 85.0;
/// Largest slider position; the midpoint is multiplier 1.
pub const SLIDER_MAX: u8 = 200;

const SLIDER_MID: f32 = 100.0;
const DRAG_THRESHOLD: f32 = 1.0;

/// Size presets offered next to the slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizePreset {
    Small,
    Medium,
    Large,
}

impl SizePreset {
    #[must_use]
    pub fn multiplier(self) -> f32 {
        match self {
            Self::Small => 0.5,
            Self::Medium => 1.0,
            Self::Large => 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Turntable {
    base_scale: f32,
    multiplier: f32,
    azimuth: f32,
    elevation: f32,
}

impl Turntable {
    /// Viewer for a model whose largest bounding dimension is `extent`.
    #[must_use]
    pub fn new(extent: f32) -> Self {
        let params = ScaleParameters::COMPARE;
        let base_scale = compute_safe_scale(
            extent,
            TARGET_SIZE,
            params.min_scale,
            params.max_scale,
            params.fallback_scale,
            params.invalid_extent_threshold,
        );
        Self {
            base_scale,
            multiplier: 1.0,
            azimuth: 0.0,
            elevation: 0.0,
        }
    }

    #[must_use]
    pub fn base_scale(&self) -> f32 {
        self.base_scale
    }

    #[must_use]
    pub fn multiplier(&self) -> f32 {
        self.multiplier
    }

    pub fn set_multiplier(&mut self, multiplier: f32) {
        if multiplier.is_finite() {
            self.multiplier = multiplier.clamp(MIN_MULTIPLIER, MAX_MULTIPLIER);
        }
    }

    pub fn apply_preset(&mut self, preset: SizePreset) {
        self.set_multiplier(preset.multiplier());
    }

    /// Scale by a pinch gesture's incremental factor.
    pub fn pinch(&mut self, factor: f32) {
        if factor.is_finite() && factor > 0.0 {
            self.set_multiplier(self.multiplier * factor);
        }
    }

    /// Slider position for the current multiplier.
    ///
    /// The lower half covers 0.1 to 1, the upper half 1 to 5.
    #[must_use]
    pub fn slider_position(&self) -> u8 {
        let position = if self.multiplier <= 1.0 {
            (self.multiplier - MIN_MULTIPLIER) / (1.0 - MIN_MULTIPLIER) * SLIDER_MID
        } else {
            SLIDER_MID + (self.multiplier - 1.0) / (MAX_MULTIPLIER - 1.0) * SLIDER_MID
        };
        #[allow(clippy::cast_sign_loss)]
        let position = position.round().clamp(0.0, f32::from(SLIDER_MAX)) as u8;
        position
    }

    pub fn set_slider_position(&mut self, position: u8) {
        let position = f32::from(position.min(SLIDER_MAX));
        let multiplier = if position <= SLIDER_MID {
            MIN_MULTIPLIER + position / SLIDER_MID * (1.0 - MIN_MULTIPLIER)
        } else {
            1.0 + (position - SLIDER_MID) / SLIDER_MID * (MAX_MULTIPLIER - 1.0)
        };
        self.set_multiplier(multiplier);
    }

    /// Rotate by a drag of `delta` pixels. Sub-pixel jitter is ignored.
    pub fn drag(&mut self, delta: Vec2) {
        if delta.x.abs() < DRAG_THRESHOLD && delta.y.abs() < DRAG_THRESHOLD {
            return;
        }
        self.azimuth -= delta.x * ROTATION_SPEED;
        self.elevation = (self.elevation - delta.y * ROTATION_SPEED).clamp(-MAX_ELEVATION, MAX_ELEVATION);
    }

    /// Azimuth and elevation in degrees.
    #[must_use]
    pub fn orientation(&self) -> (f32, f32) {
        (self.azimuth, self.elevation)
    }

    #[must_use]
    pub fn transform(&self) -> NodeTransform {
        NodeTransform {
            position: Vec3::ZERO,
            scale: self.base_scale * self.multiplier,
            rotation: Quat::from_euler(
                EulerRot::XYZ,
                self.elevation.to_radians(),
                self.azimuth.to_radians(),
                0.0,
            ),
        }
    }
}
