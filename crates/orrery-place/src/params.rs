//! Tuning constants for model scaling and placement.
//!
//! All distances are in meters of AR world space. The presets are tuned for
//! heterogeneous model sources (NASA assets range from sub-meter moons to
//! kilometer-scale meshes), so scales are clamped aggressively.

use web_time::Duration;

/// Scaling and placement parameters.
///
/// A session is constructed with one preset and never changes it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleParameters {
    /// Visual diameter of the largest body on a phone-sized screen.
    pub base_visual_diameter: f32,
    /// Upper bound for the adaptive visual diameter on large screens.
    pub max_adaptive_visual_diameter: f32,
    /// Gap between neighbouring bodies on a phone-sized screen.
    pub base_model_gap: f32,
    /// Upper bound for the adaptive gap on large screens.
    pub max_adaptive_model_gap: f32,
    /// Smallest scale ever applied to a node.
    pub min_scale: f32,
    /// Largest scale ever applied to a node.
    pub max_scale: f32,
    /// Scale used when a model reports no usable bounding box.
    pub fallback_scale: f32,
    /// Extents at or below this are treated as missing.
    pub invalid_extent_threshold: f32,
    /// Distance in front of the camera for air placement.
    pub air_placement_forward: f32,
    /// Distance below the camera's line of sight for air placement.
    pub air_placement_down: f32,
    /// Air placement anchors on the surface at the screen centre when there
    /// is one, and only floats when there is not.
    pub air_prefers_surface: bool,
    /// Clearance kept between the camera and a model's surface.
    pub camera_safety_margin: f32,
    /// Rendered radius never goes below this.
    pub min_allowed_radius: f32,
    /// Slack subtracted from the radius before warning the user.
    pub inside_warning_buffer: f32,
    /// Minimum time between two inside warnings.
    pub inside_warning_cooldown: Duration,
}

impl ScaleParameters {
    /// Side-by-side comparison of several bodies.
    pub const COMPARE: Self = Self {
        base_visual_diameter: 0.7,
        max_adaptive_visual_diameter: 1.0,
        base_model_gap: 0.15,
        max_adaptive_model_gap: 0.25,
        min_scale: 0.0005,
        max_scale: 0.8,
        fallback_scale: 0.03,
        invalid_extent_threshold: 0.02,
        air_placement_forward: 1.5,
        air_placement_down: 0.0,
        air_prefers_surface: false,
        camera_safety_margin: 0.28,
        min_allowed_radius: 0.08,
        inside_warning_buffer: 0.06,
        inside_warning_cooldown: Duration::from_millis(4500),
    };

    /// A single body placed on its own.
    pub const SINGLE: Self = Self {
        base_visual_diameter: 0.8,
        max_adaptive_visual_diameter: 1.1,
        camera_safety_margin: 0.25,
        inside_warning_buffer: 0.05,
        air_placement_down: 0.7,
        air_prefers_surface: true,
        ..Self::COMPARE
    };

    /// Whether `extent` can be divided by.
    #[must_use]
    pub fn is_valid_extent(&self, extent: f32) -> bool {
        crate::extent::is_valid_extent(extent, self.invalid_extent_threshold)
    }
}

impl Default for ScaleParameters {
    fn default() -> Self {
        Self::COMPARE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_preset_overrides() {
        let single = ScaleParameters::SINGLE;
        assert!((single.base_visual_diameter - 0.8).abs() < f32::EPSILON);
        assert!((single.camera_safety_margin - 0.25).abs() < f32::EPSILON);
        assert_eq!(single.min_scale, ScaleParameters::COMPARE.min_scale);
        assert_eq!(single.inside_warning_cooldown, Duration::from_millis(4500));
        assert!((single.air_placement_down - 0.7).abs() < f32::EPSILON);
        assert!(single.air_prefers_surface);
        assert!(!ScaleParameters::COMPARE.air_prefers_surface);
    }

    #[test]
    fn test_presets_are_ordered() {
        for params in [ScaleParameters::COMPARE, ScaleParameters::SINGLE] {
            assert!(params.min_scale < params.fallback_scale);
            assert!(params.fallback_scale < params.max_scale);
            assert!(params.base_visual_diameter <= params.max_adaptive_visual_diameter);
            assert!(params.base_model_gap <= params.max_adaptive_model_gap);
        }
    }
}
