//! Scale solving.
//!
//! Two passes decide a node's scale. The first sizes the model relative to
//! the visual diameter it should have. The second caps the scale so the
//! model's surface stays in front of the camera. Both passes tolerate a
//! degenerate extent by never dividing by it.

use crate::extent::is_valid_extent;
use crate::params::ScaleParameters;

/// Scale that makes a model of `model_extent` appear `target_diameter` wide.
///
/// Returns `fallback_scale` for an invalid extent.
#[must_use]
pub fn compute_safe_scale(
    model_extent: f32,
    target_diameter: f32,
    min_scale: f32,
    max_scale: f32,
    fallback_scale: f32,
    invalid_extent_threshold: f32,
) -> f32 {
    if !is_valid_extent(model_extent, invalid_extent_threshold) {
        return fallback_scale;
    }
    (target_diameter / model_extent).clamp(min_scale, max_scale)
}

/// Largest scale that keeps the camera outside the model.
///
/// `camera_distance` is `None` while tracking is lost. With no distance or
/// no usable extent there is nothing to cap, so `max_scale` is returned.
#[must_use]
pub fn max_scale_allowed_by_camera_distance(
    camera_distance: Option<f32>,
    model_extent: f32,
    camera_safety_margin: f32,
    min_allowed_radius: f32,
    min_scale: f32,
    max_scale: f32,
    invalid_extent_threshold: f32,
) -> f32 {
    if !is_valid_extent(model_extent, invalid_extent_threshold) {
        return max_scale;
    }
    let Some(distance) = camera_distance else {
        return max_scale;
    };
    let max_radius = (distance - camera_safety_margin).max(min_allowed_radius);
    let max_diameter = max_radius * 2.0;
    (max_diameter / model_extent).clamp(min_scale, max_scale)
}

/// Outcome of running both scale passes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleDecision {
    /// Scale to apply to the node.
    pub scale: f32,
    /// Scale the first pass asked for.
    pub unclamped: f32,
    /// Whether the camera-distance cap shrank the model.
    pub distance_clamped: bool,
}

/// Run both passes with a parameter preset.
#[must_use]
pub fn solve_scale(
    params: &ScaleParameters,
    model_extent: f32,
    target_diameter: f32,
    camera_distance: Option<f32>,
) -> ScaleDecision {
    let unclamped = compute_safe_scale(
        model_extent,
        target_diameter,
        params.min_scale,
        params.max_scale,
        params.fallback_scale,
        params.invalid_extent_threshold,
    );
    if !params.is_valid_extent(model_extent) {
        return ScaleDecision {
            scale: unclamped,
            unclamped,
            distance_clamped: false,
        };
    }

    let cap = max_scale_allowed_by_camera_distance(
        camera_distance,
        model_extent,
        params.camera_safety_margin,
        params.min_allowed_radius,
        params.min_scale,
        params.max_scale,
        params.invalid_extent_threshold,
    );
    let scale = unclamped.min(cap).max(params.min_scale);
    ScaleDecision {
        scale,
        unclamped,
        distance_clamped: scale < unclamped,
    }
}

/// Radius a model occupies once scaled, never below `min_allowed_radius`.
///
/// Without a usable extent the target diameter stands in for the real size.
#[must_use]
pub fn estimate_rendered_radius(
    model_extent: f32,
    scale: f32,
    fallback_diameter: f32,
    min_allowed_radius: f32,
    invalid_extent_threshold: f32,
) -> f32 {
    let diameter = if is_valid_extent(model_extent, invalid_extent_threshold) {
        model_extent * scale
    } else {
        fallback_diameter
    };
    (diameter / 2.0).max(min_allowed_radius)
}

/// Bounds for pinch-scaling a placed model by hand.
///
/// The user may shrink to a fifth or grow to 25x of the applied scale, but
/// never past the camera-distance cap. When the camera has moved closer since
/// placement the cap wins and both bounds collapse onto it.
#[must_use]
pub fn manual_scale_bounds(
    params: &ScaleParameters,
    applied_scale: f32,
    model_extent: f32,
    camera_distance: Option<f32>,
) -> (f32, f32) {
    let cap = max_scale_allowed_by_camera_distance(
        camera_distance,
        model_extent,
        params.camera_safety_margin,
        params.min_allowed_radius,
        params.min_scale,
        params.max_scale,
        params.invalid_extent_threshold,
    );
    let max = (applied_scale * 25.0).max(1.5).min(cap);
    let min = params.min_scale.max(applied_scale * 0.2).min(max);
    (min, max)
}
