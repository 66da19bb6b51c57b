//! Screen-adaptive sizing and the user scale multiplier.

/// Multiplier applied before the user touches the slider.
pub const DEFAULT_SCALE_MULTIPLIER: f32 = 0.67;

/// Slider bounds for the scale multiplier.
pub const MIN_SCALE_MULTIPLIER: f32 = 0.01;
pub const MAX_SCALE_MULTIPLIER: f32 = 2.0;

/// Factor by which target sizes grow on wider devices.
#[must_use]
pub fn screen_scale_factor(smallest_width_dp: u32) -> f32 {
    match smallest_width_dp {
        960.. => 1.35,
        840..=959 => 1.25,
        720..=839 => 1.18,
        600..=719 => 1.12,
        _ => 1.0,
    }
}

/// Scale a base size up for the screen, never past `max_adaptive_size`.
#[must_use]
pub fn adaptive_target_size(base_size: f32, max_adaptive_size: f32, smallest_width_dp: u32) -> f32 {
    (base_size * screen_scale_factor(smallest_width_dp)).clamp(base_size, max_adaptive_size)
}

/// Map a 0..=100 slider position to the scale multiplier.
#[must_use]
pub fn multiplier_from_slider(progress: u8) -> f32 {
    let progress = f32::from(progress.min(100));
    MIN_SCALE_MULTIPLIER + progress / 100.0 * (MAX_SCALE_MULTIPLIER - MIN_SCALE_MULTIPLIER)
}

/// Inverse of [`multiplier_from_slider`], rounded to the nearest step.
#[must_use]
pub fn slider_from_multiplier(multiplier: f32) -> u8 {
    let clamped = multiplier.clamp(MIN_SCALE_MULTIPLIER, MAX_SCALE_MULTIPLIER);
    let progress = (clamped - MIN_SCALE_MULTIPLIER) / (MAX_SCALE_MULTIPLIER - MIN_SCALE_MULTIPLIER);
    #[allow(clippy::cast_sign_loss)]
    let step = (progress * 100.0).round() as u8;
    step
}
