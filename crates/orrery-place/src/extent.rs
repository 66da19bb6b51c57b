//! Model extent probing.

use glam::Vec3;

use crate::runtime::{ArRuntime, NodeHandle};

/// Largest full-axis dimension of a box given by its half extents.
///
/// Returns NaN when any half extent is NaN so callers reject the box.
#[must_use]
pub fn extent_from_half_extents(half_extents: Vec3) -> f32 {
    if half_extents.is_nan() {
        return f32::NAN;
    }
    half_extents.max_element() * 2.0
}

/// Largest bounding dimension of a loaded model in its local units.
///
/// Returns 0 when the renderer has no bounding information for the node.
pub fn probe_extent<R: ArRuntime + ?Sized>(runtime: &R, node: NodeHandle) -> f32 {
    runtime
        .bounding_half_extents(node)
        .map_or(0.0, extent_from_half_extents)
}

/// Whether an extent is usable as a divisor.
#[must_use]
pub fn is_valid_extent(extent: f32, invalid_extent_threshold: f32) -> bool {
    extent.is_finite() && extent > invalid_extent_threshold
}
