//! Side-by-side layout of several bodies.
//!
//! [`compute_layout`] is a pure function from radii and node measurements to
//! positions and scales. [`LayoutPlan::apply`] writes a plan to the scene.
//! Every relayout recomputes the whole plan.

use std::collections::BTreeMap;

use glam::{Quat, Vec3};

use crate::params::ScaleParameters;
use crate::radius::radius_ratio;
use crate::runtime::{ArRuntime, NodeHandle, NodeTransform};
use crate::scale::{estimate_rendered_radius, solve_scale};
use crate::sizing::adaptive_target_size;

/// What the scene currently reports about a loaded node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeMeasurement {
    /// Largest local bounding dimension (see [`crate::extent`]).
    pub extent: f32,
    /// Distance from the camera to the node, `None` while tracking is lost.
    pub camera_distance: Option<f32>,
}

/// One body in request order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutEntry {
    /// Physical radius in kilometers, already substituted.
    pub physical_radius: f64,
    /// `None` until the body's node has loaded.
    pub measurement: Option<NodeMeasurement>,
}

/// Placement of one loaded body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutSlot {
    /// Index into the layout entries.
    pub index: usize,
    /// Horizontal offset from the anchor.
    pub x: f32,
    pub scale: f32,
    pub target_diameter: f32,
    /// Radius used for spacing and the inside check.
    pub rendered_radius: f32,
    /// The camera-distance cap reduced the scale.
    pub distance_clamped: bool,
}

/// Result of a layout pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutPlan {
    /// Loaded bodies, left to right.
    pub slots: Vec<LayoutSlot>,
    /// Width spanned by all slots and the gaps between them.
    pub total_width: f32,
    pub gap: f32,
}

impl LayoutPlan {
    #[must_use]
    pub fn slot(&self, index: usize) -> Option<&LayoutSlot> {
        self.slots.iter().find(|slot| slot.index == index)
    }

    /// Whether any slot was shrunk by the camera-distance cap.
    #[must_use]
    pub fn any_distance_clamped(&self) -> bool {
        self.slots.iter().any(|slot| slot.distance_clamped)
    }

    /// Write the plan's transforms to the nodes it covers.
    pub fn apply<R: ArRuntime + ?Sized>(&self, runtime: &mut R, nodes: &BTreeMap<usize, NodeHandle>) {
        for slot in &self.slots {
            let Some(&node) = nodes.get(&slot.index) else {
                continue;
            };
            runtime.set_transform(
                node,
                NodeTransform {
                    position: Vec3::new(slot.x, 0.0, 0.0),
                    scale: slot.scale,
                    rotation: Quat::IDENTITY,
                },
            );
        }
    }
}

/// Lay out `entries` left to right, centered on the anchor.
///
/// Entries without a measurement take no space and get no slot.
#[must_use]
pub fn compute_layout(
    entries: &[LayoutEntry],
    multiplier: f32,
    smallest_width_dp: u32,
    params: &ScaleParameters,
) -> LayoutPlan {
    let base_diameter = adaptive_target_size(
        params.base_visual_diameter,
        params.max_adaptive_visual_diameter,
        smallest_width_dp,
    );
    let gap = adaptive_target_size(
        params.base_model_gap,
        params.max_adaptive_model_gap,
        smallest_width_dp,
    );
    let max_radius = entries
        .iter()
        .map(|entry| entry.physical_radius)
        .fold(f64::NAN, f64::max);

    let mut slots: Vec<LayoutSlot> = entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            let measurement = entry.measurement?;
            let target_diameter =
                base_diameter * radius_ratio(entry.physical_radius, max_radius) * multiplier;
            let decision = solve_scale(
                params,
                measurement.extent,
                target_diameter,
                measurement.camera_distance,
            );
            let rendered_radius = estimate_rendered_radius(
                measurement.extent,
                decision.scale,
                target_diameter,
                params.min_allowed_radius,
                params.invalid_extent_threshold,
            );
            Some(LayoutSlot {
                index,
                x: 0.0,
                scale: decision.scale,
                target_diameter,
                rendered_radius,
                distance_clamped: decision.distance_clamped,
            })
        })
        .collect();

    let total_width = total_width(slots.iter().map(|slot| slot.rendered_radius), gap);
    let mut cursor = -total_width / 2.0;
    for slot in &mut slots {
        slot.x = cursor + slot.rendered_radius;
        cursor += slot.rendered_radius * 2.0 + gap;
    }

    LayoutPlan {
        slots,
        total_width,
        gap,
    }
}

/// Width of a row of spheres with the given radii separated by `gap`.
#[must_use]
pub fn total_width(radii: impl IntoIterator<Item = f32>, gap: f32) -> f32 {
    let (count, diameters) = radii
        .into_iter()
        .fold((0_usize, 0.0_f32), |(n, sum), r| (n + 1, sum + r * 2.0));
    if count == 0 {
        return 0.0;
    }
    diameters + (count - 1) as f32 * gap
}
