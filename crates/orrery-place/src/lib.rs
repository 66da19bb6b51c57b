//! Scaling and placement of celestial body models in augmented reality.
//!
//! Catalog models come from many sources and range from centimeters to
//! kilometers in their own units. This crate turns them into a row of bodies
//! sized relative to each other, readable on any screen, and never so large
//! that the viewer ends up inside one.
//!
//! The engine is split into pure pieces and one stateful driver:
//!
//! - [`scale`], [`sizing`], [`radius`] and [`layout`] are pure functions
//! - [`PlacementSession`] owns an [`ArRuntime`], starts model loads on a
//!   [`TaskSpawner`] and applies layouts as loads complete
//! - [`ProximityMonitor`] warns when the camera walks into a model
//! - [`Turntable`] is the same sizing for the non-AR viewer
//!
//! # Example
//!
//! ```ignore
//! use orrery_place::{PlacementSession, ScaleParameters};
//!
//! let mut session = PlacementSession::new(runtime, spawner, ScaleParameters::COMPARE, 411);
//! session.set_selection(gather_selection(&catalog, &ids).await);
//! session.place_on_surface(tap);
//! // every frame:
//! session.on_frame(Instant::now());
//! for event in session.drain_events() { /* show a toast */ }
//! ```

pub mod events;
pub mod extent;
pub mod layout;
pub mod params;
pub mod placement;
pub mod proximity;
pub mod radius;
pub mod runtime;
pub mod scale;
mod selection;
pub mod sizing;
pub mod turntable;

pub use events::PlacementEvent;
pub use extent::probe_extent;
pub use layout::{LayoutEntry, LayoutPlan, LayoutSlot, NodeMeasurement, compute_layout};
pub use params::ScaleParameters;
pub use placement::{PlacementSession, PlacementState};
pub use proximity::ProximityMonitor;
pub use radius::{estimate_radius, normalized_radius, radius_ratio};
pub use runtime::{
    AnchorHandle, ArRuntime, LoadError, LoadFuture, NodeHandle, NodeTransform, Pose, TaskSpawner,
};
pub use scale::{
    compute_safe_scale, manual_scale_bounds, max_scale_allowed_by_camera_distance, solve_scale,
};
pub use selection::gather_selection;
pub use sizing::{adaptive_target_size, multiplier_from_slider, screen_scale_factor};
pub use turntable::{SizePreset, Turntable};
