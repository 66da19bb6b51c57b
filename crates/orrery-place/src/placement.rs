//! The placement state machine.
//!
//! A [`PlacementSession`] owns the AR runtime and everything placed in it. It
//! is driven from the scene thread: the host calls a placement method in
//! response to user input and [`PlacementSession::on_frame`] once per rendered
//! frame. Model loads run on the [`TaskSpawner`] and report back through a
//! channel that `on_frame` drains.
//!
//! Every placement and every clear bumps a generation counter. A load
//! completion carries the generation it was started under, and completions
//! from an older generation are discarded without touching the anchor.

use std::collections::BTreeMap;

use glam::{Vec2, Vec3};
use orrery_catalog::CelestialBody;
use web_time::Instant;

use crate::events::PlacementEvent;
use crate::extent::probe_extent;
use crate::layout::{LayoutEntry, LayoutPlan, NodeMeasurement, compute_layout};
use crate::params::ScaleParameters;
use crate::proximity::ProximityMonitor;
use crate::radius::normalized_radius;
use crate::runtime::{AnchorHandle, ArRuntime, LoadError, NodeHandle, Pose, TaskSpawner};
use crate::scale::manual_scale_bounds;
use crate::sizing::{DEFAULT_SCALE_MULTIPLIER, MAX_SCALE_MULTIPLIER, MIN_SCALE_MULTIPLIER};

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementState {
    /// Nothing placed.
    Empty,
    /// Anchor created, some model loads still outstanding.
    Placing,
    /// Every load of the current placement resolved.
    Placed,
}

/// A finished model load, tagged with the generation that requested it.
struct LoadCompletion {
    generation: u64,
    index: usize,
    result: Result<NodeHandle, LoadError>,
}

/// A body as it was when the current placement started.
struct PlacedBody {
    name: String,
    radius: f64,
}

/// Places the selected bodies side by side and keeps them laid out.
pub struct PlacementSession<R: ArRuntime, S: TaskSpawner> {
    runtime: R,
    spawner: S,
    params: ScaleParameters,
    smallest_width_dp: u32,
    multiplier: f32,

    selection: Vec<CelestialBody>,
    bodies: Vec<PlacedBody>,

    generation: u64,
    state: PlacementState,
    anchor: Option<AnchorHandle>,
    nodes: BTreeMap<usize, NodeHandle>,
    extents: BTreeMap<usize, f32>,
    rendered_radii: BTreeMap<usize, f32>,
    layout: LayoutPlan,
    outstanding: usize,
    omitted: usize,
    shrink_notified: bool,
    selected: Option<usize>,

    monitor: ProximityMonitor,
    completion_tx: async_channel::Sender<LoadCompletion>,
    completion_rx: async_channel::Receiver<LoadCompletion>,
    events: Vec<PlacementEvent>,
}

impl<R: ArRuntime, S: TaskSpawner> PlacementSession<R, S> {
    /// Create an empty session for a device whose smallest screen side is
    /// `smallest_width_dp`.
    pub fn new(runtime: R, spawner: S, params: ScaleParameters, smallest_width_dp: u32) -> Self {
        let (completion_tx, completion_rx) = async_channel::unbounded();
        Self {
            runtime,
            spawner,
            params,
            smallest_width_dp,
            multiplier: DEFAULT_SCALE_MULTIPLIER,
            selection: Vec::new(),
            bodies: Vec::new(),
            generation: 0,
            state: PlacementState::Empty,
            anchor: None,
            nodes: BTreeMap::new(),
            extents: BTreeMap::new(),
            rendered_radii: BTreeMap::new(),
            layout: LayoutPlan::default(),
            outstanding: 0,
            omitted: 0,
            shrink_notified: false,
            selected: None,
            monitor: ProximityMonitor::new(
                params.inside_warning_buffer,
                params.min_allowed_radius,
                params.inside_warning_cooldown,
            ),
            completion_tx,
            completion_rx,
            events: Vec::new(),
        }
    }

    /// Bodies to place next, left to right. Takes effect on the next placement.
    pub fn set_selection(&mut self, bodies: Vec<CelestialBody>) {
        self.selection = bodies;
    }

    #[must_use]
    pub fn selection(&self) -> &[CelestialBody] {
        &self.selection
    }

    /// Place the selection on the surface under `screen_point`.
    ///
    /// Returns whether a placement started.
    pub fn place_on_surface(&mut self, screen_point: Vec2) -> bool {
        if self.selection.is_empty() {
            self.events.push(PlacementEvent::NoSelection);
            return false;
        }
        let Some(pose) = self.runtime.hit_test(screen_point) else {
            self.events.push(PlacementEvent::NoSurface);
            return false;
        };
        self.place_at(pose)
    }

    /// Place the selection floating in front of the camera.
    ///
    /// With [`ScaleParameters::air_prefers_surface`] a surface at the centre
    /// of the view wins over floating. The floating anchor is level and sits
    /// `air_placement_forward` ahead and `air_placement_down` below the
    /// camera. Returns whether a placement started.
    pub fn place_in_air(&mut self) -> bool {
        if self.selection.is_empty() {
            self.events.push(PlacementEvent::NoSelection);
            return false;
        }
        let Some(camera) = self.runtime.camera_pose() else {
            self.events.push(PlacementEvent::NoSurface);
            return false;
        };
        if self.params.air_prefers_surface {
            let center = self.runtime.viewport_center();
            if let Some(pose) = self.runtime.hit_test(center) {
                tracing::debug!("surface under view centre, anchoring there");
                return self.place_at(pose);
            }
        }
        let ahead = camera.transform_point(Vec3::new(
            0.0,
            -self.params.air_placement_down,
            -self.params.air_placement_forward,
        ));
        self.place_at(Pose::from_translation(ahead))
    }

    /// Handle a tap on the view.
    ///
    /// `tapped` is the node under the finger, if any. Tapping a placed body
    /// selects it. Tapping elsewhere first clears the selection, and only a
    /// tap with nothing selected places the bodies on the surface. Returns
    /// whether a placement started.
    pub fn handle_tap(&mut self, screen_point: Vec2, tapped: Option<NodeHandle>) -> bool {
        let hit = tapped.and_then(|node| {
            self.nodes
                .iter()
                .find_map(|(&index, &placed)| (placed == node).then_some(index))
        });
        if let Some(index) = hit {
            tracing::debug!(index, "body selected");
            self.selected = Some(index);
            return false;
        }
        if self.selected.take().is_some() {
            tracing::debug!("selection cleared");
            return false;
        }
        self.place_on_surface(screen_point)
    }

    /// Index of the placed body the user tapped last.
    #[must_use]
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Anchor the selection at `pose`, replacing any previous placement.
    pub fn place_at(&mut self, pose: Pose) -> bool {
        if self.selection.is_empty() {
            self.events.push(PlacementEvent::NoSelection);
            return false;
        }

        self.generation += 1;
        self.remove_placed();
        let anchor = self.runtime.create_anchor(pose);
        self.anchor = Some(anchor);
        self.state = PlacementState::Placing;
        self.shrink_notified = false;
        self.monitor.reset();

        self.bodies = self
            .selection
            .iter()
            .map(|body| PlacedBody {
                name: body.name.clone(),
                radius: normalized_radius(body),
            })
            .collect();

        let generation = self.generation;
        tracing::info!(
            generation,
            bodies = self.selection.len(),
            position = ?pose.translation,
            "placing"
        );
        self.events.push(PlacementEvent::Placing {
            generation,
            requested: self.selection.len(),
        });

        for (index, body) in self.selection.iter().enumerate() {
            let Some(reference) = body.model_reference() else {
                let error = LoadError::MissingModel {
                    name: body.name.clone(),
                };
                tracing::warn!(index, "{error}");
                self.omitted += 1;
                self.events.push(PlacementEvent::AssetFailed {
                    index,
                    name: body.name.clone(),
                    reason: error.to_string(),
                });
                continue;
            };

            let load = self.runtime.load_model(reference);
            let tx = self.completion_tx.clone();
            self.spawner.spawn(async move {
                let result = load.await;
                let _ = tx
                    .send(LoadCompletion {
                        generation,
                        index,
                        result,
                    })
                    .await;
            });
            self.outstanding += 1;
        }

        if self.outstanding == 0 {
            self.finish_placement();
        }
        true
    }

    /// Change the global scale multiplier and lay everything out again.
    pub fn set_scale_multiplier(&mut self, multiplier: f32) {
        let multiplier = if multiplier.is_finite() {
            multiplier.clamp(MIN_SCALE_MULTIPLIER, MAX_SCALE_MULTIPLIER)
        } else {
            DEFAULT_SCALE_MULTIPLIER
        };
        if (multiplier - self.multiplier).abs() < f32::EPSILON {
            return;
        }
        self.multiplier = multiplier;
        if !self.nodes.is_empty() {
            self.relayout();
        }
    }

    #[must_use]
    pub fn scale_multiplier(&self) -> f32 {
        self.multiplier
    }

    /// Remove everything and invalidate in-flight loads.
    pub fn clear(&mut self) {
        self.generation += 1;
        let had_placement = self.state != PlacementState::Empty;
        self.remove_placed();
        self.bodies.clear();
        self.state = PlacementState::Empty;
        self.monitor.reset();
        if had_placement {
            tracing::info!(generation = self.generation, "cleared placement");
            self.events.push(PlacementEvent::Cleared);
        }
    }

    /// Per-frame update: attach finished loads, relayout, check proximity.
    pub fn on_frame(&mut self, now: Instant) {
        let mut needs_layout = false;
        while let Ok(completion) = self.completion_rx.try_recv() {
            needs_layout |= self.handle_completion(completion);
        }
        if needs_layout {
            self.relayout();
        }
        if self.state == PlacementState::Placing && self.outstanding == 0 {
            self.finish_placement();
        }
        self.check_proximity(now);
    }

    /// Take the notifications raised since the last call.
    pub fn drain_events(&mut self) -> Vec<PlacementEvent> {
        std::mem::take(&mut self.events)
    }

    /// Release every placed node and hand back the runtime.
    pub fn teardown(mut self) -> R {
        self.clear();
        self.runtime
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn state(&self) -> PlacementState {
        self.state
    }

    #[must_use]
    pub fn anchor(&self) -> Option<AnchorHandle> {
        self.anchor
    }

    #[must_use]
    pub fn params(&self) -> &ScaleParameters {
        &self.params
    }

    /// Attached nodes by selection index.
    #[must_use]
    pub fn placed_nodes(&self) -> &BTreeMap<usize, NodeHandle> {
        &self.nodes
    }

    #[must_use]
    pub fn rendered_radius(&self, index: usize) -> Option<f32> {
        self.rendered_radii.get(&index).copied()
    }

    /// The most recently applied layout.
    #[must_use]
    pub fn layout(&self) -> &LayoutPlan {
        &self.layout
    }

    /// Number of loads still running for the current placement.
    #[must_use]
    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    /// Pinch-scale bounds for the body at `index`, if it is placed.
    #[must_use]
    pub fn manual_scale_bounds(&self, index: usize) -> Option<(f32, f32)> {
        let slot = self.layout.slot(index)?;
        let extent = self.extents.get(&index).copied()?;
        let distance = self.camera_distance(*self.nodes.get(&index)?);
        Some(manual_scale_bounds(&self.params, slot.scale, extent, distance))
    }

    #[must_use]
    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    pub fn runtime_mut(&mut self) -> &mut R {
        &mut self.runtime
    }

    /// Returns whether the layout changed.
    fn handle_completion(&mut self, completion: LoadCompletion) -> bool {
        let LoadCompletion {
            generation,
            index,
            result,
        } = completion;

        if generation != self.generation {
            tracing::debug!(
                generation,
                current = self.generation,
                index,
                "dropping stale model load"
            );
            if let Ok(node) = result {
                self.runtime.discard_model(node);
            }
            return false;
        }

        self.outstanding = self.outstanding.saturating_sub(1);
        let name = self
            .bodies
            .get(index)
            .map(|body| body.name.clone())
            .unwrap_or_default();

        match (result, self.anchor) {
            (Ok(node), Some(anchor)) => {
                self.runtime.attach(anchor, node);
                let extent = probe_extent(&self.runtime, node);
                tracing::debug!(index, name = %name, extent, "model loaded");
                self.nodes.insert(index, node);
                self.extents.insert(index, extent);
                true
            }
            (Ok(node), None) => {
                self.runtime.discard_model(node);
                false
            }
            (Err(error), _) => {
                tracing::warn!(index, name = %name, "{error}");
                self.omitted += 1;
                self.events.push(PlacementEvent::AssetFailed {
                    index,
                    name,
                    reason: error.to_string(),
                });
                false
            }
        }
    }

    fn finish_placement(&mut self) {
        self.state = PlacementState::Placed;
        let placed = self.nodes.len();
        tracing::info!(
            generation = self.generation,
            placed,
            omitted = self.omitted,
            "placement ready"
        );
        self.events.push(PlacementEvent::Ready {
            generation: self.generation,
            placed,
            omitted: self.omitted,
        });
    }

    fn relayout(&mut self) {
        let entries: Vec<LayoutEntry> = self
            .bodies
            .iter()
            .enumerate()
            .map(|(index, body)| LayoutEntry {
                physical_radius: body.radius,
                measurement: self.measure(index),
            })
            .collect();

        let plan = compute_layout(
            &entries,
            self.multiplier,
            self.smallest_width_dp,
            &self.params,
        );
        plan.apply(&mut self.runtime, &self.nodes);

        for slot in &plan.slots {
            tracing::debug!(
                index = slot.index,
                x = slot.x,
                scale = slot.scale,
                radius = slot.rendered_radius,
                "layout"
            );
        }
        self.rendered_radii = plan
            .slots
            .iter()
            .map(|slot| (slot.index, slot.rendered_radius))
            .collect();

        let shrunk = plan.slots.iter().find(|slot| slot.distance_clamped);
        if let (false, Some(slot)) = (self.shrink_notified, shrunk) {
            tracing::warn!(index = slot.index, scale = slot.scale, "model auto-shrunk to fit");
            self.shrink_notified = true;
            self.events
                .push(PlacementEvent::AutoShrunk { index: slot.index });
        }
        self.layout = plan;
    }

    fn measure(&self, index: usize) -> Option<NodeMeasurement> {
        let node = *self.nodes.get(&index)?;
        let extent = self.extents.get(&index).copied().unwrap_or(0.0);
        Some(NodeMeasurement {
            extent,
            camera_distance: self.camera_distance(node),
        })
    }

    fn camera_distance(&self, node: NodeHandle) -> Option<f32> {
        let camera = self.runtime.camera_pose()?;
        let position = self.runtime.world_position(node)?;
        Some(camera.translation.distance(position))
    }

    fn check_proximity(&mut self, now: Instant) {
        if self.nodes.is_empty() {
            return;
        }
        let Some(camera) = self.runtime.camera_pose() else {
            return;
        };
        let runtime = &self.runtime;
        let radii = &self.rendered_radii;
        let bodies = self.nodes.iter().filter_map(|(&index, &node)| {
            let radius = *radii.get(&index)?;
            let position = runtime.world_position(node)?;
            Some((index, position, radius))
        });
        if let Some(index) = self.monitor.check(now, camera.translation, bodies) {
            tracing::info!(index, "camera inside model");
            self.events.push(PlacementEvent::InsideModel { index });
        }
    }

    fn remove_placed(&mut self) {
        for node in std::mem::take(&mut self.nodes).into_values() {
            self.runtime.detach(node);
        }
        if let Some(anchor) = self.anchor.take() {
            self.runtime.release_anchor(anchor);
        }
        self.extents.clear();
        self.rendered_radii.clear();
        self.layout = LayoutPlan::default();
        self.outstanding = 0;
        self.omitted = 0;
        self.selected = None;
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::{Arc, Mutex};

    use glam::Vec3;
    use web_time::Duration;

    use super::*;
    use crate::runtime::{LoadFuture, NodeTransform};

    type Task = Pin<Box<dyn Future<Output = ()> + Send>>;

    /// Holds spawned tasks until the test runs them, in any order.
    #[derive(Clone, Default)]
    struct ManualSpawner {
        tasks: Arc<Mutex<Vec<Option<Task>>>>,
    }

    impl ManualSpawner {
        fn len(&self) -> usize {
            self.tasks.lock().unwrap().len()
        }

        fn run(&self, id: usize) {
            let task = self.tasks.lock().unwrap()[id].take();
            if let Some(task) = task {
                futures::executor::block_on(task);
            }
        }

        fn run_all(&self) {
            for id in 0..self.len() {
                self.run(id);
            }
        }
    }

    impl TaskSpawner for ManualSpawner {
        fn spawn<F>(&self, future: F)
        where
            F: Future<Output = ()> + Send + 'static,
        {
            self.tasks.lock().unwrap().push(Some(Box::pin(future)));
        }
    }

    #[derive(Default)]
    struct MockRuntime {
        next_id: u64,
        surface: Option<Pose>,
        camera: Option<Pose>,
        anchors: HashMap<AnchorHandle, Pose>,
        attached: HashMap<NodeHandle, AnchorHandle>,
        transforms: HashMap<NodeHandle, NodeTransform>,
        half_extents: HashMap<NodeHandle, Vec3>,
        loaded: Vec<NodeHandle>,
        discarded: HashSet<NodeHandle>,
        released: Vec<AnchorHandle>,
        hits: Vec<Vec2>,
    }

    impl MockRuntime {
        fn new() -> Self {
            Self {
                surface: Some(Pose::from_translation(Vec3::new(0.0, 0.0, -2.0))),
                camera: Some(Pose::from_translation(Vec3::new(0.0, 1.5, 0.0))),
                ..Self::default()
            }
        }

        fn id(&mut self) -> u64 {
            self.next_id += 1;
            self.next_id
        }
    }

    impl ArRuntime for MockRuntime {
        fn hit_test(&mut self, screen_point: Vec2) -> Option<Pose> {
            self.hits.push(screen_point);
            self.surface
        }

        fn viewport_center(&self) -> Vec2 {
            Vec2::new(540.0, 1200.0)
        }

        fn camera_pose(&self) -> Option<Pose> {
            self.camera
        }

        fn create_anchor(&mut self, pose: Pose) -> AnchorHandle {
            let anchor = AnchorHandle(self.id());
            self.anchors.insert(anchor, pose);
            anchor
        }

        fn release_anchor(&mut self, anchor: AnchorHandle) {
            self.anchors.remove(&anchor);
            self.attached.retain(|_, a| *a != anchor);
            self.released.push(anchor);
        }

        fn load_model(&mut self, reference: &str) -> LoadFuture {
            if reference.starts_with("broken") {
                let reference = reference.to_string();
                return Box::pin(async move {
                    Err(LoadError::Decode {
                        reference,
                        message: "not a glTF file".to_string(),
                    })
                });
            }
            let node = NodeHandle(self.id());
            // "flat" models report no bounds.
            if !reference.starts_with("flat") {
                self.half_extents.insert(node, Vec3::splat(1.0));
            }
            self.loaded.push(node);
            Box::pin(async move { Ok(node) })
        }

        fn attach(&mut self, anchor: AnchorHandle, node: NodeHandle) {
            assert!(self.anchors.contains_key(&anchor), "attach to dead anchor");
            self.attached.insert(node, anchor);
        }

        fn detach(&mut self, node: NodeHandle) {
            self.attached.remove(&node);
        }

        fn discard_model(&mut self, node: NodeHandle) {
            self.discarded.insert(node);
        }

        fn set_transform(&mut self, node: NodeHandle, transform: NodeTransform) {
            self.transforms.insert(node, transform);
        }

        fn world_position(&self, node: NodeHandle) -> Option<Vec3> {
            let anchor = self.attached.get(&node)?;
            let pose = self.anchors.get(anchor)?;
            let local = self.transforms.get(&node).copied().unwrap_or_default();
            Some(pose.translation + pose.rotation * local.position)
        }

        fn bounding_half_extents(&self, node: NodeHandle) -> Option<Vec3> {
            self.half_extents.get(&node).copied()
        }
    }

    type Session = PlacementSession<MockRuntime, ManualSpawner>;

    fn session() -> (Session, ManualSpawner) {
        let spawner = ManualSpawner::default();
        let session = PlacementSession::new(
            MockRuntime::new(),
            spawner.clone(),
            ScaleParameters::COMPARE,
            411,
        );
        (session, spawner)
    }

    fn body(name: &str, radius: f64) -> CelestialBody {
        CelestialBody::new(name.to_lowercase(), name, radius)
            .with_model(format!("models/{}.glb", name.to_lowercase()))
    }

    fn sun_earth_mars() -> Vec<CelestialBody> {
        vec![
            body("Sun", 696_340.0),
            body("Earth", 6371.0),
            body("Mars", f64::NAN),
        ]
    }

    #[test]
    fn test_place_requires_selection() {
        let (mut session, spawner) = session();
        assert!(!session.place_on_surface(Vec2::ZERO));
        assert_eq!(session.drain_events(), vec![PlacementEvent::NoSelection]);
        assert_eq!(session.generation(), 0);
        assert_eq!(spawner.len(), 0);
    }

    #[test]
    fn test_place_without_surface() {
        let (mut session, _) = session();
        session.set_selection(sun_earth_mars());
        session.runtime_mut().surface = None;
        assert!(!session.place_on_surface(Vec2::ZERO));
        assert_eq!(session.drain_events(), vec![PlacementEvent::NoSurface]);
        assert_eq!(session.state(), PlacementState::Empty);

        session.runtime_mut().camera = None;
        assert!(!session.place_in_air());
        assert_eq!(session.drain_events(), vec![PlacementEvent::NoSurface]);
    }

    #[test]
    fn test_full_placement() {
        let (mut session, spawner) = session();
        session.set_selection(sun_earth_mars());
        assert!(session.place_on_surface(Vec2::new(540.0, 1200.0)));
        assert_eq!(session.state(), PlacementState::Placing);
        assert_eq!(session.outstanding(), 3);

        spawner.run_all();
        session.on_frame(Instant::now());

        assert_eq!(session.state(), PlacementState::Placed);
        assert_eq!(session.placed_nodes().len(), 3);
        let events = session.drain_events();
        assert_eq!(
            events,
            vec![
                PlacementEvent::Placing {
                    generation: 1,
                    requested: 3
                },
                PlacementEvent::Ready {
                    generation: 1,
                    placed: 3,
                    omitted: 0
                },
            ]
        );

        let anchor = session.anchor().unwrap();
        for node in session.placed_nodes().values() {
            assert_eq!(session.runtime().attached.get(node), Some(&anchor));
        }
    }

    #[test]
    fn test_out_of_order_loads_keep_request_order() {
        let (mut session, spawner) = session();
        session.set_selection(vec![
            body("Earth", 6371.0),
            body("Jupiter", 69_911.0),
            body("Mars", 3389.0),
        ]);
        session.place_on_surface(Vec2::ZERO);

        spawner.run(2);
        session.on_frame(Instant::now());
        spawner.run(0);
        spawner.run(1);
        session.on_frame(Instant::now());

        let xs: Vec<f32> = session.layout().slots.iter().map(|s| s.x).collect();
        let indices: Vec<usize> = session.layout().slots.iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert!(xs.windows(2).all(|w| w[0] < w[1]));

        let runtime = session.runtime();
        let x_of = |index: usize| {
            let node = session.placed_nodes()[&index];
            runtime.transforms[&node].position.x
        };
        assert!(x_of(0) < x_of(1) && x_of(1) < x_of(2));
    }

    #[test]
    fn test_replacement_drops_stale_loads() {
        let (mut session, spawner) = session();
        session.set_selection(sun_earth_mars());

        session.place_at(Pose::from_translation(Vec3::new(0.0, 0.0, -1.0)));
        let first_anchor = session.anchor().unwrap();
        let first_tasks = spawner.len();
        session.place_at(Pose::from_translation(Vec3::new(1.0, 0.0, -1.0)));
        assert_eq!(session.generation(), 2);
        assert!(session.runtime().released.contains(&first_anchor));

        // First placement's loads finish after the second placement started.
        for id in 0..first_tasks {
            spawner.run(id);
        }
        session.on_frame(Instant::now());
        assert!(session.placed_nodes().is_empty());
        assert_eq!(session.runtime().discarded.len(), 3);
        assert!(session.runtime().attached.is_empty());

        spawner.run_all();
        session.on_frame(Instant::now());
        assert_eq!(session.placed_nodes().len(), 3);
        let second_anchor = session.anchor().unwrap();
        assert_ne!(first_anchor, second_anchor);
        for node in session.placed_nodes().values() {
            assert!(!session.runtime().discarded.contains(node));
            assert_eq!(session.runtime().attached[node], second_anchor);
        }
        assert_eq!(session.runtime().anchors.len(), 1);
    }

    #[test]
    fn test_clear_mid_load() {
        let (mut session, spawner) = session();
        session.set_selection(sun_earth_mars());
        session.place_on_surface(Vec2::ZERO);
        session.clear();
        assert_eq!(session.generation(), 2);
        assert_eq!(session.state(), PlacementState::Empty);

        spawner.run_all();
        session.on_frame(Instant::now());
        assert!(session.placed_nodes().is_empty());
        assert!(session.runtime().attached.is_empty());
        assert!(session.runtime().anchors.is_empty());

        let events = session.drain_events();
        assert_eq!(events.last(), Some(&PlacementEvent::Cleared));
        assert!(
            !events
                .iter()
                .any(|e| matches!(e, PlacementEvent::Ready { .. }))
        );
    }

    #[test]
    fn test_partial_failure_is_tolerated() {
        let (mut session, spawner) = session();
        session.set_selection(vec![
            body("Earth", 6371.0),
            CelestialBody::new("pluto", "Pluto", 1188.0).with_model("broken/pluto.glb"),
            CelestialBody::new("ceres", "Ceres", 473.0),
        ]);
        session.place_on_surface(Vec2::ZERO);
        assert_eq!(session.outstanding(), 2);

        spawner.run_all();
        session.on_frame(Instant::now());
        assert_eq!(session.state(), PlacementState::Placed);
        assert_eq!(session.placed_nodes().len(), 1);

        let events = session.drain_events();
        let failed: Vec<usize> = events
            .iter()
            .filter_map(|e| match e {
                PlacementEvent::AssetFailed { index, .. } => Some(*index),
                _ => None,
            })
            .collect();
        assert_eq!(failed, vec![2, 1]);
        assert_eq!(
            events.last(),
            Some(&PlacementEvent::Ready {
                generation: 1,
                placed: 1,
                omitted: 2
            })
        );
    }

    #[test]
    fn test_selection_without_models_is_ready_immediately() {
        let (mut session, spawner) = session();
        session.set_selection(vec![CelestialBody::new("ceres", "Ceres", 473.0)]);
        session.place_on_surface(Vec2::ZERO);
        assert_eq!(spawner.len(), 0);
        assert_eq!(session.state(), PlacementState::Placed);
        assert!(matches!(
            session.drain_events().last(),
            Some(PlacementEvent::Ready {
                placed: 0,
                omitted: 1,
                ..
            })
        ));
    }

    #[test]
    fn test_air_placement_is_in_front_of_camera() {
        let (mut session, _) = session();
        session.set_selection(vec![body("Earth", 6371.0)]);
        assert!(session.place_in_air());
        let anchor = session.anchor().unwrap();
        let pose = session.runtime().anchors[&anchor];
        assert!((pose.translation - Vec3::new(0.0, 1.5, -1.5)).length() < 1e-6);
    }

    fn single_session() -> (Session, ManualSpawner) {
        let spawner = ManualSpawner::default();
        let session = PlacementSession::new(
            MockRuntime::new(),
            spawner.clone(),
            ScaleParameters::SINGLE,
            411,
        );
        (session, spawner)
    }

    #[test]
    fn test_single_air_placement_prefers_centre_surface() {
        let (mut session, _) = single_session();
        session.set_selection(vec![body("Earth", 6371.0)]);
        assert!(session.place_in_air());
        assert_eq!(session.runtime().hits, vec![Vec2::new(540.0, 1200.0)]);
        let pose = session.runtime().anchors[&session.anchor().unwrap()];
        assert!((pose.translation - Vec3::new(0.0, 0.0, -2.0)).length() < 1e-6);
    }

    #[test]
    fn test_single_air_placement_floats_below_line_of_sight() {
        let (mut session, _) = single_session();
        session.set_selection(vec![body("Earth", 6371.0)]);
        session.runtime_mut().surface = None;
        assert!(session.place_in_air());
        let pose = session.runtime().anchors[&session.anchor().unwrap()];
        // 1.5 m ahead and 0.7 m below an upright camera at eye height.
        assert!((pose.translation - Vec3::new(0.0, 0.8, -1.5)).length() < 1e-6);
        assert_eq!(pose.rotation, glam::Quat::IDENTITY);
    }

    #[test]
    fn test_compare_air_placement_ignores_surface() {
        let (mut session, _) = session();
        session.set_selection(vec![body("Earth", 6371.0)]);
        assert!(session.place_in_air());
        assert!(session.runtime().hits.is_empty());
    }

    #[test]
    fn test_tap_selects_then_deselects_before_replacing() {
        let (mut session, spawner) = session();
        session.set_selection(sun_earth_mars());
        assert!(session.handle_tap(Vec2::ZERO, None));
        spawner.run_all();
        session.on_frame(Instant::now());
        let earth = session.placed_nodes()[&1];

        assert!(!session.handle_tap(Vec2::ZERO, Some(earth)));
        assert_eq!(session.selected(), Some(1));

        // A node from somewhere else counts as empty space.
        assert!(!session.handle_tap(Vec2::ZERO, Some(NodeHandle(999))));
        assert_eq!(session.selected(), None);
        assert_eq!(session.generation(), 1);

        assert!(session.handle_tap(Vec2::ZERO, None));
        assert_eq!(session.generation(), 2);
    }

    #[test]
    fn test_selection_cleared_with_placement() {
        let (mut session, spawner) = session();
        session.set_selection(sun_earth_mars());
        session.place_on_surface(Vec2::ZERO);
        spawner.run_all();
        session.on_frame(Instant::now());
        let sun = session.placed_nodes()[&0];
        session.handle_tap(Vec2::ZERO, Some(sun));
        session.clear();
        assert_eq!(session.selected(), None);
    }

    #[test]
    fn test_multiplier_change_relayouts() {
        let (mut session, spawner) = session();
        session.set_selection(vec![body("Earth", 6371.0)]);
        session.runtime_mut().camera = None;
        session.place_on_surface(Vec2::ZERO);
        spawner.run_all();
        session.on_frame(Instant::now());

        let before = session.layout().slots[0].scale;
        session.set_scale_multiplier(1.34);
        let after = session.layout().slots[0].scale;
        assert!((after - 2.0 * before).abs() < 1e-5);

        let node = session.placed_nodes()[&0];
        assert!((session.runtime().transforms[&node].scale - after).abs() < f32::EPSILON);
    }

    #[test]
    fn test_degenerate_model_gets_fallback_scale() {
        let (mut session, spawner) = session();
        session.set_selection(vec![
            CelestialBody::new("earth", "Earth", 6371.0).with_model("flat/earth.glb"),
        ]);
        session.place_on_surface(Vec2::ZERO);
        spawner.run_all();
        session.on_frame(Instant::now());
        let slot = session.layout().slots[0];
        assert!((slot.scale - ScaleParameters::COMPARE.fallback_scale).abs() < f32::EPSILON);
        assert!(session.rendered_radius(0).unwrap() >= ScaleParameters::COMPARE.min_allowed_radius);
    }

    #[test]
    fn test_auto_shrink_notified_once() {
        let (mut session, spawner) = session();
        session.set_selection(vec![body("Jupiter", 69_911.0), body("Saturn", 58_232.0)]);
        // Camera 0.4 m from the anchor.
        session.runtime_mut().camera = Some(Pose::from_translation(Vec3::new(0.0, 0.0, -1.6)));
        session.set_scale_multiplier(2.0);
        session.place_on_surface(Vec2::ZERO);
        spawner.run_all();
        session.on_frame(Instant::now());
        session.set_scale_multiplier(1.9);

        let shrunk = session
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, PlacementEvent::AutoShrunk { .. }))
            .count();
        assert_eq!(shrunk, 1);
    }

    #[test]
    fn test_inside_warning_respects_cooldown() {
        let (mut session, spawner) = session();
        session.set_selection(vec![body("Earth", 6371.0)]);
        session.runtime_mut().camera = None;
        session.place_on_surface(Vec2::ZERO);
        spawner.run_all();
        let start = Instant::now();
        session.on_frame(start);
        session.drain_events();

        // Walk into the model and stay there for two seconds.
        session.runtime_mut().camera = Some(Pose::from_translation(Vec3::new(0.0, 0.0, -2.0)));
        for frame in 0..120_u64 {
            session.on_frame(start + Duration::from_millis(frame * 16));
        }
        let warnings: Vec<_> = session
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, PlacementEvent::InsideModel { .. }))
            .collect();
        assert_eq!(warnings, vec![PlacementEvent::InsideModel { index: 0 }]);

        session.on_frame(start + Duration::from_secs(5));
        assert_eq!(
            session.drain_events(),
            vec![PlacementEvent::InsideModel { index: 0 }]
        );
    }

    #[test]
    fn test_manual_scale_bounds_for_placed_body() {
        let (mut session, spawner) = session();
        session.set_selection(vec![body("Earth", 6371.0)]);
        session.runtime_mut().camera = None;
        session.place_on_surface(Vec2::ZERO);
        assert_eq!(session.manual_scale_bounds(0), None);
        spawner.run_all();
        session.on_frame(Instant::now());

        let (min, max) = session.manual_scale_bounds(0).unwrap();
        let applied = session.layout().slots[0].scale;
        assert!((min - applied * 0.2).abs() < 1e-6);
        assert!(max <= ScaleParameters::COMPARE.max_scale);
    }

    #[test]
    fn test_teardown_releases_everything() {
        let (mut session, spawner) = session();
        session.set_selection(sun_earth_mars());
        session.place_on_surface(Vec2::ZERO);
        spawner.run_all();
        session.on_frame(Instant::now());
        let runtime = session.teardown();
        assert!(runtime.attached.is_empty());
        assert!(runtime.anchors.is_empty());
    }
}
