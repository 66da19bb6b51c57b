//! A simulated AR scene.
//!
//! Stands in for an AR toolkit: a flat floor at y = 0, a camera the driver can
//! move, and models that either come from the asset store or are faked with a
//! fixed bounding box.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use glam::{Vec2, Vec3};
use orrery_catalog::AssetStore;
use orrery_place::{
    AnchorHandle, ArRuntime, LoadError, LoadFuture, NodeHandle, NodeTransform, Pose,
};
use web_time::Duration;

/// Eye height of the simulated viewer.
pub const EYE_HEIGHT: f32 = 1.5;
/// Distance ahead of the camera where the floor is hit.
const HIT_DISTANCE: f32 = 1.5;
/// Screen size of the simulated phone, in pixels.
pub const VIEWPORT: Vec2 = Vec2::new(1080.0, 2400.0);
/// Latency of a simulated model load.
const FAKE_LOAD_DELAY: Duration = Duration::from_millis(40);

#[derive(Debug)]
struct SimNode {
    anchor: Option<AnchorHandle>,
    transform: NodeTransform,
    half_extents: Option<Vec3>,
}

pub struct SimulatedScene {
    next_id: u64,
    camera: Pose,
    tracking: bool,
    model_extent: f32,
    assets: Option<Arc<AssetStore>>,
    anchors: HashMap<AnchorHandle, Pose>,
    nodes: HashMap<NodeHandle, SimNode>,
}

impl SimulatedScene {
    /// Scene whose models all report `model_extent` as their largest dimension.
    ///
    /// With an asset store, model files are downloaded and checked before the
    /// node is handed over.
    pub fn new(model_extent: f32, assets: Option<Arc<AssetStore>>) -> Self {
        Self {
            next_id: 0,
            camera: Pose::from_translation(Vec3::new(0.0, EYE_HEIGHT, 0.0)),
            tracking: true,
            model_extent,
            assets,
            anchors: HashMap::new(),
            nodes: HashMap::new(),
        }
    }

    pub fn set_tracking(&mut self, tracking: bool) {
        self.tracking = tracking;
    }

    pub fn camera_position(&self) -> Vec3 {
        self.camera.translation
    }

    /// Move the camera up to `step` meters toward `target`.
    pub fn walk_towards(&mut self, target: Vec3, step: f32) {
        let offset = target - self.camera.translation;
        let distance = offset.length();
        if distance <= step {
            self.camera.translation = target;
        } else {
            self.camera.translation += offset / distance * step;
        }
    }

    /// Number of nodes attached to a live anchor.
    pub fn attached_count(&self) -> usize {
        self.nodes
            .values()
            .filter(|node| node.anchor.is_some_and(|a| self.anchors.contains_key(&a)))
            .count()
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl ArRuntime for SimulatedScene {
    fn hit_test(&mut self, screen_point: Vec2) -> Option<Pose> {
        if !self.tracking {
            return None;
        }
        let ahead = self.camera.forward(HIT_DISTANCE).translation;
        tracing::debug!(?screen_point, "hit test");
        Some(Pose::from_translation(Vec3::new(ahead.x, 0.0, ahead.z)))
    }

    fn viewport_center(&self) -> Vec2 {
        VIEWPORT / 2.0
    }

    fn camera_pose(&self) -> Option<Pose> {
        self.tracking.then_some(self.camera)
    }

    fn create_anchor(&mut self, pose: Pose) -> AnchorHandle {
        let anchor = AnchorHandle(self.next_id());
        self.anchors.insert(anchor, pose);
        anchor
    }

    fn release_anchor(&mut self, anchor: AnchorHandle) {
        self.anchors.remove(&anchor);
        self.nodes.retain(|_, node| node.anchor != Some(anchor));
    }

    fn load_model(&mut self, reference: &str) -> LoadFuture {
        let node = NodeHandle(self.next_id());
        let half_extents = (self.model_extent > 0.0).then(|| Vec3::splat(self.model_extent / 2.0));
        self.nodes.insert(
            node,
            SimNode {
                anchor: None,
                transform: NodeTransform::default(),
                half_extents,
            },
        );

        let reference = reference.to_string();
        match &self.assets {
            Some(assets) => {
                let assets = Arc::clone(assets);
                Box::pin(async move {
                    let path = assets
                        .fetch(&reference)
                        .await
                        .map_err(|e| LoadError::download(&reference, &e))?;
                    check_model_file(&reference, &path).await?;
                    Ok(node)
                })
            }
            None => Box::pin(async move {
                tokio::time::sleep(FAKE_LOAD_DELAY * u32::try_from(node.0 % 3 + 1).unwrap_or(1))
                    .await;
                tracing::debug!(reference = %reference, "simulated model load");
                Ok(node)
            }),
        }
    }

    fn attach(&mut self, anchor: AnchorHandle, node: NodeHandle) {
        if let Some(node) = self.nodes.get_mut(&node) {
            node.anchor = Some(anchor);
        }
    }

    fn detach(&mut self, node: NodeHandle) {
        self.nodes.remove(&node);
    }

    fn discard_model(&mut self, node: NodeHandle) {
        self.nodes.remove(&node);
    }

    fn set_transform(&mut self, node: NodeHandle, transform: NodeTransform) {
        if let Some(node) = self.nodes.get_mut(&node) {
            node.transform = transform;
        }
    }

    fn world_position(&self, node: NodeHandle) -> Option<Vec3> {
        let node = self.nodes.get(&node)?;
        let anchor = self.anchors.get(&node.anchor?)?;
        Some(anchor.translation + anchor.rotation * node.transform.position)
    }

    fn bounding_half_extents(&self, node: NodeHandle) -> Option<Vec3> {
        self.nodes.get(&node)?.half_extents
    }
}

/// Reject files the renderer could not open: binary glTF must carry the
/// `glTF` magic, JSON glTF must have an `asset` object.
async fn check_model_file(reference: &str, path: &Path) -> Result<(), LoadError> {
    let decode_error = |message: String| LoadError::Decode {
        reference: reference.to_string(),
        message,
    };
    let data = tokio::fs::read(path)
        .await
        .map_err(|e| decode_error(e.to_string()))?;

    if path.extension().is_some_and(|ext| ext == "gltf") {
        let document: serde_json::Value =
            serde_json::from_slice(&data).map_err(|e| decode_error(e.to_string()))?;
        if document.get("asset").is_none() {
            return Err(decode_error("missing asset header".to_string()));
        }
    } else if !data.starts_with(b"glTF") {
        return Err(decode_error("not a binary glTF file".to_string()));
    }
    Ok(())
}
