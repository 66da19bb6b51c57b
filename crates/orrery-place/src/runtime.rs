//! The AR capability interface the engine drives.
//!
//! The engine never talks to an AR toolkit directly. A host binds exactly one
//! [`ArRuntime`] implementation at startup and one [`TaskSpawner`] for model
//! loads, then hands both to a [`PlacementSession`](crate::PlacementSession).

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use glam::{Quat, Vec2, Vec3};

/// Opaque handle to a scene node (a loaded model instance).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeHandle(pub u64);

/// Opaque handle to a world anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnchorHandle(pub u64);

/// A rigid transform in AR world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl Pose {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    #[must_use]
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            rotation: Quat::IDENTITY,
        }
    }

    /// The pose `distance` meters along this pose's forward (-Z) axis.
    #[must_use]
    pub fn forward(&self, distance: f32) -> Self {
        Self {
            translation: self.transform_point(Vec3::new(0.0, 0.0, -distance)),
            rotation: self.rotation,
        }
    }

    /// A point given in this pose's local frame, in world space.
    #[must_use]
    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.translation + self.rotation * local
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Local transform of a node relative to its anchor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeTransform {
    pub position: Vec3,
    pub scale: f32,
    pub rotation: Quat,
}

impl Default for NodeTransform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            scale: 1.0,
            rotation: Quat::IDENTITY,
        }
    }
}

/// Failure to turn a model reference into a scene node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// The body has no model reference.
    MissingModel { name: String },
    /// Fetching the model file failed.
    Download { reference: String, message: String },
    /// The renderer could not decode the file.
    Decode { reference: String, message: String },
}

impl LoadError {
    #[must_use]
    pub fn download(reference: impl Into<String>, error: &orrery_catalog::Error) -> Self {
        Self::Download {
            reference: reference.into(),
            message: error.to_string(),
        }
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingModel { name } => write!(f, "{name} has no 3D model"),
            Self::Download { reference, message } => {
                write!(f, "failed to download {reference}: {message}")
            }
            Self::Decode { reference, message } => {
                write!(f, "failed to decode {reference}: {message}")
            }
        }
    }
}

impl std::error::Error for LoadError {}

/// Future returned by [`ArRuntime::load_model`].
pub type LoadFuture = Pin<Box<dyn Future<Output = Result<NodeHandle, LoadError>> + Send + 'static>>;

/// What the engine needs from an AR toolkit.
///
/// All methods except the body of [`LoadFuture`] run on the thread that owns
/// the scene graph.
pub trait ArRuntime {
    /// Surface pose under a screen point, if tracking found one.
    fn hit_test(&mut self, screen_point: Vec2) -> Option<Pose>;

    /// Centre of the camera view in screen coordinates.
    fn viewport_center(&self) -> Vec2;

    /// Current camera pose. `None` while tracking is lost.
    fn camera_pose(&self) -> Option<Pose>;

    fn create_anchor(&mut self, pose: Pose) -> AnchorHandle;

    /// Release an anchor and detach everything attached to it.
    fn release_anchor(&mut self, anchor: AnchorHandle);

    /// Start instantiating a model. The returned future must not touch the
    /// scene graph; the node only becomes visible once attached.
    fn load_model(&mut self, reference: &str) -> LoadFuture;

    fn attach(&mut self, anchor: AnchorHandle, node: NodeHandle);

    fn detach(&mut self, node: NodeHandle);

    /// Drop a node that was loaded but will never be attached.
    fn discard_model(&mut self, node: NodeHandle);

    fn set_transform(&mut self, node: NodeHandle, transform: NodeTransform);

    /// World position of an attached node.
    fn world_position(&self, node: NodeHandle) -> Option<Vec3>;

    /// Half extents of the node's local-space bounding box, if known.
    fn bounding_half_extents(&self, node: NodeHandle) -> Option<Vec3>;
}

/// Spawns background work in an executor-agnostic way.
///
/// Results travel back through channels (e.g. `async_channel`); the spawned
/// future itself returns nothing.
pub trait TaskSpawner {
    fn spawn<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static;
}
