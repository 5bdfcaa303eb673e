//! Scene collaborator
//!
//! A CPU-side scene graph: flat list of shaped, transformed nodes, a camera
//! and the viewport. It answers ray queries for picking and produces a
//! [`FrameSnapshot`] the browser host draws from. Nodes carry no game state;
//! the [`EntityRegistry`] maps handles back to plates and pillars.

pub mod camera;
pub mod intersect;
pub mod picking;
pub mod snapshot;

pub use camera::{Camera, Ray, Viewport};
pub use picking::{EntityRef, EntityRegistry, pick, pick_ray};
pub use snapshot::FrameSnapshot;

use std::collections::BTreeMap;

use glam::{Affine3A, Quat, Vec3};
use serde::{Deserialize, Serialize};

use intersect::{ray_box, ray_ring};

/// Opaque reference to a scene node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VisualHandle(pub u32);

/// Position, forward lean and uniform scale of a node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    /// Rotation about the X axis (radians)
    pub tilt: f32,
    pub scale: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            tilt: 0.0,
            scale: 1.0,
        }
    }
}

impl Transform {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn matrix(&self) -> Affine3A {
        Affine3A::from_scale_rotation_translation(
            Vec3::splat(self.scale),
            Quat::from_rotation_x(self.tilt),
            self.position,
        )
    }
}

/// Node geometry, centered on the node position, axis along +Y
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shape {
    /// Plate: a short tube with a hole for the pillar
    Disc { radius: f32, pore_radius: f32, height: f32 },
    Cylinder { radius: f32, height: f32 },
    Box { width: f32, height: f32, depth: f32 },
}

impl Shape {
    /// Ray hit in the shape's local frame
    pub fn intersect_local(&self, origin: Vec3, dir: Vec3) -> Option<f32> {
        match *self {
            Shape::Disc {
                radius,
                pore_radius,
                height,
            } => ray_ring(origin, dir, radius, pore_radius, height / 2.0),
            Shape::Cylinder { radius, height } => ray_ring(origin, dir, radius, 0.0, height / 2.0),
            Shape::Box {
                width,
                height,
                depth,
            } => ray_box(origin, dir, Vec3::new(width, height, depth) / 2.0),
        }
    }
}

/// Surface color and translucency
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// 0xRRGGBB
    pub color: u32,
    pub opacity: f32,
}

impl Material {
    pub fn solid(color: u32) -> Self {
        Self { color, opacity: 1.0 }
    }

    pub fn translucent(color: u32, opacity: f32) -> Self {
        Self { color, opacity }
    }
}

/// Text drawn by the host next to a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub text: String,
    pub size: f32,
    pub color: u32,
    /// Offset from the node position (before tilt and scale)
    pub offset: Vec3,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneNode {
    pub shape: Shape,
    pub material: Material,
    pub transform: Transform,
    /// Hidden nodes are not drawn but still answer ray queries
    pub visible: bool,
    pub label: Option<Label>,
}

impl SceneNode {
    pub fn new(shape: Shape, material: Material) -> Self {
        Self {
            shape,
            material,
            transform: Transform::default(),
            visible: true,
            label: None,
        }
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.transform.position = position;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn with_label(mut self, label: Option<Label>) -> Self {
        self.label = label;
        self
    }
}

/// A ray query result
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub handle: VisualHandle,
    pub distance: f32,
}

/// All drawable nodes plus camera and viewport
#[derive(Debug, Clone)]
pub struct SceneGraph {
    nodes: BTreeMap<VisualHandle, SceneNode>,
    next_handle: u32,
    camera: Camera,
    viewport: Viewport,
    font_available: bool,
}

impl SceneGraph {
    pub fn new(camera: Camera, viewport: Viewport) -> Self {
        Self {
            nodes: BTreeMap::new(),
            next_handle: 1,
            camera,
            viewport,
            font_available: true,
        }
    }

    pub fn add(&mut self, node: SceneNode) -> VisualHandle {
        let handle = VisualHandle(self.next_handle);
        self.next_handle += 1;
        self.nodes.insert(handle, node);
        handle
    }

    /// Remove a node and release its resources
    pub fn remove(&mut self, handle: VisualHandle) -> Option<SceneNode> {
        let node = self.nodes.remove(&handle);
        if node.is_none() {
            log::debug!("Remove of unknown visual {:?}", handle);
        }
        node
    }

    pub fn contains(&self, handle: VisualHandle) -> bool {
        self.nodes.contains_key(&handle)
    }

    pub fn node(&self, handle: VisualHandle) -> Option<&SceneNode> {
        self.nodes.get(&handle)
    }

    pub fn node_mut(&mut self, handle: VisualHandle) -> Option<&mut SceneNode> {
        self.nodes.get_mut(&handle)
    }

    pub fn transform(&self, handle: VisualHandle) -> Option<&Transform> {
        self.nodes.get(&handle).map(|n| &n.transform)
    }

    pub fn transform_mut(&mut self, handle: VisualHandle) -> Option<&mut Transform> {
        self.nodes.get_mut(&handle).map(|n| &mut n.transform)
    }

    pub fn set_visible(&mut self, handle: VisualHandle, visible: bool) {
        if let Some(node) = self.nodes.get_mut(&handle) {
            node.visible = visible;
        }
    }

    pub fn set_position(&mut self, handle: VisualHandle, position: Vec3) {
        if let Some(t) = self.transform_mut(handle) {
            t.position = position;
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = (VisualHandle, &SceneNode)> {
        self.nodes.iter().map(|(&h, n)| (h, n))
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// New canvas rectangle; keeps the camera aspect in step
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.camera.aspect = viewport.aspect();
    }

    /// Whether the label typeface loaded
    pub fn font_available(&self) -> bool {
        self.font_available
    }

    pub fn set_font_available(&mut self, available: bool) {
        self.font_available = available;
    }

    /// Every node struck by `ray`, nearest first (ties by handle)
    pub fn intersect(&self, ray: &Ray) -> Vec<RayHit> {
        let mut hits: Vec<RayHit> = self
            .nodes
            .iter()
            .filter(|(_, node)| node.transform.scale > f32::EPSILON)
            .filter_map(|(&handle, node)| {
                let inv = node.transform.matrix().inverse();
                let origin = inv.transform_point3(ray.origin);
                let dir = inv.transform_vector3(ray.dir);
                node.shape
                    .intersect_local(origin, dir)
                    .map(|distance| RayHit { handle, distance })
            })
            .collect();

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance).then(a.handle.cmp(&b.handle)));
        hits
    }

    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot::capture(self)
    }
}
