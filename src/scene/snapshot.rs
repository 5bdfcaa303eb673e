//! Per-frame scene description handed to the browser renderer

use serde::Serialize;

use super::{Camera, SceneGraph, Shape, VisualHandle};
use crate::css_color;

#[derive(Debug, Clone, Serialize)]
pub struct CameraSnapshot {
    pub position: [f32; 3],
    pub target: [f32; 3],
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub aspect: f32,
}

impl From<&Camera> for CameraSnapshot {
    fn from(camera: &Camera) -> Self {
        Self {
            position: camera.position.to_array(),
            target: camera.target.to_array(),
            fov_degrees: camera.fov_y.to_degrees(),
            near: camera.near,
            far: camera.far,
            aspect: camera.aspect,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LabelSnapshot {
    pub text: String,
    pub size: f32,
    pub color: String,
    pub offset: [f32; 3],
}

#[derive(Debug, Clone, Serialize)]
pub struct NodeSnapshot {
    pub id: u32,
    pub shape: Shape,
    pub color: String,
    pub opacity: f32,
    pub position: [f32; 3],
    pub tilt: f32,
    pub scale: f32,
    pub label: Option<LabelSnapshot>,
}

/// Everything the host needs to draw one frame. Hidden nodes are left out.
#[derive(Debug, Clone, Serialize)]
pub struct FrameSnapshot {
    pub camera: CameraSnapshot,
    pub nodes: Vec<NodeSnapshot>,
}

impl FrameSnapshot {
    pub fn capture(scene: &SceneGraph) -> Self {
        let nodes = scene
            .nodes()
            .filter(|(_, node)| node.visible)
            .map(|(VisualHandle(id), node)| NodeSnapshot {
                id,
                shape: node.shape.clone(),
                color: css_color(node.material.color),
                opacity: node.material.opacity,
                position: node.transform.position.to_array(),
                tilt: node.transform.tilt,
                scale: node.transform.scale,
                label: node.label.as_ref().map(|l| LabelSnapshot {
                    text: l.text.clone(),
                    size: l.size,
                    color: css_color(l.color),
                    offset: l.offset.to_array(),
                }),
            })
            .collect();

        Self {
            camera: CameraSnapshot::from(scene.camera()),
            nodes,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
