//! Perspective camera, viewport and picking rays

use glam::{Mat4, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::config::CameraConfig;

/// Pointer-space rectangle of the canvas (CSS pixels)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            width,
            height,
        }
    }

    pub fn with_origin(mut self, left: f32, top: f32) -> Self {
        self.left = left;
        self.top = top;
        self
    }

    pub fn aspect(&self) -> f32 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }

    /// Map client coordinates to normalized device coordinates ([-1, 1], y up).
    /// None for a collapsed viewport.
    pub fn to_ndc(&self, client: Vec2) -> Option<Vec2> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return None;
        }
        Some(Vec2::new(
            (client.x - self.left) / self.width * 2.0 - 1.0,
            -(client.y - self.top) / self.height * 2.0 + 1.0,
        ))
    }

    /// Inverse of [`Viewport::to_ndc`]
    pub fn from_ndc(&self, ndc: Vec2) -> Vec2 {
        Vec2::new(
            (ndc.x + 1.0) / 2.0 * self.width + self.left,
            (1.0 - ndc.y) / 2.0 * self.height + self.top,
        )
    }
}

/// Half-line used for picking
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit length
    pub dir: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self {
            origin,
            dir: dir.normalize_or_zero(),
        }
    }

    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.dir * t
    }
}

/// Perspective camera looking at `target`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    /// Vertical field of view (radians)
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
    pub aspect: f32,
}

impl Camera {
    pub fn new(config: &CameraConfig, aspect: f32) -> Self {
        Self {
            position: Vec3::new(0.0, config.height, 0.0),
            target: Vec3::ZERO,
            fov_y: config.fov_degrees.to_radians(),
            near: config.near,
            far: config.far,
            aspect,
        }
    }

    /// Back the camera off along +Z until a table of `width` fits the view
    pub fn fit_width(&mut self, width: f32) {
        let z = width / 2.0 / (self.fov_y / 2.0).tan();
        self.position = Vec3::new(0.0, self.position.y, z);
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection() * self.view()
    }

    /// Ray from the eye through an NDC point
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let inv = self.view_projection().inverse();
        let far = inv.project_point3(Vec3::new(ndc.x, ndc.y, 1.0));
        Ray::new(self.position, far - self.position)
    }

    /// Project a world point to NDC; None when it is behind the camera
    pub fn world_to_ndc(&self, point: Vec3) -> Option<Vec2> {
        let clip = self.view_projection() * point.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }
        Some(Vec2::new(clip.x / clip.w, clip.y / clip.w))
    }

    /// Project a world point to client coordinates inside `viewport`
    pub fn world_to_client(&self, point: Vec3, viewport: &Viewport) -> Option<Vec2> {
        self.world_to_ndc(point).map(|ndc| viewport.from_ndc(ndc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Camera {
        let mut camera = Camera::new(&CameraConfig::default(), 4.0 / 3.0);
        camera.fit_width(30.0);
        camera
    }

    #[test]
    fn test_to_ndc() {
        let vp = Viewport::new(800.0, 600.0).with_origin(10.0, 20.0);
        let center = vp.to_ndc(Vec2::new(410.0, 320.0)).unwrap();
        assert!(center.length() < 1e-6);
        let corner = vp.to_ndc(Vec2::new(10.0, 20.0)).unwrap();
        assert_eq!(corner, Vec2::new(-1.0, 1.0));
        let corner = vp.to_ndc(Vec2::new(810.0, 620.0)).unwrap();
        assert_eq!(corner, Vec2::new(1.0, -1.0));
    }

    #[test]
    fn test_collapsed_viewport() {
        assert!(Viewport::new(0.0, 600.0).to_ndc(Vec2::ZERO).is_none());
    }

    #[test]
    fn test_fit_width() {
        let c = camera();
        let expected = 15.0 / (22.5f32).to_radians().tan();
        assert!((c.position.z - expected).abs() < 1e-3);
        assert_eq!(c.position.y, 15.0);
    }

    #[test]
    fn test_center_ray_hits_target() {
        let c = camera();
        let ray = c.ray_from_ndc(Vec2::ZERO);
        let to_target = (c.target - c.position).normalize();
        assert!(ray.dir.dot(to_target) > 0.9999);
    }

    #[test]
    fn test_projection_roundtrip() {
        let c = camera();
        let vp = Viewport::new(800.0, 600.0);
        let point = Vec3::new(-10.0, 3.0, 1.0);
        let client = c.world_to_client(point, &vp).unwrap();
        let ndc = vp.to_ndc(client).unwrap();
        let ray = c.ray_from_ndc(ndc);
        // The ray passes through the projected point
        let t = (point - ray.origin).dot(ray.dir);
        assert!((ray.at(t) - point).length() < 1e-2);
    }
}
