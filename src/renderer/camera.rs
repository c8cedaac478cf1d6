//! Perspective camera looking down -Z at the balloon field.

use glam::{Mat4, Vec2, Vec3};

use crate::consts::*;
use crate::sim::intersect::Ray;
use crate::{Viewport, ndc_to_screen};

/// Fixed perspective camera
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Width / height
    pub aspect: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, CAMERA_DISTANCE),
            target: Vec3::ZERO,
            fov_degrees: CAMERA_FOV_DEGREES,
            near: CAMERA_NEAR,
            far: CAMERA_FAR,
            aspect: 16.0 / 9.0,
        }
    }
}

impl Camera {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            aspect: viewport.aspect(),
            ..Default::default()
        }
    }

    /// Update aspect ratio (call on window resize)
    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_degrees.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Picking ray through a point in normalized device coordinates
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let inv = self.view_projection().inverse();
        let near = inv.project_point3(Vec3::new(ndc.x, ndc.y, 0.0));
        let far = inv.project_point3(Vec3::new(ndc.x, ndc.y, 1.0));
        Ray::new(self.position, far - near)
    }

    /// Project a world point to normalized device coordinates.
    /// Returns `None` for points behind the camera.
    pub fn world_to_ndc(&self, pos: Vec3) -> Option<Vec2> {
        let clip = self.view_projection() * pos.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }
        Some(Vec2::new(clip.x / clip.w, clip.y / clip.w))
    }

    /// Project a world point to screen pixels
    pub fn world_to_screen(&self, pos: Vec3, viewport: Viewport) -> Option<Vec2> {
        self.world_to_ndc(pos).map(|ndc| ndc_to_screen(ndc, viewport))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::intersect::ray_sphere;

    #[test]
    fn test_center_ray_points_down_neg_z() {
        let camera = Camera::default();
        let ray = camera.ray_from_ndc(Vec2::ZERO);
        assert!((ray.dir - Vec3::NEG_Z).length() < 1e-4);
        assert_eq!(ray.origin, camera.position);
    }

    #[test]
    fn test_projection_round_trips_through_ray() {
        let camera = Camera::new(Viewport::new(1280.0, 720.0));
        let point = Vec3::new(3.0, -2.0, 1.0);
        let ndc = camera.world_to_ndc(point).expect("in front of camera");
        let ray = camera.ray_from_ndc(ndc);
        let t = ray_sphere(&ray, point, 0.01).expect("ray passes through projected point");
        assert!((ray.at(t) - point).length() < 0.05);
    }

    #[test]
    fn test_point_behind_camera_does_not_project() {
        let camera = Camera::default();
        assert!(camera.world_to_ndc(Vec3::new(0.0, 0.0, 30.0)).is_none());
    }

    #[test]
    fn test_set_aspect_guards_zero_height() {
        let mut camera = Camera::default();
        camera.set_aspect(800, 0);
        assert_eq!(camera.aspect, 800.0);
    }
}
