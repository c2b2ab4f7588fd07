use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Perspective projection shared by every camera behavior.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Projection {
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            fov_degrees: 55.0,
            aspect: 1.0,
            near: 0.1,
            far: 150.0,
        }
    }
}

impl Projection {
    /// Right-handed, wgpu depth range `[0, 1]`.
    #[must_use]
    pub fn matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_degrees.to_radians(), self.aspect.max(f32::EPSILON), self.near, self.far)
    }

    pub fn set_aspect_from_size(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }
}

/// Position and orientation of a camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for CameraPose {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 5.0),
            rotation: Quat::IDENTITY,
        }
    }
}

impl CameraPose {
    #[must_use]
    pub fn world_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position)
    }

    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        self.world_matrix().inverse()
    }

    #[must_use]
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }
}

/// The camera a frame is rendered with: a pose copied out of the active
/// behavior plus the shared projection.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RenderCamera {
    pub pose: CameraPose,
    pub projection: Projection,
}

impl RenderCamera {
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        self.pose.view_matrix()
    }

    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        self.projection.matrix()
    }

    #[must_use]
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_ignores_zero_size() {
        let mut p = Projection::default();
        p.set_aspect_from_size(1600, 800);
        assert_eq!(p.aspect, 2.0);
        p.set_aspect_from_size(0, 800);
        assert_eq!(p.aspect, 2.0);
    }

    #[test]
    fn view_is_inverse_of_world() {
        let pose = CameraPose {
            position: Vec3::new(1.0, 2.0, 3.0),
            rotation: Quat::from_rotation_y(0.3),
        };
        let id = pose.world_matrix() * pose.view_matrix();
        assert!(id.abs_diff_eq(Mat4::IDENTITY, 1e-5));
    }
}
