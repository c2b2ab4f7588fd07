use std::f32::consts::PI;

use glam::{Vec2, Vec3};

use crate::camera::CameraBehavior;
use crate::resources::input::{Input, MouseButton};
use crate::scene::camera::{CameraPose, Projection};
use crate::scene::transform::Transform;

/// Keeps `phi` away from the poles.
const POLE_EPS: f32 = 0.0001;

/// Zoom per unit of scroll is `ZOOM_BASE^zoom_speed`.
const ZOOM_BASE: f32 = 0.95;

/// Orbit camera driven by pointer input around a target point.
///
/// Left drag rotates, right or middle drag pans in screen space, scroll
/// zooms. Rotation goes through an angular velocity that decays
/// exponentially each frame when damping is on. Input is only read while
/// the behavior is active.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    pub rotate_speed: f32,
    zoom_speed: f32,
    pub pan_speed: f32,
    pub damping_factor: f32,
    pub enable_damping: bool,
    pub min_distance: f32,
    pub max_distance: f32,

    pub center: Vec3,
    pub radius: f32,
    pub theta: f32,
    pub phi: f32,

    rotate_delta: Vec2,
    active: bool,
    pose: CameraPose,
}

impl OrbitCamera {
    /// Orbit placed at `position`, looking at `center`.
    #[must_use]
    pub fn new(position: Vec3, center: Vec3) -> Self {
        let offset = position - center;
        let radius = offset.length().max(f32::EPSILON);
        let mut orbit = Self {
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            damping_factor: 0.05,
            enable_damping: true,
            min_distance: 0.1,
            max_distance: 1000.0,
            center,
            radius,
            theta: offset.x.atan2(offset.z),
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
            rotate_delta: Vec2::ZERO,
            active: false,
            pose: CameraPose::default(),
        };
        orbit.rebuild_pose();
        orbit
    }

    #[must_use]
    pub fn zoom_speed(&self) -> f32 {
        self.zoom_speed
    }

    /// Clamped to `[0, 10]`.
    pub fn set_zoom_speed(&mut self, zoom_speed: f32) {
        self.zoom_speed = if zoom_speed.is_nan() { 1.0 } else { zoom_speed.clamp(0.0, 10.0) };
    }

    /// Remaining angular velocity, in radians per frame.
    #[must_use]
    pub fn angular_velocity(&self) -> Vec2 {
        self.rotate_delta
    }

    fn offset_direction(&self) -> Vec3 {
        let (sin_phi, cos_phi) = self.phi.sin_cos();
        let (sin_theta, cos_theta) = self.theta.sin_cos();
        Vec3::new(sin_phi * sin_theta, cos_phi, sin_phi * cos_theta)
    }

    fn handle_input(&mut self, input: &Input, projection: &Projection) {
        let screen_height = input.screen_size().y.max(1.0);
        let cursor_delta = input.mouse_delta();

        if input.get_mouse_button(MouseButton::Left) {
            let rotate_per_pixel = 2.0 * PI / screen_height;
            self.rotate_delta -= cursor_delta * rotate_per_pixel * self.rotate_speed;
        }

        let scroll = input.scroll_delta().y;
        if scroll != 0.0 {
            let scale = ZOOM_BASE.powf(self.zoom_speed * scroll.abs());
            if scroll > 0.0 {
                self.radius *= scale;
            } else {
                self.radius /= scale;
            }
            self.radius = self.radius.clamp(self.min_distance, self.max_distance);
        }

        if input.get_mouse_button(MouseButton::Right) || input.get_mouse_button(MouseButton::Middle) {
            let half_fov = projection.fov_degrees.to_radians() / 2.0;
            let target_world_height = 2.0 * self.radius * half_fov.tan();
            let pixels_to_world = target_world_height / screen_height;

            let forward = -self.offset_direction();
            let right = forward.cross(Vec3::Y).normalize_or_zero();
            let up = right.cross(forward).normalize_or_zero();

            self.center +=
                (right * -cursor_delta.x + up * cursor_delta.y) * pixels_to_world * self.pan_speed;
        }
    }

    fn integrate(&mut self, dt: f32) {
        if self.enable_damping {
            let target_fps = 60.0;
            let retention = (1.0 - self.damping_factor.clamp(0.0, 1.0)).powf(dt * target_fps);
            let applied = self.rotate_delta * (1.0 - retention);
            self.theta += applied.x;
            self.phi += applied.y;
            self.rotate_delta *= retention;
        } else {
            self.theta += self.rotate_delta.x;
            self.phi += self.rotate_delta.y;
            self.rotate_delta = Vec2::ZERO;
        }
        self.phi = self.phi.clamp(POLE_EPS, PI - POLE_EPS);
    }

    fn rebuild_pose(&mut self) {
        let mut transform = Transform::from_translation(self.center + self.offset_direction() * self.radius);
        transform.look_at(self.center, Vec3::Y);
        self.pose = CameraPose {
            position: transform.position,
            rotation: transform.rotation.normalize(),
        };
    }
}

impl CameraBehavior for OrbitCamera {
    fn activate(&mut self) {
        self.active = true;
    }

    /// Stops reading input and drops any residual spin.
    fn deactivate(&mut self) {
        self.active = false;
        self.rotate_delta = Vec2::ZERO;
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn update(&mut self, input: &Input, projection: &Projection, dt: f32) {
        if !self.active {
            return;
        }
        self.handle_input(input, projection);
        self.integrate(dt);
        self.rebuild_pose();
    }

    fn pose(&self) -> CameraPose {
        self.pose
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::input::ButtonState;

    fn dragging_input(dx: f32) -> Input {
        let mut input = Input::new();
        input.inject_resize(800, 600);
        input.inject_mouse_button(MouseButton::Left, ButtonState::Pressed);
        input.inject_mouse_motion(dx, 0.0);
        input
    }

    #[test]
    fn starts_at_given_position() {
        let orbit = OrbitCamera::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO);
        assert!(orbit.pose().position.abs_diff_eq(Vec3::new(0.0, 0.0, 5.0), 1e-5));
        assert!(orbit.pose().forward().abs_diff_eq(Vec3::NEG_Z, 1e-5));
    }

    #[test]
    fn inactive_orbit_ignores_input() {
        let mut orbit = OrbitCamera::default();
        let before = orbit.pose();
        orbit.update(&dragging_input(100.0), &Projection::default(), 1.0 / 60.0);
        assert_eq!(orbit.pose(), before);
    }

    #[test]
    fn damping_decays_angular_velocity() {
        let mut orbit = OrbitCamera::default();
        orbit.activate();
        orbit.update(&dragging_input(100.0), &Projection::default(), 1.0 / 60.0);
        let first = orbit.angular_velocity().length();
        assert!(first > 0.0);

        let idle = Input::new();
        orbit.update(&idle, &Projection::default(), 1.0 / 60.0);
        let second = orbit.angular_velocity().length();
        assert!(second < first);
        assert!((second / first - 0.95).abs() < 1e-4);
    }
}
