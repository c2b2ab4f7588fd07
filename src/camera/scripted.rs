use glam::{Quat, Vec3};

use crate::camera::CameraBehavior;
use crate::resources::input::Input;
use crate::scene::camera::{CameraPose, Projection};
use crate::scene::transform::Transform;

/// Input-free camera: a fixed viewpoint, optionally circling its target.
///
/// The animation clock only runs while the behavior is active, so
/// deactivating it freezes the pose where it was.
#[derive(Debug, Clone)]
pub struct ScriptedCamera {
    position: Vec3,
    target: Vec3,
    /// Angular speed around the target's vertical axis, radians per second.
    pub drift_speed: f32,
    clock: f32,
    active: bool,
    pose: CameraPose,
}

impl ScriptedCamera {
    #[must_use]
    pub fn new(position: Vec3, target: Vec3) -> Self {
        let mut camera = Self {
            position,
            target,
            drift_speed: 0.0,
            clock: 0.0,
            active: false,
            pose: CameraPose::default(),
        };
        camera.rebuild_pose();
        camera
    }

    #[must_use]
    pub fn target(&self) -> Vec3 {
        self.target
    }

    fn rebuild_pose(&mut self) {
        let spin = Quat::from_rotation_y(self.drift_speed * self.clock);
        let position = self.target + spin * (self.position - self.target);
        let mut transform = Transform::from_translation(position);
        transform.look_at(self.target, Vec3::Y);
        self.pose = CameraPose {
            position,
            rotation: transform.rotation.normalize(),
        };
    }
}

impl Default for ScriptedCamera {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 1.68, 2.0), Vec3::new(0.0, 1.55, 0.0))
    }
}

impl CameraBehavior for ScriptedCamera {
    fn activate(&mut self) {
        self.active = true;
    }

    fn deactivate(&mut self) {
        self.active = false;
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn update(&mut self, _input: &Input, _projection: &Projection, dt: f32) {
        if !self.active || self.drift_speed == 0.0 {
            return;
        }
        self.clock += dt;
        self.rebuild_pose();
    }

    fn pose(&self) -> CameraPose {
        self.pose
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frozen_while_inactive() {
        let mut camera = ScriptedCamera::default();
        camera.drift_speed = 1.0;
        let before = camera.pose();
        camera.update(&Input::new(), &Projection::default(), 0.5);
        assert_eq!(camera.pose(), before);

        camera.activate();
        camera.update(&Input::new(), &Projection::default(), 0.5);
        assert_ne!(camera.pose(), before);
    }
}
