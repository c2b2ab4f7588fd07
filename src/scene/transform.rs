use std::cell::{Ref, RefCell};
use std::rc::Rc;

use glam::{Affine3A, EulerRot, Mat3, Mat4, Quat, Vec3};

/// Position, rotation and scale of a scene object, with a cached matrix.
///
/// The matrix is rebuilt lazily: [`Transform::update_matrix`] compares the
/// public TRS fields against the values used for the last rebuild.
#[derive(Debug, Clone)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,

    matrix: Affine3A,

    last_position: Vec3,
    last_rotation: Quat,
    last_scale: Vec3,
    force_update: bool,
}

impl Transform {
    #[must_use]
    pub fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            matrix: Affine3A::IDENTITY,
            last_position: Vec3::ZERO,
            last_rotation: Quat::IDENTITY,
            last_scale: Vec3::ONE,
            force_update: true,
        }
    }

    #[must_use]
    pub fn from_translation(position: Vec3) -> Self {
        Self {
            position,
            ..Self::new()
        }
    }

    /// Rebuilds the matrix if any TRS field changed. Returns whether it did.
    pub fn update_matrix(&mut self) -> bool {
        let changed = self.position != self.last_position
            || self.rotation != self.last_rotation
            || self.scale != self.last_scale
            || self.force_update;

        if changed {
            self.matrix =
                Affine3A::from_scale_rotation_translation(self.scale, self.rotation, self.position);
            self.last_position = self.position;
            self.last_rotation = self.rotation;
            self.last_scale = self.scale;
            self.force_update = false;
        }

        changed
    }

    /// Matrix as of the last [`Transform::update_matrix`].
    #[inline]
    #[must_use]
    pub fn matrix(&self) -> &Affine3A {
        &self.matrix
    }

    /// Matrix computed from the current TRS fields, ignoring the cache.
    #[must_use]
    pub fn compute_matrix(&self) -> Affine3A {
        Affine3A::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    #[inline]
    #[must_use]
    pub fn matrix_as_mat4(&self) -> Mat4 {
        Mat4::from(self.compute_matrix())
    }

    pub fn set_rotation_euler(&mut self, x: f32, y: f32, z: f32) {
        self.rotation = Quat::from_euler(EulerRot::XYZ, x, y, z);
    }

    /// Overwrites TRS from a matrix. Shear is lost.
    pub fn apply_matrix(&mut self, mat: Affine3A) {
        let (scale, rotation, translation) = mat.to_scale_rotation_translation();
        self.scale = scale;
        self.rotation = rotation;
        self.position = translation;
        self.mark_dirty();
    }

    /// Orients -Z towards `target`. Degenerate directions leave the rotation unchanged.
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        let Some(forward) = (target - self.position).try_normalize() else {
            return;
        };

        if forward.cross(up).length_squared() < 1e-4 {
            return;
        }

        let right = forward.cross(up).normalize();
        let new_up = right.cross(forward).normalize();

        let rot_mat = Mat3::from_cols(right, new_up, -forward);
        self.rotation = Quat::from_mat3(&rot_mat);
    }

    pub fn mark_dirty(&mut self) {
        self.force_update = true;
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Transform {
    fn eq(&self, other: &Self) -> bool {
        self.position == other.position
            && self.rotation == other.rotation
            && self.scale == other.scale
    }
}

/// One transform observed by several draws.
///
/// Cloning shares the cell; a write through any clone is seen by all of them.
#[derive(Debug, Clone, Default)]
pub struct SharedTransform(Rc<RefCell<Transform>>);

impl SharedTransform {
    #[must_use]
    pub fn new(transform: Transform) -> Self {
        Self(Rc::new(RefCell::new(transform)))
    }

    #[must_use]
    pub fn read(&self) -> Ref<'_, Transform> {
        self.0.borrow()
    }

    /// Snapshot of the current value.
    #[must_use]
    pub fn get(&self) -> Transform {
        self.0.borrow().clone()
    }

    pub fn set(&self, transform: Transform) {
        *self.0.borrow_mut() = transform;
    }

    pub fn update<R>(&self, f: impl FnOnce(&mut Transform) -> R) -> R {
        f(&mut self.0.borrow_mut())
    }

    #[must_use]
    pub fn world_matrix(&self) -> Mat4 {
        self.0.borrow().matrix_as_mat4()
    }

    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_matrix_only_when_changed() {
        let mut t = Transform::new();
        assert!(t.update_matrix());
        assert!(!t.update_matrix());
        t.position = Vec3::X;
        assert!(t.update_matrix());
        assert_eq!(t.matrix().translation, Vec3::X.into());
    }

    #[test]
    fn look_at_points_negative_z_at_target() {
        let mut t = Transform::from_translation(Vec3::new(0.0, 1.68, 2.0));
        let target = Vec3::new(0.0, 1.55, 0.0);
        t.look_at(target, Vec3::Y);
        let forward = t.rotation * Vec3::NEG_Z;
        let expected = (target - t.position).normalize();
        assert!(forward.abs_diff_eq(expected, 1e-5));
    }
}
