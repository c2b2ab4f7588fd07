use crate::resources::texture::TextureHandle;
use crate::scene::draw::{DrawHandle, DrawId};
use crate::scene::light::{AmbientLight, DirectionalLight};

/// The single active scene.
///
/// Holds the attached draws in attach order, the environment map and the two
/// lights. Items own their draws; the scene only references the attached ones.
#[derive(Debug, Default)]
pub struct Scene {
    draws: Vec<DrawHandle>,
    environment_map: Option<TextureHandle>,
    pub ambient_light: AmbientLight,
    pub directional_light: DirectionalLight,
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `draw`. Returns `false` (and changes nothing) when it is
    /// already attached.
    pub fn attach(&mut self, draw: &DrawHandle) -> bool {
        if self.is_attached(draw.id()) {
            return false;
        }
        self.draws.push(draw.clone());
        true
    }

    /// Removes the draw. Returns `false` when it was not attached.
    pub fn detach(&mut self, id: DrawId) -> bool {
        let before = self.draws.len();
        self.draws.retain(|d| d.id() != id);
        self.draws.len() != before
    }

    #[must_use]
    pub fn is_attached(&self, id: DrawId) -> bool {
        self.draws.iter().any(|d| d.id() == id)
    }

    /// Attached draws, in attach order.
    pub fn draws(&self) -> impl Iterator<Item = &DrawHandle> {
        self.draws.iter()
    }

    #[must_use]
    pub fn draw_count(&self) -> usize {
        self.draws.len()
    }

    #[must_use]
    pub fn environment_map(&self) -> Option<&TextureHandle> {
        self.environment_map.as_ref()
    }

    pub fn set_environment_map(&mut self, map: Option<TextureHandle>) {
        self.environment_map = map;
    }

    /// Per-frame animation.
    pub fn update(&mut self, elapsed_seconds: f32) {
        self.directional_light.update(elapsed_seconds);
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::resources::geometry::Geometry;
    use crate::resources::material::{MaterialParameters, SharedMaterial};
    use crate::scene::draw::{DrawObject, Representation};
    use crate::scene::transform::SharedTransform;

    fn draw() -> DrawHandle {
        Rc::new(DrawObject::new(
            Representation::Mesh,
            Rc::new(Geometry::new()),
            SharedMaterial::new(MaterialParameters::default()),
            SharedTransform::default(),
        ))
    }

    #[test]
    fn attach_is_idempotent_and_ordered() {
        let mut scene = Scene::new();
        let (a, b) = (draw(), draw());
        assert!(scene.attach(&a));
        assert!(scene.attach(&b));
        assert!(!scene.attach(&a));
        let ids: Vec<_> = scene.draws().map(|d| d.id()).collect();
        assert_eq!(ids, vec![a.id(), b.id()]);
        assert!(scene.detach(a.id()));
        assert!(!scene.detach(a.id()));
        assert_eq!(scene.draw_count(), 1);
    }
}
