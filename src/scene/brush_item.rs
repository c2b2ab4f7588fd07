//! Dual-representation brush item.
//!
//! A [`BrushItem`] owns one welded geometry and one material and builds two
//! draws over them: a point-sprite draw and a mesh draw. Exactly one of them
//! is attached to the scene at a time. Toggling swaps the attached draw and
//! flips `usePoints` on the shared material, which bumps its program version
//! so both draws recompile before their next use. Nothing is reallocated.
//!
//! The material's `usePoints` decides which draw is active. When it is
//! changed on the material directly, [`BrushItem::sync`] moves the scene
//! attachment over; [`World::update`](crate::scene::World::update) does so
//! every frame.

use std::rc::Rc;

use glam::Vec3;

use crate::errors::Result;
use crate::resources::color::Color;
use crate::resources::geometry::Geometry;
use crate::resources::material::{MAX_POINT_SIZE, MaterialParameters, SharedMaterial};
use crate::scene::draw::{DrawHandle, DrawObject, Representation};
use crate::scene::scene::Scene;
use crate::scene::transform::{SharedTransform, Transform};
use crate::tuning::{Tunable, TunableField, TuningValue, split_path, unknown_field};

#[derive(Debug)]
pub struct BrushItem {
    name: String,
    geometry: Rc<Geometry>,
    material: SharedMaterial,
    transform: SharedTransform,
    points: DrawHandle,
    mesh: DrawHandle,
}

impl BrushItem {
    /// Builds both draws. The active one follows the material's `usePoints`.
    #[must_use]
    pub fn create(
        name: impl Into<String>,
        geometry: Geometry,
        material: MaterialParameters,
        transform: Transform,
    ) -> Self {
        let geometry = Rc::new(geometry);
        let material = SharedMaterial::new(material);
        let transform = SharedTransform::new(transform);

        let points = Rc::new(DrawObject::new(
            Representation::Points,
            geometry.clone(),
            material.clone(),
            transform.clone(),
        ));
        let mesh = Rc::new(DrawObject::new(
            Representation::Mesh,
            geometry.clone(),
            material.clone(),
            transform.clone(),
        ));

        Self {
            name: name.into(),
            geometry,
            material,
            transform,
            points,
            mesh,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    #[must_use]
    pub fn material(&self) -> &SharedMaterial {
        &self.material
    }

    /// The representation selected by the material's `usePoints`.
    #[must_use]
    pub fn active(&self) -> Representation {
        Representation::from_use_points(self.material.read().use_points())
    }

    #[must_use]
    pub fn draw(&self, representation: Representation) -> &DrawHandle {
        match representation {
            Representation::Points => &self.points,
            Representation::Mesh => &self.mesh,
        }
    }

    #[must_use]
    pub fn active_draw(&self) -> &DrawHandle {
        self.draw(self.active())
    }

    /// Attaches the active draw. Attaching twice is a no-op.
    pub fn attach(&self, scene: &mut Scene) {
        scene.detach(self.draw(self.active().other()).id());
        scene.attach(self.active_draw());
    }

    /// Detaches both draws. Detaching twice is a no-op.
    pub fn detach(&self, scene: &mut Scene) {
        scene.detach(self.points.id());
        scene.detach(self.mesh.id());
    }

    #[must_use]
    pub fn is_attached(&self, scene: &Scene) -> bool {
        scene.is_attached(self.points.id()) || scene.is_attached(self.mesh.id())
    }

    /// Switches to the other representation.
    pub fn toggle(&mut self, scene: &mut Scene) {
        self.set_representation(self.active().other(), scene);
    }

    /// Switches to `representation` and re-syncs the scene attachment.
    ///
    /// The swap keeps the item's scene membership: an attached item stays
    /// attached (now through the other draw), a detached one stays detached.
    pub fn set_representation(&mut self, representation: Representation, scene: &mut Scene) {
        if representation != self.active() {
            self.material
                .update(|m| m.set_use_points(representation == Representation::Points));
        }
        self.sync(scene);
    }

    /// Attaches the active draw in place of the other one if the item is in
    /// the scene through the wrong draw. Returns whether anything moved.
    pub fn sync(&self, scene: &mut Scene) -> bool {
        let active = self.active();
        if !scene.detach(self.draw(active.other()).id()) {
            return false;
        }
        scene.attach(self.draw(active));
        true
    }

    /// Snapshot of the transform shared by both draws.
    #[must_use]
    pub fn transform(&self) -> Transform {
        self.transform.get()
    }

    /// Moves both representations, attached or not.
    pub fn set_transform(&self, transform: Transform) {
        self.transform.set(transform);
    }

    pub fn set_position(&self, position: Vec3) {
        self.transform.update(|t| t.position = position);
    }

    fn field_path(&self, label: &str) -> String {
        format!("{}/{label}", self.name)
    }
}

impl Tunable for BrushItem {
    fn fields(&self) -> Vec<TunableField> {
        vec![
            TunableField::range(self.field_path("uSize"), 0.0, MAX_POINT_SIZE, 1.0),
            TunableField::range(self.field_path("roughness"), 0.0, 1.0, 0.001),
            TunableField::range(self.field_path("metalness"), 0.0, 1.0, 0.001),
            TunableField::range(self.field_path("envMapIntensity"), 0.0, 50.0, 0.1),
            TunableField::color(self.field_path("color")),
        ]
    }

    fn get_field(&self, path: &str) -> Option<TuningValue> {
        let (folder, label) = split_path(path)?;
        if folder != self.name {
            return None;
        }
        let m = self.material.read();
        Some(match label {
            "uSize" => TuningValue::Number(m.size()),
            "roughness" => TuningValue::Number(m.roughness()),
            "metalness" => TuningValue::Number(m.metalness()),
            "envMapIntensity" => TuningValue::Number(m.environment_intensity()),
            "color" => TuningValue::Color(m.color()),
            _ => return None,
        })
    }

    fn set_field(&mut self, path: &str, value: TuningValue) -> Result<()> {
        let Some((_, label)) = split_path(path).filter(|(folder, _)| *folder == self.name) else {
            return Err(unknown_field(path));
        };
        match label {
            "uSize" => {
                let v = value.as_number(path)?;
                self.material.update(|m| m.set_size(v));
            }
            "roughness" => {
                let v = value.as_number(path)?;
                self.material.update(|m| m.set_roughness(v));
            }
            "metalness" => {
                let v = value.as_number(path)?;
                self.material.update(|m| m.set_metalness(v));
            }
            "envMapIntensity" => {
                let v = value.as_number(path)?;
                self.material.update(|m| m.set_environment_intensity(v));
            }
            "color" => {
                let c: Color = value.as_color(path)?;
                self.material.update(|m| m.set_color(c));
            }
            _ => return Err(unknown_field(path)),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::primitives::{SphereOptions, create_sphere};

    fn item() -> BrushItem {
        BrushItem::create(
            "a",
            create_sphere(SphereOptions::default()),
            MaterialParameters::default(),
            Transform::default(),
        )
    }

    #[test]
    fn toggle_while_detached_keeps_item_detached() {
        let mut scene = Scene::new();
        let mut item = item();
        item.toggle(&mut scene);
        assert_eq!(item.active(), Representation::Mesh);
        assert!(!item.is_attached(&scene));
        assert!(!item.material().read().use_points());
    }

    #[test]
    fn tuning_writes_reach_the_shared_material() {
        let mut item = item();
        item.set_field("a/uSize", TuningValue::Number(5000.0)).unwrap();
        assert_eq!(item.get_field("a/uSize"), Some(TuningValue::Number(MAX_POINT_SIZE)));
        assert!(item.set_field("b/uSize", TuningValue::Number(1.0)).is_err());
        assert!(item.set_field("a/shininess", TuningValue::Number(1.0)).is_err());
    }
}
