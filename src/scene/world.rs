use crate::errors::Result;
use crate::scene::brush_field::{BrushField, BrushFieldOptions, BrushTextures};
use crate::scene::scene::Scene;
use crate::tuning::{Tunable, TunableField, TuningValue, split_path, unknown_field};

/// The scene together with the brush field populating it.
#[derive(Debug)]
pub struct World {
    pub scene: Scene,
    pub field: BrushField,
}

impl World {
    /// Builds the field and attaches every item in its initial representation.
    #[must_use]
    pub fn new(options: &BrushFieldOptions, textures: BrushTextures) -> Self {
        let field = BrushField::new(options, &textures);
        Self::from_field(field, textures)
    }

    #[must_use]
    pub fn from_field(field: BrushField, textures: BrushTextures) -> Self {
        let mut scene = Scene::new();
        scene.set_environment_map(textures.environment_map);
        field.attach(&mut scene);
        Self { scene, field }
    }

    pub fn set_use_points(&mut self, use_points: bool) {
        self.field.set_use_points(use_points, &mut self.scene);
    }

    /// Per-frame update: re-syncs item attachment with the materials, then
    /// animates the lights.
    pub fn update(&mut self, elapsed_seconds: f32) {
        self.field.sync(&mut self.scene);
        self.scene.update(elapsed_seconds);
    }
}

impl Tunable for World {
    fn fields(&self) -> Vec<TunableField> {
        let mut fields = vec![
            TunableField::checkbox("world/usePoints"),
            TunableField::range("lights/ambientLightIntensity", 0.0, 1.0, 0.001),
            TunableField::color("lights/ambientLightColor"),
            TunableField::range("lights/directionalLightIntensity", 0.0, 10.0, 0.001),
            TunableField::color("lights/directionalLightColor"),
        ];
        for item in self.field.items() {
            fields.extend(item.fields());
        }
        fields
    }

    fn get_field(&self, path: &str) -> Option<TuningValue> {
        let lights = &self.scene;
        match path {
            "world/usePoints" => Some(TuningValue::Bool(self.field.use_points())),
            "lights/ambientLightIntensity" => Some(TuningValue::Number(lights.ambient_light.intensity)),
            "lights/ambientLightColor" => Some(TuningValue::Color(lights.ambient_light.color)),
            "lights/directionalLightIntensity" => {
                Some(TuningValue::Number(lights.directional_light.intensity))
            }
            "lights/directionalLightColor" => Some(TuningValue::Color(lights.directional_light.color)),
            _ => {
                let (folder, _) = split_path(path)?;
                self.field.item(folder)?.get_field(path)
            }
        }
    }

    fn set_field(&mut self, path: &str, value: TuningValue) -> Result<()> {
        match path {
            "world/usePoints" => self.set_use_points(value.as_bool(path)?),
            "lights/ambientLightIntensity" => {
                self.scene.ambient_light.intensity = value.as_number(path)?.clamp(0.0, 1.0);
            }
            "lights/ambientLightColor" => self.scene.ambient_light.color = value.as_color(path)?,
            "lights/directionalLightIntensity" => {
                self.scene.directional_light.intensity = value.as_number(path)?.clamp(0.0, 10.0);
            }
            "lights/directionalLightColor" => {
                self.scene.directional_light.color = value.as_color(path)?;
            }
            _ => {
                let folder = split_path(path).map(|(folder, _)| folder);
                let item = self
                    .field
                    .items_mut()
                    .iter_mut()
                    .find(|item| Some(item.name()) == folder)
                    .ok_or_else(|| unknown_field(path))?;
                item.set_field(path, value)?;
            }
        }
        Ok(())
    }
}
