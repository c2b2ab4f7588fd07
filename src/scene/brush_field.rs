//! A field of brush items sharing one points/mesh switch.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::resources::color::Color;
use crate::resources::geometry::Geometry;
use crate::resources::material::{BrushMaterialOptions, MaterialParameters};
use crate::resources::primitives::{SphereOptions, create_sphere};
use crate::resources::texture::TextureHandle;
use crate::resources::weld::{DEFAULT_TOLERANCE, GeometryProcessor};
use crate::scene::brush_item::BrushItem;
use crate::scene::draw::Representation;
use crate::scene::scene::Scene;
use crate::scene::transform::Transform;

/// Per-item options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BrushItemOptions {
    pub name: String,
    /// Source mesh when the field generates its own geometry.
    pub sphere: SphereOptions,
    pub position: Vec3,
    pub color: Color,
    pub roughness: f32,
    pub metalness: f32,
    pub env_map_intensity: f32,
    pub size: f32,
}

impl Default for BrushItemOptions {
    fn default() -> Self {
        let material = BrushMaterialOptions::default();
        Self {
            name: String::from("item"),
            sphere: SphereOptions {
                radius: 0.5,
                width_segments: 15,
                height_segments: 15,
            },
            position: Vec3::ZERO,
            color: material.color,
            roughness: material.roughness,
            metalness: material.metalness,
            env_map_intensity: material.environment_intensity,
            size: material.size,
        }
    }
}

impl BrushItemOptions {
    fn preset(name: &str, x: f32, color: u32, roughness: f32, metalness: f32, env: f32) -> Self {
        Self {
            name: name.to_string(),
            position: Vec3::new(x, 0.0, 0.0),
            color: Color::from_hex(color),
            roughness,
            metalness,
            env_map_intensity: env,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BrushFieldOptions {
    pub use_points: bool,
    pub fog_color: Color,
    pub fog_density: f32,
    pub weld_tolerance: f32,
    /// Fixes the `uvRotation` draws; random when absent.
    pub seed: Option<u64>,
    pub items: Vec<BrushItemOptions>,
}

impl Default for BrushFieldOptions {
    fn default() -> Self {
        Self {
            use_points: true,
            fog_color: Color::from_hex(0x0f_09_14),
            fog_density: 0.15,
            weld_tolerance: DEFAULT_TOLERANCE,
            seed: None,
            items: vec![
                BrushItemOptions::preset("a", -2.0, 0x10_02_00, 0.236, 1.0, 15.0),
                BrushItemOptions::preset("b", 0.0, 0x22_44_66, 0.636, 0.0, 1.7),
                BrushItemOptions::preset("c", 2.0, 0x91_97_1f, 0.563, 0.0, 1.4),
            ],
        }
    }
}

/// Textures every item of the field samples.
#[derive(Debug, Clone, Default)]
pub struct BrushTextures {
    pub environment_map: Option<TextureHandle>,
    pub brush_texture: Option<TextureHandle>,
}

#[derive(Debug)]
pub struct BrushField {
    items: Vec<BrushItem>,
    use_points: bool,
}

impl BrushField {
    /// Builds the field from the sphere described by each item.
    #[must_use]
    pub fn new(options: &BrushFieldOptions, textures: &BrushTextures) -> Self {
        Self::with_geometry(options, textures, |item| create_sphere(item.sphere))
    }

    /// Builds the field with geometry supplied by `source`.
    ///
    /// Every mesh goes through the [`GeometryProcessor`]. A mesh that fails
    /// processing is logged and left out; the rest of the field still builds.
    pub fn with_geometry(
        options: &BrushFieldOptions,
        textures: &BrushTextures,
        mut source: impl FnMut(&BrushItemOptions) -> Geometry,
    ) -> Self {
        let base = GeometryProcessor::new(options.weld_tolerance);
        let mut items = Vec::with_capacity(options.items.len());

        for (i, item_options) in options.items.iter().enumerate() {
            let processor = match options.seed {
                Some(seed) => base.clone().with_seed(seed.wrapping_add(i as u64)),
                None => base.clone(),
            };
            let raw = source(item_options);
            let geometry = match processor.process(&raw) {
                Ok(geometry) => geometry,
                Err(err) => {
                    log::error!("Skipping brush item '{}': {err}", item_options.name);
                    continue;
                }
            };

            let material = MaterialParameters::new(BrushMaterialOptions {
                color: item_options.color,
                roughness: item_options.roughness,
                metalness: item_options.metalness,
                environment_map: textures.environment_map.clone(),
                environment_intensity: item_options.env_map_intensity,
                brush_texture: textures.brush_texture.clone(),
                use_points: options.use_points,
                fog_color: options.fog_color,
                fog_density: options.fog_density,
                size: item_options.size,
            });

            items.push(BrushItem::create(
                item_options.name.clone(),
                geometry,
                material,
                Transform::from_translation(item_options.position),
            ));
        }

        log::debug!("Built brush field with {} of {} items", items.len(), options.items.len());

        Self {
            items,
            use_points: options.use_points,
        }
    }

    #[must_use]
    pub fn items(&self) -> &[BrushItem] {
        &self.items
    }

    pub fn items_mut(&mut self) -> &mut [BrushItem] {
        &mut self.items
    }

    #[must_use]
    pub fn item(&self, name: &str) -> Option<&BrushItem> {
        self.items.iter().find(|item| item.name() == name)
    }

    /// True when every item draws points. Items toggled one by one through
    /// [`Self::items_mut`] are taken into account; an empty field reports the
    /// last value passed to [`Self::set_use_points`].
    #[must_use]
    pub fn use_points(&self) -> bool {
        if self.items.is_empty() {
            return self.use_points;
        }
        self.items.iter().all(|item| item.active() == Representation::Points)
    }

    /// Switches every item to points or meshes.
    pub fn set_use_points(&mut self, use_points: bool, scene: &mut Scene) {
        self.use_points = use_points;
        let representation = Representation::from_use_points(use_points);
        for item in &mut self.items {
            item.set_representation(representation, scene);
        }
    }

    /// Re-attaches items whose material changed representation on its own.
    pub fn sync(&self, scene: &mut Scene) {
        for item in &self.items {
            if item.sync(scene) {
                log::debug!("Brush item '{}' now draws as {:?}", item.name(), item.active());
            }
        }
    }

    pub fn attach(&self, scene: &mut Scene) {
        for item in &self.items {
            item.attach(scene);
        }
    }

    pub fn detach(&self, scene: &mut Scene) {
        for item in &self.items {
            item.detach(scene);
        }
    }
}
