//! Brush material parameters.
//!
//! [`MaterialParameters`] is the single source of truth for the shading of a
//! brush item. Both draw representations of an item read the same instance
//! through a [`SharedMaterial`]; only the parameters themselves can be
//! mutated, never a draw.
//!
//! The physically based part of the shading (Lambert diffuse, GGX specular,
//! environment reflection, exponential-squared fog) is identical in the two
//! modes. `usePoints` only swaps primitive assembly and the footprint: with
//! `USE_POINTS` defined, every vertex becomes a camera-facing quad textured
//! with the brush footprint rotated by its `uvRotation`.
//!
//! # Parameter names
//!
//! | Name                   | Kind    | Range      |
//! |------------------------|---------|------------|
//! | `color`                | color   |            |
//! | `roughness`            | scalar  | `[0, 1]`   |
//! | `metalness`            | scalar  | `[0, 1]`   |
//! | `environmentMap`       | texture |            |
//! | `environmentIntensity` | scalar  | `[0, ∞)`   |
//! | `brushTexture`         | texture |            |
//! | `usePoints`            | bool    |            |
//! | `fogColor`             | color   |            |
//! | `fogDensity`           | scalar  | `[0, 1)`   |
//! | `size`                 | scalar  | `[0, 1000]`|

use std::borrow::Cow;
use std::cell::{Ref, RefCell};
use std::rc::Rc;

use bitflags::bitflags;
use bytemuck::{Pod, Zeroable};

use crate::errors::{BrushError, Result};
use crate::resources::color::Color;
use crate::resources::shader_defines::ShaderDefines;
use crate::resources::texture::TextureHandle;

pub const COLOR: &str = "color";
pub const ROUGHNESS: &str = "roughness";
pub const METALNESS: &str = "metalness";
pub const ENVIRONMENT_MAP: &str = "environmentMap";
pub const ENVIRONMENT_INTENSITY: &str = "environmentIntensity";
pub const BRUSH_TEXTURE: &str = "brushTexture";
pub const USE_POINTS: &str = "usePoints";
pub const FOG_COLOR: &str = "fogColor";
pub const FOG_DENSITY: &str = "fogDensity";
pub const SIZE: &str = "size";

pub const PARAMETER_NAMES: [&str; 10] = [
    COLOR,
    ROUGHNESS,
    METALNESS,
    ENVIRONMENT_MAP,
    ENVIRONMENT_INTENSITY,
    BRUSH_TEXTURE,
    USE_POINTS,
    FOG_COLOR,
    FOG_DENSITY,
    SIZE,
];

/// Largest point footprint, in pixels at unit depth.
pub const MAX_POINT_SIZE: f32 = 1000.0;

bitflags! {
    /// Compile-time switches of the brush program.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct ProgramFeatures: u32 {
        const USE_POINTS    = 1 << 0;
        const USE_ENVMAP    = 1 << 1;
        const USE_BRUSH_MAP = 1 << 2;
        const USE_FOG       = 1 << 3;
    }
}

impl ProgramFeatures {
    #[must_use]
    pub fn to_defines(self) -> ShaderDefines {
        let mut defines = ShaderDefines::new();
        for (name, _) in self.iter_names() {
            defines.set(name, "1");
        }
        defines
    }
}

/// A dynamically typed parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Scalar(f32),
    Color(Color),
    Texture(Option<TextureHandle>),
    Bool(bool),
}

impl ParamValue {
    fn kind(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "scalar",
            Self::Color(_) => "color",
            Self::Texture(_) => "texture",
            Self::Bool(_) => "bool",
        }
    }
}

/// Construction options. Out-of-range values are clamped on construction.
#[derive(Debug, Clone)]
pub struct BrushMaterialOptions {
    pub color: Color,
    pub roughness: f32,
    pub metalness: f32,
    pub environment_map: Option<TextureHandle>,
    pub environment_intensity: f32,
    pub brush_texture: Option<TextureHandle>,
    pub use_points: bool,
    pub fog_color: Color,
    pub fog_density: f32,
    pub size: f32,
}

impl Default for BrushMaterialOptions {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            roughness: 1.0,
            metalness: 0.0,
            environment_map: None,
            environment_intensity: 1.0,
            brush_texture: None,
            use_points: true,
            fog_color: Color::from_hex(0x0f_09_14),
            fog_density: 0.15,
            size: 100.0,
        }
    }
}

/// GPU layout of the per-material uniform block.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct BrushMaterialUniforms {
    /// rgb + opacity
    pub diffuse: [f32; 4],
    /// rgb + density
    pub fog: [f32; 4],
    pub roughness: f32,
    pub metalness: f32,
    pub env_map_intensity: f32,
    pub size: f32,
}

#[derive(Debug, Clone)]
pub struct MaterialParameters {
    color: Color,
    roughness: f32,
    metalness: f32,
    environment_map: Option<TextureHandle>,
    environment_intensity: f32,
    brush_texture: Option<TextureHandle>,
    use_points: bool,
    fog_color: Color,
    fog_density: f32,
    size: f32,

    features: ProgramFeatures,
    defines: ShaderDefines,
    /// Bumped whenever the define set changes; consumers recompile on mismatch.
    program_version: u64,
    /// Bumped on every value change; consumers re-upload uniforms on mismatch.
    data_version: u64,
}

impl Default for MaterialParameters {
    fn default() -> Self {
        Self::new(BrushMaterialOptions::default())
    }
}

impl MaterialParameters {
    #[must_use]
    pub fn new(options: BrushMaterialOptions) -> Self {
        let mut params = Self {
            color: options.color,
            roughness: 0.0,
            metalness: 0.0,
            environment_map: options.environment_map,
            environment_intensity: 0.0,
            brush_texture: options.brush_texture,
            use_points: options.use_points,
            fog_color: options.fog_color,
            fog_density: 0.0,
            size: 0.0,
            features: ProgramFeatures::empty(),
            defines: ShaderDefines::new(),
            program_version: 0,
            data_version: 0,
        };
        params.roughness = clamp_param(ROUGHNESS, options.roughness, 0.0, 1.0);
        params.metalness = clamp_param(METALNESS, options.metalness, 0.0, 1.0);
        params.environment_intensity =
            clamp_param(ENVIRONMENT_INTENSITY, options.environment_intensity, 0.0, f32::INFINITY);
        params.fog_density = clamp_param(FOG_DENSITY, options.fog_density, 0.0, 1.0f32.next_down());
        params.size = clamp_param(SIZE, options.size, 0.0, MAX_POINT_SIZE);
        params.refresh_program();
        params
    }

    // ========================================================================
    // Generic access
    // ========================================================================

    /// Reads a parameter by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<ParamValue> {
        Some(match name {
            COLOR => ParamValue::Color(self.color),
            ROUGHNESS => ParamValue::Scalar(self.roughness),
            METALNESS => ParamValue::Scalar(self.metalness),
            ENVIRONMENT_MAP => ParamValue::Texture(self.environment_map.clone()),
            ENVIRONMENT_INTENSITY => ParamValue::Scalar(self.environment_intensity),
            BRUSH_TEXTURE => ParamValue::Texture(self.brush_texture.clone()),
            USE_POINTS => ParamValue::Bool(self.use_points),
            FOG_COLOR => ParamValue::Color(self.fog_color),
            FOG_DENSITY => ParamValue::Scalar(self.fog_density),
            SIZE => ParamValue::Scalar(self.size),
            _ => return None,
        })
    }

    /// Writes a parameter by name.
    ///
    /// Finite out-of-range scalars are clamped to the nearest bound. Unknown
    /// names, kind mismatches and non-finite values are rejected and leave the
    /// parameter untouched.
    pub fn set(&mut self, name: &str, value: ParamValue) -> Result<()> {
        match (name, value) {
            (COLOR, ParamValue::Color(c)) => self.set_color(finite_color(name, c)?),
            (FOG_COLOR, ParamValue::Color(c)) => self.set_fog_color(finite_color(name, c)?),
            (ROUGHNESS, ParamValue::Scalar(v)) => self.set_roughness(finite(name, v)?),
            (METALNESS, ParamValue::Scalar(v)) => self.set_metalness(finite(name, v)?),
            (ENVIRONMENT_INTENSITY, ParamValue::Scalar(v)) => {
                self.set_environment_intensity(finite(name, v)?);
            }
            (FOG_DENSITY, ParamValue::Scalar(v)) => self.set_fog_density(finite(name, v)?),
            (SIZE, ParamValue::Scalar(v)) => self.set_size(finite(name, v)?),
            (ENVIRONMENT_MAP, ParamValue::Texture(t)) => self.set_environment_map(t),
            (BRUSH_TEXTURE, ParamValue::Texture(t)) => self.set_brush_texture(t),
            (USE_POINTS, ParamValue::Bool(b)) => self.set_use_points(b),
            (name, value) => {
                return Err(if PARAMETER_NAMES.contains(&name) {
                    BrushError::Configuration(format!(
                        "parameter '{name}' does not accept a {} value",
                        value.kind()
                    ))
                } else {
                    BrushError::Configuration(format!("unknown material parameter '{name}'"))
                });
            }
        }
        Ok(())
    }

    // ========================================================================
    // Typed accessors
    // ========================================================================

    #[must_use]
    pub fn color(&self) -> Color {
        self.color
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
        self.touch();
    }

    #[must_use]
    pub fn roughness(&self) -> f32 {
        self.roughness
    }

    pub fn set_roughness(&mut self, roughness: f32) {
        self.roughness = clamp_param(ROUGHNESS, roughness, 0.0, 1.0);
        self.touch();
    }

    #[must_use]
    pub fn metalness(&self) -> f32 {
        self.metalness
    }

    pub fn set_metalness(&mut self, metalness: f32) {
        self.metalness = clamp_param(METALNESS, metalness, 0.0, 1.0);
        self.touch();
    }

    #[must_use]
    pub fn environment_map(&self) -> Option<&TextureHandle> {
        self.environment_map.as_ref()
    }

    pub fn set_environment_map(&mut self, map: Option<TextureHandle>) {
        self.environment_map = map;
        self.touch();
        self.refresh_program();
    }

    #[must_use]
    pub fn environment_intensity(&self) -> f32 {
        self.environment_intensity
    }

    pub fn set_environment_intensity(&mut self, intensity: f32) {
        self.environment_intensity = clamp_param(ENVIRONMENT_INTENSITY, intensity, 0.0, f32::INFINITY);
        self.touch();
    }

    #[must_use]
    pub fn brush_texture(&self) -> Option<&TextureHandle> {
        self.brush_texture.as_ref()
    }

    pub fn set_brush_texture(&mut self, texture: Option<TextureHandle>) {
        self.brush_texture = texture;
        self.touch();
        self.refresh_program();
    }

    #[must_use]
    pub fn use_points(&self) -> bool {
        self.use_points
    }

    /// Switches between point-sprite and triangle shading. Changes the
    /// compiled program of every consumer.
    pub fn set_use_points(&mut self, use_points: bool) {
        self.use_points = use_points;
        self.touch();
        self.refresh_program();
    }

    #[must_use]
    pub fn fog_color(&self) -> Color {
        self.fog_color
    }

    pub fn set_fog_color(&mut self, color: Color) {
        self.fog_color = color;
        self.touch();
    }

    #[must_use]
    pub fn fog_density(&self) -> f32 {
        self.fog_density
    }

    pub fn set_fog_density(&mut self, density: f32) {
        self.fog_density = clamp_param(FOG_DENSITY, density, 0.0, 1.0f32.next_down());
        self.touch();
        self.refresh_program();
    }

    #[must_use]
    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn set_size(&mut self, size: f32) {
        self.size = clamp_param(SIZE, size, 0.0, MAX_POINT_SIZE);
        self.touch();
    }

    // ========================================================================
    // Program state
    // ========================================================================

    #[must_use]
    pub fn features(&self) -> ProgramFeatures {
        self.features
    }

    #[must_use]
    pub fn shader_defines(&self) -> &ShaderDefines {
        &self.defines
    }

    #[must_use]
    pub fn program_version(&self) -> u64 {
        self.program_version
    }

    #[must_use]
    pub fn data_version(&self) -> u64 {
        self.data_version
    }

    #[must_use]
    pub fn uniforms(&self) -> BrushMaterialUniforms {
        BrushMaterialUniforms {
            diffuse: self.color.extend(1.0).to_array(),
            fog: self.fog_color.extend(self.fog_density).to_array(),
            roughness: self.roughness,
            metalness: self.metalness,
            env_map_intensity: self.environment_intensity,
            size: self.size,
        }
    }

    fn touch(&mut self) {
        self.data_version = self.data_version.wrapping_add(1);
    }

    /// Define set for a consumer rasterising as points (`true`) or triangles.
    ///
    /// Equal to [`Self::shader_defines`] when `points` matches `usePoints`.
    #[must_use]
    pub fn defines_for(&self, points: bool) -> Cow<'_, ShaderDefines> {
        if points == self.use_points {
            Cow::Borrowed(&self.defines)
        } else {
            Cow::Owned(self.features_for(points).to_defines())
        }
    }

    fn features_for(&self, points: bool) -> ProgramFeatures {
        let mut features = ProgramFeatures::empty();
        features.set(ProgramFeatures::USE_POINTS, points);
        features.set(ProgramFeatures::USE_ENVMAP, self.environment_map.is_some());
        features.set(ProgramFeatures::USE_BRUSH_MAP, points && self.brush_texture.is_some());
        features.set(ProgramFeatures::USE_FOG, self.fog_density > 0.0);
        features
    }

    fn refresh_program(&mut self) {
        let features = self.features_for(self.use_points);

        if features != self.features || self.program_version == 0 {
            self.features = features;
            self.defines = features.to_defines();
            self.program_version = self.program_version.wrapping_add(1);
        }
    }
}

fn clamp_param(name: &str, value: f32, min: f32, max: f32) -> f32 {
    if value.is_nan() {
        log::warn!("Material parameter '{name}' is NaN, reset to {min}");
        return min;
    }
    let clamped = value.clamp(min, max);
    if clamped != value {
        log::warn!("Material parameter '{name}' = {value} out of range, clamped to {clamped}");
    }
    clamped
}

fn finite(name: &str, value: f32) -> Result<f32> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(BrushError::Configuration(format!("parameter '{name}' must be finite, got {value}")))
    }
}

fn finite_color(name: &str, color: Color) -> Result<Color> {
    if color.is_finite() {
        Ok(color)
    } else {
        Err(BrushError::Configuration(format!("parameter '{name}' must be a finite color")))
    }
}

/// Reference-counted material shared by the two draws of an item.
///
/// Rendering is single-threaded; the handle is neither `Send` nor `Sync`.
#[derive(Debug, Clone)]
pub struct SharedMaterial(Rc<RefCell<MaterialParameters>>);

impl SharedMaterial {
    #[must_use]
    pub fn new(params: MaterialParameters) -> Self {
        Self(Rc::new(RefCell::new(params)))
    }

    /// Read access for renderers and inspectors.
    #[must_use]
    pub fn read(&self) -> Ref<'_, MaterialParameters> {
        self.0.borrow()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<ParamValue> {
        self.0.borrow().get(name)
    }

    pub fn set(&self, name: &str, value: ParamValue) -> Result<()> {
        self.0.borrow_mut().set(name, value)
    }

    /// Runs `f` with mutable access to the parameters.
    pub fn update<R>(&self, f: impl FnOnce(&mut MaterialParameters) -> R) -> R {
        f(&mut self.0.borrow_mut())
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
    fn uniform_block_is_16_byte_aligned() {
        assert_eq!(std::mem::size_of::<BrushMaterialUniforms>() % 16, 0);
    }

    #[test]
    fn fog_density_stays_below_one() {
        let mut params = MaterialParameters::default();
        params.set_fog_density(3.0);
        assert!(params.fog_density() < 1.0);
        params.set_fog_density(-1.0);
        assert_eq!(params.fog_density(), 0.0);
        assert!(!params.features().contains(ProgramFeatures::USE_FOG));
    }

    #[test]
    fn defines_follow_the_requested_rasteriser() {
        let params = MaterialParameters::new(BrushMaterialOptions {
            brush_texture: Some(TextureHandle::texture_2d("brush")),
            ..Default::default()
        });
        assert!(matches!(params.defines_for(true), Cow::Borrowed(_)));

        let mesh = params.defines_for(false);
        assert!(!mesh.contains("USE_POINTS"));
        assert!(!mesh.contains("USE_BRUSH_MAP"));
        assert!(mesh.contains("USE_FOG"));
    }

    #[test]
    fn brush_map_only_in_point_mode() {
        let params = MaterialParameters::new(BrushMaterialOptions {
            brush_texture: Some(TextureHandle::texture_2d("brush")),
            use_points: false,
            ..Default::default()
        });
        assert!(!params.features().contains(ProgramFeatures::USE_BRUSH_MAP));
        assert!(!params.shader_defines().contains("USE_POINTS"));
    }

    #[test]
    fn value_change_without_define_change_keeps_program() {
        let mut params = MaterialParameters::default();
        let program = params.program_version();
        let data = params.data_version();
        params.set_roughness(0.5);
        assert_eq!(params.program_version(), program);
        assert_ne!(params.data_version(), data);
    }
}
