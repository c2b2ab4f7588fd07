//! CPU-side resources.
//!
//! Plain data the renderer consumes without owning any GPU object:
//! - Geometry, the welding processor and primitives
//! - Brush material parameters and their shader defines
//! - Texture handles and colors
//! - Post-processing settings
//! - Pointer input state

pub mod bloom;
pub mod color;
pub mod final_pass;
pub mod geometry;
pub mod input;
pub mod material;
pub mod primitives;
pub mod shader_defines;
pub mod texture;
pub mod weld;

pub use bloom::BloomSettings;
pub use color::Color;
pub use final_pass::FinalPassSettings;
pub use geometry::{AttributeValues, BoundingBox, BoundingSphere, Geometry, VertexAttribute};
pub use input::{ButtonState, Input, MouseButton};
pub use material::{
    BrushMaterialOptions, BrushMaterialUniforms, MaterialParameters, ParamValue,
    ProgramFeatures, SharedMaterial,
};
pub use shader_defines::ShaderDefines;
pub use texture::{TextureHandle, TextureKind};
pub use weld::{GeometryProcessor, WeldStats};
