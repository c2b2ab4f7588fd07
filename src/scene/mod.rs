pub mod brush_field;
pub mod brush_item;
pub mod camera;
pub mod draw;
pub mod light;
pub mod scene;
pub mod transform;
pub mod world;

pub use brush_field::{BrushField, BrushFieldOptions, BrushItemOptions, BrushTextures};
pub use brush_item::BrushItem;
pub use camera::{CameraPose, Projection, RenderCamera};
pub use draw::{DrawHandle, DrawId, DrawObject, DrawRange, Representation};
pub use light::{AmbientLight, DirectionalLight};
pub use scene::Scene;
pub use transform::{SharedTransform, Transform};
pub use world::World;
