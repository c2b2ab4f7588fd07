#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

pub mod camera;
pub mod config;
pub mod errors;
pub mod renderer;
pub mod resources;
pub mod scene;
pub mod tuning;
pub mod utils;

pub use camera::{CameraBehavior, CameraController, CameraMode, CameraSettings};
pub use config::AppConfig;
pub use errors::{BrushError, Result};
pub use renderer::{FrameReport, RecordingSink, RenderPipeline, RendererSettings, Viewport};
pub use resources::primitives::*;
pub use resources::{Color, Geometry, GeometryProcessor, Input, MaterialParameters, ShaderDefines};
pub use scene::{BrushField, BrushFieldOptions, BrushItem, Representation, Scene, World};
pub use tuning::{Tunable, TunableField, TuningValue};
pub use utils::interner;
