//! Rendering
//!
//! - [`viewport`]: drawable size, pixel ratio and resize broadcast
//! - [`targets`]: intermediate render targets, resized together
//! - [`shader`]: WGSL template generation and program cache
//! - [`commands`]: the command stream passes emit
//! - [`passes`]: base, bloom and final passes
//! - [`pipeline`]: per-frame orchestration

pub mod commands;
pub mod node;
pub mod passes;
pub mod pipeline;
pub mod settings;
pub mod shader;
pub mod targets;
pub mod viewport;

pub use commands::{CommandSink, LoadOp, RecordingSink, RenderCommand, TextureSource};
pub use node::{FrameContext, RenderNode};
pub use pipeline::{FrameReport, RenderPipeline};
pub use settings::RendererSettings;
pub use shader::{CompiledProgram, ProgramId, ShaderManager};
pub use targets::{RenderTarget, TargetDesc, TargetId, TargetPool};
pub use viewport::{ResizeListener, Viewport, ViewportSize};
