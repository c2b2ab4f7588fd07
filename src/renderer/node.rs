//! Render node trait.
//!
//! Each pass of the pipeline is a node with two phases:
//! - `prepare` has mutable access to the node and the shader cache; programs
//!   are generated and per-frame data is gathered here.
//! - `run` is read-only and only emits commands.

use crate::renderer::commands::CommandSink;
use crate::renderer::settings::RendererSettings;
use crate::renderer::shader::ShaderManager;
use crate::renderer::targets::{TargetId, TargetPool};
use crate::renderer::viewport::ViewportSize;
use crate::resources::bloom::BloomSettings;
use crate::resources::final_pass::FinalPassSettings;
use crate::scene::camera::RenderCamera;
use crate::scene::scene::Scene;

/// Everything a node may read during a frame.
pub struct FrameContext<'a> {
    pub scene: &'a Scene,
    pub camera: &'a RenderCamera,
    pub targets: &'a TargetPool,
    pub viewport: ViewportSize,
    pub settings: &'a RendererSettings,
    pub bloom: &'a BloomSettings,
    pub final_pass: &'a FinalPassSettings,
}

impl FrameContext<'_> {
    /// Current size of `id`, or 1×1 for an unknown target.
    #[must_use]
    pub fn target_size(&self, id: TargetId) -> (u32, u32) {
        self.targets.get(id).map_or((1, 1), |t| t.size())
    }
}

pub trait RenderNode {
    fn name(&self) -> &'static str;

    /// Targets sampled by this node.
    fn reads(&self) -> Vec<TargetId>;

    /// Targets rendered into by this node.
    fn writes(&self) -> Vec<TargetId>;

    fn prepare(&mut self, _ctx: &FrameContext, _shaders: &mut ShaderManager) {}

    fn run(&self, ctx: &FrameContext, sink: &mut dyn CommandSink);
}
