//! Film grain, radial RGB split and color overlay.

use crate::renderer::commands::{CommandSink, LoadOp, RenderCommand, TextureSource};
use crate::renderer::node::{FrameContext, RenderNode};
use crate::renderer::settings::HDR_FORMAT;
use crate::renderer::shader::{ProgramId, ShaderManager};
use crate::renderer::targets::{TargetDesc, TargetId, TargetPool};
use crate::resources::shader_defines::ShaderDefines;

const TEMPLATE: &str = "final";

#[derive(Debug)]
pub struct FinalPass {
    input: TargetId,
    output: TargetId,
    program: Option<ProgramId>,
}

impl FinalPass {
    pub fn new(pool: &mut TargetPool, input: TargetId) -> Self {
        let output = pool.create(TargetDesc::color("final_color", HDR_FORMAT, 1));
        Self {
            input,
            output,
            program: None,
        }
    }

    #[must_use]
    pub fn output(&self) -> TargetId {
        self.output
    }
}

impl RenderNode for FinalPass {
    fn name(&self) -> &'static str {
        "final"
    }

    fn reads(&self) -> Vec<TargetId> {
        vec![self.input]
    }

    fn writes(&self) -> Vec<TargetId> {
        vec![self.output]
    }

    fn prepare(&mut self, _ctx: &FrameContext, shaders: &mut ShaderManager) {
        if self.program.is_none() {
            self.program = shaders
                .get_or_compile(TEMPLATE, &ShaderDefines::new())
                .map_err(|err| log::warn!("Final pass program unavailable: {err}"))
                .ok();
        }
    }

    fn run(&self, ctx: &FrameContext, sink: &mut dyn CommandSink) {
        let Some(program) = self.program else {
            return;
        };
        let uniforms = ctx.final_pass.uniforms();

        sink.submit(RenderCommand::BeginPass {
            pass: self.name(),
            color: self.output,
            depth: None,
            size: ctx.target_size(self.output),
            load: LoadOp::Load,
        });
        sink.submit(RenderCommand::SetProgram {
            program,
            topology: wgpu::PrimitiveTopology::TriangleList,
        });
        sink.submit(RenderCommand::Uniforms {
            group: 0,
            label: "final",
            bytes: bytemuck::bytes_of(&uniforms).to_vec(),
        });
        sink.submit(RenderCommand::BindTexture {
            slot: 1,
            source: TextureSource::Target(self.input),
        });
        sink.submit(RenderCommand::Fullscreen);
        sink.submit(RenderCommand::EndPass);
    }
}
