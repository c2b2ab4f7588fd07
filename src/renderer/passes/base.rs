//! Base pass: rasterises every attached draw into the HDR scene target.

use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use uuid::Uuid;

use crate::renderer::commands::{CommandSink, LoadOp, RenderCommand, TextureSource};
use crate::renderer::node::{FrameContext, RenderNode};
use crate::renderer::shader::{ProgramId, ShaderManager};
use crate::renderer::targets::TargetId;
use crate::resources::material::BrushMaterialUniforms;
use crate::scene::draw::{DrawId, DrawRange, Representation};

pub const BRUSH_TEMPLATE: &str = "brush";

pub const ENV_MAP_SLOT: u32 = 1;
pub const BRUSH_MAP_SLOT: u32 = 3;

/// Per-frame uniform block (group 0).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct FrameUniforms {
    pub view_projection: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub camera_position: [f32; 4],
    pub ambient: [f32; 4],
    pub light_color: [f32; 4],
    pub light_direction: [f32; 4],
    pub viewport: [f32; 4],
}

#[derive(Debug, Clone)]
struct PreparedDraw {
    id: DrawId,
    program: ProgramId,
    topology: wgpu::PrimitiveTopology,
    range: DrawRange,
    world: Mat4,
    material: BrushMaterialUniforms,
    environment_map: Option<Uuid>,
    brush_texture: Option<Uuid>,
}

#[derive(Debug)]
pub struct BasePass {
    color: TargetId,
    depth: TargetId,
    frame: FrameUniforms,
    draws: Vec<PreparedDraw>,
}

impl BasePass {
    #[must_use]
    pub fn new(color: TargetId, depth: TargetId) -> Self {
        Self {
            color,
            depth,
            frame: FrameUniforms::zeroed(),
            draws: Vec::new(),
        }
    }

    #[must_use]
    pub fn output(&self) -> TargetId {
        self.color
    }

    /// Draws gathered by the last `prepare`.
    #[must_use]
    pub fn draw_count(&self) -> usize {
        self.draws.len()
    }

    fn frame_uniforms(ctx: &FrameContext) -> FrameUniforms {
        let scene = ctx.scene;
        let ambient = scene.ambient_light.color.0 * scene.ambient_light.intensity;
        let light = &scene.directional_light;
        let light_color = light.color.0 * light.intensity;
        let (width, height) = ctx.viewport.physical();
        FrameUniforms {
            view_projection: ctx.camera.view_projection_matrix().to_cols_array_2d(),
            view: ctx.camera.view_matrix().to_cols_array_2d(),
            camera_position: ctx.camera.pose.position.extend(1.0).to_array(),
            ambient: ambient.extend(1.0).to_array(),
            light_color: light_color.extend(1.0).to_array(),
            light_direction: light.direction().extend(0.0).to_array(),
            viewport: [width as f32, height as f32, ctx.viewport.pixel_ratio, ctx.final_pass.time()],
        }
    }
}

impl RenderNode for BasePass {
    fn name(&self) -> &'static str {
        "base"
    }

    fn reads(&self) -> Vec<TargetId> {
        Vec::new()
    }

    fn writes(&self) -> Vec<TargetId> {
        vec![self.color, self.depth]
    }

    fn prepare(&mut self, ctx: &FrameContext, shaders: &mut ShaderManager) {
        self.frame = Self::frame_uniforms(ctx);
        self.draws.clear();

        for draw in ctx.scene.draws() {
            let material = draw.material().read();
            // The program must match the topology this draw submits.
            let points = draw.representation() == Representation::Points;
            let program = match shaders.get_or_compile(BRUSH_TEMPLATE, &material.defines_for(points)) {
                Ok(program) => program,
                Err(err) => {
                    log::warn!("Skipping draw {:?}: {err}", draw.id());
                    continue;
                }
            };
            if draw.needs_recompile() {
                draw.mark_compiled(material.program_version());
            }

            self.draws.push(PreparedDraw {
                id: draw.id(),
                program,
                topology: draw.representation().topology(),
                range: draw.range(),
                world: draw.transform().world_matrix(),
                material: material.uniforms(),
                environment_map: material.environment_map().map(|t| t.id),
                brush_texture: material.brush_texture().map(|t| t.id),
            });
        }
    }

    fn run(&self, ctx: &FrameContext, sink: &mut dyn CommandSink) {
        let clear = ctx.settings.clear_color.extend(1.0).to_array();
        sink.submit(RenderCommand::BeginPass {
            pass: self.name(),
            color: self.color,
            depth: Some(self.depth),
            size: ctx.target_size(self.color),
            load: LoadOp::Clear(clear),
        });
        sink.submit(RenderCommand::Uniforms {
            group: 0,
            label: "frame",
            bytes: bytemuck::bytes_of(&self.frame).to_vec(),
        });

        for draw in &self.draws {
            sink.submit(RenderCommand::SetProgram {
                program: draw.program,
                topology: draw.topology,
            });
            sink.submit(RenderCommand::Uniforms {
                group: 1,
                label: "material",
                bytes: bytemuck::bytes_of(&draw.material).to_vec(),
            });
            if let Some(id) = draw.environment_map {
                sink.submit(RenderCommand::BindTexture {
                    slot: ENV_MAP_SLOT,
                    source: TextureSource::Asset(id),
                });
            }
            if let Some(id) = draw.brush_texture {
                sink.submit(RenderCommand::BindTexture {
                    slot: BRUSH_MAP_SLOT,
                    source: TextureSource::Asset(id),
                });
            }
            sink.submit(RenderCommand::Draw {
                draw: draw.id,
                range: draw.range,
                world: draw.world,
            });
        }

        sink.submit(RenderCommand::EndPass);
    }
}
