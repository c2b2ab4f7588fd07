//! Frame Pipeline
//!
//! [`RenderPipeline`] owns the target pool, the program cache and the three
//! passes, and turns one `(scene, camera)` pair into one command stream:
//!
//! 1. Drain the resize listener; resize every target in one step.
//! 2. Prepare each node (programs, per-frame data).
//! 3. Announce newly generated programs.
//! 4. Run `base → bloom → final` (final only when enabled), then present.
//!
//! Rendering a frame never fails: a draw whose program cannot be generated
//! is skipped with a warning and the rest of the frame goes out.

use std::time::Duration;

use crate::errors::Result;
use crate::renderer::commands::{CommandSink, RenderCommand};
use crate::renderer::node::{FrameContext, RenderNode};
use crate::renderer::passes::{BasePass, BloomPass, FinalPass};
use crate::renderer::settings::{DEPTH_FORMAT, HDR_FORMAT, RendererSettings};
use crate::renderer::shader::ShaderManager;
use crate::renderer::targets::{TargetDesc, TargetId, TargetPool};
use crate::renderer::viewport::ResizeListener;
use crate::resources::bloom::BloomSettings;
use crate::resources::final_pass::FinalPassSettings;
use crate::scene::camera::RenderCamera;
use crate::scene::scene::Scene;
use crate::tuning::{Tunable, TunableField, TuningValue, unknown_field};

/// Summary of one rendered frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub frame_index: u64,
    /// Physical size every full-resolution target had this frame.
    pub drawable_size: (u32, u32),
    pub draw_calls: usize,
    /// Latest GPU time the backend reported, possibly from an earlier frame.
    pub gpu_time: Option<Duration>,
}

#[derive(Debug)]
pub struct RenderPipeline {
    settings: RendererSettings,
    bloom: BloomSettings,
    final_settings: FinalPassSettings,

    resize: ResizeListener,
    targets: TargetPool,
    shaders: ShaderManager,

    base: BasePass,
    bloom_pass: BloomPass,
    final_node: FinalPass,

    frame_index: u64,
}

impl RenderPipeline {
    pub fn new(
        settings: RendererSettings,
        bloom: BloomSettings,
        final_settings: FinalPassSettings,
        resize: ResizeListener,
    ) -> Result<Self> {
        let mut targets = TargetPool::new(resize.current().physical());
        let scene_color = targets.create(TargetDesc::color("scene_color", HDR_FORMAT, 1));
        let scene_depth = targets.create(TargetDesc::depth("scene_depth", DEPTH_FORMAT));

        let base = BasePass::new(scene_color, scene_depth);
        let bloom_pass = BloomPass::new(&mut targets, scene_color);
        let final_node = FinalPass::new(&mut targets, bloom_pass.output());

        log::info!(
            "Render pipeline ready: {} targets at {:?}",
            targets.len(),
            targets.drawable_size()
        );

        Ok(Self {
            settings,
            bloom,
            final_settings,
            resize,
            targets,
            shaders: ShaderManager::new()?,
            base,
            bloom_pass,
            final_node,
            frame_index: 0,
        })
    }

    #[must_use]
    pub fn settings(&self) -> &RendererSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut RendererSettings {
        &mut self.settings
    }

    #[must_use]
    pub fn bloom(&self) -> &BloomSettings {
        &self.bloom
    }

    pub fn bloom_mut(&mut self) -> &mut BloomSettings {
        &mut self.bloom
    }

    #[must_use]
    pub fn final_pass(&self) -> &FinalPassSettings {
        &self.final_settings
    }

    pub fn final_pass_mut(&mut self) -> &mut FinalPassSettings {
        &mut self.final_settings
    }

    #[must_use]
    pub fn targets(&self) -> &TargetPool {
        &self.targets
    }

    #[must_use]
    pub fn shaders(&self) -> &ShaderManager {
        &self.shaders
    }

    #[must_use]
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    fn nodes(&self) -> Vec<&dyn RenderNode> {
        let mut nodes: Vec<&dyn RenderNode> = vec![&self.base, &self.bloom_pass];
        if self.settings.final_pass_enabled {
            nodes.push(&self.final_node);
        }
        nodes
    }

    /// Target presented at the end of the frame.
    #[must_use]
    pub fn output(&self) -> TargetId {
        if self.settings.final_pass_enabled {
            self.final_node.output()
        } else {
            self.bloom_pass.output()
        }
    }

    /// Checks every target an active pass touches against the drawable size.
    pub fn validate_targets(&self) -> Result<()> {
        for node in self.nodes() {
            for id in node.reads().into_iter().chain(node.writes()) {
                self.targets.validate(id, node.name())?;
            }
        }
        Ok(())
    }

    pub fn render_frame(
        &mut self,
        scene: &Scene,
        camera: &RenderCamera,
        elapsed_seconds: f32,
        sink: &mut dyn CommandSink,
    ) -> FrameReport {
        if let Some(size) = self.resize.poll() {
            self.targets.resize(size.physical());
        }
        debug_assert!(
            self.validate_targets().is_ok(),
            "render targets out of sync with the viewport"
        );

        self.final_settings.advance(elapsed_seconds);

        let ctx = FrameContext {
            scene,
            camera,
            targets: &self.targets,
            viewport: self.resize.current(),
            settings: &self.settings,
            bloom: &self.bloom,
            final_pass: &self.final_settings,
        };

        self.base.prepare(&ctx, &mut self.shaders);
        self.bloom_pass.prepare(&ctx, &mut self.shaders);
        if self.settings.final_pass_enabled {
            self.final_node.prepare(&ctx, &mut self.shaders);
        }

        for program in self.shaders.take_new_programs() {
            sink.submit(RenderCommand::CompileProgram {
                program: program.id,
                label: program.template,
                source: program.source,
            });
        }

        self.base.run(&ctx, sink);
        self.bloom_pass.run(&ctx, sink);
        let output = if self.settings.final_pass_enabled {
            self.final_node.run(&ctx, sink);
            self.final_node.output()
        } else {
            self.bloom_pass.output()
        };

        let drawable_size = self.targets.drawable_size();
        sink.submit(RenderCommand::Present {
            source: output,
            size: drawable_size,
        });

        let report = FrameReport {
            frame_index: self.frame_index,
            drawable_size,
            draw_calls: self.base.draw_count(),
            gpu_time: sink.poll_gpu_time(),
        };
        self.frame_index += 1;
        report
    }
}

impl Tunable for RenderPipeline {
    fn fields(&self) -> Vec<TunableField> {
        vec![
            TunableField::color("renderer/clearColor"),
            TunableField::range("renderer/unrealBloomThreshold", 0.0, 1.0, 0.001),
            TunableField::range("renderer/unrealBloomStrength", 0.0, 3.0, 0.001),
            TunableField::range("renderer/unrealBloomRadius", 0.0, 1.0, 0.001),
            TunableField::range("renderer/noiseMultiplier", 0.0, 1.0, 0.001),
            TunableField::checkbox("renderer/noiseAnimated"),
        ]
    }

    fn get_field(&self, path: &str) -> Option<TuningValue> {
        Some(match path {
            "renderer/clearColor" => TuningValue::Color(self.settings.clear_color),
            "renderer/unrealBloomThreshold" => TuningValue::Number(self.bloom.threshold()),
            "renderer/unrealBloomStrength" => TuningValue::Number(self.bloom.strength()),
            "renderer/unrealBloomRadius" => TuningValue::Number(self.bloom.radius()),
            "renderer/noiseMultiplier" => TuningValue::Number(self.final_settings.noise_multiplier),
            "renderer/noiseAnimated" => TuningValue::Bool(self.final_settings.animated),
            _ => return None,
        })
    }

    fn set_field(&mut self, path: &str, value: TuningValue) -> Result<()> {
        match path {
            "renderer/clearColor" => self.settings.clear_color = value.as_color(path)?,
            "renderer/unrealBloomThreshold" => self.bloom.set_threshold(value.as_number(path)?),
            "renderer/unrealBloomStrength" => self.bloom.set_strength(value.as_number(path)?),
            "renderer/unrealBloomRadius" => self.bloom.set_radius(value.as_number(path)?),
            "renderer/noiseMultiplier" => {
                self.final_settings.noise_multiplier = value.as_number(path)?.clamp(0.0, 1.0);
            }
            "renderer/noiseAnimated" => self.final_settings.animated = value.as_bool(path)?,
            _ => return Err(unknown_field(path)),
        }
        Ok(())
    }
}
