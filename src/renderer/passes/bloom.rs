//! Unreal-style bloom.
//!
//! ```text
//! scene_color ─ high pass ─► bright (1/2)
//!   bright ─ blur H ─► h0 ─ blur V ─► v0          (1/2)
//!       v0 ─ blur H ─► h1 ─ blur V ─► v1          (1/4)
//!       ...                           v4          (1/32)
//! scene_color + Σ weight_i · v_i ─ composite ─► post_color
//! ```
//!
//! With bloom disabled only the composite runs, with every weight at zero,
//! so `post_color` always holds the frame.

use bytemuck::{Pod, Zeroable};

use crate::renderer::commands::{CommandSink, LoadOp, RenderCommand, TextureSource};
use crate::renderer::node::{FrameContext, RenderNode};
use crate::renderer::settings::HDR_FORMAT;
use crate::renderer::shader::{ProgramId, ShaderManager};
use crate::renderer::targets::{TargetDesc, TargetId, TargetPool};
use crate::resources::bloom::{BloomCompositeUniforms, KERNEL_RADII, MIP_COUNT};
use crate::resources::shader_defines::ShaderDefines;

const HIGH_PASS_TEMPLATE: &str = "bloom_high_pass";
const BLUR_TEMPLATE: &str = "bloom_blur";
const COMPOSITE_TEMPLATE: &str = "bloom_composite";

const MAX_KERNEL_TAPS: usize = 12;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct BlurUniforms {
    pub direction: [f32; 2],
    pub inv_size: [f32; 2],
    pub radius: u32,
    pub _pad: [u32; 3],
    pub weights: [f32; MAX_KERNEL_TAPS],
}

/// Normalised Gaussian PDF at `x` for deviation `sigma`.
#[must_use]
pub fn gaussian(x: f32, sigma: f32) -> f32 {
    0.398_94 * (-0.5 * x * x / (sigma * sigma)).exp() / sigma
}

/// Kernel taps `0..=radius`; the deviation equals the radius.
#[must_use]
pub fn kernel_weights(radius: u32) -> [f32; MAX_KERNEL_TAPS] {
    let radius = radius.min(MAX_KERNEL_TAPS as u32 - 1);
    let sigma = radius.max(1) as f32;
    let mut weights = [0.0; MAX_KERNEL_TAPS];
    for (i, w) in weights.iter_mut().enumerate().take(radius as usize + 1) {
        *w = gaussian(i as f32, sigma);
    }
    weights
}

#[derive(Debug, Default)]
struct Programs {
    high_pass: Option<ProgramId>,
    blur: Option<ProgramId>,
    composite: Option<ProgramId>,
}

#[derive(Debug)]
pub struct BloomPass {
    input: TargetId,
    bright: TargetId,
    horizontal: [TargetId; MIP_COUNT],
    vertical: [TargetId; MIP_COUNT],
    output: TargetId,
    programs: Programs,
}

impl BloomPass {
    /// Allocates the bright target, both blur chains and `post_color`.
    pub fn new(pool: &mut TargetPool, input: TargetId) -> Self {
        let bright = pool.create(TargetDesc::color("bloom_bright", HDR_FORMAT, 2));
        let horizontal: [TargetId; MIP_COUNT] =
            std::array::from_fn(|i| pool.create(TargetDesc::color("bloom_blur_h", HDR_FORMAT, 2 << i)));
        let vertical: [TargetId; MIP_COUNT] =
            std::array::from_fn(|i| pool.create(TargetDesc::color("bloom_blur_v", HDR_FORMAT, 2 << i)));
        let output = pool.create(TargetDesc::color("post_color", HDR_FORMAT, 1));
        Self {
            input,
            bright,
            horizontal,
            vertical,
            output,
            programs: Programs::default(),
        }
    }

    #[must_use]
    pub fn output(&self) -> TargetId {
        self.output
    }

    /// Vertical-blur result of each mip, finest first.
    #[must_use]
    pub fn mips(&self) -> &[TargetId; MIP_COUNT] {
        &self.vertical
    }

    fn compile(shaders: &mut ShaderManager, template: &'static str) -> Option<ProgramId> {
        shaders
            .get_or_compile(template, &ShaderDefines::new())
            .map_err(|err| log::warn!("Bloom program '{template}' unavailable: {err}"))
            .ok()
    }

    fn fullscreen(
        sink: &mut dyn CommandSink,
        ctx: &FrameContext,
        pass: &'static str,
        program: ProgramId,
        target: TargetId,
        uniforms: &[u8],
        sources: &[TargetId],
    ) {
        sink.submit(RenderCommand::BeginPass {
            pass,
            color: target,
            depth: None,
            size: ctx.target_size(target),
            load: LoadOp::Clear([0.0; 4]),
        });
        sink.submit(RenderCommand::SetProgram {
            program,
            topology: wgpu::PrimitiveTopology::TriangleList,
        });
        sink.submit(RenderCommand::Uniforms {
            group: 0,
            label: pass,
            bytes: uniforms.to_vec(),
        });
        for (slot, source) in (1u32..).zip(sources) {
            sink.submit(RenderCommand::BindTexture {
                slot,
                source: TextureSource::Target(*source),
            });
        }
        sink.submit(RenderCommand::Fullscreen);
        sink.submit(RenderCommand::EndPass);
    }

    fn blur_uniforms(ctx: &FrameContext, source: TargetId, direction: [f32; 2], radius: u32) -> BlurUniforms {
        let (width, height) = ctx.target_size(source);
        BlurUniforms {
            direction,
            inv_size: [1.0 / width as f32, 1.0 / height as f32],
            radius,
            _pad: [0; 3],
            weights: kernel_weights(radius),
        }
    }
}

impl RenderNode for BloomPass {
    fn name(&self) -> &'static str {
        "bloom"
    }

    fn reads(&self) -> Vec<TargetId> {
        vec![self.input]
    }

    fn writes(&self) -> Vec<TargetId> {
        let mut writes = vec![self.bright];
        writes.extend(self.horizontal);
        writes.extend(self.vertical);
        writes.push(self.output);
        writes
    }

    fn prepare(&mut self, ctx: &FrameContext, shaders: &mut ShaderManager) {
        if self.programs.composite.is_none() {
            self.programs.composite = Self::compile(shaders, COMPOSITE_TEMPLATE);
        }
        if ctx.bloom.enabled {
            if self.programs.high_pass.is_none() {
                self.programs.high_pass = Self::compile(shaders, HIGH_PASS_TEMPLATE);
            }
            if self.programs.blur.is_none() {
                self.programs.blur = Self::compile(shaders, BLUR_TEMPLATE);
            }
        }
    }

    fn run(&self, ctx: &FrameContext, sink: &mut dyn CommandSink) {
        let Some(composite) = self.programs.composite else {
            return;
        };

        let blur_chain = match (ctx.bloom.enabled, self.programs.high_pass, self.programs.blur) {
            (true, Some(high_pass), Some(blur)) => Some((high_pass, blur)),
            _ => None,
        };

        let Some((high_pass, blur)) = blur_chain else {
            let uniforms = BloomCompositeUniforms::zeroed();
            Self::fullscreen(
                sink,
                ctx,
                "bloom_composite",
                composite,
                self.output,
                bytemuck::bytes_of(&uniforms),
                &[self.input],
            );
            return;
        };

        let high = ctx.bloom.high_pass_uniforms();
        Self::fullscreen(
            sink,
            ctx,
            "bloom_high_pass",
            high_pass,
            self.bright,
            bytemuck::bytes_of(&high),
            &[self.input],
        );

        let mut source = self.bright;
        for (i, radius) in KERNEL_RADII.iter().copied().enumerate() {
            let h = Self::blur_uniforms(ctx, source, [1.0, 0.0], radius);
            Self::fullscreen(
                sink,
                ctx,
                "bloom_blur_h",
                blur,
                self.horizontal[i],
                bytemuck::bytes_of(&h),
                &[source],
            );
            let v = Self::blur_uniforms(ctx, self.horizontal[i], [0.0, 1.0], radius);
            Self::fullscreen(
                sink,
                ctx,
                "bloom_blur_v",
                blur,
                self.vertical[i],
                bytemuck::bytes_of(&v),
                &[self.horizontal[i]],
            );
            source = self.vertical[i];
        }

        let uniforms = ctx.bloom.composite_uniforms();
        let mut sources = vec![self.input];
        sources.extend(self.vertical);
        Self::fullscreen(
            sink,
            ctx,
            "bloom_composite",
            composite,
            self.output,
            bytemuck::bytes_of(&uniforms),
            &sources,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kernel_peaks_at_center_and_stops_at_radius() {
        let w = kernel_weights(3);
        assert!(w[0] > w[1] && w[1] > w[2] && w[2] > w[3]);
        assert!(w[3] > 0.0);
        assert!(w[4..].iter().all(|&x| x == 0.0));
        assert!((w[0] - 0.398_94 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn widest_kernel_fits_uniform_block() {
        let w = kernel_weights(11);
        assert!(w.iter().all(|&x| x > 0.0));
        assert_eq!(std::mem::size_of::<BlurUniforms>(), 80);
    }

    #[test]
    fn mip_chain_halves_each_level() {
        let mut pool = TargetPool::new((1024, 512));
        let input = pool.create(TargetDesc::color("scene_color", HDR_FORMAT, 1));
        let bloom = BloomPass::new(&mut pool, input);
        let sizes: Vec<_> = bloom.mips().iter().map(|&id| pool.get(id).unwrap().size()).collect();
        assert_eq!(sizes, vec![(512, 256), (256, 128), (128, 64), (64, 32), (32, 16)]);
    }
}
