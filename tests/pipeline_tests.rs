//! Render Pipeline Tests
//!
//! Tests for:
//! - Pass order and presentation
//! - Draw submission for both representations
//! - Program generation on representation changes
//! - Resize propagation to every target
//! - Bloom chain and advisory GPU timing

use std::time::Duration;

use brush_particles::camera::{CameraController, CameraMode, CameraSettings};
use brush_particles::renderer::commands::{RecordingSink, RenderCommand};
use brush_particles::renderer::pipeline::RenderPipeline;
use brush_particles::renderer::settings::RendererSettings;
use brush_particles::renderer::viewport::Viewport;
use brush_particles::resources::bloom::BloomSettings;
use brush_particles::resources::final_pass::FinalPassSettings;
use brush_particles::resources::input::Input;
use brush_particles::renderer::shader::ProgramId;
use brush_particles::resources::material::{BrushMaterialUniforms, ParamValue, USE_POINTS};
use brush_particles::scene::{BrushFieldOptions, BrushTextures, DrawId, DrawRange, Representation, World};
use brush_particles::utils::Timer;

struct Harness {
    viewport: Viewport,
    camera: CameraController,
    pipeline: RenderPipeline,
    world: World,
    sink: RecordingSink,
}

impl Harness {
    fn new(settings: RendererSettings, bloom: BloomSettings) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut viewport = Viewport::new(1280, 720, 1.0, settings.pixel_ratio_range);
        let camera = CameraController::new(
            &CameraSettings {
                initial_mode: CameraMode::Scripted,
                ..Default::default()
            },
            viewport.subscribe(),
        );
        let pipeline =
            RenderPipeline::new(settings, bloom, FinalPassSettings::default(), viewport.subscribe()).unwrap();
        let options = BrushFieldOptions {
            seed: Some(9),
            ..Default::default()
        };
        Self {
            viewport,
            camera,
            pipeline,
            world: World::new(&options, BrushTextures::default()),
            sink: RecordingSink::new(),
        }
    }

    fn frame(&mut self, elapsed: f32) -> brush_particles::renderer::pipeline::FrameReport {
        self.sink.clear();
        self.camera.update(&Input::new(), 1.0 / 60.0);
        self.world.update(elapsed);
        let camera = self.camera.camera();
        self.pipeline
            .render_frame(&self.world.scene, &camera, elapsed, &mut self.sink)
    }

    /// Every base-pass draw with the program and topology bound for it.
    fn brush_draws(&self) -> Vec<(ProgramId, wgpu::PrimitiveTopology, DrawId, DrawRange)> {
        let mut bound = None;
        let mut out = Vec::new();
        for command in self.sink.commands() {
            match command {
                RenderCommand::SetProgram { program, topology } => bound = Some((*program, *topology)),
                RenderCommand::Draw { draw, range, .. } => {
                    let (program, topology) = bound.expect("draw without a bound program");
                    out.push((program, topology, *draw, *range));
                }
                _ => {}
            }
        }
        out
    }

    /// Program variant, topology and ranges agree for every submitted draw.
    fn assert_draws_consistent(&self) {
        for (program, topology, draw, range) in self.brush_draws() {
            let points = topology == wgpu::PrimitiveTopology::TriangleStrip;
            let source = &self.pipeline.shaders().program(program).unwrap().source;
            assert_eq!(source.contains("uv_rotation"), points, "program of {draw:?}");
            assert_eq!(range.indexed, !points, "range of {draw:?}");
        }
    }

    fn compiled_programs(&self) -> usize {
        self.sink
            .commands()
            .iter()
            .filter(|c| matches!(c, RenderCommand::CompileProgram { .. }))
            .count()
    }
}

fn default_harness() -> Harness {
    Harness::new(RendererSettings::default(), BloomSettings::default())
}

// ============================================================================
// Frame structure
// ============================================================================

#[test]
fn frame_runs_base_then_bloom_then_presents() {
    let mut h = default_harness();
    let report = h.frame(0.0);

    let passes = h.sink.pass_order();
    assert_eq!(passes.first(), Some(&"base"));
    assert_eq!(passes.last(), Some(&"bloom_composite"));
    assert_eq!(passes.iter().filter(|p| p.starts_with("bloom_blur")).count(), 10);
    assert!(matches!(h.sink.commands().last(), Some(RenderCommand::Present { .. })));

    assert_eq!(report.frame_index, 0);
    assert_eq!(report.draw_calls, 3);
    assert_eq!(report.drawable_size, (1280, 720));
}

#[test]
fn disabled_bloom_only_composites() {
    let mut bloom = BloomSettings::default();
    bloom.enabled = false;
    let mut h = Harness::new(RendererSettings::default(), bloom);
    h.frame(0.0);
    assert_eq!(h.sink.pass_order(), vec!["base", "bloom_composite"]);
}

#[test]
fn enabled_final_pass_runs_last() {
    let settings = RendererSettings {
        final_pass_enabled: true,
        ..Default::default()
    };
    let mut h = Harness::new(settings, BloomSettings::default());
    h.frame(0.0);
    assert_eq!(h.sink.pass_order().last(), Some(&"final"));
}

#[test]
fn frame_index_increments() {
    let mut h = default_harness();
    assert_eq!(h.frame(0.0).frame_index, 0);
    assert_eq!(h.frame(0.016).frame_index, 1);
    assert_eq!(h.pipeline.frame_index(), 2);
}

// ============================================================================
// Draws and programs
// ============================================================================

#[test]
fn point_draws_are_instanced_quads() {
    let mut h = default_harness();
    h.frame(0.0);
    let draws: Vec<_> = h.sink.draws().collect();
    assert_eq!(draws.len(), 3);
    for (_, range) in draws {
        assert_eq!(range.vertices, 4);
        assert_eq!(range.instances, 254);
        assert!(!range.indexed);
    }
}

#[test]
fn programs_are_announced_once() {
    let mut h = default_harness();
    h.frame(0.0);
    // One brush variant shared by the three items, plus the bloom programs.
    assert_eq!(h.compiled_programs(), 4);

    h.frame(0.016);
    assert_eq!(h.compiled_programs(), 0);
}

#[test]
fn switching_to_meshes_generates_the_mesh_program() {
    let mut h = default_harness();
    h.frame(0.0);

    h.world.set_use_points(false);
    h.frame(0.016);
    assert_eq!(h.compiled_programs(), 1);

    let draws: Vec<_> = h.sink.draws().collect();
    assert_eq!(draws.len(), 3);
    assert!(draws.iter().all(|(_, r)| r.indexed && r.instances == 1));
    for item in h.world.field.items() {
        assert!(!item.active_draw().needs_recompile());
    }

    // Back to points: the program is cached.
    h.world.set_use_points(true);
    h.frame(0.032);
    assert_eq!(h.compiled_programs(), 0);
}

#[test]
fn material_switch_moves_the_draw_on_next_frame() {
    let mut h = default_harness();
    h.frame(0.0);

    let item = &h.world.field.items()[0];
    let mesh_id = item.draw(Representation::Mesh).id();
    item.material().set(USE_POINTS, ParamValue::Bool(false)).unwrap();
    h.frame(0.016);

    let item = &h.world.field.items()[0];
    assert_eq!(item.active(), Representation::Mesh);
    assert!(h.world.scene.is_attached(mesh_id));
    assert!(!h.world.scene.is_attached(item.draw(Representation::Points).id()));
    assert!(!h.world.field.use_points());

    h.assert_draws_consistent();
    let draws = h.brush_draws();
    assert_eq!(draws.len(), 3);
    let (_, topology, _, _) = draws.iter().find(|(_, _, id, _)| *id == mesh_id).unwrap();
    assert_eq!(*topology, wgpu::PrimitiveTopology::TriangleList);
}

#[test]
fn unsynced_draw_still_gets_its_own_program() {
    let mut h = default_harness();
    h.world.field.items()[1]
        .material()
        .update(|m| m.set_use_points(false));

    // Render without the world update: the point draw is still attached.
    h.sink.clear();
    let camera = h.camera.camera();
    h.pipeline.render_frame(&h.world.scene, &camera, 0.0, &mut h.sink);

    h.assert_draws_consistent();
    assert!(
        h.brush_draws()
            .iter()
            .all(|(_, topology, _, _)| *topology == wgpu::PrimitiveTopology::TriangleStrip)
    );
}

#[test]
fn material_uniforms_follow_tuning() {
    use brush_particles::tuning::{Tunable, TuningValue};

    let mut h = default_harness();
    h.world.set_field("a/uSize", TuningValue::Number(12.0)).unwrap();
    h.frame(0.0);

    let material_blocks: Vec<_> = h
        .sink
        .commands()
        .iter()
        .filter_map(|c| match c {
            RenderCommand::Uniforms { label: "material", bytes, .. } => Some(bytes.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(material_blocks.len(), 3);
    let first: BrushMaterialUniforms = bytemuck::pod_read_unaligned(&material_blocks[0]);
    assert_eq!(first.size, 12.0);
}

// ============================================================================
// Resize
// ============================================================================

#[test]
fn resize_updates_every_target_before_the_next_frame() {
    let mut h = default_harness();
    h.frame(0.0);

    h.viewport.resize(1000, 500, 2.0);
    h.viewport.resize(640, 480, 3.0);
    let report = h.frame(0.016);

    // Ratio clamps to 1.5.
    assert_eq!(report.drawable_size, (960, 720));
    assert!(h.pipeline.validate_targets().is_ok());
    let generation = h.pipeline.targets().generation();
    assert!(h.pipeline.targets().iter().all(|(_, t)| t.generation == generation));

    let begin_sizes: Vec<_> = h
        .sink
        .commands()
        .iter()
        .filter_map(|c| match c {
            RenderCommand::BeginPass { pass: "base", size, .. } => Some(*size),
            _ => None,
        })
        .collect();
    assert_eq!(begin_sizes, vec![(960, 720)]);
    assert!((h.camera.projection().aspect - 640.0 / 480.0).abs() < 1e-6);
}

#[test]
fn unchanged_size_keeps_generation() {
    let mut h = default_harness();
    h.frame(0.0);
    let generation = h.pipeline.targets().generation();
    h.viewport.resize(1280, 720, 1.0);
    h.frame(0.016);
    assert_eq!(h.pipeline.targets().generation(), generation);
}

#[test]
fn frame_clock_drives_the_loop() {
    let mut h = default_harness();
    let mut timer = Timer::new();
    for _ in 0..3 {
        timer.advance(Duration::from_millis(16));
        h.frame(timer.elapsed_seconds());
    }
    assert_eq!(timer.frame_count, 3);
    assert_eq!(h.pipeline.frame_index(), 3);
    assert!((timer.elapsed_seconds() - 0.048).abs() < 1e-6);
}

// ============================================================================
// GPU timing
// ============================================================================

#[test]
fn gpu_time_is_advisory() {
    let mut h = default_harness();
    assert_eq!(h.frame(0.0).gpu_time, None);

    h.sink.set_gpu_time(Some(Duration::from_micros(1500)));
    let report = h.frame(0.016);
    assert_eq!(report.gpu_time, Some(Duration::from_micros(1500)));
    assert_eq!(h.frame(0.032).gpu_time, None);
}
