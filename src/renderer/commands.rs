//! Render command stream.
//!
//! Passes never talk to a GPU API directly. They emit [`RenderCommand`]s into
//! a [`CommandSink`]; a wgpu backend replays them onto a command encoder,
//! while [`RecordingSink`] keeps them in memory for inspection.

use std::time::Duration;

use glam::Mat4;
use uuid::Uuid;

use crate::renderer::shader::ProgramId;
use crate::renderer::targets::TargetId;
use crate::scene::draw::{DrawId, DrawRange};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoadOp {
    Clear([f32; 4]),
    Load,
}

/// A texture bound for sampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureSource {
    /// Intermediate target of this pipeline.
    Target(TargetId),
    /// Asset texture, resolved by the backend.
    Asset(Uuid),
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    BeginPass {
        pass: &'static str,
        color: TargetId,
        depth: Option<TargetId>,
        size: (u32, u32),
        load: LoadOp,
    },
    EndPass,
    /// A new program the backend must build before it is first bound.
    CompileProgram {
        program: ProgramId,
        label: &'static str,
        source: std::sync::Arc<str>,
    },
    SetProgram {
        program: ProgramId,
        topology: wgpu::PrimitiveTopology,
    },
    /// Uniform block contents, bound at `group`.
    Uniforms {
        group: u32,
        label: &'static str,
        bytes: Vec<u8>,
    },
    BindTexture {
        slot: u32,
        source: TextureSource,
    },
    Draw {
        draw: DrawId,
        range: DrawRange,
        world: Mat4,
    },
    /// One fullscreen triangle.
    Fullscreen,
    Present {
        source: TargetId,
        size: (u32, u32),
    },
}

/// Receiver of the per-frame command stream.
pub trait CommandSink {
    fn submit(&mut self, command: RenderCommand);

    /// Latest GPU frame time, if the backend has one ready.
    ///
    /// Advisory: results may lag by several frames, and `None` (no query
    /// support, result pending, query failed) is always acceptable.
    fn poll_gpu_time(&mut self) -> Option<Duration> {
        None
    }
}

/// In-memory sink.
#[derive(Debug, Default)]
pub struct RecordingSink {
    commands: Vec<RenderCommand>,
    gpu_time: Option<Duration>,
}

impl RecordingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next [`CommandSink::poll_gpu_time`] return `time`.
    pub fn set_gpu_time(&mut self, time: Option<Duration>) {
        self.gpu_time = time;
    }

    #[must_use]
    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    pub fn take(&mut self) -> Vec<RenderCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Pass names in the order their `BeginPass` was recorded.
    #[must_use]
    pub fn pass_order(&self) -> Vec<&'static str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                RenderCommand::BeginPass { pass, .. } => Some(*pass),
                _ => None,
            })
            .collect()
    }

    pub fn draws(&self) -> impl Iterator<Item = (DrawId, DrawRange)> + '_ {
        self.commands.iter().filter_map(|c| match c {
            RenderCommand::Draw { draw, range, .. } => Some((*draw, *range)),
            _ => None,
        })
    }
}

impl CommandSink for RecordingSink {
    fn submit(&mut self, command: RenderCommand) {
        self.commands.push(command);
    }

    fn poll_gpu_time(&mut self) -> Option<Duration> {
        self.gpu_time.take()
    }
}
