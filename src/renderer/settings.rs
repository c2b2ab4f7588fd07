//! Renderer Settings
//!
//! Construction-time configuration of the [`RenderPipeline`](super::pipeline::RenderPipeline).
//!
//! ```rust,ignore
//! let settings = RendererSettings {
//!     final_pass_enabled: true,
//!     ..Default::default()
//! };
//! ```

use serde::{Deserialize, Serialize};

use crate::resources::color::Color;

/// Color format of the scene and post-processing targets.
pub const HDR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

/// Depth format of the base pass.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RendererSettings {
    /// Background of the base pass.
    pub clear_color: Color,

    /// Bounds for the device pixel ratio.
    ///
    /// High-density displays are rendered at most at `pixel_ratio_range[1]`
    /// physical pixels per CSS pixel.
    ///
    /// Default: `[1.0, 1.5]`
    pub pixel_ratio_range: [f32; 2],

    /// Runs the noise/color-grade pass after bloom.
    ///
    /// Default: `false`
    pub final_pass_enabled: bool,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            clear_color: Color::from_hex(0x0f_09_14),
            pixel_ratio_range: [1.0, 1.5],
            final_pass_enabled: false,
        }
    }
}
