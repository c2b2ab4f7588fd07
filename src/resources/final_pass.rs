//! Final color-grade pass configuration.
//!
//! Film-grain noise, a radial RGB split and a flat overlay tint. The noise is
//! seeded by `time`, which only advances while `animated` is set; switching
//! animation off holds the last value so the grain freezes instead of jumping.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use crate::resources::color::Color;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct FinalPassUniforms {
    /// rgb + alpha
    pub overlay: [f32; 4],
    pub time: f32,
    pub noise_multiplier: f32,
    pub rgb_offset_multiplier: f32,
    pub rgb_offset_offset: f32,
    pub rgb_offset_power: f32,
    pub(crate) __pad: [f32; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FinalPassSettings {
    pub animated: bool,
    pub noise_multiplier: f32,
    pub rgb_offset_multiplier: f32,
    pub rgb_offset_offset: f32,
    pub rgb_offset_power: f32,
    pub overlay_color: Color,
    pub overlay_alpha: f32,

    #[serde(skip)]
    time: f32,
}

impl Default for FinalPassSettings {
    fn default() -> Self {
        Self {
            animated: true,
            noise_multiplier: 0.05,
            rgb_offset_multiplier: 0.3,
            rgb_offset_offset: 0.1,
            rgb_offset_power: 2.0,
            overlay_color: Color::from_hex(0x00_0d_08),
            overlay_alpha: 1.0,
            time: 0.0,
        }
    }
}

impl FinalPassSettings {
    /// Time value the noise is currently seeded with.
    #[must_use]
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Feeds the frame clock. Ignored while not animated.
    pub fn advance(&mut self, elapsed_seconds: f32) {
        if self.animated {
            self.time = elapsed_seconds;
        }
    }

    #[must_use]
    pub fn uniforms(&self) -> FinalPassUniforms {
        FinalPassUniforms {
            overlay: self.overlay_color.extend(self.overlay_alpha.clamp(0.0, 1.0)).to_array(),
            time: self.time,
            noise_multiplier: self.noise_multiplier,
            rgb_offset_multiplier: self.rgb_offset_multiplier,
            rgb_offset_offset: self.rgb_offset_offset,
            rgb_offset_power: self.rgb_offset_power,
            __pad: [0.0; 3],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_holds_while_not_animated() {
        let mut settings = FinalPassSettings::default();
        settings.advance(1.5);
        settings.animated = false;
        settings.advance(9.0);
        assert_eq!(settings.time(), 1.5);
        settings.animated = true;
        settings.advance(9.5);
        assert_eq!(settings.time(), 9.5);
    }
}
