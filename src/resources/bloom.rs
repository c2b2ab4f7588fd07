//! Bloom Post-Processing Configuration
//!
//! Pure data for the bloom pass. The technique is the classic "Unreal" bloom:
//!
//! 1. A luminosity high-pass keeps pixels brighter than `threshold`, with a
//!    short smoothstep ramp of width [`HIGH_PASS_SMOOTH_WIDTH`].
//! 2. The result is blurred down a chain of [`MIP_COUNT`] half-resolution
//!    targets with separable Gaussian kernels of growing radius.
//! 3. The mips are combined with per-mip weights that `radius` bends between
//!    a tight and a wide falloff, scaled by `strength`, and added on top of
//!    the scene color.
//!
//! Defaults are `{ threshold: 0, strength: 1, radius: 0 }`.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Number of blur mips.
pub const MIP_COUNT: usize = 5;

/// Gaussian kernel radius (in texels) for each mip.
pub const KERNEL_RADII: [u32; MIP_COUNT] = [3, 5, 7, 9, 11];

/// Base contribution of each mip before `radius` is applied.
pub const BLOOM_FACTORS: [f32; MIP_COUNT] = [1.0, 0.8, 0.6, 0.4, 0.2];

pub const HIGH_PASS_SMOOTH_WIDTH: f32 = 0.01;

pub const MAX_STRENGTH: f32 = 3.0;

/// GPU uniform data for the high-pass shader.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct HighPassUniforms {
    pub threshold: f32,
    pub smooth_width: f32,
    pub(crate) __pad: [f32; 2],
}

/// GPU uniform data for the composite shader.
///
/// Each weight is `strength * lerp(factor, 1.2 - factor, radius)`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct BloomCompositeUniforms {
    pub weights: [f32; 8],
}

/// Bloom post-processing configuration.
///
/// ```rust,ignore
/// pipeline.bloom_mut().set_strength(1.5);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BloomSettings {
    /// Whether the bloom pass runs at all.
    pub enabled: bool,
    threshold: f32,
    strength: f32,
    radius: f32,

    #[serde(skip)]
    version: u64,
}

impl Default for BloomSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: 0.0,
            strength: 1.0,
            radius: 0.0,
            version: 0,
        }
    }
}

impl BloomSettings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Luminance threshold of the high-pass, in `[0, 1]`.
    #[inline]
    #[must_use]
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    #[inline]
    #[must_use]
    pub fn strength(&self) -> f32 {
        self.strength
    }

    #[inline]
    #[must_use]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Bumped by every setter; the pass re-uploads its uniforms on change.
    #[inline]
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn set_threshold(&mut self, threshold: f32) {
        self.threshold = sanitize(threshold, 1.0);
        self.version += 1;
    }

    pub fn set_strength(&mut self, strength: f32) {
        self.strength = sanitize(strength, MAX_STRENGTH);
        self.version += 1;
    }

    /// Blend between tight (`0`) and wide (`1`) bloom.
    pub fn set_radius(&mut self, radius: f32) {
        self.radius = sanitize(radius, 1.0);
        self.version += 1;
    }

    /// Per-mip composite weights, strength included.
    #[must_use]
    pub fn mip_weights(&self) -> [f32; MIP_COUNT] {
        BLOOM_FACTORS.map(|factor| {
            let mirrored = 1.2 - factor;
            self.strength * (factor + (mirrored - factor) * self.radius)
        })
    }

    #[must_use]
    pub fn high_pass_uniforms(&self) -> HighPassUniforms {
        HighPassUniforms {
            threshold: self.threshold,
            smooth_width: HIGH_PASS_SMOOTH_WIDTH,
            __pad: [0.0; 2],
        }
    }

    #[must_use]
    pub fn composite_uniforms(&self) -> BloomCompositeUniforms {
        let mut weights = [0.0; 8];
        weights[..MIP_COUNT].copy_from_slice(&self.mip_weights());
        BloomCompositeUniforms { weights }
    }
}

fn sanitize(value: f32, max: f32) -> f32 {
    let clamped = if value.is_nan() { 0.0 } else { value.clamp(0.0, max) };
    if clamped != value {
        log::warn!("Bloom value {value} out of range, clamped to {clamped}");
    }
    clamped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_radius_uses_plain_factors() {
        let bloom = BloomSettings::default();
        assert_eq!(bloom.mip_weights(), BLOOM_FACTORS);
    }

    #[test]
    fn full_radius_mirrors_factors() {
        let mut bloom = BloomSettings::default();
        bloom.set_radius(1.0);
        let weights = bloom.mip_weights();
        assert!((weights[0] - 0.2).abs() < 1e-6);
        assert!((weights[4] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn setters_clamp_and_bump_version() {
        let mut bloom = BloomSettings::default();
        let v = bloom.version();
        bloom.set_threshold(-3.0);
        bloom.set_strength(f32::NAN);
        assert_eq!(bloom.threshold(), 0.0);
        assert_eq!(bloom.strength(), 0.0);
        assert_eq!(bloom.version(), v + 2);
    }
}
