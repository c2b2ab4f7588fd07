//! Render Target Pool
//!
//! Every intermediate target of the pipeline lives in one [`TargetPool`].
//! A target is described once (format, usage, resolution divisor) and its
//! size is always derived from the pool's drawable size:
//!
//! ```text
//! size = max(1, drawable / divisor)
//! ```
//!
//! [`TargetPool::resize`] rewrites every target in the same call, so there is
//! no state in which some targets carry the old size and others the new one.

use slotmap::{SlotMap, new_key_type};

use crate::errors::{BrushError, Result};

new_key_type! {
    /// Handle to a target in a [`TargetPool`].
    pub struct TargetId;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetDesc {
    pub label: &'static str,
    pub format: wgpu::TextureFormat,
    pub usage: wgpu::TextureUsages,
    /// Resolution divisor: 1 = full size, 2 = half, ...
    pub divisor: u32,
}

impl TargetDesc {
    #[must_use]
    pub fn color(label: &'static str, format: wgpu::TextureFormat, divisor: u32) -> Self {
        Self {
            label,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            divisor: divisor.max(1),
        }
    }

    #[must_use]
    pub fn depth(label: &'static str, format: wgpu::TextureFormat) -> Self {
        Self {
            label,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            divisor: 1,
        }
    }

    #[must_use]
    pub fn size_for(&self, drawable: (u32, u32)) -> (u32, u32) {
        ((drawable.0 / self.divisor).max(1), (drawable.1 / self.divisor).max(1))
    }
}

#[derive(Debug, Clone)]
pub struct RenderTarget {
    pub desc: TargetDesc,
    pub width: u32,
    pub height: u32,
    /// Pool generation this size was computed in.
    pub generation: u64,
}

impl RenderTarget {
    #[inline]
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

#[derive(Debug)]
pub struct TargetPool {
    targets: SlotMap<TargetId, RenderTarget>,
    drawable: (u32, u32),
    generation: u64,
}

impl TargetPool {
    #[must_use]
    pub fn new(drawable: (u32, u32)) -> Self {
        Self {
            targets: SlotMap::with_key(),
            drawable: (drawable.0.max(1), drawable.1.max(1)),
            generation: 0,
        }
    }

    pub fn create(&mut self, desc: TargetDesc) -> TargetId {
        let (width, height) = desc.size_for(self.drawable);
        self.targets.insert(RenderTarget {
            desc,
            width,
            height,
            generation: self.generation,
        })
    }

    #[must_use]
    pub fn get(&self, id: TargetId) -> Option<&RenderTarget> {
        self.targets.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (TargetId, &RenderTarget)> {
        self.targets.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    #[must_use]
    pub fn drawable_size(&self) -> (u32, u32) {
        self.drawable
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Resizes every target. Returns `false` when the size did not change.
    pub fn resize(&mut self, drawable: (u32, u32)) -> bool {
        let drawable = (drawable.0.max(1), drawable.1.max(1));
        if drawable == self.drawable {
            return false;
        }
        self.drawable = drawable;
        self.generation += 1;
        for target in self.targets.values_mut() {
            let (width, height) = target.desc.size_for(drawable);
            target.width = width;
            target.height = height;
            target.generation = self.generation;
        }
        log::debug!(
            "Resized {} render targets to {}x{} (generation {})",
            self.targets.len(),
            drawable.0,
            drawable.1,
            self.generation
        );
        true
    }

    /// Checks that `id` has the size the current drawable implies.
    pub fn validate(&self, id: TargetId, pass: &str) -> Result<()> {
        let target = self
            .targets
            .get(id)
            .ok_or_else(|| BrushError::Configuration(format!("pass '{pass}' uses a released target")))?;
        let expected = target.desc.size_for(self.drawable);
        if target.size() != expected {
            return Err(BrushError::TargetSizeMismatch {
                pass: pass.to_string(),
                target: target.desc.label.to_string(),
                expected,
                actual: target.size(),
            });
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn force_size(&mut self, id: TargetId, size: (u32, u32)) {
        if let Some(target) = self.targets.get_mut(id) {
            target.width = size.0;
            target.height = size.1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resize_updates_every_target() {
        let mut pool = TargetPool::new((800, 600));
        let full = pool.create(TargetDesc::color("full", wgpu::TextureFormat::Rgba16Float, 1));
        let quarter = pool.create(TargetDesc::color("quarter", wgpu::TextureFormat::Rgba16Float, 4));

        assert!(pool.resize((1920, 1080)));
        assert_eq!(pool.get(full).unwrap().size(), (1920, 1080));
        assert_eq!(pool.get(quarter).unwrap().size(), (480, 270));
        assert!(pool.iter().all(|(_, t)| t.generation == pool.generation()));
        assert!(!pool.resize((1920, 1080)));
    }

    #[test]
    fn tiny_drawable_keeps_targets_non_empty() {
        let mut pool = TargetPool::new((0, 0));
        let mip = pool.create(TargetDesc::color("mip", wgpu::TextureFormat::Rgba16Float, 32));
        assert_eq!(pool.get(mip).unwrap().size(), (1, 1));
    }

    #[test]
    fn validate_reports_stale_size() {
        let mut pool = TargetPool::new((800, 600));
        let id = pool.create(TargetDesc::color("scene_color", wgpu::TextureFormat::Rgba16Float, 1));
        pool.force_size(id, (640, 480));
        let err = pool.validate(id, "base").unwrap_err();
        assert!(matches!(
            err,
            BrushError::TargetSizeMismatch { expected: (800, 600), actual: (640, 480), .. }
        ));
    }
}
