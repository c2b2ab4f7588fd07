//! Vertex welding and per-vertex attribute generation.
//!
//! [`GeometryProcessor`] runs once per imported mesh at load time. It merges
//! vertices whose quantised attributes are identical and assigns every
//! surviving vertex a random footprint rotation in `[0, 2π)`.
//!
//! # Key construction
//!
//! Every component of every attribute (morph targets included) is scaled by
//! `10^log10(1 / tolerance)`, rounded and stored as an `i64`. The fixed-width
//! key is hashed with `FxHashMap`. The first vertex producing a key survives
//! and keeps its attributes verbatim; later vertices with the same key only
//! redirect their index to it. Distinct attributes that happen to share a
//! key are therefore merged silently. The `uvRotation` attribute is derived
//! data and never takes part in the key; welding copies it from the survivor
//! like any other attribute and [`GeometryProcessor::process`] redraws it.

use std::f32::consts::TAU;

use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::errors::{BrushError, Result};
use crate::resources::geometry::{Geometry, UV_ROTATION, VertexAttribute};

/// Default welding tolerance.
pub const DEFAULT_TOLERANCE: f32 = 1e-4;

type VertexKey = SmallVec<[i64; 16]>;

/// Summary of one weld run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WeldStats {
    pub input_vertices: usize,
    pub output_vertices: usize,
    /// Index entries redirected to an earlier survivor.
    pub merged: usize,
}

/// Load-time geometry processor.
#[derive(Debug, Clone)]
pub struct GeometryProcessor {
    tolerance: f32,
    seed: Option<u64>,
}

impl Default for GeometryProcessor {
    fn default() -> Self {
        Self::new(DEFAULT_TOLERANCE)
    }
}

impl GeometryProcessor {
    /// Creates a processor. The tolerance is clamped to `f32::EPSILON`.
    #[must_use]
    pub fn new(tolerance: f32) -> Self {
        let clamped = if tolerance.is_finite() {
            tolerance.max(f32::EPSILON)
        } else {
            DEFAULT_TOLERANCE
        };
        if clamped != tolerance {
            log::warn!("Weld tolerance {tolerance} is not usable, using {clamped}");
        }
        Self {
            tolerance: clamped,
            seed: None,
        }
    }

    /// Fixes the seed of the `uvRotation` draws.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    #[inline]
    #[must_use]
    pub fn tolerance(&self) -> f32 {
        self.tolerance
    }

    /// Welds `input` and appends a `uvRotation` attribute to the result.
    pub fn process(&self, input: &Geometry) -> Result<Geometry> {
        let (mut output, stats) = self.weld_with_stats(input)?;
        let mut rng = StdRng::seed_from_u64(self.seed.unwrap_or_else(rand::random));
        assign_uv_rotation(&mut output, &mut rng);
        log::debug!(
            "Processed geometry {}: {} -> {} vertices ({} merged)",
            input.uuid,
            stats.input_vertices,
            stats.output_vertices,
            stats.merged
        );
        Ok(output)
    }

    /// Welds `input` without generating any attribute.
    pub fn weld(&self, input: &Geometry) -> Result<Geometry> {
        self.weld_with_stats(input).map(|(geo, _)| geo)
    }

    pub fn weld_with_stats(&self, input: &Geometry) -> Result<(Geometry, WeldStats)> {
        let vertex_count = input.vertex_count();
        if vertex_count == 0 {
            return Ok((Geometry::new(), WeldStats::default()));
        }
        input.validate()?;

        let multiplier = 10f64.powf((1.0 / f64::from(self.tolerance)).log10());

        // Stable name order. uvRotation is copied but never part of the key.
        let attrs: Vec<(&str, &VertexAttribute)> = input.attributes().collect();
        let morphs: Vec<(&str, &[VertexAttribute])> = input.morph_attributes().collect();

        let mut out_attrs: Vec<VertexAttribute> =
            attrs.iter().map(|(_, a)| a.empty_like(vertex_count)).collect();
        let mut out_morphs: Vec<Vec<VertexAttribute>> = morphs
            .iter()
            .map(|(_, targets)| targets.iter().map(|t| t.empty_like(vertex_count)).collect())
            .collect();

        let element_count = input.element_count();
        let mut seen: FxHashMap<VertexKey, u32> = FxHashMap::default();
        seen.reserve(vertex_count);
        let mut new_indices = Vec::with_capacity(element_count);
        let mut key = VertexKey::new();
        let mut merged = 0;

        for element in 0..element_count {
            let vertex = match input.indices() {
                Some(indices) => indices[element] as usize,
                None => element,
            };
            if vertex >= vertex_count {
                return Err(BrushError::InvalidGeometry {
                    index: vertex as u32,
                    vertex_count,
                });
            }

            key.clear();
            for (_, attr) in attrs.iter().filter(|(name, _)| *name != UV_ROTATION) {
                attr.push_quantized(vertex, multiplier, &mut key);
            }
            for (_, targets) in &morphs {
                for target in *targets {
                    target.push_quantized(vertex, multiplier, &mut key);
                }
            }

            if let Some(&survivor) = seen.get(&key) {
                new_indices.push(survivor);
                merged += 1;
                continue;
            }

            let next = seen.len() as u32;
            for ((_, src), dst) in attrs.iter().zip(out_attrs.iter_mut()) {
                src.copy_vertex_into(vertex, dst);
            }
            for ((_, targets), dst_targets) in morphs.iter().zip(out_morphs.iter_mut()) {
                for (src, dst) in targets.iter().zip(dst_targets.iter_mut()) {
                    src.copy_vertex_into(vertex, dst);
                }
            }
            seen.insert(key.clone(), next);
            new_indices.push(next);
        }

        let mut output = Geometry::new();
        for ((name, _), attr) in attrs.iter().zip(out_attrs) {
            output.set_attribute(name, attr);
        }
        for ((name, _), targets) in morphs.iter().zip(out_morphs) {
            for target in targets {
                output.add_morph_attribute(name, target);
            }
        }
        output.set_indices(new_indices);

        let stats = WeldStats {
            input_vertices: vertex_count,
            output_vertices: output.vertex_count(),
            merged,
        };
        Ok((output, stats))
    }
}

/// Draws one independent rotation in `[0, 2π)` per vertex of `geometry`.
pub fn assign_uv_rotation(geometry: &mut Geometry, rng: &mut StdRng) {
    let rotations = (0..geometry.vertex_count())
        .map(|_| {
            let r: f32 = rng.random_range(0.0..TAU);
            // Float rounding may land exactly on the open bound.
            if r < TAU { r } else { 0.0 }
        })
        .collect();
    geometry.set_attribute(UV_ROTATION, VertexAttribute::from_scalars(rotations));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::geometry::{POSITION, UV};

    fn quad_soup() -> Geometry {
        // Two triangles sharing an edge, stored without an index buffer.
        let mut geo = Geometry::new();
        geo.set_attribute(
            POSITION,
            VertexAttribute::from_items(&[
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 1.0, 0.0],
            ]),
        );
        geo
    }

    #[test]
    fn non_indexed_input_uses_array_order() {
        let out = GeometryProcessor::default().weld(&quad_soup()).unwrap();
        assert_eq!(out.vertex_count(), 4);
        assert_eq!(out.indices(), Some(&[0, 1, 2, 0, 2, 3][..]));
    }

    #[test]
    fn survivor_keeps_first_seen_values() {
        let mut geo = Geometry::new();
        geo.set_attribute(
            POSITION,
            VertexAttribute::from_items(&[[0.5, 0.0, 0.0], [0.500_01, 0.0, 0.0], [0.0, 1.0, 0.0]]),
        );
        geo.set_indices(vec![1, 0, 2]);
        let out = GeometryProcessor::default().weld(&geo).unwrap();
        assert_eq!(out.vertex_count(), 2);
        let first = out.attribute(POSITION).unwrap().read_vec3(0).unwrap();
        assert!((first.x - 0.500_01).abs() < f32::EPSILON);
    }

    #[test]
    fn tolerance_is_clamped() {
        assert_eq!(GeometryProcessor::new(0.0).tolerance(), f32::EPSILON);
        assert_eq!(GeometryProcessor::new(f32::NAN).tolerance(), DEFAULT_TOLERANCE);
    }

    #[test]
    fn coarse_tolerance_merges_more() {
        let mut geo = quad_soup();
        geo.set_attribute(
            UV,
            VertexAttribute::from_items(&[
                [0.0, 0.0],
                [0.31, 0.0],
                [0.31, 0.3],
                [0.0, 0.0],
                [0.3, 0.3],
                [0.0, 0.3],
            ]),
        );
        let fine = GeometryProcessor::new(1e-4).weld(&geo).unwrap();
        let coarse = GeometryProcessor::new(0.1).weld(&geo).unwrap();
        assert_eq!(fine.vertex_count(), 5);
        assert_eq!(coarse.vertex_count(), 4);
    }

    #[test]
    fn rotation_draws_are_seeded() {
        let p = GeometryProcessor::default().with_seed(7);
        let a = p.process(&quad_soup()).unwrap();
        let b = p.process(&quad_soup()).unwrap();
        assert_eq!(a.attribute(UV_ROTATION), b.attribute(UV_ROTATION));
    }
}
