//! CPU-side indexed geometry.
//!
//! A [`Geometry`] is a set of named, equally sized vertex attributes plus an
//! optional triangle index buffer. It carries no GPU state: the renderer reads
//! the attribute bytes through [`VertexAttribute::as_bytes`] when it builds its
//! vertex buffers.

use std::collections::BTreeMap;

use glam::{Affine3A, Vec3};
use smallvec::SmallVec;
use uuid::Uuid;
use wgpu::VertexFormat;

use crate::errors::{BrushError, Result};

/// Well-known attribute names.
pub const POSITION: &str = "position";
pub const NORMAL: &str = "normal";
pub const UV: &str = "uv";
/// Per-vertex footprint rotation assigned by the geometry processor.
pub const UV_ROTATION: &str = "uvRotation";

/// Raw component storage of a vertex attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValues {
    Float32(Vec<f32>),
    Uint16(Vec<u16>),
    Uint32(Vec<u32>),
}

impl AttributeValues {
    fn len(&self) -> usize {
        match self {
            Self::Float32(v) => v.len(),
            Self::Uint16(v) => v.len(),
            Self::Uint32(v) => v.len(),
        }
    }

    fn empty_like(&self, capacity: usize) -> Self {
        match self {
            Self::Float32(_) => Self::Float32(Vec::with_capacity(capacity)),
            Self::Uint16(_) => Self::Uint16(Vec::with_capacity(capacity)),
            Self::Uint32(_) => Self::Uint32(Vec::with_capacity(capacity)),
        }
    }
}

/// A single named vertex attribute: `item_size` components per vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexAttribute {
    pub item_size: usize,
    pub values: AttributeValues,
}

impl VertexAttribute {
    /// Builds a float attribute from fixed-size items (`[f32; 3]` positions, ...).
    #[must_use]
    pub fn from_items<const N: usize>(items: &[[f32; N]]) -> Self {
        Self {
            item_size: N,
            values: AttributeValues::Float32(items.iter().flatten().copied().collect()),
        }
    }

    /// Builds a one-component float attribute.
    #[must_use]
    pub fn from_scalars(values: Vec<f32>) -> Self {
        Self {
            item_size: 1,
            values: AttributeValues::Float32(values),
        }
    }

    /// Builds an integer attribute (skin joint indices and the like).
    #[must_use]
    pub fn from_u16_items<const N: usize>(items: &[[u16; N]]) -> Self {
        Self {
            item_size: N,
            values: AttributeValues::Uint16(items.iter().flatten().copied().collect()),
        }
    }

    #[must_use]
    pub fn from_u32_items<const N: usize>(items: &[[u32; N]]) -> Self {
        Self {
            item_size: N,
            values: AttributeValues::Uint32(items.iter().flatten().copied().collect()),
        }
    }

    /// Number of vertices stored.
    #[inline]
    #[must_use]
    pub fn count(&self) -> usize {
        if self.item_size == 0 {
            return 0;
        }
        self.values.len() / self.item_size
    }

    /// The matching GPU vertex format, if the layout is representable.
    #[must_use]
    pub fn format(&self) -> Option<VertexFormat> {
        match (&self.values, self.item_size) {
            (AttributeValues::Float32(_), 1) => Some(VertexFormat::Float32),
            (AttributeValues::Float32(_), 2) => Some(VertexFormat::Float32x2),
            (AttributeValues::Float32(_), 3) => Some(VertexFormat::Float32x3),
            (AttributeValues::Float32(_), 4) => Some(VertexFormat::Float32x4),
            (AttributeValues::Uint16(_), 2) => Some(VertexFormat::Uint16x2),
            (AttributeValues::Uint16(_), 4) => Some(VertexFormat::Uint16x4),
            (AttributeValues::Uint32(_), 1) => Some(VertexFormat::Uint32),
            (AttributeValues::Uint32(_), 2) => Some(VertexFormat::Uint32x2),
            (AttributeValues::Uint32(_), 3) => Some(VertexFormat::Uint32x3),
            (AttributeValues::Uint32(_), 4) => Some(VertexFormat::Uint32x4),
            _ => None,
        }
    }

    /// Float components, when this is a float attribute.
    #[must_use]
    pub fn as_f32(&self) -> Option<&[f32]> {
        match &self.values {
            AttributeValues::Float32(v) => Some(v),
            _ => None,
        }
    }

    /// Tightly packed bytes for upload.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match &self.values {
            AttributeValues::Float32(v) => bytemuck::cast_slice(v),
            AttributeValues::Uint16(v) => bytemuck::cast_slice(v),
            AttributeValues::Uint32(v) => bytemuck::cast_slice(v),
        }
    }

    /// Components of vertex `i`, widened to `f64` for inspection.
    #[must_use]
    pub fn item(&self, i: usize) -> Option<SmallVec<[f64; 4]>> {
        let start = i * self.item_size;
        let end = start + self.item_size;
        match &self.values {
            AttributeValues::Float32(v) => {
                v.get(start..end).map(|s| s.iter().map(|&x| f64::from(x)).collect())
            }
            AttributeValues::Uint16(v) => {
                v.get(start..end).map(|s| s.iter().map(|&x| f64::from(x)).collect())
            }
            AttributeValues::Uint32(v) => {
                v.get(start..end).map(|s| s.iter().map(|&x| f64::from(x)).collect())
            }
        }
    }

    pub fn read_vec3(&self, i: usize) -> Option<Vec3> {
        if self.item_size != 3 {
            return None;
        }
        let data = self.as_f32()?;
        let s = data.get(i * 3..i * 3 + 3)?;
        Some(Vec3::new(s[0], s[1], s[2]))
    }

    /// Appends the quantised components of vertex `vertex` to `key`.
    ///
    /// Floats are scaled by `multiplier` and rounded; integers are exact.
    pub(crate) fn push_quantized(&self, vertex: usize, multiplier: f64, key: &mut SmallVec<[i64; 16]>) {
        let start = vertex * self.item_size;
        let end = start + self.item_size;
        match &self.values {
            AttributeValues::Float32(v) => {
                // `as` saturates, so absurdly large values cannot overflow.
                key.extend(v[start..end].iter().map(|&x| (f64::from(x) * multiplier).round() as i64));
            }
            AttributeValues::Uint16(v) => key.extend(v[start..end].iter().map(|&x| i64::from(x))),
            AttributeValues::Uint32(v) => key.extend(v[start..end].iter().map(|&x| i64::from(x))),
        }
    }

    /// Empty attribute of the same kind, sized for `capacity` vertices.
    pub(crate) fn empty_like(&self, capacity: usize) -> Self {
        Self {
            item_size: self.item_size,
            values: self.values.empty_like(capacity * self.item_size),
        }
    }

    /// Copies vertex `vertex` of `self` verbatim onto the end of `dst`.
    pub(crate) fn copy_vertex_into(&self, vertex: usize, dst: &mut VertexAttribute) {
        let start = vertex * self.item_size;
        let end = start + self.item_size;
        match (&self.values, &mut dst.values) {
            (AttributeValues::Float32(src), AttributeValues::Float32(out)) => {
                out.extend_from_slice(&src[start..end]);
            }
            (AttributeValues::Uint16(src), AttributeValues::Uint16(out)) => {
                out.extend_from_slice(&src[start..end]);
            }
            (AttributeValues::Uint32(src), AttributeValues::Uint32(out)) => {
                out.extend_from_slice(&src[start..end]);
            }
            _ => unreachable!("destination attribute is created with empty_like"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    #[must_use]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Axis-aligned box enclosing `self` after `matrix`.
    #[must_use]
    pub fn transform(&self, matrix: &Affine3A) -> Self {
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for i in 0..8 {
            let corner = Vec3::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
            );
            let p = matrix.transform_point3(corner);
            min = min.min(p);
            max = max.max(p);
        }
        Self { min, max }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BoundingSphere {
    pub center: Vec3,
    pub radius: f32,
}

/// Indexed triangle geometry.
#[derive(Debug, Clone)]
pub struct Geometry {
    pub uuid: Uuid,
    attributes: BTreeMap<String, VertexAttribute>,
    /// Morph targets per attribute name, each entry one target.
    morph_attributes: BTreeMap<String, Vec<VertexAttribute>>,
    indices: Option<Vec<u32>>,
}

impl Default for Geometry {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Geometry {
    /// Content equality; the uuid is identity, not content.
    fn eq(&self, other: &Self) -> bool {
        self.attributes == other.attributes
            && self.morph_attributes == other.morph_attributes
            && self.indices == other.indices
    }
}

impl Geometry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            uuid: Uuid::new_v4(),
            attributes: BTreeMap::new(),
            morph_attributes: BTreeMap::new(),
            indices: None,
        }
    }

    pub fn set_attribute(&mut self, name: &str, attr: VertexAttribute) {
        self.attributes.insert(name.to_string(), attr);
    }

    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&VertexAttribute> {
        self.attributes.get(name)
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<VertexAttribute> {
        self.attributes.remove(name)
    }

    /// Attributes in name order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &VertexAttribute)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn add_morph_attribute(&mut self, name: &str, attr: VertexAttribute) {
        self.morph_attributes.entry(name.to_string()).or_default().push(attr);
    }

    #[must_use]
    pub fn morph_attribute(&self, name: &str) -> Option<&[VertexAttribute]> {
        self.morph_attributes.get(name).map(Vec::as_slice)
    }

    pub fn morph_attributes(&self) -> impl Iterator<Item = (&str, &[VertexAttribute])> {
        self.morph_attributes.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn set_indices(&mut self, indices: Vec<u32>) {
        self.indices = Some(indices);
    }

    #[must_use]
    pub fn indices(&self) -> Option<&[u32]> {
        self.indices.as_deref()
    }

    /// Vertex count, taken from the `position` attribute.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.attributes.get(POSITION).map_or(0, VertexAttribute::count)
    }

    /// Number of vertices a mesh draw walks (index count, or vertex count).
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.indices.as_ref().map_or_else(|| self.vertex_count(), Vec::len)
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.element_count() / 3
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertex_count() == 0
    }

    /// Checks the index/vertex contract: consistent attribute counts and
    /// every index `< vertex_count`.
    pub fn validate(&self) -> Result<()> {
        let vertex_count = self.vertex_count();
        let attrs = self
            .attributes
            .iter()
            .chain(self.morph_attributes.iter().flat_map(|(n, t)| t.iter().map(move |a| (n, a))));
        for (name, attr) in attrs {
            if attr.count() != vertex_count {
                return Err(BrushError::AttributeCountMismatch {
                    name: name.clone(),
                    expected: vertex_count,
                    actual: attr.count(),
                });
            }
        }

        if let Some(&index) = self
            .indices
            .iter()
            .flatten()
            .find(|&&i| i as usize >= vertex_count)
        {
            return Err(BrushError::InvalidGeometry { index, vertex_count });
        }
        Ok(())
    }

    /// `true` when every vertex is referenced by at least one index.
    #[must_use]
    pub fn is_fully_referenced(&self) -> bool {
        let Some(indices) = &self.indices else {
            return true;
        };
        let mut seen = vec![false; self.vertex_count()];
        for &i in indices {
            if let Some(slot) = seen.get_mut(i as usize) {
                *slot = true;
            }
        }
        seen.into_iter().all(|s| s)
    }

    /// GPU layout of every representable attribute, in name order.
    #[must_use]
    pub fn vertex_layout(&self) -> Vec<(String, VertexFormat)> {
        self.attributes
            .iter()
            .filter_map(|(name, attr)| attr.format().map(|f| (name.clone(), f)))
            .collect()
    }

    #[must_use]
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let positions = self.attributes.get(POSITION)?;
        let data = positions.as_f32()?;
        if positions.item_size != 3 || data.is_empty() {
            return None;
        }
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for p in data.chunks_exact(3) {
            let v = Vec3::new(p[0], p[1], p[2]);
            min = min.min(v);
            max = max.max(v);
        }
        Some(BoundingBox { min, max })
    }

    /// Sphere around the box center reaching the farthest position.
    #[must_use]
    pub fn bounding_sphere(&self) -> Option<BoundingSphere> {
        let center = self.bounding_box()?.center();
        let data = self.attributes.get(POSITION)?.as_f32()?;
        let max_dist_sq = data
            .chunks_exact(3)
            .map(|p| Vec3::new(p[0], p[1], p[2]).distance_squared(center))
            .fold(0.0f32, f32::max);
        Some(BoundingSphere {
            center,
            radius: max_dist_sq.sqrt(),
        })
    }
}
