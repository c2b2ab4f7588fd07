use crate::resources::geometry::{Geometry, NORMAL, POSITION, UV, VertexAttribute};
use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SphereOptions {
    pub radius: f32,
    pub width_segments: u32,
    pub height_segments: u32,
}

impl Default for SphereOptions {
    fn default() -> Self {
        Self {
            radius: 1.0,
            width_segments: 32,
            height_segments: 16,
        }
    }
}

/// UV sphere, Y-up, poles on the Y axis.
///
/// The grid holds `(w + 1) × (h + 1)` vertices. Pole rows are offset by half a
/// segment in `u` and the degenerate triangles touching the poles are not
/// emitted, so one vertex on each pole row is left unreferenced.
#[must_use]
pub fn create_sphere(options: SphereOptions) -> Geometry {
    let radius = options.radius;
    let width_segments = options.width_segments.max(3);
    let height_segments = options.height_segments.max(2);

    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut uvs = Vec::new();
    let mut indices = Vec::new();

    for y in 0..=height_segments {
        let v = y as f32 / height_segments as f32;

        let u_offset = if y == 0 {
            0.5 / width_segments as f32
        } else if y == height_segments {
            -0.5 / width_segments as f32
        } else {
            0.0
        };

        for x in 0..=width_segments {
            let u = x as f32 / width_segments as f32;

            // Longitude u·2π, latitude v·π measured from +Y.
            let px = -radius * (u * 2.0 * PI).cos() * (v * PI).sin();
            let py = radius * (v * PI).cos();
            let pz = radius * (u * 2.0 * PI).sin() * (v * PI).sin();

            positions.push([px, py, pz]);
            normals.push([px / radius, py / radius, pz / radius]);
            uvs.push([u + u_offset, 1.0 - v]);
        }
    }

    let stride = width_segments + 1;
    for y in 0..height_segments {
        for x in 0..width_segments {
            let a = y * stride + x + 1;
            let b = y * stride + x;
            let c = (y + 1) * stride + x;
            let d = (y + 1) * stride + x + 1;

            if y != 0 {
                indices.extend_from_slice(&[a, b, d]);
            }
            if y != height_segments - 1 {
                indices.extend_from_slice(&[b, c, d]);
            }
        }
    }

    let mut geo = Geometry::new();
    geo.set_attribute(POSITION, VertexAttribute::from_items(&positions));
    geo.set_attribute(NORMAL, VertexAttribute::from_items(&normals));
    geo.set_attribute(UV, VertexAttribute::from_items(&uvs));
    geo.set_indices(indices);
    geo
}
