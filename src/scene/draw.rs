use std::cell::Cell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::resources::geometry::Geometry;
use crate::resources::material::SharedMaterial;
use crate::scene::transform::SharedTransform;

static NEXT_DRAW_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DrawId(u64);

impl DrawId {
    fn next() -> Self {
        Self(NEXT_DRAW_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// How a draw rasterises its geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Representation {
    /// One camera-facing brush quad per vertex.
    Points,
    /// Indexed triangles.
    Mesh,
}

impl Representation {
    #[must_use]
    pub fn other(self) -> Self {
        match self {
            Self::Points => Self::Mesh,
            Self::Mesh => Self::Points,
        }
    }

    #[must_use]
    pub fn from_use_points(use_points: bool) -> Self {
        if use_points { Self::Points } else { Self::Mesh }
    }

    /// Point quads are a 4-vertex strip expanded in the vertex shader.
    #[must_use]
    pub fn topology(self) -> wgpu::PrimitiveTopology {
        match self {
            Self::Points => wgpu::PrimitiveTopology::TriangleStrip,
            Self::Mesh => wgpu::PrimitiveTopology::TriangleList,
        }
    }
}

/// Vertex/instance ranges a draw submits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawRange {
    pub vertices: u32,
    pub instances: u32,
    pub indexed: bool,
}

/// A renderable: geometry + material + transform, rasterised one way.
///
/// Geometry, material and transform are shared handles. The draw itself
/// carries no mutable shading state besides the program version it was last
/// compiled against.
#[derive(Debug)]
pub struct DrawObject {
    id: DrawId,
    representation: Representation,
    geometry: Rc<Geometry>,
    material: SharedMaterial,
    transform: SharedTransform,
    compiled_version: Cell<Option<u64>>,
}

impl DrawObject {
    #[must_use]
    pub fn new(
        representation: Representation,
        geometry: Rc<Geometry>,
        material: SharedMaterial,
        transform: SharedTransform,
    ) -> Self {
        Self {
            id: DrawId::next(),
            representation,
            geometry,
            material,
            transform,
            compiled_version: Cell::new(None),
        }
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> DrawId {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn representation(&self) -> Representation {
        self.representation
    }

    #[inline]
    #[must_use]
    pub fn geometry(&self) -> &Rc<Geometry> {
        &self.geometry
    }

    #[inline]
    #[must_use]
    pub fn material(&self) -> &SharedMaterial {
        &self.material
    }

    #[inline]
    #[must_use]
    pub fn transform(&self) -> &SharedTransform {
        &self.transform
    }

    /// True until the draw has been compiled against the material's current
    /// program version.
    #[must_use]
    pub fn needs_recompile(&self) -> bool {
        self.compiled_version.get() != Some(self.material.read().program_version())
    }

    pub fn mark_compiled(&self, program_version: u64) {
        self.compiled_version.set(Some(program_version));
    }

    #[must_use]
    pub fn compiled_version(&self) -> Option<u64> {
        self.compiled_version.get()
    }

    #[must_use]
    pub fn range(&self) -> DrawRange {
        let vertex_count = u32::try_from(self.geometry.vertex_count()).unwrap_or(u32::MAX);
        match self.representation {
            Representation::Points => DrawRange {
                vertices: 4,
                instances: vertex_count,
                indexed: false,
            },
            Representation::Mesh => DrawRange {
                vertices: u32::try_from(self.geometry.element_count()).unwrap_or(u32::MAX),
                instances: 1,
                indexed: self.geometry.indices().is_some(),
            },
        }
    }
}

/// Draws are referenced from the owning item and, while attached, the scene.
pub type DrawHandle = Rc<DrawObject>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::material::MaterialParameters;
    use crate::resources::primitives::{SphereOptions, create_sphere};

    #[test]
    fn compile_tracking_follows_program_version() {
        let material = SharedMaterial::new(MaterialParameters::default());
        let draw = DrawObject::new(
            Representation::Points,
            Rc::new(create_sphere(SphereOptions::default())),
            material.clone(),
            SharedTransform::default(),
        );
        assert!(draw.needs_recompile());
        draw.mark_compiled(material.read().program_version());
        assert!(!draw.needs_recompile());
        material.update(|m| m.set_use_points(false));
        assert!(draw.needs_recompile());
    }

    #[test]
    fn point_draw_instances_every_vertex() {
        let geo = Rc::new(create_sphere(SphereOptions::default()));
        let draw = DrawObject::new(
            Representation::Points,
            geo.clone(),
            SharedMaterial::new(MaterialParameters::default()),
            SharedTransform::default(),
        );
        let range = draw.range();
        assert_eq!(range.vertices, 4);
        assert_eq!(range.instances as usize, geo.vertex_count());
    }
}
