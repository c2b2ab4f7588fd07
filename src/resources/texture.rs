use std::borrow::Cow;

use uuid::Uuid;

/// Shape of a texture asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureKind {
    /// Plain 2D image (the brush footprint).
    D2,
    /// Six-face cube map (the environment).
    Cube,
}

impl TextureKind {
    #[must_use]
    pub fn view_dimension(self) -> wgpu::TextureViewDimension {
        match self {
            Self::D2 => wgpu::TextureViewDimension::D2,
            Self::Cube => wgpu::TextureViewDimension::Cube,
        }
    }
}

/// Reference to a texture owned by the asset pipeline.
///
/// The core never decodes images; it only carries the handle through to the
/// render commands, where the backend resolves it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextureHandle {
    pub id: Uuid,
    pub kind: TextureKind,
    pub label: Cow<'static, str>,
}

impl TextureHandle {
    #[must_use]
    pub fn new(kind: TextureKind, label: impl Into<Cow<'static, str>>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            label: label.into(),
        }
    }

    #[must_use]
    pub fn texture_2d(label: impl Into<Cow<'static, str>>) -> Self {
        Self::new(TextureKind::D2, label)
    }

    #[must_use]
    pub fn cube_map(label: impl Into<Cow<'static, str>>) -> Self {
        Self::new(TextureKind::Cube, label)
    }
}
