//! Error Types
//!
//! This module defines the error types used throughout the crate.
//!
//! # Overview
//!
//! The main error type [`BrushError`] covers the failure modes of the core:
//! - Malformed geometry handed to the welding processor (fatal for that mesh)
//! - Configuration mistakes that cannot be clamped into range
//! - Render target validation failures
//! - Shader template and config parsing errors
//!
//! Out-of-range but finite configuration values are never reported here:
//! they are clamped to the nearest valid bound and logged with `log::warn!`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use brush_particles::errors::{BrushError, Result};
//!
//! fn load_mesh() -> Result<()> {
//!     // Operations that may fail return Result
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// The main error type for the brush renderer.
#[derive(Error, Debug)]
pub enum BrushError {
    // ========================================================================
    // Geometry Errors
    // ========================================================================
    /// An index references a vertex that does not exist.
    #[error("Invalid geometry: index {index} out of range for {vertex_count} vertices")]
    InvalidGeometry {
        /// The offending index value
        index: u32,
        /// Number of vertices in the input
        vertex_count: usize,
    },

    /// Two attributes of the same geometry disagree on the vertex count.
    #[error("Invalid geometry: attribute '{name}' has {actual} vertices, expected {expected}")]
    AttributeCountMismatch {
        /// Attribute name
        name: String,
        /// Vertex count of the `position` attribute
        expected: usize,
        /// Vertex count of the mismatching attribute
        actual: usize,
    },

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Unknown parameter, wrong value kind or non-finite value.
    #[error("Configuration error: {0}")]
    Configuration(String),

    // ========================================================================
    // Rendering Errors
    // ========================================================================
    /// A pass found a render target whose size does not match the viewport.
    #[error(
        "Render target '{target}' used by pass '{pass}' is {actual:?}, expected {expected:?}"
    )]
    TargetSizeMismatch {
        /// Pass name
        pass: String,
        /// Target label
        target: String,
        /// Size derived from the current viewport
        expected: (u32, u32),
        /// Size the target currently has
        actual: (u32, u32),
    },

    /// Shader template lookup or rendering failed.
    #[error("Shader error: {0}")]
    Shader(String),

    // ========================================================================
    // Format & Parsing Errors
    // ========================================================================
    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<minijinja::Error> for BrushError {
    fn from(err: minijinja::Error) -> Self {
        BrushError::Shader(err.to_string())
    }
}

/// Alias for `Result<T, BrushError>`.
pub type Result<T> = std::result::Result<T, BrushError>;
