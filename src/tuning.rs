//! Debug tuning surface.
//!
//! Components expose their live-editable values as a flat list of
//! [`TunableField`]s addressed by `folder/label` paths. A debug UI (or a test,
//! or a remote console) enumerates the fields and reads/writes them through
//! the [`Tunable`] trait; nothing here knows about any particular widget
//! toolkit. Writes take effect on the next frame.

use crate::errors::{BrushError, Result};
use crate::resources::color::Color;

/// Widget hint for a field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Range { min: f32, max: f32, step: f32 },
    Color,
    Checkbox,
    Select { options: Vec<&'static str> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TunableField {
    /// `folder/label`
    pub path: String,
    pub kind: FieldKind,
}

impl TunableField {
    pub fn range(path: impl Into<String>, min: f32, max: f32, step: f32) -> Self {
        Self {
            path: path.into(),
            kind: FieldKind::Range { min, max, step },
        }
    }

    pub fn color(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: FieldKind::Color,
        }
    }

    pub fn checkbox(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: FieldKind::Checkbox,
        }
    }

    pub fn select(path: impl Into<String>, options: Vec<&'static str>) -> Self {
        Self {
            path: path.into(),
            kind: FieldKind::Select { options },
        }
    }

    #[must_use]
    pub fn folder(&self) -> &str {
        split_path(&self.path).map_or("", |(folder, _)| folder)
    }

    #[must_use]
    pub fn label(&self) -> &str {
        split_path(&self.path).map_or(self.path.as_str(), |(_, label)| label)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TuningValue {
    Number(f32),
    Color(Color),
    Bool(bool),
    Choice(String),
}

impl TuningValue {
    pub fn as_number(&self, path: &str) -> Result<f32> {
        match self {
            Self::Number(v) if v.is_finite() => Ok(*v),
            other => Err(mismatch(path, "a finite number", other)),
        }
    }

    pub fn as_color(&self, path: &str) -> Result<Color> {
        match self {
            Self::Color(c) => Ok(*c),
            other => Err(mismatch(path, "a color", other)),
        }
    }

    pub fn as_bool(&self, path: &str) -> Result<bool> {
        match self {
            Self::Bool(b) => Ok(*b),
            other => Err(mismatch(path, "a boolean", other)),
        }
    }

    pub fn as_choice(&self, path: &str) -> Result<&str> {
        match self {
            Self::Choice(s) => Ok(s),
            other => Err(mismatch(path, "a choice", other)),
        }
    }
}

fn mismatch(path: &str, expected: &str, got: &TuningValue) -> BrushError {
    BrushError::Configuration(format!("field '{path}' expects {expected}, got {got:?}"))
}

/// Error for a path no component recognises.
#[must_use]
pub fn unknown_field(path: &str) -> BrushError {
    BrushError::Configuration(format!("unknown tuning field '{path}'"))
}

/// Splits `folder/label` at the last `/`.
#[must_use]
pub fn split_path(path: &str) -> Option<(&str, &str)> {
    path.rsplit_once('/')
}

/// Read/write access to a component's tunable values.
pub trait Tunable {
    fn fields(&self) -> Vec<TunableField>;

    fn get_field(&self, path: &str) -> Option<TuningValue>;

    /// Writes a field. Out-of-range numbers are clamped by the component;
    /// unknown paths and wrong value kinds are errors.
    fn set_field(&mut self, path: &str, value: TuningValue) -> Result<()>;
}
