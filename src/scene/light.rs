use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::resources::color::Color;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AmbientLight {
    pub color: Color,
    pub intensity: f32,
}

impl Default for AmbientLight {
    fn default() -> Self {
        Self {
            color: Color::from_hex(0xff_00_00),
            intensity: 0.2,
        }
    }
}

/// Directional light. The direction is from `position` towards the origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DirectionalLight {
    pub color: Color,
    pub intensity: f32,
    pub position: Vec3,
    /// Sweep the light over time in the XZ plane.
    pub animated: bool,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            intensity: 3.5,
            position: Vec3::Y,
            animated: true,
        }
    }
}

impl DirectionalLight {
    /// `x = sin(t)`, `z = sin(0.8 t)`, `t` in seconds.
    pub fn update(&mut self, elapsed_seconds: f32) {
        if self.animated {
            self.position.x = elapsed_seconds.sin();
            self.position.z = (elapsed_seconds * 0.8).sin();
        }
    }

    /// Unit vector the light travels along.
    #[must_use]
    pub fn direction(&self) -> Vec3 {
        (-self.position).try_normalize().unwrap_or(Vec3::NEG_Y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sweep_follows_elapsed_time() {
        let mut light = DirectionalLight::default();
        light.update(std::f32::consts::FRAC_PI_2);
        assert!((light.position.x - 1.0).abs() < 1e-6);
        assert!((light.position.z - (0.8 * std::f32::consts::FRAC_PI_2).sin()).abs() < 1e-6);
        assert_eq!(light.position.y, 1.0);
    }
}
