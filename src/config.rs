//! Application Configuration
//!
//! One serde document gathers every construction-time setting. Omitted keys
//! keep their defaults, so `{}` is a valid configuration:
//!
//! ```json
//! {
//!   "renderer": { "clearColor": "#0f0914", "finalPassEnabled": false },
//!   "bloom": { "threshold": 0.0, "strength": 1.0, "radius": 0.0 },
//!   "camera": { "initialMode": "defaultCamera" },
//!   "field": { "usePoints": true, "seed": 7 }
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::camera::CameraSettings;
use crate::errors::Result;
use crate::renderer::settings::RendererSettings;
use crate::resources::bloom::BloomSettings;
use crate::resources::final_pass::FinalPassSettings;
use crate::scene::brush_field::BrushFieldOptions;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    pub renderer: RendererSettings,
    pub bloom: BloomSettings,
    pub final_pass: FinalPassSettings,
    pub camera: CameraSettings,
    pub field: BrushFieldOptions,
}

impl AppConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let mut config: Self = serde_json::from_str(json)?;
        config.sanitize();
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Routes deserialized bloom values through the clamping setters.
    fn sanitize(&mut self) {
        let bloom = &mut self.bloom;
        let (threshold, strength, radius) = (bloom.threshold(), bloom.strength(), bloom.radius());
        bloom.set_threshold(threshold);
        bloom.set_strength(strength);
        bloom.set_radius(radius);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_default() {
        let config = AppConfig::from_json_str("{}").unwrap();
        assert_eq!(config.renderer, RendererSettings::default());
        assert_eq!(config.field, BrushFieldOptions::default());
        assert!(!config.renderer.final_pass_enabled);
    }

    #[test]
    fn out_of_range_bloom_is_clamped() {
        let config = AppConfig::from_json_str(r#"{ "bloom": { "strength": 9.5, "radius": -1 } }"#).unwrap();
        assert_eq!(config.bloom.strength(), 3.0);
        assert_eq!(config.bloom.radius(), 0.0);
    }

    #[test]
    fn malformed_json_is_an_error() {
        let err = AppConfig::from_json_str("{ renderer: ").unwrap_err();
        assert!(matches!(err, crate::errors::BrushError::Json(_)));
    }
}
