//! Configuration Tests
//!
//! Tests for:
//! - Partial documents falling back to defaults
//! - Camera mode names
//! - Custom brush fields

use brush_particles::camera::CameraMode;
use brush_particles::config::AppConfig;
use brush_particles::resources::color::Color;
use brush_particles::scene::{BrushTextures, World};

#[test]
fn camera_mode_uses_panel_names() -> anyhow::Result<()> {
    let config = AppConfig::from_json_str(r#"{ "camera": { "initialMode": "defaultCamera" } }"#)?;
    assert_eq!(config.camera.initial_mode, CameraMode::Scripted);

    let config = AppConfig::from_json_str(r#"{ "camera": { "initialMode": "debugCamera" } }"#)?;
    assert_eq!(config.camera.initial_mode, CameraMode::DebugOrbit);

    assert!(AppConfig::from_json_str(r#"{ "camera": { "initialMode": "fly" } }"#).is_err());
    Ok(())
}

#[test]
fn custom_field_builds_its_items() -> anyhow::Result<()> {
    let json = r##"{
        "renderer": { "clearColor": "#000000", "finalPassEnabled": true },
        "field": {
            "usePoints": false,
            "seed": 3,
            "items": [
                { "name": "solo", "position": [1.0, 2.0, 3.0], "color": "#ff8000", "size": 40 }
            ]
        }
    }"##;
    let config = AppConfig::from_json_str(json)?;
    assert_eq!(config.renderer.clear_color, Color::BLACK);
    assert!(config.renderer.final_pass_enabled);

    let world = World::new(&config.field, BrushTextures::default());
    let item = world
        .field
        .item("solo")
        .ok_or_else(|| anyhow::anyhow!("item `solo` was not built"))?;
    assert!(!item.material().read().use_points());
    assert_eq!(item.material().read().size(), 40.0);
    assert_eq!(item.material().read().color(), Color::from_hex(0xff_80_00));
    assert_eq!(item.geometry().vertex_count(), 254);
    assert_eq!(world.scene.draw_count(), 1);
    Ok(())
}

#[test]
fn written_config_reads_back() -> anyhow::Result<()> {
    let mut config = AppConfig::default();
    config.bloom.set_strength(2.5);
    config.field.seed = Some(12);

    let json = config.to_json_string()?;
    let back = AppConfig::from_json_str(&json)?;
    assert_eq!(back.bloom.strength(), 2.5);
    assert_eq!(back.field, config.field);
    Ok(())
}
