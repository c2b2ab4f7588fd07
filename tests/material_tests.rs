//! Brush Material Tests
//!
//! Tests for:
//! - Named parameter access and error reporting
//! - Range clamping
//! - Program features and versioning
//! - Uniform block layout

use brush_particles::errors::BrushError;
use brush_particles::resources::color::Color;
use brush_particles::resources::material::{
    BrushMaterialOptions, BrushMaterialUniforms, MAX_POINT_SIZE, MaterialParameters, ParamValue,
    ProgramFeatures, SharedMaterial,
};
use brush_particles::resources::texture::TextureHandle;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// ============================================================================
// Named access
// ============================================================================

#[test]
fn unknown_parameter_is_rejected() {
    let mut material = MaterialParameters::default();
    let err = material.set("glossiness", ParamValue::Scalar(0.5)).unwrap_err();
    assert!(matches!(err, BrushError::Configuration(_)));
    assert_eq!(material.get("glossiness"), None);
}

#[test]
fn wrong_kind_leaves_value_untouched() {
    let mut material = MaterialParameters::default();
    let before = material.data_version();
    assert!(material.set("roughness", ParamValue::Bool(true)).is_err());
    assert_eq!(material.roughness(), 1.0);
    assert_eq!(material.data_version(), before);
}

#[test]
fn non_finite_values_are_rejected() {
    let mut material = MaterialParameters::default();
    assert!(material.set("size", ParamValue::Scalar(f32::NAN)).is_err());
    assert!(material.set("environmentIntensity", ParamValue::Scalar(f32::INFINITY)).is_err());
    assert_eq!(material.size(), 100.0);
}

#[test]
fn named_and_typed_access_agree() {
    let mut material = MaterialParameters::default();
    material.set("color", ParamValue::Color(Color::from_hex(0x22_44_66))).unwrap();
    material.set("metalness", ParamValue::Scalar(0.25)).unwrap();

    assert_eq!(material.color(), Color::from_hex(0x22_44_66));
    assert_eq!(material.get("metalness"), Some(ParamValue::Scalar(0.25)));
}

// ============================================================================
// Clamping
// ============================================================================

#[test]
fn out_of_range_values_are_clamped() {
    init_logger();
    let mut material = MaterialParameters::default();

    material.set("roughness", ParamValue::Scalar(2.0)).unwrap();
    material.set("size", ParamValue::Scalar(5000.0)).unwrap();
    material.set("metalness", ParamValue::Scalar(-1.0)).unwrap();
    material.set("fogDensity", ParamValue::Scalar(1.0)).unwrap();

    assert_eq!(material.roughness(), 1.0);
    assert_eq!(material.size(), MAX_POINT_SIZE);
    assert_eq!(material.metalness(), 0.0);
    assert!(material.fog_density() < 1.0);
}

#[test]
fn construction_options_are_clamped() {
    init_logger();
    let material = MaterialParameters::new(BrushMaterialOptions {
        roughness: 3.0,
        size: -4.0,
        ..Default::default()
    });
    assert_eq!(material.roughness(), 1.0);
    assert_eq!(material.size(), 0.0);
}

// ============================================================================
// Program features
// ============================================================================

#[test]
fn features_follow_parameters() {
    let mut material = MaterialParameters::new(BrushMaterialOptions {
        brush_texture: Some(TextureHandle::texture_2d("brush")),
        ..Default::default()
    });
    assert!(material.features().contains(ProgramFeatures::USE_POINTS | ProgramFeatures::USE_BRUSH_MAP));
    assert!(material.features().contains(ProgramFeatures::USE_FOG));
    assert!(!material.features().contains(ProgramFeatures::USE_ENVMAP));

    // The brush map only shapes point sprites.
    material.set_use_points(false);
    assert!(!material.features().contains(ProgramFeatures::USE_BRUSH_MAP));
    assert!(!material.shader_defines().contains("USE_POINTS"));

    material.set_environment_map(Some(TextureHandle::cube_map("env")));
    assert!(material.shader_defines().contains("USE_ENVMAP"));

    material.set_fog_density(0.0);
    assert!(!material.features().contains(ProgramFeatures::USE_FOG));
}

#[test]
fn program_version_tracks_define_changes_only() {
    let mut material = MaterialParameters::default();
    let v0 = material.program_version();

    material.set_roughness(0.3);
    material.set_size(20.0);
    assert_eq!(material.program_version(), v0);

    material.set_use_points(false);
    let v1 = material.program_version();
    assert!(v1 > v0);

    material.set_use_points(false);
    assert_eq!(material.program_version(), v1);
}

#[test]
fn data_version_tracks_every_change() {
    let mut material = MaterialParameters::default();
    let v0 = material.data_version();
    material.set_roughness(0.3);
    assert!(material.data_version() > v0);
}

// ============================================================================
// Sharing and layout
// ============================================================================

#[test]
fn shared_material_is_seen_by_every_holder() {
    let a = SharedMaterial::new(MaterialParameters::default());
    let b = a.clone();
    a.set("size", ParamValue::Scalar(42.0)).unwrap();
    assert_eq!(b.read().size(), 42.0);
    assert!(a.ptr_eq(&b));
}

#[test]
fn uniform_block_layout() {
    assert_eq!(std::mem::size_of::<BrushMaterialUniforms>(), 48);
    assert_eq!(std::mem::size_of::<BrushMaterialUniforms>() % 16, 0);

    let material = MaterialParameters::default();
    let u = material.uniforms();
    assert_eq!(u.size, 100.0);
    assert_eq!(u.fog[3], material.fog_density());
}
