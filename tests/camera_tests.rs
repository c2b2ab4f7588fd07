//! Camera Rig Tests
//!
//! Tests for:
//! - Mode switching and pose continuity
//! - Inactive behaviors ignoring input
//! - Projection aspect following viewport resizes
//! - `camera/mode` tuning field

use glam::Vec3;

use brush_particles::camera::{CameraBehavior, CameraController, CameraMode, CameraSettings};
use brush_particles::renderer::viewport::Viewport;
use brush_particles::resources::input::{ButtonState, Input, MouseButton};
use brush_particles::tuning::{Tunable, TuningValue};

fn controller(mode: CameraMode) -> (Viewport, CameraController) {
    let mut viewport = Viewport::new(800, 600, 1.0, [1.0, 1.5]);
    let settings = CameraSettings {
        initial_mode: mode,
        ..Default::default()
    };
    let controller = CameraController::new(&settings, viewport.subscribe());
    (viewport, controller)
}

fn drag(dx: f32) -> Input {
    let mut input = Input::new();
    input.inject_resize(800, 600);
    input.inject_mouse_button(MouseButton::Left, ButtonState::Pressed);
    input.inject_mouse_motion(dx, 0.0);
    input
}

fn approx_vec(a: Vec3, b: Vec3) -> bool {
    a.distance(b) < 1e-4
}

// ============================================================================
// Mode switching
// ============================================================================

#[test]
fn initial_pose_comes_from_initial_mode() {
    let (_vp, scripted) = controller(CameraMode::Scripted);
    assert!(approx_vec(scripted.pose().position, Vec3::new(0.0, 1.68, 2.0)));

    let (_vp, orbit) = controller(CameraMode::DebugOrbit);
    assert!(approx_vec(orbit.pose().position, Vec3::new(0.0, 0.0, 5.0)));
}

#[test]
fn switch_takes_new_pose_immediately() {
    let (_vp, mut camera) = controller(CameraMode::Scripted);
    camera.switch_to(CameraMode::DebugOrbit);
    assert_eq!(camera.mode(), CameraMode::DebugOrbit);
    assert_eq!(camera.pose(), camera.behavior(CameraMode::DebugOrbit).pose());
    assert!(camera.behavior(CameraMode::DebugOrbit).is_active());
    assert!(!camera.behavior(CameraMode::Scripted).is_active());
}

#[test]
fn orbit_resumes_where_it_left_off() {
    let (_vp, mut camera) = controller(CameraMode::DebugOrbit);
    for _ in 0..30 {
        camera.update(&drag(5.0), 1.0 / 60.0);
    }
    let orbited = camera.pose();
    assert!(!approx_vec(orbited.position, Vec3::new(0.0, 0.0, 5.0)));

    camera.switch_to(CameraMode::Scripted);
    camera.update(&Input::new(), 1.0 / 60.0);
    camera.switch_to(CameraMode::DebugOrbit);

    assert!(approx_vec(camera.pose().position, orbited.position));
    assert_eq!(camera.orbit().angular_velocity(), glam::Vec2::ZERO);
}

#[test]
fn inactive_orbit_ignores_input() {
    let (_vp, mut camera) = controller(CameraMode::Scripted);
    let before = camera.behavior(CameraMode::DebugOrbit).pose();
    for _ in 0..10 {
        camera.update(&drag(40.0), 1.0 / 60.0);
    }
    assert_eq!(camera.behavior(CameraMode::DebugOrbit).pose(), before);
}

#[test]
fn orbit_keeps_distance_while_rotating() {
    let (_vp, mut camera) = controller(CameraMode::DebugOrbit);
    for _ in 0..60 {
        camera.update(&drag(3.0), 1.0 / 60.0);
    }
    let distance = camera.pose().position.distance(Vec3::ZERO);
    assert!((distance - 5.0).abs() < 1e-3);
}

#[test]
fn scroll_zooms_within_limits() {
    let (_vp, mut camera) = controller(CameraMode::DebugOrbit);
    let mut input = Input::new();
    input.inject_resize(800, 600);
    input.inject_scroll(0.0, 1.0);
    camera.update(&input, 1.0 / 60.0);
    assert!(camera.orbit().radius < 5.0);
    assert!(camera.orbit().radius >= camera.orbit().min_distance);
}

// ============================================================================
// Resize
// ============================================================================

#[test]
fn resize_reaches_projection_on_next_update() {
    let (mut viewport, mut camera) = controller(CameraMode::Scripted);
    assert!((camera.projection().aspect - 800.0 / 600.0).abs() < 1e-6);

    viewport.resize(1000, 500, 2.0);
    viewport.resize(1200, 400, 2.0);
    camera.update(&Input::new(), 1.0 / 60.0);
    assert!((camera.projection().aspect - 3.0).abs() < 1e-6);
}

// ============================================================================
// Tuning
// ============================================================================

#[test]
fn mode_is_a_select_field() {
    let (_vp, mut camera) = controller(CameraMode::Scripted);
    camera
        .set_field("camera/mode", TuningValue::Choice("debugCamera".into()))
        .unwrap();
    assert_eq!(camera.mode(), CameraMode::DebugOrbit);
    assert_eq!(
        camera.get_field("camera/mode"),
        Some(TuningValue::Choice("debugCamera".into()))
    );
    assert!(camera.set_field("camera/mode", TuningValue::Choice("fly".into())).is_err());
}
