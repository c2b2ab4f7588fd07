//! Camera controller.
//!
//! Two behaviors share one projection: a [`ScriptedCamera`] and an
//! [`OrbitCamera`] for debugging. Exactly one is active. Every update the
//! controller copies the active behavior's pose into its own; the inactive
//! behavior never writes to it.

pub mod orbit;
pub mod scripted;

use glam::Vec3;
use serde::{Deserialize, Serialize};

pub use orbit::OrbitCamera;
pub use scripted::ScriptedCamera;

use crate::errors::{BrushError, Result};
use crate::renderer::viewport::ResizeListener;
use crate::resources::input::Input;
use crate::scene::camera::{CameraPose, Projection, RenderCamera};
use crate::tuning::{Tunable, TunableField, TuningValue, unknown_field};

/// Capability set shared by the camera behaviors.
pub trait CameraBehavior {
    /// Starts input handling / animation.
    fn activate(&mut self);

    /// Stops input handling / freezes animation.
    fn deactivate(&mut self);

    fn is_active(&self) -> bool;

    /// Advances the behavior by `dt` seconds. Inactive behaviors do nothing.
    fn update(&mut self, input: &Input, projection: &Projection, dt: f32);

    fn pose(&self) -> CameraPose;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CameraMode {
    #[serde(rename = "defaultCamera")]
    Scripted,
    #[serde(rename = "debugCamera")]
    DebugOrbit,
}

impl CameraMode {
    pub const NAMES: [&'static str; 2] = ["defaultCamera", "debugCamera"];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Scripted => Self::NAMES[0],
            Self::DebugOrbit => Self::NAMES[1],
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "defaultCamera" => Some(Self::Scripted),
            "debugCamera" => Some(Self::DebugOrbit),
            _ => None,
        }
    }
}

impl Default for CameraMode {
    /// Debug builds start on the orbit camera.
    fn default() -> Self {
        if cfg!(debug_assertions) { Self::DebugOrbit } else { Self::Scripted }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CameraSettings {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub initial_mode: CameraMode,
    /// Where the orbit camera starts.
    pub base_position: Vec3,
    pub orbit_target: Vec3,
    pub scripted_position: Vec3,
    pub scripted_target: Vec3,
    pub zoom_speed: f32,
    pub damping_factor: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            fov_degrees: 55.0,
            near: 0.1,
            far: 150.0,
            initial_mode: CameraMode::default(),
            base_position: Vec3::new(0.0, 0.0, 5.0),
            orbit_target: Vec3::ZERO,
            scripted_position: Vec3::new(0.0, 1.68, 2.0),
            scripted_target: Vec3::new(0.0, 1.55, 0.0),
            zoom_speed: 0.25,
            damping_factor: 0.05,
        }
    }
}

#[derive(Debug)]
pub struct CameraController {
    projection: Projection,
    scripted: ScriptedCamera,
    orbit: OrbitCamera,
    mode: CameraMode,
    pose: CameraPose,
    resize: ResizeListener,
}

impl CameraController {
    #[must_use]
    pub fn new(settings: &CameraSettings, resize: ResizeListener) -> Self {
        let size = resize.current();
        let mut projection = Projection {
            fov_degrees: settings.fov_degrees,
            aspect: 1.0,
            near: settings.near,
            far: settings.far,
        };
        projection.set_aspect_from_size(size.width, size.height);

        let scripted = ScriptedCamera::new(settings.scripted_position, settings.scripted_target);
        let mut orbit = OrbitCamera::new(settings.base_position, settings.orbit_target);
        orbit.set_zoom_speed(settings.zoom_speed);
        orbit.damping_factor = settings.damping_factor;

        let mut controller = Self {
            projection,
            scripted,
            orbit,
            mode: settings.initial_mode,
            pose: CameraPose::default(),
            resize,
        };
        controller.behavior_mut(settings.initial_mode).activate();
        controller.copy_pose();
        controller
    }

    #[must_use]
    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    /// Deactivates the current behavior, activates `mode` and takes its pose
    /// immediately.
    pub fn switch_to(&mut self, mode: CameraMode) {
        if mode == self.mode {
            return;
        }
        self.behavior_mut(self.mode).deactivate();
        self.behavior_mut(mode).activate();
        self.mode = mode;
        self.copy_pose();
        log::debug!("Camera mode -> {}", mode.name());
    }

    /// Per-frame update: applies pending resizes, advances the active
    /// behavior and copies its pose out.
    pub fn update(&mut self, input: &Input, dt: f32) {
        if let Some(size) = self.resize.poll() {
            self.projection.set_aspect_from_size(size.width, size.height);
        }
        let projection = self.projection;
        self.behavior_mut(self.mode).update(input, &projection, dt);
        self.copy_pose();
    }

    /// Composite pose, a copy of the active behavior's.
    #[must_use]
    pub fn pose(&self) -> CameraPose {
        self.pose
    }

    #[must_use]
    pub fn projection(&self) -> Projection {
        self.projection
    }

    #[must_use]
    pub fn camera(&self) -> RenderCamera {
        RenderCamera {
            pose: self.pose,
            projection: self.projection,
        }
    }

    #[must_use]
    pub fn behavior(&self, mode: CameraMode) -> &dyn CameraBehavior {
        match mode {
            CameraMode::Scripted => &self.scripted,
            CameraMode::DebugOrbit => &self.orbit,
        }
    }

    fn behavior_mut(&mut self, mode: CameraMode) -> &mut dyn CameraBehavior {
        match mode {
            CameraMode::Scripted => &mut self.scripted,
            CameraMode::DebugOrbit => &mut self.orbit,
        }
    }

    #[must_use]
    pub fn orbit(&self) -> &OrbitCamera {
        &self.orbit
    }

    pub fn orbit_mut(&mut self) -> &mut OrbitCamera {
        &mut self.orbit
    }

    #[must_use]
    pub fn scripted(&self) -> &ScriptedCamera {
        &self.scripted
    }

    pub fn scripted_mut(&mut self) -> &mut ScriptedCamera {
        &mut self.scripted
    }

    fn copy_pose(&mut self) {
        self.pose = self.behavior(self.mode).pose();
    }
}

impl Tunable for CameraController {
    fn fields(&self) -> Vec<TunableField> {
        vec![TunableField::select("camera/mode", CameraMode::NAMES.to_vec())]
    }

    fn get_field(&self, path: &str) -> Option<TuningValue> {
        (path == "camera/mode").then(|| TuningValue::Choice(self.mode.name().to_string()))
    }

    fn set_field(&mut self, path: &str, value: TuningValue) -> Result<()> {
        if path != "camera/mode" {
            return Err(unknown_field(path));
        }
        let name = value.as_choice(path)?;
        let mode = CameraMode::from_name(name)
            .ok_or_else(|| BrushError::Configuration(format!("unknown camera mode '{name}'")))?;
        self.switch_to(mode);
        Ok(())
    }
}
