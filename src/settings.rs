//! Render settings
//!
//! Stored as RON (Rusty Object Notation). Every field has a default so a
//! partial file is valid.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::rasterizer::{CullMode, Mat4, RasterSettings, Vec3};
use crate::world::Camera;

/// Error type for settings loading and saving
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("Serialize error: {0}")]
    Serialize(#[from] ron::Error),

    #[error("invalid setting: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub width: usize,
    pub height: usize,
    /// Model file (.obj or .ron). `None` renders the built-in cube.
    pub model_path: Option<PathBuf>,
    /// Output image. With more than one frame, the frame number is
    /// appended to the file stem.
    pub result_path: PathBuf,

    pub camera_position: Vec3,
    /// Yaw in degrees
    pub camera_theta: f32,
    /// Pitch in degrees
    pub camera_phi: f32,
    /// Vertical field of view in degrees
    pub camera_y_fov: f32,
    pub camera_z_near: f32,
    pub camera_z_far: f32,

    pub depth_test: bool,
    pub cull_mode: CullMode,
    pub perspective_correct: bool,

    pub frames: usize,
    /// Degrees of orbit around the model between frames
    pub orbit_step: f32,
    /// Direction the light travels toward (world space)
    pub light_direction: Vec3,

    /// Model orientation, euler angles in degrees applied Z * Y * X
    pub model_rotation: Vec3,
    /// Per-axis model scale, applied before rotation
    pub model_scale: Vec3,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            model_path: None,
            result_path: PathBuf::from("result.png"),
            camera_position: Vec3::new(0.0, 1.5, 5.0),
            camera_theta: 0.0,
            camera_phi: -15.0,
            camera_y_fov: 60.0,
            camera_z_near: 0.01,
            camera_z_far: 100.0,
            depth_test: true,
            cull_mode: CullMode::None,
            perspective_correct: false,
            frames: 1,
            orbit_step: 10.0,
            light_direction: Vec3::new(-0.4, -1.0, -0.6),
            model_rotation: Vec3::ZERO,
            model_scale: Vec3::ONE,
        }
    }
}

impl Settings {
    /// Load settings from a RON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let contents = fs::read_to_string(path.as_ref())?;
        let settings = Self::from_ron_str(&contents)?;
        log::info!("Loaded settings from {}", path.as_ref().display());
        Ok(settings)
    }

    pub fn from_ron_str(s: &str) -> Result<Self, SettingsError> {
        let settings: Settings = ron::from_str(s)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to a RON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SettingsError> {
        let config = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .indentor("  ".to_string());

        let contents = ron::ser::to_string_pretty(self, config)?;
        fs::write(path, contents)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.width == 0 || self.height == 0 {
            return Err(SettingsError::Invalid(format!(
                "resolution {}x{} has a zero dimension",
                self.width, self.height
            )));
        }
        if !(self.camera_z_near > 0.0 && self.camera_z_far > self.camera_z_near) {
            return Err(SettingsError::Invalid(format!(
                "clip planes near={} far={} must satisfy 0 < near < far",
                self.camera_z_near, self.camera_z_far
            )));
        }
        if !(self.camera_y_fov > 0.0 && self.camera_y_fov < 180.0) {
            return Err(SettingsError::Invalid(format!(
                "field of view {} outside (0, 180)",
                self.camera_y_fov
            )));
        }
        let s = self.model_scale;
        if [s.x, s.y, s.z].iter().any(|v| *v == 0.0 || !v.is_finite()) {
            return Err(SettingsError::Invalid(format!(
                "model scale ({}, {}, {}) must be finite and non-zero",
                s.x, s.y, s.z
            )));
        }
        Ok(())
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    pub fn camera(&self) -> Camera {
        Camera::new(self.camera_position, self.camera_theta, self.camera_phi).with_projection(
            self.camera_y_fov,
            self.aspect(),
            self.camera_z_near,
            self.camera_z_far,
        )
    }

    /// Model-to-world transform
    pub fn world_matrix(&self) -> Mat4 {
        Mat4::rotation(self.model_rotation) * Mat4::scaling(self.model_scale)
    }

    pub fn raster_settings(&self) -> RasterSettings {
        RasterSettings {
            cull_mode: self.cull_mode,
            perspective_correct: self.perspective_correct,
        }
    }

    /// Output path for one frame of the sequence
    pub fn frame_path(&self, frame: usize) -> PathBuf {
        if self.frames <= 1 {
            return self.result_path.clone();
        }
        let stem = self
            .result_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "frame".to_string());
        let name = match self.result_path.extension() {
            Some(ext) => format!("{}_{:04}.{}", stem, frame, ext.to_string_lossy()),
            None => format!("{}_{:04}", stem, frame),
        };
        self.result_path.with_file_name(name)
    }
}
