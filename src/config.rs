//! Declarative per-canvas scene configuration.
//!
//! Everything a scene instance needs is data: where the asset lives, the
//! camera and lights, the fixed framing, and the procedural motion. The two
//! page presets live in [`crate::scenes`]; a JSON file can replace them.

use anyhow::{Context, Result};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::{HitTarget, LoopMode, Sway};
use crate::loaders::{LoadRequest, TextureRequest};
use crate::types::{Color, Transform};

/// Colors are written as `"#rrggbb"` strings or plain `0xRRGGBB` integers
mod hex_color {
    use super::Color;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(color: &Color, serializer: S) -> Result<S::Ok, S::Error> {
        let [r, g, b] = [color.r, color.g, color.b].map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
        serializer.serialize_str(&format!("#{:02x}{:02x}{:02x}", r, g, b))
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u32),
        Text(String),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Color, D::Error> {
        let hex = match Raw::deserialize(deserializer)? {
            Raw::Number(n) => n,
            Raw::Text(text) => {
                let digits = text.trim_start_matches('#').trim_start_matches("0x");
                u32::from_str_radix(digits, 16)
                    .map_err(|_| de::Error::custom(format!("invalid color {:?}", text)))?
            }
        };
        if hex > 0xff_ffff {
            return Err(de::Error::custom(format!("color {:#x} out of range", hex)));
        }
        Ok(Color::from_hex(hex))
    }
}

fn default_near() -> f32 {
    0.1
}

fn default_far() -> f32 {
    100.0
}

fn default_scale() -> [f32; 3] {
    [1.0; 3]
}

fn default_size() -> [u32; 2] {
    [480, 480]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    pub position: [f32; 3],
    /// Target to face; without one the camera looks down -Z
    #[serde(default)]
    pub look_at: Option<[f32; 3]>,
    pub fov_degrees: f32,
    #[serde(default = "default_near")]
    pub near: f32,
    #[serde(default = "default_far")]
    pub far: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HemisphereConfig {
    #[serde(with = "hex_color")]
    pub sky: Color,
    #[serde(with = "hex_color")]
    pub ground: Color,
    pub intensity: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectionalConfig {
    #[serde(with = "hex_color")]
    pub color: Color,
    pub intensity: f32,
    pub position: [f32; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmbientConfig {
    #[serde(with = "hex_color")]
    pub color: Color,
    pub intensity: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LightsConfig {
    #[serde(default)]
    pub hemisphere: Option<HemisphereConfig>,
    #[serde(default)]
    pub directional: Option<DirectionalConfig>,
    #[serde(default)]
    pub ambient: Option<AmbientConfig>,
}

/// Fixed transform applied to the model root once, at attach time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Framing {
    #[serde(default = "default_scale")]
    pub scale: [f32; 3],
    #[serde(default)]
    pub position: [f32; 3],
    /// XYZ Euler angles, radians
    #[serde(default)]
    pub rotation: [f32; 3],
}

impl Framing {
    pub fn transform(&self) -> Transform {
        Transform::from_euler(
            Vec3::from_array(self.position),
            Vec3::from_array(self.rotation),
            Vec3::from_array(self.scale),
        )
    }
}

impl Default for Framing {
    fn default() -> Self {
        Self {
            scale: default_scale(),
            position: [0.0; 3],
            rotation: [0.0; 3],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccentLightConfig {
    #[serde(with = "hex_color")]
    pub color: Color,
    pub intensity: f32,
    pub range: f32,
}

/// Small emissive cone floating above the model, with a light that follows it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccentConfig {
    pub group_position: [f32; 3],
    /// Resting height of the cone inside its group
    pub baseline: f32,
    pub radius: f32,
    pub height: f32,
    pub segments: u32,
    /// Turn the cone upside down (π about X)
    #[serde(default)]
    pub inverted: bool,
    #[serde(with = "hex_color")]
    pub color: Color,
    pub emissive_intensity: f32,
    pub bounce_amplitude: f32,
    /// Radians per second
    pub bounce_speed: f32,
    /// Radians per reference frame
    pub spin_speed: f32,
    pub light: AccentLightConfig,
    /// Light height above the cone
    pub light_offset: f32,
}

/// One canvas and everything drawn into it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    pub canvas_id: String,
    pub model_url: String,
    #[serde(default)]
    pub texture: Option<TextureRequest>,
    pub camera: CameraConfig,
    #[serde(default)]
    pub lights: LightsConfig,
    #[serde(default)]
    pub framing: Framing,
    #[serde(default)]
    pub sway: Option<Sway>,
    #[serde(default)]
    pub accent: Option<AccentConfig>,
    #[serde(default)]
    pub hit_targets: Vec<HitTarget>,
    #[serde(default)]
    pub loop_mode: LoopMode,
    /// Window size used when no explicit mount is given
    #[serde(default = "default_size")]
    pub preferred_size: [u32; 2],
}

impl SceneConfig {
    pub fn load_request(&self) -> LoadRequest {
        LoadRequest {
            model_url: self.model_url.clone(),
            texture: self.texture.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageConfig {
    pub scenes: Vec<SceneConfig>,
}

impl StageConfig {
    /// The two scenes of the portfolio page
    pub fn builtin() -> Self {
        Self {
            scenes: crate::scenes::builtin(),
        }
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read stage config {:?}", path))?;
        Self::from_json(&json).with_context(|| format!("invalid stage config {:?}", path))
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
