use std::f32::consts::{FRAC_PI_2, FRAC_PI_8};

use crate::config::{CameraConfig, DirectionalConfig, Framing, HemisphereConfig, LightsConfig, SceneConfig};
use crate::core::{HitTarget, LoopMode, MeshMatch, Sway};
use crate::loaders::TextureRequest;
use crate::traits::Action;
use crate::types::Color;

pub const SCREEN_MESH: &str = "Computer1_Screen001_0";
pub const PROFILE_URL: &str = "https://github.com/akshat281204";

/// Desk computer whose screen shows the GitHub profile; clicking it opens the profile
pub fn create_workstation_scene() -> SceneConfig {
    SceneConfig {
        canvas_id: "githubModel".into(),
        model_url: "/static/models/Computer.glb".into(),
        texture: Some(TextureRequest {
            url: "/static/images/github-screen.png".into(),
            mesh: SCREEN_MESH.into(),
        }),
        camera: CameraConfig {
            position: [0.0, 0.8, 2.8],
            look_at: Some([0.0; 3]),
            fov_degrees: 45.0,
            near: 0.1,
            far: 100.0,
        },
        lights: LightsConfig {
            hemisphere: Some(HemisphereConfig {
                sky: Color::from_hex(0xffffff),
                ground: Color::from_hex(0x222222),
                intensity: 1.2,
            }),
            directional: Some(DirectionalConfig {
                color: Color::from_hex(0xffffff),
                intensity: 1.5,
                position: [5.0, 10.0, 5.0],
            }),
            ambient: None,
        },
        framing: Framing {
            scale: [2.2, 2.0, 2.2],
            position: [0.0, -0.2, 0.0],
            rotation: [-0.05, FRAC_PI_2, 0.0],
        },
        // sways about the framing yaw of π/2
        sway: Some(Sway {
            max_rotation: FRAC_PI_8,
            speed: 0.007,
        }),
        accent: None,
        // any part of the computer counts, not just the screen
        hit_targets: vec![HitTarget {
            mesh: MeshMatch::Any,
            action: Action::OpenUrl {
                url: PROFILE_URL.into(),
            },
        }],
        loop_mode: LoopMode::Repeat,
        preferred_size: [560, 420],
    }
}
