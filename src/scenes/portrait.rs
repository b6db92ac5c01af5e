use std::f32::consts::FRAC_PI_2;

use crate::config::{
    AccentConfig, AccentLightConfig, CameraConfig, DirectionalConfig, Framing, HemisphereConfig, LightsConfig,
    SceneConfig,
};
use crate::core::{LoopMode, Sway};
use crate::types::Color;

const MINT: u32 = 0x43c59e;

/// Tall portrait model on the about section: swaying figure with a floating mint accent
pub fn create_portrait_scene() -> SceneConfig {
    SceneConfig {
        canvas_id: "aboutModel".into(),
        model_url: "/static/models/mymodel.glb".into(),
        texture: None,
        camera: CameraConfig {
            position: [0.0, 1.4, 3.0],
            look_at: None,
            fov_degrees: 40.0,
            near: 0.1,
            far: 100.0,
        },
        lights: LightsConfig {
            hemisphere: Some(HemisphereConfig {
                sky: Color::from_hex(0xffffff),
                ground: Color::from_hex(0x444444),
                intensity: 1.5,
            }),
            directional: Some(DirectionalConfig {
                color: Color::from_hex(0xffffff),
                intensity: 1.2,
                position: [3.0, 10.0, 10.0],
            }),
            ambient: None,
        },
        framing: Framing {
            scale: [1.6; 3],
            position: [0.0, -1.0, 0.0],
            rotation: [0.0; 3],
        },
        sway: Some(Sway {
            max_rotation: FRAC_PI_2,
            speed: 0.007,
        }),
        accent: Some(AccentConfig {
            group_position: [0.0, 0.0, 0.5],
            baseline: 2.09,
            radius: 0.08,
            height: 0.18,
            segments: 3,
            inverted: true,
            color: Color::from_hex(MINT),
            emissive_intensity: 3.0,
            bounce_amplitude: 0.05,
            bounce_speed: 3.0,
            spin_speed: 0.015,
            light: AccentLightConfig {
                color: Color::from_hex(MINT),
                intensity: 1.5,
                range: 4.0,
            },
            light_offset: 0.05,
        }),
        hit_targets: Vec::new(),
        loop_mode: LoopMode::Repeat,
        preferred_size: [400, 560],
    }
}
