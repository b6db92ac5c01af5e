//! Shared fixtures: tiny GLB models and PNG textures built in memory.
#![allow(dead_code)]

use canvas_stage::config::{CameraConfig, HemisphereConfig, LightsConfig, SceneConfig};
use canvas_stage::core::{HitTarget, LoopMode, MeshMatch, Sway};
use canvas_stage::traits::{Action, ActionDispatcher};
use canvas_stage::types::Color;
use canvas_stage::{LoadObserver, Page, Stage, StageState};
use serde_json::json;
use std::cell::RefCell;
use std::io::Cursor;
use std::thread;
use std::time::Duration;

pub const MODEL_URL: &str = "/static/models/quad.glb";
pub const TEXTURE_URL: &str = "/static/images/screen.png";
pub const TARGET_URL: &str = "https://example.com/profile";

const GLB_MAGIC: u32 = 0x4654_6C67;
const CHUNK_JSON: u32 = 0x4E4F_534A;
const CHUNK_BIN: u32 = 0x004E_4942;

fn pad(bytes: &mut Vec<u8>, with: u8) {
    while bytes.len() % 4 != 0 {
        bytes.push(with);
    }
}

/// Wrap a glTF JSON document and its binary buffer into a GLB container
pub fn glb(document: &serde_json::Value, bin: &[u8]) -> Vec<u8> {
    let mut json = serde_json::to_vec(document).unwrap();
    pad(&mut json, b' ');
    let mut bin = bin.to_vec();
    pad(&mut bin, 0);

    let total = 12 + 8 + json.len() + 8 + bin.len();
    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(&GLB_MAGIC.to_le_bytes());
    out.extend_from_slice(&2u32.to_le_bytes());
    out.extend_from_slice(&(total as u32).to_le_bytes());
    out.extend_from_slice(&(json.len() as u32).to_le_bytes());
    out.extend_from_slice(&CHUNK_JSON.to_le_bytes());
    out.extend_from_slice(&json);
    out.extend_from_slice(&(bin.len() as u32).to_le_bytes());
    out.extend_from_slice(&CHUNK_BIN.to_le_bytes());
    out.extend_from_slice(&bin);
    out
}

fn f32_bytes(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// A unit quad facing +Z, named `mesh_name`, under a parent node "Body".
///
/// With `animated`, a one-second clip moves "Body" from y=0 to y=1.
pub fn quad_model(mesh_name: &str, animated: bool) -> Vec<u8> {
    let positions = f32_bytes(&[
        -0.5, -0.5, 0.0, //
        0.5, -0.5, 0.0, //
        0.5, 0.5, 0.0, //
        -0.5, 0.5, 0.0,
    ]);
    let indices: Vec<u8> = [0u16, 1, 2, 0, 2, 3].iter().flat_map(|i| i.to_le_bytes()).collect();

    let mut bin = positions.clone();
    bin.extend_from_slice(&indices);
    pad(&mut bin, 0);
    let times_offset = bin.len();
    bin.extend_from_slice(&f32_bytes(&[0.0, 1.0]));
    let outputs_offset = bin.len();
    bin.extend_from_slice(&f32_bytes(&[0.0, 0.0, 0.0, 0.0, 1.0, 0.0]));

    let mut document = json!({
        "asset": {"version": "2.0"},
        "scene": 0,
        "scenes": [{"nodes": [0]}],
        "nodes": [
            {"name": "Body", "children": [1]},
            {"name": mesh_name, "mesh": 0}
        ],
        "meshes": [{
            "name": mesh_name,
            "primitives": [{"attributes": {"POSITION": 0}, "indices": 1}]
        }],
        "buffers": [{"byteLength": bin.len()}],
        "bufferViews": [
            {"buffer": 0, "byteOffset": 0, "byteLength": positions.len()},
            {"buffer": 0, "byteOffset": positions.len(), "byteLength": indices.len()},
            {"buffer": 0, "byteOffset": times_offset, "byteLength": 8},
            {"buffer": 0, "byteOffset": outputs_offset, "byteLength": 24}
        ],
        "accessors": [
            {
                "bufferView": 0, "componentType": 5126, "count": 4, "type": "VEC3",
                "min": [-0.5, -0.5, 0.0], "max": [0.5, 0.5, 0.0]
            },
            {"bufferView": 1, "componentType": 5123, "count": 6, "type": "SCALAR"},
            {
                "bufferView": 2, "componentType": 5126, "count": 2, "type": "SCALAR",
                "min": [0.0], "max": [1.0]
            },
            {"bufferView": 3, "componentType": 5126, "count": 2, "type": "VEC3"}
        ]
    });

    if animated {
        document["animations"] = json!([{
            "name": "Rise",
            "channels": [{"sampler": 0, "target": {"node": 0, "path": "translation"}}],
            "samplers": [{"input": 2, "output": 3, "interpolation": "LINEAR"}]
        }]);
    }

    glb(&document, &bin)
}

/// Solid-colour PNG
pub fn png(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    let image = image::RgbaImage::from_pixel(width, height, image::Rgba(rgba));
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

/// Camera three units back on +Z, facing the quad; clicking "Screen" opens [`TARGET_URL`]
pub fn quad_scene(canvas_id: &str) -> SceneConfig {
    SceneConfig {
        canvas_id: canvas_id.into(),
        model_url: MODEL_URL.into(),
        texture: None,
        camera: CameraConfig {
            position: [0.0, 0.0, 3.0],
            look_at: Some([0.0; 3]),
            fov_degrees: 45.0,
            near: 0.1,
            far: 100.0,
        },
        lights: LightsConfig {
            hemisphere: Some(HemisphereConfig {
                sky: Color::WHITE,
                ground: Color::from_hex(0x444444),
                intensity: 1.5,
            }),
            directional: None,
            ambient: None,
        },
        framing: Default::default(),
        sway: Some(Sway {
            max_rotation: 0.3,
            speed: 0.007,
        }),
        accent: None,
        hit_targets: vec![HitTarget {
            mesh: MeshMatch::Named("Screen".into()),
            action: Action::OpenUrl {
                url: TARGET_URL.into(),
            },
        }],
        loop_mode: LoopMode::Repeat,
        preferred_size: [64, 48],
    }
}

/// Remembers every dispatched action
#[derive(Default)]
pub struct RecordingDispatcher {
    pub actions: RefCell<Vec<Action>>,
}

impl ActionDispatcher for RecordingDispatcher {
    fn dispatch(&self, action: &Action) {
        self.actions.borrow_mut().push(action.clone());
    }
}

/// Poll a stage the way a host event loop does, until its load settles.
/// Decoding runs on a worker thread, so this takes more than one poll.
pub fn settle(stage: &mut Stage, observer: &mut dyn LoadObserver) -> StageState {
    for _ in 0..5000 {
        let state = stage.poll_load(observer);
        if state != StageState::Loading {
            return state;
        }
        thread::sleep(Duration::from_millis(1));
    }
    stage.state()
}

pub fn settle_page(page: &mut Page, observer: &mut dyn LoadObserver) {
    for _ in 0..5000 {
        page.poll_loads(observer);
        if page.settled() {
            return;
        }
        thread::sleep(Duration::from_millis(1));
    }
}
