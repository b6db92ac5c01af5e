//! One canvas worth of engine state.
//!
//! A [`SceneInstance`] owns its camera, lights, graph, animation state and
//! renderer outright. It starts empty; rendering is a no-op until a model is
//! attached.

use glam::{Vec2, Vec3};
use std::f32::consts::PI;

use super::graph::{Node, NodeId, SceneGraph};
use super::lights::{DirectionalLight, HemisphereLight, LightRig, PointLight};
use super::primitives::cone;
use crate::camera::PerspectiveCamera;
use crate::config::{AccentConfig, SceneConfig};
use crate::core::{
    hit_test, resolve_action, AccentBinding, AnimationScheduler, AnimationState, CanvasRect, ClipPlayer, FrameBuffer,
    FrameTime, Hit, HitTarget, MeshMatch, Oscillator, ResizeOutcome, SwayBinding, Viewport, ViewportAdapter,
};
use crate::error::AttachWarning;
use crate::loaders::{ModelAsset, TextureBinding};
use crate::traits::{Action, ActionDispatcher, SceneRenderer};
use crate::types::{Material, Transform};

pub struct SceneInstance {
    config: SceneConfig,
    camera: PerspectiveCamera,
    lights: LightRig,
    graph: SceneGraph,
    model_root: Option<NodeId>,
    animation: AnimationScheduler,
    viewport: ViewportAdapter,
    renderer: Box<dyn SceneRenderer>,
    hit_targets: Vec<HitTarget>,
}

impl SceneInstance {
    pub fn new(config: SceneConfig, viewport: Viewport, mut renderer: Box<dyn SceneRenderer>) -> Self {
        let cam = &config.camera;
        let mut camera = PerspectiveCamera::new(cam.fov_degrees, viewport.aspect(), cam.near, cam.far)
            .with_position(Vec3::from_array(cam.position));
        if let Some(target) = cam.look_at {
            camera.look_at(Vec3::from_array(target));
        }

        renderer.set_size(viewport);

        let lights = LightRig {
            ambient: config.lights.ambient.as_ref().map(|a| (a.color, a.intensity)),
            hemisphere: config.lights.hemisphere.as_ref().map(|h| HemisphereLight {
                sky: h.sky,
                ground: h.ground,
                intensity: h.intensity,
            }),
            directional: config.lights.directional.as_ref().map(|d| DirectionalLight {
                color: d.color,
                intensity: d.intensity,
                position: Vec3::from_array(d.position),
            }),
            point: None,
        };

        Self {
            config,
            camera,
            lights,
            graph: SceneGraph::new(),
            model_root: None,
            animation: AnimationScheduler::new(),
            viewport: ViewportAdapter::new(viewport),
            renderer,
            hit_targets: Vec::new(),
        }
    }

    pub fn canvas_id(&self) -> &str {
        &self.config.canvas_id
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn is_ready(&self) -> bool {
        self.model_root.is_some()
    }

    pub fn model_root(&self) -> Option<NodeId> {
        self.model_root
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn lights(&self) -> &LightRig {
        &self.lights
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn animation_state(&self) -> &AnimationState {
        self.animation.state()
    }

    pub fn animation(&self) -> &AnimationScheduler {
        &self.animation
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport.current()
    }

    /// Hit targets that survived validation at attach time
    pub fn hit_targets(&self) -> &[HitTarget] {
        &self.hit_targets
    }

    /// Insert the loaded model under the scene root with its framing, then
    /// bind textures, validate hit targets, retarget the first clip and set
    /// up procedural motion. Problems with individual names are returned as
    /// warnings; the rest of the attachment still happens.
    pub fn attach(&mut self, asset: ModelAsset) -> Vec<AttachWarning> {
        if self.model_root.is_some() {
            log::warn!("{}: model already attached, ignoring {}", self.canvas_id(), asset.source_url);
            return vec![AttachWarning::AlreadyAttached(asset.source_url)];
        }

        let framing = self.config.framing.transform();
        let root = self.graph.add(self.graph.root(), Node::group("model", framing));

        let ModelAsset {
            source_url,
            nodes,
            roots,
            clips,
            texture_binding,
            ..
        } = asset;

        // asset node index -> graph node
        let mut mapping: Vec<Option<NodeId>> = vec![None; nodes.len()];
        let mut nodes: Vec<Option<_>> = nodes.into_iter().map(Some).collect();
        let mut stack: Vec<(usize, NodeId)> = roots.iter().rev().map(|&r| (r, root)).collect();
        while let Some((index, parent)) = stack.pop() {
            let Some(node) = nodes.get_mut(index).and_then(Option::take) else {
                continue;
            };
            let id = self
                .graph
                .add(parent, Node::new(node.name, node.transform, node.mesh));
            mapping[index] = Some(id);
            stack.extend(node.children.iter().rev().map(|&c| (c, id)));
        }

        let mut warnings = Vec::new();

        if let Some(binding) = texture_binding {
            if let Err(warning) = self.bind_texture(&binding) {
                warnings.push(warning);
            }
        }

        for target in &self.config.hit_targets {
            if let MeshMatch::Named(name) = &target.mesh {
                if self.graph.find(name).is_empty() {
                    warnings.push(AttachWarning::MissingTargetMesh(name.clone()));
                    continue;
                }
            }
            self.hit_targets.push(target.clone());
        }

        let mut scheduler = AnimationScheduler::new();
        if let Some(clip) = clips.into_iter().next() {
            log::debug!("{}: playing clip {:?} ({:.2}s)", self.canvas_id(), clip.name, clip.duration);
            scheduler = scheduler.with_clip(ClipPlayer::new(clip, self.config.loop_mode, |i| {
                mapping.get(i).copied().flatten()
            }));
        }
        if let Some(sway) = self.config.sway {
            scheduler = scheduler.with_sway(SwayBinding {
                node: root,
                sway,
                rest: Vec3::from_array(self.config.framing.rotation),
            });
        }
        if let Some(accent) = self.config.accent.clone() {
            if let Some(binding) = self.build_accent(&accent) {
                scheduler = scheduler.with_accent(binding);
            }
        }
        self.animation = scheduler;
        self.model_root = Some(root);

        for warning in &warnings {
            log::warn!("{}: {}", self.canvas_id(), warning);
        }
        log::info!("{}: attached {} ({} nodes)", self.canvas_id(), source_url, self.graph.len());
        warnings
    }

    /// Swap every primitive of every node with the binding's name for an unlit textured one
    fn bind_texture(&mut self, binding: &TextureBinding) -> Result<(), AttachWarning> {
        let targets: Vec<NodeId> = self
            .graph
            .find(&binding.mesh)
            .iter()
            .copied()
            .filter(|&id| self.graph.node(id).mesh.is_some())
            .collect();
        if targets.is_empty() {
            return Err(AttachWarning::MissingTargetMesh(binding.mesh.clone()));
        }

        for id in targets {
            if let Some(mesh) = &mut self.graph.node_mut(id).mesh {
                for primitive in &mut mesh.primitives {
                    primitive.material = Material::Unlit {
                        texture: binding.texture.clone(),
                    };
                }
            }
        }
        Ok(())
    }

    fn build_accent(&mut self, accent: &AccentConfig) -> Option<AccentBinding> {
        let material = Material::Standard {
            base_color: [accent.color.r, accent.color.g, accent.color.b, 1.0],
            emissive: accent.color,
            emissive_intensity: accent.emissive_intensity,
            texture: None,
            double_sided: false,
        };
        let mesh = cone(accent.radius, accent.height, accent.segments, material)?;

        let group = self.graph.add(
            self.graph.root(),
            Node::group("accent", Transform::from_translation(Vec3::from_array(accent.group_position))),
        );
        let flip = if accent.inverted { PI } else { 0.0 };
        let bob = self.graph.add(
            group,
            Node::new(
                Some("accent_cone".into()),
                Transform::from_euler(Vec3::new(0.0, accent.baseline, 0.0), Vec3::new(flip, 0.0, 0.0), Vec3::ONE),
                Some(mesh),
            ),
        );

        let light_offset = Vec3::new(0.0, accent.light_offset, 0.0);
        self.lights.point = Some(PointLight {
            color: accent.light.color,
            intensity: accent.light.intensity,
            range: accent.light.range,
            anchor: group,
            offset: Vec3::new(0.0, accent.baseline, 0.0) + light_offset,
        });

        Some(AccentBinding {
            group,
            bob,
            bounce: Oscillator {
                baseline: accent.baseline,
                amplitude: accent.bounce_amplitude,
                angular_speed: accent.bounce_speed,
            },
            spin_speed: accent.spin_speed,
            light_offset,
        })
    }

    /// Advance animation by one frame. Nothing moves before attach.
    pub fn tick(&mut self, time: FrameTime) {
        if self.model_root.is_none() {
            return;
        }
        self.animation.tick(time, &mut self.graph, &mut self.lights);
    }

    /// Draw the current state; `None` (and no work) before attach
    pub fn render(&mut self) -> Option<&FrameBuffer> {
        self.model_root?;
        Some(self.renderer.render(&self.graph, &self.lights, &self.camera))
    }

    pub fn resize(&mut self, width: u32, height: u32, pixel_ratio: f32) -> ResizeOutcome {
        self.viewport.resize(
            Viewport::new(width, height, pixel_ratio),
            &mut self.camera,
            self.renderer.as_mut(),
        )
    }

    /// Nearest model mesh under `pointer`
    pub fn hit_test(&self, pointer: Vec2, rect: &CanvasRect) -> Option<Hit> {
        let root = self.model_root?;
        hit_test(pointer, rect, &self.camera, &self.graph, root)
    }

    /// Resolve a click and dispatch the bound action, at most once
    pub fn click(&self, pointer: Vec2, rect: &CanvasRect, dispatcher: &dyn ActionDispatcher) -> Option<Action> {
        let hit = self.hit_test(pointer, rect)?;
        let action = resolve_action(&self.hit_targets, &hit)?;
        log::debug!("{}: click on {:?} -> {:?}", self.canvas_id(), hit.name, action);
        dispatcher.dispatch(action);
        Some(action.clone())
    }
}

impl std::fmt::Debug for SceneInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneInstance")
            .field("canvas_id", &self.config.canvas_id)
            .field("model_root", &self.model_root)
            .field("viewport", &self.viewport.current())
            .finish_non_exhaustive()
    }
}
