//! Host glue: one [`Stage`] per mounted canvas, and the [`Page`] that owns them.
//!
//! A stage starts loading as soon as it is mounted. The host polls it from
//! its event loop; once the load resolves the stage either attaches the
//! model and starts its render loop, or stays inert for good.

use futures::task::noop_waker_ref;
use futures::{FutureExt, StreamExt};
use glam::Vec2;
use std::task::{Context, Poll};

use crate::config::{SceneConfig, StageConfig};
use crate::core::{CanvasRect, FrameBuffer, FrameTime, RenderLoop, ResizeOutcome, Viewport};
use crate::error::{AttachWarning, LoadError};
use crate::loaders::{AssetLoader, LoadProgress, LoadTask};
use crate::scene::SceneInstance;
use crate::traits::{Action, ActionDispatcher, MountRegistry, SceneRenderer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageState {
    Loading,
    Ready,
    /// Load failed; the canvas stays empty
    Failed,
}

/// Receives the advisory and terminal signals of a stage's load
pub trait LoadObserver {
    fn on_progress(&mut self, canvas_id: &str, progress: LoadProgress);
    fn on_ready(&mut self, canvas_id: &str, warnings: &[AttachWarning]);
    fn on_failure(&mut self, canvas_id: &str, error: &LoadError);
}

/// Reports loads on the operator log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl LoadObserver for LogObserver {
    fn on_progress(&mut self, canvas_id: &str, progress: LoadProgress) {
        match progress.fraction() {
            Some(fraction) => log::info!("{}: model loading {:.2}%", canvas_id, fraction * 100.0),
            None => log::info!("{}: model loading {} bytes", canvas_id, progress.loaded),
        }
    }

    fn on_ready(&mut self, canvas_id: &str, warnings: &[AttachWarning]) {
        log::info!("{}: model ready ({} warnings)", canvas_id, warnings.len());
    }

    fn on_failure(&mut self, canvas_id: &str, error: &LoadError) {
        log::error!("{}: error loading model: {}", canvas_id, error);
    }
}

pub struct Stage {
    instance: SceneInstance,
    render_loop: RenderLoop,
    state: StageState,
    load: Option<LoadTask>,
}

impl Stage {
    /// Bind `config` to its canvas and start loading.
    ///
    /// Returns `None` without touching the loader when the canvas is not on
    /// the page.
    pub fn mount(
        config: SceneConfig,
        registry: &dyn MountRegistry,
        loader: &AssetLoader,
        renderer: impl FnOnce(Viewport) -> Box<dyn SceneRenderer>,
    ) -> Option<Self> {
        let Some(mount) = registry.lookup(&config.canvas_id) else {
            log::debug!("{}: no canvas mounted, skipping", config.canvas_id);
            return None;
        };

        let viewport = Viewport::new(mount.width, mount.height, mount.pixel_ratio);
        let load = loader.load(config.load_request());
        let instance = SceneInstance::new(config, viewport, renderer(viewport));

        Some(Self {
            instance,
            render_loop: RenderLoop::new(),
            state: StageState::Loading,
            load: Some(load),
        })
    }

    pub fn canvas_id(&self) -> &str {
        self.instance.canvas_id()
    }

    pub fn state(&self) -> StageState {
        self.state
    }

    pub fn instance(&self) -> &SceneInstance {
        &self.instance
    }

    pub fn render_loop(&self) -> &RenderLoop {
        &self.render_loop
    }

    /// Forward pending progress and check whether the load has finished.
    /// Exactly one of `on_ready` / `on_failure` fires over the stage's life.
    pub fn poll_load(&mut self, observer: &mut dyn LoadObserver) -> StageState {
        let Some(task) = self.load.as_mut() else {
            return self.state;
        };

        let mut cx = Context::from_waker(noop_waker_ref());
        let outcome = task.outcome.poll_unpin(&mut cx);

        while let Poll::Ready(Some(progress)) = task.progress.poll_next_unpin(&mut cx) {
            observer.on_progress(self.instance.canvas_id(), progress);
        }

        let Poll::Ready(result) = outcome else {
            return self.state;
        };
        self.load = None;

        match result {
            Ok(asset) => {
                let warnings = self.instance.attach(asset);
                self.state = StageState::Ready;
                self.render_loop.start();
                observer.on_ready(self.instance.canvas_id(), &warnings);
            }
            Err(error) => {
                self.state = StageState::Failed;
                observer.on_failure(self.instance.canvas_id(), &error);
            }
        }
        self.state
    }

    /// Tick and draw one frame
    pub fn frame(&mut self, time: FrameTime) -> Option<&FrameBuffer> {
        self.render_loop.frame(&mut self.instance, time)
    }

    pub fn resize(&mut self, width: u32, height: u32, pixel_ratio: f32) -> ResizeOutcome {
        self.instance.resize(width, height, pixel_ratio)
    }

    pub fn click(&self, pointer: Vec2, rect: &CanvasRect, dispatcher: &dyn ActionDispatcher) -> Option<Action> {
        self.instance.click(pointer, rect, dispatcher)
    }

    /// Page teardown
    pub fn stop(&mut self) {
        self.render_loop.stop();
    }
}

impl std::fmt::Debug for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stage")
            .field("canvas_id", &self.canvas_id())
            .field("state", &self.state)
            .field("render_loop", &self.render_loop)
            .finish_non_exhaustive()
    }
}

/// Every stage on the page. Stages share nothing mutable.
#[derive(Debug, Default)]
pub struct Page {
    stages: Vec<Stage>,
}

impl Page {
    /// Mount every configured scene whose canvas exists
    pub fn mount(
        config: &StageConfig,
        registry: &dyn MountRegistry,
        loader: &AssetLoader,
        renderer: impl Fn(Viewport) -> Box<dyn SceneRenderer>,
    ) -> Self {
        let stages = config
            .scenes
            .iter()
            .filter_map(|scene| Stage::mount(scene.clone(), registry, loader, &renderer))
            .collect();
        Self { stages }
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn stages_mut(&mut self) -> &mut [Stage] {
        &mut self.stages
    }

    pub fn stage_mut(&mut self, canvas_id: &str) -> Option<&mut Stage> {
        self.stages.iter_mut().find(|s| s.canvas_id() == canvas_id)
    }

    pub fn poll_loads(&mut self, observer: &mut dyn LoadObserver) {
        for stage in &mut self.stages {
            stage.poll_load(observer);
        }
    }

    /// True once no stage is still loading
    pub fn settled(&self) -> bool {
        self.stages.iter().all(|s| s.state() != StageState::Loading)
    }

    pub fn stop(&mut self) {
        for stage in &mut self.stages {
            stage.stop();
        }
    }
}
