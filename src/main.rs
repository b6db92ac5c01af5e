use anyhow::{Context, Result};
use clap::Parser;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use canvas_stage::cli::Cli;
use canvas_stage::core::{CanvasRect, Clock, GpuContext, PointerTracker, SoftwareRenderer, SurfacePresenter};
use canvas_stage::loaders::{AssetLoader, FileSource};
use canvas_stage::traits::{ActionDispatcher, LogDispatcher, SceneRenderer, SystemOpener};
use canvas_stage::{LogObserver, Page, StageConfig, StageState};

/// Native stand-in for one canvas element
struct CanvasWindow {
    canvas_id: String,
    window: Arc<Window>,
    presenter: SurfacePresenter,
    clock: Clock,
    pointer: PointerTracker,
}

struct App {
    page: Page,
    dispatcher: Box<dyn ActionDispatcher>,
    observer: LogObserver,
    gpu: Option<GpuContext>,
    windows: HashMap<WindowId, CanvasWindow>,
    frames_left: Option<u64>,
}

impl App {
    fn new(page: Page, dispatcher: Box<dyn ActionDispatcher>, frames: Option<u64>) -> Self {
        Self {
            page,
            dispatcher,
            observer: LogObserver,
            gpu: None,
            windows: HashMap::new(),
            frames_left: frames,
        }
    }

    fn open_windows(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let gpu = pollster::block_on(GpuContext::new()).context("failed to initialize GPU")?;

        for stage in self.page.stages_mut() {
            let viewport = stage.instance().viewport();
            let window = event_loop
                .create_window(
                    Window::default_attributes()
                        .with_title(stage.canvas_id())
                        .with_transparent(true)
                        .with_inner_size(winit::dpi::LogicalSize::new(viewport.width, viewport.height)),
                )
                .with_context(|| format!("failed to create window for {}", stage.canvas_id()))?;
            let window = Arc::new(window);

            let presenter = SurfacePresenter::new(window.clone(), gpu.clone())
                .with_context(|| format!("failed to create surface for {}", stage.canvas_id()))?;

            let scale = window.scale_factor();
            let logical = window.inner_size().to_logical::<u32>(scale);
            stage.resize(logical.width, logical.height, scale as f32);

            self.windows.insert(
                window.id(),
                CanvasWindow {
                    canvas_id: stage.canvas_id().to_string(),
                    window,
                    presenter,
                    clock: Clock::new(),
                    pointer: PointerTracker::new(),
                },
            );
        }

        self.gpu = Some(gpu);
        Ok(())
    }

    fn redraw(&mut self, window_id: WindowId) {
        let Some(canvas) = self.windows.get_mut(&window_id) else {
            return;
        };
        let Some(stage) = self.page.stage_mut(&canvas.canvas_id) else {
            return;
        };

        let time = canvas.clock.tick();
        if let Some(frame) = stage.frame(time) {
            if let Err(e) = canvas.presenter.present(frame) {
                log::error!("{}: present failed: {}", canvas.canvas_id, e);
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        if let Err(e) = self.open_windows(event_loop) {
            log::error!("{:#}", e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => {
                self.page.stop();
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                let Some(canvas) = self.windows.get_mut(&window_id) else {
                    return;
                };
                canvas.presenter.resize(size.width, size.height);
                let scale = canvas.window.scale_factor();
                let logical = size.to_logical::<u32>(scale);
                if let Some(stage) = self.page.stage_mut(&canvas.canvas_id) {
                    let outcome = stage.resize(logical.width, logical.height, scale as f32);
                    log::debug!("{}: resize {:?}", canvas.canvas_id, outcome);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(window_id),
            other => {
                let Some(canvas) = self.windows.get_mut(&window_id) else {
                    return;
                };
                let Some(pointer) = canvas.pointer.process_event(&other) else {
                    return;
                };
                let size = canvas.window.inner_size();
                let rect = CanvasRect::sized(size.width as f32, size.height as f32);
                if let Some(stage) = self.page.stage_mut(&canvas.canvas_id) {
                    stage.click(pointer, &rect, self.dispatcher.as_ref());
                }
            }
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        self.page.poll_loads(&mut self.observer);

        // animation time starts once the model is ready
        for canvas in self.windows.values_mut() {
            let loading = self
                .page
                .stages()
                .iter()
                .any(|s| s.canvas_id() == canvas.canvas_id && s.state() == StageState::Loading);
            if loading {
                canvas.clock.reset();
            }
            canvas.window.request_redraw();
        }

        if let Some(left) = self.frames_left.as_mut() {
            if self.page.settled() {
                *left = left.saturating_sub(1);
            }
            if *left == 0 {
                self.page.stop();
                event_loop.exit();
            }
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => StageConfig::load(path)?,
        None => StageConfig::builtin(),
    };
    let registry = cli.mount_registry(&config);
    let loader = AssetLoader::new(Rc::new(FileSource::new(&cli.assets)));

    let page = Page::mount(&config, &registry, &loader, |viewport| {
        Box::new(SoftwareRenderer::new(viewport)) as Box<dyn SceneRenderer>
    });
    if page.is_empty() {
        log::warn!("no configured canvas is mounted; nothing to show");
        return Ok(());
    }

    let dispatcher: Box<dyn ActionDispatcher> = if cli.dry_run {
        Box::new(LogDispatcher)
    } else {
        Box::new(SystemOpener)
    };

    let event_loop = EventLoop::new()?;
    let mut app = App::new(page, dispatcher, cli.frames);
    event_loop.run_app(&mut app)?;

    Ok(())
}
