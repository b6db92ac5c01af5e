mod common;

use canvas_stage::camera::PerspectiveCamera;
use canvas_stage::core::{FrameBuffer, ResizeOutcome, SoftwareRenderer, Viewport, ViewportAdapter};
use canvas_stage::loaders::parse_model;
use canvas_stage::scene::{LightRig, SceneGraph};
use canvas_stage::traits::SceneRenderer;
use canvas_stage::SceneInstance;
use common::{quad_model, quad_scene, MODEL_URL};
use std::cell::Cell;
use std::rc::Rc;

/// Wraps the software renderer and counts `set_size` calls
struct CountingRenderer {
    inner: SoftwareRenderer,
    resizes: Rc<Cell<usize>>,
}

impl SceneRenderer for CountingRenderer {
    fn set_size(&mut self, viewport: Viewport) {
        self.resizes.set(self.resizes.get() + 1);
        self.inner.set_size(viewport);
    }

    fn viewport(&self) -> Viewport {
        self.inner.viewport()
    }

    fn render(&mut self, graph: &SceneGraph, lights: &LightRig, camera: &PerspectiveCamera) -> &FrameBuffer {
        self.inner.render(graph, lights, camera)
    }
}

fn counted_scene() -> (SceneInstance, Rc<Cell<usize>>) {
    let resizes = Rc::new(Cell::new(0));
    let viewport = Viewport::new(64, 48, 1.0);
    let renderer = CountingRenderer {
        inner: SoftwareRenderer::new(viewport),
        resizes: resizes.clone(),
    };
    let mut scene = SceneInstance::new(quad_scene("hero"), viewport, Box::new(renderer));
    scene.attach(parse_model(MODEL_URL, &quad_model("Screen", false)).unwrap());
    (scene, resizes)
}

#[test]
fn test_resize_updates_aspect_and_output() {
    let (mut scene, _) = counted_scene();

    assert_eq!(scene.resize(300, 150, 2.0), ResizeOutcome::Applied);
    assert!((scene.camera().aspect - 2.0).abs() < 1e-6);

    let frame = scene.render().unwrap();
    assert_eq!((frame.width(), frame.height()), (600, 300));
}

#[test]
fn test_repeated_resize_changes_nothing() {
    let (mut scene, resizes) = counted_scene();
    let initial = resizes.get();

    assert_eq!(scene.resize(120, 80, 1.0), ResizeOutcome::Applied);
    let projection = scene.camera().projection_matrix();
    assert_eq!(resizes.get(), initial + 1);

    assert_eq!(scene.resize(120, 80, 1.0), ResizeOutcome::Unchanged);
    assert_eq!(scene.resize(120, 80, 1.0), ResizeOutcome::Unchanged);
    assert_eq!(resizes.get(), initial + 1);
    assert_eq!(scene.camera().projection_matrix(), projection);
}

#[test]
fn test_degenerate_sizes_are_ignored() {
    let (mut scene, resizes) = counted_scene();
    let before = scene.viewport();
    let calls = resizes.get();

    assert_eq!(scene.resize(0, 80, 1.0), ResizeOutcome::Degenerate);
    assert_eq!(scene.resize(80, 80, 0.0), ResizeOutcome::Degenerate);
    assert_eq!(scene.viewport(), before);
    assert_eq!(resizes.get(), calls);
}

#[test]
fn test_pixel_ratio_change_alone_resizes_output() {
    let (mut scene, _) = counted_scene();
    assert_eq!(scene.resize(64, 48, 1.5), ResizeOutcome::Applied);
    let frame = scene.render().unwrap();
    assert_eq!((frame.width(), frame.height()), (96, 72));
}

#[test]
fn test_rendered_quad_is_centered() {
    let (mut scene, _) = counted_scene();
    let frame = scene.render().unwrap();

    let center = frame.pixel(32, 24).unwrap();
    assert_eq!(center[3], 255);
    assert_eq!(frame.pixel(0, 0), Some([0, 0, 0, 0]));
}

#[test]
fn test_adapter_without_instance() {
    let initial = Viewport::new(10, 10, 1.0);
    let mut adapter = ViewportAdapter::new(initial);
    let mut camera = PerspectiveCamera::new(45.0, 1.0, 0.1, 100.0);
    let mut renderer = SoftwareRenderer::new(initial);

    let outcome = adapter.resize(Viewport::new(40, 10, 1.0), &mut camera, &mut renderer);
    assert_eq!(outcome, ResizeOutcome::Applied);
    assert_eq!(camera.aspect, 4.0);
    assert_eq!(renderer.buffer().width(), 40);
}
