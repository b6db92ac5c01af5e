use crate::camera::PerspectiveCamera;
use crate::traits::SceneRenderer;

/// Displayed canvas size plus the device pixel ratio
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Logical (CSS) width
    pub width: u32,
    /// Logical (CSS) height
    pub height: u32,
    pub pixel_ratio: f32,
}

impl Viewport {
    pub fn new(width: u32, height: u32, pixel_ratio: f32) -> Self {
        Self {
            width,
            height,
            pixel_ratio,
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0 || !(self.pixel_ratio.is_finite() && self.pixel_ratio > 0.0)
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    /// Output resolution in device pixels, never below 1x1
    pub fn buffer_size(&self) -> (u32, u32) {
        let ratio = if self.pixel_ratio.is_finite() && self.pixel_ratio > 0.0 {
            self.pixel_ratio
        } else {
            1.0
        };
        (
            ((self.width as f32 * ratio).round() as u32).max(1),
            ((self.height as f32 * ratio).round() as u32).max(1),
        )
    }

    /// Total bytes of an RGBA8 buffer at `buffer_size()`
    pub fn byte_len(&self) -> usize {
        let (w, h) = self.buffer_size();
        w as usize * h as usize * 4
    }
}

/// What a resize notification did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeOutcome {
    Applied,
    /// Same size as before; nothing touched
    Unchanged,
    /// Zero-sized or invalid; ignored until a usable size arrives
    Degenerate,
}

/// Keeps camera aspect and renderer resolution in step with the canvas
#[derive(Debug, Clone)]
pub struct ViewportAdapter {
    current: Viewport,
}

impl ViewportAdapter {
    pub fn new(initial: Viewport) -> Self {
        Self { current: initial }
    }

    pub fn current(&self) -> Viewport {
        self.current
    }

    pub fn resize(
        &mut self,
        next: Viewport,
        camera: &mut PerspectiveCamera,
        renderer: &mut dyn SceneRenderer,
    ) -> ResizeOutcome {
        if next.is_degenerate() {
            log::debug!("ignoring degenerate viewport {:?}", next);
            return ResizeOutcome::Degenerate;
        }
        if next == self.current && renderer.viewport() == next {
            log::debug!("viewport unchanged at {}x{}", next.width, next.height);
            return ResizeOutcome::Unchanged;
        }

        self.current = next;
        camera.aspect = next.aspect();
        camera.update_projection();
        renderer.set_size(next);
        ResizeOutcome::Applied
    }
}
