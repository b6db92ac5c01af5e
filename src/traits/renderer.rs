use crate::camera::PerspectiveCamera;
use crate::core::{FrameBuffer, Viewport};
use crate::scene::{LightRig, SceneGraph};

/// Draws a scene graph through a camera into a pixel buffer
pub trait SceneRenderer {
    /// Set output size; the buffer is `viewport.buffer_size()` pixels
    fn set_size(&mut self, viewport: Viewport);

    /// Current output size
    fn viewport(&self) -> Viewport;

    /// Render one frame and return the finished buffer
    fn render(
        &mut self,
        graph: &SceneGraph,
        lights: &LightRig,
        camera: &PerspectiveCamera,
    ) -> &FrameBuffer;
}
