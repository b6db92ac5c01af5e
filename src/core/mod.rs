pub mod animation;
pub mod clip;
pub mod clock;
pub mod gpu_context;
pub mod input_adapter;
pub mod rasterizer;
pub mod raycaster;
pub mod render_loop;
pub mod surface_presenter;
pub mod triangle_intersection;
pub mod viewport;

pub use animation::{
    clamp_delta, AccentBinding, AnimationScheduler, AnimationState, Oscillator, Sway, SwayBinding,
    MAX_FRAME_DELTA, REFERENCE_FRAME,
};
pub use clip::{AnimationClip, ClipPlayer, LoopMode};
pub use clock::{Clock, FrameTime};
pub use gpu_context::GpuContext;
pub use input_adapter::PointerTracker;
pub use rasterizer::{FrameBuffer, SoftwareRenderer};
pub use raycaster::{hit_test, raycast, resolve_action, CanvasRect, Hit, HitTarget, MeshMatch};
pub use render_loop::{LoopState, RenderLoop};
pub use surface_presenter::SurfacePresenter;
pub use triangle_intersection::{moller_trumbore, TriangleHit};
pub use viewport::{ResizeOutcome, Viewport, ViewportAdapter};
