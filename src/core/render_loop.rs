use super::clock::FrameTime;
use super::rasterizer::FrameBuffer;
use crate::scene::SceneInstance;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Waiting for the asset
    Idle,
    Running,
    /// Stopped for good (page teardown)
    Stopped,
}

/// Per-instance frame driver: one tick plus one render per display refresh
#[derive(Debug)]
pub struct RenderLoop {
    state: LoopState,
    frames: u64,
}

impl RenderLoop {
    pub fn new() -> Self {
        Self {
            state: LoopState::Idle,
            frames: 0,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    /// Frames driven since start
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Begin driving frames. Only an idle loop can start.
    pub fn start(&mut self) -> bool {
        if self.state != LoopState::Idle {
            log::debug!("render loop already {:?}", self.state);
            return false;
        }
        self.state = LoopState::Running;
        true
    }

    pub fn stop(&mut self) {
        self.state = LoopState::Stopped;
    }

    /// Advance and draw one frame; `None` while not running or before the asset is attached
    pub fn frame<'a>(&mut self, instance: &'a mut SceneInstance, time: FrameTime) -> Option<&'a FrameBuffer> {
        if !self.is_running() || !instance.is_ready() {
            return None;
        }
        self.frames += 1;
        instance.tick(time);
        instance.render()
    }
}

impl Default for RenderLoop {
    fn default() -> Self {
        Self::new()
    }
}
