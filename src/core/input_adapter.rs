use glam::Vec2;
use winit::event::{ElementState, MouseButton, WindowEvent};

/// Turns winit pointer events into discrete clicks at a known position
#[derive(Debug, Clone, Default)]
pub struct PointerTracker {
    /// Cursor position in physical pixels, relative to the window
    position: Option<Vec2>,
    pressed: bool,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> Option<Vec2> {
        self.position
    }

    /// Feed one event; returns the click position when a left click completes
    pub fn process_event(&mut self, event: &WindowEvent) -> Option<Vec2> {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.move_to(Vec2::new(position.x as f32, position.y as f32));
                None
            }
            WindowEvent::CursorLeft { .. } => {
                self.leave();
                None
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => match state {
                ElementState::Pressed => {
                    self.press();
                    None
                }
                ElementState::Released => self.release(),
            },
            _ => None,
        }
    }

    pub fn move_to(&mut self, position: Vec2) {
        self.position = Some(position);
    }

    pub fn leave(&mut self) {
        self.position = None;
        self.pressed = false;
    }

    pub fn press(&mut self) {
        self.pressed = true;
    }

    /// A release completes a click only if the press happened in this window
    pub fn release(&mut self) -> Option<Vec2> {
        if std::mem::take(&mut self.pressed) {
            self.position
        } else {
            None
        }
    }
}
