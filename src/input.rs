//! Pointer tracking for the optional pointer-link pass.
//!
//! The `Pointer` turns raw window cursor events into a logical-pixel
//! position, or `None` when the cursor is outside the window.

use glam::Vec2;
use winit::event::WindowEvent;

/// Last known pointer position over the drawing surface.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Pointer {
    position: Option<Vec2>,
}

impl Pointer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Position in logical pixels, `None` when the cursor is away.
    #[inline]
    pub fn position(&self) -> Option<Vec2> {
        self.position
    }

    /// Record a cursor position reported in physical pixels.
    ///
    /// Returns whether the position changed.
    pub fn move_to(&mut self, physical: Vec2, scale_factor: f64) -> bool {
        let scale = if scale_factor.is_finite() && scale_factor > 0.0 {
            scale_factor as f32
        } else {
            1.0
        };
        let next = Some(physical / scale);
        let changed = next != self.position;
        self.position = next;
        changed
    }

    /// Forget the position. Returns whether there was one.
    pub fn leave(&mut self) -> bool {
        self.position.take().is_some()
    }

    /// Process a winit window event. Returns `true` if the pointer changed.
    pub(crate) fn handle_event(&mut self, event: &WindowEvent, scale_factor: f64) -> bool {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.move_to(Vec2::new(position.x as f32, position.y as f32), scale_factor)
            }
            WindowEvent::CursorLeft { .. } => self.leave(),
            _ => false,
        }
    }
}
