use super::{CompositeMode, Surface};
use crate::color::{Hsla, Rgba};

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Clear,
    FillRect { x: f32, y: f32, w: f32, h: f32, color: Rgba },
    Composite(CompositeMode),
    Circle { x: f32, y: f32, radius: f32, color: Hsla },
    Glyph { x: f32, y: f32, size: f32, glyph: char, color: Hsla },
    Text { x: f32, y: f32, text: String, color: Hsla },
}

/// Headless surface that logs draw calls.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    width: f32,
    height: f32,
    calls: Vec<DrawCall>,
}

impl RecordingSurface {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            calls: Vec::new(),
        }
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    pub fn take_calls(&mut self) -> Vec<DrawCall> {
        std::mem::take(&mut self.calls)
    }

    // Circles and glyphs
    pub fn particle_alphas(&self) -> impl Iterator<Item = f32> + '_ {
        self.calls.iter().filter_map(|call| match call {
            DrawCall::Circle { color, .. } | DrawCall::Glyph { color, .. } => Some(color.a),
            _ => None,
        })
    }
}

impl Surface for RecordingSurface {
    fn width(&self) -> f32 {
        self.width
    }

    fn height(&self) -> f32 {
        self.height
    }

    fn clear(&mut self) {
        self.calls.push(DrawCall::Clear);
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgba) {
        self.calls.push(DrawCall::FillRect { x, y, w, h, color });
    }

    fn set_composite(&mut self, mode: CompositeMode) {
        self.calls.push(DrawCall::Composite(mode));
    }

    fn fill_circle(&mut self, x: f32, y: f32, radius: f32, color: Hsla) {
        self.calls.push(DrawCall::Circle { x, y, radius, color });
    }

    fn fill_glyph(&mut self, x: f32, y: f32, size: f32, glyph: char, color: Hsla) {
        self.calls.push(DrawCall::Glyph { x, y, size, glyph, color });
    }

    fn fill_text(&mut self, x: f32, y: f32, text: &str, color: Hsla) {
        self.calls.push(DrawCall::Text {
            x,
            y,
            text: text.to_string(),
            color,
        });
    }
}
