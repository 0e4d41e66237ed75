//! Drawing surfaces the show renders onto.

use crate::color::{Hsla, Rgba};

pub mod recording;
pub mod terminal;

pub use recording::{DrawCall, RecordingSurface};
pub use terminal::TermCanvas;

/// How new paint combines with what is already on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompositeMode {
    /// Paint over, weighted by alpha.
    #[default]
    SourceOver,
    /// Additive; overlapping particles brighten each other.
    Lighter,
}

/// A 2D drawing context in logical units.
///
/// `width`/`height` may change between frames when the host resizes, so
/// callers read them every tick instead of caching.
pub trait Surface {
    fn width(&self) -> f32;
    fn height(&self) -> f32;

    /// Reset every pixel to the background colour.
    fn clear(&mut self);
    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgba);
    fn set_composite(&mut self, mode: CompositeMode);
    fn fill_circle(&mut self, x: f32, y: f32, radius: f32, color: Hsla);
    /// Draw a single glyph centred on `(x, y)`.
    fn fill_glyph(&mut self, x: f32, y: f32, size: f32, glyph: char, color: Hsla);
    /// Draw a line of text centred on `(x, y)`.
    fn fill_text(&mut self, x: f32, y: f32, text: &str, color: Hsla);
}
