use super::{CompositeMode, Surface};
use crate::color::{Hsla, Rgba};
use std::io::{self, Write};

/// Half-block terminal canvas.
///
/// Each terminal cell shows two stacked pixels: the top one as background
/// colour, the bottom one as the foreground of `▄`. Drawing happens in
/// logical units, `scale` logical units per pixel. Glyphs and text go into a
/// per-cell overlay that is redrawn every frame and never leaves trails.
pub struct TermCanvas {
    cols: usize,
    rows: usize,
    scale: f32,
    bg: (u8, u8, u8),
    // RGB in 0.0..=255.0, `cols` wide and `rows * 2` high
    pixels: Vec<[f32; 3]>,
    overlay: Vec<Option<(char, (u8, u8, u8))>>,
    mode: CompositeMode,
    output_buf: Vec<u8>,
}

impl TermCanvas {
    pub fn new(cols: usize, rows: usize, scale: f32, bg: (u8, u8, u8)) -> Self {
        let mut canvas = Self {
            cols: 0,
            rows: 0,
            scale,
            bg,
            pixels: Vec::new(),
            overlay: Vec::new(),
            mode: CompositeMode::SourceOver,
            output_buf: Vec::new(),
        };
        canvas.resize(cols, rows);
        canvas
    }

    /// Reallocate for a new terminal size. Contents are reset to background.
    pub fn resize(&mut self, cols: usize, rows: usize) {
        self.cols = cols;
        self.rows = rows;
        self.pixels = vec![bg_pixel(self.bg); cols * rows * 2];
        self.overlay = vec![None; cols * rows];
        self.output_buf = Vec::with_capacity(cols * rows * 25);
    }

    pub fn pixel_width(&self) -> usize {
        self.cols
    }

    pub fn pixel_height(&self) -> usize {
        self.rows * 2
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<(u8, u8, u8)> {
        if x >= self.pixel_width() || y >= self.pixel_height() {
            return None;
        }
        Some(to_rgb(self.pixels[y * self.cols + x]))
    }

    pub fn overlay_at(&self, col: usize, row: usize) -> Option<char> {
        if col >= self.cols || row >= self.rows {
            return None;
        }
        self.overlay[row * self.cols + col].map(|(ch, _)| ch)
    }

    fn blend(&mut self, idx: usize, color: Rgba) {
        let a = color.a.clamp(0.0, 1.0);
        let src = [color.r as f32, color.g as f32, color.b as f32];
        let dst = &mut self.pixels[idx];
        match self.mode {
            CompositeMode::SourceOver => {
                for c in 0..3 {
                    dst[c] = dst[c] * (1.0 - a) + src[c] * a;
                }
            }
            CompositeMode::Lighter => {
                for c in 0..3 {
                    dst[c] = (dst[c] + src[c] * a).min(255.0);
                }
            }
        }
    }

    /// Colour of `color` laid over the background at its own alpha.
    fn over_background(&self, color: Hsla) -> (u8, u8, u8) {
        let rgba = color.to_rgba();
        let a = rgba.a.clamp(0.0, 1.0);
        let mix = |fg: u8, bg: u8| (bg as f32 * (1.0 - a) + fg as f32 * a).round() as u8;
        (
            mix(rgba.r, self.bg.0),
            mix(rgba.g, self.bg.1),
            mix(rgba.b, self.bg.2),
        )
    }

    fn cell_at(&self, x: f32, y: f32) -> Option<(usize, usize)> {
        let col = (x / self.scale).floor();
        let row = (y / self.scale / 2.0).floor();
        if col < 0.0 || row < 0.0 || col >= self.cols as f32 || row >= self.rows as f32 {
            return None;
        }
        Some((col as usize, row as usize))
    }

    /// Write the frame as ANSI half-blocks and flush.
    pub fn present<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        self.output_buf.clear();
        self.output_buf.extend_from_slice(b"\x1b[H");

        let mut prev_bg: Option<(u8, u8, u8)> = None;
        let mut prev_fg: Option<(u8, u8, u8)> = None;

        for row in 0..self.rows {
            for col in 0..self.cols {
                let top = to_rgb(self.pixels[(row * 2) * self.cols + col]);
                let bot = to_rgb(self.pixels[(row * 2 + 1) * self.cols + col]);

                let (bg, fg, ch) = match self.overlay[row * self.cols + col] {
                    Some((ch, fg)) => (top, fg, ch),
                    None => (top, bot, '▄'),
                };

                if prev_bg != Some(bg) {
                    write!(self.output_buf, "\x1b[48;2;{};{};{}m", bg.0, bg.1, bg.2)?;
                    prev_bg = Some(bg);
                }
                if prev_fg != Some(fg) {
                    write!(self.output_buf, "\x1b[38;2;{};{};{}m", fg.0, fg.1, fg.2)?;
                    prev_fg = Some(fg);
                }

                let mut utf8 = [0u8; 4];
                self.output_buf
                    .extend_from_slice(ch.encode_utf8(&mut utf8).as_bytes());
            }
            self.output_buf.extend_from_slice(b"\x1b[0m");
            prev_bg = None;
            prev_fg = None;
            if row + 1 < self.rows {
                self.output_buf.extend_from_slice(b"\r\n");
            }
        }

        out.write_all(&self.output_buf)?;
        out.flush()?;

        self.overlay.fill(None);
        Ok(())
    }
}

impl Surface for TermCanvas {
    fn width(&self) -> f32 {
        self.cols as f32 * self.scale
    }

    fn height(&self) -> f32 {
        self.pixel_height() as f32 * self.scale
    }

    fn clear(&mut self) {
        self.pixels.fill(bg_pixel(self.bg));
        self.overlay.fill(None);
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgba) {
        let pw = self.pixel_width() as f32;
        let ph = self.pixel_height() as f32;
        let x0 = (x / self.scale).floor().clamp(0.0, pw) as usize;
        let x1 = ((x + w) / self.scale).ceil().clamp(0.0, pw) as usize;
        let y0 = (y / self.scale).floor().clamp(0.0, ph) as usize;
        let y1 = ((y + h) / self.scale).ceil().clamp(0.0, ph) as usize;

        for py in y0..y1 {
            for px in x0..x1 {
                self.blend(py * self.cols + px, color);
            }
        }
    }

    fn set_composite(&mut self, mode: CompositeMode) {
        self.mode = mode;
    }

    fn fill_circle(&mut self, x: f32, y: f32, radius: f32, color: Hsla) {
        let cx = x / self.scale;
        let cy = y / self.scale;
        let r = (radius / self.scale).max(0.5);
        let rgba = color.to_rgba();

        let pw = self.pixel_width() as isize;
        let ph = self.pixel_height() as isize;
        let (home_x, home_y) = (cx.floor() as isize, cy.floor() as isize);

        for py in (cy - r).floor() as isize..=(cy + r).ceil() as isize {
            if py < 0 || py >= ph {
                continue;
            }
            for px in (cx - r).floor() as isize..=(cx + r).ceil() as isize {
                if px < 0 || px >= pw {
                    continue;
                }
                let dx = px as f32 + 0.5 - cx;
                let dy = py as f32 + 0.5 - cy;
                // Tiny circles still light the pixel they sit in
                if dx * dx + dy * dy <= r * r || (px == home_x && py == home_y) {
                    self.blend(py as usize * self.cols + px as usize, rgba);
                }
            }
        }
    }

    fn fill_glyph(&mut self, x: f32, y: f32, size: f32, glyph: char, color: Hsla) {
        let halo = Hsla { a: color.a * 0.5, ..color };
        self.fill_circle(x, y, size * 0.2, halo);

        // Below one pixel the glyph is just its halo
        if size < self.scale {
            return;
        }
        if let Some((col, row)) = self.cell_at(x, y) {
            let fg = self.over_background(color);
            self.overlay[row * self.cols + col] = Some((glyph, fg));
        }
    }

    fn fill_text(&mut self, x: f32, y: f32, text: &str, color: Hsla) {
        let Some(row) = self.cell_at(0.0, y).map(|(_, row)| row) else {
            return;
        };
        let fg = self.over_background(color);
        let len = text.chars().count() as isize;
        let start = (x / self.scale).round() as isize - len / 2;

        for (i, ch) in text.chars().enumerate() {
            let col = start + i as isize;
            if col >= 0 && (col as usize) < self.cols {
                self.overlay[row * self.cols + col as usize] = Some((ch, fg));
            }
        }
    }
}

fn bg_pixel(bg: (u8, u8, u8)) -> [f32; 3] {
    [bg.0 as f32, bg.1 as f32, bg.2 as f32]
}

fn to_rgb(p: [f32; 3]) -> (u8, u8, u8) {
    let c = |v: f32| v.round().clamp(0.0, 255.0) as u8;
    (c(p[0]), c(p[1]), c(p[2]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn red() -> Hsla {
        Hsla::new(0.0, 100.0, 50.0, 1.0)
    }

    #[test]
    fn logical_size_follows_scale() {
        let canvas = TermCanvas::new(80, 24, 4.0, (0, 0, 0));
        assert_eq!(canvas.pixel_width(), 80);
        assert_eq!(canvas.pixel_height(), 48);
        assert_eq!(canvas.width(), 320.0);
        assert_eq!(canvas.height(), 192.0);
    }

    #[test]
    fn lighter_adds_and_saturates() {
        let mut canvas = TermCanvas::new(10, 5, 1.0, (0, 0, 0));
        canvas.set_composite(CompositeMode::Lighter);
        canvas.fill_circle(2.5, 2.5, 0.1, red());
        canvas.fill_circle(2.5, 2.5, 0.1, red());
        assert_eq!(canvas.pixel(2, 2), Some((255, 0, 0)));

        canvas.fill_circle(2.5, 2.5, 0.1, Hsla::new(120.0, 100.0, 50.0, 1.0));
        assert_eq!(canvas.pixel(2, 2), Some((255, 255, 0)));
        assert_eq!(canvas.pixel(3, 3), Some((0, 0, 0)));
    }

    #[test]
    fn translucent_fill_fades_towards_background() {
        let mut canvas = TermCanvas::new(4, 2, 1.0, (0, 0, 0));
        canvas.fill_rect(0.0, 0.0, 4.0, 4.0, Rgba::new(200, 200, 200, 1.0));
        canvas.fill_rect(0.0, 0.0, 4.0, 4.0, Rgba::new(0, 0, 0, 0.5));
        assert_eq!(canvas.pixel(1, 1), Some((100, 100, 100)));

        for _ in 0..200 {
            canvas.fill_rect(0.0, 0.0, 4.0, 4.0, Rgba::new(0, 0, 0, 0.08));
        }
        assert_eq!(canvas.pixel(1, 1), Some((0, 0, 0)));
    }

    #[test]
    fn off_surface_drawing_is_ignored() {
        let mut canvas = TermCanvas::new(4, 2, 1.0, (0, 0, 0));
        canvas.fill_circle(-50.0, 900.0, 3.0, red());
        canvas.fill_glyph(-10.0, -10.0, 18.0, '*', red());
        canvas.fill_rect(100.0, 100.0, 5.0, 5.0, Rgba::new(255, 255, 255, 1.0));
        for y in 0..4 {
            for x in 0..4 {
                assert_eq!(canvas.pixel(x, y), Some((0, 0, 0)));
            }
        }
    }

    #[test]
    fn glyph_overlay_is_cleared_after_present() {
        let mut canvas = TermCanvas::new(8, 4, 1.0, (0, 0, 0));
        canvas.fill_glyph(3.0, 2.0, 4.0, '♥', red());
        assert_eq!(canvas.overlay_at(3, 1), Some('♥'));

        let mut out = Vec::new();
        canvas.present(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("\x1b[H"));
        assert!(text.contains('♥'));
        assert!(text.contains('▄'));
        assert_eq!(canvas.overlay_at(3, 1), None);
    }

    #[test]
    fn small_glyph_draws_only_halo() {
        let mut canvas = TermCanvas::new(8, 4, 4.0, (0, 0, 0));
        canvas.fill_glyph(10.0, 10.0, 2.0, '♥', red());
        assert_eq!(canvas.overlay_at(2, 1), None);
        assert_ne!(canvas.pixel(2, 2), Some((0, 0, 0)));
    }

    #[test]
    fn text_is_centred() {
        let mut canvas = TermCanvas::new(20, 4, 1.0, (0, 0, 0));
        canvas.fill_text(10.0, 2.0, "abcd", Hsla::new(0.0, 0.0, 100.0, 1.0));
        assert_eq!(canvas.overlay_at(8, 1), Some('a'));
        assert_eq!(canvas.overlay_at(11, 1), Some('d'));
    }

    #[test]
    fn resize_reallocates_and_clears() {
        let mut canvas = TermCanvas::new(4, 2, 2.0, (10, 20, 30));
        canvas.fill_rect(0.0, 0.0, 8.0, 8.0, Rgba::new(255, 255, 255, 1.0));
        canvas.resize(6, 3);
        assert_eq!(canvas.width(), 12.0);
        assert_eq!(canvas.height(), 12.0);
        assert_eq!(canvas.pixel(5, 5), Some((10, 20, 30)));
        assert_eq!(canvas.pixel(0, 0), Some((10, 20, 30)));
    }
}
