use crate::color::Hsla;
use crate::surface::Surface;

/// Caption revealed one character at a time. The show holds the fireworks
/// back until it has finished typing.
#[derive(Debug, Clone)]
pub struct Typewriter {
    chars: Vec<char>,
    revealed: usize,
    interval_ms: u64,
    last_step_ms: Option<u64>,
}

impl Typewriter {
    pub fn new(text: &str, interval_ms: u64) -> Self {
        Self {
            chars: text.chars().collect(),
            revealed: 0,
            interval_ms,
            last_step_ms: None,
        }
    }

    /// Reveal every character whose time has come. Returns `true` once the
    /// whole caption is visible.
    pub fn advance(&mut self, now_ms: u64) -> bool {
        let last = *self.last_step_ms.get_or_insert(now_ms);
        if self.interval_ms == 0 {
            self.revealed = self.chars.len();
        } else {
            let due = (now_ms.saturating_sub(last) / self.interval_ms) as usize;
            if due > 0 {
                self.revealed = (self.revealed + due).min(self.chars.len());
                self.last_step_ms = Some(last + due as u64 * self.interval_ms);
            }
        }
        self.is_done()
    }

    pub fn is_done(&self) -> bool {
        self.revealed >= self.chars.len()
    }

    pub fn visible(&self) -> String {
        self.chars[..self.revealed].iter().collect()
    }

    /// Draw the revealed text centred in the upper third, with a cursor
    /// while still typing.
    pub fn draw(&self, surface: &mut dyn Surface) {
        if self.chars.is_empty() {
            return;
        }
        let mut text = self.visible();
        if !self.is_done() {
            text.push('▌');
        }
        let x = surface.width() / 2.0;
        let y = surface.height() / 3.0;
        surface.fill_text(x, y, &text, Hsla::new(330.0, 100.0, 85.0, 1.0));
    }
}
