//! Virtual Cursor - keyboard-driven cursor drawn into the ScreenBuffer
//!
//! Unlike the terminal native cursor, this cursor is a glyph painted over
//! the buffer. It exists for cursor mode, where arrow keys stand in for the
//! mouse.
//!
//! # Pattern
//!
//! The cell under the cursor is saved before the glyph is drawn and put
//! back before the cursor moves, so the cursor never permanently
//! overwrites content. Blinking toggles between the glyph and the saved
//! cell. Covering either half of a wide glyph saves both halves.

use std::time::{Duration, Instant};

use crate::renderer::ScreenBuffer;
use crate::types::{Attr, Cell, CursorPos, Style};

/// Keyboard-driven on-buffer cursor.
#[derive(Debug, Clone)]
pub struct VirtualCursor {
    pos: CursorPos,
    glyph: char,
    style: Option<Style>,
    active: bool,
    /// Blink phase: true = glyph drawn.
    phase_on: bool,
    blink: Option<Duration>,
    last_toggle: Instant,
    /// Cells the glyph is currently covering, left to right.
    saved: Vec<(CursorPos, Cell)>,
}

impl VirtualCursor {
    pub fn new(glyph: char, blink: Option<Duration>) -> Self {
        Self {
            pos: CursorPos::default(),
            glyph,
            style: Some(Style::new().attrs(Attr::BOLD)),
            active: false,
            phase_on: true,
            blink,
            last_toggle: Instant::now(),
            saved: Vec::new(),
        }
    }

    #[inline]
    pub fn position(&self) -> CursorPos {
        self.pos
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[inline]
    pub fn is_phase_on(&self) -> bool {
        self.phase_on
    }

    /// Show the cursor and start blinking from the "on" phase.
    pub fn activate(&mut self, buffer: &mut ScreenBuffer) {
        self.active = true;
        self.phase_on = true;
        self.last_toggle = Instant::now();
        self.draw(buffer);
    }

    /// Hide the cursor and restore the covered cell.
    pub fn deactivate(&mut self, buffer: &mut ScreenBuffer) {
        self.restore(buffer);
        self.active = false;
    }

    /// Move to `(x, y)`, clamped to the buffer.
    ///
    /// The previously covered cell is restored before the new one is saved
    /// and covered.
    pub fn move_to(&mut self, buffer: &mut ScreenBuffer, x: u16, y: u16) {
        self.restore(buffer);
        self.pos = clamp(CursorPos::new(x, y), buffer);
        self.phase_on = true;
        self.last_toggle = Instant::now();
        self.draw(buffer);
    }

    /// Move by a signed delta, clamped to the buffer.
    pub fn move_by(&mut self, buffer: &mut ScreenBuffer, dx: i32, dy: i32) {
        let x = (i32::from(self.pos.x) + dx).clamp(0, i32::from(u16::MAX)) as u16;
        let y = (i32::from(self.pos.y) + dy).clamp(0, i32::from(u16::MAX)) as u16;
        self.move_to(buffer, x, y);
    }

    /// Advance the blink timer. Returns true when the phase flipped.
    pub fn tick(&mut self, buffer: &mut ScreenBuffer, now: Instant) -> bool {
        let Some(interval) = self.blink.filter(|_| self.active) else {
            return false;
        };
        if now.duration_since(self.last_toggle) < interval {
            return false;
        }
        self.last_toggle = now;
        self.phase_on = !self.phase_on;
        if self.phase_on {
            self.draw(buffer);
        } else {
            self.restore(buffer);
        }
        true
    }

    /// Re-apply the overlay after the buffer was repainted.
    ///
    /// A render pass clears the buffer, so the saved cell is stale; the
    /// fresh content under the cursor is saved instead.
    pub fn overlay(&mut self, buffer: &mut ScreenBuffer) {
        self.saved.clear();
        if self.active {
            self.pos = clamp(self.pos, buffer);
            self.draw(buffer);
        }
    }

    /// Clamp after the buffer was reallocated.
    pub fn on_resize(&mut self, buffer: &ScreenBuffer) {
        self.saved.clear();
        self.pos = clamp(self.pos, buffer);
    }

    fn draw(&mut self, buffer: &mut ScreenBuffer) {
        if !self.active || !self.phase_on {
            return;
        }
        let CursorPos { x, y } = self.pos;
        let Some(under) = buffer.get(x, y).copied() else {
            return;
        };
        if self.saved.is_empty() {
            // Drawing over either half of a wide glyph blanks the other half.
            if under.is_continuation() {
                if let Some(head) = x.checked_sub(1).and_then(|hx| buffer.get(hx, y)) {
                    self.saved.push((CursorPos::new(x - 1, y), *head));
                }
            }
            self.saved.push((self.pos, under));
            if let Some(tail) = x.checked_add(1).and_then(|tx| buffer.get(tx, y)) {
                if tail.is_continuation() {
                    self.saved.push((CursorPos::new(x + 1, y), *tail));
                }
            }
        }
        buffer.set(x, y, Cell::new(self.glyph, self.style));
    }

    fn restore(&mut self, buffer: &mut ScreenBuffer) {
        for (pos, cell) in self.saved.drain(..) {
            buffer.set(pos.x, pos.y, cell);
        }
    }
}

fn clamp(pos: CursorPos, buffer: &ScreenBuffer) -> CursorPos {
    CursorPos::new(
        pos.x.min(buffer.width().saturating_sub(1)),
        pos.y.min(buffer.height().saturating_sub(1)),
    )
}

// =============================================================================
// Tests
// =============================================================================
