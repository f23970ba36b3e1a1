//! ScreenBuffer and drawing primitives.
//!
//! The ScreenBuffer is a 2D grid of Cells that represents what should be
//! displayed on the terminal. All drawing operations work on this buffer.
//!
//! # Design Decisions
//!
//! - **Flat storage**: Uses `Vec<Cell>` with row-major indexing for cache efficiency.
//! - **Clipping**: Writes outside the buffer (or outside a caller's clip
//!   region) are dropped silently, never an error.
//! - **Wide characters**: Emoji and CJK characters use continuation markers.

use unicode_width::UnicodeWidthChar;

use crate::types::{BorderKind, Cell, Region, Style};

/// A 2D buffer of terminal cells.
///
/// Uses flat storage with row-major indexing: `index = y * width + x`
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenBuffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl ScreenBuffer {
    /// Create a new buffer filled with blank cells.
    pub fn new(width: u16, height: u16) -> Self {
        let size = usize::from(width) * usize::from(height);
        Self {
            width,
            height,
            cells: vec![Cell::BLANK; size],
        }
    }

    #[inline]
    pub fn width(&self) -> u16 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u16 {
        self.height
    }

    /// The whole buffer as a region.
    #[inline]
    pub fn bounds(&self) -> Region {
        Region::new(0, 0, self.width, self.height)
    }

    #[inline]
    fn index(&self, x: u16, y: u16) -> usize {
        usize::from(y) * usize::from(self.width) + usize::from(x)
    }

    #[inline]
    pub fn in_bounds(&self, x: u16, y: u16) -> bool {
        x < self.width && y < self.height
    }

    /// Get a cell (None if out of bounds).
    #[inline]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.in_bounds(x, y).then(|| &self.cells[self.index(x, y)])
    }

    /// One row of cells (empty slice if out of bounds).
    pub fn row(&self, y: u16) -> &[Cell] {
        if y >= self.height {
            return &[];
        }
        let start = self.index(0, y);
        &self.cells[start..start + usize::from(self.width)]
    }

    /// The glyphs of one row as a string, continuation cells skipped.
    pub fn row_text(&self, y: u16) -> String {
        self.row(y)
            .iter()
            .filter(|c| !c.is_continuation())
            .map(|c| c.ch)
            .collect()
    }

    /// Reset every cell to blank.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    /// Reallocate for new dimensions. All cells become blank.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.cells = vec![Cell::BLANK; usize::from(width) * usize::from(height)];
    }

    // =========================================================================
    // Drawing Primitives
    // =========================================================================

    /// Set a single cell. Returns false (and does nothing) out of bounds.
    ///
    /// Overwriting half of a wide glyph blanks the other half.
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }
        self.break_wide_glyph(x, y);
        let idx = self.index(x, y);
        self.cells[idx] = cell;
        true
    }

    fn break_wide_glyph(&mut self, x: u16, y: u16) {
        let idx = self.index(x, y);
        if self.cells[idx].is_continuation() && x > 0 {
            self.cells[idx - 1] = Cell::BLANK;
        }
        if x + 1 < self.width && self.cells[idx + 1].is_continuation() {
            self.cells[idx + 1] = Cell::BLANK;
        }
    }

    /// Write text starting at `(x, y)`.
    ///
    /// Only an explicit `'\n'` moves to the next line (back to column `x`);
    /// everything past the right edge is truncated. Negative `x` or an
    /// out-of-range `y` makes the whole call a no-op.
    pub fn write(&mut self, text: &str, x: i32, y: i32, style: Option<Style>) {
        let clip = self.bounds();
        self.write_clipped(text, x, y, style, &clip);
    }

    /// [`write`](Self::write) restricted to `clip`.
    pub fn write_clipped(&mut self, text: &str, x: i32, y: i32, style: Option<Style>, clip: &Region) {
        if x < 0 || y < 0 || y >= i32::from(self.height) {
            return;
        }
        let Some(clip) = clip.intersect(&self.bounds()) else {
            return;
        };

        let right = i64::from(clip.right());
        let mut row = i64::from(y);
        let mut col = i64::from(x);

        for ch in text.chars() {
            if ch == '\n' {
                row += 1;
                col = i64::from(x);
                continue;
            }
            let Some(width) = ch.width().filter(|w| *w > 0) else {
                continue;
            };
            let width = width as i64;

            let visible_row = row >= i64::from(clip.y) && row < i64::from(clip.bottom());
            if visible_row && col >= i64::from(clip.x) && col + width <= right {
                let (cx, cy) = (col as u16, row as u16);
                self.set(cx, cy, Cell::new(ch, style));
                if width == 2 {
                    self.set(cx + 1, cy, Cell::CONTINUATION);
                }
            }
            col += width;
        }
    }

    /// Fill a region with one glyph. The region is clipped to the buffer.
    pub fn fill_region(&mut self, region: &Region, ch: char, style: Option<Style>) {
        let Some(area) = region.intersect(&self.bounds()) else {
            return;
        };
        for y in area.y..area.y + area.height {
            for x in area.x..area.x + area.width {
                self.set(x, y, Cell::new(ch, style));
            }
        }
    }

    /// Draw a box outline. Boxes smaller than 2x2 draw nothing.
    pub fn draw_box(&mut self, x: u16, y: u16, width: u16, height: u16, kind: BorderKind, style: Option<Style>) {
        let clip = self.bounds();
        self.draw_box_clipped(&Region::new(x, y, width, height), kind, style, &clip);
    }

    /// [`draw_box`](Self::draw_box) restricted to `clip`.
    pub fn draw_box_clipped(&mut self, area: &Region, kind: BorderKind, style: Option<Style>, clip: &Region) {
        if area.width < 2 || area.height < 2 {
            return;
        }
        let glyphs = kind.glyphs();
        let right = area.right() - 1;
        let bottom = area.bottom() - 1;

        let mut put = |x: u32, y: u32, ch: char| {
            let (Ok(x), Ok(y)) = (u16::try_from(x), u16::try_from(y)) else {
                return;
            };
            if clip.contains(x, y) {
                self.set(x, y, Cell::new(ch, style));
            }
        };

        let (left, top) = (u32::from(area.x), u32::from(area.y));
        for x in left + 1..right {
            put(x, top, glyphs.horizontal);
            put(x, bottom, glyphs.horizontal);
        }
        for y in top + 1..bottom {
            put(left, y, glyphs.vertical);
            put(right, y, glyphs.vertical);
        }
        put(left, top, glyphs.top_left);
        put(right, top, glyphs.top_right);
        put(left, bottom, glyphs.bottom_left);
        put(right, bottom, glyphs.bottom_right);
    }
}

// =============================================================================
// Tests
// =============================================================================
