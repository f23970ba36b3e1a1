//! Output buffering and frame encoding.
//!
//! A frame is encoded into an [`OutputBuffer`] and written to the sink in
//! one call. The encoder walks the ScreenBuffer row by row and merges
//! consecutive cells that share a style into a single run: one style escape
//! before the run, one reset after it. Style changes are only emitted at run
//! boundaries, which is where most of the output size is saved.

use std::io::{self, Write};

use super::ansi;
use super::buffer::ScreenBuffer;
use crate::types::{CursorPos, Style};

// =============================================================================
// OutputBuffer
// =============================================================================

/// A buffer that accumulates output for batch writing.
///
/// Instead of many small writes to the terminal, we accumulate everything
/// and flush once.
#[derive(Debug, Default)]
pub struct OutputBuffer {
    data: Vec<u8>,
}

impl OutputBuffer {
    /// Create a new output buffer with default capacity.
    pub fn new() -> Self {
        Self::with_capacity(16384)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Clear the buffer without deallocating.
    #[inline]
    pub fn clear(&mut self) {
        self.data.clear();
    }

    #[inline]
    pub fn write_str(&mut self, s: &str) {
        self.data.extend_from_slice(s.as_bytes());
    }

    #[inline]
    pub fn write_char(&mut self, c: char) {
        let mut buf = [0u8; 4];
        self.data.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
    }

    /// Write everything to `writer` and empty the buffer.
    pub fn flush_to<W: Write>(&mut self, writer: &mut W) -> io::Result<()> {
        if self.data.is_empty() {
            return Ok(());
        }
        writer.write_all(&self.data)?;
        writer.flush()?;
        self.data.clear();
        Ok(())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Get the accumulated data as a string (lossy).
    pub fn as_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.data)
    }
}

impl Write for OutputBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.data.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(()) // Buffering only - real flush via flush_to
    }
}

// =============================================================================
// Frame encoding
// =============================================================================

/// Tracks the style run currently open on the terminal.
#[derive(Debug, Default)]
struct StyleRun {
    open: Option<Style>,
}

impl StyleRun {
    /// Switch to `style`, closing and opening runs only at boundaries.
    fn switch(&mut self, out: &mut OutputBuffer, style: Option<Style>) -> io::Result<()> {
        let style = style.filter(|s| !s.is_plain());
        if style == self.open {
            return Ok(());
        }
        self.close(out)?;
        if let Some(style) = style {
            ansi::style(out, &style)?;
        }
        self.open = style;
        Ok(())
    }

    fn close(&mut self, out: &mut OutputBuffer) -> io::Result<()> {
        if self.open.take().is_some() {
            ansi::reset(out)?;
        }
        Ok(())
    }
}

/// Encode a full frame.
///
/// Hides the cursor, paints every row from column 0, then moves and shows
/// the real cursor when `cursor` is given.
pub fn encode_frame(out: &mut OutputBuffer, buffer: &ScreenBuffer, cursor: Option<CursorPos>) -> io::Result<()> {
    ansi::cursor_hide(out)?;

    let mut run = StyleRun::default();
    for y in 0..buffer.height() {
        ansi::cursor_to(out, 0, y)?;
        for cell in buffer.row(y) {
            // Skip continuation cells (wide character placeholders)
            if cell.is_continuation() {
                continue;
            }
            run.switch(out, cell.style)?;
            out.write_char(cell.ch);
        }
        run.close(out)?;
    }

    if let Some(pos) = cursor {
        ansi::cursor_to(out, pos.x, pos.y)?;
        ansi::cursor_show(out)?;
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
