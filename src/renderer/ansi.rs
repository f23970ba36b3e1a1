//! ANSI escape sequences for terminal control.
//!
//! Every control sequence the engine emits comes from here:
//! - Cursor movement and visibility
//! - Alternate screen
//! - Mouse tracking (SGR extended mode)
//! - Style encoding (colors + attributes in one SGR sequence)

use std::io::Write;

use crate::types::{Attr, Color, Style};

// =============================================================================
// Cursor
// =============================================================================

/// Move cursor to absolute position. Takes 0-based coordinates and emits
/// the 1-based `CSI row ; col H`.
#[inline]
pub fn cursor_to<W: Write>(w: &mut W, x: u16, y: u16) -> std::io::Result<()> {
    write!(w, "\x1b[{};{}H", u32::from(y) + 1, u32::from(x) + 1)
}

/// Hide cursor.
#[inline]
pub fn cursor_hide<W: Write>(w: &mut W) -> std::io::Result<()> {
    w.write_all(b"\x1b[?25l")
}

/// Show cursor.
#[inline]
pub fn cursor_show<W: Write>(w: &mut W) -> std::io::Result<()> {
    w.write_all(b"\x1b[?25h")
}

// =============================================================================
// Screen Control
// =============================================================================

/// Enter alternate screen buffer.
#[inline]
pub fn enter_alt_screen<W: Write>(w: &mut W) -> std::io::Result<()> {
    w.write_all(b"\x1b[?1049h")
}

/// Exit alternate screen buffer.
#[inline]
pub fn exit_alt_screen<W: Write>(w: &mut W) -> std::io::Result<()> {
    w.write_all(b"\x1b[?1049l")
}

/// Clear entire screen and home the cursor.
#[inline]
pub fn clear_screen<W: Write>(w: &mut W) -> std::io::Result<()> {
    w.write_all(b"\x1b[2J\x1b[H")
}

// =============================================================================
// Mouse Support
// =============================================================================

/// Enable button tracking with SGR extended coordinates.
#[inline]
pub fn enable_mouse<W: Write>(w: &mut W) -> std::io::Result<()> {
    w.write_all(b"\x1b[?1000h\x1b[?1006h")
}

/// Disable mouse tracking.
#[inline]
pub fn disable_mouse<W: Write>(w: &mut W) -> std::io::Result<()> {
    w.write_all(b"\x1b[?1000l\x1b[?1006l")
}

// =============================================================================
// Styles
// =============================================================================

/// Reset all attributes and colors.
#[inline]
pub fn reset<W: Write>(w: &mut W) -> std::io::Result<()> {
    w.write_all(b"\x1b[0m")
}

/// Set a full style as one SGR sequence. Plain styles emit nothing.
pub fn style<W: Write>(w: &mut W, style: &Style) -> std::io::Result<()> {
    if style.is_plain() {
        return Ok(());
    }

    let mut params: Vec<String> = attr_codes(style.attrs).map(|c| c.to_string()).collect();
    if let Some(fg) = style.fg {
        params.push(color_params(fg, false));
    }
    if let Some(bg) = style.bg {
        params.push(color_params(bg, true));
    }

    write!(w, "\x1b[{}m", params.join(";"))
}

fn attr_codes(attr: Attr) -> impl Iterator<Item = u8> {
    [
        (Attr::BOLD, 1),
        (Attr::DIM, 2),
        (Attr::ITALIC, 3),
        (Attr::UNDERLINE, 4),
        (Attr::BLINK, 5),
        (Attr::INVERSE, 7),
        (Attr::HIDDEN, 8),
        (Attr::STRIKETHROUGH, 9),
    ]
    .into_iter()
    .filter(move |(flag, _)| attr.contains(*flag))
    .map(|(_, code)| code)
}

fn color_params(color: Color, background: bool) -> String {
    let base: u16 = if background { 40 } else { 30 };
    match color {
        Color::Default => (base + 9).to_string(),
        // Standard colors: 30-37 / 40-47
        Color::Ansi(index) if index < 8 => (base + u16::from(index)).to_string(),
        // Bright colors: 90-97 / 100-107
        Color::Ansi(index) if index < 16 => (base + 60 + u16::from(index) - 8).to_string(),
        // Extended palette: 38;5;n / 48;5;n
        Color::Ansi(index) => format!("{};5;{}", base + 8, index),
        // TrueColor: 38;2;r;g;b / 48;2;r;g;b
        Color::Rgb(r, g, b) => format!("{};2;{};{};{}", base + 8, r, g, b),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn emit(f: impl FnOnce(&mut Vec<u8>) -> std::io::Result<()>) -> String {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_cursor_to_is_one_based() {
        assert_eq!(emit(|w| cursor_to(w, 0, 0)), "\x1b[1;1H");
        assert_eq!(emit(|w| cursor_to(w, 9, 4)), "\x1b[5;10H");
    }

    #[test]
    fn test_mode_sequences() {
        assert_eq!(emit(|w| enter_alt_screen(w)), "\x1b[?1049h");
        assert_eq!(emit(|w| exit_alt_screen(w)), "\x1b[?1049l");
        assert_eq!(emit(|w| cursor_show(w)), "\x1b[?25h");
        assert_eq!(emit(|w| cursor_hide(w)), "\x1b[?25l");
        assert_eq!(emit(|w| enable_mouse(w)), "\x1b[?1000h\x1b[?1006h");
        assert_eq!(emit(|w| disable_mouse(w)), "\x1b[?1000l\x1b[?1006l");
    }

    #[test]
    fn test_style_encoding() {
        let s = Style::new().fg(Color::RED).bg(Color::Ansi(12)).attrs(Attr::BOLD | Attr::UNDERLINE);
        assert_eq!(emit(|w| style(w, &s)), "\x1b[1;4;31;104m");

        let s = Style::new().fg(Color::Rgb(1, 2, 3)).bg(Color::Ansi(200));
        assert_eq!(emit(|w| style(w, &s)), "\x1b[38;2;1;2;3;48;5;200m");

        assert_eq!(emit(|w| style(w, &Style::new().fg(Color::Default))), "\x1b[39m");
        assert_eq!(emit(|w| style(w, &Style::new())), "");
    }
}
