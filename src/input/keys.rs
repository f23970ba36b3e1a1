//! Keystroke decoder for terminal input.
//!
//! Decodes chunks the classifier passed as clean into key events:
//! - CSI sequences (Arrow keys, Home, End, Insert, Delete, PageUp/Down, F1-F12)
//! - SS3 sequences (F1-F4, alternate encodings)
//! - Kitty keyboard protocol (codepoint, modifiers)
//! - Alt+key (ESC + char)
//! - Control keys (bytes 0-31)
//!
//! A trailing lone ESC is held until more bytes arrive or the caller's
//! escape timeout expires (see [`KeyDecoder::flush_pending`]).

use super::Modifiers;

// =============================================================================
// Types
// =============================================================================

/// A decoded key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub const fn new(code: KeyCode, modifiers: Modifiers) -> Self {
        Self { code, modifiers }
    }

    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, Modifiers::NONE)
    }

    /// The printable character carried by this key, if any.
    pub fn char(&self) -> Option<char> {
        match self.code {
            KeyCode::Char(c) if !self.modifiers.ctrl() => Some(c),
            _ => None,
        }
    }
}

/// Key code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Enter,
    Tab,
    Backspace,
    Escape,
    Delete,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Insert,
    F(u8),
    Null,
}

// =============================================================================
// Decoder
// =============================================================================

/// Keystroke decoder state machine.
#[derive(Debug, Default)]
pub struct KeyDecoder {
    buf: Vec<u8>,
}

enum Step {
    Key(KeyEvent),
    Skip(usize),
    Incomplete,
}

impl KeyDecoder {
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(64),
        }
    }

    /// Decode a chunk into key events.
    ///
    /// Bytes of an unfinished escape sequence stay buffered for the next call.
    pub fn feed(&mut self, data: &[u8]) -> Vec<KeyEvent> {
        self.buf.extend_from_slice(data);
        let mut events = Vec::new();

        while !self.buf.is_empty() {
            match self.step() {
                Step::Key(event) => events.push(event),
                Step::Skip(n) => self.consume(n),
                Step::Incomplete => break,
            }
        }

        events
    }

    /// Check if bytes are waiting for the escape timeout.
    pub fn has_pending(&self) -> bool {
        !self.buf.is_empty()
    }

    /// Drop a held `ESC` or `ESC [` whose continuation arrived as a
    /// discarded mouse fragment. Returns true if anything was dropped.
    ///
    /// Any other pending sequence is kept.
    pub fn discard_mouse_head(&mut self) -> bool {
        match self.buf.as_slice() {
            [0x1B] | [0x1B, b'['] => {
                self.buf.clear();
                true
            }
            _ => false,
        }
    }

    /// Resolve buffered bytes after the escape timeout expired.
    ///
    /// A lone ESC becomes an Escape key; anything after it is decoded as
    /// plain input.
    pub fn flush_pending(&mut self) -> Vec<KeyEvent> {
        let mut events = Vec::new();
        if self.buf.first() == Some(&0x1B) {
            self.consume(1);
            events.push(KeyEvent::plain(KeyCode::Escape));
        }
        let rest = std::mem::take(&mut self.buf);
        events.extend(self.feed(&rest));
        // Whatever is still incomplete cannot complete anymore
        self.buf.clear();
        events
    }

    fn step(&mut self) -> Step {
        let first = self.buf[0];

        let (code, modifiers, len) = match first {
            // ESC
            0x1B => return self.escape(),
            // Control characters
            0x00 => (KeyCode::Null, Modifiers::CTRL, 1),
            0x08 | 0x7F => (KeyCode::Backspace, Modifiers::NONE, 1),
            0x09 => (KeyCode::Tab, Modifiers::NONE, 1),
            0x0A | 0x0D => (KeyCode::Enter, Modifiers::NONE, 1),
            0x01..=0x1A => (KeyCode::Char((first + b'a' - 1) as char), Modifiers::CTRL, 1),
            // ASCII printable
            0x20..=0x7E => (KeyCode::Char(first as char), Modifiers::NONE, 1),
            // UTF-8 multi-byte
            0x80..=0xFF => return self.utf8(),
            _ => return Step::Skip(1),
        };

        self.consume(len);
        Step::Key(KeyEvent::new(code, modifiers))
    }

    fn escape(&mut self) -> Step {
        if self.buf.len() < 2 {
            return Step::Incomplete;
        }

        match self.buf[1] {
            // CSI: ESC [
            b'[' => self.csi(),
            // SS3: ESC O
            b'O' => self.ss3(),
            // ESC ESC → Alt+Escape
            0x1B => {
                self.consume(2);
                Step::Key(KeyEvent::new(KeyCode::Escape, Modifiers::META))
            }
            // Alt+char: ESC + printable
            byte @ 0x20..=0x7E => {
                self.consume(2);
                Step::Key(KeyEvent::new(KeyCode::Char(byte as char), Modifiers::META))
            }
            _ => {
                // Standalone ESC
                self.consume(1);
                Step::Key(KeyEvent::plain(KeyCode::Escape))
            }
        }
    }

    fn csi(&mut self) -> Step {
        // Find the final byte (0x40-0x7E)
        let Some(end) = self.buf[2..]
            .iter()
            .position(|b| (0x40..=0x7E).contains(b))
            .map(|p| p + 2)
        else {
            return Step::Incomplete;
        };

        let final_byte = self.buf[end];
        let params: Vec<u32> = String::from_utf8_lossy(&self.buf[2..end])
            .split(';')
            .map(|s| s.parse::<u32>().unwrap_or(0))
            .collect();
        self.consume(end + 1);

        // Kitty keyboard: final byte is 'u'
        if final_byte == b'u' {
            return kitty_key(&params);
        }

        let modifiers = match params.get(1) {
            Some(&m) if m > 0 => decode_modifier(m),
            _ => Modifiers::NONE,
        };

        let code = match final_byte {
            b'A' => KeyCode::Up,
            b'B' => KeyCode::Down,
            b'C' => KeyCode::Right,
            b'D' => KeyCode::Left,
            b'H' => KeyCode::Home,
            b'F' => KeyCode::End,
            b'P' => KeyCode::F(1),
            b'Q' => KeyCode::F(2),
            b'R' => KeyCode::F(3),
            b'S' => KeyCode::F(4),
            b'Z' => return Step::Key(KeyEvent::new(KeyCode::Tab, Modifiers::SHIFT)),
            b'~' => match params.first().copied().unwrap_or(0) {
                1 | 7 => KeyCode::Home,
                2 => KeyCode::Insert,
                3 => KeyCode::Delete,
                4 | 8 => KeyCode::End,
                5 => KeyCode::PageUp,
                6 => KeyCode::PageDown,
                15 => KeyCode::F(5),
                17 => KeyCode::F(6),
                18 => KeyCode::F(7),
                19 => KeyCode::F(8),
                20 => KeyCode::F(9),
                21 => KeyCode::F(10),
                23 => KeyCode::F(11),
                24 => KeyCode::F(12),
                _ => return Step::Skip(0),
            },
            _ => return Step::Skip(0),
        };

        Step::Key(KeyEvent::new(code, modifiers))
    }

    fn ss3(&mut self) -> Step {
        if self.buf.len() < 3 {
            return Step::Incomplete;
        }

        let code = match self.buf[2] {
            b'A' => Some(KeyCode::Up),
            b'B' => Some(KeyCode::Down),
            b'C' => Some(KeyCode::Right),
            b'D' => Some(KeyCode::Left),
            b'H' => Some(KeyCode::Home),
            b'F' => Some(KeyCode::End),
            b'P' => Some(KeyCode::F(1)),
            b'Q' => Some(KeyCode::F(2)),
            b'R' => Some(KeyCode::F(3)),
            b'S' => Some(KeyCode::F(4)),
            _ => None,
        };

        self.consume(3);
        match code {
            Some(code) => Step::Key(KeyEvent::plain(code)),
            None => Step::Skip(0),
        }
    }

    fn utf8(&mut self) -> Step {
        let first = self.buf[0];
        let expected_len = if first & 0xE0 == 0xC0 {
            2
        } else if first & 0xF0 == 0xE0 {
            3
        } else if first & 0xF8 == 0xF0 {
            4
        } else {
            return Step::Skip(1);
        };

        if self.buf.len() < expected_len {
            return Step::Incomplete;
        }

        let decoded = std::str::from_utf8(&self.buf[..expected_len])
            .ok()
            .and_then(|s| s.chars().next());
        self.consume(expected_len);

        match decoded {
            Some(ch) => Step::Key(KeyEvent::plain(KeyCode::Char(ch))),
            None => Step::Skip(0),
        }
    }

    fn consume(&mut self, n: usize) {
        self.buf.drain(..n);
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn kitty_key(params: &[u32]) -> Step {
    let codepoint = params.first().copied().unwrap_or(0);
    let modifiers = params.get(1).map_or(Modifiers::NONE, |&m| decode_modifier(m));

    // Release events (state 3) are not keystrokes
    if params.get(2) == Some(&3) {
        return Step::Skip(0);
    }

    let code = match codepoint {
        9 => KeyCode::Tab,
        13 => KeyCode::Enter,
        27 => KeyCode::Escape,
        127 => KeyCode::Backspace,
        cp => match char::from_u32(cp) {
            Some(ch) => KeyCode::Char(ch),
            None => return Step::Skip(0),
        },
    };

    Step::Key(KeyEvent::new(code, modifiers))
}

/// Decode CSI modifier parameter (1-based).
fn decode_modifier(param: u32) -> Modifiers {
    let val = param.saturating_sub(1);
    let mut m = Modifiers::NONE;
    if val & 1 != 0 {
        m |= Modifiers::SHIFT;
    }
    if val & 2 != 0 {
        m |= Modifiers::META;
    }
    if val & 4 != 0 {
        m |= Modifiers::CTRL;
    }
    if val & 8 != 0 {
        m |= Modifiers::SUPER;
    }
    m
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn decode(data: &[u8]) -> Vec<KeyEvent> {
        KeyDecoder::new().feed(data)
    }

    fn key(code: KeyCode, modifiers: Modifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_ascii_chars() {
        let events = decode(b"abc");
        assert_eq!(
            events,
            vec![
                key(KeyCode::Char('a'), Modifiers::NONE),
                key(KeyCode::Char('b'), Modifiers::NONE),
                key(KeyCode::Char('c'), Modifiers::NONE),
            ]
        );
    }

    #[test]
    fn test_control_keys() {
        assert_eq!(decode(b"\r"), vec![key(KeyCode::Enter, Modifiers::NONE)]);
        assert_eq!(decode(b"\t"), vec![key(KeyCode::Tab, Modifiers::NONE)]);
        assert_eq!(decode(b"\x7f"), vec![key(KeyCode::Backspace, Modifiers::NONE)]);
        assert_eq!(decode(b"\x03"), vec![key(KeyCode::Char('c'), Modifiers::CTRL)]);
    }

    #[test]
    fn test_arrow_keys() {
        assert_eq!(decode(b"\x1b[A"), vec![key(KeyCode::Up, Modifiers::NONE)]);
        assert_eq!(decode(b"\x1b[B"), vec![key(KeyCode::Down, Modifiers::NONE)]);
        assert_eq!(decode(b"\x1b[C"), vec![key(KeyCode::Right, Modifiers::NONE)]);
        assert_eq!(decode(b"\x1b[D"), vec![key(KeyCode::Left, Modifiers::NONE)]);
        assert_eq!(decode(b"\x1b[1;5C"), vec![key(KeyCode::Right, Modifiers::CTRL)]);
    }

    #[test]
    fn test_function_keys() {
        assert_eq!(decode(b"\x1bOP"), vec![key(KeyCode::F(1), Modifiers::NONE)]);
        assert_eq!(decode(b"\x1bOQ"), vec![key(KeyCode::F(2), Modifiers::NONE)]);
        assert_eq!(decode(b"\x1b[15~"), vec![key(KeyCode::F(5), Modifiers::NONE)]);
    }

    #[test]
    fn test_shift_tab() {
        assert_eq!(decode(b"\x1b[Z"), vec![key(KeyCode::Tab, Modifiers::SHIFT)]);
    }

    #[test]
    fn test_alt_key() {
        assert_eq!(decode(b"\x1bx"), vec![key(KeyCode::Char('x'), Modifiers::META)]);
    }

    #[test]
    fn test_delete_and_paging() {
        assert_eq!(decode(b"\x1b[3~"), vec![key(KeyCode::Delete, Modifiers::NONE)]);
        assert_eq!(decode(b"\x1b[5~"), vec![key(KeyCode::PageUp, Modifiers::NONE)]);
        assert_eq!(decode(b"\x1b[6~"), vec![key(KeyCode::PageDown, Modifiers::NONE)]);
    }

    #[test]
    fn test_unknown_csi_dropped() {
        assert_eq!(decode(b"\x1b[99~x"), vec![key(KeyCode::Char('x'), Modifiers::NONE)]);
    }

    #[test]
    fn test_utf8() {
        assert_eq!(decode("é".as_bytes()), vec![key(KeyCode::Char('é'), Modifiers::NONE)]);
    }

    #[test]
    fn test_kitty() {
        assert_eq!(decode(b"\x1b[97;5u"), vec![key(KeyCode::Char('a'), Modifiers::CTRL)]);
        assert_eq!(decode(b"\x1b[97;1;3u"), vec![]);
    }

    #[test]
    fn test_lone_escape_waits_for_timeout() {
        let mut decoder = KeyDecoder::new();
        assert!(decoder.feed(b"\x1b").is_empty());
        assert!(decoder.has_pending());
        assert_eq!(decoder.flush_pending(), vec![key(KeyCode::Escape, Modifiers::NONE)]);
        assert!(!decoder.has_pending());
    }

    #[test]
    fn test_split_sequence_completes() {
        let mut decoder = KeyDecoder::new();
        assert!(decoder.feed(b"\x1b[").is_empty());
        assert_eq!(decoder.feed(b"A"), vec![key(KeyCode::Up, Modifiers::NONE)]);
    }

    #[test]
    fn test_discard_mouse_head() {
        let mut decoder = KeyDecoder::new();
        decoder.feed(b"\x1b[");
        assert!(decoder.discard_mouse_head());
        assert!(!decoder.has_pending());
        assert!(decoder.flush_pending().is_empty());

        decoder.feed(b"\x1b");
        assert!(decoder.discard_mouse_head());
        assert!(!decoder.has_pending());

        // An unfinished CSI with parameters is not a mouse head.
        decoder.feed(b"\x1b[1;");
        assert!(!decoder.discard_mouse_head());
        assert!(decoder.has_pending());
    }

    #[test]
    fn test_modifier_decode() {
        assert_eq!(decode_modifier(2), Modifiers::SHIFT);
        assert_eq!(decode_modifier(3), Modifiers::META);
        assert_eq!(decode_modifier(5), Modifiers::CTRL);
    }
}
