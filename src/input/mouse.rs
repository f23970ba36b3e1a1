//! SGR mouse grammar.
//!
//! The extended mouse protocol encodes an event as
//! `ESC [ < button ; x ; y (M|m)`. This module holds the one automaton that
//! recognizes that grammar plus the "stray coordinates" rule for byte runs
//! that look like mouse reports without being one. Both the input
//! classifier and the output filter are built on these two matchers, so
//! they agree on what counts as mouse noise.
//!
//! Button byte layout:
//!
//! | bits | meaning                 |
//! |------|-------------------------|
//! | 0-1  | button id               |
//! | 2    | shift                   |
//! | 3    | meta                    |
//! | 4    | ctrl                    |
//! | 5    | motion                  |
//! | 6    | scroll wheel            |

use super::Modifiers;
use crate::types::Region;

const ESC: u8 = 0x1B;

// =============================================================================
// Types
// =============================================================================

/// Mouse event kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseKind {
    Press,
    Release,
    Move,
    ScrollUp,
    ScrollDown,
}

/// Mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    #[default]
    None,
}

impl MouseButton {
    fn from_id(id: u32) -> Self {
        match id {
            0 => Self::Left,
            1 => Self::Middle,
            2 => Self::Right,
            _ => Self::None,
        }
    }
}

/// A decoded mouse event with 0-based coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseEvent {
    pub kind: MouseKind,
    pub button: MouseButton,
    pub x: u16,
    pub y: u16,
    pub modifiers: Modifiers,
}

impl MouseEvent {
    pub fn new(kind: MouseKind, button: MouseButton, x: u16, y: u16) -> Self {
        Self {
            kind,
            button,
            x,
            y,
            modifiers: Modifiers::NONE,
        }
    }

    /// Create a left-button press.
    pub fn press(x: u16, y: u16) -> Self {
        Self::new(MouseKind::Press, MouseButton::Left, x, y)
    }

    /// Create a left-button release.
    pub fn release(x: u16, y: u16) -> Self {
        Self::new(MouseKind::Release, MouseButton::Left, x, y)
    }

    #[inline]
    pub fn ctrl(&self) -> bool {
        self.modifiers.ctrl()
    }

    #[inline]
    pub fn shift(&self) -> bool {
        self.modifiers.shift()
    }

    #[inline]
    pub fn meta(&self) -> bool {
        self.modifiers.meta()
    }

    /// Clamp coordinates into a `width` x `height` buffer.
    pub fn clamped(mut self, width: u16, height: u16) -> Self {
        self.x = self.x.min(width.saturating_sub(1));
        self.y = self.y.min(height.saturating_sub(1));
        self
    }

    /// Translate into coordinates relative to `region`.
    ///
    /// Returns `None` when the event lies outside the region.
    pub fn relative_to(&self, region: &Region) -> Option<Self> {
        let (x, y) = region.to_relative(self.x, self.y)?;
        Some(Self { x, y, ..*self })
    }
}

// =============================================================================
// SGR automaton
// =============================================================================

/// Result of running the SGR automaton at the start of a byte slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SgrMatch {
    /// A full sequence of `len` bytes.
    Complete { event: MouseEvent, len: usize },
    /// Input ended after `ESC [ <` while the sequence was still well formed.
    Partial,
    /// Not an SGR mouse sequence.
    NoMatch,
}

#[derive(Debug, Clone, Copy)]
enum SgrState {
    Start,
    Escape,
    Introducer,
    /// Inside parameter `index` (0 = button, 1 = x, 2 = y).
    Param { index: usize, digits: usize },
}

/// Run the SGR automaton over the start of `bytes`.
pub(crate) fn lex_sgr(bytes: &[u8]) -> SgrMatch {
    let mut state = SgrState::Start;
    let mut params = [0u32; 3];

    for (i, &byte) in bytes.iter().enumerate() {
        state = match (state, byte) {
            (SgrState::Start, ESC) => SgrState::Escape,
            (SgrState::Escape, b'[') => SgrState::Introducer,
            (SgrState::Introducer, b'<') => SgrState::Param { index: 0, digits: 0 },
            (SgrState::Param { index, digits }, b'0'..=b'9') => {
                let digit = u32::from(byte - b'0');
                match params[index].checked_mul(10).and_then(|v| v.checked_add(digit)) {
                    Some(value) => params[index] = value,
                    None => return SgrMatch::NoMatch,
                }
                SgrState::Param {
                    index,
                    digits: digits + 1,
                }
            }
            (SgrState::Param { index, digits }, b';') if digits > 0 && index < 2 => {
                SgrState::Param {
                    index: index + 1,
                    digits: 0,
                }
            }
            (SgrState::Param { index: 2, digits }, b'M' | b'm') if digits > 0 => {
                return match decode(params, byte == b'M') {
                    Some(event) => SgrMatch::Complete { event, len: i + 1 },
                    None => SgrMatch::NoMatch,
                };
            }
            _ => return SgrMatch::NoMatch,
        };
    }

    match state {
        SgrState::Param { .. } => SgrMatch::Partial,
        _ => SgrMatch::NoMatch,
    }
}

/// Build an event from the three parameters.
fn decode(params: [u32; 3], is_press: bool) -> Option<MouseEvent> {
    let [cb, x, y] = params;
    let x = u16::try_from(x).ok()?.saturating_sub(1); // 1-indexed → 0-indexed
    let y = u16::try_from(y).ok()?.saturating_sub(1);

    let mut modifiers = Modifiers::NONE;
    if cb & 4 != 0 {
        modifiers |= Modifiers::SHIFT;
    }
    if cb & 8 != 0 {
        modifiers |= Modifiers::META;
    }
    if cb & 16 != 0 {
        modifiers |= Modifiers::CTRL;
    }

    let id = cb & 3;
    let (kind, button) = if cb & 64 != 0 {
        let kind = if id == 0 {
            MouseKind::ScrollUp
        } else {
            MouseKind::ScrollDown
        };
        (kind, MouseButton::None)
    } else if cb & 32 != 0 {
        (MouseKind::Move, MouseButton::from_id(id))
    } else if is_press {
        (MouseKind::Press, MouseButton::from_id(id))
    } else {
        (MouseKind::Release, MouseButton::from_id(id))
    };

    Some(MouseEvent {
        kind,
        button,
        x,
        y,
        modifiers,
    })
}

/// Decode one complete SGR mouse sequence.
///
/// The whole input must be exactly one `ESC [ < b ; x ; y (M|m)` sequence;
/// anything else (missing prefix, trailing bytes, overflow) yields `None`.
pub fn parse_mouse_event(data: impl AsRef<[u8]>) -> Option<MouseEvent> {
    let data = data.as_ref();
    match lex_sgr(data) {
        SgrMatch::Complete { event, len } if len == data.len() => Some(event),
        _ => None,
    }
}

// =============================================================================
// Stray coordinates
// =============================================================================

/// Length of a coordinate-shaped run starting at `bytes[0]`, if any.
///
/// A run is `[<`, `<` or nothing, then digits and semicolons containing at
/// least one of each. It counts as stray when it ends in `M`/`m` (a mouse
/// report that lost its `ESC [ <`), or when it carried the `<` marker (the
/// head of a report split across reads).
pub(crate) fn stray_coordinates(bytes: &[u8]) -> Option<usize> {
    let prefix = match bytes {
        [b'[', b'<', ..] => 2,
        [b'<', ..] => 1,
        [b'0'..=b'9' | b';', ..] => 0,
        _ => return None,
    };

    let mut digits = 0usize;
    let mut semicolons = 0usize;
    let mut end = prefix;
    while let Some(&byte) = bytes.get(end) {
        match byte {
            b'0'..=b'9' => digits += 1,
            b';' => semicolons += 1,
            _ => break,
        }
        end += 1;
    }

    if digits == 0 || semicolons == 0 {
        return None;
    }

    match bytes.get(end) {
        Some(b'M' | b'm') => Some(end + 1),
        _ if prefix > 0 => Some(end),
        _ => None,
    }
}

/// Length of a legacy X10 mouse report (`ESC [ M` plus three bytes).
///
/// Truncated reports are measured up to the end of the input.
pub(crate) fn legacy_mouse(bytes: &[u8]) -> Option<usize> {
    bytes
        .starts_with(&[ESC, b'[', b'M'])
        .then(|| bytes.len().min(6))
}

// =============================================================================
// Tests
// =============================================================================
