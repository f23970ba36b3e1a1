//! Input Module - Raw byte classification and decoding
//!
//! Raw stdin chunks flow through three stages:
//!
//! - [`classify`] - Decide whether a chunk is mouse, noise or keystrokes
//! - [`mouse`] - SGR mouse grammar (shared with the output filter)
//! - [`keys`] - Keystroke decoder for clean chunks
//!
//! [`reader`] owns the stdin thread that produces the chunks.

pub mod classify;
pub mod keys;
pub mod mouse;
pub mod reader;

pub use classify::{Classified, Noise, classify};
pub use keys::{KeyCode, KeyDecoder, KeyEvent};
pub use mouse::{MouseButton, MouseEvent, MouseKind, parse_mouse_event};
pub use reader::{StdinMessage, StdinReader};

bitflags::bitflags! {
    /// Modifier keys held during a key or mouse event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const NONE  = 0;
        const SHIFT = 1 << 0;
        /// Alt/Meta. Terminals report both the same way.
        const META  = 1 << 1;
        const CTRL  = 1 << 2;
        const SUPER = 1 << 3;
    }
}

impl Modifiers {
    #[inline]
    pub fn shift(&self) -> bool {
        self.contains(Self::SHIFT)
    }

    #[inline]
    pub fn meta(&self) -> bool {
        self.contains(Self::META)
    }

    #[inline]
    pub fn ctrl(&self) -> bool {
        self.contains(Self::CTRL)
    }
}
