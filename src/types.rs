//! Core types shared by the screen, focus and input engines.
//!
//! - [`Cell`] - One glyph plus an optional style token
//! - [`Style`], [`Color`], [`Attr`] - The style token the flush encodes
//! - [`Region`] - Absolute rectangle handed to components
//! - [`CursorPos`] - A cell coordinate
//! - [`BorderKind`] - Box-drawing glyph sets

use std::fmt;

// =============================================================================
// Colors
// =============================================================================

/// Terminal color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    /// Terminal default color (SGR 39/49).
    Default,
    /// ANSI palette index (0-15 standard/bright, 16-255 extended).
    Ansi(u8),
    /// 24-bit color.
    Rgb(u8, u8, u8),
}

impl Color {
    pub const BLACK: Color = Color::Ansi(0);
    pub const RED: Color = Color::Ansi(1);
    pub const GREEN: Color = Color::Ansi(2);
    pub const YELLOW: Color = Color::Ansi(3);
    pub const BLUE: Color = Color::Ansi(4);
    pub const MAGENTA: Color = Color::Ansi(5);
    pub const CYAN: Color = Color::Ansi(6);
    pub const WHITE: Color = Color::Ansi(7);
}

// =============================================================================
// Cell Attributes (bitflags)
// =============================================================================

bitflags::bitflags! {
    /// Text attributes as a bitfield for efficient storage and comparison.
    ///
    /// Combine with bitwise OR: `Attr::BOLD | Attr::ITALIC`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Attr: u8 {
        const NONE = 0;
        const BOLD = 1 << 0;
        const DIM = 1 << 1;
        const ITALIC = 1 << 2;
        const UNDERLINE = 1 << 3;
        const BLINK = 1 << 4;
        const INVERSE = 1 << 5;
        const HIDDEN = 1 << 6;
        const STRIKETHROUGH = 1 << 7;
    }
}

// =============================================================================
// Style - the style token carried by cells
// =============================================================================

/// Style token attached to a cell.
///
/// The screen engine never interprets a style beyond comparing it for
/// equality and asking the ANSI layer to encode it, so consecutive cells
/// with equal styles share one escape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Style {
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub attrs: Attr,
}

impl Style {
    pub const fn new() -> Self {
        Self {
            fg: None,
            bg: None,
            attrs: Attr::NONE,
        }
    }

    pub const fn fg(mut self, color: Color) -> Self {
        self.fg = Some(color);
        self
    }

    pub const fn bg(mut self, color: Color) -> Self {
        self.bg = Some(color);
        self
    }

    pub const fn attrs(mut self, attrs: Attr) -> Self {
        self.attrs = attrs;
        self
    }

    /// True when encoding this style would emit nothing.
    pub fn is_plain(&self) -> bool {
        self.fg.is_none() && self.bg.is_none() && self.attrs.is_empty()
    }
}

// =============================================================================
// Cell - The atomic unit of terminal rendering
// =============================================================================

/// A single terminal cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    /// Display glyph. `'\0'` marks the trailing half of a wide glyph.
    pub ch: char,
    /// Optional style token.
    pub style: Option<Style>,
}

impl Cell {
    /// The blank cell every position holds after a clear.
    pub const BLANK: Cell = Cell {
        ch: ' ',
        style: None,
    };

    /// Placeholder to the right of a double-width glyph.
    pub const CONTINUATION: Cell = Cell {
        ch: '\0',
        style: None,
    };

    pub const fn new(ch: char, style: Option<Style>) -> Self {
        Self { ch, style }
    }

    #[inline]
    pub fn is_continuation(&self) -> bool {
        self.ch == '\0'
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::BLANK
    }
}

// =============================================================================
// Region
// =============================================================================

/// An absolute rectangle of the screen assigned to a component for one
/// render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Region {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Region {
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn right(&self) -> u32 {
        u32::from(self.x) + u32::from(self.width)
    }

    #[inline]
    pub fn bottom(&self) -> u32 {
        u32::from(self.y) + u32::from(self.height)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Check if a point is inside this region.
    #[inline]
    pub fn contains(&self, x: u16, y: u16) -> bool {
        x >= self.x && u32::from(x) < self.right() && y >= self.y && u32::from(y) < self.bottom()
    }

    /// Check if `other` lies entirely inside this region.
    pub fn contains_region(&self, other: &Region) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Compute intersection of two regions.
    pub fn intersect(&self, other: &Region) -> Option<Region> {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = self.right().min(other.right());
        let y2 = self.bottom().min(other.bottom());

        if x2 > u32::from(x1) && y2 > u32::from(y1) {
            Some(Region {
                x: x1,
                y: y1,
                width: (x2 - u32::from(x1)) as u16,
                height: (y2 - u32::from(y1)) as u16,
            })
        } else {
            None
        }
    }

    /// Produce a child region from bounds relative to this region.
    ///
    /// The child is translated by this region's origin and clamped so it
    /// never extends past this region. A child that starts outside collapses
    /// to an empty region at the nearest edge.
    pub fn child(&self, relative: Region) -> Region {
        let x = (u32::from(self.x) + u32::from(relative.x)).min(self.right());
        let y = (u32::from(self.y) + u32::from(relative.y)).min(self.bottom());
        let width = (x + u32::from(relative.width)).min(self.right()) - x;
        let height = (y + u32::from(relative.height)).min(self.bottom()) - y;
        let max = u32::from(u16::MAX);
        Region {
            x: x.min(max) as u16,
            y: y.min(max) as u16,
            width: width as u16,
            height: height as u16,
        }
    }

    /// Translate an absolute point into coordinates relative to this region.
    pub fn to_relative(&self, x: u16, y: u16) -> Option<(u16, u16)> {
        self.contains(x, y).then(|| (x - self.x, y - self.y))
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}

// =============================================================================
// Cursor position
// =============================================================================

/// A 0-based cell coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CursorPos {
    pub x: u16,
    pub y: u16,
}

impl CursorPos {
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }
}

// =============================================================================
// Border Styles
// =============================================================================

/// Box-drawing glyph sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BorderKind {
    /// ─ │ ┌ ┐ └ ┘
    #[default]
    Single,
    /// ═ ║ ╔ ╗ ╚ ╝
    Double,
    /// ─ │ ╭ ╮ ╰ ╯
    Rounded,
    /// ━ ┃ ┏ ┓ ┗ ┛
    Bold,
    /// - | + + + +
    Ascii,
}

/// The six glyphs of a border set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorderGlyphs {
    pub top_left: char,
    pub top_right: char,
    pub bottom_left: char,
    pub bottom_right: char,
    pub horizontal: char,
    pub vertical: char,
}

impl BorderKind {
    /// Get the glyph table for this kind.
    pub const fn glyphs(&self) -> BorderGlyphs {
        let (top_left, top_right, bottom_left, bottom_right, horizontal, vertical) = match self {
            Self::Single => ('┌', '┐', '└', '┘', '─', '│'),
            Self::Double => ('╔', '╗', '╚', '╝', '═', '║'),
            Self::Rounded => ('╭', '╮', '╰', '╯', '─', '│'),
            Self::Bold => ('┏', '┓', '┗', '┛', '━', '┃'),
            Self::Ascii => ('+', '+', '+', '+', '-', '|'),
        };
        BorderGlyphs {
            top_left,
            top_right,
            bottom_left,
            bottom_right,
            horizontal,
            vertical,
        }
    }

    /// Look up a kind by name. Unknown names fall back to [`BorderKind::Single`].
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "double" => Self::Double,
            "rounded" | "round" => Self::Rounded,
            "bold" | "heavy" => Self::Bold,
            "ascii" => Self::Ascii,
            _ => Self::Single,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
