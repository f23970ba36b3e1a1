//! State modules - focus, cursor and hit-testing state owned by the screen.
//!
//! - [`focus`] - Focus Engine (`FocusManager` over a `FocusScope`)
//! - [`virtual_cursor`] - Keyboard-driven cursor drawn into the buffer
//! - [`hit_grid`] - Coordinate to registry slot lookup

pub mod focus;
pub mod hit_grid;
pub mod virtual_cursor;

pub use focus::{FocusManager, FocusScope, MAX_HISTORY};
pub use hit_grid::HitGrid;
pub use virtual_cursor::VirtualCursor;
