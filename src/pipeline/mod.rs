//! Screen pipeline.
//!
//! ```text
//! stdin chunk → classify → {mouse dispatch | discard | key decoder → key dispatch}
//!             → state change → render pass → ScreenBuffer → encode → Output Filter → tty
//! ```
//!
//! - [`terminal`] - terminal mode lifecycle, emergency cleanup, signals
//! - [`registry`] - registered components in paint order
//! - [`screen`] - the Screen Engine
//! - [`event_loop`] - single-threaded input/render loop

pub mod event_loop;
pub mod registry;
pub mod screen;
pub mod terminal;

pub use event_loop::{EventLoop, run};
pub use registry::{Registry, RegistryEntry};
pub use screen::{HandlerId, KeyHandler, Screen};
pub use terminal::{SignalFlags, TerminalModes, emergency_cleanup, install_panic_hook, terminal_size};
