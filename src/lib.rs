//! # spark-screen
//!
//! Screen, focus and input engine for terminal UIs.
//!
//! ## Architecture
//!
//! One [`Screen`] owns the terminal. Components are registered with an id
//! and an absolute [`Region`]; any state change triggers a render pass:
//! ```text
//! clear ScreenBuffer → component.render(ctx) per region → cursor → flush
//! ```
//!
//! Raw stdin chunks are classified before anything else looks at them.
//! Complete SGR mouse reports become [`MouseEvent`]s, mouse-shaped garbage
//! is dropped, and only clean chunks reach the key decoder. Everything
//! written to the terminal passes through the Output Filter as a second
//! line of defence.
//!
//! ## Modules
//!
//! - [`types`] - Cell, Style, Region, CursorPos, box glyphs
//! - [`input`] - mouse automaton, chunk classifier, key decoder, stdin reader
//! - [`renderer`] - ScreenBuffer, ANSI encoding, Output Filter
//! - [`component`] - render contract traits, RenderContext, component tree
//! - [`state`] - Focus Engine, virtual cursor, hit grid
//! - [`pipeline`] - terminal lifecycle, registry, Screen Engine, event loop
//! - [`config`] - ScreenConfig and key bindings
//! - [`logging`] - file logging through the Output Filter

pub mod component;
pub mod config;
pub mod error;
pub mod input;
pub mod logging;
pub mod pipeline;
pub mod renderer;
pub mod state;
pub mod types;

pub use types::*;

pub use component::{
    ComponentRef, CursorProvider, FocusCandidate, FocusInfo, Interactive, MouseAware, Node,
    RenderContext, RenderTrigger, Renderable,
};

pub use config::{GlobalAction, KeyBinding, KeyBindings, ScreenConfig};

pub use error::{Error, Result};

pub use input::{
    Classified, KeyCode, KeyDecoder, KeyEvent, Modifiers, MouseButton, MouseEvent, MouseKind, Noise,
    classify, parse_mouse_event,
};

pub use logging::init_file_logging;

pub use pipeline::{EventLoop, HandlerId, Screen, run};

pub use renderer::{OutputFilter, ScreenBuffer, scrub};

pub use state::{FocusManager, FocusScope, VirtualCursor};
