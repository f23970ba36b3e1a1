//! Terminal renderer - the "blind" output layer.
//!
//! The renderer knows only about cells. It doesn't understand components,
//! focus, or input. It takes a filled ScreenBuffer and encodes it as one
//! ANSI stream, which leaves the process through the Output Filter.

pub mod ansi;
pub mod buffer;
pub mod filter;
pub mod output;

pub use buffer::ScreenBuffer;
pub use filter::{OutputFilter, scrub};
pub use output::{OutputBuffer, encode_frame};
