//! Output Filter.
//!
//! Wraps the process's output sink and strips mouse-shaped byte runs before
//! they reach the terminal: complete SGR reports, legacy X10 reports, and
//! stray coordinate runs in plain text. It uses the same matchers as the
//! input classifier.
//!
//! The filter is escape-aware. Any other CSI sequence (cursor moves, colors
//! such as `ESC [ 38;2;1;2;3 m`) is copied through untouched, so the frame
//! encoder's own output survives the scrub.

use std::io::{self, Write};

use crate::input::mouse::{SgrMatch, legacy_mouse, lex_sgr, stray_coordinates};

const ESC: u8 = 0x1B;

/// Strip mouse-shaped runs from `bytes`.
pub fn scrub(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        let rest = &bytes[i..];

        if rest[0] == ESC {
            match lex_sgr(rest) {
                SgrMatch::Complete { len, .. } => {
                    i += len;
                    continue;
                }
                // Cut off report at the end of the write: drop the tail
                SgrMatch::Partial => break,
                SgrMatch::NoMatch => {}
            }
            if let Some(len) = legacy_mouse(rest) {
                i += len;
                continue;
            }
            if let Some(len) = csi_len(rest) {
                out.extend_from_slice(&rest[..len]);
                i += len;
                continue;
            }
            out.push(ESC);
            i += 1;
            continue;
        }

        if let Some(len) = stray_coordinates(rest) {
            i += len;
            continue;
        }

        out.push(rest[0]);
        i += 1;
    }

    out
}

/// Length of a complete CSI sequence at the start of `bytes`.
///
/// `ESC [`, parameter bytes 0x30-0x3F, intermediate bytes 0x20-0x2F, one
/// final byte 0x40-0x7E.
fn csi_len(bytes: &[u8]) -> Option<usize> {
    if !bytes.starts_with(&[ESC, b'[']) {
        return None;
    }
    let mut i = 2;
    while matches!(bytes.get(i), Some(0x30..=0x3F)) {
        i += 1;
    }
    while matches!(bytes.get(i), Some(0x20..=0x2F)) {
        i += 1;
    }
    matches!(bytes.get(i), Some(0x40..=0x7E)).then_some(i + 1)
}

// =============================================================================
// OutputFilter
// =============================================================================

/// A `Write` adapter that scrubs every write.
///
/// Each `write` call is scrubbed on its own, so callers should hand over
/// whole frames or whole log lines rather than byte-at-a-time output.
#[derive(Debug)]
pub struct OutputFilter<W: Write> {
    inner: W,
    enabled: bool,
}

impl<W: Write> OutputFilter<W> {
    /// Wrap `inner` with scrubbing on.
    pub fn new(inner: W) -> Self {
        Self { inner, enabled: true }
    }

    /// Wrap `inner` without scrubbing.
    pub fn passthrough(inner: W) -> Self {
        Self { inner, enabled: false }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for OutputFilter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !self.enabled {
            return self.inner.write(buf);
        }
        self.inner.write_all(&scrub(buf))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

// =============================================================================
// Tests
// =============================================================================
