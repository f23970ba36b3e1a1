//! Terminal setup and teardown.
//!
//! Tracks which terminal modes are active (alternate screen, mouse
//! tracking, raw mode, cursor visibility) so teardown only reverses what
//! was actually changed. Every mode switch is a no-op when the screen is
//! not interactive, and an I/O failure leaves the mode flagged off instead
//! of failing the caller.
//!
//! Also here: stateless emergency cleanup for panic and signal paths, and
//! signal flags polled by the event loop.

use std::io::{self, Write};
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossterm::tty::IsTty;

use crate::renderer::ansi;

/// Terminal mode state.
#[derive(Debug, Default)]
pub struct TerminalModes {
    interactive: bool,
    alt_screen: bool,
    mouse_enabled: bool,
    raw_mode: bool,
    cursor_hidden: bool,
}

impl TerminalModes {
    /// `interactive = false` turns every mode switch into a no-op.
    pub fn new(interactive: bool) -> Self {
        Self {
            interactive,
            ..Self::default()
        }
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    pub fn is_alt_screen(&self) -> bool {
        self.alt_screen
    }

    pub fn is_mouse_enabled(&self) -> bool {
        self.mouse_enabled
    }

    pub fn is_raw_mode(&self) -> bool {
        self.raw_mode
    }

    pub fn is_cursor_hidden(&self) -> bool {
        self.cursor_hidden
    }

    /// Record cursor visibility left behind by a flush.
    pub(crate) fn note_cursor_hidden(&mut self, hidden: bool) {
        self.cursor_hidden = hidden;
    }

    // =========================================================================
    // Mode switches
    // =========================================================================

    /// Enter the alternate screen and hide the cursor.
    pub fn enter_alternate_screen<W: Write>(&mut self, w: &mut W) {
        if !self.interactive || self.alt_screen {
            return;
        }
        let result = (|| {
            ansi::enter_alt_screen(w)?;
            ansi::cursor_hide(w)?;
            ansi::clear_screen(w)?;
            w.flush()
        })();
        match result {
            Ok(()) => {
                self.alt_screen = true;
                self.cursor_hidden = true;
                tracing::debug!("entered alternate screen");
            }
            Err(err) => tracing::warn!(%err, "could not enter alternate screen"),
        }
    }

    /// Leave the alternate screen and show the cursor.
    pub fn exit_alternate_screen<W: Write>(&mut self, w: &mut W) {
        if !self.alt_screen {
            return;
        }
        self.alt_screen = false;
        let result = (|| {
            ansi::reset(w)?;
            if self.cursor_hidden {
                ansi::cursor_show(w)?;
            }
            ansi::exit_alt_screen(w)?;
            w.flush()
        })();
        self.cursor_hidden = false;
        if let Err(err) = result {
            tracing::warn!(%err, "could not exit alternate screen");
        }
        tracing::debug!("left alternate screen");
    }

    pub fn enable_mouse<W: Write>(&mut self, w: &mut W) {
        if !self.interactive || self.mouse_enabled {
            return;
        }
        match ansi::enable_mouse(w).and_then(|()| w.flush()) {
            Ok(()) => {
                self.mouse_enabled = true;
                tracing::debug!("mouse tracking enabled");
            }
            Err(err) => tracing::warn!(%err, "could not enable mouse tracking"),
        }
    }

    pub fn disable_mouse<W: Write>(&mut self, w: &mut W) {
        if !self.mouse_enabled {
            return;
        }
        self.mouse_enabled = false;
        if let Err(err) = ansi::disable_mouse(w).and_then(|()| w.flush()) {
            tracing::warn!(%err, "could not disable mouse tracking");
        }
    }

    /// Raw mode needs stdin to be a terminal; otherwise this is a no-op.
    pub fn enable_raw_mode(&mut self) {
        if !self.interactive || self.raw_mode {
            return;
        }
        if !io::stdin().is_tty() {
            tracing::debug!("stdin is not a tty; raw mode skipped");
            return;
        }
        match crossterm::terminal::enable_raw_mode() {
            Ok(()) => {
                self.raw_mode = true;
                tracing::debug!("raw mode enabled");
            }
            Err(err) => tracing::warn!(%err, "could not enable raw mode"),
        }
    }

    pub fn disable_raw_mode(&mut self) {
        if !self.raw_mode {
            return;
        }
        self.raw_mode = false;
        if let Err(err) = crossterm::terminal::disable_raw_mode() {
            tracing::warn!(%err, "could not disable raw mode");
        }
    }

    /// Reverse every active mode.
    ///
    /// Only modes that are on get turned off, so a second call writes
    /// nothing. Never fails.
    pub fn cleanup<W: Write>(&mut self, w: &mut W) {
        self.disable_mouse(w);
        self.exit_alternate_screen(w);
        if self.cursor_hidden {
            self.cursor_hidden = false;
            if let Err(err) = ansi::cursor_show(w).and_then(|()| w.flush()) {
                tracing::warn!(%err, "could not show cursor");
            }
        }
        self.disable_raw_mode();
    }
}

// =============================================================================
// Emergency cleanup
// =============================================================================

/// Best-effort terminal restore straight to stdout.
///
/// Stateless and safe to call at any time, including from a panic hook or
/// after a termination signal. Every step ignores errors.
pub fn emergency_cleanup() {
    let mut stdout = io::stdout();
    let _ = ansi::disable_mouse(&mut stdout);
    let _ = ansi::reset(&mut stdout);
    let _ = ansi::cursor_show(&mut stdout);
    let _ = ansi::exit_alt_screen(&mut stdout);
    let _ = stdout.flush();
    let _ = crossterm::terminal::disable_raw_mode();
}

/// Install a panic hook that restores the terminal before the previous
/// hook runs. Installing twice is a no-op.
///
/// Panics contained inside component hooks are left alone: they are logged
/// and the app keeps running.
pub fn install_panic_hook() {
    static HOOK: OnceLock<()> = OnceLock::new();
    HOOK.get_or_init(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            if crate::component::is_containing() {
                return;
            }
            emergency_cleanup();
            previous(info);
        }));
    });
}

/// Current terminal size, if stdout is a terminal.
pub fn terminal_size() -> Option<(u16, u16)> {
    if !io::stdout().is_tty() {
        return None;
    }
    crossterm::terminal::size().ok().filter(|&(w, h)| w > 0 && h > 0)
}

// =============================================================================
// Signals
// =============================================================================

/// Flags raised by SIGWINCH and SIGINT/SIGTERM.
///
/// The handlers only set atomics; the event loop polls and acts on them.
#[derive(Debug, Default)]
pub struct SignalFlags {
    resize: Arc<AtomicBool>,
    terminate: Arc<AtomicBool>,
    #[cfg(unix)]
    ids: Vec<signal_hook::SigId>,
}

impl SignalFlags {
    /// Flags with no handlers attached.
    pub fn inert() -> Self {
        Self::default()
    }

    /// Register handlers for resize and termination signals.
    #[cfg(unix)]
    pub fn register() -> io::Result<Self> {
        use signal_hook::consts::signal::{SIGINT, SIGTERM, SIGWINCH};

        let mut flags = Self::default();
        flags.ids.push(signal_hook::flag::register(SIGWINCH, flags.resize.clone())?);
        for signal in [SIGINT, SIGTERM] {
            flags.ids.push(signal_hook::flag::register(signal, flags.terminate.clone())?);
        }
        Ok(flags)
    }

    #[cfg(not(unix))]
    pub fn register() -> io::Result<Self> {
        Ok(Self::default())
    }

    /// True once per resize signal burst.
    pub fn take_resize(&self) -> bool {
        self.resize.swap(false, Ordering::SeqCst)
    }

    pub fn terminate_requested(&self) -> bool {
        self.terminate.load(Ordering::SeqCst)
    }

    /// Raise the resize flag by hand.
    pub fn raise_resize(&self) {
        self.resize.store(true, Ordering::SeqCst);
    }

    /// Raise the terminate flag by hand.
    pub fn raise_terminate(&self) {
        self.terminate.store(true, Ordering::SeqCst);
    }
}

#[cfg(unix)]
impl Drop for SignalFlags {
    fn drop(&mut self) {
        for id in self.ids.drain(..) {
            signal_hook::low_level::unregister(id);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text(bytes: &[u8]) -> String {
        String::from_utf8_lossy(bytes).into_owned()
    }

    #[test]
    fn test_non_interactive_is_noop() {
        let mut modes = TerminalModes::new(false);
        let mut out = Vec::new();
        modes.enter_alternate_screen(&mut out);
        modes.enable_mouse(&mut out);
        modes.enable_raw_mode();
        modes.cleanup(&mut out);
        assert!(out.is_empty());
        assert!(!modes.is_alt_screen() && !modes.is_mouse_enabled() && !modes.is_raw_mode());
    }

    #[test]
    fn test_enter_and_cleanup_sequences() {
        let mut modes = TerminalModes::new(true);
        let mut out = Vec::new();
        modes.enter_alternate_screen(&mut out);
        modes.enable_mouse(&mut out);
        assert_eq!(text(&out), "\x1b[?1049h\x1b[?25l\x1b[2J\x1b[H\x1b[?1000h\x1b[?1006h");

        out.clear();
        modes.cleanup(&mut out);
        assert_eq!(text(&out), "\x1b[?1000l\x1b[?1006l\x1b[0m\x1b[?25h\x1b[?1049l");
    }

    #[test]
    fn test_cleanup_twice_writes_once() {
        let mut modes = TerminalModes::new(true);
        let mut out = Vec::new();
        modes.enter_alternate_screen(&mut out);
        modes.cleanup(&mut out);

        let mut second = Vec::new();
        modes.cleanup(&mut second);
        assert!(second.is_empty());
        assert!(!modes.is_cursor_hidden());
    }

    #[test]
    fn test_hidden_cursor_restored_without_alt_screen() {
        let mut modes = TerminalModes::new(true);
        modes.note_cursor_hidden(true);
        let mut out = Vec::new();
        modes.cleanup(&mut out);
        assert_eq!(text(&out), "\x1b[?25h");
    }

    #[test]
    fn test_signal_flags_manual() {
        let flags = SignalFlags::inert();
        assert!(!flags.take_resize());
        flags.raise_resize();
        assert!(flags.take_resize());
        assert!(!flags.take_resize());
        assert!(!flags.terminate_requested());
        flags.raise_terminate();
        assert!(flags.terminate_requested());
    }
}
