//! Event loop.
//!
//! Single-threaded loop on the caller's thread. The stdin reader thread only
//! moves bytes over a channel; every chunk is classified and dispatched here,
//! one at a time, so no two handlers ever run concurrently.
//!
//! Each iteration:
//!
//! 1. stop on a termination signal
//! 2. pick up a pending resize
//! 3. wait up to one frame interval for input and dispatch it
//! 4. resolve a held ESC once the escape timeout passed
//! 5. advance the cursor blink timer
//! 6. render if anything requested it
//!
//! The terminal is restored when the loop exits, on every path.

use std::io::Write;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Instant;

use super::screen::Screen;
use super::terminal::{SignalFlags, install_panic_hook, terminal_size};
use crate::error::Result;
use crate::input::{StdinMessage, StdinReader};

/// Input source plus signal flags driving a [`Screen`].
#[derive(Debug)]
pub struct EventLoop {
    reader: Option<StdinReader>,
    input: Receiver<StdinMessage>,
    signals: SignalFlags,
    panic_hook: bool,
}

impl EventLoop {
    /// Loop over process stdin with signal handlers installed.
    pub fn new() -> Result<Self> {
        let (reader, input) = StdinReader::spawn()?;
        let signals = SignalFlags::register()?;
        Ok(Self {
            reader: Some(reader),
            input,
            signals,
            panic_hook: true,
        })
    }

    /// Loop over an arbitrary message channel.
    ///
    /// No panic hook is installed unless asked for with
    /// [`with_panic_hook`](Self::with_panic_hook).
    pub fn from_parts(input: Receiver<StdinMessage>, signals: SignalFlags) -> Self {
        Self {
            reader: None,
            input,
            signals,
            panic_hook: false,
        }
    }

    /// Whether [`run`](Self::run) installs the process-wide terminal-restoring panic hook.
    pub fn with_panic_hook(mut self, enabled: bool) -> Self {
        self.panic_hook = enabled;
        self
    }

    pub fn installs_panic_hook(&self) -> bool {
        self.panic_hook
    }

    pub fn signals(&self) -> &SignalFlags {
        &self.signals
    }

    /// Start the screen and run until it stops.
    pub fn run<W: Write>(&mut self, screen: &mut Screen<W>) -> Result<()> {
        if self.panic_hook {
            install_panic_hook();
        }
        screen.start()?;
        tracing::info!("event loop started");

        let result = self.drive(screen);

        screen.cleanup();
        if let Some(reader) = self.reader.as_mut() {
            reader.stop();
        }
        match &result {
            Ok(()) => tracing::info!("event loop stopped"),
            Err(err) => tracing::error!(%err, "event loop failed"),
        }
        result
    }

    fn drive<W: Write>(&mut self, screen: &mut Screen<W>) -> Result<()> {
        let mut pending_since: Option<Instant> = None;

        while screen.is_running() {
            if self.signals.terminate_requested() {
                tracing::info!("termination signal");
                screen.stop();
                break;
            }

            if self.signals.take_resize() {
                if let Some((width, height)) = terminal_size() {
                    screen.resize(width, height)?;
                }
            }

            match self.input.recv_timeout(screen.config().frame_interval) {
                Ok(StdinMessage::Data(chunk)) => screen.handle_input_bytes(&chunk)?,
                Ok(StdinMessage::Closed) | Err(RecvTimeoutError::Disconnected) => {
                    tracing::debug!("input closed");
                    screen.stop();
                }
                Err(RecvTimeoutError::Timeout) => {}
            }

            let now = Instant::now();
            if screen.has_pending_input() {
                let since = *pending_since.get_or_insert(now);
                if now.duration_since(since) >= screen.config().escape_timeout {
                    screen.flush_pending_input()?;
                    pending_since = None;
                }
            } else {
                pending_since = None;
            }

            screen.tick(now)?;
            screen.render_if_pending()?;
        }
        Ok(())
    }
}

/// Run a screen over process stdin until it stops.
pub fn run<W: Write>(screen: &mut Screen<W>) -> Result<()> {
    EventLoop::new()?.run(screen)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{FocusInfo, Interactive, RenderContext, Renderable};
    use crate::config::ScreenConfig;
    use crate::input::KeyEvent;
    use crate::types::Region;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::mpsc;

    #[derive(Default)]
    struct Echo {
        text: String,
    }

    impl Renderable for Echo {
        fn render(&mut self, ctx: &mut RenderContext<'_>) {
            ctx.write(&self.text, 0, 0, None);
        }

        fn focus_info(&self) -> FocusInfo {
            FocusInfo::focusable()
        }

        fn as_interactive(&mut self) -> Option<&mut dyn Interactive> {
            Some(self)
        }
    }

    impl Interactive for Echo {
        fn handle_input(&mut self, key: &KeyEvent) -> bool {
            key.char().map(|c| self.text.push(c)).is_some()
        }
    }

    #[test]
    fn test_runs_until_input_closes() {
        let (tx, rx) = mpsc::channel();
        tx.send(StdinMessage::Data(b"hey".to_vec())).unwrap();
        tx.send(StdinMessage::Closed).unwrap();

        let mut screen = Screen::headless(Vec::new(), 8, 2);
        let echo = Rc::new(RefCell::new(Echo::default()));
        screen.register_component("echo", echo.clone(), Region::new(0, 0, 8, 1)).unwrap();

        EventLoop::from_parts(rx, SignalFlags::inert()).run(&mut screen).unwrap();
        assert_eq!(echo.borrow().text, "hey");
        assert_eq!(screen.buffer().row_text(0), "hey     ");
        assert!(!screen.is_running());
    }

    #[test]
    fn test_channel_loop_leaves_panic_hook_alone() {
        let (_tx, rx) = mpsc::channel::<StdinMessage>();
        let event_loop = EventLoop::from_parts(rx, SignalFlags::inert());
        assert!(!event_loop.installs_panic_hook());
        assert!(event_loop.with_panic_hook(true).installs_panic_hook());
    }

    #[test]
    fn test_quit_key_stops_and_restores_terminal() {
        let (tx, rx) = mpsc::channel();
        tx.send(StdinMessage::Data(vec![0x03])).unwrap();

        let mut screen = Screen::with_writer(Vec::new(), 8, 2, ScreenConfig::headless());
        EventLoop::from_parts(rx, SignalFlags::inert()).run(&mut screen).unwrap();
        assert!(!screen.is_running());
        // The first frame hid the cursor; cleanup shows it again.
        let out = String::from_utf8_lossy(screen.writer()).into_owned();
        assert!(out.ends_with("\x1b[?25h"), "{out:?}");
    }

    #[test]
    fn test_terminate_signal_stops() {
        let (_tx, rx) = mpsc::channel::<StdinMessage>();
        let signals = SignalFlags::inert();
        signals.raise_terminate();

        let mut screen = Screen::headless(Vec::new(), 4, 1);
        EventLoop::from_parts(rx, signals).run(&mut screen).unwrap();
        assert!(!screen.is_running());
        assert_eq!(screen.frame_count(), 1);
    }

    #[test]
    fn test_lone_escape_resolves_after_timeout() {
        let (tx, rx) = mpsc::channel();
        tx.send(StdinMessage::Data(vec![0x1b])).unwrap();

        let mut screen = Screen::headless(Vec::new(), 4, 1);
        let escapes = Rc::new(RefCell::new(0));
        let seen = escapes.clone();
        screen.on_key(move |key| {
            if key.code == crate::input::KeyCode::Escape {
                *seen.borrow_mut() += 1;
            }
            false
        });
        // Keep the channel open for a few frames, then close it.
        std::thread::spawn(move || {
            std::thread::sleep(std::time::Duration::from_millis(80));
            let _ = tx.send(StdinMessage::Closed);
        });

        EventLoop::from_parts(rx, SignalFlags::inert()).run(&mut screen).unwrap();
        assert_eq!(*escapes.borrow(), 1);
    }
}
