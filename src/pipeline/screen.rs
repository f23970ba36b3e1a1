//! Screen Engine.
//!
//! The [`Screen`] is the sole owner of the terminal and the ScreenBuffer.
//! It holds the registered components, the focus state, and the terminal
//! modes, and it turns every state change into a render pass:
//!
//! ```text
//! clear buffer → render each registered component into its region
//!              → overlay virtual cursor → resolve real cursor → flush
//! ```
//!
//! Input arrives as raw chunks. Each chunk is classified first: mouse
//! reports are hit-tested and dispatched, mouse noise is dropped, and only
//! clean chunks reach the key decoder. Keys go to the global bindings, then
//! cursor mode, then the focused component, then app key handlers.
//!
//! # Example
//!
//! ```ignore
//! let mut screen = Screen::new(ScreenConfig::from_env())?;
//! screen.register_component("list", list.clone(), Region::new(0, 0, 40, 20))?;
//! screen.start()?;
//! run(&mut screen)?;
//! ```

use std::io::{self, Stdout, Write};
use std::time::Instant;

use crossterm::tty::IsTty;

use super::registry::{Registry, RegistryEntry};
use super::terminal::{TerminalModes, terminal_size};
use crate::component::{ComponentRef, RenderContext, RenderTrigger, contain, with_component};
use crate::config::{GlobalAction, ScreenConfig};
use crate::error::Result;
use crate::input::{Classified, KeyCode, KeyDecoder, KeyEvent, MouseEvent, MouseKind, Noise, classify};
use crate::renderer::{OutputBuffer, OutputFilter, ScreenBuffer, encode_frame};
use crate::state::{FocusManager, HitGrid, VirtualCursor};
use crate::types::{BorderKind, CursorPos, Region, Style};

/// Fallback dimensions when the terminal size cannot be read.
const DEFAULT_SIZE: (u16, u16) = (80, 24);

/// App-level key handler. Returns true when it consumed the key.
pub type KeyHandler = Box<dyn FnMut(&KeyEvent) -> bool>;

/// Handle for removing a key handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

/// The Screen Engine.
pub struct Screen<W: Write> {
    buffer: ScreenBuffer,
    out: OutputFilter<W>,
    frame: OutputBuffer,
    modes: TerminalModes,
    /// Raw mode is only touched when this screen owns the process tty.
    owns_tty: bool,
    config: ScreenConfig,

    registry: Registry,
    focus: FocusManager,
    hit_grid: HitGrid,
    hit_grid_dirty: bool,
    hovered: Option<String>,

    virtual_cursor: VirtualCursor,
    cursor_mode: bool,
    cursor: Option<CursorPos>,
    trigger: RenderTrigger,
    frames: u64,

    decoder: KeyDecoder,
    key_handlers: Vec<(HandlerId, KeyHandler)>,
    next_handler: u64,
    running: bool,
}

impl Screen<Stdout> {
    /// A screen on stdout, sized to the terminal.
    ///
    /// Without a terminal on stdout the screen still works, but every
    /// terminal mode switch is a no-op.
    pub fn new(config: ScreenConfig) -> Result<Self> {
        let stdout = io::stdout();
        let interactive = stdout.is_tty();
        let (width, height) = terminal_size().unwrap_or(DEFAULT_SIZE);
        let mut screen = Self::build(stdout, width, height, config, interactive);
        screen.owns_tty = interactive;
        tracing::info!(width, height, interactive, "screen created");
        Ok(screen)
    }
}

impl<W: Write> Screen<W> {
    /// A screen over any sink with explicit dimensions.
    ///
    /// Terminal mode escapes are written to the sink; raw mode is never
    /// touched.
    pub fn with_writer(writer: W, width: u16, height: u16, config: ScreenConfig) -> Self {
        Self::build(writer, width, height, config, true)
    }

    /// A screen over any sink that never switches terminal modes.
    pub fn headless(writer: W, width: u16, height: u16) -> Self {
        Self::build(writer, width, height, ScreenConfig::headless(), false)
    }

    fn build(writer: W, width: u16, height: u16, config: ScreenConfig, interactive: bool) -> Self {
        let out = if config.output_filter {
            OutputFilter::new(writer)
        } else {
            OutputFilter::passthrough(writer)
        };
        Self {
            buffer: ScreenBuffer::new(width, height),
            out,
            frame: OutputBuffer::new(),
            modes: TerminalModes::new(interactive),
            owns_tty: false,
            registry: Registry::new(),
            focus: FocusManager::new(),
            hit_grid: HitGrid::new(width, height),
            hit_grid_dirty: true,
            hovered: None,
            virtual_cursor: VirtualCursor::new(config.virtual_cursor_glyph, config.cursor_blink),
            cursor_mode: false,
            cursor: None,
            trigger: RenderTrigger::new(),
            frames: 0,
            decoder: KeyDecoder::new(),
            key_handlers: Vec::new(),
            next_handler: 0,
            running: false,
            config,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn width(&self) -> u16 {
        self.buffer.width()
    }

    #[inline]
    pub fn height(&self) -> u16 {
        self.buffer.height()
    }

    pub fn buffer(&self) -> &ScreenBuffer {
        &self.buffer
    }

    pub fn config(&self) -> &ScreenConfig {
        &self.config
    }

    pub fn modes(&self) -> &TerminalModes {
        &self.modes
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The underlying sink.
    pub fn writer(&self) -> &W {
        self.out.get_ref()
    }

    pub fn writer_mut(&mut self) -> &mut W {
        self.out.get_mut()
    }

    /// Real cursor position resolved by the last render.
    pub fn cursor_position(&self) -> Option<CursorPos> {
        self.cursor
    }

    pub fn hovered_id(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    pub fn is_cursor_mode(&self) -> bool {
        self.cursor_mode
    }

    pub fn virtual_cursor(&self) -> &VirtualCursor {
        &self.virtual_cursor
    }

    /// Number of completed render passes.
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Ask the event loop to stop.
    pub fn stop(&mut self) {
        self.running = false;
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Switch terminal modes per config and paint the first frame.
    pub fn start(&mut self) -> Result<()> {
        if self.config.alternate_screen {
            self.modes.enter_alternate_screen(&mut self.out);
        }
        if self.config.mouse {
            self.modes.enable_mouse(&mut self.out);
        }
        if self.config.raw_mode && self.owns_tty {
            self.modes.enable_raw_mode();
        }
        self.running = true;
        self.render()?;
        Ok(())
    }

    /// Reverse every terminal mode change. Safe to call repeatedly.
    pub fn cleanup(&mut self) {
        self.running = false;
        self.modes.cleanup(&mut self.out);
    }

    /// Reallocate for new terminal dimensions and repaint.
    pub fn resize(&mut self, width: u16, height: u16) -> Result<()> {
        tracing::info!(width, height, "resize");
        self.buffer.resize(width, height);
        self.hit_grid.resize(width, height);
        self.hit_grid_dirty = true;
        self.virtual_cursor.on_resize(&self.buffer);
        self.render()?;
        Ok(())
    }

    // =========================================================================
    // Drawing
    // =========================================================================

    /// Write text into the buffer. See [`ScreenBuffer::write`].
    pub fn write(&mut self, text: &str, x: i32, y: i32, style: Option<Style>) {
        self.buffer.write(text, x, y, style);
    }

    pub fn fill_region(&mut self, region: &Region, ch: char, style: Option<Style>) {
        self.buffer.fill_region(region, ch, style);
    }

    pub fn draw_box(&mut self, x: u16, y: u16, width: u16, height: u16, kind: BorderKind, style: Option<Style>) {
        self.buffer.draw_box(x, y, width, height, kind, style);
    }

    // =========================================================================
    // Registry
    // =========================================================================

    /// Register a component at an absolute region.
    ///
    /// The first focusable component registered while nothing has focus
    /// receives focus. Duplicate ids are rejected.
    pub fn register_component(&mut self, id: &str, component: ComponentRef, region: Region) -> Result<()> {
        let focusable = self.registry.insert(id, component, region)?.is_focusable();
        tracing::debug!(component = id, %region, focusable, "registered");
        self.hit_grid_dirty = true;
        if focusable && !self.focus.has_focus() {
            self.focus.focus(&self.registry, id);
        }
        self.trigger.request();
        Ok(())
    }

    /// Unregister a component. A focused component is blurred first and
    /// focus is left empty. Returns false for unknown ids.
    pub fn unregister(&mut self, id: &str) -> bool {
        if self.registry.get(id).is_none() {
            return false;
        }
        if self.focus.is_focused(id) {
            self.focus.blur(&self.registry);
        }
        self.focus.forget(id);
        if self.hovered.as_deref() == Some(id) {
            self.hovered = None;
        }
        self.registry.remove(id);
        self.hit_grid_dirty = true;
        self.trigger.request();
        tracing::debug!(component = id, "unregistered");
        true
    }

    /// Move a component. Returns false for unknown ids.
    pub fn update_component_region(&mut self, id: &str, region: Region) -> bool {
        let found = self.registry.set_region(id, region);
        if found {
            self.hit_grid_dirty = true;
            self.trigger.request();
        }
        found
    }

    // =========================================================================
    // Focus
    // =========================================================================

    pub fn focused_id(&self) -> Option<&str> {
        self.focus.focused_id()
    }

    /// Cycle focus forward and repaint. Returns true if something holds focus.
    pub fn focus_next(&mut self) -> Result<bool> {
        let focused = self.focus.focus_next(&self.registry).is_some();
        self.render()?;
        Ok(focused)
    }

    /// Cycle focus backward and repaint.
    pub fn focus_previous(&mut self) -> Result<bool> {
        let focused = self.focus.focus_previous(&self.registry).is_some();
        self.render()?;
        Ok(focused)
    }

    /// Focus a registered component. Returns false if it cannot take focus.
    pub fn focus(&mut self, id: &str) -> Result<bool> {
        let focused = self.focus.focus(&self.registry, id);
        if focused {
            self.render()?;
        }
        Ok(focused)
    }

    pub fn blur(&mut self) -> Result<()> {
        if self.focus.has_focus() {
            self.focus.blur(&self.registry);
            self.render()?;
        }
        Ok(())
    }

    /// Trap focus inside a registered component's region.
    pub fn push_focus_trap(&mut self, id: &str) {
        self.focus.push_focus_trap(id);
    }

    pub fn pop_focus_trap(&mut self) -> Option<String> {
        self.focus.pop_focus_trap()
    }

    pub fn restore_previous_focus(&mut self) -> Result<bool> {
        let restored = self.focus.restore_previous_focus(&self.registry);
        if restored {
            self.render()?;
        }
        Ok(restored)
    }

    /// Focused ids, oldest first.
    pub fn focus_history(&self) -> Vec<&str> {
        self.focus.history().collect()
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    /// Handle for requesting renders from outside the engine.
    pub fn render_trigger(&self) -> RenderTrigger {
        self.trigger.clone()
    }

    /// Request a render for the next loop iteration.
    pub fn request_render(&self) -> bool {
        self.trigger.request()
    }

    /// Render only if a render was requested.
    pub fn render_if_pending(&mut self) -> Result<bool> {
        if self.trigger.take_pending() {
            return self.render();
        }
        Ok(false)
    }

    /// Full repaint. Returns false if a render was already in flight.
    pub fn render(&mut self) -> Result<bool> {
        let Some(_pass) = self.trigger.begin() else {
            tracing::debug!("nested render dropped");
            return Ok(false);
        };

        self.buffer.clear();
        let focused = self.focus.focused_id();
        let hovered = self.hovered.as_deref();
        for entry in self.registry.entries() {
            let mut ctx = RenderContext::new(&mut self.buffer, entry.region, &entry.id, focused, hovered, &self.trigger);
            with_component(&entry.component, &entry.id, "render", |c| c.render(&mut ctx));
        }

        self.virtual_cursor.overlay(&mut self.buffer);
        self.cursor = self.resolve_cursor();
        self.flush()?;
        self.frames += 1;
        Ok(true)
    }

    /// Absolute cursor position reported by the focused component.
    fn resolve_cursor(&self) -> Option<CursorPos> {
        if self.cursor_mode {
            return None;
        }
        let id = self.focus.focused_id()?;
        let entry = self.registry.get(id)?;
        let component = entry.component.try_borrow().ok()?;
        let relative = contain(id, "cursor_position", || {
            component.as_cursor_provider().and_then(|p| p.cursor_position())
        })??;

        let x = entry.region.x.checked_add(relative.x)?;
        let y = entry.region.y.checked_add(relative.y)?;
        (entry.region.contains(x, y) && self.buffer.in_bounds(x, y)).then_some(CursorPos::new(x, y))
    }

    /// Encode the buffer and write it out in one call.
    fn flush(&mut self) -> io::Result<()> {
        self.frame.clear();
        encode_frame(&mut self.frame, &self.buffer, self.cursor)?;
        self.frame.flush_to(&mut self.out)?;
        self.modes.note_cursor_hidden(self.cursor.is_none());
        Ok(())
    }

    // =========================================================================
    // Input
    // =========================================================================

    /// Classify and dispatch one raw input chunk.
    pub fn handle_input_bytes(&mut self, chunk: &[u8]) -> Result<()> {
        match classify(chunk) {
            Classified::Mouse(events) => {
                for event in events {
                    self.handle_mouse(event)?;
                }
            }
            Classified::Discarded(noise) => {
                // A report split after its ESC or CSI head leaves the head held
                // by the key decoder; it belongs to the discarded report.
                let head_dropped = matches!(noise, Noise::StrayCoordinates | Noise::Fragment)
                    && self.decoder.discard_mouse_head();
                tracing::debug!(?noise, len = chunk.len(), head_dropped, "discarded input chunk");
            }
            Classified::Keys => {
                for key in self.decoder.feed(chunk) {
                    self.handle_key(key)?;
                }
            }
        }
        Ok(())
    }

    /// True while the key decoder holds an unfinished escape sequence.
    pub fn has_pending_input(&self) -> bool {
        self.decoder.has_pending()
    }

    /// Resolve held input after the escape timeout (a lone ESC becomes Escape).
    pub fn flush_pending_input(&mut self) -> Result<()> {
        for key in self.decoder.flush_pending() {
            self.handle_key(key)?;
        }
        Ok(())
    }

    /// Dispatch one mouse event. Returns true if anything changed.
    pub fn handle_mouse(&mut self, event: MouseEvent) -> Result<bool> {
        let event = event.clamped(self.width(), self.height());
        self.refresh_hit_grid();
        let target = self
            .hit_grid
            .get(event.x, event.y)
            .and_then(|slot| self.registry.slot(slot))
            .map(|e: &RegistryEntry| (e.id.clone(), e.component.clone(), e.region));

        let mut changed = false;

        if event.kind == MouseKind::Move {
            let over = target.as_ref().map(|(id, _, _)| id.clone());
            if over != self.hovered {
                self.hovered = over;
                changed = true;
            }
        }

        if let Some((id, component, region)) = target {
            if event.kind == MouseKind::Press && !self.focus.is_focused(&id) {
                changed |= self.focus.focus(&self.registry, &id);
            }
            if let Some(local) = event.relative_to(&region) {
                let handled = with_component(&component, &id, "handle_mouse", |c| {
                    c.as_mouse_aware().is_some_and(|m| m.handle_mouse(&local))
                });
                changed |= handled.unwrap_or(false);
            }
        }

        if changed {
            self.render()?;
        }
        Ok(changed)
    }

    fn refresh_hit_grid(&mut self) {
        if self.hit_grid_dirty {
            self.hit_grid.rebuild(self.registry.regions());
            self.hit_grid_dirty = false;
        }
    }

    /// Dispatch one key. Returns true if something consumed it.
    pub fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        match self.config.keys.action_for(&key) {
            Some(GlobalAction::Quit) => {
                tracing::info!("quit requested");
                self.running = false;
                return Ok(true);
            }
            Some(GlobalAction::FocusNext) => {
                self.focus_next()?;
                return Ok(true);
            }
            Some(GlobalAction::FocusPrevious) => {
                self.focus_previous()?;
                return Ok(true);
            }
            Some(GlobalAction::ToggleCursorMode) => {
                self.set_cursor_mode(!self.cursor_mode)?;
                return Ok(true);
            }
            None => {}
        }

        if self.cursor_mode && self.handle_cursor_mode_key(&key)? {
            return Ok(true);
        }

        if let Some(entry) = self.focus.focused_id().and_then(|id| self.registry.get(id)) {
            let handled = with_component(&entry.component, &entry.id, "handle_input", |c| {
                c.as_interactive().is_some_and(|i| i.handle_input(&key))
            });
            if handled.unwrap_or(false) {
                self.render()?;
                return Ok(true);
            }
        }

        let handled = self
            .key_handlers
            .iter_mut()
            .any(|(_, handler)| contain("app", "key_handler", || handler(&key)).unwrap_or(false));
        if handled {
            self.render()?;
        }
        Ok(handled)
    }

    /// Add an app key handler. Handlers run in registration order after
    /// the focused component declined a key.
    pub fn on_key(&mut self, handler: impl FnMut(&KeyEvent) -> bool + 'static) -> HandlerId {
        let id = HandlerId(self.next_handler);
        self.next_handler += 1;
        self.key_handlers.push((id, Box::new(handler)));
        id
    }

    pub fn remove_key_handler(&mut self, id: HandlerId) -> bool {
        let before = self.key_handlers.len();
        self.key_handlers.retain(|(h, _)| *h != id);
        self.key_handlers.len() != before
    }

    // =========================================================================
    // Cursor mode
    // =========================================================================

    /// Enter or leave cursor mode (arrow keys drive the virtual cursor).
    pub fn set_cursor_mode(&mut self, on: bool) -> Result<()> {
        if on == self.cursor_mode {
            return Ok(());
        }
        self.cursor_mode = on;
        if on {
            self.virtual_cursor.activate(&mut self.buffer);
        } else {
            self.virtual_cursor.deactivate(&mut self.buffer);
        }
        tracing::debug!(on, "cursor mode");
        self.render()?;
        Ok(())
    }

    fn handle_cursor_mode_key(&mut self, key: &KeyEvent) -> Result<bool> {
        let (dx, dy) = match key.code {
            KeyCode::Up => (0, -1),
            KeyCode::Down => (0, 1),
            KeyCode::Left => (-1, 0),
            KeyCode::Right => (1, 0),
            KeyCode::Enter | KeyCode::Char(' ') => {
                let pos = self.virtual_cursor.position();
                self.handle_mouse(MouseEvent::press(pos.x, pos.y))?;
                self.handle_mouse(MouseEvent::release(pos.x, pos.y))?;
                return Ok(true);
            }
            KeyCode::Escape => {
                self.set_cursor_mode(false)?;
                return Ok(true);
            }
            _ => return Ok(false),
        };
        self.virtual_cursor.move_by(&mut self.buffer, dx, dy);
        self.render()?;
        Ok(true)
    }

    /// Advance timers. Re-flushes when the virtual cursor blinked.
    pub fn tick(&mut self, now: Instant) -> Result<bool> {
        if self.virtual_cursor.tick(&mut self.buffer, now) {
            self.flush()?;
            return Ok(true);
        }
        Ok(false)
    }
}

impl<W: Write> Drop for Screen<W> {
    fn drop(&mut self) {
        self.cleanup();
    }
}

impl<W: Write> std::fmt::Debug for Screen<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Screen")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("registry", &self.registry)
            .field("focus", &self.focus)
            .field("cursor_mode", &self.cursor_mode)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Tests
// =============================================================================
