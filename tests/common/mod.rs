//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use spark_screen::{
    CursorPos, CursorProvider, FocusInfo, Interactive, KeyEvent, MouseAware, MouseEvent, RenderContext,
    Renderable, Screen,
};

/// A configurable component that records everything it receives.
#[derive(Debug, Default)]
pub struct Probe {
    pub label: String,
    pub focus: FocusInfo,
    pub cursor: Option<CursorPos>,
    /// Keys this probe consumes. Empty = consume printable chars only.
    pub keys: Vec<KeyEvent>,
    pub typed: String,
    pub mouse: Vec<MouseEvent>,
    pub focus_calls: u32,
    pub blur_calls: u32,
    pub renders: u32,
    pub panic_on_render: bool,
}

impl Probe {
    pub fn label(text: &str) -> Self {
        Self {
            label: text.to_string(),
            ..Self::default()
        }
    }

    pub fn focusable(text: &str) -> Self {
        Self {
            focus: FocusInfo::focusable(),
            ..Self::label(text)
        }
    }

    pub fn with_focus(mut self, focus: FocusInfo) -> Self {
        self.focus = focus;
        self
    }

    pub fn with_cursor(mut self, x: u16, y: u16) -> Self {
        self.cursor = Some(CursorPos::new(x, y));
        self
    }

    pub fn shared(self) -> Rc<RefCell<Probe>> {
        Rc::new(RefCell::new(self))
    }
}

impl Renderable for Probe {
    fn render(&mut self, ctx: &mut RenderContext<'_>) {
        self.renders += 1;
        if self.panic_on_render {
            panic!("probe {} refused to render", self.label);
        }
        let marker = if ctx.is_focused() { "*" } else { "" };
        ctx.write(&format!("{marker}{}{}", self.label, self.typed), 0, 0, None);
    }

    fn focus_info(&self) -> FocusInfo {
        self.focus
    }

    fn on_focus(&mut self) {
        self.focus_calls += 1;
    }

    fn on_blur(&mut self) {
        self.blur_calls += 1;
    }

    fn as_interactive(&mut self) -> Option<&mut dyn Interactive> {
        Some(self)
    }

    fn as_mouse_aware(&mut self) -> Option<&mut dyn MouseAware> {
        Some(self)
    }

    fn as_cursor_provider(&self) -> Option<&dyn CursorProvider> {
        self.cursor.is_some().then_some(self as &dyn CursorProvider)
    }
}

impl Interactive for Probe {
    fn handle_input(&mut self, key: &KeyEvent) -> bool {
        if !self.keys.is_empty() {
            return self.keys.contains(key);
        }
        match key.char() {
            Some(c) => {
                self.typed.push(c);
                true
            }
            None => false,
        }
    }
}

impl MouseAware for Probe {
    fn handle_mouse(&mut self, event: &MouseEvent) -> bool {
        self.mouse.push(*event);
        true
    }
}

impl CursorProvider for Probe {
    fn cursor_position(&self) -> Option<CursorPos> {
        self.cursor
    }
}

pub fn headless(width: u16, height: u16) -> Screen<Vec<u8>> {
    Screen::headless(Vec::new(), width, height)
}

/// Everything written to the sink so far, lossily decoded.
pub fn output(screen: &Screen<Vec<u8>>) -> String {
    String::from_utf8_lossy(screen.writer()).into_owned()
}
