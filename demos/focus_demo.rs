//! Focus demo.
//!
//! Three buttons and a text field. Tab / Shift+Tab cycle focus, clicks
//! focus and press buttons, F2 toggles cursor mode, Ctrl+C quits.
//!
//! ```sh
//! cargo run --example focus_demo
//! SPARK_SCREEN_LOG=/tmp/focus_demo.log RUST_LOG=spark_screen=debug cargo run --example focus_demo
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use spark_screen::{
    BorderKind, Color, CursorPos, CursorProvider, FocusInfo, Interactive, KeyCode, KeyEvent, MouseAware,
    MouseEvent, MouseKind, Region, RenderContext, Renderable, Screen, ScreenConfig, Style,
};

struct Button {
    label: &'static str,
    presses: u32,
}

impl Renderable for Button {
    fn render(&mut self, ctx: &mut RenderContext<'_>) {
        let border = if ctx.is_focused() {
            Style::new().fg(Color::CYAN)
        } else if ctx.is_hovered() {
            Style::new().fg(Color::YELLOW)
        } else {
            Style::new()
        };
        ctx.draw_border(BorderKind::Rounded, Some(border));
        ctx.write(&format!("{} ({})", self.label, self.presses), 2, 1, None);
    }

    fn focus_info(&self) -> FocusInfo {
        FocusInfo::focusable()
    }

    fn as_interactive(&mut self) -> Option<&mut dyn Interactive> {
        Some(self)
    }

    fn as_mouse_aware(&mut self) -> Option<&mut dyn MouseAware> {
        Some(self)
    }
}

impl Interactive for Button {
    fn handle_input(&mut self, key: &KeyEvent) -> bool {
        match key.code {
            KeyCode::Enter | KeyCode::Char(' ') => {
                self.presses += 1;
                true
            }
            _ => false,
        }
    }
}

impl MouseAware for Button {
    fn handle_mouse(&mut self, event: &MouseEvent) -> bool {
        if event.kind == MouseKind::Release {
            self.presses += 1;
            return true;
        }
        false
    }
}

#[derive(Default)]
struct TextField {
    text: String,
}

impl Renderable for TextField {
    fn render(&mut self, ctx: &mut RenderContext<'_>) {
        let style = ctx.is_focused().then(|| Style::new().fg(Color::CYAN));
        ctx.draw_border(BorderKind::Single, style);
        ctx.write(&self.text, 1, 1, None);
    }

    fn focus_info(&self) -> FocusInfo {
        FocusInfo::focusable()
    }

    fn as_interactive(&mut self) -> Option<&mut dyn Interactive> {
        Some(self)
    }

    fn as_cursor_provider(&self) -> Option<&dyn CursorProvider> {
        Some(self)
    }
}

impl Interactive for TextField {
    fn handle_input(&mut self, key: &KeyEvent) -> bool {
        match key.code {
            KeyCode::Backspace => self.text.pop().is_some(),
            _ => match key.char() {
                Some(c) => {
                    self.text.push(c);
                    true
                }
                None => false,
            },
        }
    }
}

impl CursorProvider for TextField {
    fn cursor_position(&self) -> Option<CursorPos> {
        let x = u16::try_from(self.text.chars().count()).ok()?.saturating_add(1);
        Some(CursorPos::new(x, 1))
    }
}

struct Help;

impl Renderable for Help {
    fn render(&mut self, ctx: &mut RenderContext<'_>) {
        let dim = Style::new().fg(Color::Ansi(8));
        ctx.write("Tab/Shift+Tab focus · click · F2 cursor mode · Ctrl+C quit", 0, 0, Some(dim));
    }
}

fn main() -> spark_screen::Result<()> {
    if let Ok(path) = std::env::var("SPARK_SCREEN_LOG") {
        spark_screen::init_file_logging(path, "spark_screen=info")?;
    }

    let mut screen = Screen::new(ScreenConfig::from_env())?;

    screen.register_component("help", Rc::new(RefCell::new(Help)), Region::new(2, 0, 70, 1))?;
    screen.register_component("field", Rc::new(RefCell::new(TextField::default())), Region::new(2, 2, 40, 3))?;
    for (i, label) in ["One", "Two", "Three"].into_iter().enumerate() {
        let x = 2 + 14 * i as u16;
        let button = Rc::new(RefCell::new(Button { label, presses: 0 }));
        screen.register_component(&label.to_ascii_lowercase(), button, Region::new(x, 6, 12, 3))?;
    }

    spark_screen::run(&mut screen)
}
