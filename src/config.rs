//! Screen configuration.
//!
//! [`ScreenConfig`] is a plain struct with defaults suitable for a
//! fullscreen app. A few switches can be overridden from the environment:
//!
//! | Variable | Meaning |
//! |---|---|
//! | `SPARK_SCREEN_MOUSE` | mouse tracking on/off |
//! | `SPARK_SCREEN_ALT_SCREEN` | alternate screen on/off |
//! | `SPARK_SCREEN_RAW_MODE` | raw mode on/off |
//! | `SPARK_SCREEN_OUTPUT_FILTER` | output scrubbing on/off |
//! | `SPARK_SCREEN_CURSOR_BLINK_MS` | virtual cursor blink interval, `0` disables |
//!
//! Booleans accept `1/0`, `true/false`, `yes/no`, `on/off`.

use std::time::Duration;

use crate::error::{Error, Result};
use crate::input::{KeyCode, KeyEvent, Modifiers};

pub const ENV_MOUSE: &str = "SPARK_SCREEN_MOUSE";
pub const ENV_ALT_SCREEN: &str = "SPARK_SCREEN_ALT_SCREEN";
pub const ENV_RAW_MODE: &str = "SPARK_SCREEN_RAW_MODE";
pub const ENV_OUTPUT_FILTER: &str = "SPARK_SCREEN_OUTPUT_FILTER";
pub const ENV_CURSOR_BLINK_MS: &str = "SPARK_SCREEN_CURSOR_BLINK_MS";

// =============================================================================
// Key bindings
// =============================================================================

/// One key chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: Modifiers,
}

impl KeyBinding {
    pub const fn new(code: KeyCode, modifiers: Modifiers) -> Self {
        Self { code, modifiers }
    }

    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, Modifiers::NONE)
    }

    pub const fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), Modifiers::CTRL)
    }

    /// Exact match on code and modifiers.
    pub fn matches(&self, key: &KeyEvent) -> bool {
        self.code == key.code && self.modifiers == key.modifiers
    }
}

/// Global bindings checked before the focused component sees a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBindings {
    pub quit: Vec<KeyBinding>,
    pub focus_next: Vec<KeyBinding>,
    pub focus_previous: Vec<KeyBinding>,
    pub toggle_cursor_mode: Vec<KeyBinding>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            quit: vec![KeyBinding::ctrl('c')],
            focus_next: vec![KeyBinding::plain(KeyCode::Tab)],
            focus_previous: vec![KeyBinding::new(KeyCode::Tab, Modifiers::SHIFT)],
            toggle_cursor_mode: vec![KeyBinding::plain(KeyCode::F(2))],
        }
    }
}

/// Global action bound to a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobalAction {
    Quit,
    FocusNext,
    FocusPrevious,
    ToggleCursorMode,
}

impl KeyBindings {
    /// The global action bound to `key`, if any.
    pub fn action_for(&self, key: &KeyEvent) -> Option<GlobalAction> {
        let hit = |list: &[KeyBinding]| list.iter().any(|b| b.matches(key));
        if hit(&self.quit) {
            Some(GlobalAction::Quit)
        } else if hit(&self.focus_next) {
            Some(GlobalAction::FocusNext)
        } else if hit(&self.focus_previous) {
            Some(GlobalAction::FocusPrevious)
        } else if hit(&self.toggle_cursor_mode) {
            Some(GlobalAction::ToggleCursorMode)
        } else {
            None
        }
    }
}

// =============================================================================
// ScreenConfig
// =============================================================================

/// Screen Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenConfig {
    /// Switch to the alternate screen buffer.
    pub alternate_screen: bool,
    /// Enable SGR mouse tracking.
    pub mouse: bool,
    /// Put stdin into raw mode.
    pub raw_mode: bool,
    /// Scrub mouse-shaped runs from everything written to the terminal.
    pub output_filter: bool,
    /// Virtual cursor blink interval (None = no blink).
    pub cursor_blink: Option<Duration>,
    pub virtual_cursor_glyph: char,
    /// How long a lone ESC waits for the rest of a sequence.
    pub escape_timeout: Duration,
    /// Event loop poll interval.
    pub frame_interval: Duration,
    pub keys: KeyBindings,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            alternate_screen: true,
            mouse: true,
            raw_mode: true,
            output_filter: true,
            cursor_blink: Some(Duration::from_millis(530)),
            virtual_cursor_glyph: '█',
            escape_timeout: Duration::from_millis(10),
            frame_interval: Duration::from_millis(16),
            keys: KeyBindings::default(),
        }
    }
}

impl ScreenConfig {
    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Apply overrides from a custom lookup, keeping defaults for any
    /// invalid value.
    pub fn from_env_with<F>(get_env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        for key in [ENV_MOUSE, ENV_ALT_SCREEN, ENV_RAW_MODE, ENV_OUTPUT_FILTER, ENV_CURSOR_BLINK_MS] {
            if let Err(err) = config.apply_override(&get_env, key) {
                tracing::warn!(%err, "ignoring environment override");
            }
        }
        config
    }

    /// Like [`from_env_with`](Self::from_env_with), but the first invalid
    /// value is an error.
    pub fn try_from_env_with<F>(get_env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        for key in [ENV_MOUSE, ENV_ALT_SCREEN, ENV_RAW_MODE, ENV_OUTPUT_FILTER, ENV_CURSOR_BLINK_MS] {
            config.apply_override(&get_env, key)?;
        }
        Ok(config)
    }

    fn apply_override<F>(&mut self, get_env: &F, key: &'static str) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let Some(value) = get_env(key) else {
            return Ok(());
        };
        let invalid = || Error::InvalidConfig {
            key: key.to_string(),
            value: value.clone(),
        };

        if key == ENV_CURSOR_BLINK_MS {
            let ms: u64 = value.trim().parse().map_err(|_| invalid())?;
            self.cursor_blink = (ms > 0).then(|| Duration::from_millis(ms));
            return Ok(());
        }

        let flag = parse_bool(&value).ok_or_else(invalid)?;
        match key {
            ENV_MOUSE => self.mouse = flag,
            ENV_ALT_SCREEN => self.alternate_screen = flag,
            ENV_RAW_MODE => self.raw_mode = flag,
            ENV_OUTPUT_FILTER => self.output_filter = flag,
            _ => {}
        }
        Ok(())
    }

    /// Configuration for a headless screen: no terminal modes, no blink.
    pub fn headless() -> Self {
        Self {
            alternate_screen: false,
            mouse: false,
            raw_mode: false,
            cursor_blink: None,
            ..Self::default()
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

// =============================================================================
// Tests
// =============================================================================
