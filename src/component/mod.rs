//! Component Render Contract.
//!
//! Every UI node implements [`Renderable`]. Optional capabilities are
//! separate traits that a component exposes through the `as_*` accessors:
//!
//! - [`Interactive`] - receives keystrokes while focused
//! - [`MouseAware`] - receives mouse events in region-relative coordinates
//! - [`CursorProvider`] - places the real terminal cursor while focused
//!
//! A render pass hands each component a [`RenderContext`]: the target
//! buffer, an absolute [`Region`], and the ambient focus/hover flags. All
//! drawing goes through the context and is clipped to the region.
//!
//! Hooks never take the engine down. A panic inside `render`, `on_focus`
//! or `on_blur` is caught at the call site, logged, and swallowed.
//!
//! # Example
//!
//! ```ignore
//! struct Label(String);
//!
//! impl Renderable for Label {
//!     fn render(&mut self, ctx: &mut RenderContext<'_>) {
//!         ctx.write(&self.0, 0, 0, None);
//!     }
//! }
//! ```

pub mod tree;

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use crate::input::{KeyEvent, MouseEvent};
use crate::renderer::ScreenBuffer;
use crate::types::{BorderKind, CursorPos, Region, Style};

pub use tree::Node;

/// Shared handle to a component.
pub type ComponentRef = Rc<RefCell<dyn Renderable>>;

// =============================================================================
// Capability traits
// =============================================================================

/// Base contract: everything on screen can render.
pub trait Renderable {
    /// Paint into the context's region.
    fn render(&mut self, ctx: &mut RenderContext<'_>);

    /// Focusability of this component. Not focusable by default.
    fn focus_info(&self) -> FocusInfo {
        FocusInfo::default()
    }

    /// Called when this component gains focus.
    fn on_focus(&mut self) {}

    /// Called when this component loses focus.
    fn on_blur(&mut self) {}

    fn as_interactive(&mut self) -> Option<&mut dyn Interactive> {
        None
    }

    fn as_mouse_aware(&mut self) -> Option<&mut dyn MouseAware> {
        None
    }

    fn as_cursor_provider(&self) -> Option<&dyn CursorProvider> {
        None
    }
}

/// Keyboard capability.
pub trait Interactive {
    /// Handle a key. Returning true stops propagation and re-renders.
    fn handle_input(&mut self, key: &KeyEvent) -> bool;
}

/// Mouse capability.
pub trait MouseAware {
    /// Handle a mouse event whose coordinates are relative to the
    /// component's region. Returning true re-renders.
    fn handle_mouse(&mut self, event: &MouseEvent) -> bool;
}

/// Cursor capability.
pub trait CursorProvider {
    /// Cursor position relative to the component's region, or `None` to
    /// keep the terminal cursor hidden.
    fn cursor_position(&self) -> Option<CursorPos>;
}

// =============================================================================
// Focus info
// =============================================================================

/// What the Focus Engine needs to know about a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusInfo {
    pub focusable: bool,
    pub disabled: bool,
    pub visible: bool,
    /// Ascending traversal order. `-1` removes the component from traversal.
    pub tab_index: i32,
}

impl Default for FocusInfo {
    fn default() -> Self {
        Self {
            focusable: false,
            disabled: false,
            visible: true,
            tab_index: 0,
        }
    }
}

impl FocusInfo {
    /// A focusable component with the default tab index.
    pub const fn focusable() -> Self {
        Self {
            focusable: true,
            disabled: false,
            visible: true,
            tab_index: 0,
        }
    }

    pub const fn with_tab_index(mut self, tab_index: i32) -> Self {
        self.tab_index = tab_index;
        self
    }

    pub const fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub const fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// True when traversal may land on this component.
    pub fn is_candidate(&self) -> bool {
        self.focusable && !self.disabled && self.visible && self.tab_index != -1
    }
}

/// A focusable component as seen by the Focus Engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusCandidate {
    pub id: String,
    pub info: FocusInfo,
}

// =============================================================================
// Render trigger
// =============================================================================

#[derive(Debug, Default)]
struct GateState {
    in_flight: Cell<bool>,
    pending: Cell<bool>,
}

/// Cloneable handle for requesting a render.
///
/// A request made while a render pass is in flight is dropped. Otherwise
/// the request stays pending until the engine honors it.
#[derive(Debug, Clone, Default)]
pub struct RenderTrigger {
    state: Rc<GateState>,
}

impl RenderTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a render. Returns false if the request was dropped.
    pub fn request(&self) -> bool {
        if self.state.in_flight.get() {
            tracing::trace!("render requested during render; dropped");
            return false;
        }
        self.state.pending.set(true);
        true
    }

    pub fn is_pending(&self) -> bool {
        self.state.pending.get()
    }

    pub fn is_rendering(&self) -> bool {
        self.state.in_flight.get()
    }

    /// Clear and return the pending flag.
    pub fn take_pending(&self) -> bool {
        self.state.pending.replace(false)
    }

    /// Start a render pass. `None` if one is already in flight.
    pub(crate) fn begin(&self) -> Option<RenderPass> {
        if self.state.in_flight.replace(true) {
            return None;
        }
        self.state.pending.set(false);
        Some(RenderPass {
            state: self.state.clone(),
        })
    }
}

/// Marks a render pass in flight until dropped.
#[derive(Debug)]
pub(crate) struct RenderPass {
    state: Rc<GateState>,
}

impl Drop for RenderPass {
    fn drop(&mut self) {
        self.state.in_flight.set(false);
    }
}

// =============================================================================
// Render context
// =============================================================================

/// Everything a component gets for one render call.
pub struct RenderContext<'a> {
    buffer: &'a mut ScreenBuffer,
    region: Region,
    focused_id: Option<&'a str>,
    hovered_id: Option<&'a str>,
    focused: bool,
    hovered: bool,
    trigger: &'a RenderTrigger,
}

impl<'a> RenderContext<'a> {
    /// Context for the component `id` drawing into `region`.
    pub fn new(
        buffer: &'a mut ScreenBuffer,
        region: Region,
        id: &str,
        focused_id: Option<&'a str>,
        hovered_id: Option<&'a str>,
        trigger: &'a RenderTrigger,
    ) -> Self {
        Self {
            buffer,
            region,
            focused_id,
            hovered_id,
            focused: focused_id == Some(id),
            hovered: hovered_id == Some(id),
            trigger,
        }
    }

    /// Absolute region of this component.
    #[inline]
    pub fn region(&self) -> Region {
        self.region
    }

    #[inline]
    pub fn width(&self) -> u16 {
        self.region.width
    }

    #[inline]
    pub fn height(&self) -> u16 {
        self.region.height
    }

    #[inline]
    pub fn is_focused(&self) -> bool {
        self.focused
    }

    #[inline]
    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    /// Id of whichever component holds focus.
    pub fn focused_id(&self) -> Option<&str> {
        self.focused_id
    }

    /// Request another render after this pass. Dropped while rendering.
    pub fn request_render(&self) -> bool {
        self.trigger.request()
    }

    /// Write text at `(x, y)` relative to the region, clipped to it.
    pub fn write(&mut self, text: &str, x: i32, y: i32, style: Option<Style>) {
        if x < 0 || y < 0 || y >= i32::from(self.region.height) {
            return;
        }
        let abs_x = i32::from(self.region.x) + x;
        let abs_y = i32::from(self.region.y) + y;
        self.buffer.write_clipped(text, abs_x, abs_y, style, &self.region);
    }

    /// Fill the whole region.
    pub fn fill(&mut self, ch: char, style: Option<Style>) {
        self.buffer.fill_region(&self.region, ch, style);
    }

    /// Fill `bounds` (relative to the region).
    pub fn fill_rect(&mut self, bounds: Region, ch: char, style: Option<Style>) {
        let area = self.region.child(bounds);
        self.buffer.fill_region(&area, ch, style);
    }

    /// Outline the whole region.
    pub fn draw_border(&mut self, kind: BorderKind, style: Option<Style>) {
        self.buffer.draw_box_clipped(&self.region, kind, style, &self.region);
    }

    /// Outline `bounds` (relative to the region), clipped to the region.
    pub fn draw_box(&mut self, bounds: Region, kind: BorderKind, style: Option<Style>) {
        let origin = Region::new(
            self.region.x.saturating_add(bounds.x),
            self.region.y.saturating_add(bounds.y),
            bounds.width,
            bounds.height,
        );
        self.buffer.draw_box_clipped(&origin, kind, style, &self.region);
    }

    /// Read back a cell in region-relative coordinates.
    pub fn cell(&self, x: u16, y: u16) -> Option<&crate::types::Cell> {
        let (abs_x, abs_y) = (self.region.x.checked_add(x)?, self.region.y.checked_add(y)?);
        if !self.region.contains(abs_x, abs_y) {
            return None;
        }
        self.buffer.get(abs_x, abs_y)
    }

    /// Context for a child `id` at `bounds` relative to this region.
    ///
    /// The child region is translated and clamped inside this one.
    pub fn child(&mut self, bounds: Region, id: &str) -> RenderContext<'_> {
        let region = self.region.child(bounds);
        RenderContext {
            buffer: &mut *self.buffer,
            region,
            focused_id: self.focused_id,
            hovered_id: self.hovered_id,
            focused: self.focused_id == Some(id),
            hovered: self.hovered_id == Some(id),
            trigger: self.trigger,
        }
    }
}

// =============================================================================
// Hook containment
// =============================================================================

thread_local! {
    static CONTAINING: Cell<u32> = const { Cell::new(0) };
}

/// True while a component hook runs under [`contain`].
///
/// The terminal panic hook uses this to leave contained panics alone.
pub(crate) fn is_containing() -> bool {
    CONTAINING.with(|c| c.get() > 0)
}

/// Run a component hook, swallowing any panic.
pub(crate) fn contain<T>(id: &str, hook: &'static str, f: impl FnOnce() -> T) -> Option<T> {
    CONTAINING.with(|c| c.set(c.get() + 1));
    let result = panic::catch_unwind(AssertUnwindSafe(f));
    CONTAINING.with(|c| c.set(c.get() - 1));

    match result {
        Ok(value) => Some(value),
        Err(payload) => {
            tracing::warn!(
                component = id,
                hook,
                panic = panic_message(&*payload),
                "component hook panicked"
            );
            None
        }
    }
}

/// Run `f` on a mutably borrowed component, contained.
///
/// A component that is already borrowed (a hook reaching back into
/// itself) is skipped.
pub(crate) fn with_component<T>(
    component: &ComponentRef,
    id: &str,
    hook: &'static str,
    f: impl FnOnce(&mut dyn Renderable) -> T,
) -> Option<T> {
    let Ok(mut guard) = component.try_borrow_mut() else {
        tracing::debug!(component = id, hook, "component busy; hook skipped");
        return None;
    };
    contain(id, hook, || f(&mut *guard))
}

/// Read focus info without panicking on a busy component.
pub(crate) fn focus_info_of(component: &ComponentRef) -> Option<FocusInfo> {
    component.try_borrow().ok().map(|c| c.focus_info())
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_focus_info_candidate_rules() {
        assert!(!FocusInfo::default().is_candidate());
        assert!(FocusInfo::focusable().is_candidate());
        assert!(!FocusInfo::focusable().with_disabled(true).is_candidate());
        assert!(!FocusInfo::focusable().with_visible(false).is_candidate());
        assert!(!FocusInfo::focusable().with_tab_index(-1).is_candidate());
        assert!(FocusInfo::focusable().with_tab_index(5).is_candidate());
    }

    #[test]
    fn test_trigger_drops_requests_during_render() {
        let trigger = RenderTrigger::new();
        assert!(trigger.request());
        assert!(trigger.is_pending());

        let pass = trigger.begin().unwrap();
        // Starting a pass consumes the pending request
        assert!(!trigger.is_pending());
        assert!(trigger.begin().is_none());
        assert!(!trigger.request());
        assert!(!trigger.is_pending());
        drop(pass);

        assert!(!trigger.is_rendering());
        assert!(trigger.request());
        assert!(trigger.take_pending());
        assert!(!trigger.is_pending());
    }

    #[test]
    fn test_context_clips_to_region() {
        let mut buf = ScreenBuffer::new(10, 3);
        let trigger = RenderTrigger::new();
        {
            let mut ctx = RenderContext::new(&mut buf, Region::new(2, 1, 4, 1), "a", Some("a"), None, &trigger);
            assert!(ctx.is_focused());
            assert!(!ctx.is_hovered());
            ctx.write("abcdefgh", 1, 0, None);
            ctx.write("zz", 0, 1, None);
            ctx.write("zz", -1, 0, None);
        }
        assert_eq!(buf.row_text(0), "          ");
        assert_eq!(buf.row_text(1), "   abc    ");
        assert_eq!(buf.row_text(2), "          ");
    }

    #[test]
    fn test_child_context_nests_regions() {
        let mut buf = ScreenBuffer::new(8, 4);
        let trigger = RenderTrigger::new();
        let mut ctx = RenderContext::new(&mut buf, Region::new(1, 1, 6, 3), "root", Some("leaf"), None, &trigger);
        assert!(!ctx.is_focused());
        let mut child = ctx.child(Region::new(4, 1, 10, 10), "leaf");
        assert!(child.is_focused());
        assert_eq!(child.region(), Region::new(5, 2, 2, 2));
        child.fill('#', None);
        drop(ctx);
        assert_eq!(buf.row_text(2), "     ## ");
        assert_eq!(buf.row_text(3), "     ## ");
    }

    #[test]
    fn test_context_draw_box_and_read_back() {
        let mut buf = ScreenBuffer::new(6, 4);
        let trigger = RenderTrigger::new();
        let mut ctx = RenderContext::new(&mut buf, Region::new(1, 0, 4, 3), "a", None, None, &trigger);
        ctx.draw_border(BorderKind::Ascii, None);
        assert_eq!(ctx.cell(0, 0).map(|c| c.ch), Some('+'));
        assert_eq!(ctx.cell(1, 1).map(|c| c.ch), Some(' '));
        assert_eq!(ctx.cell(4, 0), None);
        drop(ctx);
        assert_eq!(buf.row_text(0), " +--+ ");
        assert_eq!(buf.row_text(1), " |  | ");
        assert_eq!(buf.row_text(2), " +--+ ");
    }

    #[test]
    fn test_contain_swallows_panics() {
        assert_eq!(contain("x", "render", || 7), Some(7));
        let caught: Option<()> = contain("x", "render", || panic!("boom"));
        assert_eq!(caught, None);
        assert!(!is_containing());
    }
}
