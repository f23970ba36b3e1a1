//! Focus System - Keyboard navigation and focus state
//!
//! Manages focus state and navigation:
//! - The currently focused component id
//! - Focus cycling (Tab/Shift+Tab) in tab-index order
//! - Focus trapping for modals
//! - Focus history for restoration
//! - Focus hooks (`on_focus`/`on_blur`)
//!
//! The manager owns no components. Every operation takes a [`FocusScope`],
//! the source of candidates: the screen's registry or a component tree.
//!
//! # Example
//!
//! ```ignore
//! let mut focus = FocusManager::new();
//!
//! // Navigate with Tab
//! focus.focus_next(&tree);
//! focus.focus_previous(&tree);
//!
//! // Modal dialog
//! focus.push_focus_trap("dialog");
//! ```

use std::collections::VecDeque;

use crate::component::{ComponentRef, FocusCandidate, with_component};

/// Maximum number of ids kept in focus history.
pub const MAX_HISTORY: usize = 50;

/// Where focus candidates come from.
pub trait FocusScope {
    /// Focusable components in traversal source order.
    ///
    /// With `trap`, only the trap's candidate set. Unknown trap ids yield
    /// an empty set.
    fn focus_candidates(&self, trap: Option<&str>) -> Vec<FocusCandidate>;

    /// Look up a component by id.
    fn component(&self, id: &str) -> Option<ComponentRef>;
}

// =============================================================================
// FocusManager
// =============================================================================

/// Focus state: current holder, trap stack, bounded history.
#[derive(Debug, Default)]
pub struct FocusManager {
    focused: Option<String>,
    traps: Vec<String>,
    history: VecDeque<String>,
}

impl FocusManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id of the focused component (None if nothing is focused).
    pub fn focused_id(&self) -> Option<&str> {
        self.focused.as_deref()
    }

    pub fn has_focus(&self) -> bool {
        self.focused.is_some()
    }

    pub fn is_focused(&self, id: &str) -> bool {
        self.focused.as_deref() == Some(id)
    }

    /// Candidates that traversal may land on, sorted by tab index.
    ///
    /// The sort is stable, so equal tab indices keep source order.
    pub fn ordered(&self, scope: &dyn FocusScope) -> Vec<String> {
        let mut candidates: Vec<FocusCandidate> = scope
            .focus_candidates(self.focus_trap())
            .into_iter()
            .filter(|c| c.info.is_candidate())
            .collect();
        candidates.sort_by_key(|c| c.info.tab_index);
        candidates.into_iter().map(|c| c.id).collect()
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Move focus to the next candidate, wrapping around.
    ///
    /// Returns the newly focused id, or None when there are no candidates.
    pub fn focus_next(&mut self, scope: &dyn FocusScope) -> Option<&str> {
        self.step(scope, true)
    }

    /// Move focus to the previous candidate, wrapping around.
    pub fn focus_previous(&mut self, scope: &dyn FocusScope) -> Option<&str> {
        self.step(scope, false)
    }

    fn step(&mut self, scope: &dyn FocusScope, forward: bool) -> Option<&str> {
        let order = self.ordered(scope);
        if order.is_empty() {
            self.update_focus(scope, None);
            return None;
        }

        let len = order.len();
        let current = self
            .focused
            .as_deref()
            .and_then(|f| order.iter().position(|id| id == f));
        let next = match (current, forward) {
            (None, true) => 0,
            (None, false) => len - 1,
            (Some(pos), true) => (pos + 1) % len,
            (Some(pos), false) => (pos + len - 1) % len,
        };

        self.update_focus(scope, Some(order[next].clone()));
        self.focused_id()
    }

    /// Focus a specific component. Fails for ids outside the candidate set.
    pub fn focus(&mut self, scope: &dyn FocusScope, id: &str) -> bool {
        if !self.ordered(scope).iter().any(|c| c == id) {
            return false;
        }
        self.update_focus(scope, Some(id.to_string()));
        true
    }

    /// Clear focus (no component focused).
    pub fn blur(&mut self, scope: &dyn FocusScope) {
        self.update_focus(scope, None);
    }

    /// Move focus to `next`.
    ///
    /// The previous holder is always blurred before the new one is focused;
    /// a panicking hook is logged and never leaves the state half-updated.
    /// Re-focusing the current holder does nothing.
    pub fn update_focus(&mut self, scope: &dyn FocusScope, next: Option<String>) {
        if self.focused == next {
            return;
        }

        if let Some(prev) = self.focused.take() {
            if let Some(component) = scope.component(&prev) {
                with_component(&component, &prev, "on_blur", |c| c.on_blur());
            }
            tracing::trace!(component = %prev, "blurred");
        }

        self.focused = next;

        if let Some(id) = self.focused.clone() {
            self.history.push_back(id.clone());
            if self.history.len() > MAX_HISTORY {
                self.history.pop_front();
            }
            if let Some(component) = scope.component(&id) {
                with_component(&component, &id, "on_focus", |c| c.on_focus());
            }
            tracing::trace!(component = %id, "focused");
        }
    }

    /// Drop every reference to a component that no longer exists.
    ///
    /// Does not call hooks; callers blur first if the component is alive.
    pub fn forget(&mut self, id: &str) {
        if self.is_focused(id) {
            self.focused = None;
        }
        self.traps.retain(|t| t != id);
    }

    // =========================================================================
    // Focus trap (for modals/dialogs)
    // =========================================================================

    /// Push a focus trap. Traversal stays inside it until popped.
    pub fn push_focus_trap(&mut self, id: impl Into<String>) {
        self.traps.push(id.into());
    }

    /// Pop the innermost focus trap.
    pub fn pop_focus_trap(&mut self) -> Option<String> {
        self.traps.pop()
    }

    pub fn is_focus_trapped(&self) -> bool {
        !self.traps.is_empty()
    }

    /// The innermost trap.
    pub fn focus_trap(&self) -> Option<&str> {
        self.traps.last().map(String::as_str)
    }

    // =========================================================================
    // History
    // =========================================================================

    /// Focused ids, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &str> {
        self.history.iter().map(String::as_str)
    }

    /// Refocus the component focused before the current one.
    ///
    /// Uses the second-to-last history entry. Fails if it no longer exists
    /// or is no longer a candidate.
    pub fn restore_previous_focus(&mut self, scope: &dyn FocusScope) -> bool {
        let Some(previous) = self.history.len().checked_sub(2).and_then(|i| self.history.get(i)).cloned() else {
            return false;
        };
        if scope.component(&previous).is_none() {
            return false;
        }
        self.focus(scope, &previous)
    }

    /// Reset all focus state without calling hooks.
    pub fn reset(&mut self) {
        self.focused = None;
        self.traps.clear();
        self.history.clear();
    }
}

// =============================================================================
// TESTS
// =============================================================================
