//! Registered components.
//!
//! The registry is the screen's flat list of `{id, component, region}`
//! entries in registration order. Registration order is paint order, so
//! later entries sit on top for hit-testing.

use crate::component::{ComponentRef, FocusCandidate, focus_info_of};
use crate::error::{Error, Result};
use crate::state::focus::FocusScope;
use crate::types::Region;

/// One registered component.
pub struct RegistryEntry {
    pub id: String,
    pub component: ComponentRef,
    pub region: Region,
}

impl RegistryEntry {
    /// Whether the component currently reports itself focusable.
    pub fn is_focusable(&self) -> bool {
        focus_info_of(&self.component).is_some_and(|info| info.focusable)
    }
}

impl std::fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryEntry")
            .field("id", &self.id)
            .field("region", &self.region)
            .finish_non_exhaustive()
    }
}

/// Registered components in paint order.
#[derive(Debug, Default)]
pub struct Registry {
    entries: Vec<RegistryEntry>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[RegistryEntry] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&RegistryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn slot(&self, slot: usize) -> Option<&RegistryEntry> {
        self.entries.get(slot)
    }

    /// Add an entry. Duplicate ids are rejected and the existing entry is
    /// left untouched.
    pub fn insert(&mut self, id: &str, component: ComponentRef, region: Region) -> Result<&RegistryEntry> {
        if self.get(id).is_some() {
            return Err(Error::DuplicateComponent(id.to_string()));
        }
        self.entries.push(RegistryEntry {
            id: id.to_string(),
            component,
            region,
        });
        let last = self.entries.len() - 1;
        Ok(&self.entries[last])
    }

    pub fn remove(&mut self, id: &str) -> Option<RegistryEntry> {
        let pos = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(pos))
    }

    /// Move an entry. Returns false for unknown ids.
    pub fn set_region(&mut self, id: &str, region: Region) -> bool {
        match self.entries.iter_mut().find(|e| e.id == id) {
            Some(entry) => {
                entry.region = region;
                true
            }
            None => false,
        }
    }

    pub fn regions(&self) -> impl Iterator<Item = &Region> {
        self.entries.iter().map(|e| &e.region)
    }
}

impl FocusScope for Registry {
    /// With a trap, candidates are the entries whose region lies inside the
    /// trap entry's region (the trap entry included).
    fn focus_candidates(&self, trap: Option<&str>) -> Vec<FocusCandidate> {
        let bounds = match trap {
            Some(id) => match self.get(id) {
                Some(entry) => Some(entry.region),
                None => return Vec::new(),
            },
            None => None,
        };

        self.entries
            .iter()
            .filter(|e| bounds.is_none_or(|b| b.contains_region(&e.region)))
            .filter_map(|e| {
                let info = focus_info_of(&e.component)?;
                info.focusable.then(|| FocusCandidate { id: e.id.clone(), info })
            })
            .collect()
    }

    fn component(&self, id: &str) -> Option<ComponentRef> {
        self.get(id).map(|e| e.component.clone())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{FocusInfo, RenderContext, Renderable};
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Stub(FocusInfo);

    impl Renderable for Stub {
        fn render(&mut self, _ctx: &mut RenderContext<'_>) {}

        fn focus_info(&self) -> FocusInfo {
            self.0
        }
    }

    fn stub(info: FocusInfo) -> ComponentRef {
        Rc::new(RefCell::new(Stub(info)))
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut registry = Registry::new();
        registry.insert("a", stub(FocusInfo::default()), Region::new(0, 0, 1, 1)).unwrap();
        let err = registry.insert("a", stub(FocusInfo::focusable()), Region::new(5, 5, 1, 1));
        assert!(matches!(err, Err(Error::DuplicateComponent(ref id)) if id == "a"));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("a").unwrap().region, Region::new(0, 0, 1, 1));
        assert!(!registry.get("a").unwrap().is_focusable());
    }

    #[test]
    fn test_set_region_and_remove() {
        let mut registry = Registry::new();
        registry.insert("a", stub(FocusInfo::default()), Region::default()).unwrap();
        assert!(registry.set_region("a", Region::new(1, 1, 2, 2)));
        assert!(!registry.set_region("zzz", Region::default()));
        assert!(registry.remove("a").is_some());
        assert!(registry.remove("a").is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_trap_uses_region_containment() {
        let mut registry = Registry::new();
        registry.insert("page", stub(FocusInfo::focusable()), Region::new(0, 0, 80, 24)).unwrap();
        registry.insert("dialog", stub(FocusInfo::default()), Region::new(10, 5, 30, 10)).unwrap();
        registry.insert("ok", stub(FocusInfo::focusable()), Region::new(12, 12, 6, 1)).unwrap();
        registry.insert("outside", stub(FocusInfo::focusable()), Region::new(50, 1, 6, 1)).unwrap();

        let ids = |c: Vec<FocusCandidate>| c.into_iter().map(|c| c.id).collect::<Vec<_>>();
        assert_eq!(ids(registry.focus_candidates(None)), vec!["page", "ok", "outside"]);
        assert_eq!(ids(registry.focus_candidates(Some("dialog"))), vec!["ok"]);
        assert!(registry.focus_candidates(Some("missing")).is_empty());
    }
}
