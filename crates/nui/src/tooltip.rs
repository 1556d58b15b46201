//! Per-view tooltip registry.
//!
//! A view can carry one rect-less "default" tooltip covering its whole area
//! plus any number of rect-scoped tooltips. Ids are allocated monotonically
//! and never collide with the default id. When rects overlap, the hover query
//! returns the first entry visited (ascending id); callers must not rely on
//! that order for overlapping regions.

use crate::geometry::{Bounds, Pixels, Point};
use crate::util::post_inc;
use collections::BTreeMap;

/// Identifier of one tooltip entry on a view.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct TooltipId(u32);

impl TooltipId {
    /// The id of the rect-less default tooltip.
    pub const DEFAULT: TooltipId = TooltipId(0);
}

#[derive(Clone, Debug)]
pub(crate) struct TooltipEntry {
    pub text: String,
    /// `None` applies to the whole view.
    pub rect: Option<Bounds<Pixels>>,
}

#[derive(Default)]
pub(crate) struct TooltipRegistry {
    entries: BTreeMap<TooltipId, TooltipEntry>,
    next_id: u32,
}

impl TooltipRegistry {
    /// Installs or replaces the default whole-view tooltip. Any rect-scoped
    /// entries are dropped as well: a plain tooltip supersedes the registry.
    pub fn set_default(&mut self, text: String) {
        self.entries.clear();
        self.entries
            .insert(TooltipId::DEFAULT, TooltipEntry { text, rect: None });
    }

    /// Adds a rect-scoped tooltip, displacing the default entry if present.
    pub fn add_for_rect(&mut self, text: String, rect: Bounds<Pixels>) -> TooltipId {
        self.entries.remove(&TooltipId::DEFAULT);
        let id = TooltipId(post_inc(&mut self.next_id) + 1);
        self.entries.insert(
            id,
            TooltipEntry {
                text,
                rect: Some(rect),
            },
        );
        id
    }

    pub fn ids(&self) -> Vec<TooltipId> {
        self.entries.keys().copied().collect()
    }

    pub fn remove(&mut self, id: TooltipId) -> bool {
        self.entries.remove(&id).is_some()
    }

    pub fn get(&self, id: TooltipId) -> Option<&TooltipEntry> {
        self.entries.get(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Hover query: first entry (ascending id) whose rect contains `position`.
    /// `view_bounds` is the view's own rect in local coordinates, used for the
    /// rect-less default entry.
    pub fn query(&self, position: Point<Pixels>, view_bounds: Bounds<Pixels>) -> Option<&str> {
        for entry in self.entries.values() {
            let rect = entry.rect.unwrap_or(view_bounds);
            if rect.contains(position) {
                return Some(&entry.text);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{bounds, point, px};

    fn view_bounds() -> Bounds<Pixels> {
        bounds(px(0.0), px(0.0), px(100.0), px(100.0))
    }

    #[test]
    fn default_tooltip_is_replaced_not_accumulated() {
        let mut registry = TooltipRegistry::default();
        registry.set_default("A".into());
        registry.set_default("B".into());
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.query(point(px(1.0), px(1.0)), view_bounds()),
            Some("B")
        );
    }

    #[test]
    fn rect_tooltip_displaces_default_and_gets_fresh_id() {
        let mut registry = TooltipRegistry::default();
        registry.set_default("default".into());
        let id1 = registry.add_for_rect("left".into(), bounds(px(0.0), px(0.0), px(50.0), px(100.0)));
        let id2 = registry.add_for_rect("right".into(), bounds(px(50.0), px(0.0), px(50.0), px(100.0)));
        assert_ne!(id1, TooltipId::DEFAULT);
        assert_ne!(id1, id2);
        assert!(registry.get(TooltipId::DEFAULT).is_none());

        assert_eq!(
            registry.query(point(px(10.0), px(10.0)), view_bounds()),
            Some("left")
        );
        assert_eq!(
            registry.query(point(px(60.0), px(10.0)), view_bounds()),
            Some("right")
        );
        assert_eq!(registry.query(point(px(10.0), px(200.0)), view_bounds()), None);
    }

    #[test]
    fn remove_forgets_entry() {
        let mut registry = TooltipRegistry::default();
        let id = registry.add_for_rect("x".into(), view_bounds());
        assert!(registry.remove(id));
        assert!(!registry.remove(id));
        assert!(registry.is_empty());
    }
}
