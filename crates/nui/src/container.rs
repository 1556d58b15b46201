//! Child-bearing views and the layout pass that positions their subtrees.
//!
//! A [`Container`] is a [`View`] plus an ordered child list. Child order is
//! mirrored one-to-one into the layout tree, so flexbox order always matches
//! insertion order. Every structural change re-lays out the affected
//! container's subtree in a single pass.

use crate::app::App;
use crate::view::View;
use derive_more::Deref;
use std::rc::Rc;

/// A view that hosts an ordered list of child views.
#[derive(Clone, Deref)]
pub struct Container {
    view: View,
}

impl PartialEq for Container {
    fn eq(&self, other: &Self) -> bool {
        self.view == other.view
    }
}

impl Eq for Container {}

impl Container {
    pub fn new(app: &App) -> Self {
        Container {
            view: View::construct(app, true),
        }
    }

    /// The container handle for a view known to be a container.
    pub fn from_view(view: View) -> Option<Container> {
        view.is_container().then_some(Container { view })
    }

    pub fn as_view(&self) -> &View {
        &self.view
    }

    /// Appends a child. A child already in another container is moved here;
    /// adding a view to itself or to one of its own descendants is rejected.
    pub fn add_child_view(&self, child: &View) {
        let index = self.child_count();
        self.add_child_view_at(child, index);
    }

    /// Inserts a child at `index` (clamped to the child count). Same rules as
    /// [`Container::add_child_view`].
    pub fn add_child_view_at(&self, child: &View, index: usize) {
        if *child == self.view || is_ancestor_of(child, &self.view) {
            log::warn!("rejecting child insertion that would create a cycle");
            return;
        }
        if child.parent().is_some() {
            detach(child);
        }
        let index = {
            let mut children = self.view.state().children.borrow_mut();
            let index = index.min(children.len());
            children.insert(index, child.clone());
            index
        };
        *child.state().parent.borrow_mut() = Some(Rc::downgrade(self.view.state_rc()));
        self.view
            .state()
            .app
            .layout
            .borrow_mut()
            .insert_child(self.view.layout_id(), index, child.layout_id());
        layout_subtree(&self.view);
    }

    /// Removes a child, leaving it parentless. Returns false when `child` is
    /// not in this container.
    pub fn remove_child_view(&self, child: &View) -> bool {
        let is_ours = child
            .parent()
            .is_some_and(|parent| parent == self.view);
        if !is_ours {
            return false;
        }
        detach(child);
        true
    }

    /// Removes and returns the child at `index`, if any.
    pub fn remove_child_view_at(&self, index: usize) -> Option<View> {
        let child = self.child_at(index)?;
        detach(&child);
        Some(child)
    }

    pub fn child_count(&self) -> usize {
        self.view.state().children.borrow().len()
    }

    pub fn child_at(&self, index: usize) -> Option<View> {
        self.view.state().children.borrow().get(index).cloned()
    }

    pub fn children(&self) -> Vec<View> {
        self.view.state().children.borrow().clone()
    }
}

fn is_ancestor_of(candidate: &View, view: &View) -> bool {
    let mut current = view.parent();
    while let Some(ancestor) = current {
        if ancestor == *candidate {
            return true;
        }
        current = ancestor.parent();
    }
    false
}

/// Unlinks `child` from its parent, in both the child list and the layout
/// tree, then re-lays out the parent it left.
fn detach(child: &View) {
    let Some(parent) = child.parent() else {
        return;
    };
    {
        let mut siblings = parent.state().children.borrow_mut();
        siblings.retain(|sibling| sibling != child);
    }
    parent
        .state()
        .app
        .layout
        .borrow_mut()
        .remove_child(parent.layout_id(), child.layout_id());
    *child.state().parent.borrow_mut() = None;
    layout_subtree(&parent);
}

/// Computes flexbox layout for the subtree rooted at `view`, constrained to
/// the view's current on-screen size, and pushes the results into each
/// descendant's bounds. Resize notifications produced while applying results
/// never start a nested pass.
pub(crate) fn layout_subtree(view: &View) {
    let app = &view.state().app;
    if app.in_layout.get() {
        return;
    }
    app.in_layout.set(true);
    let scale = app.platform.scale_factor();
    let available = view.pixel_bounds().size.to_logical(scale);
    app.layout.borrow_mut().compute(view.layout_id(), available);
    apply_computed(view, scale, true);
    app.in_layout.set(false);
}

fn apply_computed(view: &View, scale: f32, is_root: bool) {
    // The root keeps its on-screen rectangle; only descendants move.
    if !is_root {
        let computed = view
            .state()
            .app
            .layout
            .borrow()
            .bounds(view.layout_id());
        view.set_pixel_bounds(computed.to_device(scale));
    }
    let children: Vec<View> = view.state().children.borrow().clone();
    for child in &children {
        apply_computed(child, scale, false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{bounds, px, size};

    #[test]
    fn children_keep_insertion_order() {
        let (app, _platform) = App::headless();
        let parent = Container::new(&app);
        let a = View::new(&app);
        let b = View::new(&app);
        let c = View::new(&app);
        parent.add_child_view(&a);
        parent.add_child_view(&c);
        parent.add_child_view_at(&b, 1);

        assert_eq!(parent.children(), vec![a.clone(), b.clone(), c.clone()]);
        assert_eq!(parent.child_at(0), Some(a));
        assert_eq!(parent.child_count(), 3);
    }

    #[test]
    fn adding_to_a_new_parent_reparents() {
        let (app, _platform) = App::headless();
        let first = Container::new(&app);
        let second = Container::new(&app);
        let child = View::new(&app);

        first.add_child_view(&child);
        second.add_child_view(&child);

        assert_eq!(first.child_count(), 0);
        assert_eq!(second.child_count(), 1);
        assert_eq!(child.parent(), Some(second.as_view().clone()));
    }

    #[test]
    fn self_and_ancestor_insertion_is_rejected() {
        let (app, _platform) = App::headless();
        let outer = Container::new(&app);
        let inner = Container::new(&app);
        outer.add_child_view(inner.as_view());

        inner.add_child_view(inner.as_view());
        assert_eq!(inner.child_count(), 0);

        inner.add_child_view(outer.as_view());
        assert_eq!(inner.child_count(), 0);
        assert!(outer.as_view().parent().is_none());
    }

    #[test]
    fn remove_child_view_unlinks() {
        let (app, _platform) = App::headless();
        let parent = Container::new(&app);
        let child = View::new(&app);
        parent.add_child_view(&child);

        assert!(parent.remove_child_view(&child));
        assert_eq!(parent.child_count(), 0);
        assert!(child.parent().is_none());
        assert!(!parent.remove_child_view(&child));
    }

    #[test]
    fn layout_positions_children() {
        let (app, _platform) = App::headless();
        let parent = Container::new(&app);
        parent.set_style_property("flex-direction", "row");
        let a = View::new(&app);
        let b = View::new(&app);
        a.set_style_property("flex-grow", 1.0);
        b.set_style_property("flex-grow", 1.0);
        parent.add_child_view(&a);
        parent.add_child_view(&b);

        parent.set_bounds(bounds(px(0.0), px(0.0), px(100.0), px(40.0)));

        assert_eq!(a.bounds(), bounds(px(0.0), px(0.0), px(50.0), px(40.0)));
        assert_eq!(b.bounds(), bounds(px(50.0), px(0.0), px(50.0), px(40.0)));
    }

    #[test]
    fn hiding_a_child_reflows_siblings() {
        let (app, _platform) = App::headless();
        let parent = Container::new(&app);
        parent.set_style_property("flex-direction", "row");
        let a = View::new(&app);
        let b = View::new(&app);
        a.set_style_property("flex-grow", 1.0);
        b.set_style_property("flex-grow", 1.0);
        parent.add_child_view(&a);
        parent.add_child_view(&b);
        parent.set_bounds(bounds(px(0.0), px(0.0), px(100.0), px(40.0)));

        a.set_visible(false);
        assert_eq!(b.bounds().size, size(px(100.0), px(40.0)));
        assert_eq!(b.bounds().origin.x, px(0.0));

        a.set_visible(true);
        assert_eq!(b.bounds().size, size(px(50.0), px(40.0)));
    }
}
