//! The base view: a cheap clonable handle over one native widget plus its
//! layout node.
//!
//! Public geometry is in logical [`Pixels`]; the backend holds the
//! authoritative rectangle in device pixels and conversions happen on demand,
//! so repeated assignments of the same rectangle never produce a second
//! native call. Views are compared by identity: two handles are equal when
//! they refer to the same widget.

use crate::app::{App, AppState};
use crate::color::Color;
use crate::container::layout_subtree;
use crate::drag_and_drop::{
    DataType, DragLeaveEvent, DragOperation, DraggingInfo, DropPayload, DropSession, SourceSession,
};
use crate::geometry::{Bounds, DevicePixels, Pixels, Point, bounds, point, px};
use crate::layout::{LayoutId, StyleValue, normalize_style_name};
use crate::platform::{ColorTarget, NativeHandle, PlatformBackend};
use crate::resources::{Cursor, Font};
use crate::responder::Responder;
use crate::subscription::{Signal, Subscription};
use crate::tooltip::{TooltipId, TooltipRegistry};
use collections::BTreeSet;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::str::FromStr;

/// How one style property landed: in the layout tree, straight at the
/// backend, or not at all.
#[derive(Clone, Copy, PartialEq)]
enum StyleApplication {
    Layout,
    Paint,
    Rejected,
}

type DragNegotiationHandler =
    Box<dyn Fn(&View, &dyn DraggingInfo, Point<Pixels>) -> DragOperation>;
type DropHandler = Box<dyn Fn(&View, &DropPayload, Point<Pixels>) -> bool>;

pub(crate) struct ViewState {
    pub(crate) app: Rc<AppState>,
    handle: NativeHandle,
    layout_id: LayoutId,
    is_container: bool,
    pub(crate) parent: RefCell<Option<Weak<ViewState>>>,
    pub(crate) children: RefCell<Vec<View>>,
    cursor: RefCell<Option<Rc<Cursor>>>,
    font: RefCell<Option<Rc<Font>>>,
    responder: Responder,
    on_size_changed: Signal<View>,
    tooltips: RefCell<TooltipRegistry>,

    pub(crate) accepted_types: RefCell<BTreeSet<DataType>>,
    pub(crate) drag_enter_handler: RefCell<Option<DragNegotiationHandler>>,
    pub(crate) drag_update_handler: RefCell<Option<DragNegotiationHandler>>,
    pub(crate) drop_handler: RefCell<Option<DropHandler>>,
    pub(crate) on_drag_leave: Signal<DragLeaveEvent>,
    pub(crate) drop_session: RefCell<Option<DropSession>>,
    pub(crate) drag_session: RefCell<Option<SourceSession>>,
}

impl Drop for ViewState {
    fn drop(&mut self) {
        // A source drag borrows the view for the whole blocking gesture and
        // clears its session before returning, so no session can be live
        // here.
        debug_assert!(self.drag_session.borrow().is_none());
        self.app.platform.destroy_view(self.handle);
        self.app.layout.borrow_mut().remove(self.layout_id);
    }
}

/// Handle to one view in the tree.
#[derive(Clone)]
pub struct View {
    state: Rc<ViewState>,
}

impl PartialEq for View {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }
}

impl Eq for View {}

impl std::fmt::Debug for View {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("View")
            .field("handle", &self.state.handle)
            .finish_non_exhaustive()
    }
}

impl View {
    /// Creates a plain, childless view.
    pub fn new(app: &App) -> Self {
        Self::construct(app, false)
    }

    pub(crate) fn construct(app: &App, is_container: bool) -> Self {
        let app = app.state().clone();
        let handle = app.platform.create_view(is_container);
        let layout_id = app.layout.borrow_mut().new_node();
        View {
            state: Rc::new(ViewState {
                app,
                handle,
                layout_id,
                is_container,
                parent: RefCell::new(None),
                children: RefCell::new(Vec::new()),
                cursor: RefCell::new(None),
                font: RefCell::new(None),
                responder: Responder::default(),
                on_size_changed: Signal::new(),
                tooltips: RefCell::new(TooltipRegistry::default()),
                accepted_types: RefCell::new(BTreeSet::new()),
                drag_enter_handler: RefCell::new(None),
                drag_update_handler: RefCell::new(None),
                drop_handler: RefCell::new(None),
                on_drag_leave: Signal::new(),
                drop_session: RefCell::new(None),
                drag_session: RefCell::new(None),
            }),
        }
    }

    pub(crate) fn state(&self) -> &ViewState {
        &self.state
    }

    pub(crate) fn state_rc(&self) -> &Rc<ViewState> {
        &self.state
    }

    pub(crate) fn from_state(state: Rc<ViewState>) -> Self {
        View { state }
    }

    pub(crate) fn platform(&self) -> &dyn PlatformBackend {
        &*self.state.app.platform
    }

    pub(crate) fn layout_id(&self) -> LayoutId {
        self.state.layout_id
    }

    /// The backend's identifier for this view's native widget.
    pub fn native_handle(&self) -> NativeHandle {
        self.state.handle
    }

    pub fn is_container(&self) -> bool {
        self.state.is_container
    }

    pub fn parent(&self) -> Option<View> {
        self.state
            .parent
            .borrow()
            .as_ref()
            .and_then(Weak::upgrade)
            .map(View::from_state)
    }

    // --- geometry ---------------------------------------------------------

    /// Moves and resizes the view, in logical pixels relative to its parent.
    pub fn set_bounds(&self, bounds: Bounds<Pixels>) {
        let scale = self.platform().scale_factor();
        self.set_pixel_bounds(bounds.to_device(scale));
    }

    /// Device-pixel variant of [`View::set_bounds`]. The backend is the
    /// source of truth for the current rectangle; assigning it unchanged is
    /// a no-op that issues no native call.
    pub fn set_pixel_bounds(&self, bounds: Bounds<DevicePixels>) {
        let old = self.platform().pixel_bounds(self.state.handle);
        if old == bounds {
            return;
        }
        self.platform().set_pixel_bounds(self.state.handle, bounds);
        if old.size != bounds.size {
            self.state.on_size_changed.emit(self);
            if self.state.is_container && !self.state.app.in_layout.get() {
                layout_subtree(self);
            }
        }
    }

    /// The view's rectangle relative to its parent, in logical pixels.
    /// Derived from the device-pixel rectangle, so round-tripping through
    /// [`View::set_bounds`] is stable after the first conversion.
    pub fn bounds(&self) -> Bounds<Pixels> {
        let scale = self.platform().scale_factor();
        self.pixel_bounds().to_logical(scale)
    }

    pub fn pixel_bounds(&self) -> Bounds<DevicePixels> {
        self.platform().pixel_bounds(self.state.handle)
    }

    /// Observer for size changes, whether caused by direct assignment or by
    /// a layout pass.
    pub fn on_size_changed(&self, observer: impl Fn(&View) + 'static) -> Subscription {
        self.state.on_size_changed.subscribe(observer)
    }

    /// This view's origin in the coordinate space of `ancestor`. Returns
    /// `None` when `ancestor` is not on this view's parent chain.
    pub fn offset_from_view(&self, ancestor: &View) -> Option<Point<Pixels>> {
        let mut offset = point(px(0.0), px(0.0));
        let mut current = self.clone();
        loop {
            if current == *ancestor {
                return Some(offset);
            }
            offset = offset + current.bounds().origin;
            current = current.parent()?;
        }
    }

    /// This view's origin in the coordinate space of its root ancestor.
    pub fn offset_from_root(&self) -> Point<Pixels> {
        let mut offset = point(px(0.0), px(0.0));
        let mut current = self.clone();
        while let Some(parent) = current.parent() {
            offset = offset + current.bounds().origin;
            current = parent;
        }
        offset
    }

    fn root(&self) -> View {
        let mut current = self.clone();
        while let Some(parent) = current.parent() {
            current = parent;
        }
        current
    }

    // --- visibility and state --------------------------------------------

    /// Shows or hides the view. Hiding removes it from its parent's layout
    /// flow; both directions re-lay out the tree it belongs to. Assigning the
    /// current value is a no-op.
    pub fn set_visible(&self, visible: bool) {
        if self.platform().is_visible(self.state.handle) == visible {
            return;
        }
        self.platform().set_visible(self.state.handle, visible);
        self.state
            .app
            .layout
            .borrow_mut()
            .set_display(self.state.layout_id, visible);
        layout_subtree(&self.root());
    }

    pub fn is_visible(&self) -> bool {
        self.platform().is_visible(self.state.handle)
    }

    /// Whether this view and every ancestor are visible.
    pub fn is_visible_in_hierarchy(&self) -> bool {
        let mut current = Some(self.clone());
        while let Some(view) = current {
            if !view.is_visible() {
                return false;
            }
            current = view.parent();
        }
        true
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.platform().set_enabled(self.state.handle, enabled);
    }

    pub fn is_enabled(&self) -> bool {
        self.platform().is_enabled(self.state.handle)
    }

    pub fn focus(&self) {
        self.platform().focus(self.state.handle);
    }

    pub fn has_focus(&self) -> bool {
        self.platform().has_focus(self.state.handle)
    }

    pub fn set_focusable(&self, focusable: bool) {
        self.platform().set_focusable(self.state.handle, focusable);
    }

    pub fn is_focusable(&self) -> bool {
        self.platform().is_focusable(self.state.handle)
    }

    // --- appearance -------------------------------------------------------

    /// Assigns the hover cursor, or restores the inherited one with `None`.
    /// Re-assigning the same handle is a no-op.
    pub fn set_cursor(&self, cursor: Option<Rc<Cursor>>) {
        {
            let current = self.state.cursor.borrow();
            let unchanged = match (&*current, &cursor) {
                (Some(a), Some(b)) => Rc::ptr_eq(a, b),
                (None, None) => true,
                _ => false,
            };
            if unchanged {
                return;
            }
        }
        self.platform().set_cursor(self.state.handle, cursor.as_deref());
        *self.state.cursor.borrow_mut() = cursor;
    }

    pub fn cursor(&self) -> Option<Rc<Cursor>> {
        self.state.cursor.borrow().clone()
    }

    /// Assigns the view's font. The widget's preferred size usually changes
    /// with it, so the layout minimum is re-derived and the tree re-laid out.
    /// Re-assigning the same handle is a no-op.
    pub fn set_font(&self, font: Rc<Font>) {
        {
            let current = self.state.font.borrow();
            if current.as_ref().is_some_and(|f| Rc::ptr_eq(f, &font)) {
                return;
            }
        }
        self.platform().set_font(self.state.handle, &font);
        *self.state.font.borrow_mut() = Some(font);
        self.refresh_min_size();
        layout_subtree(&self.root());
    }

    pub fn font(&self) -> Option<Rc<Font>> {
        self.state.font.borrow().clone()
    }

    fn refresh_min_size(&self) {
        let preferred = self.platform().preferred_size(self.state.handle);
        self.state
            .app
            .layout
            .borrow_mut()
            .set_min_size(self.state.layout_id, preferred);
    }

    pub fn set_color(&self, color: Color) {
        self.platform()
            .set_color(self.state.handle, ColorTarget::Foreground, color);
    }

    pub fn set_background_color(&self, color: Color) {
        self.platform()
            .set_color(self.state.handle, ColorTarget::Background, color);
    }

    // --- styling and layout -----------------------------------------------

    /// Applies one style property. Names are matched case- and
    /// punctuation-insensitively (`"flex-direction"` equals
    /// `"flexDirection"`). Unknown names and unparsable values are logged and
    /// ignored. Layout properties trigger one layout pass; paint properties
    /// (`color`, `background-color`) go straight to the backend without one.
    /// Returns whether the property was applied.
    pub fn set_style_property(&self, name: &str, value: impl Into<StyleValue>) -> bool {
        let applied = self.apply_style_property(name, &value.into());
        if applied == StyleApplication::Layout {
            layout_subtree(&self.root());
        }
        applied != StyleApplication::Rejected
    }

    /// Applies a batch of style properties with at most a single layout pass
    /// at the end. Returns the number of properties applied.
    pub fn set_style<N, V>(&self, properties: impl IntoIterator<Item = (N, V)>) -> usize
    where
        N: AsRef<str>,
        V: Into<StyleValue>,
    {
        let mut applied = 0;
        let mut layout_changed = false;
        for (name, value) in properties {
            match self.apply_style_property(name.as_ref(), &value.into()) {
                StyleApplication::Layout => {
                    applied += 1;
                    layout_changed = true;
                }
                StyleApplication::Paint => applied += 1,
                StyleApplication::Rejected => {}
            }
        }
        if layout_changed {
            layout_subtree(&self.root());
        }
        applied
    }

    fn apply_style_property(&self, name: &str, value: &StyleValue) -> StyleApplication {
        let key = normalize_style_name(name);
        match key.as_str() {
            // Paint properties are routed to the backend, not the layout
            // tree.
            "color" | "backgroundcolor" => {
                let StyleValue::Text(text) = value else {
                    log::warn!("ignoring non-text color value {value:?}");
                    return StyleApplication::Rejected;
                };
                match Color::from_str(text) {
                    Ok(color) => {
                        let target = if key == "color" {
                            ColorTarget::Foreground
                        } else {
                            ColorTarget::Background
                        };
                        self.platform().set_color(self.state.handle, target, color);
                        StyleApplication::Paint
                    }
                    Err(error) => {
                        log::warn!("ignoring color value {text:?}: {error}");
                        StyleApplication::Rejected
                    }
                }
            }
            _ => {
                let applied = self
                    .state
                    .app
                    .layout
                    .borrow_mut()
                    .apply_property(self.state.layout_id, &key, value);
                if applied {
                    StyleApplication::Layout
                } else {
                    StyleApplication::Rejected
                }
            }
        }
    }

    /// Debug dump of this view's computed layout subtree.
    pub fn computed_layout(&self) -> String {
        self.state.app.layout.borrow().debug_string(self.state.layout_id)
    }

    // --- painting ---------------------------------------------------------

    /// Requests a repaint of the whole view.
    pub fn schedule_paint(&self) {
        self.platform().invalidate(self.state.handle, None);
    }

    /// Requests a repaint of `rect`, in view-local logical pixels.
    pub fn schedule_paint_rect(&self, rect: Bounds<Pixels>) {
        let scale = self.platform().scale_factor();
        self.platform()
            .invalidate(self.state.handle, Some(rect.to_device(scale)));
    }

    // --- input ------------------------------------------------------------

    /// Input signals for this view.
    pub fn responder(&self) -> &Responder {
        &self.state.responder
    }

    // --- tooltips ---------------------------------------------------------

    /// Installs a whole-view tooltip, replacing every tooltip previously set,
    /// rect-scoped ones included.
    pub fn set_tooltip(&self, text: impl Into<String>) {
        let text = text.into();
        let mut tooltips = self.state.tooltips.borrow_mut();
        for id in tooltips.ids() {
            self.platform().remove_tooltip(self.state.handle, id);
        }
        tooltips.set_default(text.clone());
        self.platform()
            .add_tooltip(self.state.handle, TooltipId::DEFAULT, &text, None);
    }

    /// Installs a tooltip for a view-local rectangle, displacing the
    /// whole-view tooltip if one is set. Returns an id for later removal.
    pub fn add_tooltip_for_rect(
        &self,
        text: impl Into<String>,
        rect: Bounds<Pixels>,
    ) -> TooltipId {
        let text = text.into();
        let mut tooltips = self.state.tooltips.borrow_mut();
        if tooltips.get(TooltipId::DEFAULT).is_some() {
            self.platform()
                .remove_tooltip(self.state.handle, TooltipId::DEFAULT);
        }
        let id = tooltips.add_for_rect(text.clone(), rect);
        let scale = self.platform().scale_factor();
        self.platform()
            .add_tooltip(self.state.handle, id, &text, Some(rect.to_device(scale)));
        id
    }

    /// Removes one tooltip. Unknown ids are a no-op returning false.
    pub fn remove_tooltip(&self, id: TooltipId) -> bool {
        let removed = self.state.tooltips.borrow_mut().remove(id);
        if removed {
            self.platform().remove_tooltip(self.state.handle, id);
        }
        removed
    }

    /// The tooltip text that applies at a view-local position, if any.
    pub fn tooltip_text_at(&self, position: Point<Pixels>) -> Option<String> {
        let own = bounds(px(0.0), px(0.0), self.bounds().size.width, self.bounds().size.height);
        self.state
            .tooltips
            .borrow()
            .query(position, own)
            .map(str::to_owned)
    }

    pub fn tooltip_count(&self) -> usize {
        self.state.tooltips.borrow().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::size;

    #[test]
    fn redundant_bounds_assignment_is_skipped() {
        let (app, platform) = App::headless();
        let view = View::new(&app);
        view.set_bounds(bounds(px(10.0), px(10.0), px(40.0), px(20.0)));
        platform.take_calls();

        view.set_bounds(bounds(px(10.0), px(10.0), px(40.0), px(20.0)));
        assert_eq!(platform.calls_named("set_pixel_bounds"), 0);
    }

    #[test]
    fn redundant_visibility_assignment_is_skipped() {
        let (app, platform) = App::headless();
        let view = View::new(&app);
        platform.take_calls();

        view.set_visible(true);
        assert_eq!(platform.calls_named("set_visible"), 0);
        view.set_visible(false);
        view.set_visible(false);
        assert_eq!(platform.calls_named("set_visible"), 1);
    }

    #[test]
    fn bounds_round_trip_is_stable_after_first_conversion() {
        let (app, platform) = App::headless();
        platform.set_scale_factor(2.0);
        let view = View::new(&app);

        view.set_bounds(bounds(px(0.25), px(0.25), px(10.0), px(10.0)));
        let settled = view.bounds();
        view.set_bounds(settled);
        assert_eq!(view.bounds(), settled);
    }

    #[test]
    fn same_cursor_handle_is_not_reassigned() {
        let (app, platform) = App::headless();
        let view = View::new(&app);
        let cursor = crate::resources::Cursor::new(crate::resources::CursorStyle::PointingHand);
        view.set_cursor(Some(cursor.clone()));
        platform.take_calls();

        view.set_cursor(Some(cursor));
        assert_eq!(platform.calls_named("set_cursor"), 0);
        view.set_cursor(None);
        assert_eq!(platform.calls_named("set_cursor"), 1);
    }

    #[test]
    fn unknown_style_property_is_ignored() {
        let (app, _platform) = App::headless();
        let view = View::new(&app);
        assert!(!view.set_style_property("borderradius", 4.0));
        assert!(view.set_style_property("width", "50%"));
    }

    #[test]
    fn color_style_properties_reach_the_backend() {
        let (app, platform) = App::headless();
        let view = View::new(&app);
        assert!(view.set_style_property("background-color", "#ff0000"));
        assert!(view.set_style_property("color", "#0f0"));
        assert!(!view.set_style_property("color", "#nope"));
        assert_eq!(platform.calls_named("set_color"), 2);
    }

    #[test]
    fn color_style_properties_do_not_trigger_a_layout_pass() {
        let (app, platform) = App::headless();
        let container = crate::Container::new(&app);
        let child = View::new(&app);
        child.set_style_property("flex-grow", 1.0);
        container.add_child_view(&child);
        container.set_bounds(bounds(px(0.0), px(0.0), px(100.0), px(100.0)));
        platform.take_calls();

        assert!(container.set_style_property("background-color", "#222222"));
        assert!(container.set_style_property("color", "#eee"));
        assert_eq!(platform.calls_named("set_pixel_bounds"), 0);

        // A layout property in the same batch still runs exactly one pass.
        assert_eq!(container.set_style([("color", "#fff"), ("padding", "10")]), 2);
        assert_eq!(platform.calls_named("set_pixel_bounds"), 1);
    }

    #[test]
    fn size_change_notifies_observers() {
        let (app, _platform) = App::headless();
        let view = View::new(&app);
        let sizes = Rc::new(RefCell::new(Vec::new()));
        let log = sizes.clone();
        view.on_size_changed(move |view| log.borrow_mut().push(view.bounds().size))
            .detach();

        view.set_bounds(bounds(px(0.0), px(0.0), px(10.0), px(10.0)));
        // Pure move, same size: no notification.
        view.set_bounds(bounds(px(5.0), px(5.0), px(10.0), px(10.0)));
        view.set_bounds(bounds(px(5.0), px(5.0), px(20.0), px(10.0)));
        assert_eq!(*sizes.borrow(), vec![size(px(10.0), px(10.0)), size(px(20.0), px(10.0))]);
    }
}
