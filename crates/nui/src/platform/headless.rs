//! An in-memory backend for tests.
//!
//! Widgets are plain records, every mutating call is appended to a log that
//! tests can inspect, and source-side drags run a caller-supplied script
//! instead of a nested event loop.

use crate::color::Color;
use crate::drag_and_drop::{DataType, DragContext, DragOperation};
use crate::geometry::{Bounds, DevicePixels, Pixels, Size};
use crate::platform::{ColorTarget, NativeHandle, PlatformBackend};
use crate::resources::{Cursor, Font, Image};
use crate::tooltip::TooltipId;
use collections::{BTreeSet, FxHashMap};
use std::cell::{Cell, RefCell};

#[derive(Default)]
struct ViewRecord {
    bounds: Bounds<DevicePixels>,
    visible: bool,
    enabled: bool,
    focusable: bool,
    focused: bool,
    accepted_types: BTreeSet<DataType>,
}

type DragScript = Box<dyn Fn(&HeadlessPlatform, NativeHandle, DragOperation) -> DragOperation>;

/// A scriptable, fully observable [`PlatformBackend`].
#[derive(Default)]
pub struct HeadlessPlatform {
    next_handle: Cell<u64>,
    views: RefCell<FxHashMap<NativeHandle, ViewRecord>>,
    calls: RefCell<Vec<String>>,
    scale_factor: Cell<f32>,
    drag_script: RefCell<Option<DragScript>>,
    cancel_requested: Cell<bool>,
    data_requests: RefCell<Vec<(NativeHandle, DragContext, DataType)>>,
    finishes: RefCell<Vec<(NativeHandle, DragContext, bool, DragOperation)>>,
}

impl HeadlessPlatform {
    pub fn new() -> Self {
        let platform = HeadlessPlatform::default();
        platform.scale_factor.set(1.0);
        platform
    }

    pub fn set_scale_factor(&self, scale: f32) {
        self.scale_factor.set(scale);
    }

    /// The mutating calls made so far, in order, as `name(args)` strings.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// Drains the call log.
    pub fn take_calls(&self) -> Vec<String> {
        std::mem::take(&mut *self.calls.borrow_mut())
    }

    pub fn calls_named(&self, name: &str) -> usize {
        let prefix = format!("{name}(");
        self.calls
            .borrow()
            .iter()
            .filter(|call| call.starts_with(&prefix))
            .count()
    }

    /// Installs the script run by [`PlatformBackend::start_drag`]. The script
    /// plays the role of the nested native event loop: it may call back into
    /// views before returning the negotiated operation.
    pub fn set_drag_script(
        &self,
        script: impl Fn(&HeadlessPlatform, NativeHandle, DragOperation) -> DragOperation + 'static,
    ) {
        *self.drag_script.borrow_mut() = Some(Box::new(script));
    }

    pub fn data_requests(&self) -> Vec<(NativeHandle, DragContext, DataType)> {
        self.data_requests.borrow().clone()
    }

    pub fn finishes(&self) -> Vec<(NativeHandle, DragContext, bool, DragOperation)> {
        self.finishes.borrow().clone()
    }

    pub fn view_count(&self) -> usize {
        self.views.borrow().len()
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }

    fn with_view<T>(&self, handle: NativeHandle, read: impl FnOnce(&ViewRecord) -> T) -> T
    where
        T: Default,
    {
        self.views.borrow().get(&handle).map(read).unwrap_or_default()
    }

    fn with_view_mut(&self, handle: NativeHandle, write: impl FnOnce(&mut ViewRecord)) {
        if let Some(record) = self.views.borrow_mut().get_mut(&handle) {
            write(record);
        }
    }
}

impl PlatformBackend for HeadlessPlatform {
    fn create_view(&self, container: bool) -> NativeHandle {
        let handle = NativeHandle(self.next_handle.get());
        self.next_handle.set(handle.0 + 1);
        self.views.borrow_mut().insert(
            handle,
            ViewRecord {
                visible: true,
                enabled: true,
                ..ViewRecord::default()
            },
        );
        self.record(format!("create_view({}, container={container})", handle.0));
        handle
    }

    fn destroy_view(&self, handle: NativeHandle) {
        self.views.borrow_mut().remove(&handle);
        self.record(format!("destroy_view({})", handle.0));
    }

    fn scale_factor(&self) -> f32 {
        self.scale_factor.get()
    }

    fn set_pixel_bounds(&self, handle: NativeHandle, bounds: Bounds<DevicePixels>) {
        self.with_view_mut(handle, |record| record.bounds = bounds);
        self.record(format!("set_pixel_bounds({}, {bounds:?})", handle.0));
    }

    fn pixel_bounds(&self, handle: NativeHandle) -> Bounds<DevicePixels> {
        self.with_view(handle, |record| record.bounds)
    }

    fn set_visible(&self, handle: NativeHandle, visible: bool) {
        self.with_view_mut(handle, |record| record.visible = visible);
        self.record(format!("set_visible({}, {visible})", handle.0));
    }

    fn is_visible(&self, handle: NativeHandle) -> bool {
        self.with_view(handle, |record| record.visible)
    }

    fn set_enabled(&self, handle: NativeHandle, enabled: bool) {
        self.with_view_mut(handle, |record| record.enabled = enabled);
        self.record(format!("set_enabled({}, {enabled})", handle.0));
    }

    fn is_enabled(&self, handle: NativeHandle) -> bool {
        self.with_view(handle, |record| record.enabled)
    }

    fn focus(&self, handle: NativeHandle) {
        let focusable = self.with_view(handle, |record| record.focusable);
        if focusable {
            for record in self.views.borrow_mut().values_mut() {
                record.focused = false;
            }
            self.with_view_mut(handle, |record| record.focused = true);
        }
        self.record(format!("focus({})", handle.0));
    }

    fn has_focus(&self, handle: NativeHandle) -> bool {
        self.with_view(handle, |record| record.focused)
    }

    fn set_focusable(&self, handle: NativeHandle, focusable: bool) {
        self.with_view_mut(handle, |record| record.focusable = focusable);
        self.record(format!("set_focusable({}, {focusable})", handle.0));
    }

    fn is_focusable(&self, handle: NativeHandle) -> bool {
        self.with_view(handle, |record| record.focusable)
    }

    fn set_cursor(&self, handle: NativeHandle, cursor: Option<&Cursor>) {
        self.record(format!(
            "set_cursor({}, {:?})",
            handle.0,
            cursor.map(|c| c.style)
        ));
    }

    fn set_font(&self, handle: NativeHandle, font: &Font) {
        self.record(format!("set_font({}, {})", handle.0, font.family));
    }

    fn set_color(&self, handle: NativeHandle, target: ColorTarget, color: Color) {
        self.record(format!("set_color({}, {target:?}, {color:?})", handle.0));
    }

    fn preferred_size(&self, _handle: NativeHandle) -> Size<Pixels> {
        Size::default()
    }

    fn invalidate(&self, handle: NativeHandle, rect: Option<Bounds<DevicePixels>>) {
        self.record(format!("invalidate({}, {rect:?})", handle.0));
    }

    fn add_tooltip(
        &self,
        handle: NativeHandle,
        id: TooltipId,
        text: &str,
        rect: Option<Bounds<DevicePixels>>,
    ) {
        self.record(format!(
            "add_tooltip({}, {id:?}, {text:?}, {rect:?})",
            handle.0
        ));
    }

    fn remove_tooltip(&self, handle: NativeHandle, id: TooltipId) {
        self.record(format!("remove_tooltip({}, {id:?})", handle.0));
    }

    fn register_dragged_types(&self, handle: NativeHandle, types: &BTreeSet<DataType>) {
        self.with_view_mut(handle, |record| record.accepted_types = types.clone());
        self.record(format!("register_dragged_types({}, {types:?})", handle.0));
    }

    fn start_drag(
        &self,
        handle: NativeHandle,
        types: &[DataType],
        operations: DragOperation,
        _image: Option<&Image>,
    ) -> DragOperation {
        self.record(format!("start_drag({}, {types:?}, {operations:?})", handle.0));
        self.cancel_requested.set(false);
        let script = self.drag_script.borrow_mut().take();
        let result = match &script {
            Some(script) => script(self, handle, operations),
            None => DragOperation::none(),
        };
        if let Some(script) = script {
            *self.drag_script.borrow_mut() = Some(script);
        }
        if self.cancel_requested.get() {
            DragOperation::none()
        } else {
            result
        }
    }

    fn cancel_drag(&self, handle: NativeHandle) {
        self.cancel_requested.set(true);
        self.record(format!("cancel_drag({})", handle.0));
    }

    fn request_drag_data(&self, handle: NativeHandle, context: &DragContext, data_type: DataType) {
        self.data_requests
            .borrow_mut()
            .push((handle, context.clone(), data_type));
        self.record(format!("request_drag_data({}, {data_type:?})", handle.0));
    }

    fn finish_drag(
        &self,
        handle: NativeHandle,
        context: &DragContext,
        success: bool,
        operation: DragOperation,
    ) {
        self.finishes
            .borrow_mut()
            .push((handle, context.clone(), success, operation));
        self.record(format!(
            "finish_drag({}, success={success}, {operation:?})",
            handle.0
        ));
    }
}
