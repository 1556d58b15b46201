//! The seam between the portable view tree and a native toolkit.
//!
//! Everything below the [`PlatformBackend`] trait speaks device pixels and
//! native handles; everything above speaks logical pixels and [`View`]s. The
//! core never names an operating system: a backend is installed per
//! [`App`](crate::App) and the tree calls through the trait object.
//!
//! [`View`]: crate::View

pub mod headless;

use crate::color::Color;
use crate::drag_and_drop::{DataType, DragContext, DragOperation};
use crate::geometry::{Bounds, DevicePixels, Pixels, Size};
use crate::resources::{Cursor, Font, Image};
use crate::tooltip::TooltipId;
use collections::BTreeSet;

pub use headless::HeadlessPlatform;

/// Opaque identifier of one native widget, assigned by the backend at
/// creation and stable for the widget's lifetime.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct NativeHandle(pub u64);

/// Which of a widget's colors a [`PlatformBackend::set_color`] call targets.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ColorTarget {
    Foreground,
    Background,
}

/// Operations a native toolkit must provide for the view tree to drive it.
///
/// All geometry crossing this trait is in device pixels; conversion from
/// logical pixels happens above, using [`PlatformBackend::scale_factor`].
/// Implementations are single-threaded, like the tree itself.
pub trait PlatformBackend {
    /// Creates the native widget for a new view. `container` selects a
    /// child-bearing widget.
    fn create_view(&self, container: bool) -> NativeHandle;

    /// Releases the native widget. Called exactly once, from the view's drop.
    fn destroy_view(&self, handle: NativeHandle);

    /// Device pixels per logical pixel.
    fn scale_factor(&self) -> f32;

    fn set_pixel_bounds(&self, handle: NativeHandle, bounds: Bounds<DevicePixels>);
    fn pixel_bounds(&self, handle: NativeHandle) -> Bounds<DevicePixels>;

    fn set_visible(&self, handle: NativeHandle, visible: bool);
    fn is_visible(&self, handle: NativeHandle) -> bool;

    fn set_enabled(&self, handle: NativeHandle, enabled: bool);
    fn is_enabled(&self, handle: NativeHandle) -> bool;

    fn focus(&self, handle: NativeHandle);
    fn has_focus(&self, handle: NativeHandle) -> bool;
    fn set_focusable(&self, handle: NativeHandle, focusable: bool);
    fn is_focusable(&self, handle: NativeHandle) -> bool;

    /// `None` restores the widget's inherited cursor.
    fn set_cursor(&self, handle: NativeHandle, cursor: Option<&Cursor>);

    fn set_font(&self, handle: NativeHandle, font: &Font);
    fn set_color(&self, handle: NativeHandle, target: ColorTarget, color: Color);

    /// The widget's content-derived natural size, in logical pixels. Widgets
    /// with no intrinsic content report zero.
    fn preferred_size(&self, _handle: NativeHandle) -> Size<Pixels> {
        Size::default()
    }

    /// Requests a repaint of `rect`, or of the whole widget when `None`.
    fn invalidate(&self, handle: NativeHandle, rect: Option<Bounds<DevicePixels>>);

    fn add_tooltip(
        &self,
        handle: NativeHandle,
        id: TooltipId,
        text: &str,
        rect: Option<Bounds<DevicePixels>>,
    );
    fn remove_tooltip(&self, handle: NativeHandle, id: TooltipId);

    /// Declares the payload types `handle` accepts as a drop destination.
    fn register_dragged_types(&self, handle: NativeHandle, types: &BTreeSet<DataType>);

    /// Starts a source-side drag and blocks in a nested native event loop
    /// until the gesture ends, returning the accepted operation. Payload
    /// items are pulled back through
    /// [`View::drag_data_requested`](crate::View::drag_data_requested).
    fn start_drag(
        &self,
        handle: NativeHandle,
        types: &[DataType],
        operations: DragOperation,
        image: Option<&Image>,
    ) -> DragOperation;

    /// Unwinds a blocked [`PlatformBackend::start_drag`] with no data
    /// exchanged.
    fn cancel_drag(&self, handle: NativeHandle);

    /// Asks the drag source for one typed item of a pending drop. The
    /// backend answers by calling
    /// [`View::drag_data_received`](crate::View::drag_data_received), possibly
    /// synchronously.
    fn request_drag_data(&self, handle: NativeHandle, context: &DragContext, data_type: DataType);

    /// Reports the destination-side outcome of a drop so the source can run
    /// its completion feedback. `operation` carries MOVE when the source
    /// should delete the dragged data.
    fn finish_drag(
        &self,
        handle: NativeHandle,
        context: &DragContext,
        success: bool,
        operation: DragOperation,
    );
}
