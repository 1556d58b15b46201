//! A cross-platform desktop UI core: an abstract view/container tree over
//! native widgets, flexbox layout, and reconciled drag-and-drop sessions.
//!
//! The crate is deliberately backend-agnostic. Everything here runs against
//! the [`PlatformBackend`] trait; a native binding implements it once per
//! toolkit, and [`HeadlessPlatform`] implements it in memory for tests.
//! The object graph is single-threaded: handles are `Rc`-based and none of
//! the types are `Send`.

mod app;
mod color;
mod container;
mod drag_and_drop;
mod geometry;
mod layout;
mod platform;
mod resources;
mod responder;
mod subscription;
mod tooltip;
mod util;
mod view;

pub use app::App;
pub use color::{Color, ParseColorError};
pub use container::Container;
pub use drag_and_drop::{
    DataType, DragContext, DragData, DragLeaveEvent, DragOperation, DragOptions, DraggingInfo,
    DropPayload,
};
pub use geometry::{Bounds, DevicePixels, Pixels, Point, Size, bounds, point, px, size};
pub use layout::{LayoutId, StyleValue};
pub use platform::{ColorTarget, HeadlessPlatform, NativeHandle, PlatformBackend};
pub use resources::{Cursor, CursorStyle, Font, FontStyle, FontWeight, Image};
pub use responder::{KeyEvent, MouseButton, MouseEvent, Responder};
pub use subscription::{Signal, Subscription};
pub use tooltip::TooltipId;
pub use util::ResultExt;
pub use view::View;
