//! Cross-platform drag-and-drop sessions.
//!
//! Native toolkits expose drag and drop as a soup of asynchronous callbacks
//! with per-OS ordering quirks. This module reconciles them into one
//! deterministic session per gesture:
//!
//! - destination path: `Idle -> SessionActive -> AwaitingAllTypeData ->
//!   Completed`, with leave returning to idle at any point before the drop;
//! - source path: a blocking [`View::do_drag`] call that yields to a nested
//!   native event loop and returns the negotiated operation.
//!
//! Sessions are identified by a [`DragContext`] token minted by the backend
//! per native drag context and compared by identity, never by value: a late
//! data delivery carrying a closed session's token is silently discarded.
//!
//! Backends whose toolkit emits a leave immediately before every drop (GTK
//! does) must coalesce the pair so the core sees either a leave or a drop for
//! a given gesture, not both.

use crate::geometry::{Pixels, Point};
use crate::resources::Image;
use crate::view::View;
use bitflags::bitflags;
use collections::BTreeMap;
use std::path::PathBuf;
use std::rc::Rc;

bitflags! {
    /// The set of outcomes permitted for a drag gesture.
    #[derive(Clone, Copy, PartialEq, Eq, Debug)]
    pub struct DragOperation: u32 {
        const COPY = 1 << 0;
        const MOVE = 1 << 1;
        const LINK = 1 << 2;
    }
}

impl DragOperation {
    /// No permitted outcome; as a negotiation result this rejects the
    /// current pointer position.
    pub const fn none() -> Self {
        DragOperation::empty()
    }
}

impl Default for DragOperation {
    fn default() -> Self {
        DragOperation::empty()
    }
}

/// Tag of one typed item in a drag payload. Closed enumeration: backends map
/// their native type identifiers onto these.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum DataType {
    Text,
    Html,
    FilePaths,
    Bytes,
}

/// One typed item of a drag payload.
#[derive(Clone, PartialEq, Debug)]
pub enum DragData {
    Text(String),
    Html(String),
    FilePaths(Vec<PathBuf>),
    Bytes(Vec<u8>),
}

impl DragData {
    pub fn data_type(&self) -> DataType {
        match self {
            DragData::Text(_) => DataType::Text,
            DragData::Html(_) => DataType::Html,
            DragData::FilePaths(_) => DataType::FilePaths,
            DragData::Bytes(_) => DataType::Bytes,
        }
    }
}

/// Identity token for one native drag context. Cloned freely; equality is
/// pointer identity, so two tokens are equal only if one was cloned from the
/// other.
#[derive(Clone, Debug, Default)]
pub struct DragContext(Rc<()>);

impl DragContext {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PartialEq for DragContext {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for DragContext {}

/// Read access to the data being dragged, available during destination-side
/// callbacks. Backends implement this over their native data object; the
/// assembled payload handed to the drop handler is a [`DropPayload`].
pub trait DraggingInfo {
    fn is_data_available(&self, data_type: DataType) -> bool;
    fn data(&self, data_type: DataType) -> Option<DragData>;
    fn drag_operations(&self) -> DragOperation;
}

/// The fully assembled payload of a completed (or abandoned) drop gesture:
/// exactly one entry per accepted type, no duplicates, no omissions.
#[derive(Debug, Default)]
pub struct DropPayload {
    data: BTreeMap<DataType, DragData>,
    operations: DragOperation,
}

impl DropPayload {
    pub(crate) fn new(data: BTreeMap<DataType, DragData>, operations: DragOperation) -> Self {
        DropPayload { data, operations }
    }

    /// The payload's items in type order.
    pub fn items(&self) -> impl Iterator<Item = &DragData> {
        self.data.values()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl DraggingInfo for DropPayload {
    fn is_data_available(&self, data_type: DataType) -> bool {
        self.data.contains_key(&data_type)
    }

    fn data(&self, data_type: DataType) -> Option<DragData> {
        self.data.get(&data_type).cloned()
    }

    fn drag_operations(&self) -> DragOperation {
        self.operations
    }
}

/// Options for starting a source-side drag.
#[derive(Default)]
pub struct DragOptions {
    /// Image rendered under the pointer while dragging.
    pub image: Option<Rc<Image>>,
}

/// Notification emitted when a drag leaves a destination view without
/// dropping.
pub struct DragLeaveEvent {
    pub view: View,
    /// Snapshot of whatever had been received when the pointer left,
    /// typically empty since data transfer only starts at the drop.
    pub payload: DropPayload,
}

/// Destination-side session state, one per active gesture over a view.
pub(crate) struct DropSession {
    context: DragContext,
    /// Operation returned by the most recent enter/update negotiation; reset
    /// once frozen into `final_operation`.
    negotiated: Option<DragOperation>,
    /// Frozen at drop time; restricted to MOVE when finalizing.
    final_operation: DragOperation,
    received: BTreeMap<DataType, DragData>,
    drop_point: Option<Point<Pixels>>,
    awaiting_data: bool,
}

impl DropSession {
    fn new(context: DragContext) -> Self {
        DropSession {
            context,
            negotiated: None,
            final_operation: DragOperation::none(),
            received: BTreeMap::new(),
            drop_point: None,
            awaiting_data: false,
        }
    }
}

/// Source-side session state: the outgoing payload, held for the duration of
/// the blocking [`View::do_drag`] call.
pub(crate) struct SourceSession {
    data: Vec<DragData>,
}

impl View {
    /// Declares which payload types this view accepts as a drop destination.
    /// Replaces any previous registration; the set is fixed for the lifetime
    /// of each subsequent session.
    pub fn register_dragged_types(&self, types: impl IntoIterator<Item = DataType>) {
        let types: collections::BTreeSet<DataType> = types.into_iter().collect();
        self.platform().register_dragged_types(self.native_handle(), &types);
        *self.state().accepted_types.borrow_mut() = types;
    }

    /// Installs the drag-enter negotiation handler. Destination sessions
    /// cannot begin without one: an unhandled enter rejects the drag.
    pub fn set_drag_enter_handler(
        &self,
        handler: impl Fn(&View, &dyn DraggingInfo, Point<Pixels>) -> DragOperation + 'static,
    ) {
        *self.state().drag_enter_handler.borrow_mut() = Some(Box::new(handler));
    }

    /// Installs the per-motion renegotiation handler. Without one, the
    /// operation negotiated at enter time is reused for every motion.
    pub fn set_drag_update_handler(
        &self,
        handler: impl Fn(&View, &dyn DraggingInfo, Point<Pixels>) -> DragOperation + 'static,
    ) {
        *self.state().drag_update_handler.borrow_mut() = Some(Box::new(handler));
    }

    /// Installs the drop handler, invoked once with the fully assembled
    /// payload. Returning false fails the drop (snap-back).
    pub fn set_drop_handler(
        &self,
        handler: impl Fn(&View, &DropPayload, Point<Pixels>) -> bool + 'static,
    ) {
        *self.state().drop_handler.borrow_mut() = Some(Box::new(handler));
    }

    /// Native hook: pointer moved over the view while dragging. Returns the
    /// negotiated operation for this position; an empty bitmask tells the
    /// backend to show no drop affordance. The session, if one is active,
    /// survives a rejected position.
    pub fn drag_motion(
        &self,
        context: &DragContext,
        info: &dyn DraggingInfo,
        position: Point<Pixels>,
    ) -> DragOperation {
        let state = self.state();
        let any_acceptable = {
            let accepted = state.accepted_types.borrow();
            accepted.iter().any(|&t| info.is_data_available(t))
        };
        if !any_acceptable {
            return DragOperation::none();
        }

        let entering = {
            let session = state.drop_session.borrow();
            !matches!(
                &*session,
                Some(s) if s.context == *context && s.negotiated.is_some()
            )
        };

        let operation = if entering {
            // Entry requires an explicit handler; without one we never open
            // a session for this context.
            let Some(handler) = state.drag_enter_handler.borrow_mut().take() else {
                return DragOperation::none();
            };
            *state.drop_session.borrow_mut() = Some(DropSession::new(context.clone()));
            log::trace!("drag session opened on view {:?}", self.native_handle());
            let operation = handler(self, info, position);
            let mut slot = state.drag_enter_handler.borrow_mut();
            if slot.is_none() {
                *slot = Some(handler);
            }
            operation
        } else {
            let handler = state.drag_update_handler.borrow_mut().take();
            let operation = match &handler {
                Some(handler) => handler(self, info, position),
                // Sticky default: reuse the previous negotiation unchanged.
                None => {
                    let session = state.drop_session.borrow();
                    session
                        .as_ref()
                        .and_then(|s| s.negotiated)
                        .unwrap_or_else(DragOperation::none)
                }
            };
            if let Some(handler) = handler {
                let mut slot = state.drag_update_handler.borrow_mut();
                if slot.is_none() {
                    *slot = Some(handler);
                }
            }
            operation
        };

        if let Some(session) = state.drop_session.borrow_mut().as_mut() {
            if session.context == *context {
                session.negotiated = Some(operation);
            }
        }
        operation
    }

    /// Native hook: the pointer left the view without dropping. Ends the
    /// session and notifies leave observers with a payload snapshot.
    pub fn drag_leave(&self, context: &DragContext) {
        let session = {
            let mut slot = self.state().drop_session.borrow_mut();
            match &*slot {
                Some(s) if s.context == *context => slot.take(),
                _ => None,
            }
        };
        let Some(mut session) = session else {
            return;
        };
        session.final_operation = session.negotiated.take().unwrap_or_else(DragOperation::none);
        log::trace!("drag session left view {:?}", self.native_handle());
        let event = DragLeaveEvent {
            view: self.clone(),
            payload: DropPayload::new(
                std::mem::take(&mut session.received),
                session.final_operation,
            ),
        };
        self.state().on_drag_leave.emit(&event);
    }

    /// Subscribes to drag-leave notifications.
    pub fn on_drag_leave(
        &self,
        observer: impl Fn(&DragLeaveEvent) + 'static,
    ) -> crate::Subscription {
        self.state().on_drag_leave.subscribe(observer)
    }

    /// Native hook: the payload was released over the view. Freezes the final
    /// operation and requests every accepted type from the backend; the
    /// session completes once all deliveries arrive. Returns false when no
    /// session is active for `context`.
    pub fn drag_drop(&self, context: &DragContext, position: Point<Pixels>) -> bool {
        let state = self.state();
        {
            let mut slot = state.drop_session.borrow_mut();
            let Some(session) = slot.as_mut() else {
                return false;
            };
            if session.context != *context {
                return false;
            }
            session.final_operation = session
                .negotiated
                .take()
                .unwrap_or(session.final_operation);
            session.drop_point = Some(position);
            session.awaiting_data = true;
        }
        let accepted: Vec<DataType> = state.accepted_types.borrow().iter().copied().collect();
        // Requests may be answered synchronously; no borrows are held here.
        for data_type in accepted {
            self.platform()
                .request_drag_data(self.native_handle(), context, data_type);
        }
        true
    }

    /// Native hook: one typed delivery for a pending drop. Deliveries for a
    /// closed or superseded session are discarded. Once every accepted type
    /// has arrived the drop handler fires exactly once with the assembled
    /// payload.
    pub fn drag_data_received(&self, context: &DragContext, data: DragData) {
        let state = self.state();
        let data_type = data.data_type();
        let completed = {
            let mut slot = state.drop_session.borrow_mut();
            let Some(session) = slot.as_mut() else {
                log::debug!("discarding drag data for closed session: {data_type:?}");
                return;
            };
            if session.context != *context {
                log::debug!("discarding drag data from stale context: {data_type:?}");
                return;
            }
            if !session.awaiting_data {
                log::debug!("discarding drag data delivered before the drop: {data_type:?}");
                return;
            }
            let accepted = state.accepted_types.borrow();
            if !accepted.contains(&data_type) {
                log::debug!("discarding drag data of unaccepted type: {data_type:?}");
                return;
            }
            session.received.insert(data_type, data);
            if session.received.len() < accepted.len() {
                // Join barrier: wait for the remaining types.
                return;
            }
            drop(accepted);
            match slot.take() {
                Some(session) => session,
                None => return,
            }
        };

        let payload = DropPayload::new(completed.received, completed.final_operation);
        let drop_point = completed.drop_point.unwrap_or_default();

        let handler = state.drop_handler.borrow_mut().take();
        let accepted_drop = handler
            .as_ref()
            .is_some_and(|handler| handler(self, &payload, drop_point));
        if let Some(handler) = handler {
            let mut slot = state.drop_handler.borrow_mut();
            if slot.is_none() {
                *slot = Some(handler);
            }
        }

        if accepted_drop {
            self.platform().finish_drag(
                self.native_handle(),
                context,
                true,
                completed.final_operation & DragOperation::MOVE,
            );
        } else {
            // Failed drop: partial data is cleared with the payload and the
            // backend gets to run its snap-back feedback.
            self.platform()
                .finish_drag(self.native_handle(), context, false, DragOperation::none());
        }
    }

    /// Starts a drag with this view as the source, blocking on the backend's
    /// nested event loop until the gesture ends. Returns the operation the
    /// destination accepted, or an empty bitmask if nothing did. Calling
    /// while a drag is already active on this view is an idempotent no-op
    /// returning an empty bitmask.
    ///
    /// Reentrancy: while blocked, the outer event loop continues delivering
    /// native callbacks, so arbitrary view-tree mutation can occur before
    /// this returns.
    pub fn do_drag(&self, data: Vec<DragData>, operations: DragOperation) -> DragOperation {
        self.do_drag_with_options(data, operations, DragOptions::default())
    }

    /// [`View::do_drag`] with a custom drag image.
    pub fn do_drag_with_options(
        &self,
        data: Vec<DragData>,
        operations: DragOperation,
        options: DragOptions,
    ) -> DragOperation {
        let state = self.state();
        let types: Vec<DataType> = {
            let mut session = state.drag_session.borrow_mut();
            if session.is_some() {
                return DragOperation::none();
            }
            let types = data.iter().map(DragData::data_type).collect();
            *session = Some(SourceSession { data });
            types
        };
        let result = self.platform().start_drag(
            self.native_handle(),
            &types,
            operations,
            options.image.as_deref(),
        );
        state.drag_session.borrow_mut().take();
        result
    }

    /// Cooperatively cancels an active source-side drag, synchronously
    /// unwinding the nested event loop with no data exchanged.
    pub fn cancel_drag(&self) {
        if self.is_dragging() {
            self.platform().cancel_drag(self.native_handle());
        }
    }

    /// Whether a source-side drag is currently in progress on this view.
    pub fn is_dragging(&self) -> bool {
        self.state().drag_session.borrow().is_some()
    }

    /// Native hook: the backend pulls the payload item at `index` while the
    /// gesture is in flight.
    pub fn drag_data_requested(&self, index: usize) -> Option<DragData> {
        self.state()
            .drag_session
            .borrow()
            .as_ref()?
            .data
            .get(index)
            .cloned()
    }
}
