use alloc::sync::Arc;
use core::cell::Cell;

use crate::{AxisLock, PlaceholderKey, Point};

/// The item being dragged.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DraggedItem<K, L, D = ()> {
    pub id: K,
    /// The list the item was picked up from.
    pub list_id: L,
    pub width: f64,
    pub height: f64,
    /// Opaque application payload, handed back in drop events.
    pub data: D,
}

impl<K, L> DraggedItem<K, L> {
    pub fn new(id: K, list_id: L, width: f64, height: f64) -> Self {
        Self {
            id,
            list_id,
            width,
            height,
            data: (),
        }
    }
}

impl<K, L, D> DraggedItem<K, L, D> {
    pub fn with_data<E>(self, data: E) -> DraggedItem<K, L, E> {
        DraggedItem {
            id: self.id,
            list_id: self.list_id,
            width: self.width,
            height: self.height,
            data,
        }
    }
}

/// Everything [`DragSession::start_drag`] populates in one step.
#[derive(Clone, Debug)]
pub struct DragStart<K, L, D = ()> {
    pub item: DraggedItem<K, L, D>,
    pub cursor: Option<Point>,
    pub grab_offset: Option<Point>,
    pub axis_lock: Option<AxisLock>,
    pub active_list_id: Option<L>,
    pub placeholder_key: Option<PlaceholderKey<K>>,
    pub placeholder_index: Option<usize>,
    /// Index of the item in its list, captured before the source element is hidden.
    pub source_index: Option<usize>,
    pub is_keyboard_drag: bool,
}

impl<K, L, D> DragStart<K, L, D> {
    pub fn new(item: DraggedItem<K, L, D>) -> Self {
        Self {
            item,
            cursor: None,
            grab_offset: None,
            axis_lock: None,
            active_list_id: None,
            placeholder_key: None,
            placeholder_index: None,
            source_index: None,
            is_keyboard_drag: false,
        }
    }

    pub fn with_cursor(mut self, cursor: Point) -> Self {
        self.cursor = Some(cursor);
        self
    }

    pub fn with_grab_offset(mut self, grab_offset: Point) -> Self {
        self.grab_offset = Some(grab_offset);
        self
    }

    pub fn with_axis_lock(mut self, axis_lock: Option<AxisLock>) -> Self {
        self.axis_lock = axis_lock;
        self
    }

    pub fn with_active_list(mut self, list_id: L) -> Self {
        self.active_list_id = Some(list_id);
        self
    }

    pub fn with_placeholder(mut self, index: usize, key: PlaceholderKey<K>) -> Self {
        self.placeholder_index = Some(index);
        self.placeholder_key = Some(key);
        self
    }

    pub fn with_source_index(mut self, source_index: usize) -> Self {
        self.source_index = Some(source_index);
        self
    }

    pub fn keyboard(mut self) -> Self {
        self.is_keyboard_drag = true;
        self
    }
}

/// A position/target update merged into an active session.
///
/// `cursor: None` keeps the previous cursor; the target fields always overwrite (a `None`
/// target means "not over any list").
#[derive(Clone, Debug, PartialEq)]
pub struct DragUpdate<K, L> {
    pub cursor: Option<Point>,
    pub active_list_id: Option<L>,
    pub placeholder_key: Option<PlaceholderKey<K>>,
    pub placeholder_index: Option<usize>,
}

impl<K, L> DragUpdate<K, L> {
    pub fn cursor(cursor: Point) -> Self {
        Self {
            cursor: Some(cursor),
            active_list_id: None,
            placeholder_key: None,
            placeholder_index: None,
        }
    }

    pub fn with_target(mut self, list_id: L, index: usize, key: PlaceholderKey<K>) -> Self {
        self.active_list_id = Some(list_id);
        self.placeholder_index = Some(index);
        self.placeholder_key = Some(key);
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DragPhase {
    Idle,
    PointerDragging,
    KeyboardDragging,
    /// Dropped; the moved item stays hidden until the destination settles.
    DropPending,
}

/// A copy of the full session state, e.g. for reading at drop time.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DragSnapshot<K, L, D = ()> {
    pub is_dragging: bool,
    pub is_keyboard_drag: bool,
    pub was_cancelled: bool,
    pub dragged_item: Option<DraggedItem<K, L, D>>,
    pub source_list_id: Option<L>,
    pub source_index: Option<usize>,
    pub active_list_id: Option<L>,
    pub placeholder_index: Option<usize>,
    pub placeholder_key: Option<PlaceholderKey<K>>,
    pub cursor: Option<Point>,
    pub grab_offset: Option<Point>,
    pub initial_position: Option<Point>,
    pub axis_lock: Option<AxisLock>,
    pub drop_pending_id: Option<K>,
}

impl<K, L, D> DragSnapshot<K, L, D> {
    fn idle() -> Self {
        Self {
            is_dragging: false,
            is_keyboard_drag: false,
            was_cancelled: false,
            dragged_item: None,
            source_list_id: None,
            source_index: None,
            active_list_id: None,
            placeholder_index: None,
            placeholder_key: None,
            cursor: None,
            grab_offset: None,
            initial_position: None,
            axis_lock: None,
            drop_pending_id: None,
        }
    }
}

impl<K: Clone, L: Clone + PartialEq, D> DragSnapshot<K, L, D> {
    /// Where a drop right now would land, if the drag is over a list with a placeholder.
    pub fn drop_result(&self) -> Option<DropResult<K, L>> {
        let item = self.dragged_item.as_ref()?;
        let destination_list_id = self.active_list_id.clone()?;
        let placeholder_index = self.placeholder_index?;
        let source_list_id = self
            .source_list_id
            .clone()
            .unwrap_or_else(|| item.list_id.clone());
        Some(DropResult {
            item_id: item.id.clone(),
            source_list_id,
            source_index: self.source_index,
            destination_list_id,
            placeholder_key: self
                .placeholder_key
                .clone()
                .unwrap_or(PlaceholderKey::EndOfList),
            placeholder_index,
        })
    }
}

/// Source and destination of a completed drop.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DropResult<K, L> {
    pub item_id: K,
    pub source_list_id: L,
    pub source_index: Option<usize>,
    pub destination_list_id: L,
    pub placeholder_key: PlaceholderKey<K>,
    /// Gap index in the destination list's pre-drop order.
    pub placeholder_index: usize,
}

impl<K, L: PartialEq> DropResult<K, L> {
    pub fn is_same_list(&self) -> bool {
        self.source_list_id == self.destination_list_id
    }

    /// Final index of the item after the move.
    ///
    /// Within one list, gaps after the source position shift down by one once the item is
    /// removed from its old slot.
    pub fn destination_index(&self) -> usize {
        match self.source_index {
            Some(s) if self.is_same_list() && self.placeholder_index > s => {
                self.placeholder_index - 1
            }
            _ => self.placeholder_index,
        }
    }

    /// `true` when the drop leaves the list order unchanged.
    pub fn is_noop(&self) -> bool {
        self.is_same_list() && self.source_index == Some(self.destination_index())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DragSessionOptions {
    /// How long a drop-pending id may linger without `complete_drop_transition` before the
    /// safety timer clears it.
    pub drop_pending_timeout_ms: u64,
}

impl Default for DragSessionOptions {
    fn default() -> Self {
        Self {
            drop_pending_timeout_ms: 100,
        }
    }
}

impl DragSessionOptions {
    pub fn with_drop_pending_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.drop_pending_timeout_ms = timeout_ms;
        self
    }
}

/// A callback fired after the session changes.
pub type OnSessionChange<K, L, D> = Arc<dyn Fn(&DragSession<K, L, D>) + Send + Sync>;

/// The single shared drag state machine.
///
/// `Idle -> PointerDragging | KeyboardDragging -> DropPending -> Idle`, with cancellation going
/// straight back to `Idle`. Every mutator is a no-op outside a matching session.
pub struct DragSession<K, L, D = ()> {
    state: DragSnapshot<K, L, D>,
    options: DragSessionOptions,
    drop_pending_since_ms: Option<u64>,
    on_change: Option<OnSessionChange<K, L, D>>,
    notify_depth: Cell<usize>,
    notify_pending: Cell<bool>,
}

impl<K, L, D> Default for DragSession<K, L, D> {
    fn default() -> Self {
        Self::new(DragSessionOptions::default())
    }
}

impl<K, L, D> DragSession<K, L, D> {
    pub fn new(options: DragSessionOptions) -> Self {
        Self {
            state: DragSnapshot::idle(),
            options,
            drop_pending_since_ms: None,
            on_change: None,
            notify_depth: Cell::new(0),
            notify_pending: Cell::new(false),
        }
    }

    pub fn options(&self) -> &DragSessionOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: DragSessionOptions) {
        self.options = options;
    }

    pub fn set_on_change(
        &mut self,
        on_change: Option<impl Fn(&DragSession<K, L, D>) + Send + Sync + 'static>,
    ) {
        self.on_change = on_change.map(|f| Arc::new(f) as _);
    }

    fn notify(&self) {
        if self.notify_depth.get() > 0 {
            self.notify_pending.set(true);
            return;
        }
        if let Some(cb) = &self.on_change {
            cb(self);
        }
    }

    /// Batches several mutations into a single `on_change` notification.
    pub fn batch_update(&mut self, f: impl FnOnce(&mut Self)) {
        let depth = self.notify_depth.get();
        self.notify_depth.set(depth.saturating_add(1));

        f(self);

        let depth = self.notify_depth.get();
        debug_assert!(depth > 0, "notify_depth underflow");
        let next = depth.saturating_sub(1);
        self.notify_depth.set(next);

        if next == 0 && self.notify_pending.replace(false) {
            if let Some(cb) = &self.on_change {
                cb(self);
            }
        }
    }

    pub fn state(&self) -> &DragSnapshot<K, L, D> {
        &self.state
    }

    pub fn phase(&self) -> DragPhase {
        if self.state.is_dragging {
            if self.state.is_keyboard_drag {
                DragPhase::KeyboardDragging
            } else {
                DragPhase::PointerDragging
            }
        } else if self.state.drop_pending_id.is_some() {
            DragPhase::DropPending
        } else {
            DragPhase::Idle
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.state.is_dragging
    }

    pub fn is_keyboard_drag(&self) -> bool {
        self.state.is_keyboard_drag
    }

    pub fn was_cancelled(&self) -> bool {
        self.state.was_cancelled
    }

    pub fn dragged_item(&self) -> Option<&DraggedItem<K, L, D>> {
        self.state.dragged_item.as_ref()
    }

    pub fn source_list_id(&self) -> Option<&L> {
        self.state.source_list_id.as_ref()
    }

    pub fn source_index(&self) -> Option<usize> {
        self.state.source_index
    }

    pub fn active_list_id(&self) -> Option<&L> {
        self.state.active_list_id.as_ref()
    }

    pub fn placeholder_index(&self) -> Option<usize> {
        self.state.placeholder_index
    }

    pub fn placeholder_key(&self) -> Option<&PlaceholderKey<K>> {
        self.state.placeholder_key.as_ref()
    }

    pub fn cursor_position(&self) -> Option<Point> {
        self.state.cursor
    }

    pub fn grab_offset(&self) -> Option<Point> {
        self.state.grab_offset
    }

    pub fn initial_position(&self) -> Option<Point> {
        self.state.initial_position
    }

    pub fn axis_lock(&self) -> Option<AxisLock> {
        self.state.axis_lock
    }

    pub fn drop_pending_id(&self) -> Option<&K> {
        self.state.drop_pending_id.as_ref()
    }

    /// The cursor with the locked axis pinned to where the drag started.
    pub fn effective_cursor(&self) -> Option<Point> {
        let cursor = self.state.cursor?;
        let Some(initial) = self.state.initial_position else {
            return Some(cursor);
        };
        Some(match self.state.axis_lock {
            Some(AxisLock::X) => Point::new(cursor.x, initial.y),
            Some(AxisLock::Y) => Point::new(initial.x, cursor.y),
            None => cursor,
        })
    }

    /// Top-left corner of the floating preview, following the original grab point.
    pub fn preview_origin(&self) -> Option<Point> {
        let cursor = self.effective_cursor()?;
        let grab = self.state.grab_offset.unwrap_or(Point::ZERO);
        Some(cursor.offset_from(grab))
    }

    /// Starts a drag. Ignored (returns `false`) while another drag is active.
    pub fn start_drag(&mut self, start: DragStart<K, L, D>) -> bool
    where
        L: Clone,
    {
        if self.state.is_dragging {
            dwarn!("DragSession::start_drag while a drag is already active; ignoring");
            debug_assert!(
                !self.state.is_dragging,
                "DragSession::start_drag while a drag is already active"
            );
            return false;
        }
        ddebug!(
            keyboard = start.is_keyboard_drag,
            source_index = ?start.source_index,
            "DragSession::start_drag"
        );
        let source_list_id = start.item.list_id.clone();
        self.state = DragSnapshot {
            is_dragging: true,
            is_keyboard_drag: start.is_keyboard_drag,
            was_cancelled: false,
            source_list_id: Some(source_list_id),
            source_index: start.source_index,
            active_list_id: start.active_list_id,
            placeholder_index: start.placeholder_index,
            placeholder_key: start.placeholder_key,
            cursor: start.cursor,
            grab_offset: start.grab_offset,
            initial_position: start.cursor,
            axis_lock: start.axis_lock,
            drop_pending_id: None,
            dragged_item: Some(start.item),
        };
        self.drop_pending_since_ms = None;
        self.notify();
        true
    }

    /// Merges a cursor/target update. No-op when no drag is active.
    pub fn update_drag_position(&mut self, update: DragUpdate<K, L>) {
        if !self.state.is_dragging {
            return;
        }
        if let Some(cursor) = update.cursor {
            self.state.cursor = Some(cursor);
        }
        self.state.active_list_id = update.active_list_id;
        self.state.placeholder_key = update.placeholder_key;
        self.state.placeholder_index = update.placeholder_index;
        self.notify();
    }

    /// Normal drop: back to idle, keeping the dropped item's id as drop-pending until
    /// [`Self::complete_drop_transition`] or the safety timeout (see [`Self::update_timers`]).
    pub fn end_drag(&mut self, now_ms: u64)
    where
        K: Clone,
    {
        if !self.state.is_dragging {
            return;
        }
        let pending = self.state.dragged_item.as_ref().map(|item| item.id.clone());
        ddebug!(now_ms, "DragSession::end_drag");
        self.state = DragSnapshot::idle();
        self.state.drop_pending_id = pending;
        self.drop_pending_since_ms = Some(now_ms);
        self.notify();
    }

    /// Aborts the drag: back to idle immediately, with `was_cancelled` set and no drop-pending.
    pub fn cancel_drag(&mut self) {
        if !self.state.is_dragging {
            return;
        }
        ddebug!("DragSession::cancel_drag");
        self.state = DragSnapshot::idle();
        self.state.was_cancelled = true;
        self.drop_pending_since_ms = None;
        self.notify();
    }

    /// Called by the destination once it has applied the move; reveals the dropped item.
    pub fn complete_drop_transition(&mut self) {
        if self.state.drop_pending_id.is_none() {
            return;
        }
        self.state.drop_pending_id = None;
        self.drop_pending_since_ms = None;
        self.notify();
    }

    /// Drives the drop-pending safety timer. Call this from the adapter's frame/timer loop.
    pub fn update_timers(&mut self, now_ms: u64) {
        let Some(since) = self.drop_pending_since_ms else {
            return;
        };
        if now_ms.saturating_sub(since) < self.options.drop_pending_timeout_ms {
            return;
        }
        ddebug!(now_ms, "DragSession: drop-pending safety timeout");
        self.drop_pending_since_ms = None;
        if self.state.drop_pending_id.take().is_some() {
            self.notify();
        }
    }
}

impl<K: Clone, L: Clone, D: Clone> DragSession<K, L, D> {
    pub fn snapshot(&self) -> DragSnapshot<K, L, D> {
        self.state.clone()
    }
}

impl<K: core::fmt::Debug, L: core::fmt::Debug, D: core::fmt::Debug> core::fmt::Debug
    for DragSession<K, L, D>
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DragSession")
            .field("state", &self.state)
            .field("options", &self.options)
            .field("drop_pending_since_ms", &self.drop_pending_since_ms)
            .finish_non_exhaustive()
    }
}
