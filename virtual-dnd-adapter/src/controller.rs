use alloc::vec::Vec;

use virtual_dnd::geometry::{clamp_point, contains};
use virtual_dnd::{
    AutoScrollController, AxisLock, ContainerGeometry, DragPhase, DragSession, DragStart,
    DragUpdate, DraggedItem, DropResult, ItemKey, KeyboardDragController, ListStrategy,
    PlaceholderIndexCalculator, PlaceholderKey, PlaceholderOptions, PlaceholderQuery, Point,
    ScrollContainer, ScrollMetrics, TickOutcome,
};

use crate::{
    DndOptions, DragEndEvent, DragEvent, DragMoveEvent, DragStartEvent, DropDestination,
    DropEvent, DropSource, KeyboardCommand, ListConfig, PointerCoalescer,
};

#[derive(Clone, Debug)]
struct ListEntry<K, L> {
    id: L,
    strategy: ListStrategy<K>,
    constrain_to_container: bool,
}

impl<K: ItemKey, L: PartialEq> ListEntry<K, L> {
    /// Items the user sees in this list; the dragged item is hidden in its own list.
    fn visible_count<D>(&self, session: &DragSession<K, L, D>) -> usize {
        let hidden = session.source_list_id() == Some(&self.id) && session.source_index().is_some();
        self.strategy.len().saturating_sub(usize::from(hidden))
    }
}

/// A framework-neutral controller that wires a [`DragSession`] to registered virtualized lists.
///
/// This type does not hold any UI objects. Adapters drive it by calling:
/// - `register_list` once per droppable list, and `container_mut` / `on_scroll` when a list's
///   container moves or scrolls
/// - `start_pointer_drag`, `on_pointer_move`, `end_pointer_drag` from pointer events
/// - `tick(now_ms)` every animation frame while [`TickOutcome::should_reschedule`] holds
///
/// Each list's scroll container `C` doubles as its auto-scroll container, so the geometry used for
/// hit-testing and placeholder math is the same geometry auto-scroll writes to.
pub struct DndController<K, L, D = (), C = ScrollMetrics> {
    options: DndOptions<K, L, D>,
    session: DragSession<K, L, D>,
    keyboard: KeyboardDragController,
    calculator: PlaceholderIndexCalculator,
    lists: Vec<ListEntry<K, L>>,
    scroller: AutoScrollController<L, C>,
    coalescer: PointerCoalescer,
    reported: Option<(Option<L>, Option<usize>)>,
}

impl<K, L, D, C> DndController<K, L, D, C> {
    pub fn new(options: DndOptions<K, L, D>) -> Self {
        Self {
            session: DragSession::new(options.session),
            calculator: PlaceholderIndexCalculator::new(options.placeholder),
            options,
            keyboard: KeyboardDragController::default(),
            lists: Vec::new(),
            scroller: AutoScrollController::default(),
            coalescer: PointerCoalescer::default(),
            reported: None,
        }
    }

    pub fn options(&self) -> &DndOptions<K, L, D> {
        &self.options
    }

    pub fn session(&self) -> &DragSession<K, L, D> {
        &self.session
    }

    pub fn set_on_session_change(
        &mut self,
        on_change: Option<impl Fn(&DragSession<K, L, D>) + Send + Sync + 'static>,
    ) {
        self.session.set_on_change(on_change);
    }

    pub fn set_placeholder_options(&mut self, placeholder: PlaceholderOptions) {
        self.options.placeholder = placeholder;
        self.calculator.set_options(placeholder);
    }

    pub fn keyboard(&self) -> &KeyboardDragController {
        &self.keyboard
    }

    pub fn coalescer(&self) -> &PointerCoalescer {
        &self.coalescer
    }

    pub fn phase(&self) -> DragPhase {
        self.session.phase()
    }

    pub fn is_dragging(&self) -> bool {
        self.session.is_dragging()
    }

    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    fn emit(&self, event: DragEvent<K, L, D>) {
        if let Some(cb) = &self.options.on_event {
            cb(&event);
        }
    }
}

impl<K, L, D, C> Default for DndController<K, L, D, C> {
    fn default() -> Self {
        Self::new(DndOptions::default())
    }
}

impl<K: ItemKey, L: Clone + PartialEq, D: Clone, C: ScrollContainer> DndController<K, L, D, C> {
    /// Registers (or replaces) a droppable list.
    ///
    /// Registration order is the order used for hit-testing and for keyboard `Left`/`Right`.
    pub fn register_list(
        &mut self,
        id: L,
        strategy: ListStrategy<K>,
        container: C,
        config: ListConfig,
    ) {
        ddebug!(
            len = strategy.len(),
            constrain = config.constrain_to_container,
            "DndController::register_list"
        );
        self.scroller
            .register_container(id.clone(), container, Some(config.scroll_config()));
        let entry = ListEntry {
            id,
            strategy,
            constrain_to_container: config.constrain_to_container,
        };
        match self.lists.iter().position(|e| e.id == entry.id) {
            Some(pos) => self.lists[pos] = entry,
            None => self.lists.push(entry),
        }
    }

    pub fn unregister_list(&mut self, id: &L) -> Option<(ListStrategy<K>, C)> {
        let pos = self.lists.iter().position(|e| &e.id == id)?;
        ddebug!("DndController::unregister_list");
        let entry = self.lists.remove(pos);
        let container = self.scroller.unregister_container(id)?;
        Some((entry.strategy, container))
    }

    pub fn list(&self, id: &L) -> Option<&ListStrategy<K>> {
        self.lists.iter().find(|e| &e.id == id).map(|e| &e.strategy)
    }

    /// Mutable access for key replacement and height measurement.
    pub fn list_mut(&mut self, id: &L) -> Option<&mut ListStrategy<K>> {
        self.lists
            .iter_mut()
            .find(|e| &e.id == id)
            .map(|e| &mut e.strategy)
    }

    pub fn container(&self, id: &L) -> Option<&C> {
        self.scroller.container(id)
    }

    /// Mutable access for mirroring container metrics (rect, content size) from the UI.
    pub fn container_mut(&mut self, id: &L) -> Option<&mut C> {
        self.scroller.container_mut(id)
    }

    /// The UI scrolled a list container. Recomputes the placeholder during a pointer drag.
    pub fn on_scroll(&mut self, id: &L, scroll_top: f64) {
        let Some(container) = self.scroller.container_mut(id) else {
            return;
        };
        container.set_scroll_top(scroll_top);
        if self.is_pointer_drag() {
            retarget(
                &mut self.session,
                &self.lists,
                &self.scroller,
                &self.calculator,
            );
            self.report_move();
        }
    }

    /// Starts a pointer drag for `item`, picked up with the pointer at `cursor` while the item's
    /// element had its top-left corner at `item_origin`.
    pub fn start_pointer_drag(
        &mut self,
        item: DraggedItem<K, L, D>,
        cursor: Point,
        item_origin: Point,
        axis_lock: Option<AxisLock>,
    ) -> bool {
        if self.session.is_dragging() {
            dwarn!("DndController::start_pointer_drag while a drag is already active; ignoring");
            return false;
        }
        let source_index = self.list(&item.list_id).and_then(|l| l.index_of(&item.id));
        let mut start = DragStart::new(item)
            .with_cursor(cursor)
            .with_grab_offset(cursor.offset_from(item_origin))
            .with_axis_lock(axis_lock);
        start.source_index = source_index;
        if let Some(index) = source_index {
            // The placeholder starts on the item's own slot, so an immediate drop is a no-op.
            let key = PlaceholderKey::Before(start.item.id.clone());
            let list_id = start.item.list_id.clone();
            start = start.with_active_list(list_id).with_placeholder(index, key);
        }
        if !self.begin(start) {
            return false;
        }
        self.scroller.start_monitoring();
        retarget(
            &mut self.session,
            &self.lists,
            &self.scroller,
            &self.calculator,
        );
        self.report_move();
        true
    }

    /// Buffers a pointer move; it is applied on the next [`Self::tick`] or drop.
    pub fn on_pointer_move(&mut self, cursor: Point) {
        if self.is_pointer_drag() {
            self.coalescer.push(cursor);
        }
    }

    /// Advances one animation frame: applies the latest pointer move, runs auto-scroll (placeholder
    /// recomputed in the same frame when the active list scrolled) and the drop-pending timer.
    pub fn tick(&mut self, now_ms: u64) -> TickOutcome {
        if let Some(cursor) = self.coalescer.flush() {
            if self.is_pointer_drag() {
                self.apply_pointer(cursor);
            }
        }

        let dragging = self.session.is_dragging();
        let cursor = self.session.effective_cursor();
        let clamped = clamped_cursor(&self.session, &self.lists, &self.scroller);
        self.scroller.set_cursor_override(clamped);
        let session = &mut self.session;
        let lists = &self.lists;
        let calculator = &self.calculator;
        let outcome = self.scroller.tick(dragging, cursor, |id, container| {
            if session.active_list_id() != Some(id) {
                return;
            }
            let Some(entry) = lists.iter().find(|e| &e.id == id) else {
                return;
            };
            let Some(mut cursor) = session.effective_cursor() else {
                return;
            };
            let rect = container.rect();
            if entry.constrain_to_container {
                cursor = clamp_point(&rect, cursor);
            }
            let geometry = ContainerGeometry::from_rect(rect, container.scroll_top());
            let update = target_update(calculator, entry, session, cursor, geometry);
            session.update_drag_position(update);
        });
        self.report_move();
        self.session.update_timers(now_ms);
        outcome
    }

    /// Drops the pointer drag at its current target.
    ///
    /// Returns the drop result when the drag was over a list; dropping outside every list ends the
    /// drag without one.
    pub fn end_pointer_drag(&mut self, now_ms: u64) -> Option<DropResult<K, L>> {
        if !self.is_pointer_drag() {
            return None;
        }
        if let Some(cursor) = self.coalescer.flush() {
            self.apply_pointer(cursor);
        }
        self.finish(now_ms)
    }

    /// Aborts the active drag (pointer or keyboard); the source list keeps its order.
    pub fn cancel_drag(&mut self) {
        if !self.session.is_dragging() {
            return;
        }
        let source_list_id = self.session.source_list_id().cloned();
        if let Some(item) = self.session.dragged_item() {
            let event = DragEvent::DragEnd(DragEndEvent {
                item_id: item.id.clone(),
                list_id: item.list_id.clone(),
                cancelled: true,
                data: item.data.clone(),
                source_index: self.session.source_index(),
                destination_index: None,
            });
            self.emit(event);
        }
        if self.session.is_keyboard_drag() {
            self.keyboard.cancel(&mut self.session);
        } else {
            self.session.cancel_drag();
        }
        self.release(source_list_id.as_ref());
    }

    /// The destination finished re-rendering the dropped item.
    pub fn complete_drop_transition(&mut self) {
        self.session.complete_drop_transition();
    }

    /// Starts a keyboard drag with the placeholder on the item's own position.
    pub fn start_keyboard_drag(&mut self, item: DraggedItem<K, L, D>) -> bool {
        if self.session.is_dragging() {
            dwarn!("DndController::start_keyboard_drag while a drag is already active; ignoring");
            return false;
        }
        let Some(entry) = self.lists.iter().find(|e| e.id == item.list_id) else {
            dwarn!("DndController::start_keyboard_drag for an unregistered list");
            return false;
        };
        let Some(source_index) = entry.strategy.index_of(&item.id) else {
            dwarn!("DndController::start_keyboard_drag for an item missing from its list");
            return false;
        };
        let visible = entry.strategy.len().saturating_sub(1);
        let event = start_event(&item, None, Some(source_index));
        let list_id = item.list_id.clone();
        let strategy = &entry.strategy;
        if !self.keyboard.start(&mut self.session, item, source_index, visible, |i| {
            strategy.key_at(i).cloned()
        }) {
            return false;
        }
        self.after_start(&list_id, Some(source_index), event);
        self.report_move();
        true
    }

    /// Applies a keyboard command to the active keyboard drag.
    ///
    /// Returns `false` (and does nothing) when no keyboard drag is active.
    pub fn handle_key(&mut self, command: KeyboardCommand, now_ms: u64) -> bool {
        if !(self.session.is_dragging() && self.session.is_keyboard_drag()) {
            return false;
        }
        match command {
            KeyboardCommand::Up | KeyboardCommand::Down => {
                let active = self.session.active_list_id();
                let Some(entry) = self.lists.iter().find(|e| Some(&e.id) == active) else {
                    return true;
                };
                let key_at = |i: usize| entry.strategy.key_at(i).cloned();
                if command == KeyboardCommand::Up {
                    self.keyboard.move_up(&mut self.session, key_at);
                } else {
                    self.keyboard.move_down(&mut self.session, key_at);
                }
            }
            KeyboardCommand::Left | KeyboardCommand::Right => {
                let active = self.session.active_list_id();
                let Some(pos) = self.lists.iter().position(|e| Some(&e.id) == active) else {
                    return true;
                };
                let next = if command == KeyboardCommand::Right {
                    pos.checked_add(1)
                } else {
                    pos.checked_sub(1)
                };
                let Some(entry) = next.and_then(|i| self.lists.get(i)) else {
                    return true;
                };
                let visible = entry.visible_count(&self.session);
                let target = self.keyboard.target_index().min(visible);
                self.keyboard.move_to_droppable(
                    &mut self.session,
                    entry.id.clone(),
                    target,
                    visible,
                    |i| entry.strategy.key_at(i).cloned(),
                );
            }
            KeyboardCommand::Confirm => {
                self.finish(now_ms);
                return true;
            }
            KeyboardCommand::Cancel => {
                self.cancel_drag();
                return true;
            }
        }
        self.report_move();
        true
    }

    fn is_pointer_drag(&self) -> bool {
        self.session.is_dragging() && !self.session.is_keyboard_drag()
    }

    fn begin(&mut self, start: DragStart<K, L, D>) -> bool {
        let event = start_event(&start.item, start.cursor, start.source_index);
        let list_id = start.item.list_id.clone();
        let source_index = start.source_index;
        if !self.session.start_drag(start) {
            return false;
        }
        self.after_start(&list_id, source_index, event);
        true
    }

    fn after_start(
        &mut self,
        list_id: &L,
        source_index: Option<usize>,
        event: DragStartEvent<K, L, D>,
    ) {
        if let Some(strategy) = self.list_mut(list_id) {
            strategy.set_excluded_index(source_index);
        }
        self.coalescer.clear();
        self.reported = None;
        self.emit(DragEvent::DragStart(event));
    }

    fn apply_pointer(&mut self, cursor: Point) {
        let lists = &self.lists;
        let scroller = &self.scroller;
        let calculator = &self.calculator;
        self.session.batch_update(|session| {
            session.update_drag_position(DragUpdate {
                cursor: Some(cursor),
                active_list_id: session.active_list_id().cloned(),
                placeholder_key: session.placeholder_key().cloned(),
                placeholder_index: session.placeholder_index(),
            });
            retarget(session, lists, scroller, calculator);
        });
        self.report_move();
    }

    fn finish(&mut self, now_ms: u64) -> Option<DropResult<K, L>> {
        let snapshot = self.session.snapshot();
        let item = snapshot.dragged_item.clone()?;
        let result = snapshot.drop_result();
        ddebug!(
            dropped = result.is_some(),
            source_index = ?snapshot.source_index,
            "DndController: drop"
        );

        if let Some(dropped) = &result {
            self.emit(DragEvent::Drop(DropEvent {
                source: DropSource {
                    item_id: dropped.item_id.clone(),
                    list_id: dropped.source_list_id.clone(),
                    index: dropped.source_index,
                    data: item.data.clone(),
                },
                destination: DropDestination {
                    list_id: dropped.destination_list_id.clone(),
                    placeholder_key: dropped.placeholder_key.clone(),
                    index: dropped.destination_index(),
                    data: item.data.clone(),
                },
            }));
        }
        self.emit(DragEvent::DragEnd(DragEndEvent {
            item_id: item.id,
            list_id: item.list_id,
            cancelled: false,
            data: item.data,
            source_index: snapshot.source_index,
            destination_index: result.as_ref().map(DropResult::destination_index),
        }));

        if self.session.is_keyboard_drag() {
            self.keyboard.complete(&mut self.session, now_ms);
        } else {
            self.session.end_drag(now_ms);
        }
        self.release(snapshot.source_list_id.as_ref());
        result
    }

    fn release(&mut self, source_list_id: Option<&L>) {
        if let Some(strategy) = source_list_id.and_then(|id| self.list_mut(id)) {
            strategy.set_excluded_index(None);
        }
        self.scroller.stop_monitoring();
        self.coalescer.clear();
        self.reported = None;
    }

    /// Emits `DragMove` when the target list or index differs from the last report.
    fn report_move(&mut self) {
        if !self.session.is_dragging() {
            return;
        }
        let current = (
            self.session.active_list_id().cloned(),
            self.session.placeholder_index(),
        );
        if self.reported.as_ref() == Some(&current) {
            return;
        }
        let Some(item) = self.session.dragged_item() else {
            return;
        };
        let event = DragEvent::DragMove(DragMoveEvent {
            item_id: item.id.clone(),
            source_list_id: self
                .session
                .source_list_id()
                .cloned()
                .unwrap_or_else(|| item.list_id.clone()),
            target_list_id: current.0.clone(),
            placeholder_key: self.session.placeholder_key().cloned(),
            position: self.session.cursor_position(),
            target_index: current.1,
        });
        dtrace!(target_index = ?current.1, "DndController: drag target changed");
        self.reported = Some(current);
        self.emit(event);
    }
}

impl<K: core::fmt::Debug, L: core::fmt::Debug, D: core::fmt::Debug, C: core::fmt::Debug>
    core::fmt::Debug for DndController<K, L, D, C>
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DndController")
            .field("options", &self.options)
            .field("session", &self.session)
            .field("keyboard", &self.keyboard)
            .field("lists", &self.lists)
            .field("scroller", &self.scroller)
            .finish_non_exhaustive()
    }
}

fn start_event<K: Clone, L: Clone, D: Clone>(
    item: &DraggedItem<K, L, D>,
    position: Option<Point>,
    source_index: Option<usize>,
) -> DragStartEvent<K, L, D> {
    DragStartEvent {
        item_id: item.id.clone(),
        list_id: item.list_id.clone(),
        data: item.data.clone(),
        position,
        source_index,
    }
}

/// Resolves the list under the session's cursor and writes the new target into the session.
fn retarget<K: ItemKey, L: Clone + PartialEq, D, C: ScrollContainer>(
    session: &mut DragSession<K, L, D>,
    lists: &[ListEntry<K, L>],
    scroller: &AutoScrollController<L, C>,
    calculator: &PlaceholderIndexCalculator,
) {
    let Some(cursor) =
        clamped_cursor(session, lists, scroller).or_else(|| session.effective_cursor())
    else {
        return;
    };
    let hit = lists.iter().find_map(|entry| {
        let container = scroller.container(&entry.id)?;
        let rect = container.rect();
        contains(&rect, cursor)
            .then(|| (entry, ContainerGeometry::from_rect(rect, container.scroll_top())))
    });
    let update = match hit {
        Some((entry, geometry)) => target_update(calculator, entry, session, cursor, geometry),
        None => DragUpdate {
            cursor: None,
            active_list_id: None,
            placeholder_key: None,
            placeholder_index: None,
        },
    };
    session.update_drag_position(update);
}

/// The effective cursor held inside the active list's container when that list is constrained.
fn clamped_cursor<K, L: PartialEq, D, C: ScrollContainer>(
    session: &DragSession<K, L, D>,
    lists: &[ListEntry<K, L>],
    scroller: &AutoScrollController<L, C>,
) -> Option<Point> {
    let id = session.active_list_id()?;
    let entry = lists.iter().find(|e| &e.id == id)?;
    if !entry.constrain_to_container {
        return None;
    }
    let container = scroller.container(id)?;
    Some(clamp_point(&container.rect(), session.effective_cursor()?))
}

fn target_update<K: ItemKey, L: Clone + PartialEq, D>(
    calculator: &PlaceholderIndexCalculator,
    entry: &ListEntry<K, L>,
    session: &DragSession<K, L, D>,
    cursor: Point,
    geometry: ContainerGeometry,
) -> DragUpdate<K, L> {
    let same_list = session.source_list_id() == Some(&entry.id);
    let previous_index = if session.active_list_id() == Some(&entry.id) {
        session.placeholder_index()
    } else {
        None
    };
    let query = PlaceholderQuery::new(Some(geometry), cursor)
        .with_grab_offset(session.grab_offset().unwrap_or(Point::ZERO))
        .with_dragged_height(session.dragged_item().map_or(0.0, |item| item.height))
        .with_source(same_list, session.source_index())
        .with_constrain_to_container(entry.constrain_to_container)
        .with_previous_index(previous_index);
    let result = calculator.calculate(&entry.strategy, &query);
    DragUpdate {
        cursor: None,
        active_list_id: Some(entry.id.clone()),
        placeholder_key: Some(result.key),
        placeholder_index: Some(result.index),
    }
}
