use crate::{DragSession, DragStart, DragUpdate, DraggedItem, PlaceholderKey};

/// Discrete (arrow-key) drag navigation layered on a [`DragSession`].
///
/// `target_index` and `total_item_count` count the items the user sees in the active list: in the
/// source list the dragged item is hidden and not counted. When resolving the placeholder for the
/// source list, targets at or past the source index shift by one so the session always reports
/// indexes into the list's current order.
///
/// `key_at(i)` must return the key at index `i` of the active list's current order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeyboardDragController {
    target_index: usize,
    total_item_count: usize,
}

impl KeyboardDragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target_index(&self) -> usize {
        self.target_index
    }

    pub fn total_item_count(&self) -> usize {
        self.total_item_count
    }

    /// Starts a keyboard drag with the placeholder on the item's own position.
    ///
    /// `total_item_count` excludes the dragged item.
    pub fn start<K: Clone, L: Clone + PartialEq, D>(
        &mut self,
        session: &mut DragSession<K, L, D>,
        item: DraggedItem<K, L, D>,
        source_index: usize,
        total_item_count: usize,
        key_at: impl Fn(usize) -> Option<K>,
    ) -> bool {
        if session.is_dragging() {
            return false;
        }
        let list_id = item.list_id.clone();
        self.total_item_count = total_item_count;
        self.target_index = source_index.min(total_item_count);

        let index = resolve_index(self.target_index, true, Some(source_index));
        let key = placeholder_key(index, &key_at);
        session.start_drag(
            DragStart::new(item)
                .keyboard()
                .with_active_list(list_id)
                .with_source_index(source_index)
                .with_placeholder(index, key),
        )
    }

    pub fn move_up<K: Clone, L: Clone + PartialEq, D>(
        &mut self,
        session: &mut DragSession<K, L, D>,
        key_at: impl Fn(usize) -> Option<K>,
    ) {
        if !self.is_active_for(session) {
            return;
        }
        self.target_index = self.target_index.saturating_sub(1);
        self.apply(session, &key_at);
    }

    pub fn move_down<K: Clone, L: Clone + PartialEq, D>(
        &mut self,
        session: &mut DragSession<K, L, D>,
        key_at: impl Fn(usize) -> Option<K>,
    ) {
        if !self.is_active_for(session) {
            return;
        }
        self.target_index = (self.target_index + 1).min(self.total_item_count);
        self.apply(session, &key_at);
    }

    /// Hands the drag to another list (or re-targets the current one).
    pub fn move_to_droppable<K: Clone, L: Clone + PartialEq, D>(
        &mut self,
        session: &mut DragSession<K, L, D>,
        list_id: L,
        target_index: usize,
        total_item_count: usize,
        key_at: impl Fn(usize) -> Option<K>,
    ) {
        if !self.is_active_for(session) {
            return;
        }
        self.total_item_count = total_item_count;
        self.target_index = target_index.min(total_item_count);
        let same_list = session.source_list_id() == Some(&list_id);
        let index = resolve_index(self.target_index, same_list, session.source_index());
        let key = placeholder_key(index, &key_at);
        session.update_drag_position(DragUpdate {
            cursor: None,
            active_list_id: Some(list_id),
            placeholder_key: Some(key),
            placeholder_index: Some(index),
        });
    }

    pub fn complete<K: Clone, L, D>(&mut self, session: &mut DragSession<K, L, D>, now_ms: u64) {
        if !self.is_active_for(session) {
            return;
        }
        session.end_drag(now_ms);
        *self = Self::default();
    }

    pub fn cancel<K, L, D>(&mut self, session: &mut DragSession<K, L, D>) {
        if !self.is_active_for(session) {
            return;
        }
        session.cancel_drag();
        *self = Self::default();
    }

    fn is_active_for<K, L, D>(&self, session: &DragSession<K, L, D>) -> bool {
        session.is_dragging() && session.is_keyboard_drag()
    }

    fn apply<K: Clone, L: Clone + PartialEq, D>(
        &self,
        session: &mut DragSession<K, L, D>,
        key_at: &impl Fn(usize) -> Option<K>,
    ) {
        let Some(list_id) = session.active_list_id().cloned() else {
            return;
        };
        let same_list = session.source_list_id() == Some(&list_id);
        let index = resolve_index(self.target_index, same_list, session.source_index());
        let key = placeholder_key(index, key_at);
        dtrace!(target_index = self.target_index, index, "keyboard move");
        session.update_drag_position(DragUpdate {
            cursor: None,
            active_list_id: Some(list_id),
            placeholder_key: Some(key),
            placeholder_index: Some(index),
        });
    }
}

fn resolve_index(target: usize, same_list: bool, source_index: Option<usize>) -> usize {
    match source_index {
        Some(s) if same_list && target >= s => target + 1,
        _ => target,
    }
}

fn placeholder_key<K>(index: usize, key_at: &impl Fn(usize) -> Option<K>) -> PlaceholderKey<K> {
    key_at(index).map_or(PlaceholderKey::EndOfList, PlaceholderKey::Before)
}
