use virtual_dnd::{PlaceholderKey, Point};

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DragStartEvent<K, L, D> {
    pub item_id: K,
    pub list_id: L,
    pub data: D,
    /// Pointer position at pick-up; `None` for keyboard drags.
    pub position: Option<Point>,
    pub source_index: Option<usize>,
}

/// The drag moved to a different list or placeholder index.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DragMoveEvent<K, L> {
    pub item_id: K,
    pub source_list_id: L,
    /// `None` while the drag is outside every registered list.
    pub target_list_id: Option<L>,
    pub placeholder_key: Option<PlaceholderKey<K>>,
    pub position: Option<Point>,
    /// Gap index into the target list's current order.
    pub target_index: Option<usize>,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DragEndEvent<K, L, D> {
    pub item_id: K,
    pub list_id: L,
    pub cancelled: bool,
    pub data: D,
    pub source_index: Option<usize>,
    /// Final index in the destination list; `None` when cancelled or dropped outside any list.
    pub destination_index: Option<usize>,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DropSource<K, L, D> {
    pub item_id: K,
    pub list_id: L,
    pub index: Option<usize>,
    pub data: D,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DropDestination<K, L, D> {
    pub list_id: L,
    pub placeholder_key: PlaceholderKey<K>,
    /// Final index of the moved item: remove it at `source.index`, then insert it here.
    pub index: usize,
    /// The payload to insert.
    pub data: D,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DropEvent<K, L, D> {
    pub source: DropSource<K, L, D>,
    pub destination: DropDestination<K, L, D>,
}

impl<K, L: PartialEq, D> DropEvent<K, L, D> {
    /// `true` when applying the drop leaves the list unchanged.
    pub fn is_noop(&self) -> bool {
        self.source.list_id == self.destination.list_id
            && self.source.index == Some(self.destination.index)
    }
}

/// Drag lifecycle notifications emitted by [`crate::DndController`].
///
/// A successful drop emits [`DragEvent::Drop`] followed by [`DragEvent::DragEnd`]; a cancelled
/// drag (or a drop outside every list) emits only `DragEnd`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DragEvent<K, L, D = ()> {
    DragStart(DragStartEvent<K, L, D>),
    DragMove(DragMoveEvent<K, L>),
    DragEnd(DragEndEvent<K, L, D>),
    Drop(DropEvent<K, L, D>),
}

impl<K, L, D> DragEvent<K, L, D> {
    pub fn item_id(&self) -> &K {
        match self {
            Self::DragStart(e) => &e.item_id,
            Self::DragMove(e) => &e.item_id,
            Self::DragEnd(e) => &e.item_id,
            Self::Drop(e) => &e.source.item_id,
        }
    }
}
