use crate::geometry::{fixed_index_at_offset, to_offset};
use crate::key::ItemKey;
use crate::{ContainerGeometry, ListStrategy, PlaceholderKey, Point};

/// Tuning for [`PlaceholderIndexCalculator`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlaceholderOptions {
    /// How far past an item's midpoint the preview's top edge must travel, in either direction,
    /// before that item is displaced. A fraction of the smaller of the dragged item's height and
    /// the hovered item's height.
    ///
    /// `0.0` disables hysteresis (pure midpoint rule).
    pub hysteresis_fraction: f64,
}

impl Default for PlaceholderOptions {
    fn default() -> Self {
        Self {
            hysteresis_fraction: 0.25,
        }
    }
}

impl PlaceholderOptions {
    pub fn with_hysteresis_fraction(mut self, fraction: f64) -> Self {
        self.hysteresis_fraction = fraction;
        self
    }
}

/// Drag geometry for one placeholder computation against one target list.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlaceholderQuery {
    /// The target list's scroll container. `None` yields index `0`.
    pub container: Option<ContainerGeometry>,
    pub cursor: Point,
    /// Cursor minus the dragged element's top-left corner at grab time.
    pub grab_offset: Point,
    pub dragged_height: f64,
    /// Whether the target list is the list the drag started from.
    pub same_list: bool,
    pub source_index: Option<usize>,
    /// Clamp the preview inside the container; when pinned to the bottom, its bottom bound decides.
    pub constrain_to_container: bool,
    /// The placeholder index this list reported on the previous computation, if any.
    pub previous_index: Option<usize>,
}

impl PlaceholderQuery {
    pub fn new(container: Option<ContainerGeometry>, cursor: Point) -> Self {
        Self {
            container,
            cursor,
            grab_offset: Point::ZERO,
            dragged_height: 0.0,
            same_list: false,
            source_index: None,
            constrain_to_container: false,
            previous_index: None,
        }
    }

    pub fn with_grab_offset(mut self, grab_offset: Point) -> Self {
        self.grab_offset = grab_offset;
        self
    }

    pub fn with_dragged_height(mut self, height: f64) -> Self {
        self.dragged_height = height;
        self
    }

    pub fn with_source(mut self, same_list: bool, source_index: Option<usize>) -> Self {
        self.same_list = same_list;
        self.source_index = source_index;
        self
    }

    pub fn with_constrain_to_container(mut self, constrain: bool) -> Self {
        self.constrain_to_container = constrain;
        self
    }

    pub fn with_previous_index(mut self, previous_index: Option<usize>) -> Self {
        self.previous_index = previous_index;
        self
    }
}

/// Insertion point produced by [`PlaceholderIndexCalculator::calculate`].
///
/// `index` is a gap index into the target list's current order (source item still included),
/// in `0..=len`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlaceholderResult<K> {
    pub index: usize,
    pub key: PlaceholderKey<K>,
}

/// Converts drag geometry into an insertion index without DOM hit-testing.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlaceholderIndexCalculator {
    options: PlaceholderOptions,
}

impl PlaceholderIndexCalculator {
    pub fn new(options: PlaceholderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &PlaceholderOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: PlaceholderOptions) {
        self.options = options;
    }

    pub fn calculate<K: ItemKey>(
        &self,
        list: &ListStrategy<K>,
        query: &PlaceholderQuery,
    ) -> PlaceholderResult<K> {
        let len = list.len();
        let hidden = query
            .source_index
            .filter(|&s| query.same_list && s < len);
        let slots = Slots { list, hidden };

        let Some(container) = query.container.filter(is_usable) else {
            dtrace!("placeholder: no usable container geometry");
            return result_at(list, 0);
        };

        let gap = slots.resolve_gap(&container, query, &self.options);
        let index = slots.to_index(gap).min(len);
        dtrace!(index, gap, len, "placeholder computed");
        result_at(list, index)
    }
}

fn is_usable(c: &ContainerGeometry) -> bool {
    c.top.is_finite() && c.bottom.is_finite() && c.scroll_top.is_finite() && c.height() > 0.0
}

fn result_at<K: ItemKey>(list: &ListStrategy<K>, index: usize) -> PlaceholderResult<K> {
    let key = match list.key_at(index) {
        Some(k) => PlaceholderKey::Before(k.clone()),
        None => PlaceholderKey::EndOfList,
    };
    PlaceholderResult { index, key }
}

/// The target list as the user sees it: the dragged source item (if any) collapsed.
///
/// Slot `v` is the `v`-th visible item; gap `g` sits before slot `g`.
struct Slots<'a, K> {
    list: &'a ListStrategy<K>,
    hidden: Option<usize>,
}

impl<K: ItemKey> Slots<'_, K> {
    fn count(&self) -> usize {
        self.list.len() - usize::from(self.hidden.is_some())
    }

    /// Visible slot/gap to list index: everything at or past the hidden source shifts by one.
    fn to_index(&self, slot: usize) -> usize {
        match self.hidden {
            Some(s) if slot >= s => slot + 1,
            _ => slot,
        }
    }

    fn to_gap(&self, index: usize) -> usize {
        let gap = match self.hidden {
            Some(s) if index > s => index - 1,
            _ => index,
        };
        gap.min(self.count())
    }

    fn top(&self, slot: usize) -> f64 {
        match self.list {
            ListStrategy::Fixed(list) => slot as f64 * f64::from(list.item_height()),
            ListStrategy::Dynamic(cache) => {
                cache.offset_collapsing(self.to_index(slot), self.hidden) as f64
            }
        }
    }

    fn height(&self, slot: usize) -> f64 {
        f64::from(self.list.item_height(self.to_index(slot)))
    }

    /// Slot whose span contains `offset`, clamped to the last slot.
    fn slot_at(&self, offset: f64) -> usize {
        let last = self.count().saturating_sub(1);
        match self.list {
            ListStrategy::Fixed(list) => {
                fixed_index_at_offset(offset, f64::from(list.item_height())).min(last)
            }
            ListStrategy::Dynamic(cache) => {
                let index = cache.index_at_collapsing(to_offset(offset), self.hidden);
                self.to_gap(index).min(last)
            }
        }
    }

    /// Midpoint rule: the gap after every slot whose midpoint lies at or above `offset`.
    fn midpoint_gap(&self, offset: f64) -> usize {
        if self.count() == 0 {
            return 0;
        }
        let slot = self.slot_at(offset);
        let mid = self.top(slot) + self.height(slot) / 2.0;
        if offset >= mid { slot + 1 } else { slot }
    }

    fn resolve_gap(
        &self,
        container: &ContainerGeometry,
        query: &PlaceholderQuery,
        options: &PlaceholderOptions,
    ) -> usize {
        let count = self.count();
        if count == 0 {
            return 0;
        }

        let height = query.dragged_height.max(0.0);
        let to_list = |viewport_y: f64| viewport_y - container.top + container.scroll_top;

        let mut top = query.cursor.y - query.grab_offset.y;
        let mut pinned_to_bottom = false;
        if query.constrain_to_container {
            let max_top = (container.bottom - height).max(container.top);
            top = top.clamp(container.top, max_top);
            pinned_to_bottom = top > container.top && top >= max_top;
        }
        let center = to_list(top + height / 2.0);

        let mut gap = if pinned_to_bottom {
            // The bottom bound sits one pixel past the last covered row.
            self.midpoint_gap(to_list(top + height) - 1.0)
        } else {
            self.leading_edge_gap(to_list(top), height, query, options)
        };

        // At the maximum scroll offset the preview may be unable to reach the last slot's
        // midpoint; a cursor within one row of the bottom edge then means "append".
        let last = count - 1;
        if gap == last && self.slot_at(center) == last {
            let distance_to_bottom = container.bottom - query.cursor.y;
            let list_end = container.top - container.scroll_top + self.top(last) + self.height(last);
            if distance_to_bottom <= self.height(last) && list_end <= container.bottom + 1.0 {
                dtrace!(distance_to_bottom, "placeholder: end-of-list snap");
                gap = count;
            }
        }
        gap.min(count)
    }

    /// Gap for a preview whose top edge sits at list offset `top`.
    ///
    /// With the placeholder open at the current gap, the preview's bottom edge reaches the
    /// rendered midpoint of the row below exactly when its top edge reaches that row's collapsed
    /// midpoint, and its top edge reaches the row above's midpoint at the same place. Both
    /// directions therefore reduce to the midpoint rule at `top`, which for uniform rows is
    /// `floor(center / row_height)`.
    ///
    /// With a previous gap, a row is only displaced once the edge is `margin` past its midpoint,
    /// the same distance in either direction.
    fn leading_edge_gap(
        &self,
        top: f64,
        dragged_height: f64,
        query: &PlaceholderQuery,
        options: &PlaceholderOptions,
    ) -> usize {
        let gap = self.midpoint_gap(top);
        let Some(previous) = query.previous_index.map(|i| self.to_gap(i)) else {
            return gap;
        };

        let hovered = self.height(self.slot_at(top));
        let margin = options.hysteresis_fraction.max(0.0) * dragged_height.min(hovered);
        if margin <= 0.0 {
            return gap;
        }
        let lo = self.midpoint_gap(top - margin);
        let hi = self.midpoint_gap(top + margin);
        previous.max(lo).min(hi)
    }
}
