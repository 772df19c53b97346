use alloc::vec::Vec;
use core::cell::{Cell, Ref, RefCell};
use core::cmp;

use crate::fenwick::Fenwick;
use crate::key::{ItemKey, KeyMap};

/// Per-list model of item heights and cumulative offsets.
///
/// Heights are keyed by stable item keys so measurements follow items across reordering. The
/// offset index (a Fenwick tree over per-index heights) is rebuilt lazily after the key order
/// changes; single measurements on a clean index are applied in place in `O(log n)`.
///
/// While an item is being dragged out of this list, [`Self::set_excluded_index`] collapses it:
/// offsets after it shrink by its height and index lookups skip it, but
/// [`Self::get_total_height`] keeps counting it so the scroll spacer does not shrink.
#[derive(Clone, Debug)]
pub struct HeightCache<K> {
    keys: Vec<K>,
    measured: KeyMap<K, u32>,
    estimate: u32,
    excluded: Option<usize>,
    layout: RefCell<Layout<K>>,
    dirty: Cell<bool>,
}

#[derive(Clone, Debug)]
struct Layout<K> {
    heights: Vec<u32>,
    sums: Fenwick,
    positions: KeyMap<K, usize>,
    has_duplicate_keys: bool,
}

impl<K: ItemKey> Layout<K> {
    fn empty() -> Self {
        Self {
            heights: Vec::new(),
            sums: Fenwick::default(),
            positions: KeyMap::new(),
            has_duplicate_keys: false,
        }
    }

    fn len(&self) -> usize {
        self.heights.len()
    }

    fn offset(&self, index: usize, excluded: Option<usize>) -> u64 {
        let index = cmp::min(index, self.len());
        let offset = self.sums.prefix_sum(index);
        match excluded {
            Some(e) if e < self.len() && index > e => {
                offset.saturating_sub(u64::from(self.heights[e]))
            }
            _ => offset,
        }
    }

    fn index_at(&self, offset: u64, excluded: Option<usize>) -> usize {
        let n = self.len();
        if n == 0 {
            return 0;
        }
        let last = n - 1;
        let Some(e) = excluded.filter(|&e| e < n) else {
            return cmp::min(self.sums.lower_bound(offset), last);
        };

        let idx = if offset < self.sums.prefix_sum(e) {
            self.sums.lower_bound(offset)
        } else {
            // Re-expand the collapsed coordinate so the excluded span is stepped over.
            let expanded = offset.saturating_add(u64::from(self.heights[e]));
            cmp::max(self.sums.lower_bound(expanded), e + 1)
        };
        let idx = cmp::min(idx, last);
        if idx != e {
            idx
        } else if e < last {
            e + 1
        } else {
            e.saturating_sub(1)
        }
    }
}

impl<K: ItemKey> HeightCache<K> {
    /// Creates an empty cache that uses `estimate` for unmeasured items.
    pub fn new(estimate: u32) -> Self {
        Self {
            keys: Vec::new(),
            measured: KeyMap::new(),
            estimate,
            excluded: None,
            layout: RefCell::new(Layout::empty()),
            dirty: Cell::new(false),
        }
    }

    pub fn with_keys(estimate: u32, keys: impl IntoIterator<Item = K>) -> Self {
        let mut cache = Self::new(estimate);
        cache.set_keys(keys);
        cache
    }

    /// Replaces the ordered key list. Call this whenever the underlying array is replaced.
    ///
    /// Measured heights are kept for keys that survive the replacement.
    pub fn set_keys(&mut self, keys: impl IntoIterator<Item = K>) {
        self.keys.clear();
        self.keys.extend(keys);
        ddebug!(count = self.keys.len(), "HeightCache::set_keys");
        self.dirty.set(true);
    }

    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn key_at(&self, index: usize) -> Option<&K> {
        self.keys.get(index)
    }

    pub fn index_of(&self, key: &K) -> Option<usize> {
        let layout = self.layout();
        if layout.has_duplicate_keys {
            return self.keys.iter().position(|k| k == key);
        }
        layout.positions.get(key).copied()
    }

    pub fn estimate(&self) -> u32 {
        self.estimate
    }

    pub fn set_estimate(&mut self, estimate: u32) {
        if self.estimate == estimate {
            return;
        }
        self.estimate = estimate;
        self.dirty.set(true);
    }

    /// Records a measured height. Returns `false` when the height is unchanged.
    pub fn set_height(&mut self, key: K, height: u32) -> bool {
        if self.measured.get(&key) == Some(&height) {
            return false;
        }
        dtrace!(height, "HeightCache::set_height");

        if !self.dirty.get() {
            let layout = self.layout.get_mut();
            if layout.has_duplicate_keys {
                self.dirty.set(true);
            } else if let Some(&index) = layout.positions.get(&key) {
                let cur = layout.heights[index];
                layout.heights[index] = height;
                layout.sums.add(index, i64::from(height) - i64::from(cur));
            }
        }
        self.measured.insert(key, height);
        true
    }

    pub fn is_measured(&self, key: &K) -> bool {
        self.measured.contains_key(key)
    }

    /// Forgets all measured heights; every item falls back to the estimate.
    pub fn reset_measurements(&mut self) {
        self.measured.clear();
        self.dirty.set(true);
    }

    /// Measured height of the item at `index`, or the estimate.
    pub fn get_height(&self, index: usize) -> u32 {
        self.layout()
            .heights
            .get(index)
            .copied()
            .unwrap_or(self.estimate)
    }

    /// Cumulative height of all items before `index`, with the excluded item collapsed.
    pub fn get_offset(&self, index: usize) -> u64 {
        self.layout().offset(index, self.excluded)
    }

    /// Total content height of the first `item_count` items, including the excluded item.
    ///
    /// Items beyond the known key list count at the estimate.
    pub fn get_total_height(&self, item_count: usize) -> u64 {
        let layout = self.layout();
        let known = cmp::min(item_count, layout.len());
        let extra = (item_count - known) as u64;
        layout
            .sums
            .prefix_sum(known)
            .saturating_add(extra.saturating_mul(u64::from(self.estimate)))
    }

    /// Index of the item whose span contains `scroll_top`.
    pub fn find_first_visible_index(&self, scroll_top: u64) -> usize {
        self.find_index_at_offset(scroll_top)
    }

    /// Number of indexes starting at `start_index` needed to cover `container_height`, plus one
    /// for a partially visible trailing item. The excluded item contributes no height.
    pub fn get_visible_count(&self, start_index: usize, container_height: u64) -> usize {
        let layout = self.layout();
        let n = layout.len();
        if container_height == 0 || start_index >= n {
            return 0;
        }
        let mut covered = 0u64;
        let mut i = start_index;
        while i < n && covered < container_height {
            if self.excluded != Some(i) {
                covered = covered.saturating_add(u64::from(layout.heights[i]));
            }
            i += 1;
        }
        cmp::min(i - start_index + 1, n - start_index)
    }

    /// Index of the item whose span contains `offset`, skipping the excluded item.
    ///
    /// Offsets past the end map to the last item; an empty cache returns `0`.
    pub fn find_index_at_offset(&self, offset: u64) -> usize {
        self.layout().index_at(offset, self.excluded)
    }

    pub fn set_excluded_index(&mut self, index: Option<usize>) {
        if self.excluded == index {
            return;
        }
        ddebug!(?index, "HeightCache::set_excluded_index");
        self.excluded = index;
    }

    pub fn excluded_index(&self) -> Option<usize> {
        self.excluded
    }

    /// Offset of `index` with `excluded` collapsed, regardless of the cache's own exclusion.
    pub(crate) fn offset_collapsing(&self, index: usize, excluded: Option<usize>) -> u64 {
        self.layout().offset(index, excluded)
    }

    /// Index lookup with `excluded` skipped, regardless of the cache's own exclusion.
    pub(crate) fn index_at_collapsing(&self, offset: u64, excluded: Option<usize>) -> usize {
        self.layout().index_at(offset, excluded)
    }

    fn layout(&self) -> Ref<'_, Layout<K>> {
        if self.dirty.get() {
            self.rebuild();
        }
        self.layout.borrow()
    }

    fn rebuild(&self) {
        let mut layout = self.layout.borrow_mut();
        layout.heights.clear();
        layout.heights.reserve_exact(self.keys.len());
        layout.positions.clear();
        layout.has_duplicate_keys = false;
        for (i, key) in self.keys.iter().enumerate() {
            let height = self.measured.get(key).copied().unwrap_or(self.estimate);
            layout.heights.push(height);
            if layout.positions.insert(key.clone(), i).is_some() {
                layout.has_duplicate_keys = true;
            }
        }
        layout.sums = Fenwick::from_heights(&layout.heights);
        dtrace!(count = layout.heights.len(), "HeightCache::rebuild");
        self.dirty.set(false);
    }
}
