use alloc::vec::Vec;

use crate::HeightCache;
use crate::key::ItemKey;

/// A list whose items all share one height.
#[derive(Clone, Debug)]
pub struct FixedHeightList<K> {
    item_height: u32,
    keys: Vec<K>,
}

impl<K: ItemKey> FixedHeightList<K> {
    pub fn new(item_height: u32, keys: impl IntoIterator<Item = K>) -> Self {
        Self {
            item_height,
            keys: keys.into_iter().collect(),
        }
    }

    pub fn item_height(&self) -> u32 {
        self.item_height
    }

    pub fn set_item_height(&mut self, item_height: u32) {
        self.item_height = item_height;
    }

    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    pub fn set_keys(&mut self, keys: impl IntoIterator<Item = K>) {
        self.keys.clear();
        self.keys.extend(keys);
    }
}

/// How a registered list measures its items.
///
/// The placeholder calculator takes the `floor(offset / height)` fast path for
/// [`ListStrategy::Fixed`] and consults the [`HeightCache`] for [`ListStrategy::Dynamic`].
#[derive(Clone, Debug)]
pub enum ListStrategy<K> {
    Fixed(FixedHeightList<K>),
    Dynamic(HeightCache<K>),
}

impl<K: ItemKey> ListStrategy<K> {
    pub fn fixed(item_height: u32, keys: impl IntoIterator<Item = K>) -> Self {
        Self::Fixed(FixedHeightList::new(item_height, keys))
    }

    pub fn dynamic(cache: HeightCache<K>) -> Self {
        Self::Dynamic(cache)
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Fixed(list) => list.keys.len(),
            Self::Dynamic(cache) => cache.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn key_at(&self, index: usize) -> Option<&K> {
        match self {
            Self::Fixed(list) => list.keys.get(index),
            Self::Dynamic(cache) => cache.key_at(index),
        }
    }

    pub fn index_of(&self, key: &K) -> Option<usize> {
        match self {
            Self::Fixed(list) => list.keys.iter().position(|k| k == key),
            Self::Dynamic(cache) => cache.index_of(key),
        }
    }

    pub fn set_keys(&mut self, keys: impl IntoIterator<Item = K>) {
        match self {
            Self::Fixed(list) => list.set_keys(keys),
            Self::Dynamic(cache) => cache.set_keys(keys),
        }
    }

    /// Height of the item at `index` (the estimate for unmeasured dynamic items).
    pub fn item_height(&self, index: usize) -> u32 {
        match self {
            Self::Fixed(list) => list.item_height,
            Self::Dynamic(cache) => cache.get_height(index),
        }
    }

    pub fn height_cache(&self) -> Option<&HeightCache<K>> {
        match self {
            Self::Fixed(_) => None,
            Self::Dynamic(cache) => Some(cache),
        }
    }

    pub fn height_cache_mut(&mut self) -> Option<&mut HeightCache<K>> {
        match self {
            Self::Fixed(_) => None,
            Self::Dynamic(cache) => Some(cache),
        }
    }

    /// Collapses (or restores) the dragged item. Fixed-height lists keep no exclusion state.
    pub fn set_excluded_index(&mut self, index: Option<usize>) {
        if let Self::Dynamic(cache) = self {
            cache.set_excluded_index(index);
        }
    }
}
