/// A point in viewport coordinates (pixels).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset_from(self, origin: Self) -> Self {
        Self {
            x: self.x - origin.x,
            y: self.y - origin.y,
        }
    }
}

/// An axis-aligned rectangle in viewport coordinates (pixels).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Restricts preview movement to a single axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AxisLock {
    /// Only horizontal movement; the vertical coordinate stays at its initial value.
    X,
    /// Only vertical movement; the horizontal coordinate stays at its initial value.
    Y,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScrollDirection {
    Forward,
    Backward,
}

impl ScrollDirection {
    pub(crate) fn sign(self) -> f64 {
        match self {
            Self::Forward => 1.0,
            Self::Backward => -1.0,
        }
    }
}

/// Where the placeholder sits: before a concrete item, or after the last one.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PlaceholderKey<K> {
    /// Insert before the item with this key.
    Before(K),
    /// Insert after the final item (the `END_OF_LIST` sentinel).
    EndOfList,
}

impl<K> PlaceholderKey<K> {
    pub fn is_end_of_list(&self) -> bool {
        matches!(self, Self::EndOfList)
    }

    pub fn item_key(&self) -> Option<&K> {
        match self {
            Self::Before(k) => Some(k),
            Self::EndOfList => None,
        }
    }
}

/// Vertical geometry of a droppable list's scroll container.
///
/// `top`/`bottom` are viewport coordinates of the visible container box; `scroll_top` is the
/// container's current scroll offset.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContainerGeometry {
    pub top: f64,
    pub bottom: f64,
    pub scroll_top: f64,
}

impl ContainerGeometry {
    pub const fn new(top: f64, bottom: f64, scroll_top: f64) -> Self {
        Self {
            top,
            bottom,
            scroll_top,
        }
    }

    pub fn from_rect(rect: Rect, scroll_top: f64) -> Self {
        Self {
            top: rect.top,
            bottom: rect.bottom(),
            scroll_top,
        }
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }
}
