//! A headless drag-and-drop engine for virtualized lists.
//!
//! For a framework-neutral controller that wires these pieces together (list registry, pointer
//! coalescing, per-frame ticks, lifecycle events), see the `virtual-dnd-adapter` crate.
//!
//! Dragging inside a virtualized list cannot rely on hit-testing: the item under the cursor may
//! not be rendered, and the dragged item's own element is hidden. This crate computes everything
//! from geometry instead:
//! - [`HeightCache`]: per-list cumulative offsets with fast offset → index lookup, able to
//!   collapse the dragged item
//! - [`PlaceholderIndexCalculator`]: cursor/preview geometry → insertion index
//! - [`AutoScrollController`]: edge-triggered scrolling with acceleration and clamping
//! - [`DragSession`] / [`KeyboardDragController`]: the drag state machine
//!
//! It is UI-agnostic. A UI layer is expected to provide:
//! - container rectangles and scroll offsets
//! - item keys and (optionally) measured heights
//! - pointer/keyboard input and an animation-frame clock
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod autoscroll;
mod fenwick;
pub mod geometry;
mod height_cache;
mod key;
mod keyboard;
mod list;
mod placeholder;
mod session;
mod types;

#[cfg(test)]
mod tests;

pub use autoscroll::{
    AutoScrollConfig, AutoScrollController, AutoScrollDirection, ScrollContainer, ScrollMetrics,
    TickOutcome,
};
pub use geometry::EdgeProximity;
pub use height_cache::HeightCache;
pub use key::ItemKey;
pub use keyboard::KeyboardDragController;
pub use list::{FixedHeightList, ListStrategy};
pub use placeholder::{
    PlaceholderIndexCalculator, PlaceholderOptions, PlaceholderQuery, PlaceholderResult,
};
pub use session::{
    DragPhase, DragSession, DragSessionOptions, DragSnapshot, DragStart, DragUpdate, DraggedItem,
    DropResult, OnSessionChange,
};
pub use types::{AxisLock, ContainerGeometry, PlaceholderKey, Point, Rect, ScrollDirection};
