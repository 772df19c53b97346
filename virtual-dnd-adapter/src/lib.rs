//! Adapter utilities for the `virtual-dnd` crate.
//!
//! The `virtual-dnd` crate is UI-agnostic and focuses on the geometry and state machine. This
//! crate provides a framework-neutral [`DndController`] that wires those pieces together the way
//! a UI binding needs them:
//!
//! - a registry of droppable lists, hit-tested by container geometry
//! - latest-wins pointer-move coalescing, applied once per `tick(now_ms)`
//! - auto-scroll with same-frame placeholder recomputation
//! - keyboard commands (move, hand-off between lists, confirm/cancel)
//! - drag lifecycle events (`DragStart`, `DragMove`, `DragEnd`, `Drop`)
//!
//! This crate is intentionally framework-agnostic (no DOM/egui/ratatui bindings).
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod coalescer;
mod controller;
mod events;
mod keyboard;
mod options;


pub use coalescer::PointerCoalescer;
pub use controller::DndController;
pub use events::{
    DragEndEvent, DragEvent, DragMoveEvent, DragStartEvent, DropDestination, DropEvent,
    DropSource,
};
pub use keyboard::KeyboardCommand;
pub use options::{DndOptions, ListConfig, OnDragEvent};
