use virtual_dnd::Point;

/// Latest-wins buffer for pointer moves.
///
/// Native pointer events arrive faster than frames; the adapter pushes every move and flushes once
/// per frame, so placeholder recomputation runs at most once per tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerCoalescer {
    pending: Option<Point>,
    coalesced: u32,
}

impl PointerCoalescer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffers `position`, replacing any pending one.
    pub fn push(&mut self, position: Point) {
        if self.pending.is_some() {
            self.coalesced = self.coalesced.saturating_add(1);
        }
        self.pending = Some(position);
    }

    pub fn pending(&self) -> Option<Point> {
        self.pending
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Number of moves dropped in favor of a later one since the last flush.
    pub fn coalesced_count(&self) -> u32 {
        self.coalesced
    }

    /// Takes the latest position.
    pub fn flush(&mut self) -> Option<Point> {
        self.coalesced = 0;
        self.pending.take()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
