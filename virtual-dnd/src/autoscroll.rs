use alloc::vec::Vec;

use crate::geometry::{EdgeProximity, contains, near_edges};
use crate::{Point, Rect, ScrollDirection};

/// Per-container auto-scroll tuning.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AutoScrollConfig {
    /// Distance from an edge (px) inside which scrolling kicks in.
    pub threshold: f64,
    /// Scroll distance per frame (px) at the very edge.
    pub max_speed: f64,
    /// Scale speed by proximity to the edge instead of always using `max_speed`.
    pub accelerate: bool,
}

impl Default for AutoScrollConfig {
    fn default() -> Self {
        Self {
            threshold: 50.0,
            max_speed: 15.0,
            accelerate: true,
        }
    }
}

impl AutoScrollConfig {
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_max_speed(mut self, max_speed: f64) -> Self {
        self.max_speed = max_speed;
        self
    }

    pub fn with_accelerate(mut self, accelerate: bool) -> Self {
        self.accelerate = accelerate;
        self
    }

    /// Scroll speed (px/frame) for a cursor `distance` px inside an edge.
    ///
    /// Never increases with distance and never exceeds `max_speed`; floored at 1 px/frame when
    /// accelerating.
    pub fn speed_at(&self, distance: f64) -> f64 {
        if !self.accelerate || self.threshold <= 0.0 {
            return self.max_speed;
        }
        let distance = distance.clamp(0.0, self.threshold);
        let floor = self.max_speed.min(1.0);
        (self.max_speed * (self.threshold - distance) / self.threshold).max(floor)
    }
}

/// A scrollable element the auto-scroller can read and move.
///
/// Scroll positions are written directly (no smooth/relative scroll APIs), so the value read back
/// on the next frame is exactly the value written.
pub trait ScrollContainer {
    /// Visible box in viewport coordinates.
    fn rect(&self) -> Rect;
    fn scroll_top(&self) -> f64;
    fn scroll_left(&self) -> f64;
    fn scroll_height(&self) -> f64;
    fn scroll_width(&self) -> f64;
    fn client_height(&self) -> f64;
    fn client_width(&self) -> f64;
    fn set_scroll_top(&mut self, value: f64);
    fn set_scroll_left(&mut self, value: f64);
}

/// A plain-data [`ScrollContainer`], useful for adapters that mirror element metrics each frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollMetrics {
    pub rect: Rect,
    pub scroll_top: f64,
    pub scroll_left: f64,
    pub scroll_height: f64,
    pub scroll_width: f64,
}

impl ScrollMetrics {
    /// A container whose client box equals `rect` and whose content is
    /// `scroll_width` x `scroll_height`.
    pub fn new(rect: Rect, scroll_width: f64, scroll_height: f64) -> Self {
        Self {
            rect,
            scroll_top: 0.0,
            scroll_left: 0.0,
            scroll_height,
            scroll_width,
        }
    }

    pub fn with_scroll(mut self, scroll_left: f64, scroll_top: f64) -> Self {
        self.scroll_left = scroll_left;
        self.scroll_top = scroll_top;
        self
    }
}

impl ScrollContainer for ScrollMetrics {
    fn rect(&self) -> Rect {
        self.rect
    }
    fn scroll_top(&self) -> f64 {
        self.scroll_top
    }
    fn scroll_left(&self) -> f64 {
        self.scroll_left
    }
    fn scroll_height(&self) -> f64 {
        self.scroll_height
    }
    fn scroll_width(&self) -> f64 {
        self.scroll_width
    }
    fn client_height(&self) -> f64 {
        self.rect.height
    }
    fn client_width(&self) -> f64 {
        self.rect.width
    }
    fn set_scroll_top(&mut self, value: f64) {
        self.scroll_top = value;
    }
    fn set_scroll_left(&mut self, value: f64) {
        self.scroll_left = value;
    }
}

/// Scroll direction per axis during the last tick (`None` = not scrolling on that axis).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AutoScrollDirection {
    pub x: Option<ScrollDirection>,
    pub y: Option<ScrollDirection>,
}

impl AutoScrollDirection {
    pub fn is_neutral(&self) -> bool {
        self.x.is_none() && self.y.is_none()
    }
}

/// What a single [`AutoScrollController::tick`] did.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TickOutcome {
    /// Monitoring is off (or was just switched off because no drag is active). Do not reschedule.
    Stopped,
    /// The drag has no cursor position yet.
    Waiting,
    /// No container is near an edge, or the near container cannot scroll further.
    Idle,
    /// A container scrolled by the given deltas (px).
    Scrolled { dx: f64, dy: f64 },
}

impl TickOutcome {
    /// Whether the adapter should request another animation frame.
    pub fn should_reschedule(&self) -> bool {
        !matches!(self, Self::Stopped)
    }
}

#[derive(Clone, Debug)]
struct Registration<I, C> {
    id: I,
    container: C,
    config: AutoScrollConfig,
}

/// Edge-triggered auto-scroll for registered containers, advanced once per animation frame.
///
/// The adapter owns the frame loop: call [`Self::start_monitoring`] when a drag starts, then
/// [`Self::tick`] every frame while [`TickOutcome::should_reschedule`] holds.
#[derive(Clone, Debug)]
pub struct AutoScrollController<I, C> {
    containers: Vec<Registration<I, C>>,
    monitoring: bool,
    cursor_override: Option<Point>,
    scrolling: bool,
    direction: AutoScrollDirection,
}

impl<I, C> Default for AutoScrollController<I, C> {
    fn default() -> Self {
        Self {
            containers: Vec::new(),
            monitoring: false,
            cursor_override: None,
            scrolling: false,
            direction: AutoScrollDirection::default(),
        }
    }
}

impl<I: PartialEq, C: ScrollContainer> AutoScrollController<I, C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces, keeping its position) a scrollable container.
    pub fn register_container(&mut self, id: I, container: C, config: Option<AutoScrollConfig>) {
        let config = config.unwrap_or_default();
        ddebug!(
            threshold = config.threshold,
            max_speed = config.max_speed,
            accelerate = config.accelerate,
            "AutoScrollController::register_container"
        );
        if let Some(reg) = self.containers.iter_mut().find(|r| r.id == id) {
            reg.container = container;
            reg.config = config;
            return;
        }
        self.containers.push(Registration {
            id,
            container,
            config,
        });
    }

    pub fn unregister_container(&mut self, id: &I) -> Option<C> {
        let pos = self.containers.iter().position(|r| &r.id == id)?;
        ddebug!("AutoScrollController::unregister_container");
        Some(self.containers.remove(pos).container)
    }

    pub fn is_registered(&self, id: &I) -> bool {
        self.containers.iter().any(|r| &r.id == id)
    }

    pub fn container(&self, id: &I) -> Option<&C> {
        self.containers
            .iter()
            .find(|r| &r.id == id)
            .map(|r| &r.container)
    }

    pub fn container_mut(&mut self, id: &I) -> Option<&mut C> {
        self.containers
            .iter_mut()
            .find(|r| &r.id == id)
            .map(|r| &mut r.container)
    }

    pub fn config(&self, id: &I) -> Option<AutoScrollConfig> {
        self.containers
            .iter()
            .find(|r| &r.id == id)
            .map(|r| r.config)
    }

    pub fn len(&self) -> usize {
        self.containers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }

    pub fn start_monitoring(&mut self) {
        if !self.monitoring {
            ddebug!("AutoScrollController::start_monitoring");
        }
        self.monitoring = true;
    }

    /// Stops the loop: the next tick returns [`TickOutcome::Stopped`]. Clears the cursor override.
    pub fn stop_monitoring(&mut self) {
        if self.monitoring {
            ddebug!("AutoScrollController::stop_monitoring");
        }
        self.monitoring = false;
        self.cursor_override = None;
        self.reset_scroll_state();
    }

    pub fn is_monitoring(&self) -> bool {
        self.monitoring
    }

    /// Substitutes `point` for the drag cursor during edge detection.
    pub fn set_cursor_override(&mut self, point: Option<Point>) {
        self.cursor_override = point;
    }

    pub fn cursor_override(&self) -> Option<Point> {
        self.cursor_override
    }

    pub fn is_scrolling(&self) -> bool {
        self.scrolling
    }

    pub fn scroll_direction(&self) -> AutoScrollDirection {
        self.direction
    }

    /// Runs one frame.
    ///
    /// `on_scroll` is called synchronously, before this returns, with the container that moved,
    /// so placeholder recomputation sees the scroll offset written in this same frame.
    pub fn tick(
        &mut self,
        dragging: bool,
        cursor: Option<Point>,
        mut on_scroll: impl FnMut(&I, &C),
    ) -> TickOutcome {
        if !self.monitoring {
            return TickOutcome::Stopped;
        }
        if !dragging {
            self.stop_monitoring();
            return TickOutcome::Stopped;
        }
        let Some(cursor) = cursor else {
            return TickOutcome::Waiting;
        };
        let point = self.cursor_override.unwrap_or(cursor);

        let Some(reg) = self
            .containers
            .iter_mut()
            .find(|r| contains(&r.container.rect(), point))
        else {
            self.reset_scroll_state();
            return TickOutcome::Idle;
        };

        let edges = near_edges(&reg.container.rect(), point, reg.config.threshold);
        if !edges.any() {
            self.reset_scroll_state();
            return TickOutcome::Idle;
        }

        let (dir_x, dir_y) = directions(&edges);
        let mut dx = 0.0;
        let mut dy = 0.0;

        if let Some((dir, distance)) = dir_y {
            let delta = dir.sign() * reg.config.speed_at(distance);
            let max = reg.container.scroll_height() - reg.container.client_height();
            if let Some(next) = step(reg.container.scroll_top(), delta, max) {
                dy = next - reg.container.scroll_top();
                reg.container.set_scroll_top(next);
            }
        }
        if let Some((dir, distance)) = dir_x {
            let delta = dir.sign() * reg.config.speed_at(distance);
            let max = reg.container.scroll_width() - reg.container.client_width();
            if let Some(next) = step(reg.container.scroll_left(), delta, max) {
                dx = next - reg.container.scroll_left();
                reg.container.set_scroll_left(next);
            }
        }

        if dx == 0.0 && dy == 0.0 {
            self.reset_scroll_state();
            return TickOutcome::Idle;
        }

        self.scrolling = true;
        self.direction = AutoScrollDirection {
            x: (dx != 0.0).then_some(dir_x.map(|(d, _)| d)).flatten(),
            y: (dy != 0.0).then_some(dir_y.map(|(d, _)| d)).flatten(),
        };
        dtrace!(dx, dy, "auto-scroll step");
        on_scroll(&reg.id, &reg.container);
        TickOutcome::Scrolled { dx, dy }
    }

    fn reset_scroll_state(&mut self) {
        self.scrolling = false;
        self.direction = AutoScrollDirection::default();
    }
}

type AxisIntent = Option<(ScrollDirection, f64)>;

/// Picks the near edge per axis; when both opposing edges are near, the closer one wins.
fn directions(edges: &EdgeProximity) -> (AxisIntent, AxisIntent) {
    let pick = |start: bool, start_d: f64, end: bool, end_d: f64| match (start, end) {
        (true, true) if end_d < start_d => Some((ScrollDirection::Forward, end_d)),
        (true, _) => Some((ScrollDirection::Backward, start_d)),
        (false, true) => Some((ScrollDirection::Forward, end_d)),
        (false, false) => None,
    };
    (
        pick(
            edges.left,
            edges.distance_left,
            edges.right,
            edges.distance_right,
        ),
        pick(
            edges.top,
            edges.distance_top,
            edges.bottom,
            edges.distance_bottom,
        ),
    )
}

/// Next scroll position for `delta`. `None` when the step would leave `[0, max]` (the whole step
/// is dropped) or would not move at all.
fn step(current: f64, delta: f64, max: f64) -> Option<f64> {
    let max = max.max(0.0);
    if !current.is_finite() || !delta.is_finite() || delta == 0.0 {
        return None;
    }
    let next = current + delta;
    (0.0..=max).contains(&next).then_some(next)
}
