//! Drag-to-pan, wheel-to-pan and edge-triggered paging for a horizontally
//! scrolling timeline.
//!
//! The controller never owns the scroll container. Every event handler takes
//! a [`ScrollSurface`] so the same state machine drives a DOM element, a TUI
//! viewport or the in-memory [`ScrollState`] used in tests.
//!
//! | state    | event                       | action                         | next     |
//! |----------|-----------------------------|--------------------------------|----------|
//! | idle     | pointer down (drag enabled) | record origin                  | dragging |
//! | dragging | pointer move                | update `scroll_left`           | dragging |
//! | dragging | pointer up                  | release                        | idle     |
//! | any      | scroll/wheel near an edge   | fire shift, schedule reset     | same     |

use std::fmt;

use log::{debug, trace};

use crate::config::TimelineConfig;
use crate::logging::PAN_TARGET;

/// A horizontally scrollable container.
pub trait ScrollSurface {
    fn scroll_left(&self) -> f64;
    fn set_scroll_left(&mut self, value: f64);
    fn scroll_width(&self) -> f64;
    fn client_width(&self) -> f64;

    /// Largest reachable `scroll_left`
    fn max_scroll(&self) -> f64 {
        (self.scroll_width() - self.client_width()).max(0.0)
    }
}

/// In-memory scroll container that clamps like a browser does.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollState {
    scroll_left: f64,
    scroll_width: f64,
    client_width: f64,
}

impl ScrollState {
    pub const fn new(scroll_width: f64, client_width: f64) -> Self {
        Self {
            scroll_left: 0.0,
            scroll_width,
            client_width,
        }
    }

    /// Same container scrolled to `scroll_left` (clamped).
    #[must_use]
    pub fn at(mut self, scroll_left: f64) -> Self {
        self.set_scroll_left(scroll_left);
        self
    }

    /// Resizes the content, e.g. after the grid re-rendered for a new period.
    pub fn set_scroll_width(&mut self, scroll_width: f64) {
        self.scroll_width = scroll_width;
        let left = self.scroll_left;
        self.set_scroll_left(left);
    }
}

impl ScrollSurface for ScrollState {
    fn scroll_left(&self) -> f64 {
        self.scroll_left
    }

    fn set_scroll_left(&mut self, value: f64) {
        self.scroll_left = value.clamp(0.0, self.max_scroll());
    }

    fn scroll_width(&self) -> f64 {
        self.scroll_width
    }

    fn client_width(&self) -> f64 {
        self.client_width
    }
}

/// Which end of the scroll range triggered paging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    Start,
    End,
}

impl Edge {
    /// Sign applied to the paging step
    pub const fn direction(self) -> i64 {
        match self {
            Self::Start => -1,
            Self::End => 1,
        }
    }
}

/// Pointer state of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PanState {
    #[default]
    Idle,
    Dragging {
        origin_x: f64,
        origin_scroll: f64,
    },
}

/// Coarse view of the controller, with a pending reset taking precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanPhase {
    Idle,
    Dragging,
    PagingPending,
}

type ShiftCallback = Box<dyn FnMut(i64)>;

/// Pan and paging state machine for one timeline instance.
pub struct PanController {
    state: PanState,
    pending: Option<Edge>,
    drag_enabled: bool,
    wheel_enabled: bool,
    paging_step: i64,
    edge_threshold: f64,
    reset_inset: f64,
    on_shift: Option<ShiftCallback>,
}

impl fmt::Debug for PanController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PanController")
            .field("state", &self.state)
            .field("pending", &self.pending)
            .field("drag_enabled", &self.drag_enabled)
            .field("wheel_enabled", &self.wheel_enabled)
            .field("paging_step", &self.paging_step)
            .field("edge_threshold", &self.edge_threshold)
            .field("reset_inset", &self.reset_inset)
            .field("on_shift", &self.on_shift.is_some())
            .finish()
    }
}

impl PanController {
    pub fn new(config: &TimelineConfig) -> Self {
        Self {
            state: PanState::Idle,
            pending: None,
            drag_enabled: config.drag_enabled,
            wheel_enabled: config.wheel_enabled,
            paging_step: config.paging_step_days,
            edge_threshold: config.edge_threshold_px,
            reset_inset: config.reset_inset_px,
            on_shift: None,
        }
    }

    /// Installs the callback invoked with `±paging_step_days` on every edge
    /// trigger. Without one, edges never page.
    #[must_use]
    pub fn with_shift_callback(mut self, callback: impl FnMut(i64) + 'static) -> Self {
        self.on_shift = Some(Box::new(callback));
        self
    }

    pub fn set_shift_callback(&mut self, callback: impl FnMut(i64) + 'static) {
        self.on_shift = Some(Box::new(callback));
    }

    pub fn clear_shift_callback(&mut self) {
        self.on_shift = None;
    }

    pub const fn state(&self) -> PanState {
        self.state
    }

    /// Edge whose reset will be applied on the next [`tick`](Self::tick)
    pub const fn pending_reset(&self) -> Option<Edge> {
        self.pending
    }

    pub const fn phase(&self) -> PanPhase {
        match (self.pending, self.state) {
            (Some(_), _) => PanPhase::PagingPending,
            (None, PanState::Dragging { .. }) => PanPhase::Dragging,
            (None, PanState::Idle) => PanPhase::Idle,
        }
    }

    /// Starts a drag at pointer position `x`. Returns whether a drag began.
    pub fn pointer_down<S: ScrollSurface + ?Sized>(&mut self, x: f64, surface: &S) -> bool {
        if !self.drag_enabled || !matches!(self.state, PanState::Idle) {
            return false;
        }
        self.state = PanState::Dragging {
            origin_x: x,
            origin_scroll: surface.scroll_left(),
        };
        trace!(target: PAN_TARGET, "drag start at x={x}");
        true
    }

    /// Follows the pointer while dragging. Returns the edge paged at, if any.
    pub fn pointer_move<S: ScrollSurface + ?Sized>(&mut self, x: f64, surface: &mut S) -> Option<Edge> {
        let PanState::Dragging {
            origin_x,
            origin_scroll,
        } = self.state
        else {
            return None;
        };
        surface.set_scroll_left(origin_scroll - (x - origin_x));
        // Keep the origin consistent with what the surface accepted after clamping
        self.state = PanState::Dragging {
            origin_x,
            origin_scroll: surface.scroll_left() + (x - origin_x),
        };
        self.check_edges(surface)
    }

    pub fn pointer_up(&mut self) {
        if matches!(self.state, PanState::Dragging { .. }) {
            trace!(target: PAN_TARGET, "drag end");
        }
        self.state = PanState::Idle;
    }

    /// Turns a wheel gesture into horizontal scrolling, using whichever axis
    /// moved further. Returns the edge paged at, if any.
    pub fn wheel<S: ScrollSurface + ?Sized>(&mut self, delta_x: f64, delta_y: f64, surface: &mut S) -> Option<Edge> {
        if !self.wheel_enabled {
            return None;
        }
        let delta = if delta_x.abs() >= delta_y.abs() { delta_x } else { delta_y };
        if delta == 0.0 {
            return None;
        }
        surface.set_scroll_left(surface.scroll_left() + delta);
        self.check_edges(surface)
    }

    /// Handles a scroll event the container raised on its own.
    pub fn on_scroll<S: ScrollSurface + ?Sized>(&mut self, surface: &S) -> Option<Edge> {
        self.check_edges(surface)
    }

    /// Applies a pending reset. Returns whether the scroll position moved.
    ///
    /// A drag in progress is rebased by the same distance so the next pointer
    /// move continues from the reset position.
    pub fn tick<S: ScrollSurface + ?Sized>(&mut self, surface: &mut S) -> bool {
        let Some(edge) = self.pending.take() else {
            return false;
        };
        let max = surface.max_scroll();
        let target = match edge {
            Edge::End => self.reset_inset,
            Edge::Start => max - self.reset_inset,
        }
        .clamp(0.0, max);

        let before = surface.scroll_left();
        surface.set_scroll_left(target);
        let moved = surface.scroll_left() - before;
        if let PanState::Dragging { origin_scroll, .. } = &mut self.state {
            *origin_scroll += moved;
        }
        debug!(target: PAN_TARGET, "reset scroll to {} after paging at {edge:?}", surface.scroll_left());
        moved != 0.0
    }

    fn check_edges<S: ScrollSurface + ?Sized>(&mut self, surface: &S) -> Option<Edge> {
        if self.paging_step <= 0 {
            return None;
        }
        let callback = self.on_shift.as_mut()?;
        let max = surface.max_scroll();
        // The reset must land clear of both thresholds or it would page again
        if max <= self.reset_inset + self.edge_threshold {
            trace!(target: PAN_TARGET, "overflow of {max}px too small to page");
            return None;
        }

        let left = surface.scroll_left();
        let edge = if left <= self.edge_threshold {
            Edge::Start
        } else if left >= max - self.edge_threshold {
            Edge::End
        } else {
            return None;
        };

        let days = edge.direction() * self.paging_step;
        debug!(target: PAN_TARGET, "paging {days}d at {edge:?} (scroll_left={left}, max={max})");
        callback(days);
        self.pending = Some(edge);
        Some(edge)
    }
}

/// Which of two mirrored containers raised a scroll event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollSide {
    Primary,
    Secondary,
}

/// Keeps a secondary scrollbar in lock-step with the primary container.
///
/// Copying a position into the other container makes it raise its own scroll
/// event; `is_syncing` swallows that echo instead of copying it back.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScrollMirror {
    is_syncing: bool,
}

impl ScrollMirror {
    pub const fn new() -> Self {
        Self { is_syncing: false }
    }

    pub const fn is_syncing(&self) -> bool {
        self.is_syncing
    }

    /// Handles a scroll event from `side`. Returns whether the other side was
    /// updated; `false` for a swallowed echo or when both already agree.
    pub fn on_scroll<P, S>(&mut self, side: ScrollSide, primary: &mut P, secondary: &mut S) -> bool
    where
        P: ScrollSurface + ?Sized,
        S: ScrollSurface + ?Sized,
    {
        if self.is_syncing {
            self.is_syncing = false;
            return false;
        }

        let changed = match side {
            ScrollSide::Primary => copy_position(&*primary, secondary),
            ScrollSide::Secondary => copy_position(&*secondary, primary),
        };
        // No echo follows when the target did not move
        self.is_syncing = changed;
        changed
    }

    /// Drops the guard, for hosts that cannot guarantee the echo arrives.
    pub fn release(&mut self) {
        self.is_syncing = false;
    }
}

fn copy_position<F, T>(from: &F, to: &mut T) -> bool
where
    F: ScrollSurface + ?Sized,
    T: ScrollSurface + ?Sized,
{
    let before = to.scroll_left();
    to.set_scroll_left(from.scroll_left());
    to.scroll_left() != before
}
