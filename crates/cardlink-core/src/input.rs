//! Pointer input fed to the connection drawing state machine.

use crate::geometry::distance;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Pointer event in canvas (world) coordinates.
///
/// Hosts translate their platform events into these; a single pointer is
/// assumed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down { position: Point },
    Move { position: Point },
    Up { position: Point },
    /// The gesture was aborted by the host (focus lost, escape pressed, ...).
    Cancel,
}

impl PointerEvent {
    /// Pointer position carried by the event, if any.
    pub fn position(&self) -> Option<Point> {
        match *self {
            PointerEvent::Down { position }
            | PointerEvent::Move { position }
            | PointerEvent::Up { position } => Some(position),
            PointerEvent::Cancel => None,
        }
    }
}

/// Double-click detection constants.
const DOUBLE_CLICK_TIME_MS: u64 = 500;
const DOUBLE_CLICK_DISTANCE: f64 = 5.0;

/// Detects double activation from successive pointer-downs.
#[derive(Debug, Clone)]
pub struct ClickTracker {
    max_interval: Duration,
    max_distance: f64,
    last_click_time: Option<Instant>,
    last_click_position: Option<Point>,
}

impl Default for ClickTracker {
    fn default() -> Self {
        Self {
            max_interval: Duration::from_millis(DOUBLE_CLICK_TIME_MS),
            max_distance: DOUBLE_CLICK_DISTANCE,
            last_click_time: None,
            last_click_position: None,
        }
    }
}

impl ClickTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a click now. Returns true if it completes a double-click.
    pub fn click(&mut self, position: Point) -> bool {
        self.click_at(position, Instant::now())
    }

    /// Record a click at an explicit time.
    pub fn click_at(&mut self, position: Point, now: Instant) -> bool {
        if let (Some(last_time), Some(last_pos)) = (self.last_click_time, self.last_click_position) {
            let elapsed = now.saturating_duration_since(last_time);
            if elapsed < self.max_interval && distance(position, last_pos) < self.max_distance {
                // Reset to prevent triple-click being detected as another double-click
                self.reset();
                return true;
            }
        }
        self.last_click_time = Some(now);
        self.last_click_position = Some(position);
        false
    }

    /// Forget the previous click.
    pub fn reset(&mut self) {
        self.last_click_time = None;
        self.last_click_position = None;
    }
}
