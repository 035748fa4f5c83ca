//! The drag-to-connect gesture as an explicit state machine.
//!
//! ```text
//! Idle --down on endpoint--> Drawing --up on target--> Committed --> Idle
//!                               |
//!                               +--up elsewhere / cancel / source gone--> Cancelled --> Idle
//! ```
//!
//! Committed and Cancelled are reported as [`DrawingOutcome`]s; the machine
//! itself is back in `Idle` by the time `handle_event` returns.

use super::endpoint::{EndpointId, EndpointRef};
use super::registry::EndpointRegistry;
use super::store::{ConnectionId, ConnectionStore};
use super::{generator, recalc, snap};
use crate::config::ConnectorConfig;
use crate::geometry::EndpointLocator;
use crate::input::{ClickTracker, PointerEvent};
use kurbo::{Line, Point};

/// A drawing in progress.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveDrawing {
    /// Endpoint the gesture started on.
    pub from: EndpointId,
    /// Value identity of `from`, kept so the source can be re-located.
    pub from_key: EndpointRef,
    /// Latest pointer position.
    pub cursor: Point,
    /// Provisional line from the source center to the cursor.
    pub line: Line,
}

/// State of the connection drawing gesture.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DrawingState {
    #[default]
    Idle,
    Drawing(ActiveDrawing),
}

/// What handling one pointer event did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawingOutcome {
    /// Nothing to do for this event in the current state.
    Ignored,
    /// A drawing started on this endpoint.
    Started(EndpointId),
    /// The provisional line moved.
    Updated(Line),
    /// A connection was committed.
    Committed(ConnectionId),
    /// The drawing was discarded.
    Cancelled,
    /// A committed connection was double-activated; the host shows its details.
    ShowDetail(ConnectionId),
}

/// Everything a transition may read or mutate.
pub struct DrawingContext<'a, L: EndpointLocator + ?Sized> {
    pub registry: &'a mut EndpointRegistry,
    pub store: &'a mut ConnectionStore,
    pub lines: &'a mut recalc::RenderedLines,
    pub config: &'a ConnectorConfig,
    pub locator: &'a L,
}

impl<L: EndpointLocator + ?Sized> DrawingContext<'_, L> {
    /// Commit a connection between two registered endpoints.
    ///
    /// Registers the connection, marks both endpoints occupied, subdivides
    /// both edges and refreshes every line. Returns `None`, changing
    /// nothing, if either endpoint is unknown or both are on the same card.
    pub fn commit(&mut self, from: EndpointId, to: EndpointId) -> Option<ConnectionId> {
        let from_endpoint = self.registry.get(from)?.clone();
        let to_endpoint = self.registry.get(to)?.clone();

        let id = self.store.create(
            from_endpoint.key(),
            to_endpoint.key(),
            self.config.connection_style(),
        )?;
        self.registry.mark_occupied(from, true);
        self.registry.mark_occupied(to, true);

        generator::refresh_edge(self.registry, from_endpoint.card, from_endpoint.side, self.config);
        generator::refresh_edge(self.registry, to_endpoint.card, to_endpoint.side, self.config);
        recalc::recompute_all(self.store, self.registry, self.locator, self.lines);

        log::info!(
            "Connected card {} ({:?}) to card {} ({:?}) as {}",
            from_endpoint.card,
            from_endpoint.side,
            to_endpoint.card,
            to_endpoint.side,
            id
        );
        Some(id)
    }
}

/// The gesture state machine. At most one drawing exists at a time.
#[derive(Debug, Clone, Default)]
pub struct ConnectionDrawing {
    state: DrawingState,
    clicks: ClickTracker,
}

impl ConnectionDrawing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DrawingState {
        &self.state
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.state, DrawingState::Drawing(_))
    }

    /// The drawing in progress, if any.
    pub fn active(&self) -> Option<&ActiveDrawing> {
        match &self.state {
            DrawingState::Drawing(active) => Some(active),
            DrawingState::Idle => None,
        }
    }

    /// Provisional line to render while drawing.
    pub fn provisional_line(&self) -> Option<Line> {
        self.active().map(|active| active.line)
    }

    /// Abort the drawing in progress. Returns true if there was one.
    pub fn cancel(&mut self) -> bool {
        let was_drawing = self.is_drawing();
        self.state = DrawingState::Idle;
        was_drawing
    }

    /// Advance the state machine by one pointer event.
    pub fn handle_event<L: EndpointLocator + ?Sized>(
        &mut self,
        event: PointerEvent,
        ctx: &mut DrawingContext<'_, L>,
    ) -> DrawingOutcome {
        match std::mem::take(&mut self.state) {
            DrawingState::Idle => self.handle_idle(event, ctx),
            DrawingState::Drawing(active) => self.handle_drawing(active, event, ctx),
        }
    }

    fn handle_idle<L: EndpointLocator + ?Sized>(
        &mut self,
        event: PointerEvent,
        ctx: &mut DrawingContext<'_, L>,
    ) -> DrawingOutcome {
        let PointerEvent::Down { position } = event else {
            return DrawingOutcome::Ignored;
        };

        let hit = snap::endpoint_at(position, ctx.registry, ctx.locator, ctx.config.hit_radius);
        if let Some(from) = hit {
            let from_key = match ctx.registry.get(from) {
                Some(endpoint) => endpoint.key(),
                None => return DrawingOutcome::Ignored,
            };
            let Some(origin) = ctx.locator.endpoint_center(&from_key) else {
                return DrawingOutcome::Ignored;
            };
            self.clicks.reset();
            self.state = DrawingState::Drawing(ActiveDrawing {
                from,
                from_key,
                cursor: position,
                line: Line::new(origin, position),
            });
            log::debug!("Drawing started from card {} ({:?})", from_key.card, from_key.side);
            return DrawingOutcome::Started(from);
        }

        if self.clicks.click(position) {
            if let Some(id) = ctx.lines.connection_at(position, ctx.config.line_hit_tolerance) {
                return DrawingOutcome::ShowDetail(id);
            }
        }
        DrawingOutcome::Ignored
    }

    fn handle_drawing<L: EndpointLocator + ?Sized>(
        &mut self,
        mut active: ActiveDrawing,
        event: PointerEvent,
        ctx: &mut DrawingContext<'_, L>,
    ) -> DrawingOutcome {
        let position = match event {
            PointerEvent::Down { .. } => {
                log::debug!("Pointer-down while drawing rejected");
                self.state = DrawingState::Drawing(active);
                return DrawingOutcome::Ignored;
            }
            PointerEvent::Cancel => {
                log::debug!("Drawing cancelled by host");
                return DrawingOutcome::Cancelled;
            }
            PointerEvent::Move { position } | PointerEvent::Up { position } => position,
        };

        // The source card may have been removed mid-gesture.
        let origin = ctx
            .registry
            .get(active.from)
            .and_then(|_| ctx.locator.endpoint_center(&active.from_key));
        let Some(origin) = origin else {
            log::debug!("Drawing source on card {} disappeared", active.from_key.card);
            return DrawingOutcome::Cancelled;
        };

        if let PointerEvent::Move { .. } = event {
            active.cursor = position;
            active.line = Line::new(origin, position);
            let line = active.line;
            self.state = DrawingState::Drawing(active);
            return DrawingOutcome::Updated(line);
        }

        let target = match ctx.registry.get(active.from) {
            Some(from) => {
                snap::resolve(position, from, ctx.registry, ctx.locator, ctx.config.snap_radius)
            }
            None => None,
        };
        match target.and_then(|to| ctx.commit(active.from, to)) {
            Some(id) => DrawingOutcome::Committed(id),
            None => {
                log::debug!("No connection target near ({}, {})", position.x, position.y);
                DrawingOutcome::Cancelled
            }
        }
    }
}
