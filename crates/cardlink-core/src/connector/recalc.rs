//! Line geometry for committed connections.

use super::registry::EndpointRegistry;
use super::store::{ConnectionId, ConnectionStore};
use crate::geometry::EndpointLocator;
use indexmap::IndexMap;
use kurbo::{Line, ParamCurveNearest, Point};

/// Accuracy passed to kurbo's nearest-point search.
const NEAREST_ACCURACY: f64 = 1e-6;

/// Rendered start/end coordinates of every committed connection.
///
/// This is the view-side table the renderer reads; it holds connection ids
/// only and never owns connections. Lines are kept in store order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderedLines {
    lines: IndexMap<ConnectionId, Line>,
}

impl RenderedLines {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: ConnectionId) -> Option<Line> {
        self.lines.get(&id).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ConnectionId, Line)> + '_ {
        self.lines.iter().map(|(&id, &line)| (id, line))
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn remove(&mut self, id: ConnectionId) -> Option<Line> {
        self.lines.shift_remove(&id)
    }

    /// Connection whose line passes within `tolerance` of a point.
    /// The closest line wins; on equal distances the older connection does.
    pub fn connection_at(&self, point: Point, tolerance: f64) -> Option<ConnectionId> {
        let max_dist_sq = tolerance * tolerance;
        let mut best: Option<(ConnectionId, f64)> = None;

        for (&id, line) in &self.lines {
            let dist_sq = line.nearest(point, NEAREST_ACCURACY).distance_sq;
            if dist_sq > max_dist_sq {
                continue;
            }
            if best.is_none_or(|(_, best_dist_sq)| dist_sq < best_dist_sq) {
                best = Some((id, dist_sq));
            }
        }

        best.map(|(id, _)| id)
    }
}

/// Recompute the line of every stored connection from live endpoint centers.
///
/// Connections whose endpoints cannot be located (card gone, endpoint not
/// registered) get no line. Entries for connections no longer in the store
/// are dropped. Returns the number of lines written.
pub fn recompute_all<L: EndpointLocator + ?Sized>(
    store: &ConnectionStore,
    registry: &EndpointRegistry,
    locator: &L,
    lines: &mut RenderedLines,
) -> usize {
    let mut fresh = IndexMap::with_capacity(store.len());

    for connection in store.iter() {
        let located = [connection.from, connection.to].map(|endpoint| {
            registry
                .find(&endpoint)
                .and_then(|_| locator.endpoint_center(&endpoint))
        });
        match located {
            [Some(start), Some(end)] => {
                fresh.insert(connection.id, Line::new(start, end));
            }
            _ => log::debug!("Connection {} has an endpoint that cannot be located", connection.id),
        }
    }

    lines.lines = fresh;
    lines.len()
}
